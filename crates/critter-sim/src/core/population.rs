use glam::IVec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::api::config::PopulationConfig;
use crate::api::types::{AgentId, AgentSnapshot};
use crate::components::agent::Agent;
use crate::core::rng;

/// Agent storage as a slot arena.
///
/// A slot's index is the agent's id. Killing an agent keeps the slot and queues
/// it for reuse; spawning takes a queued slot before growing the arena, so the
/// arena never holds more slots than the largest target it has been topped up to.
pub struct Population {
    slots: Vec<Agent>,
    free: Vec<usize>,
}

impl Population {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(256),
            free: Vec::new(),
        }
    }

    /// Create a population with a specific slot capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Spawn a live agent at `position`, reusing a dead slot when one is free.
    pub fn spawn(&mut self, position: IVec2, rng: &mut SmallRng) -> AgentId {
        let agent_rng = rng::split(rng);
        match self.free.pop() {
            Some(index) => {
                let id = AgentId(index as u32);
                self.slots[index] = Agent::new(id, position, agent_rng);
                id
            }
            None => {
                let id = AgentId(self.slots.len() as u32);
                self.slots.push(Agent::new(id, position, agent_rng));
                id
            }
        }
    }

    /// Put a prepared agent into the arena. Its id is overwritten with the slot it lands in.
    pub fn insert(&mut self, mut agent: Agent) -> AgentId {
        let index = self.free.pop().unwrap_or(self.slots.len());
        agent.id = AgentId(index as u32);
        agent.set_alive(true);
        let id = agent.id;
        if index == self.slots.len() {
            self.slots.push(agent);
        } else {
            self.slots[index] = agent;
        }
        id
    }

    /// Mark an agent dead. Returns false for unknown or already dead ids.
    pub fn kill(&mut self, id: AgentId) -> bool {
        match self.slots.get_mut(id.index()) {
            Some(agent) if agent.is_alive() => {
                agent.set_alive(false);
                self.free.push(id.index());
                true
            }
            _ => false,
        }
    }

    /// Spawn agents until `alive` reaches the configured target.
    ///
    /// `alive` is the caller's fresh count. Each new agent gets an independent
    /// x in the spawn band and the fixed spawn height. Never removes agents.
    pub fn top_up(
        &mut self,
        alive: usize,
        config: &PopulationConfig,
        rng: &mut SmallRng,
    ) -> Vec<AgentId> {
        let deficit = config.target.saturating_sub(alive);
        let band = config.spawn_band;
        if deficit == 0 || band.is_empty() {
            return Vec::new();
        }
        let spawned: Vec<AgentId> = (0..deficit)
            .map(|_| {
                let x = rng.random_range(band.min_x..band.max_x);
                self.spawn(IVec2::new(x, config.spawn_height), rng)
            })
            .collect();
        log::debug!(
            "population top-up: {} alive, spawned {}, {} slots",
            alive,
            spawned.len(),
            self.slots.len()
        );
        spawned
    }

    /// Get a reference to an agent by id. Dead agents are returned too.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index())
    }

    /// Get a mutable reference to an agent by id.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index())
    }

    /// Iterate over all slots, dead ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter()
    }

    /// Iterate over live agents.
    pub fn alive(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().filter(|a| a.is_alive())
    }

    /// All slots as a fixed-length slice. The arena cannot grow or shrink
    /// through it, which is what the per-tick update relies on.
    pub fn slots_mut(&mut self) -> &mut [Agent] {
        &mut self.slots
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|a| a.is_alive()).count()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = AgentSnapshot> + '_ {
        self.slots.iter().map(Agent::snapshot)
    }

    /// Number of slots, dead ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}
