use glam::IVec2;

/// Stable index of an agent slot in the population arena.
/// A slot keeps its id across death and respawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read-only view of one agent, handed to renderers and UI once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: IVec2,
    pub facing_left: bool,
    pub is_resting: bool,
    /// Ticks since the run strip last advanced.
    pub frame_counter: u32,
    /// Current frame of whichever strip applies (idle while resting, run otherwise).
    pub frame: u32,
    pub alive: bool,
}

/// Summary of one `Simulation::advance` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Agents that ran the physics/behaviour pass this tick.
    pub updated: usize,
    /// Agents that landed on a tile this tick.
    pub landed: usize,
    /// Agents that picked a new action this tick.
    pub decided: usize,
    /// Agents spawned by the population top-up.
    pub spawned: usize,
    /// Alive count after the top-up.
    pub alive: usize,
}
