use std::time::Duration;

use bytemuck::{Pod, Zeroable};

use crate::api::types::AgentSnapshot;
use crate::bridge::protocol::{self, ProtocolLayout, AGENT_FLOATS, HEADER_FLOATS};
use crate::core::simulation::Simulation;

/// Per-agent record written for the host renderer.
/// Must match the host protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct AgentInstance {
    /// Slot id.
    pub id: f32,
    /// X position in world pixels.
    pub x: f32,
    /// Y position in world pixels.
    pub y: f32,
    /// -1.0 when facing left, 1.0 otherwise. Multiplies the sprite's x scale.
    pub facing: f32,
    /// 1.0 while resting (idle strip), 0.0 while running.
    pub resting: f32,
    /// Frame index into the active strip.
    pub frame: f32,
    /// Ticks since the run strip advanced.
    pub frame_counter: f32,
    /// 1.0 alive, 0.0 dead. Dead records are skipped by the renderer.
    pub alive: f32,
}

impl AgentInstance {
    pub const FLOATS: usize = AGENT_FLOATS;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

fn flag(b: bool) -> f32 {
    if b { 1.0 } else { 0.0 }
}

impl From<AgentSnapshot> for AgentInstance {
    fn from(s: AgentSnapshot) -> Self {
        Self {
            id: s.id.0 as f32,
            x: s.position.x as f32,
            y: s.position.y as f32,
            facing: if s.facing_left { -1.0 } else { 1.0 },
            resting: flag(s.is_resting),
            frame: s.frame as f32,
            frame_counter: s.frame_counter as f32,
            alive: flag(s.alive),
        }
    }
}

/// Header plus agent records, rebuilt once per rendered frame.
pub struct SnapshotBuffer {
    pub header: [f32; HEADER_FLOATS],
    pub agents: Vec<AgentInstance>,
    layout: ProtocolLayout,
}

impl SnapshotBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        let mut header = [0.0; HEADER_FLOATS];
        header[protocol::HEADER_PROTOCOL_VERSION] = protocol::PROTOCOL_VERSION;
        header[protocol::HEADER_MAX_AGENTS] = layout.max_agents as f32;
        Self {
            header,
            agents: Vec::with_capacity(layout.max_agents),
            layout,
        }
    }

    /// Refill from the simulation's current state.
    pub fn rebuild(&mut self, sim: &Simulation, now: Duration) {
        self.agents.clear();
        self.agents.extend(
            sim.snapshots()
                .take(self.layout.max_agents)
                .map(AgentInstance::from),
        );
        let config = sim.config();
        self.header[protocol::HEADER_TICK] = sim.ticks() as f32;
        self.header[protocol::HEADER_AGENT_COUNT] = self.agents.len() as f32;
        self.header[protocol::HEADER_ALIVE_COUNT] = sim.alive_count() as f32;
        self.header[protocol::HEADER_WORLD_WIDTH] = config.world_width;
        self.header[protocol::HEADER_WORLD_HEIGHT] = config.world_height;
        self.header[protocol::HEADER_SIM_TIME] = now.as_secs_f32();
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn agent_count(&self) -> u32 {
        self.agents.len() as u32
    }

    /// Agent records as a flat float slice.
    pub fn agent_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.agents)
    }

    /// Raw pointer to the header for host reads.
    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    /// Raw pointer to agent data for host reads.
    pub fn agents_ptr(&self) -> *const f32 {
        self.agents.as_ptr() as *const f32
    }
}
