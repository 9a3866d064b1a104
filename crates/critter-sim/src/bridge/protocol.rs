//! Snapshot buffer layout shared with the host renderer.
//! Must stay in sync with the host-side reader.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 8 floats]
//! [Agents: max_agents × 8 floats]
//! ```
//!
//! Agent slots never outnumber the target population, so the target is the
//! capacity. The host reads it from the header once at init.

use crate::api::config::SimConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_TICK: usize = 1;
pub const HEADER_MAX_AGENTS: usize = 2;
pub const HEADER_AGENT_COUNT: usize = 3;
pub const HEADER_ALIVE_COUNT: usize = 4;
pub const HEADER_WORLD_WIDTH: usize = 5;
pub const HEADER_WORLD_HEIGHT: usize = 6;
pub const HEADER_SIM_TIME: usize = 7;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per agent record (wire format, never changes).
pub const AGENT_FLOATS: usize = 8;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    /// Maximum agent records.
    pub max_agents: usize,
    /// Size of agent data section in floats.
    pub agent_data_floats: usize,
    /// Offset (in floats) where agent data begins.
    pub agent_data_offset: usize,
    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_agents: usize) -> Self {
        let agent_data_floats = max_agents * AGENT_FLOATS;
        let agent_data_offset = HEADER_FLOATS;
        let buffer_total_floats = agent_data_offset + agent_data_floats;
        Self {
            max_agents,
            agent_data_floats,
            agent_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a SimConfig.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.population.target)
    }
}
