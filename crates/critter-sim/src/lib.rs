pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod bridge;

// Re-export key types at crate root for convenience
pub use api::config::{
    AnimationPacing, ConfigError, Hitbox, PhysicsConfig, PopulationConfig, SimConfig, SpawnBand,
};
pub use api::types::{AgentId, AgentSnapshot, StepReport};
pub use components::agent::Agent;
pub use components::tilemap::{CollisionInfo, LevelDesc, Rect, SolidRange, Tile, TileGrid};
pub use crate::core::population::Population;
pub use crate::core::simulation::{step_agent, AgentStep, Simulation};
pub use crate::core::time::{FixedTimestep, SimClock};
pub use systems::policy::{Action, ActionPolicy, Decision, UniformPolicy};
pub use bridge::protocol::ProtocolLayout;
pub use bridge::snapshot::{AgentInstance, SnapshotBuffer};
