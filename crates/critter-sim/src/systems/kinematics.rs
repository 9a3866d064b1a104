//! Gravity, tile landing and position integration.

use glam::IVec2;

use crate::api::config::PhysicsConfig;
use crate::components::agent::Agent;
use crate::components::tilemap::{CollisionInfo, TileGrid};

/// Accumulate gravity into `vy`, clamped to the maximum fall speed.
pub fn apply_gravity(agent: &mut Agent, physics: &PhysicsConfig) {
    agent.velocity.y += physics.gravity;
    if agent.velocity.y > physics.max_fall_speed {
        agent.velocity.y = physics.max_fall_speed;
    }
}

/// Land the agent if its hitbox overlaps a solid tile while not rising.
///
/// Landing zeroes `vy` and puts the anchor `landing_offset` above the tile's
/// surface. An agent still rising from a jump passes through untouched.
/// Returns the collision when the agent landed.
pub fn resolve_landing(
    agent: &mut Agent,
    grid: &TileGrid,
    physics: &PhysicsConfig,
) -> Option<CollisionInfo> {
    if agent.velocity.y < 0.0 {
        return None;
    }
    let hit = grid.collides(&agent.bounds(&physics.hitbox))?;
    agent.velocity.y = 0.0;
    agent.position.y = hit.surface_y - physics.landing_offset;
    Some(hit)
}

/// Move by one tick of velocity. Fractions are truncated toward zero, so a
/// `vy` of -6.7 moves up 6 pixels and 0.9 does not move at all. Positions
/// saturate at the `i32` limits, where an agent falling forever ends up.
pub fn integrate(agent: &mut Agent) {
    let step = IVec2::new(agent.velocity.x as i32, agent.velocity.y as i32);
    agent.position = agent.position.saturating_add(step);
}
