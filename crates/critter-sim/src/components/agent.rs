use std::time::Duration;

use glam::{IVec2, Vec2};
use rand::rngs::SmallRng;

use crate::api::config::Hitbox;
use crate::api::types::{AgentId, AgentSnapshot};
use crate::components::tilemap::Rect;
use crate::systems::policy::Action;

/// One simulated critter.
///
/// Position is in whole pixels and velocity in pixels per tick; the position
/// update truncates velocity toward zero.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Slot in the population arena.
    pub id: AgentId,
    alive: bool,
    /// Top-left anchor of the sprite and hitbox, in world pixels.
    pub position: IVec2,
    /// `x` is set by the action state machine, `y` accumulates gravity.
    pub velocity: Vec2,
    pub facing_left: bool,
    /// Idle decisions since the idle strip last advanced.
    pub rest_counter: u32,
    pub is_resting: bool,
    pub action: Action,
    /// Simulation time at which the action is re-evaluated.
    pub action_expiry: Duration,
    /// Ticks since the run strip last advanced.
    pub frame_counter: u32,
    pub run_frame: u32,
    pub idle_frame: u32,
    pub(crate) rng: SmallRng,
}

impl Agent {
    /// Create a live agent at `position`. Its action is already due, so the
    /// first tick it takes part in assigns a real one.
    pub fn new(id: AgentId, position: IVec2, rng: SmallRng) -> Self {
        Self {
            id,
            alive: true,
            position,
            velocity: Vec2::ZERO,
            facing_left: false,
            rest_counter: 0,
            is_resting: false,
            action: Action::Idle,
            action_expiry: Duration::ZERO,
            frame_counter: 0,
            run_frame: 0,
            idle_frame: 0,
            rng,
        }
    }

    // -- Builder pattern --

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Start with `action` already running until `expiry`, without applying its effect.
    pub fn with_action(mut self, action: Action, expiry: Duration) -> Self {
        self.action = action;
        self.action_expiry = expiry;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    /// Whether the current action is due for re-evaluation at `now`.
    pub fn action_due(&self, now: Duration) -> bool {
        now >= self.action_expiry
    }

    /// Collision box at the current position.
    pub fn bounds(&self, hitbox: &Hitbox) -> Rect {
        Rect::from_pos_size(self.position, IVec2::new(hitbox.width, hitbox.height))
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            facing_left: self.facing_left,
            is_resting: self.is_resting,
            frame_counter: self.frame_counter,
            frame: if self.is_resting { self.idle_frame } else { self.run_frame },
            alive: self.alive,
        }
    }
}
