//! Timed action state machine: re-evaluation and immediate effects.

use std::time::Duration;

use crate::api::config::PhysicsConfig;
use crate::components::agent::Agent;
use crate::systems::policy::{Action, ActionPolicy, Decision};

/// Apply the immediate effect of `action` to the agent.
pub fn apply_action(agent: &mut Agent, action: Action, physics: &PhysicsConfig) {
    match action {
        Action::Jump => {
            agent.velocity.y = physics.jump_impulse;
        }
        Action::MoveLeft | Action::MoveRight => {
            let left = action == Action::MoveLeft;
            agent.facing_left = left;
            agent.velocity.x = if left { -physics.walk_speed } else { physics.walk_speed };
            agent.rest_counter = 0;
            agent.is_resting = false;
        }
        Action::Idle => {
            agent.velocity.x = 0.0;
            agent.rest_counter += 1;
            agent.is_resting = true;
        }
    }
    agent.action = action;
}

/// If the agent's action has expired, ask the policy for a new one, apply it
/// and schedule the next re-evaluation. Airborne agents switch too.
pub fn reevaluate(
    agent: &mut Agent,
    policy: &dyn ActionPolicy,
    physics: &PhysicsConfig,
    now: Duration,
) -> Option<Decision> {
    if !agent.action_due(now) {
        return None;
    }
    let decision = policy.decide(&mut agent.rng);
    apply_action(agent, decision.action, physics);
    agent.action_expiry = now + decision.duration;
    Some(decision)
}
