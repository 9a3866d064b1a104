//! Action selection for the per-agent state machine.

use std::time::Duration;

use rand::{Rng, RngCore};

/// Behaviour an agent is carrying out until its action expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    MoveLeft,
    MoveRight,
    Idle,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Jump, Action::MoveLeft, Action::MoveRight, Action::Idle];

    /// Exclusive upper bound of the duration sampled for this action, in seconds.
    pub fn max_duration_secs(self) -> f32 {
        match self {
            Action::Jump | Action::MoveLeft | Action::MoveRight => 2.0,
            Action::Idle => 3.0,
        }
    }

    /// Sample how long this action lasts, uniform in `[0, max_duration_secs)`.
    pub fn sample_duration(self, rng: &mut dyn RngCore) -> Duration {
        let secs = rng.random_range(0.0..self.max_duration_secs());
        Duration::from_secs_f32(secs)
    }
}

/// An action together with how long it stays active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub duration: Duration,
}

/// Picks the next action for an agent whose current action has expired.
///
/// Implementations carry no per-agent state and can be shared across threads;
/// all randomness comes from the caller's generator.
pub trait ActionPolicy: Send + Sync {
    fn decide(&self, rng: &mut dyn RngCore) -> Decision;
}

/// Uniform choice over the four actions with the action's own duration range.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPolicy;

impl ActionPolicy for UniformPolicy {
    fn decide(&self, rng: &mut dyn RngCore) -> Decision {
        let action = Action::ALL[rng.random_range(0..Action::ALL.len())];
        Decision {
            action,
            duration: action.sample_duration(rng),
        }
    }
}
