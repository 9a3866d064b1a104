//! Animation pacing. Only the counters live here; picking sprites is the renderer's job.

use crate::api::config::AnimationPacing;
use crate::components::agent::Agent;

/// Advance the agent's tick counter and step whichever strip is showing.
///
/// The run strip steps every `run_ticks_per_frame` ticks. The idle strip
/// steps once `idle_rests_per_frame` idle decisions have piled up.
pub fn advance_frames(agent: &mut Agent, pacing: &AnimationPacing) {
    agent.frame_counter += 1;
    if agent.is_resting {
        if agent.rest_counter >= pacing.idle_rests_per_frame {
            agent.rest_counter = 0;
            agent.idle_frame = (agent.idle_frame + 1) % pacing.idle_frames;
        }
    } else if agent.frame_counter >= pacing.run_ticks_per_frame {
        agent.frame_counter = 0;
        agent.run_frame = (agent.run_frame + 1) % pacing.run_frames;
    }
}
