use std::time::Duration;

/// Most fixed steps run for a single frame; the rest of a long frame is dropped.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed timestep accumulator.
/// Turns variable frame deltas into a whole number of simulation ticks, so the
/// simulation rate does not follow the display rate.
pub struct FixedTimestep {
    /// The fixed delta time per tick, in seconds.
    dt: f32,
    /// Frame time not yet consumed by a tick.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        // Paused tabs and clock hiccups can hand us garbage.
        if !(frame_dt.is_finite() && frame_dt > 0.0) {
            return 0;
        }
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death
        self.accumulator = self.accumulator.min(self.dt * MAX_STEPS_PER_FRAME as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }
}

/// Monotonic simulation clock, advanced one fixed step per tick.
/// Action expiries are compared against this, never against the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    now: Duration,
    step: Duration,
    ticks: u64,
}

impl SimClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
            ticks: 0,
        }
    }

    /// Clock stepping by `dt` seconds.
    pub fn from_dt(dt: f32) -> Self {
        Self::new(Duration::from_secs_f32(dt))
    }

    /// Advance by one step and return the new time.
    pub fn tick(&mut self) -> Duration {
        self.now += self.step;
        self.ticks += 1;
        self.now
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
