use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a simulation. All of them are fatal at startup;
/// a running simulation never fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("layer {layer} has {len} tiles, not a multiple of {columns} columns")]
    Layer { layer: usize, len: usize, columns: u32 },
}

/// Configuration for the simulation, usually loaded from JSON by the host.
///
/// Every section falls back to its defaults, so `{}` is a valid document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in pixels.
    pub world_width: f32,
    /// World height in pixels.
    pub world_height: f32,
    /// Seed for the world RNG. `None` draws one from entropy at startup.
    pub seed: Option<u64>,
    pub physics: PhysicsConfig,
    pub population: PopulationConfig,
    pub animation: AnimationPacing,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 4800.0,
            world_height: 480.0,
            seed: None,
            physics: PhysicsConfig::default(),
            population: PopulationConfig::default(),
            animation: AnimationPacing::default(),
        }
    }
}

/// Per-tick physics constants. Velocities are in pixels per tick, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to `vy` every tick.
    pub gravity: f32,
    /// Upper bound on `vy`. Only the downward direction is clamped.
    pub max_fall_speed: f32,
    /// `vy` set by a jump. Negative is up.
    pub jump_impulse: f32,
    /// Magnitude of `vx` while walking.
    pub walk_speed: f32,
    /// Distance from a tile's top surface up to the agent's position anchor
    /// when standing on it. The sprite anchor sits this far above the feet
    /// of the 32px art; the hitbox is measured from the same anchor.
    pub landing_offset: i32,
    pub hitbox: Hitbox,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            max_fall_speed: 5.0,
            jump_impulse: -7.0,
            walk_speed: 1.0,
            landing_offset: 22,
            hitbox: Hitbox::default(),
        }
    }
}

/// Agent collision box, anchored at the agent position (top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hitbox {
    pub width: i32,
    pub height: i32,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self { width: 32, height: 32 }
    }
}

/// Horizontal range `[min_x, max_x)` in which new agents appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnBand {
    pub min_x: i32,
    pub max_x: i32,
}

impl SpawnBand {
    pub fn new(min_x: i32, max_x: i32) -> Self {
        Self { min_x, max_x }
    }

    pub fn contains(&self, x: i32) -> bool {
        x >= self.min_x && x < self.max_x
    }

    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Live agent count the population is topped up to every tick.
    pub target: usize,
    pub spawn_band: SpawnBand,
    /// World y at which new agents appear, above the initial walkable surface.
    pub spawn_height: i32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            target: 200,
            // 25 tiles of 16px: the first screen of the level.
            spawn_band: SpawnBand::new(0, 400),
            spawn_height: 20,
        }
    }
}

/// How fast the sprite strips advance, in simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationPacing {
    /// Frames in the run strip.
    pub run_frames: u32,
    /// Ticks between run frames.
    pub run_ticks_per_frame: u32,
    /// Frames in the idle strip.
    pub idle_frames: u32,
    /// Idle decisions between idle frames.
    pub idle_rests_per_frame: u32,
}

impl Default for AnimationPacing {
    fn default() -> Self {
        Self {
            run_frames: 5,
            run_ticks_per_frame: 5,
            idle_frames: 3,
            idle_rests_per_frame: 10,
        }
    }
}

impl SimConfig {
    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid("fixed_dt must be positive"));
        }
        let p = &self.physics;
        if !(p.gravity.is_finite() && p.gravity > 0.0) {
            return Err(ConfigError::Invalid("gravity must be positive"));
        }
        if !(p.max_fall_speed.is_finite() && p.max_fall_speed > 0.0) {
            return Err(ConfigError::Invalid("max_fall_speed must be positive"));
        }
        if !p.jump_impulse.is_finite() || !p.walk_speed.is_finite() || p.walk_speed < 0.0 {
            return Err(ConfigError::Invalid(
                "jump_impulse must be finite and walk_speed non-negative",
            ));
        }
        if p.hitbox.width <= 0 || p.hitbox.height <= 0 {
            return Err(ConfigError::Invalid("hitbox must have a positive size"));
        }
        if self.population.spawn_band.is_empty() {
            return Err(ConfigError::Invalid("spawn_band must not be empty"));
        }
        let a = &self.animation;
        if a.run_frames == 0 || a.idle_frames == 0 {
            return Err(ConfigError::Invalid("animation strips need at least one frame"));
        }

        // Accepted, but a landed agent will not stay in contact with the tile
        // and bounces between falling and landing.
        if p.landing_offset >= p.hitbox.height {
            log::warn!(
                "landing_offset {} >= hitbox height {}: agents will hover above tiles",
                p.landing_offset,
                p.hitbox.height
            );
        }
        Ok(())
    }
}
