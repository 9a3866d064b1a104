use critter_sim::{
    AgentId, ConfigError, FixedTimestep, LevelDesc, ProtocolLayout, SimClock, SimConfig,
    Simulation, SnapshotBuffer, TileGrid,
};

/// Drives the simulation from the host's frame callback.
///
/// Frame time goes through a fixed-timestep accumulator, so the simulation
/// runs at `fixed_dt` no matter how fast the host renders. After the ticks
/// for a frame have run, the snapshot buffer is rebuilt for the renderer.
pub struct SimRunner {
    sim: Simulation,
    timestep: FixedTimestep,
    clock: SimClock,
    snapshot: SnapshotBuffer,
}

impl SimRunner {
    pub fn new(config: SimConfig, grid: TileGrid) -> Result<Self, ConfigError> {
        // The clock is built from `fixed_dt` before the simulation sees the config.
        config.validate()?;
        let timestep = FixedTimestep::new(config.fixed_dt);
        let clock = SimClock::from_dt(config.fixed_dt);
        let snapshot = SnapshotBuffer::new(ProtocolLayout::from_config(&config));
        let sim = Simulation::new(config, grid)?;
        Ok(Self {
            sim,
            timestep,
            clock,
            snapshot,
        })
    }

    /// Build from the JSON documents the host ships: config and level.
    /// `default_seed` seeds the world when the config names no seed.
    pub fn from_json(
        config_json: &str,
        level_json: &str,
        default_seed: u64,
    ) -> Result<Self, ConfigError> {
        let mut config = SimConfig::from_json(config_json)?;
        config.seed.get_or_insert(default_seed);
        let grid = LevelDesc::from_json(level_json)?.build()?;
        Self::new(config, grid)
    }

    /// Run one frame: as many fixed ticks as the frame time covers, then
    /// rebuild the snapshot buffer. Returns the number of ticks run.
    pub fn tick(&mut self, frame_dt: f32) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            let now = self.clock.tick();
            self.sim.advance(now);
        }
        self.snapshot.rebuild(&self.sim, self.clock.now());
        steps
    }

    /// Death signalled by the combat side of the game.
    pub fn kill(&mut self, id: u32) -> bool {
        self.sim.kill(AgentId(id))
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn snapshot(&self) -> &SnapshotBuffer {
        &self.snapshot
    }

    // ---- Pointer accessors for host reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.snapshot.header_ptr()
    }

    pub fn agents_ptr(&self) -> *const f32 {
        self.snapshot.agents_ptr()
    }

    pub fn agent_count(&self) -> u32 {
        self.snapshot.agent_count()
    }

    pub fn alive_count(&self) -> u32 {
        self.sim.alive_count() as u32
    }

    pub fn max_agents(&self) -> u32 {
        self.snapshot.layout().max_agents as u32
    }
}
