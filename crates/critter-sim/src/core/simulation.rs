//! One simulation tick over the whole population.

use std::time::Duration;

use rand::rngs::SmallRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::api::config::{ConfigError, SimConfig};
use crate::api::types::{AgentId, AgentSnapshot, StepReport};
use crate::components::agent::Agent;
use crate::components::tilemap::TileGrid;
use crate::core::population::Population;
use crate::core::rng;
use crate::systems::animation::advance_frames;
use crate::systems::behaviour::reevaluate;
use crate::systems::kinematics::{apply_gravity, integrate, resolve_landing};
use crate::systems::policy::{ActionPolicy, UniformPolicy};

/// What happened to a single agent during its update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStep {
    pub landed: bool,
    pub decided: bool,
}

/// Update one live agent: gravity, landing, action re-evaluation,
/// integration, animation pacing. Reads nothing but the agent, the grid and
/// the config, so agents can be updated in any order or in parallel.
pub fn step_agent(
    agent: &mut Agent,
    grid: &TileGrid,
    config: &SimConfig,
    policy: &dyn ActionPolicy,
    now: Duration,
) -> AgentStep {
    let physics = &config.physics;
    apply_gravity(agent, physics);
    let landed = resolve_landing(agent, grid, physics).is_some();
    let decided = reevaluate(agent, policy, physics, now).is_some();
    integrate(agent);
    advance_frames(agent, &config.animation);
    AgentStep { landed, decided }
}

/// The simulation core: tile grid, population, action policy and world RNG.
pub struct Simulation {
    config: SimConfig,
    grid: TileGrid,
    population: Population,
    policy: Box<dyn ActionPolicy>,
    rng: SmallRng,
    seed: u64,
    ticks: u64,
}

impl Simulation {
    /// Validate the config and seed the world RNG. The population starts empty
    /// and is filled at the end of the first tick.
    pub fn new(config: SimConfig, grid: TileGrid) -> Result<Self, ConfigError> {
        config.validate()?;
        let (rng, seed) = rng::seeded_rng(config.seed);
        log::info!(
            "simulation created: target population {}, seed {:#x}",
            config.population.target,
            seed
        );

        let band = config.population.spawn_band;
        if grid.surface_below(band.min_x, config.population.spawn_height).is_none() {
            log::debug!(
                "no ground below x = {}; agents spawned there fall forever",
                band.min_x
            );
        }

        Ok(Self {
            population: Population::with_capacity(config.population.target),
            config,
            grid,
            policy: Box::new(UniformPolicy),
            rng,
            seed,
            ticks: 0,
        })
    }

    /// Replace the default uniform action policy.
    pub fn with_policy(mut self, policy: impl ActionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Run one tick at simulation time `now`.
    ///
    /// Every live agent is updated, dead ones are left untouched. The
    /// population is then topped up using the alive count taken after the
    /// agent pass.
    pub fn advance(&mut self, now: Duration) -> StepReport {
        let grid = &self.grid;
        let config = &self.config;
        let policy = self.policy.as_ref();
        let slots = self.population.slots_mut();

        #[cfg(not(feature = "parallel"))]
        let steps: Vec<AgentStep> = slots
            .iter_mut()
            .filter(|a| a.is_alive())
            .map(|a| step_agent(a, grid, config, policy, now))
            .collect();

        // The collect is the barrier: every agent is done before the top-up.
        #[cfg(feature = "parallel")]
        let steps: Vec<AgentStep> = slots
            .par_iter_mut()
            .filter(|a| a.is_alive())
            .map(|a| step_agent(a, grid, config, policy, now))
            .collect();

        let alive = self.population.alive_count();
        let spawned = self
            .population
            .top_up(alive, &self.config.population, &mut self.rng);
        self.ticks += 1;

        let report = StepReport {
            updated: steps.len(),
            landed: steps.iter().filter(|s| s.landed).count(),
            decided: steps.iter().filter(|s| s.decided).count(),
            spawned: spawned.len(),
            alive: alive + spawned.len(),
        };
        log::trace!("tick {} at {:?}: {:?}", self.ticks, now, report);
        report
    }

    /// Mark an agent dead. It stays frozen until its slot is reused.
    pub fn kill(&mut self, id: AgentId) -> bool {
        let killed = self.population.kill(id);
        if killed {
            log::debug!("agent {} killed", id.0);
        }
        killed
    }

    pub fn alive_count(&self) -> usize {
        self.population.alive_count()
    }

    /// Snapshots of every slot, dead ones flagged.
    pub fn snapshots(&self) -> impl Iterator<Item = AgentSnapshot> + '_ {
        self.population.snapshots()
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Direct access for hosts that place agents themselves.
    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The seed the world RNG was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed `advance` calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::SpawnBand;
    use crate::components::tilemap::Tile;
    use crate::core::time::SimClock;
    use crate::systems::policy::Action;
    use glam::{IVec2, Vec2};
    use rand::SeedableRng;

    const FAR_FUTURE: Duration = Duration::from_secs(3600);

    fn floor_world() -> TileGrid {
        // 25 tiles wide, solid row at y = 160.
        let mut grid = TileGrid::new(25, 12, 16);
        grid.fill_rect(0, 10, 25, 2, Some(Tile::solid(45)));
        grid
    }

    fn seeded(target: usize) -> SimConfig {
        let mut config = SimConfig::default();
        config.seed = Some(1234);
        config.population.target = target;
        config.population.spawn_band = SpawnBand::new(0, 368);
        config
    }

    fn idle_agent(x: i32, y: i32) -> Agent {
        Agent::new(AgentId(0), IVec2::new(x, y), SmallRng::seed_from_u64(1))
            .with_action(Action::Idle, FAR_FUTURE)
    }

    #[test]
    fn falls_onto_single_tile_on_first_overlap() {
        let config = SimConfig::default();
        let offset = config.physics.landing_offset;
        let height = config.physics.hitbox.height;
        let mut grid = TileGrid::new(1, 1, 16).with_origin(IVec2::new(0, 100));
        grid.set(0, 0, Some(Tile::solid(1)));

        let mut agent = idle_agent(8, 50);
        let mut clock = SimClock::from_dt(config.fixed_dt);
        let mut landed_on = None;

        for tick in 0..200 {
            let touching = agent.position.y + height > 100;
            let step = step_agent(&mut agent, &grid, &config, &UniformPolicy, clock.tick());
            assert_eq!(step.landed, touching, "tick {}", tick);
            if touching {
                assert_eq!(agent.velocity.y, 0.0);
                assert_eq!(agent.position.y, 100 - offset);
                landed_on = Some(tick);
                break;
            }
            assert!(agent.velocity.y > 0.0, "tick {}: vy reset before touching", tick);
        }
        assert!(landed_on.is_some(), "agent never reached the tile");

        // Standing still from then on.
        for _ in 0..30 {
            step_agent(&mut agent, &grid, &config, &UniformPolicy, clock.tick());
            assert_eq!(agent.position.y, 100 - offset);
            assert_eq!(agent.velocity.y, 0.0);
        }
    }

    #[test]
    fn free_fall_velocity_matches_closed_form() {
        let config = SimConfig::default();
        let grid = TileGrid::new(0, 0, 16);
        let mut agent = idle_agent(0, 0).with_velocity(Vec2::new(0.0, -2.0));
        for n in 1..=60 {
            step_agent(&mut agent, &grid, &config, &UniformPolicy, Duration::ZERO);
            let physics = &config.physics;
            let expected = (-2.0 + n as f32 * physics.gravity).min(physics.max_fall_speed);
            assert!((agent.velocity.y - expected).abs() < 1e-4, "tick {}", n);
        }
    }

    #[test]
    fn jump_leaves_the_ground_and_lands_again() {
        let config = SimConfig::default();
        let grid = floor_world();
        let ground = 160 - config.physics.landing_offset;
        let mut agent = idle_agent(40, ground);

        // Settle, then force a jump decision.
        step_agent(&mut agent, &grid, &config, &UniformPolicy, Duration::ZERO);
        assert_eq!(agent.position.y, ground);
        crate::systems::behaviour::apply_action(&mut agent, Action::Jump, &config.physics);

        let mut apex = ground;
        for _ in 0..120 {
            step_agent(&mut agent, &grid, &config, &UniformPolicy, Duration::ZERO);
            apex = apex.min(agent.position.y);
            if agent.velocity.y == 0.0 && agent.position.y == ground {
                break;
            }
        }
        assert!(apex < ground - 20, "apex {} barely left ground {}", apex, ground);
        assert_eq!(agent.position.y, ground);
    }

    #[test]
    fn first_advance_fills_population() {
        let mut sim = Simulation::new(seeded(200), floor_world()).unwrap();
        assert_eq!(sim.alive_count(), 0);

        let report = sim.advance(Duration::ZERO);
        assert_eq!(report.updated, 0);
        assert_eq!(report.spawned, 200);
        assert_eq!(report.alive, 200);
        assert_eq!(sim.alive_count(), 200);
        assert_eq!(sim.ticks(), 1);

        // Everyone decides on the next tick.
        let report = sim.advance(Duration::from_millis(16));
        assert_eq!(report.updated, 200);
        assert_eq!(report.decided, 200);
        assert_eq!(report.spawned, 0);
    }

    #[test]
    fn killed_agents_are_replaced_in_their_slots() {
        let mut sim = Simulation::new(seeded(20), floor_world()).unwrap();
        let mut clock = SimClock::from_dt(sim.config().fixed_dt);
        sim.advance(clock.tick());
        for id in [AgentId(3), AgentId(11)] {
            assert!(sim.kill(id));
        }
        assert_eq!(sim.alive_count(), 18);

        let report = sim.advance(clock.tick());
        assert_eq!(report.updated, 18);
        assert_eq!(report.spawned, 2);
        assert_eq!(sim.alive_count(), 20);
        assert_eq!(sim.population().len(), 20);
    }

    #[test]
    fn dead_agents_are_frozen() {
        // Target 0 so no top-up reuses the dead slot.
        let mut sim = Simulation::new(seeded(0), floor_world()).unwrap();
        let falling = idle_agent(100, 10).with_velocity(Vec2::new(1.0, 2.0));
        let id = sim.population_mut().insert(falling);
        let live = sim.population_mut().insert(idle_agent(200, 10));
        sim.kill(id);

        let before = sim.population().get(id).unwrap().clone();
        let mut clock = SimClock::from_dt(sim.config().fixed_dt);
        for _ in 0..500 {
            sim.advance(clock.tick());
        }
        let after = sim.population().get(id).unwrap();
        assert!(!after.is_alive());
        assert_eq!(after.position, before.position);
        assert_eq!(after.velocity, before.velocity);
        assert_eq!(after.action, before.action);
        assert_eq!(after.action_expiry, before.action_expiry);
        assert_eq!(after.frame_counter, before.frame_counter);

        // The live one did move.
        assert_ne!(sim.population().get(live).unwrap().position, IVec2::new(200, 10));
    }

    #[test]
    fn resting_agents_never_walk() {
        let mut sim = Simulation::new(seeded(50), floor_world()).unwrap();
        let mut clock = SimClock::from_dt(sim.config().fixed_dt);
        for _ in 0..600 {
            sim.advance(clock.tick());
            for agent in sim.population().alive() {
                if agent.is_resting {
                    assert_eq!(agent.velocity.x, 0.0, "agent {:?}", agent.id);
                }
            }
        }
    }

    #[test]
    fn vertical_speed_never_exceeds_max_fall() {
        let mut sim = Simulation::new(seeded(50), floor_world()).unwrap();
        let max = sim.config().physics.max_fall_speed;
        let mut clock = SimClock::from_dt(sim.config().fixed_dt);
        for _ in 0..300 {
            sim.advance(clock.tick());
            assert!(sim.population().alive().all(|a| a.velocity.y <= max));
        }
    }

    #[test]
    fn same_seed_same_world() {
        let mut a = Simulation::new(seeded(40), floor_world()).unwrap();
        let mut b = Simulation::new(seeded(40), floor_world()).unwrap();
        let mut clock = SimClock::from_dt(a.config().fixed_dt);
        for i in 0..400 {
            let now = clock.tick();
            a.advance(now);
            b.advance(now);
            if i == 100 {
                a.kill(AgentId(7));
                b.kill(AgentId(7));
            }
        }
        let sa: Vec<AgentSnapshot> = a.snapshots().collect();
        let sb: Vec<AgentSnapshot> = b.snapshots().collect();
        assert_eq!(sa, sb);
        assert_eq!(a.seed(), 1234);
    }

    #[test]
    fn agent_updates_do_not_depend_on_order() {
        let config = seeded(0);
        let grid = floor_world();
        let make = |n: u64| {
            (0..n)
                .map(|i| {
                    let position = IVec2::new(16 * i as i32, 20);
                    Agent::new(AgentId(i as u32), position, SmallRng::seed_from_u64(i))
                })
                .collect::<Vec<_>>()
        };
        let mut forward = make(8);
        let mut backward = make(8);

        let mut clock = SimClock::from_dt(config.fixed_dt);
        for _ in 0..240 {
            let now = clock.tick();
            for agent in forward.iter_mut() {
                step_agent(agent, &grid, &config, &UniformPolicy, now);
            }
            for agent in backward.iter_mut().rev() {
                step_agent(agent, &grid, &config, &UniformPolicy, now);
            }
        }
        for (f, b) in forward.iter().zip(&backward) {
            assert_eq!(f.snapshot(), b.snapshot());
        }
    }

    /// Always picks the same action for the same duration.
    struct Always(Action);

    impl ActionPolicy for Always {
        fn decide(&self, _rng: &mut dyn rand::RngCore) -> crate::systems::policy::Decision {
            crate::systems::policy::Decision {
                action: self.0,
                duration: Duration::from_secs(10),
            }
        }
    }

    #[test]
    fn injected_policy_drives_every_agent() {
        let mut sim = Simulation::new(seeded(20), floor_world())
            .unwrap()
            .with_policy(Always(Action::MoveLeft));
        let walk = sim.config().physics.walk_speed;
        let mut clock = SimClock::from_dt(sim.config().fixed_dt);

        let first = sim.advance(clock.tick());
        assert_eq!(first.spawned, 20);

        let second = sim.advance(clock.tick());
        assert_eq!(second.updated, 20);
        assert_eq!(second.decided, 20);
        for agent in sim.population().alive() {
            assert_eq!(agent.action, Action::MoveLeft);
            assert!(agent.facing_left);
            assert!(!agent.is_resting);
            assert_eq!(agent.velocity.x, -walk);
        }

        // Ten-second actions: nothing is due again for a while.
        let third = sim.advance(clock.tick());
        assert_eq!(third.decided, 0);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = SimConfig::default();
        config.population.spawn_band = SpawnBand::new(10, 0);
        assert!(matches!(
            Simulation::new(config, floor_world()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
