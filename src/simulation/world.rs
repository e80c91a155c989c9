//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the road network, the commuters, the cameras, the
//! treasury and the clock, and runs every system once per tick in a fixed
//! order:
//!
//! 1. queued player commands
//! 2. time (clock, spawn and billing triggers)
//! 3. commuters (spawn, plan, move, collide)
//! 4. law enforcement
//! 5. economy

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use super::clock::{Clock, Periodic, TickSpan};
use super::command::{Command, CommandOutcome, CommandResult};
use super::commuter_engine::{Arrival, Collision, CommuterEngine};
use super::config::{SimConfig, MIN_COMMUTER_SPEED};
use super::economy::{Economy, Settlement, Treasury};
use super::error::SimResult;
use super::law::{LawEnforcement, Violation};
use super::level::LevelData;
use super::road_network::SimRoadNetwork;
use super::stats::{HudSnapshot, SimulationStats};
use super::types::{CityId, CommuterId, SimId};

/// Everything that happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub span: TickSpan,
    /// Queued commands applied at the start of the tick
    pub commands: Vec<CommandResult>,
    /// Commuters created by periodic spawning
    pub spawned: Vec<CommuterId>,
    /// Idle commuters that started a route
    pub departed: Vec<CommuterId>,
    pub arrivals: Vec<Arrival>,
    pub stranded: Vec<(CommuterId, CityId)>,
    pub collisions: Vec<Collision>,
    pub violations: Vec<Violation>,
    pub settlement: Settlement,
    pub balance_before: i64,
    pub balance_after: i64,
}

impl TickReport {
    /// One crash sound per collision
    pub fn crash_cues(&self) -> usize {
        self.collisions.len()
    }
}

/// The main simulation world
pub struct SimWorld {
    /// Road network for pathfinding
    pub road_network: SimRoadNetwork,

    /// All live commuters
    pub commuters: CommuterEngine,

    /// All speed cameras
    pub law: LawEnforcement,

    pub stats: SimulationStats,

    pub(super) economy: Economy,

    pub(super) clock: Clock,

    pub(super) config: SimConfig,

    spawn_timer: Periodic,

    billing_timer: Periodic,

    /// Commands waiting for the start of the next tick
    pending: VecDeque<Command>,

    /// Next ID to assign
    next_id: usize,

    rng: StdRng,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new SimWorld with a specific RNG seed
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_config(SimConfig {
            seed,
            ..SimConfig::default()
        })
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            road_network: SimRoadNetwork::new(),
            commuters: CommuterEngine::new(),
            law: LawEnforcement::new(),
            stats: SimulationStats::default(),
            economy: Economy::new(config.economy.clone()),
            clock: Clock::new(config.tick_duration),
            spawn_timer: Periodic::new(config.spawn_interval),
            billing_timer: Periodic::new(config.billing_interval),
            pending: VecDeque::new(),
            next_id: 0,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Create a world seeded with a level's cities
    pub fn from_level(level: &LevelData, config: SimConfig) -> Self {
        let mut world = Self::with_config(config);
        let built = world.seed_from_level(level);
        info!(
            "Loaded level with {} of {} cities",
            built.len(),
            level.cities.len()
        );
        world
    }

    pub(super) fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn treasury(&self) -> &Treasury {
        self.economy.treasury()
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Queue a command for the start of the next tick
    pub fn queue(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Apply a command right away
    pub fn apply(&mut self, command: &Command) -> SimResult<CommandOutcome> {
        match *command {
            Command::BuildCity { x, y } => self.build_city(x, y).map(CommandOutcome::CityBuilt),
            Command::BuildRoad {
                from,
                to,
                speed_limit,
            } => {
                let limit = speed_limit.unwrap_or(self.config.default_speed_limit);
                self.build_road_with_limit(from, to, limit)
                    .map(CommandOutcome::RoadBuilt)
            }
            Command::BuildTwoWayRoad { a, b } => self
                .build_two_way_road(a, b)
                .map(|(forward, backward)| CommandOutcome::TwoWayRoadBuilt(forward, backward)),
            Command::BuildSpeedCamera { road, threshold } => self
                .build_speed_camera(road, threshold)
                .map(CommandOutcome::CameraBuilt),
            Command::SpawnCommuter {
                origin,
                destination,
                speed,
            } => self
                .spawn_commuter(origin, destination, speed)
                .map(CommandOutcome::CommuterSpawned),
            Command::RemoveRoad { road } => self
                .remove_road(road)
                .map(|_| CommandOutcome::RoadRemoved(road)),
        }
    }

    fn apply_pending(&mut self) -> Vec<CommandResult> {
        let mut results = Vec::with_capacity(self.pending.len());
        while let Some(command) = self.pending.pop_front() {
            let outcome = self.apply(&command);
            if let Err(err) = &outcome {
                warn!("Rejected {:?}: {}", command, err);
            }
            results.push(CommandResult { command, outcome });
        }
        results
    }

    fn random_speed(&mut self) -> f32 {
        let min = self.config.min_commuter_speed;
        let max = self.config.max_commuter_speed;
        if !min.is_finite() {
            return MIN_COMMUTER_SPEED;
        }
        if !max.is_finite() || max <= min {
            return min.max(0.0);
        }
        self.rng.random_range(min..=max)
    }

    /// Spawn one commuter per city towards a random other city
    fn spawn_periodic(&mut self) -> Vec<CommuterId> {
        let cities: Vec<CityId> = self.road_network.cities().map(|city| city.id).collect();
        if cities.len() < 2 {
            return Vec::new();
        }

        let mut spawned = Vec::new();
        for &origin in &cities {
            if self.commuters.idle_at(origin) >= self.config.max_idle_per_city {
                continue;
            }

            let candidates: Vec<CityId> = cities
                .iter()
                .copied()
                .filter(|city| *city != origin)
                .collect();
            let Some(&destination) = candidates.choose(&mut self.rng) else {
                continue;
            };
            let speed = self.random_speed();

            match self.spawn_commuter(origin, destination, speed) {
                Ok(id) => spawned.push(id),
                Err(err) => warn!("Periodic spawn at {} failed: {}", origin, err),
            }
        }
        spawned
    }

    /// Main simulation tick
    pub fn tick(&mut self, delta_secs: f32) -> TickReport {
        self.economy.begin_tick();
        let balance_before = self.economy.treasury().balance();

        let commands = self.apply_pending();

        let span = self.clock.advance(delta_secs);
        let spawn_due = self.spawn_timer.fired(span);
        let billing_due = self.billing_timer.fired(span);

        let spawned = if spawn_due {
            self.spawn_periodic()
        } else {
            Vec::new()
        };

        let clearance = self.config.collision_distance;
        let departed = self.commuters.plan_idle(&mut self.road_network, clearance);
        let movement = self.commuters.advance(delta_secs, &mut self.road_network);
        let collisions = self
            .commuters
            .detect_collisions(&mut self.road_network, clearance);

        let violations = self
            .law
            .inspect(&self.road_network, &self.commuters, span.to);

        let upkeep_due = billing_due.then(|| {
            self.economy
                .upkeep_for(self.road_network.road_count(), self.law.camera_count())
        });
        let settlement = self
            .economy
            .settle(&violations, movement.arrivals.len(), upkeep_due);

        self.stats.total_commuters_arrived += movement.arrivals.len() as u64;
        self.stats.total_collisions += collisions.len() as u64;
        self.stats.total_commuters_collided += 2 * collisions.len() as u64;
        self.stats.total_commuters_removed += movement.lost.len() as u64;
        self.stats.total_violations += violations.len() as u64;
        self.stats.fines_collected += settlement.fines;
        self.stats.revenue_collected += settlement.revenue;
        self.stats.upkeep_billed += settlement.upkeep;

        let balance_after = self.economy.treasury().balance();
        debug!(
            "Tick {}: {} spawned, {} arrived, {} crashes, {} violations, balance {} -> {}",
            span.to,
            spawned.len(),
            movement.arrivals.len(),
            collisions.len(),
            violations.len(),
            balance_before,
            balance_after
        );

        TickReport {
            span,
            commands,
            spawned,
            departed,
            arrivals: movement.arrivals,
            stranded: movement.stranded,
            collisions,
            violations,
            settlement,
            balance_before,
            balance_after,
        }
    }

    /// Read-only view for the HUD
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            balance: self.economy.treasury().balance(),
            tick: self.clock.tick(),
            elapsed_secs: self.clock.elapsed(),
            idle_commuters: self.commuters.idle_count(),
            traveling_commuters: self.commuters.traveling_count(),
            cities: self.road_network.city_count(),
            roads: self.road_network.road_count(),
            cameras: self.law.camera_count(),
            shortfall: self.economy.treasury().shortfall(),
        }
    }

    /// Log a summary of the world state
    pub fn print_summary(&self) {
        let hud = self.hud();
        info!(
            "Tick {} ({:.1}s) | Cities: {}, Roads: {}, Cameras: {}",
            hud.tick, hud.elapsed_secs, hud.cities, hud.roads, hud.cameras
        );
        info!(
            "Commuters: {} idle, {} traveling | {}",
            hud.idle_commuters,
            hud.traveling_commuters,
            self.economy.treasury().summary()
        );
    }
}
