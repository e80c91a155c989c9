//! Standalone traffic simulation module
//!
//! A city/road network populated by commuters, watched by speed cameras
//! and paid for from a single treasury. Everything here is deterministic
//! and tick-driven; presentation layers only read snapshots and reports.

mod clock;
mod command;
mod commuter;
mod commuter_engine;
mod config;
mod construction;
mod economy;
mod error;
mod law;
mod level;
mod road_network;
mod stats;
mod types;
mod world;

pub use clock::{Clock, Periodic, TickSpan};
pub use command::{Command, CommandOutcome, CommandResult};
pub use commuter::{CommuterState, CommuterUpdateResult, SimCommuter};
pub use commuter_engine::{Arrival, Collision, CommuterEngine, MovementOutcome};
pub use config::{
    SimConfig, BILLING_INTERVAL_TICKS, CITY_HEIGHT, CITY_WIDTH, COLLISION_DISTANCE,
    DEFAULT_SPEED_LIMIT, DEFAULT_TICK_DURATION, MAX_COMMUTER_SPEED, MAX_IDLE_PER_CITY,
    MIN_COMMUTER_SPEED, SPAWN_INTERVAL_TICKS,
};
pub use economy::{
    Economy, EconomyConfig, FinePolicy, Settlement, Shortfall, Treasury, COST_CITY, COST_ROAD,
    COST_SPEED_CAMERA, FINE_BASE, FINE_PER_UNIT_OVER, REVENUE_ARRIVAL, STARTING_BUDGET,
    TREASURY_FLOOR, UPKEEP_ROAD, UPKEEP_SPEED_CAMERA,
};
pub use error::{ErrorKind, SimError, SimResult};
pub use law::{LawEnforcement, SpeedCamera, Violation};
pub use level::{LevelCity, LevelData, WorldBounds, WORLD_PADDING};
pub use road_network::{RoadEdge, Route, SimRoadNetwork};
pub use stats::{HudSnapshot, SimulationStats};
pub use types::{CameraId, CityId, CommuterId, Position, RoadId, SimCity, SimId, SimRoad};
pub use world::{SimWorld, TickReport};
