//! Player commands
//!
//! Input handlers translate clicks and key presses into commands. Queued
//! commands are applied at the start of the next tick so a tick never
//! sees the world change halfway through.

use super::error::SimResult;
use super::types::{CameraId, CityId, CommuterId, RoadId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BuildCity {
        x: f32,
        y: f32,
    },
    BuildRoad {
        from: CityId,
        to: CityId,
        /// Falls back to the configured default limit
        speed_limit: Option<f32>,
    },
    BuildTwoWayRoad {
        a: CityId,
        b: CityId,
    },
    BuildSpeedCamera {
        road: RoadId,
        /// Falls back to the road's speed limit
        threshold: Option<f32>,
    },
    SpawnCommuter {
        origin: CityId,
        destination: CityId,
        speed: f32,
    },
    RemoveRoad {
        road: RoadId,
    },
}

/// What a successful command produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    CityBuilt(CityId),
    RoadBuilt(RoadId),
    TwoWayRoadBuilt(RoadId, RoadId),
    CameraBuilt(CameraId),
    CommuterSpawned(CommuterId),
    RoadRemoved(RoadId),
}

/// A command together with how it went
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub command: Command,
    pub outcome: SimResult<CommandOutcome>,
}
