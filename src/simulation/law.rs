//! Speed enforcement
//!
//! Speed cameras watch a single road each. Every tick the law layer
//! inspects the commuters on each watched road and reports the ones over
//! the camera's threshold.

use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

use super::commuter_engine::CommuterEngine;
use super::road_network::SimRoadNetwork;
use super::types::{CameraId, CommuterId, RoadId};

/// A speed camera attached to a road
#[derive(Debug, Clone)]
pub struct SpeedCamera {
    pub id: CameraId,
    pub road: RoadId,
    /// Commuters strictly faster than this are fined
    pub threshold: f32,
}

impl SpeedCamera {
    pub fn new(id: CameraId, road: RoadId, threshold: f32) -> Self {
        Self {
            id,
            road,
            threshold,
        }
    }
}

/// A commuter caught over a camera's threshold
///
/// Produced by the law layer and consumed exactly once by the economy.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub commuter: CommuterId,
    pub camera: CameraId,
    pub road: RoadId,
    pub observed_speed: f32,
    pub threshold: f32,
    pub tick: u64,
}

/// The set of cameras, kept in creation order
#[derive(Debug, Default)]
pub struct LawEnforcement {
    cameras: BTreeMap<CameraId, SpeedCamera>,
}

impl LawEnforcement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_camera(&mut self, camera: SpeedCamera) {
        self.cameras.insert(camera.id, camera);
    }

    pub fn camera(&self, camera_id: CameraId) -> Option<&SpeedCamera> {
        self.cameras.get(&camera_id)
    }

    pub fn cameras(&self) -> impl Iterator<Item = &SpeedCamera> {
        self.cameras.values()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Cameras watching a road, in creation order
    pub fn cameras_on_road(&self, road_id: RoadId) -> Vec<CameraId> {
        self.cameras
            .values()
            .filter(|camera| camera.road == road_id)
            .map(|camera| camera.id)
            .collect()
    }

    /// Drop every camera watching a road that is being removed
    pub fn remove_cameras_on_road(&mut self, road_id: RoadId) -> Vec<CameraId> {
        let removed = self.cameras_on_road(road_id);
        for camera_id in &removed {
            self.cameras.remove(camera_id);
        }
        removed
    }

    /// Inspect every watched road and report speeding commuters
    ///
    /// A commuter is fined at most once per tick: when several cameras
    /// watch the same road, the oldest camera issues the violation.
    pub fn inspect(
        &self,
        road_network: &SimRoadNetwork,
        commuters: &CommuterEngine,
        tick: u64,
    ) -> Vec<Violation> {
        let mut fined: HashSet<CommuterId> = HashSet::new();
        let mut violations = Vec::new();

        for camera in self.cameras.values() {
            if road_network.road(camera.road).is_none() {
                warn!("{} watches missing {}, skipping", camera.id, camera.road);
                continue;
            }

            for (_, commuter_id) in road_network.commuters_on_road(camera.road) {
                let Some(commuter) = commuters.get(commuter_id) else {
                    continue;
                };
                if commuter.current_road() != Some(camera.road) {
                    continue;
                }

                if commuter.speed > camera.threshold && fined.insert(commuter_id) {
                    debug!(
                        "{} caught {} at {:.1} (limit {:.1})",
                        camera.id, commuter_id, commuter.speed, camera.threshold
                    );
                    violations.push(Violation {
                        commuter: commuter_id,
                        camera: camera.id,
                        road: camera.road,
                        observed_speed: commuter.speed,
                        threshold: camera.threshold,
                        tick,
                    });
                }
            }
        }

        violations
    }
}
