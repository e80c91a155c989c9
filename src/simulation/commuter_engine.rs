//! Commuter lifecycle management
//!
//! Owns every live commuter and runs the per-tick phases: route planning
//! for idle commuters, movement, and collision detection. Terminal
//! commuters (arrived, collided, removed) are released from here.

use log::{debug, warn};
use std::collections::BTreeMap;

use super::commuter::{CommuterState, CommuterUpdateResult, SimCommuter};
use super::road_network::SimRoadNetwork;
use super::types::{CityId, CommuterId, RoadId};

/// A commuter that reached its destination this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub commuter: CommuterId,
    pub city: CityId,
    pub planned_length: f32,
    pub traveled_length: f32,
}

/// Two commuters that crashed this tick; each one is a crash cue
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub first: CommuterId,
    pub second: CommuterId,
    pub road: RoadId,
}

/// What the movement phase did
#[derive(Debug, Clone, Default)]
pub struct MovementOutcome {
    pub arrivals: Vec<Arrival>,
    pub stranded: Vec<(CommuterId, CityId)>,
    /// Commuters released because their road disappeared under them
    pub lost: Vec<CommuterId>,
}

#[derive(Debug, Default)]
pub struct CommuterEngine {
    commuters: BTreeMap<CommuterId, SimCommuter>,
}

impl CommuterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, commuter: SimCommuter) {
        self.commuters.insert(commuter.id, commuter);
    }

    pub fn get(&self, commuter_id: CommuterId) -> Option<&SimCommuter> {
        self.commuters.get(&commuter_id)
    }

    /// All live commuters in creation order
    pub fn commuters(&self) -> impl Iterator<Item = &SimCommuter> {
        self.commuters.values()
    }

    pub fn len(&self) -> usize {
        self.commuters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commuters.is_empty()
    }

    pub fn idle_count(&self) -> usize {
        self.commuters.values().filter(|c| c.is_idle()).count()
    }

    pub fn traveling_count(&self) -> usize {
        self.commuters.len() - self.idle_count()
    }

    /// Idle commuters waiting at a city
    pub fn idle_at(&self, city_id: CityId) -> usize {
        self.commuters
            .values()
            .filter(|c| c.waiting_at() == Some(city_id))
            .count()
    }

    /// Despawn a commuter and clean up its road tracking
    pub fn despawn(
        &mut self,
        commuter_id: CommuterId,
        road_network: &mut SimRoadNetwork,
    ) -> Option<SimCommuter> {
        let commuter = self.commuters.remove(&commuter_id)?;
        // Only traveling commuters are tracked on a road
        if let Some((road, distance)) = commuter.road_position() {
            road_network.untrack_commuter(commuter_id, road, distance);
        }
        Some(commuter)
    }

    /// Try to start every idle commuter on a route
    ///
    /// A commuter whose last attempt failed is only retried once the
    /// network has changed. A commuter whose first road has someone
    /// within `clearance` of its start waits for the next tick.
    pub fn plan_idle(
        &mut self,
        road_network: &mut SimRoadNetwork,
        clearance: f32,
    ) -> Vec<CommuterId> {
        let revision = road_network.revision();
        let mut departed = Vec::new();

        for commuter in self.commuters.values_mut() {
            let (at, last_attempt) = match commuter.state {
                CommuterState::Idle { at, last_attempt } => (at, last_attempt),
                CommuterState::Traveling { .. } => continue,
            };
            if last_attempt == Some(revision) {
                continue;
            }

            let Some(route) = road_network
                .find_route(at, commuter.destination)
                .filter(|route| !route.is_empty())
            else {
                debug!(
                    "No path from {} to {} for {}, holding",
                    at, commuter.destination, commuter.id
                );
                commuter.state = CommuterState::Idle {
                    at,
                    last_attempt: Some(revision),
                };
                continue;
            };

            let Some(&first_road) = route.roads.first() else {
                continue;
            };
            let entry_blocked = road_network
                .commuters_on_road(first_road)
                .first()
                .is_some_and(|(distance, _)| *distance < clearance);
            if entry_blocked {
                continue;
            }

            commuter.depart(&route);
            road_network.track_commuter(commuter.id, first_road, 0.0);
            debug!(
                "{} departs {} for {} ({:.1} units)",
                commuter.id, at, commuter.destination, route.length
            );
            departed.push(commuter.id);
        }

        departed
    }

    /// Move every traveling commuter and release the ones that arrived
    pub fn advance(&mut self, delta_secs: f32, road_network: &mut SimRoadNetwork) -> MovementOutcome {
        let mut outcome = MovementOutcome::default();

        for commuter in self.commuters.values_mut() {
            let Some((prev_road, prev_distance)) = commuter.road_position() else {
                continue;
            };

            let result = commuter.update(delta_secs, road_network);
            road_network.untrack_commuter(commuter.id, prev_road, prev_distance);

            match result {
                Ok(CommuterUpdateResult::Continue) => {
                    if let Some((road, distance)) = commuter.road_position() {
                        road_network.track_commuter(commuter.id, road, distance);
                    }
                }
                Ok(CommuterUpdateResult::Arrived(city)) => {
                    debug!("{} arrived at {}", commuter.id, city);
                    outcome.arrivals.push(Arrival {
                        commuter: commuter.id,
                        city,
                        planned_length: commuter.planned_length,
                        traveled_length: commuter.traveled_length,
                    });
                }
                Ok(CommuterUpdateResult::Stranded(city)) => {
                    debug!("{} stranded at {}, replanning", commuter.id, city);
                    commuter.strand(city);
                    outcome.stranded.push((commuter.id, city));
                }
                Err(err) => {
                    warn!("Releasing {}: {}", commuter.id, err);
                    outcome.lost.push(commuter.id);
                }
            }
        }

        for arrival in &outcome.arrivals {
            self.commuters.remove(&arrival.commuter);
        }
        for commuter_id in &outcome.lost {
            self.commuters.remove(commuter_id);
        }

        outcome
    }

    /// Find commuters sharing a road closer than `threshold` and release them
    ///
    /// Roads are checked in id order and occupants from the road start
    /// onward; a commuter takes part in at most one collision.
    pub fn detect_collisions(
        &mut self,
        road_network: &mut SimRoadNetwork,
        threshold: f32,
    ) -> Vec<Collision> {
        let mut collisions = Vec::new();

        for road in road_network.occupied_roads() {
            let occupants = road_network.commuters_on_road(road);
            let mut i = 0;
            while i + 1 < occupants.len() {
                let (behind_distance, behind) = occupants[i];
                let (ahead_distance, ahead) = occupants[i + 1];
                if ahead_distance - behind_distance < threshold {
                    collisions.push(Collision {
                        first: behind,
                        second: ahead,
                        road,
                    });
                    i += 2;
                } else {
                    i += 1;
                }
            }
        }

        for collision in &collisions {
            warn!(
                "Crash on {} between {} and {}",
                collision.road, collision.first, collision.second
            );
            self.despawn(collision.first, road_network);
            self.despawn(collision.second, road_network);
        }

        collisions
    }
}
