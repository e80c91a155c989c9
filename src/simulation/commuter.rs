//! Commuter movement logic for the traffic simulation
//!
//! A commuter waits at a city until a route to its destination exists,
//! then drives the route road by road.

use std::collections::VecDeque;

use super::error::{SimError, SimResult};
use super::road_network::{Route, SimRoadNetwork};
use super::types::{CityId, CommuterId, Position, RoadId};

/// Result of a commuter update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommuterUpdateResult {
    Continue,             // Still driving (or waiting)
    Arrived(CityId),      // Reached its destination
    Stranded(CityId),     // Next road vanished; wait here and replan
}

/// Where a commuter is in its trip
#[derive(Debug, Clone, PartialEq)]
pub enum CommuterState {
    /// Waiting at a city for a route
    Idle {
        at: CityId,
        /// Network revision of the last failed route attempt
        last_attempt: Option<u64>,
    },
    /// Driving along a road
    Traveling {
        road: RoadId,
        distance: f32,
        /// Roads still to drive after `road`
        remaining: VecDeque<RoadId>,
    },
}

/// A commuter in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimCommuter {
    pub id: CommuterId,
    pub origin: CityId,
    pub destination: CityId,
    pub speed: f32,
    pub state: CommuterState,
    /// Total length of the planned trip, fixed when a route is taken
    pub planned_length: f32,
    /// Lengths of the roads fully driven so far
    pub traveled_length: f32,
    /// Tick the commuter was created on
    pub spawned_at: u64,
}

impl SimCommuter {
    pub fn new(
        id: CommuterId,
        origin: CityId,
        destination: CityId,
        speed: f32,
        spawned_at: u64,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            speed,
            state: CommuterState::Idle {
                at: origin,
                last_attempt: None,
            },
            planned_length: 0.0,
            traveled_length: 0.0,
            spawned_at,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, CommuterState::Idle { .. })
    }

    /// The city an idle commuter waits at
    pub fn waiting_at(&self) -> Option<CityId> {
        match self.state {
            CommuterState::Idle { at, .. } => Some(at),
            CommuterState::Traveling { .. } => None,
        }
    }

    pub fn current_road(&self) -> Option<RoadId> {
        match self.state {
            CommuterState::Traveling { road, .. } => Some(road),
            CommuterState::Idle { .. } => None,
        }
    }

    /// Road and distance along it, for traveling commuters
    pub fn road_position(&self) -> Option<(RoadId, f32)> {
        match self.state {
            CommuterState::Traveling { road, distance, .. } => Some((road, distance)),
            CommuterState::Idle { .. } => None,
        }
    }

    /// World position, interpolated along the current road
    pub fn position(&self, road_network: &SimRoadNetwork) -> Option<Position> {
        match &self.state {
            CommuterState::Idle { at, .. } => road_network.city_position(*at).copied(),
            CommuterState::Traveling { road, distance, .. } => {
                let road = road_network.road(*road)?;
                let start = road_network.city_position(road.start_city)?;
                let end = road_network.city_position(road.end_city)?;
                let progress = if road.length > 0.0 {
                    (distance / road.length).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                Some(start.lerp(end, progress))
            }
        }
    }

    /// Start driving a route from the current city
    pub fn depart(&mut self, route: &Route) {
        let mut roads: VecDeque<RoadId> = route.roads.iter().copied().collect();
        let Some(first) = roads.pop_front() else {
            return;
        };
        self.planned_length = self.traveled_length + route.length;
        self.state = CommuterState::Traveling {
            road: first,
            distance: 0.0,
            remaining: roads,
        };
    }

    /// Stop at a city and wait for a new route
    pub fn strand(&mut self, at: CityId) {
        self.state = CommuterState::Idle {
            at,
            last_attempt: None,
        };
    }

    /// Advance along the route by `speed × delta_secs`
    ///
    /// Distance left over at the end of a road carries onto the next one.
    /// Every next road is re-validated before it is entered.
    pub fn update(
        &mut self,
        delta_secs: f32,
        road_network: &SimRoadNetwork,
    ) -> SimResult<CommuterUpdateResult> {
        let destination = self.destination;
        let CommuterState::Traveling {
            road,
            distance,
            remaining,
        } = &mut self.state
        else {
            return Ok(CommuterUpdateResult::Continue);
        };

        let mut budget = self.speed.max(0.0) * delta_secs.max(0.0);

        loop {
            let current = road_network
                .road(*road)
                .ok_or(SimError::UnknownRoad(*road))?;

            let to_end = current.length - *distance;
            if budget < to_end {
                *distance += budget;
                return Ok(CommuterUpdateResult::Continue);
            }

            budget -= to_end;
            self.traveled_length += current.length;
            let reached = current.end_city;

            match remaining.pop_front() {
                None if reached == destination => {
                    *distance = current.length;
                    return Ok(CommuterUpdateResult::Arrived(reached));
                }
                None => return Ok(CommuterUpdateResult::Stranded(reached)),
                Some(next) => match road_network.road(next) {
                    Some(next_road) if next_road.start_city == reached => {
                        *road = next;
                        *distance = 0.0;
                    }
                    _ => return Ok(CommuterUpdateResult::Stranded(reached)),
                },
            }
        }
    }
}
