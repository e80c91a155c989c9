//! City, road and speed camera builders
//!
//! Every builder validates its arguments before touching the world, so a
//! rejected call leaves cities, roads, cameras and the treasury exactly
//! as they were.

use log::{debug, warn};

use super::commuter::SimCommuter;
use super::error::{SimError, SimResult};
use super::law::SpeedCamera;
use super::level::LevelData;
use super::types::{CameraId, CityId, CommuterId, Position, RoadId, SimCity, SimRoad};
use super::world::SimWorld;

impl SimWorld {
    /// Build a city with its footprint's corner at (x, y)
    pub fn build_city(&mut self, x: f32, y: f32) -> SimResult<CityId> {
        let position = Position::new(x, y);

        if let Some(existing) = self
            .road_network
            .cities()
            .find(|city| city.overlaps(&position))
        {
            return Err(SimError::Overlap {
                x,
                y,
                existing: existing.id,
            });
        }

        let cost = self.economy.config().city_cost;
        self.economy.pay_for_construction(cost)?;
        self.stats.construction_spent += cost;

        let id = CityId(self.next_sim_id());
        let city = SimCity::new(
            id,
            position,
            self.config.city_width,
            self.config.city_height,
        );
        self.road_network.add_city(city);
        debug!("Built {} at ({:.1}, {:.1})", id, x, y);
        Ok(id)
    }

    /// Build every city a level lists, skipping the ones that overlap
    pub fn seed_from_level(&mut self, level: &LevelData) -> Vec<CityId> {
        level
            .cities
            .iter()
            .filter_map(|city| match self.build_city(city.x, city.y) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!("Skipping level city at ({}, {}): {}", city.x, city.y, err);
                    None
                }
            })
            .collect()
    }

    fn validate_road(&self, from: CityId, to: CityId) -> SimResult<()> {
        if !self.road_network.contains_city(from) {
            return Err(SimError::UnknownCity(from));
        }
        if !self.road_network.contains_city(to) {
            return Err(SimError::UnknownCity(to));
        }
        if from == to {
            return Err(SimError::SelfLoop(from));
        }
        if self.road_network.find_road_between(from, to).is_some() {
            return Err(SimError::DuplicateRoad { from, to });
        }
        Ok(())
    }

    /// Add an already validated and paid-for road
    fn insert_road(&mut self, from: CityId, to: CityId, speed_limit: f32) -> SimResult<RoadId> {
        let start_pos = *self
            .road_network
            .city_position(from)
            .ok_or(SimError::UnknownCity(from))?;
        let end_pos = *self
            .road_network
            .city_position(to)
            .ok_or(SimError::UnknownCity(to))?;

        let id = RoadId(self.next_sim_id());
        let road = SimRoad::new(id, from, to, &start_pos, &end_pos, speed_limit);
        self.road_network.add_road(road)?;
        debug!("Built {} from {} to {}", id, from, to);
        Ok(id)
    }

    /// Build a one-way road with the default speed limit
    pub fn build_road(&mut self, from: CityId, to: CityId) -> SimResult<RoadId> {
        let speed_limit = self.config.default_speed_limit;
        self.build_road_with_limit(from, to, speed_limit)
    }

    /// Build a one-way road from one city to another
    pub fn build_road_with_limit(
        &mut self,
        from: CityId,
        to: CityId,
        speed_limit: f32,
    ) -> SimResult<RoadId> {
        self.validate_road(from, to)?;

        let cost = self.economy.config().road_cost;
        self.economy.pay_for_construction(cost)?;
        self.stats.construction_spent += cost;

        self.insert_road(from, to, speed_limit)
    }

    /// Build roads in both directions, or neither
    pub fn build_two_way_road(&mut self, a: CityId, b: CityId) -> SimResult<(RoadId, RoadId)> {
        self.validate_road(a, b)?;
        self.validate_road(b, a)?;

        let cost = self.economy.config().road_cost;
        self.economy.pay_for_construction(cost)?;
        self.stats.construction_spent += cost;

        let speed_limit = self.config.default_speed_limit;
        let forward = self.insert_road(a, b, speed_limit)?;
        let backward = self.insert_road(b, a, speed_limit)?;
        Ok((forward, backward))
    }

    /// Attach a speed camera to a road
    ///
    /// Without an explicit threshold the camera enforces the road's limit.
    pub fn build_speed_camera(
        &mut self,
        road_id: RoadId,
        threshold: Option<f32>,
    ) -> SimResult<CameraId> {
        let road = self
            .road_network
            .road(road_id)
            .ok_or(SimError::UnknownRoad(road_id))?;
        let threshold = threshold.unwrap_or(road.speed_limit);

        let cost = self.economy.config().camera_cost;
        self.economy.pay_for_construction(cost)?;
        self.stats.construction_spent += cost;

        let id = CameraId(self.next_sim_id());
        self.law.add_camera(SpeedCamera::new(id, road_id, threshold));
        debug!("Built {} on {} (threshold {:.1})", id, road_id, threshold);
        Ok(id)
    }

    /// Remove a road from the world
    ///
    /// Commuters on the road are released and cameras on it are dropped.
    /// Commuters planning to use it later replan when they reach it.
    pub fn remove_road(&mut self, road_id: RoadId) -> SimResult<Vec<CommuterId>> {
        let commuters_on_road = self.road_network.remove_road(road_id)?;

        for commuter_id in &commuters_on_road {
            if self
                .commuters
                .despawn(*commuter_id, &mut self.road_network)
                .is_some()
            {
                self.stats.total_commuters_removed += 1;
            }
        }

        let cameras = self.law.remove_cameras_on_road(road_id);
        debug!(
            "Removed {} ({} commuters, {} cameras)",
            road_id,
            commuters_on_road.len(),
            cameras.len()
        );

        Ok(commuters_on_road)
    }

    /// Create a commuter waiting at `origin`
    ///
    /// The commuter picks a route on the next planning pass.
    pub fn spawn_commuter(
        &mut self,
        origin: CityId,
        destination: CityId,
        speed: f32,
    ) -> SimResult<CommuterId> {
        if !self.road_network.contains_city(origin) {
            return Err(SimError::UnknownCity(origin));
        }
        if !self.road_network.contains_city(destination) {
            return Err(SimError::UnknownCity(destination));
        }
        if origin == destination {
            return Err(SimError::NoPath {
                from: origin,
                to: destination,
            });
        }

        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        let id = CommuterId(self.next_sim_id());
        let commuter = SimCommuter::new(id, origin, destination, speed, self.clock.tick());
        self.commuters.insert(commuter);
        self.stats.total_commuters_spawned += 1;
        debug!(
            "Spawned {} at {} heading to {} (speed {:.1})",
            id, origin, destination, speed
        );
        Ok(id)
    }
}
