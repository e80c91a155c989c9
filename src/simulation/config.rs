//! Simulation tunables
//!
//! Every field has a default so a config file only needs to name the
//! values it overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::economy::EconomyConfig;

/// In-game seconds per tick
pub const DEFAULT_TICK_DURATION: f32 = 0.1;

/// Footprint shared by every city, in world units
pub const CITY_WIDTH: f32 = 40.0;
pub const CITY_HEIGHT: f32 = 40.0;

/// Speed limit given to roads built without an explicit one
pub const DEFAULT_SPEED_LIMIT: f32 = 30.0;

/// Two commuters on the same road closer than this crash
pub const COLLISION_DISTANCE: f32 = 4.0;

/// Range commuter speeds are drawn from, in world units per second
pub const MIN_COMMUTER_SPEED: f32 = 20.0;
pub const MAX_COMMUTER_SPEED: f32 = 45.0;

/// Ticks between periodic commuter spawns
pub const SPAWN_INTERVAL_TICKS: u64 = 50;

/// Ticks between upkeep bills
pub const BILLING_INTERVAL_TICKS: u64 = 100;

/// Idle commuters a city may hold before periodic spawning skips it
pub const MAX_IDLE_PER_CITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_duration: f32,
    pub city_width: f32,
    pub city_height: f32,
    pub default_speed_limit: f32,
    pub collision_distance: f32,
    pub min_commuter_speed: f32,
    pub max_commuter_speed: f32,
    pub spawn_interval: u64,
    pub billing_interval: u64,
    pub max_idle_per_city: usize,
    pub seed: u64,
    pub economy: EconomyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_duration: DEFAULT_TICK_DURATION,
            city_width: CITY_WIDTH,
            city_height: CITY_HEIGHT,
            default_speed_limit: DEFAULT_SPEED_LIMIT,
            collision_distance: COLLISION_DISTANCE,
            min_commuter_speed: MIN_COMMUTER_SPEED,
            max_commuter_speed: MAX_COMMUTER_SPEED,
            spawn_interval: SPAWN_INTERVAL_TICKS,
            billing_interval: BILLING_INTERVAL_TICKS,
            max_idle_per_city: MAX_IDLE_PER_CITY,
            seed: 0,
            economy: EconomyConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content).context("Invalid simulation config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Couldn't read config {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tick_duration", self.tick_duration),
            ("city_width", self.city_width),
            ("city_height", self.city_height),
            ("default_speed_limit", self.default_speed_limit),
            ("collision_distance", self.collision_distance),
            ("min_commuter_speed", self.min_commuter_speed),
            ("max_commuter_speed", self.max_commuter_speed),
        ] {
            if !value.is_finite() {
                anyhow::bail!("{} must be finite, got {}", name, value);
            }
        }
        if self.tick_duration <= 0.0 {
            anyhow::bail!("tick_duration must be positive");
        }
        if self.city_width <= 0.0 || self.city_height <= 0.0 {
            anyhow::bail!("city footprint must be positive");
        }
        if self.default_speed_limit < 0.0 || self.collision_distance < 0.0 {
            anyhow::bail!("speed limit and collision distance can't be negative");
        }
        if self.min_commuter_speed < 0.0 || self.max_commuter_speed < self.min_commuter_speed {
            anyhow::bail!(
                "commuter speed range {}..{} is invalid",
                self.min_commuter_speed,
                self.max_commuter_speed
            );
        }

        let economy = &self.economy;
        for (name, value) in [
            ("city_cost", economy.city_cost),
            ("road_cost", economy.road_cost),
            ("camera_cost", economy.camera_cost),
            ("road_upkeep", economy.road_upkeep),
            ("camera_upkeep", economy.camera_upkeep),
            ("arrival_revenue", economy.arrival_revenue),
            ("fine.base", economy.fine.base),
            ("fine.per_unit_over", economy.fine.per_unit_over),
        ] {
            if value < 0 {
                anyhow::bail!("economy {} can't be negative, got {}", name, value);
            }
        }
        Ok(())
    }
}
