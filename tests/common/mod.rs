//! Shared setup for the integration tests
#![allow(dead_code)]

use traffic_manager::simulation::{SimConfig, SimWorld};

/// One tick per second, no periodic spawning or billing
pub fn quiet_config() -> SimConfig {
    SimConfig {
        tick_duration: 1.0,
        spawn_interval: 0,
        billing_interval: 0,
        ..SimConfig::default()
    }
}

pub fn quiet_world() -> SimWorld {
    SimWorld::with_config(quiet_config())
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
