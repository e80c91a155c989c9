//! Level data and the world bounds derived from it
//!
//! A level is just the list of city positions that seed the map. The
//! bounds are computed once at setup and handed to the presentation
//! layer; nothing mutates them afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::config::SimConfig;
use super::types::Position;

/// Empty space kept around the outermost cities
pub const WORLD_PADDING: f32 = 50.0;

const DEFAULT_LEVEL: &str = include_str!("../../levels/1.level.toml");

/// Where a level places a city
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LevelCity {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub cities: Vec<LevelCity>,
}

impl LevelData {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid level data")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Couldn't read level {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// The level shipped with the game
    pub fn default_level() -> Result<Self> {
        Self::from_toml_str(DEFAULT_LEVEL)
    }
}

/// Camera limits and background rectangle for a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Smallest city position
    pub camera_min: Position,
    /// Largest city position
    pub camera_max: Position,
    /// Top-left corner of the background
    pub background_origin: Position,
    pub background_width: f32,
    pub background_height: f32,
}

impl WorldBounds {
    pub fn from_level(level: &LevelData, config: &SimConfig) -> Self {
        let (camera_min, camera_max) = match level.cities.split_first() {
            None => (Position::default(), Position::default()),
            Some((first, rest)) => rest.iter().fold(
                (
                    Position::new(first.x, first.y),
                    Position::new(first.x, first.y),
                ),
                |(min, max), city| {
                    (
                        Position::new(min.x.min(city.x), min.y.min(city.y)),
                        Position::new(max.x.max(city.x), max.y.max(city.y)),
                    )
                },
            ),
        };

        Self {
            camera_min,
            camera_max,
            background_origin: Position::new(
                camera_min.x - WORLD_PADDING,
                camera_min.y - WORLD_PADDING,
            ),
            background_width: camera_max.x - camera_min.x + config.city_width + 2.0 * WORLD_PADDING,
            background_height: camera_max.y - camera_min.y
                + config.city_height
                + 2.0 * WORLD_PADDING,
        }
    }
}
