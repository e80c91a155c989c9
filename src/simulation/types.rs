//! Core types for the traffic simulation
//!
//! These are standalone types shared by every system in the simulation.

use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety.
/// Ids are handed out in creation order, so a lower id was created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for city IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityId(pub SimId);

/// A wrapper type for road IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoadId(pub SimId);

/// A wrapper type for commuter IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommuterId(pub SimId);

/// A wrapper type for speed camera IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraId(pub SimId);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city#{}", self.0 .0)
    }
}

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "road#{}", self.0 .0)
    }
}

impl fmt::Display for CommuterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commuter#{}", self.0 .0)
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera#{}", self.0 .0)
    }
}

/// A 2D position in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// A city node in the road network
///
/// The footprint is the axis-aligned rectangle starting at `position`
/// and extending `width` along x and `height` along y.
#[derive(Debug, Clone)]
pub struct SimCity {
    pub id: CityId,
    pub position: Position,
    pub width: f32,
    pub height: f32,
}

impl SimCity {
    pub fn new(id: CityId, position: Position, width: f32, height: f32) -> Self {
        Self {
            id,
            position,
            width,
            height,
        }
    }

    /// Check whether a footprint of the same size placed at `other` would intersect this city
    pub fn overlaps(&self, other: &Position) -> bool {
        (self.position.x - other.x).abs() < self.width
            && (self.position.y - other.y).abs() < self.height
    }
}

/// A directed road segment connecting two cities
#[derive(Debug, Clone)]
pub struct SimRoad {
    pub id: RoadId,
    pub start_city: CityId,
    pub end_city: CityId,
    pub speed_limit: f32,
    pub length: f32,
}

impl SimRoad {
    pub fn new(
        id: RoadId,
        start_city: CityId,
        end_city: CityId,
        start_pos: &Position,
        end_pos: &Position,
        speed_limit: f32,
    ) -> Self {
        Self {
            id,
            start_city,
            end_city,
            speed_limit,
            length: start_pos.distance(end_pos),
        }
    }
}
