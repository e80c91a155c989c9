//! Error types for the simulation core
//!
//! Every error here is recoverable at the point of origin: a rejected
//! builder call leaves the world untouched, a failed route keeps the
//! commuter idle, and a shortfall clamps the treasury.

use super::types::{CityId, RoadId};

/// Result alias used throughout the simulation
pub type SimResult<T> = Result<T, SimError>;

/// Errors produced by builders, the commuter engine and the economy
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// The city footprint would intersect an existing city
    #[error("city at ({x}, {y}) overlaps {existing}")]
    Overlap { x: f32, y: f32, existing: CityId },

    /// A road already connects the two cities in this direction
    #[error("a road from {from} to {to} already exists")]
    DuplicateRoad { from: CityId, to: CityId },

    /// A road cannot start and end at the same city
    #[error("road would start and end at {0}")]
    SelfLoop(CityId),

    #[error("unknown city {0}")]
    UnknownCity(CityId),

    #[error("unknown road {0}")]
    UnknownRoad(RoadId),

    /// The destination cannot be reached over the current network
    #[error("no path from {from} to {to}")]
    NoPath { from: CityId, to: CityId },

    /// The treasury could not cover a mandatory cost and was clamped
    #[error("treasury shortfall: required {required}, available {available}")]
    Shortfall { required: i64, available: i64 },

    /// A purchase was refused because the treasury cannot afford it
    #[error("insufficient funds: cost {cost}, balance {balance}")]
    InsufficientFunds { cost: i64, balance: i64 },
}

/// Fieldless error classification, used for HUD feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Overlap,
    DuplicateRoad,
    SelfLoop,
    UnknownCity,
    UnknownRoad,
    NoPath,
    Shortfall,
    InsufficientFunds,
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::Overlap { .. } => ErrorKind::Overlap,
            SimError::DuplicateRoad { .. } => ErrorKind::DuplicateRoad,
            SimError::SelfLoop(_) => ErrorKind::SelfLoop,
            SimError::UnknownCity(_) => ErrorKind::UnknownCity,
            SimError::UnknownRoad(_) => ErrorKind::UnknownRoad,
            SimError::NoPath { .. } => ErrorKind::NoPath,
            SimError::Shortfall { .. } => ErrorKind::Shortfall,
            SimError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}
