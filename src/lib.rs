//! Traffic Manager simulation library
//!
//! The simulation core of a traffic management game: cities, roads,
//! commuters, speed cameras and money, advanced one tick at a time.

pub mod simulation;
