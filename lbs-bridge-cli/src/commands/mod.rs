//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`distance`] - geodesic distance between two points
//! - [`normalize`] - raw report file → canonical event JSON
//! - [`simulate`] - run a bridge over the simulated engine

pub mod distance;
pub mod normalize;
pub mod simulate;

mod reports;
