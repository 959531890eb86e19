//! Alert production and aggregation
//!
//! `factory` normalizes risk and violation assessments into canonical
//! feed entries; `feed` owns the bounded, ordered, deduplicated live feed.

pub mod factory;
pub mod feed;

pub use feed::{AlertFeed, DEFAULT_CAPACITY, DEFAULT_PURGE_HORIZON_HOURS};
