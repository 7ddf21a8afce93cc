//! Trust Atlas aggregation engine.
//!
//! Turns normalized survey and governance-indicator observations into
//! comparable, confidence-rated trust metrics per country, year, and
//! pillar, including the Trust-Quality Gap and regional rollups. Storage,
//! transport framing, and presentation live outside this crate.

pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;
