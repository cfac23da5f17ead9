//! Data layer for the bike-sharing dashboard.
//!
//! Reads the hourly rentals CSV, attaches category labels, rolls hours up
//! into days with an explicit recipe, filters by date, season and weather,
//! classifies hours of the day into usage tiers and computes the chart
//! series shown by the dashboard.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod filter;
pub mod reader;

pub use bikeshare_core as core;
