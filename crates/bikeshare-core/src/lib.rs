//! Shared types for the bike-sharing dashboard: hourly and daily records,
//! category lookup tables, errors, settings, and report formatting.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
