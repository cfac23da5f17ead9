//! Runtime layer for the bike-sharing dashboard.
//!
//! Owns the memoized dataset and turns a dataset plus filter parameters
//! into a complete dashboard snapshot.

pub mod dashboard;
pub mod dataset_store;

pub use bikeshare_core as core;
pub use bikeshare_data as data;
