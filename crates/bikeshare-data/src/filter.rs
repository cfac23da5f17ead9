//! Date, season and weather filtering of the hourly record set.
//!
//! The daily view of a filtered selection is always re-derived from the
//! filtered hours, so sums and means can never mix rows the hourly filter
//! excluded.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use bikeshare_core::error::{DashboardError, Result};
use bikeshare_core::models::{DayRecord, HourRecord, Season, WeatherSituation};

use crate::aggregator::aggregate_to_daily;

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive calendar-date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range; `start` must not lie after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

// ── FilterParams ──────────────────────────────────────────────────────────────

/// The three filter predicates of the dashboard.
///
/// An empty season or weather set applies no filter on that dimension.
/// A `None` date range is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub date_range: Option<DateRange>,
    pub seasons: BTreeSet<Season>,
    pub weather: BTreeSet<WeatherSituation>,
}

/// Set membership with empty-set pass-through.
///
/// A record whose label is missing never matches a non-empty set.
fn membership<T: Ord>(selected: &BTreeSet<T>, label: Option<T>) -> bool {
    if selected.is_empty() {
        return true;
    }
    label.is_some_and(|l| selected.contains(&l))
}

// ── FilteredView ──────────────────────────────────────────────────────────────

/// Filtered hourly records and the daily view derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredView {
    pub hours: Vec<HourRecord>,
    pub days: Vec<DayRecord>,
}

impl FilteredView {
    /// Derive the daily view from an already-filtered hour set.
    pub fn from_hours(hours: Vec<HourRecord>) -> Self {
        let days = aggregate_to_daily(&hours);
        Self { hours, days }
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Filter `hours` and re-aggregate the surviving rows into days.
///
/// Predicates apply in order (date range, season, weather) and combine with
/// AND. `hours` is only borrowed, so the unfiltered set stays available for
/// the next filter change.
pub fn apply_filters(hours: &[HourRecord], params: &FilterParams) -> FilteredView {
    let by_date: Vec<&HourRecord> = hours
        .iter()
        .filter(|h| params.date_range.map_or(true, |r| r.contains(h.date)))
        .collect();
    let by_season: Vec<&HourRecord> = by_date
        .into_iter()
        .filter(|h| membership(&params.seasons, h.season_label))
        .collect();
    let filtered: Vec<HourRecord> = by_season
        .into_iter()
        .filter(|h| membership(&params.weather, h.weather_label))
        .cloned()
        .collect();

    debug!(
        source = hours.len(),
        kept = filtered.len(),
        seasons = params.seasons.len(),
        weather = params.weather.len(),
        "applied filters"
    );

    FilteredView::from_hours(filtered)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
