//! Headline metrics and chart series for a filtered selection.
//!
//! Every function here is a pure reduction over a filtered hour or day set.
//! Day-level series average the daily totals; hour-level series average the
//! hourly totals. Over an empty selection sums are zero and means/maxima are
//! `None`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use bikeshare_core::models::{DayRecord, HourRecord, Season, WeatherSituation, Weekday};

// ── KeyMetrics ────────────────────────────────────────────────────────────────

/// The four headline figures of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// Total rentals over the selection.
    pub total_rentals: u64,
    /// Mean rentals per day, `None` when no day is selected.
    pub mean_daily_rentals: Option<f64>,
    /// Highest single-day rentals, `None` when no day is selected.
    pub max_daily_rentals: Option<u64>,
    /// Number of days in the selection.
    pub days: usize,
}

impl KeyMetrics {
    pub fn from_days(days: &[DayRecord]) -> Self {
        let total_rentals: u64 = days.iter().map(|d| d.count).sum();
        let mean_daily_rentals = if days.is_empty() {
            None
        } else {
            Some(total_rentals as f64 / days.len() as f64)
        };
        Self {
            total_rentals,
            mean_daily_rentals,
            max_daily_rentals: days.iter().map(|d| d.count).max(),
            days: days.len(),
        }
    }
}

// ── Category means ────────────────────────────────────────────────────────────

/// Mean daily rentals for one category value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryMean<T> {
    pub category: T,
    pub mean_rentals: f64,
    /// Number of days that contributed.
    pub days: usize,
}

/// Group `days` by `key` (skipping `None`) and average their totals.
fn mean_by<K: Ord + Copy>(
    days: &[DayRecord],
    key: impl Fn(&DayRecord) -> Option<K>,
) -> Vec<CategoryMean<K>> {
    let mut groups: BTreeMap<K, (u64, usize)> = BTreeMap::new();
    for day in days {
        if let Some(k) = key(day) {
            let (total, n) = groups.entry(k).or_default();
            *total += day.count;
            *n += 1;
        }
    }
    groups
        .into_iter()
        .map(|(category, (total, n))| CategoryMean {
            category,
            mean_rentals: total as f64 / n as f64,
            days: n,
        })
        .collect()
}

/// Mean daily rentals per season, Spring to Winter.
pub fn seasonal_means(days: &[DayRecord]) -> Vec<CategoryMean<Season>> {
    mean_by(days, |d| d.season_label)
}

/// Mean daily rentals per weather situation, Clear to Heavy Rain/Snow.
pub fn weather_means(days: &[DayRecord]) -> Vec<CategoryMean<WeatherSituation>> {
    mean_by(days, |d| d.weather_label)
}

/// Mean daily rentals per weekday, Monday first and Sunday last.
pub fn weekday_means(days: &[DayRecord]) -> Vec<CategoryMean<Weekday>> {
    let mut means = mean_by(days, |d| d.weekday_label);
    means.sort_by_key(|m| m.category.display_index());
    means
}

/// Mean daily rentals per calendar month (1-12) of the record date.
pub fn monthly_means(days: &[DayRecord]) -> Vec<CategoryMean<u32>> {
    mean_by(days, |d| Some(d.date.month()))
}

/// English month name for 1-12.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

// ── Hour x weekday matrix ─────────────────────────────────────────────────────

/// Mean hourly rentals by hour-of-day (rows) and weekday (columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourWeekdayMatrix {
    /// Column order, Monday to Sunday.
    pub weekdays: [Weekday; 7],
    /// 24 rows indexed by hour; `None` where no rows were observed.
    pub cells: Vec<[Option<f64>; 7]>,
}

/// Build the hour x weekday heatmap over hourly records with a weekday label.
pub fn hour_weekday_matrix(hours: &[HourRecord]) -> HourWeekdayMatrix {
    let mut sums = vec![[(0u64, 0u64); 7]; 24];
    for record in hours {
        let (Some(weekday), Some(row)) = (record.weekday_label, sums.get_mut(usize::from(record.hour)))
        else {
            continue;
        };
        let slot = &mut row[weekday.display_index()];
        slot.0 += record.count;
        slot.1 += 1;
    }

    let cells = sums
        .into_iter()
        .map(|row| row.map(|(total, n)| (n > 0).then(|| total as f64 / n as f64)))
        .collect();

    HourWeekdayMatrix {
        weekdays: Weekday::DISPLAY_ORDER,
        cells,
    }
}

// ── Environment scatter ───────────────────────────────────────────────────────

/// Daily environmental reading plotted against rentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentVariable {
    Temperature,
    Humidity,
}

impl EnvironmentVariable {
    fn read(self, day: &DayRecord) -> f64 {
        match self {
            EnvironmentVariable::Temperature => day.temp,
            EnvironmentVariable::Humidity => day.humidity,
        }
    }
}

/// One scatter point: a day's mean reading, its rentals and its season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPoint {
    pub x: f64,
    pub rentals: u64,
    pub season: Option<Season>,
}

/// Scatter points of `variable` against daily rentals, in date order.
pub fn environment_points(days: &[DayRecord], variable: EnvironmentVariable) -> Vec<EnvironmentPoint> {
    days.iter()
        .map(|d| EnvironmentPoint {
            x: variable.read(d),
            rentals: d.count,
            season: d.season_label,
        })
        .collect()
}

// ── Filter options ────────────────────────────────────────────────────────────

/// Choices offered to the user, derived from the unfiltered hour set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub seasons: Vec<Season>,
    pub weather: Vec<WeatherSituation>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn from_hours(hours: &[HourRecord]) -> Self {
        let seasons: BTreeSet<Season> = hours.iter().filter_map(|h| h.season_label).collect();
        let weather: BTreeSet<WeatherSituation> =
            hours.iter().filter_map(|h| h.weather_label).collect();
        Self {
            seasons: seasons.into_iter().collect(),
            weather: weather.into_iter().collect(),
            first_date: hours.iter().map(|h| h.date).min(),
            last_date: hours.iter().map(|h| h.date).max(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
