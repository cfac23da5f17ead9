//! One full evaluation of the dashboard for a set of filter parameters.
//!
//! [`evaluate`] is pure: it borrows the loaded dataset, filters it and
//! reduces the selection into every figure and series the dashboard shows.
//! Nothing is cached between evaluations.

use std::path::PathBuf;

use serde::Serialize;

use bikeshare_core::models::{Season, WeatherSituation, Weekday};
use bikeshare_data::analysis::{
    environment_points, hour_weekday_matrix, monthly_means, seasonal_means, weather_means,
    weekday_means, CategoryMean, EnvironmentPoint, EnvironmentVariable, FilterOptions,
    HourWeekdayMatrix, KeyMetrics,
};
use bikeshare_data::classifier::{hourly_usage, HourlyUsage};
use bikeshare_data::filter::{apply_filters, DateRange, FilterParams};

use crate::dataset_store::EnrichedDataset;

// ── DashboardSnapshot ─────────────────────────────────────────────────────────

/// Everything the dashboard displays for one filter selection.
///
/// This is the contract between the runtime and the report layer, and the
/// document written by the JSON output format.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub source: PathBuf,
    /// Parameters the snapshot was computed with.
    pub params: FilterParams,
    /// Choices available in the unfiltered dataset.
    pub options: FilterOptions,
    /// Number of hourly rows that passed the filters.
    pub hours_selected: usize,
    pub metrics: KeyMetrics,
    pub hourly_usage: Vec<HourlyUsage>,
    pub seasonal: Vec<CategoryMean<Season>>,
    pub monthly: Vec<CategoryMean<u32>>,
    pub weekday: Vec<CategoryMean<Weekday>>,
    pub weather: Vec<CategoryMean<WeatherSituation>>,
    pub hour_weekday: HourWeekdayMatrix,
    pub temperature: Vec<EnvironmentPoint>,
    pub humidity: Vec<EnvironmentPoint>,
}

impl DashboardSnapshot {
    pub fn is_empty(&self) -> bool {
        self.hours_selected == 0
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Filter `dataset` with `params` and compute the full snapshot.
pub fn evaluate(dataset: &EnrichedDataset, params: &FilterParams) -> DashboardSnapshot {
    let view = apply_filters(&dataset.hours, params);

    tracing::debug!(
        hours = view.hours.len(),
        days = view.days.len(),
        "evaluating dashboard"
    );

    DashboardSnapshot {
        source: dataset.source.clone(),
        params: params.clone(),
        options: FilterOptions::from_hours(&dataset.hours),
        hours_selected: view.hours.len(),
        metrics: KeyMetrics::from_days(&view.days),
        hourly_usage: hourly_usage(&view.hours),
        seasonal: seasonal_means(&view.days),
        monthly: monthly_means(&view.days),
        weekday: weekday_means(&view.days),
        weather: weather_means(&view.days),
        hour_weekday: hour_weekday_matrix(&view.hours),
        temperature: environment_points(&view.days, EnvironmentVariable::Temperature),
        humidity: environment_points(&view.days, EnvironmentVariable::Humidity),
    }
}

/// Default parameters: the dataset's full date span and no category filter.
pub fn default_params(options: &FilterOptions) -> FilterParams {
    let date_range = match (options.first_date, options.last_date) {
        (Some(first), Some(last)) => DateRange::new(first, last).ok(),
        _ => None,
    };
    FilterParams {
        date_range,
        ..Default::default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_core::models::{HourRecord, Tier};
    use bikeshare_data::aggregator::aggregate_to_daily;
    use chrono::{Datelike, NaiveDate};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: NaiveDate, hour: u8, season: i32, weather: i32, count: u64) -> HourRecord {
        let mut r = HourRecord {
            date: day,
            hour,
            season,
            year: 0,
            month: day.month() as i32,
            holiday: 0,
            weekday: 1,
            working_day: 1,
            weather,
            temp: 0.3,
            atemp: 0.3,
            humidity: 0.6,
            wind_speed: 0.2,
            casual: 0,
            registered: count,
            count,
            season_label: None,
            weather_label: None,
            weekday_label: None,
        };
        r.attach_labels();
        r
    }

    fn dataset() -> EnrichedDataset {
        let hours = vec![
            record(date(2011, 1, 3), 0, 1, 1, 10),
            record(date(2011, 1, 3), 8, 1, 1, 90),
            record(date(2011, 1, 3), 17, 1, 2, 50),
            record(date(2011, 7, 4), 0, 3, 1, 30),
            record(date(2011, 7, 4), 8, 3, 3, 210),
            record(date(2011, 7, 4), 17, 3, 1, 150),
        ];
        let days = aggregate_to_daily(&hours);
        EnrichedDataset {
            source: PathBuf::from("hour.csv"),
            hours,
            days,
            loaded_at: chrono::Utc::now(),
            load_time: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_evaluate_unfiltered() {
        let ds = dataset();
        let snap = evaluate(&ds, &FilterParams::default());

        assert_eq!(snap.hours_selected, 6);
        assert_eq!(snap.metrics.total_rentals, 540);
        assert_eq!(snap.metrics.days, 2);
        assert_eq!(snap.metrics.max_daily_rentals, Some(390));
        assert_eq!(snap.hourly_usage.len(), 3);
        assert_eq!(snap.hourly_usage[0].tier, Tier::Low);
        assert_eq!(snap.hourly_usage[1].tier, Tier::VeryHigh);
        assert_eq!(snap.seasonal.len(), 2);
        assert_eq!(snap.monthly.len(), 2);
        assert_eq!(snap.temperature.len(), 2);
        assert_eq!(snap.options.seasons, vec![Season::Spring, Season::Fall]);
        assert_eq!(snap.options.first_date, Some(date(2011, 1, 3)));
    }

    #[test]
    fn test_evaluate_season_filter() {
        let ds = dataset();
        let params = FilterParams {
            seasons: BTreeSet::from([Season::Fall]),
            ..Default::default()
        };
        let snap = evaluate(&ds, &params);
        assert_eq!(snap.metrics.total_rentals, 390);
        assert_eq!(snap.metrics.days, 1);
        assert_eq!(snap.seasonal.len(), 1);
        assert_eq!(snap.seasonal[0].category, Season::Fall);
        // Options always describe the whole dataset.
        assert_eq!(snap.options.seasons.len(), 2);
    }

    #[test]
    fn test_evaluate_empty_selection() {
        let ds = dataset();
        let params = FilterParams {
            weather: BTreeSet::from([WeatherSituation::HeavyPrecipitation]),
            ..Default::default()
        };
        let snap = evaluate(&ds, &params);
        assert!(snap.is_empty());
        assert_eq!(snap.metrics.total_rentals, 0);
        assert_eq!(snap.metrics.mean_daily_rentals, None);
        assert_eq!(snap.metrics.max_daily_rentals, None);
        assert!(snap.hourly_usage.is_empty());
        assert!(snap.seasonal.is_empty());
    }

    #[test]
    fn test_evaluate_does_not_touch_dataset() {
        let ds = dataset();
        let before = ds.hours.clone();
        let params = FilterParams {
            date_range: Some(DateRange::single(date(2011, 1, 3))),
            ..Default::default()
        };
        let snap = evaluate(&ds, &params);
        assert_eq!(snap.metrics.total_rentals, 150);
        assert_eq!(ds.hours, before);
    }

    #[test]
    fn test_default_params_cover_full_span() {
        let ds = dataset();
        let params = default_params(&FilterOptions::from_hours(&ds.hours));
        let range = params.date_range.unwrap();
        assert_eq!(range.start(), date(2011, 1, 3));
        assert_eq!(range.end(), date(2011, 7, 4));
        assert!(params.seasons.is_empty());
        assert!(params.weather.is_empty());

        assert!(default_params(&FilterOptions::default()).date_range.is_none());
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let ds = dataset();
        let snap = evaluate(&ds, &FilterParams::default());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["metrics"]["total_rentals"], 540);
        assert_eq!(json["hour_weekday"]["cells"].as_array().unwrap().len(), 24);
        assert_eq!(json["seasonal"][0]["category"], "Spring");
    }
}
