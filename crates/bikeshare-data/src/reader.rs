//! CSV loading and label enrichment for hourly rental records.
//!
//! The source is a header-addressed CSV with one row per observed hour.
//! Both the canonical short headers (`dteday`, `hr`, `yr`, `mnth`, ...) and
//! their long spellings (`date`, `hour`, `year`, `month`, ...) are accepted;
//! extra columns such as `instant` are ignored. Loading is all-or-nothing:
//! the first malformed row aborts the load.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use bikeshare_core::error::{DashboardError, Result};
use bikeshare_core::models::HourRecord;

/// Date formats tried in order for the date column.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime formats accepted when the date column carries a time part.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

// ── Raw row ───────────────────────────────────────────────────────────────────

/// One CSV row exactly as stored, before validation and labelling.
#[derive(Debug, Deserialize)]
struct RawHourRow {
    #[serde(alias = "date")]
    dteday: String,
    #[serde(alias = "hour")]
    hr: i64,
    season: i32,
    #[serde(alias = "year")]
    yr: i32,
    #[serde(alias = "month")]
    mnth: i32,
    holiday: i32,
    weekday: i32,
    #[serde(alias = "working_day")]
    workingday: i32,
    #[serde(alias = "weather")]
    weathersit: i32,
    temp: f64,
    atemp: f64,
    #[serde(alias = "humidity")]
    hum: f64,
    #[serde(alias = "wind_speed")]
    windspeed: f64,
    casual: u64,
    registered: u64,
    #[serde(alias = "count")]
    cnt: u64,
}

impl RawHourRow {
    /// Validate and convert into an (unlabelled) [`HourRecord`].
    fn into_record(self, line: u64) -> Result<HourRecord> {
        let date = parse_date(&self.dteday).map_err(|_| DashboardError::MalformedRecord {
            line,
            reason: format!("unparseable date {:?}", self.dteday),
        })?;

        let hour = u8::try_from(self.hr)
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| DashboardError::MalformedRecord {
                line,
                reason: format!("hour {} outside 0-23", self.hr),
            })?;

        Ok(HourRecord {
            date,
            hour,
            season: self.season,
            year: self.yr,
            month: self.mnth,
            holiday: self.holiday,
            weekday: self.weekday,
            working_day: self.workingday,
            weather: self.weathersit,
            temp: self.temp,
            atemp: self.atemp,
            humidity: self.hum,
            wind_speed: self.windspeed,
            casual: self.casual,
            registered: self.registered,
            count: self.cnt,
            season_label: None,
            weather_label: None,
            weekday_label: None,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the hourly CSV at `path` and attach category labels.
///
/// Row count and order are preserved exactly. A missing file, an unreadable
/// file, a missing column or an out-of-domain hour fails the whole load.
pub fn load_hour_records(path: &Path) -> Result<Vec<HourRecord>> {
    if !path.exists() {
        return Err(DashboardError::DataPathNotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_hour_records(std::io::BufReader::new(file))?;
    info!(path = %path.display(), rows = records.len(), "loaded hourly records");
    Ok(records)
}

/// Parse and enrich hourly records from any CSV byte source.
pub fn read_hour_records<R: Read>(source: R) -> Result<Vec<HourRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    debug!(columns = headers.len(), "reading hourly CSV");

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawHourRow = row.deserialize(Some(&headers))?;
        records.push(raw.into_record(line)?);
    }

    Ok(enrich(records))
}

/// Attach season, weather and weekday labels to every record.
///
/// Codes outside the lookup tables leave the label as `None`.
pub fn enrich(mut records: Vec<HourRecord>) -> Vec<HourRecord> {
    let mut unlabelled = 0usize;
    for record in records.iter_mut() {
        record.attach_labels();
        if record.season_label.is_none()
            || record.weather_label.is_none()
            || record.weekday_label.is_none()
        {
            unlabelled += 1;
        }
    }
    if unlabelled > 0 {
        debug!(unlabelled, "records with out-of-domain category codes");
    }
    records
}

/// Parse a date column value, ignoring any time-of-day part.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| DashboardError::DateParse(value.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
