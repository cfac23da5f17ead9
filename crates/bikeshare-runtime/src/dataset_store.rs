//! Memoized dataset store.
//!
//! Loading and enriching the CSV is the only expensive step of the dashboard,
//! so [`DatasetStore`] keeps the last complete load and hands it out until
//! the cache is invalidated, the source path changes or a reload is
//! requested. A failed load never replaces a complete one.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use bikeshare_core::error::Result;
use bikeshare_core::models::{DayRecord, HourRecord};
use bikeshare_data::aggregator::aggregate_to_daily;
use bikeshare_data::reader::load_hour_records;

// ── EnrichedDataset ───────────────────────────────────────────────────────────

/// One complete, labelled load of the hourly CSV and its daily roll-up.
#[derive(Debug, Clone)]
pub struct EnrichedDataset {
    /// File the records were read from.
    pub source: PathBuf,
    /// Hourly records in file order, labels attached.
    pub hours: Vec<HourRecord>,
    /// Daily records derived from `hours`, ascending by date.
    pub days: Vec<DayRecord>,
    /// Wall-clock time the load finished.
    pub loaded_at: DateTime<Utc>,
    /// How long reading, enriching and aggregating took.
    pub load_time: Duration,
}

impl EnrichedDataset {
    /// Read `path`, attach labels and derive the daily view.
    pub fn load(path: &Path) -> Result<Self> {
        let started = Instant::now();
        let hours = load_hour_records(path)?;
        let days = aggregate_to_daily(&hours);
        Ok(Self {
            source: path.to_path_buf(),
            hours,
            days,
            loaded_at: Utc::now(),
            load_time: started.elapsed(),
        })
    }
}

// ── DatasetStore ──────────────────────────────────────────────────────────────

/// Owner of the cached [`EnrichedDataset`].
///
/// # Example
/// ```no_run
/// use bikeshare_runtime::dataset_store::DatasetStore;
///
/// let mut store = DatasetStore::new("data/hour.csv");
/// if let Ok(dataset) = store.dataset() {
///     println!("{} hourly rows", dataset.hours.len());
/// }
/// ```
#[derive(Debug)]
pub struct DatasetStore {
    source: PathBuf,
    cache: Option<EnrichedDataset>,
    last_error: Option<String>,
}

impl DatasetStore {
    /// Create a store for `source`. Nothing is read until [`Self::dataset`].
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cache: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// The cached dataset, loading it first if nothing is cached.
    pub fn dataset(&mut self) -> Result<&EnrichedDataset> {
        match self.cache {
            Some(ref dataset) => {
                tracing::debug!(source = %self.source.display(), "returning cached dataset");
                Ok(dataset)
            }
            None => self.reload(),
        }
    }

    /// Load the source again regardless of the cache.
    ///
    /// On failure the error is recorded in [`Self::last_error`] and any
    /// previously cached dataset is kept.
    pub fn reload(&mut self) -> Result<&EnrichedDataset> {
        match EnrichedDataset::load(&self.source) {
            Ok(dataset) => {
                tracing::info!(
                    source = %dataset.source.display(),
                    hours = dataset.hours.len(),
                    days = dataset.days.len(),
                    load_ms = dataset.load_time.as_millis() as u64,
                    "dataset loaded"
                );
                self.last_error = None;
                Ok(self.cache.insert(dataset))
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source.display(),
                    error = %e,
                    kept_previous = self.cache.is_some(),
                    "dataset load failed"
                );
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop the cached dataset so the next [`Self::dataset`] call reloads.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        tracing::debug!("dataset cache invalidated");
    }

    /// Point the store at another file. Returns `true` when the path changed,
    /// in which case the cache is invalidated.
    pub fn set_source(&mut self, source: impl Into<PathBuf>) -> bool {
        let source = source.into();
        if source == self.source {
            return false;
        }
        tracing::debug!(from = %self.source.display(), to = %source.display(), "dataset source changed");
        self.source = source;
        self.last_error = None;
        self.invalidate_cache();
        true
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The cached dataset without triggering a load.
    pub fn cached(&self) -> Option<&EnrichedDataset> {
        self.cache.as_ref()
    }

    /// Time since the cached dataset was loaded, or `None` if nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache
            .as_ref()
            .and_then(|d| (Utc::now() - d.loaded_at).to_std().ok())
    }

    /// Message of the most recent failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_core::error::DashboardError;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "instant,dteday,season,yr,mnth,hr,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt";

    /// Write a CSV with one row per `(date, hour, cnt)`.
    fn write_csv(dir: &Path, name: &str, rows: &[(&str, u8, u64)]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for (i, (date, hr, cnt)) in rows.iter().enumerate() {
            writeln!(
                file,
                "{},{date},1,0,1,{hr},0,6,0,1,0.24,0.2879,0.81,0,0,{cnt},{cnt}",
                i + 1
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn test_nothing_loads_before_first_use() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 5)]);
        let store = DatasetStore::new(&path);
        assert!(store.cached().is_none());
        assert!(store.cache_age().is_none());
        assert!(store.last_error().is_none());
        assert_eq!(store.source(), path.as_path());
    }

    #[test]
    fn test_dataset_loads_and_aggregates() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(
            tmp.path(),
            "hour.csv",
            &[("2011-01-01", 0, 10), ("2011-01-01", 1, 20), ("2011-01-02", 0, 5)],
        );
        let mut store = DatasetStore::new(&path);

        let dataset = store.dataset().unwrap();
        assert_eq!(dataset.hours.len(), 3);
        assert_eq!(dataset.days.len(), 2);
        assert_eq!(dataset.days[0].count, 30);
        assert_eq!(dataset.source, path);
        assert!(store.cache_age().is_some());
    }

    #[test]
    fn test_dataset_is_memoized_until_invalidated() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 10)]);
        let mut store = DatasetStore::new(&path);
        let first_loaded_at = store.dataset().unwrap().loaded_at;

        // Changing the file does not affect the cached copy.
        write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 10), ("2011-01-02", 0, 7)]);
        let cached = store.dataset().unwrap();
        assert_eq!(cached.hours.len(), 1);
        assert_eq!(cached.loaded_at, first_loaded_at);

        store.invalidate_cache();
        assert!(store.cached().is_none());
        assert_eq!(store.dataset().unwrap().hours.len(), 2);
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 10)]);
        let mut store = DatasetStore::new(&path);
        store.dataset().unwrap();

        write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 99)]);
        assert_eq!(store.reload().unwrap().hours[0].count, 99);
    }

    #[test]
    fn test_missing_file_records_error() {
        let tmp = TempDir::new().unwrap();
        let mut store = DatasetStore::new(tmp.path().join("absent.csv"));
        let err = store.dataset().unwrap_err();
        assert!(matches!(err, DashboardError::DataPathNotFound(_)));
        assert!(store.last_error().unwrap().contains("absent.csv"));
        assert!(store.cached().is_none());
    }

    #[test]
    fn test_failed_reload_keeps_previous_dataset() {
        let tmp = TempDir::new().unwrap();
        let path = write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 10)]);
        let mut store = DatasetStore::new(&path);
        store.dataset().unwrap();

        std::fs::write(&path, format!("{HEADER}\n1,2011-01-01,1,0,1,31,0,6,0,1,0.2,0.2,0.8,0,0,1,1\n"))
            .unwrap();
        assert!(store.reload().is_err());
        assert!(store.last_error().is_some());

        let kept = store.dataset().unwrap();
        assert_eq!(kept.hours.len(), 1);
        assert_eq!(kept.hours[0].count, 10);
    }

    #[test]
    fn test_successful_load_clears_last_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hour.csv");
        let mut store = DatasetStore::new(&path);
        assert!(store.dataset().is_err());

        write_csv(tmp.path(), "hour.csv", &[("2011-01-01", 0, 10)]);
        store.dataset().unwrap();
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_set_source_invalidates_only_on_change() {
        let tmp = TempDir::new().unwrap();
        let a = write_csv(tmp.path(), "a.csv", &[("2011-01-01", 0, 1)]);
        let b = write_csv(tmp.path(), "b.csv", &[("2011-01-01", 0, 1), ("2011-01-01", 1, 2)]);
        let mut store = DatasetStore::new(&a);
        store.dataset().unwrap();

        assert!(!store.set_source(&a));
        assert!(store.cached().is_some());

        assert!(store.set_source(&b));
        assert!(store.cached().is_none());
        assert_eq!(store.dataset().unwrap().hours.len(), 2);
        assert_eq!(store.source(), b.as_path());
    }
}
