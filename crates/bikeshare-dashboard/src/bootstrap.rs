use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bikeshare_core::error::DashboardError;
use bikeshare_core::settings::Settings;
use bikeshare_data::analysis::FilterOptions;
use bikeshare_data::filter::{DateRange, FilterParams};
use bikeshare_runtime::dashboard::default_params;

/// Files probed, in order, when `--data auto` is used.
pub const DATA_CANDIDATES: [&str; 3] = ["dashboard/combined.csv", "data/hour.csv", "hour.csv"];

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised. Log lines go
/// to `log_file` when given, otherwise to stderr so stdout carries only the
/// report.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match log_file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?,
        ),
        None => None,
    };

    let file_layer = file.map(|f| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(f))
    });
    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

/// Map the user-facing level names to tracing filter directives.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// First entry of [`DATA_CANDIDATES`] that is a file under `base`.
pub fn discover_data_path(base: &Path) -> Option<PathBuf> {
    DATA_CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|p| p.is_file())
}

/// The CSV to load: the explicit `--data` path, or a discovered one.
pub fn resolve_data_path(settings: &Settings) -> anyhow::Result<PathBuf> {
    if !settings.data_is_auto() {
        return Ok(PathBuf::from(&settings.data));
    }
    let cwd = std::env::current_dir()?;
    let found = discover_data_path(&cwd)
        .ok_or_else(|| DashboardError::DataPathNotFound(cwd.join(DATA_CANDIDATES[0])))?;
    tracing::debug!(path = %found.display(), "discovered data file");
    Ok(found)
}

// ── Filter parameters ──────────────────────────────────────────────────────────

/// Turn the command-line filters into [`FilterParams`].
///
/// Starts from [`default_params`] and narrows it with the flags given. A
/// missing `--start` or `--end` keeps the dataset's first or last date. An
/// empty `--season`/`--weather` list selects every category.
pub fn filter_params(settings: &Settings, options: &FilterOptions) -> anyhow::Result<FilterParams> {
    let mut params = default_params(options);

    if settings.start.is_some() || settings.end.is_some() {
        let full_span = params.date_range;
        let start = settings.start.or(full_span.map(|r| r.start()));
        let end = settings.end.or(full_span.map(|r| r.end()));
        params.date_range = match (start, end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
            (Some(day), None) | (None, Some(day)) => Some(DateRange::single(day)),
            (None, None) => None,
        };
    }

    params.seasons = settings.seasons.iter().copied().collect();
    params.weather = settings.weather.iter().copied().collect();
    Ok(params)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
