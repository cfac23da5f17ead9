use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DashboardError, Result};
use crate::models::{Season, WeatherSituation};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Explore hourly bike-sharing rentals by date, season and weather
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bikeshare-dashboard",
    about = "Explore hourly bike-sharing rentals by date, season and weather",
    version
)]
pub struct Settings {
    /// Hourly rentals CSV (auto-discovered if not specified)
    #[arg(long, default_value = "auto")]
    pub data: String,

    /// First day to include (YYYY-MM-DD, defaults to the earliest day in the data)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, defaults to the latest day in the data)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Season to include, by name or code (repeatable; none = all seasons)
    #[arg(long = "season")]
    pub seasons: Vec<Season>,

    /// Weather situation to include, by name or code (repeatable; none = all)
    #[arg(long = "weather")]
    pub weather: Vec<WeatherSituation>,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.bikeshare-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".bikeshare-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used params");
                Self::default()
            }
        }
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── OutputFormat ───────────────────────────────────────────────────────────────

/// How the dashboard report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(DashboardError::Config(format!(
                "unsupported report format {other:?} (expected text or json)"
            ))),
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used params");
            }
            return Self::resolve_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Filters are never persisted: each run starts from
        // the full dataset unless narrowed explicitly.
        if !is_arg_explicitly_set(&matches, "data") {
            if let Some(v) = last.data {
                settings.data = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::resolve_debug(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used params");
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn resolve_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The report format to render.
    ///
    /// Clap restricts `--format` itself, but a value merged from the
    /// persisted file is unchecked and surfaces here as a `Config` error.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }

    /// `true` when the data path should be discovered rather than taken as-is.
    pub fn data_is_auto(&self) -> bool {
        self.data == "auto"
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            // "auto" is the default; storing it would mask a later explicit path.
            data: (!s.data_is_auto()).then(|| s.data.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            data: Some("/srv/bikes/hour.csv".to_string()),
            format: Some("json".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.data, Some("/srv/bikes/hour.csv".to_string()));
        assert_eq!(loaded.format, Some("json".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).data.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let loaded = LastUsedParams::load_from(&path);
        assert!(loaded.data.is_none());
        assert!(loaded.format.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["bikeshare-dashboard"]);
        assert_eq!(settings.data, "auto");
        assert!(settings.start.is_none());
        assert!(settings.end.is_none());
        assert!(settings.seasons.is_empty());
        assert!(settings.weather.is_empty());
        assert_eq!(settings.format, "text");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_filters() {
        let settings = Settings::parse_from([
            "bikeshare-dashboard",
            "--start",
            "2011-03-01",
            "--end",
            "2011-05-31",
            "--season",
            "spring",
            "--season",
            "2",
            "--weather",
            "clear",
        ]);
        assert_eq!(settings.start, NaiveDate::from_ymd_opt(2011, 3, 1));
        assert_eq!(settings.end, NaiveDate::from_ymd_opt(2011, 5, 31));
        assert_eq!(settings.seasons, vec![Season::Spring, Season::Summer]);
        assert_eq!(settings.weather, vec![WeatherSituation::Clear]);
    }

    #[test]
    fn test_settings_cli_rejects_unknown_season() {
        let result = Settings::try_parse_from(["bikeshare-dashboard", "--season", "monsoon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_cli_rejects_bad_date() {
        let result = Settings::try_parse_from(["bikeshare-dashboard", "--start", "03/01/2011"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_settings_skips_auto_data() {
        let settings = Settings::parse_from(["bikeshare-dashboard", "--format", "json"]);
        let last = LastUsedParams::from(&settings);
        assert!(last.data.is_none());
        assert_eq!(last.format, Some("json".to_string()));
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_data_path() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data: Some("/srv/bikes/hour.csv".to_string()),
            format: Some("json".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["bikeshare-dashboard".into()], &config_path);
        assert_eq!(settings.data, "/srv/bikes/hour.csv");
        assert_eq!(settings.format, "json");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data: Some("/srv/bikes/hour.csv".to_string()),
            format: Some("json".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "bikeshare-dashboard".into(),
                "--data".into(),
                "other.csv".into(),
                "--format".into(),
                "text".into(),
            ],
            &config_path,
        );
        assert_eq!(settings.data, "other.csv");
        assert_eq!(settings.format, "text");

        let persisted = LastUsedParams::load_from(&config_path);
        assert_eq!(persisted.data, Some("other.csv".to_string()));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            format: Some("json".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare-dashboard".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.format, "text");
    }

    #[test]
    fn test_output_format_parses_known_values() {
        let settings = Settings::parse_from(["bikeshare-dashboard", "--format", "json"]);
        assert_eq!(settings.output_format().unwrap(), OutputFormat::Json);
        assert_eq!("Text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
    }

    #[test]
    fn test_unsupported_persisted_format_is_config_error() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            format: Some("yaml".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["bikeshare-dashboard".into()], &config_path);
        assert_eq!(settings.format, "yaml");
        let err = settings.output_format().unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
        assert!(err.to_string().contains("yaml"));
    }

    #[test]
    fn test_save_to_unwritable_parent_is_io_error() {
        let tmp = TempDir::new().expect("tempdir");
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let err = LastUsedParams::default()
            .save_to(&blocker.join("last_used.json"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Io(_)));
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare-dashboard".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
