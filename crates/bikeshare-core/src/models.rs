//! Record types and fixed category lookup tables for the rental dataset.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ── Category labels ───────────────────────────────────────────────────────────

/// Meteorological season, coded 1-4 in the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// All seasons in code order.
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Map a source code to its season. Codes outside 1-4 have no label.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
            Season::Winter => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Weather situation, coded 1-4 from clear to heavy precipitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeatherSituation {
    #[serde(rename = "Clear")]
    Clear,
    #[serde(rename = "Misty/Cloudy")]
    Misty,
    #[serde(rename = "Light Rain/Snow")]
    LightPrecipitation,
    #[serde(rename = "Heavy Rain/Snow")]
    HeavyPrecipitation,
}

impl WeatherSituation {
    /// All weather situations in code order.
    pub const ALL: [WeatherSituation; 4] = [
        WeatherSituation::Clear,
        WeatherSituation::Misty,
        WeatherSituation::LightPrecipitation,
        WeatherSituation::HeavyPrecipitation,
    ];

    /// Map a source code to its weather situation. Codes outside 1-4 have no label.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(WeatherSituation::Clear),
            2 => Some(WeatherSituation::Misty),
            3 => Some(WeatherSituation::LightPrecipitation),
            4 => Some(WeatherSituation::HeavyPrecipitation),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            WeatherSituation::Clear => 1,
            WeatherSituation::Misty => 2,
            WeatherSituation::LightPrecipitation => 3,
            WeatherSituation::HeavyPrecipitation => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherSituation::Clear => "Clear",
            WeatherSituation::Misty => "Misty/Cloudy",
            WeatherSituation::LightPrecipitation => "Light Rain/Snow",
            WeatherSituation::HeavyPrecipitation => "Heavy Rain/Snow",
        }
    }
}

/// Day of the week as coded by the dataset: 0 is Sunday, 6 is Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Display order used by the weekday charts (Monday first, Sunday last).
    pub const DISPLAY_ORDER: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Map a source code to its weekday. Codes outside 0-6 have no label.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Weekday::Sunday),
            1 => Some(Weekday::Monday),
            2 => Some(Weekday::Tuesday),
            3 => Some(Weekday::Wednesday),
            4 => Some(Weekday::Thursday),
            5 => Some(Weekday::Friday),
            6 => Some(Weekday::Saturday),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    /// Position in [`Weekday::DISPLAY_ORDER`].
    pub fn display_index(self) -> usize {
        match self {
            Weekday::Sunday => 6,
            other => (other.code() - 1) as usize,
        }
    }
}

/// Ordinal usage tier assigned to an hour-of-day by the hourly classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Tier {
    /// Tiers from the lowest-usage bin to the highest.
    pub const ALL: [Tier; 4] = [Tier::Low, Tier::Moderate, Tier::High, Tier::VeryHigh];

    /// Tier for a zero-based bin index; indices past the top clamp to `VeryHigh`.
    pub fn from_bin(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "Low",
            Tier::Moderate => "Moderate",
            Tier::High => "High",
            Tier::VeryHigh => "Very High",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(Season, WeatherSituation, Weekday, Tier);

/// Lower-case a label and drop everything that is not alphanumeric, so that
/// `"Misty/Cloudy"`, `"misty-cloudy"` and `"MISTY CLOUDY"` compare equal.
fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve `s` against `candidates` by numeric code or normalised label.
fn parse_category<T: Copy>(
    s: &str,
    candidates: &[T],
    code: impl Fn(T) -> i32,
    label: impl Fn(T) -> &'static str,
) -> Result<T, DashboardError> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i32>() {
        if let Some(found) = candidates.iter().copied().find(|c| code(*c) == n) {
            return Ok(found);
        }
    }
    let wanted = normalize_label(trimmed);
    candidates
        .iter()
        .copied()
        .find(|c| normalize_label(label(*c)) == wanted)
        .ok_or_else(|| DashboardError::UnknownLabel(s.to_string()))
}

impl FromStr for Season {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(s, &Season::ALL, Season::code, Season::label)
    }
}

impl FromStr for WeatherSituation {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(
            s,
            &WeatherSituation::ALL,
            WeatherSituation::code,
            WeatherSituation::label,
        )
    }
}

// ── HourRecord ────────────────────────────────────────────────────────────────

/// One observed hour of rentals with its calendar and weather context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    /// Calendar day of the observation (no time zone).
    pub date: NaiveDate,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Season code (1-4).
    pub season: i32,
    /// Year indicator (0 = first year of the dataset).
    pub year: i32,
    /// Month, 1-12.
    pub month: i32,
    /// 1 when the day is a public holiday.
    pub holiday: i32,
    /// Weekday code, 0 = Sunday.
    pub weekday: i32,
    /// 1 when the day is neither weekend nor holiday.
    pub working_day: i32,
    /// Weather situation code (1-4).
    pub weather: i32,
    /// Normalised temperature.
    pub temp: f64,
    /// Normalised feel-like temperature.
    pub atemp: f64,
    /// Normalised humidity.
    pub humidity: f64,
    /// Normalised wind speed.
    pub wind_speed: f64,
    pub casual: u64,
    pub registered: u64,
    /// Total rentals; `casual + registered` by convention of the source.
    pub count: u64,
    pub season_label: Option<Season>,
    pub weather_label: Option<WeatherSituation>,
    pub weekday_label: Option<Weekday>,
}

impl HourRecord {
    /// Re-derive the three label fields from their codes.
    pub fn attach_labels(&mut self) {
        self.season_label = Season::from_code(self.season);
        self.weather_label = WeatherSituation::from_code(self.weather);
        self.weekday_label = Weekday::from_code(self.weekday);
    }
}

// ── DayRecord ─────────────────────────────────────────────────────────────────

/// One calendar day, always derived from the day's hour records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub season: i32,
    pub year: i32,
    pub month: i32,
    pub holiday: i32,
    pub weekday: i32,
    pub working_day: i32,
    /// Weather code of the day's first hour; weather may vary within a day.
    pub weather: i32,
    /// Mean over the day's hours.
    pub temp: f64,
    pub atemp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    /// Sum over the day's hours.
    pub casual: u64,
    pub registered: u64,
    pub count: u64,
    pub season_label: Option<Season>,
    pub weather_label: Option<WeatherSituation>,
    pub weekday_label: Option<Weekday>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
