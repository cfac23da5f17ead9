//! Daily aggregation of hourly records.
//!
//! Every column of a [`DayRecord`] is produced by one entry of the fixed
//! [`DAILY_RECIPE`] table: calendar and weather context take the value of the
//! day's first hour, environmental readings are averaged, and rental counts
//! are summed. The same table drives both the initial and the filtered
//! aggregation paths.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use bikeshare_core::models::{DayRecord, HourRecord, Season, WeatherSituation, Weekday};

// ── Columns and reductions ────────────────────────────────────────────────────

/// A column of the hourly record set that survives into the daily view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Season,
    Year,
    Month,
    Holiday,
    Weekday,
    WorkingDay,
    Weather,
    Temp,
    ATemp,
    Humidity,
    WindSpeed,
    Count,
    Casual,
    Registered,
    SeasonLabel,
    WeatherLabel,
    WeekdayLabel,
}

/// How a column's hourly values collapse into one daily value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Value of the row with the smallest hour-of-day.
    First,
    /// Arithmetic mean over the day's rows.
    Mean,
    /// Sum over the day's rows.
    Sum,
}

/// The fixed per-column reduction recipe for daily aggregation.
pub const DAILY_RECIPE: [(Column, Reduction); 17] = [
    (Column::Season, Reduction::First),
    (Column::Year, Reduction::First),
    (Column::Month, Reduction::First),
    (Column::Holiday, Reduction::First),
    (Column::Weekday, Reduction::First),
    (Column::WorkingDay, Reduction::First),
    (Column::Weather, Reduction::First),
    (Column::Temp, Reduction::Mean),
    (Column::ATemp, Reduction::Mean),
    (Column::Humidity, Reduction::Mean),
    (Column::WindSpeed, Reduction::Mean),
    (Column::Count, Reduction::Sum),
    (Column::Casual, Reduction::Sum),
    (Column::Registered, Reduction::Sum),
    (Column::SeasonLabel, Reduction::First),
    (Column::WeatherLabel, Reduction::First),
    (Column::WeekdayLabel, Reduction::First),
];

impl Column {
    /// Reduction the daily recipe assigns to this column.
    pub fn daily_reduction(self) -> Reduction {
        DAILY_RECIPE
            .iter()
            .find(|(column, _)| *column == self)
            .map(|(_, reduction)| *reduction)
            .unwrap_or(Reduction::First)
    }
}

// ── Cells ─────────────────────────────────────────────────────────────────────

/// A single column value of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Code(i32),
    Real(f64),
    Count(u64),
    Season(Option<Season>),
    Weather(Option<WeatherSituation>),
    Weekday(Option<Weekday>),
}

impl Cell {
    /// Numeric view of the cell; label cells are not numeric.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Cell::Code(v) => Some(f64::from(v)),
            Cell::Real(v) => Some(v),
            Cell::Count(v) => Some(v as f64),
            Cell::Season(_) | Cell::Weather(_) | Cell::Weekday(_) => None,
        }
    }
}

/// Read `column` from an hourly record.
pub fn cell(record: &HourRecord, column: Column) -> Cell {
    match column {
        Column::Season => Cell::Code(record.season),
        Column::Year => Cell::Code(record.year),
        Column::Month => Cell::Code(record.month),
        Column::Holiday => Cell::Code(record.holiday),
        Column::Weekday => Cell::Code(record.weekday),
        Column::WorkingDay => Cell::Code(record.working_day),
        Column::Weather => Cell::Code(record.weather),
        Column::Temp => Cell::Real(record.temp),
        Column::ATemp => Cell::Real(record.atemp),
        Column::Humidity => Cell::Real(record.humidity),
        Column::WindSpeed => Cell::Real(record.wind_speed),
        Column::Count => Cell::Count(record.count),
        Column::Casual => Cell::Count(record.casual),
        Column::Registered => Cell::Count(record.registered),
        Column::SeasonLabel => Cell::Season(record.season_label),
        Column::WeatherLabel => Cell::Weather(record.weather_label),
        Column::WeekdayLabel => Cell::Weekday(record.weekday_label),
    }
}

impl Reduction {
    /// Collapse `cells` (already in first-observed order) into one value.
    ///
    /// Returns `None` for an empty slice, and for `Mean`/`Sum` over cells
    /// that are not numeric.
    pub fn reduce(self, cells: &[Cell]) -> Option<Cell> {
        match self {
            Reduction::First => cells.first().copied(),
            Reduction::Mean => {
                let values = numeric_values(cells)?;
                Some(Cell::Real(values.iter().sum::<f64>() / values.len() as f64))
            }
            Reduction::Sum => {
                if cells.is_empty() {
                    return None;
                }
                let counts: Option<Vec<u64>> = cells
                    .iter()
                    .map(|c| match c {
                        Cell::Count(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                match counts {
                    Some(counts) => Some(Cell::Count(counts.iter().sum())),
                    None => numeric_values(cells).map(|v| Cell::Real(v.iter().sum())),
                }
            }
        }
    }
}

/// All cells as `f64`, or `None` when empty or any cell is a label.
fn numeric_values(cells: &[Cell]) -> Option<Vec<f64>> {
    if cells.is_empty() {
        return None;
    }
    cells.iter().map(|c| c.as_f64()).collect()
}

// ── Reduced day ───────────────────────────────────────────────────────────────

/// Reduced cells for one date, keyed by column.
struct ReducedDay {
    cells: BTreeMap<Column, Cell>,
}

impl ReducedDay {
    /// Apply every recipe entry to the day's hours (first-observed order).
    fn from_hours(hours: &[&HourRecord]) -> Self {
        let cells = DAILY_RECIPE
            .iter()
            .filter_map(|(column, reduction)| {
                let column_cells: Vec<Cell> = hours.iter().map(|h| cell(h, *column)).collect();
                reduction.reduce(&column_cells).map(|c| (*column, c))
            })
            .collect();
        Self { cells }
    }

    fn code(&self, column: Column) -> i32 {
        match self.cells.get(&column) {
            Some(Cell::Code(v)) => *v,
            _ => 0,
        }
    }

    fn real(&self, column: Column) -> f64 {
        self.cells
            .get(&column)
            .and_then(|c| c.as_f64())
            .unwrap_or(f64::NAN)
    }

    fn count(&self, column: Column) -> u64 {
        match self.cells.get(&column) {
            Some(Cell::Count(v)) => *v,
            _ => 0,
        }
    }

    fn into_day_record(self, date: NaiveDate) -> DayRecord {
        let season_label = match self.cells.get(&Column::SeasonLabel) {
            Some(Cell::Season(label)) => *label,
            _ => None,
        };
        let weather_label = match self.cells.get(&Column::WeatherLabel) {
            Some(Cell::Weather(label)) => *label,
            _ => None,
        };
        let weekday_label = match self.cells.get(&Column::WeekdayLabel) {
            Some(Cell::Weekday(label)) => *label,
            _ => None,
        };

        DayRecord {
            date,
            season: self.code(Column::Season),
            year: self.code(Column::Year),
            month: self.code(Column::Month),
            holiday: self.code(Column::Holiday),
            weekday: self.code(Column::Weekday),
            working_day: self.code(Column::WorkingDay),
            weather: self.code(Column::Weather),
            temp: self.real(Column::Temp),
            atemp: self.real(Column::ATemp),
            humidity: self.real(Column::Humidity),
            wind_speed: self.real(Column::WindSpeed),
            casual: self.count(Column::Casual),
            registered: self.count(Column::Registered),
            count: self.count(Column::Count),
            season_label,
            weather_label,
            weekday_label,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Group `hours` by date, each group ordered by hour-of-day.
///
/// The sort is stable, so duplicate hours keep their input order.
pub fn group_by_date(hours: &[HourRecord]) -> BTreeMap<NaiveDate, Vec<&HourRecord>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&HourRecord>> = BTreeMap::new();
    for record in hours {
        groups.entry(record.date).or_default().push(record);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|h| h.hour);
    }
    groups
}

/// Collapse hourly records into one [`DayRecord`] per distinct date.
///
/// Output is sorted by date. Dates with no hourly rows never appear.
pub fn aggregate_to_daily(hours: &[HourRecord]) -> Vec<DayRecord> {
    group_by_date(hours)
        .into_iter()
        .map(|(date, group)| ReducedDay::from_hours(&group).into_day_record(date))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
