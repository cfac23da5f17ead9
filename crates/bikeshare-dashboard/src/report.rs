//! Text and JSON rendering of a [`DashboardSnapshot`].

use bikeshare_core::formatting::{
    format_count, format_number, format_optional, format_optional_count,
};
use bikeshare_data::analysis::{month_name, CategoryMean};
use bikeshare_runtime::dashboard::DashboardSnapshot;

/// Serialise the snapshot as pretty-printed JSON.
pub fn render_json(snapshot: &DashboardSnapshot) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Plain-text report for the terminal.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut lines = vec![
        "Bike-Sharing Dashboard".to_string(),
        format!("Source:   {}", snapshot.source.display()),
    ];

    let params = &snapshot.params;
    lines.push(match params.date_range {
        Some(range) => format!("Dates:    {} to {}", range.start(), range.end()),
        None => "Dates:    all".to_string(),
    });
    lines.push(format!(
        "Seasons:  {}",
        joined(params.seasons.iter().map(|s| s.label()))
    ));
    lines.push(format!(
        "Weather:  {}",
        joined(params.weather.iter().map(|w| w.label()))
    ));

    let m = &snapshot.metrics;
    lines.push(String::new());
    lines.push("Key metrics".to_string());
    lines.push(format!("  {:<20}{:>14}", "Total rentals", format_count(m.total_rentals)));
    lines.push(format!(
        "  {:<20}{:>14}",
        "Mean daily rentals",
        format_optional(m.mean_daily_rentals, 2)
    ));
    lines.push(format!(
        "  {:<20}{:>14}",
        "Max daily rentals",
        format_optional_count(m.max_daily_rentals)
    ));
    lines.push(format!("  {:<20}{:>14}", "Days", format_count(m.days as u64)));

    if snapshot.is_empty() {
        lines.push(String::new());
        lines.push("No records match the selected filters.".to_string());
        return lines.join("\n");
    }

    lines.push(String::new());
    lines.push("Hourly usage".to_string());
    lines.push(format!("  {:<6}{:>14}  {}", "Hour", "Mean rentals", "Tier"));
    for row in &snapshot.hourly_usage {
        lines.push(format!(
            "  {:<6}{:>14}  {}",
            format!("{:02}:00", row.hour),
            format_number(row.mean_rentals, 2),
            row.tier
        ));
    }

    push_means(&mut lines, "By season", &snapshot.seasonal, |s| s.label().to_string());
    push_means(&mut lines, "By month", &snapshot.monthly, |m| month_name(*m).to_string());
    push_means(&mut lines, "By weekday", &snapshot.weekday, |d| d.label().to_string());
    push_means(&mut lines, "By weather", &snapshot.weather, |w| w.label().to_string());

    lines.join("\n")
}

/// Append a "mean daily rentals per category" section.
fn push_means<T>(
    lines: &mut Vec<String>,
    title: &str,
    means: &[CategoryMean<T>],
    name: impl Fn(&T) -> String,
) {
    if means.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{title} (mean daily rentals)"));
    for mean in means {
        lines.push(format!(
            "  {:<18}{:>12}  ({} days)",
            name(&mean.category),
            format_number(mean.mean_rentals, 2),
            mean.days
        ));
    }
}

fn joined<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let labels: Vec<&str> = labels.collect();
    if labels.is_empty() {
        "all".to_string()
    } else {
        labels.join(", ")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
