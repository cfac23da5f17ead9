//! Hour-of-day usage tiers.
//!
//! Mean rentals per hour-of-day are split into four equal-width bins between
//! the smallest and largest observed mean. Bins are right-closed: a mean on an
//! inner boundary falls into the lower bin, the minimum falls into the first
//! bin and the maximum into the last.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bikeshare_core::models::{HourRecord, Tier};

/// Number of equal-width bins.
pub const TIER_COUNT: usize = 4;

/// Tier given to every hour when all hourly means are equal.
pub const FLAT_PROFILE_TIER: Tier = Tier::Low;

/// Mean rentals and assigned tier for one hour-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyUsage {
    pub hour: u8,
    pub mean_rentals: f64,
    pub tier: Tier,
}

/// Mean total rentals per hour-of-day over the hours present in `hours`.
///
/// Hours with no rows are omitted rather than reported as zero.
pub fn hourly_means(hours: &[HourRecord]) -> BTreeMap<u8, f64> {
    let mut sums: BTreeMap<u8, (u64, u64)> = BTreeMap::new();
    for record in hours {
        let (total, n) = sums.entry(record.hour).or_default();
        *total += record.count;
        *n += 1;
    }
    sums.into_iter()
        .map(|(hour, (total, n))| (hour, total as f64 / n as f64))
        .collect()
}

/// Assign a tier to each hour of an hour → mean map.
pub fn classify_means(means: &BTreeMap<u8, f64>) -> BTreeMap<u8, Tier> {
    let Some((min, max)) = value_bounds(means.values().copied()) else {
        return BTreeMap::new();
    };
    means
        .iter()
        .map(|(hour, mean)| (*hour, tier_for(*mean, min, max)))
        .collect()
}

/// Tier for every hour-of-day present in `hours`. Empty input gives an empty map.
pub fn classify_hours(hours: &[HourRecord]) -> BTreeMap<u8, Tier> {
    classify_means(&hourly_means(hours))
}

/// Hour, mean and tier rows in hour order.
pub fn hourly_usage(hours: &[HourRecord]) -> Vec<HourlyUsage> {
    let means = hourly_means(hours);
    let tiers = classify_means(&means);
    means
        .into_iter()
        .filter_map(|(hour, mean_rentals)| {
            tiers.get(&hour).map(|tier| HourlyUsage {
                hour,
                mean_rentals,
                tier: *tier,
            })
        })
        .collect()
}

fn value_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Bin `value` within `[min, max]`.
fn tier_for(value: f64, min: f64, max: f64) -> Tier {
    if max <= min {
        return FLAT_PROFILE_TIER;
    }
    let width = (max - min) / TIER_COUNT as f64;
    let bin = (0..TIER_COUNT - 1)
        .find(|i| value <= min + width * (*i as f64 + 1.0))
        .unwrap_or(TIER_COUNT - 1);
    Tier::from_bin(bin)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
