//! Field-by-field comparison of two canonical cycles.
//!
//! Failures here are local: a field that cannot be computed becomes `None`
//! and the rest of the delta is still produced.

use std::collections::BTreeMap;

use crate::error::{CycleError, Result};
use crate::models::{
    CanonicalCycleRecord, CycleDelta, Itemization, ItemizationDelta, NormalizedBatch, RateChange,
    UnavailableSide,
};

/// Ratio shift (kWh per currency unit) at which electricity counts as
/// cheaper or dearer rather than the same.
pub const RATE_CHANGE_THRESHOLD: f64 = 0.5;

/// Round to `digits` decimal places.
///
/// Rounds the exact decimal value of `value`, so `0.15` (stored as
/// 0.1499…) becomes `0.1` and `0.65` (stored as 0.6500…) becomes `0.7`.
pub fn round_to(value: f64, digits: usize) -> f64 {
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

fn delta(first: i64, second: i64) -> Option<f64> {
    second.checked_sub(first).map(|d| round_to(d as f64, 1))
}

fn count_delta(first: usize, second: usize) -> Option<f64> {
    let first = i64::try_from(first).ok()?;
    let second = i64::try_from(second).ok()?;
    delta(first, second)
}

/// Consumption per unit cost, rounded to one decimal; `None` when cost is 0.
pub fn rate_ratio(cycle: &CanonicalCycleRecord) -> Option<f64> {
    if cycle.cost == 0 {
        return None;
    }
    Some(round_to(cycle.consumption as f64 / cycle.cost as f64, 1))
}

/// Classify how the kWh-per-cost ratio moved from `cycle1` to `cycle2`.
pub fn classify_rate_change(
    cycle1: &CanonicalCycleRecord,
    cycle2: &CanonicalCycleRecord,
) -> Option<RateChange> {
    let shift = rate_ratio(cycle2)? - rate_ratio(cycle1)?;
    Some(if shift >= RATE_CHANGE_THRESHOLD {
        RateChange::LowerInCycle2
    } else if shift <= -RATE_CHANGE_THRESHOLD {
        RateChange::HigherInCycle2
    } else {
        RateChange::Same
    })
}

/// Per-category delta over the categories both cycles carry.
///
/// Returns `None` when both sides are itemized but share no category.
pub fn itemization_delta(first: &Itemization, second: &Itemization) -> Option<ItemizationDelta> {
    let (a, b) = match (first.as_map(), second.as_map()) {
        (None, None) => return Some(ItemizationDelta::Unavailable(UnavailableSide::Both)),
        (None, Some(_)) => return Some(ItemizationDelta::Unavailable(UnavailableSide::Cycle1)),
        (Some(_), None) => return Some(ItemizationDelta::Unavailable(UnavailableSide::Cycle2)),
        (Some(a), Some(b)) => (a, b),
    };

    let mut categories = BTreeMap::new();
    for (name, [usage1, cost1]) in a.iter() {
        let Some([usage2, cost2]) = b.get(name) else {
            continue;
        };
        let value = match (usage2.checked_sub(usage1), cost2.checked_sub(cost1)) {
            (Some(usage), Some(cost)) => [Some(usage), Some(cost)],
            _ => [None, None],
        };
        categories.insert(name.to_string(), value);
    }

    if categories.is_empty() {
        None
    } else {
        Some(ItemizationDelta::Categories(categories))
    }
}

/// Compute `cycle2 - cycle1` for every comparable field.
pub fn calculate_difference(
    cycle1: &CanonicalCycleRecord,
    cycle2: &CanonicalCycleRecord,
) -> CycleDelta {
    CycleDelta {
        consumption: delta(cycle1.consumption, cycle2.consumption),
        cost: delta(cycle1.cost, cycle2.cost),
        num_days: delta(cycle1.num_days, cycle2.num_days),
        num_holidays: count_delta(cycle1.num_holidays, cycle2.num_holidays),
        num_vacation: count_delta(cycle1.num_vacation, cycle2.num_vacation),
        temperature: match (cycle1.temperature, cycle2.temperature) {
            (Some(t1), Some(t2)) => delta(t1, t2),
            _ => None,
        },
        electricity_rates: classify_rate_change(cycle1, cycle2),
        itemization: itemization_delta(&cycle1.itemization, &cycle2.itemization),
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Borrow two distinct cycles by 0-based index.
pub fn select_pair(
    cycles: &[CanonicalCycleRecord],
    first: usize,
    second: usize,
) -> Result<(&CanonicalCycleRecord, &CanonicalCycleRecord)> {
    let len = cycles.len();
    let pick = |index: usize| cycles.get(index).ok_or(CycleError::CycleIndex { index, len });
    if first == second {
        pick(first)?;
        return Err(CycleError::SameCycle(first));
    }
    Ok((pick(first)?, pick(second)?))
}

/// The most recent `lookback` cycles, minus the `skip_trailing` newest ones.
///
/// The newest cycles are usually still open or only partly billed.
pub fn comparison_window(
    cycles: &[CanonicalCycleRecord],
    lookback: usize,
    skip_trailing: usize,
) -> &[CanonicalCycleRecord] {
    let start = cycles.len().saturating_sub(lookback);
    let end = cycles.len().saturating_sub(skip_trailing);
    if start >= end {
        &[]
    } else {
        &cycles[start..end]
    }
}

/// Compare two cycles of a batch by 0-based index.
pub fn compare(batch: &NormalizedBatch, first: usize, second: usize) -> Result<CycleDelta> {
    let (cycle1, cycle2) = select_pair(&batch.cycles, first, second)?;
    Ok(calculate_difference(cycle1, cycle2))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
