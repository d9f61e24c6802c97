//! Proportional allocation of cycle totals across rate-plan buckets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CycleError, Result};
use crate::fields;

// ── Bucket layout ─────────────────────────────────────────────────────────────

/// One rate-plan bucket: the key it has in the raw payload and the name it
/// carries in canonical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBucket {
    pub raw_key: &'static str,
    pub name: &'static str,
}

/// Time-of-use buckets in allocation order. The last one absorbs rounding.
pub const TOU_BUCKETS: [RateBucket; 3] = [
    RateBucket { raw_key: "On-Peak", name: "on-peak" },
    RateBucket { raw_key: "Mid-Peak", name: "mid-peak" },
    RateBucket { raw_key: "Off-Peak", name: "off-peak" },
];

/// Tier buckets in ascending tier order. The last one absorbs rounding.
pub const TIER_BUCKETS: [RateBucket; 3] = [
    RateBucket { raw_key: "0", name: "0" },
    RateBucket { raw_key: "1", name: "1" },
    RateBucket { raw_key: "2", name: "2" },
];

/// Rate plan families found in raw cycle records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatePlan {
    TimeOfUse,
    Tiered,
}

impl RatePlan {
    /// Key of the detail object inside a raw cycle record.
    pub fn detail_key(self) -> &'static str {
        match self {
            RatePlan::TimeOfUse => "touDetails",
            RatePlan::Tiered => "tierDetails",
        }
    }

    /// Key of the bucket map inside the detail object.
    pub fn map_key(self) -> &'static str {
        match self {
            RatePlan::TimeOfUse => "touRrcMap",
            RatePlan::Tiered => "tierRrcMap",
        }
    }

    pub fn buckets(self) -> &'static [RateBucket] {
        match self {
            RatePlan::TimeOfUse => &TOU_BUCKETS,
            RatePlan::Tiered => &TIER_BUCKETS,
        }
    }
}

// ── Allocation ────────────────────────────────────────────────────────────────

/// Raw consumption and cost reported for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawBucket {
    pub consumption: f64,
    pub cost: f64,
}

/// A bucket's share of the cycle totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketShare {
    pub name: &'static str,
    pub consumption: f64,
    pub cost: f64,
}

/// Split `total` in proportion to `raw`.
///
/// Every share but the last is rounded (half to even); the last share is
/// `total` minus the others, so the shares always sum to `total`. When the
/// raw figures sum to zero every share is zero.
pub fn proportional_split(total: f64, raw: &[f64]) -> Vec<f64> {
    let raw_sum: f64 = raw.iter().sum();
    if raw_sum == 0.0 {
        return vec![0.0; raw.len()];
    }

    let mut shares = Vec::with_capacity(raw.len());
    let mut assigned = 0.0;
    for (i, value) in raw.iter().enumerate() {
        if i + 1 == raw.len() {
            shares.push(total - assigned);
        } else {
            let share = (total * (value / raw_sum)).round_ties_even();
            assigned += share;
            shares.push(share);
        }
    }
    shares
}

/// Allocate cycle totals across the buckets of `plan`.
///
/// Consumption and cost are split independently of each other. `raw` is
/// indexed like [`RatePlan::buckets`].
pub fn allocate(
    plan: RatePlan,
    total_consumption: f64,
    total_cost: f64,
    raw: &[RawBucket],
) -> Vec<BucketShare> {
    let consumption: Vec<f64> = raw.iter().map(|b| b.consumption).collect();
    let cost: Vec<f64> = raw.iter().map(|b| b.cost).collect();
    let consumption = proportional_split(total_consumption, &consumption);
    let cost = proportional_split(total_cost, &cost);

    plan.buckets()
        .iter()
        .zip(consumption.into_iter().zip(cost))
        .map(|(bucket, (consumption, cost))| BucketShare {
            name: bucket.name,
            consumption,
            cost,
        })
        .collect()
}

/// Read the raw bucket figures of `plan` from one raw cycle record.
///
/// Returns `None` when the record carries no detail object or an empty or
/// null bucket map. Absent buckets and absent figures count as zero.
pub fn read_raw_buckets(
    plan: RatePlan,
    record: &Value,
    path: &str,
) -> Result<Option<Vec<RawBucket>>> {
    let Some(details) = fields::optional(record, plan.detail_key(), path)? else {
        return Ok(None);
    };
    let details_path = fields::join(path, plan.detail_key());
    let Some(map) = fields::optional(details, plan.map_key(), &details_path)? else {
        return Ok(None);
    };
    let map_path = fields::join(&details_path, plan.map_key());
    let map = fields::as_object(map, &map_path)?;
    if map.is_empty() {
        return Ok(None);
    }

    plan.buckets()
        .iter()
        .map(|bucket| {
            let Some(entry) = map.get(bucket.raw_key) else {
                return Ok(RawBucket::default());
            };
            let entry_path = fields::join(&map_path, bucket.raw_key);
            if !entry.is_object() {
                return Err(CycleError::TypeMismatch {
                    field: entry_path,
                    expected: "object",
                    found: fields::type_name(entry),
                });
            }
            Ok(RawBucket {
                consumption: fields::f64_or(entry, "tierConsKwh", &entry_path, 0.0)?,
                cost: fields::f64_or(entry, "tierCost", &entry_path, 0.0)?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
