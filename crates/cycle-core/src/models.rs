use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;

/// Sentinel written in place of data a cycle does not carry.
pub const UNAVAILABLE: &str = "unavailable";

// ── Location ──────────────────────────────────────────────────────────────────

/// Where the metered home is; attached once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub zip: Option<String>,
}

// ── Rate plan allocation ──────────────────────────────────────────────────────

/// One bucket of a rate-plan allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateBucketAmount {
    /// Canonical bucket name, e.g. `"on-peak"` or `"1"`.
    pub name: String,
    pub consumption: i64,
    pub cost: i64,
}

/// Rate-plan buckets for one plan family, or the `"unavailable"` sentinel.
///
/// Serialises as `{"on-peak": [consumption, cost], ...}` in bucket order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateAllocation {
    Available(Vec<RateBucketAmount>),
    Unavailable,
}

impl RateAllocation {
    pub fn is_available(&self) -> bool {
        matches!(self, RateAllocation::Available(_))
    }

    pub fn buckets(&self) -> &[RateBucketAmount] {
        match self {
            RateAllocation::Available(buckets) => buckets,
            RateAllocation::Unavailable => &[],
        }
    }
}

impl Serialize for RateAllocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RateAllocation::Unavailable => serializer.serialize_str(UNAVAILABLE),
            RateAllocation::Available(buckets) => {
                let mut map = serializer.serialize_map(Some(buckets.len()))?;
                for b in buckets {
                    map.serialize_entry(&b.name, &[b.consumption, b.cost])?;
                }
                map.end()
            }
        }
    }
}

/// Which rate plan a cycle was billed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatePlanKind {
    TimeOfUse,
    Tiered,
    Unavailable,
}

// ── Itemization ───────────────────────────────────────────────────────────────

/// Usage and cost per end-use category, in configured category order.
///
/// Serialises as `{"airConditioning": [usage, cost], ...}` preserving order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemizationMap {
    entries: Vec<(String, [i64; 2])>,
}

impl ItemizationMap {
    /// Build from `(category, [usage, cost])` pairs in display order.
    pub fn from_entries(entries: Vec<(String, [i64; 2])>) -> Self {
        Self { entries }
    }

    pub fn get(&self, category: &str) -> Option<[i64; 2]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, value)| *value)
    }

    /// Category names in display order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, [i64; 2])> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ItemizationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Itemization for one cycle, or the `"unavailable"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Itemization {
    Available(ItemizationMap),
    Unavailable,
}

impl Itemization {
    pub fn as_map(&self) -> Option<&ItemizationMap> {
        match self {
            Itemization::Available(map) => Some(map),
            Itemization::Unavailable => None,
        }
    }
}

impl Serialize for Itemization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Itemization::Available(map) => map.serialize(serializer),
            Itemization::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

// ── CanonicalCycleRecord ──────────────────────────────────────────────────────

/// The normalized, schema-fixed view of one billing cycle.
///
/// Field order here is the serialized field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalCycleRecord {
    #[serde(rename = "IntervalStartDate")]
    pub start: CalendarDate,
    #[serde(rename = "IntervalEndDate")]
    pub end: CalendarDate,
    /// Total consumption in kWh.
    pub consumption: i64,
    pub cost: i64,
    pub num_days: i64,
    pub num_holidays: usize,
    pub num_vacation: usize,
    /// Names of the holidays inside the cycle, ascending by date.
    pub holidays: Vec<String>,
    pub temperature: Option<i64>,
    #[serde(rename = "touDetails")]
    pub tou: RateAllocation,
    #[serde(rename = "tierDetails")]
    pub tier: RateAllocation,
    #[serde(rename = "itemizationDetailsList")]
    pub itemization: Itemization,
}

impl CanonicalCycleRecord {
    /// Time-of-use wins when a cycle reports both plan families.
    pub fn rate_plan(&self) -> RatePlanKind {
        if self.tou.is_available() {
            RatePlanKind::TimeOfUse
        } else if self.tier.is_available() {
            RatePlanKind::Tiered
        } else {
            RatePlanKind::Unavailable
        }
    }

    pub fn has_itemization(&self) -> bool {
        self.itemization.as_map().is_some()
    }
}

/// Output of one normalization pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedBatch {
    #[serde(rename = "usageChartDataList")]
    pub cycles: Vec<CanonicalCycleRecord>,
    pub location: Location,
}

// ── CycleDelta ────────────────────────────────────────────────────────────────

/// Qualitative change in kWh-per-currency-unit between two cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateChange {
    /// More kWh per unit cost in cycle 2, i.e. cheaper electricity.
    #[serde(rename = "lower in cycle2 and higher in cycle1")]
    LowerInCycle2,
    #[serde(rename = "higher in cycle2 and lower in cycle1")]
    HigherInCycle2,
    #[serde(rename = "same")]
    Same,
}

/// Which side of a comparison lacked itemization data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableSide {
    Cycle1,
    Cycle2,
    Both,
}

impl UnavailableSide {
    pub fn describe(self) -> &'static str {
        match self {
            UnavailableSide::Cycle1 => "unavailable in cycle1",
            UnavailableSide::Cycle2 => "unavailable in cycle2",
            UnavailableSide::Both => "unavailable in both cycles",
        }
    }
}

/// Per-category `[usage2 - usage1, cost2 - cost1]`, or why it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemizationDelta {
    Unavailable(UnavailableSide),
    /// Keyed by category, alphabetical. `None` marks a failed subtraction.
    Categories(BTreeMap<String, [Option<i64>; 2]>),
}

impl Serialize for ItemizationDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ItemizationDelta::Unavailable(side) => serializer.serialize_str(side.describe()),
            ItemizationDelta::Categories(map) => map.serialize(serializer),
        }
    }
}

/// Field-by-field difference `cycle2 - cycle1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleDelta {
    pub consumption: Option<f64>,
    pub cost: Option<f64>,
    pub num_days: Option<f64>,
    pub num_holidays: Option<f64>,
    pub num_vacation: Option<f64>,
    pub temperature: Option<f64>,
    pub electricity_rates: Option<RateChange>,
    /// Omitted when both sides are itemized but share no category.
    #[serde(
        rename = "itemizationDetailsList",
        skip_serializing_if = "Option::is_none"
    )]
    pub itemization: Option<ItemizationDelta>,
}
