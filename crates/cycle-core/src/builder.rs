//! Raw cycle records → canonical cycle records.
//!
//! A batch is all-or-nothing: the first schema error in any record aborts the
//! pass and no partial list is returned.

use std::ops::RangeInclusive;

use serde_json::Value;
use tracing::debug;

use crate::allocation::{self, BucketShare, RatePlan};
use crate::calendar::{self, CalendarDate, HolidayCalendar, HolidayEntry};
use crate::error::Result;
use crate::fields;
use crate::itemization::ItemizationConfig;
use crate::models::{
    CanonicalCycleRecord, Itemization, Location, NormalizedBatch, RateAllocation,
    RateBucketAmount,
};
use crate::vacation;

/// Raw fields with no place in the canonical schema.
pub const RAW_ONLY_FIELDS: [&str; 19] = [
    "intervalStart",
    "intervalEnd",
    "intervalStartDate",
    "intervalEndDate",
    "isWeekend",
    "isOngoingInterval",
    "isMissingDataInterval",
    "isTimestampPresent",
    "isBoundaryInterval",
    "peakDemand",
    "peakDemandCharges",
    "solarUser",
    "seasonalBillCycle",
    "estimatedConsumption",
    "solarGeneration",
    "userType",
    "miscCharges",
    "energyCharges",
    "fixedChargeApplicable",
];

/// Raw fields the builder reads.
const CONSUMED_FIELDS: [&str; 8] = [
    "intervalStartDateFormatted",
    "intervalEndDateFormatted",
    "consumption",
    "cost",
    "temperature",
    "touDetails",
    "tierDetails",
    "itemizationDetailsList",
];

// ── NormalizeOptions ──────────────────────────────────────────────────────────

/// Batch-wide normalization settings, passed by value to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Years for which holidays are generated.
    pub holiday_years: RangeInclusive<i32>,
    /// Drop weekday substitutes of weekend holidays.
    pub exclude_observed: bool,
    pub itemization: ItemizationConfig,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            holiday_years: 2016..=2025,
            exclude_observed: true,
            itemization: ItemizationConfig::default(),
        }
    }
}

// ── AssembledCycle ────────────────────────────────────────────────────────────

/// One cycle with every field derived but numbers not yet truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCycle {
    pub start: CalendarDate,
    pub end: CalendarDate,
    pub consumption: f64,
    pub cost: f64,
    pub num_days: i64,
    pub holidays: Vec<String>,
    pub num_vacation: usize,
    pub temperature: Option<f64>,
    pub tou: Option<Vec<BucketShare>>,
    pub tier: Option<Vec<BucketShare>>,
    pub itemization: Itemization,
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Truncate bucket figures so they still sum to the truncated totals.
///
/// Every bucket but the last is truncated on its own; the last one takes
/// `total - others`. All-zero shares (zero raw figures) stay zero.
fn truncate_buckets(
    shares: Option<Vec<BucketShare>>,
    consumption: i64,
    cost: i64,
) -> RateAllocation {
    let Some(shares) = shares else {
        return RateAllocation::Unavailable;
    };
    let consumption = exact_parts(shares.iter().map(|s| s.consumption), consumption);
    let cost = exact_parts(shares.iter().map(|s| s.cost), cost);
    RateAllocation::Available(
        shares
            .iter()
            .zip(consumption.into_iter().zip(cost))
            .map(|(share, (consumption, cost))| RateBucketAmount {
                name: share.name.to_string(),
                consumption,
                cost,
            })
            .collect(),
    )
}

fn exact_parts(parts: impl Iterator<Item = f64>, total: i64) -> Vec<i64> {
    let parts: Vec<f64> = parts.collect();
    let mut truncated: Vec<i64> = parts.iter().copied().map(truncate).collect();
    if parts.iter().all(|p| *p == 0.0) {
        return truncated;
    }
    if let Some((last, others)) = truncated.split_last_mut() {
        let assigned = others.iter().fold(0i64, |acc, p| acc.saturating_add(*p));
        *last = total.saturating_sub(assigned);
    }
    truncated
}

impl AssembledCycle {
    fn into_canonical(self) -> CanonicalCycleRecord {
        let consumption = truncate(self.consumption);
        let cost = truncate(self.cost);
        CanonicalCycleRecord {
            start: self.start,
            end: self.end,
            consumption,
            cost,
            num_days: self.num_days,
            num_holidays: self.holidays.len(),
            num_vacation: self.num_vacation,
            holidays: self.holidays,
            temperature: self.temperature.map(truncate),
            tou: truncate_buckets(self.tou, consumption, cost),
            tier: truncate_buckets(self.tier, consumption, cost),
            itemization: self.itemization,
        }
    }
}

/// Truncate every floating-point field of the batch to an integer.
///
/// Runs once over the whole batch after all records are assembled.
pub fn finalize(cycles: Vec<AssembledCycle>) -> Vec<CanonicalCycleRecord> {
    cycles.into_iter().map(AssembledCycle::into_canonical).collect()
}

// ── CycleBuilder ──────────────────────────────────────────────────────────────

/// Converts single raw records using cycle-independent batch context.
///
/// Records share no state besides the borrowed context, so any order of
/// calls to [`build`](Self::build) produces the same cycles.
pub struct CycleBuilder<'a> {
    holidays: &'a [HolidayEntry],
    vacation_dates: &'a [CalendarDate],
    itemization: &'a ItemizationConfig,
}

impl<'a> CycleBuilder<'a> {
    pub fn new(
        holidays: &'a [HolidayEntry],
        vacation_dates: &'a [CalendarDate],
        itemization: &'a ItemizationConfig,
    ) -> Self {
        Self {
            holidays,
            vacation_dates,
            itemization,
        }
    }

    /// Assemble one raw record. `path` prefixes field names in errors.
    pub fn build(&self, raw: &Value, path: &str) -> Result<AssembledCycle> {
        let start_text = fields::require_str(raw, "intervalStartDateFormatted", path)?;
        let end_text = fields::require_str(raw, "intervalEndDateFormatted", path)?;
        let num_days = calendar::day_count(start_text, end_text)?;
        let start = CalendarDate::parse(start_text)?;
        let end = CalendarDate::parse(end_text)?;

        let holidays: Vec<String> = self
            .holidays
            .iter()
            .filter(|h| h.date.within(start, end))
            .map(|h| h.name.clone())
            .collect();
        let num_vacation = self
            .vacation_dates
            .iter()
            .filter(|d| d.within(start, end))
            .count();

        log_ignored_fields(raw, path);

        let consumption = fields::require_f64(raw, "consumption", path)?;
        let cost = fields::require_f64(raw, "cost", path)?;
        let temperature = fields::nullable_f64(raw, "temperature", path)?;

        let tou = allocate_plan(RatePlan::TimeOfUse, raw, path, consumption, cost)?;
        let tier = allocate_plan(RatePlan::Tiered, raw, path, consumption, cost)?;
        let itemization = self.itemization.normalize_record(raw, path)?;

        Ok(AssembledCycle {
            start,
            end,
            consumption,
            cost,
            num_days,
            holidays,
            num_vacation,
            temperature,
            tou,
            tier,
            itemization,
        })
    }
}

fn allocate_plan(
    plan: RatePlan,
    raw: &Value,
    path: &str,
    consumption: f64,
    cost: f64,
) -> Result<Option<Vec<BucketShare>>> {
    Ok(allocation::read_raw_buckets(plan, raw, path)?
        .map(|buckets| allocation::allocate(plan, consumption, cost, &buckets)))
}

fn log_ignored_fields(raw: &Value, path: &str) {
    let Some(object) = raw.as_object() else {
        return;
    };
    for key in object.keys() {
        let key = key.as_str();
        if !CONSUMED_FIELDS.contains(&key) && !RAW_ONLY_FIELDS.contains(&key) {
            debug!("{}: ignoring unrecognised field \"{}\"", path, key);
        }
    }
}

// ── Batch pipeline ────────────────────────────────────────────────────────────

/// Read the location block from the metadata payload.
pub fn read_location(metadata: &Value) -> Result<Location> {
    Ok(Location {
        city: fields::nullable_text(metadata, "city", "")?,
        state: fields::nullable_text(metadata, "state", "")?,
        country: fields::require_str(metadata, "country", "")?.to_string(),
        zip: fields::nullable_text(metadata, "zip", "")?,
    })
}

/// Normalize one user's payloads into canonical cycles plus location.
///
/// `usage` holds `payload.usageChartDataList`, `metadata` the location
/// fields and `vacation` the `payload.billCycles` list. Output cycles keep
/// the input record order.
pub fn normalize(
    usage: &Value,
    metadata: &Value,
    vacation: &Value,
    options: &NormalizeOptions,
) -> Result<NormalizedBatch> {
    let payload = fields::require(usage, "payload", "")?;
    let records = fields::require_array(payload, "usageChartDataList", "payload")?;
    let location = read_location(metadata)?;

    let vacation_dates = vacation::extract_vacation_dates(vacation)?;
    let holidays = HolidayCalendar::new(&location.country, location.state.as_deref())?
        .holidays_in_range(
            options.holiday_years.clone(),
            options.exclude_observed,
            &vacation_dates,
        );
    debug!(
        "Normalizing {} records with {} holidays and {} vacation days",
        records.len(),
        holidays.len(),
        vacation_dates.len()
    );

    let builder = CycleBuilder::new(&holidays, &vacation_dates, &options.itemization);
    let assembled = records
        .iter()
        .enumerate()
        .map(|(i, raw)| builder.build(raw, &format!("payload.usageChartDataList[{}]", i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedBatch {
        cycles: finalize(assembled),
        location,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::RawBucket;
    use crate::error::CycleError;
    use crate::models::RatePlanKind;
    use serde_json::json;

    fn metadata() -> Value {
        json!({"city": "Austin", "state": "TX", "country": "US", "zip": "78701"})
    }

    fn no_vacation() -> Value {
        json!({"payload": {"billCycles": []}})
    }

    fn raw_cycle(start: &str, end: &str) -> Value {
        json!({
            "intervalStart": 1_704_067_200,
            "intervalEnd": 1_706_745_599,
            "intervalStartDateFormatted": start,
            "intervalEndDateFormatted": end,
            "consumption": 812.6,
            "cost": 131.9,
            "temperature": 48.3,
            "isWeekend": false,
            "peakDemand": 4.2,
            "touDetails": {"touRrcMap": {
                "On-Peak": {"tierConsKwh": 100, "tierCost": 30},
                "Mid-Peak": {"tierConsKwh": 100, "tierCost": 30},
                "Off-Peak": {"tierConsKwh": 100, "tierCost": 30}
            }},
            "tierDetails": null,
            "itemizationDetailsList": [
                {"category": "cooking", "usage": 50.5, "cost": 8.1},
                {"category": "pool", "usage": 120, "cost": 19}
            ]
        })
    }

    fn usage(records: Vec<Value>) -> Value {
        json!({"payload": {"usageChartDataList": records}})
    }

    // ── Single-record assembly ──────────────────────────────────────────────

    #[test]
    fn test_build_derives_calendar_fields() {
        let holidays = holidays_in_2024();
        let vacation = [
            CalendarDate::parse("2024-01-10").unwrap(),
            CalendarDate::parse("2024-02-10").unwrap(),
        ];
        let config = ItemizationConfig::default();
        let builder = CycleBuilder::new(&holidays, &vacation, &config);

        let cycle = builder
            .build(&raw_cycle("2024-01-01", "2024-01-31"), "row")
            .unwrap();
        assert_eq!(cycle.num_days, 31);
        assert_eq!(
            cycle.holidays,
            vec!["New Year's Day", "Martin Luther King Jr. Day"]
        );
        assert_eq!(cycle.num_vacation, 1);
    }

    fn holidays_in_2024() -> Vec<HolidayEntry> {
        HolidayCalendar::new("US", None)
            .unwrap()
            .holidays_in_range(2024..=2024, true, &[])
    }

    #[test]
    fn test_build_allocates_rate_plans() {
        let config = ItemizationConfig::default();
        let builder = CycleBuilder::new(&[], &[], &config);
        let cycle = builder
            .build(&raw_cycle("2024-01-01", "2024-01-31"), "row")
            .unwrap();

        let tou = cycle.tou.unwrap();
        assert_eq!(tou.len(), 3);
        assert_eq!(tou[0].consumption, 271.0);
        assert_eq!(tou[1].consumption, 271.0);
        let sum: f64 = tou.iter().map(|s| s.consumption).sum();
        assert_eq!(sum, 812.6);
        assert!(cycle.tier.is_none());
    }

    #[test]
    fn test_missing_key_is_reported_with_path() {
        let config = ItemizationConfig::default();
        let builder = CycleBuilder::new(&[], &[], &config);
        let mut raw = raw_cycle("2024-01-01", "2024-01-31");
        raw.as_object_mut().unwrap().remove("cost");

        let err = builder.build(&raw, "row").unwrap_err();
        assert_eq!(err.to_string(), "Missing field: row.cost");
    }

    #[test]
    fn test_bad_date_is_batch_fatal() {
        let config = ItemizationConfig::default();
        let builder = CycleBuilder::new(&[], &[], &config);
        let err = builder
            .build(&raw_cycle("01/01/2024", "2024-01-31"), "row")
            .unwrap_err();
        assert!(err.is_batch_fatal());
    }

    // ── Batch pipeline ──────────────────────────────────────────────────────

    #[test]
    fn test_normalize_truncates_and_orders() {
        let data = usage(vec![
            raw_cycle("2024-01-01", "2024-01-31"),
            raw_cycle("2024-02-01", "2024-02-29"),
        ]);
        let batch =
            normalize(&data, &metadata(), &no_vacation(), &NormalizeOptions::default()).unwrap();

        assert_eq!(batch.cycles.len(), 2);
        assert_eq!(batch.cycles[0].start.to_string(), "2024-01-01");
        assert_eq!(batch.cycles[1].start.to_string(), "2024-02-01");

        let first = &batch.cycles[0];
        assert_eq!(first.consumption, 812);
        assert_eq!(first.cost, 131);
        assert_eq!(first.temperature, Some(48));
        assert_eq!(first.rate_plan(), RatePlanKind::TimeOfUse);

        let buckets = first.tou.buckets();
        assert_eq!(
            buckets.iter().map(|b| b.consumption).collect::<Vec<_>>(),
            vec![271, 271, 270]
        );
        assert_eq!(
            buckets.iter().map(|b| b.cost).collect::<Vec<_>>(),
            vec![44, 44, 43]
        );

        let items = first.itemization.as_map().unwrap();
        assert_eq!(items.get("pool"), Some([120, 19]));
        assert_eq!(items.get("otherGeneralUsage"), Some([50, 8]));

        assert_eq!(batch.location.city.as_deref(), Some("Austin"));
    }

    #[test]
    fn test_normalize_applies_vacation_to_holidays() {
        // Vacation on MLK day 2024 (Jan 15); the stamp is not the cycle's
        // last entry so no nudge applies.
        let vacation = json!({"payload": {"billCycles": [
            {"vacation": [{"timeStamp": 1_705_312_800}, {"timeStamp": 1_705_420_800}]}
        ]}});
        let data = usage(vec![raw_cycle("2024-01-01", "2024-01-31")]);
        let batch = normalize(&data, &metadata(), &vacation, &NormalizeOptions::default()).unwrap();

        let cycle = &batch.cycles[0];
        assert_eq!(cycle.holidays, vec!["New Year's Day"]);
        assert_eq!(cycle.num_holidays, 1);
        assert_eq!(cycle.num_vacation, 2);
    }

    #[test]
    fn test_normalize_without_combination() {
        let options = NormalizeOptions {
            itemization: ItemizationConfig::default().without_combination(),
            ..NormalizeOptions::default()
        };
        let data = usage(vec![raw_cycle("2024-01-01", "2024-01-31")]);
        let batch = normalize(&data, &metadata(), &no_vacation(), &options).unwrap();
        let items = batch.cycles[0].itemization.as_map().unwrap();
        assert_eq!(items.len(), 12);
        assert_eq!(items.get("cooking"), Some([50, 8]));
    }

    #[test]
    fn test_one_bad_record_aborts_batch() {
        let mut bad = raw_cycle("2024-02-01", "2024-02-29");
        bad["consumption"] = json!("lots");
        let data = usage(vec![raw_cycle("2024-01-01", "2024-01-31"), bad]);

        let err =
            normalize(&data, &metadata(), &no_vacation(), &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CycleError::TypeMismatch { ref field, .. } if field == "payload.usageChartDataList[1].consumption"
        ));
    }

    #[test]
    fn test_missing_usage_list_is_missing_field() {
        let err = normalize(
            &json!({"payload": {}}),
            &metadata(),
            &no_vacation(),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing field: payload.usageChartDataList");
    }

    #[test]
    fn test_missing_location_key_is_missing_field() {
        let data = usage(vec![]);
        let err = normalize(
            &data,
            &json!({"city": "Austin", "state": "TX", "zip": "78701"}),
            &no_vacation(),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing field: country");
    }

    #[test]
    fn test_null_temperature_is_kept_as_none() {
        let mut raw = raw_cycle("2024-01-01", "2024-01-31");
        raw["temperature"] = Value::Null;
        let data = usage(vec![raw]);
        let batch =
            normalize(&data, &metadata(), &no_vacation(), &NormalizeOptions::default()).unwrap();
        assert_eq!(batch.cycles[0].temperature, None);
    }

    // ── Exact bucket sums ───────────────────────────────────────────────────

    fn bucket_sums(allocation: &RateAllocation) -> (i64, i64) {
        allocation
            .buckets()
            .iter()
            .fold((0, 0), |(c, k), b| (c + b.consumption, k + b.cost))
    }

    #[test]
    fn test_tier_buckets_sum_to_truncated_totals() {
        let mut raw = raw_cycle("2024-01-01", "2024-01-31");
        raw["consumption"] = json!(101.4);
        raw["cost"] = json!(17.9);
        raw["touDetails"] = Value::Null;
        raw["tierDetails"] = json!({"tierRrcMap": {
            "0": {"tierConsKwh": 50, "tierCost": 10},
            "1": {"tierConsKwh": 50, "tierCost": 10},
            "2": {"tierConsKwh": 0, "tierCost": 0}
        }});
        let batch = normalize(
            &usage(vec![raw]),
            &metadata(),
            &no_vacation(),
            &NormalizeOptions::default(),
        )
        .unwrap();

        let cycle = &batch.cycles[0];
        assert_eq!((cycle.consumption, cycle.cost), (101, 17));
        assert_eq!(bucket_sums(&cycle.tier), (101, 17));
        let consumption: Vec<i64> = cycle.tier.buckets().iter().map(|b| b.consumption).collect();
        assert_eq!(consumption, vec![51, 51, -1]);
    }

    #[test]
    fn test_finalize_keeps_exact_sums_for_fractional_totals() {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut next = || {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (state >> 33) % 10_000
        };
        let start = CalendarDate::parse("2024-01-01").unwrap();

        let mut assembled = Vec::new();
        for _ in 0..300 {
            let consumption = next() as f64 / 10.0;
            let cost = next() as f64 / 100.0;
            // Tier 0 is never empty; later tiers may be.
            let raw: Vec<RawBucket> = (0..3u64)
                .map(|i| RawBucket {
                    consumption: (next() % 50 + u64::from(i == 0)) as f64,
                    cost: (next() % 50 + u64::from(i == 0)) as f64,
                })
                .collect();
            let shares = allocation::allocate(RatePlan::Tiered, consumption, cost, &raw);
            assembled.push(AssembledCycle {
                start,
                end: start,
                consumption,
                cost,
                num_days: 1,
                holidays: vec![],
                num_vacation: 0,
                temperature: None,
                tou: None,
                tier: Some(shares),
                itemization: Itemization::Unavailable,
            });
        }

        for cycle in finalize(assembled) {
            let (consumption, cost) = bucket_sums(&cycle.tier);
            assert_eq!(consumption, cycle.consumption, "{:?}", cycle.tier);
            assert_eq!(cost, cycle.cost, "{:?}", cycle.tier);
        }
    }

    #[test]
    fn test_zero_raw_buckets_stay_zero() {
        let start = CalendarDate::parse("2024-01-01").unwrap();
        let shares = allocation::allocate(
            RatePlan::TimeOfUse,
            42.7,
            9.3,
            &[RawBucket::default(); 3],
        );
        let cycle = finalize(vec![AssembledCycle {
            start,
            end: start,
            consumption: 42.7,
            cost: 9.3,
            num_days: 1,
            holidays: vec![],
            num_vacation: 0,
            temperature: None,
            tou: Some(shares),
            tier: None,
            itemization: Itemization::Unavailable,
        }])
        .remove(0);
        assert_eq!(bucket_sums(&cycle.tou), (0, 0));
    }
}
