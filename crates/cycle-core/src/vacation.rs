//! Vacation-day extraction from the per-cycle vacation payload.

use std::collections::BTreeSet;

use chrono::DateTime;
use serde_json::Value;
use tracing::debug;

use crate::calendar::CalendarDate;
use crate::error::{CycleError, Result};
use crate::fields;

/// Shift applied to every vacation timestamp to land on local-day boundaries.
pub const LOCAL_DAY_OFFSET_SECS: i64 = 4 * 3600;

/// Extra shift applied to the last vacation entry of each cycle.
///
/// Keeps an end-of-vacation stamp sitting exactly on a local midnight from
/// spilling into the following day.
pub const LAST_ENTRY_NUDGE_SECS: i64 = 1;

/// Collect the unique vacation dates across all bill cycles, ascending.
///
/// Expects `payload.billCycles[*].vacation[*].timeStamp` (seconds since the
/// epoch). Cycles whose `vacation` list is absent, `null` or empty add
/// nothing.
pub fn extract_vacation_dates(data: &Value) -> Result<Vec<CalendarDate>> {
    let payload = fields::require(data, "payload", "")?;
    let cycles = fields::require_array(payload, "billCycles", "payload")?;

    let mut days = BTreeSet::new();
    for (ci, cycle) in cycles.iter().enumerate() {
        let path = format!("payload.billCycles[{}]", ci);
        let Some(vacation) = fields::optional(cycle, "vacation", &path)? else {
            continue;
        };
        let entries = vacation.as_array().ok_or_else(|| CycleError::TypeMismatch {
            field: fields::join(&path, "vacation"),
            expected: "array",
            found: fields::type_name(vacation),
        })?;

        for (i, entry) in entries.iter().enumerate() {
            let entry_path = format!("{}.vacation[{}]", path, i);
            let nudge = if i + 1 == entries.len() {
                LAST_ENTRY_NUDGE_SECS
            } else {
                0
            };
            let stamp = fields::require(entry, "timeStamp", &entry_path)?;
            days.insert(vacation_day(stamp, nudge, &entry_path)?);
        }
    }

    debug!("Extracted {} vacation days from {} bill cycles", days.len(), cycles.len());
    Ok(days.into_iter().collect())
}

fn vacation_day(stamp: &Value, nudge: i64, path: &str) -> Result<CalendarDate> {
    let field = fields::join(path, "timeStamp");
    let shift = LOCAL_DAY_OFFSET_SECS + nudge;

    let adjusted = if let Some(secs) = stamp.as_i64() {
        secs.checked_sub(shift)
            .ok_or_else(|| CycleError::DateFormat(format!("{} (timestamp {})", field, secs)))?
    } else if let Some(secs) = stamp.as_f64() {
        (secs - shift as f64).floor() as i64
    } else {
        return Err(CycleError::TypeMismatch {
            field,
            expected: "number",
            found: fields::type_name(stamp),
        });
    };

    DateTime::from_timestamp(adjusted, 0)
        .map(|dt| dt.date_naive().into())
        .ok_or_else(|| CycleError::DateFormat(format!("{} (timestamp {})", field, adjusted)))
}
