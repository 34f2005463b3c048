use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StatsError, StatsResult};

/// A completion record exactly as the storage collaborator delivers it.
///
/// `date` is an ISO-8601 string that may carry a time-of-day component;
/// resolution to a calendar day happens inside the engine and is the only
/// fallible step of any derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub habit_id: Uuid,
    pub date: String,
    pub completed: bool,
    pub value: Option<i32>,
    pub duration_secs: Option<i64>,
}

/// A completion record with its date resolved to calendar-day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRecord {
    pub habit_id: Uuid,
    pub day: NaiveDate,
    pub completed: bool,
    pub value: i32,
}

impl CompletionRecord {
    /// Strip any time-of-day component and resolve `date` to a `NaiveDate`.
    ///
    /// Accepts plain dates (`2026-08-06`), RFC 3339 timestamps with an
    /// offset, and bare datetimes without one. Anything else fails the call
    /// identifying the offending record; coercing a bad date to "now" or an
    /// epoch default would corrupt streak math undetectably.
    pub fn normalize(&self) -> StatsResult<DayRecord> {
        let day = parse_day(&self.date).ok_or_else(|| StatsError::InvalidDate {
            habit_id: self.habit_id,
            date: self.date.clone(),
        })?;
        Ok(DayRecord {
            habit_id: self.habit_id,
            day,
            completed: self.completed,
            value: self.value.unwrap_or(1),
        })
    }
}

/// Normalize a whole input slice, failing on the first bad record.
pub fn normalize_records(records: &[CompletionRecord]) -> StatsResult<Vec<DayRecord>> {
    records.iter().map(CompletionRecord::normalize).collect()
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    None
}
