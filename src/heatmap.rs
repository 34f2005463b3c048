//! Calendar heatmap series for a single habit.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StatsResult;
use crate::models::completion::{normalize_records, CompletionRecord};
use crate::models::habit::Habit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapEntry {
    pub date: NaiveDate,
    pub count: i64,
    pub target: u32,
}

/// Per-day completed totals for one habit over the trailing window,
/// ascending. Days without any completed records are omitted; the consumer
/// renders absent days as empty cells.
pub fn compute_heatmap(
    habit: &Habit,
    records: &[CompletionRecord],
    reference_date: NaiveDate,
    window_days: u32,
) -> StatsResult<Vec<HeatmapEntry>> {
    let normalized = normalize_records(records)?;
    if window_days == 0 {
        return Ok(Vec::new());
    }
    let start = reference_date - Duration::days(i64::from(window_days) - 1);

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for rec in &normalized {
        if rec.habit_id == habit.id
            && rec.completed
            && rec.day >= start
            && rec.day <= reference_date
        {
            *by_day.entry(rec.day).or_insert(0) += i64::from(rec.value);
        }
    }

    Ok(by_day
        .into_iter()
        .map(|(date, count)| HeatmapEntry {
            date,
            count,
            target: habit.target,
        })
        .collect())
}
