//! The statistics engine: pure derivations over habits and completion
//! records.
//!
//! Every operation takes the full input slices plus an explicit reference
//! date and recomputes from scratch. Nothing here reads the clock, performs
//! I/O, or keeps state between calls; callers that want caching memoize by
//! input identity themselves.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{StatsConfig, WeekStart};
use crate::error::StatsResult;
use crate::models::completion::{normalize_records, CompletionRecord, DayRecord};
use crate::models::habit::Habit;

// ── Derived types ────────────────────────────────────────────────────────────

/// One day of a weekly or monthly progress series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub label: String,
    pub percent_complete: f64,
    /// Distinct habits with at least one completed record that day.
    pub completed_count: usize,
    pub total_habits: usize,
}

/// Joint "perfect day" streaks across the whole active habit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointStreaks {
    pub current: u32,
    pub longest: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
    pub completion_rate: f64,
    pub streak: u32,
    pub total_completions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerHabitStats {
    pub habit_id: Uuid,
    pub name: String,
    pub completion_rate: f64,
    pub streak: u32,
    pub total_completions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestDay {
    pub date: NaiveDate,
    pub completed_count: usize,
}

/// The full derived statistics set, recomputed per call and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_habits: usize,
    pub overall_completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub weekly_progress: Vec<ProgressEntry>,
    pub monthly_progress: Vec<ProgressEntry>,
    pub per_habit: Vec<PerHabitStats>,
    pub top_habits: Vec<PerHabitStats>,
    pub best_day: Option<BestDay>,
    pub total_completions: u64,
    pub average_daily_completions: f64,
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Seven entries for the week containing `reference_date`.
///
/// Per day: distinct active habits with at least one completed record,
/// divided by the active habit count. An empty habit set yields zeroed
/// entries, never a division error.
pub fn compute_weekly_progress(
    habits: &[Habit],
    records: &[CompletionRecord],
    reference_date: NaiveDate,
    week_starts_on: WeekStart,
) -> StatsResult<Vec<ProgressEntry>> {
    let active = active_habits(habits);
    let ids = id_set(&active);
    let normalized = normalize_records(records)?;
    let by_day = completed_by_day(&ids, &normalized);
    Ok(progress_entries(
        &week_days(reference_date, week_starts_on),
        "%a",
        active.len(),
        &by_day,
    ))
}

/// One entry per day of the trailing window ending at `reference_date`,
/// oldest first. Same per-day aggregation as the weekly series.
pub fn compute_monthly_progress(
    habits: &[Habit],
    records: &[CompletionRecord],
    reference_date: NaiveDate,
    window_days: u32,
) -> StatsResult<Vec<ProgressEntry>> {
    let active = active_habits(habits);
    let ids = id_set(&active);
    let normalized = normalize_records(records)?;
    let by_day = completed_by_day(&ids, &normalized);
    Ok(progress_entries(
        &trailing_days(reference_date, window_days),
        "%b %d",
        active.len(),
        &by_day,
    ))
}

/// Current and longest joint streak over the trailing window.
///
/// A day is perfect iff every active habit has at least one completed
/// record on it. An empty habit set is never perfect: a vacuous streak of
/// arbitrary length would be misleading.
pub fn compute_joint_streaks(
    habits: &[Habit],
    records: &[CompletionRecord],
    reference_date: NaiveDate,
    window_days: u32,
) -> StatsResult<JointStreaks> {
    let active = active_habits(habits);
    let ids = id_set(&active);
    let normalized = normalize_records(records)?;
    let by_day = completed_by_day(&ids, &normalized);
    Ok(joint_streaks(
        &trailing_days(reference_date, window_days),
        active.len(),
        &by_day,
    ))
}

/// Windowed completion rate, trailing-run streak, and lifetime completion
/// count for a single habit.
pub fn compute_habit_stats(
    habit: &Habit,
    records: &[CompletionRecord],
    reference_date: NaiveDate,
    window_days: u32,
) -> StatsResult<HabitStats> {
    let normalized = normalize_records(records)?;
    Ok(habit_stats(
        habit,
        &normalized,
        &trailing_days(reference_date, window_days),
    ))
}

/// Stable descending sort by completion rate, truncated to `n`. Ties keep
/// their input order.
pub fn compute_top_habits(per_habit: &[PerHabitStats], n: usize) -> Vec<PerHabitStats> {
    let mut ranked = per_habit.to_vec();
    ranked.sort_by(|a, b| {
        b.completion_rate
            .partial_cmp(&a.completion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// The day with the highest completed-habit count.
///
/// The scan runs in input order and only replaces on a strictly greater
/// count, so the earliest max-count day wins. A non-empty all-zero input
/// yields its first day with count 0; only an empty input yields `None`.
pub fn compute_best_day(daily_counts: &[(NaiveDate, usize)]) -> Option<BestDay> {
    let mut best: Option<BestDay> = None;
    for &(date, completed_count) in daily_counts {
        let replace = match best {
            Some(b) => completed_count > b.completed_count,
            None => true,
        };
        if replace {
            best = Some(BestDay {
                date,
                completed_count,
            });
        }
    }
    best
}

/// Assemble the full [`Statistics`] set.
///
/// Mirrors the display layer's short-circuit: an empty active habit set or
/// an empty record set returns the zeroed result with empty series and no
/// best day.
pub fn compute_statistics(
    habits: &[Habit],
    records: &[CompletionRecord],
    reference_date: NaiveDate,
    config: &StatsConfig,
) -> StatsResult<Statistics> {
    let active = active_habits(habits);

    tracing::debug!(
        habits = active.len(),
        records = records.len(),
        window_days = config.window_days,
        %reference_date,
        "computing statistics"
    );

    if active.is_empty() || records.is_empty() {
        return Ok(Statistics {
            total_habits: active.len(),
            ..Statistics::default()
        });
    }

    let ids = id_set(&active);
    let normalized = normalize_records(records)?;
    let by_day = completed_by_day(&ids, &normalized);

    let window = trailing_days(reference_date, config.window_days);
    let week = week_days(reference_date, config.week_starts_on);

    let weekly_progress = progress_entries(&week, "%a", active.len(), &by_day);
    let monthly_progress = progress_entries(&window, "%b %d", active.len(), &by_day);
    let streaks = joint_streaks(&window, active.len(), &by_day);

    let per_habit: Vec<PerHabitStats> = active
        .iter()
        .map(|habit| {
            let stats = habit_stats(habit, &normalized, &window);
            PerHabitStats {
                habit_id: habit.id,
                name: habit.name.clone(),
                completion_rate: stats.completion_rate,
                streak: stats.streak,
                total_completions: stats.total_completions,
            }
        })
        .collect();

    let top_habits = compute_top_habits(&per_habit, config.top_habits);

    let daily_counts: Vec<(NaiveDate, usize)> = window
        .iter()
        .map(|day| (*day, by_day.get(day).map_or(0, HashSet::len)))
        .collect();
    let best_day = compute_best_day(&daily_counts);

    let mut total_completions = 0u64;
    let mut windowed_completions = 0u64;
    let bounds = window.first().zip(window.last());
    for rec in &normalized {
        if !rec.completed || !ids.contains(&rec.habit_id) {
            continue;
        }
        total_completions += 1;
        if let Some((start, end)) = bounds {
            if rec.day >= *start && rec.day <= *end {
                windowed_completions += 1;
            }
        }
    }

    // Distinct completed (habit, day) pairs against what the window could
    // hold, so the rate is bounded at 100 even with duplicate records.
    let overall_completion_rate = if window.is_empty() {
        0.0
    } else {
        let completed_pairs: usize = daily_counts.iter().map(|&(_, c)| c).sum();
        completed_pairs as f64 / (active.len() * window.len()) as f64 * 100.0
    };

    let average_daily_completions = if window.is_empty() {
        0.0
    } else {
        windowed_completions as f64 / window.len() as f64
    };

    Ok(Statistics {
        total_habits: active.len(),
        overall_completion_rate,
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        weekly_progress,
        monthly_progress,
        per_habit,
        top_habits,
        best_day,
        total_completions,
        average_daily_completions,
    })
}

// ── Internals ────────────────────────────────────────────────────────────────

fn active_habits(habits: &[Habit]) -> Vec<&Habit> {
    habits.iter().filter(|h| h.is_active()).collect()
}

fn id_set(active: &[&Habit]) -> HashSet<Uuid> {
    active.iter().map(|h| h.id).collect()
}

/// Days of the trailing window ending at `reference_date`, oldest first.
/// Each calendar day appears exactly once.
fn trailing_days(reference_date: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    (0..i64::from(window_days))
        .rev()
        .map(|back| reference_date - Duration::days(back))
        .collect()
}

/// The seven days of the week containing `reference_date`.
fn week_days(reference_date: NaiveDate, week_starts_on: WeekStart) -> Vec<NaiveDate> {
    let back = match week_starts_on {
        WeekStart::Monday => reference_date.weekday().num_days_from_monday(),
        WeekStart::Sunday => reference_date.weekday().num_days_from_sunday(),
    };
    let start = reference_date - Duration::days(i64::from(back));
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}

/// Which active habits completed on which day, at-least-one semantics per
/// (habit, day) pair. Records for unknown or archived habits are ignored.
fn completed_by_day(
    active_ids: &HashSet<Uuid>,
    records: &[DayRecord],
) -> HashMap<NaiveDate, HashSet<Uuid>> {
    let mut by_day: HashMap<NaiveDate, HashSet<Uuid>> = HashMap::new();
    for rec in records {
        if rec.completed && active_ids.contains(&rec.habit_id) {
            by_day.entry(rec.day).or_default().insert(rec.habit_id);
        }
    }
    by_day
}

fn progress_entries(
    days: &[NaiveDate],
    label_format: &str,
    total_habits: usize,
    by_day: &HashMap<NaiveDate, HashSet<Uuid>>,
) -> Vec<ProgressEntry> {
    days.iter()
        .map(|day| {
            let completed_count = by_day.get(day).map_or(0, HashSet::len);
            let percent_complete = if total_habits > 0 {
                completed_count as f64 / total_habits as f64 * 100.0
            } else {
                0.0
            };
            ProgressEntry {
                label: day.format(label_format).to_string(),
                percent_complete,
                completed_count,
                total_habits,
            }
        })
        .collect()
}

fn joint_streaks(
    days: &[NaiveDate],
    total_habits: usize,
    by_day: &HashMap<NaiveDate, HashSet<Uuid>>,
) -> JointStreaks {
    if total_habits == 0 {
        return JointStreaks {
            current: 0,
            longest: 0,
        };
    }

    let perfect = |day: &NaiveDate| {
        by_day
            .get(day)
            .map_or(false, |done| done.len() == total_habits)
    };

    // Newest first: consecutive perfect days ending at the reference date,
    // stopping at the first miss.
    let mut current = 0u32;
    for day in days.iter().rev() {
        if perfect(day) {
            current += 1;
        } else {
            break;
        }
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    for day in days {
        if perfect(day) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    JointStreaks { current, longest }
}

fn habit_stats(habit: &Habit, records: &[DayRecord], days: &[NaiveDate]) -> HabitStats {
    let (start, end) = match days.first().zip(days.last()) {
        Some((s, e)) => (*s, *e),
        None => {
            return HabitStats {
                completion_rate: 0.0,
                streak: 0,
                total_completions: 0,
            }
        }
    };

    let mut windowed = 0u64;
    let mut windowed_completed = 0u64;
    let mut total_completions = 0u64;
    let mut completed_days: HashSet<NaiveDate> = HashSet::new();
    for rec in records {
        if rec.habit_id != habit.id {
            continue;
        }
        if rec.completed {
            total_completions += 1;
        }
        if rec.day >= start && rec.day <= end {
            windowed += 1;
            if rec.completed {
                windowed_completed += 1;
                completed_days.insert(rec.day);
            }
        }
    }

    let completion_rate = if windowed > 0 {
        windowed_completed as f64 / windowed as f64 * 100.0
    } else {
        0.0
    };

    // Oldest-to-newest scan with a reset on every miss; the final counter is
    // the trailing unbroken run ending at the reference date. This scan
    // order is contractual, not incidental.
    let mut streak = 0u32;
    for day in days {
        if completed_days.contains(day) {
            streak += 1;
        } else {
            streak = 0;
        }
    }

    HabitStats {
        completion_rate,
        streak,
        total_completions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn habit(name: &str) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.into(),
            category: None,
            frequency: crate::models::habit::HabitFrequency::Daily,
            target: 1,
            created_at: d(2026, 1, 1),
            archived_at: None,
        }
    }

    fn done_on(by_day: &mut HashMap<NaiveDate, HashSet<Uuid>>, habit: &Habit, day: NaiveDate) {
        by_day.entry(day).or_default().insert(habit.id);
    }

    // ── windows ──────────────────────────────────────────────────────────

    #[test]
    fn test_trailing_days_span() {
        let days = trailing_days(d(2026, 8, 6), 30);
        assert_eq!(days.len(), 30);
        assert_eq!(days[0], d(2026, 7, 8));
        assert_eq!(days[29], d(2026, 8, 6));
    }

    #[test]
    fn test_trailing_days_zero_window_is_empty() {
        assert!(trailing_days(d(2026, 8, 6), 0).is_empty());
    }

    #[test]
    fn test_week_days_monday_start() {
        // 2026-08-06 is a Thursday
        let days = week_days(d(2026, 8, 6), WeekStart::Monday);
        assert_eq!(days[0], d(2026, 8, 3));
        assert_eq!(days[6], d(2026, 8, 9));
    }

    #[test]
    fn test_week_days_sunday_start() {
        let days = week_days(d(2026, 8, 6), WeekStart::Sunday);
        assert_eq!(days[0], d(2026, 8, 2));
        assert_eq!(days[6], d(2026, 8, 8));
    }

    #[test]
    fn test_week_days_on_the_boundary_day() {
        let mon = d(2026, 8, 3);
        assert_eq!(week_days(mon, WeekStart::Monday)[0], mon);
        let sun = d(2026, 8, 2);
        assert_eq!(week_days(sun, WeekStart::Sunday)[0], sun);
    }

    // ── joint streaks ────────────────────────────────────────────────────

    #[test]
    fn test_joint_streak_stops_at_first_miss() {
        let a = habit("a");
        let days = trailing_days(d(2026, 8, 6), 10);
        let mut by_day = HashMap::new();
        done_on(&mut by_day, &a, d(2026, 8, 6));
        done_on(&mut by_day, &a, d(2026, 8, 5));
        // gap on Aug 4
        done_on(&mut by_day, &a, d(2026, 8, 3));
        done_on(&mut by_day, &a, d(2026, 8, 2));
        done_on(&mut by_day, &a, d(2026, 8, 1));

        let streaks = joint_streaks(&days, 1, &by_day);
        assert_eq!(streaks.current, 2);
        assert_eq!(streaks.longest, 3, "older run is longer than the current one");
    }

    #[test]
    fn test_joint_streak_zero_when_reference_day_missed() {
        let a = habit("a");
        let days = trailing_days(d(2026, 8, 6), 10);
        let mut by_day = HashMap::new();
        done_on(&mut by_day, &a, d(2026, 8, 5));

        let streaks = joint_streaks(&days, 1, &by_day);
        assert_eq!(streaks.current, 0);
        assert_eq!(streaks.longest, 1);
    }

    #[test]
    fn test_joint_streak_requires_every_habit() {
        let a = habit("a");
        let b = habit("b");
        let days = trailing_days(d(2026, 8, 6), 5);
        let mut by_day = HashMap::new();
        done_on(&mut by_day, &a, d(2026, 8, 6));
        done_on(&mut by_day, &b, d(2026, 8, 6));
        done_on(&mut by_day, &a, d(2026, 8, 5));

        let streaks = joint_streaks(&days, 2, &by_day);
        assert_eq!(streaks.current, 1, "Aug 5 is not perfect for two habits");
    }

    #[test]
    fn test_empty_habit_set_is_never_perfect() {
        let days = trailing_days(d(2026, 8, 6), 5);
        let streaks = joint_streaks(&days, 0, &HashMap::new());
        assert_eq!(streaks, JointStreaks { current: 0, longest: 0 });
    }

    // ── per-habit stats ──────────────────────────────────────────────────

    fn day_record(habit: &Habit, day: NaiveDate, completed: bool) -> DayRecord {
        DayRecord {
            habit_id: habit.id,
            day,
            completed,
            value: 1,
        }
    }

    #[test]
    fn test_habit_streak_is_the_trailing_run() {
        let a = habit("a");
        let days = trailing_days(d(2026, 8, 6), 7);
        // Completed every day except Aug 4: the earlier run must not count.
        let records: Vec<DayRecord> = days
            .iter()
            .filter(|day| **day != d(2026, 8, 4))
            .map(|day| day_record(&a, *day, true))
            .collect();

        let stats = habit_stats(&a, &records, &days);
        assert_eq!(stats.streak, 2);
    }

    #[test]
    fn test_habit_streak_resets_to_zero_on_trailing_miss() {
        let a = habit("a");
        let days = trailing_days(d(2026, 8, 6), 7);
        let records: Vec<DayRecord> = days[..6]
            .iter()
            .map(|day| day_record(&a, *day, true))
            .collect();

        let stats = habit_stats(&a, &records, &days);
        assert_eq!(stats.streak, 0, "a miss on the reference day zeroes the streak");
    }

    #[test]
    fn test_habit_completion_rate_is_windowed_but_totals_are_not() {
        let a = habit("a");
        let days = trailing_days(d(2026, 8, 6), 7);
        let records = vec![
            day_record(&a, d(2026, 8, 6), true),
            day_record(&a, d(2026, 8, 5), false),
            // Outside the window: counts toward totals only.
            day_record(&a, d(2026, 1, 15), true),
        ];

        let stats = habit_stats(&a, &records, &days);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.total_completions, 2);
    }

    #[test]
    fn test_habit_stats_without_records_is_zero_not_nan() {
        let a = habit("a");
        let days = trailing_days(d(2026, 8, 6), 7);
        let stats = habit_stats(&a, &[], &days);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.streak, 0);
    }

    // ── top habits ───────────────────────────────────────────────────────

    fn ranked(name: &str, rate: f64) -> PerHabitStats {
        PerHabitStats {
            habit_id: Uuid::new_v4(),
            name: name.into(),
            completion_rate: rate,
            streak: 0,
            total_completions: 0,
        }
    }

    #[test]
    fn test_top_habits_ties_keep_input_order() {
        let stats = vec![ranked("x", 50.0), ranked("y", 50.0), ranked("z", 80.0)];
        let top = compute_top_habits(&stats, 3);
        assert_eq!(top[0].name, "z");
        assert_eq!(top[1].name, "x");
        assert_eq!(top[2].name, "y");
    }

    #[test]
    fn test_top_habits_truncates() {
        let stats = vec![ranked("a", 10.0), ranked("b", 20.0), ranked("c", 30.0)];
        assert_eq!(compute_top_habits(&stats, 2).len(), 2);
    }

    // ── best day ─────────────────────────────────────────────────────────

    #[test]
    fn test_best_day_earliest_max_wins() {
        let counts = vec![(d(2026, 8, 1), 1), (d(2026, 8, 2), 3), (d(2026, 8, 3), 3)];
        let best = compute_best_day(&counts).unwrap();
        assert_eq!(best.date, d(2026, 8, 2));
        assert_eq!(best.completed_count, 3);
    }

    #[test]
    fn test_best_day_all_zero_returns_first_day() {
        let counts = vec![(d(2026, 8, 1), 0), (d(2026, 8, 2), 0)];
        let best = compute_best_day(&counts).unwrap();
        assert_eq!(best.date, d(2026, 8, 1));
        assert_eq!(best.completed_count, 0);
    }

    #[test]
    fn test_best_day_empty_window_is_none() {
        assert_eq!(compute_best_day(&[]), None);
    }

    // ── progress entries ─────────────────────────────────────────────────

    #[test]
    fn test_progress_with_no_habits_is_zero_not_nan() {
        let days = trailing_days(d(2026, 8, 6), 3);
        let entries = progress_entries(&days, "%b %d", 0, &HashMap::new());
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.percent_complete, 0.0);
            assert_eq!(entry.total_habits, 0);
        }
    }

    #[test]
    fn test_progress_labels() {
        let days = week_days(d(2026, 8, 6), WeekStart::Monday);
        let entries = progress_entries(&days, "%a", 0, &HashMap::new());
        assert_eq!(entries[0].label, "Mon");
        assert_eq!(entries[6].label, "Sun");

        let monthly = progress_entries(&[d(2026, 8, 6)], "%b %d", 0, &HashMap::new());
        assert_eq!(monthly[0].label, "Aug 06");
    }
}
