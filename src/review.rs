//! Weekly review: a per-week roll-up of completions against what each
//! habit's schedule made possible.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StatsResult;
use crate::models::completion::{normalize_records, CompletionRecord};
use crate::models::habit::{Habit, HabitFrequency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_completions: i64,
    pub total_possible: i64,
    pub completion_rate: f64,
    pub best_day: Option<String>,
    pub worst_day: Option<String>,
    pub habits: Vec<WeeklyHabitReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHabitReview {
    pub id: Uuid,
    pub name: String,
    pub completed: i64,
    pub possible: i64,
    pub rate: f64,
}

/// Monday of the week containing `date`.
pub fn find_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Monday of the last complete week before the one containing
/// `reference_date`. The usual anchor for a review: the week being reviewed
/// is over.
pub fn previous_week_start(reference_date: NaiveDate) -> NaiveDate {
    find_week_start(reference_date) - Duration::days(7)
}

/// Roll up the Monday-to-Sunday week starting at `week_start`.
pub fn compute_weekly_review(
    habits: &[Habit],
    records: &[CompletionRecord],
    week_start: NaiveDate,
) -> StatsResult<WeeklyReview> {
    let week_end = week_start + Duration::days(6);
    let normalized = normalize_records(records)?;

    let in_week: Vec<_> = normalized
        .iter()
        .filter(|rec| rec.completed && rec.day >= week_start && rec.day <= week_end)
        .collect();

    let mut habit_reviews = Vec::new();
    let mut total_completions: i64 = 0;
    let mut total_possible: i64 = 0;

    for habit in habits.iter().filter(|h| h.is_active()) {
        let completed = in_week
            .iter()
            .filter(|rec| rec.habit_id == habit.id)
            .count() as i64;
        let possible = possible_per_week(habit);
        let rate = if possible > 0 {
            completed as f64 / possible as f64
        } else {
            0.0
        };
        total_completions += completed;
        total_possible += possible;
        habit_reviews.push(WeeklyHabitReview {
            id: habit.id,
            name: habit.name.clone(),
            completed,
            possible,
            rate,
        });
    }

    // Best/worst weekday by completed-record count.
    let day_names = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let mut day_counts = [0i64; 7];
    for rec in &in_week {
        day_counts[rec.day.weekday().num_days_from_monday() as usize] += 1;
    }

    let (best_day, worst_day) = if habit_reviews.is_empty() {
        (None, None)
    } else {
        (
            day_counts
                .iter()
                .enumerate()
                .max_by_key(|(_, &count)| count)
                .map(|(i, _)| day_names[i].to_string()),
            day_counts
                .iter()
                .enumerate()
                .min_by_key(|(_, &count)| count)
                .map(|(i, _)| day_names[i].to_string()),
        )
    };

    let completion_rate = if total_possible > 0 {
        total_completions as f64 / total_possible as f64
    } else {
        0.0
    };

    Ok(WeeklyReview {
        week_start,
        week_end,
        total_completions,
        total_possible,
        completion_rate,
        best_day,
        worst_day,
        habits: habit_reviews,
    })
}

/// How many completions a habit's schedule makes possible in one week.
fn possible_per_week(habit: &Habit) -> i64 {
    match habit.frequency {
        HabitFrequency::Daily => 7,
        HabitFrequency::Weekly => i64::from(habit.target.clamp(1, 7)),
        HabitFrequency::Monthly => 1,
    }
}
