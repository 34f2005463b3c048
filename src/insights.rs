//! Coaching output derived from the computed statistics: per-habit cadence
//! metrics and a deterministic textual insight the display layer can always
//! render without any remote call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StatsResult;
use crate::models::completion::{normalize_records, CompletionRecord};
use crate::models::habit::Habit;
use crate::stats::{compute_top_habits, Statistics};

/// How regularly a habit has been completed since it was first logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCadence {
    pub habit_id: Uuid,
    pub name: String,
    pub first_completion: Option<NaiveDate>,
    pub days_since_first: i64,
    pub total_completions: u64,
    /// Mean gap in days between completions; `None` until there are at
    /// least two completions spread over at least one day.
    pub average_days_between: Option<f64>,
}

pub fn compute_habit_cadence(
    habit: &Habit,
    records: &[CompletionRecord],
    reference_date: NaiveDate,
) -> StatsResult<HabitCadence> {
    let normalized = normalize_records(records)?;
    let mut days: Vec<NaiveDate> = normalized
        .iter()
        .filter(|rec| rec.habit_id == habit.id && rec.completed)
        .map(|rec| rec.day)
        .collect();
    days.sort();

    let first_completion = days.first().copied();
    let days_since_first = first_completion
        .map(|first| (reference_date - first).num_days().max(0))
        .unwrap_or(0);
    let total_completions = days.len() as u64;

    let average_days_between = if days_since_first > 0 && total_completions > 1 {
        Some(days_since_first as f64 / (total_completions - 1) as f64)
    } else {
        None
    };

    Ok(HabitCadence {
        habit_id: habit.id,
        name: habit.name.clone(),
        first_completion,
        days_since_first,
        total_completions,
        average_days_between,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub summary: String,
    pub wins: Vec<String>,
    pub improvements: Vec<String>,
    pub streak_analysis: String,
    pub tip_of_the_week: String,
}

const TIP_ANCHORING: &str = "New habits stick best right after an existing routine. \
    Anchor the habit to something you already do every day.";

/// Build a deterministic insight from already-computed statistics.
pub fn generate_insight(stats: &Statistics) -> Insight {
    if stats.per_habit.is_empty() {
        return Insight {
            summary: "You haven't created any habits yet. Add one to start tracking!".into(),
            wins: vec![],
            improvements: vec!["Create your first habit to get started".into()],
            streak_analysis: "No data available yet.".into(),
            tip_of_the_week: TIP_ANCHORING.into(),
        };
    }

    let ranked = compute_top_habits(&stats.per_habit, stats.per_habit.len());
    let best = ranked.first();
    let worst = ranked.last();

    let window = stats.monthly_progress.len();
    let summary = match (best, worst) {
        (Some(best), Some(worst)) if window > 0 => format!(
            "Over the last {} days your overall completion rate is {:.0}%. \
             {} is your strongest habit at {:.0}% completion. {} could use more attention.",
            window,
            stats.overall_completion_rate,
            best.name,
            best.completion_rate,
            worst.name,
        ),
        (Some(best), Some(worst)) => format!(
            "{} is your strongest habit at {:.0}% completion. {} could use more attention.",
            best.name, best.completion_rate, worst.name,
        ),
        _ => "Keep tracking your habits consistently!".into(),
    };

    let mut wins = Vec::new();
    if let Some(best) = best {
        if best.completion_rate > 50.0 {
            wins.push(format!(
                "{} hit {:.0}% completion, your most consistent habit.",
                best.name, best.completion_rate
            ));
        }
    }
    if let Some(streaker) = stats.per_habit.iter().max_by_key(|h| h.streak) {
        if streaker.streak > 0 {
            wins.push(format!(
                "{}-day streak on {}, keep it going!",
                streaker.streak, streaker.name
            ));
        }
    }

    let mut improvements = Vec::new();
    if let Some(worst) = worst {
        if worst.completion_rate < 50.0 {
            improvements.push(format!(
                "Try setting a reminder for {} to lift its {:.0}% completion rate.",
                worst.name, worst.completion_rate
            ));
        }
    }
    improvements.push("Pair a habit you keep skipping with one you already enjoy.".into());
    improvements.push("Log at the same time each day to build automaticity.".into());

    let max_streak = stats.per_habit.iter().map(|h| h.streak).max().unwrap_or(0);
    let streak_analysis = if max_streak > 7 {
        format!(
            "Your longest active streak is {} days. Streaks past a week are a strong sign the habit is forming.",
            max_streak
        )
    } else if max_streak > 0 {
        format!(
            "Your longest active streak is {} days. Focus on not breaking the chain.",
            max_streak
        )
    } else {
        "No active streaks. Complete a habit today to start building momentum.".into()
    };

    Insight {
        summary,
        wins,
        improvements,
        streak_analysis,
        tip_of_the_week: TIP_ANCHORING.into(),
    }
}
