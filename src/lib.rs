//! # habit-stats
//!
//! Pure, deterministic statistics derivations for a habit tracker: joint
//! "perfect day" streaks, per-habit completion rates and streaks,
//! weekly/monthly progress series, best day, heatmaps, weekly reviews, and
//! deterministic coaching insights.
//!
//! Conventions:
//! - Every operation is a pure function of
//!   `(habits, records, reference_date, config)`. The reference date is an
//!   explicit parameter; nothing in this crate reads the wall clock.
//! - Empty inputs yield zeroed results, never errors or NaN. The only
//!   failure mode is an unparseable record date ([`StatsError::InvalidDate`]),
//!   which fails the whole call.
//! - Archived habits are excluded from the active set before any math.

pub mod config;
pub mod error;
pub mod heatmap;
pub mod insights;
pub mod models;
pub mod review;
pub mod stats;

pub use config::{StatsConfig, WeekStart};
pub use error::{StatsError, StatsResult};
pub use heatmap::{compute_heatmap, HeatmapEntry};
pub use insights::{compute_habit_cadence, generate_insight, HabitCadence, Insight};
pub use models::completion::CompletionRecord;
pub use models::habit::{Habit, HabitFrequency};
pub use review::{
    compute_weekly_review, find_week_start, previous_week_start, WeeklyHabitReview, WeeklyReview,
};
pub use stats::{
    compute_best_day, compute_habit_stats, compute_joint_streaks, compute_monthly_progress,
    compute_statistics, compute_top_habits, compute_weekly_progress, BestDay, HabitStats,
    JointStreaks, PerHabitStats, ProgressEntry, Statistics,
};
