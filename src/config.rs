use serde::{Deserialize, Serialize};

/// First day of the week used when building weekly series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    Sunday,
}

impl Default for WeekStart {
    fn default() -> Self {
        Self::Monday
    }
}

/// Knobs for the statistics derivations. Callers that want the stock
/// behavior pass `StatsConfig::default()`.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Length of the trailing window ending at the reference date.
    pub window_days: u32,
    /// How many habits the top-habits ranking keeps.
    pub top_habits: usize,
    pub week_starts_on: WeekStart,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            top_habits: 3,
            week_starts_on: WeekStart::Monday,
        }
    }
}
