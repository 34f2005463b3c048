use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub frequency: HabitFrequency,
    /// Completions expected per period (per day for daily habits, per week
    /// for weekly ones). Informational for the core math; the weekly review
    /// derives its possible-count from it.
    pub target: u32,
    pub created_at: NaiveDate,
    pub archived_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl Default for HabitFrequency {
    fn default() -> Self {
        Self::Daily
    }
}

impl Habit {
    /// Archived habits are excluded from every derivation.
    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }
}
