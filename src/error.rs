use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    #[error("invalid date {date:?} on completion record for habit {habit_id}")]
    InvalidDate { habit_id: Uuid, date: String },
}

pub type StatsResult<T> = Result<T, StatsError>;
