use thiserror::Error;

use crate::frequency::PeriodType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HabitError {
    /// Covers zero counts as well as targets the period cannot hold; `max` is the
    /// largest target for the period (`0` when the period itself is empty).
    #[error("invalid frequency: {target_count} per {period_count} {period_type} (target must be in 1..={max})")]
    InvalidFrequency {
        period_type: PeriodType,
        period_count: u32,
        target_count: u32,
        max: u32,
    },
    #[error("unknown period type `{0}`")]
    UnknownPeriodType(String),
    #[error("unable to parse frequency `{0}`")]
    FrequencyParse(String),
    #[error("invalid date `{value}` for format `{mask}`")]
    InvalidDate { value: String, mask: &'static str },
    #[error("unknown habit `{0}`")]
    UnknownHabit(String),
}
