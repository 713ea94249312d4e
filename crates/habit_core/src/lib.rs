pub mod calendar;
pub mod completion;
pub mod error;
pub mod format;
pub mod frequency;
pub mod habit;
pub mod history;
pub mod streak;

pub use crate::calendar::CalendarHeatmap;
pub use crate::completion::{
    habit_date_completion, CStatus, CompletionCalculator, PeriodBounds, PeriodProgress,
    StatusMap, StatusSet,
};
pub use crate::error::HabitError;
pub use crate::frequency::{HabitFrequency, PeriodType};
pub use crate::habit::{CheckedRecord, Habit, HabitView, TickOutcome};
pub use crate::history::MonthlyCount;
pub use crate::streak::{Streak, StreakDays};
