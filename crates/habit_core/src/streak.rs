use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::completion::{CStatus, CompletionCalculator, StatusMap};
use crate::habit::HabitView;

pub const STREAK_LABEL_MASK: &str = "%d/%m";
pub const DEFAULT_MAX_STREAKS: usize = 5;

/// A run of consecutive days, identified by its earliest day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Streak {
    pub start: NaiveDate,
    pub length: u32,
}

impl Streak {
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.length.saturating_sub(1)))
    }

    pub fn label(&self) -> String {
        self.start.format(STREAK_LABEL_MASK).to_string()
    }
}

/// Runs of consecutive days among the keys of `status`, most recent first.
///
/// Flags are ignored; filter the map first (see [`done_days`]) for done-only runs.
/// Scanning stops once `max_streaks` runs are found, so these are the latest runs,
/// not the longest.
pub fn streaks(status: &StatusMap, max_streaks: usize) -> Vec<Streak> {
    streaks_from_days(status.keys().rev().copied(), max_streaks)
}

/// Same as [`streaks`] over days already sorted newest first.
pub fn streaks_from_days(
    days_desc: impl IntoIterator<Item = NaiveDate>,
    max_streaks: usize,
) -> Vec<Streak> {
    let days: Vec<NaiveDate> = days_desc.into_iter().collect();
    let mut result = Vec::new();
    if days.len() < 2 || max_streaks == 0 {
        return result;
    }

    let mut length = 1u32;
    for pair in days.windows(2) {
        let (newer, older) = (pair[0], pair[1]);
        if newer - older == Duration::days(1) {
            length += 1;
            continue;
        }
        result.push(Streak {
            start: newer,
            length,
        });
        length = 1;
        if result.len() >= max_streaks {
            return result;
        }
    }

    if let Some(oldest) = days.last() {
        result.push(Streak {
            start: *oldest,
            length,
        });
    }
    result
}

/// Keeps the days that carry at least one flag.
pub fn done_days(status: &StatusMap) -> StatusMap {
    status
        .iter()
        .filter(|(_, flags)| !flags.is_empty())
        .map(|(day, flags)| (*day, *flags))
        .collect()
}

/// Keeps only the individually ticked days.
pub fn ticked_days_only(status: &StatusMap) -> StatusMap {
    status
        .iter()
        .filter(|(_, flags)| flags.contains(CStatus::Done))
        .map(|(day, flags)| (*day, *flags))
        .collect()
}

/// Which days of a status map count towards a streak.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreakDays {
    /// Any flag, so days covered by a completed period extend the run.
    #[default]
    Flagged,
    /// Only days that were ticked themselves.
    Ticked,
}

impl StreakDays {
    pub fn select(self, status: &StatusMap) -> StatusMap {
        match self {
            StreakDays::Flagged => done_days(status),
            StreakDays::Ticked => ticked_days_only(status),
        }
    }
}

/// Latest streaks over the year ending `today`, counting the days `days` selects.
pub fn habit_streaks(
    calculator: &CompletionCalculator,
    habit: &impl HabitView,
    max_streaks: usize,
    days: StreakDays,
) -> Vec<Streak> {
    let today = calculator.today();
    let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
    let status = calculator.compute(habit, start, today);
    streaks(&days.select(&status), max_streaks)
}
