use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::MONTH_LABEL_MASK;
use crate::habit::HabitView;

pub const DEFAULT_HISTORY_MONTHS: u32 = 13;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub count: usize,
}

/// Ticks per calendar month for the `total_months` months before the month of
/// `today`, oldest first. The current month is not included.
pub fn monthly_history(
    habit: &impl HabitView,
    today: NaiveDate,
    total_months: u32,
) -> Vec<MonthlyCount> {
    let ticked = habit.ticked_days();
    (1..=total_months)
        .rev()
        .filter_map(|offset| today.checked_sub_months(Months::new(offset)))
        .map(|month_day| {
            let count = ticked
                .iter()
                .filter(|day| day.year() == month_day.year() && day.month() == month_day.month())
                .count();
            MonthlyCount {
                year: month_day.year(),
                month: month_day.month(),
                label: month_day.format(MONTH_LABEL_MASK).to_string(),
                count,
            }
        })
        .collect()
}
