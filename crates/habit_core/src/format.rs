//! Text date formats used at the boundary with calendar widgets.

use chrono::NaiveDate;

use crate::error::HabitError;
use crate::habit::HabitView;

pub const DAY_MASK: &str = "%Y%m%d";
pub const MONTH_MASK: &str = "%Y-%m";
pub const CALENDAR_EVENT_MASK: &str = "%Y/%m/%d";
pub const ISO_DAY_MASK: &str = "%Y-%m-%d";

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_MASK).to_string()
}

pub fn parse_day(value: &str) -> Result<NaiveDate, HabitError> {
    parse_with(value, DAY_MASK)
}

pub fn format_month(day: NaiveDate) -> String {
    day.format(MONTH_MASK).to_string()
}

/// Parses a month mask into the first day of that month.
pub fn parse_month(value: &str) -> Result<NaiveDate, HabitError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").map_err(|_| {
        HabitError::InvalidDate {
            value: value.to_string(),
            mask: MONTH_MASK,
        }
    })
}

pub fn parse_iso_day(value: &str) -> Result<NaiveDate, HabitError> {
    parse_with(value, ISO_DAY_MASK)
}

/// Ticked days as day masks, ready for a multi-select date picker.
pub fn ticked_day_values(habit: &impl HabitView) -> Vec<String> {
    habit.ticked_days().into_iter().map(format_day).collect()
}

/// Days carrying a note, formatted as calendar events.
pub fn note_events(habit: &impl HabitView) -> Vec<String> {
    habit
        .noted_days()
        .into_iter()
        .map(|day| day.format(CALENDAR_EVENT_MASK).to_string())
        .collect()
}

pub fn relative_day_label(day: NaiveDate, today: NaiveDate) -> String {
    match (today - day).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        -1 => "Tomorrow".to_string(),
        d if d < 0 => format!("In {} days", -d),
        d => format!("{} days ago", d),
    }
}

fn parse_with(value: &str, mask: &'static str) -> Result<NaiveDate, HabitError> {
    NaiveDate::parse_from_str(value.trim(), mask).map_err(|_| HabitError::InvalidDate {
        value: value.to_string(),
        mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Habit;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_and_month_masks() {
        let day = date(2024, 3, 5);
        assert_eq!(format_day(day), "20240305");
        assert_eq!(parse_day("20240305").unwrap(), day);
        assert_eq!(format_month(day), "2024-03");
        assert_eq!(parse_month("2024-03").unwrap(), date(2024, 3, 1));
        assert!(matches!(
            parse_day("2024-03-05"),
            Err(HabitError::InvalidDate { mask: DAY_MASK, .. })
        ));
        assert!(parse_month("2024-13").is_err());
        assert_eq!(parse_iso_day(" 2024-03-05 ").unwrap(), day);
    }

    #[test]
    fn habit_values_for_date_pickers() {
        let mut habit = Habit::new("h", "Journal").with_ticks([date(2024, 3, 2), date(2024, 3, 1)]);
        habit.tick(date(2024, 3, 4), false, Some("skipped, sick".into()));
        assert_eq!(ticked_day_values(&habit), vec!["20240301", "20240302"]);
        assert_eq!(note_events(&habit), vec!["2024/03/04"]);
    }

    #[test]
    fn relative_labels() {
        let today = date(2024, 3, 5);
        assert_eq!(relative_day_label(today, today), "Today");
        assert_eq!(relative_day_label(date(2024, 3, 4), today), "Yesterday");
        assert_eq!(relative_day_label(date(2024, 3, 1), today), "4 days ago");
        assert_eq!(relative_day_label(date(2024, 3, 8), today), "In 3 days");
    }
}
