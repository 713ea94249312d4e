use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WEEK_DAYS: usize = 7;
/// Largest grid the builder lays out, a century of weeks.
pub const MAX_WEEKS: u32 = 5200;
pub const MONTH_LABEL_MASK: &str = "%b";

/// Habit days laid out week by week for heatmap rendering.
///
/// `data[row][column]`: rows are weekday offsets from the first weekday, columns are
/// weeks from oldest to newest. The last column always contains `today`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarHeatmap {
    pub today: NaiveDate,
    pub headers: Vec<String>,
    pub data: Vec<Vec<NaiveDate>>,
    pub week_days: Vec<String>,
}

impl CalendarHeatmap {
    pub fn build(today: NaiveDate, weeks: u32, first_weekday: Weekday) -> Self {
        let data = generate_calendar_days(today, weeks, first_weekday);
        let headers = data
            .first()
            .map(|row| generate_calendar_headers(row))
            .unwrap_or_default();
        let week_days = std::iter::successors(Some(first_weekday), |weekday| Some(weekday.succ()))
            .take(WEEK_DAYS)
            .map(|weekday| weekday.to_string())
            .collect();
        Self {
            today,
            headers,
            data,
            week_days,
        }
    }

    /// Oldest day on the grid, `None` for an empty grid.
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.data.first().and_then(|row| row.first()).copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.data.last().and_then(|row| row.last()).copied()
    }

    pub fn weeks(&self) -> usize {
        self.data.first().map(Vec::len).unwrap_or(0)
    }

    /// Cells after `today` are part of the grid but have nothing to show.
    pub fn is_future(&self, day: NaiveDate) -> bool {
        day > self.today
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.data.iter().flat_map(|row| row.iter().copied())
    }
}

/// Sparse month labels for a row of week columns. The first cell always gets its
/// month, later cells get the month when it changes, or the year when only the year
/// changes; everything else is blank.
pub fn generate_calendar_headers(days: &[NaiveDate]) -> Vec<String> {
    let Some(first) = days.first() else {
        return Vec::new();
    };

    let mut headers = Vec::with_capacity(days.len());
    let mut month = first.month();
    let mut year = first.year();
    headers.push(first.format(MONTH_LABEL_MASK).to_string());

    for day in &days[1..] {
        if day.month() != month {
            month = day.month();
            year = day.year();
            headers.push(day.format(MONTH_LABEL_MASK).to_string());
        } else if day.year() != year {
            year = day.year();
            headers.push(year.to_string());
        } else {
            headers.push(String::new());
        }
    }

    headers
}

/// Week columns ending on the last grid day of the week containing `today`.
///
/// `total_weeks` is capped at [`MAX_WEEKS`] and at the number of whole weeks chrono
/// can represent before that day.
pub fn generate_calendar_days(
    today: NaiveDate,
    total_weeks: u32,
    first_weekday: Weekday,
) -> Vec<Vec<NaiveDate>> {
    let last_weekday = first_weekday.pred();
    let days_delta = (last_weekday.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    let last_date_of_calendar = today
        .checked_add_signed(Duration::days(i64::from(days_delta)))
        .unwrap_or(today);

    let representable_weeks = ((last_date_of_calendar - NaiveDate::MIN).num_days() + 1) / 7;
    let total_weeks = i64::from(total_weeks.min(MAX_WEEKS)).min(representable_weeks);

    (0..WEEK_DAYS as i64)
        .rev()
        .map(|day_offset| {
            (0..total_weeks)
                .rev()
                .map(|week_offset| {
                    last_date_of_calendar
                        - Duration::days(day_offset)
                        - Duration::weeks(week_offset)
                })
                .collect()
        })
        .collect()
}
