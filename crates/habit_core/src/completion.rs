use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frequency::{HabitFrequency, PeriodType};
use crate::habit::HabitView;

/// Day -> completion flags, ordered by day.
pub type StatusMap = BTreeMap<NaiveDate, StatusSet>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CStatus {
    /// The day itself was ticked.
    Done,
    /// The period around the day reached its target.
    PeriodDone,
}

impl CStatus {
    fn bit(self) -> u8 {
        match self {
            CStatus::Done => 0b01,
            CStatus::PeriodDone => 0b10,
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<CStatus>", from = "Vec<CStatus>")]
pub struct StatusSet(u8);

impl StatusSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, status: CStatus) {
        self.0 |= status.bit();
    }

    pub fn with(mut self, status: CStatus) -> Self {
        self.insert(status);
        self
    }

    pub fn contains(&self, status: CStatus) -> bool {
        self.0 & status.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_done(&self) -> bool {
        self.contains(CStatus::Done)
    }

    pub fn is_period_done(&self) -> bool {
        self.contains(CStatus::PeriodDone)
    }

    pub fn iter(&self) -> impl Iterator<Item = CStatus> + '_ {
        [CStatus::Done, CStatus::PeriodDone]
            .into_iter()
            .filter(|status| self.contains(*status))
    }
}

impl fmt::Debug for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<Vec<CStatus>> for StatusSet {
    fn from(statuses: Vec<CStatus>) -> Self {
        statuses.into_iter().collect()
    }
}

impl From<StatusSet> for Vec<CStatus> {
    fn from(set: StatusSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<CStatus> for StatusSet {
    fn from_iter<I: IntoIterator<Item = CStatus>>(iter: I) -> Self {
        iter.into_iter()
            .fold(StatusSet::empty(), |set, status| set.with(status))
    }
}

/// Inclusive bounds of one frequency period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBounds {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodProgress {
    pub bounds: PeriodBounds,
    pub ticked: u32,
    pub target: u32,
}

impl PeriodProgress {
    pub fn is_done(&self) -> bool {
        self.ticked >= self.target
    }
}

/// Classifies days of a habit against its frequency.
///
/// Periods are anchored on the Unix epoch: day blocks count from 1970-01-01, week
/// blocks from the first `week_start` on or after 1970-01-05, month blocks from
/// January 1970 and year blocks from 1970. The same day always lands in the same
/// period no matter which range is queried.
#[derive(Debug, Clone, Copy)]
pub struct CompletionCalculator {
    today: NaiveDate,
    week_start: Weekday,
}

impl CompletionCalculator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            week_start: Weekday::Mon,
        }
    }

    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Every day in `[start, end]` up to `today` mapped to its flags. Days with no
    /// flag are present with an empty set.
    pub fn compute(&self, habit: &impl HabitView, start: NaiveDate, end: NaiveDate) -> StatusMap {
        let end = end.min(self.today);
        if start > end {
            return StatusMap::new();
        }

        let ticked = habit.ticked_days();
        let period_counts = habit
            .frequency()
            .filter(|frequency| !frequency.is_every_day())
            .map(|frequency| (frequency, self.count_ticks_by_period(&frequency, &ticked)));

        let mut result = StatusMap::new();
        for day in start.iter_days().take_while(|day| *day <= end) {
            let mut status = StatusSet::empty();
            if ticked.contains(&day) {
                status.insert(CStatus::Done);
            }
            if let Some((frequency, counts)) = &period_counts {
                let key = self.period_key(frequency, day);
                if counts.get(&key).copied().unwrap_or(0) >= frequency.target_count() {
                    status.insert(CStatus::PeriodDone);
                }
            }
            result.insert(day, status);
        }

        debug!(
            %start,
            %end,
            days = result.len(),
            ticked = ticked.len(),
            "computed habit completion"
        );
        result
    }

    /// Bounds of the period containing `day`; a single day for every-day habits.
    pub fn period_bounds(&self, frequency: &HabitFrequency, day: NaiveDate) -> Option<PeriodBounds> {
        let count = i64::from(frequency.period_count());
        let key = self.period_key(frequency, day);
        let (start, end) = match frequency.period_type() {
            PeriodType::Day => {
                let start = epoch() + Duration::days(key * count);
                (start, start + Duration::days(count - 1))
            }
            PeriodType::Week => {
                let start = self.week_anchor() + Duration::weeks(key * count);
                (start, start + Duration::weeks(count) - Duration::days(1))
            }
            PeriodType::Month => {
                let months = key * count;
                let year = 1970 + i32::try_from(months.div_euclid(12)).ok()?;
                let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let next = start.checked_add_months(Months::new(frequency.period_count()))?;
                (start, next.pred_opt()?)
            }
            PeriodType::Year => {
                let year = 1970 + i32::try_from(key * count).ok()?;
                let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                let next = NaiveDate::from_ymd_opt(year + i32::try_from(count).ok()?, 1, 1)?;
                (start, next.pred_opt()?)
            }
        };
        Some(PeriodBounds { start, end })
    }

    /// Ticks versus target for the period containing `day`.
    pub fn period_progress(&self, habit: &impl HabitView, day: NaiveDate) -> Option<PeriodProgress> {
        let frequency = habit.frequency().unwrap_or_default();
        let bounds = self.period_bounds(&frequency, day)?;
        let ticked = habit
            .ticked_days()
            .range(bounds.start..=bounds.end)
            .count();
        Some(PeriodProgress {
            bounds,
            ticked: u32::try_from(ticked).unwrap_or(u32::MAX),
            target: frequency.target_count(),
        })
    }

    fn count_ticks_by_period(
        &self,
        frequency: &HabitFrequency,
        ticked: &BTreeSet<NaiveDate>,
    ) -> HashMap<i64, u32> {
        let mut counts: HashMap<i64, u32> = HashMap::new();
        for day in ticked {
            *counts.entry(self.period_key(frequency, *day)).or_default() += 1;
        }
        counts
    }

    fn period_key(&self, frequency: &HabitFrequency, day: NaiveDate) -> i64 {
        let count = i64::from(frequency.period_count());
        let units = match frequency.period_type() {
            PeriodType::Day => (day - epoch()).num_days(),
            PeriodType::Week => (day - self.week_anchor()).num_days().div_euclid(7),
            PeriodType::Month => i64::from(day.year() - 1970) * 12 + i64::from(day.month0()),
            PeriodType::Year => i64::from(day.year() - 1970),
        };
        units.div_euclid(count)
    }

    fn week_anchor(&self) -> NaiveDate {
        // 1970-01-05 is a Monday.
        NaiveDate::from_ymd_opt(1970, 1, 5).unwrap_or_default()
            + Duration::days(i64::from(self.week_start.num_days_from_monday()))
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Completion of `habit` over `[start, end]` with Monday-based weeks.
pub fn habit_date_completion(
    habit: &impl HabitView,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> StatusMap {
    CompletionCalculator::new(today).compute(habit, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Habit;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly(target: u32) -> HabitFrequency {
        HabitFrequency::new(PeriodType::Week, 1, target).unwrap()
    }

    #[test]
    fn every_day_habit_only_marks_ticked_days() {
        let habit = Habit::new("h", "Stretch").with_ticks([date(2024, 3, 2), date(2024, 3, 4)]);
        let today = date(2024, 3, 5);
        let status = habit_date_completion(&habit, date(2024, 3, 1), date(2024, 3, 10), today);

        assert_eq!(status.len(), 5);
        assert_eq!(status.keys().last(), Some(&today));
        let done: Vec<NaiveDate> = status
            .iter()
            .filter(|(_, s)| s.is_done())
            .map(|(day, _)| *day)
            .collect();
        assert_eq!(done, vec![date(2024, 3, 2), date(2024, 3, 4)]);
        assert!(status.values().all(|s| !s.is_period_done()));
        assert!(status[&date(2024, 3, 1)].is_empty());
    }

    #[test]
    fn explicit_every_day_frequency_matches_no_frequency() {
        let ticks = [date(2024, 3, 2), date(2024, 3, 3)];
        let plain = Habit::new("a", "A").with_ticks(ticks);
        let daily = Habit::new("b", "B")
            .with_frequency(HabitFrequency::EVERY_DAY)
            .with_ticks(ticks);
        let today = date(2024, 3, 5);
        assert_eq!(
            habit_date_completion(&plain, date(2024, 3, 1), today, today),
            habit_date_completion(&daily, date(2024, 3, 1), today, today)
        );
    }

    #[test]
    fn satisfied_week_marks_every_day_of_the_week() {
        // Mon 2024-03-04 .. Sun 2024-03-10
        let habit = Habit::new("h", "Gym")
            .with_frequency(weekly(2))
            .with_ticks([date(2024, 3, 5), date(2024, 3, 7), date(2024, 3, 12)]);
        let today = date(2024, 3, 14);
        let status = habit_date_completion(&habit, date(2024, 3, 4), today, today);

        for d in 4..=10 {
            assert!(status[&date(2024, 3, d)].is_period_done(), "day {d}");
        }
        for d in 11..=14 {
            assert!(!status[&date(2024, 3, d)].is_period_done(), "day {d}");
        }
        assert!(status[&date(2024, 3, 5)].is_done());
        assert!(!status[&date(2024, 3, 6)].is_done());
        assert!(status[&date(2024, 3, 12)].is_done());
    }

    #[test]
    fn ticks_outside_the_range_still_count_for_their_period() {
        let habit = Habit::new("h", "Gym")
            .with_frequency(weekly(2))
            .with_ticks([date(2024, 3, 4), date(2024, 3, 9)]);
        let today = date(2024, 3, 20);
        let status = habit_date_completion(&habit, date(2024, 3, 6), date(2024, 3, 7), today);
        assert_eq!(status.len(), 2);
        assert!(status.values().all(|s| s.is_period_done() && !s.is_done()));
    }

    #[test]
    fn multi_week_periods_share_one_anchor() {
        let freq = HabitFrequency::new(PeriodType::Week, 2, 3).unwrap();
        let calculator = CompletionCalculator::new(date(2024, 12, 31));
        let bounds = calculator.period_bounds(&freq, date(2024, 3, 6)).unwrap();
        assert_eq!(bounds.start.weekday(), Weekday::Mon);
        assert_eq!(bounds.end - bounds.start, Duration::days(13));
        assert!(bounds.contains(date(2024, 3, 6)));
        for offset in 0..14 {
            let day = bounds.start + Duration::days(offset);
            assert_eq!(calculator.period_bounds(&freq, day), Some(bounds));
        }
        let next = calculator
            .period_bounds(&freq, bounds.end + Duration::days(1))
            .unwrap();
        assert_eq!(next.start, bounds.end + Duration::days(1));
    }

    #[test]
    fn week_start_shifts_week_periods() {
        let freq = weekly(1);
        let calculator = CompletionCalculator::new(date(2024, 12, 31)).week_start(Weekday::Sun);
        let bounds = calculator.period_bounds(&freq, date(2024, 3, 6)).unwrap();
        assert_eq!(bounds.start, date(2024, 3, 3));
        assert_eq!(bounds.end, date(2024, 3, 9));
    }

    #[test]
    fn month_and_year_periods_follow_the_calendar() {
        let calculator = CompletionCalculator::new(date(2024, 12, 31));
        let monthly = HabitFrequency::new(PeriodType::Month, 1, 10).unwrap();
        let bounds = calculator.period_bounds(&monthly, date(2024, 2, 14)).unwrap();
        assert_eq!(bounds, PeriodBounds { start: date(2024, 2, 1), end: date(2024, 2, 29) });

        let quarterly = HabitFrequency::new(PeriodType::Month, 3, 10).unwrap();
        let bounds = calculator.period_bounds(&quarterly, date(2024, 5, 20)).unwrap();
        assert_eq!(bounds, PeriodBounds { start: date(2024, 4, 1), end: date(2024, 6, 30) });

        let yearly = HabitFrequency::new(PeriodType::Year, 1, 100).unwrap();
        let bounds = calculator.period_bounds(&yearly, date(2024, 5, 20)).unwrap();
        assert_eq!(bounds, PeriodBounds { start: date(2024, 1, 1), end: date(2024, 12, 31) });

        let before_epoch = calculator.period_bounds(&monthly, date(1969, 12, 15)).unwrap();
        assert_eq!(before_epoch.start, date(1969, 12, 1));
    }

    #[test]
    fn multi_day_blocks_count_from_the_epoch() {
        // 2024-02-29 is day 19782 after 1970-01-01, a multiple of 3.
        let habit = Habit::new("h", "Water plants")
            .with_frequency(HabitFrequency::new(PeriodType::Day, 3, 2).unwrap())
            .with_ticks([date(2024, 2, 29), date(2024, 3, 2)]);
        let today = date(2024, 3, 5);
        let calculator = CompletionCalculator::new(today);
        let bounds = calculator
            .period_bounds(&habit.frequency().unwrap(), date(2024, 3, 1))
            .unwrap();
        assert_eq!(bounds, PeriodBounds { start: date(2024, 2, 29), end: date(2024, 3, 2) });

        let status = calculator.compute(&habit, date(2024, 2, 27), today);
        assert!(!status[&date(2024, 2, 28)].is_period_done());
        for day in [date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)] {
            assert!(status[&day].is_period_done(), "{day}");
        }
        assert!(!status[&date(2024, 3, 1)].is_done());
        assert!(!status[&date(2024, 3, 3)].is_period_done());
    }

    #[test]
    fn multi_year_blocks_span_both_years() {
        let habit = Habit::new("h", "Checkup")
            .with_frequency(HabitFrequency::new(PeriodType::Year, 2, 2).unwrap())
            .with_ticks([date(2024, 6, 1), date(2025, 1, 10)]);
        let today = date(2025, 2, 1);
        let calculator = CompletionCalculator::new(today);
        let bounds = calculator
            .period_bounds(&habit.frequency().unwrap(), date(2024, 6, 1))
            .unwrap();
        assert_eq!(bounds, PeriodBounds { start: date(2024, 1, 1), end: date(2025, 12, 31) });

        let status = calculator.compute(&habit, date(2023, 12, 30), date(2024, 1, 2));
        assert_eq!(status.len(), 4);
        assert!(!status[&date(2023, 12, 31)].is_period_done());
        assert!(status[&date(2024, 1, 1)].is_period_done());
        assert!(status[&date(2024, 1, 2)].is_period_done());
    }

    #[test]
    fn monthly_target_flags_whole_month() {
        let habit = Habit::new("h", "Call family")
            .with_frequency(HabitFrequency::new(PeriodType::Month, 1, 2).unwrap())
            .with_ticks([date(2024, 2, 3), date(2024, 2, 27)]);
        let today = date(2024, 3, 2);
        let status = habit_date_completion(&habit, date(2024, 1, 30), today, today);
        assert!(!status[&date(2024, 1, 31)].is_period_done());
        assert!(status[&date(2024, 2, 1)].is_period_done());
        assert!(status[&date(2024, 2, 29)].is_period_done());
        assert!(!status[&date(2024, 3, 1)].is_period_done());
    }

    #[test]
    fn unticking_removes_period_flag_for_the_whole_period() {
        let mut habit = Habit::new("h", "Gym")
            .with_frequency(weekly(2))
            .with_ticks([date(2024, 3, 5), date(2024, 3, 7)]);
        let today = date(2024, 3, 10);
        let start = date(2024, 3, 4);
        let before = habit_date_completion(&habit, start, today, today);
        assert!(before.values().all(StatusSet::is_period_done));

        habit.tick(date(2024, 3, 7), false, None);
        let after = habit_date_completion(&habit, start, today, today);
        assert!(after.values().all(|s| !s.is_period_done()));
        assert_eq!(habit_date_completion(&habit, start, today, today), after);
    }

    #[test]
    fn future_days_and_reversed_ranges_are_excluded() {
        let habit = Habit::new("h", "Read").with_ticks([date(2024, 3, 1)]);
        let today = date(2024, 3, 1);
        assert!(habit_date_completion(&habit, date(2024, 3, 5), date(2024, 3, 1), today).is_empty());
        assert!(habit_date_completion(&habit, date(2024, 3, 2), date(2024, 3, 9), today).is_empty());
        let status = habit_date_completion(&habit, date(2024, 2, 28), date(2024, 3, 9), today);
        assert_eq!(status.len(), 3);
    }

    #[test]
    fn period_progress_counts_ticks_in_period() {
        let habit = Habit::new("h", "Gym")
            .with_frequency(weekly(3))
            .with_ticks([date(2024, 3, 4), date(2024, 3, 6), date(2024, 3, 11)]);
        let calculator = CompletionCalculator::new(date(2024, 3, 8));
        let progress = calculator.period_progress(&habit, date(2024, 3, 8)).unwrap();
        assert_eq!(progress.ticked, 2);
        assert_eq!(progress.target, 3);
        assert!(!progress.is_done());

        let plain = Habit::new("p", "Plain").with_ticks([date(2024, 3, 8)]);
        let progress = calculator.period_progress(&plain, date(2024, 3, 8)).unwrap();
        assert_eq!(progress.bounds.start, progress.bounds.end);
        assert!(progress.is_done());
    }

    #[test]
    fn status_set_serializes_as_a_list() {
        let set = StatusSet::empty().with(CStatus::PeriodDone).with(CStatus::Done);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["DONE","PERIOD_DONE"]"#);
        let back: StatusSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
