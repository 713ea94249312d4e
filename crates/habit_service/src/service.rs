use chrono::{NaiveDate, Weekday};
use habit_core::{
    calendar::CalendarHeatmap,
    completion::{CompletionCalculator, StatusMap},
    habit::{Habit, HabitView, TickOutcome},
    history::{self, DEFAULT_HISTORY_MONTHS},
    streak::{self, StreakDays, DEFAULT_MAX_STREAKS},
    HabitError, HabitFrequency,
};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::report::HabitReport;

pub const DEFAULT_WEEKS: u32 = 53;

/// In-memory registry of habits. Ticks go through the write lock one at a time;
/// all analytics run against a read snapshot.
pub struct HabitService {
    habits: RwLock<Vec<Habit>>,
    first_weekday: Weekday,
}

pub struct HabitServiceBuilder {
    habits: Vec<Habit>,
    first_weekday: Weekday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub today: NaiveDate,
    pub weeks: u32,
    pub max_streaks: usize,
    pub history_months: u32,
    pub streak_days: StreakDays,
}

impl ReportOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            weeks: DEFAULT_WEEKS,
            max_streaks: DEFAULT_MAX_STREAKS,
            history_months: DEFAULT_HISTORY_MONTHS,
            streak_days: StreakDays::Flagged,
        }
    }
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            habits: Vec::new(),
            first_weekday: Weekday::Mon,
        }
    }

    pub fn with_habit(mut self, habit: Habit) -> Self {
        Self::push_unique(&mut self.habits, habit);
        self
    }

    pub fn with_habits(mut self, habits: impl IntoIterator<Item = Habit>) -> Self {
        for habit in habits {
            Self::push_unique(&mut self.habits, habit);
        }
        self
    }

    pub fn first_weekday(mut self, weekday: Weekday) -> Self {
        self.first_weekday = weekday;
        self
    }

    pub fn build(self) -> HabitService {
        debug!(habits = self.habits.len(), first_weekday = %self.first_weekday, "habit service ready");
        HabitService {
            habits: RwLock::new(self.habits),
            first_weekday: self.first_weekday,
        }
    }

    fn push_unique(habits: &mut Vec<Habit>, habit: Habit) {
        if habits.iter().any(|existing| existing.id == habit.id) {
            warn!(id = %habit.id, "ignoring habit with duplicate id");
            return;
        }
        habits.push(habit);
    }
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.habits.read().clone()
    }

    pub fn habit_ids(&self) -> Vec<String> {
        self.habits.read().iter().map(|habit| habit.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Result<Habit, HabitError> {
        self.with_habit(id, Habit::clone)
    }

    pub fn add_habit(&self, habit: Habit) -> bool {
        let mut habits = self.habits.write();
        if habits.iter().any(|existing| existing.id == habit.id) {
            return false;
        }
        info!(id = %habit.id, name = %habit.name, "habit added");
        habits.push(habit);
        true
    }

    /// Records a tick. Ticks are serialised by the registry lock, and a tick that
    /// does not change the recorded state is a no-op.
    #[instrument(skip(self, text))]
    pub fn tick(
        &self,
        id: &str,
        day: NaiveDate,
        done: bool,
        text: Option<String>,
    ) -> Result<TickOutcome, HabitError> {
        let mut habits = self.habits.write();
        let habit = habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| HabitError::UnknownHabit(id.to_string()))?;
        let outcome = habit.tick(day, done, text);
        if outcome.changed() {
            info!(%day, done, "day ticked");
        } else {
            debug!(%day, done, "tick unchanged");
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn set_frequency(
        &self,
        id: &str,
        frequency: Option<HabitFrequency>,
    ) -> Result<(), HabitError> {
        let mut habits = self.habits.write();
        let habit = habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| HabitError::UnknownHabit(id.to_string()))?;
        habit.set_frequency(frequency);
        info!(frequency = ?habit.frequency(), "habit frequency changed");
        Ok(())
    }

    pub fn calculator(&self, today: NaiveDate) -> CompletionCalculator {
        CompletionCalculator::new(today).week_start(self.first_weekday)
    }

    pub fn heatmap(&self, today: NaiveDate, weeks: u32) -> CalendarHeatmap {
        CalendarHeatmap::build(today, weeks, self.first_weekday)
    }

    pub fn completion(
        &self,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<StatusMap, HabitError> {
        let calculator = self.calculator(today);
        self.with_habit(id, |habit| calculator.compute(habit, start, end))
    }

    /// Everything a habit page shows: heatmap with statuses, streaks and history.
    #[instrument(skip(self))]
    pub fn report(&self, id: &str, options: ReportOptions) -> Result<HabitReport, HabitError> {
        let heatmap = self.heatmap(options.today, options.weeks);
        let calculator = self.calculator(options.today);
        self.with_habit(id, |habit| {
            let status = heatmap
                .first_day()
                .map(|first| calculator.compute(habit, first, options.today))
                .unwrap_or_default();
            let streaks = streak::habit_streaks(
                &calculator,
                habit,
                options.max_streaks,
                options.streak_days,
            );
            let history = history::monthly_history(habit, options.today, options.history_months);
            let current_period = calculator.period_progress(habit, options.today);
            HabitReport {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                frequency: habit.frequency(),
                total_ticks: habit.total_ticks(),
                heatmap: heatmap.clone(),
                status,
                streaks,
                history,
                current_period,
            }
        })
    }

    fn with_habit<R>(&self, id: &str, f: impl FnOnce(&Habit) -> R) -> Result<R, HabitError> {
        let habits = self.habits.read();
        habits
            .iter()
            .find(|habit| habit.id == id)
            .map(f)
            .ok_or_else(|| HabitError::UnknownHabit(id.to_string()))
    }
}
