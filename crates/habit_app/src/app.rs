use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, Weekday};
use clap::Parser;
use habit_core::{
    calendar::MAX_WEEKS, format::parse_iso_day, history::DEFAULT_HISTORY_MONTHS,
    streak::DEFAULT_MAX_STREAKS, StreakDays,
};
use habit_service::{service::DEFAULT_WEEKS, snapshot, HabitService, ReportOptions};
use tracing::{debug, info};

use crate::render;

/// Every option can also come from its `HABIT_*` environment variable; arguments win.
#[derive(Parser, Clone, Debug)]
#[command(
    name = "habit_report",
    version,
    about = "Heatmap, streak and history report for a habit snapshot"
)]
pub struct AppConfig {
    /// Habit to report on. Defaults to the first habit in the snapshot.
    pub(crate) habit_id: Option<String>,

    /// JSON file holding the habit list.
    #[arg(long, env = "HABIT_SNAPSHOT")]
    pub(crate) snapshot: Option<PathBuf>,

    /// Logical today as YYYY-MM-DD. Defaults to the local date.
    #[arg(long, env = "HABIT_TODAY", value_parser = parse_iso_day)]
    pub(crate) today: Option<NaiveDate>,

    /// Heatmap width in weeks.
    #[arg(
        long,
        env = "HABIT_WEEKS",
        default_value_t = DEFAULT_WEEKS,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_WEEKS))
    )]
    pub(crate) weeks: u32,

    /// First day of the week, 0 = Monday .. 6 = Sunday.
    #[arg(
        long,
        env = "HABIT_FIRST_WEEKDAY",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub(crate) first_weekday: u8,

    #[arg(long, env = "HABIT_MAX_STREAKS", default_value_t = DEFAULT_MAX_STREAKS)]
    pub(crate) max_streaks: usize,

    /// Months of tick history before the current month.
    #[arg(long, env = "HABIT_HISTORY_MONTHS", default_value_t = DEFAULT_HISTORY_MONTHS)]
    pub(crate) history_months: u32,

    /// Count only ticked days in streaks, not days covered by a completed period.
    #[arg(long)]
    pub(crate) ticked_streaks: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

impl AppConfig {
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn first_weekday(&self) -> Weekday {
        Weekday::try_from(self.first_weekday).unwrap_or(Weekday::Mon)
    }

    pub fn streak_days(&self) -> StreakDays {
        if self.ticked_streaks {
            StreakDays::Ticked
        } else {
            StreakDays::Flagged
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            today: self.today(),
            weeks: self.weeks,
            max_streaks: self.max_streaks,
            history_months: self.history_months,
            streak_days: self.streak_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            habit_id: None,
            snapshot: None,
            today: None,
            weeks: DEFAULT_WEEKS,
            first_weekday: 0,
            max_streaks: DEFAULT_MAX_STREAKS,
            history_months: DEFAULT_HISTORY_MONTHS,
            ticked_streaks: false,
            json: false,
        }
    }
}

/// Loads the snapshot and renders the report for the selected habit (the first
/// habit when none is named).
pub fn run(config: &AppConfig) -> Result<String> {
    let path = config
        .snapshot
        .as_deref()
        .ok_or_else(|| anyhow!("no snapshot given; set HABIT_SNAPSHOT or pass --snapshot"))?;
    let habits = snapshot::load_habits(path)?;
    info!(path = %path.display(), habits = habits.len(), "loaded habits");

    let service = HabitService::builder()
        .with_habits(habits)
        .first_weekday(config.first_weekday())
        .build();

    let habit_id = match &config.habit_id {
        Some(id) => id.clone(),
        None => service
            .habit_ids()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("snapshot `{}` contains no habits", path.display()))?,
    };
    debug!(%habit_id, "building report");

    let report = service.report(&habit_id, config.report_options())?;
    if config.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render::render_report(&report))
    }
}
