use habit_core::{
    calendar::CalendarHeatmap,
    completion::{PeriodProgress, StatusMap, StatusSet},
    HabitFrequency, MonthlyCount, Streak,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitReport {
    pub habit_id: String,
    pub name: String,
    pub frequency: Option<HabitFrequency>,
    pub total_ticks: usize,
    pub heatmap: CalendarHeatmap,
    pub status: StatusMap,
    pub streaks: Vec<Streak>,
    pub history: Vec<MonthlyCount>,
    pub current_period: Option<PeriodProgress>,
}

impl HabitReport {
    /// Flags for a grid cell; `None` for days after today.
    pub fn cell(&self, row: usize, column: usize) -> Option<StatusSet> {
        let day = self.heatmap.data.get(row)?.get(column)?;
        if self.heatmap.is_future(*day) {
            return None;
        }
        Some(self.status.get(day).copied().unwrap_or_default())
    }
}
