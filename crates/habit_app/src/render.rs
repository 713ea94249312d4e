use habit_core::{completion::StatusSet, HabitFrequency};
use habit_service::HabitReport;

const CELL_WIDTH: usize = 2;

pub fn cell_glyph(status: Option<StatusSet>) -> char {
    match status {
        None => ' ',
        Some(flags) if flags.is_done() => '#',
        Some(flags) if flags.is_period_done() => '+',
        Some(_) => '.',
    }
}

/// Plain-text habit page: title, heatmap, streaks and monthly history.
pub fn render_report(report: &HabitReport) -> String {
    let mut lines = Vec::new();
    let frequency = report.frequency.unwrap_or(HabitFrequency::EVERY_DAY);
    lines.push(format!(
        "{} ({}) total: {}",
        report.name, frequency, report.total_ticks
    ));
    if let Some(progress) = report.current_period {
        lines.push(format!(
            "current period {}..{}: {}/{}",
            progress.bounds.start, progress.bounds.end, progress.ticked, progress.target
        ));
    }

    let weeks = report.heatmap.weeks();
    if weeks > 0 {
        lines.push(header_line(&report.heatmap.headers));
        for (row, week_day) in report.heatmap.week_days.iter().enumerate() {
            let mut line = String::with_capacity(weeks * CELL_WIDTH + 4);
            for column in 0..weeks {
                line.push(cell_glyph(report.cell(row, column)));
                line.push(' ');
            }
            line.push_str(week_day);
            lines.push(line);
        }
    }

    if !report.streaks.is_empty() {
        let streaks: Vec<String> = report
            .streaks
            .iter()
            .map(|streak| format!("{} ({})", streak.label(), streak.length))
            .collect();
        lines.push(format!("streaks: {}", streaks.join(", ")));
    }

    if !report.history.is_empty() {
        let history: Vec<String> = report
            .history
            .iter()
            .map(|month| format!("{} {}", month.label, month.count))
            .collect();
        lines.push(format!("history: {}", history.join(", ")));
    }

    lines.join("\n")
}

/// Places each label over its column, skipping labels that would overlap.
fn header_line(headers: &[String]) -> String {
    let mut line = String::new();
    for (column, label) in headers.iter().enumerate() {
        let position = column * CELL_WIDTH;
        if label.is_empty() || line.chars().count() > position {
            continue;
        }
        while line.chars().count() < position {
            line.push(' ');
        }
        line.push_str(label);
    }
    line
}
