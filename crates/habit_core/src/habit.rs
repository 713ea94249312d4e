use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::frequency::HabitFrequency;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckedRecord {
    pub day: NaiveDate,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CheckedRecord {
    pub fn new(day: NaiveDate, done: bool) -> Self {
        Self {
            day,
            done,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = normalize_text(Some(text.into()));
        self
    }

    pub fn has_note(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

/// Read-only capability the analytics engine needs from a habit.
pub trait HabitView {
    /// `None` is treated as every day.
    fn frequency(&self) -> Option<HabitFrequency>;

    /// Records in insertion order, at most one per day.
    fn records(&self) -> &[CheckedRecord];

    fn ticked_days(&self) -> BTreeSet<NaiveDate> {
        self.records()
            .iter()
            .filter(|record| record.done)
            .map(|record| record.day)
            .collect()
    }

    fn record_by(&self, day: NaiveDate) -> Option<&CheckedRecord> {
        self.records().iter().find(|record| record.day == day)
    }

    fn total_ticks(&self) -> usize {
        self.ticked_days().len()
    }

    /// Records carrying a note, newest first.
    fn notes(&self, limit: usize) -> Vec<&CheckedRecord> {
        let mut notes: Vec<&CheckedRecord> = self
            .records()
            .iter()
            .filter(|record| record.has_note())
            .collect();
        notes.sort_by(|a, b| b.day.cmp(&a.day));
        notes.truncate(limit);
        notes
    }

    fn noted_days(&self) -> BTreeSet<NaiveDate> {
        self.records()
            .iter()
            .filter(|record| record.has_note())
            .map(|record| record.day)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Created,
    Updated,
    Unchanged,
}

impl TickOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, TickOutcome::Unchanged)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawHabit")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frequency: Option<HabitFrequency>,
    #[serde(default)]
    records: Vec<CheckedRecord>,
}

#[derive(Deserialize)]
struct RawHabit {
    id: String,
    name: String,
    #[serde(default)]
    frequency: Option<HabitFrequency>,
    #[serde(default)]
    records: Vec<CheckedRecord>,
}

impl From<RawHabit> for Habit {
    /// Stored records may repeat a day. They collapse into one record at the
    /// position of the first, with later `done` values winning and a later note
    /// replacing an earlier one.
    fn from(raw: RawHabit) -> Self {
        let mut records: Vec<CheckedRecord> = Vec::with_capacity(raw.records.len());
        for record in raw.records {
            let text = normalize_text(record.text);
            match records.iter_mut().find(|existing| existing.day == record.day) {
                Some(existing) => {
                    existing.done = record.done;
                    if text.is_some() {
                        existing.text = text;
                    }
                }
                None => records.push(CheckedRecord {
                    day: record.day,
                    done: record.done,
                    text,
                }),
            }
        }
        Self {
            id: raw.id,
            name: raw.name,
            frequency: raw.frequency,
            records,
        }
    }
}

impl Habit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            frequency: None,
            records: Vec::new(),
        }
    }

    pub fn with_frequency(mut self, frequency: HabitFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_ticks(mut self, days: impl IntoIterator<Item = NaiveDate>) -> Self {
        for day in days {
            self.tick(day, true, None);
        }
        self
    }

    /// Only already-validated frequencies can reach a habit.
    pub fn set_frequency(&mut self, frequency: Option<HabitFrequency>) {
        self.frequency = frequency;
    }

    /// Records `done` (and optionally a note) for `day`. Re-ticking with the current
    /// value and no new note leaves the habit untouched.
    pub fn tick(&mut self, day: NaiveDate, done: bool, text: Option<String>) -> TickOutcome {
        let text = normalize_text(text);
        match self.records.iter_mut().find(|record| record.day == day) {
            Some(record) => {
                let text_changed = text.is_some() && text != record.text;
                if record.done == done && !text_changed {
                    return TickOutcome::Unchanged;
                }
                record.done = done;
                if text_changed {
                    record.text = text;
                }
                TickOutcome::Updated
            }
            None => {
                if !done && text.is_none() {
                    return TickOutcome::Unchanged;
                }
                self.records.push(CheckedRecord { day, done, text });
                TickOutcome::Created
            }
        }
    }
}

impl HabitView for Habit {
    fn frequency(&self) -> Option<HabitFrequency> {
        self.frequency
    }

    fn records(&self) -> &[CheckedRecord] {
        &self.records
    }
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
