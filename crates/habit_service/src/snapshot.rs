use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use habit_core::Habit;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Plain JSON list of habits handed to the engine, either a bare array or
/// `{"habits": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    List(Vec<Habit>),
    Wrapped { habits: Vec<Habit> },
}

impl SnapshotFile {
    fn into_habits(self) -> Vec<Habit> {
        match self {
            SnapshotFile::List(habits) | SnapshotFile::Wrapped { habits } => habits,
        }
    }
}

#[instrument]
pub fn load_habits(path: &Path) -> Result<Vec<Habit>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("unable to read snapshot `{}`", path.display()))?;
    let habits = parse_habits(&raw)
        .with_context(|| format!("invalid snapshot `{}`", path.display()))?;
    debug!(habits = habits.len(), "snapshot loaded");
    Ok(habits)
}

pub fn parse_habits(raw: &str) -> Result<Vec<Habit>> {
    let file: SnapshotFile = serde_json::from_str(raw)?;
    Ok(file.into_habits())
}

#[instrument(skip(habits))]
pub fn save_habits(path: &Path, habits: &[Habit]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let payload = serde_json::to_string_pretty(&SnapshotFile::Wrapped {
        habits: habits.to_vec(),
    })?;
    fs::write(path, payload)
        .with_context(|| format!("unable to write snapshot `{}`", path.display()))?;
    Ok(())
}
