use crate::types::{CleanedRow, WorkoutUid};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Totals across every set in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TotalStats {
    pub workouts: usize,
    pub total_volume: f64,
    pub total_sets: usize,
    pub total_reps: f64,
    pub total_minutes: f64,
}

pub fn total_stats(rows: &[CleanedRow]) -> TotalStats {
    // one duration per workout, taken from its first set that has one
    let mut durations: BTreeMap<WorkoutUid, Option<f64>> = BTreeMap::new();
    for r in rows {
        let d = durations.entry(r.workout_uid).or_insert(None);
        if d.is_none() {
            *d = r.duration_minutes;
        }
    }
    TotalStats {
        workouts: durations.len(),
        total_volume: rows.iter().map(|r| r.volume).sum(),
        total_sets: rows.len(),
        total_reps: rows.iter().map(|r| r.reps).sum(),
        total_minutes: durations.values().map(|d| d.unwrap_or(0.0)).sum(),
    }
}

/// Only the sets belonging to one routine.
pub fn workout_rows(rows: &[CleanedRow], workout: &str) -> Vec<CleanedRow> {
    rows.iter()
        .filter(|r| r.workout_name == workout)
        .cloned()
        .collect()
}

/// Exercise names in first-seen order.
pub fn unique_exercises(rows: &[CleanedRow]) -> Vec<String> {
    unique_by(rows, |r| &r.exercise_name)
}

/// Routine names in first-seen order.
pub fn unique_workouts(rows: &[CleanedRow]) -> Vec<String> {
    unique_by(rows, |r| &r.workout_name)
}

fn unique_by<F>(rows: &[CleanedRow], key: F) -> Vec<String>
where
    F: Fn(&CleanedRow) -> &String,
{
    let mut seen: HashSet<&str> = HashSet::new();
    rows.iter()
        .map(|r| key(r).as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
