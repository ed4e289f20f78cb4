// Per-workout aggregation for a single exercise or a single routine.
use crate::metrics::MetricSource;
use crate::types::{CleanedRow, WorkoutUid};
use crate::util::average;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A chronological aggregate series split for delta display.
///
/// `current` is the most recent entry and `previous` everything before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Periods<T> {
    series: Vec<T>,
}

impl<T> Periods<T> {
    /// `series` must already be in chronological order.
    pub fn new(series: Vec<T>) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &[T] {
        &self.series
    }

    pub fn current(&self) -> &[T] {
        let split = self.series.len().saturating_sub(1);
        &self.series[split..]
    }

    pub fn previous(&self) -> &[T] {
        let split = self.series.len().saturating_sub(1);
        &self.series[..split]
    }

    /// True when there is a previous period to compare against.
    pub fn has_baseline(&self) -> bool {
        self.series.len() >= 2
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }
}

/// One exercise within one workout occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseAggregate {
    pub workout_uid: WorkoutUid,
    pub date: NaiveDate,
    pub total_sets: usize,
    pub total_reps: f64,
    pub total_volume: f64,
    pub max_weight: f64,
    pub max_reps: f64,
    pub max_volume: f64,
    pub mean_weight: f64,
    pub mean_reps: f64,
    /// Set notes joined with "; ".
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseField {
    TotalSets,
    TotalReps,
    TotalVolume,
    MaxWeight,
    MaxReps,
    MaxVolume,
    MeanWeight,
    MeanReps,
}

impl ExerciseField {
    pub const ALL: [ExerciseField; 8] = [
        ExerciseField::TotalSets,
        ExerciseField::TotalReps,
        ExerciseField::TotalVolume,
        ExerciseField::MaxWeight,
        ExerciseField::MaxReps,
        ExerciseField::MaxVolume,
        ExerciseField::MeanWeight,
        ExerciseField::MeanReps,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExerciseField::TotalSets => "total_sets",
            ExerciseField::TotalReps => "total_reps",
            ExerciseField::TotalVolume => "total_volume",
            ExerciseField::MaxWeight => "max_weight",
            ExerciseField::MaxReps => "max_reps",
            ExerciseField::MaxVolume => "max_volume",
            ExerciseField::MeanWeight => "mean_weight",
            ExerciseField::MeanReps => "mean_reps",
        }
    }
}

impl fmt::Display for ExerciseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExerciseField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("Unknown exercise field: {}", s))
    }
}

impl MetricSource for ExerciseAggregate {
    type Field = ExerciseField;

    fn metric(&self, field: ExerciseField) -> f64 {
        match field {
            ExerciseField::TotalSets => self.total_sets as f64,
            ExerciseField::TotalReps => self.total_reps,
            ExerciseField::TotalVolume => self.total_volume,
            ExerciseField::MaxWeight => self.max_weight,
            ExerciseField::MaxReps => self.max_reps,
            ExerciseField::MaxVolume => self.max_volume,
            ExerciseField::MeanWeight => self.mean_weight,
            ExerciseField::MeanReps => self.mean_reps,
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// One occurrence of a workout routine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutAggregate {
    pub workout_uid: WorkoutUid,
    pub date: NaiveDate,
    pub total_sets: usize,
    pub total_reps: f64,
    pub total_volume: f64,
    pub duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutField {
    TotalSets,
    TotalReps,
    TotalVolume,
    Duration,
}

impl WorkoutField {
    pub const ALL: [WorkoutField; 4] = [
        WorkoutField::TotalSets,
        WorkoutField::TotalReps,
        WorkoutField::TotalVolume,
        WorkoutField::Duration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WorkoutField::TotalSets => "total_sets",
            WorkoutField::TotalReps => "total_reps",
            WorkoutField::TotalVolume => "total_volume",
            WorkoutField::Duration => "duration",
        }
    }
}

impl fmt::Display for WorkoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkoutField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkoutField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("Unknown workout field: {}", s))
    }
}

impl MetricSource for WorkoutAggregate {
    type Field = WorkoutField;

    fn metric(&self, field: WorkoutField) -> f64 {
        match field {
            WorkoutField::TotalSets => self.total_sets as f64,
            WorkoutField::TotalReps => self.total_reps,
            WorkoutField::TotalVolume => self.total_volume,
            WorkoutField::Duration => self.duration_minutes.unwrap_or(0.0),
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Groups the sets of one exercise by workout occurrence.
pub fn aggregate_exercise(rows: &[CleanedRow], exercise: &str) -> Periods<ExerciseAggregate> {
    #[derive(Default)]
    struct Acc {
        date: Option<NaiveDate>,
        weights: Vec<f64>,
        reps: Vec<f64>,
        volumes: Vec<f64>,
        notes: Vec<String>,
    }

    let mut map: BTreeMap<WorkoutUid, Acc> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.exercise_name == exercise) {
        let e = map.entry(r.workout_uid).or_default();
        e.date.get_or_insert(r.date);
        e.weights.push(r.weight);
        e.reps.push(r.reps);
        e.volumes.push(r.volume);
        if let Some(n) = &r.notes {
            e.notes.push(n.clone());
        }
    }

    let series = map
        .into_iter()
        .filter_map(|(uid, acc)| {
            Some(ExerciseAggregate {
                workout_uid: uid,
                date: acc.date?,
                total_sets: acc.weights.len(),
                total_reps: acc.reps.iter().sum(),
                total_volume: acc.volumes.iter().sum(),
                max_weight: max_of(&acc.weights),
                max_reps: max_of(&acc.reps),
                max_volume: max_of(&acc.volumes),
                mean_weight: average(&acc.weights),
                mean_reps: average(&acc.reps),
                notes: (!acc.notes.is_empty()).then(|| acc.notes.join("; ")),
            })
        })
        .collect();
    Periods::new(series)
}

/// Groups the sets of one workout routine by occurrence.
pub fn aggregate_workout(rows: &[CleanedRow], workout: &str) -> Periods<WorkoutAggregate> {
    let mut map: BTreeMap<WorkoutUid, WorkoutAggregate> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.workout_name == workout) {
        let e = map.entry(r.workout_uid).or_insert_with(|| WorkoutAggregate {
            workout_uid: r.workout_uid,
            date: r.date,
            total_sets: 0,
            total_reps: 0.0,
            total_volume: 0.0,
            duration_minutes: None,
        });
        e.total_sets += 1;
        e.total_reps += r.reps;
        e.total_volume += r.volume;
        // every set repeats the session duration; keep the first one given
        if e.duration_minutes.is_none() {
            e.duration_minutes = r.duration_minutes;
        }
    }
    Periods::new(map.into_values().collect())
}

fn max_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(uid: u32, day: u32, workout: &str, exercise: &str, weight: f64, reps: f64) -> CleanedRow {
        CleanedRow {
            workout_uid: WorkoutUid(uid),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            workout_name: workout.to_string(),
            exercise_name: exercise.to_string(),
            weight,
            reps,
            volume: weight * reps,
            duration_minutes: Some(60.0),
            set_order: None,
            rpe: None,
            notes: None,
        }
    }

    fn log() -> Vec<CleanedRow> {
        vec![
            set(0, 1, "Push", "Bench", 100.0, 5.0),
            set(0, 1, "Push", "Bench", 90.0, 8.0),
            set(0, 1, "Push", "Dips", 0.0, 12.0),
            set(1, 3, "Pull", "Row", 80.0, 10.0),
            set(2, 8, "Push", "Bench", 105.0, 5.0),
        ]
    }

    #[test]
    fn exercise_groups_per_workout() {
        let periods = aggregate_exercise(&log(), "Bench");
        assert_eq!(periods.len(), 2);

        let first = &periods.series()[0];
        assert_eq!(first.total_sets, 2);
        assert_eq!(first.total_reps, 13.0);
        assert_eq!(first.total_volume, 1220.0);
        assert_eq!(first.max_weight, 100.0);
        assert_eq!(first.max_reps, 8.0);
        assert_eq!(first.max_volume, 720.0);
        assert_eq!(first.mean_weight, 95.0);
        assert_eq!(first.mean_reps, 6.5);

        assert_eq!(periods.current()[0].total_volume, 525.0);
        assert_eq!(periods.previous().len(), 1);
    }

    #[test]
    fn set_counts_sum_to_exercise_rows() {
        let rows = log();
        let periods = aggregate_exercise(&rows, "Bench");
        let sets: usize = periods.series().iter().map(|a| a.total_sets).sum();
        let expected = rows.iter().filter(|r| r.exercise_name == "Bench").count();
        assert_eq!(sets, expected);
    }

    #[test]
    fn unknown_exercise_is_empty() {
        let periods = aggregate_exercise(&log(), "Curl");
        assert!(periods.is_empty());
        assert!(periods.current().is_empty());
        assert!(periods.previous().is_empty());
        assert!(!periods.has_baseline());
    }

    #[test]
    fn single_group_has_no_baseline() {
        let periods = aggregate_exercise(&log(), "Dips");
        assert_eq!(periods.current().len(), 1);
        assert!(periods.previous().is_empty());
        assert!(!periods.has_baseline());
    }

    #[test]
    fn workout_groups_per_occurrence() {
        let periods = aggregate_workout(&log(), "Push");
        assert_eq!(periods.len(), 2);
        let first = &periods.series()[0];
        assert_eq!(first.total_sets, 3);
        assert_eq!(first.total_reps, 25.0);
        assert_eq!(first.total_volume, 1220.0);
        assert_eq!(first.duration_minutes, Some(60.0));
        assert_eq!(periods.current()[0].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn fields_parse_from_names() {
        assert_eq!("max_weight".parse(), Ok(ExerciseField::MaxWeight));
        assert_eq!("duration".parse(), Ok(WorkoutField::Duration));
        assert!("max_weight".parse::<WorkoutField>().is_err());
    }
}
