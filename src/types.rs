use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// One logged set exactly as it appears in the export, addressed through the
/// resolved column mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub date: Option<String>,
    pub workout_name: Option<String>,
    pub exercise_name: Option<String>,
    pub weight: Option<String>,
    pub reps: Option<String>,
    pub duration: Option<String>,
    pub end_time: Option<String>,
    pub set_order: Option<String>,
    pub notes: Option<String>,
    pub rpe: Option<String>,
}

/// Identifies one workout occurrence (date + routine name).
///
/// Ids are handed out in chronological order, so sorting by id sorts by
/// session date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WorkoutUid(pub u32);

impl fmt::Display for WorkoutUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed set with its derived volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRow {
    pub workout_uid: WorkoutUid,
    pub date: NaiveDate,
    pub workout_name: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: f64,
    /// `weight * reps`
    pub volume: f64,
    pub duration_minutes: Option<f64>,
    pub set_order: Option<u32>,
    pub rpe: Option<f64>,
    pub notes: Option<String>,
}

// Display rows for the console tables.

#[derive(Debug, Tabled, Clone)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Latest")]
    pub value: String,
    #[tabled(rename = "Delta")]
    pub delta: String,
    #[tabled(rename = "Trend/wk")]
    pub trend: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct TotalsRow {
    #[tabled(rename = "# of Workouts")]
    pub workouts: String,
    #[tabled(rename = "Total Volume (kg)")]
    pub total_volume: String,
    #[tabled(rename = "# of Sets")]
    pub total_sets: String,
    #[tabled(rename = "# of Reps")]
    pub total_reps: String,
    #[tabled(rename = "# of Minutes trained")]
    pub total_minutes: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ExerciseSeriesRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Sets")]
    pub sets: usize,
    #[tabled(rename = "Reps")]
    pub reps: String,
    #[tabled(rename = "Volume")]
    pub volume: String,
    #[tabled(rename = "MaxWeight")]
    pub max_weight: String,
    #[tabled(rename = "MeanWeight")]
    pub mean_weight: String,
    #[tabled(rename = "Notes")]
    pub notes: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct WorkoutSeriesRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Sets")]
    pub sets: usize,
    #[tabled(rename = "Reps")]
    pub reps: String,
    #[tabled(rename = "Volume")]
    pub volume: String,
    #[tabled(rename = "Minutes")]
    pub minutes: String,
}
