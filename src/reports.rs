use crate::aggregate::{ExerciseAggregate, ExerciseField, Periods, WorkoutAggregate, WorkoutField};
use crate::metrics::{metric_and_delta, MetricDelta, MetricSource, Reduction};
use crate::session::Session;
use crate::stats::TotalStats;
use crate::trend::series_trend;
use crate::types::{ExerciseSeriesRow, MetricRow, TotalsRow, WorkoutSeriesRow};
use crate::util::{format_delta, format_int, format_number};
use chrono::NaiveDate;
use serde::Serialize;

/// Headline metrics shown for an exercise, in display order.
pub const EXERCISE_METRICS: [(&str, ExerciseField, Reduction); 6] = [
    ("Total Sets", ExerciseField::TotalSets, Reduction::Sum),
    ("Total Reps", ExerciseField::TotalReps, Reduction::Sum),
    ("Total Volume (kg)", ExerciseField::TotalVolume, Reduction::Sum),
    ("Max Weight (kg)", ExerciseField::MaxWeight, Reduction::Max),
    ("Max Reps", ExerciseField::MaxReps, Reduction::Max),
    ("Max Volume (kg)", ExerciseField::MaxVolume, Reduction::Max),
];

pub const WORKOUT_METRICS: [(&str, WorkoutField, Reduction); 4] = [
    ("Total Sets", WorkoutField::TotalSets, Reduction::Sum),
    ("Total Reps", WorkoutField::TotalReps, Reduction::Sum),
    ("Total Volume (kg)", WorkoutField::TotalVolume, Reduction::Sum),
    ("Duration (min)", WorkoutField::Duration, Reduction::Sum),
];

#[derive(Debug, Serialize)]
pub struct ExerciseSummary {
    pub exercise: String,
    pub sessions: usize,
    pub latest_volume: f64,
    pub volume_delta: f64,
    pub volume_trend_per_week: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub totals: TotalStats,
    pub exercises: Vec<ExerciseSummary>,
}

pub fn totals_row(stats: &TotalStats) -> TotalsRow {
    TotalsRow {
        workouts: format_int(stats.workouts),
        total_volume: format_number(stats.total_volume, 0),
        total_sets: format_int(stats.total_sets),
        total_reps: format_number(stats.total_reps, 0),
        total_minutes: format_number(stats.total_minutes, 0),
    }
}

fn metric_rows<T, F>(periods: &Periods<T>, metrics: &[(&str, F, Reduction)]) -> Vec<MetricRow>
where
    T: MetricSource<Field = F>,
    F: Copy,
{
    metrics
        .iter()
        .map(|&(label, field, reduction)| {
            let MetricDelta { value, delta, .. } = metric_and_delta(periods, field, reduction);
            MetricRow {
                metric: label.to_string(),
                value: format_number(value, 1),
                delta: if periods.has_baseline() {
                    format_delta(delta, 1)
                } else {
                    "-".to_string()
                },
                trend: series_trend(periods.series(), field)
                    .map_or_else(|| "-".to_string(), |t| format_delta(t.slope_per_day * 7.0, 1)),
            }
        })
        .collect()
}

pub fn exercise_metric_rows(periods: &Periods<ExerciseAggregate>) -> Vec<MetricRow> {
    metric_rows(periods, &EXERCISE_METRICS)
}

pub fn workout_metric_rows(periods: &Periods<WorkoutAggregate>) -> Vec<MetricRow> {
    metric_rows(periods, &WORKOUT_METRICS)
}

pub fn exercise_series_rows(periods: &Periods<ExerciseAggregate>) -> Vec<ExerciseSeriesRow> {
    periods
        .series()
        .iter()
        .map(|a| ExerciseSeriesRow {
            date: a.date.to_string(),
            sets: a.total_sets,
            reps: format_number(a.total_reps, 0),
            volume: format_number(a.total_volume, 1),
            max_weight: format_number(a.max_weight, 1),
            mean_weight: format_number(a.mean_weight, 1),
            notes: a.notes.clone().unwrap_or_default(),
        })
        .collect()
}

pub fn workout_series_rows(periods: &Periods<WorkoutAggregate>) -> Vec<WorkoutSeriesRow> {
    periods
        .series()
        .iter()
        .map(|a| WorkoutSeriesRow {
            date: a.date.to_string(),
            sets: a.total_sets,
            reps: format_number(a.total_reps, 0),
            volume: format_number(a.total_volume, 1),
            minutes: a
                .duration_minutes
                .map_or_else(|| "-".to_string(), |m| format_number(m, 0)),
        })
        .collect()
}

/// Summary of the selected range, one entry per exercise.
pub fn generate_summary(session: &mut Session) -> Summary {
    let (start_date, end_date) = session.date_range().unzip();
    let rows_loaded = session.table().report.total_rows;
    let rows_dropped = session.table().report.dropped.len();
    let totals = session.total_stats();
    let exercises = session
        .exercises()
        .into_iter()
        .map(|name| {
            let periods = session.exercise(&name);
            let volume = metric_and_delta(periods, ExerciseField::TotalVolume, Reduction::Sum);
            ExerciseSummary {
                sessions: periods.len(),
                latest_volume: volume.value,
                volume_delta: volume.delta,
                volume_trend_per_week: series_trend(periods.series(), ExerciseField::TotalVolume)
                    .map(|t| t.slope_per_day * 7.0),
                exercise: name,
            }
        })
        .collect();
    Summary {
        start_date,
        end_date,
        rows_loaded,
        rows_dropped,
        totals,
        exercises,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnConfig;

    const CSV: &str = "\
Date,Workout Name,Duration,Exercise Name,Weight,Reps,Notes
2024-01-01,Push,60,Bench,100,5,
2024-01-08,Push,50,Bench,105,5,paused reps
2024-01-08,Push,50,Dips,,10,
";

    fn session() -> Session {
        let config = ColumnConfig::embedded().unwrap();
        Session::from_csv_bytes(CSV.as_bytes(), &config).unwrap()
    }

    #[test]
    fn exercise_metrics_show_delta_and_trend() {
        let mut s = session();
        let rows = exercise_metric_rows(s.exercise("Bench"));
        assert_eq!(rows.len(), 6);
        let volume = &rows[2];
        assert_eq!(volume.metric, "Total Volume (kg)");
        assert_eq!(volume.value, "525.0");
        assert_eq!(volume.delta, "+25.0");
        assert_eq!(volume.trend, "+25.0");
    }

    #[test]
    fn single_session_has_no_delta() {
        let mut s = session();
        let rows = exercise_metric_rows(s.exercise("Dips"));
        assert!(rows.iter().all(|r| r.delta == "-" && r.trend == "-"));
    }

    #[test]
    fn series_rows_carry_notes() {
        let mut s = session();
        let rows = exercise_series_rows(s.exercise("Bench"));
        assert_eq!(rows[1].notes, "paused reps");
        let w = workout_series_rows(s.workout("Push"));
        assert_eq!(w[1].sets, 2);
        assert_eq!(w[1].minutes, "50");
    }

    #[test]
    fn summary_lists_each_exercise() {
        let mut s = session();
        let summary = generate_summary(&mut s);
        assert_eq!(summary.rows_loaded, 3);
        assert_eq!(summary.totals.workouts, 2);
        assert_eq!(summary.exercises.len(), 2);
        assert_eq!(summary.exercises[0].exercise, "Bench");
        assert_eq!(summary.exercises[0].volume_delta, 25.0);
    }
}
