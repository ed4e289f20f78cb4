use crate::columns::{ColumnConfig, Field, ResolvedColumns};
use crate::error::{PipelineResult, RowParseError};
use crate::types::{CleanedRow, RawRow, WorkoutUid};
use crate::util::{parse_datetime_safe, parse_duration_minutes, parse_f64_safe, parse_u32_safe};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const DEFAULT_WORKOUT_NAME: &str = "Workout";

/// A row the cleaner discarded, with its 1-based line in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub line: u64,
    pub error: RowParseError,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped: Vec<DroppedRow>,
}

/// Output of the cleaner: typed rows plus the mapping used to read them.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub rows: Vec<CleanedRow>,
    pub columns: ResolvedColumns,
    pub report: LoadReport,
}

pub fn load_and_clean<P: AsRef<Path>>(
    path: P,
    config: &ColumnConfig,
) -> PipelineResult<CleanedTable> {
    let file = std::fs::File::open(path)?;
    load_and_clean_reader(file, config)
}

pub fn load_and_clean_bytes(bytes: &[u8], config: &ColumnConfig) -> PipelineResult<CleanedTable> {
    load_and_clean_reader(bytes, config)
}

/// Reads a CSV export, resolves its columns and cleans every row.
///
/// A header row that lacks a required field fails the whole load; a bad
/// row only drops that row.
pub fn load_and_clean_reader<R: Read>(
    reader: R,
    config: &ColumnConfig,
) -> PipelineResult<CleanedTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = config.resolve(headers.iter())?;

    let mut report = LoadReport::default();
    let mut rows: Vec<CleanedRow> = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        report.total_rows += 1;
        // header is line 1
        let fallback_line = idx as u64 + 2;
        let cleaned = match result {
            Ok(record) => {
                let line = record.position().map_or(fallback_line, |p| p.line());
                let raw = raw_row(&record, &columns);
                clean_row(&raw).map_err(|error| DroppedRow { line, error })
            }
            Err(e) => Err(DroppedRow {
                line: e.position().map_or(fallback_line, |p| p.line()),
                error: RowParseError::Malformed(e.to_string()),
            }),
        };
        match cleaned {
            Ok(row) => rows.push(row),
            Err(dropped) => {
                tracing::warn!(line = dropped.line, error = %dropped.error, "dropping row");
                report.dropped.push(dropped);
            }
        }
    }

    assign_workout_uids(&mut rows);
    report.kept_rows = rows.len();
    tracing::info!(
        total = report.total_rows,
        kept = report.kept_rows,
        dropped = report.dropped.len(),
        "cleaned workout log"
    );
    Ok(CleanedTable {
        rows,
        columns,
        report,
    })
}

/// Pulls the mapped cells out of a CSV record. Empty cells become `None`.
pub fn raw_row(record: &StringRecord, columns: &ResolvedColumns) -> RawRow {
    let cell = |field: Field| {
        columns
            .index(field)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    RawRow {
        date: cell(Field::Date),
        workout_name: cell(Field::WorkoutName),
        exercise_name: cell(Field::ExerciseName),
        weight: cell(Field::Weight),
        reps: cell(Field::Reps),
        duration: cell(Field::WorkoutDuration),
        end_time: cell(Field::EndTime),
        set_order: cell(Field::SetOrder),
        notes: cell(Field::Notes),
        rpe: cell(Field::Rpe),
    }
}

/// Types a single row. The returned row carries a placeholder uid until
/// `assign_workout_uids` runs over the whole table.
pub fn clean_row(raw: &RawRow) -> Result<CleanedRow, RowParseError> {
    let date_str = raw.date.as_deref().ok_or(RowParseError::MissingDate)?;
    let started_at = parse_datetime_safe(Some(date_str))
        .ok_or_else(|| RowParseError::InvalidDate(date_str.to_string()))?;

    let exercise_name = raw
        .exercise_name
        .clone()
        .ok_or(RowParseError::MissingExercise)?;
    let workout_name = raw
        .workout_name
        .clone()
        .unwrap_or_else(|| DEFAULT_WORKOUT_NAME.to_string());

    let weight = non_negative(Field::Weight, raw.weight.as_deref())?;
    let reps = non_negative(Field::Reps, raw.reps.as_deref())?;

    let duration_minutes = parse_duration_minutes(raw.duration.as_deref()).or_else(|| {
        let end = parse_datetime_safe(raw.end_time.as_deref())?;
        let minutes = (end - started_at).num_seconds() as f64 / 60.0;
        (minutes >= 0.0).then_some(minutes)
    });

    Ok(CleanedRow {
        workout_uid: WorkoutUid(0),
        date: started_at.date(),
        workout_name,
        exercise_name,
        weight,
        reps,
        volume: weight * reps,
        duration_minutes,
        set_order: parse_u32_safe(raw.set_order.as_deref()),
        rpe: parse_f64_safe(raw.rpe.as_deref()),
        notes: raw.notes.clone(),
    })
}

/// Numbers distinct (date, workout name) pairs in chronological order.
pub fn assign_workout_uids(rows: &mut [CleanedRow]) {
    let mut keys: BTreeMap<(NaiveDate, String), WorkoutUid> = rows
        .iter()
        .map(|r| ((r.date, r.workout_name.clone()), WorkoutUid(0)))
        .collect();
    for (n, uid) in keys.values_mut().enumerate() {
        *uid = WorkoutUid(n as u32);
    }
    for r in rows.iter_mut() {
        if let Some(uid) = keys.get(&(r.date, r.workout_name.clone())) {
            r.workout_uid = *uid;
        }
    }
}

// Missing counts as zero (bodyweight sets have no weight); garbage or a
// negative value drops the row.
fn non_negative(field: Field, value: Option<&str>) -> Result<f64, RowParseError> {
    let Some(s) = value else {
        return Ok(0.0);
    };
    let v = parse_f64_safe(Some(s)).ok_or_else(|| RowParseError::InvalidNumber {
        field,
        value: s.to_string(),
    })?;
    if v < 0.0 {
        return Err(RowParseError::Negative {
            field,
            value: s.to_string(),
        });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_CSV: &str = "\
Date,Workout Name,Duration,Exercise Name,Set Order,Weight,Reps,Notes,RPE
2024-01-01 18:00:00,Push,1h 5m,Bench,1,100,5,,8
2024-01-01 18:00:00,Push,1h 5m,Bench,2,100,5,felt easy,
2024-01-01 18:00:00,Push,1h 5m,Dips,1,,12,,
2024-01-08 18:00:00,Push,55m,Bench,1,105,5,,9
2024-01-09 07:00:00,Pull,40m,Row,1,80,8,,
";

    fn load(csv: &str) -> CleanedTable {
        let config = ColumnConfig::embedded().unwrap();
        load_and_clean_bytes(csv.as_bytes(), &config).unwrap()
    }

    #[test]
    fn cleans_strong_export() {
        let table = load(STRONG_CSV);
        assert_eq!(table.report.total_rows, 5);
        assert_eq!(table.rows.len(), 5);
        assert!(table.report.dropped.is_empty());

        let first = &table.rows[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.volume, 500.0);
        assert_eq!(first.duration_minutes, Some(65.0));
        assert_eq!(first.rpe, Some(8.0));
        assert_eq!(table.rows[1].notes.as_deref(), Some("felt easy"));
    }

    #[test]
    fn volume_is_weight_times_reps() {
        let table = load(STRONG_CSV);
        for r in &table.rows {
            assert!(r.weight >= 0.0 && r.reps >= 0.0);
            assert_eq!(r.volume, r.weight * r.reps);
        }
    }

    #[test]
    fn missing_weight_is_zero() {
        let table = load(STRONG_CSV);
        let dips = table.rows.iter().find(|r| r.exercise_name == "Dips").unwrap();
        assert_eq!(dips.weight, 0.0);
        assert_eq!(dips.reps, 12.0);
        assert_eq!(dips.volume, 0.0);
    }

    #[test]
    fn workout_uids_follow_date_and_routine() {
        let table = load(STRONG_CSV);
        let uids: Vec<u32> = table.rows.iter().map(|r| r.workout_uid.0).collect();
        assert_eq!(uids, vec![0, 0, 0, 1, 2]);
    }

    #[test]
    fn bad_date_drops_only_that_row() {
        let csv = STRONG_CSV.replace("2024-01-08 18:00:00", "not a date");
        let table = load(&csv);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.report.dropped.len(), 1);
        assert_eq!(table.report.dropped[0].line, 5);
        assert_eq!(
            table.report.dropped[0].error,
            RowParseError::InvalidDate("not a date".to_string())
        );
    }

    #[test]
    fn negative_and_garbage_numbers_drop_rows() {
        let csv = "\
Date,Workout Name,Exercise Name,Weight,Reps
2024-01-01,Legs,Squat,-20,5
2024-01-01,Legs,Squat,100,lots
2024-01-01,Legs,Squat,100,
";
        let table = load(csv);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].reps, 0.0);
        assert!(matches!(
            table.report.dropped[0].error,
            RowParseError::Negative { field: Field::Weight, .. }
        ));
        assert!(matches!(
            table.report.dropped[1].error,
            RowParseError::InvalidNumber { field: Field::Reps, .. }
        ));
    }

    #[test]
    fn missing_exercise_and_workout_name() {
        let csv = "\
Date,Workout Name,Exercise Name,Weight,Reps
2024-01-01,,Squat,100,5
2024-01-01,Legs,,100,5
";
        let table = load(csv);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].workout_name, "Workout");
        assert_eq!(table.report.dropped[0].error, RowParseError::MissingExercise);
    }

    #[test]
    fn duration_from_end_time() {
        let csv = "\
title,start_time,end_time,exercise_title,weight_kg,reps
Push,\"15 Jan 2024, 18:30\",\"15 Jan 2024, 19:45\",Bench,60,10
";
        let table = load(csv);
        assert_eq!(table.rows[0].duration_minutes, Some(75.0));
        assert_eq!(table.rows[0].volume, 600.0);
    }

    #[test]
    fn keeps_rfc3339_and_fractional_timestamps() {
        let csv = "\
Date,Workout Name,Exercise Name,Weight,Reps
2024-01-01T18:00:00Z,Push,Bench,100,5
2024-01-01 18:00:00.250,Push,Bench,100,5
2024-01-08T18:00:00.125+01:00,Push,Bench,105,5
";
        let table = load(csv);
        assert!(table.report.dropped.is_empty());
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(table.rows[1].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(table.rows[2].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        let uids: Vec<u32> = table.rows.iter().map(|r| r.workout_uid.0).collect();
        assert_eq!(uids, vec![0, 0, 1]);
    }

    #[test]
    fn schema_mismatch_fails_load() {
        let config = ColumnConfig::embedded().unwrap();
        let csv = "Date,Workout Name,Weight,Reps\n2024-01-01,Push,100,5\n";
        let err = load_and_clean_bytes(csv.as_bytes(), &config).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PipelineError::SchemaMismatch { .. }
        ));
    }
}
