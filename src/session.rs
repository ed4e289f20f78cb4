// In-memory pipeline state for one uploaded file.
//
// Each derived stage is cached under a fingerprint of its upstream
// fingerprint and its own parameters, so changing the date range
// invalidates the filtered rows and everything aggregated from them, while
// switching exercises only recomputes the exercise aggregate.
use crate::aggregate::{aggregate_exercise, aggregate_workout, ExerciseAggregate, Periods, WorkoutAggregate};
use crate::columns::ColumnConfig;
use crate::error::PipelineResult;
use crate::filter::{date_bounds, filter_date_range};
use crate::loader::{load_and_clean_bytes, CleanedTable};
use crate::stats::{total_stats, unique_exercises, unique_workouts, workout_rows, TotalStats};
use crate::types::CleanedRow;
use chrono::NaiveDate;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Single-slot cache keyed by a 64-bit fingerprint.
#[derive(Debug)]
pub struct Memo<V> {
    entry: Option<(u64, V)>,
    computations: u64,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<V> Memo<V> {
    /// Returns the cached value for `key`, computing it if the key changed.
    pub fn get_or_insert_with<F>(&mut self, key: u64, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        let entry = match self.entry.take() {
            Some((k, v)) if k == key => {
                tracing::trace!(key, "memo hit");
                (k, v)
            }
            _ => {
                tracing::debug!(key, "memo recompute");
                self.computations += 1;
                (key, compute())
            }
        };
        &self.entry.insert(entry).1
    }

    pub fn value(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, v)| v)
    }

    /// How many times the value has been (re)computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
pub struct Session {
    table: CleanedTable,
    revision: u64,
    range: Option<(NaiveDate, NaiveDate)>,
    filtered: Memo<Vec<CleanedRow>>,
    exercise: Memo<Periods<ExerciseAggregate>>,
    workout: Memo<Periods<WorkoutAggregate>>,
}

impl Session {
    /// Starts a session over `table` with the full date span selected.
    pub fn new(table: CleanedTable) -> Self {
        let range = date_bounds(&table.rows);
        Self {
            table,
            revision: 0,
            range,
            filtered: Memo::default(),
            exercise: Memo::default(),
            workout: Memo::default(),
        }
    }

    pub fn from_csv_bytes(bytes: &[u8], config: &ColumnConfig) -> PipelineResult<Self> {
        Ok(Self::new(load_and_clean_bytes(bytes, config)?))
    }

    /// Swaps in a freshly uploaded table; every cached stage goes stale.
    pub fn replace_table(&mut self, table: CleanedTable) {
        self.range = date_bounds(&table.rows);
        self.table = table;
        self.revision += 1;
        self.filtered.clear();
        self.exercise.clear();
        self.workout.clear();
    }

    pub fn table(&self) -> &CleanedTable {
        &self.table
    }

    /// Full span of the loaded data.
    pub fn data_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_bounds(&self.table.rows)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.range
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.range = Some((start, end));
    }

    /// Back to the full span of the loaded data.
    pub fn reset_date_range(&mut self) {
        self.range = self.data_bounds();
    }

    fn refresh_filtered(&mut self) -> u64 {
        let key = fingerprint(&(self.revision, self.range));
        let rows = &self.table.rows;
        let range = self.range;
        self.filtered.get_or_insert_with(key, || match range {
            Some((start, end)) => filter_date_range(rows, start, end),
            None => Vec::new(),
        });
        key
    }

    /// Rows inside the selected date range.
    pub fn filtered(&mut self) -> &[CleanedRow] {
        self.refresh_filtered();
        self.filtered.value().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn exercise(&mut self, name: &str) -> &Periods<ExerciseAggregate> {
        let key = fingerprint(&(self.refresh_filtered(), name));
        let rows = self.filtered.value().map(Vec::as_slice).unwrap_or(&[]);
        self.exercise
            .get_or_insert_with(key, || aggregate_exercise(rows, name))
    }

    pub fn workout(&mut self, name: &str) -> &Periods<WorkoutAggregate> {
        let key = fingerprint(&(self.refresh_filtered(), name));
        let rows = self.filtered.value().map(Vec::as_slice).unwrap_or(&[]);
        self.workout
            .get_or_insert_with(key, || aggregate_workout(rows, name))
    }

    pub fn total_stats(&mut self) -> TotalStats {
        total_stats(self.filtered())
    }

    /// Totals for one routine within the selected range.
    pub fn workout_stats(&mut self, name: &str) -> TotalStats {
        total_stats(&workout_rows(self.filtered(), name))
    }

    pub fn exercises(&mut self) -> Vec<String> {
        unique_exercises(self.filtered())
    }

    pub fn workouts(&mut self) -> Vec<String> {
        unique_workouts(self.filtered())
    }

    /// (filtered, exercise, workout) computation counts.
    pub fn computations(&self) -> (u64, u64, u64) {
        (
            self.filtered.computations(),
            self.exercise.computations(),
            self.workout.computations(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Date,Workout Name,Duration,Exercise Name,Weight,Reps
2024-01-01,Push,60,Bench,100,5
2024-01-01,Push,60,Dips,0,10
2024-01-03,Pull,45,Row,80,8
2024-01-08,Push,50,Bench,105,5
";

    fn session() -> Session {
        let config = ColumnConfig::embedded().unwrap();
        Session::from_csv_bytes(CSV.as_bytes(), &config).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn memo_recomputes_only_on_key_change() {
        let mut memo: Memo<u32> = Memo::default();
        assert_eq!(*memo.get_or_insert_with(1, || 10), 10);
        assert_eq!(*memo.get_or_insert_with(1, || 20), 10);
        assert_eq!(*memo.get_or_insert_with(2, || 30), 30);
        assert_eq!(memo.computations(), 2);
    }

    #[test]
    fn default_range_spans_data() {
        let mut s = session();
        assert_eq!(s.date_range(), Some((d(1), d(8))));
        assert_eq!(s.filtered().len(), 4);
        assert_eq!(s.exercises(), vec!["Bench", "Dips", "Row"]);
        assert_eq!(s.workouts(), vec!["Push", "Pull"]);
    }

    #[test]
    fn exercise_switch_reuses_filtered_rows() {
        let mut s = session();
        assert_eq!(s.exercise("Bench").len(), 2);
        assert_eq!(s.exercise("Bench").len(), 2);
        assert_eq!(s.exercise("Row").len(), 1);
        assert_eq!(s.computations(), (1, 2, 0));
    }

    #[test]
    fn range_change_invalidates_downstream() {
        let mut s = session();
        assert_eq!(s.exercise("Bench").len(), 2);
        s.set_date_range(d(2), d(8));
        assert_eq!(s.exercise("Bench").len(), 1);
        assert_eq!(s.computations(), (2, 2, 0));

        s.set_date_range(d(8), d(2));
        assert!(s.filtered().is_empty());
        assert!(s.workout("Push").is_empty());
        assert_eq!(s.total_stats(), TotalStats::default());
    }

    #[test]
    fn reset_range_restores_full_span() {
        let mut s = session();
        s.set_date_range(d(3), d(3));
        assert_eq!(s.filtered().len(), 1);
        s.reset_date_range();
        assert_eq!(s.date_range(), Some((d(1), d(8))));
        assert_eq!(s.filtered().len(), 4);
        assert_eq!(s.exercise("Bench").len(), 2);
    }

    #[test]
    fn workout_stats_cover_one_routine() {
        let mut s = session();
        let stats = s.workout_stats("Push");
        assert_eq!(stats.workouts, 2);
        assert_eq!(stats.total_sets, 3);
        assert_eq!(stats.total_minutes, 110.0);
        assert_eq!(s.workout("Push").current()[0].total_volume, 525.0);
    }

    #[test]
    fn replacing_table_resets_range() {
        let mut s = session();
        s.set_date_range(d(2), d(3));
        let config = ColumnConfig::embedded().unwrap();
        let table = load_and_clean_bytes(
            b"Date,Workout Name,Exercise Name,Weight,Reps\n2024-02-01,Legs,Squat,120,5\n",
            &config,
        )
        .unwrap();
        s.replace_table(table);
        assert_eq!(
            s.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
            ))
        );
        assert_eq!(s.exercises(), vec!["Squat"]);
    }
}
