// LiftWise: analytics over exported weight-lifting logs.
//
// The pipeline runs column mapping → cleaning → date filtering →
// per-exercise / per-routine aggregation → metric + delta. Each stage is a
// plain function over the previous stage's output; `session::Session`
// threads the parameters and caches results.

pub mod aggregate;
pub mod columns;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod reports;
pub mod session;
pub mod stats;
pub mod trend;
pub mod types;
pub mod util;

pub use aggregate::{
    aggregate_exercise, aggregate_workout, ExerciseAggregate, ExerciseField, Periods,
    WorkoutAggregate, WorkoutField,
};
pub use columns::{ColumnConfig, Field, ResolvedColumns};
pub use error::{PipelineError, PipelineResult, RowParseError};
pub use filter::filter_date_range;
pub use loader::{load_and_clean, load_and_clean_bytes, CleanedTable};
pub use metrics::{metric_and_delta, metric_and_delta_against, Baseline, MetricDelta, Reduction};
pub use session::Session;
pub use types::{CleanedRow, RawRow, WorkoutUid};
