// Error types for the ingest pipeline.
//
// Only `PipelineError` is fatal. `RowParseError` describes a single bad row
// and is recovered by dropping that row.
use crate::columns::Field;
use thiserror::Error;

/// Fatal errors that stop processing of the current input.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required logical column has no matching header in the file.
    #[error("Missing required columns: {}", join_fields(.missing))]
    SchemaMismatch { missing: Vec<Field> },

    /// The column configuration could not be loaded or is invalid.
    #[error("Invalid column configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Message shown to the user when the pipeline halts.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::SchemaMismatch { .. } => {
                "Seems like your file is not supported by LiftWise".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

/// Why a single row was dropped by the cleaner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowParseError {
    #[error("missing date")]
    MissingDate,

    #[error("unparsable date '{0}'")]
    InvalidDate(String),

    #[error("missing exercise name")]
    MissingExercise,

    #[error("unparsable {field} '{value}'")]
    InvalidNumber { field: Field, value: String },

    #[error("negative {field} '{value}'")]
    Negative { field: Field, value: String },

    /// The CSV reader could not decode the record at all.
    #[error("malformed record: {0}")]
    Malformed(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
