// Column mapping between logical fields and exporter-specific headers.
//
// Workout apps disagree on header names ("Exercise Name" vs
// "exercise_title"), so the loader never addresses a column by its literal
// header. `ColumnConfig` lists the accepted aliases per logical field and
// `ColumnConfig::resolve` turns a concrete header row into indices.
use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

/// Default alias table shipped with the crate.
pub const DEFAULT_COLUMNS_JSON: &str = include_str!("../columns.json");

/// Logical fields the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    Date,
    WorkoutName,
    ExerciseName,
    Weight,
    Reps,
    WorkoutDuration,
    EndTime,
    SetOrder,
    Notes,
    Rpe,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Date,
        Field::WorkoutName,
        Field::ExerciseName,
        Field::Weight,
        Field::Reps,
        Field::WorkoutDuration,
        Field::EndTime,
        Field::SetOrder,
        Field::Notes,
        Field::Rpe,
    ];

    /// Fields that must be present in every supported export.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Field::Date | Field::WorkoutName | Field::ExerciseName | Field::Weight | Field::Reps
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "DATE",
            Field::WorkoutName => "WORKOUT_NAME",
            Field::ExerciseName => "EXERCISE_NAME",
            Field::Weight => "WEIGHT",
            Field::Reps => "REPS",
            Field::WorkoutDuration => "WORKOUT_DURATION",
            Field::EndTime => "END_TIME",
            Field::SetOrder => "SET_ORDER",
            Field::Notes => "NOTES",
            Field::Rpe => "RPE",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted header aliases for every logical field.
///
/// Required fields have no serde default, so a config file that omits one
/// fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct ColumnConfig {
    pub date: Vec<String>,
    pub workout_name: Vec<String>,
    pub exercise_name: Vec<String>,
    pub weight: Vec<String>,
    pub reps: Vec<String>,
    #[serde(default)]
    pub workout_duration: Vec<String>,
    #[serde(default)]
    pub end_time: Vec<String>,
    #[serde(default)]
    pub set_order: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub rpe: Vec<String>,
}

impl ColumnConfig {
    /// The alias table embedded in the binary.
    pub fn embedded() -> PipelineResult<Self> {
        Self::from_json(DEFAULT_COLUMNS_JSON)
    }

    pub fn from_json(s: &str) -> PipelineResult<Self> {
        let config: ColumnConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        match field {
            Field::Date => &self.date,
            Field::WorkoutName => &self.workout_name,
            Field::ExerciseName => &self.exercise_name,
            Field::Weight => &self.weight,
            Field::Reps => &self.reps,
            Field::WorkoutDuration => &self.workout_duration,
            Field::EndTime => &self.end_time,
            Field::SetOrder => &self.set_order,
            Field::Notes => &self.notes,
            Field::Rpe => &self.rpe,
        }
    }

    /// Checks that required fields have a usable alias and that no alias is
    /// shared between two fields.
    pub fn validate(&self) -> PipelineResult<()> {
        let mut owners: HashMap<String, Field> = HashMap::new();
        for field in Field::ALL {
            let aliases = self.aliases(field);
            if field.is_required() && aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(PipelineError::Config(format!(
                    "{} needs at least one header alias",
                    field
                )));
            }
            for alias in aliases {
                let key = normalize_header(alias);
                if key.is_empty() {
                    continue;
                }
                if let Some(owner) = owners.insert(key, field) {
                    if owner != field {
                        return Err(PipelineError::Config(format!(
                            "alias '{}' is claimed by both {} and {}",
                            alias.trim(),
                            owner,
                            field
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves a header row against the alias table.
    ///
    /// Aliases are tried in configured order; the first one present in the
    /// header row wins. Every missing required field is reported at once.
    pub fn resolve<I, S>(&self, headers: I) -> PipelineResult<ResolvedColumns>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let mut columns = BTreeMap::new();
        let mut missing = Vec::new();
        for field in Field::ALL {
            let hit = self.aliases(field).iter().find_map(|alias| {
                let key = normalize_header(alias);
                normalized.iter().position(|h| !key.is_empty() && *h == key)
            });
            match hit {
                Some(idx) => {
                    columns.insert(field, (idx, headers[idx].clone()));
                }
                None if field.is_required() => missing.push(field),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(PipelineError::SchemaMismatch { missing });
        }
        tracing::debug!(?columns, "resolved column mapping");
        Ok(ResolvedColumns { columns })
    }
}

/// Field → physical column mapping for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    columns: BTreeMap<Field, (usize, String)>,
}

impl ResolvedColumns {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).map(|(idx, _)| *idx)
    }

    /// Header string as it appears in the file.
    pub fn header(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(|(_, name)| name.as_str())
    }

    pub fn mapping(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.columns
            .iter()
            .map(|(field, (_, name))| (*field, name.as_str()))
    }
}

fn normalize_header(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_HEADERS: [&str; 12] = [
        "Date",
        "Workout Name",
        "Duration",
        "Exercise Name",
        "Set Order",
        "Weight",
        "Reps",
        "Distance",
        "Seconds",
        "Notes",
        "Workout Notes",
        "RPE",
    ];

    #[test]
    fn embedded_config_is_valid() {
        let config = ColumnConfig::embedded().unwrap();
        assert!(config.exercise_name.iter().any(|a| a == "Exercise Name"));
    }

    #[test]
    fn resolves_strong_export() {
        let config = ColumnConfig::embedded().unwrap();
        let resolved = config.resolve(STRONG_HEADERS).unwrap();
        assert_eq!(resolved.index(Field::Date), Some(0));
        assert_eq!(resolved.index(Field::ExerciseName), Some(3));
        assert_eq!(resolved.header(Field::WorkoutDuration), Some("Duration"));
        assert_eq!(resolved.index(Field::EndTime), None);
    }

    #[test]
    fn resolves_hevy_export_case_insensitively() {
        let config = ColumnConfig::embedded().unwrap();
        let headers = [
            "\u{feff}TITLE",
            "start_time",
            "end_time",
            "exercise_title",
            "weight_kg",
            "reps",
        ];
        let resolved = config.resolve(headers).unwrap();
        assert_eq!(resolved.index(Field::WorkoutName), Some(0));
        assert_eq!(resolved.header(Field::WorkoutName), Some("TITLE"));
        assert_eq!(resolved.index(Field::EndTime), Some(2));
        assert_eq!(resolved.index(Field::Weight), Some(4));
    }

    #[test]
    fn missing_exercise_column_is_schema_mismatch() {
        let config = ColumnConfig::embedded().unwrap();
        let headers = ["Date", "Workout Name", "Weight", "Reps"];
        match config.resolve(headers) {
            Err(PipelineError::SchemaMismatch { missing }) => {
                assert_eq!(missing, vec![Field::ExerciseName]);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn config_without_required_field_fails_to_parse() {
        let json = r#"{"DATE": ["Date"], "WORKOUT_NAME": ["W"], "WEIGHT": ["Weight"], "REPS": ["Reps"]}"#;
        assert!(matches!(
            ColumnConfig::from_json(json),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn blank_required_alias_is_rejected() {
        let json = r#"{"DATE": ["  "], "WORKOUT_NAME": ["W"], "EXERCISE_NAME": ["E"], "WEIGHT": ["Weight"], "REPS": ["Reps"]}"#;
        let err = ColumnConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("DATE"));
    }

    #[test]
    fn shared_alias_is_rejected() {
        let json = r#"{"DATE": ["Date"], "WORKOUT_NAME": ["Name"], "EXERCISE_NAME": ["name"], "WEIGHT": ["Weight"], "REPS": ["Reps"]}"#;
        let err = ColumnConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("claimed by both"));
    }
}
