// Headline metric plus delta against the previous period.
use crate::aggregate::Periods;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// An aggregate row that exposes named numeric fields.
pub trait MetricSource {
    type Field: Copy;

    fn metric(&self, field: Self::Field) -> f64;

    fn date(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// Number of rows; the field is ignored.
    Count,
    Sum,
    Max,
}

impl Reduction {
    /// Reduces `rows` on `field`. Empty input gives 0.
    pub fn apply<T: MetricSource>(self, rows: &[T], field: T::Field) -> f64 {
        match self {
            Reduction::Count => rows.len() as f64,
            Reduction::Sum => rows.iter().map(|r| r.metric(field)).sum(),
            Reduction::Max => rows
                .iter()
                .map(|r| r.metric(field))
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
                .unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Count => write!(f, "count"),
            Reduction::Sum => write!(f, "sum"),
            Reduction::Max => write!(f, "max"),
        }
    }
}

impl FromStr for Reduction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" | "len" => Ok(Self::Count),
            "sum" => Ok(Self::Sum),
            "max" => Ok(Self::Max),
            _ => Err(format!("Unknown reduction: {}", s)),
        }
    }
}

/// What the current session is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// Every session before the latest one, reduced together.
    #[default]
    AllPrior,
    /// Only the session immediately before the latest one.
    PriorSession,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDelta {
    pub value: f64,
    /// `value - previous`, where an empty previous period counts as 0.
    pub delta: f64,
    /// The reduced previous period, `None` when there was nothing to compare.
    pub baseline: Option<f64>,
}

/// Reduces the current and previous periods and returns the current value
/// with its delta.
pub fn metric_and_delta<T: MetricSource>(
    periods: &Periods<T>,
    field: T::Field,
    reduction: Reduction,
) -> MetricDelta {
    metric_and_delta_against(periods, field, reduction, Baseline::AllPrior)
}

pub fn metric_and_delta_against<T: MetricSource>(
    periods: &Periods<T>,
    field: T::Field,
    reduction: Reduction,
    baseline: Baseline,
) -> MetricDelta {
    let value = reduction.apply(periods.current(), field);
    let previous = match baseline {
        Baseline::AllPrior => periods.previous(),
        Baseline::PriorSession => {
            let prev = periods.previous();
            &prev[prev.len().saturating_sub(1)..]
        }
    };
    let baseline = (!previous.is_empty()).then(|| reduction.apply(previous, field));
    MetricDelta {
        value,
        delta: value - baseline.unwrap_or(0.0),
        baseline,
    }
}
