use crate::metrics::MetricSource;
use chrono::NaiveDate;
use serde::Serialize;

/// Least-squares line through a dated series, in units per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub origin: NaiveDate,
    pub slope_per_day: f64,
    /// Fitted value at `origin`.
    pub intercept: f64,
}

impl LinearTrend {
    pub fn at(&self, date: NaiveDate) -> f64 {
        let x = (date - self.origin).num_days() as f64;
        self.intercept + self.slope_per_day * x
    }
}

/// Fits a line through `(date, value)` points.
///
/// Returns `None` unless there are at least two distinct dates.
pub fn linear_trend(points: &[(NaiveDate, f64)]) -> Option<LinearTrend> {
    let origin = points.iter().map(|(d, _)| *d).min()?;
    let xs: Vec<f64> = points
        .iter()
        .map(|(d, _)| (*d - origin).num_days() as f64)
        .collect();
    let n = points.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| *y).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, (_, y)) in xs.iter().zip(points) {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx.abs() < f64::EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearTrend {
        origin,
        slope_per_day: slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Trend of one field across an aggregate series.
pub fn series_trend<T: MetricSource>(series: &[T], field: T::Field) -> Option<LinearTrend> {
    let points: Vec<(NaiveDate, f64)> = series.iter().map(|a| (a.date(), a.metric(field))).collect();
    linear_trend(&points)
}
