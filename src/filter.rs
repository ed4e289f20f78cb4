use crate::types::CleanedRow;
use chrono::NaiveDate;

/// Rows dated within `[start, end]`, both inclusive.
///
/// An inverted range selects nothing; callers treat that the same as a range
/// with no workouts in it.
pub fn filter_date_range(rows: &[CleanedRow], start: NaiveDate, end: NaiveDate) -> Vec<CleanedRow> {
    if start > end {
        return Vec::new();
    }
    rows.iter()
        .filter(|r| r.date >= start && r.date <= end)
        .cloned()
        .collect()
}

/// Earliest and latest date in the table, used as the default range.
pub fn date_bounds(rows: &[CleanedRow]) -> Option<(NaiveDate, NaiveDate)> {
    let first = rows.first()?.date;
    Some(rows.iter().fold((first, first), |(lo, hi), r| {
        (lo.min(r.date), hi.max(r.date))
    }))
}
