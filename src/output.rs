use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// File name for an exported series, e.g. `exercise_bench_press_barbell.csv`.
/// Letters outside ASCII are kept, so `Жим лёжа` stays readable.
pub fn export_file_name(prefix: &str, name: &str) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        format!("{}.csv", prefix)
    } else {
        format!("{}_{}.csv", prefix, slug)
    }
}

/// Hands out export file names that are unique within one export run.
/// A name whose slug is already taken gets `_2`, `_3`, ... before `.csv`.
#[derive(Debug, Default)]
pub struct ExportNames {
    used: HashSet<String>,
}

impl ExportNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(&mut self, prefix: &str, name: &str) -> String {
        let base = export_file_name(prefix, name);
        if self.used.insert(base.clone()) {
            return base;
        }
        let stem = base.trim_end_matches(".csv");
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}.csv", stem, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
