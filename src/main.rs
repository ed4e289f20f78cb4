// Entry point and interactive CLI flow.
//
// - Option [1] loads and cleans a workout CSV export.
// - Options [2]-[5] set the date range and print metric tables.
// - Option [6] exports the per-workout series and a JSON summary.
// - Option [7] goes back to the full date range of the file.
use liftwise::columns::ColumnConfig;
use liftwise::output;
use liftwise::reports;
use liftwise::session::Session;
use liftwise::util::{self, parse_date_safe};
use liftwise::{load_and_clean, PipelineResult};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const COLUMNS_ENV: &str = "LIFTWISE_COLUMNS";
const USAGE: &str = "Usage: liftwise [--columns <path>] [file.csv]";

struct App {
    config: ColumnConfig,
    session: Option<Session>,
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    columns_path: Option<String>,
    csv_path: Option<String>,
}

fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--columns" => match args.next() {
                Some(path) if !path.starts_with("--") => parsed.columns_path = Some(path),
                _ => return Err("--columns needs a path".to_string()),
            },
            _ => parsed.csv_path = Some(arg),
        }
    }
    Ok(parsed)
}

/// One trimmed line, or `None` once the input is closed or unreadable.
fn read_line_from<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "stdin read failed");
            None
        }
    }
}

/// Print `label` and read one line from stdin.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_line_from(&mut io::stdin().lock())
}

fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

/// Let the user pick one entry from a numbered list.
fn pick(title: &str, names: &[String]) -> Option<String> {
    if names.is_empty() {
        println!("Nothing to select.\n");
        return None;
    }
    println!("{}", title);
    for (i, name) in names.iter().enumerate() {
        println!("[{}] {}", i + 1, name);
    }
    let choice = read_choice()?;
    match choice.parse::<usize>() {
        Ok(n) if (1..=names.len()).contains(&n) => Some(names[n - 1].clone()),
        _ => {
            println!("Invalid choice.\n");
            None
        }
    }
}

fn load_config(path: Option<String>) -> PipelineResult<ColumnConfig> {
    match path.or_else(|| std::env::var(COLUMNS_ENV).ok()) {
        Some(p) => {
            tracing::info!(path = %p, "loading column configuration");
            ColumnConfig::from_path(p)
        }
        None => ColumnConfig::embedded(),
    }
}

/// Handle option [1]: load and clean the CSV file.
///
/// On failure the previous session (if any) is kept and the user sees why
/// the file was rejected.
fn handle_load(app: &mut App, path: &str) {
    match load_and_clean(path, &app.config) {
        Ok(table) => {
            let report = &table.report;
            println!(
                "Processing dataset... ({} rows loaded, {} kept)",
                util::format_int(report.total_rows),
                util::format_int(report.kept_rows)
            );
            if !report.dropped.is_empty() {
                println!(
                    "Note: {} rows skipped due to parse/validation errors.",
                    util::format_int(report.dropped.len())
                );
            }
            for (field, header) in table.columns.mapping() {
                tracing::debug!(%field, header, "column");
            }
            match app.session.as_mut() {
                Some(session) => session.replace_table(table),
                None => app.session = Some(Session::new(table)),
            }
            if let Some((start, end)) = app.session.as_ref().and_then(Session::date_range) {
                println!("Date range: {} to {}", start, end);
            }
            println!();
        }
        Err(e) => {
            tracing::error!(error = %e, path, "load failed");
            eprintln!("{}\n", e.user_message());
        }
    }
}

/// Handle option [2]: pick a new inclusive date range. Blank input keeps
/// the current bound.
fn handle_date_range(session: &mut Session) {
    let Some((cur_start, cur_end)) = session.date_range() else {
        println!("The loaded file has no dated rows.\n");
        return;
    };
    let Some(start_in) = prompt(&format!("Start date (YYYY-MM-DD) [{}]: ", cur_start)) else {
        return;
    };
    let Some(end_in) = prompt(&format!("End date (YYYY-MM-DD) [{}]: ", cur_end)) else {
        return;
    };
    let start = if start_in.is_empty() {
        Some(cur_start)
    } else {
        parse_date_safe(Some(&start_in))
    };
    let end = if end_in.is_empty() {
        Some(cur_end)
    } else {
        parse_date_safe(Some(&end_in))
    };
    match (start, end) {
        (Some(s), Some(e)) => {
            session.set_date_range(s, e);
            println!(
                "Date range set: {} to {} ({} sets)\n",
                s,
                e,
                util::format_int(session.filtered().len())
            );
        }
        _ => println!("Invalid date. Range unchanged.\n"),
    }
}

/// Handle option [7].
fn handle_reset_range(session: &mut Session) {
    session.reset_date_range();
    match session.date_range() {
        Some((s, e)) => println!(
            "Date range reset: {} to {} ({} sets)\n",
            s,
            e,
            util::format_int(session.filtered().len())
        ),
        None => println!("The loaded file has no dated rows.\n"),
    }
}

/// Returns false (after telling the user) when the range holds no workouts.
fn has_rows(session: &mut Session) -> bool {
    if session.filtered().is_empty() {
        println!("No workouts in the selected date range.\n");
        return false;
    }
    true
}

fn handle_overall(session: &mut Session) {
    if !has_rows(session) {
        return;
    }
    let totals = reports::totals_row(&session.total_stats());
    output::preview_table("Metrics across all workouts", None, &[totals], 1);
}

fn handle_exercise(session: &mut Session) {
    if !has_rows(session) {
        return;
    }
    let Some(exercise) = pick("Select exercise:", &session.exercises()) else {
        return;
    };
    let periods = session.exercise(&exercise);
    let metrics = reports::exercise_metric_rows(periods);
    let series = reports::exercise_series_rows(periods);
    output::preview_table(
        &format!("Metrics for {}", exercise),
        Some("latest workout vs. earlier workouts"),
        &metrics,
        metrics.len(),
    );
    output::preview_table(
        &format!("Per-workout history for {}", exercise),
        None,
        &series,
        series.len(),
    );
}

fn handle_workout(session: &mut Session) {
    if !has_rows(session) {
        return;
    }
    let Some(workout) = pick("Select workout routine:", &session.workouts()) else {
        return;
    };
    let totals = reports::totals_row(&session.workout_stats(&workout));
    output::preview_table(
        &format!("Metrics for workout routine {}", workout),
        None,
        &[totals],
        1,
    );
    let periods = session.workout(&workout);
    let metrics = reports::workout_metric_rows(periods);
    let series = reports::workout_series_rows(periods);
    output::preview_table("Latest session", None, &metrics, metrics.len());
    output::preview_table(
        &format!("Per-workout history for {}", workout),
        None,
        &series,
        series.len(),
    );
}

/// Handle option [6]: write one CSV per exercise and routine plus
/// `summary.json`. Names that slug to the same file get a numeric suffix.
fn handle_export(session: &mut Session) {
    if !has_rows(session) {
        return;
    }
    let mut names = output::ExportNames::new();
    let mut written = 0usize;
    for exercise in session.exercises() {
        let file = names.file_name("exercise", &exercise);
        match output::write_csv(&file, session.exercise(&exercise).series()) {
            Ok(()) => written += 1,
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    for workout in session.workouts() {
        let file = names.file_name("workout", &workout);
        match output::write_csv(&file, session.workout(&workout).series()) {
            Ok(()) => written += 1,
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    let summary = reports::generate_summary(session);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Exported {} series files and summary.json\n",
        util::format_int(written)
    );
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(args.columns_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load column configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut app = App {
        config,
        session: None,
    };
    if let Some(path) = args.csv_path.as_deref() {
        handle_load(&mut app, path);
    }

    loop {
        println!("LiftWise - analytics for exported workout logs");
        println!("[1] Load the file");
        println!("[2] Set date range");
        println!("[3] Metrics across all workouts");
        println!("[4] Metrics for an exercise");
        println!("[5] Metrics for a workout routine");
        println!("[6] Export reports");
        println!("[7] Reset date range");
        println!("[0] Exit\n");
        let Some(choice) = read_choice() else {
            println!("\nExiting the program.");
            return ExitCode::SUCCESS;
        };
        if choice == "0" {
            println!("Exiting the program.");
            return ExitCode::SUCCESS;
        }
        if choice == "1" {
            if let Some(path) = prompt("CSV file path: ") {
                handle_load(&mut app, &path);
            }
            continue;
        }
        let Some(session) = app.session.as_mut() else {
            println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
            continue;
        };
        match choice.as_str() {
            "2" => handle_date_range(session),
            "3" => handle_overall(session),
            "4" => handle_exercise(session),
            "5" => handle_workout(session),
            "6" => handle_export(session),
            "7" => handle_reset_range(session),
            _ => println!("Invalid choice. Please enter 0-7.\n"),
        }
    }
}
