// Entry point and high-level CLI flow.
//
// - `generate` flattens the source tables into yearly files.
// - `report` loads a selection and prints every chart table, optionally
//   exporting them.
// - `interactive` (the default) is a numbered menu that keeps the loaded
//   selection between reports.
use clap::Parser;
use courts_dashboard::config::{Cli, Command, DataArgs, GenerateArgs, ReportArgs};
use courts_dashboard::dashboard::{Dashboard, LoadState};
use courts_dashboard::generate::{generate, timestamp_now, SourceTables};
use courts_dashboard::index::MetricIndex;
use courts_dashboard::loader::DirSource;
use courts_dashboard::metrics::{CLEARANCE_RATE, DV_FILINGS, PRODUCTIVITY};
use courts_dashboard::output::{
    preview_section, render_lines, render_rows, render_wide, write_csv, write_json,
    write_wide_csv,
};
use courts_dashboard::reports::{self, Page, YOY_METRICS};
use courts_dashboard::types::{WideSeries, YearOverYear, YoyRow};
use courts_dashboard::util::{display_timestamp, format_int, format_signed_pct, format_value};
use once_cell::sync::Lazy;
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

// Interactive session state: the loaded selection survives between menu
// choices so reports can be shown repeatedly.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    source: Option<DirSource>,
    dashboard: Option<Dashboard>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Generate(args)) => handle_generate(&args),
        Some(Command::Report(args)) => handle_report(&args),
        Some(Command::Interactive(args)) => {
            run_interactive(&args);
            Ok(())
        }
        None => {
            run_interactive(&DataArgs::default());
            Ok(())
        }
    }
}

fn handle_generate(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let tables = SourceTables::read(&args.source_dir)?;
    let stamp = args.stamp.then(timestamp_now);
    let report = generate(&tables, &args.data.data_dir, stamp)?;
    for (path, rows) in &report.files {
        println!("Wrote {} ({} rows)", path.display(), format_int(*rows));
    }
    println!(
        "Wrote {} ({})",
        report.manifest.display(),
        report
            .years
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn handle_report(args: &ReportArgs) -> Result<(), Box<dyn Error>> {
    let source = DirSource::new(&args.data.data_dir);
    let mut dash = Dashboard::open(&source)?;
    if !args.years.is_empty() {
        dash.reload(&source, &args.years);
    }
    dash.set_court(args.court.clone());

    if let LoadState::Failed(msg) = dash.state() {
        return Err(msg.clone().into());
    }
    print_dashboard(&dash);

    if let Some(out_dir) = &args.out_dir {
        export_dashboard(&dash, out_dir)?;
        println!("(Full tables exported to {})", out_dir.display());
    }
    Ok(())
}

/// Print the state banner, or every indicator and chart table when data
/// is available.
fn print_dashboard(dash: &Dashboard) {
    let years = dash
        .selected_years()
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!("Courts Dashboard");
    if let Some(ts) = dash.last_updated() {
        println!("Last updated: {}", display_timestamp(ts));
    }
    println!("Years: {}", if years.is_empty() { "-" } else { years.as_str() });
    if let Some(court) = dash.court() {
        println!("Court: {}", court);
    }
    println!();

    match dash.state() {
        LoadState::NoSelection => {
            println!("Select at least one year to view data.\n");
            return;
        }
        LoadState::Failed(msg) => {
            println!("Error: {}\n", msg);
            return;
        }
        LoadState::Loading => {
            println!("Loading...\n");
            return;
        }
        LoadState::Ready => {}
    }

    let rows = dash.filtered_rows();
    if rows.is_empty() {
        println!("No data available for the selected years.\n");
        return;
    }
    let index = MetricIndex::new(&rows);

    for page in Page::ALL {
        let cards = reports::page_indicators(&index, page);
        preview_section(page.title(), None, &render_rows(&cards, cards.len()));
    }

    let yoy = yoy_rows(&index);
    preview_section("Year-over-Year", Some("latest two years with data"), &render_rows(&yoy, yoy.len()));

    for (title, note, series) in wide_charts(&index) {
        preview_section(title, note, &render_wide(&series));
    }
    for (title, metric) in line_charts() {
        let series = reports::line_series(&index, metric, dash.selected_years());
        preview_section(title, None, &render_lines(&series));
    }

    let pending = reports::pending_table(&index);
    preview_section("Pending Cases & PDR", None, &render_rows(&pending, pending.len()));
    let outcomes = reports::outcome_table(&index);
    preview_section(
        "Case Outcomes",
        Some("first 20 rows"),
        &render_rows(&outcomes, 20),
    );
}

fn yoy_rows(index: &MetricIndex) -> Vec<YoyRow> {
    YOY_METRICS
        .iter()
        .map(|m| match reports::year_over_year(index, m) {
            YearOverYear::InsufficientData => YoyRow {
                metric: m.to_string(),
                previous: "-".into(),
                latest: "-".into(),
                net: "Insufficient data".into(),
                pct: "-".into(),
            },
            YearOverYear::Delta {
                previous_year,
                latest_year,
                previous,
                latest,
                net,
                pct,
            } => YoyRow {
                metric: m.to_string(),
                previous: format!("{} ({})", format_value(previous), previous_year),
                latest: format!("{} ({})", format_value(latest), latest_year),
                net: format_value(net),
                pct: format_signed_pct(pct),
            },
        })
        .collect()
}

type Chart = (&'static str, Option<&'static str>, WideSeries);

fn wide_charts(index: &MetricIndex) -> Vec<Chart> {
    vec![
        ("Filings & Disposals", None, reports::filings_disposals(index)),
        ("Timeliness (days)", Some("targets: criminal 180d, civil 365d"), reports::timeliness(index)),
        ("Attendance Rates (%)", None, reports::attendance(index)),
        ("Gender Breakdown (%)", Some("as reported, not rescaled"), reports::gender(index)),
        (
            "Pending Listed Status (%)",
            Some("benchmark: 80% with a future listing"),
            reports::pending_status(index),
        ),
        ("Pending Age (%)", Some("share older than the court benchmark"), reports::pending_age(index)),
        ("Charge Orders", None, reports::charge_orders(index)),
        ("Case Outcomes by Court and Year (%)", None, reports::case_outcomes(index)),
    ]
}

fn line_charts() -> [(&'static str, &'static str); 3] {
    [
        ("Clearance Rates (%)", CLEARANCE_RATE),
        ("Productivity", PRODUCTIVITY),
        ("DV Filings", DV_FILINGS),
    ]
}

fn file_stem(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            ' ' => Some('_'),
            _ => None,
        })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn export_dashboard(dash: &Dashboard, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(out_dir)?;
    let rows = dash.filtered_rows();
    let index = MetricIndex::new(&rows);

    for (title, _, series) in wide_charts(&index) {
        write_wide_csv(&out_dir.join(format!("{}.csv", file_stem(title))), &series)?;
    }
    for (title, metric) in line_charts() {
        let series = reports::line_series(&index, metric, dash.selected_years());
        write_json(&out_dir.join(format!("{}.json", file_stem(title))), &series)?;
    }
    write_csv(&out_dir.join("pending_cases.csv"), &reports::pending_table(&index))?;
    write_csv(&out_dir.join("case_outcomes_table.csv"), &reports::outcome_table(&index))?;

    let summary = reports::generate_summary(&index, dash.last_updated().map(str::to_string));
    write_json(&out_dir.join("summary.json"), &summary)?;
    Ok(())
}

/// Read a single line of input after printing the common prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu after showing reports.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn lock_state() -> std::sync::MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Option [1]: read the manifest and load the default selection.
fn handle_open(args: &DataArgs) {
    let source = DirSource::new(&args.data_dir);
    match Dashboard::open(&source) {
        Ok(dash) => {
            println!(
                "Available years: {}",
                join_years(dash.available_years())
            );
            println!(
                "Selected: {} ({} rows loaded)\n",
                join_years(dash.selected_years()),
                format_int(dash.rows().len())
            );
            let mut state = lock_state();
            state.source = Some(source);
            state.dashboard = Some(dash);
        }
        Err(e) => eprintln!("Failed to open {}: {}\n", args.data_dir.display(), e),
    }
}

fn join_years(years: &[i32]) -> String {
    years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
}

/// Option [2]: choose years. An empty answer clears the selection.
fn handle_select_years() {
    let mut state = lock_state();
    let AppState {
        source: Some(source),
        dashboard: Some(dash),
    } = &mut *state
    else {
        println!("Error: No data opened. Please open the data directory first (option 1).\n");
        return;
    };
    println!("Available years: {}", join_years(dash.available_years()));
    let input = read_line("Years (comma-separated): ");
    let mut years = Vec::new();
    for part in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match part.parse::<i32>() {
            Ok(y) if dash.available_years().contains(&y) => years.push(y),
            _ => println!("Ignoring unknown year '{}'", part),
        }
    }
    dash.reload(&*source, &years);
    match dash.state() {
        LoadState::Failed(msg) => println!("Error: {}\n", msg),
        _ => println!(
            "Selected: {} ({} rows loaded)\n",
            join_years(dash.selected_years()),
            format_int(dash.rows().len())
        ),
    }
}

/// Option [3]: narrow to one court. An empty answer shows all courts.
fn handle_select_court() {
    let mut state = lock_state();
    let Some(dash) = state.dashboard.as_mut() else {
        println!("Error: No data opened. Please open the data directory first (option 1).\n");
        return;
    };
    let courts = MetricIndex::new(dash.rows()).courts();
    for (i, c) in courts.iter().enumerate() {
        println!("[{}] {}", i + 1, c);
    }
    let input = read_line("Court number (blank for all): ");
    let court = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| courts.get(i).cloned());
    dash.set_court(court);
    println!("Court: {}\n", dash.court().unwrap_or("All courts"));
}

fn run_interactive(args: &DataArgs) {
    loop {
        println!("Courts Dashboard");
        println!("[1] Open data directory");
        println!("[2] Select years");
        println!("[3] Select court");
        println!("[4] Show reports");
        println!("[5] Exit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_open(args),
            "2" => handle_select_years(),
            "3" => handle_select_court(),
            "4" => {
                println!();
                {
                    let state = lock_state();
                    match &state.dashboard {
                        Some(dash) => print_dashboard(dash),
                        None => println!(
                            "Error: No data opened. Please open the data directory first (option 1).\n"
                        ),
                    }
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
}
