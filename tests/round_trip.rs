use courts_dashboard::generate::{generate, SourceTables};
use courts_dashboard::loader::{load_years, DirSource};
use courts_dashboard::reports::{self, Scope};
use courts_dashboard::types::YearOverYear;
use courts_dashboard::{Dashboard, LoadState, MetricIndex, StatRow};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COURT_METRICS: &str = indoc! {"
    Court,Year,Filings,Disposals,ClearanceRate,Pending,PDR,AttendanceCriminal,AttendanceCivil
    Supreme Court,2022,450,430,95.6,300,0.7,,
    Supreme Court,2023,500,480,96,320,0.67,88,NA
    Island Court,2023,NA,75,,40,,,
    Court of Appeal,2024,20,18,90,5,0.28,,
"};

const GENDER: &str = indoc! {"
    Court,Year,Male,Female
    Magistrates Court,2023,40,50
"};

const CASE_OUTCOMES: &str = indoc! {"
    Court,Year,CaseType,Guilty,NotGuilty,Withdrawn,Committed,Dismissed
    Magistrates Court,2023,Criminal,55,10,na,,35
"};

fn write_sources(dir: &Path) {
    fs::write(dir.join("court_metrics.csv"), COURT_METRICS).unwrap();
    fs::write(dir.join("gender_analysis.csv"), GENDER).unwrap();
    fs::write(dir.join("case_outcomes.csv"), CASE_OUTCOMES).unwrap();
}

fn generated() -> (TempDir, TempDir) {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_sources(src.path());
    let tables = SourceTables::read(src.path()).unwrap();
    generate(&tables, out.path(), None).unwrap();
    (src, out)
}

#[test]
fn generated_files_parse_back_to_source_cells() {
    let (_src, out) = generated();
    let source = DirSource::new(out.path());

    let rows = load_years(&source, &[2023]).unwrap();
    assert_eq!(
        rows,
        vec![
            StatRow::new("Supreme Court", "2023", "Filings", "500", ""),
            StatRow::new("Supreme Court", "2023", "Disposals", "480", ""),
            StatRow::new("Supreme Court", "2023", "ClearanceRate", "96", "%"),
            StatRow::new("Supreme Court", "2023", "Pending", "320", ""),
            StatRow::new("Supreme Court", "2023", "PDR", "0.67", ""),
            StatRow::new("Supreme Court", "2023", "AttendanceCriminal", "88", "%"),
            StatRow::new("Island Court", "2023", "Disposals", "75", ""),
            StatRow::new("Island Court", "2023", "Pending", "40", ""),
            StatRow::new("Magistrates Court", "2023", "Gender_Male", "40", "%"),
            StatRow::new("Magistrates Court", "2023", "Gender_Female", "50", "%"),
            StatRow::new("Magistrates Court", "2023", "Criminal_Guilty", "55", "%"),
            StatRow::new("Magistrates Court", "2023", "Criminal_NotGuilty", "10", "%"),
            StatRow::new("Magistrates Court", "2023", "Criminal_Dismissed", "35", "%"),
        ]
    );
}

#[test]
fn manifest_lists_every_source_year() {
    let (_src, out) = generated();
    let text = fs::read_to_string(out.path().join("years.json")).unwrap();
    assert_eq!(text, r#"{"years":[2022,2023,2024]}"#);
    assert!(out.path().join("2022.csv").exists());
    assert!(out.path().join("2024.csv").exists());
}

#[test]
fn dashboard_opens_default_selection_and_derives() {
    let (_src, out) = generated();
    let source = DirSource::new(out.path());
    let mut dash = Dashboard::open(&source).unwrap();
    assert_eq!(dash.selected_years(), &[2022, 2023, 2024]);
    assert_eq!(dash.state(), &LoadState::Ready);

    dash.reload(&source, &[2022, 2023]);
    let rows = dash.filtered_rows();
    let index = MetricIndex::new(&rows);
    assert_eq!(reports::sum_metric(&index, "Filings", Scope::all()), 950.0);
    assert_eq!(
        reports::year_over_year(&index, "Disposals"),
        YearOverYear::Delta {
            previous_year: "2022".into(),
            latest_year: "2023".into(),
            previous: 430.0,
            latest: 555.0,
            net: 125.0,
            pct: 100.0 * 125.0 / 430.0,
        }
    );

    let attendance = reports::attendance(&index);
    assert_eq!(attendance.points.len(), 1);
    assert_eq!(attendance.points[0].values, vec![88.0, 0.0, 0.0]);

    let gender = reports::gender(&index);
    assert_eq!(gender.points[0].values, vec![40.0, 50.0]);
}

#[test]
fn missing_year_file_fails_the_whole_load() {
    let (_src, out) = generated();
    fs::remove_file(out.path().join("2022.csv")).unwrap();
    let source = DirSource::new(out.path());
    let mut dash = Dashboard::open(&source).unwrap();
    assert!(matches!(dash.state(), LoadState::Failed(msg) if msg.contains("2022.csv")));
    assert!(dash.rows().is_empty());

    dash.reload(&source, &[2023]);
    assert_eq!(dash.state(), &LoadState::Ready);

    dash.reload(&source, &[]);
    assert_eq!(dash.state(), &LoadState::NoSelection);
    let rows = dash.filtered_rows();
    let index = MetricIndex::new(&rows);
    assert_eq!(reports::average_metric(&index, "ClearanceRate", Scope::all()), 0.0);
    assert!(reports::filings_disposals(&index).is_empty());
}
