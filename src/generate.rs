// Offline generation of the per-year long-format files.
//
// Three wide source tables are flattened into one `<year>.csv` per year
// plus a `years.json` manifest. Missing, empty and `NA` cells are skipped.
use crate::error::{DashboardError, Result};
use crate::loader::{read_source_table, MANIFEST_FILE, YEAR_FILE_HEADER};
use crate::metrics::{COURT_METRIC_UNITS, GENDER_FEMALE, GENDER_MALE, SOURCE_OUTCOMES};
use crate::types::{Manifest, SourceRow, StatRow};
use crate::util::{is_missing, parse_year};
use chrono::{SecondsFormat, Utc};
use csv::{QuoteStyle, WriterBuilder};
use log::info;
use std::path::{Path, PathBuf};

pub const COURT_METRICS_FILE: &str = "court_metrics.csv";
pub const GENDER_FILE: &str = "gender_analysis.csv";
pub const CASE_OUTCOMES_FILE: &str = "case_outcomes.csv";

#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub court_metrics: Vec<SourceRow>,
    pub gender: Vec<SourceRow>,
    pub case_outcomes: Vec<SourceRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub years: Vec<i32>,
    /// `(path, row count)` per written year file.
    pub files: Vec<(PathBuf, usize)>,
    pub manifest: PathBuf,
}

impl SourceTables {
    pub fn read(dir: &Path) -> Result<Self> {
        Ok(Self {
            court_metrics: read_source_table(&dir.join(COURT_METRICS_FILE))?,
            gender: read_source_table(&dir.join(GENDER_FILE))?,
            case_outcomes: read_source_table(&dir.join(CASE_OUTCOMES_FILE))?,
        })
    }

    fn all_rows(&self) -> impl Iterator<Item = &SourceRow> {
        self.court_metrics
            .iter()
            .chain(self.gender.iter())
            .chain(self.case_outcomes.iter())
    }

    /// Distinct years across all three tables, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .all_rows()
            .filter_map(|r| parse_year(r.text("Year")))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Long-format rows for one year: court metrics, then gender, then
    /// case outcomes, each in source row order.
    pub fn rows_for_year(&self, year: i32) -> Vec<StatRow> {
        let y = year.to_string();
        let in_year = |r: &&SourceRow| r.text("Year") == y;
        let mut rows = Vec::new();

        for r in self.court_metrics.iter().filter(in_year) {
            for (column, unit) in COURT_METRIC_UNITS {
                let val = r.get(column);
                if is_missing(val) {
                    continue;
                }
                rows.push(StatRow::new(r.text("Court"), &y, column, val.unwrap_or(""), unit));
            }
        }

        for r in self.gender.iter().filter(in_year) {
            for (column, metric) in [("Male", GENDER_MALE), ("Female", GENDER_FEMALE)] {
                let val = r.get(column);
                if is_missing(val) {
                    continue;
                }
                rows.push(StatRow::new(r.text("Court"), &y, metric, val.unwrap_or(""), "%"));
            }
        }

        for r in self.case_outcomes.iter().filter(in_year) {
            let case_type = r.text("CaseType");
            for outcome in SOURCE_OUTCOMES {
                let val = r.get(outcome);
                if is_missing(val) {
                    continue;
                }
                let metric = format!("{}_{}", case_type, outcome);
                rows.push(StatRow::new(r.text("Court"), &y, &metric, val.unwrap_or(""), "%"));
            }
        }

        rows
    }
}

/// Render a year file: header, one line per row, trailing newline.
/// Cells are written unquoted, matching how year files are read back.
pub fn render_year_file(rows: &[StatRow]) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    wtr.write_record(YEAR_FILE_HEADER)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_manifest(years: &[i32], last_updated: Option<String>) -> Result<String> {
    let manifest = Manifest {
        years: years.to_vec(),
        last_updated,
    };
    Ok(serde_json::to_string(&manifest)?)
}

/// Current UTC time in the manifest's timestamp format.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Write every year file and the manifest into `out_dir`.
pub fn generate(
    tables: &SourceTables,
    out_dir: &Path,
    last_updated: Option<String>,
) -> Result<GenerateReport> {
    let years = tables.years();
    if years.is_empty() {
        return Err(DashboardError::NoData("source tables contain no years".into()));
    }
    std::fs::create_dir_all(out_dir)?;
    let mut files = Vec::new();
    for &year in &years {
        let rows = tables.rows_for_year(year);
        let path = out_dir.join(format!("{}.csv", year));
        std::fs::write(&path, render_year_file(&rows)?)?;
        info!("Wrote {} ({} rows)", path.display(), rows.len());
        files.push((path, rows.len()));
    }

    let manifest = out_dir.join(MANIFEST_FILE);
    std::fs::write(&manifest, render_manifest(&years, last_updated)?)?;
    info!(
        "Wrote {} ({})",
        manifest.display(),
        years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
    );

    Ok(GenerateReport {
        years,
        files,
        manifest,
    })
}
