use crate::error::{DashboardError, Result};
use crate::types::{Manifest, SourceRow, StatRow};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub const YEAR_FILE_HEADER: [&str; 5] = ["Court", "Year", "Metric", "Value", "Unit"];
pub const MANIFEST_FILE: &str = "years.json";

/// A header row plus data rows, every cell trimmed.
///
/// Rows shorter than the header are padded with empty strings; extra cells
/// are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn into_source_rows(self) -> Vec<SourceRow> {
        let headers = self.headers;
        self.rows
            .into_iter()
            .map(|cells| SourceRow {
                cells: headers.iter().cloned().zip(cells).collect(),
            })
            .collect()
    }
}

/// Shape delimited text into a [`Table`]. Never fails: blank lines are
/// skipped and malformed records are logged and dropped.
///
/// Quotes are plain characters; one line is always one record.
pub fn parse_table(text: &str) -> Table {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record: StringRecord = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping record {}: {}", line + 1, e);
                continue;
            }
        };
        // Blank line. `,,,,` is a row of missing cells and is kept.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        match &headers {
            None => headers = Some(record.iter().map(str::to_string).collect()),
            Some(h) => {
                let cells = (0..h.len())
                    .map(|i| record.get(i).unwrap_or("").to_string())
                    .collect();
                rows.push(cells);
            }
        }
    }
    Table {
        headers: headers.unwrap_or_default(),
        rows,
    }
}

/// Parse long-format text (`Court,Year,Metric,Value,Unit`) into rows.
/// Columns are found by name; a missing column reads as "".
pub fn parse_stat_rows(text: &str) -> Vec<StatRow> {
    let table = parse_table(text);
    let idx: Vec<Option<usize>> = YEAR_FILE_HEADER.iter().map(|c| table.column(c)).collect();
    let cell = |row: &[String], i: usize| -> String {
        idx[i].map(|c| row[c].clone()).unwrap_or_default()
    };
    table
        .rows
        .iter()
        .map(|row| {
            let row = row.as_slice();
            StatRow {
                court: cell(row, 0),
                year: cell(row, 1),
                metric: cell(row, 2),
                value: cell(row, 3),
                unit: cell(row, 4),
            }
        })
        .collect()
}

/// Like [`parse_stat_rows`], but rows without a year take the file's year.
pub fn parse_year_file(year: i32, text: &str) -> Vec<StatRow> {
    let mut rows = parse_stat_rows(text);
    for r in rows.iter_mut().filter(|r| r.year.is_empty()) {
        r.year = year.to_string();
    }
    rows
}

/// Parse `years.json`. Years come back sorted and de-duplicated.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let mut manifest: Manifest =
        serde_json::from_str(text).map_err(|e| DashboardError::Manifest {
            message: e.to_string(),
        })?;
    manifest.years.sort_unstable();
    manifest.years.dedup();
    Ok(manifest)
}

/// Where per-year files and the manifest come from.
pub trait DataSource: Sync {
    fn fetch_year(&self, year: i32) -> Result<String>;
    fn fetch_manifest(&self) -> Result<String>;
}

/// Static files on disk: `<dir>/<year>.csv` and `<dir>/years.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn year_path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{}.csv", year))
    }
}

impl DataSource for DirSource {
    fn fetch_year(&self, year: i32) -> Result<String> {
        std::fs::read_to_string(self.year_path(year)).map_err(|e| DashboardError::Fetch {
            year,
            message: e.to_string(),
        })
    }

    fn fetch_manifest(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.dir.join(MANIFEST_FILE))?)
    }
}

pub fn load_manifest(source: &dyn DataSource) -> Result<Manifest> {
    let manifest = parse_manifest(&source.fetch_manifest()?)?;
    info!("manifest lists {} years", manifest.years.len());
    Ok(manifest)
}

/// Fetch every requested year in parallel and concatenate the rows in
/// ascending year order. One failed fetch fails the whole load.
pub fn load_years(source: &dyn DataSource, years: &[i32]) -> Result<Vec<StatRow>> {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();

    let per_year: Vec<Vec<StatRow>> = years
        .par_iter()
        .map(|&year| {
            let text = source.fetch_year(year)?;
            let rows = parse_year_file(year, &text);
            debug!("{}.csv: {} rows", year, rows.len());
            Ok(rows)
        })
        .collect::<Result<_>>()?;

    let rows: Vec<StatRow> = per_year.into_iter().flatten().collect();
    info!(
        "loaded {} rows for {}",
        rows.len(),
        years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
    );
    Ok(rows)
}

/// Read one wide source table from disk.
pub fn read_source_table(path: &Path) -> Result<Vec<SourceRow>> {
    let text = std::fs::read_to_string(path)?;
    let table = parse_table(&text);
    debug!("{}: {} rows", path.display(), table.rows.len());
    Ok(table.into_source_rows())
}
