use crate::error::Result;
use crate::types::{LineSeries, WideSeries};
use crate::util::format_value;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Header for a wide series: `Court,Year,<metric>...`.
fn wide_header(series: &WideSeries) -> Vec<String> {
    ["Court", "Year"]
        .iter()
        .map(|s| s.to_string())
        .chain(series.metrics.iter().cloned())
        .collect()
}

/// Write a wide series as CSV, one line per point.
pub fn write_wide_csv(path: &Path, series: &WideSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(wide_header(series))?;
    for p in &series.points {
        let mut record = vec![p.court.clone(), p.year.clone()];
        record.extend(p.values.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn render_wide(series: &WideSeries) -> String {
    if series.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(wide_header(series));
    for p in &series.points {
        let mut record = vec![p.court.clone(), p.year.clone()];
        record.extend(p.values.iter().map(|v| format_value(*v)));
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// Line series as a table: one row per court, one column per year.
pub fn render_lines(series: &[LineSeries]) -> String {
    let Some(first) = series.first() else {
        return "(no rows)".to_string();
    };
    let mut builder = Builder::default();
    builder.push_record(std::iter::once("Court".to_string()).chain(first.years.iter().cloned()));
    for s in series {
        builder.push_record(
            std::iter::once(s.court.clone()).chain(s.values.iter().map(|v| format_value(*v))),
        );
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_section(title: &str, note: Option<&str>, body: &str) {
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PendingEntry, WidePoint};
    use tempfile::TempDir;

    fn series() -> WideSeries {
        WideSeries {
            metrics: vec!["Gender_Male".into(), "Gender_Female".into()],
            points: vec![WidePoint {
                court: "Supreme Court".into(),
                year: "2023".into(),
                name: "Supreme Court 2023".into(),
                values: vec![40.0, 50.5],
            }],
        }
    }

    #[test]
    fn wide_csv_has_one_column_per_metric() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gender.csv");
        write_wide_csv(&path, &series()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Court,Year,Gender_Male,Gender_Female\nSupreme Court,2023,40,50.5\n"
        );
    }

    #[test]
    fn rendered_tables_contain_values() {
        let out = render_wide(&series());
        assert!(out.contains("Gender_Female"));
        assert!(out.contains("50.50"));

        let empty = WideSeries {
            metrics: vec![],
            points: vec![],
        };
        assert_eq!(render_wide(&empty), "(no rows)");
        assert_eq!(render_lines(&[]), "(no rows)");
    }

    #[test]
    fn optional_values_render_as_na() {
        let rows = vec![PendingEntry {
            court: "Island Court".into(),
            year: "2022".into(),
            pending: None,
            pdr: Some(1.5),
        }];
        let out = render_rows(&rows, 5);
        assert!(out.contains("N/A"));
        assert!(out.contains("1.50"));
    }
}
