use crate::util::{format_optional, parse_value};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One statistic in long format: a single (court, year, metric) fact.
///
/// All fields stay textual. `value` is parsed lazily by [`StatRow::value_num`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatRow {
    #[serde(rename = "Court")]
    pub court: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Unit")]
    pub unit: String,
}

impl StatRow {
    pub fn new(court: &str, year: &str, metric: &str, value: &str, unit: &str) -> Self {
        Self {
            court: court.to_string(),
            year: year.to_string(),
            metric: metric.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }

    /// `None` for empty, `NA` or unparseable values.
    pub fn value_num(&self) -> Option<f64> {
        parse_value(&self.value)
    }
}

/// A row annotated with its derived numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRow<'a> {
    pub row: &'a StatRow,
    pub value: Option<f64>,
}

/// `years.json`: the years that have a data file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(
        rename = "lastUpdated",
        alias = "last_updated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
}

/// Row of the `court_metrics.csv` source table, read by column name.
/// Kept generic because the metric columns are looked up one by one.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub cells: Vec<(String, String)>,
}

impl SourceRow {
    /// `None` when the column is not in the table.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == column)
            .map(|(_, v)| v.as_str())
    }

    /// Missing columns read as an empty string.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

/// Result of a year-over-year comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum YearOverYear {
    /// Fewer than two distinct years carry the metric.
    InsufficientData,
    Delta {
        previous_year: String,
        latest_year: String,
        previous: f64,
        latest: f64,
        net: f64,
        pct: f64,
    },
}

/// One (court, year) point of a wide pivot. `values` lines up with
/// [`WideSeries::metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidePoint {
    pub court: String,
    pub year: String,
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideSeries {
    pub metrics: Vec<String>,
    pub points: Vec<WidePoint>,
}

impl WideSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values of one metric across all points, in point order.
    pub fn column(&self, metric: &str) -> Option<Vec<f64>> {
        let idx = self.metrics.iter().position(|m| m == metric)?;
        Some(self.points.iter().map(|p| p.values[idx]).collect())
    }
}

/// One line per court, one value per year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub court: String,
    pub years: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct PendingEntry {
    #[serde(rename = "Court")]
    #[tabled(rename = "Court")]
    pub court: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "Pending")]
    #[tabled(rename = "Pending", display_with = "format_optional")]
    pub pending: Option<f64>,
    #[serde(rename = "PDR")]
    #[tabled(rename = "PDR", display_with = "format_optional")]
    pub pdr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct OutcomeEntry {
    #[serde(rename = "Court")]
    #[tabled(rename = "Court")]
    pub court: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value (%)", display_with = "format_optional")]
    pub value: Option<f64>,
}

/// A KPI card.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct Indicator {
    #[serde(rename = "Label")]
    #[tabled(rename = "Indicator")]
    pub label: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct YoyRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[tabled(rename = "Latest")]
    pub latest: String,
    #[tabled(rename = "Net")]
    pub net: String,
    #[tabled(rename = "Change %")]
    pub pct: String,
}

/// Contents of `summary.json`.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub years: Vec<String>,
    pub courts: Vec<String>,
    pub total_rows: usize,
    pub last_updated: Option<String>,
    pub indicators: Vec<Indicator>,
    pub year_over_year: Vec<YoyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YoyEntry {
    pub metric: String,
    #[serde(flatten)]
    pub delta: YearOverYear,
}
