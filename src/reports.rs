use crate::index::MetricIndex;
use crate::metrics::{
    self, outcome_rank, MetricCategory, ATTENDANCE_METRICS, GENDER_METRICS,
    PENDING_STATUS_METRICS, TIMELINESS_METRICS, WORKLOAD_METRICS,
};
use crate::types::{
    DashboardSummary, Indicator, LineSeries, OutcomeEntry, PendingEntry, WidePoint, WideSeries,
    YearOverYear, YoyEntry,
};
use crate::util::{average, format_int, format_number, sorted_years, sum};

/// Optional narrowing for sums and averages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'s> {
    pub year: Option<&'s str>,
    pub court: Option<&'s str>,
}

impl<'s> Scope<'s> {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(year: &'s str) -> Self {
        Self {
            year: Some(year),
            court: None,
        }
    }

    pub fn court(court: &'s str) -> Self {
        Self {
            year: None,
            court: Some(court),
        }
    }

    fn matches(&self, court: &str, year: &str) -> bool {
        self.year.map_or(true, |y| y == year) && self.court.map_or(true, |c| c == court)
    }
}

fn scoped_values(index: &MetricIndex, metric: &str, scope: Scope) -> Vec<Option<f64>> {
    index
        .rows_for_metric(metric)
        .into_iter()
        .filter(|r| scope.matches(&r.row.court, &r.row.year))
        .map(|r| r.value)
        .collect()
}

/// Sum of a metric; missing values count as zero.
pub fn sum_metric(index: &MetricIndex, metric: &str, scope: Scope) -> f64 {
    sum(scoped_values(index, metric, scope))
}

/// Mean of the reported values of a metric; 0 when none are reported.
pub fn average_metric(index: &MetricIndex, metric: &str, scope: Scope) -> f64 {
    average(scoped_values(index, metric, scope))
}

fn sum_metrics(index: &MetricIndex, metrics: &[&str]) -> f64 {
    metrics
        .iter()
        .map(|m| sum_metric(index, m, Scope::all()))
        .sum()
}

fn average_metrics(index: &MetricIndex, metrics: &[&str]) -> f64 {
    average(
        metrics
            .iter()
            .flat_map(|m| scoped_values(index, m, Scope::all())),
    )
}

/// Compare the per-year totals of the two most recent years carrying the
/// metric.
pub fn year_over_year(index: &MetricIndex, metric: &str) -> YearOverYear {
    let rows = index.rows_for_metric(metric);
    let years = sorted_years(rows.iter().map(|r| r.row.year.as_str()));
    let [.., previous_year, latest_year] = years.as_slice() else {
        return YearOverYear::InsufficientData;
    };
    let total = |year: &str| sum(rows.iter().filter(|r| r.row.year == year).map(|r| r.value));
    let previous = total(previous_year);
    let latest = total(latest_year);
    let net = latest - previous;
    let pct = if previous > 0.0 {
        100.0 * net / previous
    } else {
        0.0
    };
    YearOverYear::Delta {
        previous_year: previous_year.clone(),
        latest_year: latest_year.clone(),
        previous,
        latest,
        net,
        pct,
    }
}

/// Wide pivot: one point per (court, year) holding every metric of the set.
///
/// A point is kept only if at least one metric is reported for it; the
/// others default to 0. Values are passed through unchanged.
pub fn pivot(index: &MetricIndex, metrics: &[&str]) -> WideSeries {
    let years = index.years();
    let mut points = Vec::new();
    for court in index.courts_with(metrics) {
        for year in &years {
            let values: Vec<Option<f64>> = metrics
                .iter()
                .map(|m| index.value_of(&court, m, Some(year)))
                .collect();
            if values.iter().all(Option::is_none) {
                continue;
            }
            points.push(WidePoint {
                name: format!("{} {}", court, year),
                court: court.clone(),
                year: year.clone(),
                values: values.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
            });
        }
    }
    WideSeries {
        metrics: metrics.iter().map(|m| m.to_string()).collect(),
        points,
    }
}

pub fn filings_disposals(index: &MetricIndex) -> WideSeries {
    pivot(index, &WORKLOAD_METRICS)
}

pub fn timeliness(index: &MetricIndex) -> WideSeries {
    pivot(index, &TIMELINESS_METRICS)
}

pub fn attendance(index: &MetricIndex) -> WideSeries {
    pivot(index, &ATTENDANCE_METRICS)
}

/// Male/Female shares as reported; they are not rescaled to 100.
pub fn gender(index: &MetricIndex) -> WideSeries {
    pivot(index, &GENDER_METRICS)
}

/// Listed-status shares of pending cases, as reported.
pub fn pending_status(index: &MetricIndex) -> WideSeries {
    pivot(index, &PENDING_STATUS_METRICS)
}

pub fn pending_age(index: &MetricIndex) -> WideSeries {
    pivot(index, &[metrics::PENDING_AGE])
}

pub fn charge_orders(index: &MetricIndex) -> WideSeries {
    pivot(index, &[metrics::CHARGE_ORDERS])
}

/// Outcome metrics present in the data, canonical outcome order first.
pub fn outcome_metrics<'a>(index: &MetricIndex<'a>) -> Vec<&'a str> {
    let mut found = index.metrics_where(MetricCategory::is_outcome);
    // Stable sort keeps first-seen order among non-canonical metrics.
    found.sort_by_key(|m| outcome_rank(m));
    found
}

pub fn case_outcomes(index: &MetricIndex) -> WideSeries {
    pivot(index, &outcome_metrics(index))
}

/// One line per court with the metric over the selected years, ascending.
/// A year the court did not report plots as 0.
pub fn line_series(index: &MetricIndex, metric: &str, selected: &[i32]) -> Vec<LineSeries> {
    let mut years = selected.to_vec();
    years.sort_unstable();
    years.dedup();
    let years: Vec<String> = years.iter().map(i32::to_string).collect();
    index
        .courts_with(&[metric])
        .into_iter()
        .map(|court| LineSeries {
            values: years
                .iter()
                .map(|y| index.value_of(&court, metric, Some(y)).unwrap_or(0.0))
                .collect(),
            years: years.clone(),
            court,
        })
        .collect()
}

/// Every `Pending` row with the PDR of the same court and year.
pub fn pending_table(index: &MetricIndex) -> Vec<PendingEntry> {
    index
        .rows_for_metric(metrics::PENDING)
        .into_iter()
        .map(|r| PendingEntry {
            court: r.row.court.clone(),
            year: r.row.year.clone(),
            pending: r.value,
            pdr: index.value_of(&r.row.court, metrics::PDR, Some(&r.row.year)),
        })
        .collect()
}

/// Every outcome row, grouped by outcome metric.
pub fn outcome_table(index: &MetricIndex) -> Vec<OutcomeEntry> {
    outcome_metrics(index)
        .into_iter()
        .flat_map(|m| index.rows_for_metric(m))
        .map(|r| OutcomeEntry {
            court: r.row.court.clone(),
            year: r.row.year.clone(),
            metric: r.row.metric.clone(),
            value: r.value,
        })
        .collect()
}

/// Dashboard pages that carry a row of indicator cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Pending,
    Workload,
    Performance,
    Outcomes,
    Other,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Overview,
        Page::Pending,
        Page::Workload,
        Page::Performance,
        Page::Outcomes,
        Page::Other,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Pending => "Pending Cases",
            Page::Workload => "Workload",
            Page::Performance => "Performance",
            Page::Outcomes => "Outcomes",
            Page::Other => "Other Metrics",
        }
    }
}

fn card(label: &str, value: String) -> Indicator {
    Indicator {
        label: label.to_string(),
        value,
    }
}

fn count(v: f64) -> String {
    format_number(v, 0)
}

fn pct(v: f64) -> String {
    format!("{}%", format_number(v, 1))
}

const COURT_OF_APPEAL: &str = metrics::COURT_ORDER[0];

/// KPI cards for a page.
pub fn page_indicators(index: &MetricIndex, page: Page) -> Vec<Indicator> {
    use crate::metrics::*;
    let all = Scope::all();
    match page {
        Page::Overview => vec![
            card("Total Filings", count(sum_metric(index, FILINGS, all))),
            card("Total Disposals", count(sum_metric(index, DISPOSALS, all))),
            card("Avg Clearance Rate", pct(average_metric(index, CLEARANCE_RATE, all))),
            card("Pending Cases", count(sum_metric(index, PENDING, all))),
        ],
        Page::Pending => vec![
            card("Pending Cases", count(sum_metric(index, PENDING, all))),
            card("Avg PDR", format_number(average_metric(index, PDR, all), 2)),
            card("Avg Pending Age (%)", pct(average_metric(index, PENDING_AGE, all))),
            card("Reserved Judgments", count(sum_metric(index, RESERVED_JUDGMENTS, all))),
        ],
        Page::Workload => {
            let workload = index.metrics_where(|c| {
                matches!(c, MetricCategory::Workload { .. }) && c.is_breakdown_of(FILINGS)
            });
            let location = index.metrics_where(|c| {
                matches!(c, MetricCategory::Location { .. }) && c.is_breakdown_of(FILINGS)
            });
            vec![
                card("Workload Filings", count(sum_metrics(index, &workload))),
                card("Total Filings", count(sum_metric(index, FILINGS, all))),
                card("Location Filings", count(sum_metrics(index, &location))),
                card("DV Filings", count(sum_metric(index, DV_FILINGS, all))),
            ]
        }
        Page::Performance => vec![
            card(
                "Avg Timeliness (Criminal) days",
                format_number(average_metric(index, TIMELINESS_CRIMINAL, all), 0),
            ),
            card(
                "Avg Timeliness (Civil) days",
                format_number(average_metric(index, TIMELINESS_CIVIL, all), 0),
            ),
            card("Avg Attendance (%)", pct(average_metrics(index, &ATTENDANCE_METRICS))),
            card("Avg Productivity", format_number(average_metric(index, PRODUCTIVITY, all), 0)),
        ],
        Page::Outcomes => {
            let outcomes = outcome_metrics(index);
            let rows: usize = outcomes.iter().map(|m| index.rows_for_metric(m).len()).sum();
            let allowed = metrics_with_outcome(index, "Allowed");
            vec![
                card("Outcome Records", format_int(rows)),
                card(
                    "CoA Filings",
                    count(sum_metric(index, FILINGS, Scope::court(COURT_OF_APPEAL))),
                ),
                card("Avg Dismissed %", pct(average_metrics(index, &metrics_with_outcome(index, "Dismissed")))),
                card(
                    "Avg Allowed %",
                    if allowed.iter().any(|m| !index.rows_for_metric(m).is_empty()) {
                        pct(average_metrics(index, &allowed))
                    } else {
                        "N/A".to_string()
                    },
                ),
            ]
        }
        Page::Other => vec![
            card("Charge Orders", count(sum_metric(index, CHARGE_ORDERS, all))),
            card("Avg Male (%)", pct(average_metric(index, GENDER_MALE, all))),
            card("Avg Female (%)", pct(average_metric(index, GENDER_FEMALE, all))),
            card("DV Filings", count(sum_metric(index, DV_FILINGS, all))),
        ],
    }
}

fn metrics_with_outcome<'a>(index: &MetricIndex<'a>, name: &str) -> Vec<&'a str> {
    index.metrics_where(|c| matches!(c, MetricCategory::Outcome { outcome, .. } if outcome == name))
}

/// Metrics reported with a year-over-year change.
pub const YOY_METRICS: [&str; 4] = [
    metrics::FILINGS,
    metrics::DISPOSALS,
    metrics::PENDING,
    metrics::RESERVED_JUDGMENTS,
];

pub fn generate_summary(index: &MetricIndex, last_updated: Option<String>) -> DashboardSummary {
    DashboardSummary {
        years: index.years(),
        courts: index.courts(),
        total_rows: index.rows().len(),
        last_updated,
        indicators: Page::ALL
            .iter()
            .flat_map(|p| page_indicators(index, *p))
            .collect(),
        year_over_year: YOY_METRICS
            .iter()
            .map(|m| YoyEntry {
                metric: m.to_string(),
                delta: year_over_year(index, m),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatRow;
    use pretty_assertions::assert_eq;

    fn scenario() -> Vec<StatRow> {
        vec![
            StatRow::new("Supreme Court", "2023", "Filings", "500", ""),
            StatRow::new("Supreme Court", "2023", "Disposals", "480", ""),
            StatRow::new("Supreme Court", "2022", "Filings", "450", ""),
        ]
    }

    #[test]
    fn supreme_court_scenario() {
        let rows = scenario();
        let idx = MetricIndex::new(&rows);
        assert_eq!(idx.value_of("Supreme Court", "Filings", Some("2023")), Some(500.0));
        assert_eq!(sum_metric(&idx, "Filings", Scope::all()), 950.0);
        assert_eq!(sum_metric(&idx, "Filings", Scope::year("2022")), 450.0);

        let YearOverYear::Delta { net, pct, previous_year, latest_year, .. } =
            year_over_year(&idx, "Filings")
        else {
            panic!("expected a delta");
        };
        assert_eq!(net, 50.0);
        assert!((pct - 11.111).abs() < 0.001);
        assert_eq!((previous_year.as_str(), latest_year.as_str()), ("2022", "2023"));
    }

    #[test]
    fn yoy_needs_two_years() {
        let rows = scenario();
        let idx = MetricIndex::new(&rows);
        assert_eq!(year_over_year(&idx, "Disposals"), YearOverYear::InsufficientData);
        assert_eq!(year_over_year(&idx, "Pending"), YearOverYear::InsufficientData);
    }

    #[test]
    fn yoy_uses_two_most_recent_years_and_zero_base() {
        let rows = vec![
            StatRow::new("Island Court", "2020", "Pending", "10", ""),
            StatRow::new("Island Court", "2022", "Pending", "0", ""),
            StatRow::new("Island Court", "2021", "Pending", "40", ""),
            StatRow::new("Island Court", "2023", "Pending", "25", ""),
            StatRow::new("Supreme Court", "2022", "Pending", "NA", ""),
        ];
        let idx = MetricIndex::new(&rows);
        assert_eq!(
            year_over_year(&idx, "Pending"),
            YearOverYear::Delta {
                previous_year: "2022".into(),
                latest_year: "2023".into(),
                previous: 0.0,
                latest: 25.0,
                net: 25.0,
                pct: 0.0,
            }
        );
    }

    #[test]
    fn averages_skip_missing_values() {
        let rows = vec![
            StatRow::new("Supreme Court", "2023", "ClearanceRate", "90", "%"),
            StatRow::new("Island Court", "2023", "ClearanceRate", "NA", "%"),
            StatRow::new("Magistrates Court", "2023", "ClearanceRate", "110", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        assert_eq!(average_metric(&idx, "ClearanceRate", Scope::all()), 100.0);
        assert_eq!(average_metric(&idx, "ClearanceRate", Scope::all()), 100.0);
        assert_eq!(average_metric(&idx, "ClearanceRate", Scope::court("Island Court")), 0.0);
        assert_eq!(average_metric(&idx, "PDR", Scope::all()), 0.0);
    }

    #[test]
    fn attendance_point_dropped_only_when_all_missing() {
        let rows = vec![
            StatRow::new("Island Court", "2023", "AttendanceCivil", "NA", "%"),
            StatRow::new("Supreme Court", "2023", "AttendanceCivil", "NA", "%"),
            StatRow::new("Supreme Court", "2023", "AttendanceCriminal", "85", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        let series = attendance(&idx);
        assert_eq!(
            series.points,
            vec![WidePoint {
                court: "Supreme Court".into(),
                year: "2023".into(),
                name: "Supreme Court 2023".into(),
                values: vec![85.0, 0.0, 0.0],
            }]
        );
    }

    #[test]
    fn gender_shares_pass_through_unscaled() {
        let rows = vec![
            StatRow::new("Magistrates Court", "2023", "Gender_Male", "40", "%"),
            StatRow::new("Magistrates Court", "2023", "Gender_Female", "50", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        let series = gender(&idx);
        assert_eq!(series.column("Gender_Male"), Some(vec![40.0]));
        assert_eq!(series.column("Gender_Female"), Some(vec![50.0]));
    }

    #[test]
    fn pivot_orders_courts_then_years() {
        let rows = vec![
            StatRow::new("Youth Court", "2023", "Filings", "5", ""),
            StatRow::new("Island Court", "2023", "Filings", "7", ""),
            StatRow::new("Island Court", "2021", "Disposals", "6", ""),
            StatRow::new("Court of Appeal", "2022", "Filings", "3", ""),
        ];
        let idx = MetricIndex::new(&rows);
        let names: Vec<String> = filings_disposals(&idx).points.into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "Court of Appeal 2022",
                "Island Court 2021",
                "Island Court 2023",
                "Youth Court 2023",
            ]
        );
    }

    #[test]
    fn empty_selection_derives_neutral_values() {
        let rows: Vec<StatRow> = Vec::new();
        let idx = MetricIndex::new(&rows);
        assert_eq!(sum_metric(&idx, "Filings", Scope::all()), 0.0);
        assert_eq!(average_metric(&idx, "ClearanceRate", Scope::all()), 0.0);
        assert!(attendance(&idx).is_empty());
        assert!(case_outcomes(&idx).is_empty());
        assert!(line_series(&idx, "ClearanceRate", &[]).is_empty());
        assert_eq!(year_over_year(&idx, "Filings"), YearOverYear::InsufficientData);
    }

    #[test]
    fn line_series_fills_missing_years_with_zero() {
        let rows = vec![
            StatRow::new("Supreme Court", "2022", "ClearanceRate", "95", "%"),
            StatRow::new("Island Court", "2023", "ClearanceRate", "101.5", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        let series = line_series(&idx, "ClearanceRate", &[2023, 2022]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].court, "Supreme Court");
        assert_eq!(series[0].years, vec!["2022", "2023"]);
        assert_eq!(series[0].values, vec![95.0, 0.0]);
        assert_eq!(series[1].values, vec![0.0, 101.5]);
    }

    #[test]
    fn line_series_spans_selected_years_without_data() {
        let rows = vec![StatRow::new("Island Court", "2022", "Productivity", "1.4", "")];
        let idx = MetricIndex::new(&rows);
        let series = line_series(&idx, "Productivity", &[2021, 2022, 2023]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].years, vec!["2021", "2022", "2023"]);
        assert_eq!(series[0].values, vec![0.0, 1.4, 0.0]);
    }

    #[test]
    fn pending_status_shares_pass_through_unscaled() {
        let rows = vec![
            StatRow::new("Supreme Court", "2023", "Pending_WithFutureListing", "50", "%"),
            StatRow::new("Supreme Court", "2023", "Pending_UnderCaseMgmt", "20", "%"),
            StatRow::new("Supreme Court", "2023", "Pending_NoFutureDate", "10", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        let series = pending_status(&idx);
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].name, "Supreme Court 2023");
        assert_eq!(series.points[0].values, vec![50.0, 20.0, 10.0]);
    }

    #[test]
    fn pending_table_joins_pdr() {
        let rows = vec![
            StatRow::new("Supreme Court", "2023", "Pending", "300", ""),
            StatRow::new("Supreme Court", "2023", "PDR", "1.2", ""),
            StatRow::new("Island Court", "2023", "Pending", "NA", ""),
        ];
        let idx = MetricIndex::new(&rows);
        let table = pending_table(&idx);
        assert_eq!(table[0].pdr, Some(1.2));
        assert_eq!(table[1].pending, None);
        assert_eq!(table[1].pdr, None);
    }

    #[test]
    fn outcomes_follow_canonical_order() {
        let rows = vec![
            StatRow::new("Court of Appeal", "2023", "Civil_Allowed", "35", "%"),
            StatRow::new("Supreme Court", "2023", "Civil_Guilty", "20", "%"),
            StatRow::new("Supreme Court", "2023", "Criminal_Guilty", "60", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        assert_eq!(
            outcome_metrics(&idx),
            vec!["Criminal_Guilty", "Civil_Guilty", "Civil_Allowed"]
        );
        let series = case_outcomes(&idx);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].values, vec![0.0, 0.0, 35.0]);
        assert_eq!(outcome_table(&idx).len(), 3);
    }

    #[test]
    fn indicators_use_tagged_metrics() {
        let rows = vec![
            StatRow::new("Supreme Court", "2023", "Workload_Civil_Filings", "100", ""),
            StatRow::new("Supreme Court", "2023", "Workload_Civil_Disposals", "70", ""),
            StatRow::new("Magistrates Court", "2023", "Location_Luganville_Filings", "40", ""),
            StatRow::new("Supreme Court", "2023", "Filings", "1200", ""),
            StatRow::new("Magistrates Court", "2023", "DV_Filings", "NA", ""),
        ];
        let idx = MetricIndex::new(&rows);
        let cards = page_indicators(&idx, Page::Workload);
        let values: Vec<&str> = cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["100", "1,200", "40", "0"]);
    }

    #[test]
    fn outcome_indicators_report_missing_allowed() {
        let rows = vec![
            StatRow::new("Court of Appeal", "2023", "Filings", "12", ""),
            StatRow::new("Court of Appeal", "2023", "Criminal_Dismissed", "30", "%"),
            StatRow::new("Court of Appeal", "2023", "Civil_Dismissed", "50", "%"),
        ];
        let idx = MetricIndex::new(&rows);
        let cards = page_indicators(&idx, Page::Outcomes);
        let values: Vec<&str> = cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["2", "12", "40.0%", "N/A"]);
    }
}
