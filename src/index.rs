// Point lookups over a loaded row sequence.
//
// Duplicate (court, metric, year) keys resolve to the first row in
// sequence order. `rows_for_metric` still returns every row.
use crate::metrics::{classify, sort_courts, MetricCategory};
use crate::types::{MetricRow, StatRow};
use crate::util::sorted_years;
use std::collections::HashMap;

pub struct MetricIndex<'a> {
    rows: &'a [StatRow],
    by_key: HashMap<(&'a str, &'a str, &'a str), usize>,
    by_court_metric: HashMap<(&'a str, &'a str), usize>,
    by_metric: HashMap<&'a str, Vec<usize>>,
    categories: HashMap<&'a str, MetricCategory>,
    metric_order: Vec<&'a str>,
}

impl<'a> MetricIndex<'a> {
    pub fn new(rows: &'a [StatRow]) -> Self {
        let mut by_key = HashMap::new();
        let mut by_court_metric = HashMap::new();
        let mut by_metric: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut categories = HashMap::new();
        let mut metric_order = Vec::new();

        for (i, r) in rows.iter().enumerate() {
            let (court, metric, year) = (r.court.as_str(), r.metric.as_str(), r.year.as_str());
            by_key.entry((court, metric, year)).or_insert(i);
            by_court_metric.entry((court, metric)).or_insert(i);
            by_metric.entry(metric).or_default().push(i);
            categories.entry(metric).or_insert_with(|| {
                metric_order.push(metric);
                classify(metric)
            });
        }

        Self {
            rows,
            by_key,
            by_court_metric,
            by_metric,
            categories,
            metric_order,
        }
    }

    pub fn rows(&self) -> &'a [StatRow] {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First matching row for the key; `year: None` matches any year.
    pub fn find(&self, court: &str, metric: &str, year: Option<&str>) -> Option<&'a StatRow> {
        let i = match year {
            Some(y) => self.by_key.get(&(court, metric, y)),
            None => self.by_court_metric.get(&(court, metric)),
        }?;
        Some(&self.rows[*i])
    }

    /// Numeric value of the first matching row, `None` when there is no
    /// match or the value is empty, `NA` or unparseable.
    pub fn value_of(&self, court: &str, metric: &str, year: Option<&str>) -> Option<f64> {
        self.find(court, metric, year)?.value_num()
    }

    /// Every row of `metric`, in sequence order, with its parsed value.
    pub fn rows_for_metric(&self, metric: &str) -> Vec<MetricRow<'a>> {
        self.by_metric
            .get(metric)
            .map(|ids| {
                ids.iter()
                    .map(|&i| {
                        let row = &self.rows[i];
                        MetricRow {
                            row,
                            value: row.value_num(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn category(&self, metric: &str) -> MetricCategory {
        self.categories
            .get(metric)
            .cloned()
            .unwrap_or_else(|| classify(metric))
    }

    /// Metrics present in the data matching `pred`, first-seen order.
    pub fn metrics_where(&self, pred: impl Fn(&MetricCategory) -> bool) -> Vec<&'a str> {
        self.metric_order
            .iter()
            .copied()
            .filter(|m| self.categories.get(m).is_some_and(&pred))
            .collect()
    }

    /// Courts present in the data, canonical order.
    pub fn courts(&self) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        for r in self.rows {
            if !seen.contains(&r.court.as_str()) {
                seen.push(&r.court);
            }
        }
        sort_courts(&seen)
    }

    /// Courts that have at least one row for any of `metrics`.
    pub fn courts_with(&self, metrics: &[&str]) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        for r in self.rows {
            if metrics.contains(&r.metric.as_str()) && !seen.contains(&r.court.as_str()) {
                seen.push(&r.court);
            }
        }
        sort_courts(&seen)
    }

    /// Years present in the data, ascending.
    pub fn years(&self) -> Vec<String> {
        sorted_years(self.rows.iter().map(|r| r.year.as_str()))
    }
}
