// Metric vocabulary and court ordering.
//
// Metric names arrive as plain strings. Every name is tagged once with a
// `MetricCategory` when an index is built, so grouping code matches on the
// enum instead of probing the name with prefix/suffix checks.

pub const FILINGS: &str = "Filings";
pub const DISPOSALS: &str = "Disposals";
pub const CLEARANCE_RATE: &str = "ClearanceRate";
pub const PENDING: &str = "Pending";
pub const PDR: &str = "PDR";
pub const PENDING_AGE: &str = "PendingAge";
pub const TIMELINESS_CRIMINAL: &str = "TimelinessCriminal";
pub const TIMELINESS_CIVIL: &str = "TimelinessCivil";
pub const ATTENDANCE_CRIMINAL: &str = "AttendanceCriminal";
pub const ATTENDANCE_CIVIL: &str = "AttendanceCivil";
pub const ATTENDANCE_ENFORCEMENT: &str = "AttendanceEnforcement";
pub const PRODUCTIVITY: &str = "Productivity";
pub const RESERVED_JUDGMENTS: &str = "ReservedJudgments";
pub const GENDER_MALE: &str = "Gender_Male";
pub const GENDER_FEMALE: &str = "Gender_Female";
pub const PENDING_WITH_FUTURE_LISTING: &str = "Pending_WithFutureListing";
pub const PENDING_UNDER_CASE_MGMT: &str = "Pending_UnderCaseMgmt";
pub const PENDING_NO_FUTURE_DATE: &str = "Pending_NoFutureDate";
pub const CHARGE_ORDERS: &str = "ChargeOrders";
pub const DV_FILINGS: &str = "DV_Filings";

/// Court-metric columns of the source table and the unit attached to each.
/// Order is the order rows are emitted in a generated year file.
pub const COURT_METRIC_UNITS: [(&str, &str); 13] = [
    (FILINGS, ""),
    (DISPOSALS, ""),
    (CLEARANCE_RATE, "%"),
    (PENDING, ""),
    (PDR, ""),
    (PENDING_AGE, "days"),
    (TIMELINESS_CRIMINAL, "days"),
    (TIMELINESS_CIVIL, "days"),
    (ATTENDANCE_CRIMINAL, "%"),
    (ATTENDANCE_CIVIL, "%"),
    (ATTENDANCE_ENFORCEMENT, "%"),
    (PRODUCTIVITY, ""),
    (RESERVED_JUDGMENTS, ""),
];

/// Outcome columns read from the case outcomes table.
pub const SOURCE_OUTCOMES: [&str; 5] = ["Guilty", "NotGuilty", "Withdrawn", "Committed", "Dismissed"];

/// Every outcome suffix the dashboard recognises. `Allowed` only shows up
/// in appeal data.
pub const OUTCOMES: [&str; 6] = [
    "Guilty",
    "NotGuilty",
    "Withdrawn",
    "Committed",
    "Dismissed",
    "Allowed",
];

/// Display order for outcome series.
pub const OUTCOME_METRICS: [&str; 14] = [
    "Criminal_Guilty",
    "Criminal_NotGuilty",
    "Criminal_Withdrawn",
    "Criminal_Dismissed",
    "Civil_Guilty",
    "Civil_NotGuilty",
    "Civil_Withdrawn",
    "Civil_Committed",
    "Civil_Dismissed",
    "PI_Guilty",
    "PI_NotGuilty",
    "PI_Withdrawn",
    "PI_Committed",
    "PI_Dismissed",
];

pub const ATTENDANCE_METRICS: [&str; 3] = [ATTENDANCE_CRIMINAL, ATTENDANCE_CIVIL, ATTENDANCE_ENFORCEMENT];
pub const TIMELINESS_METRICS: [&str; 2] = [TIMELINESS_CRIMINAL, TIMELINESS_CIVIL];
pub const GENDER_METRICS: [&str; 2] = [GENDER_MALE, GENDER_FEMALE];
pub const WORKLOAD_METRICS: [&str; 2] = [FILINGS, DISPOSALS];
pub const PENDING_STATUS_METRICS: [&str; 3] = [
    PENDING_WITH_FUTURE_LISTING,
    PENDING_UNDER_CASE_MGMT,
    PENDING_NO_FUTURE_DATE,
];

/// Canonical court order for series and categories.
pub const COURT_ORDER: [&str; 4] = [
    "Court of Appeal",
    "Supreme Court",
    "Magistrates Court",
    "Island Court",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricCategory {
    /// One of the fixed court-metric columns (filings, clearance, ...).
    Court,
    Attendance,
    Timeliness,
    Gender,
    PendingStatus,
    /// `<CaseType>_<Outcome>`.
    Outcome { case_type: String, outcome: String },
    /// `Workload_<Kind>_<Measure>`, e.g. `Workload_Land_Filings`.
    Workload { measure: String },
    /// `Location_<Place>_<Measure>`.
    Location { measure: String },
    DomesticViolence,
    ChargeOrders,
    Other,
}

impl MetricCategory {
    pub fn is_outcome(&self) -> bool {
        matches!(self, MetricCategory::Outcome { .. })
    }

    /// Workload or location breakdown of the given measure.
    pub fn is_breakdown_of(&self, of: &str) -> bool {
        match self {
            MetricCategory::Workload { measure } | MetricCategory::Location { measure } => {
                measure == of
            }
            _ => false,
        }
    }
}

/// Tag a metric name. Exact names are checked first; compound names are
/// split once on their first `_`.
pub fn classify(metric: &str) -> MetricCategory {
    match metric {
        ATTENDANCE_CRIMINAL | ATTENDANCE_CIVIL | ATTENDANCE_ENFORCEMENT => {
            return MetricCategory::Attendance
        }
        TIMELINESS_CRIMINAL | TIMELINESS_CIVIL => return MetricCategory::Timeliness,
        GENDER_MALE | GENDER_FEMALE => return MetricCategory::Gender,
        PENDING_WITH_FUTURE_LISTING | PENDING_UNDER_CASE_MGMT | PENDING_NO_FUTURE_DATE => {
            return MetricCategory::PendingStatus
        }
        DV_FILINGS => return MetricCategory::DomesticViolence,
        CHARGE_ORDERS => return MetricCategory::ChargeOrders,
        _ => {}
    }
    if COURT_METRIC_UNITS.iter().any(|(m, _)| *m == metric) {
        return MetricCategory::Court;
    }
    let Some((head, tail)) = metric.split_once('_') else {
        return MetricCategory::Other;
    };
    let measure = || tail.rsplit('_').next().unwrap_or(tail).to_string();
    match head {
        "Workload" => MetricCategory::Workload { measure: measure() },
        "Location" => MetricCategory::Location { measure: measure() },
        _ if !head.is_empty() && OUTCOMES.contains(&tail) => MetricCategory::Outcome {
            case_type: head.to_string(),
            outcome: tail.to_string(),
        },
        _ => MetricCategory::Other,
    }
}

/// Fixed unit for a known court-metric column.
pub fn court_metric_unit(column: &str) -> Option<&'static str> {
    COURT_METRIC_UNITS
        .iter()
        .find(|(m, _)| *m == column)
        .map(|(_, unit)| *unit)
}

/// Order courts canonically, then any other court in first-seen order.
pub fn sort_courts<S: AsRef<str>>(courts: &[S]) -> Vec<String> {
    let mut ordered: Vec<String> = COURT_ORDER
        .iter()
        .filter(|c| courts.iter().any(|x| x.as_ref() == **c))
        .map(|c| c.to_string())
        .collect();
    for c in courts {
        if !ordered.iter().any(|o| o == c.as_ref()) {
            ordered.push(c.as_ref().to_string());
        }
    }
    ordered
}

/// Rank used to order outcome metrics: canonical ones first.
pub fn outcome_rank(metric: &str) -> usize {
    OUTCOME_METRICS
        .iter()
        .position(|m| *m == metric)
        .unwrap_or(OUTCOME_METRICS.len())
}
