use thiserror::Error;

/// Errors raised while loading, generating or exporting dashboard data.
///
/// Parse anomalies inside a data file are not errors: missing cells read
/// as empty strings and unparseable numbers become `None`.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A per-year file could not be fetched. Fails the whole load.
    #[error("Failed to load {year}.csv: {message}")]
    Fetch { year: i32, message: String },

    #[error("Invalid manifest: {message}")]
    Manifest { message: String },

    #[error("No data: {0}")]
    NoData(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
