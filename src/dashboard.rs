// Top-level coordinator for the year selection and the loaded rows.
//
// Loads are requested and applied in two steps so that a result arriving
// after the selection changed again is dropped instead of overwriting
// newer state. Every selection change bumps `epoch`; a result is applied
// only when its request carries the current epoch.
use crate::error::Result;
use crate::loader::{load_manifest, load_years, DataSource};
use crate::types::{Manifest, StatRow};
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No years chosen; zero rows flow into derivation.
    NoSelection,
    Loading,
    Ready,
    /// The whole load failed; rows were cleared.
    Failed(String),
}

/// A pending load, tagged with the epoch it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub epoch: u64,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The selection changed while this load was in flight.
    Stale,
}

/// How many of the most recent years are selected by default.
pub const DEFAULT_SELECTION: usize = 3;

#[derive(Debug)]
pub struct Dashboard {
    available: Vec<i32>,
    last_updated: Option<String>,
    selected: Vec<i32>,
    court: Option<String>,
    rows: Vec<StatRow>,
    state: LoadState,
    epoch: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            available: Vec::new(),
            last_updated: None,
            selected: Vec::new(),
            court: None,
            rows: Vec::new(),
            state: LoadState::NoSelection,
            epoch: 0,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the available years. Returns the default selection: the last
    /// three years, or all of them when there are fewer.
    pub fn set_manifest(&mut self, manifest: Manifest) -> Vec<i32> {
        let mut years = manifest.years;
        years.sort_unstable();
        years.dedup();
        self.available = years;
        self.last_updated = manifest.last_updated;
        let skip = self.available.len().saturating_sub(DEFAULT_SELECTION);
        self.available[skip..].to_vec()
    }

    /// Change the selection and start a new epoch.
    ///
    /// An empty selection clears the rows right away and needs no load.
    pub fn select_years(&mut self, years: &[i32]) -> Option<LoadRequest> {
        let mut years = years.to_vec();
        years.sort_unstable();
        years.dedup();
        self.epoch += 1;
        self.selected = years.clone();
        if years.is_empty() {
            self.rows.clear();
            self.state = LoadState::NoSelection;
            return None;
        }
        self.state = LoadState::Loading;
        Some(LoadRequest {
            epoch: self.epoch,
            years,
        })
    }

    /// Apply the result of a load issued by `select_years`.
    ///
    /// On failure the rows are cleared and the message kept; no partial
    /// result is ever merged.
    pub fn finish_load(&mut self, request: &LoadRequest, result: Result<Vec<StatRow>>) -> LoadOutcome {
        if request.epoch != self.epoch {
            warn!(
                "discarding load for epoch {} (current epoch {})",
                request.epoch, self.epoch
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(rows) => {
                info!("selection {:?} ready with {} rows", request.years, rows.len());
                self.rows = rows;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                self.rows.clear();
                self.state = LoadState::Failed(e.to_string());
            }
        }
        LoadOutcome::Applied
    }

    /// Read the manifest, select the default years and load them.
    pub fn open(source: &dyn DataSource) -> Result<Self> {
        let mut dash = Self::new();
        let defaults = dash.set_manifest(load_manifest(source)?);
        dash.reload(source, &defaults);
        Ok(dash)
    }

    /// Select years and load them synchronously.
    pub fn reload(&mut self, source: &dyn DataSource, years: &[i32]) -> LoadOutcome {
        match self.select_years(years) {
            Some(request) => {
                let result = load_years(source, &request.years);
                self.finish_load(&request, result)
            }
            None => LoadOutcome::Applied,
        }
    }

    /// Narrow derivations to one court, or `None` for all courts.
    pub fn set_court(&mut self, court: Option<String>) {
        self.court = court;
    }

    pub fn court(&self) -> Option<&str> {
        self.court.as_deref()
    }

    pub fn available_years(&self) -> &[i32] {
        &self.available
    }

    pub fn selected_years(&self) -> &[i32] {
        &self.selected
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn rows(&self) -> &[StatRow] {
        &self.rows
    }

    /// Rows restricted to the selected court, if any.
    pub fn filtered_rows(&self) -> Vec<StatRow> {
        match &self.court {
            Some(c) => self.rows.iter().filter(|r| &r.court == c).cloned().collect(),
            None => self.rows.clone(),
        }
    }
}
