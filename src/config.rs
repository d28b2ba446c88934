// Command-line and environment configuration.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "courts_dashboard",
    version,
    about = "Court performance statistics: generate yearly data and print chart tables"
)]
pub struct Cli {
    /// Defaults to the interactive menu.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Flatten the wide source tables into per-year files and a manifest
    Generate(GenerateArgs),
    /// Print indicators, year-over-year changes and chart tables
    Report(ReportArgs),
    /// Numbered menu: pick years and courts, then show reports
    Interactive(DataArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Directory holding `<year>.csv` files and `years.json`
    #[arg(long, env = "COURTS_DATA_DIR", default_value = "public/data")]
    pub data_dir: PathBuf,
}

impl Default for DataArgs {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("public/data"),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Directory holding court_metrics.csv, gender_analysis.csv, case_outcomes.csv
    #[arg(long, env = "COURTS_SOURCE_DIR", default_value = "data")]
    pub source_dir: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    /// Record the current UTC time as `lastUpdated` in the manifest
    #[arg(long)]
    pub stamp: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Comma-separated years; defaults to the three most recent
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Only include this court
    #[arg(long)]
    pub court: Option<String>,

    /// Write one CSV per chart plus summary.json here
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
