//! Command-line definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::ProgressModeSetting;
use crate::platform::logging::LogDestination;

/// Submit a CV and a job description for skill-gap analysis.
#[derive(Debug, Parser)]
#[command(name = "gap-analyzer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CV document to upload (PDF, DOC or DOCX).
    #[arg(long, value_name = "PATH")]
    pub cv: Option<PathBuf>,

    /// Job description text.
    #[arg(long, value_name = "TEXT", conflicts_with = "job_file")]
    pub job_description: Option<String>,

    /// Read the job description from a file, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    pub job_file: Option<PathBuf>,

    /// Analysis endpoint URL.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// RON configuration file (defaults to ./gap-analyzer.ron when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How long each progress stage stays visible.
    #[arg(long, value_name = "MS")]
    pub stage_delay_ms: Option<u64>,

    /// Play progress stages before the request or alongside it.
    #[arg(long, value_enum)]
    pub progress_mode: Option<ProgressModeSetting>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Hide the progress display.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    AnalysisFailed = 1,
    InvalidInput = 2,
    Error = 3,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
