//! CLI argument definitions for the cohort derivation pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ppmi",
    version,
    about = "PPMI cohort derivation - tidy analysis tables from raw study exports",
    long_about = "Derive analysis-ready tables from raw PPMI study exports.\n\n\
                  Behavioral composite scores, biospecimen assays, DaT-scan measures,\n\
                  and demographics are normalized into tidy tables keyed by\n\
                  participant and visit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow participant-level values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive behavioral composite scores into a wide tidy table.
    Behavior(BehaviorArgs),

    /// Load biospecimen assay results into a wide tidy table.
    Biospecimen(BiospecimenArgs),

    /// Load DaT-scan imaging measures into a wide tidy table.
    Datscan(DatscanArgs),

    /// Derive per-participant demographics.
    Demographics(DemographicsArgs),

    /// List the measures the catalog can derive.
    Measures(MeasuresArgs),
}

#[derive(Parser)]
pub struct DataArgs {
    /// Directory containing the raw study export (default: $PPMI_PATH,
    /// then the current directory).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output CSV path.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Derive only these measures (comma separated; default: all).
    #[arg(long = "measures", value_delimiter = ',', value_name = "NAMES")]
    pub measures: Vec<String>,
}

#[derive(Parser)]
pub struct BehaviorArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Also write the long-format audit table to this path.
    #[arg(long = "long-output", value_name = "PATH")]
    pub long_output: Option<PathBuf>,

    /// Collapse duplicate pivot cells with an arithmetic mean instead of
    /// failing.
    #[arg(long = "mean-tie-break")]
    pub mean_tie_break: bool,
}

#[derive(Parser)]
pub struct BiospecimenArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Keep every assay instead of the default CSF panel. Significantly
    /// slower and mostly missing for large parts of the cohort.
    #[arg(long = "all", conflicts_with = "measures")]
    pub all: bool,
}

#[derive(Parser)]
pub struct DatscanArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Parser)]
pub struct DemographicsArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Parser)]
pub struct MeasuresArgs {
    /// Also probe this export directory for available biospecimen assays
    /// and scan measures.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
