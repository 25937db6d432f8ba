use clap::Parser;
use std::path::PathBuf;

use crate::sink::OutputMode;
use crate::ErrorStrategy;

#[derive(Parser, Debug)]
#[command(name = "ranstat")]
#[command(about = "Extract per-UE link quality metrics from 5G RAN scheduler logs into CSV")]
#[command(
    long_about = "Extract per-UE link quality metrics from 5G RAN scheduler logs into CSV\n\nReads scheduler telemetry from a file or standard input, reassembles the\nper-UE status lines into one record per reporting interval, and appends\neach record to a CSV file."
)]
#[command(version)]
pub struct Cli {
    /// Scheduler log file; reads standard input when omitted
    pub file: Option<PathBuf>,

    /// Output CSV path (split mode appends the UE identifier to this name)
    #[arg(
        short = 'o',
        long = "output",
        default_value = "ue_metrics.csv",
        help_heading = "Output Options"
    )]
    pub output: PathBuf,

    /// Write one output file per terminal identifier
    #[arg(long = "split", help_heading = "Output Options")]
    pub split: bool,

    /// How to handle a recognized line with an unparseable field
    #[arg(
        long = "on-error",
        value_enum,
        default_value = "print",
        help_heading = "Processing Options"
    )]
    pub on_error: ErrorStrategy,

    /// Print a processing summary to stderr at exit
    #[arg(short = 's', long = "stats", help_heading = "Display Options")]
    pub stats: bool,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.split {
            OutputMode::Split
        } else {
            OutputMode::Aggregate
        }
    }
}
