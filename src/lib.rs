// Core library for the ranstat metric extraction tool

/// What to do when a recognized line carries a field that fails to parse.
/// Unrecognized lines are never an error; they are simply ignored.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorStrategy {
    /// Discard the line silently.
    Skip,
    /// Report the line and reason to stderr, then continue.
    #[default]
    Print,
    /// Fail the whole run on the first malformed line.
    Abort,
}

pub mod assembler;
pub mod cli;
pub mod formatters;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod sink;
pub mod stats;

pub use pipeline::{run_pipeline, PipelineConfig};
pub use record::{SyncState, UeRecord};
pub use sink::OutputMode;
pub use stats::StatsSummary;
