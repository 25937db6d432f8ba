//! CSV sink routing for completed records.
//!
//! Exactly one thread (the persistence stage) owns a `SinkRouter`, so sinks
//! need no locking. A sink that fails to open or write is disabled and the
//! remaining sinks keep going; the pipeline itself never dies over one bad
//! output file.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::formatters::CsvFormatter;
use crate::record::UeRecord;

/// How completed records map to output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// All records into one shared file.
    Aggregate,
    /// One file per terminal identifier, created on first record.
    Split,
}

/// `None` marks a sink that failed and was disabled.
type Sink = Option<BufWriter<File>>;

enum Route {
    Aggregate { path: PathBuf, sink: Sink },
    Split { base: PathBuf, sinks: HashMap<String, Sink> },
}

/// Routes records to their sink, creating split-mode sinks lazily and
/// writing each sink's header row exactly once, at creation.
pub struct SinkRouter {
    formatter: CsvFormatter,
    route: Route,
}

/// Derive the split-mode file name: base name with `_<id>` inserted before
/// the extension (`ue_metrics.csv` -> `ue_metrics_928c.csv`).
fn split_path(base: &Path, rnti: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, rnti);
    if let Some(ext) = base.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    base.with_file_name(name)
}

fn open_sink(path: &Path, formatter: &CsvFormatter) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file '{}'", path.display()))?;
    let mut sink = BufWriter::new(file);
    writeln!(sink, "{}", formatter.format_header())
        .with_context(|| format!("failed to write header to '{}'", path.display()))?;
    Ok(sink)
}

impl SinkRouter {
    /// In aggregate mode the shared sink is opened here, so an unusable
    /// output path fails the pipeline at startup. Split-mode sinks are
    /// opened on first record for their identifier.
    pub fn new(mode: OutputMode, base_path: &Path) -> Result<Self> {
        let formatter = CsvFormatter::new();
        let route = match mode {
            OutputMode::Aggregate => Route::Aggregate {
                sink: Some(open_sink(base_path, &formatter)?),
                path: base_path.to_path_buf(),
            },
            OutputMode::Split => Route::Split {
                base: base_path.to_path_buf(),
                sinks: HashMap::new(),
            },
        };
        Ok(Self { formatter, route })
    }

    /// Append one record to its sink. Returns `false` when the record went
    /// to a disabled sink (or the sink could not be created); the failure
    /// has already been logged and does not affect other sinks.
    pub fn write(&mut self, record: &UeRecord) -> bool {
        let row = self.formatter.format_record(record);
        match &mut self.route {
            Route::Aggregate { path, sink } => write_row(sink, path, &row),
            Route::Split { base, sinks } => {
                let path = split_path(base, &record.rnti);
                let sink = sinks.entry(record.rnti.clone()).or_insert_with(|| {
                    match open_sink(&path, &self.formatter) {
                        Ok(sink) => Some(sink),
                        Err(err) => {
                            eprintln!("ranstat: {:#}; disabling sink", err);
                            None
                        }
                    }
                });
                write_row(sink, &path, &row)
            }
        }
    }

    /// Flush all live sinks at shutdown. Flush failures are logged and the
    /// sink disabled, consistent with the per-sink containment policy.
    pub fn finish(&mut self) {
        match &mut self.route {
            Route::Aggregate { path, sink } => flush_sink(sink, path),
            Route::Split { base, sinks } => {
                for (rnti, sink) in sinks.iter_mut() {
                    flush_sink(sink, &split_path(base, rnti));
                }
            }
        }
    }
}

fn write_row(sink: &mut Sink, path: &Path, row: &str) -> bool {
    let Some(writer) = sink.as_mut() else {
        return false;
    };
    match writeln!(writer, "{}", row) {
        Ok(()) => true,
        Err(err) => {
            eprintln!(
                "ranstat: write to '{}' failed: {}; disabling sink",
                path.display(),
                err
            );
            *sink = None;
            false
        }
    }
}

fn flush_sink(sink: &mut Sink, path: &Path) {
    if let Some(writer) = sink.as_mut() {
        if let Err(err) = writer.flush() {
            eprintln!("ranstat: flush of '{}' failed: {}", path.display(), err);
            *sink = None;
        }
    }
}
