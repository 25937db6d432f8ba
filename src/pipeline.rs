//! The three-stage assembly pipeline and its shutdown protocol.
//!
//! ingestion -> line queue -> assembler -> record queue -> persistence
//!
//! Each stage runs on its own thread and each queue has exactly one producer,
//! which is also the stage that closes it: ingestion closes the line queue at
//! end of input, the assembler closes the record queue after draining the
//! line queue. A stage terminates only on its upstream queue reporting
//! closed-and-empty, so nothing buffered is lost at shutdown.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::assembler::{Assembler, Outcome};
use crate::queue::Queue;
use crate::record::UeRecord;
use crate::sink::{OutputMode, SinkRouter};
use crate::stats::{PipelineStats, StatsSummary};
use crate::ErrorStrategy;

/// Pipeline parameters fixed at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output: PathBuf,
    pub mode: OutputMode,
    pub on_error: ErrorStrategy,
}

/// One input line, paired with its 1-based line number for diagnostics.
struct RawLine {
    number: usize,
    text: String,
}

/// Run the full pipeline over `reader` until the input is exhausted and
/// every completed record has been persisted. Startup failures (unusable
/// output path, pattern compilation) are returned before any thread is
/// spawned; after that, only an input read error or `--on-error abort` can
/// fail the run.
pub fn run_pipeline<R: BufRead + Send + 'static>(
    reader: R,
    config: &PipelineConfig,
) -> Result<StatsSummary> {
    let router = SinkRouter::new(config.mode, &config.output)?;
    let assembler = Assembler::new()?;

    let line_queue: Arc<Queue<RawLine>> = Arc::new(Queue::new());
    let record_queue: Arc<Queue<UeRecord>> = Arc::new(Queue::new());
    let stats = Arc::new(PipelineStats::new());

    let ingest_handle = {
        let line_queue = Arc::clone(&line_queue);
        let stats = Arc::clone(&stats);
        thread::spawn(move || ingest_stage(reader, &line_queue, &stats))
    };

    let assemble_handle = {
        let line_queue = Arc::clone(&line_queue);
        let record_queue = Arc::clone(&record_queue);
        let stats = Arc::clone(&stats);
        let on_error = config.on_error;
        thread::spawn(move || {
            assemble_stage(assembler, &line_queue, &record_queue, &stats, on_error)
        })
    };

    let persist_handle = {
        let record_queue = Arc::clone(&record_queue);
        let stats = Arc::clone(&stats);
        thread::spawn(move || persist_stage(router, &record_queue, &stats))
    };

    // Join every stage before propagating a failure; the queues are closed
    // by their producers on either path, so all three always terminate.
    let ingest_result = ingest_handle.join().unwrap();
    let assemble_result = assemble_handle.join().unwrap();
    persist_handle.join().unwrap();
    ingest_result?;
    assemble_result?;

    Ok(stats.summary())
}

/// Ingestion stage: push every non-empty line verbatim, close the line
/// queue at end of stream. Blank lines still advance the line counter so
/// diagnostics downstream match the input.
fn ingest_stage<R: BufRead>(
    reader: R,
    line_queue: &Queue<RawLine>,
    stats: &PipelineStats,
) -> Result<()> {
    let mut number = 0usize;
    let mut failure = None;

    for line in reader.lines() {
        match line {
            Ok(text) => {
                number += 1;
                stats.add_line_read();
                if text.is_empty() {
                    continue;
                }
                line_queue.push(RawLine { number, text });
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    // Close before surfacing a read error so the stages downstream still
    // drain everything queued so far.
    line_queue.close();
    match failure {
        None => Ok(()),
        Some(err) => Err(err).with_context(|| format!("failed to read input line {}", number + 1)),
    }
}

/// Assembly stage: drain the line queue, then close the record queue. The
/// queue's closed-and-empty signal is the sole termination condition.
fn assemble_stage(
    mut assembler: Assembler,
    line_queue: &Queue<RawLine>,
    record_queue: &Queue<UeRecord>,
    stats: &PipelineStats,
    on_error: ErrorStrategy,
) -> Result<()> {
    let mut failure = None;

    while let Some(line) = line_queue.blocking_pop() {
        match assembler.ingest(&line.text) {
            Ok(Outcome::Completed(record)) => {
                stats.add_record_completed();
                record_queue.push(record);
            }
            Ok(Outcome::Applied) => {}
            Ok(Outcome::Ignored) => stats.add_line_ignored(),
            Err(err) => {
                stats.add_parse_error();
                match on_error {
                    ErrorStrategy::Skip => {}
                    ErrorStrategy::Print => {
                        eprintln!("Parse error on line {}: {:#}: {}", line.number, err, line.text);
                    }
                    ErrorStrategy::Abort => {
                        failure =
                            Some(err.context(format!("parse error on line {}", line.number)));
                        break;
                    }
                }
            }
        }
    }

    record_queue.close();
    match failure {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Persistence stage: write completed records until the record queue
/// reports closed-and-empty, then flush the sinks. Sink failures are
/// contained inside the router and show up only in the drop counter.
fn persist_stage(mut router: SinkRouter, record_queue: &Queue<UeRecord>, stats: &PipelineStats) {
    while let Some(record) = record_queue.blocking_pop() {
        if router.write(&record) {
            stats.add_record_written();
        } else {
            stats.add_record_dropped();
        }
    }
    router.finish();
}
