use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use ranstat::cli::Cli;
use ranstat::{run_pipeline, PipelineConfig};

fn open_input(cli: &Cli) -> Result<Box<dyn BufRead + Send>> {
    match &cli.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input file '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig {
        output: cli.output.clone(),
        mode: cli.output_mode(),
        on_error: cli.on_error,
    };

    let reader = open_input(&cli)?;
    let summary = run_pipeline(reader, &config)?;

    if cli.stats {
        eprintln!("{}", summary.format_stats());
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ranstat: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
