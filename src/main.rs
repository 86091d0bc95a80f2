use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use gesturing::app::App;
use gesturing::clock::MonotonicClock;
use gesturing::config::Config;
use gesturing::keyboard::{DryRun, Keyboard};
use gesturing::logging::init_logging;

/// Turn hand landmark frames into key presses.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file, defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON lines produced by the hand tracker, defaults to stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log actions instead of pressing keys
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.config {
        Config::from_file(path).context(format!("Reading config {}", path.display()))?
    } else {
        Config::load_or_write_default(None)?
    };
    config.output.dry_run |= args.dry_run;

    let reader: Box<dyn BufRead> = if let Some(path) = &args.input {
        let file = File::open(path).context(format!("Opening input {}", path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        info!("Reading frames from stdin");
        Box::new(std::io::stdin().lock())
    };

    let clock = MonotonicClock::new();
    let summary = if config.output.dry_run {
        App::new(config, DryRun::new())?.run(reader, &clock)?
    } else {
        let keyboard = Keyboard::new().context("Initializing keyboard simulation")?;
        App::new(config, keyboard)?.run(reader, &clock)?
    };

    info!(
        "Done exiting: {} frames, {} confirmed, {} skipped",
        summary.frames, summary.confirmed, summary.skipped
    );
    Ok(())
}
