use std::io;
use std::path::PathBuf;
use std::process::{self, ExitCode};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use hpc_sampler::config::Config;
use hpc_sampler::count::PerfEventPmu;
use hpc_sampler::monitor::Monitor;
use hpc_sampler::output::CsvSink;
use hpc_sampler::sampling::{Cancel, State, ThreadSleep};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Samples hardware performance counters into a CSV time series.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file with run parameters and the counter catalog
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sampling interval in seconds [default: 5]
    #[arg(short, long, allow_negative_numbers = true)]
    interval: Option<i64>,

    /// Total run length in seconds [default: 1800]
    #[arg(short, long, allow_negative_numbers = true)]
    duration: Option<i64>,

    /// Output CSV path [default: hpc_output.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        Ok(config)
    }
}

// The first SIGINT/SIGTERM stops sampling after the current window is
// dropped. A second one exits immediately.
fn watch_signals(cancel: Cancel) -> io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                if cancel.is_cancelled() {
                    process::exit(128 + signal);
                }
                warn!(signal, "stopping, send again to exit immediately");
                cancel.cancel();
            }
        })?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = args.into_config()?;

    let cancel = Cancel::new();
    watch_signals(cancel.clone()).context("failed to install signal handlers")?;

    info!(
        interval_secs = config.interval_secs,
        duration_secs = config.duration_secs,
        counters = config.counters.len(),
        "monitoring performance counters"
    );

    let sleep = ThreadSleep::new(cancel.clone());
    let mut monitor = Monitor::new(PerfEventPmu::default(), sleep, cancel);
    let summary = monitor
        .run(&config, |cfg, schedule| {
            CsvSink::create(&cfg.output, schedule.interval())
        })
        .context("data collection failed")?;

    if summary.state == State::Cancelled {
        warn!(rows = summary.rows, "run was cancelled before the configured duration");
    }
    if summary.live == 0 {
        warn!("no counters were available, output only contains timestamps");
    }
    info!(
        rows = summary.rows,
        live = summary.live,
        requested = summary.requested,
        "data collection complete: {}",
        config.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
