//! Periodic hardware performance counter sampling via `perf_event_open`.
//!
//! A catalog of counters is opened once. Counters the platform refuses are
//! left out rather than failing the run. The live ones are then sampled
//! in fixed windows (reset, enable, sleep, disable, read) and every window
//! becomes one CSV row of interval deltas.
//!
//! ## Example
//!
//! Sample the built-in catalog every 5 seconds for 30 minutes.
//!
//! ```no_run
//! use hpc_sampler::config::Config;
//! use hpc_sampler::count::PerfEventPmu;
//! use hpc_sampler::monitor::Monitor;
//! use hpc_sampler::output::CsvSink;
//! use hpc_sampler::sampling::{Cancel, ThreadSleep};
//!
//! let config = Config::default(); // 5s interval, 1800s duration.
//! let cancel = Cancel::new();
//!
//! let sleep = ThreadSleep::new(cancel.clone());
//! let mut monitor = Monitor::new(PerfEventPmu::default(), sleep, cancel);
//!
//! let summary = monitor
//!     .run(&config, |cfg, schedule| {
//!         CsvSink::create(&cfg.output, schedule.interval())
//!     })
//!     .unwrap();
//! println!("{} rows from {} counters", summary.rows, summary.live);
//! ```
//!
//! ## Permissions
//!
//! Counting kernel-mode events for the current process needs
//! `perf_event_paranoid <= 1`, `CAP_PERFMON` or root. Counters that cannot be
//! opened are reported as warnings and omitted from the output.

pub mod config;
pub mod count;
mod error;
pub mod event;
#[cfg(test)]
mod fake;
mod ffi;
pub mod monitor;
pub mod output;
pub mod registry;
pub mod sampling;

pub use error::*;
