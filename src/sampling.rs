//! Interval sampling over the live counters of a [`CounterRegistry`].
//!
//! Each iteration resets and enables every live counter, sleeps for one
//! interval, then disables and reads them. Values are therefore the events
//! counted within that interval only, never a running total.
//!
//! ```no_run
//! use hpc_sampler::count::PerfEventPmu;
//! use hpc_sampler::event::default_catalog;
//! use hpc_sampler::registry::CounterRegistry;
//! use hpc_sampler::sampling::{Cancel, SamplingLoop, Schedule, ThreadSleep};
//!
//! let schedule = Schedule::new(1, 10).unwrap(); // 10 one-second samples.
//! let cancel = Cancel::new();
//!
//! let mut pmu = PerfEventPmu::default();
//! let mut registry = CounterRegistry::acquire_all(&mut pmu, &default_catalog());
//!
//! let sleep = ThreadSleep::new(cancel.clone());
//! for record in SamplingLoop::new(schedule, sleep, cancel).run(&mut registry) {
//!     let record = record.unwrap();
//!     println!("{:?} {:?}", record.elapsed, record.values);
//! }
//! ```

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::count::PmuCounter;
use crate::registry::CounterRegistry;
use crate::{Error, Result};

/// Interval length and number of iterations of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    interval_secs: u64,
    iterations: u64,
}

impl Schedule {
    /// `iterations = floor(duration / interval)`. Both must be positive.
    pub fn new(interval_secs: i64, duration_secs: i64) -> Result<Self> {
        if interval_secs <= 0 {
            return Err(Error::invalid(format!(
                "interval must be positive, got {}s",
                interval_secs
            )));
        }
        if duration_secs <= 0 {
            return Err(Error::invalid(format!(
                "duration must be positive, got {}s",
                duration_secs
            )));
        }
        Ok(Self {
            interval_secs: interval_secs as _,
            iterations: (duration_secs / interval_secs) as _,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// End of the `i`th (1-based) window relative to the start of the run.
    pub fn elapsed_at(&self, i: u64) -> Duration {
        Duration::from_secs(self.interval_secs.saturating_mul(i))
    }
}

/// Why a sleep returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

/// The suspension point of a sampling iteration.
pub trait Sleep {
    fn sleep(&mut self, interval: Duration) -> Wake;
}

impl<S: Sleep + ?Sized> Sleep for &mut S {
    fn sleep(&mut self, interval: Duration) -> Wake {
        (**self).sleep(interval)
    }
}

/// Cancellation flag shared between the sampling thread and whoever stops it.
#[derive(Clone, Debug, Default)]
pub struct Cancel(Arc<(Mutex<bool>, Condvar)>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.0;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.0;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for up to `timeout`. Returns `true` if cancelled meanwhile.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.0;
        // `None` when the deadline is past what `Instant` can represent.
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            cancelled = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    cvar.wait_timeout(cancelled, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => cvar.wait(cancelled).unwrap_or_else(PoisonError::into_inner),
            };
        }
        true
    }
}

/// Wall-clock sleep that wakes early on cancellation.
#[derive(Clone, Debug)]
pub struct ThreadSleep {
    cancel: Cancel,
}

impl ThreadSleep {
    pub fn new(cancel: Cancel) -> Self {
        Self { cancel }
    }
}

impl Sleep for ThreadSleep {
    fn sleep(&mut self, interval: Duration) -> Wake {
        match self.cancel.wait_timeout(interval) {
            true => Wake::Cancelled,
            false => Wake::Elapsed,
        }
    }
}

/// One output row: the end of the window and the live counters' counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleRecord {
    pub elapsed: Duration,
    pub values: Vec<(String, u64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Completed | State::Cancelled | State::Failed)
    }
}

pub struct SamplingLoop<S> {
    schedule: Schedule,
    sleep: S,
    cancel: Cancel,
}

impl<S: Sleep> SamplingLoop<S> {
    pub fn new(schedule: Schedule, sleep: S, cancel: Cancel) -> Self {
        Self {
            schedule,
            sleep,
            cancel,
        }
    }

    /// Starts sampling lazily: nothing touches a counter until the first
    /// call to [`Iterator::next`].
    pub fn run<C: PmuCounter>(self, registry: &mut CounterRegistry<C>) -> Sampling<'_, C, S> {
        Sampling {
            registry,
            schedule: self.schedule,
            sleep: self.sleep,
            cancel: self.cancel,
            iteration: 0,
            state: State::Idle,
        }
    }
}

/// A run in progress. Yields one [`SampleRecord`] per iteration.
///
/// After an error it yields nothing more.
pub struct Sampling<'a, C, S> {
    registry: &'a mut CounterRegistry<C>,
    schedule: Schedule,
    sleep: S,
    cancel: Cancel,
    iteration: u64,
    state: State,
}

impl<C: PmuCounter, S: Sleep> Sampling<'_, C, S> {
    pub fn state(&self) -> State {
        self.state
    }

    /// Records emitted so far.
    pub fn completed(&self) -> u64 {
        self.iteration
    }

    fn step(&mut self, i: u64) -> Result<Option<SampleRecord>> {
        let total = self.schedule.iterations();
        info!("iteration {}/{}", i, total);

        for handle in self.registry.live() {
            handle.start()?;
        }

        if self.sleep.sleep(self.schedule.interval()) == Wake::Cancelled {
            for handle in self.registry.live() {
                handle.halt()?;
            }
            return Ok(None);
        }

        for handle in self.registry.live_mut() {
            handle.stop()?;
        }

        let values = self
            .registry
            .live()
            .map(|it| (it.name().to_string(), it.last_value()))
            .collect();
        Ok(Some(SampleRecord {
            elapsed: self.schedule.elapsed_at(i),
            values,
        }))
    }
}

impl<C: PmuCounter, S: Sleep> Iterator for Sampling<'_, C, S> {
    type Item = Result<SampleRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = State::Running;

        if self.iteration >= self.schedule.iterations() {
            self.state = State::Completed;
            debug!(iterations = self.iteration, "sampling completed");
            return None;
        }
        if self.cancel.is_cancelled() {
            self.state = State::Cancelled;
            info!(completed = self.iteration, "sampling cancelled");
            return None;
        }

        let i = self.iteration + 1;
        match self.step(i) {
            Ok(Some(record)) => {
                self.iteration = i;
                Some(Ok(record))
            }
            Ok(None) => {
                self.state = State::Cancelled;
                info!(completed = self.iteration, "sampling cancelled mid-interval");
                None
            }
            Err(e) => {
                self.state = State::Failed;
                Some(Err(e))
            }
        }
    }
}
