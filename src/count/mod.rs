use std::borrow::Borrow;
use std::fs::File;
use std::io::Result;

use tracing::debug;

use crate::config::attr::from;
use crate::config::{Cpu, Opts, Proc, Target};
use crate::event::{CounterSpec, EventConfig};
use crate::ffi::syscall::{ioctl, perf_event_open, read};
use crate::ffi::{bindings as b, Attr};

mod stat;

pub use stat::*;

/// One open kernel counter.
///
/// The counter is disabled and its file descriptor closed on drop.
pub struct Counter {
    pub(crate) attr: Attr,
    pub(crate) perf: File,
}

impl Counter {
    pub fn new(
        event: impl Into<EventConfig>,
        target: impl Into<Target>,
        opts: impl Borrow<Opts>,
    ) -> Result<Self> {
        let target = target.into();
        let attr = from(event.into(), opts.borrow());
        let flags = b::PERF_FLAG_FD_CLOEXEC as u64;
        let perf = perf_event_open(&attr, target.pid, target.cpu, -1, flags)?;

        Ok(Self { attr, perf })
    }

    pub fn enable(&self) -> Result<()> {
        ioctl(&self.perf, b::PERF_IOC_OP_ENABLE as _)?;
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        ioctl(&self.perf, b::PERF_IOC_OP_DISABLE as _)?;
        Ok(())
    }

    pub fn clear_count(&self) -> Result<()> {
        ioctl(&self.perf, b::PERF_IOC_OP_RESET as _)?;
        Ok(())
    }

    pub fn stat(&self) -> Result<Stat> {
        let mut buf = [0; Stat::MAX_READ_LEN];
        let len = Stat::read_len(self.attr.read_format);
        let bytes = read(&self.perf, &mut buf[..len])?;
        Stat::from_buf(&buf[..bytes], self.attr.read_format)
    }
}

impl Drop for Counter {
    fn drop(&mut self) {
        if let Err(e) = self.disable() {
            debug!(error = %e, "failed to disable counter before close");
        }
    }
}

/// Source of counters.
///
/// [`PerfEventPmu`] opens real kernel counters. Tests substitute a fake.
pub trait Pmu {
    type Counter: PmuCounter;

    fn open(&mut self, spec: &CounterSpec) -> Result<Self::Counter>;
}

/// Lifecycle operations on an open counter.
///
/// Dropping the counter must release it.
pub trait PmuCounter {
    fn clear_count(&self) -> Result<()>;
    fn enable(&self) -> Result<()>;
    fn disable(&self) -> Result<()>;
    fn stat(&self) -> Result<Stat>;
}

impl PmuCounter for Counter {
    fn clear_count(&self) -> Result<()> {
        Counter::clear_count(self)
    }

    fn enable(&self) -> Result<()> {
        Counter::enable(self)
    }

    fn disable(&self) -> Result<()> {
        Counter::disable(self)
    }

    fn stat(&self) -> Result<Stat> {
        Counter::stat(self)
    }
}

/// Opens counters through `perf_event_open`.
#[derive(Clone, Debug)]
pub struct PerfEventPmu {
    pub target: Target,
    pub opts: Opts,
}

impl Default for PerfEventPmu {
    /// The calling process on any CPU, with [`Opts::sampler`].
    fn default() -> Self {
        Self {
            target: (Proc::CURRENT, Cpu::ALL).into(),
            opts: Opts::sampler(),
        }
    }
}

impl Pmu for PerfEventPmu {
    type Counter = Counter;

    fn open(&mut self, spec: &CounterSpec) -> Result<Counter> {
        Counter::new(spec.event.event_config(), self.target, &self.opts)
    }
}
