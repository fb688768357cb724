//! Turns a counter catalog into a fixed set of handles.
//!
//! Every spec yields exactly one [`CounterHandle`], in catalog order. A
//! counter the platform refuses is kept as [`HandleState::Unavailable`] and
//! ignored for the rest of the run instead of failing it.

use tracing::{debug, info, warn};

use crate::count::{Pmu, PmuCounter, Stat};
use crate::error::CounterOp;
use crate::event::CounterSpec;
use crate::{Error, Result};

const PARANOID_PATH: &str = "/proc/sys/kernel/perf_event_paranoid";

/// Outcome of opening one counter. Fixed for the life of the registry.
#[derive(Debug)]
pub enum HandleState<C> {
    Available(C),
    /// Holds an [`Error::CounterUnavailable`].
    Unavailable(Error),
}

#[derive(Debug)]
pub struct CounterHandle<C> {
    spec: CounterSpec,
    state: HandleState<C>,
    last_value: u64,
}

impl<C> CounterHandle<C> {
    pub fn spec(&self) -> &CounterSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn state(&self) -> &HandleState<C> {
        &self.state
    }

    pub fn counter(&self) -> Option<&C> {
        match &self.state {
            HandleState::Available(counter) => Some(counter),
            HandleState::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.counter().is_some()
    }

    /// Count accumulated during the most recent interval.
    pub fn last_value(&self) -> u64 {
        self.last_value
    }
}

impl<C: PmuCounter> CounterHandle<C> {
    fn op<T>(&self, op: CounterOp, f: impl FnOnce(&C) -> std::io::Result<T>) -> Result<Option<T>> {
        let Some(counter) = self.counter() else {
            return Ok(None);
        };
        f(counter).map(Some).map_err(|source| Error::CounterOperation {
            name: self.spec.name.clone(),
            op,
            source,
        })
    }

    /// Zeroes the count and starts counting.
    pub(crate) fn start(&self) -> Result<()> {
        self.op(CounterOp::Reset, |it| it.clear_count())?;
        self.op(CounterOp::Enable, |it| it.enable())?;
        Ok(())
    }

    pub(crate) fn halt(&self) -> Result<()> {
        self.op(CounterOp::Disable, |it| it.disable())?;
        Ok(())
    }

    /// Stops counting and stores the interval's count in `last_value`.
    pub(crate) fn stop(&mut self) -> Result<()> {
        self.halt()?;
        if let Some(stat) = self.op(CounterOp::Read, |it| it.stat())? {
            self.record(stat);
        }
        Ok(())
    }

    fn record(&mut self, stat: Stat) {
        if stat.is_multiplexed() {
            debug!(
                counter = %self.spec.name,
                running_ratio = stat.running_ratio().unwrap_or_default(),
                "counter was multiplexed during the interval, count is unscaled"
            );
        }
        self.last_value = stat.count;
    }
}

/// Owns the handles of one run. Dropping it releases every open counter.
#[derive(Debug)]
pub struct CounterRegistry<C> {
    handles: Vec<CounterHandle<C>>,
}

impl<C: PmuCounter> CounterRegistry<C> {
    /// Attempts to open every spec.
    ///
    /// Never fails: a counter that cannot be opened is logged and recorded
    /// as unavailable.
    pub fn acquire_all<P>(pmu: &mut P, specs: &[CounterSpec]) -> Self
    where
        P: Pmu<Counter = C>,
    {
        let handles: Vec<_> = specs
            .iter()
            .map(|spec| {
                let state = match pmu.open(spec) {
                    Ok(counter) => HandleState::Available(counter),
                    Err(source) => {
                        warn!(
                            counter = %spec.name,
                            error = %source,
                            "failed to open counter, excluding it from this run"
                        );
                        if matches!(source.raw_os_error(), Some(libc::EACCES | libc::EPERM)) {
                            warn!("check {} or run with CAP_PERFMON", PARANOID_PATH);
                        }
                        HandleState::Unavailable(Error::CounterUnavailable {
                            name: spec.name.clone(),
                            source,
                        })
                    }
                };
                CounterHandle {
                    spec: spec.clone(),
                    state,
                    last_value: 0,
                }
            })
            .collect();

        let registry = Self { handles };
        if registry.live_count() == 0 {
            warn!(
                requested = registry.len(),
                "no counter could be opened, samples will only carry time"
            );
        } else {
            info!(
                live = registry.live_count(),
                requested = registry.len(),
                "counters opened"
            );
        }
        registry
    }
}

impl<C> CounterRegistry<C> {
    pub fn handles(&self) -> &[CounterHandle<C>] {
        &self.handles
    }

    /// Handles whose counter was opened, in catalog order.
    pub fn live(&self) -> impl Iterator<Item = &CounterHandle<C>> {
        self.handles.iter().filter(|it| it.is_available())
    }

    pub(crate) fn live_mut(&mut self) -> impl Iterator<Item = &mut CounterHandle<C>> {
        self.handles.iter_mut().filter(|it| it.is_available())
    }

    pub fn live_names(&self) -> Vec<&str> {
        self.live().map(|it| it.name()).collect()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
