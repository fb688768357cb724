use std::io::Write;

use tracing::info;

use crate::config::Config;
use crate::count::Pmu;
use crate::output::CsvSink;
use crate::registry::CounterRegistry;
use crate::sampling::{Cancel, SamplingLoop, Schedule, Sleep, State};
use crate::Result;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub state: State,
    pub rows: u64,
    pub requested: usize,
    pub live: usize,
}

/// Runs the whole pipeline: validate, open the sink, open counters, sample.
pub struct Monitor<P, S> {
    pmu: P,
    sleep: S,
    cancel: Cancel,
}

impl<P: Pmu, S: Sleep> Monitor<P, S> {
    pub fn new(pmu: P, sleep: S, cancel: Cancel) -> Self {
        Self { pmu, sleep, cancel }
    }

    pub fn pmu(&self) -> &P {
        &self.pmu
    }

    /// Performs one run.
    ///
    /// Configuration is checked before the sink is opened, and the sink is
    /// opened before any counter, so neither failure leaves kernel state or
    /// a partial file behind. Counters are released on every return path.
    pub fn run<W, F>(&mut self, config: &Config, open_sink: F) -> Result<Summary>
    where
        W: Write,
        F: FnOnce(&Config, &Schedule) -> Result<CsvSink<W>>,
    {
        let schedule = config.validate()?;
        let mut sink = open_sink(config, &schedule)?;

        let mut registry = CounterRegistry::acquire_all(&mut self.pmu, &config.counters);
        sink.write_header(&registry.live_names())?;

        let requested = registry.len();
        let live = registry.live_count();
        info!(
            interval_secs = schedule.interval_secs(),
            iterations = schedule.iterations(),
            output = %sink.path().display(),
            "sampling started"
        );

        let mut sampling = SamplingLoop::new(schedule, &mut self.sleep, self.cancel.clone())
            .run(&mut registry);
        while let Some(record) = sampling.next() {
            sink.write_record(&record?)?;
        }

        let summary = Summary {
            state: sampling.state(),
            rows: sink.rows(),
            requested,
            live,
        };
        info!(
            state = ?summary.state,
            rows = summary.rows,
            output = %sink.path().display(),
            "data collection finished"
        );
        Ok(summary)
    }
}
