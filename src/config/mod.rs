use crate::ffi::bindings as b;

pub(crate) mod attr;
mod run;
mod target;

pub use run::*;
pub use target::*;

/// Counter options.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Do not count while the hypervisor runs.
    pub exclude_hv: bool,
    pub stat_format: StatFormat,
}

impl Opts {
    /// Options every sampled counter is opened with: hypervisor excluded,
    /// kernel and user included, and enabled/running times reported so
    /// multiplexing can be detected. Counters always open disabled.
    pub fn sampler() -> Self {
        Self {
            exclude_hv: true,
            stat_format: StatFormat {
                time_enabled: true,
                time_running: true,
            },
        }
    }
}

/// Controls the format of [`Stat`][crate::count::Stat].
#[derive(Clone, Debug, Default)]
pub struct StatFormat {
    /// Contains the [enabled time][crate::count::Stat::time_enabled] of the counter.
    pub time_enabled: bool,

    /// Contains the [running time][crate::count::Stat::time_running] of the counter.
    pub time_running: bool,
}

impl StatFormat {
    pub(crate) fn as_read_format(&self) -> u64 {
        let mut val = 0;
        if self.time_enabled {
            val |= b::PERF_FORMAT_TOTAL_TIME_ENABLED;
        }
        if self.time_running {
            val |= b::PERF_FORMAT_TOTAL_TIME_RUNNING;
        }
        val as _
    }
}
