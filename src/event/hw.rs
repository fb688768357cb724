use serde::{Deserialize, Serialize};

use super::EventConfig;
use crate::ffi::bindings as b;

/// Generic hardware events, `PERF_TYPE_HARDWARE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hardware {
    #[serde(alias = "cpu-cycle")]
    CpuCycles,
    #[serde(alias = "bus-cycle")]
    BusCycles,
    #[serde(alias = "ref-cpu-cycle")]
    RefCpuCycles,

    CacheMisses,
    CacheReferences,

    BranchMisses,
    BranchInstructions,

    StalledCyclesBackend,
    StalledCyclesFrontend,

    #[serde(alias = "instr")]
    Instructions,
}

impl Hardware {
    pub fn as_config(&self) -> u64 {
        let config = match self {
            Hardware::CpuCycles => b::PERF_COUNT_HW_CPU_CYCLES,
            Hardware::BusCycles => b::PERF_COUNT_HW_BUS_CYCLES,
            Hardware::RefCpuCycles => b::PERF_COUNT_HW_REF_CPU_CYCLES,

            Hardware::CacheMisses => b::PERF_COUNT_HW_CACHE_MISSES,
            Hardware::CacheReferences => b::PERF_COUNT_HW_CACHE_REFERENCES,

            Hardware::BranchMisses => b::PERF_COUNT_HW_BRANCH_MISSES,
            Hardware::BranchInstructions => b::PERF_COUNT_HW_BRANCH_INSTRUCTIONS,

            Hardware::StalledCyclesBackend => b::PERF_COUNT_HW_STALLED_CYCLES_BACKEND,
            Hardware::StalledCyclesFrontend => b::PERF_COUNT_HW_STALLED_CYCLES_FRONTEND,

            Hardware::Instructions => b::PERF_COUNT_HW_INSTRUCTIONS,
        };
        config as _
    }
}

super::into_config!(Hardware, value, EventConfig {
    ty: b::PERF_TYPE_HARDWARE,
    config: value.as_config(),
});
