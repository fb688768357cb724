use serde::{Deserialize, Serialize};

use super::EventConfig;
use crate::ffi::bindings as b;

/// Cache event, `PERF_TYPE_HW_CACHE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cache {
    pub cache: Type,
    pub op: Op,
    pub result: OpResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Type {
    L1d,
    L1i,
    Ll,
    Dtlb,
    Itlb,
    Bpu,
    Node,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Op {
    Read,
    Write,
    Prefetch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpResult {
    Miss,
    Access,
}

/// Packs a cache event into its `attr.config` value:
/// `id | (op << 8) | (result << 16)`.
pub fn cache_config(cache: &Cache) -> u64 {
    let id = match cache.cache {
        Type::L1d => b::PERF_COUNT_HW_CACHE_L1D,
        Type::L1i => b::PERF_COUNT_HW_CACHE_L1I,
        Type::Ll => b::PERF_COUNT_HW_CACHE_LL,
        Type::Dtlb => b::PERF_COUNT_HW_CACHE_DTLB,
        Type::Itlb => b::PERF_COUNT_HW_CACHE_ITLB,
        Type::Bpu => b::PERF_COUNT_HW_CACHE_BPU,
        Type::Node => b::PERF_COUNT_HW_CACHE_NODE,
    } as u64;
    let op = match cache.op {
        Op::Read => b::PERF_COUNT_HW_CACHE_OP_READ,
        Op::Write => b::PERF_COUNT_HW_CACHE_OP_WRITE,
        Op::Prefetch => b::PERF_COUNT_HW_CACHE_OP_PREFETCH,
    } as u64;
    let op_result = match cache.result {
        OpResult::Miss => b::PERF_COUNT_HW_CACHE_RESULT_MISS,
        OpResult::Access => b::PERF_COUNT_HW_CACHE_RESULT_ACCESS,
    } as u64;
    id | (op << 8) | (op_result << 16)
}

super::into_config!(Cache, value, EventConfig {
    ty: b::PERF_TYPE_HW_CACHE,
    config: cache_config(value),
});
