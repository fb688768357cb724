//! Counter descriptors and their kernel encodings.

use serde::{Deserialize, Serialize};

use crate::ffi::bindings as b;

pub mod cache;
pub mod hw;
pub mod raw;

use cache::{Cache, Op, OpResult, Type};
use hw::Hardware;
use raw::Raw;

/// The `type`/`config` pair written into `perf_event_attr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventConfig {
    pub ty: u32,
    pub config: u64,
}

/// Coarse event category, the `perf_event_attr.type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Hardware,
    HwCache,
    Raw,
}

impl EventType {
    pub fn as_raw(&self) -> u32 {
        match self {
            EventType::Hardware => b::PERF_TYPE_HARDWARE,
            EventType::HwCache => b::PERF_TYPE_HW_CACHE,
            EventType::Raw => b::PERF_TYPE_RAW,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Event {
    Hardware { event: Hardware },
    Cache(Cache),
    Raw(Raw),
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::Hardware { .. } => EventType::Hardware,
            Event::Cache(_) => EventType::HwCache,
            Event::Raw(_) => EventType::Raw,
        }
    }

    pub fn event_config(&self) -> EventConfig {
        match self {
            Event::Hardware { event } => event.into(),
            Event::Cache(cache) => cache.into(),
            Event::Raw(raw) => raw.into(),
        }
    }
}

impl From<Hardware> for Event {
    fn from(event: Hardware) -> Self {
        Event::Hardware { event }
    }
}

impl From<Cache> for Event {
    fn from(cache: Cache) -> Self {
        Event::Cache(cache)
    }
}

impl From<Raw> for Event {
    fn from(raw: Raw) -> Self {
        Event::Raw(raw)
    }
}

/// One entry of the counter catalog.
///
/// `name` labels the output column and must be unique within a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSpec {
    pub name: String,
    #[serde(flatten)]
    pub event: Event,
}

impl CounterSpec {
    pub fn new(name: impl Into<String>, event: impl Into<Event>) -> Self {
        Self {
            name: name.into(),
            event: event.into(),
        }
    }
}

/// The built-in catalog.
///
/// `BUS_ACCESS` is backed by the generic bus-cycles event, the closest
/// portable stand-in for the ARM `BUS_ACCESS` PMU event.
pub fn default_catalog() -> Vec<CounterSpec> {
    let l1d_read = |result| Cache {
        cache: Type::L1d,
        op: Op::Read,
        result,
    };
    vec![
        CounterSpec::new("L1D_CACHE_REFILL", l1d_read(OpResult::Miss)),
        CounterSpec::new("L1D_CACHE_ACCESS", l1d_read(OpResult::Access)),
        CounterSpec::new("INSTRUCTIONS", Hardware::Instructions),
        CounterSpec::new("BRANCH_MISPREDICTS", Hardware::BranchMisses),
        CounterSpec::new("BUS_ACCESS", Hardware::BusCycles),
    ]
}

macro_rules! into_config {
    ($ty:ty, $value:ident, $impl:expr) => {
        impl From<&$ty> for crate::event::EventConfig {
            fn from($value: &$ty) -> Self {
                $impl
            }
        }

        impl From<$ty> for crate::event::EventConfig {
            fn from(value: $ty) -> Self {
                (&value).into()
            }
        }
    };
}
use into_config;
