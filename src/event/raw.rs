use serde::{Deserialize, Serialize};

use super::EventConfig;
use crate::ffi::bindings as b;

/// A "raw" implementation-specific event.
///
/// Used for platform events the generic catalog does not name, such as
/// the ARM `EXC_TAKEN` or `BUS_ACCESS` PMU events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Raw {
    /// Event config.
    pub config: u64,
}

super::into_config!(Raw, value, EventConfig {
    ty: b::PERF_TYPE_RAW,
    config: value.config,
});
