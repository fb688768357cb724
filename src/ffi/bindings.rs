#![allow(dead_code, non_camel_case_types, non_upper_case_globals)]

// Subset of `include/uapi/linux/perf_event.h` used by the sampler.
// https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h

pub const PERF_TYPE_HARDWARE: u32 = 0;
pub const PERF_TYPE_HW_CACHE: u32 = 3;
pub const PERF_TYPE_RAW: u32 = 4;

pub const PERF_COUNT_HW_CPU_CYCLES: u32 = 0;
pub const PERF_COUNT_HW_INSTRUCTIONS: u32 = 1;
pub const PERF_COUNT_HW_CACHE_REFERENCES: u32 = 2;
pub const PERF_COUNT_HW_CACHE_MISSES: u32 = 3;
pub const PERF_COUNT_HW_BRANCH_INSTRUCTIONS: u32 = 4;
pub const PERF_COUNT_HW_BRANCH_MISSES: u32 = 5;
pub const PERF_COUNT_HW_BUS_CYCLES: u32 = 6;
pub const PERF_COUNT_HW_STALLED_CYCLES_FRONTEND: u32 = 7;
pub const PERF_COUNT_HW_STALLED_CYCLES_BACKEND: u32 = 8;
pub const PERF_COUNT_HW_REF_CPU_CYCLES: u32 = 9;

pub const PERF_COUNT_HW_CACHE_L1D: u32 = 0;
pub const PERF_COUNT_HW_CACHE_L1I: u32 = 1;
pub const PERF_COUNT_HW_CACHE_LL: u32 = 2;
pub const PERF_COUNT_HW_CACHE_DTLB: u32 = 3;
pub const PERF_COUNT_HW_CACHE_ITLB: u32 = 4;
pub const PERF_COUNT_HW_CACHE_BPU: u32 = 5;
pub const PERF_COUNT_HW_CACHE_NODE: u32 = 6;

pub const PERF_COUNT_HW_CACHE_OP_READ: u32 = 0;
pub const PERF_COUNT_HW_CACHE_OP_WRITE: u32 = 1;
pub const PERF_COUNT_HW_CACHE_OP_PREFETCH: u32 = 2;

pub const PERF_COUNT_HW_CACHE_RESULT_ACCESS: u32 = 0;
pub const PERF_COUNT_HW_CACHE_RESULT_MISS: u32 = 1;

pub const PERF_FORMAT_TOTAL_TIME_ENABLED: u32 = 1 << 0;
pub const PERF_FORMAT_TOTAL_TIME_RUNNING: u32 = 1 << 1;

pub const PERF_FLAG_FD_CLOEXEC: u32 = 1 << 3;

// _IO('$', n)
pub const PERF_IOC_OP_ENABLE: u32 = 0x2400;
pub const PERF_IOC_OP_DISABLE: u32 = 0x2401;
pub const PERF_IOC_OP_RESET: u32 = 0x2403;

/// `PERF_ATTR_SIZE_VER5`, accepted by every kernel since 4.1.
pub const PERF_ATTR_SIZE_VER5: u32 = 112;

/// `struct perf_event_attr` up to `PERF_ATTR_SIZE_VER5`.
///
/// The anonymous unions are flattened to their first member and the flag
/// bitfield is a plain `u64` with bindgen-style setters below.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct perf_event_attr {
    pub type_: u32,
    pub size: u32,
    pub config: u64,
    pub sample_period: u64,
    pub sample_type: u64,
    pub read_format: u64,
    pub flags: u64,
    pub wakeup_events: u32,
    pub bp_type: u32,
    pub config1: u64,
    pub config2: u64,
    pub branch_sample_type: u64,
    pub sample_regs_user: u64,
    pub sample_stack_user: u32,
    pub clockid: i32,
    pub sample_regs_intr: u64,
    pub aux_watermark: u32,
    pub sample_max_stack: u16,
    pub __reserved_2: u16,
}

const _: () = assert!(size_of::<perf_event_attr>() == PERF_ATTR_SIZE_VER5 as usize);

macro_rules! bitfield {
    ($($setter:ident, $getter:ident, $bit:literal;)+) => {
        impl perf_event_attr {
            $(
            #[inline]
            pub fn $setter(&mut self, val: u64) {
                self.flags = (self.flags & !(1 << $bit)) | ((val & 1) << $bit);
            }

            #[inline]
            pub fn $getter(&self) -> u64 {
                (self.flags >> $bit) & 1
            }
            )+
        }
    };
}

bitfield! {
    set_disabled, disabled, 0;
    set_inherit, inherit, 1;
    set_pinned, pinned, 2;
    set_exclusive, exclusive, 3;
    set_exclude_user, exclude_user, 4;
    set_exclude_kernel, exclude_kernel, 5;
    set_exclude_hv, exclude_hv, 6;
    set_exclude_idle, exclude_idle, 7;
}
