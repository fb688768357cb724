#[derive(Clone, Copy, Debug)]
pub struct All;

#[derive(Clone, Copy, Debug)]
pub struct Cpu(pub u32);

impl Cpu {
    pub const ALL: All = All;
}

#[derive(Clone, Copy, Debug)]
pub struct Proc(pub u32);

impl Proc {
    pub const ALL: All = All;
    pub const CURRENT: Proc = Proc(0);
}

/// The `pid`/`cpu` pair passed to `perf_event_open`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub(crate) pid: i32,
    pub(crate) cpu: i32,
}

macro_rules! into_target {
    ($ty: ty, $destruct: tt, $pid: expr, $cpu: expr) => {
        impl From<$ty> for Target {
            fn from($destruct: $ty) -> Self {
                Target {
                    pid: $pid as _,
                    cpu: $cpu as _,
                }
            }
        }
    };
}

into_target!((Proc, All), (Proc(pid), _), pid, -1);
into_target!((Cpu, All), (Cpu(cpu), _), -1, cpu);

// `(All, All)` is rejected by the kernel with EINVAL, so there is no such target.
