use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Acquisition failed for one counter. Never propagated out of a run,
    /// the counter is left out of the output instead.
    #[error("counter `{name}` is unavailable: {source}")]
    CounterUnavailable { name: String, source: io::Error },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("output sink `{}` failed: {source}", path.display())]
    OutputSink { path: PathBuf, source: io::Error },

    /// A kernel call failed on a counter that was opened successfully.
    #[error("failed to {op} counter `{name}`: {source}")]
    CounterOperation {
        name: String,
        op: CounterOp,
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterOp {
    Reset,
    Enable,
    Disable,
    Read,
}

impl fmt::Display for CounterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CounterOp::Reset => "reset",
            CounterOp::Enable => "enable",
            CounterOp::Disable => "disable",
            CounterOp::Read => "read",
        };
        f.write_str(op)
    }
}
