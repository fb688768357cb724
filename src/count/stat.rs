use std::io::{Error, ErrorKind, Result};

use crate::ffi::{bindings as b, u64_at};

/// Counter value with optional enabled/running times.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stat {
    pub count: u64,
    pub time_enabled: Option<u64>,
    pub time_running: Option<u64>,
}

impl Stat {
    // https://github.com/torvalds/linux/blob/v6.13/include/uapi/linux/perf_event.h#L344
    // struct read_format {
    //     u64 value;
    //     { u64 time_enabled; } && PERF_FORMAT_TOTAL_TIME_ENABLED
    //     { u64 time_running; } && PERF_FORMAT_TOTAL_TIME_RUNNING
    // };
    pub(crate) const MAX_READ_LEN: usize = 3 * size_of::<u64>();

    pub(crate) fn read_len(read_format: u64) -> usize {
        let mut size = size_of::<u64>();
        if read_format & b::PERF_FORMAT_TOTAL_TIME_ENABLED as u64 > 0 {
            size += size_of::<u64>();
        }
        if read_format & b::PERF_FORMAT_TOTAL_TIME_RUNNING as u64 > 0 {
            size += size_of::<u64>();
        }
        size
    }

    pub(crate) fn from_buf(buf: &[u8], read_format: u64) -> Result<Self> {
        if buf.len() < Self::read_len(read_format) {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!("short counter read: {} bytes", buf.len()),
            ));
        }

        let mut offset = 0;
        let mut next = || {
            let val = u64_at(buf, offset);
            offset += size_of::<u64>();
            val.unwrap_or_default()
        };

        let count = next();
        let time_enabled =
            (read_format & b::PERF_FORMAT_TOTAL_TIME_ENABLED as u64 > 0).then(&mut next);
        let time_running =
            (read_format & b::PERF_FORMAT_TOTAL_TIME_RUNNING as u64 > 0).then(&mut next);

        Ok(Self {
            count,
            time_enabled,
            time_running,
        })
    }

    /// Fraction of the enabled time the counter was actually on the PMU.
    ///
    /// Below `1.0` the kernel multiplexed this counter with others and
    /// `count` only covers part of the window.
    pub fn running_ratio(&self) -> Option<f64> {
        match (self.time_enabled, self.time_running) {
            (Some(0), Some(_)) => None,
            (Some(enabled), Some(running)) => Some(running as f64 / enabled as f64),
            _ => None,
        }
    }

    pub fn is_multiplexed(&self) -> bool {
        self.running_ratio().is_some_and(|it| it < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(vals: &[u64]) -> Vec<u8> {
        vals.iter().flat_map(|it| it.to_ne_bytes()).collect()
    }

    #[test]
    fn test_count_only() {
        let stat = Stat::from_buf(&buf(&[42]), 0).unwrap();
        assert_eq!(
            stat,
            Stat {
                count: 42,
                time_enabled: None,
                time_running: None,
            }
        );
        assert_eq!(stat.running_ratio(), None);
    }

    #[test]
    fn test_with_times() {
        let stat = Stat::from_buf(&buf(&[7, 1000, 500]), 0b11).unwrap();
        assert_eq!(stat.count, 7);
        assert_eq!(stat.time_enabled, Some(1000));
        assert_eq!(stat.time_running, Some(500));
        assert_eq!(stat.running_ratio(), Some(0.5));
        assert!(stat.is_multiplexed());
    }

    #[test]
    fn test_running_only() {
        let stat = Stat::from_buf(&buf(&[7, 300]), 0b10).unwrap();
        assert_eq!(stat.time_enabled, None);
        assert_eq!(stat.time_running, Some(300));
    }

    #[test]
    fn test_short_read() {
        let err = Stat::from_buf(&buf(&[7]), 0b11).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_len() {
        assert_eq!(Stat::read_len(0), 8);
        assert_eq!(Stat::read_len(0b11), Stat::MAX_READ_LEN);
    }
}
