use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::event::{default_catalog, CounterSpec};
use crate::sampling::Schedule;
use crate::{Error, Result};

pub const DEFAULT_INTERVAL_SECS: i64 = 5;
pub const DEFAULT_DURATION_SECS: i64 = 30 * 60;
pub const DEFAULT_OUTPUT: &str = "hpc_output.csv";

/// Run configuration, usually loaded from a TOML file:
///
/// ```toml
/// interval_secs = 5
/// duration_secs = 1800
/// output = "/data/local/tmp/hpc_output.csv"
///
/// [[counter]]
/// name = "L1D_CACHE_REFILL"
/// kind = "cache"
/// cache = "l1d"
/// op = "read"
/// result = "miss"
///
/// [[counter]]
/// name = "INSTRUCTIONS"
/// kind = "hardware"
/// event = "instructions"
///
/// [[counter]]
/// name = "EXC_TAKEN"
/// kind = "raw"
/// config = 0x09
/// ```
///
/// Omitting `[[counter]]` entirely selects the built-in catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Length of each sampling window in seconds.
    pub interval_secs: i64,
    /// Total run length in seconds.
    pub duration_secs: i64,
    /// Destination CSV file.
    pub output: PathBuf,
    #[serde(rename = "counter")]
    pub counters: Vec<CounterSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            duration_secs: DEFAULT_DURATION_SECS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            counters: default_catalog(),
        }
    }
}

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::invalid(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::invalid(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    /// Validates the run parameters and returns the derived schedule.
    pub fn schedule(&self) -> Result<Schedule> {
        Schedule::new(self.interval_secs, self.duration_secs)
    }

    /// Checks that every counter has a non-empty name and no two counters
    /// share one, since names become CSV columns.
    pub fn validate_catalog(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.counters {
            if spec.name.trim().is_empty() {
                return Err(Error::invalid("counter name must not be empty"));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::invalid(format!(
                    "duplicate counter name `{}`",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<Schedule> {
        let schedule = self.schedule()?;
        self.validate_catalog()?;
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::cache::{Cache, Op, OpResult, Type};
    use crate::event::hw::Hardware;
    use crate::event::raw::Raw;
    use crate::event::Event;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.duration_secs, 1800);
        assert_eq!(config.counters.len(), 5);
        assert_eq!(config.schedule().unwrap().iterations(), 360);
    }

    #[test]
    fn test_parse_catalog() {
        let raw = r#"
            interval_secs = 2
            duration_secs = 60
            output = "/tmp/out.csv"

            [[counter]]
            name = "LL_WRITE_MISS"
            kind = "cache"
            cache = "ll"
            op = "write"
            result = "miss"

            [[counter]]
            name = "CYCLES"
            kind = "hardware"
            event = "cpu-cycles"

            [[counter]]
            name = "EXC_TAKEN"
            kind = "raw"
            config = 0x09
        "#;
        let config = Config::from_toml(raw).unwrap();

        assert_eq!(config.interval_secs, 2);
        assert_eq!(config.output, PathBuf::from("/tmp/out.csv"));
        assert_eq!(
            config.counters,
            vec![
                CounterSpec::new(
                    "LL_WRITE_MISS",
                    Cache {
                        cache: Type::Ll,
                        op: Op::Write,
                        result: OpResult::Miss,
                    }
                ),
                CounterSpec::new("CYCLES", Hardware::CpuCycles),
                CounterSpec::new("EXC_TAKEN", Raw { config: 9 }),
            ]
        );
        assert_eq!(config.counters[0].event.event_config().config, 0x10102);
        assert!(matches!(config.counters[2].event, Event::Raw(_)));
    }

    #[test]
    fn test_empty_catalog_is_allowed() {
        let config = Config::from_toml("counter = []").unwrap();
        assert!(config.counters.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_reject_unknown_event() {
        let raw = r#"
            [[counter]]
            name = "X"
            kind = "hardware"
            event = "teleports"
        "#;
        let err = Config::from_toml(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_reject_unknown_key() {
        let err = Config::from_toml("interval = 5").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_reject_duplicate_names() {
        let mut config = Config::default();
        config
            .counters
            .push(CounterSpec::new("INSTRUCTIONS", Hardware::Instructions));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate counter name `INSTRUCTIONS`"));
    }

    #[test]
    fn test_reject_empty_name() {
        let config = Config {
            counters: vec![CounterSpec::new(" ", Hardware::Instructions)],
            ..Default::default()
        };
        assert!(matches!(
            config.validate_catalog(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reject_non_positive_parameters() {
        for (interval_secs, duration_secs) in [(0, 60), (-5, 60), (5, 0), (5, -1)] {
            let config = Config {
                interval_secs,
                duration_secs,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfiguration(_))
            ));
        }
    }
}
