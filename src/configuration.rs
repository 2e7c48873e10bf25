//! Config for the generator behaviors
//!
//! This module provides configuration options for controlling a generation run.
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional. Flags are case-insensitive; set the value to `"true"` to enable one.
//!
//! - `TIMELINE_VERBOSE`: Print one progress line per finished match (default: `true`)
//! - `TIMELINE_LOG`: Enable logging to a file (default: `false`)
//! - `TIMELINE_SEED`: Seed of the random stream (default: drawn from entropy, then logged)
//! - `TIMELINE_MATCHES_PER_DAY`: Matches requested for every day (default: `5`)
//! - `TIMELINE_START_DATE`: First simulated day, `YYYY-MM-DD` (default: `2023-01-01`)
//! - `TIMELINE_END_DATE`: Last simulated day, `YYYY-MM-DD` (default: `2024-12-31`)
//! - `TIMELINE_WORKERS`: Matches simulated in parallel (default: number of CPUs)
//!
//! Values that fail to parse fall back to the default.

use time::{macros::date, macros::format_description, Date};

use crate::match_runner::MatchRules;

/// Configuration for a generation run.
#[derive(Debug, Clone, Copy)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) seed: Option<u64>,
    pub(crate) matches_per_day: usize,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) workers: usize,
    pub(crate) rules: MatchRules,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - The generator will print match progress to stdout.
    /// - Logging to file is disabled.
    /// - The seed is drawn from entropy at the start of the run.
    /// - Five matches are requested per day, from 2023-01-01 to 2024-12-31.
    /// - One worker per CPU.
    /// - Regulation [`MatchRules`] (first to 13, at most 25 rounds, swap at round 13).
    pub fn new() -> Self {
        Self {
            verbose: true,
            log: false,
            seed: None,
            matches_per_day: 5,
            start_date: date!(2023 - 01 - 01),
            end_date: date!(2024 - 12 - 31),
            workers: num_cpus::get(),
            rules: MatchRules::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// See the [module documentation](self) for the recognized variables. Anything unset or
    /// unparsable keeps its default value.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok()?.trim().parse().ok()
        }

        fn get_env_date(var: &str) -> Option<Date> {
            let raw = std::env::var(var).ok()?;
            Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
        }

        let defaults = Self::new();
        Self {
            verbose: get_env_flag("TIMELINE_VERBOSE", defaults.verbose),
            log: get_env_flag("TIMELINE_LOG", defaults.log),
            seed: get_env_parsed("TIMELINE_SEED"),
            matches_per_day: get_env_parsed("TIMELINE_MATCHES_PER_DAY")
                .unwrap_or(defaults.matches_per_day),
            start_date: get_env_date("TIMELINE_START_DATE").unwrap_or(defaults.start_date),
            end_date: get_env_date("TIMELINE_END_DATE").unwrap_or(defaults.end_date),
            workers: get_env_parsed("TIMELINE_WORKERS").unwrap_or(defaults.workers),
            rules: defaults.rules,
        }
    }

    /// Enable or disable per-match progress output.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Fix the seed so the run can be replayed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of matches requested for each day.
    pub fn with_matches_per_day(mut self, value: usize) -> Self {
        self.matches_per_day = value;
        self
    }

    /// Set the simulated date range, both ends included.
    pub fn with_date_range(mut self, start: Date, end: Date) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set how many matches are simulated in parallel. `0` is treated as `1`.
    pub fn with_workers(mut self, value: usize) -> Self {
        self.workers = value;
        self
    }

    /// Override the regulation rules.
    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// Seed of the run, if fixed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// First and last simulated day.
    pub fn date_range(&self) -> (Date, Date) {
        (self.start_date, self.end_date)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Configuration::new()
            .with_seed(42)
            .with_matches_per_day(1)
            .with_date_range(date!(2025 - 01 - 01), date!(2025 - 01 - 02))
            .with_workers(2)
            .with_verbose(false);
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.matches_per_day, 1);
        assert_eq!(config.start_date, date!(2025 - 01 - 01));
        assert_eq!(config.workers, 2);
        assert!(!config.verbose);
        assert_eq!(config.rules, MatchRules::default());
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert!(config.verbose);
        assert!(!config.log);
        assert_eq!(config.seed(), None);
        assert_eq!(config.matches_per_day, 5);
        assert!(config.workers >= 1);
    }
}
