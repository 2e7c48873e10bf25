//! # Match Timeline
//!
//! A synthetic match history generator for a five-versus-five tactical shooter.
//!
//! It provides:
//! - Daily match scheduling over a date range (`MatchScheduler`)
//! - Team division and attacker/defender side rotation
//! - Turn-based round simulation with a combat ledger (`CombatResolver`)
//! - Round duration estimation from the spike timeline
//! - Per-round, per-opponent performance tables
//!
//! Matches are simulated in parallel on a bounded pool of threads. Every match draws from its
//! own seeded random stream, so a run is reproducible from its seed alone.
//!
//! # Documentation Overview
//!
//! - For the run orchestration and the determinism guarantees, see the [`generator`] module.
//! - For configuring a run (seed, date range, workers, match rules), see
//! [`Configuration`](crate::configuration::Configuration).
//! - For the simulation itself, see [`match_runner`], [`combat`] and [`duration`].
//! - For the produced tables, see [`tables`]; [`io`] reads and writes them as CSV.
//!
//! # Usage Example
//!
//! ```no_run
//! use std::path::Path;
//! use match_timeline::prelude::*;
//! use match_timeline::io::{read_catalogs, write_timeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::new()
//!         .with_seed(42)
//!         .with_matches_per_day(10);
//!
//!     let catalogs = read_catalogs(Path::new("data"))?;
//!     let generator = Generator::new(config)?;
//!     let timeline: Timeline = generator.generate(&catalogs)?;
//!
//!     println!(
//!         "{} matches, {} rounds",
//!         timeline.match_count(),
//!         timeline.round_status.len()
//!     );
//!     write_timeline(Path::new("output"), &timeline)?;
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub use anyhow;
pub mod catalog;
pub mod combat;
pub mod configuration;
mod dispatcher;
pub mod duration;
pub mod error;
pub mod generator;
pub mod io;
mod logger;
pub mod match_runner;
pub mod performance;
pub mod schedule;
pub mod tables;
pub mod teams;
pub mod users;

/// Commonly used types for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use match_timeline::prelude::*;
/// ```
///
/// Includes:
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`Generator`](crate::generator::Generator)
/// - the input catalog types and the output [`Timeline`](crate::tables::Timeline)
pub mod prelude {
    pub use crate::catalog::{Agent, Catalogs, Map, User};
    pub use crate::configuration::Configuration;
    pub use crate::error::TimelineError;
    pub use crate::generator::Generator;
    pub use crate::match_runner::MatchRules;
    pub use crate::tables::Timeline;
}
