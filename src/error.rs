//! Error taxonomy shared by every stage of the generator.
//!
//! Component-level operations (scheduling, team division, round resolution) return
//! [`TimelineError`]. The orchestration layer ([`Generator`](crate::generator::Generator)
//! and the CSV boundary) wraps these in [`anyhow::Error`] with context naming the day,
//! match or file that failed; use `downcast_ref::<TimelineError>()` to classify them.

use thiserror::Error;

/// Errors raised while validating inputs or simulating matches.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// An input table is malformed or too small for the requested operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A catalog does not contain enough entries to schedule a match.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Round resolution failed. Carries the match and round being simulated.
    #[error("simulation error in {match_id} ({round_id})")]
    Simulation {
        /// Match being simulated.
        match_id: String,
        /// Round being resolved when the failure happened.
        round_id: String,
        /// Underlying cause.
        #[source]
        source: Box<TimelineError>,
    },

    /// Filesystem failure at the CSV boundary.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input or unserializable output row.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl TimelineError {
    /// Wraps `self` with the match/round it happened in.
    pub fn in_round(self, match_id: &str, round_id: &str) -> TimelineError {
        TimelineError::Simulation {
            match_id: match_id.to_owned(),
            round_id: round_id.to_owned(),
            source: Box::new(self),
        }
    }
}

/// Shorthand used across the simulation modules.
pub type Result<T> = std::result::Result<T, TimelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_error_keeps_cause() {
        let err = TimelineError::Validation("no attackers".to_owned())
            .in_round("MATCH_000001", "MATCH_000001-R03");
        assert_eq!(
            err.to_string(),
            "simulation error in MATCH_000001 (MATCH_000001-R03)"
        );
        let source = std::error::Error::source(&err).expect("source is kept");
        assert_eq!(source.to_string(), "validation error: no attackers");
    }
}
