//! Core generation logic.
//!
//! This module defines the [`Generator`] type, which orchestrates a run:
//!
//! - Validating the input tables ([`Catalogs`])
//! - Building the daily match slates with the [`MatchScheduler`]
//! - Simulating every match on a bounded pool of worker threads
//! - Concatenating the per-match tables into a [`Timeline`]
//!
//! # Determinism
//!
//! Scheduling draws from a ChaCha stream seeded with the run seed. Match `n` draws from the
//! same seed on stream `n`, so a match's tables depend only on the seed and its schedule,
//! never on worker count or completion order. Tables are concatenated in match order.
//! Two runs with the same seed and the same catalogs produce identical timelines.
//!
//! # Example
//!
//! See crate-level documentation for an example on how to use the `Generator`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};

use anyhow::{anyhow, Context};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, instrument, trace};

use crate::catalog::Catalogs;
use crate::combat::CombatResolver;
use crate::configuration::Configuration;
use crate::dispatcher::MatchDispatcher;
use crate::error::Result;
use crate::logger::init_logger;
use crate::match_runner::{run_match, MatchRules};
use crate::schedule::{MatchScheduler, ScheduledMatch};
use crate::tables::{MatchTimeline, Timeline};
use crate::teams::divide_teams;

type WorkerResult = (u64, String, anyhow::Result<MatchTimeline>);

/// Generates synthetic match histories.
///
/// It schedules matches, simulates them in parallel and collects the output tables.
pub struct Generator {
    config: Configuration,
    resolver: CombatResolver,
}

impl Generator {
    #[instrument(skip_all)]
    /// Create a [`Generator`] with the given [`Configuration`].
    ///
    /// # Errors
    /// Returns an error if file logging is requested and the logger cannot be installed.
    pub fn new(config: Configuration) -> anyhow::Result<Generator> {
        if config.log {
            init_logger()?;
        }

        trace!(?config);

        Ok(Generator {
            config,
            resolver: CombatResolver::new()?,
        })
    }

    /// Runs the whole pipeline over `catalogs`.
    ///
    /// # Errors
    /// Returns an error if the catalogs are malformed or too small to schedule a match, or
    /// if any match fails to simulate. The underlying [`TimelineError`](crate::error::TimelineError)
    /// can be recovered with `downcast_ref`.
    pub fn generate(&self, catalogs: &Catalogs) -> anyhow::Result<Timeline> {
        catalogs.validate().context("invalid input tables")?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(seed, "starting generation");

        let matches = self.schedule(catalogs, seed)?;
        info!(matches = matches.len(), workers = self.config.workers);

        let mut dispatcher = MatchDispatcher::new(matches, self.config.workers);
        let (tx_result, rx_result) = mpsc::channel();

        for m in dispatcher.advance() {
            self.launch_match(m, seed, tx_result.clone());
        }

        while !dispatcher.is_finished() {
            // not finished <=> match running <=> result to receive
            let (sequence, match_id, result) = rx_result
                .recv()
                .context("match workers stopped unexpectedly")?;
            let timeline = result.with_context(|| format!("failed to simulate {match_id}"))?;
            if self.config.verbose {
                print_match_result(&timeline);
            }
            for next in dispatcher.on_result(sequence, timeline) {
                self.launch_match(next, seed, tx_result.clone());
            }
        }

        let timeline = dispatcher.into_timeline();
        info!(
            matches = timeline.match_count(),
            rounds = timeline.round_status.len(),
            "generation finished"
        );
        Ok(timeline)
    }

    /// Builds the match slate of the configured date range.
    ///
    /// # Errors
    /// Returns an error if the catalogs cannot fill a match or the date range is reversed.
    pub fn schedule(&self, catalogs: &Catalogs, seed: u64) -> anyhow::Result<Vec<ScheduledMatch>> {
        let mut scheduler = MatchScheduler::new(catalogs, self.config.matches_per_day)
            .context("cannot schedule matches")?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let matches = scheduler
            .schedule(self.config.start_date, self.config.end_date, &mut rng)
            .with_context(|| {
                format!(
                    "cannot schedule {} to {}",
                    self.config.start_date, self.config.end_date
                )
            })?;
        Ok(matches)
    }

    fn launch_match(&self, scheduled: ScheduledMatch, seed: u64, tx_result: Sender<WorkerResult>) {
        let rules = self.config.rules;
        let resolver = self.resolver.clone();
        trace!(%scheduled, "launching match");

        std::thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                simulate_match(&scheduled, &rules, &resolver, seed)
            }));
            let result = match outcome {
                Ok(result) => result.map_err(anyhow::Error::from),
                Err(_) => {
                    error!(match_id = %scheduled.match_id, "match worker panicked");
                    Err(anyhow!("worker panicked while simulating {scheduled}"))
                }
            };
            // receiver is gone only if the run already failed
            let _ = tx_result.send((scheduled.sequence, scheduled.match_id, result));
        });
    }
}

/// Simulates one scheduled match on its own random stream: team division, side toss and
/// every round.
///
/// # Errors
/// See [`run_match`].
pub fn simulate_match(
    scheduled: &ScheduledMatch,
    rules: &MatchRules,
    resolver: &CombatResolver,
    seed: u64,
) -> Result<MatchTimeline> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(scheduled.sequence);
    let teams = divide_teams(scheduled.participants.len(), &mut rng)?;
    run_match(scheduled, &teams, rules, resolver, &mut rng)
}

fn print_match_result(timeline: &MatchTimeline) {
    let status = &timeline.status;
    let map = timeline
        .roster
        .first()
        .map(|r| r.map_name.as_str())
        .unwrap_or("?");
    // clear line, green match, score, yellow outcome
    println!(
        "\x1b[2K\x1b[32m{} ({map}): \x1b[39m{}-{} in {} rounds \x1b[33m{:?}\x1b[39m",
        status.match_id,
        status.attacker_round_wins,
        status.defender_round_wins,
        status.rounds_played,
        status.outcome
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Agent, Map, User};
    use crate::error::TimelineError;
    use time::macros::date;

    fn catalogs(agents: usize) -> Catalogs {
        let users = (1..=12)
            .map(|id| User {
                user_id: id,
                username: format!("player{id:04}"),
                tagline: "#1234".to_owned(),
                join_date: date!(2025 - 01 - 01),
                rank_tier_id: "unranked".to_owned(),
            })
            .collect();
        let agents = (0..agents)
            .map(|i| Agent::playable(format!("agent-{i}"), format!("Agent{i}")))
            .collect();
        Catalogs::new(users, agents, vec![Map::new("m1", "Ascent")])
    }

    fn config() -> Configuration {
        Configuration::new()
            .with_verbose(false)
            .with_seed(99)
            .with_matches_per_day(1)
            .with_date_range(date!(2025 - 01 - 01), date!(2025 - 01 - 02))
    }

    #[test]
    fn test_same_match_on_every_stream_call() {
        let generator = Generator::new(config()).unwrap();
        let matches = generator.schedule(&catalogs(12), 99).unwrap();
        let rules = MatchRules::default();
        let a = simulate_match(&matches[0], &rules, &generator.resolver, 99).unwrap();
        let b = simulate_match(&matches[0], &rules, &generator.resolver, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_agents_propagates() {
        let generator = Generator::new(config()).unwrap();
        let err = generator.generate(&catalogs(9)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TimelineError>(),
            Some(TimelineError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let one = Generator::new(config().with_workers(1))
            .unwrap()
            .generate(&catalogs(12))
            .unwrap();
        let four = Generator::new(config().with_workers(4))
            .unwrap()
            .generate(&catalogs(12))
            .unwrap();
        assert_eq!(one, four);
        assert_eq!(one.match_count(), 2);
    }
}
