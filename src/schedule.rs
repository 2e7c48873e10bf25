//! Daily match slate generation.
//!
//! For every calendar day of the requested range, the scheduler keeps the users who had
//! joined by that day and draws the requested number of matches from them. A day with
//! fewer than [`PLAYERS_PER_MATCH`] eligible users is skipped. Each match gets
//! [`PLAYERS_PER_MATCH`] distinct users, as many distinct playable agents, and one map,
//! all sampled uniformly.

use std::{fmt::Display, sync::Arc};

use rand::{seq::index, Rng};
use time::Date;
use tracing::{debug, info};

use crate::{
    catalog::{Agent, Catalogs, Map, User},
    error::{Result, TimelineError},
};

/// Participants in every match.
pub const PLAYERS_PER_MATCH: usize = 10;

/// Formats the identifier of the `sequence`-th match (1-based).
pub fn match_id(sequence: u64) -> String {
    format!("MATCH_{sequence:06}")
}

/// A (user, agent) pair inside a scheduled match.
#[derive(Debug, Clone)]
pub struct ScheduledParticipant {
    /// Eligible user drawn for the match.
    pub user: Arc<User>,
    /// Playable agent assigned to the user.
    pub agent: Arc<Agent>,
}

/// A match waiting to be simulated.
#[derive(Debug, Clone)]
pub struct ScheduledMatch {
    /// 1-based position in the run, also used to derive the match's random stream.
    pub sequence: u64,
    /// `MATCH_NNNNNN`, see [`match_id`].
    pub match_id: String,
    /// Simulated day.
    pub date: Date,
    /// Map drawn for the match.
    pub map: Arc<Map>,
    /// Exactly [`PLAYERS_PER_MATCH`] distinct users, each on a distinct agent. This is the
    /// flat roster of the match.
    pub participants: Vec<ScheduledParticipant>,
}

impl Display for ScheduledMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} on {}, {}]", self.match_id, self.map.name, self.date)
    }
}

/// Builds the daily slates.
pub struct MatchScheduler {
    users: Vec<Arc<User>>,
    agents: Vec<Arc<Agent>>,
    maps: Vec<Arc<Map>>,
    matches_per_day: usize,
    next_sequence: u64,
}

impl MatchScheduler {
    /// Creates a scheduler over `catalogs`.
    ///
    /// # Errors
    /// [`TimelineError::InsufficientData`] if fewer than [`PLAYERS_PER_MATCH`] agents are
    /// playable or the map catalog is empty.
    pub fn new(catalogs: &Catalogs, matches_per_day: usize) -> Result<Self> {
        let agents = catalogs.playable_agents();
        if agents.len() < PLAYERS_PER_MATCH {
            return Err(TimelineError::InsufficientData(format!(
                "{} playable agents, a match needs {PLAYERS_PER_MATCH}",
                agents.len()
            )));
        }
        if catalogs.maps.is_empty() {
            return Err(TimelineError::InsufficientData(
                "map catalog is empty".to_owned(),
            ));
        }

        Ok(Self {
            users: catalogs.users.clone(),
            agents,
            maps: catalogs.maps.clone(),
            matches_per_day,
            next_sequence: 1,
        })
    }

    /// Schedules every day from `start` to `end`, both included.
    ///
    /// # Errors
    /// [`TimelineError::Validation`] if `start` is after `end`.
    pub fn schedule<R: Rng + ?Sized>(
        &mut self,
        start: Date,
        end: Date,
        rng: &mut R,
    ) -> Result<Vec<ScheduledMatch>> {
        if start > end {
            return Err(TimelineError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }

        let mut matches = vec![];
        let mut day = start;
        loop {
            matches.extend(self.schedule_day(day, rng));
            match day.next_day() {
                Some(next) if next <= end => day = next,
                _ => break,
            }
        }
        info!(matches = matches.len(), %start, %end, "schedule built");
        Ok(matches)
    }

    /// Draws the matches of a single day. Returns nothing if too few users had joined.
    pub fn schedule_day<R: Rng + ?Sized>(&mut self, day: Date, rng: &mut R) -> Vec<ScheduledMatch> {
        let eligible: Vec<&Arc<User>> = self
            .users
            .iter()
            .filter(|user| user.join_date <= day)
            .collect();
        if eligible.len() < PLAYERS_PER_MATCH {
            debug!(%day, eligible = eligible.len(), "skipping day: insufficient users");
            return vec![];
        }

        let mut slate = Vec::with_capacity(self.matches_per_day);
        for _ in 0..self.matches_per_day {
            let users = index::sample(rng, eligible.len(), PLAYERS_PER_MATCH);
            let agents = index::sample(rng, self.agents.len(), PLAYERS_PER_MATCH);
            let map = self.maps[rng.gen_range(0..self.maps.len())].clone();

            let participants = users
                .iter()
                .zip(agents.iter())
                .map(|(u, a)| ScheduledParticipant {
                    user: eligible[u].clone(),
                    agent: self.agents[a].clone(),
                })
                .collect();

            let sequence = self.next_sequence;
            self.next_sequence += 1;
            let scheduled = ScheduledMatch {
                sequence,
                match_id: match_id(sequence),
                date: day,
                map,
                participants,
            };
            debug!(%scheduled, "match scheduled");
            slate.push(scheduled);
        }
        slate
    }
}
