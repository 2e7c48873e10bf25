//! Round-by-round simulation of a single match.
//!
//! The match is a small state machine over [`MatchState`]: it starts `InProgress` at
//! 0-0 and, after every round, moves to `AttackersWon`/`DefendersWon` as soon as one
//! side's round wins reach [`MatchRules::rounds_to_win`], or to `Unresolved` once
//! [`MatchRules::max_rounds`] rounds have been played without a winner. There is no
//! overtime. Round wins are credited to the side (attack or defense) that won the round,
//! whichever team held it at the time.
//!
//! Sides come from a [`SideRotation`] tossed once before round 1 and swapped once before
//! [`MatchRules::side_swap_round`].

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    combat::{CombatResolver, CombatState, RoundParticipant, RoundResult, RoundSnapshot},
    duration::estimate_duration,
    error::{Result, TimelineError},
    performance::aggregate_round,
    schedule::ScheduledMatch,
    tables::{
        MatchStatusRow, MatchTimeline, RosterRow, RoundParticipantRow, RoundSpikeStatusRow,
        RoundStatusRow,
    },
    teams::{Side, SideRotation, TeamAssignment},
};

/// Regulation parameters of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    /// Round wins that end the match.
    pub rounds_to_win: u32,
    /// Rounds after which an undecided match stops.
    pub max_rounds: u32,
    /// Round before which every participant changes side.
    pub side_swap_round: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            rounds_to_win: 13,
            max_rounds: 25,
            side_swap_round: 13,
        }
    }
}

/// Where a match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// Neither side has reached the winning count and rounds remain.
    InProgress,
    /// The attacking side reached the winning count first.
    AttackersWon,
    /// The defending side reached the winning count first.
    DefendersWon,
    /// Round cap reached with neither side at the winning count.
    Unresolved,
}

/// Running round-win counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchScore {
    /// Rounds won on attack.
    pub attacker_wins: u32,
    /// Rounds won on defense.
    pub defender_wins: u32,
    /// Rounds played so far.
    pub rounds_played: u32,
}

impl MatchScore {
    /// Credits a round to `winner`.
    pub fn record(&mut self, winner: Side) {
        match winner {
            Side::Attacker => self.attacker_wins += 1,
            Side::Defender => self.defender_wins += 1,
        }
        self.rounds_played += 1;
    }

    /// State of the match after the rounds recorded so far.
    pub fn state(&self, rules: &MatchRules) -> MatchState {
        if self.attacker_wins >= rules.rounds_to_win {
            MatchState::AttackersWon
        } else if self.defender_wins >= rules.rounds_to_win {
            MatchState::DefendersWon
        } else if self.rounds_played >= rules.max_rounds {
            MatchState::Unresolved
        } else {
            MatchState::InProgress
        }
    }
}

/// Identifier of round `round` (1-based) of `match_id`.
pub fn round_id(match_id: &str, round: u32) -> String {
    format!("{match_id}-R{round:02}")
}

/// Plays `scheduled` until it ends and returns all of its tables.
///
/// # Errors
/// [`TimelineError::Validation`] if `teams` does not cover the roster, and
/// [`TimelineError::Simulation`] if a round fails to resolve.
#[instrument(skip_all, fields(match_id = %scheduled.match_id))]
pub fn run_match<R: Rng + ?Sized>(
    scheduled: &ScheduledMatch,
    teams: &TeamAssignment,
    rules: &MatchRules,
    resolver: &CombatResolver,
    rng: &mut R,
) -> Result<MatchTimeline> {
    if teams.len() != scheduled.participants.len() {
        return Err(TimelineError::Validation(format!(
            "{} team slots for {} participants",
            teams.len(),
            scheduled.participants.len()
        )));
    }
    let match_id = scheduled.match_id.as_str();
    let turn_order = teams.turn_order();

    let mut rotation = SideRotation::coin_toss(rng);
    let roster = roster_rows(scheduled, teams, &rotation);

    let mut score = MatchScore::default();
    let mut timeline = MatchTimeline {
        roster,
        status: MatchStatusRow {
            match_id: match_id.to_owned(),
            attacker_round_wins: 0,
            defender_round_wins: 0,
            rounds_played: 0,
            outcome: MatchState::InProgress,
        },
        rounds: vec![],
        spikes: vec![],
        performance: vec![],
        participants: vec![],
    };

    let mut round = 1;
    let state = loop {
        if round > 1 && round == rules.side_swap_round {
            rotation.swap();
            debug!(round, attacking = %rotation.attacking_team(), "sides swapped");
        }

        let snapshot = RoundSnapshot {
            round_id: round_id(match_id, round),
            participants: turn_order
                .iter()
                .map(|&slot| {
                    let p = &scheduled.participants[slot];
                    let team = teams.team_of(slot);
                    RoundParticipant {
                        user_id: p.user.user_id,
                        agent: p.agent.clone(),
                        team,
                        side: rotation.side_of(team),
                    }
                })
                .collect(),
        };

        let combat = resolver
            .resolve(&snapshot, rng)
            .map_err(|e| e.in_round(match_id, &snapshot.round_id))?;
        record_round(match_id, &snapshot, &combat, &mut score, &mut timeline, rng);

        match score.state(rules) {
            MatchState::InProgress => round += 1,
            finished => break finished,
        }
    };

    info!(
        ?state,
        attacker_wins = score.attacker_wins,
        defender_wins = score.defender_wins,
        rounds = score.rounds_played,
        "match finished"
    );
    timeline.status.attacker_round_wins = score.attacker_wins;
    timeline.status.defender_round_wins = score.defender_wins;
    timeline.status.rounds_played = score.rounds_played;
    timeline.status.outcome = state;
    Ok(timeline)
}

/// Decides a resolved round, draws its duration and appends its rows to `timeline`.
fn record_round<R: Rng + ?Sized>(
    match_id: &str,
    snapshot: &RoundSnapshot,
    combat: &CombatState,
    score: &mut MatchScore,
    timeline: &mut MatchTimeline,
    rng: &mut R,
) -> RoundResult {
    let result = combat.outcome();
    let seconds = estimate_duration(result.timeline, rng);

    timeline.rounds.push(RoundStatusRow {
        match_id: match_id.to_owned(),
        round_id: snapshot.round_id.clone(),
        total_round_duration_seconds: seconds,
        winning_side: result.winner,
    });
    timeline.spikes.push(RoundSpikeStatusRow {
        match_id: match_id.to_owned(),
        round_id: snapshot.round_id.clone(),
        spike_planted: result.planted(),
        spike_defused: result.defused(),
    });
    timeline
        .performance
        .extend(aggregate_round(match_id, snapshot, combat));
    timeline
        .participants
        .extend(participant_rows(match_id, snapshot, combat));

    score.record(result.winner);
    debug!(
        round_id = %snapshot.round_id,
        winner = %result.winner,
        timeline = ?result.timeline,
        seconds,
        attacker_wins = score.attacker_wins,
        defender_wins = score.defender_wins,
        "round finished"
    );
    result
}

fn roster_rows(
    scheduled: &ScheduledMatch,
    teams: &TeamAssignment,
    opening: &SideRotation,
) -> Vec<RosterRow> {
    scheduled
        .participants
        .iter()
        .enumerate()
        .map(|(slot, p)| {
            let team = teams.team_of(slot);
            RosterRow {
                match_id: scheduled.match_id.clone(),
                match_date: scheduled.date,
                user_id: p.user.user_id,
                agent_id: p.agent.uuid.clone(),
                agent_name: p.agent.name.clone(),
                map_id: scheduled.map.uuid.clone(),
                map_name: scheduled.map.name.clone(),
                team,
                side: opening.side_of(team),
            }
        })
        .collect()
}

fn participant_rows(
    match_id: &str,
    snapshot: &RoundSnapshot,
    combat: &CombatState,
) -> Vec<RoundParticipantRow> {
    snapshot
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| RoundParticipantRow {
            match_id: match_id.to_owned(),
            round_id: snapshot.round_id.clone(),
            user_id: p.user_id,
            agent_name: p.agent.name.clone(),
            team: p.team,
            side: p.side,
            plants: u32::from(combat.planted_by() == Some(i)),
            defuses: u32::from(combat.defused_by() == Some(i)),
            kills: combat.kills(i),
            deaths: u32::from(combat.is_dead(i)),
        })
        .collect()
}
