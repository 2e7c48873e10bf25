//! Output tables.
//!
//! Each simulated match yields a [`MatchTimeline`]; the generator concatenates them, in
//! match sequence order, into a [`Timeline`]. Rows are plain `Serialize` structs so any
//! tabular sink works (the crate ships a CSV writer in [`io`](crate::io)).

use serde::Serialize;
use time::Date;

use crate::{
    match_runner::MatchState,
    teams::{Side, Team},
};

/// One participant of one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterRow {
    /// Match the row belongs to.
    pub match_id: String,
    /// Simulated day of the match.
    pub match_date: Date,
    /// Participant.
    pub user_id: u32,
    /// Catalog uuid of the agent played.
    pub agent_id: String,
    /// Agent display name.
    pub agent_name: String,
    /// Catalog uuid of the map.
    pub map_id: String,
    /// Map display name.
    pub map_name: String,
    /// Team for the whole match.
    pub team: Team,
    /// Side in the first round.
    pub side: Side,
}

/// Final score of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStatusRow {
    /// Match identifier.
    pub match_id: String,
    /// Rounds won by whichever team was attacking that round.
    pub attacker_round_wins: u32,
    /// Rounds won by whichever team was defending that round.
    pub defender_round_wins: u32,
    /// Rounds simulated before the match ended.
    pub rounds_played: u32,
    /// Final state, never `in_progress`.
    pub outcome: MatchState,
}

/// Duration and winner of one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStatusRow {
    /// Match identifier.
    pub match_id: String,
    /// `<match_id>-RNN`.
    pub round_id: String,
    /// Estimated from how the objective played out.
    pub total_round_duration_seconds: f64,
    /// Side credited with the round.
    pub winning_side: Side,
}

/// Head/body/leg hits and damage for one (agent, opponent) pair in one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentPerformanceRow {
    /// Match identifier.
    pub match_id: String,
    /// Round identifier.
    pub round_id: String,
    /// Acting agent.
    pub agent_name: String,
    /// Agent on the other side of the pair.
    pub opponent_name: String,
    /// The acting agent attacked this round.
    pub is_attacker: bool,
    /// The acting agent defended this round.
    pub is_defender: bool,
    /// Dealt to the opponent, by zone.
    pub head_hit: f64,
    /// Body share of the hit.
    pub body_hit: f64,
    /// Leg share of the hit.
    pub leg_hit: f64,
    /// Received from the opponent, by zone.
    pub head_damage: f64,
    /// Body share of the damage.
    pub body_damage: f64,
    /// Leg share of the damage.
    pub leg_damage: f64,
}

/// Objective state at the end of one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSpikeStatusRow {
    /// Match identifier.
    pub match_id: String,
    /// Round identifier.
    pub round_id: String,
    /// The objective was planted.
    pub spike_planted: bool,
    /// Only ever set together with `spike_planted`.
    pub spike_defused: bool,
}

/// What one participant did in one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundParticipantRow {
    /// Match identifier.
    pub match_id: String,
    /// Round identifier.
    pub round_id: String,
    /// Participant.
    pub user_id: u32,
    /// Agent display name.
    pub agent_name: String,
    /// Team for the whole match.
    pub team: Team,
    /// Side this round.
    pub side: Side,
    /// 1 if this participant planted the objective.
    pub plants: u32,
    /// 1 if this participant defused the objective.
    pub defuses: u32,
    /// Eliminations credited this round.
    pub kills: u32,
    /// 1 if eliminated this round.
    pub deaths: u32,
}

/// Every table produced by a single match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTimeline {
    /// One row per participant.
    pub roster: Vec<RosterRow>,
    /// Final score.
    pub status: MatchStatusRow,
    /// One row per round.
    pub rounds: Vec<RoundStatusRow>,
    /// One row per round.
    pub spikes: Vec<RoundSpikeStatusRow>,
    /// Fifty rows per round.
    pub performance: Vec<AgentPerformanceRow>,
    /// Ten rows per round.
    pub participants: Vec<RoundParticipantRow>,
}

/// Concatenated tables of a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    /// `match_roster.csv`.
    pub match_roster: Vec<RosterRow>,
    /// `match_status.csv`.
    pub match_status: Vec<MatchStatusRow>,
    /// `round_status.csv`.
    pub round_status: Vec<RoundStatusRow>,
    /// `agent_perf_status.csv`.
    pub agent_performance: Vec<AgentPerformanceRow>,
    /// `round_spike_status.csv`.
    pub round_spike_status: Vec<RoundSpikeStatusRow>,
    /// `round_participants.csv`.
    pub round_participants: Vec<RoundParticipantRow>,
}

impl Timeline {
    /// Appends the tables of one match.
    pub fn append(&mut self, m: MatchTimeline) {
        self.match_roster.extend(m.roster);
        self.match_status.push(m.status);
        self.round_status.extend(m.rounds);
        self.agent_performance.extend(m.performance);
        self.round_spike_status.extend(m.spikes);
        self.round_participants.extend(m.participants);
    }

    /// Number of simulated matches.
    pub fn match_count(&self) -> usize {
        self.match_status.len()
    }

    /// True if no match was simulated.
    pub fn is_empty(&self) -> bool {
        self.match_status.is_empty()
    }
}
