//! Team division and side rotation.
//!
//! A match's participants are split into two five-player teams once. Sides are then
//! derived from a [`SideRotation`]: a coin toss before the first round decides which team
//! attacks, and the rotation is swapped exactly once, before the side-swap round.

use std::fmt::Display;

use rand::{seq::index, Rng};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TimelineError};

/// Number of players on each team.
pub const TEAM_SIZE: usize = 5;

/// Team membership inside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Team {
    /// Team drawn first by the division.
    A,
    /// The remaining participants.
    B,
}

impl Team {
    /// The opposing team.
    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}

/// Per-round role of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Plants the objective.
    Attacker,
    /// Guards and defuses the objective.
    Defender,
}

impl Side {
    /// The opposing side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Attacker => write!(f, "attacker"),
            Side::Defender => write!(f, "defender"),
        }
    }
}

/// Team of every participant slot, in roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignment {
    teams: Vec<Team>,
}

impl TeamAssignment {
    /// Team of the participant in `slot`.
    pub fn team_of(&self, slot: usize) -> Team {
        self.teams[slot]
    }

    /// Number of participants covered.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// True if no participant is covered.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Slots on `team`, in roster order.
    pub fn members(&self, team: Team) -> impl Iterator<Item = usize> + '_ {
        self.teams
            .iter()
            .enumerate()
            .filter(move |(_, t)| **t == team)
            .map(|(slot, _)| slot)
    }

    /// Slots ordered team A first, then team B. This is the turn order inside a round.
    pub fn turn_order(&self) -> Vec<usize> {
        self.members(Team::A).chain(self.members(Team::B)).collect()
    }
}

/// Picks [`TEAM_SIZE`] roster rows uniformly without replacement as team A; the rest
/// form team B.
///
/// # Errors
/// [`TimelineError::Validation`] if fewer than [`TEAM_SIZE`] participants are supplied.
pub fn divide_teams<R: Rng + ?Sized>(participants: usize, rng: &mut R) -> Result<TeamAssignment> {
    if participants < TEAM_SIZE {
        return Err(TimelineError::Validation(format!(
            "need at least {TEAM_SIZE} players for team division, got {participants}"
        )));
    }

    let mut teams = vec![Team::B; participants];
    for slot in index::sample(rng, participants, TEAM_SIZE) {
        teams[slot] = Team::A;
    }
    debug!(participants, "teams divided");
    Ok(TeamAssignment { teams })
}

/// Which team is attacking. Computed once per match and carried forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideRotation {
    attacking: Team,
}

impl SideRotation {
    /// Starts a rotation with `attacking` on attack.
    pub fn new(attacking: Team) -> Self {
        Self { attacking }
    }

    /// 50/50 choice of the team that attacks first.
    pub fn coin_toss<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let attacking = if rng.gen_bool(0.5) { Team::A } else { Team::B };
        Self::new(attacking)
    }

    /// Every participant changes side.
    pub fn swap(&mut self) {
        self.attacking = self.attacking.other();
    }

    /// Team currently on attack.
    pub fn attacking_team(&self) -> Team {
        self.attacking
    }

    /// Current side of `team`.
    pub fn side_of(&self, team: Team) -> Side {
        if team == self.attacking {
            Side::Attacker
        } else {
            Side::Defender
        }
    }
}
