//! Round-scoped combat resolution.
//!
//! A [`CombatState`] is created fresh for every round and indexed by participant slot
//! (position in the [`RoundSnapshot`]), never by agent name, so two participants sharing
//! an agent cannot collide. Turns are resolved sequentially in snapshot order:
//!
//! - an attacker may plant the objective (once per round), a defender may defuse a
//!   planted objective (once per round);
//! - the acting participant then trades one exchange with every member of the opposing
//!   side, eliminated or not, using the health stored at the time of each exchange;
//! - a participant already eliminated when their turn comes does nothing. One eliminated
//!   during their own turn still trades with the remaining opponents: they take no more
//!   damage, but their hits are recorded and can still eliminate.
//!
//! Once every turn has run, [`CombatState::outcome`] decides the round.

use std::sync::Arc;

use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use serde::Serialize;
use tracing::trace;

use crate::{
    catalog::Agent,
    duration::ObjectiveTimeline,
    error::{Result, TimelineError},
    teams::{Side, Team},
};

/// Health every participant starts a round with.
pub const STARTING_HEALTH: u32 = 100;
/// Chance an attacker plants on their turn while the objective is not yet planted.
pub const PLANT_PROBABILITY: f64 = 0.7;
/// Chance a defender defuses on their turn while the objective is planted.
pub const DEFUSE_PROBABILITY: f64 = 0.2;
/// Dirichlet concentration for the head/body/leg split, mean roughly 50/35/15.
pub const HIT_ZONE_ALPHA: [f64; 3] = [5.0, 3.5, 1.5];

/// One participant as seen by a round.
#[derive(Debug, Clone)]
pub struct RoundParticipant {
    /// User playing this slot.
    pub user_id: u32,
    /// Agent the user picked for the match.
    pub agent: Arc<Agent>,
    /// Team for the whole match.
    pub team: Team,
    /// Side for this round.
    pub side: Side,
}

/// All participants of a round, in turn order.
#[derive(Debug, Clone)]
pub struct RoundSnapshot {
    /// `<match_id>-RNN`.
    pub round_id: String,
    /// Participants in turn order. Their index is the slot used by [`CombatState`].
    pub participants: Vec<RoundParticipant>,
}

impl RoundSnapshot {
    /// Snapshot positions of the participants on `side`, in turn order.
    pub fn on_side(&self, side: Side) -> impl Iterator<Item = usize> + '_ {
        self.participants
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.side == side)
            .map(|(i, _)| i)
    }
}

/// A magnitude split into head, body and leg components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HitZones {
    /// Head component.
    pub head: f64,
    /// Body component.
    pub body: f64,
    /// Leg component.
    pub leg: f64,
}

/// Ledger entry for an ordered (actor, opponent) pair.
///
/// `hit` is what the actor dealt to the opponent, `damage` what the actor received.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairStats {
    /// Dealt by the actor to the opponent.
    pub hit: HitZones,
    /// Received by the actor from the opponent.
    pub damage: HitZones,
}

/// Mutable bookkeeping for one round.
#[derive(Debug, Clone)]
pub struct CombatState {
    sides: Vec<Side>,
    health: Vec<u32>,
    kills: Vec<u32>,
    deaths: Vec<bool>,
    ledger: Vec<PairStats>,
    attackers_alive: u32,
    defenders_alive: u32,
    planted_by: Option<usize>,
    defused_by: Option<usize>,
}

impl CombatState {
    /// Fresh state: everyone at `starting_health`, no kills, an all-zero ledger covering
    /// every ordered pair (self-pairs included).
    pub fn new(sides: Vec<Side>, starting_health: u32) -> Self {
        let n = sides.len();
        let attackers_alive = sides.iter().filter(|s| **s == Side::Attacker).count() as u32;
        Self {
            health: vec![starting_health; n],
            kills: vec![0; n],
            deaths: vec![false; n],
            ledger: vec![PairStats::default(); n * n],
            attackers_alive,
            defenders_alive: n as u32 - attackers_alive,
            planted_by: None,
            defused_by: None,
            sides,
        }
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    /// True for a round without participants.
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    /// Side of `slot` this round.
    pub fn side(&self, slot: usize) -> Side {
        self.sides[slot]
    }

    /// Remaining health of `slot`, zero once eliminated.
    pub fn health(&self, slot: usize) -> u32 {
        self.health[slot]
    }

    /// Eliminations credited to `slot` this round.
    pub fn kills(&self, slot: usize) -> u32 {
        self.kills[slot]
    }

    /// True once `slot` has been eliminated.
    pub fn is_dead(&self, slot: usize) -> bool {
        self.deaths[slot]
    }

    /// Eliminations credited to everyone on `side`.
    pub fn side_kills(&self, side: Side) -> u32 {
        (0..self.len())
            .filter(|slot| self.sides[*slot] == side)
            .map(|slot| self.kills[slot])
            .sum()
    }

    /// Living participants on `side`.
    pub fn alive(&self, side: Side) -> u32 {
        match side {
            Side::Attacker => self.attackers_alive,
            Side::Defender => self.defenders_alive,
        }
    }

    /// Slot that planted the objective, if any.
    pub fn planted_by(&self) -> Option<usize> {
        self.planted_by
    }

    /// Slot that defused the objective, if any.
    pub fn defused_by(&self) -> Option<usize> {
        self.defused_by
    }

    /// Recorded exchange between `actor` and `opponent`.
    pub fn pair(&self, actor: usize, opponent: usize) -> PairStats {
        self.ledger[actor * self.len() + opponent]
    }

    fn record(&mut self, actor: usize, opponent: usize, stats: PairStats) {
        let n = self.len();
        self.ledger[actor * n + opponent] = stats;
    }

    /// Removes `victim` from the round and credits `killer`.
    pub fn eliminate(&mut self, victim: usize, killer: usize) {
        if self.deaths[victim] {
            return;
        }
        self.health[victim] = 0;
        self.deaths[victim] = true;
        self.kills[killer] += 1;
        match self.sides[victim] {
            Side::Attacker => self.attackers_alive -= 1,
            Side::Defender => self.defenders_alive -= 1,
        }
    }

    /// Applies `amount` to `slot`, eliminating it if the amount covers its remaining health.
    fn apply(&mut self, slot: usize, amount: u32, source: usize) {
        let health = self.health[slot];
        if amount >= health && health > 0 {
            self.eliminate(slot, source);
        } else {
            self.health[slot] = health.saturating_sub(amount);
        }
    }

    /// Decides the round from the objective state and the survivors.
    ///
    /// A planted objective decides on its own: defused means defenders win, otherwise it
    /// detonates and attackers win. Without a plant, attackers need strictly more
    /// survivors; anything else runs out the clock in the defenders' favor.
    pub fn outcome(&self) -> RoundResult {
        let (winner, timeline) = match (self.planted_by, self.defused_by) {
            (Some(_), Some(_)) => (Side::Defender, ObjectiveTimeline::Defused),
            (Some(_), None) => (Side::Attacker, ObjectiveTimeline::Detonated),
            (None, _) if self.attackers_alive > self.defenders_alive => {
                (Side::Attacker, ObjectiveTimeline::Eliminated)
            }
            (None, _) => (Side::Defender, ObjectiveTimeline::TimerExpired),
        };
        RoundResult { winner, timeline }
    }
}

/// Decided round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    /// Side credited with the round.
    pub winner: Side,
    /// How the round ended, which also selects the duration branch.
    pub timeline: ObjectiveTimeline,
}

impl RoundResult {
    /// The objective was planted at some point.
    pub fn planted(&self) -> bool {
        matches!(
            self.timeline,
            ObjectiveTimeline::Detonated | ObjectiveTimeline::Defused
        )
    }

    /// The objective was planted and then defused.
    pub fn defused(&self) -> bool {
        self.timeline == ObjectiveTimeline::Defused
    }

    /// The planted objective went off.
    pub fn detonated(&self) -> bool {
        self.timeline == ObjectiveTimeline::Detonated
    }

    /// Set when the clock ran out, including a detonation at the end of the fuse.
    pub fn timer_expired(&self) -> bool {
        matches!(
            self.timeline,
            ObjectiveTimeline::TimerExpired | ObjectiveTimeline::Detonated
        )
    }
}

/// Resolves the turns of a round.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    zones: Dirichlet<f64>,
    starting_health: u32,
}

impl CombatResolver {
    /// Resolver with [`STARTING_HEALTH`] and the [`HIT_ZONE_ALPHA`] split.
    pub fn new() -> Result<Self> {
        Self::with_starting_health(STARTING_HEALTH)
    }

    /// Resolver where everyone starts a round with `starting_health`.
    ///
    /// # Errors
    /// [`TimelineError::Validation`] if the hit-zone distribution cannot be built.
    pub fn with_starting_health(starting_health: u32) -> Result<Self> {
        let zones = Dirichlet::new(&HIT_ZONE_ALPHA[..]).map_err(|e| {
            TimelineError::Validation(format!("invalid hit zone distribution: {e:?}"))
        })?;
        Ok(Self {
            zones,
            starting_health,
        })
    }

    /// Runs every turn of the round in snapshot order and returns the final state.
    ///
    /// # Errors
    /// [`TimelineError::Validation`] if either side is empty.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        snapshot: &RoundSnapshot,
        rng: &mut R,
    ) -> Result<CombatState> {
        let sides: Vec<Side> = snapshot.participants.iter().map(|p| p.side).collect();
        let mut state = CombatState::new(sides, self.starting_health);
        if state.alive(Side::Attacker) == 0 || state.alive(Side::Defender) == 0 {
            return Err(TimelineError::Validation(format!(
                "invalid team composition: {} attackers, {} defenders",
                state.alive(Side::Attacker),
                state.alive(Side::Defender)
            )));
        }

        for actor in 0..state.len() {
            self.take_turn(&mut state, actor, rng);
        }
        Ok(state)
    }

    /// Resolves the turn of `actor`.
    pub fn take_turn<R: Rng + ?Sized>(&self, state: &mut CombatState, actor: usize, rng: &mut R) {
        if state.is_dead(actor) {
            trace!(actor, "eliminated before acting");
            return;
        }

        let side = state.side(actor);
        match side {
            Side::Attacker => {
                if state.planted_by.is_none() && rng.gen_bool(PLANT_PROBABILITY) {
                    trace!(actor, "objective planted");
                    state.planted_by = Some(actor);
                }
            }
            Side::Defender => {
                if state.planted_by.is_some()
                    && state.defused_by.is_none()
                    && rng.gen_bool(DEFUSE_PROBABILITY)
                {
                    trace!(actor, "objective defused");
                    state.defused_by = Some(actor);
                }
            }
        }

        for opponent in 0..state.len() {
            if state.side(opponent) == side {
                continue;
            }
            self.exchange(state, actor, opponent, rng);
        }
    }

    fn exchange<R: Rng + ?Sized>(
        &self,
        state: &mut CombatState,
        actor: usize,
        opponent: usize,
        rng: &mut R,
    ) {
        let hit = rng.gen_range(0..=state.health(opponent));
        let damage = rng.gen_range(0..=state.health(actor));
        let stats = PairStats {
            hit: self.split(hit, rng),
            damage: self.split(damage, rng),
        };
        state.record(actor, opponent, stats);
        trace!(actor, opponent, hit, damage, "exchange");

        state.apply(actor, damage, opponent);
        state.apply(opponent, hit, actor);
    }

    /// Splits `magnitude` into head/body/leg. Head and body shares are rounded to two
    /// decimals of a percent; leg takes the remainder.
    fn split<R: Rng + ?Sized>(&self, magnitude: u32, rng: &mut R) -> HitZones {
        let sample = self.zones.sample(rng);
        let head_pct = (sample[0] * 10_000.0).round() / 100.0;
        let body_pct = (sample[1] * 10_000.0).round() / 100.0;
        let leg_pct = 100.0 - head_pct - body_pct;
        let value = f64::from(magnitude);
        HitZones {
            head: value * head_pct / 100.0,
            body: value * body_pct / 100.0,
            leg: value * leg_pct / 100.0,
        }
    }
}
