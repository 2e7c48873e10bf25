//! Per-round (agent, opponent) statistics.
//!
//! Rows are the full cross join of attackers against defenders followed by defenders
//! against attackers, both in turn order. Values come from the round's ledger; pairs that
//! never traded (for instance an attacker eliminated before acting) report zeros.

use crate::{
    combat::{CombatState, RoundSnapshot},
    tables::AgentPerformanceRow,
    teams::Side,
};

/// Builds the performance rows of one resolved round.
pub fn aggregate_round(
    match_id: &str,
    snapshot: &RoundSnapshot,
    state: &CombatState,
) -> Vec<AgentPerformanceRow> {
    let attackers: Vec<usize> = snapshot.on_side(Side::Attacker).collect();
    let defenders: Vec<usize> = snapshot.on_side(Side::Defender).collect();

    let mut rows = Vec::with_capacity(2 * attackers.len() * defenders.len());
    for (actors, opponents) in [(&attackers, &defenders), (&defenders, &attackers)] {
        for &actor in actors {
            for &opponent in opponents {
                rows.push(row(match_id, snapshot, state, actor, opponent));
            }
        }
    }
    rows
}

fn row(
    match_id: &str,
    snapshot: &RoundSnapshot,
    state: &CombatState,
    actor: usize,
    opponent: usize,
) -> AgentPerformanceRow {
    let me = &snapshot.participants[actor];
    let stats = state.pair(actor, opponent);
    AgentPerformanceRow {
        match_id: match_id.to_owned(),
        round_id: snapshot.round_id.clone(),
        agent_name: me.agent.name.clone(),
        opponent_name: snapshot.participants[opponent].agent.name.clone(),
        is_attacker: me.side == Side::Attacker,
        is_defender: me.side == Side::Defender,
        head_hit: stats.hit.head,
        body_hit: stats.hit.body,
        leg_hit: stats.hit.leg,
        head_damage: stats.damage.head,
        body_damage: stats.damage.body,
        leg_damage: stats.damage.leg,
    }
}
