use std::collections::{HashMap, HashSet};

use match_timeline::{
    io::write_timeline,
    match_runner::MatchState,
    prelude::*,
    teams::{Side, Team},
};
use proptest::prelude::{any, proptest, ProptestConfig};
use time::macros::date;

fn users(count: u32) -> Vec<User> {
    (1..=count)
        .map(|id| User {
            user_id: id,
            username: format!("player{id:04}"),
            tagline: format!("#{id:04}"),
            join_date: date!(2024 - 12 - 01),
            rank_tier_id: "unranked".to_owned(),
        })
        .collect()
}

fn catalogs(user_count: u32) -> Catalogs {
    let agents = [
        "Jett", "Sova", "Sage", "Omen", "Brimstone", "Phoenix", "Raze", "Cypher", "Viper",
        "Reyna", "Killjoy", "Skye",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Agent::playable(format!("agent-{i}"), *name))
    .collect();
    let maps = vec![Map::new("m-ascent", "Ascent"), Map::new("m-bind", "Bind")];
    Catalogs::new(users(user_count), agents, maps)
}

fn config(seed: u64) -> Configuration {
    Configuration::new()
        .with_verbose(false)
        .with_seed(seed)
        .with_matches_per_day(1)
        .with_date_range(date!(2025 - 01 - 01), date!(2025 - 01 - 02))
        .with_workers(2)
}

fn generate(seed: u64) -> Timeline {
    Generator::new(config(seed))
        .unwrap()
        .generate(&catalogs(12))
        .unwrap()
}

fn check_invariants(timeline: &Timeline) {
    let rules = MatchRules::default();

    for status in &timeline.match_status {
        let roster: Vec<_> = timeline
            .match_roster
            .iter()
            .filter(|r| r.match_id == status.match_id)
            .collect();
        assert_eq!(roster.len(), 10);
        let users: HashSet<_> = roster.iter().map(|r| r.user_id).collect();
        let agents: HashSet<_> = roster.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(users.len(), 10, "{} has a repeated user", status.match_id);
        assert_eq!(agents.len(), 10, "{} has a repeated agent", status.match_id);
        assert_eq!(roster.iter().filter(|r| r.team == Team::A).count(), 5);
        let a_side = roster.iter().find(|r| r.team == Team::A).unwrap().side;
        assert!(roster
            .iter()
            .all(|r| (r.team == Team::A) == (r.side == a_side)));

        assert!(status.attacker_round_wins <= rules.rounds_to_win);
        assert!(status.defender_round_wins <= rules.rounds_to_win);
        assert_eq!(
            status.attacker_round_wins + status.defender_round_wins,
            status.rounds_played
        );
        assert!(status.rounds_played <= rules.max_rounds);
        let expected = if status.attacker_round_wins == rules.rounds_to_win {
            MatchState::AttackersWon
        } else if status.defender_round_wins == rules.rounds_to_win {
            MatchState::DefendersWon
        } else {
            MatchState::Unresolved
        };
        assert_eq!(status.outcome, expected);

        let rounds: Vec<_> = timeline
            .round_status
            .iter()
            .filter(|r| r.match_id == status.match_id)
            .collect();
        assert_eq!(rounds.len() as u32, status.rounds_played);
        let attacker_wins = rounds
            .iter()
            .filter(|r| r.winning_side == Side::Attacker)
            .count() as u32;
        assert_eq!(attacker_wins, status.attacker_round_wins);
    }

    let spikes: HashMap<_, _> = timeline
        .round_spike_status
        .iter()
        .map(|s| (s.round_id.as_str(), s))
        .collect();
    assert_eq!(spikes.len(), timeline.round_status.len());
    for round in &timeline.round_status {
        let spike = spikes[round.round_id.as_str()];
        assert!(!spike.spike_defused || spike.spike_planted);
        let max = match (spike.spike_planted, spike.spike_defused) {
            (false, _) => 100.0,
            (true, true) => 140.0,
            (true, false) => 145.0,
        };
        let seconds = round.total_round_duration_seconds;
        assert!(
            (15.0..=max).contains(&seconds),
            "{} lasted {seconds}s",
            round.round_id
        );
    }

    let rounds = timeline.round_status.len();
    assert_eq!(timeline.agent_performance.len(), rounds * 50);
    assert_eq!(timeline.round_participants.len(), rounds * 10);
    for perf in &timeline.agent_performance {
        assert_ne!(perf.is_attacker, perf.is_defender);
    }
}

#[test]
fn test_two_day_schedule() {
    let timeline = generate(7);
    assert_eq!(timeline.match_count(), 2);
    assert_eq!(timeline.match_roster.len(), 20);
    assert_eq!(timeline.match_status[0].match_id, "MATCH_000001");
    assert_eq!(timeline.match_status[1].match_id, "MATCH_000002");
    check_invariants(&timeline);
}

#[test]
fn test_replay_from_seed() {
    assert_eq!(generate(2024), generate(2024));
}

#[test]
fn test_day_without_enough_users_is_skipped() {
    let mut late = users(12);
    for user in late.iter_mut().skip(3) {
        user.join_date = date!(2025 - 01 - 02);
    }
    let base = catalogs(0);
    let catalogs = Catalogs::new(
        late,
        base.agents.iter().map(|a| (**a).clone()).collect(),
        base.maps.iter().map(|m| (**m).clone()).collect(),
    );
    let timeline = Generator::new(config(5))
        .unwrap()
        .generate(&catalogs)
        .unwrap();
    assert_eq!(timeline.match_count(), 1);
    assert!(timeline
        .match_roster
        .iter()
        .all(|r| r.match_date == date!(2025 - 01 - 02)));
}

#[test]
fn test_rejects_duplicate_users() {
    let mut catalogs = catalogs(12);
    let first = catalogs.users[0].clone();
    catalogs.users.push(first);
    let err = Generator::new(config(1))
        .unwrap()
        .generate(&catalogs)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TimelineError>(),
        Some(TimelineError::Validation(_))
    ));
}

#[test]
fn test_write_csv_tables() {
    let timeline = generate(11);
    let dir = tempfile::tempdir().unwrap();
    let written = write_timeline(dir.path(), &timeline).unwrap();
    assert_eq!(written.len(), 6);

    let mut reader = csv::Reader::from_path(dir.path().join("match_roster.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "match_id");
    assert_eq!(&headers[1], "match_date");
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 20);
    assert_eq!(&rows[0][1], "2025-01-01");

    let status = std::fs::read_to_string(dir.path().join("match_status.csv")).unwrap();
    assert_eq!(status.lines().count(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_any_seed_keeps_invariants(seed in any::<u64>()) {
        check_invariants(&generate(seed));
    }
}
