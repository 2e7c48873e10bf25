use tracing::trace;

use crate::schedule::ScheduledMatch;
use crate::tables::{MatchTimeline, Timeline};
use std::collections::VecDeque;

/// Hands scheduled matches to a bounded number of workers and reassembles their tables
/// in schedule order, whatever order they finish in.
pub struct MatchDispatcher {
    pending: VecDeque<ScheduledMatch>,
    finished: Vec<Option<MatchTimeline>>,
    first_sequence: u64,
    free_workers: usize,
    running_matches: usize,
}

impl MatchDispatcher {
    pub fn new(matches: Vec<ScheduledMatch>, workers: usize) -> Self {
        let first_sequence = matches.first().map_or(1, |m| m.sequence);
        MatchDispatcher {
            finished: vec![None; matches.len()],
            pending: matches.into(),
            first_sequence,
            free_workers: workers.max(1),
            running_matches: 0,
        }
    }

    /// Matches to start now, as many as there are idle workers.
    pub fn advance(&mut self) -> Vec<ScheduledMatch> {
        let mut matches_to_run = vec![];
        while self.free_workers > 0 {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            self.free_workers -= 1;
            matches_to_run.push(next);
        }
        self.running_matches += matches_to_run.len();
        trace!(
            started = matches_to_run.len(),
            running = self.running_matches,
            pending = self.pending.len()
        );
        matches_to_run
    }

    /// Stores the tables of a finished match and returns the matches that can start now.
    pub fn on_result(&mut self, sequence: u64, timeline: MatchTimeline) -> Vec<ScheduledMatch> {
        let index = (sequence - self.first_sequence) as usize;
        self.finished[index] = Some(timeline);
        self.running_matches -= 1;
        self.free_workers += 1;
        self.advance()
    }

    /// Every match ran and finished.
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.running_matches == 0
    }

    /// Concatenates the collected tables in schedule order.
    pub fn into_timeline(self) -> Timeline {
        let mut timeline = Timeline::default();
        for m in self.finished.into_iter().flatten() {
            timeline.append(m);
        }
        timeline
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        catalog::Map,
        match_runner::MatchState,
        schedule::match_id,
        tables::MatchStatusRow,
    };
    use time::macros::date;

    fn scheduled(sequence: u64) -> ScheduledMatch {
        ScheduledMatch {
            sequence,
            match_id: match_id(sequence),
            date: date!(2025 - 01 - 01),
            map: Arc::new(Map::new("m", "Ascent")),
            participants: vec![],
        }
    }

    fn finished(sequence: u64) -> MatchTimeline {
        MatchTimeline {
            roster: vec![],
            status: MatchStatusRow {
                match_id: match_id(sequence),
                attacker_round_wins: 13,
                defender_round_wins: 0,
                rounds_played: 13,
                outcome: MatchState::AttackersWon,
            },
            rounds: vec![],
            spikes: vec![],
            performance: vec![],
            participants: vec![],
        }
    }

    #[test]
    fn test_worker_bound() {
        let mut dispatcher = MatchDispatcher::new((1..=5).map(scheduled).collect(), 2);
        let started = dispatcher.advance();
        assert_eq!(started.len(), 2);
        assert!(dispatcher.advance().is_empty());

        let next = dispatcher.on_result(2, finished(2));
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].sequence, 3);
        assert!(!dispatcher.is_finished());
    }

    #[test]
    fn test_results_reordered() {
        let mut dispatcher = MatchDispatcher::new((1..=3).map(scheduled).collect(), 3);
        assert_eq!(dispatcher.advance().len(), 3);
        for sequence in [3, 1, 2] {
            assert!(dispatcher.on_result(sequence, finished(sequence)).is_empty());
        }
        assert!(dispatcher.is_finished());

        let timeline = dispatcher.into_timeline();
        let ids: Vec<_> = timeline.match_status.iter().map(|s| s.match_id.as_str()).collect();
        assert_eq!(ids, ["MATCH_000001", "MATCH_000002", "MATCH_000003"]);
    }

    #[test]
    fn test_zero_workers_still_progress() {
        let mut dispatcher = MatchDispatcher::new(vec![scheduled(1)], 0);
        assert_eq!(dispatcher.advance().len(), 1);
    }

    #[test]
    fn test_empty_schedule_is_finished() {
        let dispatcher = MatchDispatcher::new(vec![], 4);
        assert!(dispatcher.is_finished());
        assert!(dispatcher.into_timeline().is_empty());
    }
}
