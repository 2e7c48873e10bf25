//! Round duration estimation from the objective timeline.
//!
//! Every branch draws independent uniforms and clamps to a 15 second floor:
//!
//! | timeline                       | draw                                  | ceiling |
//! |--------------------------------|---------------------------------------|---------|
//! | no plant, timer expired        | `U[90, 100]`                          | 100     |
//! | no plant, ended by elimination | `U[15, 100]`                          | 100     |
//! | planted, detonated             | `U[20, 100]` plant + `U[35, 45]` fuse | 145     |
//! | planted, defused               | `U[20, 90]` plant + `U[5, 35]` defuse | 140     |

use rand::Rng;
use serde::Serialize;

use crate::error::{Result, TimelineError};

/// Shortest round the estimator reports, in seconds.
pub const MIN_ROUND_SECONDS: f64 = 15.0;

/// How a round's objective played out. Only consistent combinations are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveTimeline {
    /// Never planted, round ran out the clock.
    TimerExpired,
    /// Never planted, round ended on eliminations.
    Eliminated,
    /// Planted and never defused.
    Detonated,
    /// Planted then defused.
    Defused,
}

impl ObjectiveTimeline {
    /// Builds a timeline from the raw round flags.
    ///
    /// # Errors
    /// [`TimelineError::Validation`] when the flags contradict each other (a defuse or
    /// detonation without a plant, or a plant that neither detonated nor was defused).
    pub fn from_flags(
        planted: bool,
        defused: bool,
        detonated: bool,
        timer_expired: bool,
    ) -> Result<Self> {
        match (planted, defused, detonated) {
            (false, false, false) if timer_expired => Ok(Self::TimerExpired),
            (false, false, false) => Ok(Self::Eliminated),
            (true, false, true) => Ok(Self::Detonated),
            (true, true, false) => Ok(Self::Defused),
            _ => Err(TimelineError::Validation(format!(
                "inconsistent objective flags: planted={planted} defused={defused} \
                 detonated={detonated} timer_expired={timer_expired}"
            ))),
        }
    }

    /// Longest duration this timeline can produce.
    pub fn max_seconds(self) -> f64 {
        match self {
            Self::TimerExpired | Self::Eliminated => 100.0,
            Self::Detonated => 145.0,
            Self::Defused => 140.0,
        }
    }
}

/// Draws the elapsed time of a round in seconds.
pub fn estimate_duration<R: Rng + ?Sized>(timeline: ObjectiveTimeline, rng: &mut R) -> f64 {
    let seconds = match timeline {
        ObjectiveTimeline::TimerExpired => rng.gen_range(90.0..=100.0),
        ObjectiveTimeline::Eliminated => rng.gen_range(MIN_ROUND_SECONDS..=100.0),
        ObjectiveTimeline::Detonated => {
            let until_plant = rng.gen_range(20.0..=100.0);
            let fuse = rng.gen_range(35.0..=45.0);
            until_plant + fuse
        }
        ObjectiveTimeline::Defused => {
            let until_plant = rng.gen_range(20.0..=90.0);
            let until_defuse = rng.gen_range(5.0..=35.0);
            until_plant + until_defuse
        }
    };
    seconds.clamp(MIN_ROUND_SECONDS, timeline.max_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn any_timeline() -> impl Strategy<Value = ObjectiveTimeline> {
        prop_oneof![
            Just(ObjectiveTimeline::TimerExpired),
            Just(ObjectiveTimeline::Eliminated),
            Just(ObjectiveTimeline::Detonated),
            Just(ObjectiveTimeline::Defused),
        ]
    }

    proptest! {
        #[test]
        fn duration_within_branch_bounds(timeline in any_timeline(), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let seconds = estimate_duration(timeline, &mut rng);
            prop_assert!(seconds >= MIN_ROUND_SECONDS);
            prop_assert!(seconds <= timeline.max_seconds());
            if timeline == ObjectiveTimeline::TimerExpired {
                prop_assert!(seconds >= 90.0);
            }
        }
    }

    #[test]
    fn test_defused_rounds_keep_their_branch() {
        // plant U[20,90] + defuse U[5,35] is at least 25s, the generic 80..100 fallback is not used
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut saw_short = false;
        for _ in 0..500 {
            let seconds = estimate_duration(ObjectiveTimeline::Defused, &mut rng);
            assert!((25.0..=125.0).contains(&seconds));
            saw_short |= seconds < 80.0;
        }
        assert!(saw_short);
    }

    #[test]
    fn test_flags() {
        assert_eq!(
            ObjectiveTimeline::from_flags(false, false, false, true).unwrap(),
            ObjectiveTimeline::TimerExpired
        );
        assert_eq!(
            ObjectiveTimeline::from_flags(true, false, true, true).unwrap(),
            ObjectiveTimeline::Detonated
        );
        assert!(ObjectiveTimeline::from_flags(false, true, false, false).is_err());
        assert!(ObjectiveTimeline::from_flags(true, false, false, false).is_err());
    }
}
