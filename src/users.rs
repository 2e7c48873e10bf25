//! Synthetic user roster.
//!
//! Stands in for the external user generator when no roster is supplied: usernames
//! `player0001..`, random four-digit taglines, join dates uniform over a range and a
//! shared starting rank tier.

use rand::Rng;
use time::{Date, Duration};

use crate::{
    catalog::User,
    error::{Result, TimelineError},
};

/// Generates `count` users who joined between `first_join` and `last_join` (inclusive).
///
/// # Errors
/// [`TimelineError::Validation`] if `first_join` is after `last_join`.
pub fn synthetic_users<R: Rng + ?Sized>(
    count: u32,
    first_join: Date,
    last_join: Date,
    rank_tier_id: &str,
    rng: &mut R,
) -> Result<Vec<User>> {
    let span = (last_join - first_join).whole_days();
    if span < 0 {
        return Err(TimelineError::Validation(format!(
            "first join date {first_join} is after last join date {last_join}"
        )));
    }

    let users = (1..=count)
        .map(|user_id| User {
            user_id,
            username: format!("player{user_id:04}"),
            tagline: format!("#{:04}", rng.gen_range(0..10_000)),
            join_date: first_join + Duration::days(rng.gen_range(0..=span)),
            rank_tier_id: rank_tier_id.to_owned(),
        })
        .collect();
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use time::macros::date;

    #[test]
    fn test_synthetic_users() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let start = date!(2025 - 01 - 01);
        let end = date!(2025 - 03 - 01);
        let users = synthetic_users(1000, start, end, "unranked", &mut rng).unwrap();
        assert_eq!(users.len(), 1000);
        assert_eq!(users[0].username, "player0001");
        assert_eq!(users[999].username, "player1000");
        assert_eq!(users[41].user_id, 42);
        for user in &users {
            assert!(user.join_date >= start && user.join_date <= end);
            assert_eq!(user.tagline.len(), 5);
            assert!(user.tagline.starts_with('#'));
            assert_eq!(user.rank_tier_id, "unranked");
        }
    }

    #[test]
    fn test_single_day_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let day = date!(2025 - 01 - 01);
        let users = synthetic_users(5, day, day, "unranked", &mut rng).unwrap();
        assert!(users.iter().all(|u| u.join_date == day));
    }

    #[test]
    fn test_reversed_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(synthetic_users(
            5,
            date!(2025 - 02 - 01),
            date!(2025 - 01 - 01),
            "unranked",
            &mut rng
        )
        .is_err());
    }
}
