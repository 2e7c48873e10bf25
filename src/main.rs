use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use match_timeline::{
    io::{read_catalogs, write_table, write_timeline, USERS_FILE},
    prelude::*,
    users::synthetic_users,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

const SYNTHETIC_USERS: u32 = 1000;
const UNRANKED_TIER: &str = "unranked";

fn main() -> anyhow::Result<()> {
    let result = run();
    if let Err(err) = &result {
        error!("{err:?}");
    }
    result
}

fn run() -> anyhow::Result<()> {
    let mut config = Configuration::from_env();
    // fixed now so the synthetic roster replays with the run
    let seed = config.seed().unwrap_or_else(rand::random);
    config = config.with_seed(seed);

    let data_dir =
        PathBuf::from(std::env::var("TIMELINE_DATA_DIR").unwrap_or_else(|_| "data".into()));
    let generator = Generator::new(config)?;

    let mut catalogs = read_catalogs(&data_dir)?;
    if catalogs.users.is_empty() {
        let (first_join, last_join) = config.date_range();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        // match streams start at 1, the schedule uses 0
        rng.set_stream(u64::MAX);
        let users =
            synthetic_users(SYNTHETIC_USERS, first_join, last_join, UNRANKED_TIER, &mut rng)
                .context("cannot generate the user roster")?;
        write_table(data_dir.join(USERS_FILE), &users)?;
        info!(users = users.len(), "synthetic user roster written");
        catalogs.users = users.into_iter().map(Arc::new).collect();
    }

    let timeline = generator.generate(&catalogs)?;
    for path in write_timeline(&data_dir, &timeline)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}
