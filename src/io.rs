//! CSV boundary.
//!
//! Reads the input tables (`users_dim.csv`, `agents_dim.csv`, `maps_dim.csv`) and writes
//! every output table of a [`Timeline`] to a directory. Dates use `YYYY-MM-DD`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, instrument};

use crate::{
    catalog::{Agent, Catalogs, Map, User},
    error::TimelineError,
    tables::Timeline,
};

/// User roster input, optional.
pub const USERS_FILE: &str = "users_dim.csv";
/// Agent catalog input.
pub const AGENTS_FILE: &str = "agents_dim.csv";
/// Map catalog input.
pub const MAPS_FILE: &str = "maps_dim.csv";

/// Reads every row of a CSV file with a header line.
pub fn read_table<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<Vec<T>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(TimelineError::from)
        .with_context(|| format!("cannot open '{}'", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(TimelineError::from)
        .with_context(|| format!("malformed row in '{}'", path.display()))?;
    Ok(rows)
}

/// Writes `rows` to `path` with a header line, replacing any existing file.
pub fn write_table<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .map_err(TimelineError::from)
        .with_context(|| format!("cannot create '{}'", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(TimelineError::from)
            .with_context(|| format!("cannot write row to '{}'", path.display()))?;
    }
    writer
        .flush()
        .map_err(TimelineError::from)
        .with_context(|| format!("cannot flush '{}'", path.display()))?;
    Ok(())
}

/// Loads agents and maps from `directory`. Users are read too if `users_dim.csv` exists,
/// otherwise the returned catalogs have an empty roster for the caller to fill.
#[instrument]
pub fn read_catalogs(directory: &Path) -> anyhow::Result<Catalogs> {
    let users_path = directory.join(USERS_FILE);
    let users: Vec<User> = if users_path.is_file() {
        read_table(&users_path)?
    } else {
        info!(path = %users_path.display(), "no user roster found");
        vec![]
    };
    let agents: Vec<Agent> = read_table(directory.join(AGENTS_FILE))?;
    let maps: Vec<Map> = read_table(directory.join(MAPS_FILE))?;
    info!(
        users = users.len(),
        agents = agents.len(),
        maps = maps.len(),
        "catalogs loaded"
    );
    Ok(Catalogs::new(users, agents, maps))
}

/// Writes every table of `timeline` into `directory`, creating it if needed. Returns the
/// written paths.
#[instrument(skip(timeline))]
pub fn write_timeline(directory: &Path, timeline: &Timeline) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(directory)
        .with_context(|| format!("cannot create '{}'", directory.display()))?;

    let written = vec![
        write_output(directory, "match_roster.csv", &timeline.match_roster)?,
        write_output(directory, "match_status.csv", &timeline.match_status)?,
        write_output(directory, "round_status.csv", &timeline.round_status)?,
        write_output(directory, "agent_perf_status.csv", &timeline.agent_performance)?,
        write_output(directory, "round_spike_status.csv", &timeline.round_spike_status)?,
        write_output(directory, "round_participants.csv", &timeline.round_participants)?,
    ];
    Ok(written)
}

fn write_output<T: Serialize>(directory: &Path, name: &str, rows: &[T]) -> anyhow::Result<PathBuf> {
    let path = directory.join(name);
    write_table(&path, rows)?;
    info!(path = %path.display(), rows = rows.len(), "table written");
    Ok(path)
}
