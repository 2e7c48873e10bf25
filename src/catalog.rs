//! Read-only input tables: the user roster and the agent/map catalogs.
//!
//! These are produced by external collaborators (a reference-data provider and a
//! user generator) and are never mutated by the simulation. Matches share them through
//! `Arc` so scheduled matches can move to worker threads cheaply.

use std::{collections::HashSet, hash::Hash, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::error::{Result, TimelineError};

/// A simulated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Surrogate key.
    pub user_id: u32,
    /// Display name, e.g. `player0042`.
    pub username: String,
    /// Tagline, e.g. `#0420`.
    pub tagline: String,
    /// First day the user may be scheduled.
    pub join_date: Date,
    /// Starting competitive tier.
    pub rank_tier_id: String,
}

/// An agent (playable character) from the reference catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Catalog identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Duelist, Initiator, Controller or Sentinel.
    #[serde(default)]
    pub role: String,
    /// Only playable agents may be scheduled.
    #[serde(rename = "isPlayable", deserialize_with = "flexible_bool")]
    pub is_playable: bool,
    /// First ability. Ability names are informational only.
    #[serde(default)]
    pub ability1: String,
    /// Second ability.
    #[serde(default)]
    pub ability2: String,
    /// Third ability.
    #[serde(default)]
    pub ability3: String,
    /// Ultimate ability.
    #[serde(default)]
    pub ultimate: String,
}

impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for Agent {}

impl Hash for Agent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl Agent {
    /// Creates a playable agent with no role or ability metadata.
    pub fn playable(uuid: impl Into<String>, name: impl Into<String>) -> Agent {
        Agent {
            uuid: uuid.into(),
            name: name.into(),
            role: String::new(),
            is_playable: true,
            ability1: String::new(),
            ability2: String::new(),
            ability3: String::new(),
            ultimate: String::new(),
        }
    }
}

/// A map from the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    /// Catalog identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Icon URL, may be empty.
    #[serde(default)]
    pub icon: String,
}

impl Map {
    /// Creates a map without an icon.
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Map {
        Map {
            uuid: uuid.into(),
            name: name.into(),
            icon: String::new(),
        }
    }
}

/// All inputs the scheduler samples from.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    /// User roster.
    pub users: Vec<Arc<User>>,
    /// Agent catalog, playable or not.
    pub agents: Vec<Arc<Agent>>,
    /// Map catalog.
    pub maps: Vec<Arc<Map>>,
}

impl Catalogs {
    /// Wraps owned tables.
    pub fn new(users: Vec<User>, agents: Vec<Agent>, maps: Vec<Map>) -> Catalogs {
        Catalogs {
            users: users.into_iter().map(Arc::new).collect(),
            agents: agents.into_iter().map(Arc::new).collect(),
            maps: maps.into_iter().map(Arc::new).collect(),
        }
    }

    /// Agents flagged as usable in matches, in catalog order.
    pub fn playable_agents(&self) -> Vec<Arc<Agent>> {
        self.agents
            .iter()
            .filter(|agent| agent.is_playable)
            .cloned()
            .collect()
    }

    /// Checks the tables for malformed rows.
    ///
    /// # Errors
    /// [`TimelineError::Validation`] on duplicate identifiers or empty names.
    pub fn validate(&self) -> Result<()> {
        ensure_unique("user_id", self.users.iter().map(|u| u.user_id))?;
        ensure_unique("agent uuid", self.agents.iter().map(|a| a.uuid.as_str()))?;
        ensure_unique("map uuid", self.maps.iter().map(|m| m.uuid.as_str()))?;

        if let Some(agent) = self.agents.iter().find(|a| a.name.trim().is_empty()) {
            return Err(TimelineError::Validation(format!(
                "agent {} has an empty name",
                agent.uuid
            )));
        }
        if let Some(map) = self.maps.iter().find(|m| m.name.trim().is_empty()) {
            return Err(TimelineError::Validation(format!(
                "map {} has an empty name",
                map.uuid
            )));
        }
        Ok(())
    }
}

fn ensure_unique<K: Eq + Hash>(
    column: &str,
    keys: impl Iterator<Item = K>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(TimelineError::Validation(format!(
                "duplicate {column} in input table"
            )));
        }
    }
    Ok(())
}

/// Accepts the spellings pandas and hand-written CSVs use for booleans.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn user(id: u32) -> User {
        User {
            user_id: id,
            username: format!("player{id:04}"),
            tagline: "#0001".to_owned(),
            join_date: date!(2025 - 01 - 01),
            rank_tier_id: "unranked".to_owned(),
        }
    }

    #[test]
    fn test_playable_filter() {
        let mut benched = Agent::playable("a2", "Sova");
        benched.is_playable = false;
        let catalogs = Catalogs::new(
            vec![],
            vec![Agent::playable("a1", "Jett"), benched],
            vec![],
        );
        let playable = catalogs.playable_agents();
        assert_eq!(playable.len(), 1);
        assert_eq!(playable[0].name, "Jett");
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let catalogs = Catalogs::new(vec![user(1), user(1)], vec![], vec![]);
        assert!(matches!(
            catalogs.validate(),
            Err(TimelineError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_map_name_rejected() {
        let catalogs = Catalogs::new(vec![user(1)], vec![], vec![Map::new("m1", " ")]);
        assert!(catalogs.validate().is_err());
    }

    #[test]
    fn test_agents_compare_by_uuid() {
        assert_eq!(Agent::playable("a1", "Jett"), Agent::playable("a1", "Renamed"));
    }
}
