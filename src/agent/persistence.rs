//! Saving and loading trained agents
//!
//! A trained agent is a single JSON document: the hyperparameters it was
//! trained with, how long it trained, and the Q-table itself. The table is
//! written as a sorted map keyed by the packed state bits so that saves are
//! deterministic and diffs stay readable.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::encoding::StateKey;
use super::qlearning::{QLearningAgent, QValues};
use super::AgentConfig;
use crate::error::PersistenceError;

/// Metadata describing a saved agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    /// Crate version that wrote the file
    pub version: String,
    /// Episodes completed during training
    pub episodes_trained: usize,
    /// Distinct states in the table
    pub states_seen: usize,
}

#[derive(Serialize, Deserialize)]
struct SavedAgent {
    version: String,
    config: AgentConfig,
    episodes_trained: usize,
    q_table: BTreeMap<u16, QValues>,
}

/// Save a trained agent to a JSON file, creating parent directories as needed
pub fn save_agent(agent: &QLearningAgent, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let saved = SavedAgent {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: agent.config().clone(),
        episodes_trained: agent.episodes_trained(),
        q_table: agent
            .table()
            .iter()
            .map(|(key, values)| (key.raw(), *values))
            .collect(),
    };

    let json = serde_json::to_string_pretty(&saved).map_err(|source| {
        PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Load a trained agent from a JSON file
///
/// Returns the restored agent (with exploration pinned to the floor) together
/// with the metadata recorded at save time.
pub fn load_agent(path: &Path) -> Result<(QLearningAgent, AgentMetadata), PersistenceError> {
    if !path.exists() {
        return Err(PersistenceError::NotFound(path.to_path_buf()));
    }

    let json = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let saved: SavedAgent =
        serde_json::from_str(&json).map_err(|source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let table: HashMap<StateKey, QValues> = saved
        .q_table
        .into_iter()
        .map(|(bits, values)| (StateKey::from_raw(bits), values))
        .collect();

    let metadata = AgentMetadata {
        version: saved.version,
        episodes_trained: saved.episodes_trained,
        states_seen: table.len(),
    };

    let agent = QLearningAgent::restored(saved.config, table, saved.episodes_trained);

    Ok((agent, metadata))
}
