//! Tabular Q-learning for Snake
//!
//! Provides:
//! - Compact state observations packed into `u16` keys
//! - A dictionary-backed Q-table with epsilon-greedy action selection
//! - Hyperparameter configuration and validation
//! - JSON persistence for trained agents

pub mod config;
pub mod encoding;
pub mod persistence;
pub mod qlearning;

pub use config::AgentConfig;
pub use encoding::{StateFeatures, StateKey};
pub use persistence::{load_agent, save_agent, AgentMetadata};
pub use qlearning::{QLearningAgent, QValues, ACTION_COUNT};
