//! q-snake - Terminal Snake with a tabular Q-learning agent
//!
//! This library provides:
//! - Core game logic (game module)
//! - A tabular Q-learning agent with compact state encoding (agent module)
//! - Training statistics and run logging (metrics and logging modules)
//! - TUI rendering, including a live training dashboard (render module)
//! - Execution modes: human play, training, and watching a trained agent
//!   (modes module)

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
