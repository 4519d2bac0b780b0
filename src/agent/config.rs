//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the tabular Q-learning agent
///
/// Default values are tuned for the Snake environment: a fast-moving epsilon
/// schedule over a few thousand episodes and a discount high enough to make
/// the fruit worth steering toward from across the grid.
///
/// # Example
///
/// ```rust
/// use q_snake::agent::AgentConfig;
///
/// let config = AgentConfig {
///     learning_rate: 0.1,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// How much new information overrides old knowledge
    ///
    /// Default: 0.05
    pub learning_rate: f32,

    /// Discount factor for future rewards (gamma)
    ///
    /// Values closer to 1.0 make the agent more far-sighted.
    ///
    /// Default: 0.95
    pub discount: f32,

    /// Initial exploration rate
    ///
    /// Default: 1.0
    pub epsilon_start: f32,

    /// Multiplicative epsilon decay applied after each episode
    ///
    /// Default: 0.998
    pub epsilon_decay: f32,

    /// Exploration floor; epsilon never decays below this
    ///
    /// Default: 0.01
    pub epsilon_min: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_decay: 0.998,
            epsilon_min: 0.01,
        }
    }
}

impl AgentConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.discount) {
            return Err(format!("discount must be in [0, 1], got {}", self.discount));
        }

        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            ));
        }

        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if self.epsilon_min < 0.0 || self.epsilon_min > self.epsilon_start {
            return Err(format!(
                "epsilon_min must be in [0, epsilon_start], got {}",
                self.epsilon_min
            ));
        }

        Ok(())
    }
}
