use serde::{Deserialize, Serialize};

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Fruit spawns at least this many cells away from the walls when possible
    pub fruit_spawn_margin: usize,

    // Rewards (for Q-learning)
    /// Reward for eating a fruit
    pub fruit_reward: f32,
    /// Reward for a plain step
    pub step_reward: f32,
    /// Penalty for dying (wall, self, or starvation)
    pub death_penalty: f32,

    /// End the episode after this many steps without eating.
    /// `None` disables the limit (human and watch play).
    pub starvation_limit: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 1,
            fruit_spawn_margin: 2,
            fruit_reward: 10.0,
            step_reward: 0.0,
            death_penalty: -10.0,
            starvation_limit: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 4 || self.grid_height < 4 {
            return Err(format!(
                "grid must be at least 4x4, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        if self.initial_snake_length > self.grid_width / 2 {
            return Err(format!(
                "initial_snake_length ({}) does not fit in half the grid width ({})",
                self.initial_snake_length, self.grid_width
            ));
        }

        if self.starvation_limit == Some(0) {
            return Err("starvation_limit must be at least 1 step when set".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.initial_snake_length, 1);
        assert_eq!(config.fruit_spawn_margin, 2);
        assert_eq!(config.starvation_limit, None);
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tiny_grid_rejected() {
        let config = GameConfig::new(3, 20);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_snake_length_rejected() {
        let mut config = GameConfig::default();
        config.initial_snake_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_starvation_limit_rejected() {
        let mut config = GameConfig::default();
        config.starvation_limit = Some(0);
        assert!(config.validate().is_err());
    }
}
