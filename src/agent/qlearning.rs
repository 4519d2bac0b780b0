//! Tabular Q-learning agent
//!
//! The value table maps packed state observations to one Q-value per relative
//! turn. Action selection is epsilon-greedy; updates follow the standard
//! one-step Bellman rule. States are inserted lazily, so the table only holds
//! situations the agent has actually encountered.

use std::collections::HashMap;

use rand::Rng;

use super::{config::AgentConfig, encoding::StateKey};
use crate::game::Turn;

/// Number of actions the agent chooses between (straight, left, right)
pub const ACTION_COUNT: usize = 3;

/// One row of the Q-table, indexed by `Turn::index`
pub type QValues = [f32; ACTION_COUNT];

/// A Q-learning agent over packed Snake observations
#[derive(Debug)]
pub struct QLearningAgent {
    config: AgentConfig,
    q_table: HashMap<StateKey, QValues>,
    epsilon: f32,
    episodes_trained: usize,
    rng: rand::rngs::ThreadRng,
}

impl QLearningAgent {
    /// Create a fresh agent with an empty table and full exploration
    pub fn new(config: AgentConfig) -> Self {
        let epsilon = config.epsilon_start;
        Self {
            config,
            q_table: HashMap::new(),
            epsilon,
            episodes_trained: 0,
            rng: rand::thread_rng(),
        }
    }

    /// Rebuild an agent from saved parts. Epsilon is pinned to the floor:
    /// a restored agent is meant for exploitation, not further exploration.
    pub fn restored(
        config: AgentConfig,
        q_table: HashMap<StateKey, QValues>,
        episodes_trained: usize,
    ) -> Self {
        let epsilon = config.epsilon_min;
        Self {
            config,
            q_table,
            epsilon,
            episodes_trained,
            rng: rand::thread_rng(),
        }
    }

    /// Epsilon-greedy action selection
    pub fn select_action(&mut self, state: StateKey) -> Turn {
        if self.rng.gen::<f32>() < self.epsilon {
            return Turn::ALL[self.rng.gen_range(0..ACTION_COUNT)];
        }

        let values = *self.q_table.entry(state).or_default();
        Turn::from_index(argmax(&values))
    }

    /// Best known action for a state, without exploration or table growth.
    /// Unseen states fall back to going straight.
    pub fn greedy_action(&self, state: StateKey) -> Turn {
        let values = self.q_table.get(&state).copied().unwrap_or_default();
        Turn::from_index(argmax(&values))
    }

    /// One-step Bellman update for an observed transition.
    /// Terminal transitions do not bootstrap from the successor state.
    pub fn learn(
        &mut self,
        state: StateKey,
        action: Turn,
        reward: f32,
        next_state: StateKey,
        terminated: bool,
    ) {
        let next_max = if terminated {
            0.0
        } else {
            let next_values = *self.q_table.entry(next_state).or_default();
            max_value(&next_values)
        };

        let values = self.q_table.entry(state).or_default();
        let q = &mut values[action.index()];
        *q += self.config.learning_rate * (reward + self.config.discount * next_max - *q);
    }

    /// Decay epsilon toward its floor and count the finished episode
    pub fn end_episode(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.episodes_trained += 1;
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Number of distinct states in the table
    pub fn states_seen(&self) -> usize {
        self.q_table.len()
    }

    /// Episodes completed so far
    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    /// Hyperparameters this agent runs with
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Q-values for a state, if it has been seen
    pub fn q_values(&self, state: StateKey) -> Option<&QValues> {
        self.q_table.get(&state)
    }

    pub(crate) fn table(&self) -> &HashMap<StateKey, QValues> {
        &self.q_table
    }
}

/// Index of the first maximal value (ties break low, like `np.argmax`)
fn argmax(values: &QValues) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn max_value(values: &QValues) -> f32 {
    values.iter().fold(f32::NEG_INFINITY, |acc, &v| acc.max(v))
}
