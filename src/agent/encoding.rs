//! State observation and encoding for the Q-table
//!
//! The agent does not see the raw grid. Each step it observes a compact
//! feature vector: whether the cell ahead, to its left, and to its right
//! would kill it, which quadrant the fruit lies in relative to the head, and
//! its current heading. The vector packs into a `u16`, which keeps the
//! Q-table keys cheap to hash and trivial to serialize.

use serde::{Deserialize, Serialize};

use crate::game::{Direction, GameState};

/// What the agent observes each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateFeatures {
    /// The cell straight ahead is a wall or body segment
    pub danger_ahead: bool,
    /// The cell to the snake's left is deadly
    pub danger_left: bool,
    /// The cell to the snake's right is deadly
    pub danger_right: bool,
    /// Fruit is strictly right of the head
    pub fruit_right: bool,
    /// Fruit is strictly left of the head
    pub fruit_left: bool,
    /// Fruit is strictly below the head
    pub fruit_below: bool,
    /// Fruit is strictly above the head
    pub fruit_above: bool,
    /// Current heading
    pub heading: Direction,
}

impl StateFeatures {
    /// Observe the current game state from the snake's point of view
    pub fn observe(state: &GameState) -> Self {
        let head = state.snake.head();
        let heading = state.snake.heading;

        let ahead = head.moved_in_direction(heading);
        let left = head.moved_in_direction(heading.turned_left());
        let right = head.moved_in_direction(heading.turned_right());

        let rel_x = state.fruit.x - head.x;
        let rel_y = state.fruit.y - head.y;

        Self {
            danger_ahead: state.is_deadly(ahead),
            danger_left: state.is_deadly(left),
            danger_right: state.is_deadly(right),
            fruit_right: rel_x > 0,
            fruit_left: rel_x < 0,
            fruit_below: rel_y > 0,
            fruit_above: rel_y < 0,
            heading,
        }
    }

    /// Pack the features into a Q-table key
    pub fn key(&self) -> StateKey {
        let mut bits: u16 = 0;

        for (i, flag) in [
            self.danger_ahead,
            self.danger_left,
            self.danger_right,
            self.fruit_right,
            self.fruit_left,
            self.fruit_below,
            self.fruit_above,
        ]
        .into_iter()
        .enumerate()
        {
            if flag {
                bits |= 1 << i;
            }
        }

        bits |= (heading_code(self.heading) as u16) << 7;

        StateKey(bits)
    }

    /// Unpack a key back into features
    pub fn from_key(key: StateKey) -> Self {
        let bits = key.0;
        let flag = |i: usize| bits & (1 << i) != 0;

        Self {
            danger_ahead: flag(0),
            danger_left: flag(1),
            danger_right: flag(2),
            fruit_right: flag(3),
            fruit_left: flag(4),
            fruit_below: flag(5),
            fruit_above: flag(6),
            heading: heading_from_code(((bits >> 7) & 0b11) as u8),
        }
    }
}

/// Bit-packed state observation; the Q-table key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StateKey(u16);

impl StateKey {
    pub fn from_raw(bits: u16) -> Self {
        StateKey(bits)
    }

    pub fn raw(&self) -> u16 {
        self.0
    }
}

fn heading_code(heading: Direction) -> u8 {
    match heading {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

fn heading_from_code(code: u8) -> Direction {
    match code {
        0 => Direction::Up,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameEngine, Position, Snake};
    use std::collections::HashSet;

    fn state_with(snake: Snake, fruit: Position) -> GameState {
        GameState::new(snake, fruit, 10, 10)
    }

    #[test]
    fn test_open_field_has_no_danger() {
        let state = state_with(
            Snake::new(Position::new(5, 5), Direction::Right, 1),
            Position::new(7, 5),
        );

        let features = StateFeatures::observe(&state);
        assert!(!features.danger_ahead);
        assert!(!features.danger_left);
        assert!(!features.danger_right);
    }

    #[test]
    fn test_wall_ahead_is_danger() {
        // Head against the right wall, heading right
        let state = state_with(
            Snake::new(Position::new(9, 5), Direction::Right, 1),
            Position::new(5, 5),
        );

        let features = StateFeatures::observe(&state);
        assert!(features.danger_ahead);
        assert!(!features.danger_left); // up is open
        assert!(!features.danger_right); // down is open
    }

    #[test]
    fn test_corner_dangers() {
        // Top-left corner heading up: wall ahead and wall to the left
        let state = state_with(
            Snake::new(Position::new(0, 0), Direction::Up, 1),
            Position::new(5, 5),
        );

        let features = StateFeatures::observe(&state);
        assert!(features.danger_ahead);
        assert!(features.danger_left);
        assert!(!features.danger_right);
    }

    #[test]
    fn test_own_body_is_danger() {
        // Snake heading up after a left turn; its body trails to the right
        // of the head, so "right" (from the snake's view: +x... for Up,
        // right turn is +x) is deadly.
        let snake = Snake {
            body: vec![
                Position::new(5, 5),
                Position::new(6, 5),
                Position::new(7, 5),
            ],
            heading: Direction::Up,
        };
        let state = state_with(snake, Position::new(2, 2));

        let features = StateFeatures::observe(&state);
        assert!(!features.danger_ahead);
        assert!(!features.danger_left);
        assert!(features.danger_right);
    }

    #[test]
    fn test_fruit_quadrant() {
        let state = state_with(
            Snake::new(Position::new(5, 5), Direction::Right, 1),
            Position::new(8, 2),
        );

        let features = StateFeatures::observe(&state);
        assert!(features.fruit_right);
        assert!(!features.fruit_left);
        assert!(features.fruit_above);
        assert!(!features.fruit_below);
    }

    #[test]
    fn test_fruit_aligned_with_head_sets_neither_bit() {
        let state = state_with(
            Snake::new(Position::new(5, 5), Direction::Right, 1),
            Position::new(5, 8),
        );

        let features = StateFeatures::observe(&state);
        assert!(!features.fruit_right);
        assert!(!features.fruit_left);
        assert!(features.fruit_below);
    }

    #[test]
    fn test_key_round_trip() {
        let state = state_with(
            Snake::new(Position::new(9, 0), Direction::Right, 1),
            Position::new(2, 7),
        );

        let features = StateFeatures::observe(&state);
        assert_eq!(StateFeatures::from_key(features.key()), features);
    }

    #[test]
    fn test_encoding_is_injective() {
        let headings = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];

        let mut seen = HashSet::new();
        for bits in 0u16..128 {
            let flag = |i: usize| bits & (1 << i) != 0;
            for heading in headings {
                let features = StateFeatures {
                    danger_ahead: flag(0),
                    danger_left: flag(1),
                    danger_right: flag(2),
                    fruit_right: flag(3),
                    fruit_left: flag(4),
                    fruit_below: flag(5),
                    fruit_above: flag(6),
                    heading,
                };
                assert!(seen.insert(features.key()), "duplicate key for {features:?}");
            }
        }
        assert_eq!(seen.len(), 512);
    }

    #[test]
    fn test_observation_from_live_engine() {
        let mut engine = GameEngine::new(GameConfig::small());
        let state = engine.reset();

        // Fresh snake at the center of an open grid: no dangers
        let features = StateFeatures::observe(&state);
        assert!(!features.danger_ahead);
        assert!(!features.danger_left);
        assert!(!features.danger_right);
        assert_eq!(features.heading, Direction::Right);
    }
}
