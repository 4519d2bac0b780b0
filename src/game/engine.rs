use super::{
    action::{Action, Direction},
    config::GameConfig,
    state::{GameState, Position, Snake, TerminationCause},
};
use rand::Rng;

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Reward for this step (for Q-learning)
    pub reward: f32,
    /// Whether the episode has ended
    pub terminated: bool,
    /// Whether the snake ate a fruit this step
    pub ate_fruit: bool,
    /// Why the episode ended, if it did
    pub cause: Option<TerminationCause>,
}

/// The game engine that handles all game logic
#[derive(Debug)]
pub struct GameEngine {
    config: GameConfig,
    rng: rand::rngs::ThreadRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: rand::thread_rng(),
        }
    }

    /// Reset the game to its initial state
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        // A freshly reset snake never fills the grid (config validation
        // guarantees it), so a free cell always exists.
        let fruit = self.spawn_fruit(&snake).unwrap_or_else(|| snake.head());

        GameState::new(snake, fruit, self.config.grid_width, self.config.grid_height)
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepOutcome {
        if !state.is_alive {
            return StepOutcome {
                reward: 0.0,
                terminated: true,
                ate_fruit: false,
                cause: state.cause,
            };
        }

        // Update heading (180-degree reversals are ignored)
        if let Action::Move(new_heading) = action {
            if !state.snake.heading.is_opposite(new_heading) {
                state.snake.heading = new_heading;
            }
        }

        let new_head = state.snake.head().moved_in_direction(state.snake.heading);

        // Every attempted move counts, including the fatal one
        state.steps += 1;

        if !state.is_in_bounds(new_head) {
            return self.kill(state, TerminationCause::WallCollision);
        }

        let ate_fruit = new_head == state.fruit;

        // Advance before the self-collision check so the vacated tail cell
        // does not count as occupied.
        state.snake.advance(ate_fruit);

        if state.snake.collides_with_body(new_head) {
            return self.kill(state, TerminationCause::SelfCollision);
        }

        let mut reward = self.config.step_reward;

        if ate_fruit {
            state.score += 1;
            state.steps_since_fruit = 0;
            reward += self.config.fruit_reward;

            match self.spawn_fruit(&state.snake) {
                Some(fruit) => state.fruit = fruit,
                None => {
                    // Snake occupies every cell; the final fruit still pays out.
                    state.is_alive = false;
                    state.cause = Some(TerminationCause::BoardFull);
                    return StepOutcome {
                        reward,
                        terminated: true,
                        ate_fruit: true,
                        cause: state.cause,
                    };
                }
            }
        } else {
            state.steps_since_fruit += 1;

            if let Some(limit) = self.config.starvation_limit {
                if state.steps_since_fruit > limit {
                    return self.kill(state, TerminationCause::Starvation);
                }
            }
        }

        StepOutcome {
            reward,
            terminated: false,
            ate_fruit,
            cause: None,
        }
    }

    fn kill(&self, state: &mut GameState, cause: TerminationCause) -> StepOutcome {
        state.is_alive = false;
        state.cause = Some(cause);

        StepOutcome {
            reward: self.config.death_penalty,
            terminated: true,
            ate_fruit: false,
            cause: Some(cause),
        }
    }

    /// Pick a random free cell for the fruit, preferring the region at least
    /// `fruit_spawn_margin` cells away from the walls. Returns `None` only
    /// when the snake occupies every cell.
    fn spawn_fruit(&mut self, snake: &Snake) -> Option<Position> {
        let margin = self.config.fruit_spawn_margin as i32;
        let width = self.config.grid_width as i32;
        let height = self.config.grid_height as i32;

        let in_region = |pos: &Position| {
            pos.x >= margin && pos.x < width - margin && pos.y >= margin && pos.y < height - margin
        };

        let mut free: Vec<Position> = (0..width)
            .flat_map(|x| (0..height).map(move |y| Position::new(x, y)))
            .filter(|pos| in_region(pos) && !snake.occupies(*pos))
            .collect();

        if free.is_empty() {
            free = (0..width)
                .flat_map(|x| (0..height).map(move |y| Position::new(x, y)))
                .filter(|pos| !snake.occupies(*pos))
                .collect();
        }

        if free.is_empty() {
            return None;
        }

        Some(free[self.rng.gen_range(0..free.len())])
    }
}
