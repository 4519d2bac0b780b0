use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current heading
    pub heading: Direction,
}

impl Snake {
    /// Create a new snake with given head position and heading.
    /// Additional segments trail out behind the head.
    pub fn new(head: Position, heading: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = heading.delta();
        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self { body, heading }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Body segments excluding the head
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with the body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Check if position is occupied by any segment, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Advance one cell in the current heading, growing if `grow` is true
    pub fn advance(&mut self, grow: bool) {
        let new_head = self.head().moved_in_direction(self.heading);
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Never true in practice; kept for API completeness
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCause {
    /// Snake hit a wall
    WallCollision,
    /// Snake hit itself
    SelfCollision,
    /// Too many steps without eating (training only)
    Starvation,
    /// Snake filled the entire grid
    BoardFull,
}

impl TerminationCause {
    pub fn describe(&self) -> &'static str {
        match self {
            TerminationCause::WallCollision => "hit a wall",
            TerminationCause::SelfCollision => "ran into itself",
            TerminationCause::Starvation => "starved",
            TerminationCause::BoardFull => "filled the board",
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub fruit: Position,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    pub steps: u32,
    /// Steps since the last fruit was eaten
    pub steps_since_fruit: u32,
    pub is_alive: bool,
    /// Set when the episode ends
    pub cause: Option<TerminationCause>,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, fruit: Position, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            fruit,
            grid_width,
            grid_height,
            score: 0,
            steps: 0,
            steps_since_fruit: 0,
            is_alive: true,
            cause: None,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// A cell that would kill the snake if the head moved into it next step.
    /// The tail cell counts as deadly even though it may move away, matching
    /// the danger probes the agent trains on.
    pub fn is_deadly(&self, pos: Position) -> bool {
        !self.is_in_bounds(pos) || self.snake.collides_with_body(pos)
    }

    /// Total number of grid cells
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(5, 6));
    }

    #[test]
    fn test_snake_creation_trails_behind_head() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.body[1], Position::new(4, 5));
        assert_eq!(snake.body[2], Position::new(3, 5));
    }

    #[test]
    fn test_single_segment_snake() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 1);
        assert_eq!(snake.len(), 1);
        assert!(snake.body_segments().is_empty());
    }

    #[test]
    fn test_advance() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3);

        snake.advance(false);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));

        snake.advance(true);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(7, 5));
    }

    #[test]
    fn test_body_collision_excludes_head() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert!(!snake.collides_with_body(Position::new(5, 5))); // head
        assert!(snake.collides_with_body(Position::new(4, 5))); // body
        assert!(!snake.collides_with_body(Position::new(10, 10))); // empty

        assert!(snake.occupies(Position::new(5, 5)));
    }

    #[test]
    fn test_bounds_checking() {
        let state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            Position::new(10, 10),
            20,
            20,
        );

        assert!(state.is_in_bounds(Position::new(0, 0)));
        assert!(state.is_in_bounds(Position::new(19, 19)));
        assert!(!state.is_in_bounds(Position::new(-1, 0)));
        assert!(!state.is_in_bounds(Position::new(20, 0)));
        assert!(!state.is_in_bounds(Position::new(0, 20)));
    }

    #[test]
    fn test_deadly_cells() {
        let state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            Position::new(10, 10),
            20,
            20,
        );

        assert!(state.is_deadly(Position::new(-1, 5))); // wall
        assert!(state.is_deadly(Position::new(4, 5))); // body
        assert!(!state.is_deadly(Position::new(6, 5))); // open cell
        assert!(!state.is_deadly(Position::new(5, 5))); // own head does not count
    }
}
