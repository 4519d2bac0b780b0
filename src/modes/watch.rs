//! Watch mode: load a trained agent and let it play
//!
//! The agent runs its greedy policy, one observation per tick. Playback speed
//! is adjustable, episodes auto-restart on death, and the header shows how
//! much training the loaded agent carries.

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::path::Path;
use std::time::Duration;
use tokio::time::{interval, Interval};

use crate::agent::{load_agent, AgentMetadata, QLearningAgent, StateFeatures};
use crate::game::{Action, GameConfig, GameEngine, GameState};
use crate::metrics::SessionMetrics;
use crate::render::{Renderer, WatchOverlay};

/// Playback speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSpeed {
    /// 2 Hz (500ms per step)
    Slow,
    /// 8 Hz (125ms per step), same as human mode
    Normal,
    /// 20 Hz (50ms per step)
    Fast,
    /// 60 Hz (16ms per step)
    VeryFast,
}

impl PlaybackSpeed {
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// Watch mode for a trained agent
#[derive(Debug)]
pub struct WatchMode {
    engine: GameEngine,
    state: GameState,
    agent: QLearningAgent,
    metadata: AgentMetadata,
    renderer: Renderer,
    session: SessionMetrics,
    should_quit: bool,
    paused: bool,
    speed: PlaybackSpeed,
    episode_count: usize,
}

impl WatchMode {
    /// Load a trained agent and set up the environment
    pub fn new(model_path: &Path, config: GameConfig) -> Result<Self> {
        let (agent, metadata) = load_agent(model_path)
            .with_context(|| format!("failed to load agent from {}", model_path.display()))?;

        println!("{}", "=".repeat(60));
        println!("Loaded agent");
        println!("{}", "=".repeat(60));
        println!("Path: {}", model_path.display());
        println!("Episodes trained: {}", metadata.episodes_trained);
        println!("States seen: {}", metadata.states_seen);
        println!("Saved by version: {}", metadata.version);
        println!("{}", "=".repeat(60));
        println!();

        let mut engine = GameEngine::new(config);
        let state = engine.reset();

        Ok(Self {
            engine,
            state,
            agent,
            metadata,
            renderer: Renderer::new(),
            session: SessionMetrics::new(),
            should_quit: false,
            paused: false,
            speed: PlaybackSpeed::Normal,
            episode_count: 0,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_watch_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_watch_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer);
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        if self.state.is_alive {
                            self.step_agent();
                        } else {
                            // Auto-restart
                            self.reset_episode();
                        }
                    }
                }

                _ = render_timer.tick() => {
                    self.session.tick();
                    let overlay = WatchOverlay {
                        episode: self.episode_count,
                        episodes_trained: self.metadata.episodes_trained,
                        speed: self.speed.as_str(),
                        paused: self.paused,
                        high_score: self.session.high_score,
                    };
                    terminal.draw(|frame| {
                        self.renderer.render_watch(frame, &self.state, &overlay);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Advance one step with the greedy policy
    fn step_agent(&mut self) {
        let key = StateFeatures::observe(&self.state).key();
        let turn = self.agent.greedy_action(key);
        let heading = turn.applied_to(self.state.snake.heading);

        let outcome = self.engine.step(&mut self.state, Action::Move(heading));

        if outcome.terminated {
            self.session.on_game_over(self.state.score);
        }
    }

    fn reset_episode(&mut self) {
        self.state = self.engine.reset();
        self.episode_count += 1;
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                self.should_quit = true;
                return;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.reset_episode();
                }
                KeyCode::Char('1') => self.change_speed(PlaybackSpeed::Slow, tick_timer),
                KeyCode::Char('2') => self.change_speed(PlaybackSpeed::Normal, tick_timer),
                KeyCode::Char('3') => self.change_speed(PlaybackSpeed::Fast, tick_timer),
                KeyCode::Char('4') => self.change_speed(PlaybackSpeed::VeryFast, tick_timer),
                _ => {}
            }
        }
    }

    fn change_speed(&mut self, new_speed: PlaybackSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        tick_timer.reset_after(self.speed.tick_interval());
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{save_agent, AgentConfig};
    use tempfile::TempDir;

    #[test]
    fn test_playback_speed_intervals() {
        assert_eq!(PlaybackSpeed::Slow.tick_interval(), Duration::from_millis(500));
        assert_eq!(PlaybackSpeed::Normal.tick_interval(), Duration::from_millis(125));
        assert_eq!(PlaybackSpeed::Fast.tick_interval(), Duration::from_millis(50));
        assert_eq!(PlaybackSpeed::VeryFast.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_watch_mode_creation() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("agent.json");

        let agent = QLearningAgent::new(AgentConfig::default());
        save_agent(&agent, &model_path).unwrap();

        let mode = WatchMode::new(&model_path, GameConfig::small()).unwrap();
        assert_eq!(mode.episode_count, 0);
        assert!(!mode.paused);
        assert_eq!(mode.speed, PlaybackSpeed::Normal);
        assert!(mode.state.is_alive);
    }

    #[test]
    fn test_missing_model_fails_with_guidance() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("nope.json");

        let err = WatchMode::new(&model_path, GameConfig::small()).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("no trained agent found"));
    }

    #[test]
    fn test_step_agent_advances_game() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("agent.json");

        let agent = QLearningAgent::new(AgentConfig::default());
        save_agent(&agent, &model_path).unwrap();

        let mut mode = WatchMode::new(&model_path, GameConfig::small()).unwrap();
        let steps_before = mode.state.steps;
        mode.step_agent();
        assert_eq!(mode.state.steps, steps_before + 1);
    }

    #[test]
    fn test_reset_episode_counts() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("agent.json");

        let agent = QLearningAgent::new(AgentConfig::default());
        save_agent(&agent, &model_path).unwrap();

        let mut mode = WatchMode::new(&model_path, GameConfig::small()).unwrap();
        mode.state.is_alive = false;
        mode.reset_episode();

        assert_eq!(mode.episode_count, 1);
        assert!(mode.state.is_alive);
    }
}
