//! Training mode for the Q-learning agent
//!
//! Runs the episode loop: observe, pick a turn, step the engine, apply the
//! Bellman update, decay epsilon at episode end. Progress goes to the
//! training log (and console when headless); the full run history is written
//! as a stats report at the end, next to the saved agent.
//!
//! With the live dashboard enabled, training runs on a worker thread and
//! streams snapshots to the TUI over a channel.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::{Deserialize, Serialize};
use std::io::{stderr, Stderr};
use tokio::time::interval;
use tracing::info;

use crate::agent::{save_agent, AgentConfig, QLearningAgent, StateFeatures};
use crate::game::{Action, GameConfig, GameEngine};
use crate::logging::{self, RunLog};
use crate::metrics::TrainingStats;
use crate::render::{dashboard, DashboardState};

/// Training-run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Log a progress line (and average scores) every N episodes
    pub log_every: usize,

    /// Save a checkpoint every N episodes
    pub checkpoint_every: Option<usize>,

    /// End an episode after this many steps without eating
    pub starvation_limit: u32,

    /// Where the trained agent is saved
    pub model_path: PathBuf,

    /// Directory for training logs and stats reports
    pub log_dir: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            num_episodes: 5000,
            log_every: 10,
            checkpoint_every: None,
            starvation_limit: 100,
            model_path: PathBuf::from("models/snake_agent.json"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl TrainConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.num_episodes == 0 {
            return Err("num_episodes must be at least 1".to_string());
        }

        if self.log_every == 0 {
            return Err("log_every must be at least 1".to_string());
        }

        if self.checkpoint_every == Some(0) {
            return Err("checkpoint_every must be at least 1 when set".to_string());
        }

        if self.starvation_limit == 0 {
            return Err("starvation_limit must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Periodic metrics snapshot sent from the training thread to the dashboard
#[derive(Debug, Clone)]
pub struct TrainingSnapshot {
    pub episode: usize,
    pub total_episodes: usize,
    pub score: u32,
    pub recent_average: f32,
    pub states_seen: usize,
    pub epsilon: f32,
    pub best_score: u32,
}

/// Updates sent from the training thread to the dashboard
#[derive(Debug, Clone)]
pub enum TrainingUpdate {
    Snapshot(TrainingSnapshot),
    Finished,
}

/// Training mode for the Q-learning agent
pub struct TrainMode {
    engine: GameEngine,
    agent: QLearningAgent,
    stats: TrainingStats,
    config: TrainConfig,
    grid: (usize, usize),
}

impl TrainMode {
    pub fn new(mut game_config: GameConfig, agent_config: AgentConfig, config: TrainConfig) -> Self {
        // Training always bounds episode length, or early agents wander forever
        game_config.starvation_limit = Some(config.starvation_limit);

        let stats = TrainingStats::new(config.log_every);
        let grid = (game_config.grid_width, game_config.grid_height);

        Self {
            engine: GameEngine::new(game_config),
            agent: QLearningAgent::new(agent_config),
            stats,
            config,
            grid,
        }
    }

    /// Run the full training loop, streaming snapshots when a sender is given
    /// and stopping early when the flag is raised.
    fn train_loop(
        &mut self,
        run_log: &RunLog,
        updates: Option<mpsc::Sender<TrainingUpdate>>,
        stop: Option<Arc<AtomicBool>>,
    ) -> Result<()> {
        let started_at = Utc::now();
        info!(
            "starting training session: {} episodes on a {}x{} grid",
            self.config.num_episodes, self.grid.0, self.grid.1,
        );

        for episode in 1..=self.config.num_episodes {
            if stop.as_ref().is_some_and(|s| s.load(Ordering::Relaxed)) {
                info!("training stopped early at episode {episode}");
                break;
            }

            let (score, steps) = self.run_episode();
            self.agent.end_episode();

            let new_best = self.stats.record_episode(
                score,
                steps,
                self.agent.states_seen(),
                self.agent.epsilon(),
            );

            if new_best {
                info!("new best score: {score} (episode {episode})");
            }

            if episode % self.config.log_every == 0 {
                info!(
                    "episode {episode}/{}: score {score}, avg {:.2}, states {}, epsilon {:.3}",
                    self.config.num_episodes,
                    self.stats.recent_average(self.config.log_every),
                    self.agent.states_seen(),
                    self.agent.epsilon(),
                );
            }

            if let Some(every) = self.config.checkpoint_every {
                if episode % every == 0 {
                    self.save_checkpoint(episode)?;
                }
            }

            if let Some(tx) = &updates {
                // The dashboard may already be gone; that is not an error
                let _ = tx.send(TrainingUpdate::Snapshot(TrainingSnapshot {
                    episode,
                    total_episodes: self.config.num_episodes,
                    score,
                    recent_average: self.stats.recent_average(self.config.log_every),
                    states_seen: self.agent.states_seen(),
                    epsilon: self.agent.epsilon(),
                    best_score: self.stats.best_score(),
                }));
            }
        }

        save_agent(&self.agent, &self.config.model_path)
            .with_context(|| format!("failed to save agent to {}", self.config.model_path.display()))?;

        run_log.write_stats(&self.stats.to_report(started_at))?;

        info!("training complete: {}", self.stats.format_summary());
        info!(
            "agent saved to {}, stats saved to {}",
            self.config.model_path.display(),
            run_log.stats_path().display(),
        );

        if let Some(tx) = &updates {
            let _ = tx.send(TrainingUpdate::Finished);
        }

        Ok(())
    }

    /// Run a single episode; returns its final score and step count
    fn run_episode(&mut self) -> (u32, u32) {
        let mut state = self.engine.reset();

        loop {
            let key = StateFeatures::observe(&state).key();
            let turn = self.agent.select_action(key);
            let heading = turn.applied_to(state.snake.heading);

            let outcome = self.engine.step(&mut state, Action::Move(heading));
            let next_key = StateFeatures::observe(&state).key();

            self.agent
                .learn(key, turn, outcome.reward, next_key, outcome.terminated);

            if outcome.terminated {
                break;
            }
        }

        (state.score, state.steps)
    }

    fn save_checkpoint(&self, episode: usize) -> Result<()> {
        let checkpoint_path = self
            .config
            .model_path
            .parent()
            .unwrap_or(std::path::Path::new("."))
            .join(format!("checkpoint_ep{episode}.json"));

        save_agent(&self.agent, &checkpoint_path)
            .with_context(|| format!("failed to save checkpoint to {}", checkpoint_path.display()))?;

        info!("checkpoint saved: {}", checkpoint_path.display());

        Ok(())
    }
}

/// Train without a TUI: progress lines go to the console and the log file
pub fn run_headless(
    game_config: GameConfig,
    agent_config: AgentConfig,
    train_config: TrainConfig,
) -> Result<()> {
    let run_log = RunLog::create(&train_config.log_dir)?;
    logging::init(true, Some(run_log.open_log_file()?))?;

    let mut mode = TrainMode::new(game_config, agent_config, train_config);
    mode.train_loop(&run_log, None, None)
}

/// Train with the live dashboard TUI; console logging is routed to the file
pub async fn run_with_dashboard(
    game_config: GameConfig,
    agent_config: AgentConfig,
    train_config: TrainConfig,
) -> Result<()> {
    let run_log = RunLog::create(&train_config.log_dir)?;
    logging::init(false, Some(run_log.open_log_file()?))?;

    let total_episodes = train_config.num_episodes;
    let model_path = train_config.model_path.clone();

    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));

    let worker = {
        let stop = stop.clone();
        thread::spawn(move || -> Result<()> {
            let mut mode = TrainMode::new(game_config, agent_config, train_config);
            mode.train_loop(&run_log, Some(tx), Some(stop))
        })
    };

    let dashboard_result = run_dashboard(rx, stop, total_episodes).await;

    let worker_result = match worker.join() {
        Ok(result) => result,
        Err(_) => bail!("training thread panicked"),
    };

    dashboard_result?;
    worker_result?;

    println!("Training finished. Agent saved to {}", model_path.display());

    Ok(())
}

/// TUI loop showing training progress charts
async fn run_dashboard(
    rx: mpsc::Receiver<TrainingUpdate>,
    stop: Arc<AtomicBool>,
    total_episodes: usize,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;

    let result = dashboard_loop(&mut terminal, rx, stop, total_episodes).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn dashboard_loop(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    rx: mpsc::Receiver<TrainingUpdate>,
    stop: Arc<AtomicBool>,
    total_episodes: usize,
) -> Result<()> {
    let mut state = DashboardState::new(total_episodes);
    let mut event_stream = EventStream::new();
    let mut render_timer = interval(Duration::from_millis(100));
    let mut should_quit = false;

    loop {
        tokio::select! {
            maybe_event = event_stream.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c');
                    if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                        stop.store(true, Ordering::Relaxed);
                        should_quit = true;
                    }
                }
            }

            _ = render_timer.tick() => {
                // Drain everything the trainer produced since the last frame
                while let Ok(update) = rx.try_recv() {
                    match update {
                        TrainingUpdate::Snapshot(snap) => state.apply_snapshot(&snap),
                        TrainingUpdate::Finished => state.finished = true,
                    }
                }

                terminal.draw(|frame| {
                    dashboard::render(frame, &state);
                }).context("Failed to draw frame")?;
            }

            _ = tokio::signal::ctrl_c() => {
                stop.store(true, Ordering::Relaxed);
                should_quit = true;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
