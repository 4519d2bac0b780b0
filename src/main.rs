use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use q_snake::config::AppConfig;
use q_snake::modes::{train, HumanMode, WatchMode};

#[derive(Parser)]
#[command(name = "q-snake")]
#[command(version, about = "Snake game with a tabular Q-learning agent")]
struct Cli {
    /// Game mode
    #[arg(long, default_value = "human")]
    mode: Mode,

    /// Path to a TOML configuration file
    #[arg(long, default_value = "q-snake.toml")]
    config: PathBuf,

    /// Grid width override
    #[arg(long)]
    width: Option<usize>,

    /// Grid height override
    #[arg(long)]
    height: Option<usize>,

    /// Number of training episodes (train mode)
    #[arg(long)]
    episodes: Option<usize>,

    /// Path of the saved agent (written by train, read by watch)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory for training logs and stats reports (train mode)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Show the live training dashboard instead of console logs (train mode)
    #[arg(long)]
    dashboard: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play snake with keyboard controls
    Human,
    /// Train the Q-learning agent
    Train,
    /// Watch a trained agent play
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)?;

    // CLI overrides on top of the config file
    if let Some(width) = cli.width {
        config.game.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.game.grid_height = height;
    }
    if let Some(episodes) = cli.episodes {
        config.training.num_episodes = episodes;
    }
    if let Some(model) = cli.model {
        config.training.model_path = model;
    }
    if let Some(log_dir) = cli.log_dir {
        config.training.log_dir = log_dir;
    }
    config.validate()?;

    match cli.mode {
        Mode::Human => {
            let mut human_mode = HumanMode::new(config.game);
            human_mode.run().await?;
        }
        Mode::Train => {
            if cli.dashboard {
                train::run_with_dashboard(config.game, config.agent, config.training).await?;
            } else {
                train::run_headless(config.game, config.agent, config.training)?;
            }
        }
        Mode::Watch => {
            let model_path = config.training.model_path.clone();
            let mut watch_mode = WatchMode::new(&model_path, config.game)?;
            watch_mode.run().await?;
        }
    }

    Ok(())
}
