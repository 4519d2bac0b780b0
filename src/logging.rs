//! Logging for training runs
//!
//! Each training session owns a timestamped pair of files under the log
//! directory: a plain-text log mirroring everything printed to the console,
//! and a JSON stats report written at the end of the run. Log output goes
//! through `tracing`; the filter honors `RUST_LOG`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::metrics::StatsReport;

/// File pair for one training run
#[derive(Debug, Clone)]
pub struct RunLog {
    log_path: PathBuf,
    stats_path: PathBuf,
}

impl RunLog {
    /// Create the log directory and pick timestamped file names for this run
    pub fn create(log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");

        Ok(Self {
            log_path: log_dir.join(format!("training_{timestamp}.log")),
            stats_path: log_dir.join(format!("stats_{timestamp}.json")),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// Open the text log file for the tracing file layer
    pub fn open_log_file(&self) -> Result<File> {
        File::create(&self.log_path)
            .with_context(|| format!("failed to create log file {}", self.log_path.display()))
    }

    /// Write the end-of-run stats report as pretty JSON
    pub fn write_stats(&self, report: &StatsReport) -> Result<()> {
        let json =
            serde_json::to_string_pretty(report).context("failed to serialize stats report")?;
        fs::write(&self.stats_path, json)
            .with_context(|| format!("failed to write stats to {}", self.stats_path.display()))?;
        Ok(())
    }
}

/// Install the global tracing subscriber.
///
/// `console` controls whether log lines go to stdout (disabled while a TUI
/// owns the screen); `log_file` adds a plain-text file layer.
pub fn init(console: bool, log_file: Option<File>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = console.then(|| fmt::layer().with_target(false));
    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TrainingStats;
    use tempfile::TempDir;

    #[test]
    fn test_create_names_files_by_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let run_log = RunLog::create(temp_dir.path()).unwrap();

        let log_name = run_log.log_path().file_name().unwrap().to_string_lossy();
        let stats_name = run_log.stats_path().file_name().unwrap().to_string_lossy();

        assert!(log_name.starts_with("training_"));
        assert!(log_name.ends_with(".log"));
        assert!(stats_name.starts_with("stats_"));
        assert!(stats_name.ends_with(".json"));
    }

    #[test]
    fn test_create_makes_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("runs").join("today");

        let run_log = RunLog::create(&nested).unwrap();
        assert!(nested.exists());
        assert!(run_log.open_log_file().is_ok());
    }

    #[test]
    fn test_write_stats_produces_valid_json() {
        let temp_dir = TempDir::new().unwrap();
        let run_log = RunLog::create(temp_dir.path()).unwrap();

        let mut stats = TrainingStats::new(10);
        stats.record_episode(3, 40, 12, 0.98);
        let report = stats.to_report(chrono::Utc::now());

        run_log.write_stats(&report).unwrap();

        let json = std::fs::read_to_string(run_log.stats_path()).unwrap();
        let parsed: StatsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_games, 1);
        assert_eq!(parsed.best_score, 3);
    }
}
