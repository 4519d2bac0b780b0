//! Training statistics tracking for Q-learning runs
//!
//! Tracks per-episode scores, Q-table growth, and the epsilon schedule over a
//! whole training run, plus windowed averages for progress logging. The full
//! history is kept so it can be written out as a stats report at the end of
//! the run and charted by the live dashboard.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics for one training run
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Final score of every episode, in order
    scores: Vec<u32>,
    /// Windowed score averages, one entry per `window` episodes
    average_scores: Vec<f32>,
    /// Q-table size after every episode
    q_table_sizes: Vec<usize>,
    /// Epsilon after every episode
    epsilons: Vec<f32>,
    best_score: u32,
    /// 1-based episode number the best score first occurred in
    best_episode: usize,
    total_steps: u64,
    window: usize,
    started: Instant,
}

impl TrainingStats {
    /// Create a new tracker averaging scores over `window` episodes
    pub fn new(window: usize) -> Self {
        Self {
            scores: Vec::new(),
            average_scores: Vec::new(),
            q_table_sizes: Vec::new(),
            epsilons: Vec::new(),
            best_score: 0,
            best_episode: 0,
            total_steps: 0,
            window: window.max(1),
            started: Instant::now(),
        }
    }

    /// Record a finished episode. Returns true if the score is a new best.
    pub fn record_episode(
        &mut self,
        score: u32,
        steps: u32,
        q_table_size: usize,
        epsilon: f32,
    ) -> bool {
        self.scores.push(score);
        self.q_table_sizes.push(q_table_size);
        self.epsilons.push(epsilon);
        self.total_steps += u64::from(steps);

        let new_best = score > self.best_score;
        if new_best {
            self.best_score = score;
            self.best_episode = self.scores.len();
        }

        if self.scores.len() % self.window == 0 {
            self.average_scores.push(self.recent_average(self.window));
        }

        new_best
    }

    /// Mean score over the last `n` episodes
    pub fn recent_average(&self, n: usize) -> f32 {
        let n = self.scores.len().min(n);
        if n == 0 {
            return 0.0;
        }
        let sum: u32 = self.scores.iter().rev().take(n).sum();
        sum as f32 / n as f32
    }

    /// Mean score over the whole run
    pub fn mean_score(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.scores.iter().sum();
        sum as f32 / self.scores.len() as f32
    }

    /// Number of episodes recorded
    pub fn episodes(&self) -> usize {
        self.scores.len()
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn best_episode(&self) -> usize {
        self.best_episode
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Q-table size after the most recent episode
    pub fn final_q_table_size(&self) -> usize {
        self.q_table_sizes.last().copied().unwrap_or(0)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn average_scores(&self) -> &[f32] {
        &self.average_scores
    }

    pub fn q_table_sizes(&self) -> &[usize] {
        &self.q_table_sizes
    }

    pub fn epsilons(&self) -> &[f32] {
        &self.epsilons
    }

    /// Wall-clock time since the tracker was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Format an end-of-run summary line
    pub fn format_summary(&self) -> String {
        format!(
            "duration: {:.1}s | games: {} | best: {} (episode {}) | avg: {:.2} | states: {}",
            self.elapsed().as_secs_f64(),
            self.episodes(),
            self.best_score,
            self.best_episode,
            self.mean_score(),
            self.final_q_table_size(),
        )
    }

    /// Build the serializable report written at the end of a run
    pub fn to_report(&self, started_at: DateTime<Utc>) -> StatsReport {
        StatsReport {
            start_time: started_at.timestamp(),
            duration_secs: self.elapsed().as_secs_f64(),
            total_games: self.episodes(),
            best_score: self.best_score,
            average_score: self.mean_score(),
            scores_history: self.scores.clone(),
            average_scores: self.average_scores.clone(),
            q_table_sizes: self.q_table_sizes.clone(),
        }
    }
}

/// The stats document written alongside the training log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    /// Unix timestamp of the run start
    pub start_time: i64,
    pub duration_secs: f64,
    pub total_games: usize,
    pub best_score: u32,
    pub average_score: f32,
    pub scores_history: Vec<u32>,
    pub average_scores: Vec<f32>,
    pub q_table_sizes: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_empty() {
        let stats = TrainingStats::new(10);
        assert_eq!(stats.episodes(), 0);
        assert_eq!(stats.best_score(), 0);
        assert_eq!(stats.mean_score(), 0.0);
        assert_eq!(stats.recent_average(10), 0.0);
        assert_eq!(stats.final_q_table_size(), 0);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(10);
        stats.record_episode(3, 50, 40, 0.99);

        assert_eq!(stats.episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert_eq!(stats.final_q_table_size(), 40);
        assert!((stats.mean_score() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_best_score_tracking() {
        let mut stats = TrainingStats::new(10);

        assert!(stats.record_episode(2, 10, 5, 1.0));
        assert!(!stats.record_episode(1, 10, 6, 1.0));
        assert!(stats.record_episode(5, 10, 7, 1.0));
        assert!(!stats.record_episode(5, 10, 8, 1.0)); // equal is not a new best

        assert_eq!(stats.best_score(), 5);
        assert_eq!(stats.best_episode(), 3);
    }

    #[test]
    fn test_zero_score_first_episode_is_not_best() {
        let mut stats = TrainingStats::new(10);
        assert!(!stats.record_episode(0, 10, 5, 1.0));
        assert_eq!(stats.best_score(), 0);
    }

    #[test]
    fn test_windowed_averages() {
        let mut stats = TrainingStats::new(3);

        stats.record_episode(1, 10, 1, 1.0);
        stats.record_episode(2, 10, 2, 1.0);
        assert!(stats.average_scores().is_empty());

        stats.record_episode(3, 10, 3, 1.0);
        assert_eq!(stats.average_scores().len(), 1);
        assert!((stats.average_scores()[0] - 2.0).abs() < 1e-6);

        stats.record_episode(4, 10, 4, 1.0);
        stats.record_episode(5, 10, 5, 1.0);
        stats.record_episode(6, 10, 6, 1.0);
        assert_eq!(stats.average_scores().len(), 2);
        assert!((stats.average_scores()[1] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_recent_average() {
        let mut stats = TrainingStats::new(10);
        for score in [1, 2, 3, 4] {
            stats.record_episode(score, 10, 1, 1.0);
        }

        assert!((stats.recent_average(2) - 3.5).abs() < 1e-6);
        assert!((stats.recent_average(100) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_report_contents() {
        let mut stats = TrainingStats::new(2);
        stats.record_episode(1, 10, 5, 1.0);
        stats.record_episode(3, 20, 9, 0.99);

        let report = stats.to_report(Utc::now());

        assert_eq!(report.total_games, 2);
        assert_eq!(report.best_score, 3);
        assert_eq!(report.scores_history, vec![1, 3]);
        assert_eq!(report.q_table_sizes, vec![5, 9]);
        assert_eq!(report.average_scores.len(), 1);
        assert!((report.average_score - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let mut stats = TrainingStats::new(2);
        stats.record_episode(2, 15, 4, 0.9);

        let report = stats.to_report(Utc::now());
        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: StatsReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.total_games, 1);
        assert_eq!(parsed.scores_history, vec![2]);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(10);
        stats.record_episode(4, 100, 50, 0.5);

        let summary = stats.format_summary();
        assert!(summary.contains("games: 1"));
        assert!(summary.contains("best: 4"));
        assert!(summary.contains("states: 50"));
    }
}
