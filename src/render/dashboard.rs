//! Live training dashboard
//!
//! Charts the same two panels the end-of-run stats file captures: score per
//! episode with its rolling average, and Q-table growth. Fed by snapshots
//! from the training thread.

use std::collections::VecDeque;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph},
    Frame,
};

use crate::modes::train::TrainingSnapshot;

const MAX_HISTORY: usize = 500;

/// Dashboard state holding history buffers and current values
pub struct DashboardState {
    /// (episode, score) points
    pub score_history: VecDeque<(f64, f64)>,
    /// (episode, rolling average) points
    pub avg_history: VecDeque<(f64, f64)>,
    /// (episode, q-table size) points
    pub table_history: VecDeque<(f64, f64)>,

    pub episode: usize,
    pub total_episodes: usize,
    pub epsilon: f32,
    pub recent_average: f32,
    pub best_score: u32,
    pub states_seen: usize,
    pub finished: bool,
}

impl DashboardState {
    pub fn new(total_episodes: usize) -> Self {
        Self {
            score_history: VecDeque::new(),
            avg_history: VecDeque::new(),
            table_history: VecDeque::new(),
            episode: 0,
            total_episodes,
            epsilon: 1.0,
            recent_average: 0.0,
            best_score: 0,
            states_seen: 0,
            finished: false,
        }
    }

    /// Apply a snapshot from the training thread
    pub fn apply_snapshot(&mut self, snap: &TrainingSnapshot) {
        self.episode = snap.episode;
        self.total_episodes = snap.total_episodes;
        self.epsilon = snap.epsilon;
        self.recent_average = snap.recent_average;
        self.best_score = snap.best_score;
        self.states_seen = snap.states_seen;

        let ep = snap.episode as f64;
        push_capped(&mut self.score_history, (ep, f64::from(snap.score)));
        push_capped(&mut self.avg_history, (ep, f64::from(snap.recent_average)));
        push_capped(&mut self.table_history, (ep, snap.states_seen as f64));
    }

    /// Progress ratio in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.total_episodes == 0 {
            return 0.0;
        }
        (self.episode as f64 / self.total_episodes as f64).min(1.0)
    }
}

fn push_capped(history: &mut VecDeque<(f64, f64)>, point: (f64, f64)) {
    history.push_back(point);
    if history.len() > MAX_HISTORY {
        history.pop_front();
    }
}

/// Render the full training dashboard
pub fn render(frame: &mut Frame, dashboard: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(12),   // Charts
            Constraint::Length(3), // Progress gauge
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, dashboard, chunks[0]);

    let chart_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_score_chart(frame, dashboard, chart_rows[0]);
    render_table_chart(frame, dashboard, chart_rows[1]);
    render_progress(frame, dashboard, chunks[2]);
    render_footer(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, dashboard: &DashboardState, area: Rect) {
    let (status_str, status_color) = if dashboard.finished {
        ("FINISHED", Color::Cyan)
    } else {
        ("RUNNING", Color::Green)
    };

    let header_text = Line::from(vec![
        Span::styled(
            "Q-learning training",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(format!(
            "Episode {}/{}",
            dashboard.episode, dashboard.total_episodes
        )),
        Span::raw("  |  "),
        Span::raw(format!("epsilon {:.3}", dashboard.epsilon)),
        Span::raw("  |  "),
        Span::raw(format!("avg {:.2}", dashboard.recent_average)),
        Span::raw("  |  "),
        Span::raw(format!("best {}", dashboard.best_score)),
        Span::raw("  |  "),
        Span::raw(format!("states {}", dashboard.states_seen)),
        Span::raw("  ["),
        Span::styled(
            status_str,
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("]"),
    ]);

    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_score_chart(frame: &mut Frame, dashboard: &DashboardState, area: Rect) {
    let score_data: Vec<(f64, f64)> = dashboard.score_history.iter().copied().collect();
    let avg_data: Vec<(f64, f64)> = dashboard.avg_history.iter().copied().collect();

    let (x_min, x_max) = x_bounds(&score_data, dashboard.total_episodes);
    let y_max = score_data
        .iter()
        .map(|&(_, y)| y)
        .fold(1.0_f64, f64::max)
        .ceil()
        + 1.0;

    let mut datasets = Vec::new();
    if !score_data.is_empty() {
        datasets.push(
            Dataset::default()
                .name("Score")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::DarkGray))
                .data(&score_data),
        );
    }
    if !avg_data.is_empty() {
        datasets.push(
            Dataset::default()
                .name("Average (10 eps)")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&avg_data),
        );
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Scores "),
        )
        .x_axis(
            Axis::default()
                .title("episode")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(axis_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(axis_labels(0.0, y_max)),
        );

    frame.render_widget(chart, area);
}

fn render_table_chart(frame: &mut Frame, dashboard: &DashboardState, area: Rect) {
    let table_data: Vec<(f64, f64)> = dashboard.table_history.iter().copied().collect();

    let (x_min, x_max) = x_bounds(&table_data, dashboard.total_episodes);
    let y_max = table_data
        .iter()
        .map(|&(_, y)| y)
        .fold(8.0_f64, f64::max)
        + 8.0;

    let mut datasets = Vec::new();
    if !table_data.is_empty() {
        datasets.push(
            Dataset::default()
                .name("States")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&table_data),
        );
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Q-table growth "),
        )
        .x_axis(
            Axis::default()
                .title("episode")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(axis_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .title("states")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(axis_labels(0.0, y_max)),
        );

    frame.render_widget(chart, area);
}

fn render_progress(frame: &mut Frame, dashboard: &DashboardState, area: Rect) {
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(dashboard.progress())
        .label(format!(
            "{}/{} episodes",
            dashboard.episode, dashboard.total_episodes
        ));

    frame.render_widget(gauge, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Q", Style::default().fg(Color::Red)),
        Span::raw(" stop training (progress is saved)"),
    ]))
    .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

/// X range covering the buffered points, extending to the planned episode
/// count when the run is young
fn x_bounds(data: &[(f64, f64)], total_episodes: usize) -> (f64, f64) {
    let first = data.first().map(|&(x, _)| x).unwrap_or(0.0);
    let last = data.last().map(|&(x, _)| x).unwrap_or(0.0);
    let max = last.max(total_episodes.min(MAX_HISTORY) as f64).max(first + 1.0);
    (first, max)
}

fn axis_labels(min: f64, max: f64) -> Vec<Span<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Span::raw(format!("{min:.0}")),
        Span::raw(format!("{mid:.0}")),
        Span::raw(format!("{max:.0}")),
    ]
}
