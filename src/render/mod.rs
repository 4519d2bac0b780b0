pub mod dashboard;
pub mod renderer;

pub use dashboard::DashboardState;
pub use renderer::{Renderer, WatchOverlay};
