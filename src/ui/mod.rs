// UI rendering module
//
// This module contains all UI rendering components for strikemap.
// The main draw() function orchestrates rendering of all UI panels.

mod attack_map;
mod banner;
mod feed_log;
mod range_panel;
mod stats_panel;
mod status_bar;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use attack_map::render_attack_map;
use banner::render_banner;
use feed_log::render_feed_log;
use range_panel::render_range_panel;
use stats_panel::render_stats_panel;
use status_bar::render_status_bar;

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let size = f.area();

    // Main layout: banner, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Banner
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_banner(f, chunks[0], app);

    // Body: attack map + right panels
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Attack map
            Constraint::Percentage(35), // Right panels
        ])
        .split(chunks[1]);

    render_attack_map(f, body_chunks[0], app);

    // Right side: range, stats, operator log
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12), // Range
            Constraint::Length(17), // Stats + legend
            Constraint::Min(0),     // Operator log
        ])
        .split(body_chunks[1]);

    render_range_panel(f, right_chunks[0], app);
    render_stats_panel(f, right_chunks[1], app);
    render_feed_log(f, right_chunks[2], app);

    render_status_bar(f, chunks[2], app);
}

/// Format time since startup as mm:ss
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
