// Operator log rendering module
//
// Renders the newest operator log lines (launches, feed messages,
// tool output, errors) colored by severity.

use crate::app::AppState;
use crate::theme::{get_log_color, PUMPKIN_ORANGE};
use crate::ui::format_elapsed;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn render_feed_log(f: &mut Frame, area: Rect, app: &AppState) {
    // Only the lines that fit, newest at the bottom
    let visible = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(2) as usize;
    let skip = app.logs.len().saturating_sub(visible);

    let items: Vec<ListItem> = app
        .logs
        .iter()
        .skip(skip)
        .map(|entry| {
            let stamp = format!("{} ", format_elapsed(entry.at));
            let source = entry
                .source
                .as_deref()
                .map(|s| format!("[{s}] "))
                .unwrap_or_default();
            let used = stamp.width() + source.width();
            let message = truncate_to_width(&entry.message, width.saturating_sub(used));

            ListItem::new(Line::from(vec![
                Span::styled(stamp, Style::default().fg(Color::DarkGray)),
                Span::styled(source, Style::default().fg(Color::Cyan)),
                Span::styled(message, Style::default().fg(get_log_color(entry.level))),
            ]))
        })
        .collect();

    let title = format!("━ 📜 Operator Log ({}) ", app.logs.len());

    let logs = List::new(items).block(
        Block::default()
            .title(vec![
                Span::styled(
                    title,
                    Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
                ),
                Span::styled("━━━━━━━", Style::default().fg(PUMPKIN_ORANGE)),
            ])
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(PUMPKIN_ORANGE)),
    );

    f.render_widget(logs, area);
}

/// Cut `text` to at most `max` terminal columns, marking the cut with '…'
pub fn truncate_to_width(text: &str, max: usize) -> String {
    // Tool output is multi-line; keep the first line only
    let first = text.lines().next().unwrap_or("");
    if first.width() <= max && first.len() == text.len() {
        return first.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in first.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
