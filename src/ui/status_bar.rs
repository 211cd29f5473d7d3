// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts, toggle
// indicators, the spawn rate and the frame interval.

use crate::app::config::DEFAULT_FRAME_MS;
use crate::app::AppState;
use crate::theme::{get_refresh_color, BONE_WHITE, ICE_BLUE, NEON_PURPLE, SIGNAL_RED, TOXIC_GREEN};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

struct Hint {
    priority: u8,
    key: &'static str,
    desc: &'static str,
    color: Color,
}

const HINTS: [Hint; 13] = [
    Hint {
        priority: 1,
        key: "Q:",
        desc: "Quit ",
        color: SIGNAL_RED,
    },
    Hint {
        priority: 1,
        key: "Tab:",
        desc: "Team | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 1,
        key: "↑↓:",
        desc: "Move | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 1,
        key: "Space:",
        desc: "Select | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 1,
        key: "Enter:",
        desc: "Launch | ",
        color: SIGNAL_RED,
    },
    Hint {
        priority: 1,
        key: "S:",
        desc: "Stop | ",
        color: SIGNAL_RED,
    },
    Hint {
        priority: 2,
        key: "Y:",
        desc: "Type | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 2,
        key: "V:",
        desc: "View | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 2,
        key: "+/-:",
        desc: "Rate | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 2,
        key: "[/]:",
        desc: "FPS | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 3,
        key: "L:",
        desc: "Labels | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 3,
        key: "I:",
        desc: "Spoof | ",
        color: NEON_PURPLE,
    },
    Hint {
        priority: 3,
        key: "R:",
        desc: "Reset | ",
        color: NEON_PURPLE,
    },
];

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let toggle_indicators = build_toggle_indicators(app);
    let toggles_width: usize = toggle_indicators.iter().map(|s| s.content.width()).sum();

    // Available width for hints (subtract borders, icon and toggles)
    let available_width = (area.width as usize).saturating_sub(4 + toggles_width + 1);

    let mut spans = vec![Span::styled(" ⚡ ", Style::default().fg(SIGNAL_RED))];
    spans.extend(fit_hints(available_width));
    spans.push(Span::raw(" "));
    spans.extend(toggle_indicators);

    let status_bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

/// Hint spans in priority order, adding hints until `width` runs out
fn fit_hints(width: usize) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut current_length = 0;

    for priority in 1..=3 {
        for hint in HINTS.iter().filter(|h| h.priority == priority) {
            let hint_length = hint.key.width() + hint.desc.width();
            if current_length + hint_length <= width {
                spans.push(Span::styled(
                    hint.key,
                    Style::default().fg(hint.color).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(hint.desc));
                current_length += hint_length;
            }
        }
    }

    spans
}

/// Build toggle status indicator spans for the status bar
/// Shows [l:ON/OFF] [v:2D/ISO] [i:ON/OFF], the spawn rate and the frame interval
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    let on_off = |enabled: bool| {
        if enabled {
            ("ON", TOXIC_GREEN)
        } else {
            ("OFF", BONE_WHITE)
        }
    };

    let (labels_state, labels_color) = on_off(app.render.labels_enabled);
    push_indicator(&mut spans, "l", labels_state.to_string(), labels_color, false);

    push_indicator(
        &mut spans,
        "v",
        app.render.renderer.label().to_string(),
        ICE_BLUE,
        false,
    );

    let (spoof_state, spoof_color) = on_off(app.attack.enable_ip_spoofing);
    push_indicator(&mut spans, "i", spoof_state.to_string(), spoof_color, false);

    push_indicator(
        &mut spans,
        "pps",
        format!("{:.0}", app.render.packets_per_second),
        Color::Cyan,
        false,
    );

    let recently_changed = app.refresh_config.recently_changed();
    let frame_color =
        get_refresh_color(app.refresh_config.frame_ms, DEFAULT_FRAME_MS, recently_changed);
    push_indicator(
        &mut spans,
        "frame",
        format!("{}ms", app.refresh_config.frame_ms),
        frame_color,
        recently_changed,
    );

    spans
}

fn push_indicator(
    spans: &mut Vec<Span<'static>>,
    key: &'static str,
    value: String,
    color: Color,
    highlight: bool,
) {
    let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if highlight {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    spans.push(Span::styled(format!("[{key}:"), Style::default().fg(BONE_WHITE)));
    spans.push(Span::styled(value, style));
    spans.push(Span::styled("] ", Style::default().fg(BONE_WHITE)));
}
