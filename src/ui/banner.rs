// Banner rendering module
//
// Renders the top banner with ASCII art logo, the API connectivity
// badge and the attack status indicator.

use crate::app::AppState;
use crate::theme::{
    get_attack_status_color, get_attack_status_text, interpolate_color, ASH_GRAY, BLOOD_RED,
    NEON_PURPLE, PUMPKIN_ORANGE, TOXIC_GREEN,
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

const LOGO: [&str; 4] = [
    r"  ___ _____ ___ ___ _  _____ __  __   _   ___ ",
    r" / __|_   _| _ \_ _| |/ / __|  \/  | /_\ | _ \",
    r" \__ \ | | |   /| || ' <| _|| |\/| |/ _ \|  _/",
    r" |___/ |_| |_|_\___|_|\_\___|_|  |_/_/ \_\_|  ",
];

/// Logo gradient endpoints, top to bottom
const LOGO_TOP: (u8, u8, u8) = (239, 68, 68);
const LOGO_BOTTOM: (u8, u8, u8) = (138, 43, 226);

pub fn render_banner(f: &mut Frame, area: Rect, app: &AppState) {
    let status = app.active_attack.as_ref().map(|a| a.status);

    let api_badge = if app.api_connected {
        Span::styled(
            "[● API ONLINE]",
            Style::default().fg(TOXIC_GREEN).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "[○ API OFFLINE]",
            Style::default().fg(BLOOD_RED).add_modifier(Modifier::BOLD),
        )
    };

    let attack_text = match &app.active_attack {
        Some(attack) => format!(
            "[⚡ {}: {} → {}:{}]",
            get_attack_status_text(status),
            attack.attack_type.display_name(),
            attack.target_address,
            attack.target_port
        ),
        None => format!("[⚡ {}]", get_attack_status_text(status)),
    };

    // Text shown to the right of each logo line
    let side: [Vec<Span>; 4] = [
        vec![],
        vec![Span::styled(
            "   >>> Red Team / Blue Team Attack Map <<<",
            Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
        )],
        vec![Span::styled(
            "   \"Watch the flood, not the logs.\"",
            Style::default().fg(ASH_GRAY),
        )],
        vec![
            Span::raw("   "),
            api_badge,
            Span::raw(" "),
            Span::styled(
                attack_text,
                Style::default().fg(get_attack_status_color(status)),
            ),
        ],
    ];

    let last = (LOGO.len() - 1) as f32;
    let banner_text: Vec<Line> = LOGO
        .iter()
        .zip(side)
        .enumerate()
        .map(|(i, (logo, extra))| {
            let color = interpolate_color(LOGO_TOP, LOGO_BOTTOM, i as f32 / last);
            let mut spans = vec![Span::styled(
                *logo,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            spans.extend(extra);
            Line::from(spans)
        })
        .collect();

    let banner = Paragraph::new(banner_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(banner, area);
}
