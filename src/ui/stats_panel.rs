// Stats panel rendering module
//
// Shows the StatsView overlay: protocol, target, packet counters and
// the legend. Packet numbers come from the animator only.

use crate::app::AppState;
use crate::model::Node;
use crate::theme::{
    get_attack_status_color, get_attack_status_text, ASH_GRAY, BONE_WHITE, PUMPKIN_ORANGE,
    SIGNAL_RED, TOXIC_GREEN,
};
use crate::viz::StatsView;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Build the overlay model from the current state
pub fn build_stats_view(app: &AppState) -> StatsView {
    let nodes: Vec<Node> = app
        .red_team
        .iter()
        .chain(app.blue_team.iter())
        .cloned()
        .collect();
    StatsView::build(
        app.counters(),
        app.in_flight(),
        &app.selection,
        &nodes,
        app.attack.target_port,
    )
}

pub fn render_stats_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let view = build_stats_view(app);
    let status = app.active_attack.as_ref().map(|a| a.status);

    let status_color = if view.attacking { SIGNAL_RED } else { ASH_GRAY };
    let mut lines = vec![
        Line::from(vec![
            Span::raw("  Status: "),
            Span::styled(
                view.status_label(),
                Style::default().fg(status_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({})", get_attack_status_text(status)),
                Style::default().fg(get_attack_status_color(status)),
            ),
        ]),
        row("Protocol", view.protocol.to_string(), view.protocol_color),
        row("Target", view.target.clone(), BONE_WHITE),
        row("Packets Sent", view.sent.to_string(), TOXIC_GREEN),
        row("Received", view.received.to_string(), TOXIC_GREEN),
        row("In Flight", view.in_flight.to_string(), PUMPKIN_ORANGE),
        row("Sources", view.active_sources.to_string(), SIGNAL_RED),
        Line::from(""),
    ];

    for entry in &view.legend {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(entry.symbol, Style::default().fg(entry.color)),
            Span::styled(format!(" {}", entry.label), Style::default().fg(ASH_GRAY)),
        ]));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                "━ 📊 Attack Stats ",
                Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(PUMPKIN_ORANGE)),
    );

    f.render_widget(panel, area);
}

fn row(label: &'static str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {label}: ")),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}
