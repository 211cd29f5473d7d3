// Range panel rendering module
//
// Lists both teams with online state, selection marks and the
// keyboard cursor.

use crate::app::{AppState, Focus};
use crate::model::Node;
use crate::theme::{ASH_GRAY, BONE_WHITE, ICE_BLUE, NEON_PURPLE, SIGNAL_RED, TOXIC_GREEN};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

/// Cursor row background (Deep Indigo)
const CURSOR_BG: Color = Color::Rgb(47, 51, 77);

pub fn render_range_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let mut items = Vec::new();

    items.push(team_header("RED TEAM", SIGNAL_RED, app.focus == Focus::Red));
    for (idx, node) in app.red_team.iter().enumerate() {
        let mark = if app.selection.is_source(&node.id) {
            "[x]"
        } else {
            "[ ]"
        };
        let on_cursor = app.focus == Focus::Red && app.red_cursor == idx;
        items.push(node_item(node, mark, SIGNAL_RED, on_cursor));
    }

    items.push(team_header("BLUE TEAM", ICE_BLUE, app.focus == Focus::Blue));
    for (idx, node) in app.blue_team.iter().enumerate() {
        let mark = if app.selection.is_target(&node.id) {
            "(•)"
        } else {
            "( )"
        };
        let on_cursor = app.focus == Focus::Blue && app.blue_cursor == idx;
        items.push(node_item(node, mark, ICE_BLUE, on_cursor));
    }

    let list = List::new(items).block(
        Block::default()
            .title(Span::styled(
                "━ 🎯 Range ",
                Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(NEON_PURPLE)),
    );

    f.render_widget(list, area);
}

fn team_header(title: &'static str, color: Color, focused: bool) -> ListItem<'static> {
    let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if focused {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    ListItem::new(Line::from(Span::styled(format!(" {title}"), style)))
}

fn node_item(
    node: &Node,
    mark: &'static str,
    mark_color: Color,
    on_cursor: bool,
) -> ListItem<'static> {
    let (dot, dot_color) = if node.is_online {
        ("●", TOXIC_GREEN)
    } else {
        ("○", ASH_GRAY)
    };
    let pointer = if on_cursor { "▶" } else { " " };

    let item = ListItem::new(Line::from(vec![
        Span::styled(format!(" {pointer} "), Style::default().fg(BONE_WHITE)),
        Span::styled(mark, Style::default().fg(mark_color)),
        Span::styled(format!(" {dot} "), Style::default().fg(dot_color)),
        Span::styled(node.display_name.clone(), Style::default().fg(BONE_WHITE)),
        Span::styled(format!("  {}", node.address), Style::default().fg(ASH_GRAY)),
    ]));

    if on_cursor {
        item.style(Style::default().bg(CURSOR_BG))
    } else {
        item
    }
}
