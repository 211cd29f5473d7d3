// Attack map rendering module
//
// Replays the shapes of the last completed animation frame inside a
// Braille canvas. The canvas uses the same [0, 100] x [0, 100] space
// the render backends record in.

use crate::app::AppState;
use crate::theme::{ASH_GRAY, BONE_WHITE, ICE_BLUE, NEON_PURPLE, SIGNAL_RED};
use crate::viz::backend::dash_segments;
use crate::viz::Shape;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, BorderType, Borders, Paragraph,
    },
    Frame,
};

pub fn render_attack_map(f: &mut Frame, area: Rect, app: &AppState) {
    // Split: summary line + canvas
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let target = app
        .target_node()
        .map(|n| n.display_name.as_str())
        .unwrap_or("no target");
    let summary = Line::from(vec![
        Span::styled(
            format!("━ 🗺  Attack Map [{}] ", app.render.renderer.label()),
            Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} source(s)", app.selection.sources.len()),
            Style::default().fg(SIGNAL_RED),
        ),
        Span::styled(" → ", Style::default().fg(BONE_WHITE)),
        Span::styled(target, Style::default().fg(ICE_BLUE)),
        Span::styled(
            format!("  {}", app.selection.attack_type.display_name()),
            Style::default().fg(ASH_GRAY),
        ),
    ]);

    let header = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(NEON_PURPLE)),
    );
    f.render_widget(header, chunks[0]);

    let shapes = &app.shapes;

    // Canvas with Braille markers
    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            // Lines first, so glyphs and labels sit on top
            for shape in shapes {
                if let Shape::Line {
                    from,
                    to,
                    color,
                    dashed,
                } = shape
                {
                    draw_line(ctx, *from, *to, *color, *dashed);
                }
            }
            ctx.layer();

            for shape in shapes {
                match shape {
                    Shape::Line { .. } => {}
                    Shape::Glyph {
                        at,
                        symbol,
                        color,
                        bold,
                    } => {
                        let mut style = Style::default().fg(*color);
                        if *bold {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        ctx.print(at.0, at.1, Span::styled(*symbol, style));
                    }
                    Shape::Label { at, text, color } => {
                        ctx.print(
                            at.0,
                            at.1,
                            Span::styled(text.clone(), Style::default().fg(*color)),
                        );
                    }
                }
            }
        });

    f.render_widget(canvas, chunks[1]);
}

fn draw_line(
    ctx: &mut Context,
    from: (f64, f64),
    to: (f64, f64),
    color: ratatui::style::Color,
    dashed: bool,
) {
    let segments = if dashed {
        dash_segments(from, to)
    } else {
        vec![(from, to)]
    };
    for ((x1, y1), (x2, y2)) in segments {
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}
