// Render backends
//
// One capability set (project, draw node, draw connection, draw
// particle) with interchangeable layouts. Backends record shapes in
// canvas space [0, 100] x [0, 100]; the UI replays the last completed
// frame inside a ratatui Canvas.

use crate::app::config::{RendererKind, TRAIL_LENGTH};
use crate::model::{Node, Team};
use crate::theme::{ASH_GRAY, BONE_WHITE, ICE_BLUE, NEON_PURPLE, SIGNAL_RED};
use crate::viz::particle::ParticleStyle;
use crate::viz::projector::{depth_lane_position, iso_to_screen, lane_position, Point};
use ratatui::style::Color;

/// Amplitude of the cosmetic packet wave in the flat layout (canvas units)
const FLAT_WAVE_AMPLITUDE: f64 = 2.0;

/// Amplitude of the cosmetic packet wave in the isometric layout (logical units)
const ISO_WAVE_AMPLITUDE: f64 = 0.15;

/// Half the footprint of a server block in the isometric layout
const BLOCK_HALF: f64 = 0.35;

/// Height of a server block in the isometric layout
const BLOCK_HEIGHT: f64 = 0.5;

/// Length of each dash, and of each gap, in canvas units
pub const DASH_LENGTH: f64 = 2.0;

/// How a connection line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    /// Attack is running along this path: solid and bright
    Active,
    /// Source and target are selected but idle: dashed and dim
    Selected,
}

/// Selection highlight for a node glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHighlight {
    None,
    Source,
    Target,
}

/// A recorded drawing primitive in canvas space
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        dashed: bool,
    },
    Glyph {
        at: (f64, f64),
        symbol: &'static str,
        color: Color,
        bold: bool,
    },
    Label {
        at: (f64, f64),
        text: String,
        color: Color,
    },
}

/// Drawing surface shared by every layout
///
/// `project` must be pure: the same (team, slot, total) always yields
/// the same point, so lines, nodes and particles drawn in separate
/// passes stay aligned.
pub trait RenderBackend {
    /// Logical position of a node
    fn project(&self, team: Team, slot: usize, total: usize) -> Point;

    /// Amplitude of the cosmetic wave applied to particle positions
    fn wave_amplitude(&self) -> f64;

    /// Forget the shapes of the previous frame
    fn begin_frame(&mut self);

    fn draw_node(&mut self, node: &Node, at: Point, highlight: NodeHighlight, labels: bool);

    fn draw_connection(&mut self, from: Point, to: Point, stroke: Stroke, color: Color);

    fn draw_particle(&mut self, at: Point, style: &ParticleStyle);

    /// One fading trail position, `age` frames behind its particle
    fn draw_trail(&mut self, at: Point, style: &ParticleStyle, age: usize);

    /// Hand over the shapes recorded since `begin_frame`
    fn take_shapes(&mut self) -> Vec<Shape>;
}

/// Build the backend for a renderer kind
pub fn create_backend(kind: RendererKind) -> Box<dyn RenderBackend> {
    match kind {
        RendererKind::Flat => Box::new(FlatBackend::new()),
        RendererKind::Isometric => Box::new(IsometricBackend::new()),
    }
}

/// Color of an unselected offline node
pub const OFFLINE_COLOR: Color = ASH_GRAY;

/// Color of an online node of `team` with the given highlight
pub fn team_color(team: Team, highlight: NodeHighlight) -> Color {
    match highlight {
        NodeHighlight::Source => SIGNAL_RED,
        NodeHighlight::Target => ICE_BLUE,
        NodeHighlight::None => match team {
            Team::Attacker => NEON_PURPLE,
            Team::Target => BONE_WHITE,
        },
    }
}

fn node_color(node: &Node, highlight: NodeHighlight) -> Color {
    if highlight == NodeHighlight::None && !node.is_online {
        OFFLINE_COLOR
    } else {
        team_color(node.team, highlight)
    }
}

pub fn node_symbol(team: Team) -> &'static str {
    match team {
        Team::Attacker => "◆",
        Team::Target => "■",
    }
}

/// Dim a connection color for idle (selected but not attacking) paths
fn dim(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(r / 2, g / 2, b / 2),
        other => other,
    }
}

/// Trail color: half brightness right behind the packet, fading with age
fn trail_color(color: Color, age: usize) -> Color {
    let Color::Rgb(r, g, b) = color else {
        return ASH_GRAY;
    };
    let steps = TRAIL_LENGTH + 1;
    let keep = steps.saturating_sub(age) as f64 / steps as f64 * 0.5;
    let scale = |c: u8| (f64::from(c) * keep).round() as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

fn record_trail(shapes: &mut Vec<Shape>, at: (f64, f64), color: Color, age: usize) {
    shapes.push(Shape::Glyph {
        at,
        symbol: "·",
        color: trail_color(color, age),
        bold: false,
    });
}

/// Record the glyph and optional two-line label of a node at a canvas point
fn record_node(
    shapes: &mut Vec<Shape>,
    at: (f64, f64),
    node: &Node,
    highlight: NodeHighlight,
    labels: bool,
) {
    let color = node_color(node, highlight);
    shapes.push(Shape::Glyph {
        at,
        symbol: node_symbol(node.team),
        color,
        bold: highlight != NodeHighlight::None,
    });

    if labels {
        let (x, y) = at;
        shapes.push(Shape::Label {
            at: (x - 6.0, y - 4.0),
            text: node.display_name.clone(),
            color,
        });
        shapes.push(Shape::Label {
            at: (x - 6.0, y - 7.0),
            text: node.address.clone(),
            color: ASH_GRAY,
        });
    }
}

fn record_connection(
    shapes: &mut Vec<Shape>,
    from: (f64, f64),
    to: (f64, f64),
    stroke: Stroke,
    color: Color,
) {
    let (color, dashed) = match stroke {
        Stroke::Active => (color, false),
        Stroke::Selected => (dim(color), true),
    };
    shapes.push(Shape::Line {
        from,
        to,
        color,
        dashed,
    });
}

/// Split a line into dash segments of DASH_LENGTH separated by equal gaps
///
/// # Returns
/// The (from, to) endpoints of every visible dash. A degenerate line
/// yields nothing.
pub fn dash_segments(from: (f64, f64), to: (f64, f64)) -> Vec<((f64, f64), (f64, f64))> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let length = (dx * dx + dy * dy).sqrt();
    if !length.is_finite() || length <= f64::EPSILON {
        return Vec::new();
    }

    let (ux, uy) = (dx / length, dy / length);
    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + DASH_LENGTH).min(length);
        segments.push((
            (from.0 + ux * start, from.1 + uy * start),
            (from.0 + ux * end, from.1 + uy * end),
        ));
        start += DASH_LENGTH * 2.0;
    }
    segments
}

// ============================================================================
// Flat layout
// ============================================================================

/// Two vertical lanes, attackers left and targets right
#[derive(Debug, Default)]
pub struct FlatBackend {
    shapes: Vec<Shape>,
}

impl FlatBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for FlatBackend {
    fn project(&self, team: Team, slot: usize, total: usize) -> Point {
        lane_position(slot, total, team)
    }

    fn wave_amplitude(&self) -> f64 {
        FLAT_WAVE_AMPLITUDE
    }

    fn begin_frame(&mut self) {
        self.shapes.clear();
    }

    fn draw_node(&mut self, node: &Node, at: Point, highlight: NodeHighlight, labels: bool) {
        record_node(&mut self.shapes, (at.x, at.y), node, highlight, labels);
    }

    fn draw_connection(&mut self, from: Point, to: Point, stroke: Stroke, color: Color) {
        record_connection(&mut self.shapes, (from.x, from.y), (to.x, to.y), stroke, color);
    }

    fn draw_particle(&mut self, at: Point, style: &ParticleStyle) {
        self.shapes.push(Shape::Glyph {
            at: (at.x, at.y),
            symbol: style.glyph(),
            color: style.color,
            bold: false,
        });
    }

    fn draw_trail(&mut self, at: Point, style: &ParticleStyle, age: usize) {
        record_trail(&mut self.shapes, (at.x, at.y), style.color, age);
    }

    fn take_shapes(&mut self) -> Vec<Shape> {
        std::mem::take(&mut self.shapes)
    }
}

// ============================================================================
// Isometric layout
// ============================================================================

/// Depth lanes in a logical 3D space, projected obliquely onto the canvas
///
/// Machines are drawn as small wireframe blocks so the depth axis reads
/// at a glance.
#[derive(Debug, Default)]
pub struct IsometricBackend {
    shapes: Vec<Shape>,
}

impl IsometricBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outline of a server block standing on `base`
    fn record_block(&mut self, base: Point, color: Color) {
        let top = base.z + BLOCK_HEIGHT;
        let corners = [
            Point::new(base.x - BLOCK_HALF, base.y - BLOCK_HALF, top),
            Point::new(base.x + BLOCK_HALF, base.y - BLOCK_HALF, top),
            Point::new(base.x + BLOCK_HALF, base.y + BLOCK_HALF, top),
            Point::new(base.x - BLOCK_HALF, base.y + BLOCK_HALF, top),
        ];

        for i in 0..corners.len() {
            let a = corners[i];
            let b = corners[(i + 1) % corners.len()];
            self.shapes.push(Shape::Line {
                from: iso_to_screen(a),
                to: iso_to_screen(b),
                color,
                dashed: false,
            });
        }

        // Front edges down to the floor
        for corner in [corners[0], corners[1], corners[3]] {
            let floor = Point::new(corner.x, corner.y, base.z - BLOCK_HEIGHT);
            self.shapes.push(Shape::Line {
                from: iso_to_screen(corner),
                to: iso_to_screen(floor),
                color,
                dashed: false,
            });
        }
    }
}

impl RenderBackend for IsometricBackend {
    fn project(&self, team: Team, slot: usize, total: usize) -> Point {
        depth_lane_position(slot, total, team)
    }

    fn wave_amplitude(&self) -> f64 {
        ISO_WAVE_AMPLITUDE
    }

    fn begin_frame(&mut self) {
        self.shapes.clear();
    }

    fn draw_node(&mut self, node: &Node, at: Point, highlight: NodeHighlight, labels: bool) {
        self.record_block(at, node_color(node, highlight));
        record_node(&mut self.shapes, iso_to_screen(at), node, highlight, labels);
    }

    fn draw_connection(&mut self, from: Point, to: Point, stroke: Stroke, color: Color) {
        record_connection(
            &mut self.shapes,
            iso_to_screen(from),
            iso_to_screen(to),
            stroke,
            color,
        );
    }

    fn draw_particle(&mut self, at: Point, style: &ParticleStyle) {
        self.shapes.push(Shape::Glyph {
            at: iso_to_screen(at),
            symbol: style.glyph(),
            color: style.color,
            bold: false,
        });
    }

    fn draw_trail(&mut self, at: Point, style: &ParticleStyle, age: usize) {
        record_trail(&mut self.shapes, iso_to_screen(at), style.color, age);
    }

    fn take_shapes(&mut self) -> Vec<Shape> {
        std::mem::take(&mut self.shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttackType;

    fn node(team: Team) -> Node {
        let mut node = Node::new("n", "Node", "10.0.0.9", "role", team, 0);
        node.is_online = true;
        node
    }

    #[test]
    fn test_create_backend_layouts() {
        assert_eq!(
            create_backend(RendererKind::Flat).project(Team::Target, 1, 3),
            lane_position(1, 3, Team::Target)
        );
        assert_eq!(
            create_backend(RendererKind::Isometric).project(Team::Target, 1, 3),
            depth_lane_position(1, 3, Team::Target)
        );
    }

    #[test]
    fn test_flat_projects_onto_lanes() {
        let backend = FlatBackend::new();
        assert_eq!(
            backend.project(Team::Attacker, 0, 1),
            lane_position(0, 1, Team::Attacker)
        );
        assert_eq!(
            backend.project(Team::Target, 2, 3),
            lane_position(2, 3, Team::Target)
        );
    }

    #[test]
    fn test_selected_stroke_is_dashed_and_dim() {
        let mut backend = FlatBackend::new();
        let color = Color::Rgb(200, 100, 50);
        let (from, to) = (Point::flat(0.0, 0.0), Point::flat(10.0, 0.0));
        backend.draw_connection(from, to, Stroke::Selected, color);
        backend.draw_connection(from, to, Stroke::Active, color);

        let shapes = backend.take_shapes();
        assert_eq!(
            shapes[0],
            Shape::Line {
                from: (0.0, 0.0),
                to: (10.0, 0.0),
                color: Color::Rgb(100, 50, 25),
                dashed: true,
            }
        );
        assert!(matches!(shapes[1], Shape::Line { dashed: false, color: c, .. } if c == color));
    }

    #[test]
    fn test_labels_toggle() {
        let mut backend = FlatBackend::new();
        let (red, at) = (node(Team::Attacker), Point::flat(15.0, 50.0));
        backend.draw_node(&red, at, NodeHighlight::None, false);
        assert_eq!(backend.take_shapes().len(), 1);

        backend.draw_node(&red, at, NodeHighlight::None, true);
        let shapes = backend.take_shapes();
        assert_eq!(shapes.len(), 3);
        assert!(matches!(&shapes[1], Shape::Label { text, .. } if text == "Node"));
        assert!(matches!(&shapes[2], Shape::Label { text, .. } if text == "10.0.0.9"));
    }

    #[test]
    fn test_node_colors() {
        let mut offline = node(Team::Target);
        offline.is_online = false;
        assert_eq!(node_color(&offline, NodeHighlight::None), ASH_GRAY);
        assert_eq!(node_color(&offline, NodeHighlight::Target), ICE_BLUE);
        assert_eq!(node_color(&node(Team::Attacker), NodeHighlight::Source), SIGNAL_RED);
    }

    #[test]
    fn test_begin_frame_clears_previous_shapes() {
        let mut backend = IsometricBackend::new();
        let style = ParticleStyle::for_attack(AttackType::HttpFlood, 2.0);
        backend.draw_particle(Point::default(), &style);
        backend.begin_frame();
        assert!(backend.take_shapes().is_empty());
    }

    #[test]
    fn test_isometric_particle_is_projected() {
        let mut backend = IsometricBackend::new();
        let style = ParticleStyle::for_attack(AttackType::IcmpFlood, 4.5);
        let at = Point::new(1.0, 0.0, 2.0);
        backend.draw_particle(at, &style);

        let shapes = backend.take_shapes();
        assert_eq!(
            shapes,
            vec![Shape::Glyph {
                at: iso_to_screen(at),
                symbol: "●",
                color: style.color,
                bold: false,
            }]
        );
    }

    #[test]
    fn test_isometric_node_draws_block_then_glyph() {
        let mut backend = IsometricBackend::new();
        let at = backend.project(Team::Target, 0, 3);
        backend.draw_node(&node(Team::Target), at, NodeHighlight::Target, false);

        let shapes = backend.take_shapes();
        // Four top edges, three uprights, one glyph
        assert_eq!(shapes.len(), 8);
        assert!(matches!(
            shapes.last(),
            Some(Shape::Glyph { symbol: "■", bold: true, .. })
        ));
    }

    #[test]
    fn test_trail_fades_with_age() {
        let mut backend = FlatBackend::new();
        let style = ParticleStyle::for_attack(AttackType::SynFlood, 3.0);
        backend.draw_trail(Point::flat(40.0, 50.0), &style, TRAIL_LENGTH);
        backend.draw_trail(Point::flat(42.0, 50.0), &style, 1);

        let colors: Vec<Color> = backend
            .take_shapes()
            .into_iter()
            .filter_map(|shape| match shape {
                Shape::Glyph { symbol: "·", color, .. } => Some(color),
                _ => None,
            })
            .collect();
        assert_eq!(colors.len(), 2);

        let brightness = |c: Color| match c {
            Color::Rgb(r, g, b) => u32::from(r) + u32::from(g) + u32::from(b),
            _ => 0,
        };
        assert!(brightness(colors[0]) < brightness(colors[1]));
        assert!(brightness(colors[1]) < brightness(style.color));
    }

    #[test]
    fn test_dash_segments() {
        let segments = dash_segments((0.0, 0.0), (10.0, 0.0));
        // Dashes start at 0, 4 and 8; the last one is cut at the end point
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], ((0.0, 0.0), (2.0, 0.0)));
        assert_eq!(segments[2], ((8.0, 0.0), (10.0, 0.0)));

        assert!(dash_segments((5.0, 5.0), (5.0, 5.0)).is_empty());
    }
}
