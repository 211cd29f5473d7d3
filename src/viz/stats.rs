// Stats and legend overlay model
//
// Read-only projection of the animator's counters and the selection
// into display rows. Packet numbers come from particle retirements
// only; nothing here counts feed log lines.

use crate::model::{Node, Selection, Team};
use crate::viz::animator::Counters;
use crate::viz::backend::{node_symbol, team_color, NodeHighlight, OFFLINE_COLOR};
use crate::viz::particle::protocol_color;
use ratatui::style::Color;

/// One row of the legend
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub symbol: &'static str,
    pub label: &'static str,
    pub color: Color,
}

/// Everything the overlay shows for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub protocol: &'static str,
    pub protocol_color: Color,
    /// "ip:port" of the selected target, or "-" when none
    pub target: String,
    pub sent: u64,
    pub received: u64,
    pub in_flight: usize,
    pub active_sources: usize,
    pub attacking: bool,
    pub legend: Vec<LegendEntry>,
}

impl StatsView {
    /// Build the overlay for the current frame
    ///
    /// # Arguments
    /// * `counters` - Latest counters reported by the animator
    /// * `in_flight` - Live particle count
    /// * `selection` - Current selection
    /// * `nodes` - Full topology, used to resolve the target address
    /// * `target_port` - Port the attack is aimed at
    pub fn build(
        counters: Counters,
        in_flight: usize,
        selection: &Selection,
        nodes: &[Node],
        target_port: u16,
    ) -> Self {
        let protocol = selection.attack_type.protocol();
        let color = protocol_color(protocol);

        let target = selection
            .target
            .as_deref()
            .and_then(|id| nodes.iter().find(|n| n.id == id && n.team == Team::Target))
            .map(|n| format!("{}:{}", n.address, target_port))
            .unwrap_or_else(|| "-".to_string());

        // Ids that no longer resolve are not counted as active
        let active_sources = nodes
            .iter()
            .filter(|n| n.team == Team::Attacker && selection.is_source(&n.id))
            .count();

        Self {
            protocol,
            protocol_color: color,
            target,
            sent: counters.sent,
            received: counters.received,
            in_flight,
            active_sources,
            attacking: selection.is_attacking,
            legend: legend(color),
        }
    }

    /// Status indicator text
    pub fn status_label(&self) -> &'static str {
        if self.attacking {
            "ATTACKING"
        } else {
            "IDLE"
        }
    }
}

/// Legend rows, in the colors the backends draw with
fn legend(packet_color: Color) -> Vec<LegendEntry> {
    let node = |team: Team, highlight: NodeHighlight, label: &'static str| LegendEntry {
        symbol: node_symbol(team),
        label,
        color: team_color(team, highlight),
    };

    vec![
        node(Team::Attacker, NodeHighlight::None, "Red Team (Attacker)"),
        node(Team::Target, NodeHighlight::None, "Blue Team (Target)"),
        node(Team::Attacker, NodeHighlight::Source, "Selected Source"),
        node(Team::Target, NodeHighlight::Target, "Selected Target"),
        LegendEntry {
            symbol: "●",
            label: "Attack Packet",
            color: packet_color,
        },
        LegendEntry {
            symbol: "─",
            label: "Attack Path",
            color: packet_color,
        },
        LegendEntry {
            symbol: node_symbol(Team::Attacker),
            label: "Offline",
            color: OFFLINE_COLOR,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttackType;

    fn counters(n: u64) -> Counters {
        Counters {
            sent: n,
            received: n,
        }
    }

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("gen", "Generator", "10.72.200.62", "Primary", Team::Attacker, 0),
            Node::new("bot", "Botnet", "10.72.200.64", "Botnet", Team::Attacker, 1),
            Node::new("t1", "Blue 1", "10.72.200.51", "Target", Team::Target, 0),
        ]
    }

    #[test]
    fn test_build_from_counters_and_selection() {
        let mut sel = Selection {
            attack_type: AttackType::UdpFlood,
            is_attacking: true,
            ..Selection::default()
        };
        sel.toggle_source("gen");
        sel.toggle_source("bot");
        sel.target = Some("t1".to_string());

        let view = StatsView::build(counters(12), 4, &sel, &nodes(), 9080);
        assert_eq!(view.protocol, "UDP");
        assert_eq!(view.target, "10.72.200.51:9080");
        assert_eq!(view.sent, 12);
        assert_eq!(view.received, 12);
        assert_eq!(view.in_flight, 4);
        assert_eq!(view.active_sources, 2);
        assert_eq!(view.status_label(), "ATTACKING");
    }

    #[test]
    fn test_unresolved_ids_are_not_shown() {
        let mut sel = Selection::default();
        sel.toggle_source("gone");
        // A red node cannot be the target
        sel.target = Some("gen".to_string());

        let view = StatsView::build(Counters::default(), 0, &sel, &nodes(), 80);
        assert_eq!(view.target, "-");
        assert_eq!(view.active_sources, 0);
        assert_eq!(view.status_label(), "IDLE");
    }

    #[test]
    fn test_legend_packet_color_follows_protocol() {
        let sel = Selection {
            attack_type: AttackType::IcmpFlood,
            ..Selection::default()
        };
        let view = StatsView::build(Counters::default(), 0, &sel, &nodes(), 80);
        let packet = view.legend.iter().find(|e| e.label == "Attack Packet");
        assert_eq!(packet.map(|e| e.color), Some(protocol_color("ICMP")));
        let path = view.legend.iter().find(|e| e.label == "Attack Path");
        assert_eq!(path.map(|e| e.color), Some(protocol_color("ICMP")));
    }

    /// Legend swatches match the glyphs the map draws for idle and
    /// selected nodes
    #[test]
    fn test_legend_matches_drawn_node_colors() {
        use crate::viz::backend::{FlatBackend, RenderBackend, Shape};
        use crate::viz::projector::Point;

        let view = StatsView::build(Counters::default(), 0, &Selection::default(), &nodes(), 80);
        let color_of = |label: &str| view.legend.iter().find(|e| e.label == label).map(|e| e.color);

        let mut backend = FlatBackend::new();
        let mut red = nodes()[0].clone();
        red.is_online = true;
        let mut blue = nodes()[2].clone();
        blue.is_online = true;
        let at = Point::flat(50.0, 50.0);
        backend.draw_node(&red, at, NodeHighlight::None, false);
        backend.draw_node(&blue, at, NodeHighlight::None, false);
        backend.draw_node(&red, at, NodeHighlight::Source, false);
        backend.draw_node(&blue, at, NodeHighlight::Target, false);
        red.is_online = false;
        backend.draw_node(&red, at, NodeHighlight::None, false);

        let drawn: Vec<Color> = backend
            .take_shapes()
            .into_iter()
            .filter_map(|shape| match shape {
                Shape::Glyph { color, .. } => Some(color),
                _ => None,
            })
            .collect();
        let expected: Vec<Option<Color>> = drawn.into_iter().map(Some).collect();
        assert_eq!(
            expected,
            vec![
                color_of("Red Team (Attacker)"),
                color_of("Blue Team (Target)"),
                color_of("Selected Source"),
                color_of("Selected Target"),
                color_of("Offline"),
            ]
        );
    }
}
