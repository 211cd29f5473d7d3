// Range data model
//
// Nodes (simulated machines), attack types, and the operator's
// selection state. Owned by the controller and lent to the renderer
// each frame.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of the exercise a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    /// Red team machine that can source traffic
    Attacker,
    /// Blue team machine that can receive traffic
    Target,
}

/// One simulated machine on the range
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique across both teams, stable for the whole session
    pub id: String,
    pub display_name: String,
    /// Display-only IP address
    pub address: String,
    pub role: String,
    pub team: Team,
    pub is_online: bool,
    /// Index within its team, used for layout
    pub logical_slot: usize,
}

impl Node {
    pub fn new(
        id: &str,
        display_name: &str,
        address: &str,
        role: &str,
        team: Team,
        logical_slot: usize,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            address: address.to_string(),
            role: role.to_string(),
            team,
            is_online: false,
            logical_slot,
        }
    }
}

/// Attack tools the orchestration API knows about
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum AttackType {
    SynFlood,
    UdpFlood,
    #[default]
    HttpFlood,
    Slowloris,
    IcmpFlood,
    Hulk,
}

impl AttackType {
    pub const ALL: [AttackType; 6] = [
        AttackType::SynFlood,
        AttackType::UdpFlood,
        AttackType::HttpFlood,
        AttackType::Slowloris,
        AttackType::IcmpFlood,
        AttackType::Hulk,
    ];

    /// Wire tag used by the orchestration API
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SynFlood => "syn_flood",
            Self::UdpFlood => "udp_flood",
            Self::HttpFlood => "http_flood",
            Self::Slowloris => "slowloris",
            Self::IcmpFlood => "icmp_flood",
            Self::Hulk => "hulk",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SynFlood => "SYN Flood",
            Self::UdpFlood => "UDP Flood",
            Self::HttpFlood => "HTTP Flood",
            Self::Slowloris => "Slowloris",
            Self::IcmpFlood => "ICMP Flood",
            Self::Hulk => "HULK",
        }
    }

    /// Protocol label carried by packets of this attack
    pub fn protocol(&self) -> &'static str {
        match self {
            Self::SynFlood => "TCP SYN",
            Self::UdpFlood => "UDP",
            Self::HttpFlood | Self::Slowloris | Self::Hulk => "HTTP",
            Self::IcmpFlood => "ICMP",
        }
    }

    /// Next attack type in menu order, wrapping around
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Lifecycle of an attack as reported by the orchestration API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl AttackStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

/// The attack launched from this session, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAttack {
    pub attack_id: String,
    pub attack_type: AttackType,
    pub target_address: String,
    pub target_port: u16,
    pub status: AttackStatus,
}

impl ActiveAttack {
    pub fn is_running(&self) -> bool {
        self.status == AttackStatus::Running
    }
}

/// Severity of an operator log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Operator's current choice of sources, target and attack type
///
/// Attacking with no sources or no target is not an error; the
/// renderer simply has nothing to animate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub sources: BTreeSet<String>,
    pub target: Option<String>,
    pub attack_type: AttackType,
    pub is_attacking: bool,
}

impl Selection {
    pub fn is_source(&self, id: &str) -> bool {
        self.sources.contains(id)
    }

    pub fn is_target(&self, id: &str) -> bool {
        self.target.as_deref() == Some(id)
    }

    /// Add the id to the sources if absent, remove it otherwise.
    /// Returns whether the id is selected afterwards.
    pub fn toggle_source(&mut self, id: &str) -> bool {
        if self.sources.remove(id) {
            false
        } else {
            self.sources.insert(id.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_type_protocols() {
        assert_eq!(AttackType::SynFlood.protocol(), "TCP SYN");
        assert_eq!(AttackType::UdpFlood.protocol(), "UDP");
        assert_eq!(AttackType::HttpFlood.protocol(), "HTTP");
        assert_eq!(AttackType::Slowloris.protocol(), "HTTP");
        assert_eq!(AttackType::Hulk.protocol(), "HTTP");
        assert_eq!(AttackType::IcmpFlood.protocol(), "ICMP");
    }

    #[test]
    fn test_attack_type_cycles_through_all() {
        let mut t = AttackType::SynFlood;
        let mut seen = Vec::new();
        for _ in 0..AttackType::ALL.len() {
            seen.push(t);
            t = t.next();
        }
        assert_eq!(t, AttackType::SynFlood);
        assert_eq!(seen, AttackType::ALL.to_vec());
    }

    #[test]
    fn test_attack_type_serializes_as_tag() {
        for t in AttackType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.tag()));
        }
    }

    #[test]
    fn test_attack_status_decodes_from_api() {
        let status: AttackStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, AttackStatus::Running);
        assert_eq!(AttackStatus::Stopped.label(), "stopped");
    }

    #[test]
    fn test_toggle_source() {
        let mut sel = Selection::default();
        assert!(sel.toggle_source("generator"));
        assert!(sel.is_source("generator"));
        assert!(!sel.toggle_source("generator"));
        assert!(!sel.is_source("generator"));
    }

    #[test]
    fn test_target_membership() {
        let mut sel = Selection::default();
        assert!(!sel.is_target("team1"));
        sel.target = Some("team1".to_string());
        assert!(sel.is_target("team1"));
        assert!(!sel.is_target("team2"));
    }
}
