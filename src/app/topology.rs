// Static range topology
//
// The exercise range has a fixed set of machines. Their identity and
// layout slot never change; only the online flag is refreshed from
// the orchestration API.

use crate::model::{Node, Team};
use crate::net::api::{TargetInfo, VmStatus};

/// Role shown for every blue team machine
const TARGET_ROLE: &str = "Target Infrastructure";

/// Red team machines in layout order
pub fn red_team() -> Vec<Node> {
    [
        ("scheduler", "Attack Scheduler", "10.72.200.61", "Coordination"),
        ("generator", "Attack Generator", "10.72.200.62", "Primary Attacker"),
        ("gui", "Red Team GUI", "10.72.200.63", "C2 Interface"),
        ("botnet1", "Botnet Gen 1", "10.72.200.64", "Distributed Attack"),
        ("botnet2", "Botnet Gen 2", "10.72.200.65", "Distributed Attack"),
    ]
    .iter()
    .enumerate()
    .map(|(slot, (id, name, ip, role))| Node::new(id, name, ip, role, Team::Attacker, slot))
    .collect()
}

/// Blue team targets in layout order
pub fn blue_team() -> Vec<Node> {
    [
        ("team1", "Blue Team 1", "10.72.200.51"),
        ("team2", "Blue Team 2", "10.72.200.54"),
        ("team3", "Blue Team 3", "10.72.200.57"),
    ]
    .iter()
    .enumerate()
    .map(|(slot, (id, name, ip))| Node::new(id, name, ip, TARGET_ROLE, Team::Target, slot))
    .collect()
}

/// Apply reported red team status; unknown ids are ignored
///
/// # Returns
/// Number of nodes whose online flag changed
pub fn apply_red_status(nodes: &mut [Node], vms: &[VmStatus]) -> usize {
    let mut changed = 0;
    for vm in vms {
        if let Some(node) = nodes.iter_mut().find(|n| n.id == vm.id) {
            if node.is_online != vm.is_online() {
                node.is_online = vm.is_online();
                changed += 1;
            }
        }
    }
    changed
}

/// Mark listed blue team targets online and the rest offline
pub fn apply_blue_status(nodes: &mut [Node], targets: &[TargetInfo]) -> usize {
    let mut changed = 0;
    for node in nodes.iter_mut() {
        let listed = targets.iter().any(|t| t.id == node.id);
        if node.is_online != listed {
            node.is_online = listed;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(id: &str, status: &str) -> VmStatus {
        VmStatus {
            id: id.to_string(),
            name: id.to_string(),
            ip: "0.0.0.0".to_string(),
            role: "test".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_topology_slots_and_ids() {
        let red = red_team();
        let blue = blue_team();
        assert_eq!(red.len(), 5);
        assert_eq!(blue.len(), 3);

        for (i, node) in red.iter().enumerate() {
            assert_eq!(node.logical_slot, i);
            assert_eq!(node.team, Team::Attacker);
            assert!(!node.is_online);
        }
        assert_eq!(blue[2].id, "team3");
        assert_eq!(blue[2].address, "10.72.200.57");

        // Ids are unique across both teams
        let mut ids: Vec<_> = red.iter().chain(blue.iter()).map(|n| n.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_apply_red_status() {
        let mut red = red_team();
        let changed = apply_red_status(
            &mut red,
            &[vm("generator", "online"), vm("gui", "offline"), vm("ghost", "online")],
        );
        assert_eq!(changed, 1);
        assert!(red[1].is_online);
        assert!(!red[2].is_online);

        // Going offline again is a change
        assert_eq!(apply_red_status(&mut red, &[vm("generator", "offline")]), 1);
        assert!(!red[1].is_online);
    }

    #[test]
    fn test_apply_blue_status() {
        let mut blue = blue_team();
        let targets = vec![TargetInfo {
            id: "team2".to_string(),
            name: "Blue Team 2".to_string(),
            ip: "10.72.200.54".to_string(),
            ports: vec![80],
        }];
        assert_eq!(apply_blue_status(&mut blue, &targets), 1);
        assert!(blue[1].is_online);
        assert!(!blue[0].is_online);

        assert_eq!(apply_blue_status(&mut blue, &[]), 1);
        assert!(!blue[1].is_online);
    }
}
