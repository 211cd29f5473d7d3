// Spawn scheduler
//
// Decides once per frame whether a spawn tick is due and, if so, fans
// out one particle per selected source toward the selected target.
// Paced purely by frame timestamps and the configured rate; the live
// event feed never drives it.

use crate::model::{Node, Selection};
use crate::viz::backend::RenderBackend;
use crate::viz::particle::Particle;
use crate::viz::projector::Point;
use rand::Rng;

/// Packets per second used when the caller supplies none (or nonsense)
pub const DEFAULT_PACKETS_PER_SECOND: f64 = 50.0;

/// Milliseconds between spawn ticks for a given rate
///
/// Missing, non-finite, or non-positive rates fall back to
/// DEFAULT_PACKETS_PER_SECOND.
pub fn spawn_interval_ms(packets_per_second: Option<f64>) -> f64 {
    let pps = match packets_per_second {
        Some(pps) if pps.is_finite() && pps > 0.0 => pps,
        _ => DEFAULT_PACKETS_PER_SECOND,
    };
    1000.0 / pps
}

/// A frame further than this behind schedule resyncs instead of catching up
pub const STALL_RESYNC_MS: f64 = 1000.0;

/// Most spawn ticks a single frame may consume
pub const MAX_TICKS_PER_FRAME: u32 = 32;

/// Frame-driven spawn pacing
///
/// Keeps the timestamp of the next due tick rather than the last spawn,
/// so a rate that does not divide the frame interval evenly still
/// averages out to the configured rate. A rate above the frame rate
/// makes several ticks due on one frame. After a long stall the
/// schedule restarts from `now` instead of bursting to catch up.
#[derive(Debug, Default, Clone)]
pub struct SpawnScheduler {
    next_due_ms: Option<f64>,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the pacing state; the next call to `tick` is due immediately
    pub fn reset(&mut self) {
        self.next_due_ms = None;
    }

    /// Count the spawn ticks due at `now_ms`, consuming them
    ///
    /// # Arguments
    /// * `now_ms` - Monotonic frame timestamp in milliseconds
    /// * `packets_per_second` - Configured rate, default applies if absent
    ///
    /// # Returns
    /// How many ticks the caller should spawn on this frame, at most
    /// MAX_TICKS_PER_FRAME
    pub fn tick(&mut self, now_ms: f64, packets_per_second: Option<f64>) -> u32 {
        let interval = spawn_interval_ms(packets_per_second);

        let Some(due) = self.next_due_ms else {
            self.next_due_ms = Some(now_ms + interval);
            return 1;
        };
        if now_ms < due {
            return 0;
        }

        let lag = now_ms - due;
        if lag >= STALL_RESYNC_MS {
            self.next_due_ms = Some(now_ms + interval);
            return 1;
        }

        let due_ticks = (lag / interval).floor() as u32 + 1;
        if due_ticks > MAX_TICKS_PER_FRAME {
            // Backlog beyond the cap is dropped
            self.next_due_ms = Some(now_ms + interval);
            return MAX_TICKS_PER_FRAME;
        }
        self.next_due_ms = Some(due + f64::from(due_ticks) * interval);
        due_ticks
    }
}

/// Create this frame's particles: `per_source` for every selected
/// source, all aimed at the target
///
/// Returns an empty vector when not attacking or when no target is
/// selected. Ids that do not resolve to a node of the right team are
/// skipped without error.
pub fn fan_out<R: Rng + ?Sized>(
    red_team: &[Node],
    blue_team: &[Node],
    selection: &Selection,
    per_source: u32,
    backend: &dyn RenderBackend,
    rng: &mut R,
) -> Vec<Particle> {
    if !selection.is_attacking || per_source == 0 {
        return Vec::new();
    }

    let Some(destination) = selection
        .target
        .as_deref()
        .and_then(|id| resolve(blue_team, id, backend))
    else {
        return Vec::new();
    };

    red_team
        .iter()
        .filter(|node| selection.is_source(&node.id))
        .flat_map(|node| {
            let origin = backend.project(node.team, node.logical_slot, red_team.len());
            std::iter::repeat(origin).take(per_source as usize)
        })
        .map(|origin| Particle::spawn(origin, destination, selection.attack_type, rng))
        .collect()
}

/// Project a node by id within its team, or None if it is not there
pub fn resolve(team: &[Node], id: &str, backend: &dyn RenderBackend) -> Option<Point> {
    team.iter()
        .find(|node| node.id == id)
        .map(|node| backend.project(node.team, node.logical_slot, team.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttackType, Team};
    use crate::viz::backend::FlatBackend;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn red() -> Vec<Node> {
        vec![
            Node::new("a", "A", "10.0.0.1", "Attacker", Team::Attacker, 0),
            Node::new("b", "B", "10.0.0.2", "Attacker", Team::Attacker, 1),
            Node::new("c", "C", "10.0.0.3", "Attacker", Team::Attacker, 2),
        ]
    }

    fn blue() -> Vec<Node> {
        vec![Node::new("t", "T", "10.0.1.1", "Target", Team::Target, 0)]
    }

    fn attacking(sources: &[&str], target: Option<&str>) -> Selection {
        Selection {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            target: target.map(str::to_string),
            attack_type: AttackType::UdpFlood,
            is_attacking: true,
        }
    }

    #[test]
    fn test_interval_defaults() {
        assert_eq!(spawn_interval_ms(Some(10.0)), 100.0);
        assert_eq!(spawn_interval_ms(None), 20.0);
        assert_eq!(spawn_interval_ms(Some(0.0)), 20.0);
        assert_eq!(spawn_interval_ms(Some(-5.0)), 20.0);
        assert_eq!(spawn_interval_ms(Some(f64::INFINITY)), 20.0);
    }

    #[test]
    fn test_first_tick_is_due_immediately() {
        let mut sched = SpawnScheduler::new();
        assert_eq!(sched.tick(1234.0, Some(10.0)), 1);
        assert_eq!(sched.tick(1300.0, Some(10.0)), 0);
        assert_eq!(sched.tick(1334.0, Some(10.0)), 1);
    }

    #[test]
    fn test_stall_does_not_burst() {
        let mut sched = SpawnScheduler::new();
        assert_eq!(sched.tick(0.0, Some(10.0)), 1);
        // Two seconds without a frame
        assert_eq!(sched.tick(2000.0, Some(10.0)), 1);
        assert_eq!(sched.tick(2016.0, Some(10.0)), 0);
        assert_eq!(sched.tick(2099.0, Some(10.0)), 0);
        assert_eq!(sched.tick(2100.0, Some(10.0)), 1);
    }

    #[test]
    fn test_rate_above_frame_rate_spawns_several_ticks() {
        let mut sched = SpawnScheduler::new();
        // 500 pps is one tick every 2 ms
        assert_eq!(sched.tick(0.0, Some(500.0)), 1);
        assert_eq!(sched.tick(33.0, Some(500.0)), 16);
        assert_eq!(sched.tick(66.0, Some(500.0)), 17);
    }

    #[test]
    fn test_ticks_per_frame_are_capped() {
        let mut sched = SpawnScheduler::new();
        assert_eq!(sched.tick(0.0, Some(500.0)), 1);
        // 250 ticks would be due after half a second
        assert_eq!(sched.tick(500.0, Some(500.0)), MAX_TICKS_PER_FRAME);
        // Backlog dropped: next tick is one interval later
        assert_eq!(sched.tick(501.0, Some(500.0)), 0);
        assert_eq!(sched.tick(502.0, Some(500.0)), 1);
    }

    #[test]
    fn test_reset_makes_next_tick_due() {
        let mut sched = SpawnScheduler::new();
        assert_eq!(sched.tick(0.0, Some(1.0)), 1);
        assert_eq!(sched.tick(10.0, Some(1.0)), 0);
        sched.reset();
        assert_eq!(sched.tick(20.0, Some(1.0)), 1);
    }

    #[test]
    fn test_fan_out_one_per_source() {
        let backend = FlatBackend::new();
        let mut rng = StdRng::seed_from_u64(1);
        let sel = attacking(&["a", "c"], Some("t"));

        let particles = fan_out(&red(), &blue(), &sel, 1, &backend, &mut rng);
        assert_eq!(particles.len(), 2);

        let target = backend.project(Team::Target, 0, 1);
        assert!(particles.iter().all(|p| p.destination == target));
        assert!(particles.iter().all(|p| p.style.protocol == "UDP"));
    }

    #[test]
    fn test_fan_out_several_ticks_per_source() {
        let backend = FlatBackend::new();
        let mut rng = StdRng::seed_from_u64(1);
        let sel = attacking(&["a", "b"], Some("t"));

        let particles = fan_out(&red(), &blue(), &sel, 3, &backend, &mut rng);
        assert_eq!(particles.len(), 6);
        let from_a = backend.project(Team::Attacker, 0, 3);
        assert_eq!(particles.iter().filter(|p| p.origin == from_a).count(), 3);

        assert!(fan_out(&red(), &blue(), &sel, 0, &backend, &mut rng).is_empty());
    }

    #[test]
    fn test_fan_out_without_target_spawns_nothing() {
        let backend = FlatBackend::new();
        let mut rng = StdRng::seed_from_u64(1);
        let sel = attacking(&["a", "b"], None);
        assert!(fan_out(&red(), &blue(), &sel, 1, &backend, &mut rng).is_empty());
    }

    #[test]
    fn test_fan_out_when_not_attacking_spawns_nothing() {
        let backend = FlatBackend::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sel = attacking(&["a"], Some("t"));
        sel.is_attacking = false;
        assert!(fan_out(&red(), &blue(), &sel, 1, &backend, &mut rng).is_empty());
    }

    #[test]
    fn test_fan_out_skips_unknown_ids() {
        let backend = FlatBackend::new();
        let mut rng = StdRng::seed_from_u64(1);

        // A source id that vanished from the topology
        let sel = attacking(&["a", "gone"], Some("t"));
        assert_eq!(fan_out(&red(), &blue(), &sel, 1, &backend, &mut rng).len(), 1);

        // A target id that is not on the blue team
        let sel = attacking(&["a"], Some("b"));
        assert!(fan_out(&red(), &blue(), &sel, 1, &backend, &mut rng).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Over a long run the number of ticks matches the configured
        /// rate to within one tick, whatever the frame interval.
        #[test]
        fn prop_tick_rate_matches_configuration(
            pps in 1.0f64..500.0,
            frame_ms in 4.0f64..50.0,
        ) {
            let mut sched = SpawnScheduler::new();
            let duration_ms = 5000.0;
            let frames = (duration_ms / frame_ms) as usize;

            let mut ticks = 0u64;
            for i in 0..=frames {
                ticks += u64::from(sched.tick(i as f64 * frame_ms, Some(pps)));
            }

            let elapsed_s = (frames as f64 * frame_ms) / 1000.0;
            let expected = elapsed_s * pps + 1.0;
            prop_assert!((ticks as f64 - expected).abs() <= 1.0);
        }
    }
}
