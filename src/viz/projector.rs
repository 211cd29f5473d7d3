// Coordinate projection
//
// Pure functions that place a node from (slot, team size, team) and,
// for the isometric view, map logical 3D points onto the 2D canvas.
// Same inputs always give the same output so lines, glyphs and labels
// painted in separate passes stay aligned.

use crate::model::Team;

// ============================================================================
// Flat (2D) lane layout, canvas space [0, 100] x [0, 100]
// ============================================================================

/// X coordinate of the attacker lane
pub const ATTACKER_LANE_X: f64 = 15.0;

/// X coordinate of the target lane
pub const TARGET_LANE_X: f64 = 85.0;

/// Vertical margin kept free above and below each lane
pub const LANE_MARGIN: f64 = 20.0;

// ============================================================================
// Depth-lane layout (logical 3D space) and oblique projection
// ============================================================================

/// Logical x of the attacker depth lane
const ATTACKER_DEPTH_X: f64 = -4.0;

/// Logical x of the target depth lane
const TARGET_DEPTH_X: f64 = 4.0;

/// Spacing between neighbouring attacker machines along the depth axis
const ATTACKER_DEPTH_SPACING: f64 = 2.5;

/// Spacing between neighbouring target machines along the depth axis
const TARGET_DEPTH_SPACING: f64 = 3.0;

/// cos(30 degrees)
const COS_30: f64 = 0.866;

/// Canvas units per logical unit, horizontally (terminal cells are ~2x taller than wide)
const ISO_SCALE_X: f64 = 10.0;

/// Canvas units per logical unit, vertically
const ISO_SCALE_Y: f64 = 6.0;

/// Canvas position of the logical origin
const ISO_ORIGIN: (f64, f64) = (50.0, 44.0);

/// A resolved coordinate. Flat layouts leave `z` at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn flat(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1)
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Position of a node in the flat layout
///
/// Attackers stack vertically on the left lane, targets on the right
/// lane. Slot 0 is at the top. A team with a single member is centered.
///
/// # Arguments
/// * `slot` - Index of the node within its team
/// * `total` - Number of nodes in the team
/// * `team` - Which lane to use
pub fn lane_position(slot: usize, total: usize, team: Team) -> Point {
    let x = match team {
        Team::Attacker => ATTACKER_LANE_X,
        Team::Target => TARGET_LANE_X,
    };

    if total <= 1 {
        return Point::flat(x, 50.0);
    }

    let top = 100.0 - LANE_MARGIN;
    let spacing = (100.0 - 2.0 * LANE_MARGIN) / (total - 1) as f64;
    Point::flat(x, top - slot as f64 * spacing)
}

/// Position of a node on its depth lane in logical 3D space
///
/// Each team occupies a lane parallel to the depth axis, centered on
/// zero. Slot 0 is the highest point once projected.
pub fn depth_lane_position(slot: usize, total: usize, team: Team) -> Point {
    let (x, spacing) = match team {
        Team::Attacker => (ATTACKER_DEPTH_X, ATTACKER_DEPTH_SPACING),
        Team::Target => (TARGET_DEPTH_X, TARGET_DEPTH_SPACING),
    };

    let start = total.saturating_sub(1) as f64 * spacing / 2.0;
    Point::new(x, 0.0, start - slot as f64 * spacing)
}

/// Fixed-angle oblique projection of a logical point onto the canvas
///
/// No perspective divide: the result depends only on the point, never
/// on a camera, so it is cheap enough to call for every glyph.
pub fn iso_to_screen(p: Point) -> (f64, f64) {
    let iso_x = (p.x - p.y) * COS_30;
    let iso_y = (p.x + p.y) * 0.5 - p.z;

    // Canvas y grows upward, screen y in the projection grows downward
    (
        ISO_ORIGIN.0 + iso_x * ISO_SCALE_X,
        ISO_ORIGIN.1 - iso_y * ISO_SCALE_Y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lane_position_stacks_top_down() {
        let first = lane_position(0, 5, Team::Attacker);
        let last = lane_position(4, 5, Team::Attacker);
        assert_eq!(first, Point::flat(ATTACKER_LANE_X, 80.0));
        assert_eq!(last, Point::flat(ATTACKER_LANE_X, 20.0));
    }

    #[test]
    fn test_lane_position_single_node_centered() {
        assert_eq!(lane_position(0, 1, Team::Target), Point::flat(TARGET_LANE_X, 50.0));
        assert_eq!(lane_position(0, 0, Team::Target), Point::flat(TARGET_LANE_X, 50.0));
    }

    #[test]
    fn test_depth_lanes_are_centered_on_zero() {
        let first = depth_lane_position(0, 5, Team::Attacker);
        let last = depth_lane_position(4, 5, Team::Attacker);
        assert_eq!(first.z, 5.0);
        assert_eq!(last.z, -5.0);
        assert_eq!(first.x, -4.0);

        let target = depth_lane_position(1, 3, Team::Target);
        assert_eq!(target, Point::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_iso_origin_maps_to_canvas_origin() {
        assert_eq!(iso_to_screen(Point::default()), ISO_ORIGIN);
    }

    #[test]
    fn test_iso_higher_z_is_higher_on_canvas() {
        let low = iso_to_screen(Point::new(0.0, 0.0, -1.0));
        let high = iso_to_screen(Point::new(0.0, 0.0, 1.0));
        assert!(high.1 > low.1);
        assert_eq!(high.0, low.0);
    }

    #[test]
    fn test_default_topology_projects_inside_canvas() {
        for slot in 0..5 {
            let (x, y) = iso_to_screen(depth_lane_position(slot, 5, Team::Attacker));
            assert!((0.0..=100.0).contains(&x) && (0.0..=100.0).contains(&y));
        }
        for slot in 0..3 {
            let (x, y) = iso_to_screen(depth_lane_position(slot, 3, Team::Target));
            assert!((0.0..=100.0).contains(&x) && (0.0..=100.0).contains(&y));
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Point::new(1.0, 2.0, 3.0);
        let b = Point::new(5.0, -2.0, 0.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Point::new(3.0, 0.0, 1.5));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Calling the projector twice with identical inputs yields
        /// bit-identical output.
        #[test]
        fn prop_projection_is_deterministic(
            slot in 0usize..64,
            total in 0usize..64,
            attacker in any::<bool>(),
        ) {
            let team = if attacker { Team::Attacker } else { Team::Target };

            let a = lane_position(slot, total, team);
            let b = lane_position(slot, total, team);
            prop_assert_eq!(a.x.to_bits(), b.x.to_bits());
            prop_assert_eq!(a.y.to_bits(), b.y.to_bits());

            let (sx1, sy1) = iso_to_screen(depth_lane_position(slot, total, team));
            let (sx2, sy2) = iso_to_screen(depth_lane_position(slot, total, team));
            prop_assert_eq!(sx1.to_bits(), sx2.to_bits());
            prop_assert_eq!(sy1.to_bits(), sy2.to_bits());
        }

        /// Every slot of a team lands inside the lane's vertical band.
        #[test]
        fn prop_lane_positions_within_margins(total in 2usize..64, slot_seed in 0usize..64) {
            let slot = slot_seed % total;
            let p = lane_position(slot, total, Team::Target);
            prop_assert!(p.y >= LANE_MARGIN - 1e-9);
            prop_assert!(p.y <= 100.0 - LANE_MARGIN + 1e-9);
            prop_assert_eq!(p.x, TARGET_LANE_X);
        }
    }
}
