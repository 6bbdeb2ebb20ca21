//! Collision footprints and intersection tests
//!
//! Everything here works on axis-aligned rectangles in the lane plane
//! (x lateral, z along travel direction), expressed in lane units. Footprints
//! are derived from the tile's mesh and its quarter-turn orientation, so the
//! collision pass never depends on renderer-produced transforms.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::Mesh;
use crate::consts::{CAR_LENGTH, PLAYER_RADIUS};

/// Axis-aligned rectangle stored as half extents around its owner's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Half extents: x lateral, y along the lane axis (z)
    pub half: Vec2,
}

impl Rect {
    pub fn new(half_x: f32, half_z: f32) -> Self {
        Self {
            half: Vec2::new(half_x, half_z),
        }
    }

    /// Footprint after an integer quarter-turn: odd turns swap the extents
    pub fn oriented(self, quarter_turns: u8) -> Self {
        if quarter_turns % 2 == 1 {
            Self {
                half: Vec2::new(self.half.y, self.half.x),
            }
        } else {
            self
        }
    }
}

/// Collision footprint for a mesh, in lane units.
///
/// The meshes themselves are opaque to the simulation; these extents stand in
/// for the bounding rectangles the renderer derives from loaded models.
pub fn footprint(mesh: Mesh) -> Rect {
    match mesh {
        // Ground tiles span the whole lane
        Mesh::Safe | Mesh::SafeAlt => Rect::new(10.0, 0.5),
        Mesh::Road | Mesh::RoadCapStart | Mesh::RoadCapEnd | Mesh::RoadStripe => {
            Rect::new(10.0, 0.5)
        }
        Mesh::Track => Rect::new(10.0, 0.5),
        Mesh::TrackPost => Rect::new(0.5, 0.5),
        Mesh::Rock => Rect::new(0.45, 0.45),
        Mesh::TreeBase | Mesh::TreeTop => Rect::new(0.45, 0.45),
        Mesh::Car => Rect::new(CAR_LENGTH / 2.0, 0.35),
    }
}

/// The player's collision footprint
pub fn player_footprint() -> Rect {
    Rect::new(PLAYER_RADIUS, PLAYER_RADIUS)
}

/// Overlap test between two rectangles at the given center positions
/// (x lateral, y = lane axis).
pub fn intersect_at(pos_a: Vec2, a: Rect, pos_b: Vec2, b: Rect) -> bool {
    let d = (pos_a - pos_b).abs();
    let reach = a.half + b.half;
    d.x <= reach.x && d.y <= reach.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_overlapping() {
        let a = Rect::new(0.4, 0.4);
        let b = Rect::new(0.8, 0.35);
        assert!(intersect_at(
            Vec2::new(10.0, 5.0),
            a,
            Vec2::new(10.5, 5.0),
            b
        ));
    }

    #[test]
    fn test_intersect_separated_laterally() {
        let a = Rect::new(0.4, 0.4);
        let b = Rect::new(0.8, 0.35);
        assert!(!intersect_at(
            Vec2::new(10.0, 5.0),
            a,
            Vec2::new(12.0, 5.0),
            b
        ));
    }

    #[test]
    fn test_intersect_separated_by_lane() {
        let a = Rect::new(0.4, 0.4);
        let b = Rect::new(0.8, 0.35);
        // Same x, one full lane apart
        assert!(!intersect_at(
            Vec2::new(10.0, 5.0),
            a,
            Vec2::new(10.0, 6.0),
            b
        ));
    }

    #[test]
    fn test_oriented_swaps_extents() {
        let r = Rect::new(0.8, 0.35);
        assert_eq!(r.oriented(1).half, Vec2::new(0.35, 0.8));
        assert_eq!(r.oriented(2).half, r.half);
        assert_eq!(r.oriented(3).half, Vec2::new(0.35, 0.8));
    }
}
