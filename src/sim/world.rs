//! Tile world: the authoritative, lane-indexed registry of placed objects
//!
//! This module owns where the objects are and how fast they move: for a lane,
//! what kind of ground it is; what intersects an object; which lanes are still
//! live. It has no modal behavior of its own - the generator and spawner
//! mutate it through the placement API, the player and collision pass query it.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{self, Rect};
use super::stats;
use crate::consts::{ROAD_HEIGHT, SAFE_HEIGHT, X_BOUNDS};

/// What a placed object is, as far as the simulation cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Safe,
    Road,
    Obstacle,
    Train,
    Car,
}

/// Opaque handle to a visual mesh. The renderer groups draw calls by this;
/// the simulation only uses it to look up collision footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mesh {
    Safe,
    SafeAlt,
    Road,
    RoadCapStart,
    RoadCapEnd,
    RoadStripe,
    Rock,
    TreeBase,
    TreeTop,
    Track,
    TrackPost,
    Car,
}

/// A single placed object within a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub mesh: Mesh,
    /// x lateral, y vertical offset, z lane index (assigned at placement)
    pub pos: Vec3,
    /// Lateral velocity; non-zero only for moving hazards
    #[serde(default)]
    pub x_vel: f32,
    /// Quarter-turn index 0-3
    #[serde(default)]
    pub orientation: u8,
}

/// One unit-depth row of the world. Kind is derived from the first tile.
pub type Lane = Vec<Tile>;

/// Ground kind for a boulevard request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneKind {
    Safe,
    Road,
}

/// A flattened tile for the renderer, with its lane height offset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileInstance {
    pub mesh: Mesh,
    pub pos: Vec3,
    pub orientation: u8,
    pub lane_offset: f32,
}

/// The world: all lanes, the lateral bounds, and the progress score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    lanes: Vec<Lane>,
    pub x_bounds: [f32; 2],
    score: usize,
}

impl World {
    pub fn new() -> Self {
        Self {
            lanes: Vec::new(),
            x_bounds: X_BOUNDS,
            score: 0,
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Furthest lane index the player has reached
    pub fn score(&self) -> usize {
        self.score
    }

    /// Raise the score. The score is monotone: a lower value is ignored.
    /// Returns true if the score changed.
    pub fn advance_score(&mut self, z: usize) -> bool {
        if z > self.score {
            self.score = z;
            true
        } else {
            false
        }
    }

    /// Delete every lane and tile. Does not touch the score; the caller is
    /// responsible for resetting score and player together (see `Game::reset`).
    pub fn erase(&mut self) {
        self.lanes.clear();
    }

    /// Reset progress back to zero. Only valid as part of a full reset.
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    fn push_lane(&mut self, kind: TileKind, mesh: Mesh) {
        let z = self.lanes.len() as f32;
        // Ground tile's x only matters to the renderer
        self.lanes.push(vec![Tile {
            kind,
            mesh,
            pos: Vec3::new(19.0, 0.0, z),
            x_vel: 0.0,
            orientation: 0,
        }]);
    }

    /// Append `width` new lanes of the given kind.
    ///
    /// Safe lanes alternate between two visual variants as a continuation
    /// rule: if the preceding lane already ends on the alt variant, the new
    /// run starts on the plain one, so no two adjacent safe lanes share a
    /// variant across boulevard boundaries. Roads of width >= 2 get a cap
    /// lane on each side of `width - 2` striped interior lanes; a width-1
    /// road is a single plain lane with no stripes.
    pub fn add_boulevard(&mut self, kind: LaneKind, width: usize) {
        match kind {
            LaneKind::Safe => {
                let mut alt = 1;
                if let Some(prev) = self.lanes.last() {
                    if prev.first().map(|t| t.mesh) == Some(Mesh::SafeAlt) {
                        alt = 0;
                    }
                }
                for j in 0..width {
                    let mesh = if j % 2 == alt { Mesh::Safe } else { Mesh::SafeAlt };
                    self.push_lane(TileKind::Safe, mesh);
                }
            }
            LaneKind::Road => {
                if width == 1 {
                    self.push_lane(TileKind::Road, Mesh::Road);
                } else {
                    self.push_lane(TileKind::Road, Mesh::RoadCapStart);
                    for _ in 0..width.saturating_sub(2) {
                        self.push_lane(TileKind::Road, Mesh::RoadStripe);
                    }
                    self.push_lane(TileKind::Road, Mesh::RoadCapEnd);
                }
            }
        }
    }

    fn push_tile(&mut self, z: usize, mut tile: Tile) {
        let Some(lane) = self.lanes.get_mut(z) else {
            // Placement into an unknown lane is dropped, mirroring the
            // fail-closed query semantics
            log::debug!("dropped tile placement into out-of-range lane {z}");
            return;
        };
        tile.pos.z = z as f32;
        lane.push(tile);
    }

    /// Place a rock obstacle at lateral cell `x` in lane `z`.
    /// Orientation defaults to a uniformly random quarter-turn.
    pub fn add_obstacle<R: Rng>(
        &mut self,
        x: i32,
        z: usize,
        orientation: Option<u8>,
        rng: &mut R,
    ) {
        let orientation = orientation.unwrap_or_else(|| stats::uniform_discrete(rng, 0, 4) as u8);
        self.push_tile(
            z,
            Tile {
                kind: TileKind::Obstacle,
                mesh: Mesh::Rock,
                pos: Vec3::new(x as f32, 0.0, 0.0),
                x_vel: 0.0,
                orientation,
            },
        );
    }

    /// Place a tree: one base segment plus `height` stacked top segments
    pub fn add_tree(&mut self, x: i32, z: usize, height: u32) {
        self.push_tile(
            z,
            Tile {
                kind: TileKind::Obstacle,
                mesh: Mesh::TreeBase,
                pos: Vec3::new(x as f32, 0.0, 0.0),
                x_vel: 0.0,
                orientation: 0,
            },
        );
        for i in 0..height {
            self.push_tile(
                z,
                Tile {
                    kind: TileKind::Obstacle,
                    mesh: Mesh::TreeTop,
                    pos: Vec3::new(x as f32, 0.4 * i as f32, 0.0),
                    x_vel: 0.0,
                    orientation: 0,
                },
            );
        }
    }

    /// Place train track furniture in lane `z`
    pub fn add_train(&mut self, z: usize) {
        self.push_tile(
            z,
            Tile {
                kind: TileKind::Train,
                mesh: Mesh::Track,
                pos: Vec3::new(18.5, 0.0, 0.0),
                x_vel: 0.0,
                orientation: 0,
            },
        );
        self.push_tile(
            z,
            Tile {
                kind: TileKind::Train,
                mesh: Mesh::TrackPost,
                pos: Vec3::new(5.0, 0.0, 0.0),
                x_vel: 0.0,
                orientation: 0,
            },
        );
    }

    /// Place a moving vehicle in lane `z` with the given lateral speed.
    /// Orientation defaults to a uniformly random quarter-turn.
    pub fn add_car<R: Rng>(
        &mut self,
        x: f32,
        z: usize,
        speed: f32,
        orientation: Option<u8>,
        rng: &mut R,
    ) {
        let orientation = orientation.unwrap_or_else(|| stats::uniform_discrete(rng, 0, 4) as u8);
        self.push_tile(
            z,
            Tile {
                kind: TileKind::Car,
                mesh: Mesh::Car,
                pos: Vec3::new(x, 0.0, 0.0),
                x_vel: speed,
                orientation,
            },
        );
    }

    /// True if lateral cell `x` of lane `z` is blocked. Unknown lanes count
    /// as blocked: out of range might as well be an obstacle.
    pub fn is_obstacle(&self, x: i32, z: i32) -> bool {
        if z < 0 {
            return true;
        }
        let Some(lane) = self.lanes.get(z as usize) else {
            return true;
        };
        lane.iter()
            .any(|t| t.kind == TileKind::Obstacle && t.pos.x == x as f32)
    }

    /// True iff lane `z` exists, is not retired, and its ground is safe
    pub fn is_grass(&self, z: usize) -> bool {
        self.lanes
            .get(z)
            .and_then(|lane| lane.first())
            .map(|t| t.kind == TileKind::Safe)
            .unwrap_or(false)
    }

    /// Clear a lane's tiles in place. The index slot survives so every other
    /// lane keeps its z; a retired lane is no longer simulated or queried.
    pub fn retire_lane(&mut self, z: usize) {
        if let Some(lane) = self.lanes.get_mut(z) {
            if !lane.is_empty() {
                log::debug!("retired lane {z}");
            }
            lane.clear();
        }
    }

    /// Integrate every moving hazard by `dt`. A hazard that crosses the
    /// lateral bounds reverses direction rather than despawning, which keeps
    /// allocation churn bounded under continuous spawning. The velocity only
    /// flips while still heading outward, so an overshot tile cannot
    /// oscillate outside the bounds.
    pub fn advance_hazards(&mut self, dt: f32) {
        let [min_x, max_x] = self.x_bounds;
        for lane in &mut self.lanes {
            for tile in lane.iter_mut() {
                if tile.x_vel != 0.0 {
                    tile.pos.x += tile.x_vel * dt;
                    if (tile.pos.x < min_x && tile.x_vel < 0.0)
                        || (tile.pos.x > max_x && tile.x_vel > 0.0)
                    {
                        tile.x_vel = -tile.x_vel;
                    }
                }
            }
        }
    }

    /// Tiles whose footprint overlaps `rect` centered at `pos` (x, z).
    ///
    /// Only the lane the position is in and, when the position is off lane
    /// center, the adjacent lane in the direction of offset are scanned -
    /// never more than two. Objects are at most one lane deep, so any overlap
    /// involves one of those lanes. Out-of-range lanes match nothing.
    pub fn query_intersections<F>(&self, pos: Vec2, rect: Rect, filter: F) -> Vec<&Tile>
    where
        F: Fn(&Tile) -> bool,
    {
        let mut found = Vec::new();
        let z_center = pos.y.trunc() as isize;
        let z_off = if pos.y > z_center as f32 { 1 } else { -1 };

        let mut scan = |z: isize| {
            if z < 0 {
                return;
            }
            let Some(lane) = self.lanes.get(z as usize) else {
                return;
            };
            for tile in lane {
                if !filter(tile) {
                    continue;
                }
                let tile_rect = collision::footprint(tile.mesh).oriented(tile.orientation);
                let tile_pos = Vec2::new(tile.pos.x, tile.pos.z);
                if collision::intersect_at(pos, rect, tile_pos, tile_rect) {
                    found.push(tile);
                }
            }
        };

        scan(z_center);
        scan(z_center + z_off);
        found
    }

    /// Moving vehicles overlapping the given footprint
    pub fn cars_intersecting(&self, pos: Vec2, rect: Rect) -> Vec<&Tile> {
        self.query_intersections(pos, rect, |t| t.kind == TileKind::Car)
    }

    /// Flattened snapshot of all live tiles for the renderer, grouped by
    /// mesh, each with its lane height offset.
    pub fn snapshot(&self) -> Vec<TileInstance> {
        let mut tiles: Vec<TileInstance> = self
            .lanes
            .iter()
            .enumerate()
            .flat_map(|(z, lane)| {
                let offset = if self.is_grass(z) { SAFE_HEIGHT } else { ROAD_HEIGHT };
                lane.iter().map(move |t| TileInstance {
                    mesh: t.mesh,
                    pos: t.pos,
                    orientation: t.orientation,
                    lane_offset: offset,
                })
            })
            .collect();
        tiles.sort_by_key(|t| t.mesh);
        tiles
    }
}
