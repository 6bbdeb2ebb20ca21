//! Lane Hopper - simulation core for an endless lane-runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world registry, procedural generation,
//!   hazard spawning, player movement, collisions)
//!
//! Rendering, asset loading and raw input capture are external collaborators.
//! The renderer consumes [`sim::Game::snapshot`] once per frame; input arrives
//! as pre-debounced press/release events inside [`sim::TickInput`].

pub mod sim;

pub use sim::{Game, GameEvent, TickInput};

/// Game configuration constants
pub mod consts {
    /// Lateral extent objects may occupy; hazards bounce at the edges
    pub const X_BOUNDS: [f32; 2] = [0.0, 20.0];
    /// Lateral cell kept clear of obstacles so every grass lane is passable
    pub const CENTER_STRIP_X: i32 = 10;

    /// Minimum number of generated-but-unvisited lanes ahead of the score
    pub const LANE_BUFFER: usize = 20;
    /// Width of guaranteed obstacle coverage along each lane edge
    pub const THICK_REGION: i32 = 6;
    /// Width of the safe zone rebuilt on reset
    pub const INITIAL_SAFE_WIDTH: usize = 8;

    /// Render height offsets per lane kind
    pub const SAFE_HEIGHT: f32 = 2.6;
    pub const ROAD_HEIGHT: f32 = 0.72;

    /// Chance of any obstacle per grass cell outside the thick region
    pub const OBSTACLE_CHANCE: f32 = 0.3;
    /// Relative weights for rock vs. tree when an obstacle is placed
    pub const ROCK_WEIGHT: f32 = 0.3;
    pub const TREE_WEIGHT: f32 = 0.7;

    /// Vehicle length in lane units
    pub const CAR_LENGTH: f32 = 1.6;
    /// Spawn gap range (lane units between consecutive vehicles)
    pub const MIN_GAP: f32 = 1.0;
    pub const MAX_GAP: f32 = 12.0;
    /// Vehicle speed envelope (lane units per second)
    pub const MIN_VELOCITY: f32 = 0.8;
    pub const MAX_VELOCITY: f32 = 5.0;
    pub const VEL_VARIANCE: f32 = 2.0;
    /// Lane index at which difficulty scaling tops out
    pub const HARD_MODE_DISTANCE: f32 = 200.0;

    /// Jump transition tuning
    pub const JUMP_DURATION: f32 = 0.20;
    pub const JUMP_HEIGHT: f32 = 0.20;
    /// Cosmetic squash/stretch tuning
    pub const STRETCH_RANGE: f32 = 0.2;
    pub const STRETCH_SPEED: f32 = 3.864 / JUMP_DURATION;
    pub const SPIN_SPEED: f32 = 2.5 / JUMP_DURATION;
    /// Half extent of the player's collision footprint
    pub const PLAYER_RADIUS: f32 = 0.4;
    /// Stretch applied along the impact axis on a hazard hit
    pub const DEATH_SQUASH: f32 = 0.1;
    /// Stretch applied to the remaining axes on a hazard hit
    pub const DEATH_INFLATE: f32 = 1.17;

    /// Player starting grid cell
    pub const PLAYER_START: (f32, f32) = (10.0, 5.0);
}

/// Linear interpolation: `a` toward `b` by factor `t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
