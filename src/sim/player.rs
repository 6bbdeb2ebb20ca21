//! Player state machine
//!
//! Discrete grid-locked movement with a continuous animated transition.
//! Exactly one of idle / jumping / dead-drifting holds at any time; input is
//! validated against the tile world before any position changes, and the
//! jump's vertical motion is a closed-form parabola over normalized progress
//! so it lands at exactly zero height regardless of frame cadence.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::world::World;
use crate::consts::{
    DEATH_INFLATE, DEATH_SQUASH, JUMP_DURATION, JUMP_HEIGHT, PLAYER_START, SPIN_SPEED,
    STRETCH_RANGE, STRETCH_SPEED,
};
use crate::lerp;

/// A discrete movement input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    /// Grid delta (x, z)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Forward => (0, 1),
            Direction::Backward => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Target facing as a quarter-turn index
    pub fn facing(self) -> u8 {
        match self {
            Direction::Forward => 0,
            Direction::Left => 1,
            Direction::Backward => 2,
            Direction::Right => 3,
        }
    }
}

/// Impact axis reported by the collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

/// The player's modal state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Idle,
    /// Mid-jump: elapsed/total parameterize the arc; `from` is the takeoff
    /// cell in the lane plane
    Jumping { elapsed: f32, total: f32, from: Vec2 },
    /// Terminal until an external reset; drifts laterally at the velocity of
    /// the hazard that caused it
    Dead { drift: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Animated draw position (x lateral, y height, z lane)
    pos: Vec3,
    /// Continuous facing, animated toward `target_orient`
    orient: f32,
    target_orient: f32,
    /// Cosmetic squash/stretch scale
    stretch: Vec3,
    /// Queue of stretch.y targets, consumed one at a time on convergence
    stretch_targets: Vec<f32>,
    /// Grid target cell (x, z)
    target: Vec2,
    motion: Motion,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        let (x, z) = PLAYER_START;
        Self {
            pos: Vec3::new(x, 0.0, z),
            orient: 0.0,
            target_orient: 0.0,
            stretch: Vec3::ONE,
            stretch_targets: Vec::new(),
            target: Vec2::new(x, z),
            motion: Motion::Idle,
        }
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn orient(&self) -> f32 {
        self.orient
    }

    pub fn stretch(&self) -> Vec3 {
        self.stretch
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn alive(&self) -> bool {
        !matches!(self.motion, Motion::Dead { .. })
    }

    /// Cosmetic pre-squash on key down; never affects movement validity
    pub fn on_direction_pressed(&mut self, _dir: Direction) {
        if !self.alive() {
            return;
        }
        self.stretch_targets = vec![1.0 - STRETCH_RANGE];
    }

    /// Attempt a move on key release. Only honored while idle; the candidate
    /// cell is validated against the world before any position mutation. A
    /// rejected move still plays the queued squash. Returns true if a
    /// transition started.
    pub fn on_direction_released(&mut self, dir: Direction, world: &World) -> bool {
        if self.motion != Motion::Idle {
            return false;
        }

        self.stretch_targets = vec![1.0 + STRETCH_RANGE, 1.0];
        self.target_orient = dir.facing() as f32;

        let (dx, dz) = dir.delta();
        let x = (self.pos.x + dx as f32).round() as i32;
        let z = (self.pos.z + dz as f32).round() as i32;
        if world.is_obstacle(x, z) {
            return false;
        }

        self.target = Vec2::new(x as f32, z as f32);
        let from = Vec2::new(self.pos.x, self.pos.z);
        let total = (self.target - from).length() * JUMP_DURATION;
        self.motion = Motion::Jumping {
            elapsed: 0.0,
            total,
            from,
        };
        true
    }

    /// Advance animations and any active transition. Returns the arrival
    /// lane index when a jump completes, for score bookkeeping by the caller.
    pub fn tick(&mut self, dt: f32) -> Option<usize> {
        if let Motion::Dead { drift } = self.motion {
            self.pos.x += drift * dt;
            return None;
        }

        // Squash queue: converge on the head target, then pop it
        if let Some(&target) = self.stretch_targets.first() {
            if (self.stretch.y - target).abs() < 0.01 {
                self.stretch_targets.remove(0);
            } else {
                self.stretch.y = lerp(self.stretch.y, target, (STRETCH_SPEED * dt).min(1.0));
                let fat = (4.0 - self.stretch.y) / 3.0;
                self.stretch.x = fat;
                self.stretch.z = fat;
            }
        }

        // Spin toward the target facing, shortest path across the 4-way wrap
        if self.orient != self.target_orient {
            if (self.orient - self.target_orient).abs() >= 2.0 {
                if self.orient < self.target_orient {
                    self.orient += 4.0;
                } else {
                    self.orient -= 4.0;
                }
            }
            self.orient = lerp(self.orient, self.target_orient, (SPIN_SPEED * dt).min(1.0));
        }

        if let Motion::Jumping { elapsed, total, from } = &mut self.motion {
            // Clamp the step so the transition cannot overshoot its duration
            let step = dt.min(*total - *elapsed);
            *elapsed += step;
            let s = if *total > 0.0 { *elapsed / *total } else { 1.0 };

            self.pos.x = lerp(from.x, self.target.x, s);
            self.pos.z = lerp(from.y, self.target.y, s);
            // Closed-form arc: lands at exactly zero, peaks at JUMP_HEIGHT
            self.pos.y = 4.0 * JUMP_HEIGHT * s * (1.0 - s);

            if *elapsed >= *total {
                self.pos = Vec3::new(self.target.x, 0.0, self.target.y);
                self.motion = Motion::Idle;
                return Some(self.pos.z.round() as usize);
            }
        }

        None
    }

    /// Hazard collision: freeze the spin at its nearest discrete facing,
    /// flatten along the impact axis, halt any transition in place, and
    /// start drifting at the hazard's velocity. Terminal until reset.
    pub fn on_hazard_hit(&mut self, axis: Axis, hazard_velocity: f32) {
        if !self.alive() {
            return;
        }

        self.orient = self.orient.round().rem_euclid(4.0);
        self.target_orient = self.orient;

        self.stretch = Vec3::splat(DEATH_INFLATE);
        match axis {
            Axis::X => self.stretch.x = DEATH_SQUASH,
            Axis::Z => self.stretch.z = DEATH_SQUASH,
        }
        self.stretch_targets.clear();

        self.target = Vec2::new(self.pos.x, self.pos.z);
        self.motion = Motion::Dead {
            drift: hazard_velocity,
        };
    }

    /// Back to the initial grid cell, alive and idle
    pub fn reset(&mut self) {
        *self = Player::new();
    }
}
