//! The game aggregate and per-tick control flow
//!
//! One `Game` owns the tile world, the generator, the spawners, the player
//! and the seeded RNG, so multiple independent instances can coexist and
//! tests stay deterministic. Tick ordering is fixed:
//!
//! 1. Input-driven player transition update (may complete a jump)
//! 2. Score-triggered world expansion/retirement, only if the score changed
//! 3. Hazard advance and spawn deadlines
//! 4. Collision scan of the 1-2 lanes nearest the player
//! 5. Death resolution on a hit

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision;
use super::mapgen::MapGen;
use super::player::{Axis, Direction, Player};
use super::spawner::Spawners;
use super::world::{TileInstance, World};

/// Edge-triggered input events for a single tick. The core treats these as
/// already debounced: one event per physical press/release.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub pressed: Option<Direction>,
    pub released: Option<Direction>,
}

/// Change notifications for the host (scoring/UI, camera)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A validated move began; the camera re-centers on this
    Moved,
    /// Score reached a new furthest lane
    ScoreChanged(usize),
    /// The player was hit by a hazard
    Died,
}

/// Player pose for the renderer
#[derive(Debug, Clone, Copy)]
pub struct PlayerPose {
    pub pos: Vec3,
    pub orient: f32,
    pub stretch: Vec3,
}

/// Per-frame view of the simulation, pulled by the external renderer
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// All live tiles, grouped by mesh, with lane height offsets
    pub tiles: Vec<TileInstance>,
    pub player: PlayerPose,
}

/// A complete, self-contained game instance
#[derive(Debug, Clone)]
pub struct Game {
    seed: u64,
    rng: Pcg32,
    /// Simulation clock in seconds, driven by tick dt
    time: f64,
    world: World,
    mapgen: MapGen,
    spawners: Spawners,
    player: Player,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a game with the initial safe zone and a filled look-ahead buffer
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            world: World::new(),
            mapgen: MapGen::new(),
            spawners: Spawners::new(),
            player: Player::new(),
            events: Vec::new(),
        };
        game.rebuild();
        game
    }

    fn rebuild(&mut self) {
        self.player.reset();
        self.world.reset_score();
        self.mapgen
            .reset_map(&mut self.world, &mut self.spawners, &mut self.rng, self.time);
        log::info!(
            "world ready: {} lanes buffered (seed {})",
            self.world.lane_count(),
            self.seed
        );
    }

    /// Atomically clear world, spawners, score and player and rebuild the
    /// initial safe zone. Safe to call at any time, including mid-transition.
    pub fn reset(&mut self) {
        self.events.clear();
        self.rebuild();
    }

    /// Advance the simulation by one variable-dt tick
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.time += dt as f64;

        // 1. Input and player transition
        if let Some(dir) = input.pressed {
            self.player.on_direction_pressed(dir);
        }
        if let Some(dir) = input.released
            && self.player.on_direction_released(dir, &self.world)
        {
            self.events.push(GameEvent::Moved);
        }
        let arrived = self.player.tick(dt);

        // 2. Expansion and retirement, only on score change
        if let Some(z) = arrived
            && self.world.advance_score(z)
        {
            self.events.push(GameEvent::ScoreChanged(z));
            self.mapgen
                .expand(&mut self.world, &mut self.spawners, &mut self.rng, self.time);
        }

        // 3. Moving hazards and spawn deadlines
        self.world.advance_hazards(dt);
        self.spawners.tick(self.time, &mut self.world, &mut self.rng);

        // 4-5. Collision scan and death resolution
        if self.player.alive() {
            let p = self.player.pos();
            let hit = self
                .world
                .cars_intersecting(Vec2::new(p.x, p.z), collision::player_footprint())
                .first()
                .map(|t| (t.pos, t.x_vel));
            if let Some((hit_pos, hit_vel)) = hit {
                let dx = (hit_pos.x - p.x).abs();
                let dz = (hit_pos.z - p.z).abs();
                let axis = if dx > dz { Axis::X } else { Axis::Z };
                log::info!("player hit in lane {} (axis {:?})", hit_pos.z, axis);
                self.player.on_hazard_hit(axis, hit_vel);
                self.events.push(GameEvent::Died);
            }
        }
    }

    /// Drain the change notifications accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Per-frame view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tiles: self.world.snapshot(),
            player: PlayerPose {
                pos: self.player.pos(),
                orient: self.player.orient(),
                stretch: self.player.stretch(),
            },
        }
    }

    /// Furthest lane the player has reached (monotone non-decreasing)
    pub fn score(&self) -> usize {
        self.world.score()
    }

    pub fn alive(&self) -> bool {
        self.player.alive()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }
}
