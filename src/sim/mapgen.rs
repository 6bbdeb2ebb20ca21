//! Procedural world growth
//!
//! Decides, biome by biome, how the world extends ahead of the player and
//! which lanes retire behind it. Generation is chunked - a whole biome at a
//! time - because back-to-back lanes of one biome should look connected;
//! randomness operates at chunk granularity, except for obstacle placement
//! density within a grass chunk.

use rand::Rng;

use super::spawner::Spawners;
use super::stats::{bernoulli, choice, normal_discrete, uniform_discrete};
use super::world::{LaneKind, World};
use crate::consts::{
    CENTER_STRIP_X, INITIAL_SAFE_WIDTH, LANE_BUFFER, OBSTACLE_CHANCE, ROCK_WEIGHT, THICK_REGION,
    TREE_WEIGHT,
};

/// A category of boulevard with its own width distribution and density rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Biome {
    Grass,
    Road,
}

/// Per-biome tunables: selection weight and width distribution
#[derive(Debug, Clone, Copy)]
pub struct BiomeStats {
    pub chance: f32,
    pub width_mean: f32,
    pub width_sigma: f32,
}

impl Biome {
    pub const ALL: [Biome; 2] = [Biome::Grass, Biome::Road];

    pub fn stats(self) -> BiomeStats {
        match self {
            Biome::Grass => BiomeStats {
                chance: 50.0,
                width_mean: 1.0,
                width_sigma: 1.5,
            },
            Biome::Road => BiomeStats {
                chance: 50.0,
                width_mean: 3.0,
                width_sigma: 0.7,
            },
        }
    }
}

/// Generator state: only the previously placed biome, used to forbid
/// immediate repetition. `None` is the sentinel before anything is placed,
/// so the very first biome is never biased away from either real choice.
#[derive(Debug, Clone, Default)]
pub struct MapGen {
    prev_biome: Option<Biome>,
}

impl MapGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the world until the look-ahead buffer is full, then retire all
    /// lanes in a fixed window strictly behind the garbage edge. Invoked
    /// whenever the score increases.
    pub fn expand<R: Rng>(
        &mut self,
        world: &mut World,
        spawners: &mut Spawners,
        rng: &mut R,
        now: f64,
    ) {
        while world.lane_count().saturating_sub(world.score()) <= LANE_BUFFER {
            self.add_chunk(world, spawners, rng, now);
        }

        // The garbage edge trails the score by twice the look-ahead, so a
        // lane is never retired while still within visual or collision range.
        let garbage_buffer = 2 * LANE_BUFFER;
        let garbage_edge = world.score() as isize - garbage_buffer as isize;
        for z in (garbage_edge - LANE_BUFFER as isize)..garbage_edge {
            if z < 0 {
                continue;
            }
            world.retire_lane(z as usize);
            spawners.disarm_lane(z as usize);
        }
    }

    /// Delete all tiles and rebuild the fixed-width initial safe zone, then
    /// run one expansion pass to populate the look-ahead buffer. The caller
    /// must reset score and player alongside (see `Game::reset`).
    pub fn reset_map<R: Rng>(
        &mut self,
        world: &mut World,
        spawners: &mut Spawners,
        rng: &mut R,
        now: f64,
    ) {
        log::info!("rebuilding world: initial safe zone + look-ahead buffer");
        world.erase();
        spawners.disarm_all();
        self.prev_biome = None;
        self.build_grass_biome(INITIAL_SAFE_WIDTH, world, rng);
        self.expand(world, spawners, rng, now);
    }

    /// Generate one chunk: weight-sample a biome from the candidates
    /// excluding the previous one, sample its width, and build it.
    fn add_chunk<R: Rng>(
        &mut self,
        world: &mut World,
        spawners: &mut Spawners,
        rng: &mut R,
        now: f64,
    ) {
        let remain: Vec<Biome> = Biome::ALL
            .into_iter()
            .filter(|b| Some(*b) != self.prev_biome)
            .collect();
        let weights: Vec<f32> = remain.iter().map(|b| b.stats().chance).collect();
        let biome = remain[choice(rng, &weights)];

        let stats = biome.stats();
        // +1 correction guarantees width >= 1
        let width = (normal_discrete(rng, stats.width_mean - 1.0, stats.width_sigma) + 1) as usize;
        log::debug!("chunk: {biome:?} width {width}");

        match biome {
            Biome::Grass => self.build_grass_biome(width, world, rng),
            Biome::Road => self.build_road_biome(width, world, spawners, rng, now),
        }
    }

    /// Place a safe boulevard and fill it with obstacles: unconditionally
    /// within the thick margin near each lateral edge, probabilistically
    /// elsewhere, and never in the center strip so every lane stays passable.
    fn build_grass_biome<R: Rng>(&mut self, width: usize, world: &mut World, rng: &mut R) {
        self.prev_biome = Some(Biome::Grass);
        world.add_boulevard(LaneKind::Safe, width);

        let [min_x, max_x] = world.x_bounds;
        let thick0 = min_x as i32 + THICK_REGION;
        let thick1 = max_x as i32 - THICK_REGION;

        for z in world.lane_count() - width..world.lane_count() {
            for x in min_x as i32..max_x as i32 {
                if x == CENTER_STRIP_X {
                    continue;
                }
                if x < thick0 || x > thick1 {
                    place_obstacle(x, z, world, rng);
                } else if bernoulli(rng, OBSTACLE_CHANCE) {
                    place_obstacle(x, z, world, rng);
                }
            }
        }
    }

    /// Place a road boulevard and arm a hazard spawner for every new lane
    fn build_road_biome<R: Rng>(
        &mut self,
        width: usize,
        world: &mut World,
        spawners: &mut Spawners,
        rng: &mut R,
        now: f64,
    ) {
        self.prev_biome = Some(Biome::Road);
        world.add_boulevard(LaneKind::Road, width);
        for z in world.lane_count() - width..world.lane_count() {
            spawners.arm_lane(z, now, world, rng);
        }
    }
}

/// One obstacle: rock or tree by weighted choice; trees get a random height
fn place_obstacle<R: Rng>(x: i32, z: usize, world: &mut World, rng: &mut R) {
    match choice(rng, &[ROCK_WEIGHT, TREE_WEIGHT]) {
        0 => world.add_obstacle(x, z, None, rng),
        _ => {
            let height = uniform_discrete(rng, 1, 4) as u32;
            world.add_tree(x, z, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fresh(seed: u64) -> (World, Spawners, MapGen, Pcg32) {
        let mut world = World::new();
        let mut spawners = Spawners::new();
        let mut mapgen = MapGen::new();
        let mut rng = Pcg32::seed_from_u64(seed);
        mapgen.reset_map(&mut world, &mut spawners, &mut rng, 0.0);
        (world, spawners, mapgen, rng)
    }

    #[test]
    fn test_reset_builds_safe_zone_and_buffer() {
        let (world, _, _, _) = fresh(1);
        for z in 0..INITIAL_SAFE_WIDTH {
            assert!(world.is_grass(z), "initial zone lane {z} should be grass");
        }
        assert!(world.lane_count() - world.score() > LANE_BUFFER);
    }

    #[test]
    fn test_lane_buffer_invariant_after_expand() {
        for seed in 0..10 {
            let (mut world, mut spawners, mut mapgen, mut rng) = fresh(seed);
            for score in [5, 17, 42, 90, 250] {
                world.advance_score(score);
                mapgen.expand(&mut world, &mut spawners, &mut rng, 0.0);
                assert!(
                    world.lane_count() - world.score() >= LANE_BUFFER,
                    "buffer underfilled at score {score} (seed {seed})"
                );
            }
        }
    }

    #[test]
    fn test_center_strip_stays_passable() {
        let (world, _, _, _) = fresh(2);
        for z in 0..world.lane_count() {
            assert!(
                !world.is_obstacle(CENTER_STRIP_X, z as i32),
                "center strip blocked at lane {z}"
            );
        }
    }

    #[test]
    fn test_thick_region_fully_covered() {
        let (world, _, _, _) = fresh(3);
        for z in 0..world.lane_count() {
            if !world.is_grass(z) {
                continue;
            }
            // Everything outside the thick bounds is guaranteed blocked
            for x in 0..THICK_REGION {
                assert!(world.is_obstacle(x, z as i32));
            }
            for x in 15..20 {
                assert!(world.is_obstacle(x, z as i32));
            }
        }
    }

    #[test]
    fn test_road_lanes_get_spawners() {
        let (world, spawners, _, _) = fresh(4);
        // Nothing is retired yet, so every non-grass lane is a road lane
        for z in 0..world.lane_count() {
            if !world.is_grass(z) {
                assert!(spawners.armed(z), "road lane {z} not armed");
            }
        }
    }

    #[test]
    fn test_old_lanes_retired_and_disarmed() {
        let (mut world, mut spawners, mut mapgen, mut rng) = fresh(5);
        world.advance_score(200);
        mapgen.expand(&mut world, &mut spawners, &mut rng, 0.0);

        let garbage_edge = 200 - 2 * LANE_BUFFER;
        let tiles = world.snapshot();
        for z in garbage_edge - LANE_BUFFER..garbage_edge {
            assert!(
                !tiles.iter().any(|t| t.pos.z == z as f32),
                "retired lane {z} should be empty"
            );
            assert!(!spawners.armed(z), "retired lane {z} should be disarmed");
        }
        // Lanes at and past the garbage edge survive
        assert!(world.lane_count() > 200);
    }

    #[test]
    fn test_biomes_never_repeat_back_to_back() {
        let mut world = World::new();
        let mut spawners = Spawners::new();
        let mut mapgen = MapGen::new();
        let mut rng = Pcg32::seed_from_u64(6);

        let mut prev_kind: Option<bool> = None;
        for _ in 0..50 {
            let start = world.lane_count();
            mapgen.add_chunk(&mut world, &mut spawners, &mut rng, 0.0);
            let kind = world.is_grass(start);
            // Each chunk is uniform in ground kind
            for z in start..world.lane_count() {
                assert_eq!(world.is_grass(z), kind, "mixed chunk at lane {z}");
            }
            assert_ne!(Some(kind), prev_kind, "biome repeated back to back");
            prev_kind = Some(kind);
        }
    }
}
