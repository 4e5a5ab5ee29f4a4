//! World collision: static obstacles and circle tests
//!
//! The arena itself is owned by the host; the simulation only asks whether a
//! circle at some position overlaps anything solid.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Result of an obstacle query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleHit {
    /// Whether anything solid overlaps the probe
    pub hit: bool,
    /// The first obstacle found (if hit)
    pub obstacle: Option<Obstacle>,
}

impl ObstacleHit {
    pub fn miss() -> Self {
        Self {
            hit: false,
            obstacle: None,
        }
    }

    pub fn with(obstacle: Obstacle) -> Self {
        Self {
            hit: true,
            obstacle: Some(obstacle),
        }
    }
}

/// Collision oracle consulted by player movement and projectile travel
pub trait ObstacleOracle {
    fn query_obstacle(&self, pos: Vec2, radius: f32) -> ObstacleHit;
}

/// Round solid prop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
}

/// Arena with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenArena;

impl ObstacleOracle for OpenArena {
    fn query_obstacle(&self, _pos: Vec2, _radius: f32) -> ObstacleHit {
        ObstacleHit::miss()
    }
}

/// Number of props scattered by default
pub const DEFAULT_OBSTACLE_COUNT: usize = 25;
/// Half-width of the square props are scattered over
pub const SCATTER_HALF_EXTENT: f32 = 90.0;
/// Props keep this far from the player's starting point
pub const SPAWN_CLEARANCE: f32 = 12.0;
/// Placement retries before accepting a spot inside the clearance
const MAX_PLACEMENT_TRIES: u32 = 50;

/// A fixed set of round obstacles
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Scatter `count` props around the origin, keeping the spawn area clear
    pub fn scatter(seed: u64, count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut obstacles = Vec::with_capacity(count);
        for _ in 0..count {
            let mut pos;
            let mut tries = 0;
            loop {
                pos = Vec2::new(
                    rng.random_range(-SCATTER_HALF_EXTENT..SCATTER_HALF_EXTENT),
                    rng.random_range(-SCATTER_HALF_EXTENT..SCATTER_HALF_EXTENT),
                );
                tries += 1;
                if pos.length() >= SPAWN_CLEARANCE || tries >= MAX_PLACEMENT_TRIES {
                    break;
                }
            }
            let size = 0.8 + rng.random::<f32>() * 0.8;
            obstacles.push(Obstacle {
                pos,
                radius: size * 0.9,
            });
        }
        log::debug!("scattered {} obstacles", obstacles.len());
        Self { obstacles }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

impl ObstacleOracle for ObstacleField {
    fn query_obstacle(&self, pos: Vec2, radius: f32) -> ObstacleHit {
        self.obstacles
            .iter()
            .find(|o| circles_overlap(pos, radius, o.pos, o.radius))
            .map_or_else(ObstacleHit::miss, |o| ObstacleHit::with(*o))
    }
}

/// Whether two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Whether `point` lies strictly inside the circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) < radius * radius
}
