//! Spawn director: waves, elites, hordes, minibosses and the boss milestone
//!
//! Schedules are frame numbers. Every schedule is frozen while the boss lives.

use rand::Rng;

use super::boss::spawn_boss;
use super::enemy::spawn_enemy;
use super::miniboss::spawn_miniboss;
use super::state::SimulationWorld;

pub const FIRST_HORDE_FRAME: u64 = 600;
pub const FIRST_MINIBOSS_FRAME: u64 = 1200;

#[derive(Debug, Clone, PartialEq)]
pub struct Director {
    pub next_wave: u64,
    pub next_elite: u64,
    pub next_horde: u64,
    pub next_miniboss: u64,
    /// Player level that brings the next boss
    pub next_boss_level: u32,
}

impl Director {
    pub fn new(boss_level_interval: u32) -> Self {
        Self {
            next_wave: 0,
            next_elite: 0,
            next_horde: FIRST_HORDE_FRAME,
            next_miniboss: FIRST_MINIBOSS_FRAME,
            next_boss_level: boss_level_interval,
        }
    }
}

/// Enemies per ordinary wave
///
/// Step function of the player level; the breakpoints are fixed.
pub fn wave_size(level: u32) -> u32 {
    let l = level as f32;
    let size = match level {
        0..=3 => 1.0 + (l * 0.3).floor(),
        4..=7 => 2.0 + ((l - 3.0) * 0.5).floor(),
        8..=12 => 4.0 + ((l - 7.0) * 0.8).floor(),
        13..=18 => 8.0 + ((l - 12.0) * 1.2).floor(),
        19..=25 => 15.0 + ((l - 18.0) * 1.6).floor(),
        26..=35 => 26.0 + ((l - 25.0) * 2.2).floor(),
        _ => 48.0 + ((l - 35.0) * 3.0).floor(),
    };
    size as u32
}

/// Frames until the next wave
pub fn wave_interval(level: u32) -> u64 {
    (40.0 - level as f32 * 1.2).max(12.0) as u64
}

pub fn elite_chance(level: u32) -> f32 {
    (0.02 + level as f32 * 0.002).min(0.22)
}

pub fn elite_count(level: u32) -> u32 {
    1 + level / 15
}

pub fn horde_size(level: u32) -> u32 {
    (wave_size(level) as f32 * 1.5).floor() as u32
}

/// Run every schedule that is due this frame
pub fn evaluate(world: &mut SimulationWorld) {
    if world.boss.is_some() {
        return;
    }
    let frame = world.frame;
    let level = world.player.level;

    if frame > world.director.next_wave {
        world.director.next_wave = frame + wave_interval(level);
        for _ in 0..wave_size(level) {
            spawn_enemy(world, false);
        }
    }

    if frame > world.director.next_elite {
        if world.rng.random::<f32>() < elite_chance(level) {
            for _ in 0..elite_count(level) {
                spawn_enemy(world, true);
            }
        }
        world.director.next_elite = frame + 380 + world.rng.random_range(0..180);
    }

    if frame > world.director.next_horde {
        let amount = horde_size(level);
        log::debug!("horde of {} at frame {}", amount, frame);
        for _ in 0..amount {
            spawn_enemy(world, false);
        }
        world.director.next_horde = frame + 550 + world.rng.random_range(0..200);
    }

    if frame > world.director.next_miniboss {
        world.director.next_miniboss = frame + 900 + world.rng.random_range(0..800);
        spawn_miniboss(world);
    }

    if level >= world.director.next_boss_level && spawn_boss(world) {
        world.director.next_boss_level += world.tuning.boss_level_interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerClass;

    #[test]
    fn test_wave_size_breakpoints() {
        assert_eq!(wave_size(1), 1);
        assert_eq!(wave_size(3), 1);
        assert_eq!(wave_size(4), 2);
        assert_eq!(wave_size(5), 3);
        assert_eq!(wave_size(7), 4);
        assert_eq!(wave_size(8), 4);
        assert_eq!(wave_size(12), 8);
        assert_eq!(wave_size(18), 15);
        assert_eq!(wave_size(25), 26);
        assert_eq!(wave_size(35), 48);
        assert_eq!(wave_size(40), 63);
    }

    #[test]
    fn test_wave_size_is_monotonic() {
        for level in 1..100 {
            assert!(wave_size(level + 1) >= wave_size(level), "level {}", level);
        }
    }

    #[test]
    fn test_elite_chance_caps() {
        assert!((elite_chance(5) - 0.03).abs() < 1e-6);
        assert_eq!(elite_chance(500), 0.22);
        assert_eq!(elite_count(14), 1);
        assert_eq!(elite_count(30), 3);
    }

    #[test]
    fn test_wave_interval_floor() {
        assert_eq!(wave_interval(1), 38);
        assert_eq!(wave_interval(30), 12);
    }

    #[test]
    fn test_first_frame_spawns_wave() {
        let mut world = SimulationWorld::new(4, PlayerClass::Ranger);
        world.frame = 1;
        evaluate(&mut world);
        let ordinary = world.enemies.iter().filter(|e| !e.elite).count() as u32;
        assert_eq!(ordinary, wave_size(1));
        assert_eq!(world.director.next_wave, 1 + wave_interval(1));
        assert!(world.director.next_elite >= 381);
    }

    #[test]
    fn test_boss_suspends_schedules() {
        let mut world = SimulationWorld::new(4, PlayerClass::Ranger);
        world.player.level = 10;
        world.frame = 1;
        evaluate(&mut world);
        assert!(world.boss.is_some());
        assert_eq!(world.director.next_boss_level, 20);

        let enemies = world.enemies.len();
        world.frame = 5000;
        evaluate(&mut world);
        assert_eq!(world.enemies.len(), enemies);
        assert!(world.minibosses.is_empty());
    }
}
