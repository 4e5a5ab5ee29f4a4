//! Frame orchestration
//!
//! One call advances every subsystem in a fixed order:
//! movement, attacks, bullets, enemies, hostile shots, minibosses, boss,
//! passive damage, pickups, then the spawn director.

use glam::Vec2;

use super::attack;
use super::aura::{apply_auras, tick_statuses};
use super::boss::update_boss;
use super::collision::ObstacleOracle;
use super::director;
use super::enemy::update_enemies;
use super::miniboss::update_minibosses;
use super::progression::update_gems;
use super::projectile::{update_bullets, update_hostile_shots};
use super::state::{Phase, SimulationWorld};
use crate::consts::MAX_FRAME_DT;

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Desired movement; longer than 1 is clamped
    pub move_dir: Vec2,
}

/// Advance the world by one rendered frame of `dt` seconds
pub fn tick(world: &mut SimulationWorld, input: &TickInput, dt: f32, oracle: &dyn ObstacleOracle) {
    if !world.active || world.phase != Phase::Playing {
        return;
    }
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let dt = dt.min(MAX_FRAME_DT);

    world.frame += 1;
    world.elapsed += dt;

    world.player.step_movement(input.move_dir, dt, oracle);
    world.player.regenerate(dt);

    attack::dispatch(world, dt);
    update_bullets(world, dt, oracle);

    update_enemies(world, dt);
    update_hostile_shots(world, dt, oracle);
    update_minibosses(world, dt);
    update_boss(world, dt);
    if world.player.dead {
        return;
    }

    apply_auras(world, dt);
    tick_statuses(world, dt);

    update_gems(world, dt);
    director::evaluate(world);
}
