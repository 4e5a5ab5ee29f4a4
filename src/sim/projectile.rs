//! Player bullets and hostile shots
//!
//! Each frame a projectile steers (if homing), moves, ages, checks walls and
//! then tests hostiles in priority order. A projectile damages at most one
//! actor per frame.

use glam::Vec2;
use rand::Rng;

use super::aura::{apply_slow, ignite};
use super::collision::ObstacleOracle;
use super::events::{VisualHandle, VisualKind};
use super::hostile::{HostileRef, HostileTier};
use super::state::{DamageSource, SimulationWorld};
use crate::audio::Sound;
use crate::consts::*;
use crate::{bearing, direction};

/// Velocity added toward the nearest hostile each frame by homing bullets
pub const HOMING_NUDGE: f32 = 0.05;
/// Fragments released by a destroyed bullet with splinter rounds
pub const FRAGMENT_SPEED: f32 = 0.6;
pub const FRAGMENT_LIFETIME: u32 = 12;
pub const FRAGMENT_DAMAGE_SCALE: f32 = 0.35;
/// Frostbite slow carried by player projectiles
pub const FROSTBITE_DURATION: f32 = 2.0;
/// Combust burn carried by player projectiles
pub const COMBUST_DURATION: f32 = 3.0;

/// Projectile families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotKind {
    PlayerBullet,
    /// Radial splinter of a destroyed bullet
    Fragment,
    /// Ranged enemy bolt
    MageBolt,
    /// Boss orb (burst, breath and spiral)
    BossOrb,
}

impl ShotKind {
    pub fn is_hostile(self) -> bool {
        matches!(self, ShotKind::MageBolt | ShotKind::BossOrb)
    }

    /// Units per reference frame for hostile shots
    pub fn speed(self) -> f32 {
        match self {
            ShotKind::PlayerBullet => 1.15,
            ShotKind::Fragment => FRAGMENT_SPEED,
            ShotKind::MageBolt => 0.8,
            ShotKind::BossOrb => 0.6,
        }
    }

    /// Frames before the shot fizzles
    pub fn lifetime(self) -> u32 {
        match self {
            ShotKind::PlayerBullet => BULLET_LIFETIME,
            ShotKind::Fragment => FRAGMENT_LIFETIME,
            ShotKind::MageBolt => 160,
            ShotKind::BossOrb => 240,
        }
    }

    /// Squared distance at which a hostile shot hits the player
    pub fn player_hit_radius_sq(self) -> f32 {
        match self {
            ShotKind::MageBolt => 1.3,
            ShotKind::BossOrb => 1.2,
            ShotKind::PlayerBullet | ShotKind::Fragment => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub kind: ShotKind,
    pub pos: Vec2,
    /// Units per reference frame
    pub vel: Vec2,
    /// Frames left
    pub life: u32,
    pub damage: f32,
    /// Extra hostiles this projectile may pass through
    pub pierce: u32,
    pub homing: bool,
    pub visual: VisualHandle,
}

impl Projectile {
    fn new(world: &mut SimulationWorld, kind: ShotKind, pos: Vec2, vel: Vec2, damage: f32) -> Self {
        let id = world.next_entity_id();
        let visual = world.events.acquire(VisualKind::Shot(kind), pos);
        Self {
            id,
            kind,
            pos,
            vel,
            life: kind.lifetime(),
            damage,
            pierce: 0,
            homing: false,
            visual,
        }
    }
}

/// Fire a player bullet along `angle` with the player's current stats
pub fn spawn_player_bullet(world: &mut SimulationWorld, angle: f32, damage_scale: f32) -> u32 {
    let pos = world.player.pos;
    let vel = direction(angle) * world.player.bullet_speed;
    let damage = world.player.attack_damage() * damage_scale;
    let mut bullet = Projectile::new(world, ShotKind::PlayerBullet, pos, vel, damage);
    bullet.pierce = world.player.pierce;
    bullet.homing = world.player.homing;
    let id = bullet.id;
    world.bullets.push(bullet);
    id
}

/// Fire a hostile shot from `from` along `angle`
pub fn spawn_hostile_shot(world: &mut SimulationWorld, kind: ShotKind, from: Vec2, angle: f32, damage: f32) {
    let vel = direction(angle) * kind.speed();
    let shot = Projectile::new(world, kind, from, vel, damage);
    world.hostile_shots.push(shot);
}

/// Splinter a destroyed bullet into a ring of fragments
fn splinter(world: &mut SimulationWorld, from: &Projectile, out: &mut Vec<Projectile>) {
    let count = world.player.fragments;
    if count == 0 || from.kind != ShotKind::PlayerBullet {
        return;
    }
    let base = world.rng.random::<f32>() * std::f32::consts::TAU;
    for i in 0..count {
        let angle = base + i as f32 * std::f32::consts::TAU / count as f32;
        let vel = direction(angle) * FRAGMENT_SPEED;
        let damage = from.damage * FRAGMENT_DAMAGE_SCALE;
        out.push(Projectile::new(world, ShotKind::Fragment, from.pos, vel, damage));
    }
}

/// First hostile in range of `pos`: enemies, then minibosses, then boss
fn first_hit(world: &SimulationWorld, pos: Vec2) -> Option<(HostileRef, Vec2)> {
    let enemy_r = HostileTier::Enemy.bullet_hit_radius();
    if let Some(e) = world
        .enemies
        .iter()
        .rev()
        .find(|e| e.body.pos.distance(pos) < enemy_r)
    {
        return Some((HostileRef::Enemy(e.body.id), e.body.pos));
    }
    let miniboss_r = HostileTier::Miniboss.bullet_hit_radius();
    if let Some(m) = world
        .minibosses
        .iter()
        .rev()
        .find(|m| m.body.pos.distance(pos) < miniboss_r)
    {
        return Some((HostileRef::Miniboss(m.body.id), m.body.pos));
    }
    world
        .boss
        .as_ref()
        .filter(|b| b.body.pos.distance(pos) < HostileTier::Boss.bullet_hit_radius())
        .map(|b| (HostileRef::Boss, b.body.pos))
}

fn remove_bullet(world: &mut SimulationWorld, index: usize) -> Projectile {
    let bullet = world.bullets.remove(index);
    world.events.release(bullet.visual);
    bullet
}

/// Advance every player projectile by one frame
pub fn update_bullets(world: &mut SimulationWorld, dt: f32, oracle: &dyn ObstacleOracle) {
    let step = dt * REFERENCE_FPS;
    let mut fragments = Vec::new();

    let mut i = world.bullets.len();
    while i > 0 {
        i -= 1;

        if world.bullets[i].homing {
            let pos = world.bullets[i].pos;
            if let Some(t) = world.hostiles().nearest(pos) {
                world.bullets[i].vel += direction(bearing(pos, t.pos)) * HOMING_NUDGE;
            }
        }

        let bullet = &mut world.bullets[i];
        bullet.pos += bullet.vel * step;
        bullet.life = bullet.life.saturating_sub(1);
        let pos = bullet.pos;
        if bullet.life == 0 {
            remove_bullet(world, i);
            continue;
        }

        if oracle.query_obstacle(pos, BULLET_WALL_RADIUS).hit {
            world.events.impact(pos);
            remove_bullet(world, i);
            continue;
        }

        let Some((target, target_pos)) = first_hit(world, pos) else {
            continue;
        };

        let mut damage = world.bullets[i].damage;
        if world.rng.random::<f32>() < world.player.crit_chance {
            damage *= world.player.crit_mult;
        }

        let slow = world.player.inflict_slow;
        let burn = world.player.inflict_burn;
        if let Some(body) = world.body_mut(target) {
            if slow > 0.0 {
                apply_slow(body, 1.0 - slow, FROSTBITE_DURATION);
            }
            if burn > 0.0 {
                ignite(body, burn, COMBUST_DURATION);
            }
        }

        world.events.impact(target_pos);
        world.events.sound(Sound::Hit);
        world.damage_hostile(target, damage, DamageSource::Projectile);

        if world.bullets[i].pierce > 0 {
            world.bullets[i].pierce -= 1;
            continue;
        }
        let spent = remove_bullet(world, i);
        splinter(world, &spent, &mut fragments);
    }

    world.bullets.append(&mut fragments);
}

/// Advance every hostile shot by one frame
pub fn update_hostile_shots(world: &mut SimulationWorld, dt: f32, oracle: &dyn ObstacleOracle) {
    let step = dt * REFERENCE_FPS;
    let player_pos = world.player.pos;

    let mut i = world.hostile_shots.len();
    while i > 0 {
        i -= 1;

        let shot = &mut world.hostile_shots[i];
        shot.pos += shot.vel * step;
        let pos = shot.pos;

        if player_pos.distance_squared(pos) < shot.kind.player_hit_radius_sq() {
            let shot = world.hostile_shots.remove(i);
            world.events.release(shot.visual);
            world.hurt_player(shot.damage);
            world.events.impact(pos);
            continue;
        }

        shot.life = shot.life.saturating_sub(1);
        let expired = shot.life == 0;
        if expired || oracle.query_obstacle(pos, BULLET_WALL_RADIUS).hit {
            if !expired {
                world.events.impact(pos);
            }
            let shot = world.hostile_shots.remove(i);
            world.events.release(shot.visual);
        }
    }
}
