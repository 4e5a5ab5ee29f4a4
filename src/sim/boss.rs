//! The boss: pursuit plus several independently cooling attacks
//!
//! There is no discrete state machine. Each frame the boss closes in, rolls
//! its lunge and (in rage mode) its spiral, then fires whichever scheduled
//! attacks came off cooldown. Nova leaves [`VoidZone`]s behind.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;

use super::collision::point_in_circle;
use super::events::{GameEvent, VisualHandle, VisualKind};
use super::hostile::{Body, Hostile, HostileTier};
use super::projectile::{ShotKind, spawn_hostile_shot};
use super::state::SimulationWorld;
use crate::audio::Sound;
use crate::bearing;
use crate::consts::REFERENCE_FPS;

pub const BASE_HEALTH: f32 = 3500.0;
pub const HEALTH_PER_LEVEL: f32 = 200.0;
pub const BASE_DAMAGE: f32 = 45.0;
pub const DAMAGE_PER_LEVEL: f32 = 5.0;
/// Spawn offset from the player
pub const SPAWN_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Pursuit speed per reference frame
pub const BASE_SPEED: f32 = 0.05;
pub const ENRAGE_RADIUS: f32 = 10.0;
pub const ENRAGE_SPEED_BONUS: f32 = 0.09;
/// Rage mode below this fraction of max health
pub const RAGE_HEALTH_FRACTION: f32 = 0.25;
pub const RAGE_SPEED_BONUS: f32 = 0.12;

pub const LUNGE_RANGE: f32 = 3.0;
pub const LUNGE_CHANCE: f32 = 0.015;
pub const LUNGE_DISTANCE: f32 = 1.6;
pub const LUNGE_DAMAGE_MULT: f32 = 1.2;

pub const SPIRAL_CHANCE: f32 = 0.15;
pub const SPIRAL_SHOTS: u32 = 8;
/// Spiral rotation speed (radians per second of run time)
pub const SPIRAL_SPIN: f32 = 5.0;
pub const SPIRAL_DAMAGE_MULT: f32 = 0.45;

pub const BURST_COOLDOWN: f32 = 2.2;
pub const BURST_SHOTS: u32 = 10;
pub const BURST_DAMAGE_MULT: f32 = 0.4;

pub const BREATH_COOLDOWN: f32 = 6.5;
/// Breath fan is 2 × `BREATH_HALF_WIDTH` + 1 shots
pub const BREATH_HALF_WIDTH: i32 = 4;
pub const BREATH_SPREAD: f32 = 0.12;
pub const BREATH_DAMAGE_MULT: f32 = 0.55;

pub const FIRST_NOVA_COOLDOWN: f32 = 9.0;
pub const NOVA_COOLDOWN: f32 = 6.5;
pub const NOVA_ZONES: u32 = 6;
/// Zones land within ± this offset of the boss on each axis
pub const NOVA_SCATTER: f32 = 9.0;
pub const ZONE_RADIUS: f32 = 3.4;
/// Frames a zone persists
pub const ZONE_LIFETIME: u32 = 400;
pub const ZONE_DAMAGE_MULT: f32 = 0.35;
pub const ZONE_COLOR: u32 = 0x550088;

pub const PROXIMITY_RADIUS: f32 = 4.0;
pub const PROXIMITY_DAMAGE_MULT: f32 = 0.45;

/// Death burst color
pub const EXPLOSION_COLOR: u32 = 0xff0000;

#[derive(Debug, Clone)]
pub struct Boss {
    pub body: Body,
    /// Waiting for the upgrade menu to close before fighting
    pub spawn_locked: bool,
    pub burst_cooldown: f32,
    pub breath_cooldown: f32,
    pub nova_cooldown: f32,
}

impl Boss {
    pub fn is_raging(&self) -> bool {
        self.body.hp < self.body.max_hp * RAGE_HEALTH_FRACTION
    }
}

impl Hostile for Boss {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn tier(&self) -> HostileTier {
        HostileTier::Boss
    }
}

/// Damaging puddle left by a nova
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoidZone {
    pub pos: Vec2,
    pub radius: f32,
    /// Frames left
    pub life: u32,
    pub visual: VisualHandle,
}

/// Spawn the boss unless one is already alive. Returns whether it spawned.
pub fn spawn_boss(world: &mut SimulationWorld) -> bool {
    if world.boss.is_some() {
        log::warn!("boss spawn requested while one is alive");
        return false;
    }
    let level = world.player.level as f32;
    let health = BASE_HEALTH + level * HEALTH_PER_LEVEL;
    let damage = BASE_DAMAGE + level * DAMAGE_PER_LEVEL;
    let pos = world.player.pos + SPAWN_OFFSET;
    let id = world.next_entity_id();
    let visual = world.events.acquire(VisualKind::Boss, pos);
    let spawn_locked = world.upgrade_menu_open();

    world.boss = Some(Boss {
        body: Body::new(id, pos, health, damage, BASE_SPEED, visual),
        spawn_locked,
        burst_cooldown: BURST_COOLDOWN,
        breath_cooldown: BREATH_COOLDOWN,
        nova_cooldown: FIRST_NOVA_COOLDOWN,
    });
    world.events.push(GameEvent::BossSpawned {
        level: world.player.level,
    });
    log::info!(
        "boss spawned at level {} (hp {:.0}, locked: {})",
        world.player.level,
        health,
        spawn_locked
    );
    if !spawn_locked {
        announce(world);
    }
    true
}

/// The boss takes the stage
pub(crate) fn announce(world: &mut SimulationWorld) {
    world.events.push(GameEvent::BossAnnounced);
    world.events.sound(Sound::BossLaugh);
}

/// What the boss decided this frame
#[derive(Debug, Default)]
struct Plan {
    pos: Vec2,
    damage: f32,
    aim: f32,
    lunge: bool,
    spiral: bool,
    burst: bool,
    breath: bool,
    nova: bool,
    proximity: bool,
}

pub fn update_boss(world: &mut SimulationWorld, dt: f32) {
    let step = dt * REFERENCE_FPS;
    let player_pos = world.player.pos;
    let elapsed = world.elapsed;

    let Some(boss) = world.boss.as_mut() else {
        return;
    };
    if boss.spawn_locked {
        return;
    }

    let heading = boss.body.heading_to(player_pos);
    let (dir, dist) = heading.unwrap_or((Vec2::ZERO, 0.0));
    let raging = boss.is_raging();

    let mut speed = boss.body.speed;
    if dist < ENRAGE_RADIUS {
        speed += ENRAGE_SPEED_BONUS;
    }
    if raging {
        speed += RAGE_SPEED_BONUS;
    }
    boss.body.vel = dir * speed * boss.body.status.speed_factor() * step;
    boss.body.pos += boss.body.vel;
    if heading.is_some() {
        boss.body.facing = dir.y.atan2(dir.x);
    }

    boss.burst_cooldown -= dt;
    boss.breath_cooldown -= dt;
    boss.nova_cooldown -= dt;

    let mut plan = Plan {
        damage: boss.body.damage,
        aim: bearing(boss.body.pos, player_pos),
        ..Default::default()
    };

    if dist < LUNGE_RANGE && world.rng.random::<f32>() < LUNGE_CHANCE {
        boss.body.pos += dir * LUNGE_DISTANCE;
        plan.lunge = true;
    }
    if raging && world.rng.random::<f32>() < SPIRAL_CHANCE {
        plan.spiral = true;
    }
    if boss.burst_cooldown <= 0.0 {
        boss.burst_cooldown = BURST_COOLDOWN;
        plan.burst = true;
    }
    if boss.breath_cooldown <= 0.0 {
        boss.breath_cooldown = BREATH_COOLDOWN;
        plan.breath = true;
    }
    if boss.nova_cooldown <= 0.0 {
        boss.nova_cooldown = NOVA_COOLDOWN;
        plan.nova = true;
    }
    plan.pos = boss.body.pos;
    plan.proximity = plan.pos.distance(player_pos) < PROXIMITY_RADIUS;

    execute(world, &plan, elapsed, step);
    update_zones(world, step);
}

fn execute(world: &mut SimulationWorld, plan: &Plan, elapsed: f32, step: f32) {
    let player_pos = world.player.pos;

    if plan.lunge {
        world.hurt_player(plan.damage * LUNGE_DAMAGE_MULT);
        world.events.impact(player_pos);
        world.events.sound(Sound::BossHit);
    }

    if plan.spiral {
        let base = elapsed * SPIRAL_SPIN;
        for i in 0..SPIRAL_SHOTS {
            let angle = base + i as f32 * FRAC_PI_4;
            spawn_hostile_shot(world, ShotKind::BossOrb, plan.pos, angle, plan.damage * SPIRAL_DAMAGE_MULT);
        }
    }

    if plan.burst {
        for i in 0..BURST_SHOTS {
            let angle = plan.aim + i as f32 * TAU / BURST_SHOTS as f32;
            spawn_hostile_shot(world, ShotKind::BossOrb, plan.pos, angle, plan.damage * BURST_DAMAGE_MULT);
        }
    }

    if plan.breath {
        for i in -BREATH_HALF_WIDTH..=BREATH_HALF_WIDTH {
            let angle = plan.aim + i as f32 * BREATH_SPREAD;
            spawn_hostile_shot(world, ShotKind::BossOrb, plan.pos, angle, plan.damage * BREATH_DAMAGE_MULT);
        }
        world.events.sound(Sound::BossShoot);
    }

    if plan.nova {
        for _ in 0..NOVA_ZONES {
            let offset = Vec2::new(
                world.rng.random::<f32>() * 2.0 * NOVA_SCATTER - NOVA_SCATTER,
                world.rng.random::<f32>() * 2.0 * NOVA_SCATTER - NOVA_SCATTER,
            );
            let pos = plan.pos + offset;
            world.events.push(GameEvent::Explosion {
                pos,
                color: ZONE_COLOR,
            });
            let visual = world.events.acquire(VisualKind::Zone, pos);
            world.zones.push(VoidZone {
                pos,
                radius: ZONE_RADIUS,
                life: ZONE_LIFETIME,
                visual,
            });
        }
    }

    if plan.proximity {
        world.hurt_player(plan.damage * PROXIMITY_DAMAGE_MULT * step);
        world.events.impact(player_pos);
    }
}

/// Age void zones and burn the player standing in them
fn update_zones(world: &mut SimulationWorld, step: f32) {
    let Some(damage) = world.boss.as_ref().map(|b| b.body.damage) else {
        return;
    };
    let player_pos = world.player.pos;

    let mut i = world.zones.len();
    while i > 0 {
        i -= 1;
        let zone = &mut world.zones[i];
        zone.life = zone.life.saturating_sub(1);
        let inside = point_in_circle(player_pos, zone.pos, zone.radius);
        let expired = zone.life == 0;

        if inside {
            world.hurt_player(damage * ZONE_DAMAGE_MULT * step);
        }
        if expired {
            let zone = world.zones.remove(i);
            world.events.release(zone.visual);
        }
    }
}
