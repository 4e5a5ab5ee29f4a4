//! Miniboss: chase, telegraphed dash, dash
//!
//! ```text
//! Chasing --dash cooldown--> DashWindup --0.5 s--> Dashing --0.45 s--> Chasing
//! ```
//!
//! The dash velocity is frozen when the windup ends; the miniboss keeps that
//! line even if the player sidesteps.

use glam::Vec2;
use rand::Rng;

use super::events::{GameEvent, VisualKind};
use super::hostile::{Body, Hostile, HostileRef, HostileTier};
use super::state::SimulationWorld;
use crate::audio::Sound;
use crate::consts::REFERENCE_FPS;
use crate::direction;

pub const BASE_HEALTH: f32 = 1400.0;
pub const BASE_DAMAGE: f32 = 28.0;
pub const BASE_SPEED: f32 = 0.045;
pub const SPAWN_RING_MIN: f32 = 38.0;
pub const SPAWN_RING_WIDTH: f32 = 12.0;

pub const CONTACT_RANGE: f32 = 2.2;
pub const CONTACT_COOLDOWN: f32 = 1.2;
pub const FIRST_ATTACK_COOLDOWN: f32 = 2.2;
pub const FIRST_DASH_COOLDOWN: f32 = 7.0;

pub const WINDUP_DURATION: f32 = 0.5;
pub const DASH_DURATION: f32 = 0.45;
/// Dash speed as a multiple of chase speed
pub const DASH_SPEED_MULT: f32 = 6.0;
pub const DASH_HIT_RADIUS: f32 = 3.0;
pub const DASH_DAMAGE_MULT: f32 = 1.3;
/// Dash cooldown after a dash: base plus up to `DASH_COOLDOWN_JITTER`
pub const DASH_COOLDOWN_BASE: f32 = 6.0;
pub const DASH_COOLDOWN_JITTER: f32 = 2.0;

/// Death burst color
pub const EXPLOSION_COLOR: u32 = 0xaa66ff;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinibossState {
    Chasing,
    DashWindup,
    /// Velocity per reference frame, fixed at windup end
    Dashing { velocity: Vec2 },
}

#[derive(Debug, Clone)]
pub struct Miniboss {
    pub body: Body,
    pub state: MinibossState,
    /// Seconds left in the current windup or dash
    pub state_timer: f32,
    pub attack_cooldown: f32,
    pub dash_cooldown: f32,
}

impl Hostile for Miniboss {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn tier(&self) -> HostileTier {
        HostileTier::Miniboss
    }
}

/// Side effects the state machine asks for after its own update
#[derive(Debug, Default)]
struct Outcome {
    hit: Option<f32>,
    emphasis: Option<bool>,
    dash_started: bool,
}

impl Miniboss {
    /// Advance timers and the state machine by one frame
    fn step(&mut self, player_pos: Vec2, dt: f32, step: f32, rng: &mut impl Rng) -> Outcome {
        let mut out = Outcome::default();
        let dist = self.body.pos.distance(player_pos);

        self.attack_cooldown -= dt;
        self.dash_cooldown -= dt;
        self.state_timer -= dt;

        match self.state {
            MinibossState::Chasing => {
                self.body.chase(player_pos, step);
                if dist < CONTACT_RANGE && self.attack_cooldown <= 0.0 {
                    out.hit = Some(self.body.damage);
                    self.attack_cooldown = CONTACT_COOLDOWN;
                }
                if self.dash_cooldown <= 0.0 {
                    self.state = MinibossState::DashWindup;
                    self.state_timer = WINDUP_DURATION;
                    out.emphasis = Some(true);
                }
            }
            MinibossState::DashWindup => {
                if self.state_timer <= 0.0 {
                    let dir = self
                        .body
                        .heading_to(player_pos)
                        .map_or(Vec2::ZERO, |(dir, _)| dir);
                    self.state = MinibossState::Dashing {
                        velocity: dir * self.body.speed * DASH_SPEED_MULT,
                    };
                    self.state_timer = DASH_DURATION;
                    out.dash_started = true;
                }
            }
            MinibossState::Dashing { velocity } => {
                if !self.body.status.is_stunned() {
                    self.body.vel = velocity * step;
                    self.body.pos += self.body.vel;
                }
                // Per reference frame while overlapping
                if dist < DASH_HIT_RADIUS {
                    out.hit = Some(self.body.damage * DASH_DAMAGE_MULT * step);
                }
                if self.state_timer <= 0.0 {
                    self.state = MinibossState::Chasing;
                    self.dash_cooldown =
                        DASH_COOLDOWN_BASE + rng.random::<f32>() * DASH_COOLDOWN_JITTER;
                    out.emphasis = Some(false);
                }
            }
        }
        out
    }
}

/// Spawn on the far ring around the player
pub fn spawn_miniboss(world: &mut SimulationWorld) -> u32 {
    let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
    let dist = SPAWN_RING_MIN + world.rng.random::<f32>() * SPAWN_RING_WIDTH;
    let pos = world.player.pos + direction(angle) * dist;
    spawn_miniboss_at(world, pos)
}

pub fn spawn_miniboss_at(world: &mut SimulationWorld, pos: Vec2) -> u32 {
    let (health, damage, speed) = world.tuning.miniboss_scaling.apply(
        world.player.level,
        BASE_HEALTH,
        BASE_DAMAGE,
        BASE_SPEED,
    );
    let id = world.next_entity_id();
    let visual = world.events.acquire(VisualKind::Miniboss, pos);
    world.minibosses.push(Miniboss {
        body: Body::new(id, pos, health, damage, speed, visual),
        state: MinibossState::Chasing,
        state_timer: 0.0,
        attack_cooldown: FIRST_ATTACK_COOLDOWN,
        dash_cooldown: FIRST_DASH_COOLDOWN,
    });
    log::debug!("miniboss {} spawned at level {}", id, world.player.level);
    id
}

pub fn update_minibosses(world: &mut SimulationWorld, dt: f32) {
    let step = dt * REFERENCE_FPS;
    let player_pos = world.player.pos;

    let mut i = world.minibosses.len();
    while i > 0 {
        i -= 1;

        let miniboss = &mut world.minibosses[i];
        let out = miniboss.step(player_pos, dt, step, &mut world.rng);
        let id = miniboss.body.id;
        let visual = miniboss.body.visual;
        let dead = miniboss.body.is_dead();

        if let Some(on) = out.emphasis {
            world.events.push(GameEvent::Emphasis { handle: visual, on });
        }
        if out.dash_started {
            world.events.sound(Sound::BossShoot);
        }
        if let Some(damage) = out.hit {
            world.hurt_player(damage);
            world.events.impact(player_pos);
            world.events.sound(Sound::Hit);
        }
        if dead {
            world.kill_hostile(HostileRef::Miniboss(id));
        }
    }
}
