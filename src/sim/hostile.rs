//! Shared hostile actor data and the damage interface
//!
//! Enemies, minibosses and the boss all carry a [`Body`]. Attackers never
//! reach into a specific population; they resolve a [`HostileRef`] and go
//! through the [`Hostile`] trait.

use glam::Vec2;

use super::aura::StatusEffects;
use super::events::VisualHandle;
use crate::consts::*;

/// Population an actor belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostileTier {
    Enemy,
    Miniboss,
    Boss,
}

impl HostileTier {
    /// Longest chain jump that may land on this tier
    pub fn chain_radius(self) -> f32 {
        match self {
            HostileTier::Enemy => CHAIN_RADIUS_ENEMY,
            HostileTier::Miniboss => CHAIN_RADIUS_MINIBOSS,
            HostileTier::Boss => CHAIN_RADIUS_BOSS,
        }
    }

    /// Distance at which a player projectile connects
    pub fn bullet_hit_radius(self) -> f32 {
        match self {
            HostileTier::Enemy => BULLET_HIT_RADIUS_ENEMY,
            HostileTier::Miniboss => BULLET_HIT_RADIUS_MINIBOSS,
            HostileTier::Boss => BULLET_HIT_RADIUS_BOSS,
        }
    }
}

/// Stable reference to a live hostile; may go stale when the actor dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostileRef {
    Enemy(u32),
    Miniboss(u32),
    Boss,
}

impl HostileRef {
    pub fn tier(&self) -> HostileTier {
        match self {
            HostileRef::Enemy(_) => HostileTier::Enemy,
            HostileRef::Miniboss(_) => HostileTier::Miniboss,
            HostileRef::Boss => HostileTier::Boss,
        }
    }
}

/// Simulation data common to every hostile actor
#[derive(Debug, Clone)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement applied on the last frame
    pub vel: Vec2,
    /// Angle the visual should face
    pub facing: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Contact damage
    pub damage: f32,
    /// Units per reference frame
    pub speed: f32,
    /// Seconds until contact damage may land again
    pub hit_cooldown: f32,
    pub status: StatusEffects,
    pub visual: VisualHandle,
}

impl Body {
    pub fn new(id: u32, pos: Vec2, hp: f32, damage: f32, speed: f32, visual: VisualHandle) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            facing: 0.0,
            hp,
            max_hp: hp,
            damage,
            speed,
            hit_cooldown: 0.0,
            status: StatusEffects::default(),
            visual,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Health for display; internal health may dip below zero
    pub fn display_hp(&self) -> f32 {
        self.hp.max(0.0)
    }

    /// Speed after status effects
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.status.speed_factor()
    }

    /// Unit vector toward `target` and the distance to it, or None when the
    /// two points coincide
    pub fn heading_to(&self, target: Vec2) -> Option<(Vec2, f32)> {
        let delta = target - self.pos;
        let dist = delta.length();
        if dist < MIN_STEER_DISTANCE {
            return None;
        }
        Some((delta / dist, dist))
    }

    /// Walk toward `target` at effective speed for `step` reference frames
    pub fn chase(&mut self, target: Vec2, step: f32) {
        let Some((dir, _)) = self.heading_to(target) else {
            return;
        };
        self.vel = dir * self.effective_speed() * step;
        self.pos += self.vel;
        self.facing = dir.y.atan2(dir.x);
    }
}

/// Damage interface implemented once per hostile kind
pub trait Hostile {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn tier(&self) -> HostileTier;

    /// Subtract health; returns true when this blow is lethal
    fn take_damage(&mut self, amount: f32) -> bool {
        let body = self.body_mut();
        body.hp -= amount;
        body.is_dead()
    }
}
