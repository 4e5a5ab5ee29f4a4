//! Passive damage: auras and status effects
//!
//! Auras tick every simulated frame around the player, independent of the
//! attack cooldown. Status helpers only ever extend an effect.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hostile::{Body, HostileRef};
use super::state::{DamageSource, SimulationWorld};
use crate::audio::Sound;
use crate::consts::REFERENCE_FPS;

/// How long an aura's slow lingers after leaving its radius (seconds)
pub const AURA_SLOW_DURATION: f32 = 0.5;
/// Stun applied by a storm shock (seconds)
pub const SHOCK_FREEZE_DURATION: f32 = 0.5;
/// Aura damage multiplier per extra level
pub const AURA_LEVEL_DAMAGE: f32 = 1.35;
/// Aura radius multiplier per extra level
pub const AURA_LEVEL_RADIUS: f32 = 1.12;

/// Timed debuffs carried by a hostile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEffects {
    /// Speed multiplier while slowed
    pub slow_factor: f32,
    pub slow_remaining: f32,
    pub stun_remaining: f32,
    pub burn_per_sec: f32,
    pub burn_remaining: f32,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            slow_factor: 1.0,
            slow_remaining: 0.0,
            stun_remaining: 0.0,
            burn_per_sec: 0.0,
            burn_remaining: 0.0,
        }
    }
}

impl StatusEffects {
    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn is_burning(&self) -> bool {
        self.burn_remaining > 0.0
    }

    /// Movement multiplier: 0 while stunned, the slow factor while slowed
    pub fn speed_factor(&self) -> f32 {
        if self.is_stunned() {
            0.0
        } else if self.slow_remaining > 0.0 {
            self.slow_factor
        } else {
            1.0
        }
    }

    /// Count timers down
    pub fn advance(&mut self, dt: f32) {
        self.slow_remaining = (self.slow_remaining - dt).max(0.0);
        self.stun_remaining = (self.stun_remaining - dt).max(0.0);
        self.burn_remaining = (self.burn_remaining - dt).max(0.0);
        if self.slow_remaining == 0.0 {
            self.slow_factor = 1.0;
        }
        if self.burn_remaining == 0.0 {
            self.burn_per_sec = 0.0;
        }
    }
}

/// Burn the target for one frame; returns the health removed
pub fn apply_burn(body: &mut Body, per_sec: f32, dt: f32) -> f32 {
    let amount = per_sec * dt;
    body.hp -= amount;
    amount
}

/// Slow to `factor` × speed for `duration` seconds, never shortening a
/// longer slow already in place
pub fn apply_slow(body: &mut Body, factor: f32, duration: f32) {
    if body.status.slow_remaining < duration {
        body.status.slow_remaining = duration;
        body.status.slow_factor = factor.clamp(0.0, 1.0);
    }
}

/// Stun for `duration` seconds; only ever extends
pub fn apply_freeze(body: &mut Body, duration: f32) {
    if body.status.stun_remaining < duration {
        body.status.stun_remaining = duration;
        body.vel = Vec2::ZERO;
    }
}

/// Set a burn of `per_sec` for `duration` seconds; only ever extends
pub fn ignite(body: &mut Body, per_sec: f32, duration: f32) {
    if body.status.burn_remaining < duration {
        body.status.burn_remaining = duration;
    }
    body.status.burn_per_sec = body.status.burn_per_sec.max(per_sec);
}

/// Aura families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuraKind {
    Fire,
    Ice,
    Holy,
    Storm,
    Blood,
    Gravity,
    Poison,
}

/// A registered aura around the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aura {
    /// Damage per reference frame
    pub damage: f32,
    pub radius: f32,
    pub level: u32,
    /// Fractional speed reduction applied to hostiles inside
    pub slow: f32,
    /// Per-second chance to freeze a hostile inside
    pub shock_chance: f32,
}

impl AuraKind {
    pub fn base(self) -> Aura {
        let (damage, radius, slow, shock_chance) = match self {
            AuraKind::Fire => (2.0, 3.0, 0.0, 0.0),
            AuraKind::Ice => (1.5, 3.5, 0.25, 0.0),
            AuraKind::Holy => (5.0, 2.8, 0.0, 0.0),
            AuraKind::Storm => (4.0, 3.5, 0.0, 0.10),
            AuraKind::Blood => (3.0, 3.0, 0.0, 0.0),
            AuraKind::Gravity => (1.5, 3.2, 0.30, 0.0),
            AuraKind::Poison => (2.0, 3.2, 0.0, 0.0),
        };
        Aura {
            damage,
            radius,
            level: 1,
            slow,
            shock_chance,
        }
    }
}

impl Aura {
    pub fn level_up(&mut self) {
        self.level += 1;
        self.damage *= AURA_LEVEL_DAMAGE;
        self.radius *= AURA_LEVEL_RADIUS;
    }
}

/// Damage every hostile inside each aura
pub fn apply_auras(world: &mut SimulationWorld, dt: f32) {
    if world.player.auras.is_empty() {
        return;
    }
    let step = dt * REFERENCE_FPS;
    let center = world.player.pos;
    let auras: Vec<Aura> = world.player.auras.values().copied().collect();

    for aura in auras {
        let inside = world.hostiles().within(center, aura.radius);
        for (target, pos) in inside {
            world.events.impact(pos);

            let shocked = aura.shock_chance > 0.0
                && world.rng.random::<f32>() < aura.shock_chance * dt;
            if let Some(body) = world.body_mut(target) {
                if aura.slow > 0.0 {
                    apply_slow(body, 1.0 - aura.slow, AURA_SLOW_DURATION);
                }
                if shocked {
                    apply_freeze(body, SHOCK_FREEZE_DURATION);
                }
            }

            if world.damage_hostile(target, aura.damage * step, DamageSource::Aura) {
                world.events.sound(Sound::Kill);
            }
        }
    }
}

/// Advance status timers and deal burn damage
pub fn tick_statuses(world: &mut SimulationWorld, dt: f32) {
    let mut burned: Vec<(HostileRef, Vec2, bool)> = Vec::new();
    for (target, body) in world.bodies_mut() {
        if body.status.is_burning() {
            let per_sec = body.status.burn_per_sec;
            let span = dt.min(body.status.burn_remaining);
            apply_burn(body, per_sec, span);
            burned.push((target, body.pos, body.is_dead()));
        }
        body.status.advance(dt);
    }

    for (target, pos, dead) in burned {
        world.events.impact(pos);
        if dead {
            world.kill_hostile(target);
            world.events.sound(Sound::Kill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::events::VisualHandle;
    use crate::sim::player::PlayerClass;

    fn body() -> Body {
        Body::new(1, Vec2::ZERO, 20.0, 2.0, 1.0, VisualHandle(0))
    }

    #[test]
    fn test_slow_never_shortens() {
        let mut b = body();
        apply_slow(&mut b, 0.75, 2.0);
        apply_slow(&mut b, 0.5, 0.5);
        assert_eq!(b.status.slow_remaining, 2.0);
        assert_eq!(b.status.slow_factor, 0.75);
        assert!((b.effective_speed() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_slow_expires() {
        let mut b = body();
        apply_slow(&mut b, 0.5, 0.3);
        b.status.advance(0.4);
        assert_eq!(b.effective_speed(), 1.0);
    }

    #[test]
    fn test_freeze_zeroes_velocity_and_extends_only() {
        let mut b = body();
        b.vel = Vec2::new(1.0, 1.0);
        apply_freeze(&mut b, 1.0);
        assert_eq!(b.vel, Vec2::ZERO);
        assert_eq!(b.effective_speed(), 0.0);
        apply_freeze(&mut b, 0.2);
        assert_eq!(b.status.stun_remaining, 1.0);
    }

    #[test]
    fn test_burn_is_flat_per_second() {
        let mut b = body();
        let dealt = apply_burn(&mut b, 2.0, 0.5);
        assert_eq!(dealt, 1.0);
        assert_eq!(b.hp, 19.0);
    }

    #[test]
    fn test_aura_level_up() {
        let mut aura = AuraKind::Fire.base();
        aura.level_up();
        assert_eq!(aura.level, 2);
        assert!((aura.damage - 2.7).abs() < 1e-5);
        assert!((aura.radius - 3.36).abs() < 1e-5);
    }

    #[test]
    fn test_aura_damages_inside_radius_only() {
        let mut world = SimulationWorld::new(7, PlayerClass::Ranger);
        let near = world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(2.0, 0.0), false);
        let far = world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(6.0, 0.0), false);
        world.player.auras.insert(AuraKind::Fire, AuraKind::Fire.base());

        apply_auras(&mut world, 1.0 / 60.0);

        let hp = |id| {
            world
                .enemies
                .iter()
                .find(|e| e.body.id == id)
                .map(|e| e.body.hp)
        };
        let full = world.enemies[0].body.max_hp;
        assert!((hp(near).unwrap() - (full - 2.0)).abs() < 1e-3);
        assert_eq!(hp(far), Some(full));
    }

    #[test]
    fn test_burn_kill_releases_visual() {
        let mut world = SimulationWorld::new(7, PlayerClass::Ranger);
        let id = world.spawn_enemy_at(EnemyKind::Slime, Vec2::new(20.0, 0.0), false);
        let body = world.body_mut(HostileRef::Enemy(id)).unwrap();
        body.hp = 0.5;
        ignite(body, 2.0, 3.0);

        tick_statuses(&mut world, 0.5);

        assert!(world.enemies.is_empty());
        assert_eq!(world.kills, 1);
        assert_eq!(world.gems.len(), 1);
    }
}
