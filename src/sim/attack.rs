//! Player attack dispatch
//!
//! The class picks one routine: projectile burst, chain lightning or a melee
//! cone. A frame counter gates it; legendary effects and delayed shots ride on
//! explicit countdowns carried by the player.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use rand::Rng;

use super::events::GameEvent;
use super::projectile::spawn_player_bullet;
use super::state::{DamageSource, SimulationWorld};
use crate::audio::Sound;
use crate::normalize_angle;

/// Angle between neighbouring forward shots
pub const BURST_SPREAD: f32 = 0.18;
/// Seconds before a double shot follows
pub const DOUBLE_SHOT_DELAY: f32 = 0.06;
/// Seconds before an echoed attack repeats
pub const ECHO_DELAY: f32 = 0.15;
/// Every this many attacks a giga bullet joins
pub const GIGA_EVERY: u32 = 8;
pub const GIGA_DAMAGE_SCALE: f32 = 2.5;

pub const CONE_RANGE: f32 = 8.5;
pub const CONE_HALF_ANGLE: f32 = PI / 5.0;
pub const CONE_DAMAGE_MULT: f32 = 2.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Burst,
    Chain,
    Cone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    /// One ordinary bullet, aimed when it fires
    Shot,
    /// The whole attack again
    Repeat,
}

/// An attack waiting on a countdown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedAttack {
    /// Seconds left
    pub remaining: f32,
    pub action: DelayedAction,
}

/// Run the attack cooldown and any delayed attacks for one frame
pub fn dispatch(world: &mut SimulationWorld, dt: f32) {
    advance_delayed(world, dt);

    if world.player.cooldown > 0 {
        world.player.cooldown -= 1;
        return;
    }
    world.player.cooldown = world.player.fire_rate;

    perform(world);

    if world.player.giga {
        world.player.giga_count += 1;
        if world.player.giga_count >= GIGA_EVERY {
            world.player.giga_count = 0;
            let aim = world.aim_angle();
            spawn_player_bullet(world, aim, GIGA_DAMAGE_SCALE);
        }
    }

    let echo = world.player.echo_odds();
    if echo > 0.0 && world.rng.random::<f32>() < echo {
        world.player.delayed.push(DelayedAttack {
            remaining: ECHO_DELAY,
            action: DelayedAction::Repeat,
        });
    }
}

fn advance_delayed(world: &mut SimulationWorld, dt: f32) {
    if world.player.delayed.is_empty() {
        return;
    }
    let mut due = Vec::new();
    world.player.delayed.retain_mut(|d| {
        d.remaining -= dt;
        if d.remaining <= 0.0 {
            due.push(d.action);
            false
        } else {
            true
        }
    });
    for action in due {
        match action {
            DelayedAction::Shot => {
                let aim = world.aim_angle();
                spawn_player_bullet(world, aim, 1.0);
            }
            DelayedAction::Repeat => perform(world),
        }
    }
}

/// Fire the class attack once
pub fn perform(world: &mut SimulationWorld) {
    match world.player.attack_kind() {
        AttackKind::Burst => fire_burst(world),
        AttackKind::Chain => chain_strike(world),
        AttackKind::Cone => cone_slash(world),
    }
}

/// Forward spread plus perpendicular pairs, aimed at the nearest hostile
pub fn fire_burst(world: &mut SimulationWorld) {
    let aim = world.aim_angle();
    let shots = 1 + world.player.multishot;
    let half = (shots - 1) as f32 / 2.0;
    for i in 0..shots {
        spawn_player_bullet(world, aim + (i as f32 - half) * BURST_SPREAD, 1.0);
    }
    for s in 1..=world.player.side_shots {
        let offset = FRAC_PI_2 * s as f32;
        spawn_player_bullet(world, aim + offset, 1.0);
        spawn_player_bullet(world, aim - offset, 1.0);
    }

    let double = world.player.double_shot;
    if double > 0.0 && world.rng.random::<f32>() < double {
        world.player.delayed.push(DelayedAttack {
            remaining: DOUBLE_SHOT_DELAY,
            action: DelayedAction::Shot,
        });
    }
}

/// Hit the nearest hostile, then hop to the nearest other one in reach
pub fn chain_strike(world: &mut SimulationWorld) {
    let origin = world.player.pos;
    let Some(first) = world.hostiles().nearest(origin) else {
        return;
    };
    let damage = world.player.attack_damage();

    world.events.push(GameEvent::Beam {
        from: origin,
        to: first.pos,
    });
    world.damage_hostile(first.target, damage, DamageSource::Chain);

    let mut prev = first.pos;
    for _ in 1..world.player.chain.max(1) {
        let Some(next) = world.hostiles().nearest_excluding(prev, prev) else {
            break;
        };
        world.events.push(GameEvent::Beam {
            from: prev,
            to: next.pos,
        });
        world.damage_hostile(next.target, damage, DamageSource::Chain);
        prev = next.pos;
    }
}

/// Whether `target` sits inside the cone in front of `origin`
pub fn in_cone(origin: Vec2, facing: f32, target: Vec2, range: f32, half_angle: f32) -> bool {
    let d = target - origin;
    if d.length() > range {
        return false;
    }
    normalize_angle(d.y.atan2(d.x) - facing).abs() < half_angle
}

/// Melee arc in the facing direction
pub fn cone_slash(world: &mut SimulationWorld) {
    let origin = world.player.pos;
    let facing = world.player.facing;
    world.events.push(GameEvent::MeleeArc {
        origin,
        range: CONE_RANGE,
        half_angle: CONE_HALF_ANGLE,
        facing,
    });

    let damage = world.player.attack_damage() * CONE_DAMAGE_MULT;
    let targets: Vec<_> = world
        .hostiles()
        .iter()
        .filter(|(_, pos)| in_cone(origin, facing, *pos, CONE_RANGE, CONE_HALF_ANGLE))
        .collect();
    if targets.is_empty() {
        return;
    }
    world.events.sound(Sound::Hit);
    for (target, _) in targets {
        world.damage_hostile(target, damage, DamageSource::Cone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::player::PlayerClass;
    use crate::sim::projectile::ShotKind;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_cone_scenario() {
        let o = Vec2::ZERO;
        assert!(in_cone(o, 0.0, direction(0.3) * 5.0, CONE_RANGE, CONE_HALF_ANGLE));
        assert!(!in_cone(o, 0.0, Vec2::new(9.0, 0.0), CONE_RANGE, CONE_HALF_ANGLE));
        assert!(!in_cone(o, 0.0, direction(0.8) * 5.0, CONE_RANGE, CONE_HALF_ANGLE));
        // Wraps across ±π
        assert!(in_cone(o, PI, direction(-PI + 0.1) * 3.0, CONE_RANGE, CONE_HALF_ANGLE));
    }

    #[test]
    fn test_cone_slash_damages_inside_only() {
        let mut world = SimulationWorld::new(1, PlayerClass::Knight);
        let inside = world.spawn_enemy_at(EnemyKind::Golem, direction(0.3) * 5.0, false);
        let outside = world.spawn_enemy_at(EnemyKind::Golem, direction(0.8) * 5.0, false);
        let hp = world.enemies[0].body.max_hp;

        cone_slash(&mut world);

        let dmg = 8.0 * CONE_DAMAGE_MULT;
        let hp_of = |id: u32| {
            world
                .enemies
                .iter()
                .find(|e| e.body.id == id)
                .map(|e| e.body.hp)
        };
        assert!((hp_of(inside).unwrap() - (hp - dmg)).abs() < 1e-4);
        assert_eq!(hp_of(outside), Some(hp));
        assert!(world
            .events
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::MeleeArc { .. })));
    }

    #[test]
    fn test_cooldown_fires_then_waits() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        dispatch(&mut world, DT);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.player.cooldown, world.player.fire_rate);
        for _ in 0..world.player.fire_rate {
            dispatch(&mut world, DT);
        }
        assert_eq!(world.bullets.len(), 1);
        dispatch(&mut world, DT);
        assert_eq!(world.bullets.len(), 2);
    }

    #[test]
    fn test_burst_aims_at_nearest_or_facing() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        world.player.facing = FRAC_PI_2;
        fire_burst(&mut world);
        let v = world.bullets[0].vel.normalize();
        assert!((v - Vec2::Y).length() < 1e-5);

        world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(-10.0, 0.0), false);
        fire_burst(&mut world);
        let v = world.bullets[1].vel.normalize();
        assert!((v - Vec2::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_burst_shot_count() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        world.player.multishot = 2;
        world.player.side_shots = 1;
        fire_burst(&mut world);
        assert_eq!(world.bullets.len(), 3 + 2);
        assert!(world.bullets.iter().all(|b| b.kind == ShotKind::PlayerBullet));
    }

    #[test]
    fn test_double_shot_is_delayed() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        world.player.double_shot = 1.0;
        dispatch(&mut world, DT);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.player.delayed.len(), 1);
        // 0.06 s at 60 fps is four frames
        for _ in 0..4 {
            dispatch(&mut world, DT);
        }
        assert_eq!(world.bullets.len(), 2);
        assert!(world.player.delayed.is_empty());
    }

    #[test]
    fn test_chain_hits_up_to_count() {
        let mut world = SimulationWorld::new(1, PlayerClass::Mage);
        let a = world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(3.0, 0.0), false);
        let b = world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(8.0, 0.0), false);
        let c = world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(30.0, 0.0), false);
        let max = world.enemies[0].body.max_hp;

        chain_strike(&mut world);

        let hp = |id: u32| {
            world
                .enemies
                .iter()
                .find(|e| e.body.id == id)
                .map(|e| e.body.hp)
                .unwrap()
        };
        assert!(hp(a) < max);
        assert!(hp(b) < max);
        // Beyond the 10 unit jump
        assert_eq!(hp(c), max);
        let beams = world
            .events
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Beam { .. }))
            .count();
        // A → B, then B → A again since the chain allows three targets
        assert_eq!(beams, 3);
    }

    #[test]
    fn test_chain_without_targets_is_noop() {
        let mut world = SimulationWorld::new(1, PlayerClass::Mage);
        chain_strike(&mut world);
        assert!(world.events.events().is_empty());
    }

    #[test]
    fn test_giga_every_eighth_attack() {
        let mut world = SimulationWorld::new(1, PlayerClass::Knight);
        world.player.giga = true;
        world.player.fire_rate = 0;
        for _ in 0..8 {
            dispatch(&mut world, DT);
        }
        assert_eq!(world.bullets.len(), 1);
        let expected = world.player.attack_damage() * GIGA_DAMAGE_SCALE;
        assert!((world.bullets[0].damage - expected).abs() < 1e-5);
    }

    #[test]
    fn test_echo_bonus_alone_never_repeats() {
        let mut world = SimulationWorld::new(1, PlayerClass::Mage);
        world.player.echo_bonus = 1.0;
        world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(3.0, 0.0), false);
        dispatch(&mut world, DT);
        assert!(world.player.delayed.is_empty());
    }

    #[test]
    fn test_echo_repeats_attack() {
        let mut world = SimulationWorld::new(1, PlayerClass::Mage);
        world.player.echo_chance = 1.0;
        world.spawn_enemy_at(EnemyKind::Golem, Vec2::new(3.0, 0.0), false);
        let max = world.enemies[0].body.max_hp;
        dispatch(&mut world, DT);
        assert_eq!(world.player.delayed.len(), 1);
        for _ in 0..10 {
            dispatch(&mut world, DT);
        }
        let dmg = world.player.attack_damage();
        let hp = world.enemies[0].body.hp;
        assert!((hp - (max - 2.0 * dmg)).abs() < 1e-3);
        assert!(world.player.delayed.is_empty());
    }
}
