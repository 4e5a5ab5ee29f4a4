//! Common enemies: roster, weighted picks, spawning and chase AI
//!
//! Enemies have no state machine. Behavior differences live on the kind's
//! [`EnemyProfile`]; a ranged kind carries a [`RangedAttack`] component.

use glam::Vec2;
use rand::Rng;

use super::events::{GameEvent, VisualKind};
use super::hostile::{Body, Hostile, HostileRef, HostileTier};
use super::projectile::{ShotKind, spawn_hostile_shot};
use super::state::SimulationWorld;
use crate::audio::Sound;
use crate::bearing;
use crate::consts::REFERENCE_FPS;
use crate::tuning::{EliteMultipliers, LevelScaling};

/// Contact reach of a common enemy
pub const CONTACT_RANGE: f32 = 1.4;
/// Seconds between two contact hits from the same enemy
pub const CONTACT_COOLDOWN: f32 = 0.6;
/// Enemies appear on a ring this far from the player
pub const SPAWN_RING_MIN: f32 = 26.0;
pub const SPAWN_RING_WIDTH: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Slime,
    Skeleton,
    Imp,
    Wolf,
    Mage,
    Archer,
    Golem,
    Crystal,
}

/// Rarity band used by the weighted pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnTier {
    Common,
    Uncommon,
    Rare,
}

impl SpawnTier {
    pub fn weight(self) -> u32 {
        match self {
            SpawnTier::Common => 70,
            SpawnTier::Uncommon => 25,
            SpawnTier::Rare => 5,
        }
    }
}

/// Ranged behavior component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedAttack {
    /// Only fires while the player is closer than this
    pub range: f32,
    pub projectile: ShotKind,
}

/// Base stats and capabilities of an enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub health: f32,
    pub damage: f32,
    /// Units per reference frame
    pub speed: f32,
    pub tier: SpawnTier,
    pub ranged: Option<RangedAttack>,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Slime,
        EnemyKind::Skeleton,
        EnemyKind::Imp,
        EnemyKind::Wolf,
        EnemyKind::Mage,
        EnemyKind::Archer,
        EnemyKind::Golem,
        EnemyKind::Crystal,
    ];

    pub fn profile(self) -> EnemyProfile {
        let (health, damage, speed, tier) = match self {
            EnemyKind::Slime => (14.0, 5.0, 0.05, SpawnTier::Common),
            EnemyKind::Skeleton => (16.0, 6.0, 0.048, SpawnTier::Common),
            EnemyKind::Imp => (20.0, 8.0, 0.06, SpawnTier::Common),
            EnemyKind::Wolf => (26.0, 11.0, 0.075, SpawnTier::Uncommon),
            EnemyKind::Mage => (30.0, 14.0, 0.045, SpawnTier::Uncommon),
            EnemyKind::Archer => (24.0, 9.0, 0.055, SpawnTier::Uncommon),
            EnemyKind::Golem => (55.0, 20.0, 0.035, SpawnTier::Rare),
            EnemyKind::Crystal => (40.0, 18.0, 0.052, SpawnTier::Rare),
        };
        let ranged = match self {
            EnemyKind::Mage => Some(RangedAttack {
                range: 30.0,
                projectile: ShotKind::MageBolt,
            }),
            _ => None,
        };
        EnemyProfile {
            health,
            damage,
            speed,
            tier,
            ranged,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Slime => "slime",
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Imp => "imp",
            EnemyKind::Wolf => "wolf",
            EnemyKind::Mage => "mage",
            EnemyKind::Archer => "archer",
            EnemyKind::Golem => "golem",
            EnemyKind::Crystal => "crystal",
        }
    }
}

/// Weighted random kind (70 / 25 / 5 per rarity band)
pub fn pick_kind(rng: &mut impl Rng) -> EnemyKind {
    let total: u32 = EnemyKind::ALL.iter().map(|k| k.profile().tier.weight()).sum();
    let mut roll = rng.random_range(0..total);
    for kind in EnemyKind::ALL {
        let weight = kind.profile().tier.weight();
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    EnemyKind::Slime
}

/// Level-scaled stats, with the elite multipliers stacked on top
pub fn scaled_stats(
    profile: &EnemyProfile,
    level: u32,
    elite: Option<&EliteMultipliers>,
    scaling: &LevelScaling,
) -> (f32, f32, f32) {
    let (mut health, mut damage, mut speed) =
        scaling.apply(level, profile.health, profile.damage, profile.speed);
    if let Some(m) = elite {
        health *= m.health;
        damage *= m.damage;
        speed *= m.speed;
    }
    (health, damage, speed)
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub elite: bool,
    /// Seconds until the ranged component may fire
    pub attack_cooldown: f32,
}

impl Hostile for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn tier(&self) -> HostileTier {
        HostileTier::Enemy
    }
}

/// Spawn a random kind on the ring around the player
pub fn spawn_enemy(world: &mut SimulationWorld, elite: bool) -> u32 {
    let kind = pick_kind(&mut world.rng);
    let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
    let dist = SPAWN_RING_MIN + world.rng.random::<f32>() * SPAWN_RING_WIDTH;
    let pos = world.player.pos + crate::direction(angle) * dist;
    spawn_enemy_at(world, kind, pos, elite)
}

/// Spawn a specific kind at a fixed spot, scaled by the current level
pub fn spawn_enemy_at(world: &mut SimulationWorld, kind: EnemyKind, pos: Vec2, elite: bool) -> u32 {
    let profile = kind.profile();
    let elite_mult = elite.then_some(&world.tuning.elite);
    let (health, damage, speed) = scaled_stats(
        &profile,
        world.player.level,
        elite_mult,
        &world.tuning.enemy_scaling,
    );
    let id = world.next_entity_id();
    let visual = world.events.acquire(VisualKind::Enemy { kind, elite }, pos);
    world.enemies.push(Enemy {
        body: Body::new(id, pos, health, damage, speed, visual),
        kind,
        elite,
        attack_cooldown: 0.0,
    });
    id
}

/// Chase, shoot and bite
pub fn update_enemies(world: &mut SimulationWorld, dt: f32) {
    let step = dt * REFERENCE_FPS;
    let player_pos = world.player.pos;
    let shot_interval = world.tuning.ranged_shot_interval;

    let mut i = world.enemies.len();
    while i > 0 {
        i -= 1;

        let mut shot = None;
        let mut contact = None;
        let enemy = &mut world.enemies[i];
        let dist = enemy.body.pos.distance(player_pos);

        enemy.body.chase(player_pos, step);

        if let Some(ranged) = enemy.kind.profile().ranged {
            enemy.attack_cooldown -= dt;
            if dist < ranged.range && enemy.attack_cooldown <= 0.0 {
                let angle = bearing(enemy.body.pos, player_pos);
                shot = Some((ranged.projectile, enemy.body.pos, angle, enemy.body.damage));
                enemy.attack_cooldown = shot_interval;
            }
        }

        if dist < CONTACT_RANGE && enemy.body.hit_cooldown <= 0.0 {
            contact = Some(enemy.body.damage);
            enemy.body.hit_cooldown = CONTACT_COOLDOWN;
        }
        if enemy.body.hit_cooldown > 0.0 {
            enemy.body.hit_cooldown -= dt;
        }

        let id = enemy.body.id;
        let dead = enemy.body.is_dead();

        if let Some((kind, from, angle, damage)) = shot {
            spawn_hostile_shot(world, kind, from, angle, damage);
            world.events.sound(Sound::BossShoot);
        }
        if let Some(damage) = contact {
            world.hurt_player(damage);
            world.events.impact(player_pos);
            world.events.sound(Sound::Hit);
        }
        if dead {
            world.kill_hostile(HostileRef::Enemy(id));
        }
    }
}

/// Kill notification for an enemy leaving the field
pub(crate) fn killed_event(enemy: &Enemy) -> GameEvent {
    GameEvent::EnemyKilled {
        kind: enemy.kind,
        elite: enemy.elite,
        pos: enemy.body.pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerClass;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_elite_scaling_stacks_on_level() {
        let tuning = Tuning::default();
        let profile = EnemyKind::Wolf.profile();
        let (h, d, s) = scaled_stats(&profile, 12, None, &tuning.enemy_scaling);
        let (eh, ed, es) = scaled_stats(&profile, 12, Some(&tuning.elite), &tuning.enemy_scaling);
        assert!((eh - h * 2.5).abs() < 1e-3);
        assert!((ed - d * 1.4).abs() < 1e-3);
        assert!((es - s * 1.2).abs() < 1e-6);
        // Same inputs, same outputs
        assert_eq!(
            scaled_stats(&profile, 12, Some(&tuning.elite), &tuning.enemy_scaling),
            (eh, ed, es)
        );
        assert!((h - 26.0 * (1.0 + 12.0 * 0.09)).abs() < 1e-3);
    }

    #[test]
    fn test_pick_kind_weights() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut common = 0;
        let mut rare = 0;
        for _ in 0..10_000 {
            match pick_kind(&mut rng).profile().tier {
                SpawnTier::Common => common += 1,
                SpawnTier::Rare => rare += 1,
                SpawnTier::Uncommon => {}
            }
        }
        // Expected shares: 210/295 common, 10/295 rare
        assert!(common > 6_700 && common < 7_500, "common = {common}");
        assert!(rare > 200 && rare < 500, "rare = {rare}");
    }

    #[test]
    fn test_spawn_on_ring() {
        let mut world = SimulationWorld::new(5, PlayerClass::Ranger);
        for _ in 0..32 {
            spawn_enemy(&mut world, false);
        }
        for e in &world.enemies {
            let d = e.body.pos.length();
            assert!((SPAWN_RING_MIN..=SPAWN_RING_MIN + SPAWN_RING_WIDTH).contains(&d));
        }
        assert_eq!(world.events.visuals().live_count(), 32);
    }

    #[test]
    fn test_contact_damage_respects_cooldown() {
        let mut world = SimulationWorld::new(5, PlayerClass::Ranger);
        world.spawn_enemy_at(EnemyKind::Slime, Vec2::new(1.0, 0.0), false);
        let dmg = world.enemies[0].body.damage;

        update_enemies(&mut world, 1.0 / 60.0);
        assert!((world.player.hp - (100.0 - dmg)).abs() < 1e-4);

        update_enemies(&mut world, 1.0 / 60.0);
        assert!((world.player.hp - (100.0 - dmg)).abs() < 1e-4);
    }

    #[test]
    fn test_enemy_on_player_does_not_nan() {
        let mut world = SimulationWorld::new(5, PlayerClass::Ranger);
        world.spawn_enemy_at(EnemyKind::Imp, Vec2::ZERO, false);
        update_enemies(&mut world, 1.0 / 60.0);
        assert!(world.enemies[0].body.pos.is_finite());
    }

    #[test]
    fn test_mage_fires_on_interval() {
        let mut world = SimulationWorld::new(5, PlayerClass::Ranger);
        world.spawn_enemy_at(EnemyKind::Mage, Vec2::new(20.0, 0.0), false);
        update_enemies(&mut world, 1.0 / 60.0);
        assert_eq!(world.hostile_shots.len(), 1);
        assert!((world.enemies[0].attack_cooldown - 4.2).abs() < 1e-6);
        update_enemies(&mut world, 1.0 / 60.0);
        assert_eq!(world.hostile_shots.len(), 1);
    }
}
