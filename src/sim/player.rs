//! The player character: classes, stats, movement and experience

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attack::{AttackKind, DelayedAttack};
use super::aura::{Aura, AuraKind};
use super::collision::ObstacleOracle;
use super::skills::UpgradeId;
use crate::consts::{PLAYER_RADIUS, REFERENCE_FPS};
use crate::tuning::Tuning;

/// Chain count granted by the mage class
pub const MAGE_CHAIN: u32 = 3;

/// Character class; only picks the attack routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerClass {
    #[default]
    Ranger,
    Mage,
    Knight,
}

impl PlayerClass {
    pub fn attack_kind(self) -> AttackKind {
        match self {
            PlayerClass::Ranger => AttackKind::Burst,
            PlayerClass::Mage => AttackKind::Chain,
            PlayerClass::Knight => AttackKind::Cone,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerClass::Ranger => "ranger",
            PlayerClass::Mage => "mage",
            PlayerClass::Knight => "knight",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ranger" => Some(PlayerClass::Ranger),
            "mage" => Some(PlayerClass::Mage),
            "knight" | "paladin" => Some(PlayerClass::Knight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub class: PlayerClass,
    pub pos: Vec2,
    /// Radians; 0 faces +x
    pub facing: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,

    // === Offense ===
    pub damage: f32,
    pub damage_mult: f32,
    /// Frames between attacks
    pub fire_rate: u32,
    /// Frames until the next attack
    pub cooldown: u32,
    pub crit_chance: f32,
    pub crit_mult: f32,
    pub pierce: u32,
    pub chain: u32,
    pub bullet_speed: f32,
    pub multishot: u32,
    pub side_shots: u32,
    pub double_shot: f32,
    pub homing: bool,
    /// Fragments per destroyed bullet
    pub fragments: u32,
    /// Slow fraction applied by projectile hits
    pub inflict_slow: f32,
    /// Burn per second applied by projectile hits
    pub inflict_burn: f32,
    pub echo_chance: f32,
    /// Extra echo chance, only counted once echo is owned
    pub echo_bonus: f32,
    pub giga: bool,
    /// Attacks since the last giga bullet
    pub giga_count: u32,

    // === Defense ===
    pub move_speed: f32,
    /// Health per second
    pub regen: f32,
    pub dodge: f32,
    pub damage_reduction: f32,

    // === Progression ===
    pub xp: u32,
    pub level: u32,
    pub next_level_xp: u32,
    pub xp_bonus: u32,
    pub pickup_range: f32,
    pub magnet_power: f32,

    pub skills: BTreeMap<UpgradeId, u32>,
    pub auras: BTreeMap<AuraKind, Aura>,
    /// Attacks waiting to go off
    pub delayed: Vec<DelayedAttack>,
}

impl Player {
    pub fn new(class: PlayerClass, tuning: &Tuning) -> Self {
        let base = &tuning.player;
        let chain = match class {
            PlayerClass::Mage => MAGE_CHAIN,
            _ => base.chain,
        };
        Self {
            class,
            pos: Vec2::ZERO,
            facing: 0.0,
            hp: base.max_hp,
            max_hp: base.max_hp,
            dead: false,
            damage: base.damage,
            damage_mult: base.damage_mult,
            fire_rate: base.fire_rate,
            cooldown: 0,
            crit_chance: base.crit_chance,
            crit_mult: base.crit_mult,
            pierce: 0,
            chain,
            bullet_speed: base.bullet_speed,
            multishot: 0,
            side_shots: 0,
            double_shot: 0.0,
            homing: false,
            fragments: 0,
            inflict_slow: 0.0,
            inflict_burn: 0.0,
            echo_chance: 0.0,
            echo_bonus: 0.0,
            giga: false,
            giga_count: 0,
            move_speed: base.move_speed,
            regen: base.regen,
            dodge: 0.0,
            damage_reduction: 0.0,
            xp: 0,
            level: 1,
            next_level_xp: tuning.leveling.first_threshold,
            xp_bonus: 0,
            pickup_range: base.pickup_range,
            magnet_power: base.magnet_power,
            skills: BTreeMap::new(),
            auras: BTreeMap::new(),
            delayed: Vec::new(),
        }
    }

    pub fn attack_kind(&self) -> AttackKind {
        self.class.attack_kind()
    }

    /// Damage of one ordinary hit
    pub fn attack_damage(&self) -> f32 {
        self.damage * self.damage_mult
    }

    /// Move along `dir` unless the destination is blocked
    pub fn step_movement(&mut self, dir: Vec2, dt: f32, oracle: &dyn ObstacleOracle) {
        let dir = dir.clamp_length_max(1.0);
        if dir.length_squared() == 0.0 || !dir.is_finite() {
            return;
        }
        let next = self.pos + dir * self.move_speed * dt * REFERENCE_FPS;
        if !oracle.query_obstacle(next, PLAYER_RADIUS).hit {
            self.pos = next;
        }
        self.facing = dir.y.atan2(dir.x);
    }

    /// Chance that an attack repeats; bonuses need the echo itself first
    pub fn echo_odds(&self) -> f32 {
        if self.echo_chance > 0.0 {
            self.echo_chance + self.echo_bonus
        } else {
            0.0
        }
    }

    pub fn regenerate(&mut self, dt: f32) {
        if self.regen > 0.0 && self.hp < self.max_hp {
            self.hp = (self.hp + self.regen * dt).min(self.max_hp);
        }
    }

    /// Add experience and return the number of levels gained
    ///
    /// Remainder carries over and every crossed threshold grows by `growth`.
    pub fn add_xp(&mut self, amount: u32, growth: f32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp >= self.next_level_xp {
            self.xp -= self.next_level_xp;
            self.level += 1;
            self.next_level_xp = ((self.next_level_xp as f32 * growth).floor() as u32).max(1);
            gained += 1;
        }
        gained
    }

    pub fn skill_level(&self, id: UpgradeId) -> u32 {
        self.skills.get(&id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::{Obstacle, ObstacleField, OpenArena};
    use proptest::prelude::*;

    fn ranger() -> Player {
        Player::new(PlayerClass::Ranger, &Tuning::default())
    }

    #[test]
    fn test_level_up_carries_remainder() {
        let mut p = ranger();
        p.xp = 38;
        let gained = p.add_xp(5, 1.25);
        assert_eq!(gained, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 3);
        assert_eq!(p.next_level_xp, 50);
    }

    #[test]
    fn test_level_up_multiple_thresholds() {
        let mut p = ranger();
        // 40 + 50 + 62 = 152
        let gained = p.add_xp(160, 1.25);
        assert_eq!(gained, 3);
        assert_eq!(p.level, 4);
        assert_eq!(p.xp, 8);
        assert_eq!(p.next_level_xp, 77);
    }

    #[test]
    fn test_mage_starts_with_chain() {
        let mage = Player::new(PlayerClass::Mage, &Tuning::default());
        assert_eq!(mage.chain, MAGE_CHAIN);
        assert_eq!(mage.attack_kind(), AttackKind::Chain);
        assert_eq!(ranger().chain, 1);
    }

    #[test]
    fn test_movement_blocked_by_obstacle() {
        let field = ObstacleField::new(vec![Obstacle {
            pos: Vec2::new(1.0, 0.0),
            radius: 0.5,
        }]);
        let mut p = ranger();
        p.step_movement(Vec2::X, 1.0 / 60.0, &field);
        assert_eq!(p.pos, Vec2::ZERO);
        // Still turns toward the input
        assert_eq!(p.facing, 0.0);

        p.step_movement(Vec2::Y, 1.0 / 60.0, &OpenArena);
        assert!((p.pos.y - 0.42).abs() < 1e-4);
        assert!((p.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let mut p = ranger();
        p.regen = 10.0;
        p.hp = 99.0;
        p.regenerate(1.0);
        assert_eq!(p.hp, 100.0);
    }

    #[test]
    fn test_class_parse() {
        assert_eq!(PlayerClass::parse("Knight"), Some(PlayerClass::Knight));
        assert_eq!(PlayerClass::parse("bard"), None);
    }

    proptest! {
        #[test]
        fn prop_xp_is_conserved(start in 0u32..40, gains in prop::collection::vec(0u32..400, 1..10)) {
            let mut p = ranger();
            p.xp = start;
            let mut total_levels = 0;
            let mut spent = 0u64;
            let mut threshold = p.next_level_xp;
            for g in &gains {
                let before = p.level;
                let gained = p.add_xp(*g, 1.25);
                prop_assert_eq!(p.level, before + gained);
                for _ in 0..gained {
                    spent += threshold as u64;
                    threshold = ((threshold as f32 * 1.25).floor() as u32).max(1);
                }
                total_levels += gained;
                prop_assert!(p.xp < p.next_level_xp);
            }
            let total: u64 = start as u64 + gains.iter().map(|g| *g as u64).sum::<u64>();
            prop_assert_eq!(spent + p.xp as u64, total);
            prop_assert_eq!(p.level, 1 + total_levels);
            prop_assert_eq!(p.next_level_xp, threshold);
        }
    }
}
