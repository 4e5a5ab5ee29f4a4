//! Data-driven game balance
//!
//! Every knob has a default matching the shipped balance; a JSON file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Player stats at the start of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub max_hp: f32,
    pub damage: f32,
    pub damage_mult: f32,
    /// Units per reference frame
    pub move_speed: f32,
    /// Frames between attacks
    pub fire_rate: u32,
    /// Health per second
    pub regen: f32,
    pub crit_chance: f32,
    pub crit_mult: f32,
    /// Targets hit by one chain attack
    pub chain: u32,
    pub pickup_range: f32,
    /// Fraction of the gap a gem closes per reference frame
    pub magnet_power: f32,
    /// Bullet units per reference frame
    pub bullet_speed: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            damage: 8.0,
            damage_mult: 1.0,
            move_speed: 0.42,
            fire_rate: 45,
            regen: 0.0,
            crit_chance: 0.05,
            crit_mult: 1.5,
            chain: 1,
            pickup_range: 6.5,
            magnet_power: 0.20,
            bullet_speed: 1.15,
        }
    }
}

/// Experience curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leveling {
    /// XP needed to leave level 1
    pub first_threshold: u32,
    /// Threshold multiplier applied on every level
    pub growth: f32,
    /// XP granted by a gem at level 0
    pub gem_base_xp: u32,
    /// Extra gem XP per player level (floored)
    pub gem_xp_per_level: f32,
}

impl Default for Leveling {
    fn default() -> Self {
        Self {
            first_threshold: 40,
            growth: 1.25,
            gem_base_xp: 3,
            gem_xp_per_level: 0.55,
        }
    }
}

/// Fixed multipliers stacked on top of level scaling for elite spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliteMultipliers {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
}

impl Default for EliteMultipliers {
    fn default() -> Self {
        Self {
            health: 2.5,
            damage: 1.4,
            speed: 1.2,
        }
    }
}

/// Per-level growth: stat × (1 + level × factor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelScaling {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
}

impl LevelScaling {
    pub const ENEMY: Self = Self {
        health: 0.09,
        damage: 0.065,
        speed: 0.012,
    };

    pub const MINIBOSS: Self = Self {
        health: 0.2,
        damage: 0.13,
        speed: 0.015,
    };

    /// Scale `(health, damage, speed)` for the given level
    pub fn apply(&self, level: u32, health: f32, damage: f32, speed: f32) -> (f32, f32, f32) {
        let l = level as f32;
        (
            health * (1.0 + l * self.health),
            damage * (1.0 + l * self.damage),
            speed * (1.0 + l * self.speed),
        )
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: BaseStats,
    pub leveling: Leveling,
    pub elite: EliteMultipliers,
    pub enemy_scaling: LevelScaling,
    pub miniboss_scaling: LevelScaling,
    /// Seconds between shots of ranged enemies
    pub ranged_shot_interval: f32,
    /// A boss arrives every this many player levels
    pub boss_level_interval: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: BaseStats::default(),
            leveling: Leveling::default(),
            elite: EliteMultipliers::default(),
            enemy_scaling: LevelScaling::ENEMY,
            miniboss_scaling: LevelScaling::MINIBOSS,
            ranged_shot_interval: 4.2,
            boss_level_interval: 10,
        }
    }
}

impl Tuning {
    /// Parse a tuning override; absent sections keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut tuning: Self = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would stall the simulation
    fn sanitize(&mut self) {
        if self.leveling.growth < 1.0 {
            log::warn!("leveling.growth {} < 1.0, clamping", self.leveling.growth);
            self.leveling.growth = 1.0;
        }
        self.leveling.first_threshold = self.leveling.first_threshold.max(1);
        self.boss_level_interval = self.boss_level_interval.max(1);
        self.player.fire_rate = self.player.fire_rate.max(1);
        self.player.chain = self.player.chain.max(1);
    }
}
