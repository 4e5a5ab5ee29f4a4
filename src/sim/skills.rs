//! Level-up upgrades
//!
//! Every upgrade is a plain id; [`UpgradeId::apply`] holds the stat change and
//! its cap. Offers are three distinct ids drawn uniformly from all pools.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aura::AuraKind;
use super::player::Player;

/// Caps shared by the stat upgrades
pub const MAX_CRIT_CHANCE: f32 = 0.60;
pub const MAX_CRIT_MULT: f32 = 3.0;
pub const MAX_DOUBLE_SHOT: f32 = 0.30;
pub const MAX_MULTISHOT: u32 = 3;
pub const MAX_SIDE_SHOTS: u32 = 2;
pub const MIN_FIRE_RATE: u32 = 12;
pub const MAX_DAMAGE_REDUCTION: f32 = 0.30;
pub const MAX_DODGE: f32 = 0.40;
pub const MAX_PIERCE: u32 = 3;

pub const ECHO_CHANCE: f32 = 0.10;
pub const SPLINTER_FRAGMENTS: u32 = 4;
pub const FROSTBITE_SLOW: f32 = 0.25;
pub const COMBUST_BURN: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpgradeTier {
    Common,
    Rare,
    Legendary,
    Aura,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    // Common
    HpUp,
    Regen,
    DmgUp,
    Movespeed,
    Firerate,
    Pickup,
    Endurance,
    Focus,
    Warmup,
    Conditioning,
    Fleet,
    Steady,
    Gathering,
    Willpower,
    Agile,
    Spirit,
    Reflex,
    Insight,
    // Rare
    CritUp,
    CritDmg,
    MultiShot,
    SideShot,
    Double,
    Frostbite,
    Combust,
    Tempo,
    Hypersense,
    EchoEdge,
    Piercing,
    // Legendary
    Giga,
    Echo,
    ChainMaster,
    SeekerRounds,
    SplinterRounds,
    // Auras
    Aura(AuraKind),
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 41] = [
        UpgradeId::HpUp,
        UpgradeId::Regen,
        UpgradeId::DmgUp,
        UpgradeId::Movespeed,
        UpgradeId::Firerate,
        UpgradeId::Pickup,
        UpgradeId::Endurance,
        UpgradeId::Focus,
        UpgradeId::Warmup,
        UpgradeId::Conditioning,
        UpgradeId::Fleet,
        UpgradeId::Steady,
        UpgradeId::Gathering,
        UpgradeId::Willpower,
        UpgradeId::Agile,
        UpgradeId::Spirit,
        UpgradeId::Reflex,
        UpgradeId::Insight,
        UpgradeId::CritUp,
        UpgradeId::CritDmg,
        UpgradeId::MultiShot,
        UpgradeId::SideShot,
        UpgradeId::Double,
        UpgradeId::Frostbite,
        UpgradeId::Combust,
        UpgradeId::Tempo,
        UpgradeId::Hypersense,
        UpgradeId::EchoEdge,
        UpgradeId::Piercing,
        UpgradeId::Giga,
        UpgradeId::Echo,
        UpgradeId::ChainMaster,
        UpgradeId::SeekerRounds,
        UpgradeId::SplinterRounds,
        UpgradeId::Aura(AuraKind::Fire),
        UpgradeId::Aura(AuraKind::Ice),
        UpgradeId::Aura(AuraKind::Holy),
        UpgradeId::Aura(AuraKind::Storm),
        UpgradeId::Aura(AuraKind::Blood),
        UpgradeId::Aura(AuraKind::Gravity),
        UpgradeId::Aura(AuraKind::Poison),
    ];

    pub fn tier(self) -> UpgradeTier {
        use UpgradeId::*;
        match self {
            HpUp | Regen | DmgUp | Movespeed | Firerate | Pickup | Endurance | Focus | Warmup
            | Conditioning | Fleet | Steady | Gathering | Willpower | Agile | Spirit | Reflex
            | Insight => UpgradeTier::Common,
            CritUp | CritDmg | MultiShot | SideShot | Double | Frostbite | Combust | Tempo
            | Hypersense | EchoEdge | Piercing => UpgradeTier::Rare,
            Giga | Echo | ChainMaster | SeekerRounds | SplinterRounds => UpgradeTier::Legendary,
            Aura(_) => UpgradeTier::Aura,
        }
    }

    pub fn name(self) -> &'static str {
        use UpgradeId::*;
        match self {
            HpUp => "Vitality",
            Regen => "Regeneration",
            DmgUp => "Damage",
            Movespeed => "Swiftness",
            Firerate => "Cadence",
            Pickup => "Magnetism",
            Endurance => "Endurance",
            Focus => "Focus",
            Warmup => "Warmup",
            Conditioning => "Conditioning",
            Fleet => "Fleet Foot",
            Steady => "Steady",
            Gathering => "Gatherer",
            Willpower => "Willpower",
            Agile => "Agile Hands",
            Spirit => "Spirit",
            Reflex => "Reflexes",
            Insight => "Insight",
            CritUp => "Critical +10%",
            CritDmg => "Critical Damage",
            MultiShot => "Multishot",
            SideShot => "Side Shots",
            Double => "Double Shot",
            Frostbite => "Frostbite",
            Combust => "Combustion",
            Tempo => "Tempo",
            Hypersense => "Hypersense",
            EchoEdge => "Echo Edge",
            Piercing => "Piercing Rounds",
            Giga => "Giga Shot",
            Echo => "Arcane Echo",
            ChainMaster => "Chain Master",
            SeekerRounds => "Seeker Rounds",
            SplinterRounds => "Splinter Rounds",
            Aura(AuraKind::Fire) => "Fire Aura",
            Aura(AuraKind::Ice) => "Ice Aura",
            Aura(AuraKind::Holy) => "Holy Aura",
            Aura(AuraKind::Storm) => "Storm Aura",
            Aura(AuraKind::Blood) => "Blood Aura",
            Aura(AuraKind::Gravity) => "Gravity Aura",
            Aura(AuraKind::Poison) => "Poison Aura",
        }
    }

    /// Record the upgrade and change the player's stats
    pub fn apply(self, p: &mut Player) -> u32 {
        use UpgradeId::*;
        match self {
            HpUp => {
                p.max_hp += 10.0;
                p.hp += 10.0;
            }
            Regen => p.regen += 0.4,
            DmgUp => p.damage_mult += 0.05,
            Movespeed => p.move_speed += 0.04,
            Firerate => p.fire_rate = p.fire_rate.saturating_sub(3).max(MIN_FIRE_RATE),
            Pickup => {
                p.pickup_range *= 1.20;
                p.magnet_power += 0.03;
            }
            Endurance => {
                p.damage_reduction = (p.damage_reduction + 0.05).min(MAX_DAMAGE_REDUCTION);
            }
            Focus => p.crit_mult = (p.crit_mult + 0.04).min(MAX_CRIT_MULT),
            Warmup => p.fire_rate = p.fire_rate.saturating_sub(1).max(MIN_FIRE_RATE),
            Conditioning => {
                p.max_hp += 15.0;
                p.hp += 15.0;
            }
            Fleet => p.move_speed += 0.025,
            Gathering => p.magnet_power += 0.015,
            Willpower => p.regen += 1.0 / 60.0,
            Agile => p.bullet_speed *= 1.07,
            Spirit => p.xp_bonus += 15,
            Reflex => p.dodge = (p.dodge + 0.05).min(MAX_DODGE),
            // Recorded only
            Steady | Insight => {}
            CritUp => p.crit_chance = (p.crit_chance + 0.10).min(MAX_CRIT_CHANCE),
            CritDmg => p.crit_mult = (p.crit_mult + 0.15).min(MAX_CRIT_MULT),
            MultiShot => p.multishot = (p.multishot + 1).min(MAX_MULTISHOT),
            SideShot => p.side_shots = (p.side_shots + 1).min(MAX_SIDE_SHOTS),
            Double => p.double_shot = (p.double_shot + 0.06).min(MAX_DOUBLE_SHOT),
            Frostbite => p.inflict_slow = FROSTBITE_SLOW,
            Combust => p.inflict_burn = COMBUST_BURN,
            Tempo => p.fire_rate = p.fire_rate.saturating_sub(10).max(MIN_FIRE_RATE),
            Hypersense => p.magnet_power += 0.04,
            EchoEdge => p.echo_bonus += ECHO_CHANCE,
            Piercing => p.pierce = (p.pierce + 1).min(MAX_PIERCE),
            Giga => {
                p.giga = true;
                p.giga_count = 0;
            }
            Echo => p.echo_chance = p.echo_chance.max(ECHO_CHANCE),
            ChainMaster => p.chain += 1,
            SeekerRounds => p.homing = true,
            SplinterRounds => p.fragments = SPLINTER_FRAGMENTS,
            Aura(kind) => {
                p.auras
                    .entry(kind)
                    .and_modify(|a| a.level_up())
                    .or_insert_with(|| kind.base());
            }
        }
        let level = p.skills.entry(self).or_insert(0);
        *level += 1;
        *level
    }
}

/// Three distinct upgrades, uniform over every pool
pub fn roll_choices(rng: &mut impl Rng) -> [UpgradeId; 3] {
    let mut picks: Vec<UpgradeId> = Vec::with_capacity(3);
    while picks.len() < 3 {
        let id = UpgradeId::ALL[rng.random_range(0..UpgradeId::ALL.len())];
        if !picks.contains(&id) {
            picks.push(id);
        }
    }
    [picks[0], picks[1], picks[2]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerClass;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn player() -> Player {
        Player::new(PlayerClass::Ranger, &Tuning::default())
    }

    #[test]
    fn test_all_is_exhaustive_and_unique() {
        let set: HashSet<_> = UpgradeId::ALL.iter().collect();
        assert_eq!(set.len(), UpgradeId::ALL.len());
        let auras = UpgradeId::ALL
            .iter()
            .filter(|u| u.tier() == UpgradeTier::Aura)
            .count();
        assert_eq!(auras, 7);
    }

    #[test]
    fn test_choices_are_distinct() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let [a, b, c] = roll_choices(&mut rng);
            assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn test_caps_hold() {
        let mut p = player();
        for _ in 0..20 {
            UpgradeId::CritUp.apply(&mut p);
            UpgradeId::MultiShot.apply(&mut p);
            UpgradeId::SideShot.apply(&mut p);
            UpgradeId::Double.apply(&mut p);
            UpgradeId::Tempo.apply(&mut p);
            UpgradeId::CritDmg.apply(&mut p);
            UpgradeId::Piercing.apply(&mut p);
        }
        assert_eq!(p.crit_chance, MAX_CRIT_CHANCE);
        assert_eq!(p.multishot, MAX_MULTISHOT);
        assert_eq!(p.side_shots, MAX_SIDE_SHOTS);
        assert_eq!(p.double_shot, MAX_DOUBLE_SHOT);
        assert_eq!(p.fire_rate, MIN_FIRE_RATE);
        assert_eq!(p.crit_mult, MAX_CRIT_MULT);
        assert_eq!(p.pierce, MAX_PIERCE);
        assert_eq!(p.skill_level(UpgradeId::Tempo), 20);
    }

    #[test]
    fn test_aura_repeat_levels_it() {
        let mut p = player();
        UpgradeId::Aura(AuraKind::Fire).apply(&mut p);
        UpgradeId::Aura(AuraKind::Fire).apply(&mut p);
        let fire = p.auras[&AuraKind::Fire];
        assert_eq!(fire.level, 2);
        assert!((fire.damage - 2.7).abs() < 1e-5);
        assert!((fire.radius - 3.36).abs() < 1e-5);
    }

    #[test]
    fn test_placeholders_only_record() {
        let mut p = player();
        let before = p.clone();
        assert_eq!(UpgradeId::Steady.apply(&mut p), 1);
        UpgradeId::Insight.apply(&mut p);
        assert_eq!(p.damage, before.damage);
        assert_eq!(p.fire_rate, before.fire_rate);
        assert_eq!(p.skills.len(), 2);
    }

    #[test]
    fn test_echo_edge_needs_echo() {
        let mut p = player();
        UpgradeId::EchoEdge.apply(&mut p);
        UpgradeId::EchoEdge.apply(&mut p);
        assert_eq!(p.echo_odds(), 0.0);
        UpgradeId::Echo.apply(&mut p);
        assert!((p.echo_odds() - 3.0 * ECHO_CHANCE).abs() < 1e-6);
    }

    #[test]
    fn test_regen_upgrades() {
        let mut p = player();
        let base = p.regen;
        UpgradeId::Regen.apply(&mut p);
        UpgradeId::Willpower.apply(&mut p);
        assert!((p.regen - base - 0.4 - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&UpgradeId::ChainMaster).unwrap();
        assert_eq!(json, "\"chain_master\"");
        let aura: UpgradeId = serde_json::from_str(r#"{"aura":"Storm"}"#).unwrap();
        assert_eq!(aura, UpgradeId::Aura(AuraKind::Storm));
    }
}
