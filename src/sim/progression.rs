//! Experience gems and leveling

use glam::Vec2;

use super::events::{GameEvent, VisualHandle, VisualKind};
use super::state::SimulationWorld;
use crate::audio::Sound;
use crate::consts::REFERENCE_FPS;

/// Gems closer than this are collected
pub const COLLECT_RADIUS: f32 = 1.6;
/// Fraction of the gap a force-pulled gem closes per reference frame
pub const FORCE_PULL: f32 = 0.35;
/// Special gems start homing inside this multiple of the pickup range
pub const SPECIAL_MAGNET_SCALE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct Gem {
    pub id: u32,
    pub pos: Vec2,
    /// Larger magnet radius
    pub special: bool,
    /// Homes in regardless of distance
    pub force_pull: bool,
    pub visual: VisualHandle,
}

pub fn spawn_gem(world: &mut SimulationWorld, pos: Vec2, special: bool) -> u32 {
    let id = world.next_entity_id();
    let visual = world.events.acquire(VisualKind::Gem { special }, pos);
    world.gems.push(Gem {
        id,
        pos,
        special,
        force_pull: false,
        visual,
    });
    id
}

/// Pull every gem on the field toward the player
pub fn attract_all_gems(world: &mut SimulationWorld) {
    for gem in &mut world.gems {
        gem.force_pull = true;
    }
}

/// Experience granted by one gem at the player's current level
pub fn gem_xp(world: &SimulationWorld) -> u32 {
    let leveling = &world.tuning.leveling;
    let from_level = (world.player.level as f32 * leveling.gem_xp_per_level).floor() as u32;
    leveling.gem_base_xp + from_level + world.player.xp_bonus
}

pub fn update_gems(world: &mut SimulationWorld, dt: f32) {
    let step = dt * REFERENCE_FPS;
    let player_pos = world.player.pos;
    let range = world.player.pickup_range;
    let magnet_sq = range * range;
    let magnet_power = world.player.magnet_power;

    let mut i = world.gems.len();
    while i > 0 {
        i -= 1;

        let gem = &mut world.gems[i];
        let dist_sq = gem.pos.distance_squared(player_pos);
        let special_range = SPECIAL_MAGNET_SCALE * SPECIAL_MAGNET_SCALE * magnet_sq;
        if gem.special && dist_sq < special_range {
            gem.force_pull = true;
        }
        if dist_sq < magnet_sq || gem.force_pull {
            let pull = if gem.force_pull { FORCE_PULL } else { magnet_power };
            gem.pos += (player_pos - gem.pos) * (pull * step).min(1.0);
        }

        // Collection uses the distance from before this frame's pull
        if dist_sq.sqrt() < COLLECT_RADIUS {
            let gem = world.gems.remove(i);
            world.events.release(gem.visual);
            world.events.sound(Sound::Xp);
            let amount = gem_xp(world);
            grant_xp(world, amount);
        }
    }
}

/// Add experience; every level gained queues an upgrade menu
pub fn grant_xp(world: &mut SimulationWorld, amount: u32) -> u32 {
    let growth = world.tuning.leveling.growth;
    let gained = world.player.add_xp(amount, growth);
    world.events.push(GameEvent::XpGained { amount });
    if gained == 0 {
        return 0;
    }

    let top = world.player.level;
    for level in (top + 1 - gained)..=top {
        world.events.push(GameEvent::LevelUp { level });
    }
    world.events.sound(Sound::LevelUp);
    world.pending_level_ups += gained;
    log::info!("level up -> {} ({} pending menus)", top, world.pending_level_ups);
    world.open_next_upgrade_menu();
    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerClass;
    use crate::sim::state::Phase;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_gem_xp_formula() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        world.player.level = 10;
        assert_eq!(gem_xp(&world), 3 + 5);
        world.player.xp_bonus = 15;
        assert_eq!(gem_xp(&world), 23);
    }

    #[test]
    fn test_collect_releases_visual() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        spawn_gem(&mut world, Vec2::new(1.0, 0.0), false);
        update_gems(&mut world, DT);
        assert!(world.gems.is_empty());
        assert_eq!(world.events.visuals().live_count(), 0);
        assert_eq!(world.player.xp, 3);
    }

    #[test]
    fn test_out_of_range_gem_stays_put() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        spawn_gem(&mut world, Vec2::new(20.0, 0.0), false);
        update_gems(&mut world, DT);
        assert_eq!(world.gems[0].pos, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_magnet_pulls_inside_range() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        spawn_gem(&mut world, Vec2::new(5.0, 0.0), false);
        update_gems(&mut world, DT);
        // magnet 0.2 closes a fifth of the gap
        assert!((world.gems[0].pos.x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_special_gem_self_attracts() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        spawn_gem(&mut world, Vec2::new(10.0, 0.0), true);
        update_gems(&mut world, DT);
        assert!(world.gems[0].force_pull);
        assert!((world.gems[0].pos.x - 6.5).abs() < 1e-4);
    }

    #[test]
    fn test_attract_all() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        spawn_gem(&mut world, Vec2::new(50.0, 0.0), false);
        attract_all_gems(&mut world);
        update_gems(&mut world, DT);
        assert!(world.gems[0].pos.x < 50.0);
    }

    #[test]
    fn test_level_up_opens_menu_once_per_level() {
        let mut world = SimulationWorld::new(1, PlayerClass::Ranger);
        // 40 + 50 crosses two thresholds
        let gained = grant_xp(&mut world, 95);
        assert_eq!(gained, 2);
        assert_eq!(world.player.level, 3);
        assert!(matches!(world.phase, Phase::ChoosingUpgrade { .. }));
        assert_eq!(world.pending_level_ups, 1);

        world.choose_upgrade(0).unwrap();
        assert!(matches!(world.phase, Phase::ChoosingUpgrade { .. }));
        world.choose_upgrade(2).unwrap();
        assert_eq!(world.phase, Phase::Playing);
        assert_eq!(world.player.skills.values().sum::<u32>(), 2);
    }
}
