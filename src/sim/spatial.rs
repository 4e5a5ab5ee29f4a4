//! Nearest-hostile and radius queries
//!
//! Populations are always scanned enemies, then minibosses, then boss. A later
//! candidate only wins on a strictly smaller distance, so ties go to the
//! earlier population.

use glam::Vec2;

use super::boss::Boss;
use super::enemy::Enemy;
use super::hostile::{HostileRef, HostileTier};
use super::miniboss::Miniboss;
use crate::consts::SAME_POSITION_EPSILON;

/// A query hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub target: HostileRef,
    pub pos: Vec2,
    pub distance: f32,
}

/// Read-only view over the three hostile populations
#[derive(Debug, Clone, Copy)]
pub struct Hostiles<'a> {
    pub enemies: &'a [Enemy],
    pub minibosses: &'a [Miniboss],
    pub boss: Option<&'a Boss>,
}

impl<'a> Hostiles<'a> {
    /// Every live hostile in scan order
    pub fn iter(self) -> impl Iterator<Item = (HostileRef, Vec2)> + 'a {
        self.enemies
            .iter()
            .map(|e| (HostileRef::Enemy(e.body.id), e.body.pos))
            .chain(
                self.minibosses
                    .iter()
                    .map(|m| (HostileRef::Miniboss(m.body.id), m.body.pos)),
            )
            .chain(self.boss.map(|b| (HostileRef::Boss, b.body.pos)))
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty() && self.minibosses.is_empty() && self.boss.is_none()
    }

    /// Closest hostile to `point`, any distance
    pub fn nearest(&self, point: Vec2) -> Option<Target> {
        let mut best: Option<Target> = None;
        for (target, pos) in self.iter() {
            let distance = pos.distance(point);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Target {
                    target,
                    pos,
                    distance,
                });
            }
        }
        best
    }

    /// Closest hostile to `origin` for a chain jump
    ///
    /// Skips anything sharing `reference`'s spot (within
    /// [`SAME_POSITION_EPSILON`] on both axes) and anything beyond its tier's
    /// jump radius.
    pub fn nearest_excluding(&self, origin: Vec2, reference: Vec2) -> Option<Target> {
        let mut best: Option<Target> = None;
        for (target, pos) in self.iter() {
            if same_spot(pos, reference) {
                continue;
            }
            let distance = pos.distance(origin);
            if distance > target.tier().chain_radius() {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Target {
                    target,
                    pos,
                    distance,
                });
            }
        }
        best
    }

    /// Every hostile strictly inside `radius` of `point`
    pub fn within(&self, point: Vec2, radius: f32) -> Vec<(HostileRef, Vec2)> {
        let r2 = radius * radius;
        self.iter()
            .filter(|(_, pos)| pos.distance_squared(point) < r2)
            .collect()
    }

    /// Position of a referenced hostile, if it still exists
    pub fn position(&self, target: HostileRef) -> Option<Vec2> {
        match target {
            HostileRef::Enemy(id) => self
                .enemies
                .iter()
                .find(|e| e.body.id == id)
                .map(|e| e.body.pos),
            HostileRef::Miniboss(id) => self
                .minibosses
                .iter()
                .find(|m| m.body.id == id)
                .map(|m| m.body.pos),
            HostileRef::Boss => self.boss.map(|b| b.body.pos),
        }
    }

    pub fn count(&self, tier: HostileTier) -> usize {
        match tier {
            HostileTier::Enemy => self.enemies.len(),
            HostileTier::Miniboss => self.minibosses.len(),
            HostileTier::Boss => usize::from(self.boss.is_some()),
        }
    }
}

/// Two points closer than the epsilon band on both axes
#[inline]
pub fn same_spot(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < SAME_POSITION_EPSILON && (a.y - b.y).abs() < SAME_POSITION_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::player::PlayerClass;
    use crate::sim::state::SimulationWorld;
    use proptest::prelude::*;

    fn world() -> SimulationWorld {
        SimulationWorld::new(1, PlayerClass::Mage)
    }

    #[test]
    fn test_nearest_prefers_earlier_population_on_tie() {
        let mut w = world();
        let e = w.spawn_enemy_at(EnemyKind::Slime, Vec2::new(5.0, 0.0), false);
        w.spawn_miniboss_at(Vec2::new(-5.0, 0.0));
        let hit = w.hostiles().nearest(Vec2::ZERO).unwrap();
        assert_eq!(hit.target, HostileRef::Enemy(e));
    }

    #[test]
    fn test_nearest_empty() {
        let w = world();
        assert!(w.hostiles().nearest(Vec2::ZERO).is_none());
        assert!(w.hostiles().is_empty());
    }

    #[test]
    fn test_chain_epsilon_band() {
        // A(0,0), B(5,0), C(5.005,0.005): jumping from B treats C as B
        let mut w = world();
        let a = w.spawn_enemy_at(EnemyKind::Slime, Vec2::new(0.0, 0.0), false);
        let b = Vec2::new(5.0, 0.0);
        w.spawn_enemy_at(EnemyKind::Slime, b, false);
        w.spawn_enemy_at(EnemyKind::Slime, Vec2::new(5.005, 0.005), false);

        let next = w.hostiles().nearest_excluding(b, b).unwrap();
        assert_eq!(next.target, HostileRef::Enemy(a));
    }

    #[test]
    fn test_chain_respects_tier_radius() {
        let mut w = world();
        w.spawn_enemy_at(EnemyKind::Slime, Vec2::new(11.0, 0.0), false);
        let mb = w.spawn_miniboss_at(Vec2::new(-11.5, 0.0));
        let next = w.hostiles().nearest_excluding(Vec2::ZERO, Vec2::ZERO).unwrap();
        assert_eq!(next.target, HostileRef::Miniboss(mb));
    }

    #[test]
    fn test_within_is_strict() {
        let mut w = world();
        w.spawn_enemy_at(EnemyKind::Slime, Vec2::new(3.0, 0.0), false);
        assert!(w.hostiles().within(Vec2::ZERO, 3.0).is_empty());
        assert_eq!(w.hostiles().within(Vec2::ZERO, 3.01).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_chain_never_exceeds_tier_radius(
            points in prop::collection::vec((-30.0f32..30.0, -30.0f32..30.0, 0u8..2), 1..24),
            origin in (-10.0f32..10.0, -10.0f32..10.0),
        ) {
            let mut w = world();
            for (x, y, tier) in &points {
                if *tier == 0 {
                    w.spawn_enemy_at(EnemyKind::Slime, Vec2::new(*x, *y), false);
                } else {
                    w.spawn_miniboss_at(Vec2::new(*x, *y));
                }
            }
            let origin = Vec2::new(origin.0, origin.1);
            if let Some(hit) = w.hostiles().nearest_excluding(origin, origin) {
                prop_assert!(hit.distance <= hit.target.tier().chain_radius());
                prop_assert!(!same_spot(hit.pos, origin));
            }
        }
    }
}
