//! Simulation world and run-level state
//!
//! Everything a frame reads or writes lives in [`SimulationWorld`]: the
//! populations, the seeded RNG, the director schedules and the outbound event
//! queue. Subsystems receive it by `&mut` once per tick.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::boss::{self, Boss, VoidZone};
use super::director::Director;
use super::enemy::{self, Enemy, EnemyKind};
use super::events::{GameEvent, Outbox, VisualHandle};
use super::hostile::{Body, Hostile, HostileRef};
use super::miniboss::{self, Miniboss};
use super::player::{Player, PlayerClass};
use super::progression::{self, Gem};
use super::projectile::Projectile;
use super::skills::{UpgradeId, roll_choices};
use super::spatial::Hostiles;
use crate::audio::Sound;
use crate::feedback::HudSnapshot;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Paused by the host
    Paused,
    /// Level-up menu open; gameplay frozen until a choice is made
    ChoosingUpgrade { choices: [UpgradeId; 3] },
    GameOver,
}

/// Where a blow came from; decides which feedback it gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Projectile,
    Chain,
    Cone,
    Aura,
    Burn,
}

impl DamageSource {
    fn shows_number(self) -> bool {
        matches!(
            self,
            DamageSource::Projectile | DamageSource::Chain | DamageSource::Cone
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeChoiceError {
    /// No level-up menu is open
    NoMenuOpen,
    /// Index outside the three offered choices
    InvalidChoice(usize),
}

impl fmt::Display for UpgradeChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeChoiceError::NoMenuOpen => write!(f, "no upgrade menu is open"),
            UpgradeChoiceError::InvalidChoice(i) => {
                write!(f, "upgrade choice {} is out of range (0..3)", i)
            }
        }
    }
}

impl std::error::Error for UpgradeChoiceError {}

/// Where a host visual should be this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualTransform {
    pub handle: VisualHandle,
    pub pos: Vec2,
    pub facing: f32,
}

/// Complete simulation state for one run
#[derive(Debug)]
pub struct SimulationWorld {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: Phase,
    /// Cleared by `stop()` or player death; nothing ticks afterwards
    pub active: bool,
    /// Simulated frames
    pub frame: u64,
    /// Simulated seconds
    pub elapsed: f32,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub minibosses: Vec<Miniboss>,
    /// At most one at a time
    pub boss: Option<Boss>,
    pub zones: Vec<VoidZone>,
    pub bullets: Vec<Projectile>,
    pub hostile_shots: Vec<Projectile>,
    pub gems: Vec<Gem>,

    /// Ordinary enemies killed
    pub kills: u32,
    pub director: Director,
    /// Level-ups whose menu has not been shown yet
    pub pending_level_ups: u32,
    pub events: Outbox,
    next_id: u32,
}

impl SimulationWorld {
    pub fn new(seed: u64, class: PlayerClass) -> Self {
        Self::with_tuning(seed, class, Tuning::default())
    }

    pub fn with_tuning(seed: u64, class: PlayerClass, tuning: Tuning) -> Self {
        log::info!("run started: seed {} class {}", seed, class.as_str());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(class, &tuning),
            director: Director::new(tuning.boss_level_interval),
            tuning,
            phase: Phase::Playing,
            active: true,
            frame: 0,
            elapsed: 0.0,
            enemies: Vec::new(),
            minibosses: Vec::new(),
            boss: None,
            zones: Vec::new(),
            bullets: Vec::new(),
            hostile_shots: Vec::new(),
            gems: Vec::new(),
            kills: 0,
            pending_level_ups: 0,
            events: Outbox::default(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Queries ===

    pub fn hostiles(&self) -> Hostiles<'_> {
        Hostiles {
            enemies: &self.enemies,
            minibosses: &self.minibosses,
            boss: self.boss.as_ref(),
        }
    }

    /// Resolve a reference; stale references give None
    pub fn hostile_mut(&mut self, target: HostileRef) -> Option<&mut dyn Hostile> {
        match target {
            HostileRef::Enemy(id) => self
                .enemies
                .iter_mut()
                .find(|e| e.body.id == id)
                .map(|e| e as &mut dyn Hostile),
            HostileRef::Miniboss(id) => self
                .minibosses
                .iter_mut()
                .find(|m| m.body.id == id)
                .map(|m| m as &mut dyn Hostile),
            HostileRef::Boss => self.boss.as_mut().map(|b| b as &mut dyn Hostile),
        }
    }

    pub fn body_mut(&mut self, target: HostileRef) -> Option<&mut Body> {
        self.hostile_mut(target).map(|h| h.body_mut())
    }

    /// Every hostile body, enemies then minibosses then boss
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (HostileRef, &mut Body)> + '_ {
        self.enemies
            .iter_mut()
            .map(|e| (HostileRef::Enemy(e.body.id), &mut e.body))
            .chain(
                self.minibosses
                    .iter_mut()
                    .map(|m| (HostileRef::Miniboss(m.body.id), &mut m.body)),
            )
            .chain(self.boss.iter_mut().map(|b| (HostileRef::Boss, &mut b.body)))
    }

    /// Bearing to the nearest hostile, or the player's facing when none
    pub fn aim_angle(&self) -> f32 {
        let origin = self.player.pos;
        self.hostiles()
            .nearest(origin)
            .map_or(self.player.facing, |t| crate::bearing(origin, t.pos))
    }

    // === Damage and death ===

    /// Damage a hostile, removing it when the blow is lethal
    ///
    /// Returns true when this call killed it. A stale reference does nothing.
    pub fn damage_hostile(&mut self, target: HostileRef, amount: f32, source: DamageSource) -> bool {
        let Some(hostile) = self.hostile_mut(target) else {
            log::debug!("damage to stale target {:?} ignored", target);
            return false;
        };
        let lethal = hostile.take_damage(amount);
        let pos = hostile.body().pos;
        if source.shows_number() {
            self.events.damage_number(pos, amount);
        }
        if lethal {
            self.kill_hostile(target);
        }
        lethal
    }

    /// Remove a hostile, release its visual and drop its reward
    pub fn kill_hostile(&mut self, target: HostileRef) {
        match target {
            HostileRef::Enemy(id) => {
                let Some(i) = self.enemies.iter().position(|e| e.body.id == id) else {
                    return;
                };
                let enemy = self.enemies.remove(i);
                self.events.release(enemy.body.visual);
                self.kills += 1;
                self.events.push(enemy::killed_event(&enemy));
                progression::spawn_gem(self, enemy.body.pos, false);
            }
            HostileRef::Miniboss(id) => {
                let Some(i) = self.minibosses.iter().position(|m| m.body.id == id) else {
                    return;
                };
                let mb = self.minibosses.remove(i);
                let pos = mb.body.pos;
                self.events.release(mb.body.visual);
                self.events.push(GameEvent::Explosion {
                    pos,
                    color: miniboss::EXPLOSION_COLOR,
                });
                self.events.push(GameEvent::MinibossKilled { pos });
                progression::spawn_gem(self, pos, false);
            }
            HostileRef::Boss => {
                let Some(boss) = self.boss.take() else {
                    return;
                };
                let pos = boss.body.pos;
                self.events.release(boss.body.visual);
                self.events.push(GameEvent::Explosion {
                    pos,
                    color: boss::EXPLOSION_COLOR,
                });
                self.events.sound(Sound::BossDie);
                self.events.push(GameEvent::BossDefeated { pos });
                for zone in self.zones.drain(..) {
                    self.events.release(zone.visual);
                }
                progression::spawn_gem(self, pos, true);
                progression::attract_all_gems(self);
                log::info!("boss defeated at frame {}", self.frame);
            }
        }
    }

    // === Player ===

    /// Apply dodge and damage reduction, then subtract health
    pub fn hurt_player(&mut self, amount: f32) {
        if self.player.dead {
            return;
        }
        if self.player.dodge > 0.0 && self.rng.random::<f32>() < self.player.dodge {
            self.events.push(GameEvent::PlayerDodged);
            return;
        }
        let amount = amount * (1.0 - self.player.damage_reduction);
        self.player.hp -= amount;

        if self.player.hp <= 0.0 {
            self.player.hp = 0.0;
            self.player.dead = true;
            self.events.push(GameEvent::PlayerDamaged { amount, hp: 0.0 });
            self.events.push(GameEvent::PlayerDied {
                level: self.player.level,
                kills: self.kills,
            });
            self.phase = Phase::GameOver;
            self.active = false;
            log::info!(
                "player died at level {} after {} kills ({:.1}s)",
                self.player.level,
                self.kills,
                self.elapsed
            );
            return;
        }
        self.events.push(GameEvent::PlayerDamaged {
            amount,
            hp: self.player.hp,
        });
    }

    // === Upgrades ===

    pub fn upgrade_menu_open(&self) -> bool {
        matches!(self.phase, Phase::ChoosingUpgrade { .. })
    }

    /// Show the next queued level-up menu, if gameplay is running
    pub fn open_next_upgrade_menu(&mut self) -> bool {
        if self.phase != Phase::Playing || self.pending_level_ups == 0 {
            return false;
        }
        self.pending_level_ups -= 1;
        let choices = roll_choices(&mut self.rng);
        self.phase = Phase::ChoosingUpgrade { choices };
        self.events.push(GameEvent::UpgradeOffered { choices });
        true
    }

    /// Resolve the open menu with one of its three choices
    pub fn choose_upgrade(&mut self, index: usize) -> Result<UpgradeId, UpgradeChoiceError> {
        let Phase::ChoosingUpgrade { choices } = self.phase else {
            return Err(UpgradeChoiceError::NoMenuOpen);
        };
        let id = *choices
            .get(index)
            .ok_or(UpgradeChoiceError::InvalidChoice(index))?;

        let level = id.apply(&mut self.player);
        self.events.push(GameEvent::UpgradeApplied { id, level });
        log::info!("upgrade {} -> level {}", id.name(), level);

        self.phase = Phase::Playing;
        if !self.open_next_upgrade_menu() {
            self.release_boss_lock();
        }
        Ok(id)
    }

    /// A boss that arrived during a menu starts fighting once menus close
    fn release_boss_lock(&mut self) {
        let Some(b) = self.boss.as_mut() else {
            return;
        };
        if b.spawn_locked {
            b.spawn_locked = false;
            boss::announce(self);
        }
    }

    // === Run control ===

    pub fn set_paused(&mut self, paused: bool) {
        self.phase = match (self.phase, paused) {
            (Phase::Playing, true) => Phase::Paused,
            (Phase::Paused, false) => Phase::Playing,
            (phase, _) => phase,
        };
    }

    pub fn stop(&mut self) {
        if self.active {
            log::info!("run stopped at frame {}", self.frame);
        }
        self.active = false;
    }

    /// Whether the next tick would simulate anything
    pub fn is_running(&self) -> bool {
        self.active && self.phase == Phase::Playing
    }

    // === Host sync ===

    pub fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            hp: self.player.hp.max(0.0),
            max_hp: self.player.max_hp,
            xp: self.player.xp,
            next_level_xp: self.player.next_level_xp,
            level: self.player.level,
            kills: self.kills,
            boss_hp: self
                .boss
                .as_ref()
                .filter(|b| !b.spawn_locked)
                .map(|b| (b.body.display_hp(), b.body.max_hp)),
            elapsed: self.elapsed,
        }
    }

    /// Position and facing of every live visual
    pub fn visual_transforms(&self) -> Vec<VisualTransform> {
        let bodies = self
            .enemies
            .iter()
            .map(|e| &e.body)
            .chain(self.minibosses.iter().map(|m| &m.body))
            .chain(self.boss.iter().map(|b| &b.body))
            .map(|b| VisualTransform {
                handle: b.visual,
                pos: b.pos,
                facing: b.facing,
            });
        let shots = self
            .bullets
            .iter()
            .chain(self.hostile_shots.iter())
            .map(|p| VisualTransform {
                handle: p.visual,
                pos: p.pos,
                facing: p.vel.y.atan2(p.vel.x),
            });
        let gems = self.gems.iter().map(|g| VisualTransform {
            handle: g.visual,
            pos: g.pos,
            facing: 0.0,
        });
        let zones = self.zones.iter().map(|z| VisualTransform {
            handle: z.visual,
            pos: z.pos,
            facing: 0.0,
        });
        bodies.chain(shots).chain(gems).chain(zones).collect()
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    // === Direct spawns (tests and scripted scenes) ===

    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, pos: Vec2, elite: bool) -> u32 {
        enemy::spawn_enemy_at(self, kind, pos, elite)
    }

    pub fn spawn_miniboss_at(&mut self, pos: Vec2) -> u32 {
        miniboss::spawn_miniboss_at(self, pos)
    }
}
