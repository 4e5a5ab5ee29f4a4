//! Outbound notifications and visual handle bookkeeping
//!
//! The simulation never touches meshes. It hands out opaque [`VisualHandle`]s,
//! records which are alive, and reports every change as a [`GameEvent`].

use std::collections::HashMap;

use glam::Vec2;

use super::enemy::EnemyKind;
use super::projectile::ShotKind;
use super::skills::UpgradeId;
use crate::audio::Sound;

/// Opaque id of a host-side visual node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u32);

/// What the host should build for a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Enemy { kind: EnemyKind, elite: bool },
    Miniboss,
    Boss,
    Shot(ShotKind),
    Gem { special: bool },
    /// Lingering void zone left by a boss nova
    Zone,
}

/// Something the host may want to show, play or display
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    VisualSpawned { handle: VisualHandle, kind: VisualKind, pos: Vec2 },
    VisualReleased { handle: VisualHandle },
    /// Toggle windup glow on an actor
    Emphasis { handle: VisualHandle, on: bool },
    Impact { pos: Vec2 },
    Explosion { pos: Vec2, color: u32 },
    DamageNumber { pos: Vec2, amount: u32 },
    Beam { from: Vec2, to: Vec2 },
    MeleeArc { origin: Vec2, range: f32, half_angle: f32, facing: f32 },
    Sound(Sound),
    PlayerDamaged { amount: f32, hp: f32 },
    PlayerDodged,
    PlayerDied { level: u32, kills: u32 },
    EnemyKilled { kind: EnemyKind, elite: bool, pos: Vec2 },
    MinibossKilled { pos: Vec2 },
    BossSpawned { level: u32 },
    /// Boss left its spawn lock and starts fighting
    BossAnnounced,
    BossDefeated { pos: Vec2 },
    XpGained { amount: u32 },
    LevelUp { level: u32 },
    UpgradeOffered { choices: [UpgradeId; 3] },
    UpgradeApplied { id: UpgradeId, level: u32 },
}

/// Live visual handles; every handle is released at most once
#[derive(Debug, Default)]
pub struct VisualRegistry {
    live: HashMap<VisualHandle, VisualKind>,
    next: u32,
}

impl VisualRegistry {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: VisualHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn kind_of(&self, handle: VisualHandle) -> Option<VisualKind> {
        self.live.get(&handle).copied()
    }
}

/// Per-tick event queue plus the visual side table
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<GameEvent>,
    visuals: VisualRegistry,
}

impl Outbox {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, sound: Sound) {
        self.events.push(GameEvent::Sound(sound));
    }

    pub fn impact(&mut self, pos: Vec2) {
        self.events.push(GameEvent::Impact { pos });
    }

    pub fn damage_number(&mut self, pos: Vec2, amount: f32) {
        self.events.push(GameEvent::DamageNumber {
            pos,
            amount: amount.max(0.0).floor() as u32,
        });
    }

    /// Allocate a handle and ask the host to build its visual
    pub fn acquire(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle {
        let handle = VisualHandle(self.visuals.next);
        self.visuals.next = self.visuals.next.wrapping_add(1);
        self.visuals.live.insert(handle, kind);
        self.events.push(GameEvent::VisualSpawned { handle, kind, pos });
        handle
    }

    /// Release a handle. Returns false (and emits nothing) if it was already gone.
    pub fn release(&mut self, handle: VisualHandle) -> bool {
        if self.visuals.live.remove(&handle).is_none() {
            log::warn!("visual {:?} released twice", handle);
            return false;
        }
        self.events.push(GameEvent::VisualReleased { handle });
        true
    }

    pub fn visuals(&self) -> &VisualRegistry {
        &self.visuals
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take everything queued since the last drain
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
