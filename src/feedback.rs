//! Host boundary: turns simulation events into visual, audio and HUD calls
//!
//! The simulation only queues [`GameEvent`]s. After each tick the host drains
//! them and hands them to [`dispatch`] together with its sink implementations.

use glam::Vec2;

use crate::audio::{AudioSink, Mixer};
use crate::settings::Settings;
use crate::sim::events::{GameEvent, VisualHandle, VisualKind};

/// Visual side of the host (scene graph, particles, floating text)
pub trait VisualSink {
    fn spawn_visual(&mut self, handle: VisualHandle, kind: VisualKind, pos: Vec2);
    fn release_visual(&mut self, handle: VisualHandle);
    fn set_emphasis(&mut self, handle: VisualHandle, on: bool);
    fn spawn_impact(&mut self, pos: Vec2);
    fn spawn_explosion(&mut self, pos: Vec2, color: u32);
    fn spawn_damage_number(&mut self, pos: Vec2, amount: u32);
    fn spawn_beam(&mut self, from: Vec2, to: Vec2);
    fn spawn_melee_arc(&mut self, origin: Vec2, range: f32, half_angle: f32, facing: f32);
}

/// Heads-up display; one-way notifications
pub trait HudSink {
    fn update(&mut self, hud: &HudSnapshot);
    fn notify(&mut self, _event: &GameEvent) {}
}

/// What the HUD shows after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub hp: f32,
    pub max_hp: f32,
    pub xp: u32,
    pub next_level_xp: u32,
    pub level: u32,
    pub kills: u32,
    /// (health, max health) once the boss is announced
    pub boss_hp: Option<(f32, f32)>,
    /// Seconds survived
    pub elapsed: f32,
}

impl HudSnapshot {
    /// Progress toward the next level in 0..=1
    pub fn xp_fraction(&self) -> f32 {
        if self.next_level_xp == 0 {
            return 0.0;
        }
        (self.xp as f32 / self.next_level_xp as f32).clamp(0.0, 1.0)
    }
}

/// Bundle of host sinks
pub struct Sinks<'a> {
    pub visuals: &'a mut dyn VisualSink,
    pub audio: &'a mut dyn AudioSink,
    pub hud: &'a mut dyn HudSink,
}

/// Counts of what was forwarded and what the settings dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub forwarded: usize,
    pub dropped: usize,
}

/// Forward one frame's events to the sinks
///
/// Visual lifecycle events are always delivered; transient effects obey the
/// per-frame cap and toggles in `settings`.
pub fn dispatch(
    events: &[GameEvent],
    settings: &Settings,
    mixer: &mut Mixer,
    sinks: &mut Sinks<'_>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();
    let budget = settings.max_effects_per_frame();
    let big_effects = settings.effective_big_effects();
    let mut effects = 0usize;

    // Returns whether one more transient effect fits this frame
    let take_effect = |effects: &mut usize| {
        if *effects < budget {
            *effects += 1;
            true
        } else {
            false
        }
    };

    for event in events {
        let delivered = match *event {
            GameEvent::VisualSpawned { handle, kind, pos } => {
                sinks.visuals.spawn_visual(handle, kind, pos);
                true
            }
            GameEvent::VisualReleased { handle } => {
                sinks.visuals.release_visual(handle);
                true
            }
            GameEvent::Emphasis { handle, on } => {
                sinks.visuals.set_emphasis(handle, on);
                true
            }
            GameEvent::Impact { pos } => {
                let ok = take_effect(&mut effects);
                if ok {
                    sinks.visuals.spawn_impact(pos);
                }
                ok
            }
            GameEvent::Explosion { pos, color } => {
                let ok = big_effects && take_effect(&mut effects);
                if ok {
                    sinks.visuals.spawn_explosion(pos, color);
                }
                ok
            }
            GameEvent::DamageNumber { pos, amount } => {
                let ok = settings.damage_numbers && take_effect(&mut effects);
                if ok {
                    sinks.visuals.spawn_damage_number(pos, amount);
                }
                ok
            }
            GameEvent::Beam { from, to } => {
                let ok = take_effect(&mut effects);
                if ok {
                    sinks.visuals.spawn_beam(from, to);
                }
                ok
            }
            GameEvent::MeleeArc {
                origin,
                range,
                half_angle,
                facing,
            } => {
                let ok = big_effects && take_effect(&mut effects);
                if ok {
                    sinks.visuals.spawn_melee_arc(origin, range, half_angle, facing);
                }
                ok
            }
            GameEvent::Sound(sound) => {
                mixer.play(sound, &mut *sinks.audio);
                true
            }
            _ => {
                sinks.hud.notify(event);
                true
            }
        };
        if delivered {
            stats.forwarded += 1;
        } else {
            stats.dropped += 1;
        }
    }

    if stats.dropped > 0 {
        log::trace!("feedback dropped {} effects this frame", stats.dropped);
    }
    stats
}

/// Sinks that ignore everything (headless runs)
#[derive(Debug, Default)]
pub struct NullHost;

impl VisualSink for NullHost {
    fn spawn_visual(&mut self, _handle: VisualHandle, _kind: VisualKind, _pos: Vec2) {}
    fn release_visual(&mut self, _handle: VisualHandle) {}
    fn set_emphasis(&mut self, _handle: VisualHandle, _on: bool) {}
    fn spawn_impact(&mut self, _pos: Vec2) {}
    fn spawn_explosion(&mut self, _pos: Vec2, _color: u32) {}
    fn spawn_damage_number(&mut self, _pos: Vec2, _amount: u32) {}
    fn spawn_beam(&mut self, _from: Vec2, _to: Vec2) {}
    fn spawn_melee_arc(&mut self, _origin: Vec2, _range: f32, _half_angle: f32, _facing: f32) {}
}

impl HudSink for NullHost {
    fn update(&mut self, _hud: &HudSnapshot) {}
}
