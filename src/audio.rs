//! Sound cues and the volume-gated mixer
//!
//! The simulation only names sounds; playback belongs to whatever backend
//! the host plugs in through [`AudioSink`].

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// Projectile or contact hit
    Hit,
    /// Hostile killed by passive aura damage
    Kill,
    /// Experience gem collected
    Xp,
    /// Player gained a level
    LevelUp,
    /// Boss or miniboss fires / dashes
    BossShoot,
    /// Boss lunge connects
    BossHit,
    /// Boss defeated
    BossDie,
    /// Boss enters the arena
    BossLaugh,
}

impl Sound {
    /// Per-cue base gain (before master/sfx volume)
    pub fn base_volume(&self) -> f32 {
        match self {
            Sound::Hit | Sound::Xp => 0.7,
            Sound::Kill => 0.8,
            Sound::LevelUp | Sound::BossLaugh | Sound::BossDie => 1.0,
            Sound::BossShoot | Sound::BossHit => 0.9,
        }
    }

    /// Minimum spacing between two plays of the same cue (seconds)
    fn min_interval(&self) -> f32 {
        match self {
            Sound::Hit => 0.07,
            _ => 0.0,
        }
    }
}

/// Playback backend (Web Audio, native mixer, test recorder, ...)
pub trait AudioSink {
    /// Fire-and-forget; failures stay inside the backend
    fn play(&mut self, sound: Sound, volume: f32);
}

/// Backend that drops every cue
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _sound: Sound, _volume: f32) {}
}

/// Applies volume settings and hit anti-spam before forwarding to a sink
#[derive(Debug, Clone)]
pub struct Mixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Seconds since the mixer started
    clock: f32,
    last_hit: Option<f32>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            clock: 0.0,
            last_hit: None,
        }
    }

    /// Build a mixer from saved settings
    pub fn from_settings(settings: &Settings) -> Self {
        let mut mixer = Self::new();
        mixer.apply_settings(settings);
        mixer
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.muted = settings.muted;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Advance the anti-spam clock
    pub fn advance(&mut self, dt: f32) {
        self.clock += dt.max(0.0);
    }

    /// Final gain for a cue, or None when it should be dropped
    pub fn gain(&mut self, sound: Sound) -> Option<f32> {
        if self.muted {
            return None;
        }
        if sound.min_interval() > 0.0 {
            if let Some(last) = self.last_hit {
                if self.clock - last < sound.min_interval() {
                    return None;
                }
            }
            self.last_hit = Some(self.clock);
        }
        let volume = sound.base_volume() * self.master_volume * self.sfx_volume;
        (volume > 0.0).then_some(volume)
    }

    /// Play a cue through the given backend
    pub fn play(&mut self, sound: Sound, sink: &mut dyn AudioSink) {
        if let Some(volume) = self.gain(sound) {
            sink.play(sound, volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(Sound, f32)>);

    impl AudioSink for Recorder {
        fn play(&mut self, sound: Sound, volume: f32) {
            self.0.push((sound, volume));
        }
    }

    #[test]
    fn test_hit_anti_spam() {
        let mut mixer = Mixer::new();
        let mut rec = Recorder::default();
        mixer.play(Sound::Hit, &mut rec);
        mixer.advance(0.03);
        mixer.play(Sound::Hit, &mut rec);
        mixer.advance(0.05);
        mixer.play(Sound::Hit, &mut rec);
        assert_eq!(rec.0.len(), 2);
    }

    #[test]
    fn test_other_cues_not_throttled() {
        let mut mixer = Mixer::new();
        let mut rec = Recorder::default();
        mixer.play(Sound::Xp, &mut rec);
        mixer.play(Sound::Xp, &mut rec);
        assert_eq!(rec.0.len(), 2);
    }

    #[test]
    fn test_muted_drops_everything() {
        let mut settings = Settings::default();
        settings.muted = true;
        let mut mixer = Mixer::from_settings(&settings);
        let mut rec = Recorder::default();
        mixer.play(Sound::LevelUp, &mut rec);
        assert!(rec.0.is_empty());
    }

    #[test]
    fn test_volume_combines_master_and_sfx() {
        let mut mixer = Mixer::new();
        mixer.set_master_volume(0.5);
        mixer.set_sfx_volume(0.5);
        let gain = mixer.gain(Sound::LevelUp).unwrap();
        assert!((gain - 0.25).abs() < 1e-6);
    }
}
