//! Arena Survivors - entity simulation and combat core
//!
//! Core modules:
//! - `sim`: Seeded simulation (player, hostiles, projectiles, combat, spawning)
//! - `feedback`: Boundary traits and event dispatch to visuals, audio and HUD
//! - `audio`: Sound identifiers and the volume-gated mixer
//! - `settings`: Presentation preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod feedback;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Frame rate the per-frame balance numbers were authored against.
    /// Per-frame deltas are scaled by `dt * REFERENCE_FPS`.
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Longest frame accepted by `tick` (seconds); tab stalls are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player collision radius against obstacles
    pub const PLAYER_RADIUS: f32 = 0.6;

    /// Lifetime of a player bullet (frames)
    pub const BULLET_LIFETIME: u32 = 60;
    /// Radius used for bullet vs obstacle checks
    pub const BULLET_WALL_RADIUS: f32 = 0.25;
    /// Bullet hit radius per hostile tier
    pub const BULLET_HIT_RADIUS_ENEMY: f32 = 1.0;
    pub const BULLET_HIT_RADIUS_MINIBOSS: f32 = 2.2;
    pub const BULLET_HIT_RADIUS_BOSS: f32 = 3.0;

    /// Maximum chain jump per hostile tier
    pub const CHAIN_RADIUS_ENEMY: f32 = 10.0;
    pub const CHAIN_RADIUS_MINIBOSS: f32 = 12.0;
    pub const CHAIN_RADIUS_BOSS: f32 = 15.0;
    /// Two actors closer than this on both axes count as the same spot
    pub const SAME_POSITION_EPSILON: f32 = 0.01;

    /// Below this distance a direction vector is not normalized
    pub const MIN_STEER_DISTANCE: f32 = 0.001;
}

/// Normalize an angle to (-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a += TAU;
    }
    a
}

/// Unit vector pointing along `angle` (radians, measured from +x toward +z)
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_edges() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_bearing_matches_direction() {
        let from = Vec2::new(1.0, 1.0);
        let to = from + direction(0.7) * 3.0;
        assert!((bearing(from, to) - 0.7).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_normalize_angle_in_half_open_range(angle in -1000.0f32..1000.0) {
            let a = normalize_angle(angle);
            prop_assert!(a > -PI - 1e-4 && a <= PI + 1e-4);
            // Same direction on the unit circle
            prop_assert!((a.cos() - angle.cos()).abs() < 1e-2);
            prop_assert!((a.sin() - angle.sin()).abs() < 1e-2);
        }
    }
}
