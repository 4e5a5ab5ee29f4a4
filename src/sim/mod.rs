//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Stable iteration order (back to front within each population)
//! - No rendering, audio or platform dependencies; the host hears about
//!   everything through [`GameEvent`]s

pub mod attack;
pub mod aura;
pub mod boss;
pub mod collision;
pub mod director;
pub mod enemy;
pub mod events;
pub mod hostile;
pub mod miniboss;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod skills;
pub mod spatial;
pub mod state;
pub mod tick;

pub use attack::AttackKind;
pub use aura::{Aura, AuraKind};
pub use collision::{Obstacle, ObstacleField, ObstacleHit, ObstacleOracle, OpenArena};
pub use enemy::EnemyKind;
pub use events::{GameEvent, VisualHandle, VisualKind};
pub use hostile::{Hostile, HostileRef, HostileTier};
pub use player::{Player, PlayerClass};
pub use projectile::ShotKind;
pub use skills::{UpgradeId, UpgradeTier};
pub use state::{DamageSource, Phase, SimulationWorld, UpgradeChoiceError, VisualTransform};
pub use tick::{TickInput, tick};
