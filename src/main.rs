//! Arena Survivors headless runner
//!
//! Drives the simulation without a renderer: a simple autopilot kites the
//! horde, level-up menus take the first offer, and a summary is logged at the
//! end. Useful for balance passes and for reproducing a seed.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use arena_survivors::Settings;
    use arena_survivors::audio::{Mixer, SilentAudio};
    use arena_survivors::feedback::{self, HudSink, NullHost, Sinks};
    use arena_survivors::sim::collision::DEFAULT_OBSTACLE_COUNT;
    use arena_survivors::sim::{
        GameEvent, ObstacleField, Phase, PlayerClass, SimulationWorld, TickInput, tick,
    };
    use arena_survivors::tuning::Tuning;
    use clap::{Parser, ValueEnum};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum ClassArg {
        Ranger,
        Mage,
        #[value(alias = "paladin")]
        Knight,
    }

    impl From<ClassArg> for PlayerClass {
        fn from(arg: ClassArg) -> Self {
            match arg {
                ClassArg::Ranger => PlayerClass::Ranger,
                ClassArg::Mage => PlayerClass::Mage,
                ClassArg::Knight => PlayerClass::Knight,
            }
        }
    }

    /// Run the arena without a renderer
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Cli {
        /// Run seed; equal seeds replay identically
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Starting class
        #[arg(long, value_enum, default_value_t = ClassArg::Ranger)]
        class: ClassArg,
        /// Frames to simulate at 60 fps
        #[arg(long, default_value_t = 60 * 60 * 5)]
        frames: u64,
        /// JSON balance overrides
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
    }

    fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let tuning = Tuning::from_json(&json)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Kite: back away from close hostiles, otherwise circle the origin
    fn autopilot(world: &SimulationWorld) -> Vec2 {
        let pos = world.player.pos;
        match world.hostiles().nearest(pos) {
            Some(t) if t.distance < 8.0 => {
                let away = (pos - t.pos).normalize_or_zero();
                (away + away.perp() * 0.5).normalize_or_zero()
            }
            _ => {
                let radial = pos.normalize_or_zero();
                (radial.perp() - radial * (pos.length() / 40.0)).normalize_or_zero()
            }
        }
    }

    /// Counts bosses for the summary
    #[derive(Default)]
    struct Summary {
        bosses_defeated: u32,
        upgrades: u32,
    }

    impl HudSink for Summary {
        fn update(&mut self, _hud: &feedback::HudSnapshot) {}

        fn notify(&mut self, event: &GameEvent) {
            match event {
                GameEvent::BossDefeated { .. } => self.bosses_defeated += 1,
                GameEvent::UpgradeApplied { .. } => self.upgrades += 1,
                _ => {}
            }
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        let tuning = load_tuning(cli.tuning.as_deref())?;

        let mut world = SimulationWorld::with_tuning(cli.seed, cli.class.into(), tuning);
        let arena = ObstacleField::scatter(cli.seed, DEFAULT_OBSTACLE_COUNT);
        let settings = Settings::default();
        let mut mixer = Mixer::from_settings(&settings);
        let mut host = NullHost;
        let mut audio = SilentAudio;
        let mut summary = Summary::default();

        for _ in 0..cli.frames {
            if !world.active {
                break;
            }
            if let Phase::ChoosingUpgrade { choices } = world.phase {
                log::debug!("offered {:?}", choices);
                world.choose_upgrade(0)?;
            }

            let input = TickInput {
                move_dir: autopilot(&world),
            };
            tick(&mut world, &input, DT, &arena);
            mixer.advance(DT);

            let events = world.drain_events();
            let mut sinks = Sinks {
                visuals: &mut host,
                audio: &mut audio,
                hud: &mut summary,
            };
            feedback::dispatch(&events, &settings, &mut mixer, &mut sinks);
            summary.update(&world.hud_snapshot());
        }

        let hud = world.hud_snapshot();
        log::info!(
            "run over after {:.1}s: level {}, {} kills, {} bosses, {} upgrades, hp {:.0}/{:.0}",
            hud.elapsed,
            hud.level,
            hud.kills,
            summary.bosses_defeated,
            summary.upgrades,
            hud.hp,
            hud.max_hp
        );
        log::info!(
            "live visuals at exit: {}",
            world.events.visuals().live_count()
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host links the library directly
}
