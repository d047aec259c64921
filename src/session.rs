//! Run lifecycle around the simulation
//!
//! A [`Session`] owns the store, the clock, the settings and the active theme.
//! Hosts call [`Session::frame`] once per rendered frame and hand the returned
//! snapshot to their renderer and audio.

use serde::Serialize;

use crate::platform::Clock;
use crate::settings::Settings;
use crate::sim::{EndReason, GameState, Snapshot, TickInput, end_run, tick};
use crate::theme::Theme;

/// Final numbers handed to the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub score: u64,
    pub boss_level: u32,
    /// `None` while the run is still going
    pub reason: Option<EndReason>,
    pub frames: u64,
}

pub struct Session<C: Clock> {
    clock: C,
    settings: Settings,
    theme: Theme,
    seed: u64,
    state: GameState,
}

impl<C: Clock> Session<C> {
    pub fn new(clock: C, settings: Settings, theme: Theme, seed: u64) -> Self {
        let mut session = Self {
            clock,
            settings,
            theme,
            seed,
            state: GameState::new(seed),
        };
        session.start();
        session
    }

    /// Reset the store and start a fresh run with the current seed
    pub fn start(&mut self) {
        let mut state = GameState::new(self.seed)
            .with_theme(self.theme)
            .with_particle_budget(self.settings.max_particles());
        if self.settings.starfield {
            state = state.with_starfield();
        }

        // Timers count from the start of the run, not from the epoch
        let now = self.clock.now_ms();
        state.now_ms = now;
        state.last_enemy_spawn_ms = now;
        state.last_drop_spawn_ms = now;
        state.combo.last_kill_ms = now;

        log::info!("Run started (seed {}, theme {})", self.seed, self.theme.name);
        self.state = state;
    }

    /// Start again with a different seed
    pub fn restart(&mut self, seed: u64) {
        self.seed = seed;
        self.start();
    }

    /// Tick once. After the run has ended the store is left untouched.
    pub fn frame(&mut self, input: &TickInput) -> Snapshot<'_> {
        if self.state.is_running() {
            let now = self.clock.now_ms();
            tick(&mut self.state, input, now);
        }
        Snapshot::of(&self.state)
    }

    /// Terminate the run
    pub fn exit(&mut self) {
        end_run(&mut self.state, EndReason::Exited);
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.state.score,
            boss_level: self.state.director.boss_level,
            reason: self.state.end_reason,
            frames: self.state.frame_count,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::of(&self.state)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies from the next run
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Applies from the next run
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SteppedClock;
    use crate::settings::QualityPreset;
    use crate::sim::GameEvent;
    use crate::theme;

    fn session(seed: u64) -> Session<SteppedClock> {
        Session::new(SteppedClock::default(), Settings::default(), Theme::default(), seed)
    }

    #[test]
    fn test_start_resets_timers() {
        let mut clock = SteppedClock::default();
        clock.advance(1_000_000.0);
        let session = Session::new(clock, Settings::default(), Theme::default(), 1);
        let state = session.state();
        assert!(state.last_enemy_spawn_ms > 1_000_000.0);
        assert!(state.enemies.is_empty());
        assert_eq!(state.stars.len(), crate::consts::STAR_COUNT);
    }

    #[test]
    fn test_enemies_arrive_on_the_timer() {
        let mut session = Session::new(SteppedClock::new(10.0), Settings::default(), Theme::default(), 3);
        // 80 frames of 10 ms is exactly the spawn interval: not yet
        for _ in 0..80 {
            session.frame(&TickInput::default());
        }
        assert!(session.state().enemies.is_empty());
        session.frame(&TickInput::default());
        assert_eq!(session.state().enemies.len(), 1);
    }

    #[test]
    fn test_exit_freezes_session() {
        let mut session = session(9);
        for _ in 0..10 {
            session.frame(&TickInput::default());
        }
        session.exit();
        let summary = session.summary();
        assert_eq!(summary.reason, Some(EndReason::Exited));
        assert_eq!(summary.frames, 10);

        let snapshot = session.frame(&TickInput {
            fire: true,
            ..Default::default()
        });
        assert!(!snapshot.hud.running);
        assert!(matches!(snapshot.events, [GameEvent::RunEnded { .. }]));
        assert_eq!(session.summary(), summary);
    }

    #[test]
    fn test_exit_input() {
        let mut session = session(9);
        let snapshot = session.frame(&TickInput {
            exit: true,
            ..Default::default()
        });
        assert_eq!(snapshot.hud.end_reason, Some(EndReason::Exited));
    }

    #[test]
    fn test_settings_and_theme_apply() {
        let mut session = Session::new(
            SteppedClock::default(),
            Settings::from_preset(QualityPreset::Low),
            theme::MATRIX,
            1,
        );
        assert!(session.state().stars.is_empty());
        assert_eq!(session.state().particle_budget, 300);
        assert_eq!(session.snapshot().theme, theme::MATRIX);

        session.set_theme(theme::GOLD);
        session.restart(2);
        assert_eq!(session.state().theme, theme::GOLD);
        assert_eq!(session.state().seed, 2);
    }

    #[test]
    fn test_same_seed_same_run() {
        let play = |seed| {
            let mut session = session(seed);
            for i in 0..900u32 {
                let input = TickInput {
                    fire: i % 5 == 0,
                    left: (i / 60) % 2 == 0,
                    right: (i / 60) % 2 == 1,
                    ..Default::default()
                };
                session.frame(&input);
            }
            session.summary()
        };
        assert_eq!(play(77), play(77));
    }
}
