//! Read-only per-tick view for the renderer and UI widgets

use serde::Serialize;

use super::boss::Boss;
use super::combo::Rank;
use super::particles::Particle;
use super::state::{
    Bullet, EndReason, Enemy, FloatingText, GameEvent, GameState, Player, PowerDrop, Star,
};
use crate::theme::Theme;

/// Everything a renderer needs for one frame, borrowed from the store
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub frame: u64,
    pub player: &'a Player,
    pub power_level: u8,
    pub bullets: &'a [Bullet],
    pub enemies: &'a [Enemy],
    pub drops: &'a [PowerDrop],
    pub boss: Option<&'a Boss>,
    pub particles: &'a [Particle],
    pub texts: &'a [FloatingText],
    pub stars: &'a [Star],
    pub theme: Theme,
    pub events: &'a [GameEvent],
    pub hud: Hud,
}

/// Status fields the UI reads instead of being written to by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub combo: u32,
    pub rank: Rank,
    /// Remaining combo window, 0..=1
    pub combo_timer: f32,
    pub power_level: u8,
    /// Remaining power-up window, 0..=1
    pub power_timer: f32,
    pub boss: Option<BossHud>,
    pub running: bool,
    pub end_reason: Option<EndReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossHud {
    pub name: &'static str,
    /// 0..=1
    pub hp_fraction: f32,
    pub color: u32,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let now = state.now_ms;
        let combo_timer = if state.combo.count > 0 {
            state.combo.timer_fraction(now)
        } else {
            0.0
        };
        let power_timer = if state.power_level > 0 {
            ((state.power_up_end_ms - now) / crate::consts::POWER_UP_DURATION_MS).clamp(0.0, 1.0)
                as f32
        } else {
            0.0
        };

        Self {
            score: state.score,
            combo: state.combo.count,
            rank: state.combo.rank(),
            combo_timer,
            power_level: state.power_level,
            power_timer,
            boss: state.boss.as_ref().map(|b| BossHud {
                name: b.kind.name(),
                hp_fraction: b.hp_fraction(),
                color: b.kind.color(),
            }),
            running: state.is_running(),
            end_reason: state.end_reason,
        }
    }
}

impl<'a> Snapshot<'a> {
    pub fn of(state: &'a GameState) -> Self {
        Self {
            frame: state.frame_count,
            player: &state.player,
            power_level: state.power_level,
            bullets: &state.bullets,
            enemies: &state.enemies,
            drops: &state.drops,
            boss: state.boss.as_ref(),
            particles: &state.particles,
            texts: &state.texts,
            stars: &state.stars,
            theme: state.theme,
            events: &state.events,
            hud: Hud::from_state(state),
        }
    }
}
