//! Neon Storm - a vertical arcade shooter engine
//!
//! Core modules:
//! - `sim`: Frame-synchronous simulation (movement, collisions, combo, bosses, particles)
//! - `audio`: Procedural sound cues and the Web Audio player
//! - `session`: Run lifecycle around the simulation (clock, input, snapshots)
//! - `platform`: Browser/native clock abstraction
//! - `persistence`: Profile (credits, theme) key-value storage
//! - `leaderboard`: Score hand-off payloads and the local top-10 table

pub mod audio;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod theme;

pub use leaderboard::HighScores;
pub use session::{RunSummary, Session};
pub use settings::{QualityPreset, Settings};
pub use theme::Theme;

use glam::Vec2;

/// Game configuration constants
///
/// Distances are logical pixels, speeds are pixels per tick, windows are
/// wall-clock milliseconds.
pub mod consts {
    /// Logical playfield size
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player ship
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const PLAYER_START_X: f32 = 375.0;
    pub const PLAYER_START_Y: f32 = 500.0;
    pub const PLAYER_BASE_SPEED: f32 = 8.0;
    /// Extra speed per power level, capped
    pub const POWER_SPEED_STEP: f32 = 1.5;
    pub const POWER_SPEED_CAP: f32 = 4.5;
    /// Exponential smoothing factor for the cosmetic lean
    pub const LEAN_DECAY: f32 = 0.8;
    pub const LEAN_TARGET: f32 = 0.3;
    /// Recoil applied on every shot
    pub const FIRE_RECOIL: f32 = 4.0;
    pub const MAX_POWER_LEVEL: u8 = 3;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 50.0;
    pub const ENEMY_SPAWN_MS: f64 = 800.0;
    pub const ENEMY_SPAWN_Y: f32 = -60.0;
    pub const ENEMY_SPAWN_X_RANGE: f32 = 750.0;
    /// Crossing this line breaks the combo
    pub const ESCAPE_LINE: f32 = 600.0;
    /// Enemies at or past this line are removed
    pub const ENEMY_CULL_LINE: f32 = 650.0;
    pub const STALKER_LATERAL_SPEED: f32 = 1.8;
    pub const PHANTOM_SWAY: f32 = 5.0;

    /// Bullets
    pub const BULLET_CULL_MARGIN: f32 = 20.0;
    pub const BOSS_BULLET_DAMAGE: i32 = 10;

    /// Power drops
    pub const DROP_SPAWN_MS: f64 = 4000.0;
    pub const DROP_SPAWN_Y: f32 = -50.0;
    pub const DROP_FALL_SPEED: f32 = 2.5;
    pub const DROP_CULL_LINE: f32 = 650.0;
    pub const POWER_UP_DURATION_MS: f64 = 5000.0;

    /// Scoring
    pub const STANDARD_KILL_BASE: u64 = 10;
    pub const TANK_KILL_BASE: u64 = 30;
    pub const RAM_KILL_BASE: u64 = 50;
    pub const BOSS_HIT_BASE: u64 = 10;
    pub const POWER_UP_BONUS: u64 = 1000;
    pub const BOSS_DEFEAT_BONUS: u64 = 5000;

    /// Combo window
    pub const COMBO_WINDOW_MS: f64 = 3000.0;

    /// Hit-stop lengths (ticks)
    pub const KILL_HIT_STOP: u32 = 3;
    pub const RAM_HIT_STOP: u32 = 4;
    pub const DAMAGE_HIT_STOP: u32 = 5;
    pub const BOSS_DEFEAT_HIT_STOP: u32 = 10;

    /// Boss progression
    pub const FIRST_BOSS_SCORE: u64 = 10_000;
    pub const BOSS_SCORE_STEP: u64 = 10_000;
    pub const BOSS_COOLDOWN_MS: f64 = 30_000.0;
    pub const BOSS_BASE_HP: i32 = 500;
    pub const BOSS_HEIGHT: f32 = 100.0;
    pub const BOSS_SPAWN_Y: f32 = -200.0;
    pub const BOSS_OPERATING_Y: f32 = 80.0;
    pub const BOSS_DESCENT_SPEED: f32 = 2.0;

    /// Radii for overlap tests
    pub const RAM_RADIUS: f32 = 40.0;
    pub const ENEMY_HIT_EXTENT: f32 = 35.0;
    pub const ENEMY_HIT_OFFSET: f32 = 20.0;
    pub const HOSTILE_HIT_PAD: f32 = 15.0;
    pub const DROP_PICKUP_EXTENT: f32 = 50.0;

    /// Starfield
    pub const STAR_COUNT: usize = 60;
}

/// Centre of an axis-aligned box given its top-left corner and size
#[inline]
pub fn box_center(top_left: Vec2, size: f32) -> Vec2 {
    top_left + Vec2::splat(size / 2.0)
}

/// Whether a point lies outside the playfield by more than `margin`
#[inline]
pub fn out_of_field(pos: Vec2, margin: f32) -> bool {
    pos.x < -margin
        || pos.x > consts::FIELD_WIDTH + margin
        || pos.y < -margin
        || pos.y > consts::FIELD_HEIGHT + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_center() {
        assert_eq!(box_center(Vec2::new(375.0, 500.0), 50.0), Vec2::new(400.0, 525.0));
    }

    #[test]
    fn test_out_of_field_margin() {
        assert!(!out_of_field(Vec2::new(-20.0, 300.0), 20.0));
        assert!(out_of_field(Vec2::new(-20.5, 300.0), 20.0));
        assert!(out_of_field(Vec2::new(400.0, 621.0), 20.0));
    }
}
