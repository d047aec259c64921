//! Frame-synchronous simulation tick
//!
//! One call advances the run by one rendered frame. Spawn timers, the combo
//! window and power-up expiry use the supplied timestamp; everything else is
//! per-tick.

use glam::Vec2;

use super::state::{EndReason, GameState};
use super::{boss, collision, movement, particles};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire action (edge-triggered by the caller)
    pub fire: bool,
    /// End the run immediately
    pub exit: bool,
}

impl TickInput {
    /// Unnormalised steering vector, each axis in {-1, 0, 1}
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Advance the run by one tick
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) {
    if !state.is_running() {
        return;
    }
    state.events.clear();
    state.now_ms = now_ms;

    if input.exit {
        end_run(state, EndReason::Exited);
        return;
    }

    // Firing is honoured even while frozen
    if input.fire {
        movement::fire(state);
    }

    if state.hit_stop > 0 {
        state.hit_stop -= 1;
        particles::spawn_from_events(state);
        return;
    }

    state.frame_count += 1;
    movement::scroll_stars(state);
    movement::update_player(state, input);

    if state.combo.expire(now_ms) {
        log::debug!("Combo window lapsed");
    }
    movement::expire_power(state, now_ms);

    movement::move_bullets(state);
    movement::update_enemies(state, now_ms);
    movement::update_drops(state, now_ms);

    collision::resolve(state, now_ms);
    if !state.is_running() {
        purge(state);
        return;
    }

    boss::update(state, now_ms);

    particles::spawn_from_events(state);
    particles::age(state);

    purge(state);
}

/// End the run from outside the collision rules (exit requests)
pub fn end_run(state: &mut GameState, reason: EndReason) {
    state.terminate(reason);
}

fn purge(state: &mut GameState) {
    state.bullets.retain(|b| b.active);
    state
        .enemies
        .retain(|e| e.is_alive() && e.pos.y < ENEMY_CULL_LINE);
    state
        .drops
        .retain(|d| !d.consumed && d.pos.y <= DROP_CULL_LINE);
}
