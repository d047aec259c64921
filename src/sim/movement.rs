//! Kinematics and spawning
//!
//! Advances the player, bullets, enemies, drops and stars by one tick. No
//! collision or scoring happens here.

use glam::Vec2;
use rand::Rng;

use super::particles::Emitter;
use super::state::{Bullet, BulletKind, Enemy, EnemyKind, GameEvent, GameState, PowerDrop};
use super::tick::TickInput;
use crate::consts::*;
use crate::out_of_field;

/// Player fire action: main shot plus side pairs per power level
pub fn fire(state: &mut GameState) {
    state.player.pos.y = (state.player.pos.y + FIRE_RECOIL).min(FIELD_HEIGHT);
    let p = state.player.pos;

    state.emit(GameEvent::Shot {
        muzzle: p + Vec2::new(PLAYER_SIZE / 2.0, -10.0),
    });

    state.bullets.push(Bullet::player(
        p + Vec2::new(22.0, 0.0),
        Vec2::new(0.0, -15.0),
        BulletKind::Main,
    ));

    // (min level, left offset, right offset, |vx|, vy)
    const SIDE_PAIRS: [(u8, Vec2, Vec2, f32, f32); 3] = [
        (1, Vec2::new(-10.0, 10.0), Vec2::new(50.0, 10.0), 1.0, -14.0),
        (2, Vec2::new(-20.0, 20.0), Vec2::new(60.0, 20.0), 3.0, -12.0),
        (3, Vec2::new(0.0, 0.0), Vec2::new(40.0, 0.0), 5.0, -10.0),
    ];
    for (level, left, right, vx, vy) in SIDE_PAIRS {
        if state.power_level >= level {
            state
                .bullets
                .push(Bullet::player(p + left, Vec2::new(-vx, vy), BulletKind::Side));
            state
                .bullets
                .push(Bullet::player(p + right, Vec2::new(vx, vy), BulletKind::Side));
        }
    }
}

/// Steer, smooth the lean, clamp to the field and leave a thruster trail
pub fn update_player(state: &mut GameState, input: &TickInput) {
    let speed = state.player.speed(state.power_level);
    let dir = input.direction();
    let player = &mut state.player;

    player.pos += dir * speed;
    player.lean = player.lean * LEAN_DECAY + dir.x * LEAN_TARGET * (1.0 - LEAN_DECAY);
    player.pos.x = player.pos.x.clamp(0.0, FIELD_WIDTH - player.size);
    player.pos.y = player.pos.y.clamp(0.0, FIELD_HEIGHT - player.size);

    if state.frame_count % 2 == 0 {
        let color = if state.power_level > 0 {
            state.theme.secondary
        } else {
            state.theme.primary
        };
        let center = state.player.center();
        let bottom = state.player.pos.y + state.player.size;
        Emitter::new(&mut state.particles, state.particle_budget, &mut state.rng)
            .trail(center, bottom, color);
    }
}

/// Drop the weapon upgrade once its window has passed
pub fn expire_power(state: &mut GameState, now_ms: f64) {
    if state.power_level > 0 && now_ms >= state.power_up_end_ms {
        log::debug!("Power level {} expired", state.power_level);
        state.power_level = 0;
        state.power_up_end_ms = 0.0;
    }
}

/// Linear motion; bullets leaving the padded field go inactive
pub fn move_bullets(state: &mut GameState) {
    for bullet in state.bullets.iter_mut().filter(|b| b.active) {
        bullet.pos += bullet.vel;
        if out_of_field(bullet.pos, BULLET_CULL_MARGIN) {
            bullet.active = false;
        }
    }
}

/// Spawn on the timer (no boss only), then apply per-variant motion
pub fn update_enemies(state: &mut GameState, now_ms: f64) {
    if state.boss.is_some() {
        return;
    }

    if now_ms - state.last_enemy_spawn_ms > ENEMY_SPAWN_MS {
        let kind = EnemyKind::from_roll(state.rng.random());
        let speed = match kind {
            EnemyKind::Tank => 1.0,
            EnemyKind::Stalker => 4.0,
            EnemyKind::Phantom => 2.2,
            EnemyKind::Standard => 2.5 + state.rng.random::<f32>() * 2.0,
        };
        let x = state.rng.random::<f32>() * ENEMY_SPAWN_X_RANGE;
        log::debug!("Spawned {kind:?} at x={x:.0}");
        state
            .enemies
            .push(Enemy::new(kind, Vec2::new(x, ENEMY_SPAWN_Y), speed));
        state.last_enemy_spawn_ms = now_ms;
    }

    let player_cx = state.player.center().x;
    let sway = (now_ms / 150.0).sin() as f32 * PHANTOM_SWAY;
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        enemy.pos.y += enemy.speed;
        if enemy.scale < 1.0 {
            enemy.scale = (enemy.scale + 0.1).min(1.0);
        }
        enemy.hit_flash = enemy.hit_flash.saturating_sub(1);

        match enemy.kind {
            EnemyKind::Stalker => {
                let dx = player_cx - enemy.center().x;
                if dx != 0.0 {
                    enemy.pos.x += dx.signum() * STALKER_LATERAL_SPEED;
                }
            }
            EnemyKind::Phantom => enemy.pos.x += sway,
            EnemyKind::Standard | EnemyKind::Tank => {}
        }
    }
}

/// Spawn on the timer, fall, bob and spin
pub fn update_drops(state: &mut GameState, now_ms: f64) {
    if now_ms - state.last_drop_spawn_ms > DROP_SPAWN_MS {
        let x = state.rng.random::<f32>() * ENEMY_SPAWN_X_RANGE;
        state.drops.push(PowerDrop::new(Vec2::new(x, DROP_SPAWN_Y)));
        state.last_drop_spawn_ms = now_ms;
    }

    for drop in &mut state.drops {
        drop.pos.y += DROP_FALL_SPEED;
        drop.float_phase += 0.1;
        drop.rotation += 0.05;
    }
}

/// Scroll the background, wrapping at the bottom
pub fn scroll_stars(state: &mut GameState) {
    for star in &mut state.stars {
        star.pos.y += star.speed;
        if star.pos.y > FIELD_HEIGHT {
            star.pos.y = 0.0;
        }
    }
}
