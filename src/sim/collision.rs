//! Overlap tests and their outcomes
//!
//! Each pair type uses its own threshold: rectangles for bullets against the
//! boss and enemies, a circle for ramming, padded boxes for hostile shots and
//! pickups. The shapes are not unified because they set the observable hit
//! windows.
//!
//! Outcomes are applied immediately. Anything consumed by an earlier rule is
//! skipped by later ones through its `active`/`hp` flags.

use glam::Vec2;

use super::state::{EndReason, GameEvent, GameState};
use crate::consts::*;

/// Player bullet against an enemy's top-left corner
#[inline]
pub fn enemy_box_hit(bullet: Vec2, enemy: Vec2) -> bool {
    (bullet.x - enemy.x - ENEMY_HIT_OFFSET).abs() < ENEMY_HIT_EXTENT
        && (bullet.y - enemy.y - ENEMY_HIT_OFFSET).abs() < ENEMY_HIT_EXTENT
}

/// Enemy body against the player (centre distance)
#[inline]
pub fn ram_hit(enemy_center: Vec2, player_center: Vec2) -> bool {
    enemy_center.distance(player_center) < RAM_RADIUS
}

/// Hostile bullet against the player's centre, padded by the bullet size
#[inline]
pub fn hostile_hit(bullet: Vec2, bullet_size: f32, player_center: Vec2) -> bool {
    let reach = bullet_size + HOSTILE_HIT_PAD;
    (bullet.x - player_center.x).abs() < reach && (bullet.y - player_center.y).abs() < reach
}

/// Power drop against the player's top-left corner
#[inline]
pub fn drop_hit(drop: Vec2, player: Vec2) -> bool {
    (drop.x - player.x).abs() < DROP_PICKUP_EXTENT && (drop.y - player.y).abs() < DROP_PICKUP_EXTENT
}

/// Run every pair rule in priority order
pub fn resolve(state: &mut GameState, now_ms: f64) {
    player_bullets_vs_boss(state, now_ms);
    player_bullets_vs_enemies(state, now_ms);

    if !state.boss_active() {
        enemies_vs_player(state, now_ms);
    }
    if !state.is_running() {
        return;
    }

    hostile_bullets_vs_player(state);
    if !state.is_running() {
        return;
    }

    drops_vs_player(state, now_ms);

    if !state.boss_active() {
        escapes(state);
    }
}

fn player_bullets_vs_boss(state: &mut GameState, now_ms: f64) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };

    let mut hits = Vec::new();
    for bullet in state.bullets.iter_mut().filter(|b| b.active && b.is_player()) {
        if boss.is_defeated() {
            break;
        }
        if boss.contains(bullet.pos) {
            boss.hp -= BOSS_BULLET_DAMAGE;
            bullet.active = false;
            hits.push(bullet.pos);
        }
    }

    for pos in hits {
        let combo = state.combo.register(now_ms);
        state.add_score(BOSS_HIT_BASE * combo as u64);
        state.emit(GameEvent::BossHit { pos });
    }
}

fn player_bullets_vs_enemies(state: &mut GameState, now_ms: f64) {
    struct Outcome {
        bullet: Vec2,
        kill: Option<(super::state::EnemyKind, Vec2)>,
    }

    let mut outcomes = Vec::new();
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        for bullet in state.bullets.iter_mut().filter(|b| b.active && b.is_player()) {
            if !enemy_box_hit(bullet.pos, enemy.pos) {
                continue;
            }
            enemy.hp -= 1;
            bullet.active = false;
            if enemy.is_alive() {
                enemy.hit_flash = 3;
                outcomes.push(Outcome {
                    bullet: bullet.pos,
                    kill: None,
                });
            } else {
                outcomes.push(Outcome {
                    bullet: bullet.pos,
                    kill: Some((enemy.kind, enemy.pos)),
                });
                break;
            }
        }
    }

    for outcome in outcomes {
        state.emit(GameEvent::EnemyHit {
            pos: outcome.bullet,
            lethal: outcome.kill.is_some(),
        });
        if let Some((kind, pos)) = outcome.kill {
            let combo = state.combo.register(now_ms);
            let points = kind.score_base() * combo as u64;
            state.add_score(points);
            state.emit(GameEvent::EnemyKilled { kind, pos, points });
            state.hit_stop_for(KILL_HIT_STOP);
        }
    }
}

fn enemies_vs_player(state: &mut GameState, now_ms: f64) {
    let player_center = state.player.center();
    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if !enemy.is_alive() || !ram_hit(enemy.center(), player_center) {
            continue;
        }
        let pos = enemy.pos;

        if state.power_level == 0 {
            state.terminate(EndReason::Destroyed);
            return;
        }

        state.enemies[i].hp = 0;
        let combo = state.combo.register(now_ms);
        let points = RAM_KILL_BASE * combo as u64;
        state.add_score(points);
        state.emit(GameEvent::Rammed { pos, points });
        state.hit_stop_for(RAM_HIT_STOP);
    }
}

fn hostile_bullets_vs_player(state: &mut GameState) {
    let player_center = state.player.center();
    for i in 0..state.bullets.len() {
        let bullet = &state.bullets[i];
        if !bullet.active || bullet.is_player() || !hostile_hit(bullet.pos, bullet.size, player_center) {
            continue;
        }

        if state.power_level == 0 {
            state.terminate(EndReason::Destroyed);
            return;
        }

        state.power_level -= 1;
        state.bullets[i].active = false;
        state.emit(GameEvent::PlayerDamaged {
            pos: state.player.pos,
        });
        state.hit_stop_for(DAMAGE_HIT_STOP);
    }
}

fn drops_vs_player(state: &mut GameState, now_ms: f64) {
    let player = state.player.pos;
    let mut collected = 0;
    for drop in state.drops.iter_mut().filter(|d| !d.consumed) {
        if drop_hit(drop.pos, player) {
            drop.consumed = true;
            collected += 1;
        }
    }

    for _ in 0..collected {
        state.power_level = (state.power_level + 1).min(MAX_POWER_LEVEL);
        state.power_up_end_ms = now_ms + POWER_UP_DURATION_MS;
        state.add_score(POWER_UP_BONUS);
        state.combo.register(now_ms);
        state.emit(GameEvent::PowerUp { pos: player });
    }
}

fn escapes(state: &mut GameState) {
    let mut broken = Vec::new();
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if enemy.escaped || enemy.pos.y <= ESCAPE_LINE {
            continue;
        }
        enemy.escaped = true;
        if state.combo.break_streak() > 0 {
            broken.push(enemy.pos);
        }
    }

    for pos in broken {
        state.emit(GameEvent::ComboBroken { pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::{Boss, BossKind, BossPhase};
    use crate::sim::state::{Bullet, BulletKind, Enemy, EnemyKind, GamePhase, PowerDrop};

    fn player_shot(pos: Vec2) -> Bullet {
        Bullet::player(pos, Vec2::ZERO, BulletKind::Main)
    }

    #[test]
    fn test_enemy_box_thresholds() {
        let enemy = Vec2::new(100.0, 100.0);
        assert!(enemy_box_hit(Vec2::new(120.0, 120.0), enemy));
        assert!(enemy_box_hit(Vec2::new(154.9, 86.0), enemy));
        assert!(!enemy_box_hit(Vec2::new(155.0, 120.0), enemy));
        assert!(!enemy_box_hit(Vec2::new(120.0, 85.0), enemy));
    }

    #[test]
    fn test_ram_radius() {
        assert!(ram_hit(Vec2::new(0.0, 0.0), Vec2::new(39.9, 0.0)));
        assert!(!ram_hit(Vec2::new(0.0, 0.0), Vec2::new(30.0, 30.0)));
    }

    #[test]
    fn test_hostile_uses_bullet_size() {
        let player = Vec2::new(100.0, 100.0);
        assert!(hostile_hit(Vec2::new(125.0, 100.0), 15.0, player));
        assert!(!hostile_hit(Vec2::new(125.0, 100.0), 4.0, player));
    }

    #[test]
    fn test_drop_pickup_box() {
        assert!(drop_hit(Vec2::new(149.0, 0.0), Vec2::new(100.0, 0.0)));
        assert!(!drop_hit(Vec2::new(150.0, 0.0), Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_bullet_kills_standard() {
        let mut state = GameState::new(1);
        state
            .enemies
            .push(Enemy::new(EnemyKind::Standard, Vec2::new(100.0, 100.0), 2.0));
        state.bullets.push(player_shot(Vec2::new(120.0, 120.0)));

        resolve(&mut state, 50.0);

        assert_eq!(state.enemies[0].hp, 0);
        assert!(!state.bullets[0].active);
        assert_eq!(state.combo.count, 1);
        assert_eq!(state.score, 10);
        assert_eq!(state.hit_stop, KILL_HIT_STOP);
        assert!(state.events.contains(&GameEvent::EnemyKilled {
            kind: EnemyKind::Standard,
            pos: Vec2::new(100.0, 100.0),
            points: 10,
        }));
    }

    #[test]
    fn test_tank_survives_four_hits() {
        let mut state = GameState::new(1);
        state
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(100.0, 100.0), 1.0));
        for _ in 0..4 {
            state.bullets.push(player_shot(Vec2::new(120.0, 120.0)));
        }
        resolve(&mut state, 0.0);
        assert_eq!(state.enemies[0].hp, 1);
        assert_eq!(state.enemies[0].hit_flash, 3);
        assert_eq!(state.combo.count, 0);
        assert_eq!(state.score, 0);

        // Fifth and sixth shot: only one is consumed
        state.bullets.clear();
        state.bullets.push(player_shot(Vec2::new(120.0, 120.0)));
        state.bullets.push(player_shot(Vec2::new(120.0, 120.0)));
        resolve(&mut state, 0.0);
        assert_eq!(state.enemies[0].hp, 0);
        assert_eq!(state.score, 30);
        assert!(state.bullets[1].active);
    }

    #[test]
    fn test_kill_multiplier_uses_post_increment_combo() {
        let mut state = GameState::new(1);
        for _ in 0..4 {
            state.combo.register(0.0);
        }
        state
            .enemies
            .push(Enemy::new(EnemyKind::Tank, Vec2::new(100.0, 100.0), 1.0));
        state.enemies[0].hp = 1;
        state.bullets.push(player_shot(Vec2::new(120.0, 120.0)));
        resolve(&mut state, 0.0);
        assert_eq!(state.score, 30 * 5);
    }

    #[test]
    fn test_unpowered_contact_is_lethal() {
        let mut state = GameState::new(1);
        let pos = state.player.pos;
        state
            .enemies
            .push(Enemy::new(EnemyKind::Standard, pos + Vec2::new(10.0, 0.0), 2.0));
        resolve(&mut state, 0.0);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.end_reason, Some(EndReason::Destroyed));
    }

    #[test]
    fn test_powered_ram() {
        let mut state = GameState::new(1);
        state.power_level = 2;
        let pos = state.player.pos;
        state
            .enemies
            .push(Enemy::new(EnemyKind::Tank, pos + Vec2::new(0.0, -20.0), 1.0));
        resolve(&mut state, 0.0);

        assert!(state.is_running());
        assert_eq!(state.enemies[0].hp, 0);
        assert_eq!(state.power_level, 2);
        assert_eq!(state.score, RAM_KILL_BASE);
        assert_eq!(state.hit_stop, RAM_HIT_STOP);
    }

    #[test]
    fn test_hostile_bullet_consumes_power() {
        let mut state = GameState::new(1);
        state.power_level = 1;
        let center = state.player.center();
        state
            .bullets
            .push(Bullet::hostile(center, Vec2::ZERO, 5.0, None));
        resolve(&mut state, 0.0);

        assert!(state.is_running());
        assert_eq!(state.power_level, 0);
        assert!(!state.bullets[0].active);
        assert_eq!(state.hit_stop, DAMAGE_HIT_STOP);

        // Unshielded: lethal
        state
            .bullets
            .push(Bullet::hostile(center, Vec2::ZERO, 5.0, None));
        resolve(&mut state, 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_power_drop_pickup() {
        let mut state = GameState::new(1);
        state.power_level = 3;
        state.drops.push(PowerDrop::new(state.player.pos));
        resolve(&mut state, 2000.0);

        assert!(state.drops[0].consumed);
        assert_eq!(state.power_level, MAX_POWER_LEVEL);
        assert_eq!(state.power_up_end_ms, 2000.0 + POWER_UP_DURATION_MS);
        assert_eq!(state.score, POWER_UP_BONUS);
        assert_eq!(state.combo.count, 1);
    }

    #[test]
    fn test_bullet_hits_boss() {
        let mut state = GameState::new(1);
        let mut boss = Boss::spawn(BossKind::Sun, 1);
        boss.pos = Vec2::new(300.0, 80.0);
        boss.phase = BossPhase::Fighting;
        state.boss = Some(boss);
        state.bullets.push(player_shot(Vec2::new(350.0, 120.0)));
        state.bullets.push(player_shot(Vec2::new(300.0, 120.0))); // on the edge: miss

        resolve(&mut state, 0.0);

        let boss = state.boss.as_ref().expect("boss");
        assert_eq!(boss.hp, boss.max_hp - BOSS_BULLET_DAMAGE);
        assert!(!state.bullets[0].active);
        assert!(state.bullets[1].active);
        assert_eq!(state.combo.count, 1);
        assert_eq!(state.score, BOSS_HIT_BASE);
    }

    #[test]
    fn test_escape_breaks_combo_once() {
        let mut state = GameState::new(1);
        for _ in 0..12 {
            state.combo.register(0.0);
        }
        state
            .enemies
            .push(Enemy::new(EnemyKind::Standard, Vec2::new(100.0, 601.0), 2.0));

        resolve(&mut state, 0.0);
        assert_eq!(state.combo.count, 0);
        assert!(state.enemies[0].escaped);

        // Lingering past the line with a fresh combo does not break it again
        state.combo.register(0.0);
        state.enemies[0].pos.y = 620.0;
        resolve(&mut state, 0.0);
        assert_eq!(state.combo.count, 1);

        let broken = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ComboBroken { .. }))
            .count();
        assert_eq!(broken, 1);
    }

    #[test]
    fn test_escape_ignored_during_boss() {
        let mut state = GameState::new(1);
        state.boss = Some(Boss::spawn(BossKind::Bat, 1));
        state.combo.register(0.0);
        state
            .enemies
            .push(Enemy::new(EnemyKind::Standard, Vec2::new(100.0, 601.0), 2.0));
        resolve(&mut state, 0.0);
        assert_eq!(state.combo.count, 1);
        assert!(!state.enemies[0].escaped);
    }
}
