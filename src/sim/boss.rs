//! Boss director
//!
//! Dormant → Entering → Fighting → Dormant. A boss appears once the score
//! passes a rising threshold and the post-defeat cooldown is over. Each
//! variant is one row of [`BOSS_TABLE`]: stats plus a movement and a fire
//! function.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Bullet, GameEvent, GameState};
use crate::consts::*;

/// Boss variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossKind {
    Sun,
    Serpent,
    Golem,
    Bat,
}

impl BossKind {
    pub const ALL: [BossKind; 4] = [BossKind::Sun, BossKind::Serpent, BossKind::Golem, BossKind::Bat];

    pub fn profile(self) -> &'static BossProfile {
        &BOSS_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn color(self) -> u32 {
        self.profile().color
    }
}

/// Per-tick context handed to pattern functions
pub struct PatternContext<'a> {
    pub now_ms: f64,
    /// Player top-left
    pub player: Vec2,
    pub rng: &'a mut Pcg32,
}

type MoveFn = fn(&mut Boss, &mut PatternContext);
type FireFn = fn(&Boss, &mut PatternContext, &mut Vec<Bullet>);

/// Behavior table entry
pub struct BossProfile {
    pub kind: BossKind,
    pub name: &'static str,
    pub hp_multiplier: f32,
    pub width: f32,
    pub color: u32,
    pub fire_rate_multiplier: f64,
    pub movement: MoveFn,
    pub fire: FireFn,
}

pub static BOSS_TABLE: [BossProfile; 4] = [
    BossProfile {
        kind: BossKind::Sun,
        name: "TONATIUH (SUN EATER)",
        hp_multiplier: 1.0,
        width: 100.0,
        color: 0xffd700,
        fire_rate_multiplier: 1.0,
        movement: patrol_bounce,
        fire: radial_burst,
    },
    BossProfile {
        kind: BossKind::Serpent,
        name: "QUETZALCOATL (SKY SERPENT)",
        hp_multiplier: 0.8,
        width: 140.0,
        color: 0x00ffcc,
        fire_rate_multiplier: 1.0,
        movement: sinusoidal_weave,
        fire: aimed_spread,
    },
    BossProfile {
        kind: BossKind::Golem,
        name: "TLALOC (JADE GOLEM)",
        hp_multiplier: 1.5,
        width: 120.0,
        color: 0x00aa55,
        fire_rate_multiplier: 1.5,
        movement: track_player,
        fire: heavy_shot,
    },
    BossProfile {
        kind: BossKind::Bat,
        name: "CAMAZOTZ (DEATH BAT)",
        hp_multiplier: 0.7,
        width: 90.0,
        color: 0xd900ff,
        fire_rate_multiplier: 0.6,
        movement: dash_and_drift,
        fire: paired_shots,
    },
];

/// Boss lifecycle within an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Descending to operating altitude
    Entering,
    /// Running its movement/fire pattern
    Fighting,
}

/// Director state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorState {
    Dormant,
    Entering,
    Fighting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub phase: BossPhase,
    /// Radial burst rotation, advances every tick
    pub angle: f32,
    /// Ticks since spawn
    pub timer: u32,
    pub last_shot_ms: f64,
}

impl Boss {
    pub fn spawn(kind: BossKind, level: u32) -> Self {
        let profile = kind.profile();
        let hp = boss_hp(kind, level);
        Self {
            kind,
            pos: Vec2::new(FIELD_WIDTH / 2.0 - profile.width / 2.0, BOSS_SPAWN_Y),
            vel: Vec2::new(2.0, 0.0),
            width: profile.width,
            height: BOSS_HEIGHT,
            hp,
            max_hp: hp,
            phase: BossPhase::Entering,
            angle: 0.0,
            timer: 0,
            last_shot_ms: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Strict rectangle test used for player bullets
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.pos.x
            && point.x < self.pos.x + self.width
            && point.y > self.pos.y
            && point.y < self.pos.y + self.height
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp as f32 / self.max_hp as f32).clamp(0.0, 1.0)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }
}

/// `500 × level × variant multiplier`
pub fn boss_hp(kind: BossKind, level: u32) -> i32 {
    let base = BOSS_BASE_HP as f32 * level as f32;
    (base * kind.profile().hp_multiplier).round() as i32
}

/// Milliseconds between volleys; shortens with level down to a floor
pub fn fire_interval_ms(kind: BossKind, level: u32) -> f64 {
    let base = (1500.0 - level as f64 * 100.0).max(500.0);
    base * kind.profile().fire_rate_multiplier
}

/// Progression state that outlives individual bosses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDirector {
    pub boss_level: u32,
    pub next_boss_score: u64,
    pub last_kind: Option<BossKind>,
    pub cooldown_until_ms: f64,
}

impl Default for BossDirector {
    fn default() -> Self {
        Self {
            boss_level: 1,
            next_boss_score: FIRST_BOSS_SCORE,
            last_kind: None,
            cooldown_until_ms: 0.0,
        }
    }
}

impl BossDirector {
    pub fn state(boss: Option<&Boss>) -> DirectorState {
        match boss.map(|b| b.phase) {
            None => DirectorState::Dormant,
            Some(BossPhase::Entering) => DirectorState::Entering,
            Some(BossPhase::Fighting) => DirectorState::Fighting,
        }
    }

    pub fn should_spawn(&self, score: u64, now_ms: f64) -> bool {
        score >= self.next_boss_score && now_ms > self.cooldown_until_ms
    }

    /// Uniform pick, never repeating the previous variant
    pub fn pick_kind(&self, rng: &mut Pcg32) -> BossKind {
        let pool: Vec<BossKind> = BossKind::ALL
            .into_iter()
            .filter(|k| Some(*k) != self.last_kind)
            .collect();
        pool[rng.random_range(0..pool.len())]
    }
}

/// Run the director for one tick: defeat, spawn, then movement and fire
pub fn update(state: &mut GameState, now_ms: f64) {
    if state.boss.as_ref().is_some_and(Boss::is_defeated) {
        defeat(state, now_ms);
    }

    if state.boss.is_none() && state.director.should_spawn(state.score, now_ms) {
        spawn(state);
    }

    let Some(boss) = state.boss.as_mut() else {
        return;
    };

    boss.timer += 1;
    boss.angle += 0.02;

    match boss.phase {
        BossPhase::Entering => {
            boss.pos.y += BOSS_DESCENT_SPEED;
            if boss.pos.y >= BOSS_OPERATING_Y {
                boss.phase = BossPhase::Fighting;
            }
        }
        BossPhase::Fighting => {
            let profile = boss.kind.profile();
            let mut ctx = PatternContext {
                now_ms,
                player: state.player.pos,
                rng: &mut state.rng,
            };
            (profile.movement)(boss, &mut ctx);

            let interval = fire_interval_ms(boss.kind, state.director.boss_level);
            if now_ms - boss.last_shot_ms > interval {
                boss.last_shot_ms = now_ms;
                (profile.fire)(boss, &mut ctx, &mut state.bullets);
                state.events.push(GameEvent::BossFired { kind: boss.kind });
            }
        }
    }
}

fn spawn(state: &mut GameState) {
    let kind = state.director.pick_kind(&mut state.rng);
    state.director.last_kind = Some(kind);
    state.enemies.clear();
    state.boss = Some(Boss::spawn(kind, state.director.boss_level));
    log::info!(
        "Boss spawned: {} (level {}, hp {})",
        kind.name(),
        state.director.boss_level,
        boss_hp(kind, state.director.boss_level)
    );
    state.emit(GameEvent::BossSpawned { kind });
}

fn defeat(state: &mut GameState, now_ms: f64) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    let center = boss.center();
    state.emit(GameEvent::BossDefeated {
        kind: boss.kind,
        center,
        top: Vec2::new(center.x, boss.pos.y),
    });
    state.add_score(BOSS_DEFEAT_BONUS);

    let director = &mut state.director;
    director.boss_level += 1;
    director.next_boss_score += BOSS_SCORE_STEP;
    director.cooldown_until_ms = now_ms + BOSS_COOLDOWN_MS;
    log::info!(
        "Boss defeated: {} (next at {} pts, level {})",
        boss.kind.name(),
        director.next_boss_score,
        director.boss_level
    );

    state.hit_stop_for(BOSS_DEFEAT_HIT_STOP);
}

// === Movement patterns ===

/// Sun: horizontal patrol bouncing off the sides, gentle bob
fn patrol_bounce(boss: &mut Boss, ctx: &mut PatternContext) {
    boss.pos.x += boss.vel.x;
    if boss.pos.x < 50.0 || boss.pos.x > FIELD_WIDTH - 50.0 - boss.width {
        boss.vel.x = -boss.vel.x;
    }
    boss.pos.y = BOSS_OPERATING_Y + (ctx.now_ms / 800.0).sin() as f32 * 40.0;
}

/// Serpent: wide figure weave around the centre line
fn sinusoidal_weave(boss: &mut Boss, ctx: &mut PatternContext) {
    boss.pos.x = FIELD_WIDTH / 2.0 - boss.width / 2.0 + (ctx.now_ms / 1000.0).sin() as f32 * 250.0;
    boss.pos.y = BOSS_OPERATING_Y + (ctx.now_ms / 500.0).cos() as f32 * 30.0;
}

/// Golem: slow horizontal tracking of the player
fn track_player(boss: &mut Boss, ctx: &mut PatternContext) {
    let cx = boss.center().x;
    if cx < ctx.player.x + 15.0 {
        boss.pos.x += 1.0;
    } else if cx > ctx.player.x + 35.0 {
        boss.pos.x -= 1.0;
    }
    boss.pos.y = BOSS_OPERATING_Y + (ctx.now_ms / 1200.0).sin() as f32 * 10.0;
}

/// Bat: erratic dashes every second, damped drift in between
fn dash_and_drift(boss: &mut Boss, ctx: &mut PatternContext) {
    if boss.timer % 60 == 0 {
        boss.vel = Vec2::new(
            (ctx.rng.random::<f32>() - 0.5) * 12.0,
            (ctx.rng.random::<f32>() - 0.5) * 4.0,
        );
    }
    boss.pos += boss.vel;
    boss.pos.x = boss.pos.x.clamp(0.0, FIELD_WIDTH - boss.width);
    boss.pos.y = boss.pos.y.clamp(20.0, 200.0);
    boss.vel *= 0.95;
}

// === Fire patterns ===

/// Sun: eight-way ring, rotating with the boss angle
fn radial_burst(boss: &Boss, _ctx: &mut PatternContext, out: &mut Vec<Bullet>) {
    let origin = boss.center();
    for i in 0..8 {
        let angle = i as f32 / 8.0 * TAU + boss.angle;
        let vel = Vec2::from_angle(angle) * 4.0;
        out.push(Bullet::hostile(origin, vel, 6.0, None));
    }
}

/// Serpent: three shots fanned around the player's direction
fn aimed_spread(boss: &Boss, ctx: &mut PatternContext, out: &mut Vec<Bullet>) {
    let origin = boss.center();
    let target = ctx.player + Vec2::splat(PLAYER_SIZE / 2.0);
    let aim = (target - origin).to_angle();
    for offset in [-0.3, 0.0, 0.3] {
        let vel = Vec2::from_angle(aim + offset) * 5.0;
        out.push(Bullet::hostile(
            origin + Vec2::new(0.0, 30.0),
            vel,
            5.0,
            Some(boss.kind.color()),
        ));
    }
}

/// Golem: one slow, wide projectile straight down
fn heavy_shot(boss: &Boss, _ctx: &mut PatternContext, out: &mut Vec<Bullet>) {
    let origin = boss.center() + Vec2::new(0.0, 40.0);
    out.push(Bullet::hostile(
        origin,
        Vec2::new(0.0, 6.0),
        15.0,
        Some(boss.kind.color()),
    ));
}

/// Bat: two fast shots from the wings with slight lateral jitter
fn paired_shots(boss: &Boss, ctx: &mut PatternContext, out: &mut Vec<Bullet>) {
    let center = boss.center();
    for dx in [-20.0, 20.0] {
        let vel = Vec2::new(ctx.rng.random::<f32>() - 0.5, 7.0);
        out.push(Bullet::hostile(
            center + Vec2::new(dx, 20.0),
            vel,
            4.0,
            Some(boss.kind.color()),
        ));
    }
}
