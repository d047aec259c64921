//! Entity store and core simulation types
//!
//! Every piece of mutable run state lives in [`GameState`]. Subsystems take it
//! by `&mut` for the duration of a tick; nothing else holds onto it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossDirector, BossKind};
use super::combo::ComboState;
use super::particles::Particle;
use crate::box_center;
use crate::consts::*;
use crate::theme::Theme;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended; the store is inert
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Hit while unshielded
    Destroyed,
    /// External exit request
    Exited,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub base_speed: f32,
    /// Cosmetic bank angle, smoothed from lateral input
    pub lean: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            size: PLAYER_SIZE,
            base_speed: PLAYER_BASE_SPEED,
            lean: 0.0,
        }
    }
}

impl Player {
    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }

    /// Movement speed including the power bonus
    pub fn speed(&self, power_level: u8) -> f32 {
        self.base_speed + (power_level as f32 * POWER_SPEED_STEP).min(POWER_SPEED_CAP)
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Hostile,
}

/// Visual type tag for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    Main,
    Side,
    Boss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: BulletOwner,
    pub kind: BulletKind,
    /// Radius used by the hostile-vs-player test
    pub size: f32,
    /// Tint override (hostile bullets); player bullets take the theme
    pub color: Option<u32>,
    pub active: bool,
}

impl Bullet {
    pub fn player(pos: Vec2, vel: Vec2, kind: BulletKind) -> Self {
        Self {
            pos,
            vel,
            owner: BulletOwner::Player,
            kind,
            size: 5.0,
            color: None,
            active: true,
        }
    }

    pub fn hostile(pos: Vec2, vel: Vec2, size: f32, color: Option<u32>) -> Self {
        Self {
            pos,
            vel,
            owner: BulletOwner::Hostile,
            kind: BulletKind::Boss,
            size,
            color,
            active: true,
        }
    }

    pub fn is_player(&self) -> bool {
        self.owner == BulletOwner::Player
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Standard,
    Tank,
    Stalker,
    Phantom,
}

impl EnemyKind {
    /// Weighted pick from a uniform roll in [0, 1)
    pub fn from_roll(roll: f32) -> Self {
        if roll > 0.88 {
            EnemyKind::Tank
        } else if roll > 0.75 {
            EnemyKind::Stalker
        } else if roll > 0.6 {
            EnemyKind::Phantom
        } else {
            EnemyKind::Standard
        }
    }

    pub fn max_hp(self) -> i32 {
        match self {
            EnemyKind::Tank => 5,
            _ => 1,
        }
    }

    /// Base score for a bullet kill, multiplied by the combo
    pub fn score_base(self) -> u64 {
        match self {
            EnemyKind::Tank => TANK_KILL_BASE,
            _ => STANDARD_KILL_BASE,
        }
    }

    /// Explosion tint on death
    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Tank => 0x00ffcc,
            EnemyKind::Stalker => 0xff0055,
            EnemyKind::Standard | EnemyKind::Phantom => 0xd900ff,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hp: i32,
    /// Top-left corner
    pub pos: Vec2,
    /// Fall speed (px/tick)
    pub speed: f32,
    /// Pop-in scale, 0 → 1
    pub scale: f32,
    /// Ticks of white flash left after a non-lethal hit
    pub hit_flash: u32,
    /// Set once when the enemy crosses the escape line
    pub escaped: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, speed: f32) -> Self {
        Self {
            kind,
            hp: kind.max_hp(),
            pos,
            speed,
            scale: 0.0,
            hit_flash: 0,
            escaped: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, ENEMY_SIZE)
    }
}

/// Weapon upgrade pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerDrop {
    pub pos: Vec2,
    /// Cosmetic bob phase
    pub float_phase: f32,
    pub rotation: f32,
    pub consumed: bool,
}

impl PowerDrop {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            float_phase: 0.0,
            rotation: 0.0,
            consumed: false,
        }
    }
}

/// Cosmetic text annotation (score deltas, status messages)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub life: f32,
    /// Scale-in factor, 0 → 1
    pub scale: f32,
    /// Vertical drift per tick
    pub vy: f32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, color: u32, vy: f32) -> Self {
        Self {
            pos,
            text: text.into(),
            color,
            life: 1.0,
            scale: 0.0,
            vy,
        }
    }
}

/// Background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub size: f32,
    pub brightness: f32,
}

/// Things that happened during a tick
///
/// Emitted by collisions and the boss director, consumed afterwards by the
/// particle system and the audio cue selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Player fired; `muzzle` is the flash position
    Shot { muzzle: Vec2 },
    /// Boss fired a volley
    BossFired { kind: BossKind },
    /// Player bullet struck an enemy (lethal or not)
    EnemyHit { pos: Vec2, lethal: bool },
    /// Enemy destroyed by a bullet; `pos` is the enemy's top-left
    EnemyKilled {
        kind: EnemyKind,
        pos: Vec2,
        points: u64,
    },
    /// Enemy destroyed by ramming it while powered up
    Rammed { pos: Vec2, points: u64 },
    /// Player bullet struck the boss
    BossHit { pos: Vec2 },
    BossSpawned { kind: BossKind },
    /// `center` is the boss centre, `top` its top edge midpoint
    BossDefeated {
        kind: BossKind,
        center: Vec2,
        top: Vec2,
    },
    /// Power level absorbed a hostile hit; `pos` is the player's top-left
    PlayerDamaged { pos: Vec2 },
    /// Drop collected; `pos` is the player's top-left
    PowerUp { pos: Vec2 },
    /// Enemy escaped with a live combo
    ComboBroken { pos: Vec2 },
    RunEnded { reason: EndReason, score: u64 },
}

/// The entity store: complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    pub score: u64,
    /// Gameplay ticks processed (hit-stop ticks excluded)
    pub frame_count: u64,
    /// Remaining freeze ticks
    pub hit_stop: u32,
    /// Timestamp of the latest tick
    pub now_ms: f64,

    pub player: Player,
    /// Weapon power level, 0..=3
    pub power_level: u8,
    pub power_up_end_ms: f64,

    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub drops: Vec<PowerDrop>,
    pub boss: Option<Boss>,
    pub director: BossDirector,
    pub combo: ComboState,

    /// Cosmetic state (no gameplay feedback)
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub stars: Vec<Star>,
    pub theme: Theme,
    pub particle_budget: usize,

    pub last_enemy_spawn_ms: f64,
    pub last_drop_spawn_ms: f64,

    /// Events raised by the current tick
    pub events: Vec<GameEvent>,
}

/// Default cap on live particles
pub const DEFAULT_PARTICLE_BUDGET: usize = 1200;

impl GameState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            end_reason: None,
            score: 0,
            frame_count: 0,
            hit_stop: 0,
            now_ms: 0.0,
            player: Player::default(),
            power_level: 0,
            power_up_end_ms: 0.0,
            bullets: Vec::new(),
            enemies: Vec::new(),
            drops: Vec::new(),
            boss: None,
            director: BossDirector::default(),
            combo: ComboState::default(),
            particles: Vec::new(),
            texts: Vec::new(),
            stars: Vec::new(),
            theme: Theme::default(),
            particle_budget: DEFAULT_PARTICLE_BUDGET,
            last_enemy_spawn_ms: 0.0,
            last_drop_spawn_ms: 0.0,
            events: Vec::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_particle_budget(mut self, budget: usize) -> Self {
        self.particle_budget = budget;
        self
    }

    /// Populate the background starfield
    pub fn with_starfield(mut self) -> Self {
        self.stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(
                    self.rng.random_range(0.0..FIELD_WIDTH),
                    self.rng.random_range(0.0..FIELD_HEIGHT),
                ),
                speed: self.rng.random_range(0.5..3.0),
                size: self.rng.random_range(1.0..3.0),
                brightness: self.rng.random_range(0.2..1.0),
            })
            .collect();
        self
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn boss_active(&self) -> bool {
        self.boss.is_some()
    }

    /// Record an event for this tick
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Add score (ignored once the run is over)
    pub fn add_score(&mut self, amount: u64) {
        if self.is_running() {
            self.score += amount;
        }
    }

    /// Freeze gameplay for `ticks`, keeping any longer freeze already queued
    pub fn hit_stop_for(&mut self, ticks: u32) {
        self.hit_stop = self.hit_stop.max(ticks);
    }

    /// End the run. Events raised earlier in the tick are dropped so no cues
    /// or particles follow the termination; entities are left as they were.
    pub fn terminate(&mut self, reason: EndReason) {
        if !self.is_running() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        self.events.clear();
        self.events.push(GameEvent::RunEnded {
            reason,
            score: self.score,
        });
        log::info!("Run ended ({reason:?}) with score {}", self.score);
    }
}
