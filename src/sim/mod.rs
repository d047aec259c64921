//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, the same inputs and
//! the same timestamps, a run replays identically:
//! - One tick per rendered frame, timestamps supplied by the caller
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod collision;
pub mod combo;
pub mod movement;
pub mod particles;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use boss::{Boss, BossDirector, BossKind, BossPhase, DirectorState};
pub use combo::{ComboState, Rank};
pub use particles::{Particle, ParticleKind};
pub use snapshot::{BossHud, Hud, Snapshot};
pub use state::{
    Bullet, BulletKind, BulletOwner, EndReason, Enemy, EnemyKind, FloatingText, GameEvent,
    GamePhase, GameState, Player, PowerDrop, Star,
};
pub use tick::{TickInput, end_run, tick};
