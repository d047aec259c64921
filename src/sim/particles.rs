//! Cosmetic particles and floating text
//!
//! Spawned from the tick's [`GameEvent`]s and aged once per gameplay tick.
//! Nothing here feeds back into gameplay.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{FloatingText, GameEvent, GameState};
use crate::consts::FIELD_HEIGHT;

/// Life at or below this counts as spent (absorbs float drift from repeated decay)
pub const LIFE_EPSILON: f32 = 1e-4;

const WHITE: u32 = 0xffffff;
const DAMAGE_RED: u32 = 0xff003c;
const SLAIN_RED: u32 = 0xff0000;
const RAM_PURPLE: u32 = 0xd900ff;
const SPARK_YELLOW: u32 = 0xffffaa;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark,
    Debris,
    Ring,
    Shockwave,
    Trail,
    MuzzleFlash,
    CoreFlash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 → 0.0
    pub life: f32,
    pub decay: f32,
    /// Radius for rings/flashes, edge length for debris/trail
    pub size: f32,
    /// Growth cap for rings
    pub max_size: f32,
    pub color: u32,
    pub rotation: f32,
    pub rot_speed: f32,
    pub drag: Option<f32>,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, color: u32, decay: f32) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::ZERO,
            life: 1.0,
            decay,
            size: 1.0,
            max_size: 0.0,
            color,
            rotation: 0.0,
            rot_speed: 0.0,
            drag: None,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.life <= LIFE_EPSILON
    }

    /// Advance one tick: variant motion, then decay
    pub fn age(&mut self) {
        match self.kind {
            ParticleKind::Shockwave => self.size += 4.0,
            ParticleKind::CoreFlash => self.size += 2.0,
            ParticleKind::MuzzleFlash => {}
            ParticleKind::Ring => self.size += (self.max_size - self.size) * 0.2,
            ParticleKind::Spark => self.pos += self.vel,
            ParticleKind::Debris | ParticleKind::Trail => {
                self.pos += self.vel;
                if let Some(drag) = self.drag {
                    self.vel *= drag;
                }
                if self.kind == ParticleKind::Debris {
                    self.rotation += self.rot_speed;
                }
            }
        }
        self.life -= self.decay;
    }
}

/// Bounded particle sink; spawns past the budget are dropped
pub struct Emitter<'a> {
    particles: &'a mut Vec<Particle>,
    budget: usize,
    pub rng: &'a mut Pcg32,
}

impl<'a> Emitter<'a> {
    pub fn new(particles: &'a mut Vec<Particle>, budget: usize, rng: &'a mut Pcg32) -> Self {
        Self {
            particles,
            budget,
            rng,
        }
    }

    pub fn push(&mut self, particle: Particle) {
        if self.particles.len() < self.budget {
            self.particles.push(particle);
        }
    }

    /// Ring, core flash, sparks and debris scaled by `intensity`
    pub fn explosion(&mut self, pos: Vec2, color: u32, intensity: f32) {
        let mut ring = Particle::new(ParticleKind::Ring, pos, color, 0.08);
        ring.size = 5.0;
        ring.max_size = 40.0 * intensity;
        self.push(ring);

        let mut core = Particle::new(ParticleKind::CoreFlash, pos, WHITE, 0.15);
        core.size = 10.0 * intensity;
        self.push(core);

        let sparks = (8.0 * intensity).ceil() as usize;
        for _ in 0..sparks {
            let angle = self.rng.random::<f32>() * TAU;
            let speed = (self.rng.random::<f32>() * 8.0 + 4.0) * intensity;
            let mut spark = Particle::new(ParticleKind::Spark, pos, SPARK_YELLOW, 0.1);
            spark.vel = Vec2::from_angle(angle) * speed;
            self.push(spark);
        }

        let debris = (10.0 * intensity).ceil() as usize;
        for _ in 0..debris {
            let angle = self.rng.random::<f32>() * TAU;
            let speed = (self.rng.random::<f32>() * 4.0 + 1.0) * intensity;
            let mut chunk = Particle::new(ParticleKind::Debris, pos, color, 0.04);
            chunk.vel = Vec2::from_angle(angle) * speed;
            chunk.size = (self.rng.random::<f32>() * 5.0 + 3.0) * intensity;
            chunk.rotation = self.rng.random::<f32>();
            chunk.rot_speed = 0.1;
            chunk.drag = Some(0.95);
            self.push(chunk);
        }
    }

    pub fn shockwave(&mut self, pos: Vec2, color: u32) {
        self.push(Particle::new(ParticleKind::Shockwave, pos, color, 0.05));
    }

    pub fn muzzle_flash(&mut self, pos: Vec2) {
        let mut flash = Particle::new(ParticleKind::MuzzleFlash, pos, WHITE, 0.3);
        flash.life = 0.2;
        flash.size = 15.0;
        self.push(flash);
    }

    /// Thruster exhaust behind the ship
    pub fn trail(&mut self, player_center: Vec2, player_bottom: f32, color: u32) {
        let pos = Vec2::new(
            player_center.x + self.rng.random::<f32>() * 10.0 - 5.0,
            player_bottom - 5.0,
        );
        let mut p = Particle::new(ParticleKind::Trail, pos, color, 0.05);
        p.vel = Vec2::new(
            self.rng.random::<f32>() - 0.5,
            self.rng.random::<f32>() * 4.0 + 2.0,
        );
        p.size = self.rng.random::<f32>() * 4.0 + 2.0;
        self.push(p);
    }
}

/// Turn this tick's events into particles and annotations
pub fn spawn_from_events(state: &mut GameState) {
    let primary = state.theme.primary;
    let mut emitter = Emitter::new(&mut state.particles, state.particle_budget, &mut state.rng);
    let texts = &mut state.texts;

    for event in &state.events {
        match *event {
            GameEvent::Shot { muzzle } => emitter.muzzle_flash(muzzle),
            GameEvent::EnemyHit { pos, .. } | GameEvent::BossHit { pos } => {
                emitter.explosion(pos, WHITE, 0.5)
            }
            GameEvent::EnemyKilled { kind, pos, points } => {
                texts.push(FloatingText::new(
                    pos + Vec2::new(10.0, 0.0),
                    format!("+{points}"),
                    WHITE,
                    -2.0,
                ));
                emitter.explosion(pos + Vec2::splat(25.0), kind.color(), 1.0);
            }
            GameEvent::Rammed { pos, .. } => {
                emitter.explosion(pos + Vec2::splat(25.0), RAM_PURPLE, 1.0)
            }
            GameEvent::BossSpawned { kind } => texts.push(FloatingText::new(
                Vec2::new(400.0, 300.0),
                "ANCIENT GOD AWAKENED",
                kind.color(),
                -2.0,
            )),
            GameEvent::BossDefeated { kind, center, top } => {
                emitter.explosion(center, kind.color(), 2.0);
                emitter.shockwave(center, kind.color());
                texts.push(FloatingText::new(top, "GOD SLAIN", SLAIN_RED, -2.0));
            }
            GameEvent::PlayerDamaged { pos } => {
                emitter.explosion(pos + Vec2::splat(25.0), DAMAGE_RED, 1.0);
                texts.push(FloatingText::new(
                    pos - Vec2::new(0.0, 20.0),
                    "SYSTEM DAMAGE",
                    DAMAGE_RED,
                    -1.0,
                ));
            }
            GameEvent::PowerUp { pos } => {
                texts.push(FloatingText::new(
                    pos - Vec2::new(0.0, 30.0),
                    "POWER UP +1000",
                    primary,
                    -1.0,
                ));
                emitter.shockwave(pos + Vec2::splat(25.0), WHITE);
            }
            GameEvent::ComboBroken { pos } => texts.push(FloatingText::new(
                Vec2::new(pos.x, FIELD_HEIGHT - 20.0),
                "COMBO BROKEN",
                DAMAGE_RED,
                -1.0,
            )),
            GameEvent::BossFired { .. } | GameEvent::RunEnded { .. } => {}
        }
    }
}

/// Age every particle and text, then purge the spent ones
pub fn age(state: &mut GameState) {
    for p in &mut state.particles {
        p.age();
    }
    state.particles.retain(|p| !p.is_spent());

    for t in &mut state.texts {
        t.pos.y += t.vy;
        t.life -= 0.02;
        if t.scale < 1.0 {
            t.scale = (t.scale + 0.2).min(1.0);
        }
    }
    state.texts.retain(|t| t.life > LIFE_EPSILON);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::BossKind;
    use crate::sim::state::EnemyKind;
    use proptest::prelude::*;

    const ALL_KINDS: [ParticleKind; 7] = [
        ParticleKind::Spark,
        ParticleKind::Debris,
        ParticleKind::Ring,
        ParticleKind::Shockwave,
        ParticleKind::Trail,
        ParticleKind::MuzzleFlash,
        ParticleKind::CoreFlash,
    ];

    fn lone_particle(kind: ParticleKind) -> GameState {
        let mut state = GameState::new(1);
        let mut p = Particle::new(kind, Vec2::new(100.0, 100.0), WHITE, 0.1);
        p.vel = Vec2::new(1.0, -1.0);
        p.max_size = 40.0;
        p.drag = Some(0.95);
        state.particles.push(p);
        state
    }

    #[test]
    fn test_purged_after_exactly_ten_ticks() {
        for kind in ALL_KINDS {
            let mut state = lone_particle(kind);
            for _ in 0..9 {
                age(&mut state);
            }
            assert_eq!(state.particles.len(), 1, "{kind:?} gone too early");
            age(&mut state);
            assert!(state.particles.is_empty(), "{kind:?} outlived its life");
        }
    }

    #[test]
    fn test_ring_grows_toward_cap() {
        let mut state = lone_particle(ParticleKind::Ring);
        state.particles[0].size = 5.0;
        for _ in 0..8 {
            let before = state.particles[0].size;
            age(&mut state);
            let after = state.particles[0].size;
            assert!(after > before && after < 40.0);
        }
    }

    #[test]
    fn test_flash_does_not_move() {
        let mut state = lone_particle(ParticleKind::MuzzleFlash);
        age(&mut state);
        assert_eq!(state.particles[0].pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_debris_drag_and_spin() {
        let mut state = lone_particle(ParticleKind::Debris);
        state.particles[0].rot_speed = 0.1;
        age(&mut state);
        let p = &state.particles[0];
        assert_eq!(p.pos, Vec2::new(101.0, 99.0));
        assert!((p.vel.x - 0.95).abs() < 1e-6);
        assert!((p.rotation - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_explosion_scales_with_intensity() {
        let mut rng = Pcg32::new(1, 1);
        let mut small = Vec::new();
        Emitter::new(&mut small, usize::MAX, &mut rng).explosion(Vec2::ZERO, WHITE, 1.0);
        let mut big = Vec::new();
        Emitter::new(&mut big, usize::MAX, &mut rng).explosion(Vec2::ZERO, WHITE, 2.0);

        // ring + core + 8 sparks + 10 debris
        assert_eq!(small.len(), 20);
        assert_eq!(big.len(), 38);
        let ring = big.iter().find(|p| p.kind == ParticleKind::Ring).map(|p| p.max_size);
        assert_eq!(ring, Some(80.0));
    }

    #[test]
    fn test_budget_drops_overflow() {
        let mut rng = Pcg32::new(1, 1);
        let mut particles = Vec::new();
        let mut emitter = Emitter::new(&mut particles, 5, &mut rng);
        emitter.explosion(Vec2::ZERO, WHITE, 2.0);
        emitter.shockwave(Vec2::ZERO, WHITE);
        assert_eq!(particles.len(), 5);
    }

    #[test]
    fn test_events_spawn_annotations() {
        let mut state = GameState::new(5);
        state.events = vec![
            GameEvent::EnemyKilled {
                kind: EnemyKind::Tank,
                pos: Vec2::new(100.0, 100.0),
                points: 90,
            },
            GameEvent::BossSpawned {
                kind: BossKind::Serpent,
            },
            GameEvent::ComboBroken {
                pos: Vec2::new(300.0, 601.0),
            },
        ];
        spawn_from_events(&mut state);

        let labels: Vec<&str> = state.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(labels, ["+90", "ANCIENT GOD AWAKENED", "COMBO BROKEN"]);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_text_fades_out() {
        let mut state = GameState::new(5);
        state.texts.push(FloatingText::new(Vec2::new(0.0, 100.0), "hi", WHITE, -2.0));
        age(&mut state);
        assert_eq!(state.texts[0].pos.y, 98.0);
        assert!((state.texts[0].scale - 0.2).abs() < 1e-6);
        for _ in 0..60 {
            age(&mut state);
        }
        assert!(state.texts.is_empty());
    }

    proptest! {
        #[test]
        fn lifetime_is_ceil_of_life_over_decay(steps in 1u32..60, idx in 0usize..7) {
            let decay = 1.0 / steps as f32;
            let mut p = Particle::new(ALL_KINDS[idx], Vec2::ZERO, WHITE, decay);
            p.vel = Vec2::ONE;
            let mut ticks = 0;
            while !p.is_spent() {
                p.age();
                ticks += 1;
                prop_assert!(ticks <= steps);
            }
            prop_assert_eq!(ticks, steps);
        }
    }
}
