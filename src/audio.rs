//! Audio cues and music
//!
//! Procedurally generated sound effects - no external files needed! The cue
//! table and the event mapping are plain data so they can be tested natively;
//! only [`AudioManager`] touches Web Audio.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player or boss fired
    Shoot,
    /// Non-lethal hit on an enemy, or a hit absorbed by the shield
    Hit,
    /// Ram kill, boss arrival or boss defeat
    Explosion,
    /// Power drop collected
    PowerUp,
    /// Bullet kill; pitch rises with the combo
    ComboStep,
    /// Enemy escaped with a live combo
    ComboBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator voice with an exponential gain release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    /// Start frequency (Hz)
    pub freq: f32,
    /// Exponential slide target reached at the end of the tone
    pub slide_to: Option<f32>,
    /// Seconds
    pub duration: f32,
    pub gain: f32,
    /// Upper bound of a random detune in cents (0 = none)
    pub detune_max: f32,
}

impl Tone {
    const fn new(waveform: Waveform, freq: f32, slide_to: Option<f32>, duration: f32, gain: f32) -> Self {
        Self {
            waveform,
            freq,
            slide_to,
            duration,
            gain,
            detune_max: 0.0,
        }
    }

    const fn detuned(mut self, cents: f32) -> Self {
        self.detune_max = cents;
        self
    }
}

/// Voices for an effect. `combo` only affects [`SoundEffect::ComboStep`].
pub fn cue(effect: SoundEffect, combo: u32) -> Vec<Tone> {
    use Waveform::*;
    match effect {
        SoundEffect::Shoot => vec![
            Tone::new(Square, 800.0, Some(200.0), 0.1, 0.05),
            Tone::new(Triangle, 200.0, Some(50.0), 0.1, 0.1),
        ],
        SoundEffect::Explosion => vec![
            Tone::new(Sawtooth, 100.0, Some(10.0), 0.4, 0.2),
            Tone::new(Square, 50.0, Some(10.0), 0.2, 0.1).detuned(1000.0),
        ],
        SoundEffect::Hit => vec![Tone::new(Sawtooth, 200.0, Some(50.0), 0.1, 0.1).detuned(100.0)],
        SoundEffect::PowerUp => vec![
            Tone::new(Sine, 400.0, Some(1200.0), 0.4, 0.1),
            Tone::new(Triangle, 405.0, Some(1205.0), 0.4, 0.05),
        ],
        SoundEffect::ComboStep => vec![Tone::new(Sine, 800.0 + combo as f32 * 50.0, None, 0.1, 0.1)],
        SoundEffect::ComboBreak => vec![Tone::new(Sawtooth, 300.0, Some(100.0), 0.3, 0.1)],
    }
}

/// Which effect, if any, a simulation event plays
pub fn effect_for_event(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::Shot { .. } | GameEvent::BossFired { .. } => Some(SoundEffect::Shoot),
        GameEvent::EnemyHit { lethal: false, .. } | GameEvent::PlayerDamaged { .. } => {
            Some(SoundEffect::Hit)
        }
        GameEvent::EnemyKilled { .. } => Some(SoundEffect::ComboStep),
        GameEvent::Rammed { .. } | GameEvent::BossSpawned { .. } | GameEvent::BossDefeated { .. } => {
            Some(SoundEffect::Explosion)
        }
        GameEvent::PowerUp { .. } => Some(SoundEffect::PowerUp),
        GameEvent::ComboBroken { .. } => Some(SoundEffect::ComboBreak),
        GameEvent::EnemyHit { lethal: true, .. }
        | GameEvent::BossHit { .. }
        | GameEvent::RunEnded { .. } => None,
    }
}

/// Background bass loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Normal,
    Boss,
}

impl MusicTrack {
    pub fn notes(self) -> &'static [f32; 4] {
        match self {
            MusicTrack::Normal => &[55.0, 48.99, 65.41, 73.42],
            MusicTrack::Boss => &[43.65, 43.65, 38.89, 48.99],
        }
    }

    pub fn waveform(self) -> Waveform {
        match self {
            MusicTrack::Normal => Waveform::Sawtooth,
            MusicTrack::Boss => Waveform::Square,
        }
    }

    /// Seconds between scheduled notes
    pub fn step_secs(self) -> f64 {
        match self {
            MusicTrack::Normal => 0.125,
            MusicTrack::Boss => 0.1,
        }
    }

    /// Gain release time per note
    pub fn release_secs(self) -> f64 {
        match self {
            MusicTrack::Normal => 0.45,
            MusicTrack::Boss => 0.2,
        }
    }

    /// Note playing at audio-clock time `t` (seconds)
    pub fn note_at(self, t: f64) -> f32 {
        let rate = match self {
            MusicTrack::Normal => 2.0,
            MusicTrack::Boss => 4.0,
        };
        let notes = self.notes();
        let idx = (t * rate).floor() as usize % notes.len();
        notes[idx]
    }
}

/// What the music should do in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    Play(MusicTrack),
    Stop,
}

pub fn music_for_event(event: &GameEvent) -> Option<MusicCommand> {
    match event {
        GameEvent::BossSpawned { .. } => Some(MusicCommand::Play(MusicTrack::Boss)),
        GameEvent::BossDefeated { .. } => Some(MusicCommand::Play(MusicTrack::Normal)),
        GameEvent::RunEnded { .. } => Some(MusicCommand::Stop),
        _ => None,
    }
}

/// Volume and toggle state shared by both manager backends
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mix {
    master: f32,
    sfx: f32,
    music: f32,
    music_enabled: bool,
    muted: bool,
}

impl Default for Mix {
    fn default() -> Self {
        Self {
            master: 0.8,
            sfx: 1.0,
            music: 0.6,
            music_enabled: true,
            muted: false,
        }
    }
}

impl Mix {
    fn sfx_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master * self.sfx }
    }

    fn music_volume(&self) -> f32 {
        if self.muted || !self.music_enabled {
            0.0
        } else {
            self.master * self.music
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod backend {
    use web_sys::{AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

    use super::{Mix, MusicTrack, Tone, Waveform};

    const MUSIC_GAIN: f32 = 0.15;
    const MUSIC_CUTOFF_HZ: f32 = 600.0;

    fn oscillator_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }

    /// Web Audio output. Every failure is swallowed; audio is best-effort.
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        pub(super) mix: Mix,
        pub(super) music: Option<MusicTrack>,
        next_note_at: f64,
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                mix: Mix::default(),
                music: None,
                next_note_at: 0.0,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Suspend output while the page is hidden
        pub fn suspend(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.suspend();
            }
        }

        pub(super) fn play_tones(&self, tones: &[Tone]) {
            let vol = self.mix.sfx_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in tones {
                if self.play_tone(ctx, tone, vol).is_none() {
                    log::warn!("Dropped {:?} tone", tone.waveform);
                }
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone, vol: f32) -> Option<()> {
            let (osc, gain) = self.create_osc(ctx, tone.freq, oscillator_type(tone.waveform))?;
            let t = ctx.current_time();
            let end = t + tone.duration as f64;

            osc.frequency().set_value_at_time(tone.freq, t).ok()?;
            if let Some(target) = tone.slide_to {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(target, end)
                    .ok()?;
            }
            if tone.detune_max > 0.0 {
                osc.detune()
                    .set_value(js_sys::Math::random() as f32 * tone.detune_max);
            }
            gain.gain().set_value_at_time(tone.gain * vol, t).ok()?;
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(end).ok()?;
            Some(())
        }

        pub(super) fn restart_music(&mut self) {
            self.next_note_at = 0.0;
        }

        /// Schedule the next bass note if its step has come round
        pub fn update_music(&mut self) {
            let Some(track) = self.music else { return };
            let vol = self.mix.music_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() != web_sys::AudioContextState::Running {
                return;
            }

            let now = ctx.current_time();
            if now < self.next_note_at {
                return;
            }
            self.next_note_at = now + track.step_secs();
            if self.play_bass(ctx, track, now, vol).is_none() {
                log::warn!("Dropped {track:?} bass note");
            }
        }

        fn play_bass(&self, ctx: &AudioContext, track: MusicTrack, t: f64, vol: f32) -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let filter = ctx.create_biquad_filter().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(oscillator_type(track.waveform()));
            osc.frequency().set_value_at_time(track.note_at(t), t).ok()?;
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value(MUSIC_CUTOFF_HZ);

            osc.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            gain.gain().set_value_at_time(MUSIC_GAIN * vol, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + track.release_secs())
                .ok()?;

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(t + 0.5).ok()?;
            Some(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use super::{Mix, MusicTrack, Tone};

    /// Silent stand-in for native builds; keeps the same API and state
    pub struct AudioManager {
        pub(super) mix: Mix,
        pub(super) music: Option<MusicTrack>,
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self {
                mix: Mix::default(),
                music: None,
            }
        }

        pub fn resume(&self) {}

        pub fn suspend(&self) {}

        pub(super) fn play_tones(&self, tones: &[Tone]) {
            if self.mix.sfx_volume() > 0.0 {
                log::trace!("{} tone(s)", tones.len());
            }
        }

        pub(super) fn restart_music(&mut self) {}

        pub fn update_music(&mut self) {}
    }
}

pub use backend::AudioManager;

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.mix.master = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.mix.sfx = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.mix.music = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.mix.muted = muted;
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.mix.music_enabled = enabled;
    }

    pub fn is_muted(&self) -> bool {
        self.mix.muted
    }

    pub fn music(&self) -> Option<MusicTrack> {
        self.music
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect, combo: u32) {
        self.play_tones(&cue(effect, combo));
    }

    pub fn start_music(&mut self, track: MusicTrack) {
        if self.music != Some(track) {
            log::debug!("Music: {track:?}");
        }
        self.music = Some(track);
        self.restart_music();
    }

    pub fn stop_music(&mut self) {
        self.music = None;
    }

    /// React to one tick's events: effects plus music switches
    pub fn handle_events(&mut self, events: &[GameEvent], combo: u32) {
        for event in events {
            if let Some(effect) = effect_for_event(event) {
                self.play(effect, combo);
            }
            match music_for_event(event) {
                Some(MusicCommand::Play(track)) => self.start_music(track),
                Some(MusicCommand::Stop) => self.stop_music(),
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BossKind, EndReason, EnemyKind};
    use glam::Vec2;

    #[test]
    fn test_combo_pitch_rises() {
        assert_eq!(cue(SoundEffect::ComboStep, 0)[0].freq, 800.0);
        assert_eq!(cue(SoundEffect::ComboStep, 12)[0].freq, 1400.0);
        // Other effects ignore the combo
        assert_eq!(cue(SoundEffect::Shoot, 0), cue(SoundEffect::Shoot, 99));
    }

    #[test]
    fn test_cue_table_shape() {
        let shoot = cue(SoundEffect::Shoot, 0);
        assert_eq!(shoot.len(), 2);
        assert_eq!(shoot[0].waveform, Waveform::Square);
        assert_eq!(shoot[0].slide_to, Some(200.0));

        let boom = cue(SoundEffect::Explosion, 0);
        assert_eq!(boom[1].detune_max, 1000.0);
        assert_eq!(cue(SoundEffect::Hit, 0)[0].detune_max, 100.0);
        assert_eq!(cue(SoundEffect::ComboBreak, 0)[0].duration, 0.3);
    }

    #[test]
    fn test_event_mapping() {
        let killed = GameEvent::EnemyKilled {
            kind: EnemyKind::Tank,
            pos: Vec2::ZERO,
            points: 30,
        };
        assert_eq!(effect_for_event(&killed), Some(SoundEffect::ComboStep));
        assert_eq!(
            effect_for_event(&GameEvent::EnemyHit {
                pos: Vec2::ZERO,
                lethal: false
            }),
            Some(SoundEffect::Hit)
        );
        assert_eq!(
            effect_for_event(&GameEvent::EnemyHit {
                pos: Vec2::ZERO,
                lethal: true
            }),
            None
        );
        assert_eq!(
            effect_for_event(&GameEvent::ComboBroken { pos: Vec2::ZERO }),
            Some(SoundEffect::ComboBreak)
        );
        assert_eq!(effect_for_event(&GameEvent::BossHit { pos: Vec2::ZERO }), None);
    }

    #[test]
    fn test_music_follows_boss() {
        let mut audio = AudioManager::new();
        audio.start_music(MusicTrack::Normal);
        audio.handle_events(&[GameEvent::BossSpawned { kind: BossKind::Bat }], 0);
        assert_eq!(audio.music(), Some(MusicTrack::Boss));

        audio.handle_events(
            &[GameEvent::BossDefeated {
                kind: BossKind::Bat,
                center: Vec2::ZERO,
                top: Vec2::ZERO,
            }],
            0,
        );
        assert_eq!(audio.music(), Some(MusicTrack::Normal));

        audio.handle_events(
            &[GameEvent::RunEnded {
                reason: EndReason::Destroyed,
                score: 0,
            }],
            0,
        );
        assert_eq!(audio.music(), None);
    }

    #[test]
    fn test_bass_sequence() {
        assert_eq!(MusicTrack::Normal.note_at(0.0), 55.0);
        assert_eq!(MusicTrack::Normal.note_at(0.5), 48.99);
        assert_eq!(MusicTrack::Normal.note_at(2.0), 55.0);
        assert_eq!(MusicTrack::Boss.note_at(0.5), 38.89);
    }

    #[test]
    fn test_mix() {
        let mut mix = Mix::default();
        assert!((mix.sfx_volume() - 0.8).abs() < 1e-6);
        mix.music_enabled = false;
        assert_eq!(mix.music_volume(), 0.0);
        mix.muted = true;
        assert_eq!(mix.sfx_volume(), 0.0);
    }
}
