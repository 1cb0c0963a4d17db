//! Audio sink using the Web Audio API
//!
//! Every `SoundCue` is synthesized from a handful of oscillator voices, so no
//! sound files ship with the game.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::{MusicCue, SoundCue};

/// One oscillator in a sound
#[derive(Debug, Clone, Copy)]
struct Voice {
    wave: OscillatorType,
    freq: f32,
    /// Exponential sweep target
    sweep_to: Option<f32>,
    gain: f32,
    /// Offset from now (s)
    delay: f64,
    length: f64,
}

impl Voice {
    fn new(wave: OscillatorType, freq: f32, gain: f32, length: f64) -> Self {
        Self {
            wave,
            freq,
            sweep_to: None,
            gain,
            delay: 0.0,
            length,
        }
    }

    fn sweep(mut self, to: f32) -> Self {
        self.sweep_to = Some(to);
        self
    }

    fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Notes played one after another
fn arpeggio(wave: OscillatorType, freqs: &[f32], step: f64, gain: f32, length: f64) -> Vec<Voice> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, f)| Voice::new(wave, *f, gain, length).after(i as f64 * step))
        .collect()
}

fn voices_for(cue: &SoundCue) -> Vec<Voice> {
    use OscillatorType::*;
    match cue {
        SoundCue::Jump => vec![Voice::new(Square, 300.0, 0.2, 0.15).sweep(600.0)],
        SoundCue::Land => vec![Voice::new(Sine, 120.0, 0.3, 0.1).sweep(60.0)],
        SoundCue::Slide => vec![Voice::new(Sawtooth, 400.0, 0.15, 0.25).sweep(120.0)],
        SoundCue::Hit => vec![
            Voice::new(Sawtooth, 150.0, 0.4, 0.3).sweep(40.0),
            Voice::new(Square, 900.0, 0.15, 0.08),
        ],
        SoundCue::CollectWater => arpeggio(Sine, &[600.0, 800.0, 1000.0], 0.08, 0.25, 0.15),
        SoundCue::CollectChili => vec![
            Voice::new(Sawtooth, 200.0, 0.3, 0.4).sweep(1200.0),
            Voice::new(Square, 100.0, 0.2, 0.3).sweep(400.0),
        ],
        SoundCue::CollectCoin => arpeggio(Square, &[990.0, 1320.0], 0.07, 0.2, 0.12),
        SoundCue::Smash => vec![
            Voice::new(Sawtooth, 100.0, 0.5, 0.4).sweep(30.0),
            Voice::new(Square, 1500.0, 0.2, 0.1),
        ],
        SoundCue::NearMiss => vec![Voice::new(Triangle, 800.0, 0.15, 0.12).sweep(1400.0)],
        SoundCue::LevelComplete => arpeggio(Triangle, &[400.0, 500.0, 600.0, 800.0], 0.1, 0.3, 0.4),
        SoundCue::GameOver => arpeggio(Sine, &[400.0, 350.0, 300.0, 200.0], 0.2, 0.3, 0.3),
        SoundCue::Script(tag) => script_voices(tag),
    }
}

/// Sounds named by dialogue lines
fn script_voices(tag: &str) -> Vec<Voice> {
    use OscillatorType::*;
    match tag {
        "cash_register" => vec![
            Voice::new(Square, 2000.0, 0.15, 0.05),
            Voice::new(Sine, 1500.0, 0.25, 0.4).after(0.06),
        ],
        "coins_jingle" => arpeggio(Triangle, &[1800.0, 2200.0, 1900.0, 2400.0], 0.05, 0.15, 0.1),
        "dramatic_sting" => arpeggio(Sawtooth, &[220.0, 208.0, 196.0], 0.25, 0.3, 0.5),
        "security_whistle" => vec![
            Voice::new(Sine, 2800.0, 0.25, 0.2),
            Voice::new(Sine, 2800.0, 0.25, 0.5).after(0.25),
        ],
        "victory_jingle" => arpeggio(Triangle, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08, 0.25, 0.25),
        "glizzy_bite" => vec![Voice::new(Square, 180.0, 0.3, 0.08).sweep(90.0)],
        "crowd_cheer" => vec![
            Voice::new(Sawtooth, 300.0, 0.1, 1.2).sweep(500.0),
            Voice::new(Sawtooth, 450.0, 0.1, 1.2).sweep(700.0),
        ],
        other => {
            log::debug!("No synth for sound '{}'", other);
            Vec::new()
        }
    }
}

/// Plays simulation sound cues
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music_volume: f32,
    sfx_volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
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
            music_volume: 0.0,
            sfx_volume: 0.0,
        }
    }

    /// Pick up volume and mute from the player's settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.music_volume = settings.effective_music_volume();
        self.sfx_volume = settings.effective_sfx_volume();
    }

    /// Resume after a user gesture
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn play(&self, cue: &SoundCue) {
        self.play_voices(&voices_for(cue), self.sfx_volume);
    }

    /// Level music is not played; only the ending stingers are synthesized
    pub fn music(&self, cue: &MusicCue) {
        match cue {
            MusicCue::Ending { happy: true } => {
                self.play_voices(&voices_for(&SoundCue::Script("victory_jingle".into())), self.music_volume)
            }
            MusicCue::Ending { happy: false } => {
                self.play_voices(&voices_for(&SoundCue::Script("dramatic_sting".into())), self.music_volume)
            }
            other => log::debug!("Music cue {:?}", other),
        }
    }

    fn play_voices(&self, voices: &[Voice], volume: f32) {
        if volume <= 0.0 || voices.is_empty() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        let now = ctx.current_time();
        for voice in voices {
            self.play_voice(ctx, voice, now, volume);
        }
    }

    fn create_osc(&self, ctx: &AudioContext, voice: &Voice) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(voice.wave);
        osc.frequency().set_value(voice.freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        Some((osc, gain))
    }

    fn play_voice(&self, ctx: &AudioContext, voice: &Voice, now: f64, volume: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, voice) else {
            return;
        };
        let t = now + voice.delay;
        let end = t + voice.length;

        gain.gain().set_value_at_time(voice.gain * volume, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        if let Some(to) = voice.sweep_to {
            osc.frequency().set_value_at_time(voice.freq, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(to, end).ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(end + 0.05).ok();
    }
}
