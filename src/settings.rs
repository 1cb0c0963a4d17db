//! Player preferences
//!
//! Stored inside the save data rather than under their own key.

use serde::{Deserialize, Serialize};

use crate::sim::Difficulty;

/// Audio preferences and the preferred difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Difficulty picked on the menu
    pub difficulty: Difficulty,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.5,
            sfx_volume: 0.7,
            muted: false,
            difficulty: Difficulty::Normal,
        }
    }
}

impl Settings {
    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = clamp_volume(volume);
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = clamp_volume(volume);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Music gain after mute
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }

    /// SFX gain after mute
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    /// Re-clamp values that came from disk
    pub fn sanitize(&mut self) {
        self.music_volume = clamp_volume(self.music_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamped() {
        let mut settings = Settings::default();
        settings.set_music_volume(1.7);
        settings.set_sfx_volume(-0.2);
        assert_eq!(settings.music_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        settings.set_sfx_volume(f32::NAN);
        assert_eq!(settings.sfx_volume, 0.0);
    }

    #[test]
    fn test_mute() {
        let mut settings = Settings::default();
        assert!(settings.toggle_mute());
        assert_eq!(settings.effective_music_volume(), 0.0);
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert!(!settings.toggle_mute());
        assert_eq!(settings.effective_sfx_volume(), 0.7);
    }

    #[test]
    fn test_sanitize_loaded_values() {
        let mut settings: Settings =
            serde_json::from_str(r#"{"music_volume": 4.0, "difficulty": "hard"}"#).unwrap();
        settings.sanitize();
        assert_eq!(settings.music_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.7);
        assert_eq!(settings.difficulty, Difficulty::Hard);
    }
}
