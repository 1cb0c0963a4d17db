//! Keyboard and touch mapping
//!
//! The simulation never sees key codes or coordinates, only `TickInput` flags.

use crate::sim::{Difficulty, GamePhase, TickInput};

/// Longest press that still counts as a tap (ms)
pub const TAP_MAX_MS: f64 = 300.0;
/// Finger travel allowed for a tap (px)
pub const TAP_MAX_TRAVEL: f32 = 30.0;
/// Minimum travel for a swipe (px)
pub const SWIPE_MIN_TRAVEL: f32 = 50.0;

/// Map a `KeyboardEvent.key` value into intents for the current phase
pub fn apply_key(key: &str, phase: GamePhase, waiting_for_order: bool, input: &mut TickInput) {
    match phase {
        GamePhase::CutscenePlaying => {
            if waiting_for_order {
                if matches!(key, "e" | "E") {
                    input.interact = true;
                }
            } else {
                // Any key skips ahead
                input.advance_dialogue = true;
            }
        }
        GamePhase::Gameplay | GamePhase::Paused => match key {
            "Escape" => input.pause = true,
            "ArrowLeft" | "a" | "A" => input.move_left = true,
            "ArrowRight" | "d" | "D" => input.move_right = true,
            "ArrowUp" | "w" | "W" | " " => input.jump = true,
            "ArrowDown" | "s" | "S" => input.slide = true,
            "+" | "=" => input.skip_level = true,
            _ => {}
        },
        _ => {}
    }
}

/// Volume change per key press
pub const VOLUME_STEP: f32 = 0.1;

/// Title-screen commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuCommand {
    Start,
    SelectDifficulty(Difficulty),
    /// Relative music volume change
    MusicVolume(f32),
    /// Relative sound effect volume change
    SfxVolume(f32),
    ToggleMute,
    ResetProgress,
}

/// Map a `KeyboardEvent.key` value on the title screen
pub fn menu_command(key: &str) -> Option<MenuCommand> {
    let difficulty = match key {
        "1" => "easy",
        "2" => "normal",
        "3" => "hard",
        "4" => "insane",
        _ => "",
    };
    if let Some(d) = Difficulty::from_str(difficulty) {
        return Some(MenuCommand::SelectDifficulty(d));
    }
    match key {
        "Enter" | " " => Some(MenuCommand::Start),
        "," => Some(MenuCommand::MusicVolume(-VOLUME_STEP)),
        "." => Some(MenuCommand::MusicVolume(VOLUME_STEP)),
        "[" => Some(MenuCommand::SfxVolume(-VOLUME_STEP)),
        "]" => Some(MenuCommand::SfxVolume(VOLUME_STEP)),
        "m" | "M" => Some(MenuCommand::ToggleMute),
        "Delete" => Some(MenuCommand::ResetProgress),
        _ => None,
    }
}

/// Classified touch gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    /// Too long or too short to mean anything
    None,
}

/// Tracks one finger from touchstart to touchend
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    start: Option<(f32, f32, f64)>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, x: f32, y: f32, time_ms: f64) {
        self.start = Some((x, y, time_ms));
    }

    /// Classify the finished touch
    pub fn end(&mut self, x: f32, y: f32, time_ms: f64) -> Gesture {
        let Some((sx, sy, st)) = self.start.take() else {
            return Gesture::None;
        };
        let dx = x - sx;
        let dy = y - sy;
        let travel = (dx * dx + dy * dy).sqrt();

        if time_ms - st < TAP_MAX_MS && travel < TAP_MAX_TRAVEL {
            return Gesture::Tap;
        }
        if dx.abs() > dy.abs() {
            if dx.abs() > SWIPE_MIN_TRAVEL {
                return if dx < 0.0 { Gesture::SwipeLeft } else { Gesture::SwipeRight };
            }
        } else if dy.abs() > SWIPE_MIN_TRAVEL {
            // Screen y grows downward
            return if dy < 0.0 { Gesture::SwipeUp } else { Gesture::SwipeDown };
        }
        Gesture::None
    }
}

/// Map a gesture into intents for the current phase
pub fn apply_gesture(gesture: Gesture, phase: GamePhase, waiting_for_order: bool, input: &mut TickInput) {
    match (phase, gesture) {
        (GamePhase::CutscenePlaying, Gesture::Tap) => {
            if waiting_for_order {
                input.interact = true;
            } else {
                input.advance_dialogue = true;
            }
        }
        (GamePhase::Gameplay, Gesture::Tap | Gesture::SwipeUp) => input.jump = true,
        (GamePhase::Gameplay, Gesture::SwipeDown) => input.slide = true,
        (GamePhase::Gameplay, Gesture::SwipeLeft) => input.move_left = true,
        (GamePhase::Gameplay, Gesture::SwipeRight) => input.move_right = true,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str, phase: GamePhase, waiting: bool) -> TickInput {
        let mut input = TickInput::default();
        apply_key(k, phase, waiting, &mut input);
        input
    }

    #[test]
    fn test_any_key_advances_cutscene() {
        assert!(key("x", GamePhase::CutscenePlaying, false).advance_dialogue);
        assert!(key("Escape", GamePhase::CutscenePlaying, false).advance_dialogue);
        assert!(!key("Escape", GamePhase::CutscenePlaying, false).pause);
    }

    #[test]
    fn test_counter_needs_e() {
        let input = key("x", GamePhase::CutscenePlaying, true);
        assert!(!input.advance_dialogue && !input.interact);
        assert!(key("E", GamePhase::CutscenePlaying, true).interact);
    }

    #[test]
    fn test_gameplay_keys() {
        assert!(key("ArrowLeft", GamePhase::Gameplay, false).move_left);
        assert!(key("d", GamePhase::Gameplay, false).move_right);
        assert!(key(" ", GamePhase::Gameplay, false).jump);
        assert!(key("S", GamePhase::Gameplay, false).slide);
        assert!(key("Escape", GamePhase::Paused, false).pause);
        assert!(!key(" ", GamePhase::Menu, false).jump);
    }

    #[test]
    fn test_menu_keys() {
        assert_eq!(menu_command("Enter"), Some(MenuCommand::Start));
        assert_eq!(menu_command("1"), Some(MenuCommand::SelectDifficulty(Difficulty::Easy)));
        assert_eq!(menu_command("4"), Some(MenuCommand::SelectDifficulty(Difficulty::Insane)));
        assert_eq!(menu_command("]"), Some(MenuCommand::SfxVolume(VOLUME_STEP)));
        assert_eq!(menu_command(","), Some(MenuCommand::MusicVolume(-VOLUME_STEP)));
        assert_eq!(menu_command("5"), None);
        assert_eq!(menu_command("ArrowLeft"), None);
    }

    #[test]
    fn test_gestures() {
        let mut touch = TouchTracker::new();
        touch.start(100.0, 100.0, 0.0);
        assert_eq!(touch.end(105.0, 102.0, 120.0), Gesture::Tap);

        touch.start(100.0, 100.0, 0.0);
        assert_eq!(touch.end(20.0, 110.0, 200.0), Gesture::SwipeLeft);

        touch.start(100.0, 100.0, 0.0);
        assert_eq!(touch.end(100.0, 30.0, 200.0), Gesture::SwipeUp);

        touch.start(100.0, 100.0, 0.0);
        assert_eq!(touch.end(100.0, 190.0, 200.0), Gesture::SwipeDown);

        // Slow press in place
        touch.start(100.0, 100.0, 0.0);
        assert_eq!(touch.end(102.0, 100.0, 900.0), Gesture::None);

        // End without start
        assert_eq!(touch.end(0.0, 0.0, 0.0), Gesture::None);
    }

    #[test]
    fn test_gesture_mapping() {
        let mut input = TickInput::default();
        apply_gesture(Gesture::Tap, GamePhase::CutscenePlaying, false, &mut input);
        assert!(input.advance_dialogue);

        let mut input = TickInput::default();
        apply_gesture(Gesture::Tap, GamePhase::Gameplay, false, &mut input);
        assert!(input.jump);

        let mut input = TickInput::default();
        apply_gesture(Gesture::SwipeRight, GamePhase::CutscenePlaying, false, &mut input);
        assert!(!input.move_right);
    }
}
