//! Platform abstraction layer
//!
//! Turns browser inputs into simulation inputs:
//! - Frame timestamps into capped deltas
//! - Key presses and touch gestures into abstract intents
//! - Title-screen keys into menu commands

pub mod input;
pub mod time;

pub use input::{Gesture, MenuCommand, TouchTracker, apply_gesture, apply_key, menu_command};
pub use time::FrameClock;
