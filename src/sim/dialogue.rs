//! Dialogue sequencing
//!
//! A cutscene is a queue of lines. Each line is shown once, then advanced
//! either by the player or by its own delay running out, whichever comes first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::events::{GameEvent, SoundCue};
use super::level::Npc;

/// Character/event hook attached to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueAction {
    GatorSnap,
    Shock,
    CheckPockets,
    /// Security is called; the phase machine starts the drag-out
    CallSecurity,
    Victory,
    StrangerHelps,
    EatingGlizzy,
    TimeSkip,
    Reunion,
    AgentScan,
    DeployDrones,
    PhoneCall,
    #[serde(other)]
    Unknown,
}

/// One scripted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    /// Auto-advance timeout in milliseconds
    pub delay: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DialogueAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

impl DialogueLine {
    pub fn new(speaker: &str, text: &str, delay: u32) -> Self {
        Self {
            speaker: speaker.to_string(),
            text: text.to_string(),
            delay,
            action: None,
            sound: None,
        }
    }
}

/// Where a speech bubble should be attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeakerAnchor {
    Player,
    Npc(Npc),
    /// Narration, off-screen voices
    Unanchored,
}

impl SpeakerAnchor {
    /// Resolve a speaker id against the NPC present in the scene
    pub fn resolve(speaker: &str, npc: Option<Npc>) -> Self {
        match speaker {
            "Chandler" => SpeakerAnchor::Player,
            // Mama away from home is a phone call
            "Mama" if npc != Some(Npc::Mama) => SpeakerAnchor::Player,
            _ => match npc {
                Some(npc) if npc.speaker() == speaker => SpeakerAnchor::Npc(npc),
                _ => SpeakerAnchor::Unanchored,
            },
        }
    }
}

/// Lines, cursor and countdown
#[derive(Debug, Clone, Default)]
pub struct DialogueQueue {
    pub lines: Vec<DialogueLine>,
    pub index: usize,
    /// Milliseconds before the current line auto-advances
    pub remaining_ms: f32,
}

/// Outcome of a sequencer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueStep {
    /// A new line is on screen
    Shown { action: Option<DialogueAction> },
    /// Queue ran out
    Exhausted,
    /// Nothing changed
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct DialogueSequencer {
    queue: DialogueQueue,
    anchors: HashMap<String, SpeakerAnchor>,
    active: bool,
}

impl DialogueSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue and show its first line
    pub fn load_queue(
        &mut self,
        lines: Vec<DialogueLine>,
        npc: Option<Npc>,
        events: &mut Vec<GameEvent>,
    ) -> DialogueStep {
        self.anchors = lines
            .iter()
            .map(|line| (line.speaker.clone(), SpeakerAnchor::resolve(&line.speaker, npc)))
            .collect();
        self.queue = DialogueQueue {
            lines,
            index: 0,
            remaining_ms: 0.0,
        };
        self.active = true;
        self.show_current(events)
    }

    /// Move to the next line
    pub fn advance(&mut self, events: &mut Vec<GameEvent>) -> DialogueStep {
        if !self.active {
            return DialogueStep::Idle;
        }
        self.queue.index += 1;
        self.show_current(events)
    }

    /// Count down the current line; auto-advances once its delay is spent
    pub fn tick(&mut self, dt_ms: f32, events: &mut Vec<GameEvent>) -> DialogueStep {
        if !self.active {
            return DialogueStep::Idle;
        }
        self.queue.remaining_ms -= dt_ms;
        if self.queue.remaining_ms <= 0.0 {
            self.advance(events)
        } else {
            DialogueStep::Idle
        }
    }

    /// Drop the queue and hide the bubble
    pub fn clear(&mut self, events: &mut Vec<GameEvent>) {
        if self.active || !self.queue.lines.is_empty() {
            events.push(GameEvent::DialogueCleared);
        }
        self.queue = DialogueQueue::default();
        self.anchors.clear();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_line(&self) -> Option<&DialogueLine> {
        if self.active {
            self.queue.lines.get(self.queue.index)
        } else {
            None
        }
    }

    pub fn queue(&self) -> &DialogueQueue {
        &self.queue
    }

    fn show_current(&mut self, events: &mut Vec<GameEvent>) -> DialogueStep {
        let Some(line) = self.queue.lines.get(self.queue.index) else {
            self.active = false;
            return DialogueStep::Exhausted;
        };

        self.queue.remaining_ms = line.delay as f32;
        let anchor = self
            .anchors
            .get(&line.speaker)
            .copied()
            .unwrap_or(SpeakerAnchor::Unanchored);
        events.push(GameEvent::DialogueShown {
            speaker: line.speaker.clone(),
            text: line.text.clone(),
            anchor,
        });
        if let Some(sound) = &line.sound {
            events.push(GameEvent::Sound(SoundCue::Script(sound.clone())));
        }
        if let Some(action) = line.action {
            events.push(GameEvent::DialogueAction(action));
        }
        DialogueStep::Shown {
            action: line.action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> Vec<DialogueLine> {
        vec![
            DialogueLine::new("Chandler", "Hola", 500),
            DialogueLine::new("Mama", "Adios", 1000),
        ]
    }

    fn shown(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::DialogueShown { .. }))
            .count()
    }

    #[test]
    fn test_auto_advance_after_delay() {
        let mut seq = DialogueSequencer::new();
        let mut events = Vec::new();
        seq.load_queue(two_lines(), Some(Npc::Mama), &mut events);
        assert_eq!(seq.queue().index, 0);

        assert_eq!(seq.tick(250.0, &mut events), DialogueStep::Idle);
        assert_eq!(seq.queue().index, 0);
        assert_eq!(seq.tick(250.0, &mut events), DialogueStep::Shown { action: None });
        assert_eq!(seq.queue().index, 1);
        assert_eq!(shown(&events), 2);
    }

    #[test]
    fn test_manual_advance_resets_timer() {
        let mut seq = DialogueSequencer::new();
        let mut events = Vec::new();
        seq.load_queue(two_lines(), None, &mut events);
        seq.tick(400.0, &mut events);
        seq.advance(&mut events);
        // Second line has a fresh 1000ms
        assert_eq!(seq.tick(400.0, &mut events), DialogueStep::Idle);
        assert_eq!(seq.tick(600.0, &mut events), DialogueStep::Exhausted);
        assert!(!seq.is_active());
        assert_eq!(seq.tick(1000.0, &mut events), DialogueStep::Idle);
    }

    #[test]
    fn test_empty_queue_is_exhausted() {
        let mut seq = DialogueSequencer::new();
        let mut events = Vec::new();
        assert_eq!(seq.load_queue(Vec::new(), None, &mut events), DialogueStep::Exhausted);
        assert!(events.is_empty());
        assert!(seq.current_line().is_none());
    }

    #[test]
    fn test_hooks_fire_once_per_line() {
        let mut line = DialogueLine::new("Cashier", "SECURITY!", 2000);
        line.action = Some(DialogueAction::CallSecurity);
        line.sound = Some("security_whistle".to_string());

        let mut seq = DialogueSequencer::new();
        let mut events = Vec::new();
        let step = seq.load_queue(vec![line], Some(Npc::Cashier), &mut events);
        assert_eq!(
            step,
            DialogueStep::Shown {
                action: Some(DialogueAction::CallSecurity)
            }
        );
        for _ in 0..10 {
            seq.tick(100.0, &mut events);
        }
        let actions = events
            .iter()
            .filter(|e| matches!(e, GameEvent::DialogueAction(_)))
            .count();
        let sounds = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound(SoundCue::Script(_))))
            .count();
        assert_eq!(actions, 1);
        assert_eq!(sounds, 1);
        assert_eq!(
            events[0],
            GameEvent::DialogueShown {
                speaker: "Cashier".to_string(),
                text: "SECURITY!".to_string(),
                anchor: SpeakerAnchor::Npc(Npc::Cashier),
            }
        );
    }

    #[test]
    fn test_speaker_anchors() {
        assert_eq!(SpeakerAnchor::resolve("Chandler", None), SpeakerAnchor::Player);
        assert_eq!(
            SpeakerAnchor::resolve("Mama", Some(Npc::Mama)),
            SpeakerAnchor::Npc(Npc::Mama)
        );
        assert_eq!(SpeakerAnchor::resolve("Mama", Some(Npc::Coyote)), SpeakerAnchor::Player);
        assert_eq!(
            SpeakerAnchor::resolve("Alligator", Some(Npc::Alligator)),
            SpeakerAnchor::Npc(Npc::Alligator)
        );
        assert_eq!(SpeakerAnchor::resolve("Agent", None), SpeakerAnchor::Unanchored);
        assert_eq!(SpeakerAnchor::resolve("Narrator", None), SpeakerAnchor::Unanchored);
    }

    #[test]
    fn test_unknown_action_parses() {
        let line: DialogueLine = serde_json::from_str(
            r#"{"speaker":"Coyote","text":"...","delay":100,"action":"moonwalk"}"#,
        )
        .unwrap();
        assert_eq!(line.action, Some(DialogueAction::Unknown));
    }
}
