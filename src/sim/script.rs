//! Scripted dialogue tables and branch selection
//!
//! Story cutscenes rotate through three takes by play count. The finale picks
//! its script from the coins the player brought to the counter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::dialogue::DialogueLine;
use crate::consts::{COIN_VALUE, GLIZZY_PRICE};
use crate::tuning::EndingPolicy;

/// Number of alternate takes per story beat
pub const VARIATION_COUNT: u32 = 3;
/// Plays before the next take is used
pub const PLAYS_PER_VARIATION: u32 = 3;

const EMBEDDED_SCRIPTS: &str = include_str!("../../assets/dialogue.json");

/// Story cutscene keys, one per campaign level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryBeat {
    Intro,
    Desert,
    River,
    Wall,
    Suburbia,
}

impl StoryBeat {
    pub fn key(&self) -> &'static str {
        match self {
            StoryBeat::Intro => "intro",
            StoryBeat::Desert => "desert",
            StoryBeat::River => "river",
            StoryBeat::Wall => "wall",
            StoryBeat::Suburbia => "suburbia",
        }
    }
}

/// Which take of a story beat to play
pub fn variation_index(play_count: u32) -> usize {
    ((play_count / PLAYS_PER_VARIATION) % VARIATION_COUNT) as usize
}

/// Finale flavor by coins carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingTier {
    Broke,
    Desperate,
    Close,
    Exact,
    SmallTip,
    Rich,
    Legend,
}

impl EndingTier {
    pub fn for_coins(coins: u32) -> Self {
        match coins {
            0 => EndingTier::Broke,
            1..=2 => EndingTier::Desperate,
            3..=5 => EndingTier::Close,
            6 => EndingTier::Exact,
            7..=9 => EndingTier::SmallTip,
            10..=14 => EndingTier::Rich,
            _ => EndingTier::Legend,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            EndingTier::Broke => "broke",
            EndingTier::Desperate => "desperate",
            EndingTier::Close => "close",
            EndingTier::Exact => "exact",
            EndingTier::SmallTip => "small_tip",
            EndingTier::Rich => "rich",
            EndingTier::Legend => "legend",
        }
    }

    /// The player walks away with a glizzy
    pub fn is_happy(&self) -> bool {
        *self >= EndingTier::Exact
    }
}

/// The simple happy/bad check used at the counter
pub fn can_afford_glizzy(coins: u32) -> bool {
    coins.saturating_mul(COIN_VALUE) >= GLIZZY_PRICE
}

/// All dialogue content, keyed by beat/tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptLibrary {
    #[serde(default)]
    pub variations: HashMap<String, Vec<Vec<DialogueLine>>>,
    #[serde(default)]
    pub endings: HashMap<String, Vec<DialogueLine>>,
    /// "happy" and "bad" counter scripts
    #[serde(default)]
    pub order: HashMap<String, Vec<DialogueLine>>,
}

impl ScriptLibrary {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Scripts bundled with the game; empty if the asset is malformed
    pub fn embedded() -> Self {
        match Self::from_json(EMBEDDED_SCRIPTS) {
            Ok(library) => library,
            Err(e) => {
                log::error!("Embedded dialogue is malformed: {}", e);
                Self::default()
            }
        }
    }

    /// Lines for a story beat, or none if the key is missing
    pub fn story(&self, beat: StoryBeat, play_count: u32) -> &[DialogueLine] {
        let takes = self.variations.get(beat.key());
        match takes.and_then(|t| t.get(variation_index(play_count)).or_else(|| t.first())) {
            Some(lines) => lines.as_slice(),
            None => {
                log::warn!("No dialogue for story beat '{}'", beat.key());
                &[]
            }
        }
    }

    pub fn ending(&self, tier: EndingTier) -> &[DialogueLine] {
        match self.endings.get(tier.key()) {
            Some(lines) => lines.as_slice(),
            None => {
                log::warn!("No dialogue for ending '{}'", tier.key());
                &[]
            }
        }
    }

    pub fn order(&self, happy: bool) -> &[DialogueLine] {
        let key = if happy { "happy" } else { "bad" };
        match self.order.get(key) {
            Some(lines) => lines.as_slice(),
            None => {
                log::warn!("No dialogue for order '{}'", key);
                &[]
            }
        }
    }

    /// Script played at the counter and whether it ends happily
    pub fn counter_script(&self, policy: EndingPolicy, coins: u32) -> (Vec<DialogueLine>, bool) {
        match policy {
            EndingPolicy::Binary => {
                let happy = can_afford_glizzy(coins);
                (self.order(happy).to_vec(), happy)
            }
            EndingPolicy::Tiered => {
                let tier = EndingTier::for_coins(coins);
                (self.ending(tier).to_vec(), tier.is_happy())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dialogue::DialogueAction;
    use proptest::prelude::*;

    #[test]
    fn test_variation_cycling() {
        let expected = [0, 0, 0, 1, 1, 1, 2, 2, 2, 0];
        for (play_count, want) in expected.iter().enumerate() {
            assert_eq!(variation_index(play_count as u32), *want, "play {}", play_count);
        }
    }

    #[test]
    fn test_ending_breakpoints() {
        let cases = [
            (0, EndingTier::Broke),
            (1, EndingTier::Desperate),
            (2, EndingTier::Desperate),
            (3, EndingTier::Close),
            (5, EndingTier::Close),
            (6, EndingTier::Exact),
            (7, EndingTier::SmallTip),
            (9, EndingTier::SmallTip),
            (10, EndingTier::Rich),
            (14, EndingTier::Rich),
            (15, EndingTier::Legend),
        ];
        for (coins, tier) in cases {
            assert_eq!(EndingTier::for_coins(coins), tier, "coins {}", coins);
        }
        assert_eq!(EndingTier::for_coins(0).key(), "broke");
        assert_eq!(EndingTier::for_coins(6).key(), "exact");
        assert_eq!(EndingTier::for_coins(15).key(), "legend");
    }

    #[test]
    fn test_binary_check() {
        assert!(!can_afford_glizzy(5));
        assert!(can_afford_glizzy(6));
        assert!(can_afford_glizzy(u32::MAX));
    }

    #[test]
    fn test_embedded_library_complete() {
        let library = ScriptLibrary::embedded();
        for beat in [
            StoryBeat::Intro,
            StoryBeat::Desert,
            StoryBeat::River,
            StoryBeat::Wall,
            StoryBeat::Suburbia,
        ] {
            for play_count in [0, 3, 6] {
                assert!(!library.story(beat, play_count).is_empty());
            }
        }
        for coins in [0, 1, 3, 6, 7, 10, 15] {
            assert!(!library.ending(EndingTier::for_coins(coins)).is_empty());
        }
        // The bad order always ends with security
        assert!(
            library
                .order(false)
                .iter()
                .any(|l| l.action == Some(DialogueAction::CallSecurity))
        );
        assert!(
            !library
                .order(true)
                .iter()
                .any(|l| l.action == Some(DialogueAction::CallSecurity))
        );
    }

    #[test]
    fn test_missing_key_is_empty() {
        let library = ScriptLibrary::default();
        assert!(library.story(StoryBeat::Wall, 0).is_empty());
        let (lines, happy) = library.counter_script(EndingPolicy::Tiered, 20);
        assert!(lines.is_empty());
        assert!(happy);
    }

    #[test]
    fn test_policies_pick_different_scripts() {
        let library = ScriptLibrary::embedded();
        assert!(library.counter_script(EndingPolicy::Binary, 7).1);
        assert!(library.counter_script(EndingPolicy::Tiered, 7).1);
        // Same outcome, different lines
        let (binary, _) = library.counter_script(EndingPolicy::Binary, 5);
        let (tiered, _) = library.counter_script(EndingPolicy::Tiered, 5);
        assert_ne!(binary, tiered);
    }

    proptest! {
        #[test]
        fn prop_variation_in_range(play_count in any::<u32>()) {
            prop_assert!(variation_index(play_count) < VARIATION_COUNT as usize);
        }

        #[test]
        fn prop_tier_happy_matches_binary(coins in 0u32..1000) {
            prop_assert_eq!(EndingTier::for_coins(coins).is_happy(), can_afford_glizzy(coins));
        }
    }
}
