//! Campaign levels and difficulty tiers

use serde::{Deserialize, Serialize};

use super::events::MusicTrack;
use super::script::StoryBeat;
use crate::consts::{INITIAL_LIVES, MAX_LIVES};

/// Non-player character staged in a level's opening cutscene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Npc {
    Mama,
    Coyote,
    Alligator,
    Agent,
    Cashier,
}

impl Npc {
    /// Speaker id used by dialogue lines
    pub fn speaker(&self) -> &'static str {
        match self {
            Npc::Mama => "Mama",
            Npc::Coyote => "Coyote",
            Npc::Alligator => "Alligator",
            Npc::Agent => "Agent",
            Npc::Cashier => "Cashier",
        }
    }
}

/// Static configuration for one campaign level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    /// Distance (score units) needed to finish the level
    pub length: f32,
    /// Base forward scroll speed (units/s)
    pub speed: f32,
    pub min_obstacle_gap: f32,
    pub max_obstacle_gap: f32,
    pub collectible_gap: f32,
    /// Opening cutscene script
    pub story: StoryBeat,
    pub npc: Option<Npc>,
    pub music: MusicTrack,
}

impl LevelConfig {
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: u32,
        name: &str,
        length: f32,
        speed: f32,
        gaps: (f32, f32),
        collectible_gap: f32,
        story: StoryBeat,
        npc: Option<Npc>,
        music: MusicTrack,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            length,
            speed,
            min_obstacle_gap: gaps.0,
            max_obstacle_gap: gaps.1,
            collectible_gap,
            story,
            npc,
            music,
        }
    }

    /// The five-level campaign from the village to the border suburbs
    pub fn campaign() -> Vec<LevelConfig> {
        vec![
            Self::new(1, "HOME TOWN", 1000.0, 16.0, (20.0, 35.0), 60.0, StoryBeat::Intro, Some(Npc::Mama), MusicTrack::Village),
            Self::new(2, "THE DESERT", 1500.0, 20.0, (18.0, 30.0), 55.0, StoryBeat::Desert, Some(Npc::Coyote), MusicTrack::Desert),
            Self::new(3, "RIO GRANDE", 2000.0, 24.0, (15.0, 28.0), 50.0, StoryBeat::River, Some(Npc::Alligator), MusicTrack::River),
            Self::new(4, "THE WALL", 2500.0, 28.0, (12.0, 25.0), 45.0, StoryBeat::Wall, Some(Npc::Agent), MusicTrack::Wall),
            Self::new(5, "SUBURBIA", 3000.0, 32.0, (10.0, 22.0), 40.0, StoryBeat::Suburbia, None, MusicTrack::Suburbia),
        ]
    }
}

/// Difficulty tier picked from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            _ => None,
        }
    }

    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                speed_multiplier: 0.75,
                gap_multiplier: 1.5,
                lives_bonus: 2,
                xp_multiplier: 0.5,
            },
            Difficulty::Normal => DifficultySettings {
                speed_multiplier: 1.0,
                gap_multiplier: 1.0,
                lives_bonus: 0,
                xp_multiplier: 1.0,
            },
            Difficulty::Hard => DifficultySettings {
                speed_multiplier: 1.25,
                gap_multiplier: 0.75,
                lives_bonus: -1,
                xp_multiplier: 1.5,
            },
            Difficulty::Insane => DifficultySettings {
                speed_multiplier: 1.5,
                gap_multiplier: 0.5,
                lives_bonus: -2,
                xp_multiplier: 3.0,
            },
        }
    }
}

/// Immutable balance record for a difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub speed_multiplier: f32,
    /// Scales both the obstacle gap range and the collectible gap
    pub gap_multiplier: f32,
    /// Added to the base starting lives
    pub lives_bonus: i8,
    pub xp_multiplier: f32,
}

impl DifficultySettings {
    /// Lives at the start of a run, kept within 1..=MAX_LIVES
    pub fn starting_lives(&self) -> u8 {
        (INITIAL_LIVES as i8 + self.lives_bonus).clamp(1, MAX_LIVES as i8) as u8
    }
}
