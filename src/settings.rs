//! Game settings and preferences
//!
//! Difficulty and pacing are chosen per round; the language preference is
//! persisted through the key-value store.

use serde::Serialize;

use crate::persistence::{KeyValueStore, LANGUAGE_KEY};

/// Difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Level {
    #[default]
    Normal,
    Fast,
    Insane,
}

impl Level {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Level::Normal),
            2 => Some(Level::Fast),
            3 => Some(Level::Insane),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Level::Normal => 1,
            Level::Fast => 2,
            Level::Insane => 3,
        }
    }

    /// Starting tile speed (units per frame)
    pub fn initial_speed(&self) -> f32 {
        match self {
            Level::Normal => 1.5,
            Level::Fast => 3.0,
            Level::Insane => 5.0,
        }
    }

    /// Number of answer choices offered at the given score.
    ///
    /// Only the easiest level eases the player in.
    pub fn choice_count(&self, score: u32) -> usize {
        use crate::consts::{CHOICES_MID_SCORE, CHOICES_MAX_SCORE, MAX_CHOICES};
        match self {
            Level::Normal if score < CHOICES_MID_SCORE => 2,
            Level::Normal if score < CHOICES_MAX_SCORE => 3,
            _ => MAX_CHOICES,
        }
    }
}

/// How tile movement relates to elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Pacing {
    /// Tiles move `speed` units per rendered frame. Pace follows the display
    /// refresh rate.
    #[default]
    FrameCoupled,
    /// Tiles move `speed * elapsed_secs * reference_hz` units per frame.
    TimeNormalized { reference_hz: f32 },
}

impl Pacing {
    /// Distance a tile travels this frame
    pub fn step(&self, speed: f32, elapsed_secs: f32) -> f32 {
        match self {
            Pacing::FrameCoupled => speed,
            Pacing::TimeNormalized { reference_hz } => speed * elapsed_secs * reference_hz,
        }
    }
}

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Language {
    En,
    #[default]
    Si,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Si => "si",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Language::En),
            "si" => Some(Language::Si),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::En => Language::Si,
            Language::Si => Language::En,
        }
    }
}

/// Persisted player preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preferences {
    pub language: Language,
}

impl Preferences {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let language = store
            .get(LANGUAGE_KEY)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default();
        log::info!("Language: {}", language.code());
        Self { language }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        store.set(LANGUAGE_KEY, self.language.code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_choice_count_normal_scales_with_score() {
        for score in 0..20 {
            assert_eq!(Level::Normal.choice_count(score), 2);
        }
        assert_eq!(Level::Normal.choice_count(20), 3);
        assert_eq!(Level::Normal.choice_count(39), 3);
        assert_eq!(Level::Normal.choice_count(40), 4);
        assert_eq!(Level::Normal.choice_count(500), 4);
    }

    #[test]
    fn test_choice_count_other_levels_fixed() {
        for level in [Level::Fast, Level::Insane] {
            assert_eq!(level.choice_count(0), 4);
            assert_eq!(level.choice_count(25), 4);
        }
    }

    #[test]
    fn test_level_numbers() {
        for n in 1..=3 {
            assert_eq!(Level::from_number(n).map(|l| l.number()), Some(n));
        }
        assert_eq!(Level::from_number(0), None);
        assert_eq!(Level::Insane.initial_speed(), 5.0);
    }

    #[test]
    fn test_pacing() {
        assert_eq!(Pacing::FrameCoupled.step(1.5, 0.5), 1.5);
        let normalized = Pacing::TimeNormalized { reference_hz: 60.0 };
        assert!((normalized.step(1.5, 1.0 / 30.0) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_language_persistence() {
        let mut store = MemoryStore::new();
        assert_eq!(Preferences::load(&store).language, Language::Si);

        let mut prefs = Preferences::load(&store);
        prefs.language = prefs.language.toggled();
        prefs.save(&mut store);
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("en"));
        assert_eq!(Preferences::load(&store).language, Language::En);

        store.set(LANGUAGE_KEY, "fr");
        assert_eq!(Preferences::load(&store).language, Language::Si);
    }
}
