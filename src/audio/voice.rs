//! Synthesized voice descriptions
//!
//! A [`Voice`] says *what* to play; backends decide *how* to synthesize it.
//! Envelope lengths live here so every backend agrees on them.

use serde::Serialize;

/// Transient sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundEffect {
    /// Correct answer - short rising blip
    Correct,
    /// Wrong answer or miss - harsh falling buzz
    Wrong,
    /// Round over - long falling tone
    End,
}

/// One synthesized event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Voice {
    /// Pitch-swept sine kick
    Kick,
    /// High-passed noise burst plus a triangle body
    Snare,
    /// Band-passed noise tick
    HiHat { open: bool },
    /// Filtered sawtooth bass note
    Bass { freq: f32 },
    /// Quiet sine pluck for melodic accents
    Pluck { freq: f32 },
    /// Transient effect
    Effect(SoundEffect),
}

impl Voice {
    /// Seconds from start until the source is stopped
    pub fn duration(&self) -> f64 {
        match self {
            Voice::Kick => 0.5,
            Voice::Snare => 0.2,
            Voice::HiHat { .. } => 0.2,
            Voice::Bass { .. } => 0.5,
            Voice::Pluck { .. } => 0.5,
            Voice::Effect(SoundEffect::Correct) => 0.1,
            Voice::Effect(SoundEffect::Wrong) => 0.2,
            Voice::Effect(SoundEffect::End) => 1.0,
        }
    }

    /// Seconds for the gain envelope to decay
    pub fn decay(&self) -> f64 {
        match self {
            Voice::HiHat { open: true } => 0.15,
            Voice::HiHat { open: false } => 0.05,
            Voice::Bass { .. } => 0.4,
            other => other.duration(),
        }
    }

    /// True for voices that belong to the backing loop
    pub fn is_loop_voice(&self) -> bool {
        !matches!(self, Voice::Effect(_))
    }
}
