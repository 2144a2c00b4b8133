//! Kana Stream - a kana reflex-training game
//!
//! Core modules:
//! - `sim`: Stream simulation (spawn, move, deadline, reap, answers)
//! - `audio`: Look-ahead scheduler for the synthesized backing loop and effects
//! - `session`: Screen state machine wiring input, simulation and audio
//! - `dictionary` / `pool`: Kana tables and candidate pool resolution
//! - `persistence`: Key-value storage for best score and preferences
//! - `platform`: Input mapping

pub mod audio;
pub mod dictionary;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod pool;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::BestScore;
pub use session::{Command, Screen, Session, SessionError, Snapshot};
pub use settings::{Language, Level, Pacing, Preferences};

/// Game configuration constants
pub mod consts {
    /// Lives at the start of a round
    pub const STARTING_LIVES: u8 = 5;

    /// Distance the tail tile must clear from the spawn edge before the next spawn
    pub const SPAWN_GAP: f32 = 160.0;
    /// Horizontal tiles appear this far past the right edge
    pub const HORIZONTAL_SPAWN_OFFSET: f32 = 50.0;
    /// Horizontal deadline (x coordinate)
    pub const HORIZONTAL_MISS_X: f32 = 50.0;
    /// Horizontal trailing edge (x coordinate)
    pub const HORIZONTAL_TRAILING_X: f32 = -200.0;
    /// Vertical deadline sits this far above the bottom (answer buttons live there)
    pub const VERTICAL_MISS_MARGIN: f32 = 300.0;
    /// Vertical trailing edge sits this far below the bottom
    pub const VERTICAL_TRAILING_MARGIN: f32 = 100.0;
    /// Viewports narrower than this stream vertically
    pub const MOBILE_BREAKPOINT: f32 = 768.0;
    /// Tile edge length
    pub const TILE_SIZE_DESKTOP: f32 = 80.0;
    pub const TILE_SIZE_MOBILE: f32 = 64.0;

    /// Speed goes up every this many points
    pub const SPEED_STEP_POINTS: u32 = 5;
    /// Speed increment per step
    pub const SPEED_STEP: f32 = 0.05;

    /// Score thresholds for the easiest level's choice count
    pub const CHOICES_MID_SCORE: u32 = 20;
    pub const CHOICES_MAX_SCORE: u32 = 40;
    /// Choices shown on every other level
    pub const MAX_CHOICES: usize = 4;

    /// Longest frame the simulation will accept (tab switches, debugger stops)
    pub const MAX_FRAME_SECS: f32 = 0.1;
}
