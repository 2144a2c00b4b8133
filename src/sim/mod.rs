//! Stream simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Tiles in spawn order, removed only from the head
//! - No audio, rendering or platform dependencies

pub mod layout;
pub mod options;
pub mod state;
pub mod tick;

pub use layout::{Layout, Orientation};
pub use options::generate_options;
pub use state::{
    RoundConfig, StreamEvent, StreamPhase, StreamState, Tile, TileStatus, TileView,
};
pub use tick::{advance, submit_answer};
