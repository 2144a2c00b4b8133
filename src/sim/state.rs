//! Stream state and core simulation types

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::layout::Layout;
use super::options::generate_options;
use crate::consts::STARTING_LIVES;
use crate::dictionary::{CharacterEntry, Dictionary, KanaDictionary};
use crate::pool::default_pool;
use crate::settings::{Level, Pacing};

/// Phase of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamPhase {
    /// Created, not started
    Idle,
    /// Frames advance the stream
    Running,
    /// Frozen; frames and answers are ignored
    Paused,
    /// Out of lives
    Ended,
}

/// Resolution of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TileStatus {
    Pending,
    Correct,
    Wrong,
}

/// A live symbol travelling toward the deadline
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u64,
    pub entry: CharacterEntry,
    pub pos: Vec2,
    status: TileStatus,
}

impl Tile {
    pub fn new(id: u64, entry: CharacterEntry, pos: Vec2) -> Self {
        Self {
            id,
            entry,
            pos,
            status: TileStatus::Pending,
        }
    }

    pub fn status(&self) -> TileStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == TileStatus::Pending
    }

    pub fn reading(&self) -> &'static str {
        self.entry.reading
    }

    /// Settle a pending tile. Resolved tiles never change again.
    pub fn resolve(&mut self, correct: bool) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = if correct {
            TileStatus::Correct
        } else {
            TileStatus::Wrong
        };
        true
    }
}

/// Read-only tile view handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub id: u64,
    pub symbol: &'static str,
    pub reading: &'static str,
    pub x: f32,
    pub y: f32,
    pub status: TileStatus,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.id,
            symbol: tile.entry.symbol,
            reading: tile.entry.reading,
            x: tile.pos.x,
            y: tile.pos.y,
            status: tile.status,
        }
    }
}

/// Something that happened during a step, for audio and the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StreamEvent {
    Spawned { id: u64 },
    Answered { id: u64, correct: bool },
    /// The active tile crossed the deadline unanswered
    Missed { id: u64 },
    SpeedUp { speed: f32 },
    RoundEnded { score: u32 },
}

/// Per-round settings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundConfig {
    pub level: Level,
    pub pacing: Pacing,
    pub seed: u64,
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct StreamState {
    pub phase: StreamPhase,
    /// Live tiles in spawn order (= deadline order)
    pub tiles: VecDeque<Tile>,
    /// Index into `tiles` of the tile awaiting an answer
    pub active_index: usize,
    /// Choices for the active tile
    pub options: Vec<CharacterEntry>,
    pub score: u32,
    pub lives: u8,
    /// Units per frame (see [`Pacing`])
    pub speed: f32,
    pub level: Level,
    pub pacing: Pacing,
    pub layout: Layout,
    /// Frames advanced this round
    pub frames: u64,
    pool: Vec<CharacterEntry>,
    rng: Pcg32,
    next_id: u64,
}

impl StreamState {
    /// Create an idle round. An empty pool falls back to the built-in default pool.
    pub fn new(pool: Vec<CharacterEntry>, layout: Layout, config: RoundConfig) -> Self {
        Self::with_fallback(pool, &KanaDictionary, layout, config)
    }

    /// Create an idle round whose empty-pool fallback comes from `fallback`
    pub fn with_fallback(
        pool: Vec<CharacterEntry>,
        fallback: &dyn Dictionary,
        layout: Layout,
        config: RoundConfig,
    ) -> Self {
        let pool = if pool.is_empty() {
            log::warn!("Round created with an empty pool, using the default pool");
            default_pool(fallback)
        } else {
            pool
        };

        Self {
            phase: StreamPhase::Idle,
            tiles: VecDeque::new(),
            active_index: 0,
            options: Vec::new(),
            score: 0,
            lives: STARTING_LIVES,
            speed: config.level.initial_speed(),
            level: config.level,
            pacing: config.pacing,
            layout,
            frames: 0,
            pool,
            rng: Pcg32::seed_from_u64(config.seed),
            next_id: 1,
        }
    }

    pub fn pool(&self) -> &[CharacterEntry] {
        &self.pool
    }

    /// Start the round with its first tile
    pub fn start(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.phase != StreamPhase::Idle {
            return events;
        }
        self.phase = StreamPhase::Running;
        self.spawn_tile(&mut events);
        log::debug!(
            "Round started: level {}, speed {}, pool {}",
            self.level.number(),
            self.speed,
            self.pool.len()
        );
        events
    }

    /// Returns false if the round wasn't running
    pub fn pause(&mut self) -> bool {
        if self.phase != StreamPhase::Running {
            return false;
        }
        self.phase = StreamPhase::Paused;
        true
    }

    /// Returns false if the round wasn't paused
    pub fn resume(&mut self) -> bool {
        if self.phase != StreamPhase::Paused {
            return false;
        }
        self.phase = StreamPhase::Running;
        true
    }

    /// Whether the driver should schedule another frame
    pub fn wants_next_frame(&self) -> bool {
        self.lives > 0 && self.phase == StreamPhase::Running
    }

    pub fn active_tile(&self) -> Option<&Tile> {
        self.tiles.get(self.active_index)
    }

    /// Allocate a new tile ID
    pub fn next_entity_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a tile at the spawn edge; refresh the options if it is the active tile
    pub fn spawn_tile(&mut self, events: &mut Vec<StreamEvent>) {
        let Some(entry) = self.pool.choose(&mut self.rng).copied() else {
            return;
        };
        let pos = self.layout.spawn_position(&mut self.rng);
        let id = self.next_entity_id();
        self.tiles.push_back(Tile::new(id, entry, pos));
        events.push(StreamEvent::Spawned { id });

        if self.tiles.len() - 1 == self.active_index {
            self.refresh_options();
        }
    }

    /// Recompute the choices for the active tile
    pub fn refresh_options(&mut self) {
        let Some(correct) = self.active_tile().map(|t| t.entry) else {
            return;
        };
        let count = self.level.choice_count(self.score);
        self.options = generate_options(&mut self.rng, &self.pool, correct, count);
    }

    /// Move on to the next tile, spawning one immediately if the stream is exhausted
    pub(crate) fn advance_active(&mut self, events: &mut Vec<StreamEvent>) {
        self.active_index += 1;
        if self.active_index < self.tiles.len() {
            self.refresh_options();
        } else {
            self.spawn_tile(events);
        }
    }

    /// Take a life. Returns true if that ended the round.
    pub(crate) fn lose_life(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            return false;
        }
        self.phase = StreamPhase::Ended;
        events.push(StreamEvent::RoundEnded { score: self.score });
        log::info!("Round over: score {} after {} frames", self.score, self.frames);
        true
    }

    /// Renderer view of the live tiles
    pub fn tile_views(&self) -> Vec<TileView> {
        self.tiles.iter().map(TileView::from).collect()
    }
}
