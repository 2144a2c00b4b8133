//! Viewport geometry
//!
//! Where tiles appear, which way they travel, where they are missed and where
//! they leave the screen. Wide viewports stream right-to-left; narrow ones
//! stream top-to-bottom.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::consts::*;

/// Stream direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Tiles travel right to left
    Horizontal,
    /// Tiles fall top to bottom
    Vertical,
}

/// Viewport size plus the geometry derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl Layout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width < MOBILE_BREAKPOINT {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn tile_size(&self) -> f32 {
        match self.orientation() {
            Orientation::Horizontal => TILE_SIZE_DESKTOP,
            Orientation::Vertical => TILE_SIZE_MOBILE,
        }
    }

    /// Unit vector tiles travel along
    pub fn direction(&self) -> Vec2 {
        match self.orientation() {
            Orientation::Horizontal => Vec2::NEG_X,
            Orientation::Vertical => Vec2::Y,
        }
    }

    /// Where a new tile appears
    pub fn spawn_position<R: Rng>(&self, rng: &mut R) -> Vec2 {
        match self.orientation() {
            Orientation::Horizontal => {
                Vec2::new(self.width + HORIZONTAL_SPAWN_OFFSET, self.height / 3.0)
            }
            Orientation::Vertical => {
                let tile = self.tile_size();
                // Random column with a 10px margin on both sides
                let span = (self.width - tile - 20.0).max(0.0);
                let x = 10.0 + rng.random::<f32>() * span;
                Vec2::new(x, -tile)
            }
        }
    }

    /// Has the tail tile moved far enough from the spawn edge for another spawn?
    pub fn spawn_gap_cleared(&self, tail: Vec2) -> bool {
        match self.orientation() {
            Orientation::Horizontal => self.width - tail.x > SPAWN_GAP,
            Orientation::Vertical => tail.y > SPAWN_GAP,
        }
    }

    /// Has a tile crossed the deadline?
    pub fn past_deadline(&self, pos: Vec2) -> bool {
        match self.orientation() {
            Orientation::Horizontal => pos.x < HORIZONTAL_MISS_X,
            Orientation::Vertical => pos.y > self.height - VERTICAL_MISS_MARGIN,
        }
    }

    /// Has a tile fully left the screen?
    pub fn past_trailing_edge(&self, pos: Vec2) -> bool {
        match self.orientation() {
            Orientation::Horizontal => pos.x < HORIZONTAL_TRAILING_X,
            Orientation::Vertical => pos.y > self.height + VERTICAL_TRAILING_MARGIN,
        }
    }
}
