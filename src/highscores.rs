//! Best score tracking
//!
//! A single best score, persisted as plain decimal text.

use crate::persistence::{BEST_SCORE_KEY, KeyValueStore};

/// Best score across rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore {
    pub score: u32,
}

impl BestScore {
    /// Load from the store; missing or unparsable values count as zero
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let score = store
            .get(BEST_SCORE_KEY)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);
        if score > 0 {
            log::info!("Loaded best score {}", score);
        }
        Self { score }
    }

    /// Check if a score beats the stored best
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.score
    }

    /// Record a finished round. Writes to the store only on a new best.
    /// Returns true if the score was a new best.
    pub fn submit(&mut self, score: u32, store: &mut dyn KeyValueStore) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.score = score;
        store.set(BEST_SCORE_KEY, &score.to_string());
        log::info!("New best score: {}", score);
        true
    }
}
