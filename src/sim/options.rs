//! Answer choices for the active tile

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::dictionary::CharacterEntry;

/// Build a shuffled list of `count` choices: the correct entry plus distractors.
///
/// Distractors are drawn without repetition from pool entries with a different
/// reading (one entry per reading). A pool too small to fill the list is
/// sampled with repetition, and a pool with no other reading at all pads with
/// the correct entry.
pub fn generate_options<R: Rng>(
    rng: &mut R,
    pool: &[CharacterEntry],
    correct: CharacterEntry,
    count: usize,
) -> Vec<CharacterEntry> {
    let needed = count.max(1) - 1;

    let mut candidates: Vec<CharacterEntry> = Vec::with_capacity(pool.len());
    for entry in pool {
        if entry.reading != correct.reading
            && !candidates.iter().any(|c| c.reading == entry.reading)
        {
            candidates.push(*entry);
        }
    }

    let mut options: Vec<CharacterEntry> = if candidates.len() >= needed {
        candidates.choose_multiple(rng, needed).copied().collect()
    } else {
        log::debug!(
            "Only {} distractors for {} choices, repeating",
            candidates.len(),
            count
        );
        (0..needed)
            .map(|_| candidates.choose(rng).copied().unwrap_or(correct))
            .collect()
    };

    options.push(correct);
    options.shuffle(rng);
    options
}
