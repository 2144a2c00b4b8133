//! The backing loop: a 16-step drum/bass pattern
//!
//! Placement is fixed; only the melodic accent is drawn at random.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::voice::Voice;

/// Steps per cycle (sixteenth notes in one bar)
pub const PATTERN_LENGTH: u64 = 16;

/// Chance of a melodic accent on an eligible step
pub const ACCENT_PROBABILITY: f64 = 0.1;

/// Pentatonic accent pitches (G4, A4, C5, D5)
const ACCENT_FREQS: [f32; 4] = [392.00, 440.00, 523.25, 587.33];

const KICK_STEPS: [u64; 4] = [0, 2, 8, 14];
const SNARE_STEPS: [u64; 2] = [4, 12];
const OFFBEAT_HAT_STEPS: [u64; 2] = [7, 15];
const ACCENT_STEPS: [u64; 2] = [0, 6];

/// Bass pitch for a step, if the step carries one
fn bass_freq(step: u64) -> Option<f32> {
    match step {
        0 | 8 => Some(55.0),
        14 => Some(82.4),
        _ => None,
    }
}

/// Voices for the fixed part of a step
pub fn fixed_voices(step: u64) -> Vec<Voice> {
    let step = step % PATTERN_LENGTH;
    let mut voices = Vec::with_capacity(4);

    if KICK_STEPS.contains(&step) {
        voices.push(Voice::Kick);
    }
    if SNARE_STEPS.contains(&step) {
        voices.push(Voice::Snare);
    }
    if step % 2 == 0 {
        voices.push(Voice::HiHat { open: step == 2 });
    } else if OFFBEAT_HAT_STEPS.contains(&step) {
        voices.push(Voice::HiHat { open: false });
    }
    if let Some(freq) = bass_freq(step) {
        voices.push(Voice::Bass { freq });
    }

    voices
}

/// All voices for a step, including the random accent
pub fn voices_for_step<R: Rng>(step: u64, rng: &mut R) -> Vec<Voice> {
    let mut voices = fixed_voices(step);
    // Draw on every eligible step so the sequence of draws doesn't depend on outcomes
    if ACCENT_STEPS.contains(&(step % PATTERN_LENGTH)) && rng.random_bool(ACCENT_PROBABILITY) {
        if let Some(&freq) = ACCENT_FREQS.choose(rng) {
            voices.push(Voice::Pluck { freq });
        }
    }
    voices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn count(voice_match: impl Fn(&Voice) -> bool) -> usize {
        (0..PATTERN_LENGTH)
            .map(|s| fixed_voices(s).iter().filter(|v| voice_match(v)).count())
            .sum()
    }

    #[test]
    fn test_pattern_placement() {
        assert_eq!(count(|v| matches!(v, Voice::Kick)), 4);
        assert_eq!(count(|v| matches!(v, Voice::Snare)), 2);
        // 8 even steps + 2 offbeats
        assert_eq!(count(|v| matches!(v, Voice::HiHat { .. })), 10);
        assert_eq!(count(|v| matches!(v, Voice::HiHat { open: true })), 1);
        assert_eq!(count(|v| matches!(v, Voice::Bass { .. })), 3);

        assert!(fixed_voices(2).contains(&Voice::HiHat { open: true }));
        assert!(fixed_voices(14).contains(&Voice::Bass { freq: 82.4 }));
        assert!(fixed_voices(3).is_empty());
    }

    #[test]
    fn test_pattern_repeats() {
        for step in 0..PATTERN_LENGTH {
            assert_eq!(fixed_voices(step), fixed_voices(step + PATTERN_LENGTH * 7));
        }
    }

    #[test]
    fn test_accents_only_on_eligible_steps() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut accents = 0;
        for step in 0..PATTERN_LENGTH * 200 {
            let voices = voices_for_step(step, &mut rng);
            let plucks: Vec<_> = voices
                .iter()
                .filter(|v| matches!(v, Voice::Pluck { .. }))
                .collect();
            if !plucks.is_empty() {
                assert!(ACCENT_STEPS.contains(&(step % PATTERN_LENGTH)));
                assert_eq!(plucks.len(), 1);
                accents += 1;
            }
        }
        // 400 eligible draws at p = 0.1
        assert!(accents > 10 && accents < 90, "accents = {}", accents);
    }
}
