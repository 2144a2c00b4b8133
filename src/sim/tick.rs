//! Per-frame stream step and answer resolution
//!
//! Each frame runs move, spawn, deadline and reap in that order. The caller
//! takes a snapshot afterwards and feeds the returned events to audio.

use super::state::{StreamEvent, StreamPhase, StreamState};
use crate::consts::*;

/// Advance the stream by one animation frame
pub fn advance(state: &mut StreamState, elapsed_secs: f32) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    if state.phase != StreamPhase::Running {
        return events;
    }

    let elapsed = elapsed_secs.clamp(0.0, MAX_FRAME_SECS);
    state.frames += 1;

    // Move
    let delta = state.layout.direction() * state.pacing.step(state.speed, elapsed);
    for tile in state.tiles.iter_mut() {
        tile.pos += delta;
    }

    // Spawn
    let gap_cleared = state
        .tiles
        .back()
        .is_none_or(|tail| state.layout.spawn_gap_cleared(tail.pos));
    if gap_cleared {
        state.spawn_tile(&mut events);
    }

    // Deadline
    let missed = state
        .active_tile()
        .filter(|tile| tile.is_pending() && state.layout.past_deadline(tile.pos))
        .map(|tile| tile.id);
    if let Some(id) = missed {
        if let Some(tile) = state.tiles.get_mut(state.active_index) {
            tile.resolve(false);
        }
        events.push(StreamEvent::Missed { id });
        log::debug!("Missed tile {} ({} lives left)", id, state.lives.saturating_sub(1));
        if state.lose_life(&mut events) {
            return events;
        }
        state.advance_active(&mut events);
    }

    // Reap - never the active tile
    let head_gone = state
        .tiles
        .front()
        .is_some_and(|head| state.layout.past_trailing_edge(head.pos));
    if head_gone && state.active_index > 0 {
        state.tiles.pop_front();
        state.active_index -= 1;
    }

    events
}

/// Resolve the active tile against the player's pick
pub fn submit_answer(state: &mut StreamState, reading: &str) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    if state.phase != StreamPhase::Running {
        return events;
    }

    let index = state.active_index;
    let Some(tile) = state.tiles.get_mut(index) else {
        return events;
    };
    if !tile.is_pending() {
        return events;
    }

    let correct = tile.reading() == reading;
    tile.resolve(correct);
    events.push(StreamEvent::Answered { id: tile.id, correct });

    if correct {
        state.score += 1;
        if state.score % SPEED_STEP_POINTS == 0 {
            state.speed += SPEED_STEP;
            events.push(StreamEvent::SpeedUp { speed: state.speed });
            log::debug!("Speed up to {:.2} at score {}", state.speed, state.score);
        }
    } else if state.lose_life(&mut events) {
        return events;
    }

    state.advance_active(&mut events);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{CharacterEntry, KanaDictionary};
    use crate::pool::default_pool;
    use crate::settings::{Level, Pacing};
    use crate::sim::layout::Layout;
    use crate::sim::state::{RoundConfig, TileStatus};
    use glam::Vec2;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn running(layout: Layout, level: Level, seed: u64) -> StreamState {
        let config = RoundConfig {
            level,
            pacing: Pacing::FrameCoupled,
            seed,
        };
        let mut state = StreamState::new(default_pool(&KanaDictionary), layout, config);
        state.start();
        state
    }

    fn desktop() -> StreamState {
        running(Layout::new(1024.0, 768.0), Level::Normal, 42)
    }

    fn active_reading(state: &StreamState) -> &'static str {
        state.active_tile().map(|t| t.reading()).unwrap_or("")
    }

    #[test]
    fn test_correct_answer_scores_and_advances() {
        let mut state = desktop();
        let reading = active_reading(&state);
        let first_id = state.tiles[0].id;

        let events = submit_answer(&mut state, reading);

        assert_eq!(state.tiles[0].status(), TileStatus::Correct);
        assert_eq!(state.score, 1);
        assert_eq!(state.active_index, 1);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(
            events[0],
            StreamEvent::Answered {
                id: first_id,
                correct: true
            }
        );
    }

    #[test]
    fn test_wrong_answer_costs_a_life() {
        let mut state = desktop();
        let events = submit_answer(&mut state, "not-a-reading");

        assert_eq!(state.tiles[0].status(), TileStatus::Wrong);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.active_index, 1);
        assert!(matches!(events[0], StreamEvent::Answered { correct: false, .. }));
    }

    #[test]
    fn test_fast_answer_forces_spawn() {
        let mut state = desktop();
        assert_eq!(state.tiles.len(), 1);
        let reading = active_reading(&state);

        let events = submit_answer(&mut state, reading);

        // Spawned despite the gap not being cleared
        assert_eq!(state.tiles.len(), 2);
        assert!(events.iter().any(|e| matches!(e, StreamEvent::Spawned { .. })));
        let active = active_reading(&state);
        assert!(state.options.iter().any(|o| o.reading == active));
    }

    #[test]
    fn test_speed_up_every_five_points() {
        let mut state = desktop();
        let mut speed_ups = 0;
        for _ in 0..10 {
            let reading = active_reading(&state);
            speed_ups += submit_answer(&mut state, reading)
                .iter()
                .filter(|e| matches!(e, StreamEvent::SpeedUp { .. }))
                .count();
        }
        assert_eq!(state.score, 10);
        assert_eq!(speed_ups, 2);
        assert!((state.speed - 1.6).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_tiles_move_left() {
        let mut state = desktop();
        let before = state.tiles[0].pos;
        advance(&mut state, FRAME);
        assert_eq!(state.tiles[0].pos, before + Vec2::new(-1.5, 0.0));
        assert_eq!(state.frames, 1);
    }

    #[test]
    fn test_vertical_tiles_fall() {
        let mut state = running(Layout::new(400.0, 900.0), Level::Fast, 3);
        let before = state.tiles[0].pos;
        advance(&mut state, FRAME);
        assert_eq!(state.tiles[0].pos, before + Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_time_normalized_pacing_clamps_long_frames() {
        let mut state = desktop();
        state.pacing = Pacing::TimeNormalized { reference_hz: 60.0 };
        let before = state.tiles[0].pos.x;
        advance(&mut state, 5.0);
        let moved = before - state.tiles[0].pos.x;
        assert!((moved - 1.5 * MAX_FRAME_SECS * 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_spawns_respect_gap() {
        let mut state = desktop();
        for _ in 0..400 {
            advance(&mut state, FRAME);
        }
        assert!(state.tiles.len() > 1);
        for pair in state.tiles.iter().collect::<Vec<_>>().windows(2) {
            assert!(pair[1].pos.x - pair[0].pos.x > SPAWN_GAP - 2.0);
        }
    }

    #[test]
    fn test_paused_round_is_frozen() {
        let mut state = desktop();
        state.pause();
        let before = state.tiles[0].pos;
        let reading = active_reading(&state);

        assert!(advance(&mut state, FRAME).is_empty());
        assert!(submit_answer(&mut state, reading).is_empty());
        assert_eq!(state.tiles[0].pos, before);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_miss_on_last_life_ends_round_once() {
        let mut state = desktop();
        state.lives = 1;
        let mut all = Vec::new();
        for _ in 0..2000 {
            all.extend(advance(&mut state, FRAME));
        }

        let ended: Vec<_> = all
            .iter()
            .filter(|e| matches!(e, StreamEvent::RoundEnded { .. }))
            .collect();
        assert_eq!(ended, vec![&StreamEvent::RoundEnded { score: 0 }]);
        assert_eq!(state.phase, StreamPhase::Ended);
        assert_eq!(state.lives, 0);
        assert_eq!(state.tiles[state.active_index].status(), TileStatus::Wrong);
        assert!(!state.wants_next_frame());
    }

    #[test]
    fn test_miss_advances_and_reaps() {
        let mut state = desktop();
        // Park the only tile beyond both the deadline and the trailing edge
        state.tiles[0].pos = Vec2::new(-300.0, 256.0);
        let missed_id = state.tiles[0].id;

        let events = advance(&mut state, FRAME);

        assert!(events.contains(&StreamEvent::Missed { id: missed_id }));
        assert_eq!(state.lives, STARTING_LIVES - 1);
        // Replacement spawned, missed head reaped
        assert_eq!(state.tiles.len(), 1);
        assert_eq!(state.active_index, 0);
        assert!(state.tiles[0].is_pending());
    }

    #[test]
    fn test_active_head_is_never_reaped() {
        let mut state = desktop();
        state.tiles[0].resolve(true);
        state.tiles[0].pos = Vec2::new(-300.0, 256.0);

        advance(&mut state, FRAME);

        assert_eq!(state.active_index, 0);
        assert!(state.tiles[0].pos.x < HORIZONTAL_TRAILING_X);
    }

    #[test]
    fn test_single_entry_pool_keeps_running() {
        let pool = vec![CharacterEntry::new("カ", "ka")];
        let mut state = StreamState::new(pool, Layout::default(), RoundConfig::default());
        state.start();
        assert_eq!(state.options.len(), 2);
        submit_answer(&mut state, "ka");
        assert_eq!(state.score, 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Frame,
        Correct,
        Wrong,
        TogglePause,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => Just(Op::Frame),
            2 => Just(Op::Correct),
            1 => Just(Op::Wrong),
            1 => Just(Op::TogglePause),
        ]
    }

    proptest! {
        #[test]
        fn prop_stream_invariants(
            width in 200.0f32..2000.0,
            height in 300.0f32..1400.0,
            seed in any::<u64>(),
            level in 1u8..=3,
            ops in prop::collection::vec(op_strategy(), 1..400),
        ) {
            let level = Level::from_number(level).unwrap_or_default();
            let mut state = running(Layout::new(width, height), level, seed);
            let mut ended = 0;

            for op in ops {
                let score = state.score;
                let lives = state.lives;

                let events = match op {
                    Op::Frame => advance(&mut state, FRAME),
                    Op::Correct => {
                        let reading = active_reading(&state);
                        submit_answer(&mut state, reading)
                    }
                    Op::Wrong => submit_answer(&mut state, "??"),
                    Op::TogglePause => {
                        if !state.pause() {
                            state.resume();
                        }
                        Vec::new()
                    }
                };

                ended += events
                    .iter()
                    .filter(|e| matches!(e, StreamEvent::RoundEnded { .. }))
                    .count();

                prop_assert!(state.active_index < state.tiles.len());
                prop_assert!(state.score >= score);
                prop_assert!(lives - state.lives <= 1);
                prop_assert!(ended <= 1);
                prop_assert_eq!(state.phase == StreamPhase::Ended, state.lives == 0);
                prop_assert!(state.tiles.iter().zip(state.tiles.iter().skip(1)).all(|(a, b)| a.id < b.id));

                if state.phase != StreamPhase::Ended {
                    let active = active_reading(&state);
                    prop_assert!(state.tiles[state.active_index].is_pending());
                    prop_assert_eq!(state.options.len(), state.level.choice_count(state.score));
                    prop_assert_eq!(state.options.iter().filter(|o| o.reading == active).count(), 1);
                }
            }
        }
    }
}
