//! Look-ahead audio scheduler
//!
//! Procedurally generated backing loop and sound effects - no sample files.
//!
//! The scheduler never plays anything "now" from a timer callback. A coarse
//! timer calls [`AudioScheduler::tick`] every [`TICK_INTERVAL_MS`]; each tick
//! hands the backend every loop voice that falls inside the next
//! [`SCHEDULE_AHEAD`] seconds of the *audio* clock, stamped with its exact
//! start time. The audio hardware does the sample-accurate playback, so timer
//! jitter and slow frames never reach the beat.

pub mod offline;
pub mod pattern;
pub mod voice;
#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use offline::{OfflineDevice, ScheduledVoice};
pub use pattern::PATTERN_LENGTH;
pub use voice::{SoundEffect, Voice};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

/// Backing loop tempo
pub const TEMPO_BPM: f64 = 110.0;
/// Pattern steps per beat
pub const SUBDIVISION: f64 = 4.0;
/// Audio-clock seconds between pattern steps
pub const STEP_SECS: f64 = 60.0 / TEMPO_BPM / SUBDIVISION;
/// Delay before the first step after (re)starting the loop
pub const LEAD_TIME: f64 = 0.1;
/// How far past the audio clock each tick schedules
pub const SCHEDULE_AHEAD: f64 = 0.1;
/// Scheduling timer period
pub const TICK_INTERVAL_MS: u32 = 25;

/// Audio failures. None of these ever reach gameplay.
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    /// The audio engine could not be created
    #[error("audio engine unavailable: {0}")]
    Unavailable(String),

    /// Building or starting a voice failed
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// The backend was already closed
    #[error("audio backend closed")]
    Closed,
}

/// A hardware (or simulated) audio clock that can play voices at absolute times
pub trait AudioBackend {
    /// Monotonic audio-clock time in seconds
    fn current_time(&self) -> f64;
    /// Halt the clock. Must act even while an earlier transition is pending.
    fn suspend(&mut self);
    /// Restart the clock. Must act even while an earlier transition is pending.
    fn resume(&mut self);
    /// Release the engine
    fn close(&mut self);
    /// Synthesize `voice` starting at audio-clock time `at`
    fn play(&mut self, voice: Voice, at: f64) -> Result<(), AudioError>;
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// Backend not opened yet
    Uninitialized,
    /// Clock running
    Running,
    /// Clock halted
    Suspended,
    /// Released for good
    Closed,
    /// Backend failed to open; everything is a silent no-op
    Unavailable,
}

/// Opens the backend on first use
pub type Opener<B> = Box<dyn FnMut() -> Result<B, AudioError>>;

/// Owns the audio clock and schedules the backing loop and effects against it
pub struct AudioScheduler<B: AudioBackend> {
    open: Opener<B>,
    backend: Option<B>,
    state: AudioState,
    muted: bool,
    /// Whether ticks should schedule the backing loop
    looping: bool,
    /// Audio-clock time of the next unscheduled step
    next_event_time: f64,
    /// Steps scheduled since the loop started
    beat_index: u64,
    rng: Pcg32,
    synthesis_failures: u32,
}

impl<B: AudioBackend> AudioScheduler<B> {
    pub fn new(open: impl FnMut() -> Result<B, AudioError> + 'static, seed: u64) -> Self {
        Self {
            open: Box::new(open),
            backend: None,
            state: AudioState::Uninitialized,
            muted: false,
            looping: false,
            next_event_time: 0.0,
            beat_index: 0,
            rng: Pcg32::seed_from_u64(seed),
            synthesis_failures: 0,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AudioState::Running
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn beat_index(&self) -> u64 {
        self.beat_index
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Whether the driver should keep the scheduling timer alive
    pub fn wants_ticks(&self) -> bool {
        self.state == AudioState::Running && self.looping && !self.muted
    }

    /// Open the backend if needed and start the loop from the top.
    ///
    /// Safe to call repeatedly; a loop that is already playing is left alone.
    pub fn initialize(&mut self) {
        match self.state {
            AudioState::Closed | AudioState::Unavailable => return,
            AudioState::Uninitialized => match (self.open)() {
                Ok(backend) => {
                    log::info!("Audio engine initialized");
                    self.backend = Some(backend);
                }
                Err(e) => {
                    log::warn!("{} - audio disabled", e);
                    self.state = AudioState::Unavailable;
                    return;
                }
            },
            AudioState::Running | AudioState::Suspended => {}
        }

        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        if self.muted {
            if self.state == AudioState::Uninitialized {
                backend.suspend();
                self.state = AudioState::Suspended;
            }
            return;
        }

        if self.state == AudioState::Running && self.looping {
            return;
        }

        backend.resume();
        self.state = AudioState::Running;
        self.looping = true;
        self.beat_index = 0;
        self.next_event_time = backend.current_time() + LEAD_TIME;
        log::debug!("Backing loop started at {:.3}s", self.next_event_time);
    }

    /// Halt scheduling and the audio clock. Returns false if nothing was running.
    pub fn suspend(&mut self) -> bool {
        if self.state != AudioState::Running {
            return false;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.suspend();
        }
        self.state = AudioState::Suspended;
        log::debug!("Audio suspended at beat {}", self.beat_index);
        true
    }

    /// Restart the clock and re-arm the loop at "now + lead time".
    ///
    /// Beats that would have played while suspended are dropped, not replayed.
    pub fn resume(&mut self) -> bool {
        if self.muted || self.state != AudioState::Suspended {
            return false;
        }
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        backend.resume();
        self.state = AudioState::Running;
        self.looping = true;
        self.next_event_time = backend.current_time() + LEAD_TIME;
        log::debug!("Audio resumed, next step at {:.3}s", self.next_event_time);
        true
    }

    /// Stop scheduling the loop but keep the clock running so effects ring out
    pub fn stop_loop(&mut self) {
        self.looping = false;
    }

    /// Release the backend. Irreversible.
    pub fn close(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.close();
            log::info!("Audio engine closed");
        }
        self.state = AudioState::Closed;
        self.looping = false;
    }

    /// Muting halts the clock. Unmuting only clears the flag; the caller
    /// decides whether there is anything to resume.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted == muted {
            return;
        }
        self.muted = muted;
        if muted {
            self.suspend();
        }
        log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
    }

    /// One scheduling pass. Returns the number of voices handed to the backend.
    pub fn tick(&mut self) -> usize {
        if !self.wants_ticks() {
            return 0;
        }
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };

        let now = backend.current_time();

        // Starved timer: jump forward on the step grid instead of bursting
        if self.next_event_time < now {
            let skipped = ((now - self.next_event_time) / STEP_SECS).ceil() as u64;
            self.next_event_time += skipped as f64 * STEP_SECS;
            self.beat_index += skipped;
            log::debug!("Audio scheduler fell behind, skipped {} steps", skipped);
        }

        let horizon = now + SCHEDULE_AHEAD;
        let mut scheduled = 0;
        while self.next_event_time < horizon {
            let step = self.beat_index % PATTERN_LENGTH;
            for voice in pattern::voices_for_step(step, &mut self.rng) {
                if dispatch(backend, voice, self.next_event_time, &mut self.synthesis_failures) {
                    scheduled += 1;
                }
            }
            self.next_event_time += STEP_SECS;
            self.beat_index += 1;
        }
        scheduled
    }

    /// Play a transient effect at the current audio-clock time
    pub fn play_effect(&mut self, effect: SoundEffect) -> bool {
        if self.muted || self.state != AudioState::Running {
            return false;
        }
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        let now = backend.current_time();
        dispatch(backend, Voice::Effect(effect), now, &mut self.synthesis_failures)
    }
}

/// Hand a voice to the backend, absorbing failures
fn dispatch<B: AudioBackend>(backend: &mut B, voice: Voice, at: f64, failures: &mut u32) -> bool {
    match backend.play(voice, at) {
        Ok(()) => true,
        Err(e) => {
            *failures += 1;
            if *failures == 1 {
                log::warn!("{} (further failures logged at debug)", e);
            } else {
                log::debug!("{}", e);
            }
            false
        }
    }
}
