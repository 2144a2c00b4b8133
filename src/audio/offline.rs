//! Offline audio device
//!
//! A software clock advanced by the caller instead of sound hardware. Voices
//! are recorded rather than rendered, which makes the scheduler observable in
//! the native headless driver and in tests. Clones share the same device.

use std::cell::RefCell;
use std::rc::Rc;

use super::voice::Voice;
use super::{AudioBackend, AudioError};

/// A voice handed to the device, with its absolute start time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledVoice {
    pub voice: Voice,
    pub at: f64,
}

#[derive(Debug, Default)]
struct DeviceState {
    time: f64,
    suspended: bool,
    closed: bool,
    fail_voices: bool,
    scheduled: Vec<ScheduledVoice>,
}

/// Shared handle to a software audio clock
#[derive(Debug, Clone, Default)]
pub struct OfflineDevice {
    inner: Rc<RefCell<DeviceState>>,
}

impl OfflineDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. A suspended or closed device doesn't move.
    pub fn advance(&self, secs: f64) {
        let mut state = self.inner.borrow_mut();
        if !state.suspended && !state.closed {
            state.time += secs;
        }
    }

    pub fn now(&self) -> f64 {
        self.inner.borrow().time
    }

    pub fn is_suspended(&self) -> bool {
        self.inner.borrow().suspended
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    /// Make every subsequent `play` fail (simulates a synthesis fault)
    pub fn set_fail_voices(&self, fail: bool) {
        self.inner.borrow_mut().fail_voices = fail;
    }

    /// Everything scheduled so far, in scheduling order
    pub fn scheduled(&self) -> Vec<ScheduledVoice> {
        self.inner.borrow().scheduled.clone()
    }

    /// Drain the record
    pub fn take_scheduled(&self) -> Vec<ScheduledVoice> {
        std::mem::take(&mut self.inner.borrow_mut().scheduled)
    }
}

impl AudioBackend for OfflineDevice {
    fn current_time(&self) -> f64 {
        self.now()
    }

    fn suspend(&mut self) {
        self.inner.borrow_mut().suspended = true;
    }

    fn resume(&mut self) {
        self.inner.borrow_mut().suspended = false;
    }

    fn close(&mut self) {
        self.inner.borrow_mut().closed = true;
    }

    fn play(&mut self, voice: Voice, at: f64) -> Result<(), AudioError> {
        let mut state = self.inner.borrow_mut();
        if state.closed {
            return Err(AudioError::Closed);
        }
        if state.fail_voices {
            return Err(AudioError::Synthesis(format!("{:?} rejected", voice)));
        }
        state.scheduled.push(ScheduledVoice { voice, at });
        Ok(())
    }
}
