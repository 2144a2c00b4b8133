//! Web Audio backend
//!
//! Every voice is built from oscillators, noise buffers, biquad filters and
//! gain envelopes, started at an absolute `AudioContext` time.

use wasm_bindgen::JsValue;
use web_sys::{
    AudioBuffer, AudioContext, AudioContextState, AudioNode, BiquadFilterNode, BiquadFilterType,
    GainNode, OscillatorNode, OscillatorType,
};

use super::voice::{SoundEffect, Voice};
use super::{AudioBackend, AudioError};

/// Master gain applied to every voice
const MASTER_VOLUME: f32 = 0.8;

/// Audio backend on top of the browser's `AudioContext`
pub struct WebAudioBackend {
    ctx: AudioContext,
    /// Reusable white noise, long enough for the longest noise voice
    noise: Option<AudioBuffer>,
}

fn synth_err(e: JsValue) -> AudioError {
    AudioError::Synthesis(format!("{:?}", e))
}

impl WebAudioBackend {
    /// Create the audio context (fails outside a secure context or without audio support)
    pub fn open() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(format!("{:?}", e)))?;
        let noise = Self::make_noise(&ctx, 0.5).ok();
        if noise.is_none() {
            log::warn!("Failed to allocate noise buffer - percussion will be tonal only");
        }
        Ok(Self { ctx, noise })
    }

    fn make_noise(ctx: &AudioContext, secs: f32) -> Result<AudioBuffer, JsValue> {
        let rate = ctx.sample_rate();
        let len = (rate * secs) as u32;
        let buffer = ctx.create_buffer(1, len, rate)?;
        let mut samples: Vec<f32> = (0..len).map(|_| js_sys::Math::random() as f32 * 2.0 - 1.0).collect();
        buffer.copy_to_channel(&mut samples, 0)?;
        Ok(buffer)
    }

    /// Gain node wired to the destination
    fn output_gain(&self) -> Result<GainNode, JsValue> {
        let gain = self.ctx.create_gain()?;
        gain.connect_with_audio_node(&self.ctx.destination())?;
        Ok(gain)
    }

    /// Oscillator feeding `into`
    fn osc(
        &self,
        freq: f32,
        osc_type: OscillatorType,
        into: &AudioNode,
    ) -> Result<OscillatorNode, JsValue> {
        let osc = self.ctx.create_oscillator()?;
        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(into)?;
        Ok(osc)
    }

    fn filter(
        &self,
        kind: BiquadFilterType,
        freq: f32,
        into: &AudioNode,
    ) -> Result<BiquadFilterNode, JsValue> {
        let filter = self.ctx.create_biquad_filter()?;
        filter.set_type(kind);
        filter.frequency().set_value(freq);
        filter.connect_with_audio_node(into)?;
        Ok(filter)
    }

    /// Start the shared noise buffer into `into` for `secs`
    fn noise_burst(&self, into: &AudioNode, t: f64, secs: f64) -> Result<(), JsValue> {
        let Some(buffer) = &self.noise else {
            return Ok(());
        };
        let src = self.ctx.create_buffer_source()?;
        src.set_buffer(Some(buffer));
        src.connect_with_audio_node(into)?;
        src.start_with_when(t)?;
        src.stop_with_when(t + secs)?;
        Ok(())
    }

    fn exp_decay(gain: &GainNode, peak: f32, t: f64, secs: f64) -> Result<(), JsValue> {
        gain.gain().set_value_at_time(peak * MASTER_VOLUME, t)?;
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + secs)?;
        Ok(())
    }

    /// Kick - sine dropping from 150 Hz
    fn kick(&self, voice: Voice, t: f64) -> Result<(), JsValue> {
        let gain = self.output_gain()?;
        let osc = self.osc(150.0, OscillatorType::Sine, &gain)?;
        osc.frequency().set_value_at_time(150.0, t)?;
        osc.frequency().exponential_ramp_to_value_at_time(0.01, t + voice.decay())?;
        Self::exp_decay(&gain, 1.0, t, voice.decay())?;
        osc.start_with_when(t)?;
        osc.stop_with_when(t + voice.duration())?;
        Ok(())
    }

    /// Snare - high-passed noise plus a short triangle body
    fn snare(&self, voice: Voice, t: f64) -> Result<(), JsValue> {
        let noise_gain = self.output_gain()?;
        Self::exp_decay(&noise_gain, 0.7, t, voice.decay())?;
        let hp = self.filter(BiquadFilterType::Highpass, 1000.0, &noise_gain)?;
        self.noise_burst(&hp, t, voice.duration())?;

        let body_gain = self.output_gain()?;
        Self::exp_decay(&body_gain, 0.4, t, 0.1)?;
        let body = self.osc(100.0, OscillatorType::Triangle, &body_gain)?;
        body.start_with_when(t)?;
        body.stop_with_when(t + voice.duration())?;
        Ok(())
    }

    /// Hi-hat - noise through band-pass then high-pass
    fn hihat(&self, voice: Voice, t: f64) -> Result<(), JsValue> {
        let gain = self.output_gain()?;
        Self::exp_decay(&gain, 0.3, t, voice.decay())?;
        let hp = self.filter(BiquadFilterType::Highpass, 7000.0, &gain)?;
        let bp = self.filter(BiquadFilterType::Bandpass, 10000.0, &hp)?;
        self.noise_burst(&bp, t, voice.duration())
    }

    /// Bass - sawtooth through a closing low-pass, linear fade
    fn bass(&self, voice: Voice, freq: f32, t: f64) -> Result<(), JsValue> {
        let gain = self.output_gain()?;
        gain.gain().set_value_at_time(0.3 * MASTER_VOLUME, t)?;
        gain.gain().linear_ramp_to_value_at_time(0.2 * MASTER_VOLUME, t + 0.1)?;
        gain.gain().linear_ramp_to_value_at_time(0.0, t + voice.decay())?;

        let lp = self.filter(BiquadFilterType::Lowpass, 600.0, &gain)?;
        lp.frequency().set_value_at_time(600.0, t)?;
        lp.frequency().linear_ramp_to_value_at_time(100.0, t + 0.3)?;

        let osc = self.osc(freq, OscillatorType::Sawtooth, &lp)?;
        osc.frequency().set_value_at_time(freq, t)?;
        osc.start_with_when(t)?;
        osc.stop_with_when(t + voice.duration())?;
        Ok(())
    }

    /// Pluck - quiet sine accent
    fn pluck(&self, voice: Voice, freq: f32, t: f64) -> Result<(), JsValue> {
        let gain = self.output_gain()?;
        gain.gain().set_value_at_time(0.05 * MASTER_VOLUME, t)?;
        gain.gain().exponential_ramp_to_value_at_time(0.001, t + voice.decay())?;
        let osc = self.osc(freq, OscillatorType::Sine, &gain)?;
        osc.start_with_when(t)?;
        osc.stop_with_when(t + voice.duration())?;
        Ok(())
    }

    fn effect(&self, voice: Voice, effect: SoundEffect, t: f64) -> Result<(), JsValue> {
        let gain = self.output_gain()?;
        let secs = voice.duration();
        let osc = match effect {
            // Rising blip
            SoundEffect::Correct => {
                let osc = self.osc(880.0, OscillatorType::Sine, &gain)?;
                osc.frequency().set_value_at_time(880.0, t)?;
                osc.frequency().exponential_ramp_to_value_at_time(1760.0, t + secs)?;
                Self::exp_decay(&gain, 0.1, t, secs)?;
                osc
            }
            // Harsh falling buzz
            SoundEffect::Wrong => {
                let osc = self.osc(150.0, OscillatorType::Sawtooth, &gain)?;
                osc.frequency().set_value_at_time(150.0, t)?;
                osc.frequency().linear_ramp_to_value_at_time(100.0, t + secs)?;
                Self::exp_decay(&gain, 0.1, t, secs)?;
                osc
            }
            // Long descending tone
            SoundEffect::End => {
                let osc = self.osc(400.0, OscillatorType::Triangle, &gain)?;
                osc.frequency().set_value_at_time(400.0, t)?;
                osc.frequency().exponential_ramp_to_value_at_time(50.0, t + secs)?;
                gain.gain().set_value_at_time(0.2 * MASTER_VOLUME, t)?;
                gain.gain().linear_ramp_to_value_at_time(0.0, t + secs)?;
                osc
            }
        };
        osc.start_with_when(t)?;
        osc.stop_with_when(t + secs)?;
        Ok(())
    }
}

impl AudioBackend for WebAudioBackend {
    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    // `state()` only changes once the previous promise settles, so it can't
    // gate these calls. Repeats are no-ops in the browser.
    fn suspend(&mut self) {
        if self.ctx.state() != AudioContextState::Closed {
            let _ = self.ctx.suspend();
        }
    }

    fn resume(&mut self) {
        // Browsers keep new contexts suspended until a user gesture
        if self.ctx.state() != AudioContextState::Closed {
            let _ = self.ctx.resume();
        }
    }

    fn close(&mut self) {
        let _ = self.ctx.close();
    }

    fn play(&mut self, voice: Voice, at: f64) -> Result<(), AudioError> {
        if self.ctx.state() == AudioContextState::Closed {
            return Err(AudioError::Closed);
        }
        let result = match voice {
            Voice::Kick => self.kick(voice, at),
            Voice::Snare => self.snare(voice, at),
            Voice::HiHat { .. } => self.hihat(voice, at),
            Voice::Bass { freq } => self.bass(voice, freq, at),
            Voice::Pluck { freq } => self.pluck(voice, freq, at),
            Voice::Effect(effect) => self.effect(voice, effect, at),
        };
        result.map_err(synth_err)
    }
}
