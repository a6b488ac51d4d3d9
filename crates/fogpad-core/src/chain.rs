//! The contract between the engine and the signal chain.
//!
//! A [`SignalChain`] owns every DSP stage for a fixed channel count and
//! sample rate. The engine pushes parameter values into it through the
//! stage setters and hands it one [`Buffer`] per block.

use crate::buffer::Buffer;
use crate::sample::Sample;
use crate::types::{DEFAULT_SAMPLE_RATE, MAX_CHANNELS};

/// Construction parameters for a signal chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSetup {
    /// Channels the chain allocates per-channel state for.
    pub channel_count: usize,
    /// Sample rate in Hz.
    pub sample_rate: f64,
}

impl Default for ChainSetup {
    fn default() -> Self {
        Self {
            channel_count: 2,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl ChainSetup {
    /// Build a setup, forcing values into the range a chain can be built for.
    pub fn sanitized(channel_count: usize, sample_rate: f64) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        Self {
            channel_count: channel_count.clamp(1, MAX_CHANNELS),
            sample_rate,
        }
    }
}

/// Stages whose position relative to the delay/reverb mix can be switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainStage {
    BitCrusher,
    Decimator,
    Filter,
}

/// A complete effect chain.
///
/// Construction and the setters run in the control context and may allocate
/// only in [`SignalChain::new`]. [`SignalChain::process`] runs on the audio
/// thread and must not allocate, lock or block.
pub trait SignalChain: Send + Sized + 'static {
    /// Build a chain with all buffers sized for `setup`.
    fn new(setup: &ChainSetup) -> Self;

    /// Lock the delay time to the host tempo.
    fn set_delay_host_sync(&mut self, synced: bool);

    /// Normalized delay time. Interpreted as a beat subdivision when synced.
    fn set_delay_time(&mut self, time: f32);

    fn set_delay_feedback(&mut self, feedback: f32);

    /// Dry/wet balance, 0 = dry.
    fn set_delay_mix(&mut self, mix: f32);

    /// Place `stage` after (`true`) or before (`false`) the delay/reverb.
    fn set_post_mix(&mut self, stage: ChainStage, post: bool);

    /// Bit resolution amount, 1 = full resolution.
    fn set_bit_crusher_amount(&mut self, amount: f32);

    fn set_bit_crusher_lfo(&mut self, rate: f32, depth: f32);

    /// Quantization depth of the decimator, 0..=32 bits.
    fn set_decimator_bits(&mut self, bits: i32);

    /// Sample-rate reduction amount, 0 = none.
    fn set_decimator_rate(&mut self, rate: f32);

    fn set_filter(&mut self, cutoff: f32, resonance: f32, lfo_rate: f32, lfo_depth: f32);

    /// Current host tempo in BPM.
    fn set_tempo(&mut self, _bpm: f64) {}

    /// Process one block in place.
    fn process<S: Sample>(&mut self, buffer: &mut Buffer<'_, S>);

    /// Linear meter value after the last processed block.
    fn meter(&self) -> f32;

    /// Clear delay lines and filter memory.
    fn reset(&mut self) {}

    /// Samples of output that follow silence at the input.
    fn tail_samples(&self) -> u32 {
        0
    }
}
