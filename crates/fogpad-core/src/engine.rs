//! The processing engine: one signal chain plus the glue that feeds it.
//!
//! The engine owns exactly one [`SignalChain`]. Reconfiguration replaces the
//! chain wholesale; the previous instance is dropped before the new one is
//! used. Syncing translates the [`ParameterModel`] into stage setter calls.
//! Processing dispatches on the block's precision without changing the
//! algorithm.

use log::{info, warn};

use crate::buffer::AudioBlock;
use crate::chain::{ChainSetup, ChainStage, SignalChain};
use crate::parameters::{flag, unit, ParameterModel};
use crate::sample::SamplePrecision;
use crate::types::DEFAULT_TEMPO;

/// Bit depth the decimator amount is scaled to.
const DECIMATOR_MAX_BITS: f32 = 32.0;

pub struct ProcessingEngine<C: SignalChain> {
    chain: C,
    setup: ChainSetup,
    tempo: f64,
}

impl<C: SignalChain> Default for ProcessingEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SignalChain> ProcessingEngine<C> {
    /// An engine with a stereo chain at the default sample rate, so a host
    /// that processes before sending a setup still gets valid output.
    pub fn new() -> Self {
        let setup = ChainSetup::default();
        Self {
            chain: C::new(&setup),
            setup,
            tempo: DEFAULT_TEMPO,
        }
    }

    #[inline]
    pub fn setup(&self) -> &ChainSetup {
        &self.setup
    }

    #[inline]
    pub fn chain(&self) -> &C {
        &self.chain
    }

    #[inline]
    pub fn chain_mut(&mut self) -> &mut C {
        &mut self.chain
    }

    /// Whether blocks of the given precision can be processed.
    pub fn can_process(&self, precision: SamplePrecision) -> bool {
        matches!(precision, SamplePrecision::Single | SamplePrecision::Double)
    }

    /// Replace the chain with one built for `channel_count` and `sample_rate`,
    /// then re-apply `model` and the last known tempo to it.
    ///
    /// Control context only: allocates.
    pub fn reconfigure(&mut self, channel_count: usize, sample_rate: f64, model: &ParameterModel) {
        let setup = ChainSetup::sanitized(channel_count, sample_rate);
        if setup.channel_count != channel_count || setup.sample_rate != sample_rate {
            warn!(
                "Adjusted chain setup from {} ch @ {} Hz to {} ch @ {} Hz",
                channel_count, sample_rate, setup.channel_count, setup.sample_rate
            );
        }

        self.chain = C::new(&setup);
        self.setup = setup;
        info!(
            "Signal chain rebuilt: {} ch @ {} Hz",
            setup.channel_count, setup.sample_rate
        );

        self.chain.set_tempo(self.tempo);
        self.sync(model);
    }

    /// Push every model value into the chain.
    ///
    /// Values are clamped to `[0, 1]`; flag fields become booleans at 0.5.
    /// Real-time safe.
    pub fn sync(&mut self, model: &ParameterModel) {
        let chain = &mut self.chain;

        chain.set_delay_host_sync(flag(model.delay_host_sync));
        chain.set_delay_time(unit(model.delay_time));
        chain.set_delay_feedback(unit(model.delay_feedback));
        chain.set_delay_mix(unit(model.delay_mix));

        chain.set_post_mix(ChainStage::BitCrusher, flag(model.bit_resolution_chain));
        chain.set_post_mix(ChainStage::Decimator, flag(model.decimator_chain));
        chain.set_post_mix(ChainStage::Filter, flag(model.filter_chain));

        chain.set_bit_crusher_amount(unit(model.bit_resolution));
        chain.set_bit_crusher_lfo(
            unit(model.bit_resolution_lfo_rate),
            unit(model.bit_resolution_lfo_depth),
        );

        chain.set_decimator_bits((unit(model.decimator) * DECIMATOR_MAX_BITS) as i32);
        chain.set_decimator_rate(unit(model.decimator_lfo_rate));

        chain.set_filter(
            unit(model.filter_cutoff),
            unit(model.filter_resonance),
            unit(model.filter_lfo_rate),
            unit(model.filter_lfo_depth),
        );
    }

    /// Forward a host tempo. Invalid or unchanged tempos are ignored.
    pub fn set_tempo(&mut self, bpm: f64) {
        if bpm.is_finite() && bpm > 0.0 && bpm != self.tempo {
            self.tempo = bpm;
            self.chain.set_tempo(bpm);
        }
    }

    #[inline]
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Run the chain over one block and return the chain's meter value.
    ///
    /// A block without input or output channels is not touched and yields
    /// `None`.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) -> Option<f32> {
        if block.is_silent_topology() {
            return None;
        }

        match block {
            AudioBlock::Single(buffer) => self.chain.process(buffer),
            AudioBlock::Double(buffer) => self.chain.process(buffer),
        }

        Some(self.chain.meter())
    }

    /// Clear all stage memory.
    pub fn reset(&mut self) {
        self.chain.reset();
    }

    pub fn tail_samples(&self) -> u32 {
        self.chain.tail_samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::chain::recording::RecordingChain;

    #[test]
    fn test_new_engine_is_stereo() {
        let engine = ProcessingEngine::<RecordingChain>::new();
        assert_eq!(engine.setup().channel_count, 2);
        assert_eq!(engine.chain().setup, Some(ChainSetup::default()));
    }

    #[test]
    fn test_sync_transforms_values() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        let mut model = ParameterModel::default();
        model.delay_host_sync = 0.49;
        model.bit_resolution_chain = 0.5;
        model.decimator_chain = 0.0;
        model.filter_chain = 1.0;
        model.decimator = 0.5;
        model.delay_feedback = 1.7;
        model.delay_mix = f32::NAN;
        model.bit_resolution_lfo_rate = 0.3;
        model.bit_resolution_lfo_depth = 0.6;

        engine.sync(&model);
        let chain = engine.chain();

        assert!(!chain.host_sync);
        assert_eq!(chain.post, [true, false, true]);
        assert_eq!(chain.decimator_bits, 16);
        assert_eq!(chain.feedback, 1.0);
        assert_eq!(chain.mix, 0.0);
        assert_eq!(chain.bit_lfo, (0.3, 0.6));
        assert_eq!(chain.filter, (0.5, 1.0, 0.0, 0.5));
        assert_eq!(chain.syncs, 1);
    }

    #[test]
    fn test_decimator_bits_full_scale() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        engine.sync(&ParameterModel::default());
        assert_eq!(engine.chain().decimator_bits, 32);
    }

    #[test]
    fn test_reconfigure_replaces_chain_and_reapplies_model() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        engine.set_tempo(90.0);
        engine.chain_mut().meter = 0.25;

        let mut model = ParameterModel::default();
        model.delay_mix = 0.8;
        engine.reconfigure(1, 48000.0, &model);

        let chain = engine.chain();
        assert_eq!(
            chain.setup,
            Some(ChainSetup {
                channel_count: 1,
                sample_rate: 48000.0
            })
        );
        // Fresh instance: state set on the old chain is gone.
        assert_eq!(chain.meter, 1.0);
        assert_eq!(chain.syncs, 1);
        assert_eq!(chain.mix, 0.8);
        assert_eq!(chain.tempo, 90.0);
    }

    #[test]
    fn test_reconfigure_sanitizes() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        engine.reconfigure(0, -1.0, &ParameterModel::default());
        assert_eq!(engine.setup().channel_count, 1);
        assert!(engine.setup().sample_rate > 0.0);
    }

    #[test]
    fn test_zero_channel_block_is_not_processed() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        let input = [0.5f32; 8];
        let mut block = AudioBlock::Single(Buffer::new([&input[..]], std::iter::empty(), 8));

        assert_eq!(engine.process(&mut block), None);
        assert_eq!(engine.chain().blocks, 0);
    }

    #[test]
    fn test_both_precisions_run_the_same_chain() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        engine.chain_mut().meter = 0.5;

        let input32 = [0.25f32; 4];
        let mut output32 = [0.0f32; 4];
        let mut block = AudioBlock::Single(Buffer::new([&input32[..]], [&mut output32[..]], 4));
        assert_eq!(engine.process(&mut block), Some(0.5));
        drop(block);

        let input64 = [0.25f64; 4];
        let mut output64 = [0.0f64; 4];
        let mut block = AudioBlock::Double(Buffer::new([&input64[..]], [&mut output64[..]], 4));
        assert_eq!(engine.process(&mut block), Some(0.5));
        drop(block);

        assert_eq!(engine.chain().blocks, 2);
        assert_eq!(output32, [0.25; 4]);
        assert_eq!(output64, [0.25; 4]);
        assert!(engine.can_process(SamplePrecision::Double));
    }

    #[test]
    fn test_tempo_ignores_invalid_values() {
        let mut engine = ProcessingEngine::<RecordingChain>::new();
        engine.set_tempo(0.0);
        engine.set_tempo(f64::NAN);
        assert_eq!(engine.tempo(), DEFAULT_TEMPO);
        engine.set_tempo(140.0);
        assert_eq!(engine.chain().tempo, 140.0);
    }
}
