//! The complete FogPad chain.
//!
//! Per frame and output channel:
//!
//! ```text
//! input ─► [pre stages] ─┬─► delay ─► (+) ─► reverb ─► wet ─┐
//!                        └───────────────┘                  ├─► mix ─► [post stages] ─► limiter
//!                        └──────────────────────────── dry ─┘
//! ```
//!
//! The bit crusher, decimator and filter each sit either before the delay
//! (pre) or after the mix (post), as set by their chain flag. A mono input
//! feeds every output channel.

use fogpad_core::{Buffer, ChainSetup, ChainStage, Sample, SignalChain, DEFAULT_TEMPO, MAX_CHANNELS};

use crate::bit_crusher::BitCrusher;
use crate::decimator::Decimator;
use crate::delay::{DelayLine, DelayTiming};
use crate::filter::{FilterState, ResonantFilter};
use crate::limiter::Limiter;
use crate::reverb::ReverbChannel;

/// Seconds of reverb tail reported on top of the delay repeats.
const REVERB_TAIL_SECONDS: f64 = 2.0;

/// Echo repeats counted in the reported tail.
const TAIL_REPEATS: usize = 4;

struct ChannelState {
    decimator: Decimator,
    filter: FilterState,
    delay: DelayLine,
    reverb: ReverbChannel,
}

pub struct ReverbProcess {
    sample_rate: f64,
    channels: Vec<ChannelState>,
    bit_crusher: BitCrusher,
    filter: ResonantFilter,
    timing: DelayTiming,
    mix: f64,
    bit_crusher_post: bool,
    decimator_post: bool,
    filter_post: bool,
    limiter: Limiter,
}

impl ReverbProcess {
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_post_mix(&self, stage: ChainStage) -> bool {
        match stage {
            ChainStage::BitCrusher => self.bit_crusher_post,
            ChainStage::Decimator => self.decimator_post,
            ChainStage::Filter => self.filter_post,
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.timing.samples()
    }
}

impl SignalChain for ReverbProcess {
    fn new(setup: &ChainSetup) -> Self {
        let sample_rate = setup.sample_rate;
        let channels = (0..setup.channel_count.min(MAX_CHANNELS))
            .map(|channel| ChannelState {
                decimator: Decimator::default(),
                filter: FilterState::default(),
                delay: DelayLine::new(sample_rate),
                reverb: ReverbChannel::new(sample_rate, channel),
            })
            .collect();

        Self {
            sample_rate,
            channels,
            bit_crusher: BitCrusher::new(sample_rate),
            filter: ResonantFilter::new(sample_rate),
            timing: DelayTiming::new(sample_rate, DEFAULT_TEMPO),
            mix: 0.0,
            bit_crusher_post: false,
            decimator_post: false,
            filter_post: false,
            limiter: Limiter::new(sample_rate),
        }
    }

    fn set_delay_host_sync(&mut self, synced: bool) {
        self.timing.set_synced(synced);
    }

    fn set_delay_time(&mut self, time: f32) {
        self.timing.set_time(time);
    }

    fn set_delay_feedback(&mut self, feedback: f32) {
        self.timing.set_feedback(feedback);
    }

    fn set_delay_mix(&mut self, mix: f32) {
        self.mix = (mix as f64).clamp(0.0, 1.0);
    }

    fn set_post_mix(&mut self, stage: ChainStage, post: bool) {
        match stage {
            ChainStage::BitCrusher => self.bit_crusher_post = post,
            ChainStage::Decimator => self.decimator_post = post,
            ChainStage::Filter => self.filter_post = post,
        }
    }

    fn set_bit_crusher_amount(&mut self, amount: f32) {
        self.bit_crusher.set_amount(amount);
    }

    fn set_bit_crusher_lfo(&mut self, rate: f32, depth: f32) {
        self.bit_crusher.set_lfo(rate, depth);
    }

    fn set_decimator_bits(&mut self, bits: i32) {
        for channel in &mut self.channels {
            channel.decimator.set_bits(bits);
        }
    }

    fn set_decimator_rate(&mut self, rate: f32) {
        for channel in &mut self.channels {
            channel.decimator.set_rate(rate);
        }
    }

    fn set_filter(&mut self, cutoff: f32, resonance: f32, lfo_rate: f32, lfo_depth: f32) {
        self.filter
            .update_properties(cutoff, resonance, lfo_rate, lfo_depth);
    }

    fn set_tempo(&mut self, bpm: f64) {
        self.timing.set_tempo(bpm);
    }

    fn process<S: Sample>(&mut self, buffer: &mut Buffer<'_, S>) {
        let num_inputs = buffer.num_input_channels();
        let num_outputs = buffer.num_output_channels().min(self.channels.len());
        if num_inputs == 0 || num_outputs == 0 {
            return;
        }

        let delay = self.timing.samples();
        let feedback = self.timing.feedback();
        let wet_gain = self.mix;
        let dry_gain = 1.0 - self.mix;
        let mut frame = [0.0f64; MAX_CHANNELS];

        for i in 0..buffer.num_samples() {
            self.bit_crusher.advance();
            self.filter.advance();

            for (ch, state) in self.channels[..num_outputs].iter_mut().enumerate() {
                let input = buffer.input_sample(ch.min(num_inputs - 1), i).to_f64();

                let mut dry = input;
                if !self.bit_crusher_post {
                    dry = self.bit_crusher.process(dry);
                }
                if !self.decimator_post {
                    dry = state.decimator.process(dry);
                }
                if !self.filter_post {
                    dry = self.filter.process(&mut state.filter, dry);
                }

                let echo = state.delay.process(dry, delay, feedback);
                let wet = state.reverb.process(dry + echo);

                let mut out = dry * dry_gain + wet * wet_gain;
                if self.bit_crusher_post {
                    out = self.bit_crusher.process(out);
                }
                if self.decimator_post {
                    out = state.decimator.process(out);
                }
                if self.filter_post {
                    out = self.filter.process(&mut state.filter, out);
                }
                frame[ch] = out;
            }

            self.limiter.process(&mut frame[..num_outputs]);
            for (ch, &sample) in frame[..num_outputs].iter().enumerate() {
                buffer.set_output(ch, i, S::from_f64(sample));
            }
        }

        buffer.clear_outputs_from(num_outputs);
    }

    fn meter(&self) -> f32 {
        self.limiter.linear_gain_reduction() as f32
    }

    fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.decimator.reset();
            channel.filter = FilterState::default();
            channel.delay.clear();
            channel.reverb.clear();
        }
        self.bit_crusher.reset();
        self.filter.reset();
        self.limiter.reset();
    }

    fn tail_samples(&self) -> u32 {
        let tail = self.timing.samples() * TAIL_REPEATS
            + (REVERB_TAIL_SECONDS * self.sample_rate) as usize;
        tail.min(u32::MAX as usize) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fogpad_core::{AudioBlock, FogPad, ParameterModel, ProcessingEngine};

    fn stereo() -> ReverbProcess {
        ReverbProcess::new(&ChainSetup::default())
    }

    fn run<S: Sample>(chain: &mut ReverbProcess, input: &[S], channels: usize) -> Vec<Vec<S>> {
        let mut outputs = vec![vec![S::ZERO; input.len()]; channels];
        let mut buffer = Buffer::new(
            [input],
            outputs.iter_mut().map(|o| o.as_mut_slice()),
            input.len(),
        );
        chain.process(&mut buffer);
        outputs
    }

    #[test]
    fn test_tail_covers_echoes_and_reverb() {
        let mut chain = stereo();
        chain.set_delay_time(0.1);
        let delay = chain.delay_samples() as u32;
        assert_eq!(chain.tail_samples(), delay * 4 + 88_200);
    }

    #[test]
    fn test_silence_in_silence_out_both_precisions() {
        let mut single = stereo();
        let mut double = stereo();
        let out32 = run(&mut single, &[0.0f32; 512], 2);
        let out64 = run(&mut double, &[0.0f64; 512], 2);

        assert!(out32.iter().flatten().all(|&s| s == 0.0));
        assert!(out64.iter().flatten().all(|&s| s == 0.0));
        assert_eq!(single.meter(), double.meter());
        assert_eq!(single.meter(), 1.0);
    }

    #[test]
    fn test_precisions_agree_on_signal() {
        let mut engine32 = ProcessingEngine::<ReverbProcess>::new();
        let mut engine64 = ProcessingEngine::<ReverbProcess>::new();
        let mut model = ParameterModel::default();
        model.delay_mix = 0.7;
        model.bit_resolution = 0.6;
        engine32.sync(&model);
        engine64.sync(&model);

        let input32: Vec<f32> = (0..1024).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect();
        let input64: Vec<f64> = input32.iter().map(|&s| s as f64).collect();

        let out32 = run(engine32.chain_mut(), &input32, 2);
        let out64 = run(engine64.chain_mut(), &input64, 2);

        for (a, b) in out32.iter().flatten().zip(out64.iter().flatten()) {
            assert!((*a as f64 - *b).abs() < 1e-6);
        }
        assert_eq!(engine32.chain().meter(), engine64.chain().meter());
    }

    #[test]
    fn test_mono_input_feeds_both_outputs() {
        let mut chain = stereo();
        chain.set_delay_mix(0.0);
        let out = run(&mut chain, &[0.25f32; 64], 2);
        assert_eq!(out[0], out[1]);
        assert!(out[0].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_extra_outputs_silenced() {
        let mut chain = ReverbProcess::new(&ChainSetup {
            channel_count: 1,
            sample_rate: 44100.0,
        });
        let input = [0.5f32; 8];
        let mut left = [0.0f32; 8];
        let mut right = [9.0f32; 8];
        let mut buffer = Buffer::new([&input[..]], [&mut left[..], &mut right[..]], 8);
        chain.process(&mut buffer);
        drop(buffer);

        assert_eq!(right, [0.0; 8]);
        assert!(left.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_hot_signal_drives_meter_below_unity() {
        let mut chain = stereo();
        chain.set_delay_mix(0.0);
        run(&mut chain, &[4.0f32; 32], 2);
        // Settles around 1/4; any filter overshoot only pushes it lower.
        assert!(chain.meter() > 0.2 && chain.meter() < 0.3);
    }

    #[test]
    fn test_post_flags() {
        let mut chain = stereo();
        chain.set_post_mix(ChainStage::Filter, true);
        assert!(chain.is_post_mix(ChainStage::Filter));
        assert!(!chain.is_post_mix(ChainStage::Decimator));
    }

    #[test]
    fn test_synced_delay_follows_tempo() {
        let mut chain = stereo();
        chain.set_delay_host_sync(true);
        chain.set_delay_time(0.6);
        let at_120 = chain.delay_samples();
        chain.set_tempo(60.0);
        assert_eq!(chain.delay_samples(), at_120 * 2);
    }

    #[test]
    fn test_reset_clears_tail() {
        let mut chain = stereo();
        chain.set_delay_mix(1.0);
        run(&mut chain, &[0.5f32; 256], 2);
        chain.reset();
        let out = run(&mut chain, &[0.0f32; 256], 2);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_full_plugin_round_trip() {
        let mut pad = FogPad::<ReverbProcess>::new();
        pad.set_active(true);
        let input = [0.2f32; 128];
        let mut left = [0.0f32; 128];
        let mut right = [0.0f32; 128];
        let mut block = AudioBlock::Single(Buffer::new(
            [&input[..], &input[..]],
            [&mut left[..], &mut right[..]],
            128,
        ));
        let update = pad.process(std::iter::empty::<fogpad_core::AutomationEvent>(), &mut block);
        drop(block);

        // Quiet input: limiter idle, meter moves from the reset 0 to 1.
        assert_eq!(update.map(|u| u.value), Some(1.0));
        assert!(left.iter().all(|s| s.is_finite()));
    }
}
