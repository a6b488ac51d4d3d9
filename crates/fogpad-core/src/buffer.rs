//! Audio buffers handed to the signal chain for one processing block.
//!
//! [`Buffer`] borrows the host's channel memory for the duration of a single
//! `process` call. Channel slices are stored in fixed-size arrays so building
//! a buffer never touches the heap. [`AudioBlock`] tags a buffer with the
//! precision the host chose for this block.

use crate::sample::{Sample, SamplePrecision};
use crate::types::MAX_CHANNELS;

/// Input and output channels for one block.
///
/// Channels beyond [`MAX_CHANNELS`] are ignored. Reading a missing input
/// channel yields silence; writing a missing output channel is a no-op.
pub struct Buffer<'a, S: Sample = f32> {
    inputs: [Option<&'a [S]>; MAX_CHANNELS],
    outputs: [Option<&'a mut [S]>; MAX_CHANNELS],
    num_input_channels: usize,
    num_output_channels: usize,
    num_samples: usize,
}

impl<'a, S: Sample> Buffer<'a, S> {
    /// Wrap host channel slices.
    ///
    /// Every slice must hold at least `num_samples` samples.
    #[inline]
    pub fn new(
        inputs: impl IntoIterator<Item = &'a [S]>,
        outputs: impl IntoIterator<Item = &'a mut [S]>,
        num_samples: usize,
    ) -> Self {
        Self::from_slots(
            inputs.into_iter().map(Some),
            outputs.into_iter().map(Some),
            num_samples,
        )
    }

    /// Wrap host channels where some slots may be missing.
    ///
    /// A `None` slot keeps its channel index: it reads as silence and
    /// swallows writes, and later channels are not shifted down.
    pub fn from_slots(
        inputs: impl IntoIterator<Item = Option<&'a [S]>>,
        outputs: impl IntoIterator<Item = Option<&'a mut [S]>>,
        num_samples: usize,
    ) -> Self {
        let mut input_arr: [Option<&'a [S]>; MAX_CHANNELS] = [None; MAX_CHANNELS];
        let mut num_input_channels = 0;
        for (i, slot) in inputs.into_iter().take(MAX_CHANNELS).enumerate() {
            input_arr[i] = slot;
            num_input_channels = i + 1;
        }

        // &mut slices are not Copy
        let mut output_arr: [Option<&'a mut [S]>; MAX_CHANNELS] = std::array::from_fn(|_| None);
        let mut num_output_channels = 0;
        for (i, slot) in outputs.into_iter().take(MAX_CHANNELS).enumerate() {
            output_arr[i] = slot;
            num_output_channels = i + 1;
        }

        Self {
            inputs: input_arr,
            outputs: output_arr,
            num_input_channels,
            num_output_channels,
            num_samples,
        }
    }

    /// A buffer with no channels at all.
    pub fn empty(num_samples: usize) -> Self {
        Self::new(std::iter::empty(), std::iter::empty(), num_samples)
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.num_output_channels
    }

    /// True when either side has no channels, meaning there is nothing to process.
    #[inline]
    pub fn is_silent_topology(&self) -> bool {
        self.num_input_channels == 0 || self.num_output_channels == 0
    }

    /// Input channel slice, or an empty slice if the channel doesn't exist.
    #[inline]
    pub fn input(&self, channel: usize) -> &[S] {
        self.inputs
            .get(channel)
            .and_then(|opt| opt.as_ref())
            .map(|ch| &ch[..self.num_samples])
            .unwrap_or(&[])
    }

    /// A single input sample, silence if out of range.
    #[inline]
    pub fn input_sample(&self, channel: usize, index: usize) -> S {
        self.input(channel).get(index).copied().unwrap_or(S::ZERO)
    }

    /// Output channel slice, `None` if the channel doesn't exist.
    #[inline]
    pub fn output_checked(&mut self, channel: usize) -> Option<&mut [S]> {
        let n = self.num_samples;
        self.outputs
            .get_mut(channel)
            .and_then(|opt| opt.as_mut())
            .map(|ch| &mut ch[..n])
    }

    /// Write a single output sample. Out of range writes are dropped.
    #[inline]
    pub fn set_output(&mut self, channel: usize, index: usize, value: S) {
        if let Some(sample) = self
            .output_checked(channel)
            .and_then(|out| out.get_mut(index))
        {
            *sample = value;
        }
    }

    /// Silence every output channel from `first_channel` on.
    pub fn clear_outputs_from(&mut self, first_channel: usize) {
        let n = self.num_samples;
        for output in self.outputs[..self.num_output_channels]
            .iter_mut()
            .skip(first_channel)
            .flatten()
        {
            output[..n].fill(S::ZERO);
        }
    }
}

/// A block of host audio tagged with its precision.
pub enum AudioBlock<'a> {
    /// 32-bit buffers.
    Single(Buffer<'a, f32>),
    /// 64-bit buffers.
    Double(Buffer<'a, f64>),
}

impl<'a> AudioBlock<'a> {
    pub fn precision(&self) -> SamplePrecision {
        match self {
            AudioBlock::Single(_) => SamplePrecision::Single,
            AudioBlock::Double(_) => SamplePrecision::Double,
        }
    }

    pub fn num_samples(&self) -> usize {
        match self {
            AudioBlock::Single(buffer) => buffer.num_samples(),
            AudioBlock::Double(buffer) => buffer.num_samples(),
        }
    }

    pub fn is_silent_topology(&self) -> bool {
        match self {
            AudioBlock::Single(buffer) => buffer.is_silent_topology(),
            AudioBlock::Double(buffer) => buffer.is_silent_topology(),
        }
    }
}

impl<'a> From<Buffer<'a, f32>> for AudioBlock<'a> {
    fn from(buffer: Buffer<'a, f32>) -> Self {
        AudioBlock::Single(buffer)
    }
}

impl<'a> From<Buffer<'a, f64>> for AudioBlock<'a> {
    fn from(buffer: Buffer<'a, f64>) -> Self {
        AudioBlock::Double(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_reads_silence() {
        let input = [0.5f32; 4];
        let mut output = [0.0f32; 4];
        let buffer = Buffer::new([&input[..]], [&mut output[..]], 4);

        assert_eq!(buffer.input_sample(0, 2), 0.5);
        assert_eq!(buffer.input_sample(1, 2), 0.0);
        assert_eq!(buffer.input_sample(0, 9), 0.0);
        assert!(buffer.input(3).is_empty());
    }

    #[test]
    fn test_missing_slots_keep_channel_indices() {
        let right_in = [0.5f32; 4];
        let mut right_out = [0.0f32; 4];
        let mut buffer = Buffer::from_slots(
            [None, Some(&right_in[..])],
            [None, Some(&mut right_out[..])],
            4,
        );

        assert_eq!(buffer.num_input_channels(), 2);
        assert_eq!(buffer.num_output_channels(), 2);
        assert!(buffer.input(0).is_empty());
        assert_eq!(buffer.input_sample(1, 0), 0.5);

        buffer.set_output(0, 0, 1.0);
        buffer.set_output(1, 0, 0.25);
        drop(buffer);
        assert_eq!(right_out, [0.25, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_output_ignores_out_of_range() {
        let mut left = [0.0f64; 2];
        let mut buffer = Buffer::new(std::iter::empty(), [&mut left[..]], 2);

        buffer.set_output(0, 1, 0.75);
        buffer.set_output(0, 5, 1.0);
        buffer.set_output(4, 0, 1.0);
        drop(buffer);

        assert_eq!(left, [0.0, 0.75]);
    }

    #[test]
    fn test_clear_outputs_from() {
        let mut left = [1.0f32; 3];
        let mut right = [1.0f32; 3];
        let mut buffer = Buffer::new(std::iter::empty(), [&mut left[..], &mut right[..]], 3);

        buffer.clear_outputs_from(1);
        drop(buffer);

        assert_eq!(left, [1.0; 3]);
        assert_eq!(right, [0.0; 3]);
    }

    #[test]
    fn test_silent_topology() {
        let input = [0.0f32; 8];
        let buffer: Buffer<'_, f32> = Buffer::new([&input[..]], std::iter::empty(), 8);
        assert!(buffer.is_silent_topology());
        assert!(Buffer::<f64>::empty(16).is_silent_topology());

        let block = AudioBlock::from(Buffer::<f64>::empty(16));
        assert_eq!(block.precision(), SamplePrecision::Double);
        assert_eq!(block.num_samples(), 16);
    }
}
