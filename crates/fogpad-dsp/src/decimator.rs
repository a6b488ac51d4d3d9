//! Sample-and-hold rate reduction with its own quantizer.

/// Bit depth at or above which the quantizer is transparent.
pub const MAX_BITS: i32 = 32;

/// Fraction of samples skipped at a rate of 1.
const MAX_REDUCTION: f64 = 0.98;

/// One channel's decimator. Channels hold independently.
#[derive(Debug, Clone)]
pub struct Decimator {
    levels: f64,
    step: f64,
    counter: f64,
    held: f64,
}

impl Default for Decimator {
    fn default() -> Self {
        Self {
            levels: 0.0,
            step: 1.0,
            counter: 1.0,
            held: 0.0,
        }
    }
}

impl Decimator {
    /// Quantizer depth, `0..=32`. 32 disables quantization; anything
    /// below 1 is treated as 1 bit.
    pub fn set_bits(&mut self, bits: i32) {
        self.levels = if bits >= MAX_BITS {
            0.0
        } else {
            (bits.max(1) as f64).exp2() * 0.5
        };
    }

    /// Rate reduction in `[0, 1]`; 0 takes every sample.
    pub fn set_rate(&mut self, rate: f32) {
        self.step = 1.0 - MAX_REDUCTION * (rate as f64).clamp(0.0, 1.0);
    }

    #[inline]
    pub fn process(&mut self, sample: f64) -> f64 {
        if self.counter >= 1.0 {
            self.counter -= 1.0;
            self.held = if self.levels > 0.0 {
                (sample * self.levels).round() / self.levels
            } else {
                sample
            };
        }
        self.counter += self.step;
        self.held
    }

    pub fn reset(&mut self) {
        self.counter = 1.0;
        self.held = 0.0;
    }
}
