//! Bit-depth reduction with optional LFO modulation of the depth.

use crate::lfo::Lfo;

const MIN_BITS: f64 = 1.0;
const MAX_BITS: f64 = 16.0;

/// Shared across channels: the LFO advances once per frame.
#[derive(Debug, Clone)]
pub struct BitCrusher {
    amount: f64,
    lfo: Lfo,
    lfo_depth: f64,
    levels: f64,
    bypassed: bool,
}

impl BitCrusher {
    pub fn new(sample_rate: f64) -> Self {
        let mut crusher = Self {
            amount: 1.0,
            lfo: Lfo::new(sample_rate),
            lfo_depth: 0.0,
            levels: 0.0,
            bypassed: true,
        };
        crusher.update(0.0);
        crusher
    }

    /// Resolution amount in `[0, 1]`; 1 leaves the signal untouched.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount as f64;
        self.update(0.0);
    }

    pub fn set_lfo(&mut self, rate: f32, depth: f32) {
        self.lfo.set_rate(rate);
        self.lfo_depth = depth as f64;
        self.update(0.0);
    }

    /// Advance the modulation by one frame.
    #[inline]
    pub fn advance(&mut self) {
        if self.lfo.is_enabled() {
            let modulation = self.lfo.tick();
            self.update(modulation);
        }
    }

    /// LFO swings the amount downward only, by up to `depth`.
    fn update(&mut self, modulation: f64) {
        let swing = self.lfo_depth * (0.5 + 0.5 * modulation);
        let amount = if self.lfo.is_enabled() {
            self.amount * (1.0 - swing)
        } else {
            self.amount
        };
        self.bypassed = amount >= 1.0;
        let bits = MIN_BITS + (MAX_BITS - MIN_BITS) * amount.clamp(0.0, 1.0);
        self.levels = bits.exp2() * 0.5;
    }

    #[inline]
    pub fn process(&self, sample: f64) -> f64 {
        if self.bypassed {
            return sample;
        }
        (sample * self.levels).round() / self.levels
    }

    pub fn reset(&mut self) {
        self.lfo.reset();
    }
}
