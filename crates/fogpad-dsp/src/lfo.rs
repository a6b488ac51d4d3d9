//! Sine low-frequency oscillator shared by the modulated stages.

use std::f64::consts::TAU;

/// Slowest rate, reached at a normalized rate just above zero.
pub const MIN_RATE_HZ: f64 = 0.1;

/// Fastest rate, reached at a normalized rate of 1.
pub const MAX_RATE_HZ: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Lfo {
    sample_rate: f64,
    phase: f64,
    increment: f64,
    enabled: bool,
}

impl Lfo {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            increment: 0.0,
            enabled: false,
        }
    }

    /// Set the rate from a normalized value. Zero switches the oscillator off.
    pub fn set_rate(&mut self, rate: f32) {
        let rate = rate as f64;
        self.enabled = rate > 0.0;
        let hz = MIN_RATE_HZ + (MAX_RATE_HZ - MIN_RATE_HZ) * rate;
        self.increment = hz / self.sample_rate;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Advance one sample and return the value in `[-1, 1]`; 0 when disabled.
    #[inline]
    pub fn tick(&mut self) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let value = (self.phase * TAU).sin();
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
