//! Resonant lowpass filter with LFO-modulated cutoff.
//!
//! A trapezoidal state-variable filter: stable at any cutoff below Nyquist
//! and at full resonance. Coefficients are shared across channels; each
//! channel keeps its own [`FilterState`].

use std::f64::consts::PI;

use crate::lfo::Lfo;

const MIN_CUTOFF_HZ: f64 = 20.0;
const MAX_CUTOFF_HZ: f64 = 20000.0;

/// Damping at zero resonance (Q = 0.5).
const MAX_DAMPING: f64 = 2.0;
/// Damping at full resonance (Q = 5).
const MIN_DAMPING: f64 = 0.2;

/// Per-channel integrator memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterState {
    ic1eq: f64,
    ic2eq: f64,
}

#[derive(Debug, Clone)]
pub struct ResonantFilter {
    sample_rate: f64,
    cutoff: f64,
    resonance: f64,
    lfo: Lfo,
    lfo_depth: f64,
    a1: f64,
    a2: f64,
    a3: f64,
}

impl ResonantFilter {
    pub fn new(sample_rate: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: 1.0,
            resonance: 0.0,
            lfo: Lfo::new(sample_rate),
            lfo_depth: 0.0,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
        };
        filter.update(0.0);
        filter
    }

    /// All inputs normalized to `[0, 1]`.
    pub fn update_properties(&mut self, cutoff: f32, resonance: f32, lfo_rate: f32, lfo_depth: f32) {
        self.cutoff = cutoff as f64;
        self.resonance = resonance as f64;
        self.lfo.set_rate(lfo_rate);
        self.lfo_depth = lfo_depth as f64;
        self.update(0.0);
    }

    /// Normalized cutoff to Hz on a logarithmic scale, capped below Nyquist.
    pub fn cutoff_hz(&self, normalized: f64) -> f64 {
        let hz = MIN_CUTOFF_HZ * (MAX_CUTOFF_HZ / MIN_CUTOFF_HZ).powf(normalized.clamp(0.0, 1.0));
        hz.min(self.sample_rate * 0.45)
    }

    /// Advance the cutoff modulation by one frame.
    #[inline]
    pub fn advance(&mut self) {
        if self.lfo.is_enabled() {
            let modulation = self.lfo.tick();
            self.update(modulation);
        }
    }

    fn update(&mut self, modulation: f64) {
        let cutoff = self.cutoff + modulation * self.lfo_depth * 0.5;
        let g = (PI * self.cutoff_hz(cutoff) / self.sample_rate).tan();
        let k = MAX_DAMPING - (MAX_DAMPING - MIN_DAMPING) * self.resonance.clamp(0.0, 1.0);
        self.a1 = 1.0 / (1.0 + g * (g + k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
    }

    #[inline]
    pub fn process(&self, state: &mut FilterState, sample: f64) -> f64 {
        let v3 = sample - state.ic2eq;
        let v1 = self.a1 * state.ic1eq + self.a2 * v3;
        let v2 = state.ic2eq + self.a2 * state.ic1eq + self.a3 * v3;
        state.ic1eq = 2.0 * v1 - state.ic1eq;
        state.ic2eq = 2.0 * v2 - state.ic2eq;
        v2
    }

    pub fn reset(&mut self) {
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(filter: &ResonantFilter, input: impl Fn(usize) -> f64, n: usize) -> f64 {
        let mut state = FilterState::default();
        let mut peak: f64 = 0.0;
        for i in 0..n {
            let out = filter.process(&mut state, input(i));
            assert!(out.is_finite());
            if i > n / 2 {
                peak = peak.max(out.abs());
            }
        }
        peak
    }

    #[test]
    fn test_dc_passes() {
        let mut filter = ResonantFilter::new(44100.0);
        filter.update_properties(0.5, 0.0, 0.0, 0.0);
        let mut state = FilterState::default();
        let mut out = 0.0;
        for _ in 0..44100 {
            out = filter.process(&mut state, 1.0);
        }
        assert!((out - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_high_frequencies_are_attenuated() {
        let mut filter = ResonantFilter::new(44100.0);
        filter.update_properties(0.2, 0.0, 0.0, 0.0);
        // Nyquist-rate square wave
        let peak = settle(&filter, |i| if i % 2 == 0 { 1.0 } else { -1.0 }, 4096);
        assert!(peak < 0.01, "peak {}", peak);
    }

    #[test]
    fn test_full_resonance_is_stable() {
        let mut filter = ResonantFilter::new(44100.0);
        filter.update_properties(1.0, 1.0, 1.0, 1.0);
        let mut state = FilterState::default();
        for i in 0..44100 {
            filter.advance();
            let out = filter.process(&mut state, (i as f64 * 0.1).sin());
            assert!(out.is_finite() && out.abs() < 100.0);
        }
    }

    #[test]
    fn test_cutoff_mapping() {
        let filter = ResonantFilter::new(44100.0);
        assert!((filter.cutoff_hz(0.0) - MIN_CUTOFF_HZ).abs() < 1e-9);
        assert!((filter.cutoff_hz(1.0) - 44100.0 * 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_disabling_lfo_restores_static_cutoff() {
        let mut reference = ResonantFilter::new(44100.0);
        reference.update_properties(0.4, 0.3, 0.0, 0.0);

        let mut filter = ResonantFilter::new(44100.0);
        filter.update_properties(0.4, 0.3, 0.8, 1.0);
        for _ in 0..1000 {
            filter.advance();
        }
        filter.update_properties(0.4, 0.3, 0.0, 1.0);
        filter.advance();

        let mut a = FilterState::default();
        let mut b = FilterState::default();
        for i in 0..256 {
            let x = (i as f64 * 0.05).sin();
            assert_eq!(filter.process(&mut a, x), reference.process(&mut b, x));
        }
    }
}
