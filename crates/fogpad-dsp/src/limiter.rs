//! Output limiter. Its gain doubles as the effect's meter.

/// Ceiling in linear amplitude (0 dBFS).
pub const THRESHOLD: f64 = 1.0;

/// Gain recovery time after a peak.
const RELEASE_SECONDS: f64 = 0.1;

/// Brick-wall limiter linked across channels: one gain for the whole frame.
#[derive(Debug, Clone)]
pub struct Limiter {
    release_coeff: f64,
    gain: f64,
}

impl Limiter {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            release_coeff: (-1.0 / (RELEASE_SECONDS * sample_rate)).exp(),
            gain: 1.0,
        }
    }

    /// Limit one frame in place. Attack is instant; release is exponential.
    #[inline]
    pub fn process(&mut self, frame: &mut [f64]) {
        let peak = frame.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
        let target = if peak > THRESHOLD { THRESHOLD / peak } else { 1.0 };

        self.gain = if target < self.gain {
            target
        } else {
            target + (self.gain - target) * self.release_coeff
        };

        if self.gain < 1.0 {
            frame.iter_mut().for_each(|s| *s *= self.gain);
        }
    }

    /// Current gain: 1 means no reduction.
    #[inline]
    pub fn linear_gain_reduction(&self) -> f64 {
        self.gain
    }

    pub fn reset(&mut self) {
        self.gain = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_untouched() {
        let mut limiter = Limiter::new(44100.0);
        let mut frame = [0.5, -0.25];
        limiter.process(&mut frame);
        assert_eq!(frame, [0.5, -0.25]);
        assert_eq!(limiter.linear_gain_reduction(), 1.0);
    }

    #[test]
    fn test_peak_is_caught_instantly() {
        let mut limiter = Limiter::new(44100.0);
        let mut frame = [2.0, 0.5];
        limiter.process(&mut frame);
        assert!((frame[0] - 1.0).abs() < 1e-12);
        assert!((frame[1] - 0.25).abs() < 1e-12);
        assert!((limiter.linear_gain_reduction() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gain_recovers() {
        let mut limiter = Limiter::new(1000.0);
        limiter.process(&mut [4.0]);
        for _ in 0..1000 {
            limiter.process(&mut [0.0]);
        }
        assert!(limiter.linear_gain_reduction() > 0.99);
    }
}
