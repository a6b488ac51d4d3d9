//! Freeverb-style reverberation tail.
//!
//! Eight parallel damped comb filters feed four series all-pass filters.
//! Delay lengths are the classic 44.1 kHz tunings scaled to the running
//! sample rate; odd channels are offset by a stereo spread so a stereo pair
//! decorrelates.

const REFERENCE_SAMPLE_RATE: f64 = 44100.0;

const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];
const STEREO_SPREAD: usize = 23;

const FIXED_GAIN: f64 = 0.015;
const ALLPASS_FEEDBACK: f64 = 0.5;
const SCALE_DAMP: f64 = 0.4;
const SCALE_ROOM: f64 = 0.28;
const OFFSET_ROOM: f64 = 0.7;
const ROOM_SIZE: f64 = 0.5;
const DAMPING: f64 = 0.5;

/// Values below this are flushed to zero to avoid denormal slowdowns.
const DENORMAL_THRESHOLD: f64 = 1.0e-20;

#[inline]
fn flush_denormal(value: f64) -> f64 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}

fn scaled_len(tuning: usize, spread: usize, sample_rate: f64) -> usize {
    (((tuning + spread) as f64 * sample_rate / REFERENCE_SAMPLE_RATE) as usize).max(1)
}

#[derive(Debug, Clone)]
struct Comb {
    buffer: Vec<f64>,
    pos: usize,
    filter_store: f64,
}

impl Comb {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len],
            pos: 0,
            filter_store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f64, feedback: f64, damp: f64) -> f64 {
        let output = self.buffer[self.pos];
        self.filter_store = flush_denormal(output * (1.0 - damp) + self.filter_store * damp);
        self.buffer[self.pos] = input + self.filter_store * feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.filter_store = 0.0;
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    buffer: Vec<f64>,
    pos: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len],
            pos: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        let buffered = flush_denormal(self.buffer[self.pos]);
        self.buffer[self.pos] = input + buffered * ALLPASS_FEEDBACK;
        self.pos = (self.pos + 1) % self.buffer.len();
        buffered - input
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
    }
}

/// One channel of reverberation.
#[derive(Debug, Clone)]
pub struct ReverbChannel {
    combs: [Comb; 8],
    allpasses: [Allpass; 4],
    feedback: f64,
    damp: f64,
}

impl ReverbChannel {
    pub fn new(sample_rate: f64, channel: usize) -> Self {
        let spread = if channel % 2 == 1 { STEREO_SPREAD } else { 0 };
        Self {
            combs: COMB_TUNINGS.map(|t| Comb::new(scaled_len(t, spread, sample_rate))),
            allpasses: ALLPASS_TUNINGS.map(|t| Allpass::new(scaled_len(t, spread, sample_rate))),
            feedback: ROOM_SIZE * SCALE_ROOM + OFFSET_ROOM,
            damp: DAMPING * SCALE_DAMP,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let input = input * FIXED_GAIN;
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input, self.feedback, self.damp);
        }
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    pub fn clear(&mut self) {
        self.combs.iter_mut().for_each(Comb::clear);
        self.allpasses.iter_mut().for_each(Allpass::clear);
    }

    /// Length of the longest comb, a lower bound on the audible tail.
    pub fn longest_comb(&self) -> usize {
        self.combs.iter().map(|c| c.buffer.len()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_in_silence_out() {
        let mut reverb = ReverbChannel::new(44100.0, 0);
        for _ in 0..4096 {
            assert_eq!(reverb.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_impulse_produces_decaying_tail() {
        let mut reverb = ReverbChannel::new(44100.0, 0);
        reverb.process(1.0);
        let early: f64 = (0..4410).map(|_| reverb.process(0.0).abs()).sum();
        for _ in 0..(44100 * 4) {
            reverb.process(0.0);
        }
        let late: f64 = (0..4410).map(|_| reverb.process(0.0).abs()).sum();
        assert!(early > 0.0);
        assert!(late < early * 0.01);
    }

    #[test]
    fn test_spread_on_odd_channels() {
        let left = ReverbChannel::new(44100.0, 0);
        let right = ReverbChannel::new(44100.0, 1);
        assert_eq!(left.longest_comb(), 1617);
        assert_eq!(right.longest_comb(), 1617 + STEREO_SPREAD);
    }

    #[test]
    fn test_tunings_scale_with_rate() {
        let reverb = ReverbChannel::new(88200.0, 0);
        assert_eq!(reverb.longest_comb(), 3234);
    }
}
