//! Feedback delay line with free or tempo-synced timing.

/// Longest delay, reached at a normalized time of 1.
pub const MAX_DELAY_SECONDS: f64 = 5.0;

/// Synced delay lengths in beats: 1/32, 1/16, 1/8, 1/4, 1/2 and one bar.
pub const SYNC_DIVISIONS: [f64; 6] = [0.125, 0.25, 0.5, 1.0, 2.0, 4.0];

/// Feedback ceiling, keeps the loop from running away at full feedback.
const MAX_FEEDBACK: f64 = 0.95;

/// Delay length and feedback shared by all channels.
#[derive(Debug, Clone)]
pub struct DelayTiming {
    sample_rate: f64,
    max_samples: usize,
    time: f64,
    synced: bool,
    tempo: f64,
    feedback: f64,
    samples: usize,
}

impl DelayTiming {
    pub fn new(sample_rate: f64, tempo: f64) -> Self {
        let mut timing = Self {
            sample_rate,
            max_samples: buffer_len(sample_rate),
            time: 0.0,
            synced: false,
            tempo,
            feedback: 0.0,
            samples: 1,
        };
        timing.update();
        timing
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time as f64;
        self.update();
    }

    pub fn set_synced(&mut self, synced: bool) {
        self.synced = synced;
        self.update();
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm;
        self.update();
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = (feedback as f64).clamp(0.0, 1.0) * MAX_FEEDBACK;
    }

    #[inline]
    pub fn feedback(&self) -> f64 {
        self.feedback
    }

    /// Current delay in samples.
    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Current delay in seconds, before clamping to the buffer.
    pub fn seconds(&self) -> f64 {
        if self.synced {
            let index = (self.time * (SYNC_DIVISIONS.len() - 1) as f64).round() as usize;
            let beats = SYNC_DIVISIONS[index.min(SYNC_DIVISIONS.len() - 1)];
            beats * 60.0 / self.tempo
        } else {
            self.time * MAX_DELAY_SECONDS
        }
    }

    fn update(&mut self) {
        let samples = (self.seconds() * self.sample_rate).round() as usize;
        self.samples = samples.clamp(1, self.max_samples - 1);
    }
}

fn buffer_len(sample_rate: f64) -> usize {
    (MAX_DELAY_SECONDS * sample_rate) as usize + 1
}

/// One channel's delay memory.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f64>,
    write_pos: usize,
}

impl DelayLine {
    /// Allocates the full maximum delay for `sample_rate`.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            buffer: vec![0.0; buffer_len(sample_rate)],
            write_pos: 0,
        }
    }

    /// Read the sample `delay` samples back, then write `input` plus the
    /// fed-back echo.
    #[inline]
    pub fn process(&mut self, input: f64, delay: usize, feedback: f64) -> f64 {
        let len = self.buffer.len();
        let delay = delay.min(len - 1);
        let read_pos = (self.write_pos + len - delay) % len;
        let echo = self.buffer[read_pos];
        self.buffer[self.write_pos] = input + echo * feedback;
        self.write_pos = (self.write_pos + 1) % len;
        echo
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
