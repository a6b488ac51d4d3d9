//! Common types shared by the engine, the state codec and the host adapter.

/// Maximum number of audio channels the engine will build a chain for.
///
/// A host proposing more channels than this is clamped at configuration
/// time; the surplus outputs are silenced by the engine.
pub const MAX_CHANNELS: usize = 32;

/// Sample rate used before the host sends a processing setup.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Block size assumed before the host sends a processing setup.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1024;

/// Tempo assumed until the host reports a valid one.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// Parameter identifier as used by the host.
pub type ParamId = u32;

/// Normalized parameter value as delivered by host automation.
pub type ParamValue = f64;

/// The host's processing mode, reported with every processing setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessMode {
    /// Live playback with real-time deadlines.
    #[default]
    Realtime,
    /// Ahead-of-time rendering that may still be interrupted.
    Prefetch,
    /// Offline bounce without deadlines.
    Offline,
}

/// Processing configuration delivered by the host before audio starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSetup {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest block the host will ever pass to `process`.
    pub max_block_size: usize,
    /// Sample precision the host intends to use.
    pub precision: crate::SamplePrecision,
    /// Realtime, prefetch or offline.
    pub mode: ProcessMode,
}

impl Default for ProcessSetup {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            precision: crate::SamplePrecision::Single,
            mode: ProcessMode::Realtime,
        }
    }
}
