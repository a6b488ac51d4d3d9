//! Error types for the FogPad core.

use std::fmt;

/// Errors surfaced by the control-context operations.
///
/// None of these ever reach the real-time path; the host adapter turns them
/// into a rejected call and the plugin keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// A persisted state blob ended before every field could be read.
    TruncatedState {
        /// Name of the first field that could not be read.
        field: &'static str,
        /// Byte offset at which that field starts.
        offset: usize,
        /// Bytes actually available.
        available: usize,
    },
    /// The host proposed a bus arrangement the effect cannot run with.
    UnsupportedTopology {
        /// Channel count of the first proposed input bus, 0 if none.
        inputs: u32,
        /// Channel count of the first proposed output bus, 0 if none.
        outputs: u32,
    },
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::TruncatedState {
                field,
                offset,
                available,
            } => write!(
                f,
                "State error: truncated at field '{}' (needs bytes {}..{}, got {})",
                field,
                offset,
                offset + 4,
                available
            ),
            PluginError::UnsupportedTopology { inputs, outputs } => write!(
                f,
                "Bus error: unsupported arrangement {} in / {} out",
                inputs, outputs
            ),
        }
    }
}

impl std::error::Error for PluginError {}

/// Result type for control-context operations.
pub type PluginResult<T> = Result<T, PluginError>;
