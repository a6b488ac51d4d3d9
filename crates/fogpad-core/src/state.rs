//! Persisted state encoding.
//!
//! The blob is the sixteen parameter values as little-endian IEEE-754 `f32`,
//! in [`ParameterId::ALL`] order, with no header: exactly
//! [`STATE_SIZE`] bytes. Hosts running big-endian CPUs still produce and
//! read little-endian bytes.
//!
//! The layout is frozen. Fields added later go after the existing sixteen
//! and must be optional on load; [`load`] ignores bytes past the fixed
//! prefix for that reason.

use log::debug;

use crate::error::{PluginError, PluginResult};
use crate::parameters::{ParameterId, ParameterModel, FIELD_COUNT};

/// Size of an encoded state blob in bytes.
pub const STATE_SIZE: usize = FIELD_COUNT * 4;

/// Where a state blob came from, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateKind {
    /// Part of a saved project/session.
    Project,
    /// A preset file or the host's default preset.
    Preset,
    #[default]
    Unknown,
}

/// Host-supplied context for a state load. Informational only; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateContext {
    pub kind: StateKind,
    pub file_path: Option<String>,
}

/// Encode `model` as a fixed-size little-endian blob.
pub fn save(model: &ParameterModel) -> Vec<u8> {
    let mut data = Vec::with_capacity(STATE_SIZE);
    for value in model.to_array() {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Decode a blob produced by [`save`].
///
/// Fails if the blob is shorter than [`STATE_SIZE`]; the error names the
/// first field that could not be read. A failed decode produces nothing, so
/// callers can keep their current model untouched.
pub fn load(data: &[u8]) -> PluginResult<ParameterModel> {
    let mut values = [0.0f32; FIELD_COUNT];
    for (index, id) in ParameterId::ALL.iter().enumerate() {
        let offset = index * 4;
        let bytes = data
            .get(offset..offset + 4)
            .ok_or(PluginError::TruncatedState {
                field: id.name(),
                offset,
                available: data.len(),
            })?;
        values[index] = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    if data.len() > STATE_SIZE {
        debug!(
            "Ignoring {} trailing state bytes",
            data.len() - STATE_SIZE
        );
    }

    Ok(ParameterModel::from_array(values))
}
