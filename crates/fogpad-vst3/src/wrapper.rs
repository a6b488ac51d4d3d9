//! VST3 class identity.
//!
//! Complements the format-agnostic [`fogpad_core::PluginConfig`] with the
//! UIDs the VST3 factory registers.
//!
//! ```ignore
//! pub static VST3_CONFIG: Vst3Config = Vst3Config::new(
//!     vst3::uid(0x5C5E9D2B, 0x7A0F4A2C, 0x9B6E1D3F, 0x4E8A7C10),
//! );
//! ```

use vst3::Steinberg::TUID;

pub struct Vst3Config {
    /// UID of the audio processor class.
    pub component_uid: TUID,

    /// UID of a separate edit controller class. `None` registers the
    /// processor alone.
    pub controller_uid: Option<TUID>,
}

impl Vst3Config {
    pub const fn new(component_uid: TUID) -> Self {
        Self {
            component_uid,
            controller_uid: None,
        }
    }

    /// Advertise a separate controller class to hosts.
    pub const fn with_controller(mut self, controller_uid: TUID) -> Self {
        self.controller_uid = Some(controller_uid);
        self
    }

    pub const fn has_controller(&self) -> bool {
        self.controller_uid.is_some()
    }
}
