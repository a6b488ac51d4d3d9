//! Entry points for the VST3 shared library.

/// Generate the platform entry points and `GetPluginFactory`.
///
/// ```rust,ignore
/// use fogpad_core::PluginConfig;
/// use fogpad_vst3::{export_vst3, vst3, Vst3Config, Vst3Processor};
///
/// static CONFIG: PluginConfig = PluginConfig::new("FogPad");
/// static VST3_CONFIG: Vst3Config =
///     Vst3Config::new(vst3::uid(0x5C5E9D2B, 0x7A0F4A2C, 0x9B6E1D3F, 0x4E8A7C10));
///
/// export_vst3!(CONFIG, VST3_CONFIG, Vst3Processor<ReverbProcess>);
/// ```
#[macro_export]
macro_rules! export_vst3 {
    ($config:expr, $vst3_config:expr, $component:ty) => {
        #[cfg(target_os = "windows")]
        #[no_mangle]
        extern "system" fn InitDll() -> bool {
            true
        }

        #[cfg(target_os = "windows")]
        #[no_mangle]
        extern "system" fn ExitDll() -> bool {
            true
        }

        // Lowercase on macOS
        #[cfg(target_os = "macos")]
        #[no_mangle]
        extern "system" fn bundleEntry(_bundle_ref: *mut std::ffi::c_void) -> bool {
            true
        }

        #[cfg(target_os = "macos")]
        #[no_mangle]
        extern "system" fn bundleExit() -> bool {
            true
        }

        #[cfg(target_os = "linux")]
        #[no_mangle]
        extern "system" fn ModuleEntry(_library_handle: *mut std::ffi::c_void) -> bool {
            true
        }

        #[cfg(target_os = "linux")]
        #[no_mangle]
        extern "system" fn ModuleExit() -> bool {
            true
        }

        #[no_mangle]
        extern "system" fn GetPluginFactory() -> *mut std::ffi::c_void {
            use $crate::vst3::ComWrapper;
            use $crate::Factory;

            let factory = Factory::<$component>::new(&$config, &$vst3_config);
            ComWrapper::new(factory)
                .to_com_ptr::<$crate::vst3::Steinberg::IPluginFactory>()
                .map_or(std::ptr::null_mut(), |ptr| ptr.into_raw() as *mut std::ffi::c_void)
        }
    };
}
