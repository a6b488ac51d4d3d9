//! # FogPad
//!
//! A reverb and delay effect with a bit crusher, a decimator and a resonant
//! filter in the wet path, shipped as a VST3 shared library.
//!
//! The effect semantics live in `fogpad-core`, the signal chain in
//! `fogpad-dsp`, and the host glue in `fogpad-vst3`. This crate only wires
//! the three together and exports the entry points.

use fogpad_core::PluginConfig;
use fogpad_dsp::ReverbProcess;
use fogpad_vst3::{export_vst3, vst3, Vst3Config, Vst3Processor};

pub static CONFIG: PluginConfig = PluginConfig::new("FogPad")
    .with_vendor("igorski.nl")
    .with_url("https://www.igorski.nl")
    .with_version(env!("CARGO_PKG_VERSION"))
    .with_sub_categories("Fx|Reverb|Delay");

/// The edit controller ships as its own class; the component only names it.
pub static VST3_CONFIG: Vst3Config =
    Vst3Config::new(vst3::uid(0x5C5E9D2B, 0x7A0F4A2C, 0x9B6E1D3F, 0x4E8A7C10))
        .with_controller(vst3::uid(0x1F3A8B62, 0xC4D5467E, 0x8A09B7C1, 0x2D6E5F34));

/// The exported VST3 component.
pub type FogPadVst3 = Vst3Processor<ReverbProcess>;

export_vst3!(CONFIG, VST3_CONFIG, FogPadVst3);

#[cfg(test)]
mod tests {
    use super::*;
    use fogpad_vst3::vst3::Steinberg::Vst::*;
    use fogpad_vst3::vst3::Steinberg::*;

    #[test]
    fn test_config() {
        assert_eq!(CONFIG.name, "FogPad");
        assert_eq!(CONFIG.version, env!("CARGO_PKG_VERSION"));
        assert!(VST3_CONFIG.has_controller());
    }

    #[test]
    fn test_component_reports_controller_class() {
        let component = FogPadVst3::new(&VST3_CONFIG);
        let mut class_id: TUID = [0; 16];
        let result = unsafe { component.getControllerClassId(&mut class_id) };
        assert_eq!(result, kResultOk);
        assert_eq!(Some(class_id), VST3_CONFIG.controller_uid);
        assert_ne!(class_id, VST3_CONFIG.component_uid);
    }

    fn setup_component(component: &FogPadVst3, sample_size: SymbolicSampleSizes) {
        unsafe {
            let mut setup: ProcessSetup = std::mem::zeroed();
            setup.processMode = ProcessModes_::kRealtime as i32;
            setup.symbolicSampleSize = sample_size as i32;
            setup.maxSamplesPerBlock = 64;
            setup.sampleRate = 48000.0;
            assert_eq!(component.setupProcessing(&mut setup), kResultOk);
            assert_eq!(component.setActive(1), kResultOk);
        }
    }

    #[test]
    fn test_component_processes_a_stereo_block() {
        let component = FogPadVst3::new(&VST3_CONFIG);
        setup_component(&component, SymbolicSampleSizes_::kSample32);

        let mut in_left = [0.25f32; 64];
        let mut in_right = [-0.25f32; 64];
        let mut out_left = [9.0f32; 64];
        let mut out_right = [9.0f32; 64];

        unsafe {
            let audio = MediaTypes_::kAudio as MediaType;
            let input = BusDirections_::kInput as BusDirection;
            assert_eq!(component.getBusCount(audio, input), 1);

            let mut in_channels = [in_left.as_mut_ptr(), in_right.as_mut_ptr()];
            let mut out_channels = [out_left.as_mut_ptr(), out_right.as_mut_ptr()];

            let mut in_bus: AudioBusBuffers = std::mem::zeroed();
            in_bus.numChannels = 2;
            in_bus.__field0.channelBuffers32 = in_channels.as_mut_ptr();
            let mut out_bus: AudioBusBuffers = std::mem::zeroed();
            out_bus.numChannels = 2;
            out_bus.silenceFlags = 0b11;
            out_bus.__field0.channelBuffers32 = out_channels.as_mut_ptr();

            let mut data: ProcessData = std::mem::zeroed();
            data.symbolicSampleSize = SymbolicSampleSizes_::kSample32 as i32;
            data.numSamples = 64;
            data.numInputs = 1;
            data.inputs = &mut in_bus;
            data.numOutputs = 1;
            data.outputs = &mut out_bus;

            assert_eq!(component.process(&mut data), kResultOk);
            assert_eq!(out_bus.silenceFlags, 0);
        }

        assert!(out_left
            .iter()
            .chain(out_right.iter())
            .all(|s| s.is_finite() && s.abs() <= 1.0));
        assert!(out_left.iter().any(|&s| s != 9.0));
    }

    #[test]
    fn test_double_block_after_single_setup_uses_block_precision() {
        let component = FogPadVst3::new(&VST3_CONFIG);
        setup_component(&component, SymbolicSampleSizes_::kSample32);

        let mut in_left = [0.0f64; 64];
        let mut in_right = [0.0f64; 64];
        let mut out_left = [9.0f64; 64];
        let mut out_right = [9.0f64; 64];

        unsafe {
            let mut in_channels = [in_left.as_mut_ptr(), in_right.as_mut_ptr()];
            let mut out_channels = [out_left.as_mut_ptr(), out_right.as_mut_ptr()];

            let mut in_bus: AudioBusBuffers = std::mem::zeroed();
            in_bus.numChannels = 2;
            in_bus.__field0.channelBuffers64 = in_channels.as_mut_ptr();
            let mut out_bus: AudioBusBuffers = std::mem::zeroed();
            out_bus.numChannels = 2;
            out_bus.__field0.channelBuffers64 = out_channels.as_mut_ptr();

            let mut data: ProcessData = std::mem::zeroed();
            data.symbolicSampleSize = SymbolicSampleSizes_::kSample64 as i32;
            data.numSamples = 64;
            data.numInputs = 1;
            data.inputs = &mut in_bus;
            data.numOutputs = 1;
            data.outputs = &mut out_bus;

            assert_eq!(component.process(&mut data), kResultOk);
        }

        assert!(out_left.iter().chain(out_right.iter()).all(|&s| s == 0.0));
    }
}
