//! # fogpad-vst3
//!
//! VST3 host adapter for the FogPad processing core.
//!
//! Everything with effect semantics lives in `fogpad-core`; this crate only
//! translates between VST3 COM calls and the core's plain Rust API:
//!
//! - Plugin factory (IPluginFactory, IPluginFactory2, IPluginFactory3)
//! - The audio component ([`Vst3Processor`]): IComponent, IAudioProcessor,
//!   IProcessContextRequirements, IConnectionPoint
//! - Platform entry points ([`export_vst3!`])
//!
//! ```text
//! host ──► Factory ──► Vst3Processor<C> ──► fogpad_core::FogPad<C>
//! ```
//!
//! The component does not implement IEditController. A separate controller
//! class can be advertised through [`Vst3Config::with_controller`].

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

pub mod export;
pub mod factory;
pub mod processor;
pub mod util;
pub mod wrapper;

pub use factory::Factory;
pub use processor::Vst3Processor;
pub use wrapper::Vst3Config;

pub use fogpad_core::PluginConfig;

// For macros and UIDs
pub use vst3;
