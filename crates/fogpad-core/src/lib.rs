//! # fogpad-core
//!
//! Host-agnostic core of the FogPad effect.
//!
//! - [`ParameterModel`]: the sixteen normalized parameters the host automates
//!   and persists
//! - [`automation::merge`]: collapses a block's automation queues into the model
//! - [`state`]: the fixed little-endian persisted layout
//! - [`ProcessingEngine`]: owns one [`SignalChain`], syncs parameters into it
//!   and runs it at either sample precision
//! - [`BusConfig`]: mono/stereo topology negotiation
//! - [`FogPad`]: the plugin-level controller a format adapter drives
//!
//! ```text
//! host adapter ──► FogPad ──► automation::merge ──► ParameterModel
//!                    │                                    │ sync
//!                    └──────► ProcessingEngine ◄──────────┘
//!                                   │
//!                              SignalChain (DSP stages)
//! ```

pub mod automation;
pub mod buffer;
pub mod bus;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod parameters;
pub mod processor;
pub mod sample;
pub mod state;
pub mod types;

pub use automation::{AutomationEvent, AutomationPoint, ParameterQueue};
pub use buffer::{AudioBlock, Buffer};
pub use bus::{BusConfig, BusInfo, SpeakerLayout, Topology};
pub use chain::{ChainSetup, ChainStage, SignalChain};
pub use config::PluginConfig;
pub use engine::ProcessingEngine;
pub use error::{PluginError, PluginResult};
pub use parameters::{ParameterId, ParameterModel, FIELD_COUNT, METER_PARAM_ID};
pub use processor::{FogPad, HostMessage, MeterUpdate};
pub use sample::{Sample, SamplePrecision};
pub use state::{StateContext, StateKind, STATE_SIZE};
pub use types::*;
