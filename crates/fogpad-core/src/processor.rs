//! The plugin-level controller.
//!
//! [`FogPad`] owns the parameter model, the processing engine and the bus
//! declaration, and implements every host-facing operation in host-agnostic
//! terms. A format adapter translates host calls into these methods.
//!
//! # Threading
//!
//! `process` runs on the audio thread; everything else runs in the control
//! context. The host never runs the two concurrently on one instance, which
//! is why nothing here is synchronized.

use log::{debug, info, warn};

use crate::automation::{self, ParameterQueue};
use crate::buffer::AudioBlock;
use crate::bus::{BusConfig, SpeakerLayout, Topology};
use crate::chain::SignalChain;
use crate::engine::ProcessingEngine;
use crate::error::PluginResult;
use crate::parameters::{ParameterModel, METER_PARAM_ID};
use crate::sample::SamplePrecision;
use crate::state::{self, StateContext};
use crate::types::{ParamId, ProcessMode, ProcessSetup};

/// Message id of the controller's binary ping.
pub const BINARY_MESSAGE_ID: &str = "BinaryMessage";

/// Attribute carrying the binary ping's payload.
pub const BINARY_MESSAGE_ATTRIBUTE: &str = "MyData";

/// Message id of a plain-text controller message.
pub const TEXT_MESSAGE_ID: &str = "TextMessage";

/// A meter value to publish as an output parameter point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterUpdate {
    pub param_id: ParamId,
    pub sample_offset: i32,
    pub value: f64,
}

/// An out-of-band message from the editor/controller side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostMessage<'a> {
    pub id: &'a str,
    /// Payload of the [`BINARY_MESSAGE_ATTRIBUTE`] attribute, if present.
    pub payload: Option<&'a [u8]>,
}

pub struct FogPad<C: SignalChain> {
    model: ParameterModel,
    engine: ProcessingEngine<C>,
    buses: BusConfig,
    setup: ProcessSetup,
    last_meter: f32,
    active: bool,
}

impl<C: SignalChain> Default for FogPad<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SignalChain> FogPad<C> {
    pub fn new() -> Self {
        let model = ParameterModel::default();
        let mut engine = ProcessingEngine::new();
        engine.sync(&model);
        Self {
            model,
            engine,
            buses: BusConfig::default(),
            setup: ProcessSetup::default(),
            last_meter: 0.0,
            active: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn model(&self) -> &ParameterModel {
        &self.model
    }

    #[inline]
    pub fn engine(&self) -> &ProcessingEngine<C> {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut ProcessingEngine<C> {
        &mut self.engine
    }

    #[inline]
    pub fn buses(&self) -> &BusConfig {
        &self.buses
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn last_meter(&self) -> f32 {
        self.last_meter
    }

    #[inline]
    pub fn process_setup(&self) -> &ProcessSetup {
        &self.setup
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Declare the default buses: stereo in, stereo out and one event input.
    pub fn initialize(&mut self) {
        self.buses = BusConfig::default();
        debug!("Initialized with {:?} buses", self.buses.topology());
    }

    pub fn terminate(&mut self) {
        debug!("Terminated");
    }

    /// Activation changes always reset the cached meter, so the first block
    /// after activation publishes a fresh value.
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.engine.reset();
        }
        self.active = active;
        self.last_meter = 0.0;
        debug!("{}", if active { "Activated" } else { "Deactivated" });
    }

    pub fn can_process(&self, precision: SamplePrecision) -> bool {
        self.engine.can_process(precision)
    }

    /// Rebuild the chain for the negotiated channel count and the host's rate.
    pub fn setup_processing(&mut self, setup: ProcessSetup) {
        if setup.mode != self.setup.mode {
            debug!("Process mode {:?} -> {:?}", self.setup.mode, setup.mode);
        }
        self.setup = setup;

        let channels = self.buses.channel_count();
        info!(
            "Setup: {} Hz, {} ch, max {} samples, {:?} precision, {:?}",
            setup.sample_rate, channels, setup.max_block_size, setup.precision, setup.mode
        );
        self.engine.reconfigure(channels, setup.sample_rate, &self.model);
    }

    /// Realtime, prefetch or offline, as last reported by the host.
    pub fn process_mode(&self) -> ProcessMode {
        self.setup.mode
    }

    pub fn negotiate_buses(
        &mut self,
        inputs: &[SpeakerLayout],
        outputs: &[SpeakerLayout],
    ) -> PluginResult<Topology> {
        let result = self.buses.negotiate(inputs, outputs);
        match &result {
            Ok(topology) => debug!("Accepted {:?} topology", topology),
            Err(err) => warn!("{}; staying in stereo", err),
        }
        result
    }

    pub fn tail_samples(&self) -> u32 {
        self.engine.tail_samples()
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Forward the host tempo when the host marks it valid.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.engine.set_tempo(bpm);
    }

    /// Process one block.
    ///
    /// Automation is merged first and the engine synced once for the batch.
    /// A meter update is returned only for single-precision blocks whose
    /// meter value differs from the previous block's.
    pub fn process<I>(&mut self, changes: I, block: &mut AudioBlock<'_>) -> Option<MeterUpdate>
    where
        I: IntoIterator,
        I::Item: ParameterQueue,
    {
        if automation::merge(changes, &mut self.model) > 0 {
            self.engine.sync(&self.model);
        }

        let meter = self.engine.process(block)?;

        let update = (block.precision() == SamplePrecision::Single && meter != self.last_meter)
            .then_some(MeterUpdate {
                param_id: METER_PARAM_ID,
                sample_offset: 0,
                value: meter as f64,
            });
        self.last_meter = meter;
        update
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn save_state(&self) -> Vec<u8> {
        state::save(&self.model)
    }

    /// Replace the model from a persisted blob and sync the engine.
    ///
    /// On failure the model and the engine are left exactly as they were.
    pub fn load_state(&mut self, data: &[u8], context: &StateContext) -> PluginResult<()> {
        debug!(
            "Loading {:?} state ({} bytes){}",
            context.kind,
            data.len(),
            context
                .file_path
                .as_deref()
                .map(|path| format!(" from {}", path))
                .unwrap_or_default()
        );

        match state::load(data) {
            Ok(model) => {
                self.model = model;
                self.engine.sync(&self.model);
                Ok(())
            }
            Err(err) => {
                warn!("{}", err);
                Err(err)
            }
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Handle an out-of-band message. Returns `true` when it was acknowledged.
    pub fn notify(&mut self, message: &HostMessage<'_>) -> bool {
        if message.id != BINARY_MESSAGE_ID {
            return false;
        }
        match message.payload {
            Some(payload) => {
                info!("Received binary message ({} bytes)", payload.len());
                true
            }
            None => false,
        }
    }

    /// Handle a [`TEXT_MESSAGE_ID`] message. The text is only logged.
    pub fn receive_text(&mut self, text: &str) {
        info!("Received text: {}", text);
    }
}
