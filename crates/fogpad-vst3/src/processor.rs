//! VST3 wrapper around the host-agnostic [`FogPad`] controller.
//!
//! The wrapper only translates: host pointers become [`Buffer`]s and
//! [`ParameterQueue`]s, host enums become core enums, and core results
//! become `tresult`s. No effect logic lives here.
//!
//! ```text
//! host ──► Vst3Processor<C> ──► FogPad<C> ──► ProcessingEngine<C> ──► C: SignalChain
//! ```

use std::cell::UnsafeCell;
use std::ffi::{c_void, CStr};
use std::mem::size_of;
use std::slice;

use log::{debug, warn};
use vst3::{Class, ComRef, Steinberg::Vst::*, Steinberg::*};

use fogpad_core::bus::{EVENT_BUS_CHANNELS, EVENT_INPUT_BUSES};
use fogpad_core::processor::TEXT_MESSAGE_ID;
use fogpad_core::{
    AudioBlock, AutomationPoint, Buffer, BusInfo as CoreBusInfo, FogPad, HostMessage,
    MeterUpdate, ParamId, ParameterQueue, PluginConfig, ProcessMode,
    ProcessSetup as CoreProcessSetup, Sample,
    SamplePrecision, SignalChain, SpeakerLayout, StateContext, StateKind,
};

use crate::factory::ComponentFactory;
use crate::util::{copy_wstring, cstr_to_str, wstring_to_string};
use crate::wrapper::Vst3Config;

// ProcessContext state flag
const K_TEMPO_VALID: u32 = 1 << 10;

// IProcessContextRequirements flag
const K_NEED_TEMPO: u32 = 1 << 6;

// Stream attribute keys and values from the preset-file conventions
const STATE_TYPE_KEY: &CStr = c"StateType";
const FILE_PATH_KEY: &CStr = c"FilePathString";
const STATE_TYPE_PROJECT: &str = "Project";
const STATE_TYPE_DEFAULT: &str = "Default";

// Attribute carrying the text of a text message
const TEXT_MESSAGE_KEY: &CStr = c"Text";

// Attribute carrying the payload of a binary controller message
const BINARY_MESSAGE_KEY: &CStr = c"MyData";

const STATE_CHUNK_SIZE: usize = 4096;

// =============================================================================
// Host adapters
// =============================================================================

/// One host parameter queue, read lazily.
struct HostQueue<'a>(ComRef<'a, IParamValueQueue>);

impl ParameterQueue for HostQueue<'_> {
    fn parameter_id(&self) -> ParamId {
        // SAFETY: the queue pointer is valid for the duration of process().
        unsafe { self.0.getParameterId() }
    }

    fn point_count(&self) -> usize {
        // SAFETY: as above.
        unsafe { self.0.getPointCount() }.max(0) as usize
    }

    fn point(&self, index: usize) -> Option<AutomationPoint> {
        let mut sample_offset = 0;
        let mut value = 0.0;
        // SAFETY: as above; out-pointers reference locals.
        let result = unsafe { self.0.getPoint(index as i32, &mut sample_offset, &mut value) };
        (result == kResultTrue).then_some(AutomationPoint {
            sample_offset,
            value,
        })
    }
}

/// Iterator over the queues in a host `IParameterChanges`, without allocating.
struct HostQueues<'a> {
    changes: Option<ComRef<'a, IParameterChanges>>,
    index: i32,
    count: i32,
}

impl<'a> HostQueues<'a> {
    /// # Safety
    /// `changes` must be null or valid for `'a`.
    unsafe fn new(changes: *mut IParameterChanges) -> Self {
        let changes = ComRef::from_raw(changes);
        let count = changes
            .as_ref()
            .map_or(0, |changes| changes.getParameterCount().max(0));
        Self {
            changes,
            index: 0,
            count,
        }
    }
}

impl<'a> Iterator for HostQueues<'a> {
    type Item = HostQueue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let changes = self.changes.as_ref()?;
        while self.index < self.count {
            let index = self.index;
            self.index += 1;
            // SAFETY: index is below the host-reported count.
            let queue = unsafe { ComRef::from_raw(changes.getParameterData(index)) };
            if let Some(queue) = queue {
                return Some(HostQueue(queue));
            }
        }
        None
    }
}

/// Sample types with a matching channel-pointer field in `AudioBusBuffers`.
trait HostSample: Sample {
    /// # Safety
    /// `bus` must come from the host's current `ProcessData`.
    unsafe fn channel_buffers(bus: &AudioBusBuffers) -> *mut *mut Self;
}

impl HostSample for f32 {
    unsafe fn channel_buffers(bus: &AudioBusBuffers) -> *mut *mut Self {
        bus.__field0.channelBuffers32
    }
}

impl HostSample for f64 {
    unsafe fn channel_buffers(bus: &AudioBusBuffers) -> *mut *mut Self {
        bus.__field0.channelBuffers64
    }
}

/// Channel pointers of the first (main) bus, or an empty slice.
///
/// # Safety
/// `buses` must be null or point to `count` valid bus descriptors.
unsafe fn main_bus_channels<'a, S: HostSample>(
    buses: *mut AudioBusBuffers,
    count: i32,
) -> &'a [*mut S] {
    if count <= 0 || buses.is_null() {
        return &[];
    }
    let bus = &*buses;
    let channels = S::channel_buffers(bus);
    if bus.numChannels <= 0 || channels.is_null() {
        return &[];
    }
    slice::from_raw_parts(channels, bus.numChannels as usize)
}

/// Build a [`Buffer`] over the host's main buses. A null channel pointer
/// becomes an empty slot at its own index.
///
/// # Safety
/// Every non-null channel pointer must hold `num_samples` samples.
unsafe fn host_buffer<'a, S: HostSample>(data: &ProcessData, num_samples: usize) -> Buffer<'a, S> {
    let inputs = main_bus_channels::<S>(data.inputs, data.numInputs)
        .iter()
        .map(|&ptr| (!ptr.is_null()).then(|| slice::from_raw_parts(ptr as *const S, num_samples)));
    let outputs = main_bus_channels::<S>(data.outputs, data.numOutputs)
        .iter()
        .map(|&ptr| (!ptr.is_null()).then(|| slice::from_raw_parts_mut(ptr, num_samples)));
    Buffer::from_slots(inputs, outputs, num_samples)
}

/// Read a string attribute into an owned `String`.
///
/// # Safety
/// `list` must be a valid attribute list.
unsafe fn attribute_string(list: &ComRef<'_, IAttributeList>, key: &CStr) -> Option<String> {
    let mut buffer: String128 = [0; 128];
    let result = list.getString(
        key.as_ptr(),
        buffer.as_mut_ptr(),
        size_of::<String128>() as u32,
    );
    if result != kResultTrue {
        return None;
    }
    wstring_to_string(&buffer).filter(|s| !s.is_empty())
}

/// Gather the host's context for a state load, if the stream provides one.
///
/// # Safety
/// `stream` must be a valid stream.
unsafe fn state_context(stream: &ComRef<'_, IBStream>) -> StateContext {
    let Some(attributes) = stream.cast::<IStreamAttributes>() else {
        return StateContext::default();
    };
    let Some(list) = ComRef::from_raw(attributes.getAttributes()) else {
        return StateContext::default();
    };

    let kind = match attribute_string(&list, STATE_TYPE_KEY).as_deref() {
        Some(STATE_TYPE_PROJECT) => StateKind::Project,
        Some(STATE_TYPE_DEFAULT) => StateKind::Preset,
        _ => StateKind::Unknown,
    };
    StateContext {
        kind,
        file_path: attribute_string(&list, FILE_PATH_KEY),
    }
}

/// Publish a meter value as a point in the host's output parameter changes.
///
/// # Safety
/// `changes` must be null or valid for this process() call.
unsafe fn write_meter(changes: *mut IParameterChanges, update: &MeterUpdate) {
    let Some(changes) = ComRef::from_raw(changes) else {
        return;
    };
    let mut index = 0;
    if let Some(queue) = ComRef::from_raw(changes.addParameterData(&update.param_id, &mut index)) {
        queue.addPoint(update.sample_offset, update.value, &mut index);
    }
}

fn precision_from_symbolic(symbolic_sample_size: i32) -> Option<SamplePrecision> {
    match symbolic_sample_size as SymbolicSampleSizes {
        SymbolicSampleSizes_::kSample32 => Some(SamplePrecision::Single),
        SymbolicSampleSizes_::kSample64 => Some(SamplePrecision::Double),
        _ => None,
    }
}

fn process_mode_from_host(mode: i32) -> ProcessMode {
    match mode as ProcessModes {
        ProcessModes_::kPrefetch => ProcessMode::Prefetch,
        ProcessModes_::kOffline => ProcessMode::Offline,
        _ => ProcessMode::Realtime,
    }
}

// =============================================================================
// Vst3Processor
// =============================================================================

/// The VST3 component: `IComponent` + `IAudioProcessor` + `IConnectionPoint`.
pub struct Vst3Processor<C: SignalChain> {
    pad: UnsafeCell<FogPad<C>>,
    vst3_config: &'static Vst3Config,
}

// Safety: Vst3Processor is Send because:
// - C: SignalChain is Send
// - the UnsafeCell is only touched from the host's documented call contexts
unsafe impl<C: SignalChain> Send for Vst3Processor<C> {}

// Safety: Vst3Processor is Sync because:
// - the host never runs process() concurrently with setup, state or bus calls
//   on the same instance
unsafe impl<C: SignalChain> Sync for Vst3Processor<C> {}

impl<C: SignalChain> Vst3Processor<C> {
    pub fn new(vst3_config: &'static Vst3Config) -> Self {
        Self {
            pad: UnsafeCell::new(FogPad::new()),
            vst3_config,
        }
    }

    /// # Safety
    /// No mutable reference may be live.
    #[inline]
    unsafe fn pad(&self) -> &FogPad<C> {
        &*self.pad.get()
    }

    /// # Safety
    /// Only from host contexts that guarantee exclusive access.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn pad_mut(&self) -> &mut FogPad<C> {
        &mut *self.pad.get()
    }

    unsafe fn audio_bus_info(&self, dir: BusDirection, index: i32) -> Option<CoreBusInfo> {
        if index != 0 {
            return None;
        }
        let buses = self.pad().buses();
        match dir as BusDirections {
            BusDirections_::kInput => Some(*buses.input()),
            BusDirections_::kOutput => Some(*buses.output()),
            _ => None,
        }
    }
}

impl<C: SignalChain> ComponentFactory for Vst3Processor<C> {
    fn create(_config: &'static PluginConfig, vst3_config: &'static Vst3Config) -> Self {
        Self::new(vst3_config)
    }
}

impl<C: SignalChain> Class for Vst3Processor<C> {
    type Interfaces = (
        IComponent,
        IAudioProcessor,
        IProcessContextRequirements,
        IConnectionPoint,
    );
}

// =============================================================================
// IPluginBase
// =============================================================================

impl<C: SignalChain> IPluginBaseTrait for Vst3Processor<C> {
    unsafe fn initialize(&self, _context: *mut FUnknown) -> tresult {
        self.pad_mut().initialize();
        kResultOk
    }

    unsafe fn terminate(&self) -> tresult {
        self.pad_mut().terminate();
        kResultOk
    }
}

// =============================================================================
// IComponent
// =============================================================================

impl<C: SignalChain> IComponentTrait for Vst3Processor<C> {
    unsafe fn getControllerClassId(&self, class_id: *mut TUID) -> tresult {
        let Some(class_id) = class_id.as_mut() else {
            return kInvalidArgument;
        };
        match self.vst3_config.controller_uid {
            Some(controller) => {
                *class_id = controller;
                kResultOk
            }
            None => kNotImplemented,
        }
    }

    unsafe fn setIoMode(&self, _mode: IoMode) -> tresult {
        kResultOk
    }

    unsafe fn getBusCount(&self, media_type: MediaType, dir: BusDirection) -> i32 {
        match (media_type as MediaTypes, dir as BusDirections) {
            (MediaTypes_::kAudio, BusDirections_::kInput | BusDirections_::kOutput) => 1,
            (MediaTypes_::kEvent, BusDirections_::kInput) => EVENT_INPUT_BUSES as i32,
            _ => 0,
        }
    }

    unsafe fn getBusInfo(
        &self,
        media_type: MediaType,
        dir: BusDirection,
        index: i32,
        bus: *mut BusInfo,
    ) -> tresult {
        let Some(bus) = bus.as_mut() else {
            return kInvalidArgument;
        };

        let (name, channel_count) = match media_type as MediaTypes {
            MediaTypes_::kAudio => match self.audio_bus_info(dir, index) {
                Some(info) => (info.name, info.channel_count()),
                None => return kInvalidArgument,
            },
            MediaTypes_::kEvent
                if dir as BusDirections == BusDirections_::kInput
                    && (0..EVENT_INPUT_BUSES as i32).contains(&index) =>
            {
                ("Event In", EVENT_BUS_CHANNELS)
            }
            _ => return kInvalidArgument,
        };

        bus.mediaType = media_type;
        bus.direction = dir;
        bus.channelCount = channel_count as i32;
        copy_wstring(name, &mut bus.name);
        bus.busType = BusTypes_::kMain as BusType;
        bus.flags = BusInfo_::BusFlags_::kDefaultActive;
        kResultOk
    }

    unsafe fn getRoutingInfo(
        &self,
        _in_info: *mut RoutingInfo,
        _out_info: *mut RoutingInfo,
    ) -> tresult {
        kNotImplemented
    }

    unsafe fn activateBus(
        &self,
        _media_type: MediaType,
        _dir: BusDirection,
        _index: i32,
        _state: TBool,
    ) -> tresult {
        kResultOk
    }

    unsafe fn setActive(&self, state: TBool) -> tresult {
        self.pad_mut().set_active(state != 0);
        kResultOk
    }

    unsafe fn setState(&self, state: *mut IBStream) -> tresult {
        let Some(stream) = ComRef::from_raw(state) else {
            return kInvalidArgument;
        };

        let mut data = Vec::new();
        let mut chunk = [0u8; STATE_CHUNK_SIZE];
        loop {
            let mut bytes_read: i32 = 0;
            let result = stream.read(
                chunk.as_mut_ptr() as *mut c_void,
                chunk.len() as i32,
                &mut bytes_read,
            );
            if result != kResultOk || bytes_read <= 0 {
                break;
            }
            data.extend_from_slice(&chunk[..bytes_read as usize]);
        }

        let context = state_context(&stream);
        match self.pad_mut().load_state(&data, &context) {
            Ok(()) => kResultOk,
            Err(_) => kResultFalse,
        }
    }

    unsafe fn getState(&self, state: *mut IBStream) -> tresult {
        let Some(stream) = ComRef::from_raw(state) else {
            return kInvalidArgument;
        };

        let data = self.pad().save_state();
        let mut bytes_written: i32 = 0;
        let result = stream.write(
            data.as_ptr() as *mut c_void,
            data.len() as i32,
            &mut bytes_written,
        );

        if result == kResultOk && bytes_written == data.len() as i32 {
            kResultOk
        } else {
            warn!(
                "State write incomplete: {} of {} bytes",
                bytes_written,
                data.len()
            );
            kResultFalse
        }
    }
}

// =============================================================================
// IAudioProcessor
// =============================================================================

impl<C: SignalChain> IAudioProcessorTrait for Vst3Processor<C> {
    unsafe fn setBusArrangements(
        &self,
        inputs: *mut SpeakerArrangement,
        num_ins: i32,
        outputs: *mut SpeakerArrangement,
        num_outs: i32,
    ) -> tresult {
        let layouts = |ptr: *mut SpeakerArrangement, count: i32| -> Vec<SpeakerLayout> {
            if ptr.is_null() || count <= 0 {
                return Vec::new();
            }
            slice::from_raw_parts(ptr, count as usize)
                .iter()
                .map(|&arrangement| SpeakerLayout(arrangement))
                .collect()
        };
        let inputs = layouts(inputs, num_ins);
        let outputs = layouts(outputs, num_outs);

        match self.pad_mut().negotiate_buses(&inputs, &outputs) {
            Ok(_) => kResultTrue,
            Err(_) => kResultFalse,
        }
    }

    unsafe fn getBusArrangement(
        &self,
        dir: BusDirection,
        index: i32,
        arr: *mut SpeakerArrangement,
    ) -> tresult {
        let Some(arr) = arr.as_mut() else {
            return kInvalidArgument;
        };
        match self.audio_bus_info(dir, index) {
            Some(info) => {
                *arr = info.layout.0;
                kResultOk
            }
            None => kInvalidArgument,
        }
    }

    unsafe fn canProcessSampleSize(&self, symbolic_sample_size: i32) -> tresult {
        match precision_from_symbolic(symbolic_sample_size) {
            Some(precision) if self.pad().can_process(precision) => kResultTrue,
            _ => kResultFalse,
        }
    }

    unsafe fn getLatencySamples(&self) -> u32 {
        0
    }

    unsafe fn setupProcessing(&self, setup: *mut ProcessSetup) -> tresult {
        let Some(setup) = setup.as_ref() else {
            return kInvalidArgument;
        };
        let Some(precision) = precision_from_symbolic(setup.symbolicSampleSize) else {
            return kResultFalse;
        };

        self.pad_mut().setup_processing(CoreProcessSetup {
            sample_rate: setup.sampleRate,
            max_block_size: setup.maxSamplesPerBlock.max(0) as usize,
            precision,
            mode: process_mode_from_host(setup.processMode),
        });
        kResultOk
    }

    unsafe fn setProcessing(&self, _state: TBool) -> tresult {
        kResultOk
    }

    unsafe fn process(&self, data: *mut ProcessData) -> tresult {
        let Some(process_data) = data.as_ref() else {
            return kInvalidArgument;
        };
        let num_samples = process_data.numSamples.max(0) as usize;
        let pad = self.pad_mut();

        if let Some(context) = process_data.processContext.as_ref() {
            if context.state & K_TEMPO_VALID != 0 {
                pad.set_tempo(context.tempo);
            }
        }

        // The block's own sample size wins over the one announced at setup
        let precision = precision_from_symbolic(process_data.symbolicSampleSize)
            .unwrap_or(pad.process_setup().precision);

        let changes = HostQueues::new(process_data.inputParameterChanges);
        let update = match precision {
            SamplePrecision::Single => {
                let mut block = AudioBlock::Single(host_buffer::<f32>(process_data, num_samples));
                pad.process(changes, &mut block)
            }
            SamplePrecision::Double => {
                let mut block = AudioBlock::Double(host_buffer::<f64>(process_data, num_samples));
                pad.process(changes, &mut block)
            }
        };

        if let Some(update) = update {
            write_meter(process_data.outputParameterChanges, &update);
        }

        if process_data.numOutputs > 0 {
            if let Some(output) = process_data.outputs.as_mut() {
                output.silenceFlags = 0;
            }
        }

        kResultOk
    }

    unsafe fn getTailSamples(&self) -> u32 {
        self.pad().tail_samples()
    }
}

impl<C: SignalChain> IProcessContextRequirementsTrait for Vst3Processor<C> {
    unsafe fn getProcessContextRequirements(&self) -> u32 {
        K_NEED_TEMPO
    }
}

// =============================================================================
// IConnectionPoint
// =============================================================================

impl<C: SignalChain> IConnectionPointTrait for Vst3Processor<C> {
    unsafe fn connect(&self, other: *mut IConnectionPoint) -> tresult {
        if other.is_null() {
            return kInvalidArgument;
        }
        debug!("Controller connected");
        kResultOk
    }

    unsafe fn disconnect(&self, _other: *mut IConnectionPoint) -> tresult {
        debug!("Controller disconnected");
        kResultOk
    }

    unsafe fn notify(&self, message: *mut IMessage) -> tresult {
        let Some(message) = ComRef::from_raw(message) else {
            return kInvalidArgument;
        };
        let Some(id) = cstr_to_str(message.getMessageID()) else {
            return kResultFalse;
        };

        let attributes = ComRef::from_raw(message.getAttributes());

        if id == TEXT_MESSAGE_ID {
            let Some(text) = attributes
                .as_ref()
                .and_then(|list| attribute_string(list, TEXT_MESSAGE_KEY))
            else {
                return kResultFalse;
            };
            self.pad_mut().receive_text(&text);
            return kResultOk;
        }

        let mut payload = None;
        if let Some(attributes) = attributes {
            let mut data: *const c_void = std::ptr::null();
            let mut size: u32 = 0;
            if attributes.getBinary(BINARY_MESSAGE_KEY.as_ptr(), &mut data, &mut size) == kResultTrue
                && !data.is_null()
            {
                payload = Some(slice::from_raw_parts(data as *const u8, size as usize));
            }
        }

        let handled = self.pad_mut().notify(&HostMessage { id, payload });
        if handled {
            kResultOk
        } else {
            kResultFalse
        }
    }
}
