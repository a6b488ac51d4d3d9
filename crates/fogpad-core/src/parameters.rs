//! The effect's parameter surface.
//!
//! [`ParameterModel`] is the authoritative store for the sixteen normalized
//! values the host automates and persists. It is plain data: mutating it has
//! no side effects, and the engine only observes it through an explicit sync.

use crate::types::ParamId;

/// Number of persisted parameters.
pub const FIELD_COUNT: usize = 16;

/// Identifier of the output-only meter parameter.
pub const METER_PARAM_ID: ParamId = 16;

/// Identifies one field of the [`ParameterModel`].
///
/// Discriminants are the host-facing ids and also fix the persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParameterId {
    DelayTime = 0,
    DelayHostSync,
    DelayFeedback,
    DelayMix,
    BitResolution,
    BitResolutionChain,
    BitResolutionLfoRate,
    BitResolutionLfoDepth,
    Decimator,
    DecimatorChain,
    DecimatorLfoRate,
    FilterChain,
    FilterCutoff,
    FilterResonance,
    FilterLfoRate,
    FilterLfoDepth,
}

impl ParameterId {
    /// Every field, in persisted order.
    pub const ALL: [ParameterId; FIELD_COUNT] = [
        ParameterId::DelayTime,
        ParameterId::DelayHostSync,
        ParameterId::DelayFeedback,
        ParameterId::DelayMix,
        ParameterId::BitResolution,
        ParameterId::BitResolutionChain,
        ParameterId::BitResolutionLfoRate,
        ParameterId::BitResolutionLfoDepth,
        ParameterId::Decimator,
        ParameterId::DecimatorChain,
        ParameterId::DecimatorLfoRate,
        ParameterId::FilterChain,
        ParameterId::FilterCutoff,
        ParameterId::FilterResonance,
        ParameterId::FilterLfoRate,
        ParameterId::FilterLfoDepth,
    ];

    /// Look up a field by host id. Unknown ids (including the meter) yield `None`.
    #[inline]
    pub fn from_raw(id: ParamId) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    #[inline]
    pub const fn raw(self) -> ParamId {
        self as ParamId
    }

    /// Stable snake_case name, used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ParameterId::DelayTime => "delay_time",
            ParameterId::DelayHostSync => "delay_host_sync",
            ParameterId::DelayFeedback => "delay_feedback",
            ParameterId::DelayMix => "delay_mix",
            ParameterId::BitResolution => "bit_resolution",
            ParameterId::BitResolutionChain => "bit_resolution_chain",
            ParameterId::BitResolutionLfoRate => "bit_resolution_lfo_rate",
            ParameterId::BitResolutionLfoDepth => "bit_resolution_lfo_depth",
            ParameterId::Decimator => "decimator",
            ParameterId::DecimatorChain => "decimator_chain",
            ParameterId::DecimatorLfoRate => "decimator_lfo_rate",
            ParameterId::FilterChain => "filter_chain",
            ParameterId::FilterCutoff => "filter_cutoff",
            ParameterId::FilterResonance => "filter_resonance",
            ParameterId::FilterLfoRate => "filter_lfo_rate",
            ParameterId::FilterLfoDepth => "filter_lfo_depth",
        }
    }
}

/// Current normalized value of every parameter, each nominally in `[0, 1]`.
///
/// Values are stored as received; range enforcement happens when the engine
/// consumes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterModel {
    pub delay_time: f32,
    /// Flag: >= 0.5 locks the delay time to the host tempo.
    pub delay_host_sync: f32,
    pub delay_feedback: f32,
    pub delay_mix: f32,
    pub bit_resolution: f32,
    /// Flag: >= 0.5 places the bit crusher after the delay.
    pub bit_resolution_chain: f32,
    pub bit_resolution_lfo_rate: f32,
    pub bit_resolution_lfo_depth: f32,
    pub decimator: f32,
    /// Flag: >= 0.5 places the decimator after the delay.
    pub decimator_chain: f32,
    pub decimator_lfo_rate: f32,
    /// Flag: >= 0.5 places the filter after the delay.
    pub filter_chain: f32,
    pub filter_cutoff: f32,
    pub filter_resonance: f32,
    pub filter_lfo_rate: f32,
    pub filter_lfo_depth: f32,
}

impl Default for ParameterModel {
    fn default() -> Self {
        Self {
            delay_time: 0.125,
            delay_host_sync: 1.0,
            delay_feedback: 0.2,
            delay_mix: 0.5,
            bit_resolution: 1.0,
            bit_resolution_chain: 1.0,
            bit_resolution_lfo_rate: 0.0,
            bit_resolution_lfo_depth: 0.75,
            decimator: 1.0,
            decimator_chain: 0.0,
            decimator_lfo_rate: 0.0,
            filter_chain: 1.0,
            filter_cutoff: 0.5,
            filter_resonance: 1.0,
            filter_lfo_rate: 0.0,
            filter_lfo_depth: 0.5,
        }
    }
}

impl ParameterModel {
    pub fn get(&self, id: ParameterId) -> f32 {
        match id {
            ParameterId::DelayTime => self.delay_time,
            ParameterId::DelayHostSync => self.delay_host_sync,
            ParameterId::DelayFeedback => self.delay_feedback,
            ParameterId::DelayMix => self.delay_mix,
            ParameterId::BitResolution => self.bit_resolution,
            ParameterId::BitResolutionChain => self.bit_resolution_chain,
            ParameterId::BitResolutionLfoRate => self.bit_resolution_lfo_rate,
            ParameterId::BitResolutionLfoDepth => self.bit_resolution_lfo_depth,
            ParameterId::Decimator => self.decimator,
            ParameterId::DecimatorChain => self.decimator_chain,
            ParameterId::DecimatorLfoRate => self.decimator_lfo_rate,
            ParameterId::FilterChain => self.filter_chain,
            ParameterId::FilterCutoff => self.filter_cutoff,
            ParameterId::FilterResonance => self.filter_resonance,
            ParameterId::FilterLfoRate => self.filter_lfo_rate,
            ParameterId::FilterLfoDepth => self.filter_lfo_depth,
        }
    }

    pub fn set(&mut self, id: ParameterId, value: f32) {
        *self.field_mut(id) = value;
    }

    fn field_mut(&mut self, id: ParameterId) -> &mut f32 {
        match id {
            ParameterId::DelayTime => &mut self.delay_time,
            ParameterId::DelayHostSync => &mut self.delay_host_sync,
            ParameterId::DelayFeedback => &mut self.delay_feedback,
            ParameterId::DelayMix => &mut self.delay_mix,
            ParameterId::BitResolution => &mut self.bit_resolution,
            ParameterId::BitResolutionChain => &mut self.bit_resolution_chain,
            ParameterId::BitResolutionLfoRate => &mut self.bit_resolution_lfo_rate,
            ParameterId::BitResolutionLfoDepth => &mut self.bit_resolution_lfo_depth,
            ParameterId::Decimator => &mut self.decimator,
            ParameterId::DecimatorChain => &mut self.decimator_chain,
            ParameterId::DecimatorLfoRate => &mut self.decimator_lfo_rate,
            ParameterId::FilterChain => &mut self.filter_chain,
            ParameterId::FilterCutoff => &mut self.filter_cutoff,
            ParameterId::FilterResonance => &mut self.filter_resonance,
            ParameterId::FilterLfoRate => &mut self.filter_lfo_rate,
            ParameterId::FilterLfoDepth => &mut self.filter_lfo_depth,
        }
    }

    /// Values in persisted order.
    pub fn to_array(&self) -> [f32; FIELD_COUNT] {
        ParameterId::ALL.map(|id| self.get(id))
    }

    /// Build a model from values in persisted order.
    pub fn from_array(values: [f32; FIELD_COUNT]) -> Self {
        let mut model = Self::default();
        for (id, value) in ParameterId::ALL.into_iter().zip(values) {
            model.set(id, value);
        }
        model
    }
}

/// Clamp a stored value into `[0, 1]`. NaN maps to 0.
#[inline]
pub fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Interpret a stored value as a boolean flag.
#[inline]
pub fn flag(value: f32) -> bool {
    value >= 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let model = ParameterModel::default();
        assert_eq!(model.delay_time, 0.125);
        assert_eq!(model.delay_feedback, 0.2);
        assert_eq!(model.bit_resolution_lfo_depth, 0.75);
        assert_eq!(model.decimator_chain, 0.0);
        assert_eq!(model.filter_resonance, 1.0);
        assert_eq!(model.filter_lfo_depth, 0.5);
    }

    #[test]
    fn test_ids_follow_persisted_order() {
        for (index, id) in ParameterId::ALL.iter().enumerate() {
            assert_eq!(id.raw() as usize, index);
            assert_eq!(ParameterId::from_raw(index as ParamId), Some(*id));
        }
        assert_eq!(ParameterId::from_raw(METER_PARAM_ID), None);
        assert_eq!(ParameterId::from_raw(9999), None);
    }

    #[test]
    fn test_get_set_touch_only_one_field() {
        let mut model = ParameterModel::default();
        model.set(ParameterId::FilterCutoff, 0.9);

        let mut expected = ParameterModel::default();
        expected.filter_cutoff = 0.9;
        assert_eq!(model, expected);
        assert_eq!(model.get(ParameterId::FilterCutoff), 0.9);
    }

    #[test]
    fn test_array_order() {
        let mut values = [0.0f32; FIELD_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f32 / 100.0;
        }
        let model = ParameterModel::from_array(values);
        assert_eq!(model.delay_host_sync, 0.01);
        assert_eq!(model.decimator_lfo_rate, 0.10);
        assert_eq!(model.filter_lfo_depth, 0.15);
        assert_eq!(model.to_array(), values);
    }

    #[test]
    fn test_unit_and_flag() {
        assert_eq!(unit(1.5), 1.0);
        assert_eq!(unit(-0.1), 0.0);
        assert_eq!(unit(f32::NAN), 0.0);
        assert!(flag(0.5));
        assert!(!flag(0.49));
    }
}
