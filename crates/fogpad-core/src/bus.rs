//! Audio bus declaration and topology negotiation.
//!
//! The effect runs either mono-in/mono-out or stereo-in/stereo-out. It
//! starts in stereo; the host may propose a different arrangement, which is
//! accepted only when both sides agree on one or two channels. Any rejected
//! proposal leaves the effect in stereo.

use crate::error::{PluginError, PluginResult};

/// A speaker layout as a bitmask of speaker positions.
///
/// Bit assignments follow the common convention where bit 0 is left,
/// bit 1 is right and bit 19 is the mono centre speaker. Only the number of
/// set bits matters to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeakerLayout(pub u64);

impl SpeakerLayout {
    pub const EMPTY: Self = Self(0);
    pub const MONO: Self = Self(1 << 19);
    pub const STEREO: Self = Self(0b11);

    /// Number of channels in this layout.
    #[inline]
    pub const fn channel_count(self) -> u32 {
        self.0.count_ones()
    }
}

/// The two arrangements the effect can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    Mono,
    #[default]
    Stereo,
}

impl Topology {
    pub const fn channel_count(self) -> usize {
        match self {
            Topology::Mono => 1,
            Topology::Stereo => 2,
        }
    }
}

/// Description of one audio bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusInfo {
    pub name: &'static str,
    pub layout: SpeakerLayout,
}

impl BusInfo {
    pub const fn channel_count(&self) -> u32 {
        self.layout.channel_count()
    }
}

/// Number of event input buses. The bus is declared for host compatibility;
/// the engine consumes no events from it.
pub const EVENT_INPUT_BUSES: usize = 1;

/// Channel count of the event input bus.
pub const EVENT_BUS_CHANNELS: u32 = 1;

/// The declared main input/output bus pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    topology: Topology,
    input: BusInfo,
    output: BusInfo,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::stereo(SpeakerLayout::STEREO, SpeakerLayout::STEREO)
    }
}

impl BusConfig {
    fn stereo(input: SpeakerLayout, output: SpeakerLayout) -> Self {
        Self {
            topology: Topology::Stereo,
            input: BusInfo {
                name: "Stereo In",
                layout: input,
            },
            output: BusInfo {
                name: "Stereo Out",
                layout: output,
            },
        }
    }

    fn mono(input: SpeakerLayout, output: SpeakerLayout) -> Self {
        Self {
            topology: Topology::Mono,
            input: BusInfo {
                name: "Mono In",
                layout: input,
            },
            output: BusInfo {
                name: "Mono Out",
                layout: output,
            },
        }
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn input(&self) -> &BusInfo {
        &self.input
    }

    #[inline]
    pub fn output(&self) -> &BusInfo {
        &self.output
    }

    /// Channels the engine must be built for: the wider of the two sides.
    pub fn channel_count(&self) -> usize {
        self.input
            .channel_count()
            .max(self.output.channel_count()) as usize
    }

    /// Respond to a host arrangement proposal.
    ///
    /// Exactly one input bus and one output bus must be proposed. Mono/mono
    /// and stereo/stereo proposals are accepted and the buses are recreated
    /// with the proposed layouts. Everything else reverts to the default
    /// stereo pair and is rejected.
    pub fn negotiate(
        &mut self,
        inputs: &[SpeakerLayout],
        outputs: &[SpeakerLayout],
    ) -> PluginResult<Topology> {
        if let ([input], [output]) = (inputs, outputs) {
            match (input.channel_count(), output.channel_count()) {
                (1, 1) => {
                    *self = Self::mono(*input, *output);
                    return Ok(Topology::Mono);
                }
                (2, 2) => {
                    *self = Self::stereo(*input, *output);
                    return Ok(Topology::Stereo);
                }
                _ => {}
            }
        }

        *self = Self::default();
        Err(PluginError::UnsupportedTopology {
            inputs: inputs.first().map_or(0, |l| l.channel_count()),
            outputs: outputs.first().map_or(0, |l| l.channel_count()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stereo() {
        let buses = BusConfig::default();
        assert_eq!(buses.topology(), Topology::Stereo);
        assert_eq!(buses.input().name, "Stereo In");
        assert_eq!(buses.output().channel_count(), 2);
        assert_eq!(buses.channel_count(), 2);
    }

    #[test]
    fn test_mono_accepted() {
        let mut buses = BusConfig::default();
        let result = buses.negotiate(&[SpeakerLayout::MONO], &[SpeakerLayout::MONO]);

        assert_eq!(result, Ok(Topology::Mono));
        assert_eq!(buses.input().name, "Mono In");
        assert_eq!(buses.output().name, "Mono Out");
        assert_eq!(buses.channel_count(), 1);
    }

    #[test]
    fn test_stereo_keeps_proposed_layout() {
        let mut buses = BusConfig::default();
        // Surround left/right pair: still two channels
        let pair = SpeakerLayout(0b1100_0000);
        let result = buses.negotiate(&[pair], &[pair]);

        assert_eq!(result, Ok(Topology::Stereo));
        assert_eq!(buses.input().layout, pair);
    }

    #[test]
    fn test_mismatch_reverts_to_stereo() {
        let mut buses = BusConfig::default();
        buses
            .negotiate(&[SpeakerLayout::MONO], &[SpeakerLayout::MONO])
            .unwrap();

        let result = buses.negotiate(&[SpeakerLayout::MONO], &[SpeakerLayout::STEREO]);
        assert_eq!(
            result,
            Err(PluginError::UnsupportedTopology {
                inputs: 1,
                outputs: 2
            })
        );
        assert_eq!(buses, BusConfig::default());
    }

    #[test]
    fn test_surround_and_bus_count_mismatch_rejected() {
        let mut buses = BusConfig::default();
        let five_one = SpeakerLayout(0b11_1111);
        assert!(buses.negotiate(&[five_one], &[five_one]).is_err());
        assert!(buses
            .negotiate(
                &[SpeakerLayout::STEREO, SpeakerLayout::STEREO],
                &[SpeakerLayout::STEREO]
            )
            .is_err());
        assert!(buses.negotiate(&[], &[]).is_err());
        assert_eq!(buses.topology(), Topology::Stereo);
    }
}
