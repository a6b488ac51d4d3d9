//! Sample type abstraction for precision-generic processing.
//!
//! The engine runs the same signal chain for 32-bit and 64-bit host buffers.
//! Stages keep their own state in `f64` and convert at the buffer edge
//! through this trait, so one monomorphized code path exists per precision.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A floating-point sample type the engine can process.
///
/// Implemented for `f32` and `f64` only.
pub trait Sample:
    Copy
    + Clone
    + Default
    + Send
    + Sync
    + Debug
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Silence.
    const ZERO: Self;

    /// Convert from `f64`, the precision stages compute in.
    fn from_f64(value: f64) -> Self;

    /// Convert to `f64`.
    fn to_f64(self) -> f64;
}

/// The two sample widths a host may process with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplePrecision {
    /// 32-bit float buffers.
    #[default]
    Single,
    /// 64-bit float buffers.
    Double,
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak<S: Sample>(samples: &[S]) -> f64 {
        samples.iter().fold(0.0, |acc, s| acc.max(s.to_f64().abs()))
    }

    #[test]
    fn test_generic_peak_matches_across_precisions() {
        let single = [0.25f32, -0.75, 0.5];
        let double = [0.25f64, -0.75, 0.5];
        assert_eq!(peak(&single), 0.75);
        assert_eq!(peak(&double), 0.75);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(f32::from_f64(0.5), 0.5f32);
        assert_eq!(0.25f32.to_f64(), 0.25f64);
        assert_eq!(<f64 as Sample>::ZERO, 0.0);
    }
}
