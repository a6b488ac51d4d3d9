//! # fogpad-dsp
//!
//! The signal chain behind FogPad. [`ReverbProcess`] implements
//! [`fogpad_core::SignalChain`] and is built from small stages that can also
//! be used on their own.
//!
//! All stages keep their state in `f64` and allocate only on construction.

pub mod bit_crusher;
pub mod decimator;
pub mod delay;
pub mod filter;
pub mod lfo;
pub mod limiter;
pub mod reverb;
pub mod reverb_process;

pub use reverb_process::ReverbProcess;
