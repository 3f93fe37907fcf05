//! Satura Effects - the distortion-unit processing core
//!
//! This crate composes the satura-core primitives into the complete
//! per-block pipeline of the effects unit:
//!
//! - [`Waveshaper`] - selectable nonlinear transfer curve (+ guard clip,
//!   makeup attenuation)
//! - [`DistortionProcessor`] - highpass → drive → oversample → waveshape →
//!   downsample → lowpass → compensation, inside its own latency-aligned
//!   dry/wet mix
//! - [`EffectChain`] - fixed input gain → distortion → output gain
//!   sequence with per-stage bypass
//! - [`Parameters`] / [`ParameterSnapshot`] - lock-free atomic handoff of
//!   control-rate changes into the audio path
//! - [`Processor`] - the host-facing facade: prepare / reset / process /
//!   latency reporting, with the outer latency-compensated dry/wet mix
//!
//! ## Example
//!
//! ```rust
//! use satura_core::{AudioBlock, ProcessSpec};
//! use satura_effects::Processor;
//!
//! let mut processor = Processor::new();
//! let params = processor.params(); // control-side handle
//!
//! processor.prepare(&ProcessSpec {
//!     sample_rate: 48000.0,
//!     max_block_size: 512,
//!     num_channels: 2,
//! });
//!
//! params.set_distortion_gain_db(18.0);
//! params.set_mix_percent(80.0);
//!
//! let mut samples = vec![0.0_f32; 2 * 512];
//! let mut block = AudioBlock::new(&mut samples, 2, 512);
//! processor.process(&mut block);
//! let _ = processor.latency_samples(); // poll once per block
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod chain;
pub mod distortion;
pub mod params;
pub mod processor;
pub mod waveshaper;

// Re-export main types at crate root
pub use chain::EffectChain;
pub use distortion::DistortionProcessor;
pub use params::{ParameterSnapshot, Parameters};
pub use processor::Processor;
pub use waveshaper::{MAKEUP_FACTOR, Shape, Waveshaper};
