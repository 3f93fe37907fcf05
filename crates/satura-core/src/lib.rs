//! Satura Core - DSP primitives for the distortion processing chain
//!
//! This crate provides the building blocks the effect chain is composed
//! from, designed for real-time processing with zero allocation in the
//! audio path: every buffer is sized once in `prepare` and reused.
//!
//! # Block Model
//!
//! - [`ProcessSpec`] - sample rate / max block size / channel count
//! - [`AudioBlock`] - mutable planar view over caller-owned storage
//! - [`BlockBuffer`] - owned planar storage lending block views
//!
//! # Stages
//!
//! - [`GainStage`] - smoothed dB gain (50 ms linear ramp)
//! - [`OnePoleFilter`] - first-order TPT lowpass/highpass
//! - [`Oversampler`] / [`OversamplerBank`] - cascaded halfband 2× stages,
//!   six predefined factor/phase variants with fixed reported latency
//! - [`DryWetMixer`] - latency-compensated dry/wet blend
//! - [`CompensationDelay`] - fixed integer delay ring
//!
//! # Utilities
//!
//! - [`LinearRamp`] - constant-rate parameter smoothing
//! - Math: [`db_to_linear`], [`saturate`], [`saturate_fast`],
//!   [`hard_clip`], [`flush_denormal`]
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible (with `alloc`) for embedded targets;
//! disable the default `std` feature. Transcendental math goes through
//! `libm` in either configuration.
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation, locking or panicking paths in
//!   `process`; contract violations are debug assertions
//! - **Prepare/reset/process lifecycle**: state is allocated in `prepare`,
//!   cleared by `reset`, mutated only by `process`
//! - **Denormal hygiene**: recursive state updates flush subnormals

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod block;
pub mod delay;
pub mod gain;
pub mod math;
pub mod mixer;
pub mod one_pole;
pub mod oversample;
pub mod param;

// Re-export main types at crate root
pub use block::{AudioBlock, BlockBuffer, ProcessSpec};
pub use delay::CompensationDelay;
pub use gain::GainStage;
pub use math::{db_to_linear, flush_denormal, hard_clip, linear_to_db, saturate, saturate_fast};
pub use mixer::DryWetMixer;
pub use one_pole::{FilterMode, OnePoleFilter};
pub use oversample::{NUM_VARIANTS, Oversampler, OversamplerBank, PhaseMode};
pub use param::{GAIN_RAMP_SECONDS, LinearRamp};
