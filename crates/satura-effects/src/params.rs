//! Lock-free control→audio parameter handoff.
//!
//! [`Parameters`] is the single object shared between the control context
//! (UI, automation, any thread) and the real-time audio context. Every
//! field is an atomic — `f32` values travel as their bit patterns in
//! `AtomicU32` — plus one dirty flag:
//!
//! - **Control side**: setters clamp, store the value (`Release`), then
//!   raise the dirty flag (`Release`). Writes can be batched; each setter
//!   re-raises the flag.
//! - **Audio side**: at the top of each block,
//!   [`take_dirty`](Parameters::take_dirty) swaps the flag down; if it was
//!   set, [`snapshot`](Parameters::snapshot) reads the whole parameter set
//!   (`Acquire`) and the caller applies it to every stage before any
//!   sample is processed.
//!
//! Snapshots are applied whole, at block granularity only — the audio
//! path never sees a half-applied set within one block, and selector
//! changes (waveshaper, oversampler variant) land exactly on block
//! boundaries. The audio side never blocks or allocates here.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use satura_core::oversample::NUM_VARIANTS;

/// Gain range for every dB parameter.
pub const GAIN_RANGE_DB: (f32, f32) = (-40.0, 40.0);

/// Cutoff range for both filters.
pub const CUTOFF_RANGE_HZ: (f32, f32) = (20.0, 22000.0);

/// Plain copy of the full control state, pulled whole by the audio
/// context. Values carry their control-surface units: dB, Hz, percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    /// Chain input gain in dB.
    pub input_gain_db: f32,
    /// Chain output gain in dB.
    pub output_gain_db: f32,
    /// Outer dry/wet mix in percent (0 = dry, 100 = wet).
    pub mix_percent: f32,
    /// Whether the distortion stage is enabled.
    pub distortion_enabled: bool,
    /// Waveshaper curve selector (0 = exact, 1 = fast).
    pub waveshaper_index: usize,
    /// Oversampler variant selector (0..=5).
    pub oversampler_index: usize,
    /// Pre-shaping highpass cutoff in Hz.
    pub highpass_hz: f32,
    /// Post-shaping lowpass cutoff in Hz.
    pub lowpass_hz: f32,
    /// Drive into the shaper in dB.
    pub distortion_gain_db: f32,
    /// Post-shaping compensation gain in dB.
    pub compensation_gain_db: f32,
    /// Distortion-internal dry/wet mix in percent.
    pub distortion_mix_percent: f32,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            mix_percent: 100.0,
            distortion_enabled: true,
            waveshaper_index: 0,
            oversampler_index: 0,
            highpass_hz: 20.0,
            lowpass_hz: 22000.0,
            distortion_gain_db: 0.0,
            compensation_gain_db: 0.0,
            distortion_mix_percent: 100.0,
        }
    }
}

/// An `f32` stored as bits in an `AtomicU32`.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Shared atomic parameter store with a single dirty flag.
///
/// Owned by the processor, cloned out to the control side as an
/// `Arc<Parameters>`. Starts dirty so the first block applies the
/// defaults.
#[derive(Debug)]
pub struct Parameters {
    input_gain_db: AtomicF32,
    output_gain_db: AtomicF32,
    mix_percent: AtomicF32,
    distortion_enabled: AtomicBool,
    waveshaper_index: AtomicUsize,
    oversampler_index: AtomicUsize,
    highpass_hz: AtomicF32,
    lowpass_hz: AtomicF32,
    distortion_gain_db: AtomicF32,
    compensation_gain_db: AtomicF32,
    distortion_mix_percent: AtomicF32,
    dirty: AtomicBool,
}

impl Parameters {
    /// Create a store holding the default control state, flagged dirty.
    pub fn new() -> Self {
        let d = ParameterSnapshot::default();
        Self {
            input_gain_db: AtomicF32::new(d.input_gain_db),
            output_gain_db: AtomicF32::new(d.output_gain_db),
            mix_percent: AtomicF32::new(d.mix_percent),
            distortion_enabled: AtomicBool::new(d.distortion_enabled),
            waveshaper_index: AtomicUsize::new(d.waveshaper_index),
            oversampler_index: AtomicUsize::new(d.oversampler_index),
            highpass_hz: AtomicF32::new(d.highpass_hz),
            lowpass_hz: AtomicF32::new(d.lowpass_hz),
            distortion_gain_db: AtomicF32::new(d.distortion_gain_db),
            compensation_gain_db: AtomicF32::new(d.compensation_gain_db),
            distortion_mix_percent: AtomicF32::new(d.distortion_mix_percent),
            dirty: AtomicBool::new(true),
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Consume the dirty flag. Returns true if any setter ran since the
    /// last call. Audio context only.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Read the whole current control state.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            input_gain_db: self.input_gain_db.load(),
            output_gain_db: self.output_gain_db.load(),
            mix_percent: self.mix_percent.load(),
            distortion_enabled: self.distortion_enabled.load(Ordering::Acquire),
            waveshaper_index: self.waveshaper_index.load(Ordering::Acquire),
            oversampler_index: self.oversampler_index.load(Ordering::Acquire),
            highpass_hz: self.highpass_hz.load(),
            lowpass_hz: self.lowpass_hz.load(),
            distortion_gain_db: self.distortion_gain_db.load(),
            compensation_gain_db: self.compensation_gain_db.load(),
            distortion_mix_percent: self.distortion_mix_percent.load(),
        }
    }

    /// Set the chain input gain in dB (clamped to ±40).
    pub fn set_input_gain_db(&self, db: f32) {
        self.input_gain_db.store(db.clamp(GAIN_RANGE_DB.0, GAIN_RANGE_DB.1));
        self.mark_dirty();
    }

    /// Set the chain output gain in dB (clamped to ±40).
    pub fn set_output_gain_db(&self, db: f32) {
        self.output_gain_db.store(db.clamp(GAIN_RANGE_DB.0, GAIN_RANGE_DB.1));
        self.mark_dirty();
    }

    /// Set the outer dry/wet mix in percent (clamped to 0–100).
    pub fn set_mix_percent(&self, percent: f32) {
        self.mix_percent.store(percent.clamp(0.0, 100.0));
        self.mark_dirty();
    }

    /// Enable or bypass the distortion stage.
    pub fn set_distortion_enabled(&self, enabled: bool) {
        self.distortion_enabled.store(enabled, Ordering::Release);
        self.mark_dirty();
    }

    /// Select the waveshaper curve (0 = exact, 1 = fast; clamped).
    pub fn set_waveshaper_index(&self, index: usize) {
        self.waveshaper_index.store(index.min(1), Ordering::Release);
        self.mark_dirty();
    }

    /// Select the oversampler variant (clamped to the bank size).
    pub fn set_oversampler_index(&self, index: usize) {
        self.oversampler_index
            .store(index.min(NUM_VARIANTS - 1), Ordering::Release);
        self.mark_dirty();
    }

    /// Set the pre-shaping highpass cutoff in Hz (clamped to 20–22000).
    pub fn set_highpass_hz(&self, hz: f32) {
        self.highpass_hz.store(hz.clamp(CUTOFF_RANGE_HZ.0, CUTOFF_RANGE_HZ.1));
        self.mark_dirty();
    }

    /// Set the post-shaping lowpass cutoff in Hz (clamped to 20–22000).
    pub fn set_lowpass_hz(&self, hz: f32) {
        self.lowpass_hz.store(hz.clamp(CUTOFF_RANGE_HZ.0, CUTOFF_RANGE_HZ.1));
        self.mark_dirty();
    }

    /// Set the shaper drive in dB (clamped to ±40).
    pub fn set_distortion_gain_db(&self, db: f32) {
        self.distortion_gain_db
            .store(db.clamp(GAIN_RANGE_DB.0, GAIN_RANGE_DB.1));
        self.mark_dirty();
    }

    /// Set the compensation gain in dB (clamped to ±40).
    pub fn set_compensation_gain_db(&self, db: f32) {
        self.compensation_gain_db
            .store(db.clamp(GAIN_RANGE_DB.0, GAIN_RANGE_DB.1));
        self.mark_dirty();
    }

    /// Set the distortion-internal mix in percent (clamped to 0–100).
    pub fn set_distortion_mix_percent(&self, percent: f32) {
        self.distortion_mix_percent.store(percent.clamp(0.0, 100.0));
        self.mark_dirty();
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}
