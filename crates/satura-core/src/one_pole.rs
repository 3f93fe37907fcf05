//! First-order TPT filter with lowpass and highpass taps.
//!
//! A topology-preserving-transform (trapezoidal) one-pole: the cutoff is
//! pre-warped with `g = tan(π·fc/fs)` so the analog -3 dB point lands
//! exactly at `fc` at any sample rate, and the recursion stays stable for
//! any cutoff below Nyquist. Per sample:
//!
//! ```text
//! v  = (x − s) · G        with G = g / (1 + g)
//! lp = v + s
//! s  = lp + v
//! hp = x − lp
//! ```
//!
//! One state sample per channel is carried across blocks. 6 dB/octave.
//!
//! Reference: Zavalishin, "The Art of VA Filter Design", §3.10
//! (trapezoidal one-pole).

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;

use libm::tanf;

use crate::block::{AudioBlock, ProcessSpec};
use crate::math::flush_denormal;

/// Which filter tap a [`OnePoleFilter`] outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Pass frequencies below the cutoff.
    Lowpass,
    /// Pass frequencies above the cutoff.
    Highpass,
}

/// One-pole TPT filter over N channels.
#[derive(Debug)]
pub struct OnePoleFilter {
    mode: FilterMode,
    cutoff_hz: f32,
    coeff: f32,
    state: Vec<f32>,
    sample_rate: f32,
}

impl OnePoleFilter {
    /// Create a filter with the given mode and cutoff.
    ///
    /// Coefficients become meaningful after `prepare` supplies the sample
    /// rate.
    pub fn new(mode: FilterMode, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            mode,
            cutoff_hz,
            coeff: 0.0,
            state: Vec::new(),
            sample_rate: 44100.0,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Allocate per-channel state and adopt the sample rate.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.is_valid());
        self.sample_rate = spec.sample_rate;
        self.state.clear();
        self.state.resize(spec.num_channels, 0.0);
        self.recalculate_coeff();
    }

    /// Set the cutoff frequency in Hz.
    ///
    /// Clamped to (0, Nyquist): 1 Hz up to 0.49 × sample rate.
    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.clamp(1.0, 0.49 * self.sample_rate);
        self.recalculate_coeff();
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Run the one-pole recursion over every channel of the block.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        debug_assert_eq!(
            self.state.len(),
            block.num_channels(),
            "process before prepare, or channel count changed"
        );
        let g = self.coeff;
        let mode = self.mode;
        for (state, ch) in self.state.iter_mut().zip(block.channels_mut()) {
            let mut s = *state;
            for sample in ch.iter_mut() {
                let x = *sample;
                let v = (x - s) * g;
                let lp = v + s;
                s = flush_denormal(lp + v);
                *sample = match mode {
                    FilterMode::Lowpass => lp,
                    FilterMode::Highpass => x - lp,
                };
            }
            *state = s;
        }
    }

    /// Zero the per-channel delay state.
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    fn recalculate_coeff(&mut self) {
        let clamped = self.cutoff_hz.clamp(1.0, 0.49 * self.sample_rate);
        let g = tanf(core::f32::consts::PI * clamped / self.sample_rate);
        self.coeff = g / (1.0 + g);
    }
}
