//! Smoothed block gain stage.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;

use crate::block::{AudioBlock, ProcessSpec};
use crate::math::db_to_linear;
use crate::param::{GAIN_RAMP_SECONDS, LinearRamp};

/// Applies a smoothed scalar gain to a block.
///
/// The target is set in dB and converted to linear once; the linear value
/// ramps over [`GAIN_RAMP_SECONDS`] so gain changes never step. One ramp is
/// shared by all channels — per-sample ramp values are computed once per
/// block into a prepare-sized scratch buffer, then applied channel by
/// channel. A settled ramp takes the scalar fast path.
///
/// `prepare` must run before `process`; that ordering is the caller's
/// contract and is only checked by debug assertions.
#[derive(Debug)]
pub struct GainStage {
    ramp: LinearRamp,
    scratch: Vec<f32>,
    target_db: f32,
}

impl GainStage {
    /// Create a stage at unity gain (0 dB).
    pub fn new() -> Self {
        Self {
            ramp: LinearRamp::new(1.0),
            scratch: Vec::new(),
            target_db: 0.0,
        }
    }

    /// Size the ramp scratch to the block duration and adopt the sample
    /// rate. Snaps any transition in progress.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.is_valid());
        self.ramp.set_sample_rate(spec.sample_rate);
        self.ramp.set_ramp_seconds(GAIN_RAMP_SECONDS);
        self.scratch.resize(spec.max_block_size, 0.0);
        self.ramp.snap_to_target();
    }

    /// Set the gain target in decibels.
    pub fn set_target_db(&mut self, db: f32) {
        self.target_db = db;
        self.ramp.set_target(db_to_linear(db));
    }

    /// Current gain target in decibels.
    pub fn target_db(&self) -> f32 {
        self.target_db
    }

    /// Multiply every sample by the (ramping) gain.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        let n = block.num_samples();
        debug_assert!(n <= self.scratch.len(), "process before prepare");

        if self.ramp.is_settled() {
            let g = self.ramp.get();
            for ch in block.channels_mut() {
                for sample in ch.iter_mut() {
                    *sample *= g;
                }
            }
        } else {
            let ramp = &mut self.ramp;
            let values = &mut self.scratch[..n];
            for v in values.iter_mut() {
                *v = ramp.next();
            }
            for ch in block.channels_mut() {
                for (sample, &g) in ch.iter_mut().zip(values.iter()) {
                    *sample *= g;
                }
            }
        }
    }

    /// Snap the ramp onto its target, discarding any residual transition.
    pub fn reset(&mut self) {
        self.ramp.snap_to_target();
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new()
    }
}
