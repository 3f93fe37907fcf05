//! The fixed three-stage effect chain.
//!
//! Input gain → distortion → output gain, in that order, always. The
//! stage set is closed and performance-critical, so the chain is a plain
//! struct of concretely-typed stages rather than a list of trait objects;
//! only bypass flags and per-stage parameters vary at runtime.

use satura_core::{AudioBlock, GainStage, ProcessSpec};

use crate::distortion::DistortionProcessor;

/// Ordered gain → distortion → gain chain with per-stage bypass.
#[derive(Debug, Default)]
pub struct EffectChain {
    input_gain: GainStage,
    distortion: DistortionProcessor,
    output_gain: GainStage,
    input_gain_bypassed: bool,
    output_gain_bypassed: bool,
}

impl EffectChain {
    /// Create a chain with unity gains and the default distortion stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare all three stages, in chain order.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.input_gain.prepare(spec);
        self.distortion.prepare(spec);
        self.output_gain.prepare(spec);
    }

    /// Reset all three stages.
    pub fn reset(&mut self) {
        self.input_gain.reset();
        self.distortion.reset();
        self.output_gain.reset();
    }

    /// Run the block through every non-bypassed stage, in order.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        if !self.input_gain_bypassed {
            self.input_gain.process(block);
        }
        // The distortion stage carries its own enable flag.
        self.distortion.process(block);
        if !self.output_gain_bypassed {
            self.output_gain.process(block);
        }
    }

    /// Total latency of the non-bypassed stages. Only the distortion
    /// stage contributes.
    pub fn latency_samples(&self) -> usize {
        self.distortion.latency_samples()
    }

    /// Worst-case latency the chain can ever report.
    pub fn max_latency_samples(&self) -> usize {
        self.distortion.max_latency_samples()
    }

    /// The input gain stage.
    pub fn input_gain_mut(&mut self) -> &mut GainStage {
        &mut self.input_gain
    }

    /// The distortion stage.
    pub fn distortion_mut(&mut self) -> &mut DistortionProcessor {
        &mut self.distortion
    }

    /// The distortion stage, read-only.
    pub fn distortion(&self) -> &DistortionProcessor {
        &self.distortion
    }

    /// The output gain stage.
    pub fn output_gain_mut(&mut self) -> &mut GainStage {
        &mut self.output_gain
    }

    /// Bypass the input gain stage.
    pub fn set_input_gain_bypassed(&mut self, bypassed: bool) {
        self.input_gain_bypassed = bypassed;
    }

    /// Bypass the output gain stage.
    pub fn set_output_gain_bypassed(&mut self, bypassed: bool) {
        self.output_gain_bypassed = bypassed;
    }
}
