//! The host-facing processor: chain + outer mixer + parameter gate.
//!
//! Block sequence, fixed:
//!
//! 1. consume the dirty flag; if set, pull one whole [`ParameterSnapshot`]
//!    and apply it to every stage — selector changes (including the
//!    oversampler variant, and with it the reported latency) therefore
//!    land exactly on this block boundary, never mid-block;
//! 2. refresh the reported latency and hand it to the outer mixer;
//! 3. push the dry snapshot (before the chain mutates the block in
//!    place);
//! 4. run the chain;
//! 5. mix the delayed dry signal against the processed block.
//!
//! The host is expected to poll [`latency_samples`](Processor::latency_samples)
//! once per block and feed it to its own delay compensation. The audio
//! path never allocates, locks or panics; preconditions (`prepare` before
//! `process`) are debug assertions. Denormal suppression is the host
//! execution context's responsibility for the duration of each `process`
//! call; the stages additionally flush denormals at their recursive state
//! updates.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::sync::Arc;

use satura_core::{AudioBlock, DryWetMixer, ProcessSpec};

use crate::chain::EffectChain;
use crate::params::{ParameterSnapshot, Parameters};
use crate::waveshaper::Shape;

/// The complete distortion-unit core.
#[derive(Debug)]
pub struct Processor {
    chain: EffectChain,
    mixer: DryWetMixer,
    params: Arc<Parameters>,
    latency: usize,
}

impl Processor {
    /// Create an unprepared processor holding the default parameter set.
    pub fn new() -> Self {
        let chain = EffectChain::new();
        let mixer = DryWetMixer::new(chain.max_latency_samples());
        Self {
            chain,
            mixer,
            params: Arc::new(Parameters::new()),
            latency: 0,
        }
    }

    /// Handle for the control context. Clone freely; all writes funnel
    /// into the same lock-free store.
    pub fn params(&self) -> Arc<Parameters> {
        Arc::clone(&self.params)
    }

    /// Prepare the chain and outer mixer, then reset.
    ///
    /// Must be called before `process`, and again whenever the sample
    /// rate, maximum block size or channel count changes.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.is_valid());
        self.chain.prepare(spec);
        self.mixer.prepare(spec);
        self.reset();
    }

    /// Clear all transient state and re-apply the current parameter set.
    ///
    /// After a reset every ramp rests on its target, so the processor is
    /// immediately consistent with the store — no residual transitions.
    pub fn reset(&mut self) {
        let snapshot = self.params.snapshot();
        self.apply_snapshot(&snapshot);
        self.params.take_dirty();
        self.chain.reset();
        self.mixer.reset();
    }

    /// Current total reported latency in samples.
    ///
    /// Changes only when the oversampler selector or the distortion
    /// bypass changes, and only at a block boundary.
    pub fn latency_samples(&self) -> usize {
        self.latency
    }

    /// Process one block in place.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        if self.params.take_dirty() {
            let snapshot = self.params.snapshot();
            self.apply_snapshot(&snapshot);
        }

        self.latency = self.chain.latency_samples();
        self.mixer.set_wet_latency(self.latency);
        self.mixer.push_dry_samples(block);

        self.chain.process(block);

        self.mixer.mix_wet_samples(block);
    }

    fn apply_snapshot(&mut self, snapshot: &ParameterSnapshot) {
        {
            let distortion = self.chain.distortion_mut();
            distortion.set_shape(Shape::from_index(snapshot.waveshaper_index));
            distortion.set_oversampler_index(snapshot.oversampler_index);
            distortion.set_highpass_hz(snapshot.highpass_hz);
            distortion.set_lowpass_hz(snapshot.lowpass_hz);
            distortion.set_input_gain_db(snapshot.distortion_gain_db);
            distortion.set_compensation_gain_db(snapshot.compensation_gain_db);
            distortion.set_mix_proportion(snapshot.distortion_mix_percent / 100.0);
            distortion.set_enabled(snapshot.distortion_enabled);
        }
        self.chain
            .input_gain_mut()
            .set_target_db(snapshot.input_gain_db);
        self.chain
            .output_gain_mut()
            .set_target_db(snapshot.output_gain_db);
        self.mixer
            .set_wet_mix_proportion(snapshot.mix_percent / 100.0);
        self.latency = self.chain.latency_samples();
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ProcessSpec = ProcessSpec {
        sample_rate: 48000.0,
        max_block_size: 64,
        num_channels: 2,
    };

    fn prepared() -> Processor {
        let mut p = Processor::new();
        p.prepare(&SPEC);
        p
    }

    fn process_block(p: &mut Processor, storage: &mut [f32]) {
        let mut block = AudioBlock::new(storage, 2, 64);
        p.process(&mut block);
    }

    #[test]
    fn defaults_apply_on_first_block() {
        let mut p = prepared();
        // Defaults: distortion enabled, variant 0 → latency 2.
        let mut storage = vec![0.0_f32; 128];
        process_block(&mut p, &mut storage);
        assert_eq!(p.latency_samples(), 2);
    }

    #[test]
    fn selector_changes_land_on_block_boundaries() {
        let mut p = prepared();
        let params = p.params();

        let mut storage = vec![0.0_f32; 128];
        process_block(&mut p, &mut storage);
        assert_eq!(p.latency_samples(), 2);

        params.set_oversampler_index(5);
        // Not yet: nothing applied until the next block starts.
        assert_eq!(p.latency_samples(), 2);

        process_block(&mut p, &mut storage);
        assert_eq!(p.latency_samples(), 14);
    }

    #[test]
    fn reset_reapplies_the_store() {
        let mut p = prepared();
        let params = p.params();
        params.set_oversampler_index(4);
        p.reset();
        assert_eq!(p.latency_samples(), 12);
    }

    #[test]
    fn silence_stays_silent() {
        let mut p = prepared();
        let params = p.params();
        params.set_distortion_gain_db(40.0);
        params.set_input_gain_db(12.0);
        p.reset();

        let mut storage = vec![0.0_f32; 128];
        for _ in 0..8 {
            process_block(&mut p, &mut storage);
        }
        assert!(storage.iter().all(|&s| s == 0.0));
    }
}
