//! The composed distortion stage.
//!
//! Signal path per block, when enabled:
//!
//! ```text
//! highpass (pre) → input gain → [dry copy, latency-tagged]
//!   → oversample up → waveshape (+ guard clip, × makeup) → oversample down
//!   → lowpass (post) → compensation gain → dry/wet mix
//! ```
//!
//! The inner dry/wet mixer is told the *current* oversampler latency
//! before every dry push, so its compensation ring tracks variant
//! switches and the dry copy stays aligned with the wet path. When the
//! stage is bypassed, `process` is a no-op and the reported latency is 0.

use satura_core::{
    AudioBlock, DryWetMixer, FilterMode, GainStage, OnePoleFilter, OversamplerBank, ProcessSpec,
};

use crate::waveshaper::{Shape, Waveshaper};

/// Oversampled waveshaping distortion with pre/post filtering and an
/// internal latency-compensated dry/wet mix.
#[derive(Debug)]
pub struct DistortionProcessor {
    highpass: OnePoleFilter,
    input_gain: GainStage,
    oversamplers: OversamplerBank,
    waveshaper: Waveshaper,
    lowpass: OnePoleFilter,
    comp_gain: GainStage,
    mixer: DryWetMixer,
    enabled: bool,
}

impl DistortionProcessor {
    /// Create the stage with neutral settings: filters fully open, unity
    /// gains, fully wet, enabled, 2× minimum-phase oversampling.
    pub fn new() -> Self {
        let oversamplers = OversamplerBank::new();
        let mixer = DryWetMixer::new(oversamplers.max_latency_samples());
        Self {
            highpass: OnePoleFilter::new(FilterMode::Highpass, 20.0),
            input_gain: GainStage::new(),
            oversamplers,
            waveshaper: Waveshaper::new(),
            lowpass: OnePoleFilter::new(FilterMode::Lowpass, 22000.0),
            comp_gain: GainStage::new(),
            mixer,
            enabled: true,
        }
    }

    /// Prepare every sub-stage for the session.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.is_valid());
        self.oversamplers
            .prepare(spec.max_block_size, spec.num_channels);
        self.highpass.prepare(spec);
        self.input_gain.prepare(spec);
        self.lowpass.prepare(spec);
        self.comp_gain.prepare(spec);
        self.mixer.prepare(spec);
    }

    /// Clear every sub-stage's transient state.
    pub fn reset(&mut self) {
        self.oversamplers.reset();
        self.highpass.reset();
        self.input_gain.reset();
        self.lowpass.reset();
        self.comp_gain.reset();
        self.mixer.reset();
    }

    /// Enable or bypass the whole stage.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the stage is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Select the waveshaping curve.
    pub fn set_shape(&mut self, shape: Shape) {
        self.waveshaper.set_shape(shape);
    }

    /// Select the active oversampler variant (0..=5; out-of-range clamps).
    pub fn set_oversampler_index(&mut self, index: usize) {
        self.oversamplers.set_active(index);
    }

    /// Index of the active oversampler variant.
    pub fn oversampler_index(&self) -> usize {
        self.oversamplers.active_index()
    }

    /// Pre-shaping highpass cutoff in Hz.
    pub fn set_highpass_hz(&mut self, hz: f32) {
        self.highpass.set_cutoff_hz(hz);
    }

    /// Post-shaping lowpass cutoff in Hz.
    pub fn set_lowpass_hz(&mut self, hz: f32) {
        self.lowpass.set_cutoff_hz(hz);
    }

    /// Drive into the shaper, in dB.
    pub fn set_input_gain_db(&mut self, db: f32) {
        self.input_gain.set_target_db(db);
    }

    /// Post-shaping compensation gain, in dB.
    pub fn set_compensation_gain_db(&mut self, db: f32) {
        self.comp_gain.set_target_db(db);
    }

    /// Internal wet blend, 0.0 (dry) to 1.0 (wet).
    pub fn set_mix_proportion(&mut self, proportion: f32) {
        self.mixer.set_wet_mix_proportion(proportion);
    }

    /// Latency this stage contributes: the active oversampler variant's
    /// group delay, or 0 when bypassed.
    pub fn latency_samples(&self) -> usize {
        if self.enabled {
            self.oversamplers.latency_samples()
        } else {
            0
        }
    }

    /// Worst-case latency across all variants; compensation buffers
    /// downstream are sized to this.
    pub fn max_latency_samples(&self) -> usize {
        self.oversamplers.max_latency_samples()
    }

    /// Run the stage in place. No-op when bypassed.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        if !self.enabled {
            return;
        }

        self.highpass.process(block);
        self.input_gain.process(block);

        // The dry copy must be tagged with the latency the wet path is
        // about to incur, so variant switches stay aligned.
        self.mixer
            .set_wet_latency(self.oversamplers.latency_samples());
        self.mixer.push_dry_samples(block);

        {
            let mut oversampled = self.oversamplers.process_up(block);
            self.waveshaper.process(&mut oversampled);
        }
        self.oversamplers.process_down(block);

        self.lowpass.process(block);
        self.comp_gain.process(block);
        self.mixer.mix_wet_samples(block);
    }
}

impl Default for DistortionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ProcessSpec = ProcessSpec {
        sample_rate: 48000.0,
        max_block_size: 128,
        num_channels: 1,
    };

    fn prepared() -> DistortionProcessor {
        let mut d = DistortionProcessor::new();
        d.prepare(&SPEC);
        d
    }

    #[test]
    fn bypassed_stage_is_a_no_op() {
        let mut d = prepared();
        d.set_enabled(false);

        let mut storage: Vec<f32> = (0..128).map(|i| (i as f32 * 0.1).sin()).collect();
        let original = storage.clone();
        let mut block = AudioBlock::new(&mut storage, 1, 128);
        d.process(&mut block);
        assert_eq!(storage, original);
        assert_eq!(d.latency_samples(), 0);
    }

    #[test]
    fn latency_follows_active_variant() {
        let mut d = prepared();
        for (index, latency) in [(0, 2), (1, 3), (2, 4), (3, 8), (4, 12), (5, 14)] {
            d.set_oversampler_index(index);
            assert_eq!(d.latency_samples(), latency);
        }
    }

    #[test]
    fn silence_in_silence_out() {
        let mut d = prepared();
        d.set_input_gain_db(20.0);
        d.reset();

        let mut storage = vec![0.0_f32; 128];
        let mut block = AudioBlock::new(&mut storage, 1, 128);
        d.process(&mut block);
        assert!(storage.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn hot_input_is_limited_by_the_shaper() {
        let mut d = prepared();
        d.set_input_gain_db(40.0);
        d.reset();

        // Settle the gain ramp, then check the output stays within the
        // shaper ceiling (makeup factor) plus filter overshoot.
        let mut last = vec![0.0_f32; 128];
        for _ in 0..40 {
            let mut storage: Vec<f32> =
                (0..128).map(|i| libm::sinf(i as f32 * 0.2) * 0.9).collect();
            let mut block = AudioBlock::new(&mut storage, 1, 128);
            d.process(&mut block);
            last.copy_from_slice(&storage);
        }
        for &s in &last {
            assert!(s.abs() < 1.0, "distorted output escaped bounds: {s}");
        }
    }

    #[test]
    fn fully_dry_inner_mix_returns_delayed_input() {
        let mut d = prepared();
        d.set_mix_proportion(0.0);
        d.set_oversampler_index(3); // linear phase 2×, latency 8
        d.reset();

        let mut storage = vec![0.0_f32; 128];
        storage[0] = 1.0;
        let mut block = AudioBlock::new(&mut storage, 1, 128);
        d.process(&mut block);

        // Dry path: highpass at 20 Hz barely touches an impulse; expect
        // the peak 8 samples in.
        let (argmax, _) = storage
            .iter()
            .enumerate()
            .fold((0, 0.0_f32), |(bi, bv), (i, &v)| {
                if v.abs() > bv { (i, v.abs()) } else { (bi, bv) }
            });
        assert_eq!(argmax, 8);
    }
}
