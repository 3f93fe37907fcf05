//! Latency-compensated dry/wet mixer.
//!
//! Used around any processing path that both delays and transforms the
//! signal. Protocol, once per block and strictly in this order:
//!
//! 1. [`set_wet_latency`](DryWetMixer::set_wet_latency) with the wet path's
//!    current latency,
//! 2. [`push_dry_samples`](DryWetMixer::push_dry_samples) with the block
//!    *before* the wet path mutates it in place,
//! 3. run the wet path,
//! 4. [`mix_wet_samples`](DryWetMixer::mix_wet_samples) on the processed
//!    block.
//!
//! The dry signal is routed through a [`CompensationDelay`] as it is
//! pushed, so by mix time it is aligned with the wet path. The blend is the
//! two-multiply linear rule `dry·(1−m) + wet·m`, which reproduces the dry
//! signal exactly at m = 0 and the wet signal exactly at m = 1. The wet
//! proportion ramps over the standard transition time.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;

use crate::block::{AudioBlock, BlockBuffer, ProcessSpec};
use crate::delay::CompensationDelay;
use crate::param::{GAIN_RAMP_SECONDS, LinearRamp};

/// Block-level dry/wet mixer with latency-aligned dry path.
#[derive(Debug)]
pub struct DryWetMixer {
    mix: LinearRamp,
    delay: CompensationDelay,
    dry: BlockBuffer,
    scratch: Vec<f32>,
    max_wet_latency: usize,
}

impl DryWetMixer {
    /// Create a mixer able to compensate up to `max_wet_latency` samples.
    ///
    /// Buffers are sized by `prepare`; the mixer starts fully wet.
    pub fn new(max_wet_latency: usize) -> Self {
        Self {
            mix: LinearRamp::new(1.0),
            delay: CompensationDelay::new(0, max_wet_latency),
            dry: BlockBuffer::new(0, 0),
            scratch: Vec::new(),
            max_wet_latency,
        }
    }

    /// Size the compensation ring and dry snapshot for the session.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.is_valid());
        self.mix.set_sample_rate(spec.sample_rate);
        self.mix.set_ramp_seconds(GAIN_RAMP_SECONDS);
        self.mix.snap_to_target();
        self.delay = CompensationDelay::new(spec.num_channels, self.max_wet_latency);
        self.dry = BlockBuffer::new(spec.num_channels, spec.max_block_size);
        self.scratch.resize(spec.max_block_size, 0.0);
    }

    /// Set the wet blend proportion, 0.0 (all dry) to 1.0 (all wet).
    pub fn set_wet_mix_proportion(&mut self, proportion: f32) {
        self.mix.set_target(proportion.clamp(0.0, 1.0));
    }

    /// Current wet blend target.
    pub fn wet_mix_proportion(&self) -> f32 {
        self.mix.target()
    }

    /// Tell the dry path how far the wet path is about to fall behind.
    ///
    /// Must be called before [`push_dry_samples`](Self::push_dry_samples)
    /// whenever the wet latency may have changed.
    pub fn set_wet_latency(&mut self, samples: usize) {
        self.delay.set_delay(samples);
    }

    /// Snapshot the dry signal, already delayed into wet-path alignment.
    pub fn push_dry_samples(&mut self, block: &AudioBlock<'_>) {
        debug_assert!(block.num_samples() <= self.dry.max_samples());
        let mut dry = self.dry.block_mut(block.num_samples());
        self.delay.process_block(block, &mut dry);
    }

    /// Blend the delayed dry snapshot into the processed (wet) block.
    pub fn mix_wet_samples(&mut self, block: &mut AudioBlock<'_>) {
        let n = block.num_samples();
        debug_assert!(n <= self.dry.max_samples());

        if self.mix.is_settled() {
            let m = self.mix.get();
            if m == 1.0 {
                return;
            }
            for ch in 0..block.num_channels() {
                let dry = self.dry.channel(ch, n);
                for (wet, &d) in block.channel_mut(ch).iter_mut().zip(dry.iter()) {
                    *wet = d * (1.0 - m) + *wet * m;
                }
            }
        } else {
            let mix = &mut self.mix;
            let values = &mut self.scratch[..n];
            for v in values.iter_mut() {
                *v = mix.next();
            }
            for ch in 0..block.num_channels() {
                let dry = self.dry.channel(ch, n);
                for ((wet, &d), &m) in block
                    .channel_mut(ch)
                    .iter_mut()
                    .zip(dry.iter())
                    .zip(values.iter())
                {
                    *wet = d * (1.0 - m) + *wet * m;
                }
            }
        }
    }

    /// Clear the compensation ring and dry snapshot; snap the mix ramp.
    pub fn reset(&mut self) {
        self.delay.clear();
        self.dry.clear();
        self.mix.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ProcessSpec = ProcessSpec {
        sample_rate: 48000.0,
        max_block_size: 64,
        num_channels: 1,
    };

    fn mixer() -> DryWetMixer {
        let mut m = DryWetMixer::new(16);
        m.prepare(&SPEC);
        m
    }

    #[test]
    fn fully_wet_leaves_block_untouched() {
        let mut m = mixer();
        let mut storage: Vec<f32> = (0..64).map(|i| i as f32 * 0.01).collect();
        {
            let block = AudioBlock::new(&mut storage, 1, 64);
            m.push_dry_samples(&block);
        }
        // "Process": negate in place.
        for s in storage.iter_mut() {
            *s = -*s;
        }
        let expected = storage.clone();
        let mut block = AudioBlock::new(&mut storage, 1, 64);
        m.mix_wet_samples(&mut block);
        assert_eq!(storage, expected);
    }

    #[test]
    fn fully_dry_restores_input() {
        let mut m = mixer();
        m.set_wet_mix_proportion(0.0);
        m.reset(); // snap the ramp so the mix is exactly 0

        let mut storage: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();
        let original = storage.clone();
        {
            let block = AudioBlock::new(&mut storage, 1, 64);
            m.push_dry_samples(&block);
        }
        storage.fill(99.0); // wet path destroys the signal
        let mut block = AudioBlock::new(&mut storage, 1, 64);
        m.mix_wet_samples(&mut block);
        assert_eq!(storage, original);
    }

    #[test]
    fn dry_path_is_delayed_by_wet_latency() {
        let mut m = mixer();
        m.set_wet_mix_proportion(0.0);
        m.reset();
        m.set_wet_latency(4);

        let mut storage = vec![0.0_f32; 64];
        storage[0] = 1.0;
        {
            let block = AudioBlock::new(&mut storage, 1, 64);
            m.push_dry_samples(&block);
        }
        storage.fill(0.0);
        let mut block = AudioBlock::new(&mut storage, 1, 64);
        m.mix_wet_samples(&mut block);
        assert_eq!(storage[4], 1.0);
        assert_eq!(storage[0], 0.0);
    }

    #[test]
    fn half_mix_averages_once_settled() {
        let mut m = mixer();
        m.set_wet_mix_proportion(0.5);
        m.reset();

        let mut storage = vec![1.0_f32; 64];
        {
            let block = AudioBlock::new(&mut storage, 1, 64);
            m.push_dry_samples(&block);
        }
        storage.fill(0.0); // wet = silence
        let mut block = AudioBlock::new(&mut storage, 1, 64);
        m.mix_wet_samples(&mut block);
        for &s in &storage {
            assert!((s - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn mix_change_ramps() {
        let mut m = mixer();
        // Start fully wet, move toward dry without snapping.
        m.set_wet_mix_proportion(0.0);

        let mut storage = vec![0.0_f32; 64];
        {
            let mut dry = vec![1.0_f32; 64];
            let block = AudioBlock::new(&mut dry, 1, 64);
            m.push_dry_samples(&block);
        }
        let mut block = AudioBlock::new(&mut storage, 1, 64);
        m.mix_wet_samples(&mut block);
        // Mid-ramp: some dry has started to bleed in, but nowhere near full.
        assert!(storage[63] > storage[0]);
        assert!(storage[63] < 0.5);
    }
}
