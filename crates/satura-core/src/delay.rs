//! Fixed integer-delay ring for latency compensation.
//!
//! When one signal path incurs processing latency, the parallel path needs
//! an equal delay or the two drift out of alignment when recombined. This
//! ring buffer provides that compensation with zero-allocation processing;
//! a delay of 0 passes samples through untouched.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::block::AudioBlock;

/// Multi-channel compensation delay with a re-pointable delay length.
///
/// The ring is sized once for the largest delay that will ever be needed;
/// [`set_delay`](Self::set_delay) then moves the read tap without
/// reallocation, so the owner can track a changing wet-path latency
/// between blocks. All channels share one write cursor.
#[derive(Debug)]
pub struct CompensationDelay {
    buffer: Vec<f32>,
    ring_len: usize,
    num_channels: usize,
    write_pos: usize,
    delay: usize,
}

impl CompensationDelay {
    /// Create a delay line able to compensate up to `max_delay` samples.
    pub fn new(num_channels: usize, max_delay: usize) -> Self {
        let ring_len = max_delay + 1;
        Self {
            buffer: vec![0.0; num_channels * ring_len],
            ring_len,
            num_channels,
            write_pos: 0,
            delay: 0,
        }
    }

    /// Largest delay this line can provide.
    pub fn max_delay(&self) -> usize {
        self.ring_len - 1
    }

    /// Set the active delay in samples. Clamped to the ring capacity.
    pub fn set_delay(&mut self, samples: usize) {
        debug_assert!(samples <= self.max_delay(), "delay exceeds ring capacity");
        self.delay = samples.min(self.max_delay());
    }

    /// Active delay in samples.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Route a block through the delay: write `input`, read the delayed
    /// signal into `output`.
    ///
    /// With delay 0 the output equals the input exactly. Input and output
    /// must not alias.
    pub fn process_block(&mut self, input: &AudioBlock<'_>, output: &mut AudioBlock<'_>) {
        debug_assert_eq!(input.num_channels(), self.num_channels);
        debug_assert_eq!(input.num_samples(), output.num_samples());
        let n = input.num_samples();
        let l = self.ring_len;
        let d = self.delay;
        let mut final_pos = self.write_pos;

        for ch in 0..self.num_channels {
            let ring = &mut self.buffer[ch * l..(ch + 1) * l];
            let inp = input.channel(ch);
            let out = output.channel_mut(ch);
            let mut pos = self.write_pos;
            for i in 0..n {
                // Write first so a zero delay reads the fresh sample.
                ring[pos] = inp[i];
                out[i] = ring[(pos + l - d) % l];
                pos += 1;
                if pos == l {
                    pos = 0;
                }
            }
            final_pos = pos;
        }
        self.write_pos = final_pos;
    }

    /// Silence the ring.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
