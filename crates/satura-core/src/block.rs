//! Planar audio block model.
//!
//! The processing core works on blocks of single-precision samples laid out
//! channel-major ("planar"): all of channel 0, then all of channel 1, and so
//! on. [`AudioBlock`] is a mutable *view* over storage the caller owns — the
//! core never resizes it, and in-place ("replacing") processing means the
//! same view is both input and output. [`BlockBuffer`] is the owned
//! counterpart, sized once at prepare time so the audio path never
//! allocates.
//!
//! [`ProcessSpec`] carries the immutable facts of a processing session:
//! sample rate, worst-case block length, channel count. It is handed to
//! every stage's `prepare` and must be reissued whenever any of the three
//! change.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Immutable description of a processing session.
///
/// Passed to `prepare` on every stage. All fields must be positive; a spec
/// violating that is a caller programming error and is only checked by
/// debug assertions ([`ProcessSpec::is_valid`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block length (samples per channel) any `process` call may use.
    pub max_block_size: usize,
    /// Number of audio channels.
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Whether every field is in its legal range.
    pub fn is_valid(&self) -> bool {
        self.sample_rate > 0.0 && self.max_block_size > 0 && self.num_channels > 0
    }
}

/// Mutable view over planar, caller-owned sample storage.
///
/// Channel `c` occupies `samples[c * stride .. c * stride + num_samples]`.
/// The stride lets a view of a short block borrow from max-block-sized
/// backing storage without copying.
#[derive(Debug)]
pub struct AudioBlock<'a> {
    samples: &'a mut [f32],
    num_channels: usize,
    num_samples: usize,
    stride: usize,
}

impl<'a> AudioBlock<'a> {
    /// Create a view over tightly packed planar storage
    /// (`stride == num_samples`).
    pub fn new(samples: &'a mut [f32], num_channels: usize, num_samples: usize) -> Self {
        Self::with_stride(samples, num_channels, num_samples, num_samples)
    }

    /// Create a view with an explicit channel stride.
    ///
    /// # Panics
    ///
    /// Panics if the storage is too short for `num_channels` channels at the
    /// given stride, or if `num_samples > stride`.
    pub fn with_stride(
        samples: &'a mut [f32],
        num_channels: usize,
        num_samples: usize,
        stride: usize,
    ) -> Self {
        assert!(num_samples <= stride, "block length exceeds channel stride");
        assert!(
            num_channels == 0 || samples.len() >= (num_channels - 1) * stride + num_samples,
            "storage too short for {num_channels} channels of {num_samples} samples"
        );
        Self {
            samples,
            num_channels,
            num_samples,
            stride,
        }
    }

    /// Number of channels in the view.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Samples per channel in the view.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Immutable access to one channel.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        let start = ch * self.stride;
        &self.samples[start..start + self.num_samples]
    }

    /// Mutable access to one channel.
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        let start = ch * self.stride;
        &mut self.samples[start..start + self.num_samples]
    }

    /// Iterate mutably over all channels.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let n = self.num_samples;
        self.samples
            .chunks_mut(self.stride.max(1))
            .take(self.num_channels)
            .map(move |c| &mut c[..n])
    }

    /// Set every sample in the view to `value`.
    pub fn fill(&mut self, value: f32) {
        for ch in self.channels_mut() {
            ch.fill(value);
        }
    }

    /// Copy samples from another block of identical dimensions.
    pub fn copy_from(&mut self, source: &AudioBlock<'_>) {
        debug_assert_eq!(self.num_channels, source.num_channels());
        debug_assert_eq!(self.num_samples, source.num_samples());
        for ch in 0..self.num_channels {
            self.channel_mut(ch).copy_from_slice(source.channel(ch));
        }
    }
}

/// Owned planar sample storage, sized once and reused for every block.
///
/// Lends [`AudioBlock`] views of any length up to its capacity; the stride
/// stays at the capacity so shorter views remain valid without moving data.
#[derive(Debug, Clone)]
pub struct BlockBuffer {
    data: Vec<f32>,
    num_channels: usize,
    max_samples: usize,
}

impl BlockBuffer {
    /// Allocate zeroed storage for `num_channels × max_samples` samples.
    pub fn new(num_channels: usize, max_samples: usize) -> Self {
        Self {
            data: vec![0.0; num_channels * max_samples],
            num_channels,
            max_samples,
        }
    }

    /// Number of channels.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Capacity in samples per channel.
    #[inline]
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Borrow a mutable view of the first `num_samples` of every channel.
    pub fn block_mut(&mut self, num_samples: usize) -> AudioBlock<'_> {
        debug_assert!(num_samples <= self.max_samples);
        AudioBlock::with_stride(
            &mut self.data,
            self.num_channels,
            num_samples,
            self.max_samples,
        )
    }

    /// Immutable access to the first `num_samples` of one channel.
    #[inline]
    pub fn channel(&self, ch: usize, num_samples: usize) -> &[f32] {
        debug_assert!(num_samples <= self.max_samples);
        let start = ch * self.max_samples;
        &self.data[start..start + num_samples]
    }

    /// Mutable access to the first `num_samples` of one channel.
    #[inline]
    pub fn channel_mut(&mut self, ch: usize, num_samples: usize) -> &mut [f32] {
        debug_assert!(num_samples <= self.max_samples);
        let start = ch * self.max_samples;
        &mut self.data[start..start + num_samples]
    }

    /// Zero all storage.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}
