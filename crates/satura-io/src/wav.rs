//! WAV reading and writing with planar conversion.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};
use satura_core::AudioBlock;
use tracing::debug;

use crate::{Error, Result};

/// WAV file specification.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Channel-major audio storage for a whole file.
///
/// Channel `c` occupies `samples[c * num_frames .. (c + 1) * num_frames]`,
/// so [`block_mut`](Self::block_mut) can lend strided [`AudioBlock`]
/// views for in-place chunked processing.
#[derive(Debug, Clone)]
pub struct PlanarAudio {
    samples: Vec<f32>,
    num_channels: usize,
    num_frames: usize,
}

impl PlanarAudio {
    /// Allocate silence.
    pub fn silent(num_channels: usize, num_frames: usize) -> Self {
        Self {
            samples: vec![0.0; num_channels * num_frames],
            num_channels,
            num_frames,
        }
    }

    /// Deinterleave a frame-major buffer.
    pub fn from_interleaved(interleaved: &[f32], num_channels: usize) -> Self {
        let num_frames = if num_channels == 0 {
            0
        } else {
            interleaved.len() / num_channels
        };
        let mut samples = vec![0.0; num_channels * num_frames];
        for frame in 0..num_frames {
            for ch in 0..num_channels {
                samples[ch * num_frames + frame] = interleaved[frame * num_channels + ch];
            }
        }
        Self {
            samples,
            num_channels,
            num_frames,
        }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// One channel's samples.
    pub fn channel(&self, ch: usize) -> &[f32] {
        let start = ch * self.num_frames;
        &self.samples[start..start + self.num_frames]
    }

    /// One channel's samples, mutable.
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        let start = ch * self.num_frames;
        &mut self.samples[start..start + self.num_frames]
    }

    /// Lend a mutable block view of `len` frames starting at `start`,
    /// covering all channels in place.
    pub fn block_mut(&mut self, start: usize, len: usize) -> AudioBlock<'_> {
        debug_assert!(start + len <= self.num_frames);
        AudioBlock::with_stride(
            &mut self.samples[start..],
            self.num_channels,
            len,
            self.num_frames,
        )
    }

    /// Re-interleave into a frame-major buffer.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.samples.len()];
        for frame in 0..self.num_frames {
            for ch in 0..self.num_channels {
                out[frame * self.num_channels + ch] = self.samples[ch * self.num_frames + frame];
            }
        }
        out
    }
}

/// Read a WAV file, keeping all channels, as planar f32 audio.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(PlanarAudio, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let num_channels = spec.channels as usize;

    let interleaved: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max_val = (1_i32 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let audio = PlanarAudio::from_interleaved(&interleaved, num_channels);
    debug!(
        channels = num_channels,
        frames = audio.num_frames(),
        sample_rate = spec.sample_rate,
        "read wav"
    );
    Ok((audio, spec))
}

/// Write planar audio to a WAV file at the spec's bit depth.
///
/// 32-bit writes IEEE float; 16 and 24 bit write PCM with clamping.
pub fn write_wav<P: AsRef<Path>>(path: P, audio: &PlanarAudio, spec: WavSpec) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedBitDepth(spec.bits_per_sample));
    }
    debug_assert_eq!(spec.channels as usize, audio.num_channels());

    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    let interleaved = audio.to_interleaved();

    if spec.bits_per_sample == 32 {
        for &sample in &interleaved {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1_i32 << (spec.bits_per_sample - 1)) as f32;
        for &sample in &interleaved {
            let quantized = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(quantized)?;
        }
    }

    writer.finalize()?;
    debug!(frames = audio.num_frames(), "wrote wav");
    Ok(())
}
