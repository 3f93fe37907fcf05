//! WAV file I/O for the satura processing core.
//!
//! The core processes planar (channel-major) blocks; WAV files store
//! interleaved frames. This crate converts between the two:
//!
//! - [`read_wav`] loads a file into [`PlanarAudio`], all channels kept
//! - [`write_wav`] interleaves planar audio back out, at a choice of bit
//!   depths
//! - [`PlanarAudio::block_mut`] lends in-place [`AudioBlock`] views for
//!   chunked processing without copying
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use satura_io::{read_wav, write_wav};
//!
//! let (mut audio, spec) = read_wav("input.wav")?;
//! for start in (0..audio.num_frames()).step_by(512) {
//!     let len = 512.min(audio.num_frames() - start);
//!     let mut block = audio.block_mut(start, len);
//!     processor.process(&mut block);
//! }
//! write_wav("output.wav", &audio, spec)?;
//! ```

mod wav;

pub use wav::{PlanarAudio, WavSpec, read_wav, write_wav};

/// Error type for audio file operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested bit depth cannot be written.
    #[error("Unsupported bit depth: {0} (use 16, 24 or 32)")]
    UnsupportedBitDepth(u16),
}

/// Result alias for audio file operations.
pub type Result<T> = std::result::Result<T, Error>;
