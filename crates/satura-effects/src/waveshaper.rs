//! Stateless waveshaping stage.
//!
//! Applies one fixed nonlinear transfer function sample-by-sample to an
//! (oversampled) block. Two curves are selectable:
//!
//! - [`Shape::Saturate`]: exact tanh. Bounded by ±1; a hard clip runs
//!   after it as a guard stage.
//! - [`Shape::SaturateFast`]: rational tanh approximation, a few times
//!   cheaper per sample. No clip stage follows it; the curve tracks tanh
//!   closely in the drive range this chain produces.
//!
//! After shaping, the block is scaled by [`MAKEUP_FACTOR`] so the raised
//! harmonic content does not push peak level disproportionately into the
//! downsampler.

use satura_core::{AudioBlock, hard_clip, saturate, saturate_fast};

/// Post-shaping attenuation applied to the oversampled block.
pub const MAKEUP_FACTOR: f32 = 0.7;

/// Selectable transfer curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// Exact transcendental saturation (tanh), followed by a hard clip.
    #[default]
    Saturate,
    /// Rational approximation of the same curve.
    SaturateFast,
}

impl Shape {
    /// Map a selector index to a shape. Out-of-range indices fall back to
    /// the exact curve.
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::SaturateFast,
            _ => Self::Saturate,
        }
    }

    /// Selector index of this shape.
    pub fn index(self) -> usize {
        match self {
            Self::Saturate => 0,
            Self::SaturateFast => 1,
        }
    }
}

/// Sample-wise nonlinear shaping over a block. Stateless; safe to run at
/// any rate.
#[derive(Debug, Default)]
pub struct Waveshaper {
    shape: Shape,
}

impl Waveshaper {
    /// Create a shaper using the exact saturation curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the transfer curve.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    /// Currently selected curve.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Shape every sample, then apply the makeup attenuation.
    pub fn process(&self, block: &mut AudioBlock<'_>) {
        match self.shape {
            Shape::Saturate => {
                for ch in block.channels_mut() {
                    for sample in ch.iter_mut() {
                        *sample = hard_clip(saturate(*sample), 1.0) * MAKEUP_FACTOR;
                    }
                }
            }
            Shape::SaturateFast => {
                for ch in block.channels_mut() {
                    for sample in ch.iter_mut() {
                        *sample = saturate_fast(*sample) * MAKEUP_FACTOR;
                    }
                }
            }
        }
    }
}
