//! Halfband oversampling for anti-aliased nonlinear processing.
//!
//! Nonlinear waveshaping generates harmonics above Nyquist that alias back
//! into the audible band. Running the shaper at 2×, 4× or 8× the base rate
//! pushes those harmonics below the raised Nyquist; filtering and
//! decimating afterwards restores the base rate with the aliases removed.
//!
//! Every factor is built from cascaded 2× halfband stages, in one of two
//! phase characters:
//!
//! - **Linear phase**: 17-tap symmetric halfband FIR (Kaiser-windowed
//!   sinc, ~70 dB ultimate rejection). Constant group delay, waveform
//!   shape preserved, higher latency.
//! - **Minimum phase**: two-path polyphase allpass IIR halfband (the
//!   classic elliptic two-path design). Low latency, phase dispersion near
//!   the cutoff.
//!
//! [`OversamplerBank`] holds the six predefined variants; exactly one is
//! active at a time:
//!
//! | Index | Factor | Phase | Latency (samples) |
//! |-------|--------|---------------|----|
//! | 0 | 2× | minimum | 2 |
//! | 1 | 4× | minimum | 3 |
//! | 2 | 8× | minimum | 4 |
//! | 3 | 2× | linear | 8 |
//! | 4 | 4× | linear | 12 |
//! | 5 | 8× | linear | 14 |
//!
//! Latency is fixed per variant and reported at the base rate; switching
//! the active variant is a discrete event the owner must fold into its
//! latency reporting at a block boundary.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::block::{AudioBlock, BlockBuffer};
use crate::math::flush_denormal;

/// Number of predefined oversampler variants.
pub const NUM_VARIANTS: usize = 6;

/// Phase character of a halfband stage cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseMode {
    /// Polyphase allpass IIR: lowest latency, nonlinear phase.
    MinimumPhase,
    /// Symmetric FIR: constant group delay, higher latency.
    LinearPhase,
}

const FIR_TAPS: usize = 17;

// 17-tap halfband lowpass, Kaiser window β = 6, normalized to unity DC
// gain. Alternating zeros are the halfband signature: only the center tap
// and odd offsets contribute. Group delay (TAPS − 1)/2 = 8 samples.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static HALFBAND_FIR: [f32; FIR_TAPS] = [
    -0.0000000000, -0.0030564907,  0.0000000000,  0.0194649436,
    -0.0000000000, -0.0712614945,  0.0000000000,  0.3048911786,
     0.4999237261,  0.3048911786,  0.0000000000, -0.0712614945,
    -0.0000000000,  0.0194649436,  0.0000000000, -0.0030564907,
    -0.0000000000,
];

// Two-path polyphase allpass halfband, 4th order. Published elliptic
// two-path coefficients; each value is one first-order (in z⁻¹ at the low
// rate) allpass section. DC group delay per pass ≈ 1.15 low-rate samples.
#[allow(clippy::excessive_precision)]
static ALLPASS_PATH_EVEN: [f32; 2] = [0.07986642623635751, 0.5453536510711322];
#[allow(clippy::excessive_precision)]
static ALLPASS_PATH_ODD: [f32; 2] = [0.28382934487410993, 0.8344118914807379];

// Rounded DC group delay of the minimum-phase cascades at the base rate
// (exact values ≈ 2.29, 3.44, 4.01 for one, two, three stages).
const MIN_PHASE_LATENCY: [usize; 3] = [2, 3, 4];

/// One linear-phase 2× stage: direct-form halfband FIR, separate state for
/// the interpolation and decimation passes.
#[derive(Debug)]
struct FirHalfband {
    up_state: Vec<[f32; FIR_TAPS]>,
    down_state: Vec<[f32; FIR_TAPS]>,
}

impl FirHalfband {
    fn new(num_channels: usize) -> Self {
        Self {
            up_state: vec![[0.0; FIR_TAPS]; num_channels],
            down_state: vec![[0.0; FIR_TAPS]; num_channels],
        }
    }

    fn reset(&mut self) {
        for h in &mut self.up_state {
            *h = [0.0; FIR_TAPS];
        }
        for h in &mut self.down_state {
            *h = [0.0; FIR_TAPS];
        }
    }

    #[inline]
    fn push_and_dot(history: &mut [f32; FIR_TAPS], x: f32) -> f32 {
        for j in (1..FIR_TAPS).rev() {
            history[j] = history[j - 1];
        }
        history[0] = x;
        let mut acc = 0.0;
        for (h, c) in history.iter().zip(HALFBAND_FIR.iter()) {
            acc += h * c;
        }
        acc
    }

    fn process_up(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(output.len(), input.len() * 2);
        let history = &mut self.up_state[ch];
        for (i, &x) in input.iter().enumerate() {
            // Zero-stuffing halves the average level; the ×2 restores it.
            output[2 * i] = 2.0 * Self::push_and_dot(history, x);
            output[2 * i + 1] = 2.0 * Self::push_and_dot(history, 0.0);
        }
    }

    fn process_down(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len() * 2);
        let history = &mut self.down_state[ch];
        for (out, pair) in output.iter_mut().zip(input.chunks_exact(2)) {
            *out = Self::push_and_dot(history, pair[0]);
            // The odd-phase sample still enters the delay line even though
            // decimation discards its filter output.
            Self::push_and_dot(history, pair[1]);
        }
    }
}

/// Cascade of first-order allpass sections, one state pair per section per
/// channel.
#[derive(Debug)]
struct AllpassChain {
    coeffs: &'static [f32],
    state: Vec<(f32, f32)>,
}

impl AllpassChain {
    fn new(coeffs: &'static [f32], num_channels: usize) -> Self {
        Self {
            coeffs,
            state: vec![(0.0, 0.0); coeffs.len() * num_channels],
        }
    }

    fn reset(&mut self) {
        self.state.fill((0.0, 0.0));
    }

    /// `H(z) = (a + z⁻¹) / (1 + a·z⁻¹)` per section:
    /// `y[n] = x[n−1] + a·(x[n] − y[n−1])`.
    #[inline]
    fn process(&mut self, ch: usize, x: f32) -> f32 {
        let base = ch * self.coeffs.len();
        let mut v = x;
        for (s, &a) in self.coeffs.iter().enumerate() {
            let (x1, y1) = self.state[base + s];
            let y = x1 + a * (v - y1);
            self.state[base + s] = (v, flush_denormal(y));
            v = y;
        }
        v
    }
}

/// One minimum-phase 2× stage: the halfband split `H(z) =
/// (A₀(z²) + z⁻¹·A₁(z²)) / 2` run in polyphase form, so every allpass
/// section operates at the low rate.
#[derive(Debug)]
struct IirHalfband {
    up_even: AllpassChain,
    up_odd: AllpassChain,
    down_even: AllpassChain,
    down_odd: AllpassChain,
    /// Odd-phase sample carried to the next decimation step (the z⁻¹ of
    /// the odd branch).
    held_odd: Vec<f32>,
}

impl IirHalfband {
    fn new(num_channels: usize) -> Self {
        Self {
            up_even: AllpassChain::new(&ALLPASS_PATH_EVEN, num_channels),
            up_odd: AllpassChain::new(&ALLPASS_PATH_ODD, num_channels),
            down_even: AllpassChain::new(&ALLPASS_PATH_EVEN, num_channels),
            down_odd: AllpassChain::new(&ALLPASS_PATH_ODD, num_channels),
            held_odd: vec![0.0; num_channels],
        }
    }

    fn reset(&mut self) {
        self.up_even.reset();
        self.up_odd.reset();
        self.down_even.reset();
        self.down_odd.reset();
        self.held_odd.fill(0.0);
    }

    fn process_up(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(output.len(), input.len() * 2);
        for (i, &x) in input.iter().enumerate() {
            output[2 * i] = self.up_even.process(ch, x);
            output[2 * i + 1] = self.up_odd.process(ch, x);
        }
    }

    fn process_down(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len() * 2);
        for (out, pair) in output.iter_mut().zip(input.chunks_exact(2)) {
            let even = self.down_even.process(ch, pair[0]);
            let odd = self.down_odd.process(ch, self.held_odd[ch]);
            self.held_odd[ch] = pair[1];
            *out = 0.5 * (even + odd);
        }
    }
}

#[derive(Debug)]
enum HalfbandStage {
    Fir(FirHalfband),
    Iir(IirHalfband),
}

impl HalfbandStage {
    fn process_up(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        match self {
            Self::Fir(s) => s.process_up(ch, input, output),
            Self::Iir(s) => s.process_up(ch, input, output),
        }
    }

    fn process_down(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        match self {
            Self::Fir(s) => s.process_down(ch, input, output),
            Self::Iir(s) => s.process_down(ch, input, output),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Fir(s) => s.reset(),
            Self::Iir(s) => s.reset(),
        }
    }
}

/// A cascade of 2× halfband stages with worst-case buffers sized at
/// prepare time.
///
/// `process_up` returns a view of the top-rate internal buffer, ready for
/// nonlinear processing in place; `process_down` decimates that buffer
/// back into the caller's block. Up and down calls must be paired with the
/// same base block length.
#[derive(Debug)]
pub struct Oversampler {
    phase_mode: PhaseMode,
    num_stages: usize,
    stages: Vec<HalfbandStage>,
    buffers: Vec<BlockBuffer>,
    num_channels: usize,
    pending_samples: usize,
}

impl Oversampler {
    /// Create an unprepared oversampler of `num_stages` cascaded 2× stages
    /// (1 ..= 3, i.e. 2×, 4× or 8×).
    pub fn new(num_stages: usize, phase_mode: PhaseMode) -> Self {
        assert!(
            (1..=3).contains(&num_stages),
            "supported factors are 2, 4 and 8"
        );
        Self {
            phase_mode,
            num_stages,
            stages: Vec::new(),
            buffers: Vec::new(),
            num_channels: 0,
            pending_samples: 0,
        }
    }

    /// Total up/down factor (2, 4 or 8).
    pub fn factor(&self) -> usize {
        1 << self.num_stages
    }

    /// Phase character of every stage in the cascade.
    pub fn phase_mode(&self) -> PhaseMode {
        self.phase_mode
    }

    /// Group delay of the full up+down trip, in samples at the base rate.
    ///
    /// Fixed per variant: each deeper stage runs at twice the rate of the
    /// one before it, so its contribution at the base rate halves.
    pub fn latency_samples(&self) -> usize {
        match self.phase_mode {
            PhaseMode::LinearPhase => {
                let first_stage = FIR_TAPS - 1; // both filter passes, in 2× samples
                (0..self.num_stages).map(|i| (first_stage / 2) >> i).sum()
            }
            PhaseMode::MinimumPhase => MIN_PHASE_LATENCY[self.num_stages - 1],
        }
    }

    /// Allocate stage state and worst-case intermediate buffers.
    pub fn prepare(&mut self, max_block_size: usize, num_channels: usize) {
        debug_assert!(max_block_size > 0 && num_channels > 0);
        self.num_channels = num_channels;
        self.stages.clear();
        self.buffers.clear();
        for i in 0..self.num_stages {
            self.stages.push(match self.phase_mode {
                PhaseMode::LinearPhase => HalfbandStage::Fir(FirHalfband::new(num_channels)),
                PhaseMode::MinimumPhase => HalfbandStage::Iir(IirHalfband::new(num_channels)),
            });
            self.buffers
                .push(BlockBuffer::new(num_channels, max_block_size << (i + 1)));
        }
        self.pending_samples = 0;
    }

    /// Clear all polyphase and FIR delay state.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }

    /// Upsample a block, returning the top-rate view
    /// (`input len × factor` samples per channel).
    pub fn process_up(&mut self, input: &AudioBlock<'_>) -> AudioBlock<'_> {
        debug_assert!(!self.stages.is_empty(), "process before prepare");
        debug_assert_eq!(input.num_channels(), self.num_channels);
        let n = input.num_samples();
        self.pending_samples = n;

        {
            let stage = &mut self.stages[0];
            let buf = &mut self.buffers[0];
            for ch in 0..self.num_channels {
                stage.process_up(ch, input.channel(ch), buf.channel_mut(ch, n * 2));
            }
        }
        for i in 1..self.num_stages {
            let len = n << i;
            let (head, tail) = self.buffers.split_at_mut(i);
            let src = &head[i - 1];
            let dst = &mut tail[0];
            let stage = &mut self.stages[i];
            for ch in 0..self.num_channels {
                stage.process_up(ch, src.channel(ch, len), dst.channel_mut(ch, len * 2));
            }
        }

        let top = self.num_stages - 1;
        self.buffers[top].block_mut(n << self.num_stages)
    }

    /// Decimate the internal top-rate buffer back into `output`.
    ///
    /// `output` must have the same length as the block last passed to
    /// [`process_up`](Self::process_up).
    pub fn process_down(&mut self, output: &mut AudioBlock<'_>) {
        debug_assert!(!self.stages.is_empty(), "process before prepare");
        debug_assert_eq!(output.num_channels(), self.num_channels);
        let n = output.num_samples();
        debug_assert_eq!(n, self.pending_samples, "down length must match up");

        for i in (1..self.num_stages).rev() {
            let len = n << i;
            let (head, tail) = self.buffers.split_at_mut(i);
            let dst = &mut head[i - 1];
            let src = &tail[0];
            let stage = &mut self.stages[i];
            for ch in 0..self.num_channels {
                stage.process_down(ch, src.channel(ch, len * 2), dst.channel_mut(ch, len));
            }
        }
        let stage = &mut self.stages[0];
        let buf = &self.buffers[0];
        for ch in 0..self.num_channels {
            stage.process_down(ch, buf.channel(ch, n * 2), output.channel_mut(ch));
        }
    }
}

/// The six predefined oversampler variants with one active selection.
///
/// All variants are prepared and kept warm so the selector can move
/// between blocks without allocation; only the active variant processes
/// audio.
#[derive(Debug)]
pub struct OversamplerBank {
    variants: Vec<Oversampler>,
    active: usize,
}

impl OversamplerBank {
    /// Build the six variants: minimum-phase 2×/4×/8× at indices 0–2,
    /// linear-phase 2×/4×/8× at indices 3–5.
    pub fn new() -> Self {
        let mut variants = Vec::with_capacity(NUM_VARIANTS);
        for mode in [PhaseMode::MinimumPhase, PhaseMode::LinearPhase] {
            for stages in 1..=3 {
                variants.push(Oversampler::new(stages, mode));
            }
        }
        Self {
            variants,
            active: 0,
        }
    }

    /// Prepare every variant for the worst-case block size.
    pub fn prepare(&mut self, max_block_size: usize, num_channels: usize) {
        for variant in &mut self.variants {
            variant.prepare(max_block_size, num_channels);
        }
    }

    /// Reset every variant's internal state.
    pub fn reset(&mut self) {
        for variant in &mut self.variants {
            variant.reset();
        }
    }

    /// Select the active variant. Out-of-range indices clamp to the last
    /// variant.
    pub fn set_active(&mut self, index: usize) {
        self.active = index.min(NUM_VARIANTS - 1);
    }

    /// Index of the active variant.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Inspect a variant without activating it.
    pub fn variant(&self, index: usize) -> &Oversampler {
        &self.variants[index]
    }

    /// Latency of the active variant at the base rate.
    pub fn latency_samples(&self) -> usize {
        self.variants[self.active].latency_samples()
    }

    /// Largest latency any variant can report. Compensation buffers around
    /// the bank are sized to this.
    pub fn max_latency_samples(&self) -> usize {
        self.variants
            .iter()
            .map(Oversampler::latency_samples)
            .max()
            .unwrap_or(0)
    }

    /// Upsample through the active variant.
    pub fn process_up(&mut self, input: &AudioBlock<'_>) -> AudioBlock<'_> {
        self.variants[self.active].process_up(input)
    }

    /// Downsample through the active variant.
    pub fn process_down(&mut self, output: &mut AudioBlock<'_>) {
        self.variants[self.active].process_down(output)
    }
}

impl Default for OversamplerBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 64;

    fn variant(index: usize) -> Oversampler {
        let mut os = match index {
            0..=2 => Oversampler::new(index + 1, PhaseMode::MinimumPhase),
            _ => Oversampler::new(index - 2, PhaseMode::LinearPhase),
        };
        os.prepare(BLOCK, 1);
        os
    }

    fn round_trip(os: &mut Oversampler, input: &[f32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(input.len());
        for chunk in input.chunks(BLOCK) {
            let mut storage = chunk.to_vec();
            {
                let block = AudioBlock::new(&mut storage, 1, chunk.len());
                os.process_up(&block);
            }
            let mut block = AudioBlock::new(&mut storage, 1, chunk.len());
            os.process_down(&mut block);
            out.extend_from_slice(block.channel(0));
        }
        out
    }

    #[test]
    fn latency_table() {
        let expected = [2, 3, 4, 8, 12, 14];
        for (i, &want) in expected.iter().enumerate() {
            assert_eq!(
                variant(i).latency_samples(),
                want,
                "variant {i} latency mismatch"
            );
        }
    }

    #[test]
    fn factors() {
        let expected = [2, 4, 8, 2, 4, 8];
        for (i, &want) in expected.iter().enumerate() {
            assert_eq!(variant(i).factor(), want);
        }
    }

    #[test]
    fn up_block_length_is_input_times_factor() {
        for i in 0..NUM_VARIANTS {
            let mut os = variant(i);
            let factor = os.factor();
            let mut storage = vec![0.0_f32; BLOCK];
            let block = AudioBlock::new(&mut storage, 1, BLOCK);
            let up = os.process_up(&block);
            assert_eq!(up.num_samples(), BLOCK * factor);
            assert_eq!(up.num_channels(), 1);
        }
    }

    #[test]
    fn dc_passes_every_variant() {
        for i in 0..NUM_VARIANTS {
            let mut os = variant(i);
            let input = vec![1.0_f32; 1024];
            let out = round_trip(&mut os, &input);
            let tail = out[out.len() - 1];
            assert!(
                (tail - 1.0).abs() < 0.01,
                "variant {i}: DC came back as {tail}"
            );
        }
    }

    #[test]
    fn linear_phase_impulse_arrives_at_reported_latency() {
        for i in 3..NUM_VARIANTS {
            let mut os = variant(i);
            let latency = os.latency_samples();
            let mut input = vec![0.0_f32; 256];
            input[0] = 1.0;
            let out = round_trip(&mut os, &input);
            let (argmax, peak) = out
                .iter()
                .enumerate()
                .fold((0, 0.0_f32), |(bi, bv), (j, &v)| {
                    if v.abs() > bv { (j, v.abs()) } else { (bi, bv) }
                });
            assert_eq!(argmax, latency, "variant {i}: peak at {argmax}");
            assert!(peak > 0.5, "variant {i}: impulse lost, peak {peak}");
        }
    }

    #[test]
    fn minimum_phase_step_crosses_near_reported_latency() {
        // Minimum-phase responses have no symmetric peak to pin down, but
        // the step response's 50 % crossing sits within a couple of
        // samples of the reported group delay.
        for i in 0..3 {
            let mut os = variant(i);
            let latency = os.latency_samples();
            let out = round_trip(&mut os, &[1.0; 64]);
            let crossing = out
                .iter()
                .position(|&v| v >= 0.5)
                .expect("step never crossed 0.5");
            assert!(
                (latency.saturating_sub(1)..=latency + 2).contains(&crossing),
                "variant {i}: 50% crossing at {crossing}, reported latency {latency}"
            );
        }
    }

    #[test]
    fn state_is_continuous_across_blocks() {
        // One long block and two half blocks must produce identical output.
        let mut one = variant(4);
        let mut two = variant(4);
        let input: Vec<f32> = (0..BLOCK).map(|i| libm::sinf(i as f32 * 0.3)).collect();

        let whole = round_trip(&mut one, &input);

        let mut split = Vec::new();
        for half in input.chunks(BLOCK / 2) {
            split.extend_from_slice(&round_trip(&mut two, half));
        }
        for (a, b) in whole.iter().zip(split.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn reset_clears_history() {
        let mut os = variant(3);
        round_trip(&mut os, &[1.0; 256]);
        os.reset();
        let out = round_trip(&mut os, &[0.0; 64]);
        assert!(out.iter().all(|&x| x == 0.0), "history survived reset");
    }

    #[test]
    fn bank_selector_clamps() {
        let mut bank = OversamplerBank::new();
        bank.prepare(BLOCK, 2);
        bank.set_active(99);
        assert_eq!(bank.active_index(), NUM_VARIANTS - 1);
        assert_eq!(bank.latency_samples(), 14);
    }
}
