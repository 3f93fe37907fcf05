//! File-based processing command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use satura_core::ProcessSpec;
use satura_effects::Processor;
use satura_io::{PlanarAudio, WavSpec, read_wav, write_wav};
use tracing::info;

use crate::preset::Preset;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset file (TOML); flags below override nothing once a preset is given
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Chain input gain in dB
    #[arg(long, default_value_t = 0.0)]
    input_gain: f32,

    /// Chain output gain in dB
    #[arg(long, default_value_t = 0.0)]
    output_gain: f32,

    /// Outer dry/wet mix in percent
    #[arg(long, default_value_t = 100.0)]
    mix: f32,

    /// Drive into the shaper in dB
    #[arg(long, default_value_t = 12.0)]
    drive: f32,

    /// Post-shaping compensation gain in dB
    #[arg(long, default_value_t = 0.0)]
    compensation: f32,

    /// Pre-shaping highpass cutoff in Hz
    #[arg(long, default_value_t = 20.0)]
    highpass: f32,

    /// Post-shaping lowpass cutoff in Hz
    #[arg(long, default_value_t = 22000.0)]
    lowpass: f32,

    /// Distortion-internal dry/wet mix in percent
    #[arg(long, default_value_t = 100.0)]
    distortion_mix: f32,

    /// Waveshaper curve (0 = exact, 1 = fast)
    #[arg(long, default_value_t = 0)]
    waveshaper: usize,

    /// Oversampler variant (0..=5, see `satura info`)
    #[arg(long, default_value_t = 0)]
    oversampler: usize,

    /// Bypass the distortion stage entirely
    #[arg(long)]
    bypass_distortion: bool,

    /// Processing block size
    #[arg(long, default_value_t = 512)]
    block_size: usize,

    /// Output bit depth (16, 24 or 32)
    #[arg(long, default_value_t = 32)]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let (audio, in_spec) = read_wav(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let num_channels = audio.num_channels();
    let num_frames = audio.num_frames();
    info!(
        frames = num_frames,
        channels = num_channels,
        sample_rate = in_spec.sample_rate,
        "loaded input"
    );

    let mut processor = Processor::new();
    let params = processor.params();

    if let Some(preset_path) = &args.preset {
        let text = std::fs::read_to_string(preset_path)
            .with_context(|| format!("failed to read {}", preset_path.display()))?;
        let preset: Preset = toml::from_str(&text)
            .with_context(|| format!("invalid preset {}", preset_path.display()))?;
        info!(preset = %preset.name, "applying preset");
        preset.apply(&params);
    } else {
        params.set_input_gain_db(args.input_gain);
        params.set_output_gain_db(args.output_gain);
        params.set_mix_percent(args.mix);
        params.set_distortion_gain_db(args.drive);
        params.set_compensation_gain_db(args.compensation);
        params.set_highpass_hz(args.highpass);
        params.set_lowpass_hz(args.lowpass);
        params.set_distortion_mix_percent(args.distortion_mix);
        params.set_waveshaper_index(args.waveshaper);
        params.set_oversampler_index(args.oversampler);
        params.set_distortion_enabled(!args.bypass_distortion);
    }

    processor.prepare(&ProcessSpec {
        sample_rate: in_spec.sample_rate as f32,
        max_block_size: args.block_size,
        num_channels,
    });

    // Offline latency compensation: pad the tail by the reported latency,
    // process everything, then drop the leading latency frames so the
    // output lines up with the input.
    let latency = processor.latency_samples();
    info!(latency, "chain latency");

    let padded_frames = num_frames + latency;
    let mut padded = PlanarAudio::silent(num_channels, padded_frames);
    for ch in 0..num_channels {
        padded.channel_mut(ch)[..num_frames].copy_from_slice(audio.channel(ch));
    }

    let progress = ProgressBar::new(padded_frames as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut start = 0;
    while start < padded_frames {
        let len = args.block_size.min(padded_frames - start);
        let mut block = padded.block_mut(start, len);
        processor.process(&mut block);
        start += len;
        progress.set_position(start as u64);
    }
    progress.finish_and_clear();

    let mut trimmed = PlanarAudio::silent(num_channels, num_frames);
    for ch in 0..num_channels {
        trimmed
            .channel_mut(ch)
            .copy_from_slice(&padded.channel(ch)[latency..latency + num_frames]);
    }

    let out_spec = WavSpec {
        channels: num_channels as u16,
        sample_rate: in_spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav(&args.output, &trimmed, out_spec)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_input(path: &std::path::Path, frames: usize) {
        let mut audio = PlanarAudio::silent(1, frames);
        for (i, s) in audio.channel_mut(0).iter_mut().enumerate() {
            *s = (i as f32 * 0.05).sin() * 0.5;
        }
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        };
        write_wav(path, &audio, spec).unwrap();
    }

    #[test]
    fn bypassed_processing_round_trips_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_test_input(&input, 1000);

        let args = ProcessArgs {
            input: input.clone(),
            output: output.clone(),
            preset: None,
            input_gain: 0.0,
            output_gain: 0.0,
            mix: 100.0,
            drive: 0.0,
            compensation: 0.0,
            highpass: 20.0,
            lowpass: 22000.0,
            distortion_mix: 100.0,
            waveshaper: 0,
            oversampler: 0,
            bypass_distortion: true,
            block_size: 128,
            bit_depth: 32,
        };
        run(args).unwrap();

        let (original, _) = read_wav(&input).unwrap();
        let (processed, _) = read_wav(&output).unwrap();
        assert_eq!(processed.num_frames(), original.num_frames());
        for (a, b) in original.channel(0).iter().zip(processed.channel(0).iter()) {
            assert_eq!(a, b, "bypassed run must be transparent");
        }
    }

    #[test]
    fn distorted_output_is_aligned_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_test_input(&input, 2000);

        let args = ProcessArgs {
            input: input.clone(),
            output: output.clone(),
            preset: None,
            input_gain: 0.0,
            output_gain: 0.0,
            mix: 0.0, // fully dry: latency trim must realign exactly
            drive: 30.0,
            compensation: 0.0,
            highpass: 20.0,
            lowpass: 22000.0,
            distortion_mix: 100.0,
            waveshaper: 0,
            oversampler: 3,
            bypass_distortion: false,
            block_size: 256,
            bit_depth: 32,
        };
        run(args).unwrap();

        let (original, _) = read_wav(&input).unwrap();
        let (processed, _) = read_wav(&output).unwrap();
        assert_eq!(processed.num_frames(), original.num_frames());
        // Fully dry output is the input delayed by the chain latency; the
        // trim removes exactly that delay.
        for (a, b) in original.channel(0).iter().zip(processed.channel(0).iter()) {
            assert_eq!(a, b, "latency trim failed to realign the dry signal");
        }
    }
}
