//! Oversampler variant report.

use clap::Args;
use satura_core::{OversamplerBank, PhaseMode};

#[derive(Args)]
pub struct InfoArgs {}

pub fn run(_args: InfoArgs) -> anyhow::Result<()> {
    let bank = OversamplerBank::new();

    println!("Oversampler variants:");
    println!("  idx  factor  phase          latency");
    for index in 0..satura_core::NUM_VARIANTS {
        let variant = bank.variant(index);
        let phase = match variant.phase_mode() {
            PhaseMode::MinimumPhase => "minimum-phase",
            PhaseMode::LinearPhase => "linear-phase",
        };
        println!(
            "  {index}    {}x      {phase:<13}  {} samples",
            variant.factor(),
            variant.latency_samples()
        );
    }
    println!();
    println!("Hosts must re-read the reported latency whenever the variant");
    println!("selector changes; switches take effect at block boundaries.");
    Ok(())
}
