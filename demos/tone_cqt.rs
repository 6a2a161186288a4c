//! Run the transform on a synthesized tone and report where the energy lands.
//!
//! Usage: cargo run --example tone_cqt -- [frequency]

use log::info;
use quaver::{convert, cqt, io};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let frequency: f32 = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(440.0);

    let sr = 44100;
    let signal = io::tone(frequency, sr, 1.0);
    info!("synthesized {} Hz tone, {} samples", frequency, signal.len());

    let config = cqt::CqtConfig::new(sr, 512)
        .with_fmin(27.5)
        .with_n_bins(84)
        .with_bins_per_octave(12);
    let spec = config.compute(&signal)?;

    let freqs = convert::cqt_frequencies(config.n_bins, config.fmin, config.bins_per_octave);
    let n_frame = spec.shape()[1];

    let mut peak_row = 0;
    let mut peak_energy = 0.0f32;
    for row in 0..config.n_bins {
        let energy: f32 = (0..n_frame).map(|n| spec[(row, n)].powi(2)).sum();
        if energy > peak_energy {
            peak_energy = energy;
            peak_row = row;
        }
    }

    info!(
        "peak at bin {} ({:.1} Hz) for a {:.1} Hz tone",
        peak_row, freqs[peak_row], frequency
    );
    println!("{} {:.2}", peak_row, freqs[peak_row]);

    Ok(())
}
