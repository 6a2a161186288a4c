//! Compute a CQT spectrogram from an audio file and save it as a PPM image.
//!
//! Usage: cargo run --example render_cqt --features display -- input.mp3 [out.ppm]

use log::info;
use quaver::{cqt, display, io};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .ok_or("usage: render_cqt <audio-file> [out.ppm]")?;
    let output = args.next().unwrap_or_else(|| "spectrogram.ppm".to_string());

    let (signal, sr) = io::load_audio(&input)?;
    info!("loaded {}: {} samples at {} Hz", input, signal.len(), sr);

    let config = cqt::CqtConfig::new(sr, 256);
    let spec = config.compute(&signal)?;
    info!(
        "computed {} bins x {} frames",
        spec.shape()[0],
        spec.shape()[1]
    );

    let normalized = display::normalize(&spec);
    display::save_spectrogram(&normalized, &output, display::ColorMap::Viridis)?;
    info!("wrote {}", output);

    Ok(())
}
