//! Spectrogram rendering.
//!
//! Turns the transform's magnitude matrix into an image: normalize,
//! colorize, write PPM. Enable with the `display` feature:
//!
//! ```toml
//! [dependencies]
//! quaver = { version = "0.1", features = ["display"] }
//! ```

use ndarray::Array2;
use std::str::FromStr;

/// Color map types for spectrograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    /// Viridis colormap (perceptually uniform, colorblind-friendly)
    Viridis,
    /// Magma colormap (perceptually uniform, dark background)
    Magma,
    /// Grayscale colormap
    Grayscale,
}

impl ColorMap {
    /// Convert a normalized value (0.0 to 1.0) to RGB color.
    pub fn to_rgb(&self, value: f32) -> (u8, u8, u8) {
        let v = value.clamp(0.0, 1.0);
        match self {
            ColorMap::Viridis => viridis(v),
            ColorMap::Magma => magma(v),
            ColorMap::Grayscale => {
                let g = (v * 255.0) as u8;
                (g, g, g)
            }
        }
    }
}

impl FromStr for ColorMap {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "viridis" => Ok(ColorMap::Viridis),
            "magma" => Ok(ColorMap::Magma),
            "grayscale" | "gray" | "grey" => Ok(ColorMap::Grayscale),
            _ => Err(()),
        }
    }
}

/// Simplified viridis approximation.
fn viridis(t: f32) -> (u8, u8, u8) {
    let r = (0.267004 + t * (0.003991 + t * (1.096452 + t * (-2.146305 + t * 1.167419))))
        .clamp(0.0, 1.0);
    let g = (0.004874 + t * (1.015861 + t * (-0.107203 + t * (-0.449175 + t * 0.539506))))
        .clamp(0.0, 1.0);
    let b = (0.329415 + t * (1.421511 + t * (-2.482568 + t * (1.871714 + t * (-0.140092)))))
        .clamp(0.0, 1.0);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Magma colormap implementation.
fn magma(t: f32) -> (u8, u8, u8) {
    let r = (0.001462 + t * (0.169823 + t * (2.240361 + t * (-1.106994)))).clamp(0.0, 1.0);
    let g = (0.000466 + t * (0.100897 + t * (0.699060 + t * (0.203185)))).clamp(0.0, 1.0);
    let b = (0.013866 + t * (0.563622 + t * (-0.543021 + t * (0.966020)))).clamp(0.0, 1.0);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Normalize a magnitude matrix by its maximum value.
///
/// An all-zero (or all-silence) matrix is valid transform output; it is
/// returned unchanged instead of dividing by zero.
///
/// # Arguments
/// * `data` - Magnitude matrix (frequency x time)
pub fn normalize(data: &Array2<f32>) -> Array2<f32> {
    let max = data.iter().cloned().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return data.clone();
    }
    data.mapv(|v| v / max)
}

/// Convert a magnitude matrix to RGB image data.
///
/// Values are scaled to the matrix's own minimum/maximum range. The
/// frequency axis is flipped so row 0 (lowest bin) lands at the bottom of
/// the image.
///
/// # Arguments
/// * `data` - Magnitude matrix (frequency x time)
/// * `cmap` - Colormap to use
///
/// # Returns
/// `(width, height, pixels)` with pixels in row-major RGB order
pub fn spectrogram_to_rgb(data: &Array2<f32>, cmap: ColorMap) -> (usize, usize, Vec<u8>) {
    let (n_freq, n_time) = data.dim();
    if n_freq == 0 || n_time == 0 {
        return (0, 0, Vec::new());
    }

    let data_min = data.iter().cloned().fold(f32::INFINITY, f32::min);
    let data_max = data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let range = (data_max - data_min).max(1e-10);

    let mut pixels = Vec::with_capacity(n_freq * n_time * 3);
    for f in (0..n_freq).rev() {
        for t in 0..n_time {
            let normalized = ((data[(f, t)] - data_min) / range).clamp(0.0, 1.0);
            let (r, g, b) = cmap.to_rgb(normalized);
            pixels.push(r);
            pixels.push(g);
            pixels.push(b);
        }
    }

    (n_time, n_freq, pixels)
}

/// Save RGB pixel data as a PPM image file.
///
/// PPM is a simple uncompressed format that most image viewers can open.
///
/// # Arguments
/// * `path` - Output file path (should end in .ppm)
/// * `width` - Image width
/// * `height` - Image height
/// * `pixels` - RGB pixel data (width * height * 3 bytes)
pub fn save_ppm(path: &str, width: usize, height: usize, pixels: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "P6")?;
    writeln!(file, "{} {}", width, height)?;
    writeln!(file, "255")?;
    file.write_all(pixels)?;
    Ok(())
}

/// Save a spectrogram as a PPM image.
///
/// # Arguments
/// * `data` - Magnitude matrix (frequency x time)
/// * `path` - Output file path
/// * `cmap` - Colormap to use
pub fn save_spectrogram(data: &Array2<f32>, path: &str, cmap: ColorMap) -> std::io::Result<()> {
    let (width, height, pixels) = spectrogram_to_rgb(data, cmap);
    save_ppm(path, width, height, &pixels)
}
