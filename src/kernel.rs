//! Spectral kernel construction.
//!
//! The kernel holds frequency-domain correlation templates for one octave's
//! worth of bins: the highest-indexed bins, whose filters have the shortest
//! support. The same kernel serves every octave: each downsampling step
//! halves the effective sample rate, so the identical relative bin spacing
//! recurs one octave lower.

use crate::fft::FftPlan;
use crate::window;
use ndarray::Array2;
use num_complex::Complex32;

/// Frequency-domain templates for the top octave's bins.
///
/// Real and imaginary parts are stored as separate
/// `[bins_per_octave, n_fft_octave]` matrices so the spectrogram engine can
/// express the complex matrix product as four real products. Built once per
/// transform and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SpectralKernel {
    pub(crate) real: Array2<f32>,
    pub(crate) imag: Array2<f32>,
}

impl SpectralKernel {
    /// Number of bins covered by the kernel (rows).
    pub fn bins_per_octave(&self) -> usize {
        self.real.nrows()
    }

    /// FFT length of each template (columns).
    pub fn n_fft_octave(&self) -> usize {
        self.real.ncols()
    }
}

/// Build the spectral kernel for the `bins_per_octave` highest bins.
///
/// For each bin: the effective kernel length is `n_k = ceil(sr * q / freq)`
/// (the number of samples needed for the desired Q at full sample rate).
/// A Hanning-shaped complex exponential of that length, normalized by
/// `1 / n_k`, is centered in a zero buffer of `n_fft_octave` samples. Rows
/// are then FFT'd, conjugated, and divided by the global `n_fft`.
///
/// # Arguments
/// * `sr` - Sample rate of the original signal (Hz)
/// * `q` - Q value (center frequency over bandwidth)
/// * `n_fft` - Global FFT length, used as the normalization constant
/// * `n_fft_octave` - Per-octave FFT length; every template must fit it
/// * `freqs` - Full bin-frequency table; the top `bins_per_octave` entries
///   are used
/// * `bins_per_octave` - Number of kernel rows
///
/// # Errors
/// Fails with [`crate::Error::KernelOverflow`] if any template is longer
/// than `n_fft_octave` (silent truncation would corrupt the frequency
/// response without any signal to the caller), and with an invalid-parameter
/// error if a template degenerates below two samples.
pub fn spectral_kernel(
    sr: f32,
    q: f32,
    n_fft: usize,
    n_fft_octave: usize,
    freqs: &[f32],
    bins_per_octave: usize,
) -> crate::Result<SpectralKernel> {
    let n_bins = freqs.len();
    if bins_per_octave == 0 || bins_per_octave > n_bins {
        return Err(crate::Error::InvalidSize {
            name: "bins_per_octave",
            value: bins_per_octave,
            reason: "must be between 1 and the number of bins",
        });
    }

    // Validate every template length before any allocation.
    let top = &freqs[n_bins - bins_per_octave..];
    let mut lengths = Vec::with_capacity(bins_per_octave);
    for (row, &freq) in top.iter().enumerate() {
        let bin = n_bins - bins_per_octave + row;
        let n_k = (sr * q / freq).ceil() as usize;

        if n_k > n_fft_octave {
            return Err(crate::Error::KernelOverflow {
                bin,
                required: n_k,
                capacity: n_fft_octave,
            });
        }
        if n_k < 2 {
            return Err(crate::Error::InvalidParameter {
                name: "q_factor",
                value: q.to_string(),
                reason: format!("kernel for bin {bin} degenerates to {n_k} samples"),
            });
        }
        lengths.push(n_k);
    }

    let fft = FftPlan::new(n_fft_octave);
    let mut real = Array2::<f32>::zeros((bins_per_octave, n_fft_octave));
    let mut imag = Array2::<f32>::zeros((bins_per_octave, n_fft_octave));
    let mut row_buf = vec![Complex32::new(0.0, 0.0); n_fft_octave];

    let scale = 1.0 / n_fft as f32;

    for (row, (&freq, &n_k)) in top.iter().zip(lengths.iter()).enumerate() {
        let start = (n_fft_octave - n_k) / 2;
        let win = window::hanning(n_k);

        for v in row_buf.iter_mut() {
            *v = Complex32::new(0.0, 0.0);
        }
        for (i, &w) in win.iter().enumerate() {
            let phase = 2.0 * std::f32::consts::PI * (freq / sr) * i as f32;
            row_buf[start + i] = crate::utils::phasor(phase) * (w / n_k as f32);
        }

        fft.forward(&mut row_buf);

        // Conjugation and 1/n_fft normalization folded into the store.
        for (col, &v) in row_buf.iter().enumerate() {
            real[(row, col)] = v.re * scale;
            imag[(row, col)] = -v.im * scale;
        }
    }

    Ok(SpectralKernel { real, imag })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::cqt_frequencies;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_shape() {
        let freqs = cqt_frequencies(24, 55.0, 12);
        let kernel = spectral_kernel(22050.0, 8.0, 8192, 4096, &freqs, 12).unwrap();

        assert_eq!(kernel.bins_per_octave(), 12);
        assert_eq!(kernel.n_fft_octave(), 4096);
        assert_eq!(kernel.real.dim(), kernel.imag.dim());
    }

    #[test]
    fn test_kernel_overflow_rejected() {
        let freqs = cqt_frequencies(24, 55.0, 12);
        // ceil(22050 * 8 / 110) = 1604 samples cannot fit 1024.
        let result = spectral_kernel(22050.0, 8.0, 8192, 1024, &freqs, 12);
        assert!(matches!(
            result,
            Err(crate::Error::KernelOverflow { required: 1604, capacity: 1024, .. })
        ));
    }

    #[test]
    fn test_degenerate_kernel_rejected() {
        let freqs = cqt_frequencies(4, 100.0, 2);
        // sr * q / freq < 2 for every bin.
        let result = spectral_kernel(200.0, 0.5, 64, 32, &freqs, 2);
        assert!(matches!(result, Err(crate::Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_kernel_matches_naive_dft() {
        // Rebuild one row by hand: centered windowed exponential, naive DFT,
        // conjugate, divide by the global FFT size.
        let sr = 128.0f32;
        let q = 2.0f32;
        let n_fft = 64;
        let n_fft_octave = 32;
        let freqs = cqt_frequencies(4, 8.0, 2);
        let kernel = spectral_kernel(sr, q, n_fft, n_fft_octave, &freqs, 2).unwrap();

        let freq = freqs[2]; // first row of the top octave
        let n_k = (sr * q / freq).ceil() as usize;
        assert_eq!(n_k, 16);
        let start = (n_fft_octave - n_k) / 2;
        let win = crate::window::hanning(n_k);

        let mut template = vec![(0.0f32, 0.0f32); n_fft_octave];
        for i in 0..n_k {
            let phase = 2.0 * std::f32::consts::PI * (freq / sr) * i as f32;
            template[start + i] = (
                phase.cos() * win[i] / n_k as f32,
                phase.sin() * win[i] / n_k as f32,
            );
        }

        for m in 0..n_fft_octave {
            let mut re = 0.0f64;
            let mut im = 0.0f64;
            for (n, &(tr, ti)) in template.iter().enumerate() {
                let angle = -2.0 * std::f64::consts::PI * (m * n) as f64 / n_fft_octave as f64;
                let (s, c) = angle.sin_cos();
                re += tr as f64 * c - ti as f64 * s;
                im += tr as f64 * s + ti as f64 * c;
            }
            let scale = 1.0 / n_fft as f64;
            assert_relative_eq!(
                kernel.real[(0, m)] as f64,
                re * scale,
                epsilon = 1e-5
            );
            assert_relative_eq!(
                kernel.imag[(0, m)] as f64,
                -im * scale,
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn test_rows_have_energy() {
        let freqs = cqt_frequencies(36, 32.7, 12);
        let kernel = spectral_kernel(22050.0, 10.0, 16384, 4096, &freqs, 12).unwrap();

        for row in 0..12 {
            let energy: f32 = (0..kernel.n_fft_octave())
                .map(|c| kernel.real[(row, c)].powi(2) + kernel.imag[(row, c)].powi(2))
                .sum();
            assert!(energy > 0.0, "kernel row {} is empty", row);
        }
    }
}
