//! Constant-Q Transform spectrograms via a multirate filter bank.
//!
//! The transform builds one spectral kernel for the highest octave's bins,
//! then reuses it at every octave: the input is recursively zero-phase
//! low-pass filtered and decimated by two, so the same relative bin spacing
//! recurs one octave lower at each level. Per octave, overlapping frames are
//! FFT'd and correlated against the kernel by complex matrix multiplication;
//! the per-octave magnitude blocks are stacked into a single
//! `[n_bins, n_frame]` spectrogram ordered from lowest to highest frequency.

use crate::convert::cqt_frequencies;
use crate::fft::FftPlan;
use crate::kernel::{spectral_kernel, SpectralKernel};
use crate::resample;
use ndarray::{s, Array2, Zip};
use num_complex::Complex32;
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration for the Constant-Q Transform.
///
/// Builder-style alternative to the positional arguments of [`cqt`].
/// Defaults mirror a piano-range analysis: 27.5 Hz (A0) lowest bin,
/// 324 bins at 36 bins per octave (nine octaves, third-tone resolution).
///
/// # Example
/// ```
/// use quaver::cqt::CqtConfig;
///
/// let config = CqtConfig::new(44100, 512)
///     .with_fmin(55.0)
///     .with_n_bins(72)
///     .with_bins_per_octave(12);
/// assert_eq!(config.n_bins, 72);
/// ```
#[derive(Debug, Clone)]
pub struct CqtConfig {
    /// Sample rate
    pub sr: u32,
    /// Number of samples between successive frames
    pub hop_length: usize,
    /// Frequency of the lowest bin (Hz)
    pub fmin: f32,
    /// Total number of frequency bins
    pub n_bins: usize,
    /// Number of bins per octave
    pub bins_per_octave: usize,
    /// Bandwidth-quality scaling factor
    pub q_factor: f32,
}

impl CqtConfig {
    /// Create a configuration with piano-range defaults.
    ///
    /// # Arguments
    /// * `sr` - Sample rate
    /// * `hop_length` - Number of samples between successive frames; must be
    ///   divisible by `2^(n_octave - 1)` for the configured bin layout
    pub fn new(sr: u32, hop_length: usize) -> Self {
        Self {
            sr,
            hop_length,
            fmin: 27.5, // A0
            n_bins: 324,
            bins_per_octave: 36,
            q_factor: 0.5,
        }
    }

    /// Set the frequency of the lowest bin.
    pub fn with_fmin(mut self, fmin: f32) -> Self {
        self.fmin = fmin;
        self
    }

    /// Set the total number of frequency bins.
    pub fn with_n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = n_bins;
        self
    }

    /// Set the number of bins per octave.
    pub fn with_bins_per_octave(mut self, bins_per_octave: usize) -> Self {
        self.bins_per_octave = bins_per_octave;
        self
    }

    /// Set the bandwidth-quality scaling factor.
    pub fn with_q_factor(mut self, q_factor: f32) -> Self {
        self.q_factor = q_factor;
        self
    }

    /// Compute the CQT magnitude spectrogram with this configuration.
    ///
    /// # Arguments
    /// * `y` - Audio signal (mono)
    pub fn compute(&self, y: &[f32]) -> crate::Result<Array2<f32>> {
        cqt(
            y,
            self.sr,
            self.hop_length,
            self.fmin,
            self.n_bins,
            self.bins_per_octave,
            self.q_factor,
        )
    }

    /// Compute the CQT, checking a cancellation flag between octaves.
    ///
    /// # Arguments
    /// * `y` - Audio signal (mono)
    /// * `cancel` - Set from another thread to abort; the transform returns
    ///   [`crate::Error::Cancelled`] instead of partial results
    pub fn compute_cancellable(
        &self,
        y: &[f32],
        cancel: &AtomicBool,
    ) -> crate::Result<Array2<f32>> {
        cqt_cancellable(
            y,
            self.sr,
            self.hop_length,
            self.fmin,
            self.n_bins,
            self.bins_per_octave,
            self.q_factor,
            cancel,
        )
    }
}

impl Default for CqtConfig {
    fn default() -> Self {
        Self::new(44100, 256)
    }
}

/// Compute the Constant-Q Transform magnitude spectrogram of a signal.
///
/// Bins are geometrically spaced from `fmin` upward with `bins_per_octave`
/// bins per frequency doubling, matching musical pitch perception. The
/// result has `n_bins` rows ordered low to high frequency and
/// `len(y) / hop_length` columns.
///
/// # Arguments
/// * `y` - Audio signal (mono)
/// * `sr` - Sample rate
/// * `hop_length` - Number of samples between successive frames; must be
///   divisible by `2^(n_octave - 1)`
/// * `fmin` - Frequency of the lowest bin (Hz)
/// * `n_bins` - Total number of bins; must be a multiple of
///   `bins_per_octave`
/// * `bins_per_octave` - Number of bins per octave
/// * `q_factor` - Bandwidth-quality scaling; the effective Q is
///   `q_factor / (2^(1/bins_per_octave) - 1)`
///
/// # Errors
/// Fails before any heavy computation on an empty or non-finite signal,
/// inconsistent bin layout, non-positive `fmin`/`q_factor`, a hop length
/// incompatible with the octave count, a highest bin at or above Nyquist,
/// or a kernel that cannot fit the per-octave FFT window.
///
/// # Example
/// ```
/// use quaver::{cqt, io};
///
/// let signal = io::tone(110.0, 22050, 1.0);
/// let spec = cqt::cqt(&signal, 22050, 512, 55.0, 24, 12, 1.0).unwrap();
/// assert_eq!(spec.dim(), (24, 43)); // 22050 / 512 frames
/// assert!(spec.iter().all(|&v| v >= 0.0));
/// ```
#[allow(clippy::too_many_arguments)]
pub fn cqt(
    y: &[f32],
    sr: u32,
    hop_length: usize,
    fmin: f32,
    n_bins: usize,
    bins_per_octave: usize,
    q_factor: f32,
) -> crate::Result<Array2<f32>> {
    let never = AtomicBool::new(false);
    cqt_cancellable(
        y,
        sr,
        hop_length,
        fmin,
        n_bins,
        bins_per_octave,
        q_factor,
        &never,
    )
}

/// Compute the Constant-Q Transform, checking a cancellation flag between
/// octave iterations.
///
/// Identical to [`cqt`] except that setting `cancel` from another thread
/// aborts the transform with [`crate::Error::Cancelled`]. A full transform
/// over a long recording is the dominant latency cost, so the flag is
/// polled once per octave.
#[allow(clippy::too_many_arguments)]
pub fn cqt_cancellable(
    y: &[f32],
    sr: u32,
    hop_length: usize,
    fmin: f32,
    n_bins: usize,
    bins_per_octave: usize,
    q_factor: f32,
    cancel: &AtomicBool,
) -> crate::Result<Array2<f32>> {
    crate::utils::valid_audio(y)?;

    if n_bins == 0 {
        return Err(crate::Error::InvalidSize {
            name: "n_bins",
            value: 0,
            reason: "must be greater than zero",
        });
    }
    if bins_per_octave == 0 {
        return Err(crate::Error::InvalidSize {
            name: "bins_per_octave",
            value: 0,
            reason: "must be greater than zero",
        });
    }
    if n_bins % bins_per_octave != 0 {
        return Err(crate::Error::InvalidSize {
            name: "n_bins",
            value: n_bins,
            reason: "must be divisible by bins_per_octave",
        });
    }
    if hop_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop_length",
            value: 0,
            reason: "must be greater than zero",
        });
    }
    if sr == 0 {
        return Err(crate::Error::InvalidParameter {
            name: "sr",
            value: sr.to_string(),
            reason: "sample rate must be positive".to_string(),
        });
    }
    if !fmin.is_finite() || fmin <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "fmin",
            value: fmin.to_string(),
            reason: "must be strictly positive".to_string(),
        });
    }
    if !q_factor.is_finite() || q_factor <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "q_factor",
            value: q_factor.to_string(),
            reason: "must be strictly positive".to_string(),
        });
    }

    let n_octave = n_bins / bins_per_octave;
    if n_octave > 30 {
        return Err(crate::Error::InvalidParameter {
            name: "n_bins",
            value: n_bins.to_string(),
            reason: format!("{n_octave} octaves exceed the supported range"),
        });
    }
    let align = 1usize << (n_octave - 1);
    if hop_length % align != 0 {
        return Err(crate::Error::InvalidParameter {
            name: "hop_length",
            value: hop_length.to_string(),
            reason: format!(
                "must be divisible by 2^{} so every octave's hop stays integral",
                n_octave - 1
            ),
        });
    }

    let freqs = cqt_frequencies(n_bins, fmin, bins_per_octave);
    let nyquist = sr as f32 / 2.0;
    let fmax = freqs[n_bins - 1];
    if fmax >= nyquist {
        return Err(crate::Error::InvalidFrequencyRange {
            fmin,
            fmax,
            reason: format!("highest bin must stay below the Nyquist frequency {nyquist}"),
        });
    }

    // Effective Q and global FFT sizing from the lowest bin's kernel length.
    let q = q_factor / (2.0_f32.powf(1.0 / bins_per_octave as f32) - 1.0);
    let max_kernel = sr as f32 * q / freqs[0];
    if !max_kernel.is_finite() || max_kernel > 1e12 {
        return Err(crate::Error::InvalidParameter {
            name: "q_factor",
            value: q_factor.to_string(),
            reason: "kernel length for the lowest bin is out of range".to_string(),
        });
    }
    let n_fft = (max_kernel.ceil() as usize + 1).next_power_of_two();
    let n_fft_octave = n_fft >> (n_octave - 1);

    let kernel = spectral_kernel(sr as f32, q, n_fft, n_fft_octave, &freqs, bins_per_octave)?;

    let n_frame = y.len() / hop_length;
    if n_frame == 0 {
        return Ok(Array2::zeros((n_bins, 0)));
    }

    // Downsampling is inherently sequential; each level feeds the next.
    let bank = resample::octave_bank(y, n_octave, n_fft)?;

    let blocks: Vec<crate::Result<Array2<f32>>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..n_octave)
                .into_par_iter()
                .map(|k| {
                    if cancel.load(Ordering::Relaxed) {
                        return Err(crate::Error::Cancelled);
                    }
                    Ok(octave_spectrogram(
                        &bank[k], k, &kernel, n_fft, hop_length, n_frame,
                    ))
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n_octave)
                .map(|k| {
                    if cancel.load(Ordering::Relaxed) {
                        return Err(crate::Error::Cancelled);
                    }
                    Ok(octave_spectrogram(
                        &bank[k], k, &kernel, n_fft, hop_length, n_frame,
                    ))
                })
                .collect()
        }
    };

    // Level 0 is the least decimated and matches the highest octave, so
    // octave k lands at row offset (n_octave - 1 - k) * bins_per_octave.
    let mut out = Array2::<f32>::zeros((n_bins, n_frame));
    for (k, block) in blocks.into_iter().enumerate() {
        let block = block?;
        let row0 = (n_octave - 1 - k) * bins_per_octave;
        out.slice_mut(s![row0..row0 + bins_per_octave, ..])
            .assign(&block);
    }

    Ok(out)
}

/// Magnitude block for one octave: frame, FFT, correlate against the kernel.
fn octave_spectrogram(
    level: &[f32],
    k: usize,
    kernel: &SpectralKernel,
    n_fft: usize,
    hop_length: usize,
    n_frame: usize,
) -> Array2<f32> {
    let n_fft_octave = kernel.n_fft_octave();
    let center_init = n_fft >> (k + 1);
    let hop_ds = hop_length >> k;

    let fft = FftPlan::new(n_fft_octave);
    let mut spec_re = Array2::<f32>::zeros((n_fft_octave, n_frame));
    let mut spec_im = Array2::<f32>::zeros((n_fft_octave, n_frame));
    let mut frame = vec![Complex32::new(0.0, 0.0); n_fft_octave];

    for n in 0..n_frame {
        let center = center_init + n * hop_ds;
        let start = center - n_fft_octave / 2;
        for (i, v) in frame.iter_mut().enumerate() {
            *v = Complex32::new(level[start + i], 0.0);
        }
        fft.forward(&mut frame);
        for (i, &v) in frame.iter().enumerate() {
            spec_re[(i, n)] = v.re;
            spec_im[(i, n)] = v.im;
        }
    }

    // (Kr + iKi)(Fr + iFi) decomposed into four real matrix products.
    let block_re = kernel.real.dot(&spec_re) - kernel.imag.dot(&spec_im);
    let block_im = kernel.real.dot(&spec_im) + kernel.imag.dot(&spec_re);

    Zip::from(&block_re)
        .and(&block_im)
        .map_collect(|&re, &im| (re * re + im * im).sqrt())
}
