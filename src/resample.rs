//! Recursive octave downsampling for the multirate filter bank.
//!
//! Each level halves the effective sample rate: the previous level's valid
//! prefix is zero-phase low-pass filtered, then every second sample is kept.
//! Level buffers are all allocated at the padded level-0 length so the
//! spectrogram engine can index them uniformly; only the prefix of length
//! `padded_len / 2^k` is meaningful at level `k`.

use crate::filters;

// Anti-aliasing low-pass applied before each 2:1 decimation
// (half-band design, unity DC gain).
const DECIMATION_B: [f32; 7] = [
    0.02321932, 0.13931594, 0.34828986, 0.46438647, 0.34828986, 0.13931594, 0.02321932,
];
const DECIMATION_A: [f32; 7] = [
    1.0,
    3.02225963e-2,
    4.46204537e-1,
    -2.76669843e-2,
    3.94304556e-2,
    -2.55561209e-3,
    4.01725661e-4,
];

/// Zero-phase anti-aliasing pass with the fixed decimation low-pass.
fn anti_alias(signal: &[f32]) -> Vec<f32> {
    filters::zero_phase(&DECIMATION_B, &DECIMATION_A, signal)
}

/// Build the bank of per-octave resampled signals.
///
/// The input is zero-padded to `len + n_fft + padding`, where `padding` is
/// the smallest non-negative amount making the total divisible by
/// `2^(n_octave - 1)`, so every downsampled level has an integral valid
/// length. Level 0 is the padded input; level `k` is level `k - 1`
/// zero-phase filtered and decimated by two.
///
/// # Arguments
/// * `signal` - Input signal
/// * `n_octave` - Number of octave levels to produce
/// * `n_fft` - Global FFT length; reserves frame headroom in the padding
///
/// # Returns
/// `n_octave` buffers, each of the padded level-0 length.
pub fn octave_bank(signal: &[f32], n_octave: usize, n_fft: usize) -> crate::Result<Vec<Vec<f32>>> {
    if n_octave == 0 {
        return Err(crate::Error::InvalidSize {
            name: "n_octave",
            value: 0,
            reason: "must be greater than zero",
        });
    }

    let align = 1usize << (n_octave - 1);
    let unpadded = signal.len() + n_fft;
    let padding = (align - unpadded % align) % align;
    let padded_len = unpadded + padding;

    let mut bank = Vec::with_capacity(n_octave);

    let mut level0 = vec![0.0f32; padded_len];
    level0[..signal.len()].copy_from_slice(signal);
    bank.push(level0);

    for k in 1..n_octave {
        let prev_len = padded_len >> (k - 1);
        let filtered = anti_alias(&bank[k - 1][..prev_len]);

        let mut level = vec![0.0f32; padded_len];
        for (i, slot) in level.iter_mut().take(prev_len / 2).enumerate() {
            *slot = filtered[i * 2];
        }
        bank.push(level);
    }

    Ok(bank)
}
