/// Compute the center frequencies of constant-Q bins.
///
/// Frequencies are geometrically spaced: `freq[i] = fmin * 2^(i / bins_per_octave)`,
/// so bins exactly one octave apart differ by a factor of two.
///
/// # Arguments
/// * `n_bins` - Number of frequency bins
/// * `fmin` - Frequency of the lowest bin (Hz)
/// * `bins_per_octave` - Number of bins per octave
///
/// # Example
/// ```
/// use quaver::convert::cqt_frequencies;
///
/// let freqs = cqt_frequencies(24, 55.0, 12);
/// assert_eq!(freqs.len(), 24);
/// assert!((freqs[0] - 55.0).abs() < 1e-4);
/// assert!((freqs[12] - 110.0).abs() < 1e-3); // one octave up
/// ```
pub fn cqt_frequencies(n_bins: usize, fmin: f32, bins_per_octave: usize) -> Vec<f32> {
    (0..n_bins)
        .map(|i| fmin * 2.0_f32.powf(i as f32 / bins_per_octave as f32))
        .collect()
}
