use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Cached forward FFT plan.
///
/// The underlying planner uses the Cooley-Tukey algorithm via the rustfft
/// library. One plan is built per FFT length and reused for every row or
/// frame of that length.
///
/// # Example
/// ```
/// use quaver::fft::FftPlan;
/// use num_complex::Complex32;
///
/// let plan = FftPlan::new(256);
/// let mut buffer = vec![Complex32::new(1.0, 0.0); 256];
/// plan.forward(&mut buffer);
/// assert!((buffer[0].re - 256.0).abs() < 1e-3);
/// ```
pub struct FftPlan {
    forward: Arc<dyn Fft<f32>>,
}

impl FftPlan {
    /// Create a new FFT plan for a given size.
    ///
    /// # Arguments
    /// * `len` - Size of the FFT (powers of two perform best)
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        Self { forward }
    }

    /// Perform forward FFT in-place.
    ///
    /// # Arguments
    /// * `buffer` - Complex input buffer, overwritten with the FFT output
    pub fn forward(&self, buffer: &mut [Complex32]) {
        self.forward.process(buffer);
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
    }
};
