//! Scalar reference FFT.
//!
//! A straightforward iterative radix-2 Cooley–Tukey transform over a slice of
//! complex samples. It performs the same per-stage arithmetic as the row and
//! column butterfly kernels, so it doubles as the correctness oracle for the
//! tiled pipeline.

use alloc::vec::Vec;

use crate::error::FftError;
use crate::num::{Complex, Float};
use crate::pow2::{is_power_of_two, round_up_power_of_two};
use crate::tables::{self, TableCache};

/// Bit-reversal permutation for `size` samples.
pub fn gen_bit_reversal(size: usize) -> Result<Vec<u32>, FftError> {
    tables::bit_reversal(size)
}

/// `half_n` twiddle factors `exp(-i * pi * k / half_n)`.
pub fn gen_twiddle_factors<T: Float>(half_n: usize) -> Vec<Complex<T>> {
    tables::twiddle_factors(half_n)
}

/// Apply every butterfly stage to already bit-reversed `data`.
///
/// Block size doubles from 2 up to `N`. Each block reads from a snapshot taken
/// before it is written, so no output depends on a partially updated value.
///
/// Returns [`FftError::NotPowerOfTwo`] when `N` is not a power of two and
/// [`FftError::InvalidTwiddleTable`] when `twiddle` holds fewer than `N / 2`
/// entries.
pub fn apply_butterfly<T: Float>(
    data: &[Complex<T>],
    twiddle: &[Complex<T>],
) -> Result<Vec<Complex<T>>, FftError> {
    let n = data.len();
    if n > 1 && !is_power_of_two(n) {
        return Err(FftError::NotPowerOfTwo);
    }
    if twiddle.len() * 2 < n {
        return Err(FftError::InvalidTwiddleTable);
    }
    let mut out = data.to_vec();
    let mut block = Vec::with_capacity(n);
    let mut num_elements = 2;
    while num_elements <= n {
        let half = num_elements / 2;
        let twiddle_step = n / num_elements;
        for offset in (0..n).step_by(num_elements) {
            block.clear();
            block.extend_from_slice(&out[offset..offset + num_elements]);
            for i in 0..half {
                let t = block[i + half] * twiddle[i * twiddle_step];
                out[offset + i] = block[i] + t;
                out[offset + i + half] = block[i] - t;
            }
        }
        num_elements *= 2;
    }
    Ok(out)
}

/// Forward, unnormalized DFT of `data` using caller supplied tables.
///
/// With `N = round_up_power_of_two(data.len())` the preconditions are checked
/// in order:
/// * `twiddle.len() * 2 == N`, else [`FftError::InvalidTwiddleTable`]
/// * `bit_rev.len() == N` with every entry below `N`, else [`FftError::InvalidBitReversalTable`]
/// * `data.len() >= N`, else [`FftError::NotPowerOfTwo`]
///
/// ```
/// use tilefft::scalar::{gen_bit_reversal, gen_twiddle_factors, solve};
/// use tilefft::Complex32;
///
/// let data = [1.0, 0.0, 0.0, 0.0].map(Complex32::from_real);
/// let bit_rev = gen_bit_reversal(4).unwrap();
/// let twiddle = gen_twiddle_factors::<f32>(2);
/// let out = solve(&data, &bit_rev, &twiddle).unwrap();
/// assert!(out.iter().all(|c| (c.re - 1.0).abs() < 1e-6 && c.im.abs() < 1e-6));
/// ```
pub fn solve<T: Float>(
    data: &[Complex<T>],
    bit_rev: &[u32],
    twiddle: &[Complex<T>],
) -> Result<Vec<Complex<T>>, FftError> {
    let len = u32::try_from(data.len()).map_err(|_| FftError::NotPowerOfTwo)?;
    let n = round_up_power_of_two(len) as usize;
    if twiddle.len() * 2 != n {
        return Err(FftError::InvalidTwiddleTable);
    }
    if bit_rev.len() != n || bit_rev.iter().any(|&j| j as usize >= n) {
        return Err(FftError::InvalidBitReversalTable);
    }
    if data.len() < n {
        return Err(FftError::NotPowerOfTwo);
    }
    let permuted: Vec<Complex<T>> = bit_rev.iter().map(|&j| data[j as usize]).collect();
    apply_butterfly(&permuted, twiddle)
}

/// Reference transform that keeps its tables in a [`TableCache`].
pub struct ScalarFft<T: Float> {
    tables: TableCache<T>,
}

impl<T: Float> Default for ScalarFft<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> ScalarFft<T> {
    pub fn new() -> Self {
        Self {
            tables: TableCache::new(),
        }
    }

    /// Forward, unnormalized DFT.
    pub fn forward(&mut self, data: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let n = data.len();
        let bit_rev = self.tables.bit_reversal(n)?;
        let twiddle = self.tables.twiddles(n)?;
        solve(data, &bit_rev, &twiddle)
    }

    /// Inverse DFT through the forward transform of the conjugate:
    /// `ifft(x) = conj(fft(conj(x))) / N`.
    pub fn inverse(&mut self, data: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let n = T::from_usize(data.len()).ok_or(FftError::NotPowerOfTwo)?;
        let conjugated: Vec<Complex<T>> = data.iter().map(|c| c.conj()).collect();
        let mut out = self.forward(&conjugated)?;
        let scale = T::one() / n;
        for c in out.iter_mut() {
            *c = c.conj().scale(scale);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::{Complex32, Complex64};
    use alloc::vec;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive_dft(input: &[Complex64]) -> Vec<Complex64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input.iter().enumerate().fold(Complex64::zero(), |acc, (j, x)| {
                    let angle = -2.0 * core::f64::consts::PI * (j * k) as f64 / n as f64;
                    acc + *x * Complex64::expi(angle)
                })
            })
            .collect()
    }

    #[test]
    fn impulse_gives_flat_spectrum() {
        let data = vec![
            Complex32::new(1.0, 0.0),
            Complex32::zero(),
            Complex32::zero(),
            Complex32::zero(),
        ];
        let out = solve(&data, &gen_bit_reversal(4).unwrap(), &gen_twiddle_factors(2)).unwrap();
        for c in &out {
            assert!((c.re - 1.0).abs() < 1e-6, "re = {}", c.re);
            assert!(c.im.abs() < 1e-6, "im = {}", c.im);
            assert!((c.norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn matches_naive_dft() {
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<Complex64> = (0..32)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        let expected = naive_dft(&data);
        let out = ScalarFft::<f64>::new().forward(&data).unwrap();
        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a.re - b.re).abs() < 1e-9, "{} vs {}", a, b);
            assert!((a.im - b.im).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    #[test]
    fn single_sample_has_no_valid_twiddle_table() {
        let data = vec![Complex32::new(3.0, -2.0)];
        let err = solve(&data, &[0], &[]).unwrap_err();
        // N = 1 needs twiddle.len() * 2 == 1, which no table satisfies.
        assert_eq!(err, FftError::InvalidTwiddleTable);
    }

    #[test]
    fn rejects_short_twiddle_table() {
        let data = vec![Complex32::zero(); 8];
        let bit_rev = gen_bit_reversal(8).unwrap();
        let twiddle = gen_twiddle_factors::<f32>(2);
        assert_eq!(solve(&data, &bit_rev, &twiddle), Err(FftError::InvalidTwiddleTable));
    }

    #[test]
    fn rejects_wrong_bit_reversal_table() {
        let data = vec![Complex32::zero(); 8];
        let bit_rev = gen_bit_reversal(4).unwrap();
        let twiddle = gen_twiddle_factors::<f32>(4);
        assert_eq!(
            solve(&data, &bit_rev, &twiddle),
            Err(FftError::InvalidBitReversalTable)
        );
    }

    #[test]
    fn rejects_non_power_of_two_data() {
        // N rounds up to 8, so the tables match but the data is too short.
        let data = vec![Complex32::zero(); 6];
        let bit_rev = gen_bit_reversal(8).unwrap();
        let twiddle = gen_twiddle_factors::<f32>(4);
        assert_eq!(solve(&data, &bit_rev, &twiddle), Err(FftError::NotPowerOfTwo));
    }

    #[test]
    fn butterfly_rejects_non_power_of_two_length() {
        let data = vec![Complex32::from_real(1.0); 6];
        let twiddle = gen_twiddle_factors::<f32>(3);
        assert_eq!(apply_butterfly(&data, &twiddle), Err(FftError::NotPowerOfTwo));
    }

    #[test]
    fn butterfly_rejects_short_twiddle_table() {
        let data = vec![Complex32::from_real(1.0); 8];
        let twiddle = gen_twiddle_factors::<f32>(2);
        assert_eq!(
            apply_butterfly(&data, &twiddle),
            Err(FftError::InvalidTwiddleTable)
        );
    }

    #[test]
    fn butterfly_on_bit_reversed_impulse() {
        let mut data = vec![Complex32::zero(); 8];
        data[0] = Complex32::from_real(1.0);
        let out = apply_butterfly(&data, &gen_twiddle_factors::<f32>(4)).unwrap();
        assert!(out.iter().all(|c| (c.re - 1.0).abs() < 1e-6 && c.im.abs() < 1e-6));
        assert_eq!(
            apply_butterfly::<f32>(&[], &[]).unwrap(),
            Vec::<Complex32>::new()
        );
    }

    #[test]
    fn inverse_roundtrip() {
        let data: Vec<Complex32> = (0..16)
            .map(|i| Complex32::new(i as f32 * 0.5 - 3.0, (i % 3) as f32))
            .collect();
        let mut fft = ScalarFft::<f32>::new();
        let spectrum = fft.forward(&data).unwrap();
        let back = fft.inverse(&spectrum).unwrap();
        for (a, b) in back.iter().zip(data.iter()) {
            assert!((a.re - b.re).abs() < 1e-4, "{} vs {}", a, b);
            assert!((a.im - b.im).abs() < 1e-4, "{} vs {}", a, b);
        }
    }
}
