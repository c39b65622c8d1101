//! Bit-reversal and twiddle-factor tables.
//!
//! Both tables are pure functions of the transform length, shared by the
//! scalar reference and the tiled pipeline. [`TableCache`] memoizes them per
//! length so repeated transforms never recompute trigonometry.

use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::error::FftError;
use crate::num::{Complex, Float};
use crate::pow2::log2_exact;

/// Bit-reversal permutation of `[0, n)`: entry `i` is `i` with its lowest
/// `log2(n)` bits reversed.
///
/// Returns [`FftError::NotPowerOfTwo`] unless `n` is a power of two that fits
/// in `u32`.
///
/// ```
/// use tilefft::tables::bit_reversal;
/// assert_eq!(bit_reversal(8).unwrap(), vec![0, 4, 2, 6, 1, 5, 3, 7]);
/// ```
pub fn bit_reversal(n: usize) -> Result<Vec<u32>, FftError> {
    let bits = log2_exact(n).ok_or(FftError::NotPowerOfTwo)?;
    if bits >= u32::BITS {
        return Err(FftError::NotPowerOfTwo);
    }
    let table = (0..n as u32)
        .map(|i| {
            if bits == 0 {
                0
            } else {
                i.reverse_bits() >> (u32::BITS - bits)
            }
        })
        .collect();
    Ok(table)
}

/// `half_n` twiddle factors `exp(-i * pi * k / half_n)` for `k in [0, half_n)`.
///
/// For a transform of length `N` pass `half_n = N / 2`; entry `k` is then the
/// `k`-th power of the principal `N`-th root of unity.
pub fn twiddle_factors<T: Float>(half_n: usize) -> Vec<Complex<T>> {
    if half_n == 0 {
        return Vec::new();
    }
    let step = -T::pi() / T::from_f32(half_n as f32);
    (0..half_n)
        .map(|k| Complex::expi(step * T::from_f32(k as f32)))
        .collect()
}

/// Memoized table builder keyed by transform length.
///
/// Handles are reference counted; asking twice for the same length returns
/// the same allocation.
pub struct TableCache<T: Float> {
    bit_reversal: HashMap<usize, Arc<[u32]>>,
    twiddles: HashMap<usize, Arc<[Complex<T>]>>,
}

impl<T: Float> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> TableCache<T> {
    pub fn new() -> Self {
        Self {
            bit_reversal: HashMap::new(),
            twiddles: HashMap::new(),
        }
    }

    /// Bit-reversal table for a transform of length `n`.
    pub fn bit_reversal(&mut self, n: usize) -> Result<Arc<[u32]>, FftError> {
        if let Some(table) = self.bit_reversal.get(&n) {
            return Ok(Arc::clone(table));
        }
        let table: Arc<[u32]> = Arc::from(bit_reversal(n)?);
        self.bit_reversal.insert(n, Arc::clone(&table));
        Ok(table)
    }

    /// Twiddle table (`n / 2` entries) for a transform of length `n`.
    pub fn twiddles(&mut self, n: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        log2_exact(n).ok_or(FftError::NotPowerOfTwo)?;
        let table = self
            .twiddles
            .entry(n)
            .or_insert_with(|| Arc::from(twiddle_factors::<T>(n / 2)));
        Ok(Arc::clone(table))
    }

    /// Number of distinct lengths with at least one cached table.
    pub fn len(&self) -> usize {
        let twiddle_only = self
            .twiddles
            .keys()
            .filter(|n| !self.bit_reversal.contains_key(*n))
            .count();
        self.bit_reversal.len() + twiddle_only
    }

    pub fn is_empty(&self) -> bool {
        self.bit_reversal.is_empty() && self.twiddles.is_empty()
    }

    pub fn clear(&mut self) {
        self.bit_reversal.clear();
        self.twiddles.clear();
    }
}
