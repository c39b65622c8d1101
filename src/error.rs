use core::fmt;

/// Errors reported by the reference FFT and the tiled pipeline.
///
/// Every variant is a precondition failure detected before any computation is
/// issued, so a failed call never leaves buffers half-updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// A dimension is not a power of two, is below the tile size, or does not
    /// match the size the pipeline was initialized with.
    InvalidDimension,
    /// Twiddle table length is not half the transform length.
    InvalidTwiddleTable,
    /// Bit-reversal table length differs from the transform length.
    InvalidBitReversalTable,
    /// Input length is not a power of two.
    NotPowerOfTwo,
    /// Data operation on a pipeline that has not been initialized, or has
    /// been released.
    Uninitialized,
    /// The injected dispatcher tiles work differently from the kernels.
    TileSizeMismatch,
}

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FftError::InvalidDimension => "invalid dimensions",
            FftError::InvalidTwiddleTable => "invalid twiddle factors",
            FftError::InvalidBitReversalTable => "invalid bit reversal indices",
            FftError::NotPowerOfTwo => "data length is not a power of 2",
            FftError::Uninitialized => "pipeline used before init or after release",
            FftError::TileSizeMismatch => "dispatcher tile size does not match kernel tile size",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}
