//! # tilefft - tile-dispatched 2D FFT
//!
//! Forward and inverse 2D Fast Fourier Transforms of image-sized grids,
//! executed as a sequence of data-parallel kernel dispatches over 16x16 thread
//! groups, with the spectrum exposed as magnitude and phase images.
//!
//! ## Pipeline
//!
//! [`FftPipeline`] owns two complex working buffers and precomputed row and
//! column bit-reversal and twiddle tables. A forward transform is a row
//! bit-reversal followed by `log2(width)` row butterfly passes, then the same
//! along columns. Every pass reads one buffer and writes the other, then the
//! two swap roles, so passes never race and no data is copied between them.
//! The inverse reuses the forward butterflies on the conjugated spectrum.
//!
//! Kernels run through an injected [`Dispatcher`]: [`SerialDispatcher`] on
//! the calling thread, or `ParallelDispatcher` across a Rayon pool.
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` for [`FftError`]
//! - `render` (default): colour mapping of output images via `colorous`
//! - `parallel`: Rayon-backed `ParallelDispatcher`
//! - `verbose-logging`: dispatch tracing through the `log` facade
//!
//! ## Reference implementation
//!
//! [`scalar`] holds a 1D radix-2 FFT using the same tables and butterfly
//! arithmetic, used to check the pipeline.
//!
//! ## License
//!
//! Licensed under either of Apache License 2.0 or MIT, at your option.

#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "verbose-logging")]
macro_rules! vlog {
    ($lvl:ident, $($arg:tt)+) => {
        log::$lvl!($($arg)+)
    };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! vlog {
    ($lvl:ident, $($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

pub mod buffers;
pub mod dispatch;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod num;
pub mod pipeline;
pub mod pow2;
#[cfg(feature = "render")]
pub mod render;
pub mod scalar;
pub mod tables;

#[cfg(feature = "parallel")]
pub use dispatch::ParallelDispatcher;
pub use dispatch::{Dispatcher, SerialDispatcher};
pub use error::FftError;
pub use grid::{Grid, Source2d};
pub use kernel::WORKGROUP_SIZE;
pub use num::{Complex, Complex32, Complex64, Float};
pub use pipeline::FftPipeline;
pub use pow2::round_up_power_of_two;
