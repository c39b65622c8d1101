//! Tile-dispatched 2D FFT pipeline.
//!
//! [`FftPipeline`] owns two complex working buffers (A and B) plus the row and
//! column bit-reversal and twiddle tables for one `(width, height)`. Every
//! operation is a sequence of kernel dispatches; each dispatch reads the
//! current buffer, writes the other one and swaps, so between public calls
//! buffer A always holds the data.
//!
//! ```
//! use tilefft::grid::Grid;
//! use tilefft::pipeline::FftPipeline;
//!
//! let image = Grid::from_fn(32, 32, |x, y| ((x ^ y) & 1) as f32);
//! let mut fft = FftPipeline::serial();
//! fft.init(32, 32).unwrap();
//! fft.load(&image).unwrap();
//! fft.recenter_data().unwrap();
//! fft.forward(None).unwrap();
//!
//! let mut spectrum = Grid::new(32, 32);
//! fft.magnitude_spectrum_scaled(&mut spectrum).unwrap();
//!
//! fft.inverse(None).unwrap();
//! fft.release();
//! ```

use alloc::sync::Arc;

use crate::buffers::BufferSet;
use crate::dispatch::{Dispatcher, Groups, SerialDispatcher};
use crate::error::FftError;
use crate::grid::{Grid, Source2d};
use crate::kernel::{self, Axis, Dims, Kernel, WORKGROUP_SIZE};
use crate::num::Complex32;
use crate::pow2::is_valid_dimension;
use crate::tables::TableCache;

/// 2D forward/inverse FFT over tiled kernel dispatches.
///
/// The pipeline starts uninitialized; [`init`](Self::init) makes it ready and
/// [`release`](Self::release) returns it to the uninitialized state.
pub struct FftPipeline<D: Dispatcher = SerialDispatcher> {
    dispatcher: D,
    tables: TableCache<f32>,
    buffers: Option<BufferSet>,
}

impl FftPipeline<SerialDispatcher> {
    /// Pipeline running every dispatch on the calling thread.
    pub fn serial() -> Self {
        Self::new(SerialDispatcher)
    }
}

impl<D: Dispatcher> FftPipeline<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            tables: TableCache::new(),
            buffers: None,
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    /// `(width, height)` the pipeline was initialized with.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.buffers
            .as_ref()
            .map(|b| (b.dims.width, b.dims.height))
    }

    /// Build tables and allocate buffers for a `width` x `height` transform.
    ///
    /// Both dimensions must be powers of two no smaller than
    /// [`WORKGROUP_SIZE`]. A rejected call leaves the pipeline as it was;
    /// otherwise a ready pipeline is released before being re-initialized.
    pub fn init(&mut self, width: usize, height: usize) -> Result<(), FftError> {
        if self.dispatcher.group_size() != WORKGROUP_SIZE {
            return Err(FftError::TileSizeMismatch);
        }
        if !is_valid_dimension(width)
            || !is_valid_dimension(height)
            || width < WORKGROUP_SIZE
            || height < WORKGROUP_SIZE
        {
            return Err(FftError::InvalidDimension);
        }
        self.release();
        let set = BufferSet::new(Dims { width, height }, &mut self.tables)?;
        vlog!(debug, "fft pipeline initialized for {}x{}", width, height);
        self.buffers = Some(set);
        Ok(())
    }

    /// Free every table and buffer. Safe to call repeatedly or before `init`.
    pub fn release(&mut self) {
        if let Some(set) = self.buffers.take() {
            vlog!(
                debug,
                "fft pipeline released {}x{}",
                set.dims.width,
                set.dims.height
            );
        }
        self.tables.clear();
    }

    /// Convert `source` into complex samples in buffer A.
    pub fn load<S: Source2d + Sync>(&mut self, source: &S) -> Result<(), FftError> {
        let set = self.buffers.as_mut().ok_or(FftError::Uninitialized)?;
        if source.width() != set.dims.width || source.height() != set.dims.height {
            return Err(FftError::InvalidDimension);
        }
        let dims = set.dims;
        self.dispatcher.dispatch(
            Kernel::ConvertSourceToComplex,
            groups(dims),
            dims.width,
            set.data.current_mut(),
            |x, y| source.sample(x, y),
        );
        Ok(())
    }

    /// Copy a row-major complex buffer of `width * height` samples into A.
    pub fn load_complex(&mut self, data: &[Complex32]) -> Result<(), FftError> {
        let set = self.buffers.as_mut().ok_or(FftError::Uninitialized)?;
        if data.len() != set.dims.len() {
            return Err(FftError::InvalidDimension);
        }
        let dims = set.dims;
        self.dispatcher.dispatch(
            Kernel::CopyComplex,
            groups(dims),
            dims.width,
            set.data.current_mut(),
            |x, y| data[dims.index(x, y)],
        );
        Ok(())
    }

    /// Copy buffer A out into `data`, which must hold `width * height`
    /// samples.
    pub fn save(&self, data: &mut [Complex32]) -> Result<(), FftError> {
        let set = self.buffers.as_ref().ok_or(FftError::Uninitialized)?;
        if data.len() != set.dims.len() {
            return Err(FftError::InvalidDimension);
        }
        data.copy_from_slice(set.data.current());
        Ok(())
    }

    /// Multiply every sample by `(-1)^(x + y)` so the next forward transform
    /// places the zero frequency at the grid center.
    pub fn recenter_data(&mut self) -> Result<(), FftError> {
        let set = self.buffers.as_mut().ok_or(FftError::Uninitialized)?;
        let dims = set.dims;
        pass(&self.dispatcher, set, Kernel::CenterComplex, |src, x, y| {
            kernel::center(src, dims, x, y)
        });
        Ok(())
    }

    /// Forward transform of buffer A: rows first, then columns.
    ///
    /// When `intermediate` is given it receives the scaled magnitude of the
    /// row-transformed data; it must match the pipeline dimensions.
    pub fn forward(&mut self, intermediate: Option<&mut Grid<f32>>) -> Result<(), FftError> {
        let set = self.buffers.as_mut().ok_or(FftError::Uninitialized)?;
        check_image(set, intermediate.as_deref())?;
        run_forward(&self.dispatcher, set, intermediate);
        Ok(())
    }

    /// Inverse transform of buffer A.
    ///
    /// Uses `ifft(X) = conj(fft(conj(X))) / (width * height)`, so the same
    /// row and column butterflies serve both directions. `intermediate`
    /// behaves as in [`forward`](Self::forward).
    pub fn inverse(&mut self, intermediate: Option<&mut Grid<f32>>) -> Result<(), FftError> {
        let set = self.buffers.as_mut().ok_or(FftError::Uninitialized)?;
        check_image(set, intermediate.as_deref())?;
        let dims = set.dims;
        pass(&self.dispatcher, set, Kernel::ConjugateComplex, |src, x, y| {
            kernel::conjugate(src, dims, x, y)
        });
        run_forward(&self.dispatcher, set, intermediate);
        pass(&self.dispatcher, set, Kernel::ConjugateComplex, |src, x, y| {
            kernel::conjugate(src, dims, x, y)
        });
        pass(
            &self.dispatcher,
            set,
            Kernel::DivideComplexByDimensions,
            |src, x, y| kernel::divide_by_dimensions(src, dims, x, y),
        );
        Ok(())
    }

    /// Linear magnitude `|z|` of buffer A.
    pub fn magnitude_spectrum(&self, dst: &mut Grid<f32>) -> Result<(), FftError> {
        self.to_image(dst, Kernel::ComplexMagnitude, kernel::magnitude)
    }

    /// Log-compressed magnitude `ln(1 + |z|) / ln(1 + width * height)` of
    /// buffer A.
    pub fn magnitude_spectrum_scaled(&self, dst: &mut Grid<f32>) -> Result<(), FftError> {
        self.to_image(dst, Kernel::ComplexMagnitudeScaled, kernel::magnitude_scaled)
    }

    /// Phase angle of buffer A in radians.
    pub fn phase_angle(&self, dst: &mut Grid<f32>) -> Result<(), FftError> {
        self.to_image(dst, Kernel::ComplexPhase, kernel::phase)
    }

    fn to_image(
        &self,
        dst: &mut Grid<f32>,
        kind: Kernel,
        cell: fn(&[Complex32], Dims, usize, usize) -> f32,
    ) -> Result<(), FftError> {
        let set = self.buffers.as_ref().ok_or(FftError::Uninitialized)?;
        check_image(set, Some(&*dst))?;
        write_image(&self.dispatcher, set, kind, dst, cell);
        Ok(())
    }
}

impl<D: Dispatcher> Drop for FftPipeline<D> {
    fn drop(&mut self) {
        self.release();
    }
}

fn groups(dims: Dims) -> Groups {
    Groups::covering(dims.width, dims.height, WORKGROUP_SIZE)
}

fn check_image(set: &BufferSet, image: Option<&Grid<f32>>) -> Result<(), FftError> {
    match image {
        Some(img) if img.width() != set.dims.width || img.height() != set.dims.height => {
            Err(FftError::InvalidDimension)
        }
        _ => Ok(()),
    }
}

/// One A -> B dispatch followed by a swap, leaving the result in A.
fn pass<D, F>(dispatcher: &D, set: &mut BufferSet, kind: Kernel, cell: F)
where
    D: Dispatcher,
    F: Fn(&[Complex32], usize, usize) -> Complex32 + Sync,
{
    let dims = set.dims;
    let (src, dst) = set.data.split();
    dispatcher.dispatch(kind, groups(dims), dims.width, dst, |x, y| cell(src, x, y));
    set.data.swap();
}

/// Read-only conversion of buffer A into an `f32` image.
fn write_image<D: Dispatcher>(
    dispatcher: &D,
    set: &BufferSet,
    kind: Kernel,
    dst: &mut Grid<f32>,
    cell: fn(&[Complex32], Dims, usize, usize) -> f32,
) {
    let dims = set.dims;
    let src = set.data.current();
    dispatcher.dispatch(kind, groups(dims), dims.width, dst.as_mut_slice(), |x, y| {
        cell(src, dims, x, y)
    });
}

/// Bit-reverse along `axis`, then run `log2(n)` butterfly stages.
fn transform_axis<D: Dispatcher>(dispatcher: &D, set: &mut BufferSet, axis: Axis) {
    let dims = set.dims;
    let (table, twiddle, n, bit_rev_kernel, butterfly_kernel): (
        Arc<[u32]>,
        Arc<[Complex32]>,
        usize,
        Kernel,
        Kernel,
    ) = match axis {
        Axis::Row => (
            Arc::clone(&set.bit_rev_row),
            Arc::clone(&set.twiddle_row),
            dims.width,
            Kernel::BitRevByRow,
            Kernel::ButterflyByRow,
        ),
        Axis::Column => (
            Arc::clone(&set.bit_rev_col),
            Arc::clone(&set.twiddle_col),
            dims.height,
            Kernel::BitRevByCol,
            Kernel::ButterflyByCol,
        ),
    };
    pass(dispatcher, set, bit_rev_kernel, |src, x, y| {
        kernel::bit_reverse(src, &table, axis, dims, x, y)
    });
    let mut stride = 2;
    while stride <= n {
        pass(dispatcher, set, butterfly_kernel, |src, x, y| {
            kernel::butterfly(src, &twiddle, axis, stride, dims, x, y)
        });
        stride *= 2;
    }
}

fn run_forward<D: Dispatcher>(
    dispatcher: &D,
    set: &mut BufferSet,
    intermediate: Option<&mut Grid<f32>>,
) {
    transform_axis(dispatcher, set, Axis::Row);
    if let Some(img) = intermediate {
        write_image(
            dispatcher,
            set,
            Kernel::ComplexMagnitudeScaled,
            img,
            kernel::magnitude_scaled,
        );
    }
    transform_axis(dispatcher, set, Axis::Column);
}
