//! Working buffers owned by an initialized pipeline.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::FftError;
use crate::kernel::Dims;
use crate::num::Complex32;
use crate::tables::TableCache;

/// Two equally sized buffers whose roles alternate between passes.
///
/// `a` is always the current buffer between passes. A pass reads `a`, writes
/// `b`, then [`swap`](PingPong::swap) hands the result back to `a`. Swapping
/// exchanges the two `Vec` handles; sample data is never copied.
#[derive(Debug)]
pub struct PingPong<T> {
    a: Vec<T>,
    b: Vec<T>,
}

impl<T: Copy + Default> PingPong<T> {
    pub fn new(len: usize) -> Self {
        Self {
            a: vec![T::default(); len],
            b: vec![T::default(); len],
        }
    }
}

impl<T> PingPong<T> {
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Buffer holding valid data.
    pub fn current(&self) -> &[T] {
        &self.a
    }

    pub fn current_mut(&mut self) -> &mut [T] {
        &mut self.a
    }

    /// `(source, destination)` for a pass: the current buffer read-only and
    /// the other one writable.
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        (&self.a, &mut self.b)
    }

    /// Exchange buffer roles in O(1).
    pub fn swap(&mut self) {
        core::mem::swap(&mut self.a, &mut self.b);
    }
}

/// Everything `init` builds for one `(width, height)`: row and column
/// bit-reversal tables, row and column twiddle tables, and the A/B pair.
#[derive(Debug)]
pub struct BufferSet {
    pub dims: Dims,
    pub bit_rev_row: Arc<[u32]>,
    pub bit_rev_col: Arc<[u32]>,
    pub twiddle_row: Arc<[Complex32]>,
    pub twiddle_col: Arc<[Complex32]>,
    pub data: PingPong<Complex32>,
}

impl BufferSet {
    /// Build tables through `tables` (shared when width equals height) and
    /// allocate both working buffers.
    pub fn new(dims: Dims, tables: &mut TableCache<f32>) -> Result<Self, FftError> {
        let bit_rev_row = tables.bit_reversal(dims.width)?;
        let bit_rev_col = tables.bit_reversal(dims.height)?;
        let twiddle_row = tables.twiddles(dims.width)?;
        let twiddle_col = tables.twiddles(dims.height)?;
        Ok(Self {
            dims,
            bit_rev_row,
            bit_rev_col,
            twiddle_row,
            twiddle_col,
            data: PingPong::new(dims.len()),
        })
    }
}
