//! Per-cell compute kernels.
//!
//! Each kernel is a pure function producing the value of one output cell
//! `(x, y)` from fixed-offset reads of a source buffer that is never the
//! buffer being written. That is what lets a dispatcher evaluate every cell of
//! a dispatch in any order, or all at once.

use crate::num::{Complex32, Float};

/// Edge length of the square thread group every kernel is dispatched with.
///
/// Dispatch sizing divides the grid by this value and
/// [`FftPipeline::init`](crate::pipeline::FftPipeline::init) refuses a
/// dispatcher that tiles differently.
pub const WORKGROUP_SIZE: usize = 16;

const _: () = assert!(WORKGROUP_SIZE.is_power_of_two());

/// Kernel identifiers, one per dispatch kind issued by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    ConvertSourceToComplex,
    CopyComplex,
    CenterComplex,
    ConjugateComplex,
    DivideComplexByDimensions,
    BitRevByRow,
    BitRevByCol,
    ButterflyByRow,
    ButterflyByCol,
    ComplexMagnitude,
    ComplexMagnitudeScaled,
    ComplexPhase,
}

impl Kernel {
    pub fn name(self) -> &'static str {
        match self {
            Kernel::ConvertSourceToComplex => "convert_source_to_complex",
            Kernel::CopyComplex => "copy_complex",
            Kernel::CenterComplex => "center_complex",
            Kernel::ConjugateComplex => "conjugate_complex",
            Kernel::DivideComplexByDimensions => "divide_complex_by_dimensions",
            Kernel::BitRevByRow => "bit_rev_by_row",
            Kernel::BitRevByCol => "bit_rev_by_col",
            Kernel::ButterflyByRow => "butterfly_by_row",
            Kernel::ButterflyByCol => "butterfly_by_col",
            Kernel::ComplexMagnitude => "complex_magnitude",
            Kernel::ComplexMagnitudeScaled => "complex_magnitude_scaled",
            Kernel::ComplexPhase => "complex_phase",
        }
    }
}

/// Direction a 1D pass runs across the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// Grid shape seen by a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
}

impl Dims {
    #[inline(always)]
    pub fn index(self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline(always)]
    pub fn len(self) -> usize {
        self.width * self.height
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Transform length and position of `(x, y)` along `axis`.
    #[inline(always)]
    fn along(self, axis: Axis, x: usize, y: usize) -> (usize, usize) {
        match axis {
            Axis::Row => (self.width, x),
            Axis::Column => (self.height, y),
        }
    }

    /// Index of the cell `pos` along `axis`, on the same line as `(x, y)`.
    #[inline(always)]
    fn on_line(self, axis: Axis, x: usize, y: usize, pos: usize) -> usize {
        match axis {
            Axis::Row => self.index(pos, y),
            Axis::Column => self.index(x, pos),
        }
    }
}

/// Multiply by `(-1)^(x + y)`, moving the zero frequency to the grid center
/// after a forward transform.
#[inline(always)]
pub fn center(src: &[Complex32], dims: Dims, x: usize, y: usize) -> Complex32 {
    let v = src[dims.index(x, y)];
    if (x + y) & 1 == 1 {
        -v
    } else {
        v
    }
}

#[inline(always)]
pub fn conjugate(src: &[Complex32], dims: Dims, x: usize, y: usize) -> Complex32 {
    src[dims.index(x, y)].conj()
}

#[inline(always)]
pub fn divide_by_dimensions(src: &[Complex32], dims: Dims, x: usize, y: usize) -> Complex32 {
    src[dims.index(x, y)].scale(1.0 / dims.len() as f32)
}

/// Gather the sample whose bit-reversed position along `axis` is `(x, y)`.
#[inline(always)]
pub fn bit_reverse(
    src: &[Complex32],
    table: &[u32],
    axis: Axis,
    dims: Dims,
    x: usize,
    y: usize,
) -> Complex32 {
    let (_, pos) = dims.along(axis, x, y);
    src[dims.on_line(axis, x, y, table[pos] as usize)]
}

/// One radix-2 butterfly stage of block size `stride` along `axis`.
///
/// A cell in the upper half of its block produces `a + w * b`, a cell in the
/// lower half produces `a - w * b`, where `a` and `b` are the pair the block
/// combines and `w` is `twiddle[k * n / stride]`.
#[inline(always)]
pub fn butterfly(
    src: &[Complex32],
    twiddle: &[Complex32],
    axis: Axis,
    stride: usize,
    dims: Dims,
    x: usize,
    y: usize,
) -> Complex32 {
    let (n, pos) = dims.along(axis, x, y);
    let half = stride / 2;
    let k = pos & (stride - 1);
    let (top, k) = if k < half {
        (pos, k)
    } else {
        (pos - half, k - half)
    };
    let a = src[dims.on_line(axis, x, y, top)];
    let b = src[dims.on_line(axis, x, y, top + half)];
    let t = b * twiddle[k * (n / stride)];
    if top == pos {
        a + t
    } else {
        a - t
    }
}

#[inline(always)]
pub fn magnitude(src: &[Complex32], dims: Dims, x: usize, y: usize) -> f32 {
    src[dims.index(x, y)].norm()
}

/// `ln(1 + |z|) / ln(1 + width * height)`.
///
/// The largest magnitude a transform of samples in `[0, 1]` can reach is
/// `width * height` (the DC bin of an all-ones image), so this maps the
/// spectrum of such an image onto `[0, 1]` while lifting faint bins.
#[inline(always)]
pub fn magnitude_scaled(src: &[Complex32], dims: Dims, x: usize, y: usize) -> f32 {
    let norm = Float::ln_1p(dims.len() as f32);
    Float::ln_1p(src[dims.index(x, y)].norm()) / norm
}

/// Phase angle in radians, in `[-pi, pi]`.
#[inline(always)]
pub fn phase(src: &[Complex32], dims: Dims, x: usize, y: usize) -> f32 {
    src[dims.index(x, y)].arg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const DIMS: Dims = Dims {
        width: 4,
        height: 2,
    };

    fn ramp() -> Vec<Complex32> {
        (0..DIMS.len())
            .map(|i| Complex32::new(i as f32, -(i as f32)))
            .collect()
    }

    #[test]
    fn center_flips_checkerboard() {
        let src = ramp();
        assert_eq!(center(&src, DIMS, 0, 0), src[0]);
        assert_eq!(center(&src, DIMS, 1, 0), -src[1]);
        assert_eq!(center(&src, DIMS, 0, 1), -src[4]);
        assert_eq!(center(&src, DIMS, 1, 1), src[5]);
    }

    #[test]
    fn bit_reverse_gathers_along_axis() {
        let src = ramp();
        let row_table = [0u32, 2, 1, 3];
        assert_eq!(bit_reverse(&src, &row_table, Axis::Row, DIMS, 1, 1), src[6]);
        let col_table = [0u32, 1];
        assert_eq!(bit_reverse(&src, &col_table, Axis::Column, DIMS, 3, 1), src[7]);
    }

    #[test]
    fn butterfly_first_stage_is_sum_and_difference() {
        let src = ramp();
        let twiddle = crate::tables::twiddle_factors::<f32>(2);
        let sum = butterfly(&src, &twiddle, Axis::Row, 2, DIMS, 0, 0);
        let diff = butterfly(&src, &twiddle, Axis::Row, 2, DIMS, 1, 0);
        assert_eq!(sum, src[0] + src[1]);
        assert_eq!(diff, src[0] - src[1]);
    }

    #[test]
    fn scaled_magnitude_is_normalized() {
        let dims = Dims {
            width: 16,
            height: 16,
        };
        let mut src = alloc::vec![Complex32::zero(); dims.len()];
        src[0] = Complex32::from_real(256.0);
        assert!((magnitude_scaled(&src, dims, 0, 0) - 1.0).abs() < 1e-6);
        assert_eq!(magnitude_scaled(&src, dims, 1, 0), 0.0);
        assert_eq!(magnitude(&src, dims, 0, 0), 256.0);
    }

    #[test]
    fn kernel_names_are_distinct() {
        let kernels = [
            Kernel::ConvertSourceToComplex,
            Kernel::CopyComplex,
            Kernel::CenterComplex,
            Kernel::ConjugateComplex,
            Kernel::DivideComplexByDimensions,
            Kernel::BitRevByRow,
            Kernel::BitRevByCol,
            Kernel::ButterflyByRow,
            Kernel::ButterflyByCol,
            Kernel::ComplexMagnitude,
            Kernel::ComplexMagnitudeScaled,
            Kernel::ComplexPhase,
        ];
        let mut names: Vec<&str> = kernels.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), kernels.len());
    }
}
