//! Row-major 2D grids and the source trait the pipeline loads from.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::FftError;
use crate::num::Complex32;

/// Dense `width` x `height` grid stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Grid filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer; its length must be
    /// `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, FftError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(FftError::InvalidDimension);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

}

impl<T: Copy> Grid<T> {
    /// Position of the largest cell according to `key`.
    pub fn argmax_by(&self, key: impl Fn(T) -> f32) -> Option<(usize, usize)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, v) in self.data.iter().enumerate() {
            let k = key(*v);
            if best.map_or(true, |(_, b)| k > b) {
                best = Some((i, k));
            }
        }
        best.map(|(i, _)| (i % self.width, i / self.width))
    }
}

/// A sampleable 2D surface the pipeline can load.
///
/// Real sources return samples with a zero imaginary part.
pub trait Source2d {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn sample(&self, x: usize, y: usize) -> Complex32;
}

impl Source2d for Grid<f32> {
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn sample(&self, x: usize, y: usize) -> Complex32 {
        Complex32::from_real(self.data[y * self.width + x])
    }
}

impl Source2d for Grid<Complex32> {
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn sample(&self, x: usize, y: usize) -> Complex32 {
        self.data[y * self.width + x]
    }
}

/// 8-bit luminance, sampled as intensity in `[0, 1]`.
impl Source2d for Grid<u8> {
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn sample(&self, x: usize, y: usize) -> Complex32 {
        Complex32::from_real(self.data[y * self.width + x] as f32 / 255.0)
    }
}
