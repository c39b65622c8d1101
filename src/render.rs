//! Colour mapping for magnitude and phase images.
//!
//! Helpers the host side uses to turn the `f32` grids produced by the
//! pipeline into displayable RGB8 pixels.

use alloc::vec::Vec;
use core::f32::consts::PI;

use crate::grid::Grid;

/// Maximum value for an 8-bit colour channel.
const U8_MAX: f32 = 255.0;

/// Supported colour palettes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colormap {
    /// Greyscale gradient.
    Gray,
    /// Viridis perceptually uniform map.
    Viridis,
    /// Plasma perceptually uniform map.
    Plasma,
    /// Inferno perceptually uniform map.
    Inferno,
    /// Cyclic map, suited to phase images where `-pi` and `pi` coincide.
    Sinebow,
}

impl Colormap {
    /// Parse a palette name used on the command line; unknown names fall
    /// back to greyscale.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "viridis" => Colormap::Viridis,
            "plasma" => Colormap::Plasma,
            "inferno" => Colormap::Inferno,
            "sinebow" => Colormap::Sinebow,
            _ => Colormap::Gray,
        }
    }
}

/// Map a value in `[0, 1]` onto an RGB8 colour; out of range values clamp.
pub fn map_color_u8(t: f32, cmap: Colormap) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let c = match cmap {
        Colormap::Gray => {
            let g = libm::roundf(t * U8_MAX) as u8;
            return [g, g, g];
        }
        Colormap::Viridis => colorous::VIRIDIS.eval_continuous(t as f64),
        Colormap::Plasma => colorous::PLASMA.eval_continuous(t as f64),
        Colormap::Inferno => colorous::INFERNO.eval_continuous(t as f64),
        Colormap::Sinebow => colorous::SINEBOW.eval_continuous(t as f64),
    };
    [c.r, c.g, c.b]
}

/// Phase in radians mapped from `[-pi, pi]` onto `[0, 1]`.
#[inline]
pub fn phase_to_unit(phase: f32) -> f32 {
    (phase + PI) / (2.0 * PI)
}

/// Render an image whose values are already in `[0, 1]`, such as a scaled
/// magnitude, as interleaved RGB8.
pub fn to_rgb8(image: &Grid<f32>, cmap: Colormap) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.as_slice().len() * 3);
    for &v in image.as_slice() {
        out.extend_from_slice(&map_color_u8(v, cmap));
    }
    out
}

/// Render a linear image normalized by its own maximum.
pub fn to_rgb8_normalized(image: &Grid<f32>, cmap: Colormap) -> Vec<u8> {
    let max = image.as_slice().iter().copied().fold(0.0f32, f32::max);
    let scale = if max > 0.0 { 1.0 / max } else { 0.0 };
    let mut out = Vec::with_capacity(image.as_slice().len() * 3);
    for &v in image.as_slice() {
        out.extend_from_slice(&map_color_u8(v * scale, cmap));
    }
    out
}

/// Render a phase image, mapping `[-pi, pi]` across the palette.
pub fn phase_to_rgb8(image: &Grid<f32>, cmap: Colormap) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.as_slice().len() * 3);
    for &v in image.as_slice() {
        out.extend_from_slice(&map_color_u8(phase_to_unit(v), cmap));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn gray_endpoints() {
        assert_eq!(map_color_u8(0.0, Colormap::Gray), [0, 0, 0]);
        assert_eq!(map_color_u8(1.0, Colormap::Gray), [255, 255, 255]);
        assert_eq!(map_color_u8(2.0, Colormap::Gray), [255, 255, 255]);
        assert_eq!(map_color_u8(f32::NAN, Colormap::Gray), [0, 0, 0]);
    }

    #[test]
    fn parse_names() {
        assert_eq!(Colormap::parse("Inferno"), Colormap::Inferno);
        assert_eq!(Colormap::parse("sinebow"), Colormap::Sinebow);
        assert_eq!(Colormap::parse("unknown"), Colormap::Gray);
    }

    #[test]
    fn phase_range_maps_to_unit_interval() {
        assert!(phase_to_unit(-PI).abs() < 1e-6);
        assert!((phase_to_unit(0.0) - 0.5).abs() < 1e-6);
        assert!((phase_to_unit(PI) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_render_peaks_at_white() {
        let img = Grid::from_vec(2, 1, vec![0.0f32, 4.0]).unwrap();
        let rgb = to_rgb8_normalized(&img, Colormap::Gray);
        assert_eq!(rgb, vec![0, 0, 0, 255, 255, 255]);
        let flat = to_rgb8(&img, Colormap::Viridis);
        assert_eq!(flat.len(), 6);
    }
}
