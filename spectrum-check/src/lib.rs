use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use image::{
    codecs::png::{CompressionType, FilterType, PngEncoder},
    ColorType, ImageEncoder,
};
use tilefft::dispatch::Dispatcher;
use tilefft::render::{self, Colormap};
use tilefft::{round_up_power_of_two, FftPipeline, Grid, WORKGROUP_SIZE};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMap {
    Gray,
    Viridis,
    Plasma,
    Inferno,
    Sinebow,
}

impl From<ColorMap> for Colormap {
    fn from(c: ColorMap) -> Self {
        match c {
            ColorMap::Gray => Colormap::Gray,
            ColorMap::Viridis => Colormap::Viridis,
            ColorMap::Plasma => Colormap::Plasma,
            ColorMap::Inferno => Colormap::Inferno,
            ColorMap::Sinebow => Colormap::Sinebow,
        }
    }
}

/// Images produced by one forward/inverse run.
pub struct Spectra {
    /// Scaled magnitude after the row pass of the forward transform.
    pub forward_rows: Grid<f32>,
    /// Scaled magnitude of the full spectrum.
    pub magnitude: Grid<f32>,
    /// Phase of the full spectrum.
    pub phase: Grid<f32>,
    /// Scaled magnitude after the row pass of the inverse transform.
    pub inverse_rows: Grid<f32>,
    /// Linear magnitude of the reconstructed image.
    pub restored: Grid<f32>,
}

/// Smallest transform edge holding `n` samples.
pub fn transform_size(n: usize) -> Result<usize> {
    let n = u32::try_from(n).context("image dimension does not fit in u32")?;
    let size = round_up_power_of_two(n) as usize;
    ensure!(size != 0, "image dimension {n} has no power-of-two size");
    Ok(size.max(WORKGROUP_SIZE))
}

/// Copy `image` into the top-left corner of a zeroed grid whose edges are
/// valid transform sizes.
pub fn pad_to_transform(image: &Grid<u8>) -> Result<Grid<u8>> {
    let width = transform_size(image.width())?;
    let height = transform_size(image.height())?;
    Ok(Grid::from_fn(width, height, |x, y| {
        image.get(x, y).copied().unwrap_or(0)
    }))
}

pub fn read_gray(path: &Path) -> Result<Grid<u8>> {
    let img = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_luma8();
    let (w, h) = img.dimensions();
    Ok(Grid::from_vec(w as usize, h as usize, img.into_raw())?)
}

/// Forward then inverse transform of `image`, collecting every output image.
pub fn analyze<D: Dispatcher>(fft: &mut FftPipeline<D>, image: &Grid<u8>) -> Result<Spectra> {
    let (w, h) = (image.width(), image.height());
    let mut forward_rows = Grid::new(w, h);
    let mut magnitude = Grid::new(w, h);
    let mut phase = Grid::new(w, h);
    let mut inverse_rows = Grid::new(w, h);
    let mut restored = Grid::new(w, h);

    fft.init(w, h)?;
    fft.load(image)?;
    fft.recenter_data()?;
    fft.forward(Some(&mut forward_rows))?;
    fft.magnitude_spectrum_scaled(&mut magnitude)?;
    fft.phase_angle(&mut phase)?;
    fft.inverse(Some(&mut inverse_rows))?;
    fft.magnitude_spectrum(&mut restored)?;
    fft.release();

    Ok(Spectra {
        forward_rows,
        magnitude,
        phase,
        inverse_rows,
        restored,
    })
}

pub fn save_png(path: &Path, width: usize, height: usize, rgb: &[u8]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let encoder = PngEncoder::new_with_quality(file, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(rgb, width as u32, height as u32, ColorType::Rgb8)?;
    Ok(())
}

/// Write the five spectra as PNGs into `out_dir`, returning their paths.
pub fn write_spectra(out_dir: &Path, spectra: &Spectra, cmap: ColorMap) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let cmap = Colormap::from(cmap);
    let (w, h) = (spectra.magnitude.width(), spectra.magnitude.height());
    let outputs = [
        ("forward_rows.png", render::to_rgb8(&spectra.forward_rows, cmap)),
        ("magnitude.png", render::to_rgb8(&spectra.magnitude, cmap)),
        ("phase.png", render::phase_to_rgb8(&spectra.phase, cmap)),
        ("inverse_rows.png", render::to_rgb8(&spectra.inverse_rows, cmap)),
        (
            "restored.png",
            render::to_rgb8_normalized(&spectra.restored, Colormap::Gray),
        ),
    ];
    let mut paths = Vec::with_capacity(outputs.len());
    for (name, rgb) in outputs {
        let path = out_dir.join(name);
        save_png(&path, w, h, &rgb)?;
        paths.push(path);
    }
    Ok(paths)
}
