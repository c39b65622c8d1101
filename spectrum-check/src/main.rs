use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use spectrum_check::{analyze, pad_to_transform, read_gray, write_spectra, ColorMap};
use tilefft::FftPipeline;

/// Run an image through the tiled 2D FFT and save its spectra as PNGs.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the input image
    input: PathBuf,

    /// Directory receiving the output PNGs
    #[arg(long, default_value = "spectra")]
    out_dir: PathBuf,

    /// Color map for magnitude and phase images
    #[arg(long, value_enum, default_value_t = ColorMap::Inferno)]
    colormap: ColorMap,

    /// Dispatch kernels across a thread pool
    #[cfg(feature = "parallel")]
    #[arg(long)]
    parallel: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let source = read_gray(&args.input)?;
    let image = pad_to_transform(&source)?;
    log::info!(
        "{} is {}x{}, transforming at {}x{}",
        args.input.display(),
        source.width(),
        source.height(),
        image.width(),
        image.height()
    );

    let start = Instant::now();
    #[cfg(feature = "parallel")]
    let spectra = if args.parallel {
        let dispatcher = tilefft::ParallelDispatcher::new()?;
        log::info!("dispatching on {} threads", dispatcher.threads());
        analyze(&mut FftPipeline::new(dispatcher), &image)?
    } else {
        analyze(&mut FftPipeline::serial(), &image)?
    };
    #[cfg(not(feature = "parallel"))]
    let spectra = analyze(&mut FftPipeline::serial(), &image)?;
    log::info!("forward and inverse FFT took {:?}", start.elapsed());

    for path in write_spectra(&args.out_dir, &spectra, args.colormap)? {
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
