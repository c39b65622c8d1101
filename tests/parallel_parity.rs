// Test intent: verifies the Rayon dispatcher produces bit-identical results to the serial one.
#![cfg(feature = "parallel")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tilefft::dispatch::{parallel_threads, set_parallel_threads, Dispatcher};
use tilefft::grid::Grid;
use tilefft::{Complex32, FftPipeline, ParallelDispatcher};

struct Run {
    spectrum: Vec<Complex32>,
    intermediate: Grid<f32>,
    restored: Grid<f32>,
}

fn run<D: Dispatcher>(fft: &mut FftPipeline<D>, image: &Grid<f32>) -> Run {
    let (w, h) = (image.width(), image.height());
    let mut spectrum = vec![Complex32::zero(); w * h];
    let mut intermediate = Grid::new(w, h);
    let mut restored = Grid::new(w, h);
    fft.init(w, h).unwrap();
    fft.load(image).unwrap();
    fft.recenter_data().unwrap();
    fft.forward(Some(&mut intermediate)).unwrap();
    fft.save(&mut spectrum).unwrap();
    fft.inverse(None).unwrap();
    fft.magnitude_spectrum(&mut restored).unwrap();
    Run {
        spectrum,
        intermediate,
        restored,
    }
}

#[test]
fn parallel_pipeline_matches_serial() {
    let mut rng = StdRng::seed_from_u64(7);
    let image = Grid::from_fn(128, 64, |_, _| rng.gen_range(0.0f32..1.0));

    let serial = run(&mut FftPipeline::serial(), &image);
    let parallel = run(
        &mut FftPipeline::new(ParallelDispatcher::with_threads(4).unwrap()),
        &image,
    );
    assert_eq!(serial.spectrum, parallel.spectrum);
    assert_eq!(serial.intermediate, parallel.intermediate);
    assert_eq!(serial.restored, parallel.restored);
}

#[test]
fn thread_override_is_respected() {
    set_parallel_threads(2);
    assert_eq!(parallel_threads(), 2);
    let dispatcher = ParallelDispatcher::new().unwrap();
    assert_eq!(dispatcher.threads(), 2);
    set_parallel_threads(0);
    assert!(parallel_threads() >= 1);
}
