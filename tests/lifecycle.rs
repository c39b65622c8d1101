// Test intent: verifies init/release state transitions and argument validation.
use tilefft::grid::Grid;
use tilefft::{Complex32, FftError, FftPipeline};

#[test]
fn init_rejects_non_power_of_two_and_small_sizes() {
    let mut fft = FftPipeline::serial();
    assert_eq!(fft.init(100, 100), Err(FftError::InvalidDimension));
    assert_eq!(fft.init(8, 8), Err(FftError::InvalidDimension));
    assert_eq!(fft.init(16, 24), Err(FftError::InvalidDimension));
    assert_eq!(fft.init(0, 16), Err(FftError::InvalidDimension));
    assert!(!fft.is_initialized());
    assert_eq!(fft.dimensions(), None);
}

#[test]
fn rejected_reinit_keeps_ready_pipeline() {
    let mut fft = FftPipeline::serial();
    fft.init(32, 32).unwrap();
    let data: Vec<Complex32> = (0..32 * 32)
        .map(|i| Complex32::new((i % 17) as f32, -((i % 5) as f32) / 2.0))
        .collect();
    fft.load_complex(&data).unwrap();

    assert_eq!(fft.init(48, 32), Err(FftError::InvalidDimension));
    assert_eq!(fft.init(8, 8), Err(FftError::InvalidDimension));
    assert_eq!(fft.dimensions(), Some((32, 32)));

    let mut kept = vec![Complex32::zero(); 32 * 32];
    fft.save(&mut kept).unwrap();
    assert_eq!(kept, data);

    fft.forward(None).unwrap();
    fft.inverse(None).unwrap();
    let mut back = vec![Complex32::zero(); 32 * 32];
    fft.save(&mut back).unwrap();
    for (a, b) in back.iter().zip(&data) {
        assert!((a.re - b.re).abs() < 1e-3 && (a.im - b.im).abs() < 1e-3, "{} vs {}", a, b);
    }
}

#[test]
fn release_before_init_and_twice() {
    let mut fft = FftPipeline::serial();
    fft.release();
    fft.release();
    fft.init(16, 16).unwrap();
    fft.release();
    fft.release();
    assert_eq!(fft.recenter_data(), Err(FftError::Uninitialized));
}

#[test]
fn reinit_with_new_size_resizes_everything() {
    let mut fft = FftPipeline::serial();
    fft.init(16, 16).unwrap();
    fft.init(64, 32).unwrap();
    assert_eq!(fft.dimensions(), Some((64, 32)));

    let old = Grid::<f32>::new(16, 16);
    assert_eq!(fft.load(&old), Err(FftError::InvalidDimension));

    let image = Grid::from_fn(64, 32, |x, y| (x + y) as f32);
    fft.load(&image).unwrap();
    fft.forward(None).unwrap();
    fft.inverse(None).unwrap();
    let mut mag = Grid::new(64, 32);
    fft.magnitude_spectrum(&mut mag).unwrap();
    for (a, b) in mag.as_slice().iter().zip(image.as_slice()) {
        assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
    }
}

#[test]
fn buffer_length_is_checked() {
    let mut fft = FftPipeline::serial();
    fft.init(16, 16).unwrap();
    let short = vec![Complex32::zero(); 255];
    assert_eq!(fft.load_complex(&short), Err(FftError::InvalidDimension));
    let mut long = vec![Complex32::zero(); 257];
    assert_eq!(fft.save(&mut long), Err(FftError::InvalidDimension));
}

#[test]
fn errors_display_a_message() {
    for err in [
        FftError::InvalidDimension,
        FftError::InvalidTwiddleTable,
        FftError::InvalidBitReversalTable,
        FftError::NotPowerOfTwo,
        FftError::Uninitialized,
        FftError::TileSizeMismatch,
    ] {
        assert!(!err.to_string().is_empty());
    }
}
