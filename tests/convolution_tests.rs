use feedback_loop::buffer::ImageBuffer;
use feedback_loop::processing::convolution::{Sampling, Zoom, apply};
use feedback_loop::processing::kernel::{Kernel, OffsetTable, SharpenVariant};
use feedback_loop::seed::{random_seed, seed_rng};

const SAMPLINGS: [Sampling; 2] = [Sampling::Nearest, Sampling::Linear];

fn flat(width: u32, height: u32, value: f32) -> ImageBuffer {
    ImageBuffer::from_unit(
        width,
        height,
        &vec![value; width as usize * height as usize * 4],
    )
    .unwrap()
}

fn noise(width: u32, height: u32, seed: u64) -> ImageBuffer {
    let data = random_seed(width, height, &mut seed_rng(Some(seed)));
    ImageBuffer::from_rgba8(width, height, &data).unwrap()
}

fn convolve(src: &ImageBuffer, kernel: &Kernel, zoom: Option<Zoom>, sampling: Sampling) -> ImageBuffer {
    let mut dst = ImageBuffer::new(src.width(), src.height()).unwrap();
    apply(src, kernel, &OffsetTable::EIGHT_CONNECTED, zoom, sampling, &mut dst);
    dst
}

fn kernels() -> [Kernel; 3] {
    [
        Kernel::BLUR,
        Kernel::sharpen(SharpenVariant::Gentle),
        Kernel::sharpen(SharpenVariant::Strong),
    ]
}

#[test]
fn output_channels_stay_in_unit_range() {
    let src = noise(13, 9, 42);
    for kernel in kernels() {
        for sampling in SAMPLINGS {
            for zoom in [None, Some(Zoom::default()), Some(Zoom::new(0.5).unwrap())] {
                let out = convolve(&src, &kernel, zoom, sampling);
                for px in out.pixels() {
                    for c in px {
                        assert!((0.0..=1.0).contains(c), "channel {c} out of range");
                    }
                }
            }
        }
    }
}

#[test]
fn blur_preserves_flat_field() {
    for value in [0.0, 0.2, 0.5, 0.73, 1.0] {
        let src = flat(6, 5, value);
        for sampling in SAMPLINGS {
            for zoom in [None, Some(Zoom::default())] {
                let out = convolve(&src, &Kernel::BLUR, zoom, sampling);
                for px in out.pixels() {
                    for c in &px[..3] {
                        assert!((c - value).abs() < 1e-6, "expected {value}, got {c}");
                    }
                }
            }
        }
    }
}

#[test]
fn sharpen_preserves_flat_field() {
    for variant in [SharpenVariant::Gentle, SharpenVariant::Strong] {
        let kernel = Kernel::sharpen(variant);
        assert!(kernel.is_dc_preserving());
        let src = flat(5, 5, 0.4);
        let out = convolve(&src, &kernel, None, Sampling::Linear);
        for px in out.pixels() {
            for c in &px[..3] {
                assert!((c - 0.4).abs() < 1e-6, "{variant:?} changed flat field: {c}");
            }
        }
    }
}

#[test]
fn corner_dot_spreads_to_three_clamped_neighbours() {
    let mut src = ImageBuffer::new(4, 4).unwrap();
    src.set(0, 0, [1.0, 1.0, 1.0, 1.0]);
    for sampling in SAMPLINGS {
        let out = convolve(&src, &Kernel::BLUR, None, sampling);
        let expect = |x: u32, y: u32| match (x, y) {
            (0, 0) => 9.0 / 16.0,
            (1, 0) | (0, 1) => 3.0 / 16.0,
            (1, 1) => 1.0 / 16.0,
            _ => 0.0,
        };
        for y in 0..4 {
            for x in 0..4 {
                let px = out.get(x, y);
                assert!(
                    (px[0] - expect(x, y)).abs() < 1e-6,
                    "({x}, {y}) = {} with {sampling:?}",
                    px[0]
                );
            }
        }
    }
}

#[test]
fn sharpen_dot_amplifies_centre_and_clamps_neighbours() {
    let mut src = ImageBuffer::new(4, 4).unwrap();
    src.set(1, 1, [0.3, 0.3, 0.3, 1.0]);
    let out = convolve(&src, &Kernel::sharpen(SharpenVariant::Gentle), None, Sampling::Nearest);
    assert!((out.get(1, 1)[0] - 0.9).abs() < 1e-6);
    for (x, y) in [(0, 1), (2, 1), (1, 0), (1, 2)] {
        assert_eq!(out.get(x, y)[0], 0.0, "negative lobe at ({x}, {y}) not clamped");
    }
}

#[test]
fn alpha_is_forced_opaque() {
    let src = ImageBuffer::new(3, 3).unwrap();
    assert!(src.pixels().iter().all(|p| p[3] == 0.0));
    for kernel in kernels() {
        let out = convolve(&src, &kernel, Some(Zoom::default()), Sampling::Linear);
        assert!(out.pixels().iter().all(|p| p[3] == 1.0));
    }
}

#[test]
fn source_is_left_untouched() {
    let src = noise(7, 7, 3);
    let before = src.clone();
    let _ = convolve(&src, &Kernel::BLUR, Some(Zoom::default()), Sampling::Linear);
    assert_eq!(src, before);
}

#[test]
fn unit_zoom_matches_no_zoom() {
    let src = noise(8, 4, 11);
    for sampling in SAMPLINGS {
        let plain = convolve(&src, &Kernel::BLUR, None, sampling);
        let zoomed = convolve(&src, &Kernel::BLUR, Some(Zoom::new(1.0).unwrap()), sampling);
        for (a, b) in plain.pixels().iter().zip(zoomed.pixels()) {
            for c in 0..4 {
                assert!((a[c] - b[c]).abs() < 1e-6);
            }
        }
    }
}

#[test]
fn strong_zoom_samples_only_the_centre() {
    // 8x8, flat 0.6 block over texels 2..6, black elsewhere.
    let mut src = ImageBuffer::new(8, 8).unwrap();
    for y in 2..6 {
        for x in 2..6 {
            src.set(x, y, [0.6, 0.6, 0.6, 1.0]);
        }
    }
    let zoom = Zoom::new(0.01).unwrap();
    for sampling in SAMPLINGS {
        let out = convolve(&src, &Kernel::BLUR, Some(zoom), sampling);
        for px in out.pixels() {
            assert!((px[0] - 0.6).abs() < 1e-5, "got {} with {sampling:?}", px[0]);
        }
    }
}

#[test]
fn offsets_normalize_by_resolution() {
    let n = OffsetTable::EIGHT_CONNECTED.normalized(4, 8);
    assert_eq!(n[0][0], [-0.25, -0.125]);
    assert_eq!(n[1][1], [0.0, 0.0]);
    assert_eq!(n[2][2], [0.25, 0.125]);
}

#[test]
fn blur_weights_sum_to_normalization() {
    assert_eq!(Kernel::BLUR.weight_sum(), 16.0);
    assert!(Kernel::BLUR.is_dc_preserving());
    assert_eq!(Kernel::sharpen(SharpenVariant::Strong).weights[1][1], 5.0);
    assert_eq!(Kernel::sharpen(SharpenVariant::Gentle).weights[0][1], -0.5);
}

#[test]
#[should_panic(expected = "share dimensions")]
fn mismatched_dimensions_panic() {
    let src = ImageBuffer::new(4, 4).unwrap();
    let mut dst = ImageBuffer::new(4, 5).unwrap();
    apply(
        &src,
        &Kernel::BLUR,
        &OffsetTable::EIGHT_CONNECTED,
        None,
        Sampling::Linear,
        &mut dst,
    );
}
