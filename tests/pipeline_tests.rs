use feedback_loop::buffer::ImageBuffer;
use feedback_loop::error::Error;
use feedback_loop::pipeline::{FeedbackPipeline, PipelineSettings, Slot, Stage, StageOrder};
use feedback_loop::processing::convolution::{Sampling, Zoom};
use feedback_loop::processing::kernel::SharpenVariant;
use feedback_loop::seed::{random_seed, seed_rng};

fn noise_pipeline(width: u32, height: u32, seed: u64, settings: PipelineSettings) -> FeedbackPipeline {
    let data = random_seed(width, height, &mut seed_rng(Some(seed)));
    FeedbackPipeline::from_rgba8(width, height, &data, settings).unwrap()
}

fn nearest() -> PipelineSettings {
    PipelineSettings {
        sampling: Sampling::Nearest,
        ..PipelineSettings::default()
    }
}

#[test]
fn seed_is_visible_before_first_step() {
    let mut seed = ImageBuffer::new(3, 2).unwrap();
    seed.set(2, 1, [0.25, 0.5, 0.75, 1.0]);
    let pipeline = FeedbackPipeline::new(seed.clone(), PipelineSettings::default());
    assert_eq!(pipeline.current().to_owned_buffer(), seed);
    assert_eq!(pipeline.frame_count(), 0);
    assert_eq!(pipeline.dimensions(), (3, 2));
}

#[test]
fn roles_return_to_slot_a_after_each_frame() {
    let mut pipeline = noise_pipeline(8, 8, 1, PipelineSettings::default());
    for frame in 1..=3 {
        assert_eq!(pipeline.source_slot(), Slot::A);
        assert_eq!(pipeline.next_stage(), Stage::Sharpen);
        pipeline.step();
        assert_eq!(pipeline.frame_count(), frame);
    }
    assert_eq!(pipeline.source_slot(), Slot::A);
}

#[test]
fn blur_first_order_starts_with_blur() {
    let settings = PipelineSettings {
        order: StageOrder::BlurThenSharpen,
        ..PipelineSettings::default()
    };
    let mut pipeline = noise_pipeline(8, 8, 1, settings);
    assert_eq!(pipeline.next_stage(), Stage::Blur);
    pipeline.step();
    assert_eq!(pipeline.next_stage(), Stage::Blur);
    assert_eq!(StageOrder::BlurThenSharpen.stages(), [Stage::Blur, Stage::Sharpen]);
}

#[test]
fn all_zero_seed_stays_black() {
    let mut pipeline =
        FeedbackPipeline::from_rgba8(4, 4, &[0u8; 64], PipelineSettings::default()).unwrap();
    let view = pipeline.step();
    for px in view.pixels() {
        assert_eq!(&px[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(px[3], 1.0);
    }
}

#[test]
fn single_dot_is_sharpened_then_blurred() {
    let mut seed = ImageBuffer::new(4, 4).unwrap();
    seed.set(1, 1, [1.0, 1.0, 1.0, 1.0]);
    let mut pipeline = FeedbackPipeline::new(seed, nearest());
    let view = pipeline.step();

    // With nearest sampling a 0.99 zoom on a 4x4 buffer still lands on the
    // same texels, so the 1-2-4 blur profile shows up undistorted.
    let expect = |x: u32, y: u32| match (x, y) {
        (1, 1) => 4.0 / 16.0,
        (0, 1) | (2, 1) | (1, 0) | (1, 2) => 2.0 / 16.0,
        (0, 0) | (2, 0) | (0, 2) | (2, 2) => 1.0 / 16.0,
        _ => 0.0,
    };
    for y in 0..4 {
        for x in 0..4 {
            let px = view.get(x, y);
            for c in &px[..3] {
                assert!((c - expect(x, y)).abs() < 1e-6, "({x}, {y}) = {c}");
            }
        }
    }
}

#[test]
fn single_dot_spreads_into_neighbourhood_with_linear_sampling() {
    let mut seed = ImageBuffer::new(4, 4).unwrap();
    seed.set(1, 1, [1.0, 1.0, 1.0, 1.0]);
    let mut pipeline = FeedbackPipeline::new(seed, PipelineSettings::default());
    let view = pipeline.step();
    let centre = view.get(1, 1)[0];
    for y in 0..3 {
        for x in 0..3 {
            let v = view.get(x, y)[0];
            assert!(v > 0.0, "({x}, {y}) received no energy");
            assert!(v <= centre, "({x}, {y}) brighter than centre");
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    let run = || {
        let mut p = noise_pipeline(24, 16, 99, PipelineSettings::default());
        for _ in 0..5 {
            p.step();
        }
        p.current().to_owned_buffer()
    };
    assert_eq!(run(), run());
}

#[test]
fn long_runs_stay_in_range() {
    let settings = PipelineSettings {
        sharpen: SharpenVariant::Strong,
        zoom: Zoom::new(0.9).unwrap(),
        ..PipelineSettings::default()
    };
    let mut pipeline = noise_pipeline(16, 16, 5, settings);
    for _ in 0..60 {
        pipeline.step();
    }
    for px in pipeline.current().pixels() {
        for c in px {
            assert!(c.is_finite() && (0.0..=1.0).contains(c));
        }
    }
}

#[test]
fn stage_order_changes_the_result() {
    let a = {
        let mut p = noise_pipeline(12, 12, 8, PipelineSettings::default());
        p.step().to_owned_buffer()
    };
    let b = {
        let settings = PipelineSettings {
            order: StageOrder::BlurThenSharpen,
            ..PipelineSettings::default()
        };
        let mut p = noise_pipeline(12, 12, 8, settings);
        p.step().to_owned_buffer()
    };
    assert_ne!(a, b);
}

#[test]
fn rejects_bad_seed_length() {
    let err = FeedbackPipeline::from_rgba8(4, 4, &[0u8; 63], PipelineSettings::default())
        .unwrap_err();
    assert_eq!(
        err,
        Error::SeedLength {
            expected: 64,
            actual: 63
        }
    );
}

#[test]
fn rejects_zero_dimensions() {
    let err = FeedbackPipeline::from_rgba8(0, 4, &[], PipelineSettings::default()).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidDimensions {
            width: 0,
            height: 4
        }
    );
}
