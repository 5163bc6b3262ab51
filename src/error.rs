use thiserror::Error;

/// Library error type for pipeline construction.
///
/// Everything here is rejected before the first frame runs; once a
/// [`FeedbackPipeline`](crate::pipeline::FeedbackPipeline) exists it has no
/// recoverable failure paths.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Width or height was zero.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Seed data does not hold exactly `width * height * 4` samples.
    #[error("seed buffer holds {actual} samples, expected {expected}")]
    SeedLength { expected: usize, actual: usize },

    /// Zoom factor outside (0, 1].
    #[error("zoom factor {0} must lie in (0, 1]")]
    InvalidZoom(f32),
}
