pub mod buffer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod seed;
pub mod processing {
    pub mod convolution;
    pub mod kernel;
}
pub mod render {
    pub mod viewer;
}

pub use buffer::{ImageBuffer, ImageView, Rgba};
pub use error::Error;
pub use pipeline::{FeedbackPipeline, PipelineSettings, Slot, Stage, StageOrder};
pub use processing::convolution::{Sampling, Zoom};
pub use processing::kernel::{Kernel, OffsetTable, SharpenVariant};
