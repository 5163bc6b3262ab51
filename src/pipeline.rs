//! Two-buffer feedback scheduler.
//!
//! The pipeline owns two equally sized buffers, `A` and `B`. Every frame runs
//! two convolution stages back to back: the first reads `A` and writes `B`,
//! the second reads `B` and writes `A`. The source role flips once per
//! stage, so after a complete frame `A` again holds the newest result and is
//! what [`FeedbackPipeline::step`] hands out.

use serde::Deserialize;
use tracing::trace;

use crate::buffer::{ImageBuffer, ImageView};
use crate::error::Error;
use crate::processing::convolution::{self, Sampling, Zoom};
use crate::processing::kernel::{Kernel, OffsetTable, SharpenVariant};

/// One of the two buffer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Convolution stage the pipeline will run next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sharpen,
    Blur,
}

/// Order of the two stages inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageOrder {
    /// Sharpen `A -> B`, then blur with zoom `B -> A`.
    #[default]
    SharpenThenBlur,
    /// Blur with zoom `A -> B`, then sharpen `B -> A`.
    BlurThenSharpen,
}

impl StageOrder {
    #[must_use]
    pub const fn stages(self) -> [Stage; 2] {
        match self {
            Self::SharpenThenBlur => [Stage::Sharpen, Stage::Blur],
            Self::BlurThenSharpen => [Stage::Blur, Stage::Sharpen],
        }
    }
}

/// Construction-time knobs; fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineSettings {
    pub sharpen: SharpenVariant,
    pub order: StageOrder,
    pub zoom: Zoom,
    pub sampling: Sampling,
}

/// Feedback loop over two ping-ponged buffers.
#[derive(Debug)]
pub struct FeedbackPipeline {
    buffers: [ImageBuffer; 2],
    source: Slot,
    stage: usize,
    frames: u64,
    settings: PipelineSettings,
    sharpen: Kernel,
    offsets: OffsetTable,
}

impl FeedbackPipeline {
    /// Seed both slots with identical copies of `seed`.
    #[must_use]
    pub fn new(seed: ImageBuffer, settings: PipelineSettings) -> Self {
        let copy = seed.clone();
        Self {
            buffers: [seed, copy],
            source: Slot::A,
            stage: 0,
            frames: 0,
            sharpen: Kernel::sharpen(settings.sharpen),
            offsets: OffsetTable::EIGHT_CONNECTED,
            settings,
        }
    }

    /// Build from interleaved RGBA8 seed samples.
    ///
    /// # Errors
    /// Rejects zero dimensions and seed data of the wrong length.
    pub fn from_rgba8(
        width: u32,
        height: u32,
        seed: &[u8],
        settings: PipelineSettings,
    ) -> Result<Self, Error> {
        let seed = ImageBuffer::from_rgba8(width, height, seed)?;
        Ok(Self::new(seed, settings))
    }

    /// Advance by exactly one frame and return the new result.
    pub fn step(&mut self) -> ImageView<'_> {
        for _ in 0..2 {
            self.run_stage();
        }
        self.frames += 1;
        trace!(frame = self.frames, "feedback frame complete");
        self.current()
    }

    /// Result of the most recently completed frame (the seed before the first).
    #[must_use]
    pub fn current(&self) -> ImageView<'_> {
        self.buffers[self.source.index()].view()
    }

    /// Stage that the next convolution pass will run.
    #[must_use]
    pub const fn next_stage(&self) -> Stage {
        self.settings.order.stages()[self.stage]
    }

    /// Slot the next convolution pass will read from.
    #[must_use]
    pub const fn source_slot(&self) -> Slot {
        self.source
    }

    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        self.buffers[0].dimensions()
    }

    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn run_stage(&mut self) {
        let stage = self.next_stage();
        let (kernel, zoom) = match stage {
            Stage::Sharpen => (self.sharpen, None),
            Stage::Blur => (Kernel::BLUR, Some(self.settings.zoom)),
        };
        let [a, b] = &mut self.buffers;
        let (src, dst) = match self.source {
            Slot::A => (&*a, b),
            Slot::B => (&*b, a),
        };
        convolution::apply(
            src,
            &kernel,
            &self.offsets,
            zoom,
            self.settings.sampling,
            dst,
        );
        trace!(?stage, source = ?self.source, "convolution stage");
        self.source = self.source.other();
        self.stage = (self.stage + 1) % 2;
    }
}
