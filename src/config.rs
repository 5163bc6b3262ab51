use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::pipeline::{PipelineSettings, StageOrder};
use crate::processing::convolution::{Sampling, Zoom};
use crate::processing::kernel::SharpenVariant;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Feedback buffer width in pixels.
    pub width: u32,
    /// Feedback buffer height in pixels.
    pub height: u32,
    /// Per-frame contraction applied before the blur stage, in (0, 1].
    pub zoom: f32,
    /// Which stage runs first inside a frame.
    pub stage_order: StageOrder,
    /// Sharpen kernel strength.
    pub sharpen: SharpenVariant,
    /// Texture filtering used when zoomed samples fall between texels.
    pub sampling: Sampling,
    /// Optional deterministic seed for the initial noise.
    pub seed: Option<u64>,
    /// Open the viewer as a borderless fullscreen window.
    pub fullscreen: bool,
    /// Fixed frame cadence; unset means one frame per vsync.
    #[serde(with = "humantime_serde")]
    pub frame_interval: Option<Duration>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.width > 0, "width must be greater than zero");
        ensure!(self.height > 0, "height must be greater than zero");
        ensure!(
            self.zoom > 0.0 && self.zoom <= 1.0,
            "zoom must lie in (0, 1], got {}",
            self.zoom
        );
        if let Some(interval) = self.frame_interval {
            ensure!(
                interval > Duration::ZERO,
                "frame-interval must be greater than zero"
            );
        }
        Ok(self)
    }

    pub fn pipeline_settings(&self) -> Result<PipelineSettings> {
        let zoom = Zoom::new(self.zoom).context("invalid zoom")?;
        Ok(PipelineSettings {
            sharpen: self.sharpen,
            order: self.stage_order,
            zoom,
            sampling: self.sampling,
        })
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            zoom: Zoom::DEFAULT_FACTOR,
            stage_order: StageOrder::default(),
            sharpen: SharpenVariant::default(),
            sampling: Sampling::default(),
            seed: None,
            fullscreen: false,
            frame_interval: None,
        }
    }
}
