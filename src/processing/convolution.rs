//! Single 3x3 convolution pass from one buffer into another.
//!
//! Sample positions are computed in texel space: pixel `(x, y)` sits at
//! `(x + 0.5, y + 0.5)`, the optional zoom contracts that point towards the
//! zoom center, and each kernel cell then adds its texel offset. Every sample
//! is clamped to the edge of the source; there is no wraparound.

use serde::Deserialize;

use crate::buffer::{ImageBuffer, Rgba};
use crate::error::Error;
use crate::processing::kernel::{Kernel, OffsetTable};

/// Center-preserving contraction applied to sample coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    factor: f32,
    center: [f32; 2],
}

impl Zoom {
    pub const DEFAULT_FACTOR: f32 = 0.99;

    /// Zoom about the image midpoint.
    ///
    /// # Errors
    /// Returns [`Error::InvalidZoom`] unless `0 < factor <= 1`.
    pub fn new(factor: f32) -> Result<Self, Error> {
        Self::with_center(factor, [0.5, 0.5])
    }

    /// Zoom about `center`, given in normalized image coordinates.
    ///
    /// # Errors
    /// Returns [`Error::InvalidZoom`] unless `0 < factor <= 1`.
    pub fn with_center(factor: f32, center: [f32; 2]) -> Result<Self, Error> {
        if !(factor.is_finite() && factor > 0.0 && factor <= 1.0) {
            return Err(Error::InvalidZoom(factor));
        }
        Ok(Self { factor, center })
    }

    #[must_use]
    pub const fn factor(&self) -> f32 {
        self.factor
    }

    #[must_use]
    pub const fn center(&self) -> [f32; 2] {
        self.center
    }

    /// Map a normalized coordinate `uv` to `center + (uv - center) * factor`.
    #[must_use]
    pub fn apply(&self, uv: [f32; 2]) -> [f32; 2] {
        [
            self.center[0] + (uv[0] - self.center[0]) * self.factor,
            self.center[1] + (uv[1] - self.center[1]) * self.factor,
        ]
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
            center: [0.5, 0.5],
        }
    }
}

/// How a sample between texel centers is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sampling {
    /// Texel containing the sample point.
    Nearest,
    /// Bilinear blend of the four surrounding texel centers.
    #[default]
    Linear,
}

/// Convolve `source` into `destination`.
///
/// Each output pixel is the clamped, normalized weighted sum of nine source
/// samples; alpha is forced to 1. `source` is never written.
///
/// # Panics
/// Panics if the two buffers differ in size.
#[allow(clippy::cast_precision_loss)]
pub fn apply(
    source: &ImageBuffer,
    kernel: &Kernel,
    offsets: &OffsetTable,
    zoom: Option<Zoom>,
    sampling: Sampling,
    destination: &mut ImageBuffer,
) {
    assert_eq!(
        source.dimensions(),
        destination.dimensions(),
        "convolution source and destination must share dimensions"
    );
    let (width, height) = source.dimensions();
    let (w, h) = (width as f32, height as f32);
    let texels = Texels {
        pixels: source.pixels(),
        width: width as usize,
        height: height as usize,
    };
    let scale = 1.0 / kernel.normalization;

    for (y, row) in destination
        .pixels_mut()
        .chunks_exact_mut(width as usize)
        .enumerate()
    {
        for (x, out) in row.iter_mut().enumerate() {
            let mut px = x as f32 + 0.5;
            let mut py = y as f32 + 0.5;
            if let Some(z) = zoom {
                let [u, v] = z.apply([px / w, py / h]);
                px = u * w;
                py = v * h;
            }

            let mut sum = [0.0f32; 4];
            for (weights, cells) in kernel.weights.iter().zip(&offsets.texels) {
                for (&weight, &[dx, dy]) in weights.iter().zip(cells) {
                    if weight == 0.0 {
                        continue;
                    }
                    let s = texels.sample(px + dx, py + dy, sampling);
                    for c in 0..4 {
                        sum[c] += s[c] * weight;
                    }
                }
            }

            *out = [
                (sum[0] * scale).clamp(0.0, 1.0),
                (sum[1] * scale).clamp(0.0, 1.0),
                (sum[2] * scale).clamp(0.0, 1.0),
                1.0,
            ];
        }
    }
}

struct Texels<'a> {
    pixels: &'a [Rgba],
    width: usize,
    height: usize,
}

impl Texels<'_> {
    fn fetch(&self, x: i64, y: i64) -> Rgba {
        let x = clamp_index(x, self.width);
        let y = clamp_index(y, self.height);
        self.pixels[y * self.width + x]
    }

    #[allow(clippy::cast_possible_truncation)]
    fn sample(&self, sx: f32, sy: f32, sampling: Sampling) -> Rgba {
        match sampling {
            Sampling::Nearest => self.fetch(sx.floor() as i64, sy.floor() as i64),
            Sampling::Linear => {
                let tx = sx - 0.5;
                let ty = sy - 0.5;
                let x0 = tx.floor();
                let y0 = ty.floor();
                let fx = tx - x0;
                let fy = ty - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);
                if fx == 0.0 && fy == 0.0 {
                    return self.fetch(x0, y0);
                }
                let a = self.fetch(x0, y0);
                let b = self.fetch(x0 + 1, y0);
                let c = self.fetch(x0, y0 + 1);
                let d = self.fetch(x0 + 1, y0 + 1);
                let mut out = [0.0; 4];
                for i in 0..4 {
                    let top = a[i] + (b[i] - a[i]) * fx;
                    let bottom = c[i] + (d[i] - c[i]) * fx;
                    out[i] = top + (bottom - top) * fy;
                }
                out
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}
