//! 3x3 kernel weights and the sample offsets they are applied at.

use serde::Deserialize;

/// Immutable 3x3 filter with its own output normalization.
///
/// Weights are row-major: `weights[y][x]` with `(1, 1)` at the center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    pub weights: [[f32; 3]; 3],
    pub normalization: f32,
}

impl Kernel {
    /// Binomial smoothing kernel, weights sum to 16.
    pub const BLUR: Self = Self {
        weights: [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]],
        normalization: 16.0,
    };

    /// Sharpening kernel for the chosen variant. Both variants sum to 1.
    #[must_use]
    pub const fn sharpen(variant: SharpenVariant) -> Self {
        let (center, edge) = match variant {
            SharpenVariant::Gentle => (3.0, -0.5),
            SharpenVariant::Strong => (5.0, -1.0),
        };
        Self {
            weights: [[0.0, edge, 0.0], [edge, center, edge], [0.0, edge, 0.0]],
            normalization: 1.0,
        }
    }

    #[must_use]
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().flatten().sum()
    }

    /// True when a flat field passes through unchanged.
    #[must_use]
    pub fn is_dc_preserving(&self) -> bool {
        (self.weight_sum() - self.normalization).abs() <= f32::EPSILON * 16.0
    }
}

/// Magnitude of the sharpen stage relative to the blur decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SharpenVariant {
    /// Center 3, orthogonal neighbors -0.5.
    #[default]
    Gentle,
    /// Center 5, orthogonal neighbors -1.
    Strong,
}

/// Per-cell sample displacement in texels, laid out like [`Kernel::weights`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetTable {
    pub texels: [[[f32; 2]; 3]; 3],
}

impl OffsetTable {
    /// The eight-connected neighborhood plus the center.
    pub const EIGHT_CONNECTED: Self = Self {
        texels: [
            [[-1.0, -1.0], [0.0, -1.0], [1.0, -1.0]],
            [[-1.0, 0.0], [0.0, 0.0], [1.0, 0.0]],
            [[-1.0, 1.0], [0.0, 1.0], [1.0, 1.0]],
        ],
    };

    /// Offsets in normalized image space (`texels / resolution`).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized(&self, width: u32, height: u32) -> [[[f32; 2]; 3]; 3] {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        self.texels.map(|row| row.map(|[dx, dy]| [dx / w, dy / h]))
    }
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self::EIGHT_CONNECTED
    }
}
