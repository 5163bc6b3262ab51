//! Fixed-size RGBA image buffers used by the feedback pipeline.
//!
//! Pixels are stored row-major as `[r, g, b, a]` with every channel in
//! `[0, 1]`. Dimensions are fixed at construction; nothing in this module
//! resizes a buffer after the fact.

use image::RgbaImage;

use crate::error::Error;

/// One RGBA pixel, channels normalized to `[0, 1]`.
pub type Rgba = [f32; 4];

/// Owned RGBA image with fixed dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl ImageBuffer {
    /// Allocate a zero-filled (transparent black) buffer.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![[0.0; 4]; len],
        })
    }

    /// Build a buffer from interleaved 8-bit RGBA samples.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimensions`] for zero dimensions and
    /// [`Error::SeedLength`] when `data` is not `width * height * 4` long.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self, Error> {
        let len = pixel_count(width, height)?;
        check_len(len, data.len())?;
        let pixels = data
            .chunks_exact(4)
            .map(|px| {
                [
                    f32::from(px[0]) / 255.0,
                    f32::from(px[1]) / 255.0,
                    f32::from(px[2]) / 255.0,
                    f32::from(px[3]) / 255.0,
                ]
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer from interleaved RGBA samples already in `[0, 1]`.
    ///
    /// Out-of-range and NaN samples are clamped so the buffer invariant holds.
    ///
    /// # Errors
    /// Same as [`ImageBuffer::from_rgba8`].
    pub fn from_unit(width: u32, height: u32, data: &[f32]) -> Result<Self, Error> {
        let len = pixel_count(width, height)?;
        check_len(len, data.len())?;
        let pixels = data
            .chunks_exact(4)
            .map(|px| [unit(px[0]), unit(px[1]), unit(px[2]), unit(px[3])])
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Import an `image` crate RGBA8 buffer.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimensions`] for an empty image.
    pub fn from_rgba_image(img: &RgbaImage) -> Result<Self, Error> {
        Self::from_rgba8(img.width(), img.height(), img.as_raw())
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the buffer.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.index(x, y)]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the buffer.
    pub fn set(&mut self, x: u32, y: u32, value: Rgba) {
        let idx = self.index(x, y);
        self.pixels[idx] = value;
    }

    /// Row-major pixel slice.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Borrow a read-only view of this buffer.
    #[must_use]
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }

    /// Copy every pixel of `other` into `self` without reallocating.
    ///
    /// # Panics
    /// Panics if the two buffers differ in size.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "copy_from requires identical dimensions"
        );
        self.pixels.copy_from_slice(&other.pixels);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

/// Read-only view onto a buffer, handed to presentation each frame.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    width: u32,
    height: u32,
    pixels: &'a [Rgba],
}

impl<'a> ImageView<'a> {
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// # Panics
    /// Panics if the coordinate is outside the view.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of view");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    #[must_use]
    pub const fn pixels(&self) -> &'a [Rgba] {
        self.pixels
    }

    /// Quantize into interleaved RGBA8, rounding to nearest.
    ///
    /// # Panics
    /// Panics if `out` is not `width * height * 4` bytes.
    pub fn write_rgba8(&self, out: &mut [u8]) {
        assert_eq!(
            out.len(),
            self.pixels.len() * 4,
            "rgba8 target has the wrong length"
        );
        for (dst, px) in out.chunks_exact_mut(4).zip(self.pixels) {
            for (d, c) in dst.iter_mut().zip(px) {
                *d = quantize(*c);
            }
        }
    }

    /// Copy into an `image` crate buffer.
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        self.write_rgba8(&mut img);
        img
    }

    /// Detach the view into an owned buffer.
    #[must_use]
    pub fn to_owned_buffer(&self) -> ImageBuffer {
        ImageBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.to_vec(),
        }
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, Error> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(width as usize * height as usize)
}

fn check_len(pixels: usize, actual: usize) -> Result<(), Error> {
    let expected = pixels * 4;
    if actual != expected {
        return Err(Error::SeedLength { expected, actual });
    }
    Ok(())
}

fn unit(c: f32) -> f32 {
    if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(c: f32) -> u8 {
    (unit(c) * 255.0).round() as u8
}
