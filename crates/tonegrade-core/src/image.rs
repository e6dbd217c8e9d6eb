//! Batched RGB float image buffers.
//!
//! Every buffer carries a batch dimension. A single image is a batch of
//! one, so operations never need to promote or squeeze shapes.

use crate::error::{Result, TonegradeError};
use serde::{Deserialize, Serialize};

/// One pixel as (R, G, B) samples, nominally in [0, 1].
pub type Rgb = [f32; 3];

/// Batch, height and width of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageShape {
    pub batch: usize,
    pub height: u32,
    pub width: u32,
}

impl ImageShape {
    /// Pixels in a single image of the batch.
    #[inline]
    pub fn pixels_per_image(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixels across the whole batch.
    #[inline]
    pub fn pixel_count(self) -> usize {
        self.pixels_per_image() * self.batch
    }
}

/// A stack of `batch` images of `height × width` RGB float pixels.
///
/// Pixels are stored row-major, image after image. Cloning performs a
/// deep copy, so a clone never aliases the buffer it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    shape: ImageShape,
    pixels: Vec<Rgb>,
}

impl ImageBuffer {
    /// Create a black single image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0; 3])
    }

    /// Create a single image where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgb: Rgb) -> Self {
        let shape = ImageShape {
            batch: 1,
            height,
            width,
        };
        Self {
            pixels: vec![rgb; shape.pixel_count()],
            shape,
        }
    }

    /// Wrap a single image's pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        Self::from_batch(1, width, height, pixels)
    }

    /// Wrap a pre-batched stack of images.
    pub fn from_batch(batch: usize, width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        if batch == 0 || width == 0 || height == 0 {
            return Err(TonegradeError::Validation(format!(
                "image must be non-empty, got batch={batch} {width}x{height}"
            )));
        }
        let shape = ImageShape {
            batch,
            height,
            width,
        };
        if pixels.len() != shape.pixel_count() {
            return Err(TonegradeError::DimensionMismatch {
                expected: shape.pixel_count() * 3,
                got: pixels.len() * 3,
            });
        }
        Ok(Self { shape, pixels })
    }

    /// Build from interleaved `R, G, B, R, G, B, ...` samples.
    ///
    /// The batch size is inferred from the sample count.
    pub fn from_samples(width: u32, height: u32, samples: &[f32]) -> Result<Self> {
        let per_image = width as usize * height as usize * 3;
        if per_image == 0 || samples.is_empty() || samples.len() % per_image != 0 {
            return Err(TonegradeError::Validation(format!(
                "expected a whole number of {width}x{height} RGB images \
                 ({per_image} samples each), got {} samples",
                samples.len()
            )));
        }
        let pixels: &[Rgb] = bytemuck::try_cast_slice(samples).map_err(|e| {
            TonegradeError::Validation(format!("samples are not RGB triples: {e}"))
        })?;
        Self::from_batch(samples.len() / per_image, width, height, pixels.to_vec())
    }

    /// Horizontal luminance ramp with a vertical blue ramp, useful as a test card.
    pub fn gradient(width: u32, height: u32) -> Self {
        let w = width.max(2) as f32 - 1.0;
        let h = height.max(2) as f32 - 1.0;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let t = x as f32 / w;
                let v = y as f32 / h;
                pixels.push([t, t * 0.9 + 0.05, t * (1.0 - v) + v * 0.5]);
            }
        }
        Self {
            shape: ImageShape {
                batch: 1,
                height,
                width,
            },
            pixels,
        }
    }

    #[inline]
    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.shape.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.shape.height
    }

    #[inline]
    pub fn batch_len(&self) -> usize {
        self.shape.batch
    }

    /// All pixels across the batch.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Interleaved sample view of the whole batch.
    pub fn as_samples(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixels of one image in the batch.
    pub fn image(&self, index: usize) -> Option<&[Rgb]> {
        let n = self.shape.pixels_per_image();
        self.pixels.get(index * n..(index + 1) * n)
    }

    /// Pixel of the first image at (x, y).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[y as usize * self.shape.width as usize + x as usize]
    }

    /// Memory held by pixel data in bytes.
    pub fn memory_size(&self) -> usize {
        std::mem::size_of_val(self.pixels.as_slice())
    }

    /// Quantize the first image to interleaved 8-bit RGB for encoders.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let n = self.shape.pixels_per_image();
        let mut out = Vec::with_capacity(n * 3);
        for px in &self.pixels[..n] {
            for &c in px {
                out.push((c.clamp(0.0, 1.0) * 255.0) as u8);
            }
        }
        out
    }
}
