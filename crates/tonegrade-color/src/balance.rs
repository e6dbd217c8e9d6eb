//! Shadow/midtone/highlight color balance.
//!
//! For every pixel:
//! 1. `L = 0.3R + 0.59G + 0.11B` from the input.
//! 2. Each band gets a Gaussian weight `exp(-(L - center)² / (2·0.25²))`.
//! 3. Bands are applied in order, `c += amount · 0.25 · mask · strength`.
//! 4. With luminosity preservation the luminance delta is added back to
//!    all three channels.
//! 5. Samples are clamped to [0, 1].

use crate::tones::{Band, GlobalParameters, ToneAdjustment};
use glam::Vec3;
use rayon::prelude::*;
use tonegrade_core::limits::PARALLEL_THRESHOLD;
use tonegrade_core::{ImageBuffer, Rgb};

/// Luminance weights for R, G, B.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.3, 0.59, 0.11);

/// Standard deviation of every band mask.
const BAND_WIDTH: f32 = 0.25;

/// Scale applied to a band amount before masking.
const AMOUNT_SCALE: f32 = 0.25;

/// Perceived brightness of an RGB triple.
#[inline]
pub fn luminance(rgb: Rgb) -> f32 {
    Vec3::from(rgb).dot(LUMA_WEIGHTS)
}

/// Weight in (0, 1] of `lum` belonging to `band`.
#[inline]
pub fn band_mask(lum: f32, band: Band) -> f32 {
    let d = lum - band.center();
    (-(d * d) / (2.0 * BAND_WIDTH * BAND_WIDTH)).exp()
}

/// A configured color balance, ready to run over pixels or buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBalance {
    /// Per-band channel shift with amount scale and strength folded in.
    gains: [Vec3; 3],
    preserve_luminosity: bool,
}

impl ColorBalance {
    pub fn new(tones: &ToneAdjustment, params: &GlobalParameters) -> Self {
        let scale = AMOUNT_SCALE * params.strength;
        let gains = Band::ALL.map(|band| Vec3::from(tones.band(band)) * scale);
        Self {
            gains,
            preserve_luminosity: params.preserve_luminosity,
        }
    }

    /// Adjust a single pixel.
    #[inline]
    pub fn process_pixel(&self, rgb: Rgb) -> Rgb {
        let original = Vec3::from(rgb);
        let lum = original.dot(LUMA_WEIGHTS);

        let mut out = original;
        for (band, gain) in Band::ALL.iter().zip(&self.gains) {
            out += *gain * band_mask(lum, *band);
        }

        if self.preserve_luminosity {
            out += Vec3::splat(lum - out.dot(LUMA_WEIGHTS));
        }

        out.clamp(Vec3::ZERO, Vec3::ONE).to_array()
    }

    /// Adjust every image in the batch, returning a new buffer.
    pub fn apply(&self, image: &ImageBuffer) -> ImageBuffer {
        let mut out = image.clone();
        let pixels = out.pixels_mut();
        if pixels.len() >= PARALLEL_THRESHOLD {
            pixels
                .par_iter_mut()
                .for_each(|px| *px = self.process_pixel(*px));
        } else {
            for px in pixels.iter_mut() {
                *px = self.process_pixel(*px);
            }
        }
        tracing::trace!(
            pixels = out.pixels().len(),
            preserve_luminosity = self.preserve_luminosity,
            "Color balance applied"
        );
        out
    }
}

/// Apply a color balance to `image` without touching it.
pub fn apply_color_balance(
    image: &ImageBuffer,
    tones: &ToneAdjustment,
    preserve_luminosity: bool,
    strength: f32,
) -> ImageBuffer {
    ColorBalance::new(tones, &GlobalParameters::new(preserve_luminosity, strength)).apply(image)
}
