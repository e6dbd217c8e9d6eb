//! Aspect-preserving bilinear resize into a preview box.
//!
//! The binding dimension is set to the box edge and the other follows the
//! source aspect ratio. Sources smaller than the box are enlarged by the
//! same rule; callers that must never upsample clamp the box first.

use rayon::prelude::*;
use tonegrade_core::limits::PARALLEL_THRESHOLD;
use tonegrade_core::{ImageBuffer, Result, Rgb, TonegradeError};

/// Target size of `width × height` fitted to a `max_w × max_h` box.
pub fn preview_size(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    let (mw, mh) = (f64::from(max_w), f64::from(max_h));
    let aspect = w / h;
    let (tw, th) = if w / mw > h / mh {
        (mw, round_half_even(mw / aspect))
    } else {
        (round_half_even(mh * aspect), mh)
    };
    ((tw as u32).max(1), (th as u32).max(1))
}

/// Round to nearest, ties to even.
fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (r - x).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        r
    }
}

/// Resize every image in the batch to fit `max_w × max_h`.
pub fn downscale(image: &ImageBuffer, max_w: u32, max_h: u32) -> Result<ImageBuffer> {
    if max_w == 0 || max_h == 0 {
        return Err(TonegradeError::Validation(format!(
            "preview box must be non-empty, got {max_w}x{max_h}"
        )));
    }
    if image.pixels().is_empty() {
        return Err(TonegradeError::Validation("cannot downscale an empty image".into()));
    }
    let (tw, th) = preview_size(image.width(), image.height(), max_w, max_h);
    resize_bilinear(image, tw, th)
}

/// Source sample positions for one output axis.
#[derive(Debug, Clone, Copy)]
struct Tap {
    i0: usize,
    i1: usize,
    /// Weight of `i1`.
    t: f32,
}

/// Pixel-center sampling: `src = (dst + 0.5) · in/out − 0.5`, clamped at 0.
fn taps(src_len: u32, dst_len: u32) -> Vec<Tap> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len as usize - 1;
    (0..dst_len)
        .map(|d| {
            let src = ((d as f32 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (src as usize).min(last);
            let i1 = if i0 < last { i0 + 1 } else { i0 };
            Tap {
                i0,
                i1,
                t: src - i0 as f32,
            }
        })
        .collect()
}

#[inline]
fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let s = 1.0 - t;
    [s * a[0] + t * b[0], s * a[1] + t * b[1], s * a[2] + t * b[2]]
}

/// Bilinear resize of every image in the batch to `tw × th`.
pub fn resize_bilinear(image: &ImageBuffer, tw: u32, th: u32) -> Result<ImageBuffer> {
    let shape = image.shape();
    if tw == 0 || th == 0 || shape.pixel_count() == 0 {
        return Err(TonegradeError::Validation(format!(
            "cannot resize {}x{} to {tw}x{th}",
            shape.width, shape.height
        )));
    }
    let src_w = shape.width as usize;
    let xs = taps(shape.width, tw);
    let ys = taps(shape.height, th);
    let rows_per_image = th as usize;

    let fill_row = |row_index: usize, row: &mut [Rgb]| {
        let batch = row_index / rows_per_image;
        let ty = ys[row_index % rows_per_image];
        let base = batch * shape.pixels_per_image();
        let pixels = image.pixels();
        let row0 = &pixels[base + ty.i0 * src_w..base + (ty.i0 + 1) * src_w];
        let row1 = &pixels[base + ty.i1 * src_w..base + (ty.i1 + 1) * src_w];
        for (out, tx) in row.iter_mut().zip(&xs) {
            let top = lerp(row0[tx.i0], row0[tx.i1], tx.t);
            let bottom = lerp(row1[tx.i0], row1[tx.i1], tx.t);
            *out = lerp(top, bottom, ty.t);
        }
    };

    let mut out = vec![[0.0f32; 3]; shape.batch * tw as usize * th as usize];
    if out.len() >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(tw as usize)
            .enumerate()
            .for_each(|(i, row)| fill_row(i, row));
    } else {
        for (i, row) in out.chunks_mut(tw as usize).enumerate() {
            fill_row(i, row);
        }
    }

    ImageBuffer::from_batch(shape.batch, tw, th, out)
}
