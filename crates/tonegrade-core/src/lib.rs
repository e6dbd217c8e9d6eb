//! Tonegrade Core - Foundation types for tonal color grading
//!
//! This crate provides the fundamental types used throughout tonegrade:
//! - Batched RGB float image buffers
//! - The shared error type and `Result` alias
//! - Process-wide limits for the preview cache

pub mod error;
pub mod image;

pub use error::{Result, TonegradeError};
pub use image::{ImageBuffer, ImageShape, Rgb};

/// Limits and defaults shared by the apply and preview paths.
pub mod limits {
    /// Maximum number of full-resolution images held by the preview cache.
    pub const MAX_CACHE_ITEMS: usize = 10;

    /// Bounding box edge (pixels) for preview renders.
    pub const PREVIEW_RESOLUTION: u32 = 512;

    /// Fixed prefix of every preview cache key.
    pub const CACHE_KEY_PREFIX: &str = "colorbalance";

    /// Owner placeholder used when the host has no session identifier.
    pub const UNKNOWN_OWNER: &str = "unknown";

    /// Pixel count at which per-pixel loops switch to rayon.
    pub const PARALLEL_THRESHOLD: usize = 64 * 1024;
}
