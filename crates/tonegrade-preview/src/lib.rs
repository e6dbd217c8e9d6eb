//! Tonegrade Preview — low-resolution re-renders of cached images.
//!
//! The apply step stores each node's full-resolution input in a bounded
//! [`PreviewCache`]. Interactive clients then request downscaled,
//! re-graded previews by cache key without resending the source image.

pub mod cache;
pub mod config;
pub mod downscale;
pub mod latest;
pub mod request;
pub mod service;

pub use cache::{PreviewCache, SharedPreviewCache};
pub use config::PreviewConfig;
pub use downscale::{downscale, preview_size};
pub use latest::{LatestRequests, PreviewTicket};
pub use request::{PreviewErrorKind, PreviewRequest, PreviewResponse};
pub use service::{ApplyOutcome, PreviewEncoder, PreviewService};
