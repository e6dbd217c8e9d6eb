//! Apply and preview-update operations.
//!
//! `apply` runs once per host execution: it caches the full-resolution
//! input and grades it. `render_preview` runs per slider tick: it reads the
//! cached source, downscales it and grades the small copy. Previews never
//! write to the cache.

use crate::cache::SharedPreviewCache;
use crate::config::PreviewConfig;
use crate::downscale::downscale;
use crate::request::{PreviewRequest, PreviewResponse};
use serde_json::Value;
use tonegrade_color::{ColorBalance, GlobalParameters, ToneAdjustment};
use tonegrade_core::{ImageBuffer, Result, TonegradeError};
use tracing::{debug, info, warn};

/// Turns a rendered preview into a transportable string (e.g. a PNG data URI).
pub trait PreviewEncoder: Send + Sync {
    fn encode(&self, image: &ImageBuffer) -> Result<String>;
}

/// Result of the host-facing apply operation.
///
/// A failed apply hands back the untouched input together with the error,
/// so the host graph keeps running on bad interactive input.
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    Applied {
        image: ImageBuffer,
        key: String,
    },
    Failed {
        original: ImageBuffer,
        key: Option<String>,
        error: TonegradeError,
    },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// The image the host should pass downstream.
    pub fn image(&self) -> &ImageBuffer {
        match self {
            Self::Applied { image, .. } => image,
            Self::Failed { original, .. } => original,
        }
    }

    pub fn into_image(self) -> ImageBuffer {
        match self {
            Self::Applied { image, .. } => image,
            Self::Failed { original, .. } => original,
        }
    }

    /// Cache key for later preview requests, if the source was cached.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Applied { key, .. } => Some(key),
            Self::Failed { key, .. } => key.as_deref(),
        }
    }

    pub fn error(&self) -> Option<&TonegradeError> {
        match self {
            Self::Applied { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Human-readable status for the host UI.
    pub fn message(&self) -> String {
        match self {
            Self::Applied { .. } => "Color balance applied!".to_string(),
            Self::Failed { error, .. } => format!("Failed to apply color balance: {error}"),
        }
    }
}

/// Orchestrates the apply and preview-update paths over a shared cache.
pub struct PreviewService {
    cache: SharedPreviewCache,
    preview_box: (u32, u32),
}

impl PreviewService {
    pub fn new(cache: SharedPreviewCache, config: &PreviewConfig) -> Self {
        info!(
            capacity = cache.capacity(),
            preview_w = config.preview_box.0,
            preview_h = config.preview_box.1,
            "Preview service initialized"
        );
        Self {
            cache,
            preview_box: config.preview_box,
        }
    }

    pub fn cache(&self) -> &SharedPreviewCache {
        &self.cache
    }

    pub fn preview_box(&self) -> (u32, u32) {
        self.preview_box
    }

    /// Cache `image` for the owner/node pair and grade it at full resolution.
    ///
    /// Non-finite parameters fail softly: the input comes back unchanged
    /// with the error attached. The source is cached before grading, so
    /// previews stay available after a failed apply. An empty image is
    /// rejected the same way but never cached.
    pub fn apply(
        &self,
        image: &ImageBuffer,
        owner_id: Option<&str>,
        node_id: &str,
        tones: &ToneAdjustment,
        params: &GlobalParameters,
    ) -> ApplyOutcome {
        if let Err(error) = validate_image(image) {
            return reject_uncached(image, error);
        }
        let key = self.cache.put(owner_id, node_id, image);
        match validate_params(tones, params) {
            Ok(()) => {
                let adjusted = ColorBalance::new(tones, params).apply(image);
                debug!(key = %key, "Color balance applied");
                ApplyOutcome::Applied {
                    image: adjusted,
                    key,
                }
            }
            Err(error) => {
                warn!(key = %key, %error, "Color balance failed, passing input through");
                ApplyOutcome::Failed {
                    original: image.clone(),
                    key: Some(key),
                    error,
                }
            }
        }
    }

    /// [`apply`](Self::apply) with loosely typed tone data from a host.
    ///
    /// Malformed tones yield a failed outcome carrying the original image.
    pub fn apply_value(
        &self,
        image: &ImageBuffer,
        owner_id: Option<&str>,
        node_id: &str,
        tones: &Value,
        params: &GlobalParameters,
    ) -> ApplyOutcome {
        if let Err(error) = validate_image(image) {
            return reject_uncached(image, error);
        }
        match ToneAdjustment::from_value(tones) {
            Ok(tones) => self.apply(image, owner_id, node_id, &tones, params),
            Err(error) => {
                let key = self.cache.put(owner_id, node_id, image);
                warn!(key = %key, %error, "Rejected tone adjustments, passing input through");
                ApplyOutcome::Failed {
                    original: image.clone(),
                    key: Some(key),
                    error,
                }
            }
        }
    }

    /// Downscaled, graded preview of the cached source for `key`.
    pub fn render_preview(
        &self,
        key: &str,
        tones: &ToneAdjustment,
        params: &GlobalParameters,
    ) -> Result<ImageBuffer> {
        validate_params(tones, params)?;
        let source = self.cache.get(key).map_err(|e| {
            warn!(key, "Preview requested for uncached key");
            e
        })?;
        let (max_w, max_h) = self.preview_box;
        let small = downscale(&source, max_w, max_h)?;
        let preview = ColorBalance::new(tones, params).apply(&small);
        debug!(
            key,
            width = preview.width(),
            height = preview.height(),
            "Rendered preview"
        );
        Ok(preview)
    }

    /// Render and encode a preview, folding failures into an error response.
    pub fn render_encoded<E>(&self, request: &PreviewRequest, encoder: &E) -> PreviewResponse
    where
        E: PreviewEncoder + ?Sized,
    {
        let result = self
            .render_preview(&request.key, &request.tones, &request.params)
            .and_then(|preview| encoder.encode(&preview));
        match result {
            Ok(updated_image) => PreviewResponse::Success { updated_image },
            Err(err) => PreviewResponse::from_error(&err),
        }
    }

    /// Handle a raw JSON preview-update body end to end.
    pub fn handle_request<E>(&self, body: &str, encoder: &E) -> PreviewResponse
    where
        E: PreviewEncoder + ?Sized,
    {
        match PreviewRequest::from_json(body) {
            Ok(request) => self.render_encoded(&request, encoder),
            Err(err) => {
                debug!(%err, "Rejected preview request");
                PreviewResponse::from_error(&err)
            }
        }
    }
}

fn validate_image(image: &ImageBuffer) -> Result<()> {
    if image.pixels().is_empty() {
        let shape = image.shape();
        return Err(TonegradeError::Validation(format!(
            "image must be non-empty, got batch={} {}x{}",
            shape.batch, shape.width, shape.height
        )));
    }
    Ok(())
}

/// Failed outcome for input that is not worth caching.
fn reject_uncached(image: &ImageBuffer, error: TonegradeError) -> ApplyOutcome {
    warn!(%error, "Rejected image, passing input through");
    ApplyOutcome::Failed {
        original: image.clone(),
        key: None,
        error,
    }
}

fn validate_params(tones: &ToneAdjustment, params: &GlobalParameters) -> Result<()> {
    if !params.strength.is_finite() {
        return Err(TonegradeError::Validation(format!(
            "strength must be finite, got {}",
            params.strength
        )));
    }
    for band in tonegrade_color::Band::ALL {
        if tones.band(band).iter().any(|v| !v.is_finite()) {
            return Err(TonegradeError::Validation(format!(
                "tone adjustment '{}' must be finite",
                band.name()
            )));
        }
    }
    Ok(())
}
