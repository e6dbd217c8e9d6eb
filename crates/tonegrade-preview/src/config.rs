//! Preview subsystem configuration.

use serde::{Deserialize, Serialize};
use tonegrade_core::limits::{CACHE_KEY_PREFIX, MAX_CACHE_ITEMS, PREVIEW_RESOLUTION};
use tonegrade_core::{Result, TonegradeError};

/// Cache capacity, preview size and key layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Maximum cached full-resolution images.
    pub max_items: usize,
    /// Bounding box (width, height) for preview renders.
    pub preview_box: (u32, u32),
    /// Fixed prefix of every cache key.
    pub key_prefix: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_items: MAX_CACHE_ITEMS,
            preview_box: (PREVIEW_RESOLUTION, PREVIEW_RESOLUTION),
            key_prefix: CACHE_KEY_PREFIX.to_string(),
        }
    }
}

impl PreviewConfig {
    /// Parse from JSON, filling omitted fields with defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_items == 0 {
            return Err(TonegradeError::Validation(
                "max_items must be at least 1".into(),
            ));
        }
        if self.preview_box.0 == 0 || self.preview_box.1 == 0 {
            return Err(TonegradeError::Validation(format!(
                "preview box must be non-empty, got {}x{}",
                self.preview_box.0, self.preview_box.1
            )));
        }
        if self.key_prefix.is_empty() {
            return Err(TonegradeError::Validation("key_prefix must not be empty".into()));
        }
        Ok(())
    }
}
