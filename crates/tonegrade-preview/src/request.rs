//! Preview-update request and response payloads.
//!
//! Request body:
//! ```json
//! { "key": "colorbalance_W1_5",
//!   "tones": { "shadows": {"r": 0.1, "g": 0, "b": 0}, "midtones": {...}, "highlights": {...} },
//!   "preserve_luminosity": true,
//!   "strength": 1.0 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonegrade_color::{GlobalParameters, ToneAdjustment};
use tonegrade_core::{Result, TonegradeError};

#[derive(Deserialize)]
struct RawPreviewRequest {
    key: Option<String>,
    #[serde(default)]
    tones: Value,
    preserve_luminosity: Option<bool>,
    strength: Option<f32>,
}

/// A validated preview-update request.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub key: String,
    pub tones: ToneAdjustment,
    pub params: GlobalParameters,
}

impl PreviewRequest {
    pub fn new(key: impl Into<String>, tones: ToneAdjustment, params: GlobalParameters) -> Self {
        Self {
            key: key.into(),
            tones,
            params,
        }
    }

    /// Parse and validate a JSON request body.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawPreviewRequest = serde_json::from_str(body)?;
        let key = raw
            .key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TonegradeError::Validation("missing cache key".into()))?;
        let tones = ToneAdjustment::from_value(&raw.tones)?;
        let defaults = GlobalParameters::default();
        Ok(Self {
            key,
            tones,
            params: GlobalParameters {
                preserve_luminosity: raw
                    .preserve_luminosity
                    .unwrap_or(defaults.preserve_luminosity),
                strength: raw.strength.unwrap_or(defaults.strength),
            },
        })
    }
}

/// Why a preview could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewErrorKind {
    /// Bad request payload.
    Invalid,
    /// Nothing cached for the key; the node has to run first.
    NotFound,
    /// The encoder collaborator failed.
    Encoder,
}

impl PreviewErrorKind {
    pub fn of(err: &TonegradeError) -> Self {
        match err {
            TonegradeError::NotFound(_) => Self::NotFound,
            TonegradeError::Encoder(_) => Self::Encoder,
            TonegradeError::Validation(_)
            | TonegradeError::DimensionMismatch { .. }
            | TonegradeError::Serialization(_) => Self::Invalid,
        }
    }
}

/// Response body handed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PreviewResponse {
    Success {
        #[serde(rename = "updatedimage")]
        updated_image: String,
    },
    Error {
        kind: PreviewErrorKind,
        message: String,
    },
}

impl PreviewResponse {
    pub fn from_error(err: &TonegradeError) -> Self {
        Self::Error {
            kind: PreviewErrorKind::of(err),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// HTTP-style status a transport layer can use.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Error {
                kind: PreviewErrorKind::NotFound,
                ..
            } => 404,
            Self::Error {
                kind: PreviewErrorKind::Invalid,
                ..
            } => 400,
            Self::Error {
                kind: PreviewErrorKind::Encoder,
                ..
            } => 500,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
