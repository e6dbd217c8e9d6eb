//! Tone bands and the parameters that drive a color balance.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonegrade_core::{Result, Rgb, TonegradeError};

/// One of the three luminance bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Shadows,
    Midtones,
    Highlights,
}

impl Band {
    /// Application order. Later bands see channels already shifted by earlier ones.
    pub const ALL: [Band; 3] = [Band::Shadows, Band::Midtones, Band::Highlights];

    /// Luminance at which this band's mask peaks.
    pub fn center(self) -> f32 {
        match self {
            Self::Shadows => 0.0,
            Self::Midtones => 0.5,
            Self::Highlights => 1.0,
        }
    }

    /// Key used in parameter names and request payloads.
    pub fn name(self) -> &'static str {
        match self {
            Self::Shadows => "shadows",
            Self::Midtones => "midtones",
            Self::Highlights => "highlights",
        }
    }

    /// Display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Shadows => "Shadows",
            Self::Midtones => "Midtones",
            Self::Highlights => "Highlights",
        }
    }
}

/// Per-band RGB shifts, each nominally in [-1, 1].
///
/// Out-of-range values are not rejected; the engine computes with them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToneAdjustment {
    pub shadows: Rgb,
    pub midtones: Rgb,
    pub highlights: Rgb,
}

impl ToneAdjustment {
    /// All bands at zero.
    pub const NEUTRAL: Self = Self {
        shadows: [0.0; 3],
        midtones: [0.0; 3],
        highlights: [0.0; 3],
    };

    pub fn new(shadows: Rgb, midtones: Rgb, highlights: Rgb) -> Self {
        Self {
            shadows,
            midtones,
            highlights,
        }
    }

    /// Build from the host's flat slider order:
    /// `shadows_{r,g,b}, midtones_{r,g,b}, highlights_{r,g,b}`.
    pub fn from_flat(values: [f32; 9]) -> Self {
        Self {
            shadows: [values[0], values[1], values[2]],
            midtones: [values[3], values[4], values[5]],
            highlights: [values[6], values[7], values[8]],
        }
    }

    /// Parse loosely typed tone data.
    ///
    /// Each band may be a 3-element array or an object with `r`, `g`, `b`
    /// keys (a missing channel reads as 0). A missing band or a band of the
    /// wrong arity is a validation error naming that band.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            TonegradeError::Validation("tone adjustments must be an object".into())
        })?;

        let mut tones = Self::NEUTRAL;
        for band in Band::ALL {
            let raw = map.get(band.name()).ok_or_else(|| {
                TonegradeError::Validation(format!(
                    "missing tone adjustment for '{}'",
                    band.name()
                ))
            })?;
            *tones.band_mut(band) = parse_band(band, raw)?;
        }
        Ok(tones)
    }

    pub fn band(&self, band: Band) -> Rgb {
        match band {
            Band::Shadows => self.shadows,
            Band::Midtones => self.midtones,
            Band::Highlights => self.highlights,
        }
    }

    pub fn band_mut(&mut self, band: Band) -> &mut Rgb {
        match band {
            Band::Shadows => &mut self.shadows,
            Band::Midtones => &mut self.midtones,
            Band::Highlights => &mut self.highlights,
        }
    }

    /// Whether every shift is exactly zero.
    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

fn parse_band(band: Band, raw: &Value) -> Result<Rgb> {
    let malformed = || {
        TonegradeError::Validation(format!(
            "tone adjustment '{}' must be a list of 3 values",
            band.name()
        ))
    };

    match raw {
        Value::Array(items) => {
            if items.len() != 3 {
                return Err(malformed());
            }
            let mut rgb = [0.0; 3];
            for (slot, item) in rgb.iter_mut().zip(items) {
                *slot = item.as_f64().ok_or_else(malformed)? as f32;
            }
            Ok(rgb)
        }
        Value::Object(channels) => {
            let mut rgb = [0.0; 3];
            for (slot, key) in rgb.iter_mut().zip(["r", "g", "b"]) {
                if let Some(v) = channels.get(key) {
                    *slot = v.as_f64().ok_or_else(|| {
                        TonegradeError::Validation(format!(
                            "tone adjustment '{}' channel '{key}' must be a number",
                            band.name()
                        ))
                    })? as f32;
                }
            }
            Ok(rgb)
        }
        _ => Err(malformed()),
    }
}

/// Settings that apply across all bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    /// Cancel the net brightness shift introduced by the band adjustments.
    pub preserve_luminosity: bool,
    /// Multiplier on every band shift, nominally in [0, 4].
    pub strength: f32,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            preserve_luminosity: true,
            strength: 1.0,
        }
    }
}

impl GlobalParameters {
    pub fn new(preserve_luminosity: bool, strength: f32) -> Self {
        Self {
            preserve_luminosity,
            strength,
        }
    }
}
