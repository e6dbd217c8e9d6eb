//! Host-facing parameter schema for the color balance node.

use crate::tones::{Band, GlobalParameters, ToneAdjustment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameter value types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
}

impl ParamValue {
    pub fn as_f32(self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(v),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

/// Parameter descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub display_name: String,
    pub default: ParamValue,
    pub min: Option<ParamValue>,
    pub max: Option<ParamValue>,
    pub step: Option<f32>,
}

impl ParamDescriptor {
    fn float(name: String, display_name: String, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            display_name,
            default: ParamValue::Float(default),
            min: Some(ParamValue::Float(min)),
            max: Some(ParamValue::Float(max)),
            step: Some(0.01),
        }
    }

    /// Clamp a float value into this parameter's range.
    pub fn clamp(&self, value: f32) -> f32 {
        let lo = self.min.and_then(ParamValue::as_f32).unwrap_or(f32::MIN);
        let hi = self.max.and_then(ParamValue::as_f32).unwrap_or(f32::MAX);
        value.clamp(lo, hi)
    }
}

/// Descriptors for the nine band sliders plus the two global controls.
pub fn color_balance_params() -> Vec<ParamDescriptor> {
    let mut params = Vec::with_capacity(11);
    for band in Band::ALL {
        for (channel, label) in [("r", "Red"), ("g", "Green"), ("b", "Blue")] {
            params.push(ParamDescriptor::float(
                format!("{}_{channel}", band.name()),
                format!("{} {label}", band.display_name()),
                0.0,
                -1.0,
                1.0,
            ));
        }
    }
    params.push(ParamDescriptor {
        name: "preserve_luminosity".into(),
        display_name: "Preserve Luminosity".into(),
        default: ParamValue::Bool(true),
        min: None,
        max: None,
        step: None,
    });
    params.push(ParamDescriptor::float(
        "strength".into(),
        "Strength".into(),
        1.0,
        0.0,
        4.0,
    ));
    params
}

/// Collection of parameter values keyed by descriptor name.
pub type ParamValues = HashMap<String, ParamValue>;

/// Resolve named values into typed parameters, falling back to defaults and
/// clamping floats into their declared range.
pub fn resolve_params(values: &ParamValues) -> (ToneAdjustment, GlobalParameters) {
    let descriptors = color_balance_params();
    let float = |name: &str| {
        descriptors
            .iter()
            .find(|d| d.name == name)
            .map(|d| {
                let v = values
                    .get(name)
                    .and_then(|v| v.as_f32())
                    .or_else(|| d.default.as_f32())
                    .unwrap_or(0.0);
                d.clamp(v)
            })
            .unwrap_or(0.0)
    };

    let mut tones = ToneAdjustment::NEUTRAL;
    for band in Band::ALL {
        let rgb = tones.band_mut(band);
        for (slot, channel) in rgb.iter_mut().zip(["r", "g", "b"]) {
            *slot = float(&format!("{}_{channel}", band.name()));
        }
    }

    let globals = GlobalParameters {
        preserve_luminosity: values
            .get("preserve_luminosity")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
        strength: float("strength"),
    };
    (tones, globals)
}
