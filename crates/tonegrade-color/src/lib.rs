//! Tonegrade Color — three-band color balance.
//!
//! Shadows, midtones and highlights are isolated with Gaussian luminance
//! masks and shifted per RGB channel, optionally restoring the original
//! luminance afterwards.

pub mod balance;
pub mod params;
pub mod tones;

pub use balance::{apply_color_balance, band_mask, luminance, ColorBalance, LUMA_WEIGHTS};
pub use params::{color_balance_params, resolve_params, ParamDescriptor, ParamValue, ParamValues};
pub use tones::{Band, GlobalParameters, ToneAdjustment};
