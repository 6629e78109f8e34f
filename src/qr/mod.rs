//! QR symbol encoding
//!
//! The generator only talks to the [`SymbolEncoder`] trait; [`QrEncoder`] is
//! the production implementation on top of the `qrcode` crate.

mod encoder;

pub use encoder::QrEncoder;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest accepted module edge in pixels
pub const MAX_MODULE_SIZE: u32 = 256;

/// Largest accepted quiet zone in modules
pub const MAX_BORDER: u32 = 64;

/// QR error-correction level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// Recovers ~7% damage
    #[serde(alias = "l")]
    L,
    /// Recovers ~15% damage
    #[default]
    #[serde(alias = "m")]
    M,
    /// Recovers ~25% damage
    #[serde(alias = "q")]
    Q,
    /// Recovers ~30% damage
    #[serde(alias = "h")]
    H,
}

impl ErrorCorrection {
    /// Parse a level letter (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            format!("Unsupported error correction level '{value}', expected L, M, Q or H")
        })
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(letter)
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

/// How a symbol is encoded and rasterised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStyle {
    /// Error-correction level used when picking the symbol version
    pub error_correction: ErrorCorrection,
    /// Pixels per module edge
    pub module_size: u32,
    /// Quiet zone width in modules
    pub border: u32,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::M,
            module_size: 16,
            border: 2,
        }
    }
}

/// Reason an encoder could not produce a symbol
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct EncodeFailure(pub String);

/// Turns a payload into a black-on-white raster.
pub trait SymbolEncoder: Send + Sync {
    /// Encode `payload` using `style`.
    fn encode(&self, payload: &str, style: &SymbolStyle) -> Result<GrayImage, EncodeFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_correction_parse() {
        assert_eq!("m".parse::<ErrorCorrection>(), Ok(ErrorCorrection::M));
        assert_eq!("H".parse::<ErrorCorrection>(), Ok(ErrorCorrection::H));
        assert!("X".parse::<ErrorCorrection>().is_err());
    }

    #[test]
    fn test_error_correction_serde_accepts_both_cases() {
        let upper: ErrorCorrection = serde_json::from_str("\"Q\"").unwrap();
        let lower: ErrorCorrection = serde_json::from_str("\"q\"").unwrap();
        assert_eq!(upper, ErrorCorrection::Q);
        assert_eq!(lower, ErrorCorrection::Q);
    }

    #[test]
    fn test_default_style() {
        let style = SymbolStyle::default();
        assert_eq!(style.error_correction, ErrorCorrection::M);
        assert_eq!(style.module_size, 16);
        assert_eq!(style.border, 2);
    }
}
