//! QR code encoder

use crate::qr::{EncodeFailure, SymbolEncoder, SymbolStyle};
use image::{GrayImage, ImageBuffer, Luma};
use qrcode::{Color, QrCode};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// QR code encoder backed by the `qrcode` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl QrEncoder {
    /// Create a new QR encoder
    pub fn new() -> Self {
        Self
    }
}

impl SymbolEncoder for QrEncoder {
    fn encode(&self, payload: &str, style: &SymbolStyle) -> Result<GrayImage, EncodeFailure> {
        // Version is left to the encoder: smallest one that fits at this level.
        let code =
            QrCode::with_error_correction_level(payload.as_bytes(), style.error_correction.into())
                .map_err(|e| EncodeFailure(format!("Failed to create QR code: {}", e)))?;

        let modules = code.width() as u32;
        let colors = code.to_colors();
        let border = style.border;
        let module_size = style.module_size.max(1);
        let side = border
            .checked_mul(2)
            .and_then(|quiet| quiet.checked_add(modules))
            .and_then(|span| span.checked_mul(module_size))
            .ok_or_else(|| {
                EncodeFailure(format!(
                    "Image too large: {modules} modules + {border} border at {module_size}px"
                ))
            })?;

        let image = ImageBuffer::from_fn(side, side, |x, y| {
            let (mx, my) = (x / module_size, y / module_size);
            if mx < border || my < border || mx >= border + modules || my >= border + modules {
                return LIGHT;
            }
            let offset = ((my - border) * modules + (mx - border)) as usize;
            match colors[offset] {
                Color::Dark => DARK,
                Color::Light => LIGHT,
            }
        });

        tracing::trace!(
            version = ?code.version(),
            modules,
            side,
            "Rendered QR symbol"
        );

        Ok(image)
    }
}
