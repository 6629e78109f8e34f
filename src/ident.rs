//! Card identifier, payload URL and file name construction
//!
//! Everything here is pure so the naming scheme can be checked without
//! touching the filesystem or the encoder.

/// Prefix placed in front of every zero-padded card number
pub const ID_PREFIX: &str = "card_";

/// Default number of digits in a card number
pub const DEFAULT_ID_WIDTH: usize = 3;

/// Format a card identifier, e.g. `card_007` for `(7, 3)`.
pub fn format_identifier(index: u32, width: usize) -> String {
    format!("{ID_PREFIX}{index:0width$}")
}

/// Whether `index` renders in `width` digits without growing the identifier.
pub fn fits_width(index: u32, width: usize) -> bool {
    index.to_string().len() <= width
}

/// Build the URL encoded into a card's QR symbol.
pub fn payload_url(base_url: &str, identifier: &str) -> String {
    format!("{base_url}?id={identifier}")
}

/// Output file name for a card identifier.
pub fn file_name(identifier: &str) -> String {
    format!("qr_{identifier}.png")
}
