//! cardqr - batch generator for sequential card QR codes
//!
//! Every card number in a range becomes an identifier such as `card_001`, a
//! payload URL `{base_url}?id=card_001`, and a PNG `qr_card_001.png` in the
//! output directory. Runs are deterministic, so re-running overwrites earlier
//! output with identical files.
//!
//! # Example
//!
//! ```no_run
//! use cardqr::{BatchGenerator, CardQrConfig, QrEncoder};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = CardQrConfig::load(None)?;
//!     config.validate()?;
//!
//!     let generator = BatchGenerator::new(config.batch_settings(), QrEncoder::new());
//!     let report = generator.run()?;
//!
//!     println!("Done: {}", report.output_dir.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod generator;
pub mod ident;
pub mod logging;
pub mod qr;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{BatchOptions, CardQrConfig, LoggingOptions, SymbolOptions};
pub use generator::{
    BatchGenerator, BatchSettings, CardJob, GeneratedCard, GenerationReport, StopHandle,
};
pub use qr::{
    EncodeFailure, ErrorCorrection, MAX_BORDER, MAX_MODULE_SIZE, QrEncoder, SymbolEncoder,
    SymbolStyle,
};
