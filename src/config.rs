//! cardqr runtime configuration handling

use crate::error::{Error, Result};
use crate::generator::BatchSettings;
use crate::ident::{self, DEFAULT_ID_WIDTH};
use crate::qr::{ErrorCorrection, MAX_BORDER, MAX_MODULE_SIZE, SymbolStyle};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://ecalde.github.io/ar-business-cards/";

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardQrConfig {
    /// Which cards to generate and where
    pub batch: BatchOptions,
    /// Symbol encoding and rendering
    pub symbol: SymbolOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl CardQrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No cardqr.toml / cardqr.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["cardqr.toml", "cardqr.yaml", "cardqr.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("cardqr");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.batch.apply_env_overrides();
        self.symbol.apply_env_overrides();
        self.logging.apply_env_overrides();
    }

    /// Reject settings the generator cannot honour.
    pub fn validate(&self) -> Result<()> {
        let batch = &self.batch;

        if batch.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if batch.id_width == 0 {
            return Err(Error::Config("id_width must be at least 1".to_string()));
        }
        if batch.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        if !(1..=MAX_MODULE_SIZE).contains(&self.symbol.module_size) {
            return Err(Error::Config(format!(
                "module_size must be between 1 and {MAX_MODULE_SIZE}, got {}",
                self.symbol.module_size
            )));
        }
        if self.symbol.border > MAX_BORDER {
            return Err(Error::Config(format!(
                "border must be at most {MAX_BORDER} modules, got {}",
                self.symbol.border
            )));
        }
        if batch.range_start <= batch.range_end
            && !ident::fits_width(batch.range_end, batch.id_width)
        {
            return Err(Error::Config(format!(
                "range_end {} does not fit in {} digits; raise id_width",
                batch.range_end, batch.id_width
            )));
        }

        Ok(())
    }

    /// Resolve the settings handed to the batch generator.
    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            base_url: self.batch.base_url.clone(),
            output_dir: self.batch.output_dir.clone(),
            range_start: self.batch.range_start,
            range_end: self.batch.range_end,
            id_width: self.batch.id_width,
            style: self.symbol.style(),
        }
    }
}

/// Card range, naming and output location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// URL prefix; `?id=<identifier>` is appended verbatim
    pub base_url: String,
    /// Directory that receives the images
    pub output_dir: PathBuf,
    /// First card number (inclusive)
    pub range_start: u32,
    /// Last card number (inclusive)
    pub range_end: u32,
    /// Zero-padding width of the card number
    pub id_width: usize,
    /// Maximum number of cards rendered at once
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("qrs"),
            range_start: 1,
            range_end: 60,
            id_width: DEFAULT_ID_WIDTH,
            jobs: 1,
        }
    }
}

impl BatchOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("CARDQR_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(dir) = env::var("CARDQR_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(start) = env::var("CARDQR_RANGE_START") {
            if let Ok(parsed) = start.parse::<u32>() {
                self.range_start = parsed;
            }
        }
        if let Ok(end) = env::var("CARDQR_RANGE_END") {
            if let Ok(parsed) = end.parse::<u32>() {
                self.range_end = parsed;
            }
        }
        if let Ok(width) = env::var("CARDQR_ID_WIDTH") {
            if let Ok(parsed) = width.parse::<usize>() {
                self.id_width = parsed;
            }
        }
        if let Ok(jobs) = env::var("CARDQR_JOBS") {
            if let Ok(parsed) = jobs.parse::<usize>() {
                self.jobs = parsed.max(1);
            }
        }
    }
}

/// Symbol encoding overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOptions {
    /// Error-correction level (L, M, Q, H)
    pub error_correction: ErrorCorrection,
    /// Pixels per module
    pub module_size: u32,
    /// Quiet zone in modules
    pub border: u32,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        let style = SymbolStyle::default();
        Self {
            error_correction: style.error_correction,
            module_size: style.module_size,
            border: style.border,
        }
    }
}

impl SymbolOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("CARDQR_EC_LEVEL") {
            if let Some(parsed) = ErrorCorrection::parse(&level) {
                self.error_correction = parsed;
            }
        }
        if let Ok(size) = env::var("CARDQR_MODULE_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.module_size = parsed;
            }
        }
        if let Ok(border) = env::var("CARDQR_BORDER") {
            if let Ok(parsed) = border.parse::<u32>() {
                self.border = parsed;
            }
        }
    }

    /// Style handed to the encoder.
    pub fn style(&self) -> SymbolStyle {
        SymbolStyle {
            error_correction: self.error_correction,
            module_size: self.module_size,
            border: self.border,
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `CARDQR_LOG_LEVEL`)
    pub level: String,
    /// Optional run log receiving the same events as the console
    pub file: Option<PathBuf>,
    /// Force ANSI colors in console logging
    pub color: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("CARDQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("CARDQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("CARDQR_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_card_series() {
        let config = CardQrConfig::default();
        assert_eq!(config.batch.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.batch.output_dir, PathBuf::from("qrs"));
        assert_eq!((config.batch.range_start, config.batch.range_end), (1, 60));
        assert_eq!(config.symbol.style(), SymbolStyle::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[batch]
base_url = "https://example.org/cards/"
range_end = 3

[symbol]
error_correction = "h"
module_size = 8
"#
        )
        .unwrap();

        let config = CardQrConfig::from_file(file.path()).unwrap();
        assert_eq!(config.batch.base_url, "https://example.org/cards/");
        assert_eq!(config.batch.range_start, 1);
        assert_eq!(config.batch.range_end, 3);
        assert_eq!(config.symbol.error_correction, ErrorCorrection::H);
        assert_eq!(config.symbol.module_size, 8);
        assert_eq!(config.symbol.border, 2);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "batch:\n  output_dir: out\n  range_start: 5\n  range_end: 5\nlogging:\n  file: logs/run.log\n"
        )
        .unwrap();

        let config = CardQrConfig::from_file(file.path()).unwrap();
        assert_eq!(config.batch.output_dir, PathBuf::from("out"));
        assert_eq!((config.batch.range_start, config.batch.range_end), (5, 5));
        assert_eq!(config.logging.file, Some(PathBuf::from("logs/run.log")));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = CardQrConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_range_wider_than_id() {
        let mut config = CardQrConfig::default();
        config.batch.range_end = 1000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.batch.id_width = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_allows_empty_range() {
        let mut config = CardQrConfig::default();
        config.batch.range_start = 10;
        config.batch.range_end = 9;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CardQrConfig::default();
        config.batch.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = CardQrConfig::default();
        config.symbol.module_size = 0;
        assert!(config.validate().is_err());

        let mut config = CardQrConfig::default();
        config.batch.jobs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_symbol_geometry() {
        let mut config = CardQrConfig::default();
        config.symbol.module_size = MAX_MODULE_SIZE;
        config.symbol.border = MAX_BORDER;
        assert!(config.validate().is_ok());

        config.symbol.module_size = u32::MAX;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.symbol.module_size = 16;
        config.symbol.border = u32::MAX / 2;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_batch_settings_carry_style() {
        let mut config = CardQrConfig::default();
        config.symbol.border = 0;
        let settings = config.batch_settings();
        assert_eq!(settings.style.border, 0);
        assert_eq!(settings.range_end, 60);
    }
}
