//! Batch generation of card QR images
//!
//! A run is: create the output directory once, then for every card number in
//! the range build the identifier and payload, encode it, and write
//! `qr_<identifier>.png`. Cards are independent, so [`BatchGenerator::run_concurrent`]
//! may render several at a time once the directory exists.

use crate::error::{Error, Result};
use crate::ident;
use crate::qr::{SymbolEncoder, SymbolStyle};
use image::ImageFormat;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Everything the generator needs to know about a run
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// URL prefix for every payload
    pub base_url: String,
    /// Directory receiving the images
    pub output_dir: PathBuf,
    /// First card number (inclusive)
    pub range_start: u32,
    /// Last card number (inclusive); below `range_start` means nothing to do
    pub range_end: u32,
    /// Zero-padding width of the card number
    pub id_width: usize,
    /// Encoding and raster parameters
    pub style: SymbolStyle,
}

/// One planned card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardJob {
    /// Card number
    pub index: u32,
    /// Formatted identifier, e.g. `card_001`
    pub identifier: String,
    /// URL encoded in the symbol
    pub payload: String,
    /// File name inside the output directory
    pub file_name: String,
}

/// One card written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCard {
    /// Card number
    pub index: u32,
    /// Formatted identifier
    pub identifier: String,
    /// URL encoded in the symbol
    pub payload: String,
    /// Full path of the written image
    pub path: PathBuf,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Absolute, resolved output directory
    pub output_dir: PathBuf,
    /// Cards in ascending card-number order
    pub cards: Vec<GeneratedCard>,
}

/// Asks a running [`BatchGenerator::run_concurrent`] to stop starting new cards.
///
/// Cards already being rendered finish and stay on disk; the run then returns
/// [`Error::Interrupted`].
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the stop. Idempotent.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Generates one image per card number using an injected encoder
pub struct BatchGenerator<E> {
    settings: BatchSettings,
    encoder: Arc<E>,
    stop: StopHandle,
}

impl<E> BatchGenerator<E>
where
    E: SymbolEncoder + 'static,
{
    /// Create a generator for `settings` rendering through `encoder`.
    pub fn new(settings: BatchSettings, encoder: E) -> Self {
        Self {
            settings,
            encoder: Arc::new(encoder),
            stop: StopHandle(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Handle that stops this generator's concurrent runs.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Ordered list of cards a run would produce. Performs no I/O.
    pub fn plan(&self) -> Vec<CardJob> {
        let settings = &self.settings;
        (settings.range_start..=settings.range_end)
            .map(|index| {
                let identifier = ident::format_identifier(index, settings.id_width);
                CardJob {
                    index,
                    payload: ident::payload_url(&settings.base_url, &identifier),
                    file_name: ident::file_name(&identifier),
                    identifier,
                }
            })
            .collect()
    }

    /// Create the output directory if needed and return its canonical path.
    pub fn prepare_output_dir(&self) -> Result<PathBuf> {
        let dir = &self.settings.output_dir;
        fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreation {
            path: dir.clone(),
            source,
        })?;
        fs::canonicalize(dir).map_err(|source| Error::DirectoryCreation {
            path: dir.clone(),
            source,
        })
    }

    /// Generate every card in order on the calling thread.
    pub fn run(&self) -> Result<GenerationReport> {
        let output_dir = self.prepare_output_dir()?;
        let jobs = self.plan();
        info!(
            output_dir = %output_dir.display(),
            cards = jobs.len(),
            "Generating card QR codes"
        );

        let cards = jobs
            .iter()
            .map(|job| write_card(self.encoder.as_ref(), &self.settings.style, &output_dir, job))
            .collect::<Result<Vec<_>>>()?;

        Ok(GenerationReport { output_dir, cards })
    }

    /// Generate cards with up to `jobs` renders in flight on the blocking pool.
    ///
    /// The output directory is created before any task starts. After the
    /// first failure, or a [`StopHandle::stop`], no further card is started;
    /// cards already in flight are awaited before returning, so nothing is
    /// written once this future resolves.
    pub async fn run_concurrent(&self, jobs: usize) -> Result<GenerationReport> {
        let output_dir = self.prepare_output_dir()?;
        let planned = self.plan();
        let total = planned.len();
        info!(
            output_dir = %output_dir.display(),
            cards = total,
            jobs,
            "Generating card QR codes"
        );

        let permits = Arc::new(Semaphore::new(jobs.max(1)));
        let failed = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        for job in planned {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| Error::Other(format!("Generation semaphore closed: {e}")))?;
            // A failing task raises `failed` before releasing its permit.
            if failed.load(Ordering::Acquire) || self.stop.is_stopped() {
                break;
            }

            let encoder = Arc::clone(&self.encoder);
            let style = self.settings.style;
            let dir = output_dir.clone();
            let failed = Arc::clone(&failed);
            let stop = self.stop.clone();

            tasks.spawn_blocking(move || {
                let _permit = permit;
                if failed.load(Ordering::Acquire) || stop.is_stopped() {
                    return None;
                }
                let outcome = write_card(encoder.as_ref(), &style, &dir, &job);
                if outcome.is_err() {
                    failed.store(true, Ordering::Release);
                }
                Some(outcome)
            });
        }

        let mut cards = Vec::with_capacity(tasks.len());
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(Ok(card))) => cards.push(card),
                Ok(Some(Err(err))) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(Error::Other(format!("Generation task failed: {e}")));
                    }
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        if cards.len() < total {
            warn!(written = cards.len(), "Generation stopped early");
            return Err(Error::Interrupted {
                written: cards.len(),
            });
        }

        cards.sort_by_key(|card| card.index);
        Ok(GenerationReport { output_dir, cards })
    }
}

/// Encode and write a single card into `dir`.
pub fn write_card<E>(
    encoder: &E,
    style: &SymbolStyle,
    dir: &Path,
    job: &CardJob,
) -> Result<GeneratedCard>
where
    E: SymbolEncoder + ?Sized,
{
    let image = encoder
        .encode(&job.payload, style)
        .map_err(|e| Error::QrEncode {
            identifier: job.identifier.clone(),
            reason: e.to_string(),
        })?;

    let path = dir.join(&job.file_name);
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| Error::Write {
            identifier: job.identifier.clone(),
            path: path.clone(),
            reason: e.to_string(),
        })?;

    debug!(identifier = %job.identifier, path = %path.display(), "Wrote card");

    Ok(GeneratedCard {
        index: job.index,
        identifier: job.identifier.clone(),
        payload: job.payload.clone(),
        path,
    })
}
