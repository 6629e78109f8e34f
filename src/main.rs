//! cardqr command-line entrypoint

use anyhow::Context;
use cardqr::{BatchGenerator, CardQrConfig, ErrorCorrection, QrEncoder, logging};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "cardqr",
    version,
    about = "Generate one QR code PNG per card number"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to cardqr.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// URL prefix; `?id=<identifier>` is appended
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory receiving the images
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// First card number (inclusive)
    #[arg(long, value_name = "N")]
    start: Option<u32>,

    /// Last card number (inclusive)
    #[arg(long, value_name = "N")]
    end: Option<u32>,

    /// Digits in the zero-padded card number
    #[arg(long, value_name = "DIGITS")]
    id_width: Option<usize>,

    /// Error-correction level (L, M, Q, H)
    #[arg(long, value_name = "LEVEL")]
    ec_level: Option<ErrorCorrection>,

    /// Pixels per module
    #[arg(long, value_name = "PX")]
    module_size: Option<u32>,

    /// Quiet zone width in modules
    #[arg(long, value_name = "MODULES")]
    border: Option<u32>,

    /// Render up to this many cards at once
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Print the planned cards without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the generation report as JSON instead of the status line
    #[arg(long)]
    json: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut CardQrConfig) {
        if let Some(ref url) = self.base_url {
            config.batch.base_url = url.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.batch.output_dir = dir.clone();
        }
        if let Some(start) = self.start {
            config.batch.range_start = start;
        }
        if let Some(end) = self.end {
            config.batch.range_end = end;
        }
        if let Some(width) = self.id_width {
            config.batch.id_width = width;
        }
        if let Some(jobs) = self.jobs {
            config.batch.jobs = jobs;
        }
        if let Some(level) = self.ec_level {
            config.symbol.error_correction = level;
        }
        if let Some(size) = self.module_size {
            config.symbol.module_size = size;
        }
        if let Some(border) = self.border {
            config.symbol.border = border;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CardQrConfig::load(cli.config.as_deref()).context("Loading configuration")?;
    cli.apply(&mut config);

    let _log_guard = logging::init(&config.logging)?;
    config.validate()?;

    let generator = BatchGenerator::new(config.batch_settings(), QrEncoder::new());

    if cli.dry_run {
        let plan = generator.plan();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            for job in &plan {
                println!("{} {} {}", job.identifier, job.file_name, job.payload);
            }
        }
        return Ok(());
    }

    info!(?config, "Starting cardqr");

    // Ctrl-C stops new cards from starting; the run future is still awaited so
    // cards already being written finish before the process exits.
    let stop = generator.stop_handle();
    let run = generator.run_concurrent(config.batch.jobs);
    tokio::pin!(run);
    let report = tokio::select! {
        report = &mut run => report?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; finishing cards already in progress");
            stop.stop();
            run.await?
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Done: {}", report.output_dir.display());
    }

    Ok(())
}
