//! Generate a handful of card QR codes into ./demo_qrs
//!
//! Usage: cargo run --example generate_cards

use cardqr::{BatchGenerator, CardQrConfig, QrEncoder};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = CardQrConfig::default();
    config.batch.base_url = "https://example.org/cards/".to_string();
    config.batch.output_dir = "demo_qrs".into();
    config.batch.range_end = 3;
    config.validate()?;

    let generator = BatchGenerator::new(config.batch_settings(), QrEncoder::new());
    for job in generator.plan() {
        println!("  {} -> {}", job.file_name, job.payload);
    }

    let report = generator.run()?;
    println!("✓ {} QR codes saved to {}", report.cards.len(), report.output_dir.display());

    Ok(())
}
