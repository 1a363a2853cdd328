//! Adjustments CLI
//!
//! Evaluates an order fixture against configured promotions and tax rates and prints the
//! resulting adjustments.

use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use adjustments::{
    config::{AdjustmentConfig, OrderFixture},
    evaluation::Evaluator,
    promotions::registry::PromotionRegistry,
    report::write_report,
};

/// Evaluate an order against promotions and tax rates
#[derive(Debug, Parser)]
#[command(name = "adjust", about = "Evaluate order adjustments", long_about = None)]
struct Args {
    /// Path to a YAML file of promotions and tax rates
    #[arg(short, long)]
    config: PathBuf,

    /// Path to a YAML order fixture
    #[arg(short, long)]
    order: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let registry = PromotionRegistry::with_defaults();

    let config = AdjustmentConfig::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let (promotions, tax_rates) = config.build(&registry)?;

    for promotion in &promotions {
        let unresolved = promotion.unresolved_codes();

        if !unresolved.is_empty() {
            info!(
                promotion = %promotion.name(),
                ?unresolved,
                "promotion references unregistered codes"
            );
        }
    }

    let fixture = OrderFixture::from_path(&args.order)
        .with_context(|| format!("loading {}", args.order.display()))?;

    let zone = fixture.zone;
    let mut order = fixture.into_order()?;

    let evaluation = Evaluator::new(promotions, tax_rates).evaluate(&mut order, zone)?;

    write_report(io::stdout().lock(), &order, &evaluation)?;

    Ok(())
}
