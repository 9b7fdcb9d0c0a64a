use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use clinic_cell::fixtures::meddent_catalog;
use clinic_cell::Catalog;
use commands::Cli;
use shared_config::AppConfig;

fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let catalog = Arc::new(load_catalog(&config)?);

    let output = commands::run(cli.command, &config, catalog)?;
    println!("{}", output);
    Ok(())
}

fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    let path = Path::new(&config.catalog_path);
    if path.exists() {
        return Ok(Catalog::from_path(path)?);
    }

    warn!(
        "Catalog {} not found, falling back to the built-in MedDent catalog",
        path.display()
    );
    let catalog = meddent_catalog()?;
    info!("Loaded built-in catalog with {} clinic(s)", catalog.clinics().len());
    Ok(catalog)
}
