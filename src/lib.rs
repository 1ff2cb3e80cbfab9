pub mod cli;
pub mod core;
pub mod providers;
pub mod render;

use crate::core::config::AppConfig;
use crate::core::{Converter, CurrencyFormatter};
use crate::providers::{EcbRateSource, RateCache};
use crate::render::TagRenderer;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        from: String,
        to: String,
        amount: f64,
    },
    Render {
        input: Option<PathBuf>,
    },
    Rates,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("forex starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // One rate cache for the whole run, shared by everything that converts
    let rates = Arc::new(RateCache::new(EcbRateSource::from_config(&config.source)));
    let converter = Converter::new(Arc::clone(&rates));
    let formatter = CurrencyFormatter::new(config.locale.clone());

    match command {
        AppCommand::Convert { from, to, amount } => {
            anyhow::ensure!(
                amount.is_finite(),
                "Amount to convert must be a finite number, got {amount}"
            );
            let output =
                cli::convert::convert_amount(&converter, &formatter, &from, &to, amount).await;
            if let Some(notice) = &output.notice {
                eprintln!("{notice}");
            }
            println!("{}", output.display);
        }
        AppCommand::Render { input } => {
            let text = read_input(input.as_ref()).await?;
            let renderer = TagRenderer::new(converter, formatter);
            print!("{}", renderer.render(&text).await);
        }
        AppCommand::Rates => {
            let table = rates.ensure_loaded().await;
            if table.is_empty() {
                anyhow::bail!("No exchange rates available from {}", config.source.url);
            }
            println!("{}", table.display_as_table());
        }
    }
    Ok(())
}

async fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read standard input")?;
            Ok(text)
        }
    }
}
