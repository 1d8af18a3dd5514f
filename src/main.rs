use clap::Parser;
use cli::Args;
use indicatif::ProgressStyle;
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod cli;
mod config;
mod deployment;
mod environment;
mod error;
mod ethers_utils;
mod forge_utils;
mod report;
mod serde_utils;
mod types;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new().with_progress_style(
        ProgressStyle::with_template(
            "{spinner:.green} {span_child_prefix}{span_name}{{{span_fields}}} [{elapsed}]",
        )?,
    );

    let filter = log_filter(
        &std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();

    match deployment::run_deployment(args).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!("{:?}", err);
            std::process::exit(1)
        }
    }
}

/// Warnings show up unless `RUST_LOG` says otherwise
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}
