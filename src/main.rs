use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use lyrebird::app::{build_connector_registry, App};
use lyrebird::cli::{Cli, Commands, ConfigPathArg};
use lyrebird::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Check(args) => check(args),
        Commands::Venues(args) => venues(args).await,
    }
}

async fn run(args: ConfigPathArg) -> anyhow::Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.init_logging();
    info!("lyrebird starting");

    App::run(config).await?;

    info!("lyrebird stopped");
    Ok(())
}

fn check(args: ConfigPathArg) -> anyhow::Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    println!(
        "config ok: {} venue(s), {} symbol(s), mode {}",
        config.venues.len(),
        config.monitor.symbols.len(),
        config.router.mode.as_str(),
    );
    Ok(())
}

async fn venues(args: ConfigPathArg) -> anyhow::Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let registry = build_connector_registry(&config.venues);
    let timeout = Duration::from_millis(config.aggregation.per_call_timeout_ms);

    let symbol: lyrebird::domain::Symbol = config
        .monitor
        .symbols
        .first()
        .map(|s| s.as_str().into())
        .context("no symbols configured")?;

    for (venue, connector) in registry.all() {
        match connector.get_ticker(&symbol, timeout).await {
            Ok(quote) => println!("{venue}: ok, {} @ {}", symbol, quote.price()),
            Err(e) => println!("{venue}: unreachable ({e})"),
        }
    }
    Ok(())
}
