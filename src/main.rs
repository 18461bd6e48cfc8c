//! txboard main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use txboard_api::start_server;
use txboard_config::error::ConfigError;
use txboard_config::Config;
use txboard_core::{Dashboard, InMemoryStore};

#[derive(Parser, Debug)]
#[command(name = "txboard")]
#[command(version = "0.1.0")]
#[command(about = "Transaction dashboard backend: filtering, reports and a live generator", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if missing {
        log::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let rt = Runtime::new().context("failed to start tokio runtime")?;

    rt.block_on(async {
        let dashboard = Arc::new(Dashboard::new(config, Arc::new(InMemoryStore::new())));
        dashboard.seed().context("failed to seed transactions")?;

        let job = dashboard.spawn_job();
        let served = start_server(Arc::clone(&dashboard)).await;
        job.abort();

        served.context("server error")
    })
}
