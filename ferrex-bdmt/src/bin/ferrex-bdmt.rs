//! `ferrex-bdmt`: print disc titles for one or more Blu-ray roots.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ferrex_bdmt::{Locator, LocatorConfig, get_disc_titles};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "ferrex-bdmt",
    about = "Print Blu-ray disc titles from bdmt_eng.xml metadata"
)]
struct Cli {
    /// Disc root directories to inspect
    #[arg(required = true)]
    directories: Vec<PathBuf>,
    /// Print a JSON array instead of tab separated lines
    #[arg(long)]
    json: bool,
    /// Locator config file (TOML or JSON); defaults to env lookup
    #[arg(long)]
    config: Option<PathBuf>,
    /// Follow symbolic links during the recursive search
    #[arg(long)]
    follow_links: bool,
    /// Maximum depth for the recursive search
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match cli.config.as_deref() {
        Some(path) => LocatorConfig::load_from_file(path)?,
        None => {
            let (config, source) = LocatorConfig::load_from_env()?;
            debug!("Locator config source: {:?}", source);
            config
        }
    };
    if cli.follow_links {
        config.follow_links = true;
    }
    if let Some(depth) = cli.max_depth {
        config.max_depth = Some(depth);
    }

    let locator = Locator::from_config(config);
    let results = get_disc_titles(&locator, &cli.directories);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!(
                "{}\t{}",
                result.directory.display(),
                result.title.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
