//! Endpoint Documentation CLI
//!
//! Renders the endpoint documentation for a resource catalog to an RST file
//! compatible with `sphinxcontrib.httpdomain`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use resdoc::{DocConfig, ResourceCatalog, RstRenderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resdoc-rst")]
#[command(about = "Generate endpoint documentation from a resource catalog")]
struct Cli {
    /// Path to the catalog: a directory of *.resource.json files or a single JSON file
    #[arg(short, long, default_value = ".")]
    catalog: PathBuf,

    /// Output file (defaults to the configured filename in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to resdoc.toml in the working directory)
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DocConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let catalog = if cli.catalog.is_dir() {
        ResourceCatalog::from_directory(&cli.catalog)
    } else {
        ResourceCatalog::from_file(&cli.catalog)
    }
    .with_context(|| format!("loading catalog from {:?}", cli.catalog))?;

    println!("📚 Loaded {} resources from {:?}", catalog.len(), cli.catalog);

    let doc = RstRenderer::new(&catalog, &config)
        .render()
        .context("rendering endpoint documentation")?;

    let output_path = cli
        .output
        .unwrap_or_else(|| config.output.directory.join(&config.output.rst_filename));
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, &doc)?;

    println!("✅ API doc written to {:?}", output_path);
    Ok(())
}
