//! Class Diagram CLI
//!
//! Renders the class-relationship diagram for a resource catalog to DOT,
//! optionally converting to SVG through the GraphViz `dot` binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use resdoc::config::DiagramFormat;
use resdoc::{DiagramRenderer, DocConfig, ResourceCatalog};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resdoc-diagram")]
#[command(about = "Generate a class diagram from a resource catalog")]
struct Cli {
    /// Path to the catalog: a directory of *.resource.json files or a single JSON file
    #[arg(short, long, default_value = ".")]
    catalog: PathBuf,

    /// Output file (defaults to the configured filename in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: dot or svg (overrides the configured format)
    #[arg(short, long)]
    format: Option<String>,

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

    let dot_content = DiagramRenderer::new(&catalog)
        .render()
        .context("rendering class diagram")?;

    let format = match cli.format.as_deref() {
        Some("dot") => DiagramFormat::Dot,
        Some("svg") => DiagramFormat::Svg,
        Some(other) => anyhow::bail!("invalid format '{}', use 'dot' or 'svg'", other),
        None => config.output.diagram_format,
    };

    match format {
        DiagramFormat::Dot => {
            let output_path = cli.output.unwrap_or_else(|| {
                config
                    .output
                    .directory
                    .join(format!("{}.dot", config.output.diagram_filename))
            });
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, &dot_content)?;
            println!("✅ Exported DOT to: {:?}", output_path);
        }
        DiagramFormat::Svg => {
            let output_path = cli.output.unwrap_or_else(|| {
                config
                    .output
                    .directory
                    .join(format!("{}.svg", config.output.diagram_filename))
            });
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Write DOT to a temp file, then convert to SVG
            let temp_dot = output_path.with_extension("temp.dot");
            std::fs::write(&temp_dot, &dot_content)?;

            let output = std::process::Command::new("dot")
                .args(["-Tsvg"])
                .arg(&temp_dot)
                .arg("-o")
                .arg(&output_path)
                .output()
                .context("running GraphViz 'dot'")?;

            let _ = std::fs::remove_file(&temp_dot);

            if output.status.success() {
                println!("✅ Exported SVG to: {:?}", output_path);
            } else {
                eprintln!("❌ GraphViz conversion failed:");
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
