pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod join;
pub mod legend;
pub mod render;
pub mod tooltip;
pub mod types;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the datasets and render the choropleth SVG
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!("render failed: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Render { config } => {
            let app_config = config::AppConfig::load_or_default(config)?;

            let (records, shapes) = data::load_datasets(&app_config.input).await?;

            let mut surface = render::SvgSurface::new(
                app_config.chart.outer_width(),
                app_config.chart.outer_height(),
            );
            render::draw_choropleth(&records, &shapes, &app_config.chart, &mut surface)?;

            let svg_path = &app_config.output.svg_path;
            std::fs::write(svg_path, surface.finish())
                .with_context(|| format!("Failed to write SVG to {:?}", svg_path))?;
            info!(path = %svg_path.display(), "wrote choropleth");
        }
    }
    Ok(())
}
