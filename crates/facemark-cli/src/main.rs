use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facemark_core::{
    face_feature_points, ContainerGeometry, ContentMode, FaceObservation, FaceRegion, PixelRect,
    PixelSize,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "facemark", about = "Facemark geometry inspection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the visible image rectangle for a container
    Rect {
        /// Container size as WxH
        #[arg(long)]
        container: String,
        /// Content mode: stretch, fit or fill
        #[arg(long, default_value = "fit")]
        mode: String,
        /// Source image size as WxH
        #[arg(long)]
        image: String,
    },
    /// Map captured face observations (JSON array) into container pixel space
    Map {
        /// Path to a JSON array of face observations
        observations: PathBuf,
        /// Container size as WxH
        #[arg(long)]
        container: String,
        /// Content mode: stretch, fit or fill
        #[arg(long, default_value = "fit")]
        mode: String,
        /// Source image size as WxH
        #[arg(long)]
        image: String,
        /// Comma-separated region names (e.g. leftEye,nose)
        #[arg(long, default_value = "allPoints")]
        regions: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rect {
            container,
            mode,
            image,
        } => {
            let geometry = parse_geometry(&container, &mode)?;
            let image = parse_size(&image)?;
            let rect = geometry
                .visible_rect(image)
                .context("degenerate container or image size")?;
            println!("{}", serde_json::to_string_pretty(&rect)?);
        }
        Commands::Map {
            observations,
            container,
            mode,
            image,
            regions,
        } => {
            let geometry = parse_geometry(&container, &mode)?;
            let image = parse_size(&image)?;
            let visible = geometry
                .visible_rect(image)
                .context("degenerate container or image size")?;
            let regions = parse_regions(&regions)?;

            let raw = std::fs::read_to_string(&observations)
                .with_context(|| format!("reading {}", observations.display()))?;
            let observations: Vec<FaceObservation> =
                serde_json::from_str(&raw).context("parsing observations")?;
            tracing::debug!(count = observations.len(), "loaded observations");

            let mapped: Vec<_> = observations
                .iter()
                .map(|o| face_feature_points(o, &regions, &visible))
                .collect();
            println!("{}", serde_json::to_string_pretty(&mapped)?);
        }
    }

    Ok(())
}

fn parse_size(s: &str) -> Result<PixelSize> {
    let (w, h) = s.split_once('x').context("size must be WxH")?;
    Ok(PixelSize::new(w.trim().parse()?, h.trim().parse()?))
}

fn parse_geometry(container: &str, mode: &str) -> Result<ContainerGeometry> {
    let size = parse_size(container)?;
    let mode: ContentMode = mode.parse()?;
    Ok(ContainerGeometry::new(
        PixelRect::new(0.0, 0.0, size.width, size.height),
        mode,
    ))
}

fn parse_regions(s: &str) -> Result<Vec<FaceRegion>> {
    s.split(',')
        .map(|name| Ok(name.trim().parse::<FaceRegion>()?))
        .collect()
}
