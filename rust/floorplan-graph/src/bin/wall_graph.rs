// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: build a wall graph from detector output (JSON, optional OBJ)
//!
//! Usage:
//!   wall-graph detections.csv --image plan.png [options]
//!   wall-graph detections.csv --size 1280x960 --output graph.json --obj walls.obj

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use floorplan_graph::{
    graph_prisms, image_size, read_detections_path, run_pipeline, wall_mesh::write_obj_path,
    ImageSize, PipelineConfig, SnapStrategy, WallPrismConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wall-graph")]
#[command(about = "Build a wall-connectivity graph from floor plan detections")]
#[command(version)]
struct Cli {
    /// Detector output CSV (xmin, ymin, xmax, ymax[, name, confidence])
    csv: PathBuf,

    /// Source image, probed for its dimensions
    #[arg(long, conflicts_with = "size", required_unless_present = "size")]
    image: Option<PathBuf>,

    /// Image dimensions as WIDTHxHEIGHT, instead of --image
    #[arg(long)]
    size: Option<ImageSize>,

    /// JSON pipeline config; flags and FLOORPLAN_* variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clustering radius as a fraction of the image diagonal
    #[arg(long)]
    eps_scale: Option<f64>,

    /// Snapping strategy: pairwise, components or off
    #[arg(long)]
    snap: Option<SnapStrategy>,

    /// Snapping threshold in pixels
    #[arg(long)]
    snap_threshold: Option<f64>,

    /// Use every detection, not only those labelled "wall"
    #[arg(long)]
    all_labels: bool,

    /// Write the graph JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write wall prisms as Wavefront OBJ
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Wall height in metres (OBJ export)
    #[arg(long, default_value = "2.5")]
    wall_height: f64,

    /// Wall thickness in metres (OBJ export)
    #[arg(long, default_value = "0.1")]
    wall_thickness: f64,

    /// Metres per pixel (OBJ export)
    #[arg(long, default_value = "0.01")]
    scale: f64,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let base = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("Cannot load config '{}'", path.display()))?,
            None => PipelineConfig::default(),
        };
        let mut config = base.with_env_overrides();

        if let Some(eps_scale) = self.eps_scale {
            config.eps_scale_factor = eps_scale;
        }
        if let Some(snap) = self.snap {
            config.snap_strategy = snap;
        }
        if let Some(threshold) = self.snap_threshold {
            config.snap_threshold = threshold;
        }
        if self.all_labels {
            config.wall_label_filter = false;
        }
        Ok(config)
    }

    fn image_size(&self) -> Result<ImageSize> {
        match (&self.image, self.size) {
            (_, Some(size)) => Ok(size),
            (Some(path), None) => image_size(path)
                .with_context(|| format!("Cannot read image '{}'", path.display())),
            (None, None) => anyhow::bail!("either --image or --size is required"),
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so the graph can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    let image = cli.image_size()?;

    tracing::info!(
        csv = %cli.csv.display(),
        width = image.width,
        height = image.height,
        eps_scale = config.eps_scale_factor,
        snap = %config.snap_strategy,
        "Building wall graph"
    );

    let table = read_detections_path(&cli.csv)
        .with_context(|| format!("Cannot read detections '{}'", cli.csv.display()))?;
    let output = run_pipeline(&table, image, &config)?;

    let json = output.graph.to_json()?;
    match &cli.output {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("Cannot write '{}'", path.display()))?;
            tracing::info!(path = %path.display(), "Graph saved");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    if let Some(path) = &cli.obj {
        let prism_config = WallPrismConfig {
            wall_height: cli.wall_height,
            wall_thickness: cli.wall_thickness,
            scale: cli.scale,
            ..Default::default()
        };
        let prisms = graph_prisms(&output.graph, &prism_config);
        write_obj_path(path, &prisms)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), walls = prisms.len(), "OBJ saved");
    }

    tracing::info!(
        stats = %serde_json::to_string(&output.stats)?,
        "Done"
    );
    Ok(())
}
