// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline: detections to wall graph
//!
//! Stages run in order, each consuming the previous stage's output:
//! 1. Endpoint extraction from wall boxes
//! 2. DBSCAN clustering of endpoints into corners
//! 3. Optional coordinate snapping
//! 4. Graph construction by nearest-corner resolution

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::cluster::cluster;
use crate::config::PipelineConfig;
use crate::detections::{image_size, read_detections_path, DetectionTable};
use crate::endpoints::{extract_pairs, raw_points};
use crate::error::{Error, Result};
use crate::graph::WallGraph;
use crate::point_ops::sort_lexicographic;
use crate::snap::snap;
use crate::types::{ImageSize, Point2D, WallEndpoints};

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PipelineStats {
    /// Rows in the detection table
    pub detections: usize,
    /// Detections kept after label filtering
    pub walls: usize,
    pub raw_points: usize,
    pub clusters: usize,
    /// Clustering radius in pixels
    pub eps: f64,
    pub nodes: usize,
    pub edges: usize,
    /// Walls dropped because both ends met the same corner
    pub degenerate_walls: usize,
    /// Walls repeating an existing edge
    pub duplicate_walls: usize,
    pub components: usize,
    pub total_time_ms: u64,
}

/// Everything a pipeline run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph: WallGraph,
    /// Endpoint pairs in detection order
    pub pairs: Vec<WallEndpoints>,
    /// Final corner set the graph was resolved against
    pub corners: Vec<Point2D>,
    pub stats: PipelineStats,
}

/// Run the full pipeline over an in-memory detection table
pub fn run_pipeline(
    table: &DetectionTable,
    image: ImageSize,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    config.validate()?;
    let start = Instant::now();

    if config.wall_label_filter && !table.has_labels {
        return Err(Error::MissingColumn("name".into()));
    }
    for (i, detection) in table.detections.iter().enumerate() {
        if let Some(field) = detection.bbox.non_finite_field() {
            return Err(Error::InvalidDetection { row: i + 1, field });
        }
    }

    // Step 1: Wall endpoints
    let pairs = extract_pairs(&table.detections, config.wall_label_filter);
    let points = raw_points(&pairs);
    tracing::debug!(
        detections = table.len(),
        walls = pairs.len(),
        points = points.len(),
        "Extracted wall endpoints"
    );

    // Step 2: Corner clustering
    let eps = config.eps_for(image);
    let mut corners = cluster(&points, eps, config.min_samples);
    let clusters = corners.len();
    if config.deterministic {
        sort_lexicographic(&mut corners);
    }
    tracing::debug!(eps, clusters, "Clustered endpoints");

    // Step 3: Snapping
    let corners = snap(&corners, config.snap_strategy, config.snap_threshold);
    tracing::debug!(
        strategy = %config.snap_strategy,
        threshold = config.snap_threshold,
        "Snapped corners"
    );

    // Step 4: Graph
    let (graph, build) = WallGraph::build_with_stats(&pairs, &corners);
    if build.degenerate > 0 {
        tracing::debug!(count = build.degenerate, "Dropped degenerate walls");
    }

    let stats = PipelineStats {
        detections: table.len(),
        walls: pairs.len(),
        raw_points: points.len(),
        clusters,
        eps,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        degenerate_walls: build.degenerate,
        duplicate_walls: build.duplicate,
        components: graph.connected_components().len(),
        total_time_ms: start.elapsed().as_millis() as u64,
    };

    tracing::info!(
        walls = stats.walls,
        clusters = stats.clusters,
        nodes = stats.nodes,
        edges = stats.edges,
        components = stats.components,
        total_time_ms = stats.total_time_ms,
        "Wall graph complete"
    );

    Ok(PipelineOutput {
        graph,
        pairs,
        corners,
        stats,
    })
}

/// Read a detection CSV and probe the image size, then run the pipeline
pub fn run_pipeline_from_files(
    csv_path: impl AsRef<Path>,
    image_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let table = read_detections_path(csv_path)?;
    let image = image_size(image_path)?;
    run_pipeline(&table, image, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::SnapStrategy;
    use crate::types::{BoundingBox, Detection};

    fn wall(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Detection {
        Detection::labeled(BoundingBox::new(xmin, ymin, xmax, ymax), "wall")
    }

    #[test]
    fn test_empty_table() {
        let table = DetectionTable::from_detections(vec![]);
        let output =
            run_pipeline(&table, ImageSize::new(100, 100), &PipelineConfig::default()).unwrap();

        assert!(output.graph.is_empty());
        assert_eq!(output.stats.clusters, 0);
        assert_eq!(output.stats.edges, 0);
    }

    #[test]
    fn test_label_filter() {
        let table = DetectionTable::from_detections(vec![
            wall(0.0, 0.0, 100.0, 4.0),
            Detection::labeled(BoundingBox::new(300.0, 300.0, 400.0, 304.0), "door"),
        ]);
        let output =
            run_pipeline(&table, ImageSize::new(500, 500), &PipelineConfig::default()).unwrap();

        assert_eq!(output.stats.detections, 2);
        assert_eq!(output.stats.walls, 1);
        assert_eq!(output.graph.edge_count(), 1);
    }

    #[test]
    fn test_unlabeled_table_needs_filter_off() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 4.0);
        let table = DetectionTable::from_detections(vec![Detection::new(bbox)]);
        let config = PipelineConfig::default();
        assert!(matches!(
            run_pipeline(&table, ImageSize::new(500, 500), &config),
            Err(Error::MissingColumn(_))
        ));

        let config = PipelineConfig {
            wall_label_filter: false,
            ..Default::default()
        };
        let output = run_pipeline(&table, ImageSize::new(500, 500), &config).unwrap();
        assert_eq!(output.graph.node_count(), 2);
    }

    #[test]
    fn test_short_wall_collapses() {
        // Both endpoints fall inside one cluster radius
        let table = DetectionTable::from_detections(vec![wall(0.0, 0.0, 5.0, 1.0)]);
        let config = PipelineConfig {
            snap_strategy: SnapStrategy::Disabled,
            ..Default::default()
        };
        let output = run_pipeline(&table, ImageSize::new(300, 400), &config).unwrap();

        assert_eq!(output.stats.clusters, 1);
        assert_eq!(output.stats.degenerate_walls, 1);
        assert_eq!(output.graph.edge_count(), 0);
    }

    #[test]
    fn test_non_finite_detection_rejected() {
        let table = DetectionTable::from_detections(vec![
            wall(0.0, 0.0, 100.0, 4.0),
            wall(f64::NAN, 0.0, 1.0, 100.0),
            wall(200.0, 200.0, 300.0, 204.0),
        ]);
        assert!(matches!(
            run_pipeline(&table, ImageSize::new(500, 500), &PipelineConfig::default()),
            Err(Error::InvalidDetection { row: 2, field: "xmin" })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let table = DetectionTable::default();
        let config = PipelineConfig {
            min_samples: 0,
            ..Default::default()
        };
        assert!(matches!(
            run_pipeline(&table, ImageSize::new(10, 10), &config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
