// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall-connectivity graphs from floor plan detections
//!
//! This crate turns the bounding boxes an object detector reports for a
//! floor plan image into a graph of wall corners and wall segments:
//! 1. Extracting two endpoints per wall box
//! 2. Clustering endpoints into corners (DBSCAN, radius scaled to the image)
//! 3. Optionally snapping near-aligned corner coordinates
//! 4. Linking corners along each wall into an undirected graph
//!
//! The graph can be exported as JSON, corrected interactively through an
//! [`EditorSession`], and extruded into wall prisms for OBJ export.
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_graph::{read_detections_path, run_pipeline, ImageSize, PipelineConfig};
//!
//! let table = read_detections_path("detections.csv")?;
//! let output = run_pipeline(&table, ImageSize::new(1280, 960), &PipelineConfig::default())?;
//!
//! println!("{} corners, {} walls", output.graph.node_count(), output.graph.edge_count());
//! std::fs::write("graph.json", output.graph.to_json()?)?;
//! ```

pub mod cluster;
pub mod config;
pub mod detections;
pub mod editor;
pub mod endpoints;
pub mod error;
pub mod export;
pub mod graph;
pub mod pipeline;
pub mod point_ops;
pub mod snap;
pub mod types;
pub mod wall_mesh;

// Re-export commonly used types and functions
pub use cluster::{calculate_eps, cluster, cluster_labels};
pub use config::PipelineConfig;
pub use detections::{image_size, read_detections, read_detections_path, DetectionTable};
pub use editor::{EditMode, EditOp, EditorSession};
pub use endpoints::{extract, extract_pairs, raw_points};
pub use error::{Error, Result};
pub use export::{GraphDocument, NodeDocument};
pub use graph::{BuildStats, GraphNode, NodeId, WallGraph, MAX_NODE_ID};
pub use pipeline::{run_pipeline, run_pipeline_from_files, PipelineOutput, PipelineStats};
pub use point_ops::nearest;
pub use snap::{snap, SnapStrategy};
pub use types::{BoundingBox, Detection, ImageSize, Point2D, WallEndpoints, WallOrientation};
pub use wall_mesh::{graph_prisms, wall_prism, write_obj, WallPrism, WallPrismConfig};
