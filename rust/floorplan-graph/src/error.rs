// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the wall graph pipeline.

use crate::graph::NodeId;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading detections, building or editing graphs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed detector table (non-numeric or missing bounding-box fields).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A bounding-box coordinate is NaN or infinite (`row` is 1-based, header excluded).
    #[error("row {row}: {field} is not a finite number")]
    InvalidDetection { row: usize, field: &'static str },

    /// A required column is absent from the detector table header.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A referenced node id is not in the graph.
    #[error("node not found: {0}")]
    UnknownNode(NodeId),

    /// A node with this id already exists.
    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),

    /// Node id beyond the range the graph can allocate after.
    #[error("node id out of range: {0}")]
    NodeIdOutOfRange(NodeId),

    /// The graph has no nodes to select from.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// A wall whose endpoints coincide has no direction.
    #[error("wall has zero length")]
    DegenerateWall,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
