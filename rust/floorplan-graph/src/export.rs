// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for wall graphs.
//!
//! The document shape is shared with the correction editor:
//!
//! ```json
//! {
//!   "nodes": { "0": { "coord": [120.5, 40.0] } },
//!   "edges": [[0, 1]]
//! }
//! ```
//!
//! Node ids are written as string keys; edges are `[a, b]` id pairs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{NodeId, WallGraph};
use crate::types::Point2D;

/// Serializable representation of a wall graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: BTreeMap<NodeId, NodeDocument>,
    pub edges: Vec<[NodeId; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub coord: [f64; 2],
}

impl WallGraph {
    /// Creates a serializable snapshot of the graph.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self
                .nodes()
                .map(|n| (n.id, NodeDocument { coord: n.coord.as_array() }))
                .collect(),
            edges: self.edges().map(|(a, b)| [a, b]).collect(),
        }
    }

    /// Rebuilds a graph from a document, keeping its node ids.
    ///
    /// Edges that reference missing nodes are rejected; self loops and
    /// repeated edges are ignored.
    pub fn from_document(doc: &GraphDocument) -> Result<Self> {
        let mut graph = WallGraph::new();
        for (&id, node) in &doc.nodes {
            graph.insert_node(id, Point2D::from(node.coord))?;
        }
        for &[a, b] in &doc.edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    /// Serializes the graph to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Parses a graph from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: GraphDocument = serde_json::from_str(json)?;
        Self::from_document(&doc)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
