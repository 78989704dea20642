// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall-connectivity graph.
//!
//! - **Nodes** = wall corners (clustered and snapped endpoints)
//! - **Edges** = wall segments between two distinct corners
//!
//! During construction node identity is resolved by coordinate: coordinates
//! are quantized to a fixed resolution and looked up in a hash index, so a
//! built graph never has two nodes at one location. Editing may later move
//! nodes onto each other.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Bound::{Excluded, Unbounded};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::point_ops::nearest_index;
use crate::types::{Point2D, WallEndpoints};

/// Node identifier, unique within one graph.
pub type NodeId = u64;

/// Largest id accepted from callers; leaves headroom for fresh ids.
pub const MAX_NODE_ID: NodeId = u64::MAX / 2;

/// Coordinates closer than this are the same node.
const COORD_QUANTUM: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordKey(i64, i64);

impl CoordKey {
    fn of(p: &Point2D) -> Self {
        Self(
            (p.x / COORD_QUANTUM).round() as i64,
            (p.y / COORD_QUANTUM).round() as i64,
        )
    }
}

/// A node in the wall graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub coord: Point2D,
}

/// Counters collected while building a graph from endpoint pairs.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct BuildStats {
    /// Endpoint pairs processed.
    pub pairs: usize,
    /// Edges inserted.
    pub edges_added: usize,
    /// Walls whose endpoints resolved to the same node.
    pub degenerate: usize,
    /// Walls repeating an existing edge.
    pub duplicate: usize,
    /// Walls skipped because there were no points to resolve against.
    pub unresolved: usize,
}

/// Undirected simple graph of wall corners and wall segments.
#[derive(Debug, Clone, Default)]
pub struct WallGraph {
    coords: BTreeMap<NodeId, Point2D>,
    /// Adjacency sets, one entry per node (possibly empty).
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    coord_index: FxHashMap<CoordKey, NodeId>,
    next_id: NodeId,
    edge_count: usize,
}

impl WallGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from wall endpoint pairs and the final corner set.
    ///
    /// Each endpoint is resolved to its nearest corner; corners get node ids
    /// in order of first use. Walls collapsing onto one corner are dropped.
    pub fn build(pairs: &[WallEndpoints], corners: &[Point2D]) -> Self {
        Self::build_with_stats(pairs, corners).0
    }

    /// Same as [`WallGraph::build`], also returning build counters.
    pub fn build_with_stats(pairs: &[WallEndpoints], corners: &[Point2D]) -> (Self, BuildStats) {
        let mut graph = Self::new();
        let mut stats = BuildStats {
            pairs: pairs.len(),
            ..Default::default()
        };

        for pair in pairs {
            let (Some(si), Some(ei)) = (
                nearest_index(&pair.start, corners),
                nearest_index(&pair.end, corners),
            ) else {
                stats.unresolved += 1;
                continue;
            };

            let a = graph.get_or_insert_node(corners[si]);
            let b = graph.get_or_insert_node(corners[ei]);

            if a == b {
                stats.degenerate += 1;
                continue;
            }

            if graph.link(a, b) {
                stats.edges_added += 1;
            } else {
                stats.duplicate += 1;
            }
        }

        (graph, stats)
    }

    /// Removes all nodes and edges and restarts id allocation.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.coords.contains_key(&id)
    }

    /// Largest node id currently in the graph.
    pub fn max_node_id(&self) -> Option<NodeId> {
        self.coords.keys().next_back().copied()
    }

    pub fn coord(&self, id: NodeId) -> Option<Point2D> {
        self.coords.get(&id).copied()
    }

    /// Node located at `coord` (after quantization), if any.
    pub fn node_at(&self, coord: &Point2D) -> Option<NodeId> {
        self.coord_index.get(&CoordKey::of(coord)).copied()
    }

    /// Returns the node at `coord`, inserting a fresh one if there is none.
    pub fn get_or_insert_node(&mut self, coord: Point2D) -> NodeId {
        match self.node_at(&coord) {
            Some(id) => id,
            None => self.add_node(coord),
        }
    }

    /// Adds a node with a fresh id, even if another node sits at `coord`.
    pub fn add_node(&mut self, coord: Point2D) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.attach_node(id, coord);
        id
    }

    /// Adds a node with a caller-chosen id, at most [`MAX_NODE_ID`].
    pub fn insert_node(&mut self, id: NodeId, coord: Point2D) -> Result<()> {
        if id > MAX_NODE_ID {
            return Err(Error::NodeIdOutOfRange(id));
        }
        if self.contains_node(id) {
            return Err(Error::DuplicateNode(id));
        }
        self.next_id = self.next_id.max(id + 1);
        self.attach_node(id, coord);
        Ok(())
    }

    fn attach_node(&mut self, id: NodeId, coord: Point2D) {
        self.coords.insert(id, coord);
        self.adjacency.insert(id, BTreeSet::new());
        self.coord_index.entry(CoordKey::of(&coord)).or_insert(id);
    }

    /// Removes a node and its incident edges.
    ///
    /// Returns the node's coordinate and former neighbours.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(Point2D, Vec<NodeId>)> {
        let coord = self.coords.remove(&id).ok_or(Error::UnknownNode(id))?;
        let neighbors: Vec<NodeId> = self
            .adjacency
            .remove(&id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();

        for n in &neighbors {
            if let Some(set) = self.adjacency.get_mut(n) {
                set.remove(&id);
            }
        }
        self.edge_count -= neighbors.len();
        self.unindex(id, &coord);

        Ok((coord, neighbors))
    }

    /// Moves a node, returning its previous coordinate.
    pub fn set_coord(&mut self, id: NodeId, coord: Point2D) -> Result<Point2D> {
        let old = self.coord(id).ok_or(Error::UnknownNode(id))?;
        self.coords.insert(id, coord);
        self.unindex(id, &old);
        self.coord_index.entry(CoordKey::of(&coord)).or_insert(id);
        Ok(old)
    }

    /// Drops `id` from the coordinate index, handing the slot to another
    /// node at the same location if one exists.
    fn unindex(&mut self, id: NodeId, coord: &Point2D) {
        let key = CoordKey::of(coord);
        if self.coord_index.get(&key) != Some(&id) {
            return;
        }
        self.coord_index.remove(&key);
        if let Some((&other, _)) = self
            .coords
            .iter()
            .find(|&(&other, c)| other != id && CoordKey::of(c) == key)
        {
            self.coord_index.insert(key, other);
        }
    }

    /// Inserts an undirected edge.
    ///
    /// Returns `Ok(false)` for self loops and edges that already exist.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.require(a)?;
        self.require(b)?;
        Ok(self.link(a, b))
    }

    /// Inserts an edge between two existing nodes.
    fn link(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || self.has_edge(a, b) {
            return false;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        self.edge_count += 1;
        true
    }

    /// Removes an undirected edge. Returns `Ok(false)` if it was absent.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.require(a)?;
        self.require(b)?;
        if !self.has_edge(a, b) {
            return Ok(false);
        }

        if let Some(set) = self.adjacency.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.remove(&a);
        }
        self.edge_count -= 1;
        Ok(true)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.get(&a).is_some_and(|set| set.contains(&b))
    }

    fn require(&self, id: NodeId) -> Result<()> {
        if self.contains_node(id) {
            Ok(())
        } else {
            Err(Error::UnknownNode(id))
        }
    }

    /// Neighbours of a node in ascending id order.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = GraphNode> + '_ {
        self.coords
            .iter()
            .map(|(&id, &coord)| GraphNode { id, coord })
    }

    /// Edges as `(low, high)` id pairs in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(&a, set)| set.range((Excluded(a), Unbounded)).map(move |&b| (a, b)))
    }

    /// Node closest to `point`; ties go to the lowest id.
    pub fn closest_node(&self, point: &Point2D) -> Option<NodeId> {
        let ids: Vec<NodeId> = self.coords.keys().copied().collect();
        let coords: Vec<Point2D> = self.coords.values().copied().collect();
        nearest_index(point, &coords).map(|i| ids[i])
    }

    /// Connected components via BFS, each sorted, ordered by smallest id.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut components = Vec::new();

        for &start in self.coords.keys() {
            if !seen.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                for next in self.neighbors(current) {
                    if seen.insert(next) {
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }

        components
    }
}
