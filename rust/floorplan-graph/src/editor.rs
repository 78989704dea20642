// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive correction of a wall graph.
//!
//! An [`EditorSession`] interprets pointer input (clicks and drags in image
//! coordinates) according to the active [`EditMode`] and keeps an undo
//! stack of the applied [`EditOp`]s. Rendering is left to the caller.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{NodeId, WallGraph};
use crate::types::Point2D;

/// Pointer interpretation mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Idle,
    /// Next click adds a node.
    Adding,
    /// Two clicks pick the endpoints of a new edge.
    Linking,
    /// Two clicks pick the endpoints of an edge to remove.
    Delinking,
    /// Click selects a node, drags move it.
    Modifying,
    /// Next click removes the closest node and its edges.
    Deleting,
}

/// A graph mutation recorded for undo.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    AddNode {
        id: NodeId,
        coord: Point2D,
    },
    RemoveNode {
        id: NodeId,
        coord: Point2D,
        neighbors: Vec<NodeId>,
    },
    AddEdge {
        a: NodeId,
        b: NodeId,
    },
    RemoveEdge {
        a: NodeId,
        b: NodeId,
    },
    MoveNode {
        id: NodeId,
        from: Point2D,
        to: Point2D,
    },
}

/// Editing state around one wall graph.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    graph: WallGraph,
    mode: EditMode,
    selection: Option<NodeId>,
    /// Set once the current drag gesture has an undo entry.
    drag_recorded: bool,
    history: Vec<EditOp>,
}

impl EditorSession {
    pub fn new(graph: WallGraph) -> Self {
        Self {
            graph,
            ..Default::default()
        }
    }

    pub fn graph(&self) -> &WallGraph {
        &self.graph
    }

    pub fn into_graph(self) -> WallGraph {
        self.graph
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Node picked by the first click of a two-step mode, or the node being
    /// dragged.
    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn history(&self) -> &[EditOp] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Replaces the graph, e.g. after re-running the pipeline.
    ///
    /// History and selection refer to the old graph and are dropped.
    pub fn replace_graph(&mut self, graph: WallGraph) {
        self.graph = graph;
        self.history.clear();
        self.reset_selection();
        self.mode = EditMode::Idle;
    }

    /// Switches mode and clears any pending selection.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.selection = None;
        self.drag_recorded = false;
    }

    /// Interprets a click at `point` according to the active mode.
    ///
    /// Returns the operation applied to the graph, if any. Selecting a node
    /// applies nothing.
    pub fn click(&mut self, point: Point2D) -> Result<Option<EditOp>> {
        match self.mode {
            EditMode::Idle => Ok(None),
            EditMode::Adding => {
                let id = match self.graph.max_node_id() {
                    Some(max) => max.checked_add(1).ok_or(Error::NodeIdOutOfRange(max))?,
                    None => 0,
                };
                self.graph.insert_node(id, point)?;
                self.mode = EditMode::Idle;
                Ok(Some(self.record(EditOp::AddNode { id, coord: point })))
            }
            EditMode::Linking | EditMode::Delinking => self.pick_pair(point),
            EditMode::Modifying => {
                self.selection = Some(self.closest(&point)?);
                self.drag_recorded = false;
                Ok(None)
            }
            EditMode::Deleting => {
                let id = self.closest(&point)?;
                let (coord, neighbors) = self.graph.remove_node(id)?;
                self.mode = EditMode::Idle;
                Ok(Some(self.record(EditOp::RemoveNode {
                    id,
                    coord,
                    neighbors,
                })))
            }
        }
    }

    /// Second half of linking and delinking.
    fn pick_pair(&mut self, point: Point2D) -> Result<Option<EditOp>> {
        let closest = self.closest(&point)?;
        let Some(first) = self.selection else {
            self.selection = Some(closest);
            return Ok(None);
        };

        let linking = self.mode == EditMode::Linking;
        self.set_mode(EditMode::Idle);

        let op = if linking {
            self.graph
                .add_edge(first, closest)?
                .then_some(EditOp::AddEdge { a: first, b: closest })
        } else {
            self.graph
                .remove_edge(first, closest)?
                .then_some(EditOp::RemoveEdge { a: first, b: closest })
        };
        Ok(op.map(|op| self.record(op)))
    }

    /// Moves the selected node while in [`EditMode::Modifying`].
    ///
    /// A drag gesture produces one undo entry; later moves in the same
    /// gesture update its target.
    pub fn drag(&mut self, point: Point2D) -> Result<()> {
        let (EditMode::Modifying, Some(id)) = (self.mode, self.selection) else {
            return Ok(());
        };

        let from = self.graph.set_coord(id, point)?;
        let continuing = self.drag_recorded
            && matches!(self.history.last(), Some(EditOp::MoveNode { id: last, .. }) if *last == id);

        if continuing {
            if let Some(EditOp::MoveNode { to, .. }) = self.history.last_mut() {
                *to = point;
            }
        } else {
            self.history.push(EditOp::MoveNode {
                id,
                from,
                to: point,
            });
            self.drag_recorded = true;
        }
        Ok(())
    }

    /// Ends the current drag gesture. The node stays selected.
    pub fn release(&mut self) {
        self.drag_recorded = false;
    }

    /// Reverts the most recent operation.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(op) = self.history.pop() else {
            return Ok(false);
        };
        self.reset_selection();

        match op {
            EditOp::AddNode { id, .. } => {
                self.graph.remove_node(id)?;
            }
            EditOp::RemoveNode {
                id,
                coord,
                neighbors,
            } => {
                self.graph.insert_node(id, coord)?;
                for n in neighbors {
                    self.graph.add_edge(id, n)?;
                }
            }
            EditOp::AddEdge { a, b } => {
                self.graph.remove_edge(a, b)?;
            }
            EditOp::RemoveEdge { a, b } => {
                self.graph.add_edge(a, b)?;
            }
            EditOp::MoveNode { id, from, .. } => {
                self.graph.set_coord(id, from)?;
            }
        }
        Ok(true)
    }

    fn closest(&self, point: &Point2D) -> Result<NodeId> {
        self.graph.closest_node(point).ok_or(Error::EmptyGraph)
    }

    fn record(&mut self, op: EditOp) -> EditOp {
        self.history.push(op.clone());
        op
    }
}
