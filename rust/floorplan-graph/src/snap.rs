// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate snapping for near-aligned corners
//!
//! Cluster centroids of corners that share a wall are rarely exactly aligned.
//! Snapping pulls x (or y) coordinates that differ by less than a pixel
//! threshold to a common value so that walls come out straight.

use crate::types::Point2D;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default snapping threshold in pixels
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;

/// How near-aligned coordinates are merged
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SnapStrategy {
    /// Leave centroids untouched
    Disabled,
    /// Single left-to-right pass over all pairs, averaging in place.
    /// Order dependent and not transitive.
    #[default]
    Pairwise,
    /// Union every pair within threshold per axis and replace each
    /// connected component with its mean. Order independent.
    Components,
}

impl fmt::Display for SnapStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapStrategy::Disabled => write!(f, "off"),
            SnapStrategy::Pairwise => write!(f, "pairwise"),
            SnapStrategy::Components => write!(f, "components"),
        }
    }
}

impl FromStr for SnapStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "disabled" => Ok(SnapStrategy::Disabled),
            "pairwise" => Ok(SnapStrategy::Pairwise),
            "components" | "union-find" => Ok(SnapStrategy::Components),
            other => Err(format!(
                "unknown snap strategy {:?} (expected off, pairwise or components)",
                other
            )),
        }
    }
}

/// Snap points with the given strategy; output has the input's length and order
pub fn snap(points: &[Point2D], strategy: SnapStrategy, threshold: f64) -> Vec<Point2D> {
    match strategy {
        SnapStrategy::Disabled => points.to_vec(),
        SnapStrategy::Pairwise => snap_pairwise(points, threshold),
        SnapStrategy::Components => snap_components(points, threshold),
    }
}

/// Pairwise averaging in a single pass over all pairs `(i, j)`, `i < j`
///
/// Later pairs see the values already averaged by earlier pairs.
pub fn snap_pairwise(points: &[Point2D], threshold: f64) -> Vec<Point2D> {
    let mut snapped = points.to_vec();
    let n = snapped.len();

    for i in 0..n {
        for j in (i + 1)..n {
            if (snapped[i].x - snapped[j].x).abs() < threshold {
                let avg_x = (snapped[i].x + snapped[j].x) / 2.0;
                snapped[i].x = avg_x;
                snapped[j].x = avg_x;
            }
            if (snapped[i].y - snapped[j].y).abs() < threshold {
                let avg_y = (snapped[i].y + snapped[j].y) / 2.0;
                snapped[i].y = avg_y;
                snapped[j].y = avg_y;
            }
        }
    }

    snapped
}

/// Component-wise snapping: each axis is grouped independently
pub fn snap_components(points: &[Point2D], threshold: f64) -> Vec<Point2D> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

    let xs = average_components(&xs, threshold);
    let ys = average_components(&ys, threshold);

    xs.into_iter()
        .zip(ys)
        .map(|(x, y)| Point2D::new(x, y))
        .collect()
}

/// Replace each value by the mean of its within-threshold component
fn average_components(values: &[f64], threshold: f64) -> Vec<f64> {
    let n = values.len();
    let mut sets = DisjointSet::new(n);

    // Sorted sweep: only neighbours in sorted order need to be compared,
    // since a gap >= threshold splits every chain crossing it
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    for pair in order.windows(2) {
        if (values[pair[1]] - values[pair[0]]).abs() < threshold {
            sets.union(pair[0], pair[1]);
        }
    }

    let mut sums = vec![(0.0f64, 0usize); n];
    for (i, value) in values.iter().enumerate() {
        let root = sets.find(i);
        sums[root].0 += value;
        sums[root].1 += 1;
    }

    (0..n)
        .map(|i| {
            let (sum, count) = sums[sets.find(i)];
            sum / count as f64
        })
        .collect()
}

/// Union-find with path compression and union by size
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }
}
