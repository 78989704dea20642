// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Density-based clustering of raw wall endpoints
//!
//! Endpoints from adjacent or overlapping wall detections that describe the
//! same physical corner are grouped with DBSCAN and collapsed to their
//! centroid. The neighbourhood radius is derived from the image diagonal so
//! that the same scale factor works across image resolutions.

use crate::types::{ImageSize, Point2D};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Clustering radius as a fraction of the image diagonal
pub fn calculate_eps(image: ImageSize, scale_factor: f64) -> f64 {
    scale_factor * image.diagonal()
}

/// Uniform grid over the point set with cell size `eps`
///
/// Every neighbour within `eps` of a point lies in the 3x3 block of cells
/// around it.
struct NeighborGrid<'a> {
    points: &'a [Point2D],
    eps: f64,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
}

impl<'a> NeighborGrid<'a> {
    fn new(points: &'a [Point2D], eps: f64) -> Self {
        let mut cells: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();
        if eps > 0.0 {
            for (i, p) in points.iter().enumerate() {
                cells.entry(Self::cell_of(p, eps)).or_default().push(i);
            }
        }
        Self { points, eps, cells }
    }

    fn cell_of(p: &Point2D, eps: f64) -> (i64, i64) {
        ((p.x / eps).floor() as i64, (p.y / eps).floor() as i64)
    }

    /// Indices of all points within `eps` of point `i` (including `i`), ascending
    fn region_query(&self, i: usize) -> Vec<usize> {
        let p = &self.points[i];
        let eps_sq = self.eps * self.eps;

        let mut found: Vec<usize> = if self.eps > 0.0 {
            let (cx, cy) = Self::cell_of(p, self.eps);
            let mut found = Vec::new();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let cell = (cx.saturating_add(dx), cy.saturating_add(dy));
                    if let Some(bucket) = self.cells.get(&cell) {
                        found.extend(
                            bucket
                                .iter()
                                .copied()
                                .filter(|&j| p.distance_sq_to(&self.points[j]) <= eps_sq),
                        );
                    }
                }
            }
            found
        } else {
            // Zero radius: only exact duplicates are neighbours
            (0..self.points.len())
                .filter(|&j| p.distance_sq_to(&self.points[j]) <= eps_sq)
                .collect()
        };

        found.sort_unstable();
        // Saturated cell coordinates can visit one bucket twice
        found.dedup();
        found
    }
}

/// Assign a DBSCAN cluster label to every point
///
/// Labels are numbered in order of discovery while scanning the points in
/// input order. `None` marks noise, which only occurs with `min_samples > 1`.
pub fn cluster_labels(points: &[Point2D], eps: f64, min_samples: usize) -> Vec<Option<usize>> {
    let min_samples = min_samples.max(1);
    let grid = NeighborGrid::new(points, eps.max(0.0));

    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    let mut visited = vec![false; points.len()];
    let mut next_label = 0;

    for i in 0..points.len() {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let neighbors = grid.region_query(i);
        if neighbors.len() < min_samples {
            // Noise for now; may still be claimed as a border point later
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[i] = Some(label);

        let mut queue: VecDeque<usize> = neighbors.into();
        while let Some(j) = queue.pop_front() {
            if labels[j].is_none() {
                labels[j] = Some(label);
            }
            if visited[j] {
                continue;
            }
            visited[j] = true;

            let expansion = grid.region_query(j);
            if expansion.len() >= min_samples {
                queue.extend(expansion);
            }
        }
    }

    labels
}

/// Cluster points and return one centroid per cluster, in label order
///
/// Noise points are excluded from the output.
pub fn cluster(points: &[Point2D], eps: f64, min_samples: usize) -> Vec<Point2D> {
    let labels = cluster_labels(points, eps, min_samples);
    let num_clusters = labels.iter().flatten().max().map_or(0, |&l| l + 1);

    let mut sums = vec![(0.0f64, 0.0f64, 0usize); num_clusters];
    for (point, label) in points.iter().zip(&labels) {
        if let Some(label) = label {
            let entry = &mut sums[*label];
            entry.0 += point.x;
            entry.1 += point.y;
            entry.2 += 1;
        }
    }

    sums.into_iter()
        .map(|(sx, sy, n)| Point2D::new(sx / n as f64, sy / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_ops::sort_lexicographic;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_calculate_eps() {
        let eps = calculate_eps(ImageSize::new(300, 400), 0.02);
        assert_relative_eq!(eps, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_two_close_points_merge() {
        let points = vec![Point2D::new(100.0, 100.0), Point2D::new(103.0, 100.0)];
        let centroids = cluster(&points, 10.0, 1);

        assert_eq!(centroids.len(), 1);
        assert_relative_eq!(centroids[0].x, 101.5);
        assert_relative_eq!(centroids[0].y, 100.0);
    }

    #[test]
    fn test_single_point() {
        let points = vec![Point2D::new(4.0, 2.0)];
        assert_eq!(cluster(&points, 5.0, 1), points);
    }

    #[test]
    fn test_empty() {
        assert!(cluster(&[], 5.0, 1).is_empty());
    }

    #[test]
    fn test_chain_is_one_cluster() {
        // Each neighbour is within eps, the ends are not
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(8.0, 0.0),
        ];
        let labels = cluster_labels(&points, 5.0, 1);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_eps_boundary_is_inclusive() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)];
        assert_eq!(cluster(&points, 5.0, 1).len(), 1);
        assert_eq!(cluster(&points, 4.999, 1).len(), 2);
    }

    #[test]
    fn test_labels_follow_discovery_order() {
        let points = vec![
            Point2D::new(50.0, 50.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(51.0, 50.0),
        ];
        let labels = cluster_labels(&points, 2.0, 1);
        assert_eq!(labels, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_noise_with_min_samples() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(100.0, 100.0),
        ];
        let labels = cluster_labels(&points, 2.0, 2);
        assert_eq!(labels, vec![Some(0), Some(0), None]);

        let centroids = cluster(&points, 2.0, 2);
        assert_eq!(centroids, vec![Point2D::new(0.5, 0.0)]);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // Point 0 is not core (one neighbour besides itself) but borders the
        // dense group around (3, 0)
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(4.0, 0.0),
        ];
        let labels = cluster_labels(&points, 2.0, 3);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_negative_coordinates() {
        let points = vec![Point2D::new(-0.5, -0.5), Point2D::new(0.5, 0.5)];
        assert_eq!(cluster(&points, 2.0, 1).len(), 1);
    }

    fn point_strategy() -> impl Strategy<Value = Point2D> {
        (0.0f64..1000.0, 0.0f64..1000.0).prop_map(|(x, y)| Point2D::new(x, y))
    }

    proptest! {
        #[test]
        fn clustering_is_idempotent(
            points in prop::collection::vec(point_strategy(), 0..60),
            eps in 0.0f64..50.0,
        ) {
            let mut first = cluster(&points, eps, 1);
            let mut second = cluster(&points, eps, 1);
            sort_lexicographic(&mut first);
            sort_lexicographic(&mut second);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn zero_eps_keeps_distinct_points(
            points in prop::collection::btree_set((0i32..10_000, 0i32..10_000), 0..60),
        ) {
            let points: Vec<Point2D> = points
                .into_iter()
                .map(|(x, y)| Point2D::new(x as f64, y as f64))
                .collect();
            let centroids = cluster(&points, 0.0, 1);
            prop_assert_eq!(centroids, points);
        }

        #[test]
        fn min_samples_one_has_no_noise(
            points in prop::collection::vec(point_strategy(), 1..60),
            eps in 0.0f64..50.0,
        ) {
            let labels = cluster_labels(&points, eps, 1);
            prop_assert!(labels.iter().all(Option::is_some));
        }
    }
}
