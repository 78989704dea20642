// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point set operations shared by the pipeline stages

use crate::types::Point2D;
use std::cmp::Ordering;

/// Index of the candidate closest to `target`
///
/// Ties go to the first minimal candidate in iteration order.
pub fn nearest_index(target: &Point2D, candidates: &[Point2D]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        let d = target.distance_sq_to(candidate);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }

    best.map(|(i, _)| i)
}

/// Candidate closest to `target` (Euclidean), `None` if there are none
pub fn nearest(target: &Point2D, candidates: &[Point2D]) -> Option<Point2D> {
    nearest_index(target, candidates).map(|i| candidates[i])
}

/// Arithmetic mean of a point set
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2D::new(sx / n, sy / n))
}

/// Lexicographic `(x, y)` ordering with a total order on floats
pub fn lexicographic(a: &Point2D, b: &Point2D) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Sort points into canonical lexicographic order
pub fn sort_lexicographic(points: &mut [Point2D]) {
    points.sort_by(lexicographic);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest() {
        let candidates = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
        ];
        let found = nearest(&Point2D::new(8.0, 1.0), &candidates);
        assert_eq!(found, Some(Point2D::new(10.0, 0.0)));
    }

    #[test]
    fn test_nearest_tie_prefers_first() {
        let candidates = vec![Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0)];
        assert_eq!(nearest_index(&Point2D::new(0.0, 0.0), &candidates), Some(0));

        let reversed = vec![Point2D::new(1.0, 0.0), Point2D::new(-1.0, 0.0)];
        assert_eq!(
            nearest(&Point2D::new(0.0, 0.0), &reversed),
            Some(Point2D::new(1.0, 0.0))
        );
    }

    #[test]
    fn test_nearest_empty() {
        assert_eq!(nearest(&Point2D::new(0.0, 0.0), &[]), None);
    }

    #[test]
    fn test_centroid() {
        let points = vec![Point2D::new(100.0, 100.0), Point2D::new(103.0, 100.0)];
        let c = centroid(&points).unwrap();
        assert!((c.x - 101.5).abs() < 1e-12);
        assert!((c.y - 100.0).abs() < 1e-12);
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn test_sort_lexicographic() {
        let mut points = vec![
            Point2D::new(2.0, 1.0),
            Point2D::new(1.0, 5.0),
            Point2D::new(1.0, 2.0),
        ];
        sort_lexicographic(&mut points);
        assert_eq!(
            points,
            vec![
                Point2D::new(1.0, 2.0),
                Point2D::new(1.0, 5.0),
                Point2D::new(2.0, 1.0),
            ]
        );
    }
}
