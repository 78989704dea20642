// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall endpoint extraction from detector bounding boxes

use crate::types::{BoundingBox, Detection, Point2D, WallEndpoints, WallOrientation};

/// Convert a wall bounding box into its two endpoints
///
/// Vertical (and square) boxes yield the midpoints of the top and bottom
/// edges; horizontal boxes yield the midpoints of the left and right edges.
/// Zero-area boxes produce coincident endpoints.
pub fn extract(bbox: &BoundingBox) -> WallEndpoints {
    let width = bbox.width();
    let height = bbox.height();

    match bbox.orientation() {
        WallOrientation::Vertical => {
            let x = bbox.xmin + width / 2.0;
            WallEndpoints::new(Point2D::new(x, bbox.ymin), Point2D::new(x, bbox.ymax))
        }
        WallOrientation::Horizontal => {
            let y = bbox.ymin + height / 2.0;
            WallEndpoints::new(Point2D::new(bbox.xmin, y), Point2D::new(bbox.xmax, y))
        }
    }
}

/// Extract endpoint pairs for a whole detection set, in input order
///
/// With `walls_only` set, detections not labeled as walls are skipped.
pub fn extract_pairs(detections: &[Detection], walls_only: bool) -> Vec<WallEndpoints> {
    detections
        .iter()
        .filter(|d| !walls_only || d.is_wall())
        .map(|d| extract(&d.bbox))
        .collect()
}

/// Flatten endpoint pairs into the raw point list fed to clustering
pub fn raw_points(pairs: &[WallEndpoints]) -> Vec<Point2D> {
    pairs.iter().flat_map(|p| [p.start, p.end]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_horizontal_box() {
        let ends = extract(&BoundingBox::new(0.0, 0.0, 5.0, 1.0));
        assert_eq!(ends.start, Point2D::new(0.0, 0.5));
        assert_eq!(ends.end, Point2D::new(5.0, 0.5));
    }

    #[test]
    fn test_vertical_box() {
        let ends = extract(&BoundingBox::new(9.0, 0.0, 10.0, 10.0));
        assert_eq!(ends.start, Point2D::new(9.5, 0.0));
        assert_eq!(ends.end, Point2D::new(9.5, 10.0));
    }

    #[test]
    fn test_square_box_is_vertical() {
        let ends = extract(&BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(ends.start, Point2D::new(2.0, 0.0));
        assert_eq!(ends.end, Point2D::new(2.0, 4.0));
    }

    #[test]
    fn test_zero_area_box() {
        let ends = extract(&BoundingBox::new(3.0, 7.0, 3.0, 7.0));
        assert!(ends.is_degenerate());
        assert_eq!(ends.start, Point2D::new(3.0, 7.0));
    }

    #[test]
    fn test_extract_pairs_filters_labels() {
        let detections = vec![
            Detection::labeled(BoundingBox::new(0.0, 0.0, 10.0, 1.0), "wall"),
            Detection::labeled(BoundingBox::new(0.0, 0.0, 1.0, 10.0), "door"),
            Detection::labeled(BoundingBox::new(5.0, 5.0, 6.0, 20.0), "wall"),
        ];

        assert_eq!(extract_pairs(&detections, true).len(), 2);
        assert_eq!(extract_pairs(&detections, false).len(), 3);
    }

    #[test]
    fn test_raw_points_order() {
        let pairs = vec![
            WallEndpoints::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)),
            WallEndpoints::new(Point2D::new(2.0, 0.0), Point2D::new(3.0, 0.0)),
        ];
        let points = raw_points(&pairs);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    proptest! {
        #[test]
        fn endpoints_lie_on_box_boundary(
            xmin in 0.0f64..5000.0,
            ymin in 0.0f64..5000.0,
            w in 0.0f64..500.0,
            h in 0.0f64..500.0,
        ) {
            let bbox = BoundingBox::new(xmin, ymin, xmin + w, ymin + h);
            let ends = extract(&bbox);

            prop_assert!(bbox.is_on_boundary(&ends.start));
            prop_assert!(bbox.is_on_boundary(&ends.end));

            match bbox.orientation() {
                WallOrientation::Vertical => {
                    prop_assert!(bbox.height() >= bbox.width());
                    prop_assert_eq!(ends.start.x, ends.end.x);
                }
                WallOrientation::Horizontal => {
                    prop_assert!(bbox.height() < bbox.width());
                    prop_assert_eq!(ends.start.y, ends.end.y);
                }
            }
        }
    }
}
