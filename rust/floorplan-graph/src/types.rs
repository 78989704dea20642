// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for wall-endpoint extraction and graph construction

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Class label the detector assigns to wall boxes
pub const WALL_LABEL: &str = "wall";

/// A 2D point in image pixel space (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Squared Euclidean distance
    pub fn distance_sq_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(coord: [f64; 2]) -> Self {
        Self::new(coord[0], coord[1])
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Orientation of a wall box, decided by its aspect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WallOrientation {
    /// Taller than wide (or square)
    Vertical,
    /// Wider than tall
    Horizontal,
}

/// Axis-aligned bounding box in image pixel space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin).abs()
    }

    pub fn height(&self) -> f64 {
        (self.ymax - self.ymin).abs()
    }

    /// Square boxes count as vertical walls
    pub fn orientation(&self) -> WallOrientation {
        if self.height() >= self.width() {
            WallOrientation::Vertical
        } else {
            WallOrientation::Horizontal
        }
    }

    /// Name of the first coordinate that is NaN or infinite, if any
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("xmin", self.xmin),
            ("ymin", self.ymin),
            ("xmax", self.xmax),
            ("ymax", self.ymax),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// True if `point` lies on one of the four box edges
    pub fn is_on_boundary(&self, point: &Point2D) -> bool {
        let (xmin, xmax) = (self.xmin.min(self.xmax), self.xmin.max(self.xmax));
        let (ymin, ymax) = (self.ymin.min(self.ymax), self.ymin.max(self.ymax));
        let inside_x = point.x >= xmin && point.x <= xmax;
        let inside_y = point.y >= ymin && point.y <= ymax;

        let on_vertical_edge = (point.x == xmin || point.x == xmax) && inside_y;
        let on_horizontal_edge = (point.y == ymin || point.y == ymax) && inside_x;
        on_vertical_edge || on_horizontal_edge
    }
}

/// One row of object-detector output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Class label (e.g. "wall", "door"), if the table carries one
    pub name: Option<String>,
    /// Detector confidence (0.0 - 1.0)
    pub confidence: Option<f64>,
}

impl Detection {
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            name: None,
            confidence: None,
        }
    }

    pub fn labeled(bbox: BoundingBox, name: impl Into<String>) -> Self {
        Self {
            bbox,
            name: Some(name.into()),
            confidence: None,
        }
    }

    pub fn is_wall(&self) -> bool {
        self.name.as_deref() == Some(WALL_LABEL)
    }
}

/// The two endpoints of one detected wall
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallEndpoints {
    pub start: Point2D,
    pub end: Point2D,
}

impl WallEndpoints {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Source image dimensions in pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn diagonal(&self) -> f64 {
        let w = self.width as f64;
        let h = self.height as f64;
        (w * w + h * h).sqrt()
    }
}

impl std::str::FromStr for ImageSize {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `1280x720`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
        let width = w
            .trim()
            .parse()
            .map_err(|e| format!("invalid width {:?}: {}", w, e))?;
        let height = h
            .trim()
            .parse()
            .map_err(|e| format!("invalid height {:?}: {}", h, e))?;
        Ok(Self { width, height })
    }
}
