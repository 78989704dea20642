// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reading object-detector output
//!
//! Detections arrive as a CSV table with a header row. The bounding-box
//! columns `xmin, ymin, xmax, ymax` are required; `name` and `confidence`
//! are picked up when present and any other column is ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{BoundingBox, Detection, ImageSize};

const REQUIRED_COLUMNS: [&str; 4] = ["xmin", "ymin", "xmax", "ymax"];
const LABEL_COLUMN: &str = "name";

#[derive(Debug, Deserialize)]
struct DetectionRow {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl From<DetectionRow> for Detection {
    fn from(row: DetectionRow) -> Self {
        Detection {
            bbox: BoundingBox::new(row.xmin, row.ymin, row.xmax, row.ymax),
            name: row.name,
            confidence: row.confidence,
        }
    }
}

/// Detector rows for one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionTable {
    pub detections: Vec<Detection>,
    /// Whether a class label column was present
    pub has_labels: bool,
}

impl DetectionTable {
    /// Wraps detections built in memory.
    ///
    /// An empty set counts as labelled, so it passes the wall filter.
    pub fn from_detections(detections: Vec<Detection>) -> Self {
        let has_labels = detections.is_empty() || detections.iter().any(|d| d.name.is_some());
        Self {
            detections,
            has_labels,
        }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn wall_count(&self) -> usize {
        self.detections.iter().filter(|d| d.is_wall()).count()
    }
}

/// Parse a detection table from any CSV source
///
/// A row with a missing, non-numeric or non-finite coordinate fails the
/// whole read.
pub fn read_detections<R: Read>(reader: R) -> Result<DetectionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn(column.to_string()));
        }
    }
    let has_labels = headers.iter().any(|h| h == LABEL_COLUMN);

    let mut detections = Vec::new();
    for (i, row) in reader.deserialize::<DetectionRow>().enumerate() {
        let detection = Detection::from(row?);
        if let Some(field) = detection.bbox.non_finite_field() {
            return Err(Error::InvalidDetection { row: i + 1, field });
        }
        detections.push(detection);
    }

    debug!(rows = detections.len(), has_labels, "Read detection table");

    Ok(DetectionTable {
        detections,
        has_labels,
    })
}

/// Parse a detection table from a CSV file
pub fn read_detections_path(path: impl AsRef<Path>) -> Result<DetectionTable> {
    read_detections(File::open(path)?)
}

/// Probe image dimensions from the file header without decoding pixels
pub fn image_size(path: impl AsRef<Path>) -> Result<ImageSize> {
    let (width, height) = image::image_dimensions(path)?;
    Ok(ImageSize::new(width, height))
}
