// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration.
//!
//! Defaults can be overridden from a JSON file and from `FLOORPLAN_*`
//! environment variables. Unparseable variables fall back to the current
//! value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::calculate_eps;
use crate::error::{Error, Result};
use crate::snap::{SnapStrategy, DEFAULT_SNAP_THRESHOLD};
use crate::types::ImageSize;

/// Parameters for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Clustering radius as a fraction of the image diagonal.
    pub eps_scale_factor: f64,
    /// Minimum neighbourhood size for a core point.
    pub min_samples: usize,
    pub snap_strategy: SnapStrategy,
    /// Pixel distance below which coordinates are snapped.
    pub snap_threshold: f64,
    /// Keep only detections labelled `wall`.
    pub wall_label_filter: bool,
    /// Sort corner centroids lexicographically before graph building.
    pub deterministic: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            eps_scale_factor: 0.02,
            min_samples: 1,
            snap_strategy: SnapStrategy::default(),
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            wall_label_filter: true,
            deterministic: true,
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `FLOORPLAN_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            eps_scale_factor: lookup("FLOORPLAN_EPS_SCALE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.eps_scale_factor),
            min_samples: lookup("FLOORPLAN_MIN_SAMPLES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.min_samples),
            snap_strategy: lookup("FLOORPLAN_SNAP")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.snap_strategy),
            snap_threshold: lookup("FLOORPLAN_SNAP_THRESHOLD")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.snap_threshold),
            wall_label_filter: lookup("FLOORPLAN_FILTER_WALLS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(self.wall_label_filter),
            deterministic: lookup("FLOORPLAN_DETERMINISTIC")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(self.deterministic),
        }
    }

    /// Loads a JSON config file; absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.eps_scale_factor.is_finite() || self.eps_scale_factor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "eps_scale_factor must be a non-negative number, got {}",
                self.eps_scale_factor
            )));
        }
        if self.min_samples == 0 {
            return Err(Error::InvalidConfig("min_samples must be at least 1".into()));
        }
        if !self.snap_threshold.is_finite() || self.snap_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "snap_threshold must be a non-negative number, got {}",
                self.snap_threshold
            )));
        }
        Ok(())
    }

    /// Clustering radius for an image of the given size.
    pub fn eps_for(&self, image: ImageSize) -> f64 {
        calculate_eps(image, self.eps_scale_factor)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
