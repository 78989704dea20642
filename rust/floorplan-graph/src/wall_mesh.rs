// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall prisms for 3D export
//!
//! Every graph edge becomes a box: a rectangle of the configured thickness
//! centred on the wall axis, extruded upward from the floor level. Prisms
//! are built in a Z-up frame and written as Wavefront OBJ (Y-up).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::WallGraph;
use crate::types::Point2D;

/// Quad faces over the prism vertices: bottom, top, then the four sides
pub const PRISM_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [1, 2, 6, 5],
    [0, 3, 7, 4],
];

/// Extrusion parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WallPrismConfig {
    /// Wall height in metres
    pub wall_height: f64,
    /// Wall thickness in metres
    pub wall_thickness: f64,
    /// Metres per pixel
    pub scale: f64,
    /// Elevation of the wall base in metres
    pub floor_level: f64,
}

impl Default for WallPrismConfig {
    fn default() -> Self {
        Self {
            wall_height: 2.5,
            wall_thickness: 0.1,
            scale: 0.01, // 1 pixel = 1 cm
            floor_level: 0.0,
        }
    }
}

/// Eight vertices of one wall box
///
/// Vertices 0-3 are the bottom rectangle `start-, start+, end+, end-`
/// (offset along the left-hand normal), 4-7 the same at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct WallPrism {
    pub vertices: [Point3<f64>; 8],
}

impl WallPrism {
    pub fn faces(&self) -> &'static [[usize; 4]; 6] {
        &PRISM_FACES
    }
}

/// Build the prism for a wall from `start` to `end`
pub fn wall_prism(
    start: Point2D,
    end: Point2D,
    height: f64,
    thickness: f64,
    floor_level: f64,
) -> Result<WallPrism> {
    let direction: Vector2<f64> = end.to_nalgebra() - start.to_nalgebra();
    let length = direction.norm();
    if length < 1e-10 {
        return Err(Error::DegenerateWall);
    }

    let half = thickness / 2.0;
    let offset = Vector2::new(-direction.y, direction.x) / length * half;

    let base = [
        start.to_nalgebra() - offset,
        start.to_nalgebra() + offset,
        end.to_nalgebra() + offset,
        end.to_nalgebra() - offset,
    ];

    let top = floor_level + height;
    let vertices = [
        Point3::new(base[0].x, base[0].y, floor_level),
        Point3::new(base[1].x, base[1].y, floor_level),
        Point3::new(base[2].x, base[2].y, floor_level),
        Point3::new(base[3].x, base[3].y, floor_level),
        Point3::new(base[0].x, base[0].y, top),
        Point3::new(base[1].x, base[1].y, top),
        Point3::new(base[2].x, base[2].y, top),
        Point3::new(base[3].x, base[3].y, top),
    ];

    Ok(WallPrism { vertices })
}

/// One prism per graph edge, in edge order
///
/// Edges whose nodes were moved onto the same spot are skipped.
pub fn graph_prisms(graph: &WallGraph, config: &WallPrismConfig) -> Vec<WallPrism> {
    let scaled = |p: Point2D| Point2D::new(p.x * config.scale, p.y * config.scale);

    graph
        .edges()
        .filter_map(|(a, b)| {
            let (start, end) = (graph.coord(a)?, graph.coord(b)?);
            match wall_prism(
                scaled(start),
                scaled(end),
                config.wall_height,
                config.wall_thickness,
                config.floor_level,
            ) {
                Ok(prism) => Some(prism),
                Err(_) => {
                    tracing::debug!(a, b, "Skipping zero-length wall");
                    None
                }
            }
        })
        .collect()
}

/// Write prisms as Wavefront OBJ, one object per wall
pub fn write_obj<W: Write>(writer: &mut W, prisms: &[WallPrism]) -> Result<()> {
    writeln!(writer, "# Generated by floorplan-graph")?;
    writeln!(writer, "# Walls: {}", prisms.len())?;
    writeln!(writer, "# Coordinate system: Y-up (OBJ convention)")?;
    writeln!(writer)?;

    let mut vertex_offset = 0usize;
    for (i, prism) in prisms.iter().enumerate() {
        writeln!(writer, "o wall_{}", i)?;

        // Z-up to Y-up: (x, y, z) -> (x, z, -y)
        for v in &prism.vertices {
            writeln!(writer, "v {:.6} {:.6} {:.6}", v.x, v.z, -v.y)?;
        }

        for face in prism.faces() {
            write!(writer, "f")?;
            for index in face {
                write!(writer, " {}", index + vertex_offset + 1)?;
            }
            writeln!(writer)?;
        }

        vertex_offset += prism.vertices.len();
        writeln!(writer)?;
    }

    Ok(())
}

/// Write prisms to an OBJ file
pub fn write_obj_path(path: impl AsRef<Path>, prisms: &[WallPrism]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(&mut writer, prisms)?;
    writer.flush()?;
    Ok(())
}
