// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests: detection tables through to exported graphs.

use std::collections::BTreeSet;
use std::path::PathBuf;

use floorplan_graph::{
    read_detections, run_pipeline, run_pipeline_from_files, BoundingBox, Detection,
    DetectionTable, EditMode, EditorSession, ImageSize, PipelineConfig, Point2D, SnapStrategy,
    WallGraph,
};
use proptest::prelude::*;

/// 300x400 has a 500px diagonal, so this scale gives eps = 2
const SQUARE_EPS_SCALE: f64 = 0.004;

const UNIT_SQUARE_CSV: &str = "\
xmin,ymin,xmax,ymax,name
0,0,10,1,wall
9,0,10,10,wall
0,9,10,10,wall
0,0,1,10,wall
";

fn square_config(snap_strategy: SnapStrategy) -> PipelineConfig {
    PipelineConfig {
        eps_scale_factor: SQUARE_EPS_SCALE,
        snap_strategy,
        snap_threshold: 2.0,
        ..Default::default()
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("floorplan-graph-{}-{}", std::process::id(), name))
}

#[test]
fn test_unit_square_is_one_cycle() {
    let table = read_detections(UNIT_SQUARE_CSV.as_bytes()).unwrap();

    for strategy in [SnapStrategy::Disabled, SnapStrategy::Pairwise, SnapStrategy::Components] {
        let output =
            run_pipeline(&table, ImageSize::new(300, 400), &square_config(strategy)).unwrap();
        let graph = &output.graph;

        assert!((output.stats.eps - 2.0).abs() < 1e-9);
        assert_eq!(graph.node_count(), 4, "strategy {}", strategy);
        assert_eq!(graph.edge_count(), 4, "strategy {}", strategy);
        assert!(graph.nodes().all(|n| graph.degree(n.id) == 2));
        assert_eq!(graph.connected_components().len(), 1);
    }
}

#[test]
fn test_unit_square_corners() {
    let table = read_detections(UNIT_SQUARE_CSV.as_bytes()).unwrap();
    let output = run_pipeline(
        &table,
        ImageSize::new(300, 400),
        &square_config(SnapStrategy::Disabled),
    )
    .unwrap();

    // Deterministic mode sorts corners lexicographically
    let expected = [(0.25, 0.25), (0.25, 9.75), (9.75, 0.25), (9.75, 9.75)];
    assert_eq!(output.corners.len(), 4);
    for (corner, (x, y)) in output.corners.iter().zip(expected) {
        assert!((corner.x - x).abs() < 1e-9);
        assert!((corner.y - y).abs() < 1e-9);
    }
}

#[test]
fn test_wide_snap_collapses_square() {
    // Threshold above the side length pulls all corners together
    let table = read_detections(UNIT_SQUARE_CSV.as_bytes()).unwrap();
    let config = PipelineConfig {
        snap_threshold: 10.0,
        ..square_config(SnapStrategy::Components)
    };
    let output = run_pipeline(&table, ImageSize::new(300, 400), &config).unwrap();

    assert_eq!(output.graph.node_count(), 1);
    assert_eq!(output.graph.edge_count(), 0);
    assert_eq!(output.stats.degenerate_walls, 4);
}

#[test]
fn test_repeated_runs_are_identical() {
    let table = read_detections(UNIT_SQUARE_CSV.as_bytes()).unwrap();
    let config = square_config(SnapStrategy::Pairwise);

    let first = run_pipeline(&table, ImageSize::new(300, 400), &config).unwrap();
    let second = run_pipeline(&table, ImageSize::new(300, 400), &config).unwrap();

    assert_eq!(first.graph.to_document(), second.graph.to_document());
    assert_eq!(first.corners, second.corners);
}

#[test]
fn test_export_import_round_trip() {
    let table = read_detections(UNIT_SQUARE_CSV.as_bytes()).unwrap();
    let output = run_pipeline(
        &table,
        ImageSize::new(300, 400),
        &square_config(SnapStrategy::Pairwise),
    )
    .unwrap();

    let path = temp_path("round-trip.json");
    output.graph.save_json(&path).unwrap();
    let restored = WallGraph::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.to_document(), output.graph.to_document());
    assert_eq!(restored.node_count(), 4);
    assert_eq!(restored.edge_count(), 4);
}

#[test]
fn test_pipeline_from_files() {
    let csv_path = temp_path("detections.csv");
    let image_path = temp_path("plan.png");
    std::fs::write(&csv_path, UNIT_SQUARE_CSV).unwrap();
    image::GrayImage::new(300, 400).save(&image_path).unwrap();

    let result = run_pipeline_from_files(
        &csv_path,
        &image_path,
        &square_config(SnapStrategy::Disabled),
    );
    std::fs::remove_file(&csv_path).ok();
    std::fs::remove_file(&image_path).ok();

    let output = result.unwrap();
    assert!((output.stats.eps - 2.0).abs() < 1e-9);
    assert_eq!(output.graph.edge_count(), 4);
}

#[test]
fn test_edit_exported_graph() {
    let table = read_detections(UNIT_SQUARE_CSV.as_bytes()).unwrap();
    let output = run_pipeline(
        &table,
        ImageSize::new(300, 400),
        &square_config(SnapStrategy::Disabled),
    )
    .unwrap();
    let original = output.graph.to_document();

    let mut session = EditorSession::new(output.graph);
    session.set_mode(EditMode::Delinking);
    session.click(Point2D::new(0.0, 0.0)).unwrap();
    session.click(Point2D::new(10.0, 0.0)).unwrap();
    assert_eq!(session.graph().edge_count(), 3);

    let json = session.graph().to_json().unwrap();
    let reloaded = WallGraph::from_json(&json).unwrap();
    assert_eq!(reloaded.edge_count(), 3);

    session.undo().unwrap();
    assert_eq!(session.graph().to_document(), original);
}

fn wall_box() -> impl Strategy<Value = Detection> {
    (0.0f64..500.0, 0.0f64..500.0, 0.0f64..200.0, 0.0f64..200.0).prop_map(|(x, y, w, h)| {
        Detection::labeled(BoundingBox::new(x, y, x + w, y + h), "wall")
    })
}

proptest! {
    #[test]
    fn graph_invariants_hold(
        detections in prop::collection::vec(wall_box(), 0..40),
        eps_scale in 0.0f64..0.05,
    ) {
        let walls = detections.len();
        let table = DetectionTable::from_detections(detections);
        let config = PipelineConfig {
            eps_scale_factor: eps_scale,
            ..Default::default()
        };
        let output = run_pipeline(&table, ImageSize::new(800, 600), &config).unwrap();
        let graph = &output.graph;

        prop_assert!(graph.edge_count() <= walls);
        prop_assert!(graph.edges().all(|(a, b)| a != b));

        let coords: BTreeSet<(u64, u64)> = graph
            .nodes()
            .map(|n| (n.coord.x.to_bits(), n.coord.y.to_bits()))
            .collect();
        prop_assert_eq!(coords.len(), graph.node_count());
    }
}
