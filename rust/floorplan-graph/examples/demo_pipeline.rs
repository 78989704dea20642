// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walk-through of the detection-to-graph pipeline on a synthetic plan
//!
//! Run with: cargo run -p floorplan-graph --example demo_pipeline

use floorplan_graph::{
    graph_prisms, read_detections, run_pipeline, EditMode, EditorSession, ImageSize,
    PipelineConfig, Point2D, SnapStrategy, WallPrismConfig,
};

/// Two rooms side by side, as a detector would report them
const DETECTIONS: &str = "\
xmin,ymin,xmax,ymax,confidence,name
100,96,402,106,0.93,wall
397,100,405,400,0.91,wall
100,396,401,404,0.90,wall
95,101,104,399,0.92,wall
399,98,702,104,0.88,wall
698,101,704,402,0.87,wall
402,395,700,405,0.89,wall
520,300,560,340,0.71,door
";

fn main() -> floorplan_graph::Result<()> {
    println!("=== Floor Plan Wall Graph Demo ===\n");

    let table = read_detections(DETECTIONS.as_bytes())?;
    println!("Detections: {} ({} walls)", table.len(), table.wall_count());

    let image = ImageSize::new(800, 500);
    for strategy in [
        SnapStrategy::Disabled,
        SnapStrategy::Pairwise,
        SnapStrategy::Components,
    ] {
        let config = PipelineConfig {
            snap_strategy: strategy,
            ..Default::default()
        };
        let output = run_pipeline(&table, image, &config)?;
        println!(
            "  snap={:<10} eps={:.1}px clusters={} nodes={} edges={} components={}",
            strategy.to_string(),
            output.stats.eps,
            output.stats.clusters,
            output.stats.nodes,
            output.stats.edges,
            output.stats.components
        );
    }

    let output = run_pipeline(&table, image, &PipelineConfig::default())?;
    println!("\nCorners:");
    for node in output.graph.nodes() {
        let neighbors: Vec<_> = output.graph.neighbors(node.id).collect();
        println!(
            "  {}: ({:.1}, {:.1}) -> {:?}",
            node.id, node.coord.x, node.coord.y, neighbors
        );
    }

    // Correct the graph: add a corner in the right room and wire it up
    let mut session = EditorSession::new(output.graph);
    session.set_mode(EditMode::Adding);
    session.click(Point2D::new(550.0, 250.0))?;
    session.set_mode(EditMode::Linking);
    session.click(Point2D::new(550.0, 250.0))?;
    session.click(Point2D::new(550.0, 100.0))?;
    println!(
        "\nAfter editing: {} nodes, {} edges ({} ops in history)",
        session.graph().node_count(),
        session.graph().edge_count(),
        session.history().len()
    );
    session.undo()?;
    println!(
        "After undo:    {} nodes, {} edges",
        session.graph().node_count(),
        session.graph().edge_count()
    );

    let prisms = graph_prisms(session.graph(), &WallPrismConfig::default());
    println!("\nWall prisms: {}", prisms.len());

    println!("\nGraph JSON:\n{}", session.graph().to_json()?);
    Ok(())
}
