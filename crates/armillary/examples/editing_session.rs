//! Example: An editing session driven programmatically
//!
//! This example walks the same path a host renderer would: palette drops,
//! a property-form edit, a node drag collapsed into one undo step, link
//! drawing, incremental reconciliation patches, and a persisted snapshot.

use armillary::{
    config::EditorConfig,
    executor::CommandExecutor,
    geometry::{Point, Rect, Size},
    interaction::{InteractionBridge, LinkOutcome},
    meta::{ClassKind, RelationKind},
    project::Project,
    reconcile::{GraphView, diff},
    registry::{ClassPatch, RelationPatch},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut project = Project::new();
    let mut executor = CommandExecutor::default();
    let mut bridge = InteractionBridge::new(EditorConfig::default());

    let diagram = project.create_diagram("Domain overview");
    println!("Created diagram {diagram}\n");

    // Palette drops become undoable CreateClass commands. The first drop
    // carries no size and falls back to the configured default.
    let order = bridge.class_dropped(
        &mut project,
        &mut executor,
        diagram,
        "Order",
        ClassKind::Concrete,
        Point::new(100.0, 100.0),
        None,
    )?;
    let line_item = bridge.class_dropped(
        &mut project,
        &mut executor,
        diagram,
        "LineItem",
        ClassKind::Concrete,
        Point::new(340.0, 100.0),
        Some(Size::new(140.0, 70.0)),
    )?;
    println!("Dropped classes {order} and {line_item}");

    // Property forms edit the registry directly; every diagram showing the
    // class sees the change on the next projection.
    project
        .registry_mut()
        .update_class(order, ClassPatch::new().with_table_name(Some("orders".into())))?;

    let empty = GraphView::default();
    let after_drops = GraphView::capture(
        project.diagram(diagram).expect("diagram exists"),
        project.registry(),
    );
    let patch = diff(&empty, &after_drops);
    println!(
        "First reconciliation: {} nodes created, {} edges created\n",
        patch.created_nodes().len(),
        patch.created_edges().len()
    );

    // Drag the Order node. Every frame moves the node immediately, but the
    // whole gesture lands in history as a single entry.
    let order_node = project
        .diagram(diagram)
        .expect("diagram exists")
        .placement_of_class(order)
        .expect("Order is placed")
        .id();
    for frame in 1..=5 {
        bridge.node_geometry_changed(
            &mut project,
            &mut executor,
            diagram,
            order_node,
            Rect::new(100.0 + frame as f32 * 12.0, 100.0, 120.0, 60.0),
        )?;
    }
    bridge.gesture_finished(&mut executor);
    println!("Dragged {order_node} over 5 frames (one history entry)");

    // Draw an association link from Order to LineItem, then label it.
    let line_item_node = project
        .diagram(diagram)
        .expect("diagram exists")
        .placement_of_class(line_item)
        .expect("LineItem is placed")
        .id();
    bridge.link_started(&project, diagram, order_node, Point::new(220.0, 130.0))?;
    bridge.link_moved(Point::new(340.0, 130.0));
    let outcome = bridge.link_completed(&mut project, Some(line_item_node), RelationKind::Association)?;
    let LinkOutcome::Committed { relation, .. } = outcome else {
        return Err("link was not committed".into());
    };
    project
        .registry_mut()
        .update_relation(relation, RelationPatch::new().with_label(Some("contains".into())))?;
    println!("Linked {order_node} -> {line_item_node} as {relation}\n");

    let after_link = GraphView::capture(
        project.diagram(diagram).expect("diagram exists"),
        project.registry(),
    );
    println!("Current projection:");
    for node in after_link.nodes() {
        let rect = node.rect();
        println!(
            "  node {} \"{}\" at ({}, {}) size {}x{}",
            node.id(),
            node.data().class().name(),
            rect.x(),
            rect.y(),
            rect.width(),
            rect.height()
        );
    }
    for edge in after_link.edges() {
        println!(
            "  edge {} \"{}\" ({} -> {})",
            edge.id(),
            edge.relation().label().unwrap_or("unlabelled"),
            edge.source(),
            edge.target()
        );
    }
    println!();

    // Undo the drag; the node snaps back to where the gesture started.
    executor.undo(&mut project);
    let rect = project
        .diagram(diagram)
        .expect("diagram exists")
        .node(order_node)
        .expect("Order is placed")
        .rect();
    println!("After undo, {order_node} is back at ({}, {})\n", rect.x(), rect.y());

    // Persist the whole project.
    let snapshot = project.to_persisted();
    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("Persisted snapshot:\n{json}");

    Ok(())
}
