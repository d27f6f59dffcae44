//! Graphviz rendering of annotated graphs.

use std::path::Path;

use fabricflow_core::{CapacitatedGraph, Link, Node};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeReference, NodeIndex, UnGraph};

use crate::Error;

/// Layout coordinates are scaled by this factor (in inches) when pinned.
const SCALE: f64 = 4.0;

/// Renders `graph` in DOT format. Links carrying flow are labeled `flow/capacity` and drawn bold;
/// nodes with a layout position are pinned to it (use `neato -n` or `fdp` to honor pins).
pub fn render_dot(graph: &CapacitatedGraph) -> String {
    let edge_attrs = |_: &UnGraph<Node, Link>, e: EdgeReference<'_, Link>| match e.weight().label() {
        Some(label) => format!("label = \"{label}\" penwidth = 2"),
        None => String::new(),
    };
    let node_attrs = |_: &UnGraph<Node, Link>, (_, node): (NodeIndex, &Node)| {
        let label = escape(&node.id);
        match node.pos {
            Some(p) => format!(
                "label = \"{label}\" pos = \"{},{}!\"",
                p.x * SCALE,
                p.y * SCALE
            ),
            None => format!("label = \"{label}\""),
        }
    };
    let dot = Dot::with_attr_getters(
        graph.as_petgraph(),
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &edge_attrs,
        &node_attrs,
    );
    format!("{dot}")
}

/// Escapes `s` for use inside a quoted DOT string.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes the DOT rendering of `graph` to `path`.
pub fn write_dot(graph: &CapacitatedGraph, path: impl AsRef<Path>) -> Result<(), Error> {
    std::fs::write(path, render_dot(graph))?;
    Ok(())
}
