//! Merges a flow assignment back into a graph and produces `flow/capacity` labels.

use std::collections::BTreeMap;

use crate::flow::FlowAssignment;
use crate::network::{CapacitatedGraph, GraphError};

/// `flow/capacity` labels keyed by the ordered `(from, to)` pair the flow travels along.
pub type Labels = BTreeMap<(String, String), String>;

/// Sets the flow attribute of every link with positive flow and returns the labels of those
/// links. Flow attributes left by a previous call are cleared first, so annotating twice with
/// the same assignment yields the same graph. Links without flow stay unlabeled.
pub fn annotate(graph: &mut CapacitatedGraph, flows: &FlowAssignment) -> Result<Labels, GraphError> {
    // Check every pair first so a bad assignment leaves the graph untouched.
    let edges = flows
        .iter()
        .map(|(from, to, flow)| {
            graph
                .edge_between(from, to)
                .map(|e| (e, from, to, flow))
                .ok_or_else(|| GraphError::UndeclaredLink {
                    from: from.to_owned(),
                    to: to.to_owned(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    graph.clear_flows();
    let mut labels = Labels::new();
    for (e, from, to, flow) in edges {
        let link = &mut graph.graph[e];
        link.flow = Some(flow);
        labels.insert(
            (from.to_owned(), to.to_owned()),
            format!("{}/{}", flow, link.capacity),
        );
    }
    Ok(labels)
}

/// Rebuilds labels from flow attributes already present on `graph`. The direction of a flow is
/// not stored on the graph, so labels are keyed by the link's declared endpoints.
pub fn labels(graph: &CapacitatedGraph) -> Labels {
    graph
        .links()
        .filter_map(|l| l.label().map(|label| ((l.a.clone(), l.b.clone()), label)))
        .collect()
}
