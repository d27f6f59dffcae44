use rustc_hash::FxHashMap;

use crate::flow::FlowSolution;
use crate::network::types::{Link, Node, NodeKind};
use crate::network::CapacitatedGraph;

pub(crate) const TOLERANCE: f64 = 1e-6;

/// Seven nodes, eight links. The maximum flow from `x` to `y` is 4, limited by the links
/// leaving `x`.
pub(crate) fn scenario_config() -> (Vec<Node>, Vec<Link>) {
    let nodes = ["x", "a", "b", "c", "d", "e", "y"]
        .into_iter()
        .map(|id| Node::new(id, NodeKind::Other))
        .collect();
    let links = vec![
        Link::new("x", "a", 3.0),
        Link::new("x", "b", 1.0),
        Link::new("a", "c", 3.0),
        Link::new("b", "c", 5.0),
        Link::new("b", "d", 4.0),
        Link::new("d", "e", 2.0),
        Link::new("c", "y", 2.0),
        Link::new("e", "y", 3.0),
    ];
    (nodes, links)
}

pub(crate) fn scenario_graph() -> CapacitatedGraph {
    let (nodes, links) = scenario_config();
    CapacitatedGraph::new(&nodes, &links).unwrap()
}

/// Two components: `s - m - n` and `p - t`.
pub(crate) fn two_islands_graph() -> CapacitatedGraph {
    let nodes = ["s", "m", "n", "p", "t"]
        .into_iter()
        .map(|id| Node::new(id, NodeKind::Other))
        .collect::<Vec<_>>();
    let links = vec![
        Link::new("s", "m", 5.0),
        Link::new("m", "n", 5.0),
        Link::new("p", "t", 5.0),
    ];
    CapacitatedGraph::new(&nodes, &links).unwrap()
}

/// Checks conservation, capacity respect, the flow value, and that the reported cut is a
/// minimum cut whose capacity equals the flow value.
pub(crate) fn assert_valid_solution(
    graph: &CapacitatedGraph,
    solution: &FlowSolution,
    source: &str,
    sink: &str,
) {
    let mut net = FxHashMap::<&str, f64>::default();
    for (from, to, flow) in solution.flows.iter() {
        let flow = flow.into_f64();
        assert!(flow > 0.0, "non-positive flow on ({from}, {to})");
        let link = graph
            .link(from, to)
            .unwrap_or_else(|| panic!("flow on missing link ({from}, {to})"));
        assert!(
            flow <= link.capacity.into_f64() + TOLERANCE,
            "flow {flow} exceeds capacity {} on ({from}, {to})",
            link.capacity
        );
        assert!(
            solution.flows.get(to, from).into_f64() == 0.0,
            "flow in both directions on ({from}, {to})"
        );
        *net.entry(from).or_default() -= flow;
        *net.entry(to).or_default() += flow;
    }
    for node in graph.nodes() {
        let balance = net.get(node.id.as_str()).copied().unwrap_or(0.0);
        if node.id == source {
            assert!((balance + solution.value.into_f64()).abs() < TOLERANCE);
        } else if node.id == sink {
            assert!((balance - solution.value.into_f64()).abs() < TOLERANCE);
        } else {
            assert!(
                balance.abs() < TOLERANCE,
                "conservation violated at {} (net {balance})",
                node.id
            );
        }
    }
    assert!(solution.source_side.contains(source));
    assert!(!solution.source_side.contains(sink));
    let cut = graph.cut_capacity(&solution.source_side).into_f64();
    assert!(
        (cut - solution.value.into_f64()).abs() < TOLERANCE,
        "cut capacity {cut} differs from flow value {}",
        solution.value
    );
}
