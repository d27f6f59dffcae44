//! The [`CapacitatedGraph`] data structure: nodes with optional layout metadata and undirected
//! links carrying a capacity and, once a solution has been merged, a flow.

pub mod types;

use std::collections::BTreeSet;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use rustc_hash::FxHashMap;

pub use types::*;

use crate::units::Bandwidth;

#[derive(Debug, Clone, Default)]
pub struct CapacitatedGraph {
    pub(crate) graph: UnGraph<Node, Link>,
    id2idx: FxHashMap<String, NodeIndex>,
}

impl CapacitatedGraph {
    /// Creates a graph from a list of nodes and links. This function returns an error if the
    /// declarations fail to produce a valid graph.
    ///
    /// Correctness properties:
    ///
    /// - Every node must have a unique ID.
    /// - Every link must have distinct endpoints in `nodes`.
    /// - For any two nodes, there must be at most one link between them.
    /// - Every capacity must be non-negative.
    pub fn new(nodes: &[Node], links: &[Link]) -> Result<Self, GraphError> {
        let mut g = Self::default();
        for n in nodes.iter().cloned() {
            g.add_node(n)?;
        }
        for l in links.iter().cloned() {
            g.add_link(l)?;
        }
        Ok(g)
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, GraphError> {
        // CORRECTNESS: Every node must have a unique ID.
        if self.id2idx.contains_key(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id2idx.insert(id, idx);
        Ok(idx)
    }

    pub fn add_link(&mut self, link: Link) -> Result<EdgeIndex, GraphError> {
        // CORRECTNESS: Every link must have distinct endpoints in `nodes`.
        if link.a == link.b {
            return Err(GraphError::NodeAdjacentSelf(link.a));
        }
        let a = self
            .idx_of(&link.a)
            .ok_or_else(|| GraphError::UndeclaredNode(link.a.clone()))?;
        let b = self
            .idx_of(&link.b)
            .ok_or_else(|| GraphError::UndeclaredNode(link.b.clone()))?;
        // CORRECTNESS: For any two nodes, there must be at most one link between them.
        if self.graph.find_edge(a, b).is_some() {
            return Err(GraphError::DuplicateLink {
                n1: link.a,
                n2: link.b,
            });
        }
        if !link.capacity.is_valid_capacity() {
            return Err(GraphError::InvalidCapacity {
                a: link.a,
                b: link.b,
                capacity: link.capacity,
            });
        }
        Ok(self.graph.add_edge(a, b, link))
    }

    pub(crate) fn idx_of(&self, id: &str) -> Option<NodeIndex> {
        self.id2idx.get(id).copied()
    }

    pub(crate) fn edge_between(&self, a: &str, b: &str) -> Option<EdgeIndex> {
        let a = self.idx_of(a)?;
        let b = self.idx_of(b)?;
        self.graph.find_edge(a, b)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.id2idx.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.idx_of(id).map(|idx| &self.graph[idx])
    }

    /// Looks up the link between `a` and `b`, in either order.
    pub fn link(&self, a: &str, b: &str) -> Option<&Link> {
        self.edge_between(a, b).map(|e| &self.graph[e])
    }

    /// Links incident to `id`, paired with the node on the other end.
    pub fn links_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (&'a Node, &'a Link)> + 'a {
        self.idx_of(id)
            .into_iter()
            .flat_map(move |idx| self.graph.edges(idx))
            .map(move |e| {
                let link = e.weight();
                let other = if link.a == id { &link.b } else { &link.a };
                // Both endpoints of a stored link are declared
                let other = &self.graph[self.id2idx[other.as_str()]];
                (other, link)
            })
    }

    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.links_of(id).map(|(n, _)| n)
    }

    /// The total capacity of links with exactly one endpoint in `side`.
    pub fn cut_capacity(&self, side: &BTreeSet<String>) -> Bandwidth {
        self.links()
            .filter(|l| side.contains(&l.a) != side.contains(&l.b))
            .map(|l| l.capacity)
            .sum()
    }

    pub(crate) fn clear_flows(&mut self) {
        for link in self.graph.edge_weights_mut() {
            link.flow = None;
        }
    }

    /// The underlying `petgraph` graph, for collaborators that render or export it.
    pub fn as_petgraph(&self) -> &UnGraph<Node, Link> {
        &self.graph
    }

    delegate::delegate! {
        to self.graph {
            #[call(node_weights)]
            pub fn nodes(&self) -> impl Iterator<Item = &Node>;

            #[call(edge_weights)]
            pub fn links(&self) -> impl Iterator<Item = &Link>;

            #[call(node_count)]
            pub fn nr_nodes(&self) -> usize;

            #[call(edge_count)]
            pub fn nr_links(&self) -> usize;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Duplicate node ID {0}")]
    DuplicateNodeId(String),

    #[error("Node {0} is connected to itself")]
    NodeAdjacentSelf(String),

    #[error("Node {0} is not declared")]
    UndeclaredNode(String),

    #[error("Duplicate links between {n1} and {n2}")]
    DuplicateLink { n1: String, n2: String },

    #[error("Link between {a} and {b} has invalid capacity {capacity}")]
    InvalidCapacity {
        a: String,
        b: String,
        capacity: Bandwidth,
    },

    #[error("No link between {from} and {to}")]
    UndeclaredLink { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn empty_graph_succeeds() {
        assert!(
            CapacitatedGraph::new(&[], &[]).is_ok(),
            "failed to create empty graph"
        );
    }

    #[test]
    fn scenario_graph_succeeds() -> anyhow::Result<()> {
        let (nodes, links) = testing::scenario_config();
        let g = CapacitatedGraph::new(&nodes, &links)?;
        assert_eq!(g.nr_nodes(), 7);
        assert_eq!(g.nr_links(), 8);
        Ok(())
    }

    #[test]
    fn link_lookup_ignores_order() -> anyhow::Result<()> {
        let (nodes, links) = testing::scenario_config();
        let g = CapacitatedGraph::new(&nodes, &links)?;
        let ab = g.link("b", "d").map(|l| l.capacity);
        let ba = g.link("d", "b").map(|l| l.capacity);
        assert_eq!(ab, Some(Bandwidth::new(4.0)));
        assert_eq!(ab, ba);
        assert!(g.link("x", "y").is_none());
        Ok(())
    }

    #[test]
    fn neighbors_cover_both_link_directions() -> anyhow::Result<()> {
        let (nodes, links) = testing::scenario_config();
        let g = CapacitatedGraph::new(&nodes, &links)?;
        let mut neighbors = g.neighbors("b").map(|n| n.id.as_str()).collect::<Vec<_>>();
        neighbors.sort();
        assert_eq!(neighbors, vec!["c", "d", "x"]);
        Ok(())
    }

    #[test]
    fn cut_capacity_counts_crossing_links() -> anyhow::Result<()> {
        let (nodes, links) = testing::scenario_config();
        let g = CapacitatedGraph::new(&nodes, &links)?;
        let side = ["x"].into_iter().map(String::from).collect();
        assert_eq!(g.cut_capacity(&side), Bandwidth::new(4.0));
        let side = ["x", "a", "b", "c", "d", "e"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(g.cut_capacity(&side), Bandwidth::new(5.0));
        Ok(())
    }

    #[test]
    fn duplicate_node_fails() {
        let n1 = Node::new("a", NodeKind::Other);
        let n2 = Node::new("a", NodeKind::Other); // error
        let res = CapacitatedGraph::new(&[n1, n2], &[]);
        assert!(matches!(res, Err(GraphError::DuplicateNodeId(..))));
    }

    #[test]
    fn node_adjacent_self_fails() {
        let n1 = Node::new("a", NodeKind::Other);
        let n2 = Node::new("b", NodeKind::Other);
        let l1 = Link::new("a", "b", 1.0);
        let l2 = Link::new("b", "b", 1.0); // error
        let res = CapacitatedGraph::new(&[n1, n2], &[l1, l2]);
        assert!(matches!(res, Err(GraphError::NodeAdjacentSelf(..))));
    }

    #[test]
    fn undeclared_node_fails() {
        let n1 = Node::new("a", NodeKind::Other);
        let n2 = Node::new("b", NodeKind::Other);
        let l1 = Link::new("a", "b", 1.0);
        let l2 = Link::new("a", "z", 1.0); // error
        let res = CapacitatedGraph::new(&[n1, n2], &[l1, l2]);
        assert!(matches!(res, Err(GraphError::UndeclaredNode(id)) if id == "z"));
    }

    #[test]
    fn duplicate_links_fails() {
        let n1 = Node::new("a", NodeKind::Other);
        let n2 = Node::new("b", NodeKind::Other);
        let l1 = Link::new("a", "b", 1.0);
        let l2 = Link::new("b", "a", 2.0); // error
        let res = CapacitatedGraph::new(&[n1, n2], &[l1, l2]);
        assert!(matches!(res, Err(GraphError::DuplicateLink { .. })));
    }

    #[test]
    fn negative_capacity_fails() {
        let n1 = Node::new("a", NodeKind::Other);
        let n2 = Node::new("b", NodeKind::Other);
        let l1 = Link::new("a", "b", -1.0); // error
        let res = CapacitatedGraph::new(&[n1, n2], &[l1]);
        assert!(matches!(res, Err(GraphError::InvalidCapacity { .. })));
    }

    #[test]
    fn zero_and_infinite_capacities_are_accepted() {
        let n1 = Node::new("a", NodeKind::Other);
        let n2 = Node::new("b", NodeKind::Other);
        let n3 = Node::new("c", NodeKind::Other);
        let l1 = Link::new("a", "b", 0.0);
        let l2 = Link::new("b", "c", Bandwidth::INFINITY);
        assert!(CapacitatedGraph::new(&[n1, n2, n3], &[l1, l2]).is_ok());
    }
}
