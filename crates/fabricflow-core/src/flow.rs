//! Maximum-flow computation over a [`CapacitatedGraph`].
//!
//! Every undirected link becomes a pair of opposite arcs in a residual network. Both arcs carry
//! the link's capacity, and pushing flow along one arc frees the same amount on the other, so
//! flow may cross a link in either direction up to the shared capacity.

mod dinic;
mod edmonds_karp;
mod residual;

use std::collections::{BTreeMap, BTreeSet};

pub use dinic::Dinic;
pub use edmonds_karp::EdmondsKarp;

use crate::network::CapacitatedGraph;
use crate::units::Bandwidth;

/// Residual capacities at or below this fraction of the largest finite capacity count as
/// saturated.
pub(crate) const EPSILON: f64 = 1e-9;

/// A maximum-flow algorithm.
pub trait MaxFlowAlgo {
    /// Computes a maximum flow from `source` to `sink`. A sink that cannot be reached yields a
    /// zero-valued solution, not an error.
    fn max_flow(
        &self,
        graph: &CapacitatedGraph,
        source: &str,
        sink: &str,
    ) -> Result<FlowSolution, SolveError>;
}

/// Computes a maximum flow with the default algorithm.
pub fn max_flow(
    graph: &CapacitatedGraph,
    source: &str,
    sink: &str,
) -> Result<FlowSolution, SolveError> {
    Dinic::default().max_flow(graph, source, sink)
}

/// Algorithm selection with default options.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    #[display(fmt = "dinic")]
    Dinic,
    #[display(fmt = "edmonds-karp")]
    EdmondsKarp,
}

impl MaxFlowAlgo for Algorithm {
    fn max_flow(
        &self,
        graph: &CapacitatedGraph,
        source: &str,
        sink: &str,
    ) -> Result<FlowSolution, SolveError> {
        match self {
            Algorithm::Dinic => Dinic::default().max_flow(graph, source, sink),
            Algorithm::EdmondsKarp => EdmondsKarp::default().max_flow(graph, source, sink),
        }
    }
}

/// The result of a maximum-flow computation.
#[derive(Debug, Clone)]
pub struct FlowSolution {
    /// The maximum flow value.
    pub value: Bandwidth,
    /// A flow assignment realizing `value`.
    pub flows: FlowAssignment,
    /// The source side of a minimum cut: every node still reachable from the source in the
    /// final residual network.
    pub source_side: BTreeSet<String>,
}

/// Net directional flow per ordered node pair. Only strictly positive flows are stored, and a
/// pair never carries flow in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowAssignment {
    inner: BTreeMap<(String, String), Bandwidth>,
}

impl FlowAssignment {
    pub(crate) fn insert(&mut self, from: String, to: String, flow: Bandwidth) {
        self.inner.insert((from, to), flow);
    }

    /// The flow from `from` to `to`, or zero.
    pub fn get(&self, from: &str, to: &str) -> Bandwidth {
        self.inner
            .get(&(from.to_owned(), to.to_owned()))
            .copied()
            .unwrap_or(Bandwidth::ZERO)
    }

    /// Iterates over `(from, to, flow)` triples in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, Bandwidth)> + '_ {
        self.inner
            .iter()
            .map(|((from, to), &flow)| (from.as_str(), to.as_str(), flow))
    }

    /// Flow leaving `node` minus flow entering it.
    pub fn net_outflow(&self, node: &str) -> Bandwidth {
        self.iter()
            .map(|(from, to, flow)| {
                if from == node {
                    flow
                } else if to == node {
                    Bandwidth::ZERO - flow
                } else {
                    Bandwidth::ZERO
                }
            })
            .sum()
    }

    delegate::delegate! {
        to self.inner {
            pub fn len(&self) -> usize;

            pub fn is_empty(&self) -> bool;
        }
    }
}

/// Max-flow error.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The source and the sink are the same node. This is a configuration error.
    #[error("source and sink are the same node ({0})")]
    SourceIsSink(String),

    /// The source or the sink is not in the graph.
    #[error("node {0} is not in the graph")]
    UndeclaredNode(String),

    /// A path of infinite-capacity links joins the source and the sink.
    #[error("flow from {from} to {to} is unbounded")]
    Unbounded { from: String, to: String },

    /// The solver ran out of iterations before reaching a maximum flow.
    #[error("solver exceeded its iteration limit ({limit})")]
    IterationLimit { limit: usize },
}
