use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::{FlowAssignment, FlowSolution, SolveError, EPSILON};
use crate::network::CapacitatedGraph;
use crate::units::Bandwidth;

#[derive(Debug, Clone, Copy, derive_new::new)]
pub(super) struct Arc {
    pub(super) to: usize,
    cap: f64,
    #[new(default)]
    flow: f64,
}

/// A residual network. Link `i` of the graph becomes arcs `2i` (declared direction) and
/// `2i + 1` (reverse), so the partner of arc `k` is always `k ^ 1`.
#[derive(Debug)]
pub(super) struct Residual {
    pub(super) adj: Vec<Vec<usize>>,
    pub(super) arcs: Vec<Arc>,
    pub(super) source: usize,
    pub(super) sink: usize,
    /// Room at or below this is treated as saturated.
    tolerance: f64,
}

/// Breadth-first search results over arcs with room left.
#[derive(Debug)]
pub(super) struct Search {
    pub(super) levels: Vec<Option<usize>>,
    pub(super) parents: Vec<Option<usize>>,
}

impl Search {
    pub(super) fn reaches(&self, node: usize) -> bool {
        self.levels[node].is_some()
    }
}

impl Residual {
    pub(super) fn new(
        graph: &CapacitatedGraph,
        source: &str,
        sink: &str,
    ) -> Result<Self, SolveError> {
        if source == sink {
            return Err(SolveError::SourceIsSink(source.to_owned()));
        }
        let s = graph
            .idx_of(source)
            .ok_or_else(|| SolveError::UndeclaredNode(source.to_owned()))?;
        let t = graph
            .idx_of(sink)
            .ok_or_else(|| SolveError::UndeclaredNode(sink.to_owned()))?;
        let g = &graph.graph;
        let mut adj = vec![Vec::new(); g.node_count()];
        let mut arcs = Vec::with_capacity(2 * g.edge_count());
        for e in g.edge_references() {
            let (a, b) = (e.source().index(), e.target().index());
            let cap = e.weight().capacity.into_f64();
            // CORRECTNESS: arc indices line up with edge indices.
            debug_assert_eq!(arcs.len(), 2 * e.id().index());
            adj[a].push(arcs.len());
            arcs.push(Arc::new(b, cap));
            adj[b].push(arcs.len());
            arcs.push(Arc::new(a, cap));
        }
        let scale = arcs
            .iter()
            .map(|arc| arc.cap)
            .filter(|cap| cap.is_finite())
            .fold(0.0, f64::max);
        let net = Self {
            adj,
            arcs,
            source: s.index(),
            sink: t.index(),
            tolerance: scale * EPSILON,
        };
        if net.is_unbounded() {
            return Err(SolveError::Unbounded {
                from: source.to_owned(),
                to: sink.to_owned(),
            });
        }
        Ok(net)
    }

    pub(super) fn nr_nodes(&self) -> usize {
        self.adj.len()
    }

    pub(super) fn room(&self, arc: usize) -> f64 {
        let Arc { cap, flow, .. } = self.arcs[arc];
        cap - flow
    }

    pub(super) fn has_room(&self, arc: usize) -> bool {
        self.room(arc) > self.tolerance
    }

    /// Pushes `amount` along `arc`, which frees the same amount on its partner.
    pub(super) fn push(&mut self, arc: usize, amount: f64) {
        self.arcs[arc].flow += amount;
        self.arcs[arc ^ 1].flow -= amount;
    }

    /// The node an arc leaves from.
    pub(super) fn tail(&self, arc: usize) -> usize {
        self.arcs[arc ^ 1].to
    }

    pub(super) fn search(&self) -> Search {
        let n = self.nr_nodes();
        let mut levels = vec![None; n];
        let mut parents = vec![None; n];
        levels[self.source] = Some(0);
        let mut queue = VecDeque::from([self.source]);
        while let Some(u) = queue.pop_front() {
            let next_level = levels[u].map(|l| l + 1);
            for &arc in &self.adj[u] {
                let v = self.arcs[arc].to;
                if levels[v].is_none() && self.has_room(arc) {
                    levels[v] = next_level;
                    parents[v] = Some(arc);
                    queue.push_back(v);
                }
            }
        }
        Search { levels, parents }
    }

    /// True if the source reaches the sink over infinite-capacity arcs alone.
    fn is_unbounded(&self) -> bool {
        let mut seen = vec![false; self.nr_nodes()];
        seen[self.source] = true;
        let mut stack = vec![self.source];
        while let Some(u) = stack.pop() {
            for &arc in &self.adj[u] {
                let Arc { to, cap, .. } = self.arcs[arc];
                if cap.is_infinite() && !seen[to] {
                    if to == self.sink {
                        return true;
                    }
                    seen[to] = true;
                    stack.push(to);
                }
            }
        }
        false
    }

    pub(super) fn value(&self) -> f64 {
        self.adj[self.source]
            .iter()
            .map(|&arc| self.arcs[arc].flow)
            .sum()
    }

    pub(super) fn into_solution(self, graph: &CapacitatedGraph) -> FlowSolution {
        let g = &graph.graph;
        let name = |i: usize| g[NodeIndex::new(i)].id.clone();
        let mut flows = FlowAssignment::default();
        for pair in self.arcs.chunks_exact(2) {
            let (fwd, rev) = (pair[0], pair[1]);
            // `fwd` runs from `rev.to` to `fwd.to`.
            if fwd.flow > self.tolerance {
                flows.insert(name(rev.to), name(fwd.to), Bandwidth::new(fwd.flow));
            } else if rev.flow > self.tolerance {
                flows.insert(name(fwd.to), name(rev.to), Bandwidth::new(rev.flow));
            }
        }
        let search = self.search();
        let source_side = (0..self.nr_nodes())
            .filter(|&i| search.reaches(i))
            .map(name)
            .collect::<BTreeSet<_>>();
        FlowSolution {
            value: Bandwidth::new(self.value()),
            flows,
            source_side,
        }
    }
}
