use log::trace;

use super::residual::Residual;
use super::{FlowSolution, MaxFlowAlgo, SolveError};
use crate::network::CapacitatedGraph;

/// Edmonds–Karp: repeatedly augment along a shortest path (by arc count), `O(V·E²)`.
#[derive(Debug, Clone, Default, typed_builder::TypedBuilder)]
pub struct EdmondsKarp {
    /// Upper bound on the number of augmenting paths.
    #[builder(default, setter(strip_option))]
    pub max_augmentations: Option<usize>,
}

impl MaxFlowAlgo for EdmondsKarp {
    fn max_flow(
        &self,
        graph: &CapacitatedGraph,
        source: &str,
        sink: &str,
    ) -> Result<FlowSolution, SolveError> {
        let mut net = Residual::new(graph, source, sink)?;
        let mut augmentations = 0;
        loop {
            let search = net.search();
            if !search.reaches(net.sink) {
                break;
            }
            if let Some(limit) = self.max_augmentations {
                if augmentations >= limit {
                    return Err(SolveError::IterationLimit { limit });
                }
            }
            augmentations += 1;
            // Walk the BFS tree back from the sink.
            let mut path = Vec::new();
            let mut cur = net.sink;
            while let Some(arc) = search.parents[cur] {
                path.push(arc);
                cur = net.tail(arc);
            }
            let bottleneck = path
                .iter()
                .map(|&arc| net.room(arc))
                .fold(f64::INFINITY, f64::min);
            for &arc in &path {
                net.push(arc, bottleneck);
            }
            trace!(
                "augmenting path {augmentations}: {} arcs, pushed {bottleneck}",
                path.len()
            );
        }
        Ok(net.into_solution(graph))
    }
}
