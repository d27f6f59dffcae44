use log::debug;

use super::residual::Residual;
use super::{FlowSolution, MaxFlowAlgo, SolveError};
use crate::network::CapacitatedGraph;

/// Dinic's blocking-flow algorithm, `O(V²·E)`.
///
/// Each phase builds a level graph with a breadth-first search and saturates it with
/// depth-first augmentations.
#[derive(Debug, Clone, Default, typed_builder::TypedBuilder)]
pub struct Dinic {
    /// Upper bound on the number of phases.
    #[builder(default, setter(strip_option))]
    pub max_phases: Option<usize>,
}

impl MaxFlowAlgo for Dinic {
    fn max_flow(
        &self,
        graph: &CapacitatedGraph,
        source: &str,
        sink: &str,
    ) -> Result<FlowSolution, SolveError> {
        let mut net = Residual::new(graph, source, sink)?;
        let mut phases = 0;
        loop {
            let search = net.search();
            if !search.reaches(net.sink) {
                break;
            }
            if let Some(limit) = self.max_phases {
                if phases >= limit {
                    return Err(SolveError::IterationLimit { limit });
                }
            }
            phases += 1;
            let mut next = vec![0; net.nr_nodes()];
            let mut blocking = 0.0;
            while let Some(pushed) = augment(&mut net, &search.levels, &mut next) {
                blocking += pushed;
            }
            debug!("dinic phase {phases}: pushed {blocking}, total {}", net.value());
        }
        Ok(net.into_solution(graph))
    }
}

/// Finds one source-sink path in the level graph and saturates its bottleneck. `next` holds,
/// per node, the first arc that may still lead somewhere; arcs out of dead ends are skipped for
/// the rest of the phase. Returns `None` once the level graph is blocked.
fn augment(net: &mut Residual, levels: &[Option<usize>], next: &mut [usize]) -> Option<f64> {
    let mut path = Vec::new();
    let mut u = net.source;
    while u != net.sink {
        let mut advanced = false;
        while next[u] < net.adj[u].len() {
            let arc = net.adj[u][next[u]];
            let v = net.arcs[arc].to;
            let downhill = matches!((levels[u], levels[v]), (Some(lu), Some(lv)) if lv == lu + 1);
            if downhill && net.has_room(arc) {
                path.push(arc);
                u = v;
                advanced = true;
                break;
            }
            next[u] += 1;
        }
        if !advanced {
            // Dead end: retreat one hop and skip the arc that led here.
            let arc = path.pop()?;
            u = net.tail(arc);
            next[u] += 1;
        }
    }
    let pushed = path
        .iter()
        .map(|&arc| net.room(arc))
        .fold(f64::INFINITY, f64::min);
    for &arc in &path {
        net.push(arc, pushed);
    }
    Some(pushed)
}
