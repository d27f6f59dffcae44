use log::info;
use rand::Rng;

use crate::annotate::{self, Labels};
use crate::flow::{MaxFlowAlgo, SolveError};
use crate::network::types::{SINK, SOURCE};
use crate::network::{CapacitatedGraph, GraphError};
use crate::topology::{ConfigError, TopologyKind, TopologyParams};
use crate::units::Bandwidth;

/// A solved and annotated fabric.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The fabric, with flow attributes merged in.
    pub graph: CapacitatedGraph,
    /// Servers attached to the source.
    pub sources: Vec<String>,
    /// Servers attached to the sink.
    pub sinks: Vec<String>,
    /// The maximum flow from the source to the sink.
    pub value: Bandwidth,
    /// `flow/capacity` labels of links carrying flow.
    pub labels: Labels,
}

/// The core routine. This builds a fabric, computes the maximum flow between its aggregate
/// source and sink, and merges the flows back into the graph.
pub fn run<A>(
    kind: TopologyKind,
    params: &TopologyParams,
    algo: &A,
    rng: impl Rng,
) -> Result<Analysis, Error>
where
    A: MaxFlowAlgo + ?Sized,
{
    let topology = kind.build(params, rng)?;
    let mut graph = topology.graph;
    let solution = algo.max_flow(&graph, SOURCE, SINK)?;
    let labels = annotate::annotate(&mut graph, &solution.flows)?;
    info!(
        "{kind} fabric with {} servers: max flow {} over {} links",
        params.servers,
        solution.value,
        labels.len()
    );
    Ok(Analysis {
        graph,
        sources: topology.sources,
        sinks: topology.sinks,
        value: solution.value,
        labels,
    })
}

/// Errors from [`run`].
///
/// Endpoint problems found by the solver keep their [`SolveError`] form under `Solve`:
/// [`SolveError::SourceIsSink`] is a configuration error and [`SolveError::UndeclaredNode`] a
/// graph-integrity error, but neither arises here, since `run` always solves between the
/// fabric's own distinct `source` and `sink` nodes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid fabric parameters.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// Invalid graph, or a flow assignment that does not fit it.
    #[error("invalid graph")]
    Graph(#[from] GraphError),

    /// The solver failed. See [`SolveError`].
    #[error("failed to compute maximum flow")]
    Solve(#[from] SolveError),
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;

    use super::*;
    use crate::flow::{Algorithm, Dinic, FlowSolution};

    fn params() -> TopologyParams {
        TopologyParams::builder()
            .servers(8)
            .leaves(4)
            .spines(2)
            .servers_per_leaf(2)
            .capacities(vec![Bandwidth::new(10.0)])
            .block_capacities(vec![Bandwidth::new(10.0)])
            .sources(2)
            .sinks(2)
            .build()
    }

    #[test]
    fn uniform_clos_is_limited_by_server_links() -> anyhow::Result<()> {
        // Every link has capacity 10, so two sources can inject at most 20.
        let analysis = run(
            TopologyKind::Clos,
            &params(),
            &Dinic::default(),
            StdRng::seed_from_u64(0),
        )?;
        assert_eq!(analysis.value, Bandwidth::new(20.0));
        assert!(!analysis.labels.is_empty());
        for s in &analysis.sources {
            assert_eq!(
                analysis.graph.link(SOURCE, s).and_then(|l| l.flow),
                Some(Bandwidth::new(10.0))
            );
        }
        Ok(())
    }

    #[test]
    fn block2block_keeps_server_bound() -> anyhow::Result<()> {
        for algo in [Algorithm::Dinic, Algorithm::EdmondsKarp] {
            let analysis = run(
                TopologyKind::Block2Block,
                &params(),
                &algo,
                StdRng::seed_from_u64(9),
            )?;
            assert_eq!(analysis.value, Bandwidth::new(20.0));
            assert_eq!(analysis.graph.nr_links(), 4 * 2 + 8 + 4 * 3 / 2 + 2 + 2);
        }
        Ok(())
    }

    #[test]
    fn invalid_params_are_config_errors() {
        let mut params = params();
        params.sources = 7;
        let res = run(
            TopologyKind::Clos,
            &params,
            &Dinic::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(res, Err(Error::Config(ConfigError::TooManyEndpoints { .. }))));
    }

    /// Delegates to Dinic after checking the endpoints it is handed.
    struct EndpointCheck;

    impl MaxFlowAlgo for EndpointCheck {
        fn max_flow(
            &self,
            graph: &CapacitatedGraph,
            source: &str,
            sink: &str,
        ) -> Result<FlowSolution, SolveError> {
            assert_eq!((source, sink), (SOURCE, SINK));
            assert!(graph.contains_node(source) && graph.contains_node(sink));
            Dinic::default().max_flow(graph, source, sink)
        }
    }

    #[test]
    fn solver_sees_distinct_declared_endpoints() -> anyhow::Result<()> {
        for kind in [TopologyKind::Clos, TopologyKind::Block2Block] {
            run(kind, &params(), &EndpointCheck, StdRng::seed_from_u64(4))?;
        }
        let err = Error::from(SolveError::SourceIsSink(SOURCE.to_owned()));
        assert!(matches!(err, Error::Solve(SolveError::SourceIsSink(..))));
        Ok(())
    }
}
