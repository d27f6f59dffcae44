//! Wall-clock measurements of fabric construction plus max-flow over increasing server counts.

use std::time::{Duration, Instant};

use log::debug;
use rand::prelude::*;
use rayon::prelude::*;

use crate::flow::{Algorithm, MaxFlowAlgo};
use crate::network::types::{SINK, SOURCE};
use crate::run::Error;
use crate::topology::{TopologyKind, TopologyParams};
use crate::units::Bandwidth;

/// Sweep options.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct BenchOpts {
    /// Base seed. The run for `n` servers uses `seed + n`.
    #[builder(default)]
    pub seed: u64,
    /// Candidate link capacities.
    #[builder(default = vec![Bandwidth::new(10.0), Bandwidth::new(40.0), Bandwidth::new(100.0)])]
    pub capacities: Vec<Bandwidth>,
    #[builder(default)]
    pub algorithm: Algorithm,
    /// Run sizes concurrently. Each size still gets its own RNG and graph.
    #[builder(default)]
    pub parallel: bool,
}

/// One measurement.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BenchRecord {
    pub servers: usize,
    pub nodes: usize,
    pub links: usize,
    pub value: Bandwidth,
    pub elapsed: Duration,
}

/// Clos sizing for `servers` servers: half as many leaves, a quarter as many spines, two servers
/// per leaf, and half of the servers each as sources and sinks.
pub fn params_for(servers: usize, capacities: Vec<Bandwidth>) -> TopologyParams {
    TopologyParams::builder()
        .servers(servers)
        .leaves(servers / 2)
        .spines(servers / 4)
        .servers_per_leaf(2)
        .capacities(capacities)
        .sources(servers / 2)
        .sinks(servers / 2)
        .build()
}

/// Builds and solves one fabric, timing both steps together.
pub fn measure(servers: usize, opts: &BenchOpts) -> Result<BenchRecord, Error> {
    let params = params_for(servers, opts.capacities.clone());
    let rng = StdRng::seed_from_u64(opts.seed.wrapping_add(servers as u64));
    let start = Instant::now();
    let topology = TopologyKind::Clos.build(&params, rng)?;
    let solution = opts.algorithm.max_flow(&topology.graph, SOURCE, SINK)?;
    let elapsed = start.elapsed();
    debug!("{servers} servers: max flow {} in {elapsed:?}", solution.value);
    Ok(BenchRecord {
        servers,
        nodes: topology.graph.nr_nodes(),
        links: topology.graph.nr_links(),
        value: solution.value,
        elapsed,
    })
}

/// Measures every size in `sizes`, calling `on_record` as each measurement finishes. Records
/// are returned in the order of `sizes`.
pub fn sweep<F>(sizes: &[usize], opts: &BenchOpts, on_record: F) -> Result<Vec<BenchRecord>, Error>
where
    F: Fn(&BenchRecord) + Sync,
{
    let run_one = |&n: &usize| -> Result<BenchRecord, Error> {
        let record = measure(n, opts)?;
        on_record(&record);
        Ok(record)
    };
    if opts.parallel {
        sizes.par_iter().map(run_one).collect()
    } else {
        sizes.iter().map(run_one).collect()
    }
}
