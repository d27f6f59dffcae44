//! Builders for data-center fabrics. Structure is deterministic; link capacities and the
//! choice of traffic injection and extraction servers come from a caller-provided RNG.

use itertools::Itertools;
use log::debug;
use rand::prelude::*;

use crate::network::types::{Link, Node, SINK, SOURCE};
use crate::network::{CapacitatedGraph, GraphError};
use crate::units::Bandwidth;

/// The shape of fabric to build.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// Servers under leaves, with a full leaf-spine mesh.
    #[display(fmt = "clos")]
    Clos,
    /// A Clos fabric plus a direct link between every pair of leaves.
    #[display(fmt = "block2block")]
    Block2Block,
}

/// Fabric sizing and capacity candidates.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct TopologyParams {
    /// Number of servers.
    pub servers: usize,
    /// Number of leaf switches.
    pub leaves: usize,
    /// Number of spine switches.
    pub spines: usize,
    /// Servers attached to each leaf. Server `i` attaches to leaf `i / servers_per_leaf`.
    pub servers_per_leaf: usize,
    /// Candidate capacities for server-leaf and leaf-spine links.
    pub capacities: Vec<Bandwidth>,
    /// Candidate capacities for leaf-leaf links. Required for [`TopologyKind::Block2Block`].
    #[builder(default, setter(strip_option))]
    pub block_capacities: Option<Vec<Bandwidth>>,
    /// Number of servers attached to the source.
    pub sources: usize,
    /// Number of servers attached to the sink.
    pub sinks: usize,
}

impl TopologyParams {
    /// Checks the parameters for `kind`.
    ///
    /// Correctness properties:
    ///
    /// - Every count must be at least 1.
    /// - Capacity lists must be non-empty, with finite non-negative entries.
    /// - A block-to-block list must be given for `Block2Block`.
    /// - Sources and sinks together must not outnumber the servers.
    /// - Every server must land on an existing leaf.
    /// - Derived counts must not overflow `usize`.
    pub fn validate(&self, kind: TopologyKind) -> Result<(), ConfigError> {
        let counts = [
            ("servers", self.servers),
            ("leaves", self.leaves),
            ("spines", self.spines),
            ("servers_per_leaf", self.servers_per_leaf),
            ("sources", self.sources),
            ("sinks", self.sinks),
        ];
        if let Some(&(name, _)) = counts.iter().find(|&&(_, n)| n == 0) {
            return Err(ConfigError::ZeroCount { name });
        }
        validate_capacities("capacities", &self.capacities)?;
        if kind == TopologyKind::Block2Block {
            let block = self
                .block_capacities
                .as_deref()
                .ok_or(ConfigError::MissingBlockCapacities)?;
            validate_capacities("block_capacities", block)?;
        }
        let endpoints = self.sources.checked_add(self.sinks);
        if endpoints.map_or(true, |n| n > self.servers) {
            return Err(ConfigError::TooManyEndpoints {
                sources: self.sources,
                sinks: self.sinks,
                servers: self.servers,
            });
        }
        let slots = self
            .leaves
            .checked_mul(self.servers_per_leaf)
            .ok_or(ConfigError::Overflow {
                name: "leaves * servers_per_leaf",
            })?;
        if self.servers > slots {
            return Err(ConfigError::TooManyServers {
                servers: self.servers,
                leaves: self.leaves,
                per_leaf: self.servers_per_leaf,
            });
        }
        Ok(())
    }
}

fn validate_capacities(name: &'static str, caps: &[Bandwidth]) -> Result<(), ConfigError> {
    if caps.is_empty() {
        return Err(ConfigError::EmptyCapacities { name });
    }
    match caps
        .iter()
        .find(|c| !(c.is_finite() && c.is_valid_capacity()))
    {
        Some(&capacity) => Err(ConfigError::InvalidCapacity { name, capacity }),
        None => Ok(()),
    }
}

/// A built fabric.
#[derive(Debug, Clone)]
pub struct Topology {
    pub kind: TopologyKind,
    pub graph: CapacitatedGraph,
    /// Servers attached to the source, in sampling order.
    pub sources: Vec<String>,
    /// Servers attached to the sink, in sampling order.
    pub sinks: Vec<String>,
}

impl TopologyKind {
    /// Builds a fabric. Parameters are validated before anything is drawn from `rng`.
    ///
    /// Capacities are drawn uniformly and independently per link, with replacement. The source
    /// and sink servers are sampled together without replacement, so the two sets are disjoint.
    pub fn build(self, params: &TopologyParams, mut rng: impl Rng) -> Result<Topology, ConfigError> {
        params.validate(self)?;
        let TopologyParams {
            servers,
            leaves,
            spines,
            servers_per_leaf,
            ref capacities,
            ref block_capacities,
            sources,
            sinks,
        } = *params;

        let mut g = CapacitatedGraph::default();
        let row = |i: usize, n: usize| (i as f64 + 0.5) / n as f64;
        for i in 0..servers {
            g.add_node(Node::new_server(i).with_pos(row(i, servers), 0.0))?;
        }
        for j in 0..leaves {
            g.add_node(Node::new_leaf(j).with_pos(row(j, leaves), 1.0))?;
        }
        for k in 0..spines {
            g.add_node(Node::new_spine(k).with_pos(row(k, spines), 2.0))?;
        }
        g.add_node(Node::new_source().with_pos(0.0, -1.0))?;
        g.add_node(Node::new_sink().with_pos(1.0, -1.0))?;

        let leaf = |j: usize| Node::new_leaf(j).id;
        let server = |i: usize| Node::new_server(i).id;

        // Full leaf-spine mesh
        for (j, k) in (0..leaves).cartesian_product(0..spines) {
            let cap = draw(&mut rng, capacities);
            g.add_link(Link::new(leaf(j), Node::new_spine(k).id, cap))?;
        }
        // Servers fill leaves in order; the last leaf may be partially filled.
        for i in 0..servers {
            let cap = draw(&mut rng, capacities);
            g.add_link(Link::new(server(i), leaf(i / servers_per_leaf), cap))?;
        }
        if self == TopologyKind::Block2Block {
            let block = block_capacities
                .as_deref()
                .ok_or(ConfigError::MissingBlockCapacities)?;
            for (a, b) in (0..leaves).tuple_combinations() {
                let cap = draw(&mut rng, block);
                g.add_link(Link::new(leaf(a), leaf(b), cap))?;
            }
        }

        let chosen = rand::seq::index::sample(&mut rng, servers, sources + sinks).into_vec();
        let (src_idxs, sink_idxs) = chosen.split_at(sources);
        let sources = src_idxs.iter().map(|&i| server(i)).collect::<Vec<_>>();
        let sinks = sink_idxs.iter().map(|&i| server(i)).collect::<Vec<_>>();
        for s in &sources {
            g.add_link(Link::new(SOURCE, s.clone(), Bandwidth::INFINITY))?;
        }
        for s in &sinks {
            g.add_link(Link::new(s.clone(), SINK, Bandwidth::INFINITY))?;
        }

        debug!(
            "built {self} fabric: {} nodes, {} links, {} sources, {} sinks",
            g.nr_nodes(),
            g.nr_links(),
            sources.len(),
            sinks.len()
        );
        Ok(Topology {
            kind: self,
            graph: g,
            sources,
            sinks,
        })
    }
}

fn draw(rng: &mut impl Rng, candidates: &[Bandwidth]) -> Bandwidth {
    candidates[rng.gen_range(0..candidates.len())]
}

/// Invalid fabric parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("{name} must not be empty")]
    EmptyCapacities { name: &'static str },

    #[error("{name} contains invalid capacity {capacity}")]
    InvalidCapacity {
        name: &'static str,
        capacity: Bandwidth,
    },

    #[error("block2block topology requires block-to-block capacities")]
    MissingBlockCapacities,

    #[error("{sources} sources and {sinks} sinks exceed the {servers} available servers")]
    TooManyEndpoints {
        sources: usize,
        sinks: usize,
        servers: usize,
    },

    #[error("{servers} servers do not fit on {leaves} leaves of {per_leaf} servers each")]
    TooManyServers {
        servers: usize,
        leaves: usize,
        per_leaf: usize,
    },

    #[error("{name} does not fit in a machine word")]
    Overflow { name: &'static str },

    #[error("failed to assemble graph")]
    Graph(#[from] GraphError),
}
