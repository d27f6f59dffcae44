#![warn(unreachable_pub, missing_debug_implementations)]

//! The core FabricFlow library. This crate builds capacitated data-center fabrics and computes
//! the maximum traffic deliverable between their aggregate source and sink. The most common
//! entry point is [the routine](run::run) that builds, solves, and annotates a fabric in one go.

pub mod annotate;
pub mod bench;
pub mod flow;
pub mod network;
pub mod run;
pub mod topology;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

pub use annotate::{annotate, Labels};
pub use flow::{max_flow, Algorithm, FlowAssignment, FlowSolution, MaxFlowAlgo, SolveError};
pub use network::{
    types::{Link, Node, NodeKind, Position, SINK, SOURCE},
    CapacitatedGraph, GraphError,
};
pub use run::{run, Analysis, Error};
pub use topology::{ConfigError, Topology, TopologyKind, TopologyParams};
pub use units::Bandwidth;
