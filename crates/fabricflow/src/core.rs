//! Core FabricFlow data structures, traits, and routines. The most common entry point is
//! [run()], which builds a [fabric](TopologyKind), solves it with a [max-flow
//! algorithm](MaxFlowAlgo), and returns an [annotated graph](Analysis).

pub use fabricflow_core::*;
