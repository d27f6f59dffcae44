//! Configuration loading, graph files, and Graphviz output.

pub use fabricflow_utils::*;
