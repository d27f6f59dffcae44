//! Utilities for interfacing with FabricFlow: configuration files, graph files, and Graphviz
//! output.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

pub mod adjacency;
pub mod config;
pub mod dot;

use std::path::{Path, PathBuf};

use fabricflow_core::GraphError;

pub use adjacency::{read_graph, write_graph, AdjacencyData};
pub use config::{read_config, TopologyConfig};
pub use dot::{render_dot, write_dot};

/// The supported file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Json,
    Dhall,
    MsgPack,
}

impl Format {
    pub(crate) fn of(path: &Path) -> Result<Self, Error> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("dhall") => Ok(Format::Dhall),
            Some("msgpack") => Ok(Format::MsgPack),
            _ => Err(Error::UnknownFileType(path.into())),
        }
    }
}

/// Error kinds for configuration and graph I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown file type.
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Error deserializing Dhall.
    #[error("Dhall error")]
    Dhall(#[from] Box<serde_dhall::Error>),

    /// Error serializing/deserializing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Error serializing MsgPack.
    #[error("MsgPack encoding error")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// Error deserializing MsgPack.
    #[error("MsgPack decoding error")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// I/O error.
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// The adjacency lists do not line up with the node list.
    #[error("adjacency has {rows} rows for {nodes} nodes")]
    MalformedAdjacency {
        /// Number of nodes.
        nodes: usize,
        /// Number of adjacency rows.
        rows: usize,
    },

    /// Error constructing a valid graph.
    #[error("invalid graph")]
    Graph(#[from] GraphError),
}
