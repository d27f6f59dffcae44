//! Adjacency-list graph files. Every node gets a row listing its neighbors together with the
//! capacity and, where set, the flow of the connecting link. Each undirected link therefore
//! appears in two rows.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use fabricflow_core::{Bandwidth, CapacitatedGraph, Link, Node};

use crate::{Error, Format};

/// A graph in adjacency-list form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdjacencyData {
    /// Always `false`.
    pub directed: bool,
    /// Always `false`.
    pub multigraph: bool,
    /// Graph-level attributes.
    #[serde(default)]
    pub graph: BTreeMap<String, String>,
    /// Nodes, in insertion order.
    pub nodes: Vec<Node>,
    /// One row per entry of `nodes`.
    pub adjacency: Vec<Vec<Neighbor>>,
}

/// One entry of an adjacency row.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Neighbor {
    /// The node on the other end of the link.
    pub id: String,
    /// Link capacity.
    pub capacity: Bandwidth,
    /// Link flow, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Bandwidth>,
}

impl AdjacencyData {
    /// Converts a graph to adjacency form.
    pub fn from_graph(graph: &CapacitatedGraph) -> Self {
        let nodes = graph.nodes().cloned().collect::<Vec<_>>();
        let adjacency = nodes
            .iter()
            .map(|n| {
                let mut row = graph
                    .links_of(&n.id)
                    .map(|(other, link)| Neighbor {
                        id: other.id.clone(),
                        capacity: link.capacity,
                        flow: link.flow,
                    })
                    .collect::<Vec<_>>();
                row.sort_by(|a, b| a.id.cmp(&b.id));
                row
            })
            .collect();
        Self {
            directed: false,
            multigraph: false,
            graph: BTreeMap::new(),
            nodes,
            adjacency,
        }
    }

    /// Restores a validated graph. A link listed in both of its rows is added once.
    pub fn into_graph(self) -> Result<CapacitatedGraph, Error> {
        if self.nodes.len() != self.adjacency.len() {
            return Err(Error::MalformedAdjacency {
                nodes: self.nodes.len(),
                rows: self.adjacency.len(),
            });
        }
        let mut g = CapacitatedGraph::default();
        for n in &self.nodes {
            g.add_node(n.clone())?;
        }
        for (n, row) in self.nodes.iter().zip(self.adjacency) {
            for Neighbor { id, capacity, flow } in row {
                if g.link(&n.id, &id).is_some() {
                    continue;
                }
                let mut link = Link::new(n.id.clone(), id, capacity);
                link.flow = flow;
                g.add_link(link)?;
            }
        }
        Ok(g)
    }
}

/// Writes a graph as adjacency data in JSON or MsgPack format.
pub fn write_graph(graph: &CapacitatedGraph, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let format = Format::of(path)?;
    let data = AdjacencyData::from_graph(graph);
    match format {
        Format::Json => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer(writer, &data)?;
        }
        Format::MsgPack => {
            // Named encoding, so skipped optional fields stay decodable.
            let buf = rmp_serde::to_vec_named(&data)?;
            std::fs::write(path, buf)?;
        }
        Format::Dhall => return Err(Error::UnknownFileType(path.into())),
    }
    Ok(())
}

/// Reads a graph from adjacency data in JSON or MsgPack format.
pub fn read_graph(path: impl AsRef<Path>) -> Result<CapacitatedGraph, Error> {
    let path = path.as_ref();
    let data: AdjacencyData = match Format::of(path)? {
        Format::Json => {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        }
        Format::MsgPack => {
            let reader = BufReader::new(File::open(path)?);
            rmp_serde::decode::from_read(reader)?
        }
        Format::Dhall => return Err(Error::UnknownFileType(path.into())),
    };
    data.into_graph()
}
