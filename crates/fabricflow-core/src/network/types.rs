use std::fmt;

use crate::units::Bandwidth;

/// A node in a capacitated graph. The ID is the unique key for the node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            pos: None,
        }
    }

    pub fn new_server(i: usize) -> Self {
        Self::new(format!("server{i}"), NodeKind::Server)
    }

    pub fn new_leaf(i: usize) -> Self {
        Self::new(format!("leaf{i}"), NodeKind::Leaf)
    }

    pub fn new_spine(i: usize) -> Self {
        Self::new(format!("spine{i}"), NodeKind::Spine)
    }

    pub fn new_source() -> Self {
        Self::new(SOURCE, NodeKind::Source)
    }

    pub fn new_sink() -> Self {
        Self::new(SINK, NodeKind::Sink)
    }

    pub fn with_pos(mut self, x: f64, y: f64) -> Self {
        self.pos = Some(Position { x, y });
        self
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The ID of the synthetic node aggregating all traffic injection points.
pub const SOURCE: &str = "source";

/// The ID of the synthetic node aggregating all traffic extraction points.
pub const SINK: &str = "sink";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Server,
    Leaf,
    Spine,
    Source,
    Sink,
    Other,
}

/// A 2-D layout coordinate. Only used when rendering.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// An undirected link. Both directions share `capacity`, and `flow` is only set once a flow
/// assignment has been merged into the graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub a: String,
    pub b: String,
    pub capacity: Bandwidth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Bandwidth>,
}

impl Link {
    pub fn new(a: impl Into<String>, b: impl Into<String>, capacity: impl Into<Bandwidth>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            capacity: capacity.into(),
            flow: None,
        }
    }

    pub fn connects(&self, x: &str, y: &str) -> bool {
        self.a == x && self.b == y || self.a == y && self.b == x
    }

    /// The `flow/capacity` label of this link, if it carries flow.
    pub fn label(&self) -> Option<String> {
        self.flow.map(|flow| format!("{}/{}", flow, self.capacity))
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "{}", self.capacity),
        }
    }
}
