use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            x: None,
            y: None,
        }
    }

    /// The node's coordinates when both are present.
    pub fn position(&self) -> Option<Position> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A directed graph as handed to the layout engine.
///
/// Node order is significant only for determinism: every placement tie is
/// broken by input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless one with the same id exists. An explicit label
    /// replaces the existing one.
    pub fn ensure_node(&mut self, id: &str, label: Option<String>) {
        if let Some(existing) = self.nodes.iter_mut().find(|node| node.id == id) {
            if let Some(label) = label {
                existing.label = label;
            }
            return;
        }
        let label = label.unwrap_or_else(|| id.to_string());
        self.nodes.push(Node::new(id, label));
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> &Edge {
        let id = format!("e{}", self.edges.len());
        self.edges.push(Edge::new(id, source, target));
        &self.edges[self.edges.len() - 1]
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
