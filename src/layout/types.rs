use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::ir::{Edge, Graph, Node};

/// The placement that actually produced a layout's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    Empty,
    TwoNode,
    Triangle,
    Star,
    Hierarchical,
    Radial,
    Force,
}

impl Strategy {
    /// Fixed-shape placements skip aspect-ratio normalization; only an explicit
    /// collision request still applies to them.
    pub fn is_pattern(self) -> bool {
        matches!(self, Self::Triangle | Self::Star)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl NodeLayout {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<Edge>,
    pub strategy: Strategy,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// The positioned graph, every node carrying `Some` coordinates.
    pub fn into_graph(self) -> Graph {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| Node {
                id: node.id,
                label: node.label,
                x: Some(node.x),
                y: Some(node.y),
            })
            .collect();
        Graph {
            nodes,
            edges: self.edges,
        }
    }
}

/// Derived per-node topology, rebuilt on every layout call.
#[derive(Debug, Clone)]
pub(crate) struct NodeInfo {
    pub level: usize,
    pub children: Vec<usize>,
    pub parents: Vec<usize>,
    pub subtree_width: usize,
}
