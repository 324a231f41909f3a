use crate::layout::Layout;
use crate::layout::routing::{RouteOptions, curve_offsets, route_edges};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub strategy: String,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub curve_offset: f64,
    /// Absent for edges whose endpoints are not both in the layout.
    pub route: Option<RouteDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDump {
    pub curve_type: &'static str,
    pub curve_intensity: f64,
    pub points: Vec<[f64; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, route_options: &RouteOptions) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.x,
                y: node.y,
            })
            .collect();

        let mut routes = route_edges(&layout.nodes, &layout.edges, route_options);
        let offsets = curve_offsets(&layout.nodes, &layout.edges);
        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                curve_offset: offsets.get(&edge.id).copied().unwrap_or(0.0),
                route: routes.remove(&edge.id).map(|path| RouteDump {
                    curve_type: path.curve.as_str(),
                    curve_intensity: path.intensity,
                    points: path
                        .points
                        .iter()
                        .map(|p| {
                            let p = p.rounded();
                            [p.x, p.y]
                        })
                        .collect(),
                }),
            })
            .collect();

        LayoutDump {
            strategy: format!("{:?}", layout.strategy),
            nodes,
            edges,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or stdout when `None`.
pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &Layout,
    route_options: &RouteOptions,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, route_options);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutOptions;
    use crate::ir::{Edge, Graph};
    use crate::layout::compute_layout;

    #[test]
    fn dump_carries_strategy_positions_and_routes() {
        let mut graph = Graph::new();
        graph.ensure_node("A", Some("Alpha".to_string()));
        graph.ensure_node("B", None);
        graph.add_edge("A", "B");
        graph.edges.push(Edge::new("ghost", "A", "nowhere"));
        let layout = compute_layout(&graph, &LayoutOptions::default());

        let dump = LayoutDump::from_layout(&layout, &RouteOptions::default());
        assert_eq!(dump.strategy, "TwoNode");
        assert_eq!(dump.nodes[0].x, -75.0);
        assert_eq!(dump.nodes[0].label, "Alpha");
        let route = dump.edges[0].route.as_ref().unwrap();
        assert_eq!(route.curve_type, "straight");
        assert_eq!(route.points, vec![[-55.0, 0.0], [55.0, 0.0]]);
        assert!(dump.edges[1].route.is_none());

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["edges"][0]["curveOffset"], 0.0);
        assert_eq!(json["edges"][0]["route"]["curveIntensity"], 0.0);
    }
}
