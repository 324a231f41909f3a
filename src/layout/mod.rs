mod adjust;
mod force;
mod hierarchical;
mod patterns;
mod radial;
pub mod routing;
mod select;
mod topology;
pub(crate) mod types;
pub use select::{Placement, graph_density, select_placement};
pub use types::*;
use adjust::*;
use force::*;
use hierarchical::*;
use patterns::*;
use radial::*;
use topology::*;

use crate::config::{LayoutMode, LayoutOptions, RadialOptions};
use crate::geometry::{Bounds, Point, round_to_fixed};
use crate::ir::Graph;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::PI;

/// Positions every node of `graph`.
///
/// The result holds the input nodes in input order with finite coordinates
/// rounded to six decimals, and the input edges untouched. Edges naming an
/// unknown node and self-loops are carried through but take no part in
/// placement.
pub fn compute_layout(graph: &Graph, options: &LayoutOptions) -> Layout {
    let _span = tracing::debug_span!(
        "compute_layout",
        nodes = graph.nodes.len(),
        edges = graph.edges.len()
    )
    .entered();

    if graph.nodes.is_empty() {
        return Layout {
            nodes: Vec::new(),
            edges: graph.edges.clone(),
            strategy: Strategy::Empty,
        };
    }

    let index = index_nodes(graph);
    let topology = build_adjacency(graph, &index);
    let (mut positions, strategy) = place_nodes(graph, &index, &topology, options);
    tracing::debug!(?strategy, "placed nodes");

    if strategy.is_pattern() {
        // fixed shapes keep their proportions but still honour an explicit
        // collision request
        if options.enable_collision_avoidance {
            separate(&mut positions, options);
        }
    } else {
        post_process(&mut positions, options);
    }

    let nodes = graph
        .nodes
        .iter()
        .zip(positions)
        .map(|(node, position)| NodeLayout {
            id: node.id.clone(),
            label: node.label.clone(),
            x: finite_or_zero(round_to_fixed(position.x)),
            y: finite_or_zero(round_to_fixed(position.y)),
        })
        .collect();

    Layout {
        nodes,
        edges: graph.edges.clone(),
        strategy,
    }
}

/// Same as [`compute_layout`] with default options when `None`, returning
/// the positioned graph itself.
pub fn calculate_layout(graph: &Graph, options: Option<&LayoutOptions>) -> Graph {
    let defaults;
    let options = match options {
        Some(options) => options,
        None => {
            defaults = LayoutOptions::default();
            &defaults
        }
    };
    compute_layout(graph, options).into_graph()
}

fn place_nodes(
    graph: &Graph,
    index: &HashMap<&str, usize>,
    topology: &Topology,
    options: &LayoutOptions,
) -> (Vec<Point>, Strategy) {
    let detect_patterns = matches!(
        options.layout_mode,
        LayoutMode::Auto | LayoutMode::Hierarchical
    );
    if detect_patterns {
        if let Some(triangle) = detect_triangle(graph, index) {
            return (triangle_positions(triangle, options), Strategy::Triangle);
        }
        if let Some(center) = detect_star(topology) {
            return (star_positions(topology, center, options), Strategy::Star);
        }
    }

    let count = topology.len();
    match select_placement(options.layout_mode, count, graph.edges.len()) {
        Placement::Hierarchical if count == 2 => {
            (two_node_positions(topology, options), Strategy::TwoNode)
        }
        Placement::Hierarchical => (
            hierarchical_positions(topology, options),
            Strategy::Hierarchical,
        ),
        Placement::Radial => (radial_positions(topology, &options.radial), Strategy::Radial),
        Placement::Force { explicit } => {
            let iterations = force_iterations(count, explicit);
            (
                force_positions(graph, topology, options, iterations),
                Strategy::Force,
            )
        }
    }
}

fn post_process(positions: &mut [Point], options: &LayoutOptions) {
    normalize_aspect_ratio(positions);
    if options.enable_collision_avoidance || positions.len() > COLLISION_NODE_THRESHOLD {
        separate(positions, options);
    }
}

fn separate(positions: &mut [Point], options: &LayoutOptions) {
    let passes = resolve_collisions(positions, options.minimum_distance());
    tracing::debug!(passes, "resolved collisions");
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Edge;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for id in nodes {
            graph.ensure_node(id, None);
        }
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    #[test]
    fn empty_graph_yields_empty_layout() {
        let layout = compute_layout(&Graph::new(), &LayoutOptions::default());
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.strategy, Strategy::Empty);
    }

    #[test]
    fn single_node_sits_on_first_row() {
        let layout = compute_layout(&graph(&["solo"], &[]), &LayoutOptions::default());
        assert_eq!(layout.strategy, Strategy::Hierarchical);
        assert_eq!(layout.nodes[0].x, 0.0);
        assert_eq!(layout.nodes[0].y, 20.0);
    }

    #[test]
    fn two_nodes_straddle_origin() {
        let layout = compute_layout(&graph(&["A", "B"], &[("A", "B")]), &LayoutOptions::default());
        assert_eq!(layout.strategy, Strategy::TwoNode);
        assert_eq!((layout.nodes[0].x, layout.nodes[0].y), (-75.0, 0.0));
        assert_eq!((layout.nodes[1].x, layout.nodes[1].y), (75.0, 0.0));
    }

    #[test]
    fn triangle_wins_over_auto_force() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let layout = compute_layout(&g, &LayoutOptions::default());
        assert_eq!(layout.strategy, Strategy::Triangle);
        assert_eq!(layout.node("A").unwrap().x, -150.0);
        assert_eq!(layout.node("B").unwrap().x, 150.0);
        assert_eq!(layout.node("C").unwrap().y, 120.0);
    }

    #[test]
    fn tight_triangle_still_separates_when_asked() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let options = LayoutOptions {
            horizontal_spacing: 30.0,
            vertical_spacing: 30.0,
            enable_collision_avoidance: true,
            ..LayoutOptions::default()
        };
        let layout = compute_layout(&g, &options);
        assert_eq!(layout.strategy, Strategy::Triangle);
        for (i, a) in layout.nodes.iter().enumerate() {
            for b in &layout.nodes[i + 1..] {
                let distance = a.center().distance(b.center());
                assert!(distance >= options.minimum_distance() * 0.99, "{distance}");
            }
        }

        let untouched = LayoutOptions {
            enable_collision_avoidance: false,
            ..options
        };
        let layout = compute_layout(&g, &untouched);
        assert_eq!(layout.node("A").unwrap().x, -30.0);
        assert_eq!(layout.node("B").unwrap().x, 30.0);
    }

    #[test]
    fn explicit_force_skips_patterns() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let options = LayoutOptions {
            layout_mode: LayoutMode::Force,
            ..LayoutOptions::default()
        };
        assert_eq!(compute_layout(&g, &options).strategy, Strategy::Force);
    }

    #[test]
    fn dangling_edges_and_self_loops_pass_through() {
        let mut g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        g.edges.push(Edge::new("loop", "A", "A"));
        g.edges.push(Edge::new("ghost", "A", "nowhere"));
        let layout = compute_layout(&g, &LayoutOptions::default());
        assert_eq!(layout.edges, g.edges);
        assert!(layout.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    }

    #[test]
    fn calculate_layout_fills_every_position() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("C", "D")]);
        let positioned = calculate_layout(&g, None);
        assert_eq!(positioned.nodes.len(), 4);
        assert!(positioned.nodes.iter().all(|n| n.position().is_some()));
        assert_eq!(positioned.edges, g.edges);
    }
}
