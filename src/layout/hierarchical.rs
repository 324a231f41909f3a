use super::*;

const PARENT_PULL_COMPACT: f64 = 0.2;
const PARENT_PULL: f64 = 0.3;
const FORCE_REFINE_THRESHOLD: usize = 20;
const FORCE_REFINE_MAX_ITERATIONS: usize = 100;

/// Two nodes side by side on y = 0. With exactly one edge the source goes
/// left of the target.
pub(super) fn two_node_positions(topology: &Topology, options: &LayoutOptions) -> Vec<Point> {
    let half = options.horizontal_spacing / 2.0;
    let edge_count: usize = topology.forward.iter().map(Vec::len).sum();
    let target_first = edge_count == 1 && topology.forward[1].len() == 1;
    if target_first {
        vec![Point::new(half, 0.0), Point::new(-half, 0.0)]
    } else {
        vec![Point::new(-half, 0.0), Point::new(half, 0.0)]
    }
}

/// Horizontal gap between neighbours on a level holding `count` nodes.
pub(super) fn level_spacing(count: usize, options: &LayoutOptions) -> f64 {
    let base = options.horizontal_spacing;
    if options.compact_mode {
        let min_spacing = options.min_node_spacing;
        let max_spacing = if count > 1 {
            (options.max_width - options.node_width * count as f64) / (count as f64 - 1.0)
        } else {
            min_spacing
        };
        min_spacing.max((base * 0.7).min(max_spacing))
    } else {
        let density = (count as f64 / 4.0).max(1.0);
        let dynamic = base * (density * 1.5).min(3.0);
        let floor = base.max(options.node_width + 40.0);
        floor.max(dynamic)
    }
}

/// Layered placement: one row per topological level, widest subtrees first,
/// each node drawn slightly toward the mean x of its placed parents.
pub(super) fn hierarchical_positions(topology: &Topology, options: &LayoutOptions) -> Vec<Point> {
    let count = topology.len();
    if count == 2 {
        return two_node_positions(topology, options);
    }

    let infos = node_infos(topology);
    let max_level = infos.iter().map(|info| info.level).max().unwrap_or(0);
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_level + 1];
    for (idx, info) in infos.iter().enumerate() {
        rows[info.level].push(idx);
    }
    for row in &mut rows {
        row.sort_by_key(|&idx| Reverse(infos[idx].subtree_width));
    }

    let pull = if options.compact_mode {
        PARENT_PULL_COMPACT
    } else {
        PARENT_PULL
    };
    let mut placed: Vec<Option<Point>> = vec![None; count];

    for (level, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        let spacing = level_spacing(row.len(), options);
        let y = level as f64 * options.vertical_spacing + options.node_height / 2.0;
        let mut cursor = -((row.len() - 1) as f64) * spacing / 2.0;

        for &idx in row {
            let parents = &infos[idx].parents;
            if level > 0 && !parents.is_empty() {
                let (sum, seen) = parents
                    .iter()
                    .filter_map(|&parent| placed[parent])
                    .fold((0.0, 0usize), |(sum, seen), p| (sum + p.x, seen + 1));
                if seen > 0 {
                    let offset = sum / seen as f64 - cursor;
                    if offset.abs() < spacing / 3.0 {
                        cursor += offset * pull;
                    }
                }
            }
            placed[idx] = Some(Point::new(cursor, y));
            cursor += spacing;
        }
    }

    let mut positions: Vec<Point> = placed
        .into_iter()
        .map(|p| p.unwrap_or(Point::ZERO))
        .collect();

    if options.use_force_directed || (count > FORCE_REFINE_THRESHOLD && !options.compact_mode) {
        let iterations = FORCE_REFINE_MAX_ITERATIONS.min(count * 3);
        tracing::debug!(iterations, "refining layered layout with force simulation");
        run_force_simulation(&mut positions, topology, options.force_strength, iterations);
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology_of(nodes: &[&str], edges: &[(&str, &str)]) -> Topology {
        let mut graph = Graph::new();
        for id in nodes {
            graph.ensure_node(id, None);
        }
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        build_adjacency(&graph, &index_nodes(&graph))
    }

    #[test]
    fn two_nodes_put_source_left() {
        let options = LayoutOptions::default();
        let topo = topology_of(&["B", "A"], &[("A", "B")]);
        let positions = two_node_positions(&topo, &options);
        assert_eq!(positions[1], Point::new(-75.0, 0.0));
        assert_eq!(positions[0], Point::new(75.0, 0.0));

        let unconnected = topology_of(&["B", "A"], &[]);
        let positions = two_node_positions(&unconnected, &options);
        assert_eq!(positions[0], Point::new(-75.0, 0.0));
    }

    #[test]
    fn normal_spacing_grows_with_density_and_caps() {
        let options = LayoutOptions::default();
        assert_eq!(level_spacing(1, &options), 225.0);
        assert_eq!(level_spacing(4, &options), 225.0);
        assert_eq!(level_spacing(6, &options), 337.5);
        assert_eq!(level_spacing(8, &options), 450.0);
        assert_eq!(level_spacing(40, &options), 450.0);
    }

    #[test]
    fn compact_spacing_respects_budget() {
        let mut options = LayoutOptions::compact(800.0);
        assert_eq!(level_spacing(3, &options), 70.0);
        assert_eq!(level_spacing(1, &options), 50.0);
        options.max_width = 300.0;
        // (300 - 80 * 3) / 2 = 30, floored by min_node_spacing
        assert_eq!(level_spacing(3, &options), 50.0);
    }

    #[test]
    fn levels_stack_downward_widest_first() {
        let topo = topology_of(
            &["root", "a", "b", "l1", "l2"],
            &[("root", "a"), ("root", "b"), ("b", "l1"), ("b", "l2")],
        );
        let positions = hierarchical_positions(&topo, &LayoutOptions::default());
        assert_eq!(positions[0], Point::new(0.0, 20.0));
        assert_eq!(positions[1].y, 120.0);
        assert_eq!(positions[2].y, 120.0);
        assert_eq!(positions[3].y, 220.0);
        assert_eq!(positions[4].y, 220.0);
        assert_eq!(positions[2].x, -112.5);
        assert_eq!(positions[1].x, 112.5);
    }

    #[test]
    fn children_drift_toward_nearby_parents() {
        let topo = topology_of(
            &["p1", "p2", "p3", "p4", "c", "d"],
            &[("p2", "c"), ("p3", "d")],
        );
        let mut options = LayoutOptions::compact(800.0);
        options.max_width = 400.0;
        let positions = hierarchical_positions(&topo, &options);
        let xs: Vec<f64> = positions[..4].iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-75.0, -25.0, 25.0, 75.0]);
        assert!((positions[4].x - -33.0).abs() < 1e-9);
        assert!((positions[5].x - 34.6).abs() < 1e-9);
    }

    #[test]
    fn distant_parents_do_not_pull() {
        let topo = topology_of(&["p", "q", "c"], &[("p", "c")]);
        let positions = hierarchical_positions(&topo, &LayoutOptions::default());
        assert_eq!(positions[0].x, -112.5);
        assert_eq!(positions[2].x, 0.0);
    }
}
