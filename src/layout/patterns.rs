use super::*;

/// Roles of a transitive triangle `A -> B`, `A -> C`, `B -> C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Triangle {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

/// Matches exactly three nodes and three edges with degree signatures
/// A(out 2, in 0), B(1, 1), C(0, 2) and the edge set `{A->B, A->C, B->C}`.
/// Out-degree counts distinct targets; in-degree counts edges.
pub(crate) fn detect_triangle(graph: &Graph, index: &HashMap<&str, usize>) -> Option<Triangle> {
    if graph.nodes.len() != 3 || graph.edges.len() != 3 {
        return None;
    }

    let mut targets: Vec<HashSet<usize>> = vec![HashSet::new(); 3];
    let mut in_degree = [0usize; 3];
    for edge in &graph.edges {
        let (Some(&from), Some(&to)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        targets[from].insert(to);
        in_degree[to] += 1;
    }

    let (mut a, mut b, mut c) = (None, None, None);
    for idx in 0..3 {
        match (targets[idx].len(), in_degree[idx]) {
            (2, 0) => a = Some(idx),
            (1, 1) => b = Some(idx),
            (0, 2) => c = Some(idx),
            _ => {}
        }
    }
    let (a, b, c) = (a?, b?, c?);

    (targets[a].contains(&b) && targets[a].contains(&c) && targets[b].contains(&c))
        .then_some(Triangle { a, b, c })
}

/// A and B share the top row, C sits centred below them.
pub(crate) fn triangle_positions(triangle: Triangle, options: &LayoutOptions) -> Vec<Point> {
    let half_width = options.horizontal_spacing;
    let height = options.vertical_spacing * 1.2;
    let mut positions = vec![Point::ZERO; 3];
    positions[triangle.a] = Point::new(-half_width, 0.0);
    positions[triangle.b] = Point::new(half_width, 0.0);
    positions[triangle.c] = Point::new(0.0, height);
    positions
}

/// Index of the hub when the graph is a star: one center adjacent to every
/// other node, each of which touches nothing but the center.
pub(crate) fn detect_star(topology: &Topology) -> Option<usize> {
    let count = topology.len();
    if count < 3 {
        return None;
    }

    let mut center = 0;
    for idx in 1..count {
        if topology.degree(idx) > topology.degree(center) {
            center = idx;
        }
    }
    if topology.degree(center) * 2 < count {
        return None;
    }

    let spokes: HashSet<usize> = topology.neighbors(center).collect();
    if spokes.len() != count - 1 {
        return None;
    }
    let leaf_only = spokes.iter().all(|&spoke| {
        topology.degree(spoke) == 1 && topology.neighbors(spoke).all(|n| n == center)
    });
    leaf_only.then_some(center)
}

/// Hub at the origin, spokes evenly spaced on a circle starting at the top.
pub(crate) fn star_positions(topology: &Topology, center: usize, options: &LayoutOptions) -> Vec<Point> {
    let count = topology.len();
    let spokes = count - 1;
    let radius = (options.horizontal_spacing * 1.2).max(spokes as f64 * 30.0);
    let step = 2.0 * PI / spokes as f64;

    let mut positions = vec![Point::ZERO; count];
    let mut slot = 0usize;
    for (idx, position) in positions.iter_mut().enumerate() {
        if idx == center {
            continue;
        }
        *position = Point::polar(radius, -PI / 2.0 + step * slot as f64);
        slot += 1;
    }
    positions
}
