use super::*;

const SEED_RADIUS: f64 = 200.0;
const REPULSION_SCALE: f64 = 1000.0;
const ATTRACTION_SCALE: f64 = 0.01;
const DAMPING: f64 = 0.9;

/// Iteration budget for a force layout chosen explicitly or by `auto`.
pub(super) fn force_iterations(node_count: usize, explicit: bool) -> usize {
    let per_node = if explicit { 4 } else { 3 };
    150usize.min(node_count * per_node)
}

/// Start positions: caller-supplied coordinates where both are present,
/// otherwise a slot on a circle of radius 200.
pub(super) fn seed_positions(graph: &Graph) -> Vec<Point> {
    let count = graph.nodes.len().max(1) as f64;
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| match node.position() {
            Some(p) if p.x.is_finite() && p.y.is_finite() => Point::new(p.x, p.y),
            _ => Point::polar(SEED_RADIUS, idx as f64 / count * 2.0 * PI),
        })
        .collect()
}

/// Spring embedder: inverse-square repulsion between every pair, linear
/// attraction along every edge, forces applied with a fixed damping factor.
/// Coincident pairs exert no force on each other.
pub(super) fn run_force_simulation(
    positions: &mut [Point],
    topology: &Topology,
    strength: f64,
    iterations: usize,
) {
    let count = positions.len();
    let mut forces = vec![Point::ZERO; count];

    for _ in 0..iterations {
        forces.iter_mut().for_each(|f| *f = Point::ZERO);

        for i in 0..count {
            for j in (i + 1)..count {
                let delta = positions[j] - positions[i];
                let distance = delta.length();
                let Some(direction) = delta.normalize() else {
                    continue;
                };
                let push = direction * (strength * REPULSION_SCALE / (distance * distance));
                forces[i] -= push;
                forces[j] += push;
            }
        }

        for (from, targets) in topology.forward.iter().enumerate() {
            for &to in targets {
                let delta = positions[to] - positions[from];
                let Some(direction) = delta.normalize() else {
                    continue;
                };
                let pull = direction * (strength * delta.length() * ATTRACTION_SCALE);
                forces[from] += pull;
                forces[to] -= pull;
            }
        }

        for (position, force) in positions.iter_mut().zip(&forces) {
            let step = *force * DAMPING;
            if step.is_finite() {
                *position += step;
            }
        }
    }
}

pub(super) fn force_positions(
    graph: &Graph,
    topology: &Topology,
    options: &LayoutOptions,
    iterations: usize,
) -> Vec<Point> {
    let mut positions = seed_positions(graph);
    run_force_simulation(&mut positions, topology, options.force_strength, iterations);
    positions
}
