use super::*;

const MAX_RADIAL_ROOTS: usize = 3;
const NODES_PER_FALLBACK_RING: usize = 8;
const ROOT_OFFSET: f64 = 30.0;
const RING_SLOT: f64 = 25.0;

/// Concentric rings by BFS depth from the in-degree-0 roots. Graphs with no
/// root or more than three fall back to [`circular_positions`].
pub(super) fn radial_positions(topology: &Topology, options: &RadialOptions) -> Vec<Point> {
    let count = topology.len();
    let roots = topology.roots();
    if roots.is_empty() || roots.len() > MAX_RADIAL_ROOTS {
        tracing::debug!(roots = roots.len(), "no clear center, using circular fallback");
        return circular_positions(count, options);
    }

    let mut levels: Vec<Option<usize>> = vec![None; count];
    let mut queue = VecDeque::new();
    for &root in &roots {
        levels[root] = Some(0);
        queue.push_back(root);
    }
    while let Some(current) = queue.pop_front() {
        let Some(level) = levels[current] else {
            continue;
        };
        for &child in &topology.forward[current] {
            if levels[child].is_none() {
                levels[child] = Some(level + 1);
                queue.push_back(child);
            }
        }
    }

    // Nodes no root reaches share one ring outside everything else.
    let deepest = levels.iter().flatten().copied().max().unwrap_or(0);
    let mut rings: Vec<Vec<usize>> = vec![Vec::new(); deepest + 2];
    for (idx, level) in levels.iter().enumerate() {
        rings[level.unwrap_or(deepest + 1)].push(idx);
    }

    let mut positions = vec![Point::ZERO; count];
    for (level, ring) in rings.iter().enumerate() {
        if ring.is_empty() {
            continue;
        }
        if level == 0 {
            let middle = (ring.len() - 1) as f64 / 2.0;
            for (slot, &idx) in ring.iter().enumerate() {
                positions[idx] = Point::new((slot as f64 - middle) * ROOT_OFFSET, 0.0);
            }
            continue;
        }

        let radius = (options.center_radius + level as f64 * options.layer_spacing)
            .max(ring.len() as f64 * RING_SLOT);
        let step = 2.0 * PI / ring.len() as f64;
        // stagger odd rings by half a slot so spokes do not line up
        let offset = if level % 2 == 1 { step / 2.0 } else { 0.0 };
        for (slot, &idx) in ring.iter().enumerate() {
            positions[idx] = Point::polar(radius, offset + step * slot as f64);
        }
    }
    positions
}

/// Flat fallback: node `i` at angle `2πi/n`, stepping out one ring every
/// eight nodes.
pub(super) fn circular_positions(count: usize, options: &RadialOptions) -> Vec<Point> {
    (0..count)
        .map(|idx| {
            let angle = idx as f64 / count as f64 * 2.0 * PI;
            let ring = (idx / NODES_PER_FALLBACK_RING) as f64;
            Point::polar(options.center_radius + ring * options.layer_spacing, angle)
        })
        .collect()
}
