use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::f64::consts::PI;

use crate::geometry::{Point, segment_distance};
use crate::ir::Edge;

use super::NodeLayout;

// ── Obstacle avoidance ──────────────────────────────────────────────
/// Extra clearance added to the inflated obstacle radius for waypoints.
const WAYPOINT_CLEARANCE: f64 = 10.0;
/// Candidate waypoints generated around each obstacle.
const WAYPOINTS_PER_OBSTACLE: usize = 8;
/// Integer cost multiplier so the search can use u64 costs.
const ASTAR_COST_SCALE: f64 = 1000.0;
/// Hard cap on search expansions per edge.
const ASTAR_MAX_EXPANSIONS: usize = 4096;

// ── Curve shapes ────────────────────────────────────────────────────
const DETOUR_INTENSITY: f64 = 0.3;
const FALLBACK_INTENSITY: f64 = 0.5;
const FANNED_MIN_INTENSITY: f64 = 0.2;

// ── Multi-edge fan ──────────────────────────────────────────────────
/// Total angular spread of a group of parallel edges.
const FAN_SPREAD: f64 = PI / 6.0;
/// Perpendicular distance between neighbouring edges of a group.
const FAN_OFFSET: f64 = 30.0;
/// Share of the fan offset applied to endpoints; waypoints take all of it.
const FAN_ENDPOINT_FACTOR: f64 = 0.3;

// ── Self loops ──────────────────────────────────────────────────────
const LOOP_HEIGHT: f64 = 30.0;
const LOOP_STACK_STEP: f64 = 15.0;

// ── Curve offsets ───────────────────────────────────────────────────
const CURVE_OFFSET: f64 = 50.0;
const CURVE_LEVEL_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptions {
    pub node_width: f64,
    pub node_height: f64,
    /// Clearance kept between a route and any node it passes.
    pub avoidance_margin: f64,
    /// Detours longer than the direct segment by more than this are dropped.
    pub max_detour: f64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            node_width: 80.0,
            node_height: 40.0,
            avoidance_margin: 20.0,
            max_detour: 200.0,
        }
    }
}

impl RouteOptions {
    fn node_radius(&self) -> f64 {
        self.node_width.min(self.node_height) / 2.0
    }

    fn obstacle_radius(&self) -> f64 {
        self.node_radius() + self.avoidance_margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Straight,
    Bezier,
}

impl CurveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Bezier => "bezier",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    pub points: Vec<Point>,
    pub curve: CurveKind,
    pub intensity: f64,
}

impl EdgePath {
    fn straight(start: Point, end: Point) -> Self {
        Self {
            points: vec![start, end],
            curve: CurveKind::Straight,
            intensity: 0.0,
        }
    }

    fn bezier(points: Vec<Point>, intensity: f64) -> Self {
        Self {
            points,
            curve: CurveKind::Bezier,
            intensity,
        }
    }
}

/// Routes every edge whose endpoints both exist, keyed by edge id.
///
/// Edges sharing an ordered `(source, target)` pair are routed once and then
/// fanned out so parallel edges stay distinguishable.
pub fn route_edges(
    nodes: &[NodeLayout],
    edges: &[Edge],
    options: &RouteOptions,
) -> HashMap<String, EdgePath> {
    let mut by_id: HashMap<&str, &NodeLayout> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }

    let mut group_index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<&Edge>> = Vec::new();
    for edge in edges {
        let key = (edge.source.as_str(), edge.target.as_str());
        let slot = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(edge);
    }

    let mut routes = HashMap::with_capacity(edges.len());
    for group in &groups {
        let first = group[0];
        let (Some(source), Some(target)) = (
            by_id.get(first.source.as_str()),
            by_id.get(first.target.as_str()),
        ) else {
            tracing::trace!(edge = %first.id, "skipping edge with missing endpoint");
            continue;
        };

        if first.is_self_loop() {
            for (slot, edge) in group.iter().enumerate() {
                routes.insert(edge.id.clone(), self_loop_path(source.center(), slot, options));
            }
            continue;
        }

        let base = base_route(source, target, nodes, options);
        for (slot, edge) in group.iter().enumerate() {
            let path = fan_out(&base, slot, group.len(), source.center(), target.center());
            routes.insert(edge.id.clone(), path);
        }
    }
    routes
}

/// Signed perpendicular offset of each edge within its group of parallel
/// edges (same ordered `(source, target)` pair): `30 × (i − (k−1)/2)`.
/// Lone edges and self-loops get 0.
pub fn fan_offsets(edges: &[Edge]) -> HashMap<String, f64> {
    let mut group_sizes: HashMap<(&str, &str), usize> = HashMap::new();
    for edge in edges.iter().filter(|edge| !edge.is_self_loop()) {
        *group_sizes
            .entry((edge.source.as_str(), edge.target.as_str()))
            .or_insert(0) += 1;
    }

    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();
    edges
        .iter()
        .map(|edge| {
            let key = (edge.source.as_str(), edge.target.as_str());
            let offset = match group_sizes.get(&key) {
                Some(&total) if !edge.is_self_loop() => {
                    let slot = slots.entry(key).or_insert(0);
                    let offset = fan_distance(*slot, total);
                    *slot += 1;
                    offset
                }
                _ => 0.0,
            };
            (edge.id.clone(), offset)
        })
        .collect()
}

fn fan_distance(slot: usize, total: usize) -> f64 {
    FAN_OFFSET * (slot as f64 - total.saturating_sub(1) as f64 / 2.0)
}

/// Bend applied to each drawn edge. Edges spanning more than 100 units
/// vertically bow by ±50, alternating between repeated uses of the same
/// unordered node pair. Graphs of exactly three nodes and three edges stay
/// straight.
pub fn curve_offsets(nodes: &[NodeLayout], edges: &[Edge]) -> HashMap<String, f64> {
    if nodes.len() == 3 && edges.len() == 3 {
        return edges.iter().map(|edge| (edge.id.clone(), 0.0)).collect();
    }

    let mut by_id: HashMap<&str, &NodeLayout> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }

    let mut pair_uses: HashMap<(&str, &str), usize> = HashMap::new();
    let mut offsets = HashMap::with_capacity(edges.len());
    for edge in edges {
        let offset = match (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) {
            (Some(source), Some(target)) if (target.y - source.y).abs() > CURVE_LEVEL_THRESHOLD => {
                let key = if edge.source <= edge.target {
                    (edge.source.as_str(), edge.target.as_str())
                } else {
                    (edge.target.as_str(), edge.source.as_str())
                };
                let uses = pair_uses.entry(key).or_insert(0);
                let sign = if *uses % 2 == 0 { 1.0 } else { -1.0 };
                *uses += 1;
                CURVE_OFFSET * sign
            }
            _ => 0.0,
        };
        offsets.insert(edge.id.clone(), offset);
    }
    offsets
}

/// Point on `from`'s circle facing `toward`.
fn boundary_point(from: Point, toward: Point, radius: f64) -> Point {
    let direction = (toward - from).normalize().unwrap_or(Point::new(1.0, 0.0));
    from + direction * radius
}

fn base_route(
    source: &NodeLayout,
    target: &NodeLayout,
    nodes: &[NodeLayout],
    options: &RouteOptions,
) -> EdgePath {
    let radius = options.node_radius();
    let start = boundary_point(source.center(), target.center(), radius);
    let end = boundary_point(target.center(), source.center(), radius);

    let obstacles: Vec<Point> = nodes
        .iter()
        .filter(|node| node.id != source.id && node.id != target.id)
        .map(NodeLayout::center)
        .collect();

    if segment_is_clear(start, end, &obstacles, options.obstacle_radius()) {
        return EdgePath::straight(start, end);
    }

    match find_detour(start, end, &obstacles, options) {
        Some(points) => EdgePath::bezier(points, DETOUR_INTENSITY),
        None => EdgePath::bezier(vec![start, end], FALLBACK_INTENSITY),
    }
}

fn segment_is_clear(start: Point, end: Point, obstacles: &[Point], radius: f64) -> bool {
    obstacles
        .iter()
        .all(|&center| segment_distance(start, end, center) > radius)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SearchEntry {
    est: u64,
    cost: u64,
    waypoint: usize,
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .est
            .cmp(&self.est)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.waypoint.cmp(&self.waypoint))
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn scaled_cost(distance: f64) -> u64 {
    (distance * ASTAR_COST_SCALE).round() as u64
}

/// A* over a visibility graph of candidate points ringed around each
/// obstacle. Returns the waypoint chain from `start` to `end` when one exists
/// within the allowed detour.
fn find_detour(
    start: Point,
    end: Point,
    obstacles: &[Point],
    options: &RouteOptions,
) -> Option<Vec<Point>> {
    let blocked_radius = options.obstacle_radius();
    let ring_radius = blocked_radius + WAYPOINT_CLEARANCE;
    let step = 2.0 * PI / WAYPOINTS_PER_OBSTACLE as f64;

    let mut waypoints = Vec::with_capacity(obstacles.len() * WAYPOINTS_PER_OBSTACLE + 2);
    waypoints.push(start);
    for &center in obstacles {
        for slot in 0..WAYPOINTS_PER_OBSTACLE {
            waypoints.push(center + Point::polar(ring_radius, slot as f64 * step));
        }
    }
    waypoints.push(end);
    let goal = waypoints.len() - 1;

    let mut best_cost = vec![u64::MAX; waypoints.len()];
    let mut prev: Vec<Option<usize>> = vec![None; waypoints.len()];
    let mut heap = BinaryHeap::new();
    best_cost[0] = 0;
    heap.push(SearchEntry {
        est: scaled_cost(start.distance(end)),
        cost: 0,
        waypoint: 0,
    });

    let mut expansions = 0usize;
    let mut reached = false;
    while let Some(SearchEntry { cost, waypoint, .. }) = heap.pop() {
        if cost != best_cost[waypoint] {
            continue;
        }
        if waypoint == goal {
            reached = true;
            break;
        }
        expansions += 1;
        if expansions > ASTAR_MAX_EXPANSIONS {
            break;
        }

        let current = waypoints[waypoint];
        for (next, &point) in waypoints.iter().enumerate() {
            if next == waypoint || !segment_is_clear(current, point, obstacles, blocked_radius) {
                continue;
            }
            let next_cost = cost.saturating_add(scaled_cost(current.distance(point)));
            if next_cost >= best_cost[next] {
                continue;
            }
            best_cost[next] = next_cost;
            prev[next] = Some(waypoint);
            heap.push(SearchEntry {
                est: next_cost.saturating_add(scaled_cost(point.distance(end))),
                cost: next_cost,
                waypoint: next,
            });
        }
    }

    if !reached {
        tracing::trace!(expansions, "no detour found");
        return None;
    }

    let mut chain = vec![goal];
    let mut cursor = goal;
    while let Some(parent) = prev[cursor] {
        chain.push(parent);
        cursor = parent;
    }
    chain.reverse();
    let points: Vec<Point> = chain.into_iter().map(|idx| waypoints[idx]).collect();

    let length: f64 = points.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
    if length - start.distance(end) > options.max_detour {
        tracing::trace!(length, "detour too long");
        return None;
    }
    Some(points)
}

/// Spreads edge `slot` of `total` parallel edges across the fan.
fn fan_out(base: &EdgePath, slot: usize, total: usize, source: Point, target: Point) -> EdgePath {
    if total <= 1 {
        return base.clone();
    }

    let angle_step = FAN_SPREAD / (total - 1) as f64;
    let fan_angle = -FAN_SPREAD / 2.0 + angle_step * slot as f64;
    let direction = (target - source).angle() + fan_angle;
    // Signed so edges land on both sides of the base route.
    let distance = fan_distance(slot, total);
    let offset = Point::polar(distance, direction + PI / 2.0);

    let last = base.points.len() - 1;
    let points = base
        .points
        .iter()
        .enumerate()
        .map(|(idx, &point)| {
            let factor = if idx == 0 || idx == last {
                FAN_ENDPOINT_FACTOR
            } else {
                1.0
            };
            point + offset * factor
        })
        .collect();

    EdgePath {
        points,
        curve: base.curve,
        intensity: base.intensity.max(FANNED_MIN_INTENSITY),
    }
}

/// A small loop over the top of the node; repeated loops stack upward.
fn self_loop_path(center: Point, slot: usize, options: &RouteOptions) -> EdgePath {
    let radius = options.node_radius();
    let start = center + Point::polar(radius, -2.0 * PI / 3.0);
    let end = center + Point::polar(radius, -PI / 3.0);
    let apex = center - Point::new(0.0, radius + LOOP_HEIGHT + LOOP_STACK_STEP * slot as f64);
    EdgePath::bezier(vec![start, apex, end], FALLBACK_INTENSITY)
}
