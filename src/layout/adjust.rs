use super::*;

const MAX_ASPECT: f64 = 1.5;
const MIN_ASPECT: f64 = 0.67;
const COLLISION_PASSES: usize = 50;
const PUSH_FORCE: f64 = 0.3;
const COLLISION_TOLERANCE: f64 = 1e-3;
pub(super) const COLLISION_NODE_THRESHOLD: usize = 15;

/// Squeezes whichever axis dominates so width/height ends up within
/// `[0.67, 1.5]`, scaling about the bounding-box center. Degenerate boxes
/// (zero width or height) are left alone.
pub(super) fn normalize_aspect_ratio(positions: &mut [Point]) {
    let Some(bounds) = Bounds::of(positions.iter().copied()) else {
        return;
    };
    let (width, height) = (bounds.width(), bounds.height());
    if !(width > 0.0 && height > 0.0) {
        return;
    }

    let ratio = width / height;
    let (scale_x, scale_y) = if ratio > MAX_ASPECT {
        (MAX_ASPECT / ratio, 1.0)
    } else if ratio < MIN_ASPECT {
        (1.0, ratio / MIN_ASPECT)
    } else {
        return;
    };

    tracing::debug!(ratio, scale_x, scale_y, "normalizing aspect ratio");
    let center = bounds.center();
    for p in positions.iter_mut() {
        p.x = center.x + (p.x - center.x) * scale_x;
        p.y = center.y + (p.y - center.y) * scale_y;
    }
}

/// Pairwise separation: every pair closer than `minimum_distance` is pushed
/// apart symmetrically by 30% of half the deficit per pass. Coincident pairs
/// split along the x axis. Returns the number of passes that moved anything.
pub(super) fn resolve_collisions(positions: &mut [Point], minimum_distance: f64) -> usize {
    let count = positions.len();
    let mut moving_passes = 0;

    for _ in 0..COLLISION_PASSES {
        let mut moved = false;
        for i in 0..count {
            for j in (i + 1)..count {
                let delta = positions[j] - positions[i];
                let distance = delta.length();
                if distance >= minimum_distance - COLLISION_TOLERANCE {
                    continue;
                }
                let direction = delta.normalize().unwrap_or(Point::new(1.0, 0.0));
                let push = direction * ((minimum_distance - distance) / 2.0 * PUSH_FORCE);
                positions[i] -= push;
                positions[j] += push;
                moved = true;
            }
        }
        if !moved {
            break;
        }
        moving_passes += 1;
    }

    moving_passes
}
