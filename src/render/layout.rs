//! Force-directed (Fruchterman-Reingold) node placement.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Minimum distance between two nodes when computing forces.
const MIN_DISTANCE: f64 = 0.01;
/// Average displacement below which the layout is considered settled.
const THRESHOLD: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    /// Optimal distance between nodes.
    pub k: f64,
    pub iterations: usize,
    /// Seed for the initial positions, so a table always renders the same way.
    pub seed: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            k: 1.0,
            iterations: 50,
            seed: 42,
        }
    }
}

/// Positions for `node_count` nodes connected by `edges` (pairs of node indices).
///
/// The result is centered on the origin and scaled so the largest coordinate has magnitude 1.
/// Edge direction and self-loops do not influence the layout.
pub fn spring_layout(
    node_count: usize,
    edges: &[(usize, usize)],
    settings: &LayoutSettings,
) -> Vec<(f64, f64)> {
    match node_count {
        0 => return Vec::new(),
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    let mut adjacent = vec![vec![false; node_count]; node_count];
    for &(a, b) in edges {
        if a != b && a < node_count && b < node_count {
            adjacent[a][b] = true;
            adjacent[b][a] = true;
        }
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut pos: Vec<(f64, f64)> = (0..node_count)
        .map(|_| (rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
        .collect();

    let spread = |pos: &[(f64, f64)]| {
        let (min_x, max_x, min_y, max_y) = pos.iter().fold(
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
            |(a, b, c, d), &(x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
        );
        (max_x - min_x).max(max_y - min_y)
    };

    let k = settings.k;
    let mut temperature = spread(&pos) * 0.1;
    let cooling = temperature / (settings.iterations as f64 + 1.0);

    for _ in 0..settings.iterations {
        let mut total_moved = 0.0;
        let mut next = pos.clone();
        for i in 0..node_count {
            let (mut dx, mut dy) = (0.0, 0.0);
            for j in 0..node_count {
                if i == j {
                    continue;
                }
                let delta = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                let distance = delta.0.hypot(delta.1).max(MIN_DISTANCE);
                let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                let force = k * k / (distance * distance) - attraction;
                dx += delta.0 * force;
                dy += delta.1 * force;
            }
            let mut length = dx.hypot(dy);
            if length < MIN_DISTANCE {
                length = 0.1;
            }
            let step = (dx * temperature / length, dy * temperature / length);
            next[i] = (pos[i].0 + step.0, pos[i].1 + step.1);
            total_moved += step.0.hypot(step.1);
        }
        pos = next;
        temperature -= cooling;
        if total_moved / (node_count as f64) < THRESHOLD {
            break;
        }
    }

    rescale(pos)
}

fn rescale(mut pos: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let (sum_x, sum_y) = pos.iter().fold((0.0, 0.0), |(a, b), &(x, y)| (a + x, b + y));
    let (mean_x, mean_y) = (sum_x / n, sum_y / n);
    for p in pos.iter_mut() {
        p.0 -= mean_x;
        p.1 -= mean_y;
    }
    let limit = pos
        .iter()
        .fold(0.0_f64, |acc, &(x, y)| acc.max(x.abs()).max(y.abs()));
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= limit;
            p.1 /= limit;
        }
    }
    pos
}
