//! Force-directed vertex placement (Fruchterman–Reingold).
//!
//! Seeded, so the same graph and seed always produce the same picture.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pull toward the origin so isolated vertices stay near the cast.
const GRAVITY: f64 = 0.05;
/// Starting step limit; cools linearly to zero.
const INITIAL_TEMPERATURE: f64 = 0.1;
const MIN_DISTANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Lay out `vertex_count` vertices connected by `(a, b, weight)` edges.
///
/// Heavier edges pull harder. Coordinates are in an arbitrary unit space;
/// use [`fit_to_canvas`] to map them to pixels.
pub fn fruchterman_reingold(
    vertex_count: usize,
    edges: &[(usize, usize, f64)],
    iterations: usize,
    seed: u64,
) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<Point> = (0..vertex_count)
        .map(|_| Point::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)))
        .collect();

    if vertex_count < 2 {
        return positions.into_iter().map(|_| Point::new(0.0, 0.0)).collect();
    }

    let k = (1.0 / vertex_count as f64).sqrt();
    let mut displacement = vec![Point::new(0.0, 0.0); vertex_count];

    for step in 0..iterations {
        let temperature = INITIAL_TEMPERATURE * (1.0 - step as f64 / iterations as f64);
        displacement.fill(Point::new(0.0, 0.0));

        for v in 0..vertex_count {
            for u in (v + 1)..vertex_count {
                let dx = positions[v].x - positions[u].x;
                let dy = positions[v].y - positions[u].y;
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                displacement[v].x += fx;
                displacement[v].y += fy;
                displacement[u].x -= fx;
                displacement[u].y -= fy;
            }
        }

        for &(a, b, weight) in edges {
            if a == b || a >= vertex_count || b >= vertex_count {
                continue;
            }
            let dx = positions[a].x - positions[b].x;
            let dy = positions[a].y - positions[b].y;
            let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let force = dist * dist / k * weight;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            displacement[a].x -= fx;
            displacement[a].y -= fy;
            displacement[b].x += fx;
            displacement[b].y += fy;
        }

        for (pos, disp) in positions.iter_mut().zip(&mut displacement) {
            let r = (pos.x * pos.x + pos.y * pos.y).sqrt();
            if r > MIN_DISTANCE {
                let pull = GRAVITY * r * r / k;
                disp.x -= pos.x / r * pull;
                disp.y -= pos.y / r * pull;
            }

            let len = (disp.x * disp.x + disp.y * disp.y).sqrt();
            if len > MIN_DISTANCE {
                let step_len = len.min(temperature);
                pos.x += disp.x / len * step_len;
                pos.y += disp.y / len * step_len;
            }
        }
    }

    positions
}

/// Scale and center points into `width × height` minus `margin` on every
/// side, preserving aspect ratio.
pub fn fit_to_canvas(points: &[Point], width: f64, height: f64, margin: f64) -> Vec<Point> {
    let center = Point::new(width / 2.0, height / 2.0);
    if points.is_empty() {
        return Vec::new();
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let span = (max_x - min_x).max(max_y - min_y);
    if span <= MIN_DISTANCE {
        return vec![center; points.len()];
    }

    let usable = (width - 2.0 * margin).min(height - 2.0 * margin).max(0.0);
    let scale = usable / span;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;
    points
        .iter()
        .map(|p| {
            Point::new(
                center.x + (p.x - mid_x) * scale,
                center.y + (p.y - mid_y) * scale,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: Point, b: Point) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn layout_is_deterministic() {
        let edges = vec![(0, 1, 1.0), (1, 2, 3.0), (2, 3, 1.0)];
        let a = fruchterman_reingold(5, &edges, 200, 42);
        let b = fruchterman_reingold(5, &edges, 200, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let edges = vec![(0, 1, 1.0)];
        let a = fruchterman_reingold(4, &edges, 50, 1);
        let b = fruchterman_reingold(4, &edges, 50, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn connected_pair_ends_closer_than_isolated_vertex() {
        let edges = vec![(0, 1, 5.0)];
        let points = fruchterman_reingold(3, &edges, 500, 7);
        assert!(dist(points[0], points[1]) < dist(points[0], points[2]));
        assert!(dist(points[0], points[1]) < dist(points[1], points[2]));
    }

    #[test]
    fn tiny_graphs() {
        assert!(fruchterman_reingold(0, &[], 10, 0).is_empty());
        assert_eq!(fruchterman_reingold(1, &[], 10, 0), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn fitted_points_stay_inside_margin() {
        let points = fruchterman_reingold(8, &[(0, 1, 1.0), (2, 3, 2.0)], 300, 3);
        let fitted = fit_to_canvas(&points, 1000.0, 800.0, 80.0);
        for p in &fitted {
            assert!(p.x >= 80.0 - 1e-6 && p.x <= 920.0 + 1e-6, "x out of range: {}", p.x);
            assert!(p.y >= 80.0 - 1e-6 && p.y <= 720.0 + 1e-6, "y out of range: {}", p.y);
        }
    }

    #[test]
    fn single_point_is_centered() {
        let fitted = fit_to_canvas(&[Point::new(3.0, -2.0)], 1000.0, 1000.0, 80.0);
        assert_eq!(fitted, vec![Point::new(500.0, 500.0)]);
    }
}
