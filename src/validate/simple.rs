use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geometry::vertex::{to_points, Vertex};
use crate::math::intersect_2d::{orientation_2d, segments_intersect_2d};
use crate::math::Point2;

/// A pair of ring edges that intersect or overlap.
///
/// Edge `i` runs from vertex `i` to vertex `(i + 1) % n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossing {
    /// Index of the first edge.
    pub edge_a: usize,
    /// Index of the second edge (always > `edge_a`).
    pub edge_b: usize,
}

/// Returns `true` if the ring formed by `vertices` does not intersect itself.
///
/// The ring is closed implicitly (last vertex connects to the first). Fewer
/// than three vertices cannot self-intersect and are reported as simple. A
/// ring of three or more with a non-finite coordinate is never simple.
#[must_use]
pub fn is_simple(vertices: &[Vertex]) -> bool {
    scan(vertices, true).is_empty()
}

/// Finds every offending edge pair of the implicitly closed ring.
///
/// Non-adjacent edges offend when they touch, cross or overlap. Adjacent edges
/// offend when they fold back onto each other, which includes zero-length
/// edges from repeated vertices.
///
/// If any vertex has a NaN or infinite coordinate, only the two edges meeting
/// at each such vertex are reported, since no other test is meaningful.
#[must_use]
pub fn find_crossings(vertices: &[Vertex]) -> Vec<Crossing> {
    scan(vertices, false)
}

fn scan(vertices: &[Vertex], stop_at_first: bool) -> Vec<Crossing> {
    let n = vertices.len();
    let mut results = Vec::new();
    if n < 3 {
        return results;
    }

    for (k, v) in vertices.iter().enumerate() {
        if !v.is_finite() {
            results.push(ordered((k + n - 1) % n, k));
            if stop_at_first {
                return results;
            }
        }
    }
    if !results.is_empty() {
        results.sort_by(|a, b| a.edge_a.cmp(&b.edge_a).then(a.edge_b.cmp(&b.edge_b)));
        return results;
    }

    let points = to_points(vertices);
    let edge = |i: usize| (&points[i], &points[(i + 1) % n]);

    for i in 0..n {
        let (a0, a1) = edge(i);

        // Adjacent edge i -> i + 1 shares vertex i + 1.
        let j = (i + 1) % n;
        if folds_back(a0, a1, edge(j).1) {
            results.push(ordered(i, j));
            if stop_at_first {
                return results;
            }
        }

        for j in (i + 2)..n {
            // Edge 0 and edge n - 1 share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b0, b1) = edge(j);
            if segments_intersect_2d(a0, a1, b0, b1) {
                results.push(Crossing { edge_a: i, edge_b: j });
                if stop_at_first {
                    return results;
                }
            }
        }
    }

    results.sort_by(|a, b| a.edge_a.cmp(&b.edge_a).then(a.edge_b.cmp(&b.edge_b)));
    results.dedup();
    results
}

/// Whether the path `p -> q -> r` doubles back over itself at `q`.
fn folds_back(p: &Point2, q: &Point2, r: &Point2) -> bool {
    orientation_2d(q, p, r) == Ordering::Equal && (p - q).dot(&(r - q)) >= 0.0
}

fn ordered(i: usize, j: usize) -> Crossing {
    Crossing {
        edge_a: i.min(j),
        edge_b: i.max(j),
    }
}
