use super::{Point2, TOLERANCE};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. The ring is treated
/// as implicitly closed.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Arithmetic mean of the points, or `None` if there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn vertex_mean_2d(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Some(Point2::new(sx / n, sy / n))
}

/// Area-weighted centroid of an implicitly closed ring.
///
/// Coordinates are shifted to the first vertex before accumulation to keep
/// precision at geographic magnitudes. Zero-area rings fall back to the vertex
/// mean.
#[must_use]
pub fn polygon_centroid_2d(points: &[Point2]) -> Option<Point2> {
    let origin = *points.first()?;
    let n = points.len();
    if n < 3 {
        return vertex_mean_2d(points);
    }

    let shifted: Vec<Point2> = points.iter().map(|p| Point2::from(p - origin)).collect();
    let area2 = 2.0 * signed_area_2d(&shifted);
    let scale = shifted
        .iter()
        .map(|p| p.coords.norm_squared())
        .fold(0.0, f64::max);
    if area2.abs() <= TOLERANCE * scale.max(TOLERANCE) {
        return vertex_mean_2d(points);
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = shifted[i];
        let b = shifted[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }

    Some(Point2::new(
        origin.x + cx / (3.0 * area2),
        origin.y + cy / (3.0 * area2),
    ))
}

/// The point at half the total length of an open polyline.
///
/// A zero-length polyline yields its first point.
#[must_use]
pub fn path_midpoint_2d(points: &[Point2]) -> Option<Point2> {
    let first = *points.first()?;
    let total: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if total < TOLERANCE {
        return Some(first);
    }

    let mut remaining = total * 0.5;
    for w in points.windows(2) {
        let seg = w[1] - w[0];
        let len = seg.norm();
        if remaining <= len && len > 0.0 {
            return Some(w[0] + seg * (remaining / len));
        }
        remaining -= len;
    }
    points.last().copied()
}
