use std::cmp::Ordering;

use super::{Point2, ANGULAR_TOLERANCE, TOLERANCE};

/// Orientation of the turn `a -> b -> c`.
///
/// Returns `Ordering::Greater` for a counter-clockwise turn, `Ordering::Less` for a
/// clockwise turn and `Ordering::Equal` when the three points are collinear
/// within [`ANGULAR_TOLERANCE`] (relative to the lengths of `b - a` and `c - a`).
#[must_use]
pub fn orientation_2d(a: &Point2, b: &Point2, c: &Point2) -> Ordering {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.perp(&ac);
    let scale = ab.norm() * ac.norm();
    if scale < TOLERANCE * TOLERANCE || cross.abs() <= ANGULAR_TOLERANCE * scale {
        return Ordering::Equal;
    }
    cross.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
}

/// Returns `true` if `p` lies within the axis-aligned bounding box of `a`..`b`.
///
/// Only meaningful when `p` is already known to be collinear with `a` and `b`.
fn within_box(a: &Point2, b: &Point2, p: &Point2) -> bool {
    p.x >= a.x.min(b.x) - TOLERANCE
        && p.x <= a.x.max(b.x) + TOLERANCE
        && p.y >= a.y.min(b.y) - TOLERANCE
        && p.y <= a.y.max(b.y) + TOLERANCE
}

/// Closed segment-segment intersection test in 2D.
///
/// Touching endpoints and collinear overlap both count as intersecting.
#[must_use]
pub fn segments_intersect_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> bool {
    let o1 = orientation_2d(a0, a1, b0);
    let o2 = orientation_2d(a0, a1, b1);
    let o3 = orientation_2d(b0, b1, a0);
    let o4 = orientation_2d(b0, b1, a1);

    let straddles = |p: Ordering, q: Ordering| {
        p != Ordering::Equal && q != Ordering::Equal && p != q
    };
    if straddles(o1, o2) && straddles(o3, o4) {
        return true;
    }

    (o1 == Ordering::Equal && within_box(a0, a1, b0))
        || (o2 == Ordering::Equal && within_box(a0, a1, b1))
        || (o3 == Ordering::Equal && within_box(b0, b1, a0))
        || (o4 == Ordering::Equal && within_box(b0, b1, a1))
}
