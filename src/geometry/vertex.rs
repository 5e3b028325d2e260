use serde::{Deserialize, Serialize};

use crate::math::Point2;

/// A map position, stored latitude first.
///
/// Vertices carry no identity beyond their position. Planar computations use
/// [`Vertex::to_point`], which flips to `(longitude, latitude)` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub lat: f64,
    pub lng: f64,
}

impl Vertex {
    /// Creates a vertex from latitude and longitude.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar point with `x = lng`, `y = lat`.
    #[must_use]
    pub fn to_point(self) -> Point2 {
        Point2::new(self.lng, self.lat)
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Inverse of [`Vertex::to_point`].
    #[must_use]
    pub fn from_point(p: Point2) -> Self {
        Self { lat: p.y, lng: p.x }
    }
}

impl From<(f64, f64)> for Vertex {
    /// Builds a vertex from a `(lat, lng)` pair.
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Converts a vertex slice to planar points.
#[must_use]
pub fn to_points(vertices: &[Vertex]) -> Vec<Point2> {
    vertices.iter().map(|v| v.to_point()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_axis_order_is_lng_lat() {
        let v = Vertex::new(8.5, 124.64);
        let p = v.to_point();
        assert_eq!(p.x, 124.64);
        assert_eq!(p.y, 8.5);
        assert_eq!(Vertex::from_point(p), v);
    }

    #[test]
    fn tuple_is_lat_lng() {
        let v: Vertex = (1.0, 2.0).into();
        assert_eq!(v.lat, 1.0);
        assert_eq!(v.lng, 2.0);
    }

    #[test]
    fn nan_and_infinity_are_not_finite() {
        assert!(Vertex::new(8.5, 124.64).is_finite());
        assert!(!Vertex::new(f64::NAN, 1.0).is_finite());
        assert!(!Vertex::new(1.0, f64::INFINITY).is_finite());
        assert!(!Vertex::new(f64::NEG_INFINITY, f64::NAN).is_finite());
    }

    #[test]
    fn serializes_with_named_axes() {
        let json = serde_json::to_string(&Vertex::new(1.5, -2.0)).unwrap_or_default();
        assert_eq!(json, r#"{"lat":1.5,"lng":-2.0}"#);
    }
}
