pub mod intersect_2d;
pub mod polygon_2d;

/// Planar point. `x` carries longitude and `y` carries latitude.
pub type Point2 = nalgebra::Point2<f64>;

/// Global geometric tolerance for absolute floating-point comparisons.
pub const TOLERANCE: f64 = 1e-12;

/// Relative tolerance for orientation tests.
///
/// Compared against the sine of the angle between two vectors, so it holds for
/// sub-metre edges expressed in degrees as well as for unit-scale test shapes.
pub const ANGULAR_TOLERANCE: f64 = 1e-10;
