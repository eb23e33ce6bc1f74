//! Affine transform utility
//!
//! Provides the 6-element affine matrix used to map object-local geometry
//! into page space and back. All coordinates are in page units (PDF
//! points) with a top-left origin unless stated otherwise.

use crate::tolerances::DETERMINANT_EPSILON;

/// A 2D point in page or object-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Affine transform matrix `[a, b, c, d, e, f]`
///
/// Maps `x' = a*x + c*y + e`, `y' = b*x + d*y + f`, the same element
/// layout PDF content streams use for their `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Matrix(pub [f64; 6]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Compose a matrix from translation, scale, and rotation.
    ///
    /// The resulting matrix applies scale first, then rotation, then
    /// translation, matching how a vector object's transform fields are
    /// interpreted for rendering.
    pub fn compose(left: f64, top: f64, scale_x: f64, scale_y: f64, angle_degrees: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Matrix([
            cos * scale_x,
            sin * scale_x,
            -sin * scale_y,
            cos * scale_y,
            left,
            top,
        ])
    }

    /// Translation-only matrix
    pub fn translate(dx: f64, dy: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, dx, dy])
    }

    /// Apply the forward transform to a point.
    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    /// Map a page-space point into this matrix's local frame.
    ///
    /// Solves the 2x2 linear system via the determinant. When the
    /// determinant's magnitude is below [`DETERMINANT_EPSILON`] the
    /// transform is degenerate (zero scale) and the input point is
    /// returned unchanged; hit-testing degrades gracefully instead of
    /// raising an error.
    pub fn invert_point(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        let det = a * d - b * c;
        if det.abs() < DETERMINANT_EPSILON {
            return p;
        }
        let dx = p.x - e;
        let dy = p.y - f;
        Point::new((dx * d - dy * c) / det, (dy * a - dx * b) / det)
    }

    /// Compose two matrices: the result applies `inner` first, then
    /// `outer`. Used to combine a group's transform with a child's before
    /// hit-testing group members.
    pub fn multiply(outer: &Matrix, inner: &Matrix) -> Matrix {
        let [oa, ob, oc, od, oe, of] = outer.0;
        let [ia, ib, ic, id, ie, if_] = inner.0;
        Matrix([
            oa * ia + oc * ib,
            ob * ia + od * ib,
            oa * ic + oc * id,
            ob * ic + od * id,
            oa * ie + oc * if_ + oe,
            ob * ie + od * if_ + of,
        ])
    }

    /// Average of the absolute axis scale factors.
    ///
    /// Used to fold a non-uniform scale into one effective radius when
    /// converting eraser discs into an object's local frame.
    pub fn average_scale(&self) -> f64 {
        let [a, b, c, d, _, _] = self.0;
        let sx = (a * a + b * b).sqrt();
        let sy = (c * c + d * d).sqrt();
        (sx + sy) / 2.0
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_identity_round_trip() {
        let p = Point::new(12.5, -3.75);
        let m = Matrix::IDENTITY;
        assert_eq!(m.apply(p), p);
        assert_eq!(m.invert_point(p), p);
    }

    #[test]
    fn test_compose_apply_invert_round_trip() {
        let m = Matrix::compose(40.0, -10.0, 2.0, 0.5, 33.0);
        let local = Point::new(7.0, 11.0);
        let world = m.apply(local);
        let back = m.invert_point(world);
        assert!((back.x - local.x).abs() < 1e-9);
        assert!((back.y - local.y).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_90_degrees() {
        let m = Matrix::compose(0.0, 0.0, 1.0, 1.0, 90.0);
        let world = m.apply(Point::new(10.0, 0.0));
        assert!((world.x - 0.0).abs() < 1e-9);
        assert!((world.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_transform_falls_back_to_identity() {
        let m = Matrix::compose(100.0, 100.0, 0.0, 0.0, 0.0);
        let p = Point::new(5.0, 6.0);
        // Zero scale means the determinant is zero; the point comes back
        // unchanged instead of producing NaN or panicking.
        assert_eq!(m.invert_point(p), p);
    }

    #[test]
    fn test_multiply_matches_sequential_application() {
        let outer = Matrix::compose(10.0, 20.0, 2.0, 2.0, 45.0);
        let inner = Matrix::compose(-5.0, 3.0, 1.0, 0.5, -30.0);
        let combined = Matrix::multiply(&outer, &inner);
        let p = Point::new(4.0, -2.0);
        let sequential = outer.apply(inner.apply(p));
        let direct = combined.apply(p);
        assert!((sequential.x - direct.x).abs() < 1e-9);
        assert!((sequential.y - direct.y).abs() < 1e-9);
    }

    #[test]
    fn test_average_scale_non_uniform() {
        let m = Matrix::compose(0.0, 0.0, 2.0, 4.0, 0.0);
        assert!((m.average_scale() - 3.0).abs() < 1e-9);
    }
}
