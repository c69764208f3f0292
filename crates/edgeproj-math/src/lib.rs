#![warn(missing_docs)]

//! Math types for the edgeproj hidden-line engine.
//!
//! Thin wrappers around nalgebra providing the value types the visibility
//! engine works with: points, vectors, affine transforms, an explicit
//! [`Axis`] used as the viewing axis, and the primitives [`Segment`],
//! [`Triangle`], [`Plane`], [`Aabb3`] and [`Ray`].

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

mod aabb;
mod ray;
mod segment;
mod triangle;

pub use aabb::Aabb3;
pub use ray::Ray;
pub use segment::Segment;
pub use triangle::{Plane, Triangle};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point on a 2D projection plane.
pub type Point2 = nalgebra::Point2<f64>;

/// General-purpose tolerance for normalized dot products, parametric
/// widths and squared point distances.
pub const EPSILON: f64 = 1e-10;

/// Minimum 3D length of a clipped sub-segment before it is treated as noise.
pub const DIST_THRESHOLD: f64 = 1e-10;

/// A coordinate axis.
///
/// Every operation that depends on the viewing direction takes an `Axis`
/// explicitly; there is no global "up" convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Index of this axis in a coordinate triple.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the positive axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::x(),
            Axis::Y => Vec3::y(),
            Axis::Z => Vec3::z(),
        }
    }

    /// The coordinate of `p` along this axis.
    #[inline]
    pub fn component(self, p: &Point3) -> f64 {
        p[self.index()]
    }

    /// The two remaining axes, ordered so that `(u, v, self)` is right-handed.
    pub fn plane_axes(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Project a point onto the plane perpendicular to this axis.
    pub fn project(self, p: &Point3) -> Point2 {
        let (u, v) = self.plane_axes();
        Point2::new(p[u.index()], p[v.index()])
    }

    /// Copy of `p` with the coordinate along this axis replaced by `value`.
    pub fn with_component(self, p: &Point3, value: f64) -> Point3 {
        let mut out = *p;
        out[self.index()] = value;
        out
    }
}

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// Applying the result is `self(other(p))`, i.e. `other` runs first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Transform::rotation_z(PI / 2.0);
        let p = Point3::new(1.0, 0.0, 0.0);
        let result = t.apply_point(&p);
        assert!(result.x.abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_x_maps_minus_y_to_z() {
        let t = Transform::rotation_x(-PI / 2.0);
        let v = t.apply_vec(&Vec3::new(0.0, -1.0, 0.0));
        assert!((v - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_compose_order() {
        // then() applies `other` first: translate, then rotate.
        let rotate = Transform::rotation_z(PI / 2.0);
        let shift = Transform::translation(1.0, 0.0, 0.0);
        let p = rotate.then(&shift).apply_point(&Point3::origin());
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::rotation_y(0.3));
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        let result = inv.apply_point(&t.apply_point(&p));
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_axis_plane_axes_right_handed() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let (u, v) = axis.plane_axes();
            let n = u.unit().cross(&v.unit());
            assert!((n - axis.unit()).norm() < 1e-12, "{:?}", axis);
        }
    }

    #[test]
    fn test_axis_projection() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::Z.project(&p), Point2::new(1.0, 2.0));
        assert_eq!(Axis::Y.project(&p), Point2::new(3.0, 1.0));
        assert_eq!(Axis::Z.with_component(&p, 0.0), Point3::new(1.0, 2.0, 0.0));
        assert_eq!(Axis::X.component(&p), 1.0);
    }
}
