//! Triangles and their supporting planes.

use crate::{Aabb3, Axis, Dir3, Point3, Segment, Vec3};

/// A plane `normal · p + constant = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Offset so that `normal · p + constant` is the signed distance.
    pub constant: f64,
}

impl Plane {
    /// Plane through `point` with the given normal.
    pub fn from_normal_and_point(normal: &Dir3, point: &Point3) -> Self {
        let normal = normal.into_inner();
        Self {
            normal,
            constant: -normal.dot(&point.coords),
        }
    }

    /// Signed distance from `p` to the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) + self.constant
    }

    /// The same plane with the normal reversed.
    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            constant: -self.constant,
        }
    }
}

/// A triangle in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub a: Point3,
    /// Second vertex.
    pub b: Point3,
    /// Third vertex.
    pub c: Point3,
}

impl Triangle {
    /// Create a triangle from its vertices.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    /// Vertices in winding order.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Edges in winding order: `a→b`, `b→c`, `c→a`.
    pub fn edges(&self) -> [Segment; 3] {
        [
            Segment::new(self.a, self.b),
            Segment::new(self.b, self.c),
            Segment::new(self.c, self.a),
        ]
    }

    /// Unnormalized normal `(b - a) × (c - a)`.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Unit normal, or `None` for a zero-area triangle.
    pub fn unit_normal(&self) -> Option<Dir3> {
        Dir3::try_new(self.normal(), 0.0)
    }

    /// Area of the triangle.
    pub fn area(&self) -> f64 {
        0.5 * self.normal().norm()
    }

    /// Supporting plane, or `None` for a zero-area triangle.
    pub fn plane(&self) -> Option<Plane> {
        self.unit_normal()
            .map(|n| Plane::from_normal_and_point(&n, &self.a))
    }

    /// Bounding box of the three vertices.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(&[self.a, self.b, self.c])
    }

    /// Centroid of the triangle.
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// Lowest and highest vertex coordinate along `axis`.
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        let a = axis.component(&self.a);
        let b = axis.component(&self.b);
        let c = axis.component(&self.c);
        (a.min(b).min(c), a.max(b).max(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn xy_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        )
    }

    #[test]
    fn test_normal_and_area() {
        let tri = xy_triangle();
        let n = tri.unit_normal().unwrap();
        assert_relative_eq!(n.z, 1.0);
        assert_relative_eq!(tri.area(), 2.0);
    }

    #[test]
    fn test_degenerate_triangle_has_no_plane() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(tri.unit_normal().is_none());
        assert!(tri.plane().is_none());
        assert_eq!(tri.area(), 0.0);
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = xy_triangle().plane().unwrap();
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, 5.0, 3.0)), 2.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, 5.0, 0.0)), -1.0);
        assert_relative_eq!(
            plane.flipped().signed_distance(&Point3::new(5.0, 5.0, 0.0)),
            1.0
        );
    }

    #[test]
    fn test_extent_and_bounds() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 1.0, 0.5),
        );
        assert_eq!(tri.extent(Axis::Z), (-1.0, 2.0));
        let bb = tri.bounds();
        assert_eq!(bb.min, Point3::new(0.0, 0.0, -1.0));
        assert_eq!(bb.max, Point3::new(1.0, 1.0, 2.0));
    }
}
