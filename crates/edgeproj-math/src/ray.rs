//! Ray representation and ray-box tests.

use crate::{Aabb3, Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
        }
    }

    /// Create a ray from an origin and an already normalized direction.
    pub fn from_dir(origin: Point3, direction: Dir3) -> Self {
        Self { origin, direction }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction.into_inner() * t
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` with entry and exit parameters, where
    /// `t_min` is clamped to zero when the origin is inside the box.
    /// Axes where the direction component is zero are treated as a
    /// containment test on the origin, so axis-aligned rays never compare
    /// against NaN.
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for i in 0..3 {
            let o = self.origin[i];
            let d = self.direction[i];
            let lo = aabb.min[i];
            let hi = aabb.max[i];

            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (t0, t1) = if inv >= 0.0 {
                ((lo - o) * inv, (hi - o) * inv)
            } else {
                ((hi - o) * inv, (lo - o) * inv)
            };

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }

    /// Entry point of the ray into the box, if it hits.
    ///
    /// For an origin inside the box this is the origin itself.
    pub fn intersect_box(&self, aabb: &Aabb3) -> Option<Point3> {
        self.intersect_aabb(aabb).map(|(t_min, _)| self.at(t_min))
    }
}
