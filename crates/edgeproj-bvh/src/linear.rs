//! Brute-force spatial index.

use edgeproj_math::{Aabb3, Triangle};

use crate::{Shapecast, SpatialIndex};

/// A spatial index that tests every triangle against its own bounds.
///
/// Gives the same shapecast results as [`crate::TriangleBvh`] without any
/// pruning beyond the per-triangle box test.
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    triangles: Vec<Triangle>,
    bounds: Vec<Aabb3>,
}

impl SpatialIndex for LinearIndex {
    fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let bounds = triangles.iter().map(Triangle::bounds).collect();
        Self { triangles, bounds }
    }

    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn shapecast<Q: Shapecast>(&self, query: &mut Q) -> bool {
        for (index, (tri, aabb)) in self.triangles.iter().zip(&self.bounds).enumerate() {
            if query.intersects_bounds(aabb) && query.intersects_triangle(tri, index) {
                return true;
            }
        }
        false
    }
}
