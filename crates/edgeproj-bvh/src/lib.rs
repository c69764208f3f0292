#![warn(missing_docs)]

//! Spatial indexing over triangle soups for the edgeproj engine.
//!
//! The visibility engine only needs two things from a spatial index:
//!
//! - a traversal that visits triangles whose enclosing bounds pass a
//!   caller-supplied test, and
//! - a per-triangle callback for the triangles that survive it.
//!
//! That contract is the [`SpatialIndex`] trait together with the
//! [`Shapecast`] query trait. [`TriangleBvh`] implements it with a
//! surface-area-heuristic hierarchy; [`LinearIndex`] implements it by
//! scanning every triangle, which is handy as a reference in tests.
//!
//! # Example
//!
//! ```ignore
//! use edgeproj_bvh::{Shapecast, SpatialIndex, TriangleBvh};
//! use edgeproj_math::{Aabb3, Triangle};
//!
//! struct Overlapping<'a> { query: &'a Aabb3, hits: Vec<usize> }
//!
//! impl Shapecast for Overlapping<'_> {
//!     fn intersects_bounds(&mut self, aabb: &Aabb3) -> bool {
//!         aabb.overlaps(self.query)
//!     }
//!     fn intersects_triangle(&mut self, tri: &Triangle, index: usize) -> bool {
//!         if tri.bounds().overlaps(self.query) {
//!             self.hits.push(index);
//!         }
//!         false
//!     }
//! }
//!
//! let bvh = TriangleBvh::from_triangles(triangles);
//! bvh.shapecast(&mut Overlapping { query: &bounds, hits: Vec::new() });
//! ```

pub mod bvh;
pub mod linear;

pub use bvh::{BvhNode, BvhOptions, TriangleBvh};
pub use linear::LinearIndex;

use edgeproj_math::{Aabb3, Triangle};

/// A query driven through a [`SpatialIndex`].
pub trait Shapecast {
    /// Whether the traversal should descend into a node with these bounds.
    fn intersects_bounds(&mut self, aabb: &Aabb3) -> bool;

    /// Visit a triangle whose enclosing node passed [`Self::intersects_bounds`].
    ///
    /// Returning `true` stops the traversal.
    fn intersects_triangle(&mut self, triangle: &Triangle, index: usize) -> bool;
}

/// The capability the visibility engine consumes from a spatial index.
pub trait SpatialIndex {
    /// Build the index over a triangle collection. Triangle `i` of the input
    /// keeps index `i` in callbacks.
    fn from_triangles(triangles: Vec<Triangle>) -> Self
    where
        Self: Sized;

    /// The indexed triangles, in input order.
    fn triangles(&self) -> &[Triangle];

    /// Run a query. Returns `true` if a triangle callback stopped the traversal.
    fn shapecast<Q: Shapecast>(&self, query: &mut Q) -> bool;

    /// Number of indexed triangles.
    fn len(&self) -> usize {
        self.triangles().len()
    }

    /// Whether the index holds no triangles.
    fn is_empty(&self) -> bool {
        self.triangles().is_empty()
    }
}
