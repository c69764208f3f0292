//! Edges where mesh triangles cut through each other.
//!
//! Interpenetrating parts (a pin pushed through a plate, two merged bodies)
//! have visible creases along their intersection curves that are not mesh
//! edges. These are found by testing each triangle against the triangles
//! whose bounds overlap it.

use edgeproj_bvh::{Shapecast, SpatialIndex};
use edgeproj_math::{Aabb3, Point3, Segment, Triangle, DIST_THRESHOLD, EPSILON};

/// Where segment `e0 → e1` crosses `tri`, using Möller–Trumbore.
fn edge_triangle_point(e0: &Point3, e1: &Point3, tri: &Triangle) -> Option<Point3> {
    let direction = e1 - e0;
    if direction.norm_squared() < EPSILON * EPSILON {
        return None;
    }

    let edge1 = tri.b - tri.a;
    let edge2 = tri.c - tri.a;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Edge is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = e0 - tri.a;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t < -EPSILON || t > 1.0 + EPSILON {
        return None;
    }

    Some(e0 + direction * t.clamp(0.0, 1.0))
}

/// Intersection segment of two triangles, if they cross along a line.
///
/// Coplanar triangles and triangles touching at a single point give `None`.
pub fn triangle_intersection(a: &Triangle, b: &Triangle) -> Option<Segment> {
    let mut points: Vec<Point3> = Vec::with_capacity(6);
    let mut add = |p: Point3| {
        if !points
            .iter()
            .any(|q| (p - q).norm_squared() < DIST_THRESHOLD * DIST_THRESHOLD)
        {
            points.push(p);
        }
    };

    for edge in a.edges() {
        if let Some(p) = edge_triangle_point(&edge.start, &edge.end, b) {
            add(p);
        }
    }
    for edge in b.edges() {
        if let Some(p) = edge_triangle_point(&edge.start, &edge.end, a) {
            add(p);
        }
    }

    if points.len() < 2 {
        return None;
    }

    // The two points furthest apart bound the segment.
    let mut best = (0, 1, 0.0);
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let d = (points[j] - points[i]).norm_squared();
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }

    Some(Segment::new(points[best.0], points[best.1]))
}

/// Whether the triangles have two coincident vertices.
pub fn shares_edge(a: &Triangle, b: &Triangle) -> bool {
    let bv = b.vertices();
    a.vertices()
        .iter()
        .filter(|p| bv.iter().any(|q| (*p - q).norm_squared() <= EPSILON))
        .count()
        >= 2
}

/// Finds intersection edges for one triangle against its higher-index neighbours.
struct PairQuery<'a> {
    index: usize,
    triangle: &'a Triangle,
    bounds: Aabb3,
    found: &'a mut Vec<Segment>,
}

impl Shapecast for PairQuery<'_> {
    fn intersects_bounds(&mut self, aabb: &Aabb3) -> bool {
        aabb.overlaps(&self.bounds)
    }

    fn intersects_triangle(&mut self, other: &Triangle, index: usize) -> bool {
        if index <= self.index || shares_edge(self.triangle, other) {
            return false;
        }
        if let Some(seg) = triangle_intersection(self.triangle, other) {
            if seg.length() > DIST_THRESHOLD {
                self.found.push(seg);
            }
        }
        false
    }
}

/// Incremental search for intersection edges, one triangle per step.
#[derive(Debug, Default)]
pub struct IntersectionEdgeTask {
    next: usize,
    edges: Vec<Segment>,
}

impl IntersectionEdgeTask {
    /// Start at the first triangle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Test the next triangle. Returns `false` once every triangle is done.
    pub fn step<I: SpatialIndex>(&mut self, index: &I) -> bool {
        let triangles = index.triangles();
        let Some(triangle) = triangles.get(self.next) else {
            return false;
        };

        let mut query = PairQuery {
            index: self.next,
            triangle,
            bounds: triangle.bounds(),
            found: &mut self.edges,
        };
        index.shapecast(&mut query);

        self.next += 1;
        true
    }

    /// Triangles processed so far.
    pub fn processed(&self) -> usize {
        self.next
    }

    /// Edges found so far.
    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    /// Finish, returning the edges found.
    pub fn into_edges(self) -> Vec<Segment> {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleSoup;
    use approx::assert_relative_eq;
    use edgeproj_bvh::{LinearIndex, TriangleBvh};

    fn run<I: SpatialIndex>(index: &I) -> Vec<Segment> {
        let mut task = IntersectionEdgeTask::new();
        while task.step(index) {}
        assert_eq!(task.processed(), index.len());
        task.into_edges()
    }

    #[test]
    fn test_crossing_triangles() {
        let floor = Triangle::new(
            Point3::new(-2.0, -2.0, 0.0),
            Point3::new(2.0, -2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        let wall = Triangle::new(
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        let seg = triangle_intersection(&floor, &wall).unwrap();
        assert_relative_eq!(seg.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(seg.start.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(seg.end.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_coplanar_and_separate() {
        let a = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let b = Triangle::new(
            Point3::new(0.2, 0.2, 0.0),
            Point3::new(1.2, 0.2, 0.0),
            Point3::new(0.2, 1.2, 0.0),
        );
        assert!(triangle_intersection(&a, &b).is_none());

        let far = Triangle::new(
            Point3::new(5.0, 5.0, -1.0),
            Point3::new(6.0, 5.0, 1.0),
            Point3::new(5.0, 6.0, 1.0),
        );
        assert!(triangle_intersection(&a, &far).is_none());
    }

    #[test]
    fn test_shares_edge() {
        let tris = TriangleSoup::cuboid([0.0; 3], [1.0; 3]).triangles();
        assert!(shares_edge(&tris[0], &tris[1]));
        // Bottom and top faces share nothing.
        assert!(!shares_edge(&tris[0], &tris[2]));
    }

    #[test]
    fn test_closed_box_has_no_intersections() {
        let tris = TriangleSoup::cuboid([0.0; 3], [1.0; 3]).triangles();
        assert!(run(&TriangleBvh::from_triangles(tris)).is_empty());
    }

    #[test]
    fn test_interpenetrating_boxes() {
        // A slab pushed through the middle of a taller box.
        let soup = TriangleSoup::merge(&[
            TriangleSoup::cuboid([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]),
            TriangleSoup::cuboid([-1.0, 0.5, 0.5], [3.0, 1.5, 1.5]),
        ])
        .unwrap();
        let tris = soup.triangles();

        let bvh_edges = run(&TriangleBvh::from_triangles(tris.clone()));
        let linear_edges = run(&LinearIndex::from_triangles(tris));
        assert!(!bvh_edges.is_empty());
        assert_eq!(bvh_edges.len(), linear_edges.len());

        // Every crossing lies on one of the two side walls x = 0 or x = 2.
        for seg in &bvh_edges {
            let on_wall = |x: f64| x.abs() < 1e-9 || (x - 2.0).abs() < 1e-9;
            assert!(on_wall(seg.start.x) && on_wall(seg.end.x), "{seg:?}");
        }
        let total: f64 = bvh_edges.iter().map(Segment::length).sum();
        // Two square outlines of side 1.
        assert_relative_eq!(total, 8.0, epsilon = 1e-9);
    }
}
