//! Bounding Volume Hierarchy over mesh triangles.
//!
//! Uses Surface Area Heuristic (SAH) for construction.

use edgeproj_math::{Aabb3, Point3, Triangle};

use crate::{Shapecast, SpatialIndex};

/// Build parameters for [`TriangleBvh`].
#[derive(Debug, Clone, Copy)]
pub struct BvhOptions {
    /// Maximum number of triangles stored in one leaf.
    pub max_leaf_triangles: usize,
}

impl Default for BvhOptions {
    fn default() -> Self {
        Self {
            max_leaf_triangles: 4,
        }
    }
}

/// A BVH node - either a leaf containing triangles or an internal node with children.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Indices into the triangle list.
        triangles: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Bounding box of the node.
    pub fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Per-triangle build record: (triangle index, bounds, centroid).
type BuildEntry = (usize, Aabb3, Point3);

/// Bounding Volume Hierarchy for bounds-guided triangle queries.
#[derive(Debug, Clone)]
pub struct TriangleBvh {
    root: Option<BvhNode>,
    triangles: Vec<Triangle>,
}

impl TriangleBvh {
    /// Build a BVH with explicit options.
    pub fn build(triangles: Vec<Triangle>, options: BvhOptions) -> Self {
        let mut entries: Vec<BuildEntry> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| {
                let aabb = tri.bounds();
                (i, aabb, aabb.center())
            })
            .collect();

        let max_leaf = options.max_leaf_triangles.max(1);
        let root = if entries.is_empty() {
            None
        } else {
            Some(build_node(&mut entries, max_leaf))
        };

        Self { root, triangles }
    }

    /// Get a reference to the root node, if any.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Bounds of the whole hierarchy.
    pub fn bounds(&self) -> Aabb3 {
        self.root
            .as_ref()
            .map(|r| *r.aabb())
            .unwrap_or_else(Aabb3::empty)
    }

    /// Depth-first traversal of a single node.
    fn shapecast_node<Q: Shapecast>(&self, node: &BvhNode, query: &mut Q) -> bool {
        match node {
            BvhNode::Leaf { aabb, triangles } => {
                if !query.intersects_bounds(aabb) {
                    return false;
                }
                for &index in triangles {
                    if query.intersects_triangle(&self.triangles[index], index) {
                        return true;
                    }
                }
                false
            }
            BvhNode::Internal { aabb, left, right } => {
                if !query.intersects_bounds(aabb) {
                    return false;
                }
                self.shapecast_node(left, query) || self.shapecast_node(right, query)
            }
        }
    }
}

impl SpatialIndex for TriangleBvh {
    fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self::build(triangles, BvhOptions::default())
    }

    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn shapecast<Q: Shapecast>(&self, query: &mut Q) -> bool {
        match &self.root {
            Some(root) => self.shapecast_node(root, query),
            None => false,
        }
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(entries: &mut [BuildEntry], max_leaf: usize) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in entries.iter() {
        bounds = bounds.union(aabb);
    }

    if entries.len() <= max_leaf {
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: entries.iter().map(|(i, _, _)| *i).collect(),
        };
    }

    let (best_axis, best_pos) = find_best_split(entries, &bounds);
    let mut mid = partition(entries, best_axis, best_pos);

    // Fallback if partition fails: split in the middle
    if mid == 0 || mid == entries.len() {
        mid = entries.len() / 2;
    }

    let (left, right) = entries.split_at_mut(mid);
    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left, max_leaf)),
        right: Box::new(build_node(right, max_leaf)),
    }
}

/// Find the best split axis and position using SAH.
fn find_best_split(entries: &[BuildEntry], bounds: &Aabb3) -> (usize, f64) {
    const NUM_BUCKETS: usize = 12;

    let mut centroid_bounds = Aabb3::empty();
    for (_, _, c) in entries {
        centroid_bounds.include_point(c);
    }

    let total_area = bounds.surface_area();
    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    for axis in 0..3 {
        let axis_min = centroid_bounds.min[axis];
        let axis_extent = centroid_bounds.max[axis] - axis_min;
        if axis_extent < 1e-10 {
            continue;
        }

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in entries {
            let b = ((centroid[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b] = bucket_bounds[b].union(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let (left_count, left_bounds) = accumulate(&bucket_counts[..split], &bucket_bounds[..split]);
            let (right_count, right_bounds) =
                accumulate(&bucket_counts[split..], &bucket_bounds[split..]);

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let cost = if total_area > 0.0 {
                0.125
                    + left_bounds.surface_area() / total_area * left_count as f64
                    + right_bounds.surface_area() / total_area * right_count as f64
            } else {
                0.125 + (left_count.max(right_count)) as f64
            };

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

/// Sum bucket counts and union their bounds.
fn accumulate(counts: &[usize], bounds: &[Aabb3]) -> (usize, Aabb3) {
    let mut count = 0;
    let mut aabb = Aabb3::empty();
    for (c, b) in counts.iter().zip(bounds) {
        if *c > 0 {
            count += c;
            aabb = aabb.union(b);
        }
    }
    (count, aabb)
}

/// Partition entries by centroid along an axis.
fn partition(entries: &mut [BuildEntry], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = entries.len();

    while left < right {
        if entries[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            entries.swap(left, right);
        }
    }

    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinearIndex;

    /// A grid of small triangles in the z = 0 plane.
    fn grid(n: usize) -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let x = i as f64;
                let y = j as f64;
                tris.push(Triangle::new(
                    Point3::new(x, y, 0.0),
                    Point3::new(x + 1.0, y, 0.0),
                    Point3::new(x, y + 1.0, 0.0),
                ));
            }
        }
        tris
    }

    struct BoxQuery {
        query: Aabb3,
        hits: Vec<usize>,
        bounds_tests: usize,
    }

    impl Shapecast for BoxQuery {
        fn intersects_bounds(&mut self, aabb: &Aabb3) -> bool {
            self.bounds_tests += 1;
            aabb.overlaps(&self.query)
        }

        fn intersects_triangle(&mut self, triangle: &Triangle, index: usize) -> bool {
            if triangle.bounds().overlaps(&self.query) {
                self.hits.push(index);
            }
            false
        }
    }

    fn query(min: Point3, max: Point3) -> BoxQuery {
        BoxQuery {
            query: Aabb3::new(min, max),
            hits: Vec::new(),
            bounds_tests: 0,
        }
    }

    #[test]
    fn test_bvh_build() {
        let bvh = TriangleBvh::from_triangles(grid(4));
        assert!(bvh.root().is_some());
        assert_eq!(bvh.len(), 16);
        let b = bvh.bounds();
        assert_eq!(b.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(b.max, Point3::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = TriangleBvh::from_triangles(Vec::new());
        assert!(bvh.root().is_none());
        assert!(bvh.is_empty());
        let mut q = query(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(!bvh.shapecast(&mut q));
        assert!(q.hits.is_empty());
    }

    #[test]
    fn test_matches_linear_index() {
        let tris = grid(8);
        let bvh = TriangleBvh::build(tris.clone(), BvhOptions { max_leaf_triangles: 1 });
        let linear = LinearIndex::from_triangles(tris);

        let mut a = query(Point3::new(2.5, 2.5, -1.0), Point3::new(4.2, 3.1, 1.0));
        let mut b = query(Point3::new(2.5, 2.5, -1.0), Point3::new(4.2, 3.1, 1.0));
        bvh.shapecast(&mut a);
        linear.shapecast(&mut b);

        a.hits.sort_unstable();
        b.hits.sort_unstable();
        assert_eq!(a.hits, b.hits);
        assert!(!a.hits.is_empty());
    }

    #[test]
    fn test_prunes_far_nodes() {
        let bvh = TriangleBvh::from_triangles(grid(16));
        let mut q = query(Point3::new(0.1, 0.1, -1.0), Point3::new(0.2, 0.2, 1.0));
        bvh.shapecast(&mut q);
        assert_eq!(q.hits, vec![0]);
        assert!(q.bounds_tests < 256, "expected pruning, got {} tests", q.bounds_tests);
    }

    #[test]
    fn test_early_exit() {
        struct StopAtFirst(usize);
        impl Shapecast for StopAtFirst {
            fn intersects_bounds(&mut self, _aabb: &Aabb3) -> bool {
                true
            }
            fn intersects_triangle(&mut self, _triangle: &Triangle, _index: usize) -> bool {
                self.0 += 1;
                true
            }
        }

        let bvh = TriangleBvh::from_triangles(grid(4));
        let mut q = StopAtFirst(0);
        assert!(bvh.shapecast(&mut q));
        assert_eq!(q.0, 1);
    }
}
