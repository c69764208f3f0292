//! Occlusion of a single candidate edge by the mesh.

use edgeproj_bvh::{Shapecast, SpatialIndex};
use edgeproj_math::{Aabb3, Axis, Ray, Segment, Triangle};

use crate::clip::clip_beneath;
use crate::degenerate::{
    is_line_triangle_edge, is_projected_line_degenerate, is_projected_triangle_degenerate,
};
use crate::overlap::{emit_visible, projected_overlap, HiddenIntervals, LineSet};

/// Slack below the edge when widening node bounds.
const BOUNDS_MARGIN: f64 = 1e-6;

/// Shapecast query collecting the hidden ranges of one edge.
///
/// Node bounds are stretched down to the edge's lowest point, so a node
/// passes if anything above the edge could cover it in projection. The
/// edge is then walked as a ray from its start; a node is visited when it
/// contains the start or the ray enters it before the edge ends.
pub struct OcclusionQuery<'a> {
    line: &'a Segment,
    up: Axis,
    ray: Ray,
    length_squared: f64,
    lowest: f64,
    hidden: HiddenIntervals,
    triangles_tested: usize,
}

impl<'a> OcclusionQuery<'a> {
    /// Query for `line`, or `None` if the line has zero length.
    pub fn new(line: &'a Segment, up: Axis) -> Option<Self> {
        let direction = line.direction()?;
        let (lowest, _) = line.extent(up);
        Some(Self {
            line,
            up,
            ray: Ray::from_dir(line.start, direction),
            length_squared: line.length_squared(),
            lowest,
            hidden: HiddenIntervals::new(),
            triangles_tested: 0,
        })
    }

    /// Hidden ranges found so far.
    pub fn hidden(&self) -> &HiddenIntervals {
        &self.hidden
    }

    /// Consume the query, returning the hidden ranges.
    pub fn into_hidden(self) -> HiddenIntervals {
        self.hidden
    }

    /// Number of triangles that reached the per-triangle filters.
    pub fn triangles_tested(&self) -> usize {
        self.triangles_tested
    }
}

impl Shapecast for OcclusionQuery<'_> {
    fn intersects_bounds(&mut self, aabb: &Aabb3) -> bool {
        let mut aabb = *aabb;
        aabb.extend_min(self.up, self.lowest - BOUNDS_MARGIN);

        if aabb.contains_point(&self.line.start) {
            return true;
        }
        match self.ray.intersect_box(&aabb) {
            Some(entry) => (entry - self.line.start).norm_squared() < self.length_squared,
            None => false,
        }
    }

    fn intersects_triangle(&mut self, tri: &Triangle, _index: usize) -> bool {
        self.triangles_tested += 1;

        let (_, tri_highest) = tri.extent(self.up);
        if tri_highest <= self.lowest {
            return false;
        }
        if is_projected_triangle_degenerate(tri, self.up) {
            return false;
        }
        if is_line_triangle_edge(tri, self.line) {
            return false;
        }

        let Some(span) = clip_beneath(tri, self.line, self.up) else {
            return false;
        };
        if let Some(overlap) = projected_overlap(self.line, span, tri, self.up) {
            self.hidden.insert(overlap);
        }

        self.hidden.is_fully_hidden()
    }
}

/// Hidden ranges of `line` against every triangle in `index`.
pub fn hidden_intervals<I: SpatialIndex>(index: &I, line: &Segment, up: Axis) -> HiddenIntervals {
    match OcclusionQuery::new(line, up) {
        Some(mut query) => {
            index.shapecast(&mut query);
            query.into_hidden()
        }
        None => HiddenIntervals::new(),
    }
}

/// Trim `line` against the mesh and emit its visible pieces into `out`.
///
/// Lines that project to a point are dropped.
pub fn trim_edge<I: SpatialIndex>(
    index: &I,
    line: &Segment,
    up: Axis,
    height: f64,
    out: &mut LineSet,
) {
    if is_projected_line_degenerate(line, up) {
        return;
    }
    let hidden = hidden_intervals(index, line, up);
    emit_visible(line, &hidden, up, height, out);
}
