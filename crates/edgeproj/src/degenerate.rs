//! Degeneracy tests relative to a viewing axis.

use edgeproj_math::{Axis, Point3, Segment, Triangle, EPSILON};

/// Whether `tri` projects onto the view plane as a line or a point.
pub fn is_projected_triangle_degenerate(tri: &Triangle, up: Axis) -> bool {
    match tri.unit_normal() {
        Some(n) => n.dot(&up.unit()).abs() <= EPSILON,
        None => true,
    }
}

/// Whether `line` projects onto the view plane as a point.
pub fn is_projected_line_degenerate(line: &Segment, up: Axis) -> bool {
    match line.direction() {
        Some(d) => d.dot(&up.unit()).abs() >= 1.0 - EPSILON,
        None => true,
    }
}

/// Whether both endpoints of `line` coincide with vertices of `tri`.
pub fn is_line_triangle_edge(tri: &Triangle, line: &Segment) -> bool {
    let verts = tri.vertices();
    let on_vertex = |p: &Point3| verts.iter().any(|v| (v - p).norm_squared() <= EPSILON);
    on_vertex(&line.start) && on_vertex(&line.end)
}
