//! Candidate feature-edge extraction.
//!
//! Every mesh edge is a candidate for the drawing when it is:
//!
//! - a boundary edge (only one adjacent face),
//! - a crease, where the adjacent face normals differ by at least the
//!   angle threshold, or
//! - a silhouette, where one adjacent face points toward the viewer and
//!   the other away from it.
//!
//! Vertices are welded on a `1e-4` grid first, so meshes with split
//! vertices along UV or normal seams still pair their edges.

use std::collections::HashMap;

use edgeproj_math::{Axis, Point3, Segment, Triangle, Vec3, EPSILON};
use tracing::debug;

/// Weld grid resolution (four decimal places).
const WELD_SCALE: f64 = 1e4;

type VertexKey = (i64, i64, i64);

fn vertex_key(p: &Point3) -> VertexKey {
    (
        (p.x * WELD_SCALE).round() as i64,
        (p.y * WELD_SCALE).round() as i64,
        (p.z * WELD_SCALE).round() as i64,
    )
}

/// A directed edge waiting for its reverse.
struct HalfEdge {
    start: Point3,
    end: Point3,
    normal: Vec3,
}

fn sign(x: f64) -> i8 {
    if x > EPSILON {
        1
    } else if x < -EPSILON {
        -1
    } else {
        0
    }
}

/// Collect candidate edges from `triangles` for a viewer looking down `up`.
///
/// Output order follows first appearance in the input, so the result is
/// deterministic for a given triangle order.
pub fn extract_feature_edges(
    triangles: &[Triangle],
    up: Axis,
    angle_threshold: f64,
) -> Vec<Segment> {
    let threshold_dot = angle_threshold.to_radians().cos();
    let up_dir = up.unit();

    let mut slots: Vec<Option<HalfEdge>> = Vec::new();
    let mut lookup: HashMap<(VertexKey, VertexKey), usize> = HashMap::new();
    let mut edges = Vec::new();
    let mut skipped = 0usize;

    for tri in triangles {
        let verts = tri.vertices();
        let keys = verts.map(|v| vertex_key(&v));
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            skipped += 1;
            continue;
        }
        let Some(normal) = tri.unit_normal() else {
            skipped += 1;
            continue;
        };
        let normal = normal.into_inner();

        for j in 0..3 {
            let k = (j + 1) % 3;
            let forward = (keys[j], keys[k]);
            let reverse = (keys[k], keys[j]);

            if let Some(&slot) = lookup.get(&reverse) {
                if let Some(other) = slots[slot].take() {
                    let crease = normal.dot(&other.normal) <= threshold_dot;
                    let silhouette =
                        sign(up_dir.dot(&normal)) != sign(up_dir.dot(&other.normal));
                    if crease || silhouette {
                        edges.push(Segment::new(other.start, other.end));
                    }
                    continue;
                }
            }

            if !lookup.contains_key(&forward) {
                lookup.insert(forward, slots.len());
                slots.push(Some(HalfEdge {
                    start: verts[j],
                    end: verts[k],
                    normal,
                }));
            }
        }
    }

    let paired = edges.len();
    edges.extend(
        slots
            .into_iter()
            .flatten()
            .map(|half| Segment::new(half.start, half.end)),
    );

    debug!(
        triangles = triangles.len(),
        skipped,
        paired,
        boundary = edges.len() - paired,
        "extracted feature edges"
    );

    edges
}
