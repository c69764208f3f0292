//! Clipping a candidate edge to the part beneath a triangle's plane.

use edgeproj_math::{Axis, Segment, Triangle, DIST_THRESHOLD, EPSILON};

use crate::overlap::Interval;

/// Parametric range of `line` lying beneath the plane of `tri`, where
/// "beneath" is the `-up` side.
///
/// Returns `None` when no part of the line can be hidden by the triangle.
pub fn clip_beneath(tri: &Triangle, line: &Segment, up: Axis) -> Option<Interval> {
    let (tri_lo, tri_hi) = tri.extent(up);
    let (line_lo, line_hi) = line.extent(up);

    if tri_hi <= line_lo {
        return None;
    }

    let interval = if line_hi < tri_lo {
        Interval::FULL
    } else {
        trim_to_plane(tri, line, up)?
    };

    if interval.width() * line.length() < DIST_THRESHOLD {
        return None;
    }
    Some(interval)
}

fn trim_to_plane(tri: &Triangle, line: &Segment, up: Axis) -> Option<Interval> {
    let mut plane = tri.plane()?;
    let facing = plane.normal.dot(&up.unit());
    if facing.abs() <= EPSILON {
        return None;
    }
    if facing < 0.0 {
        plane = plane.flipped();
    }

    let d0 = plane.signed_distance(&line.start);
    let d1 = plane.signed_distance(&line.end);
    let start_below = d0 < -EPSILON;
    let end_below = d1 < -EPSILON;

    let dir = line.direction()?;
    if plane.normal.dot(&dir).abs() < EPSILON {
        // Parallel: entirely on one side, or lying in the plane.
        return start_below.then_some(Interval::FULL);
    }

    match (start_below, end_below) {
        (true, true) => Some(Interval::FULL),
        (false, false) => None,
        _ => {
            let t = (d0 / (d0 - d1)).clamp(0.0, 1.0);
            if start_below {
                Some(Interval::new(0.0, t))
            } else {
                Some(Interval::new(t, 1.0))
            }
        }
    }
}
