//! Line segments.

use crate::{Axis, Dir3, Point3, Vec3};

/// A line segment between two points.
///
/// Parameter `t = 0` is `start` and `t = 1` is `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl Segment {
    /// Create a segment from its endpoints.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Vector from `start` to `end`.
    #[inline]
    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.delta().norm()
    }

    /// Squared length of the segment.
    pub fn length_squared(&self) -> f64 {
        self.delta().norm_squared()
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.start + self.delta() * t
    }

    /// Unit direction, or `None` for a zero-length segment.
    pub fn direction(&self) -> Option<Dir3> {
        Dir3::try_new(self.delta(), 0.0)
    }

    /// The piece of this segment between parameters `t0` and `t1`.
    pub fn sub_segment(&self, t0: f64, t1: f64) -> Segment {
        Segment::new(self.at(t0), self.at(t1))
    }

    /// Same segment with endpoints swapped.
    pub fn reversed(&self) -> Segment {
        Segment::new(self.end, self.start)
    }

    /// Lowest and highest coordinate along `axis`.
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        let a = axis.component(&self.start);
        let b = axis.component(&self.end);
        (a.min(b), a.max(b))
    }

    /// Copy with both endpoints moved to `value` along `axis`.
    pub fn flattened(&self, axis: Axis, value: f64) -> Segment {
        Segment::new(
            axis.with_component(&self.start, value),
            axis.with_component(&self.end, value),
        )
    }
}
