//! Hidden-interval bookkeeping and projected overlap.
//!
//! Occlusion of one candidate edge is tracked as a set of parametric
//! intervals `[start, end] ⊆ [0, 1]` along the edge. Each occluding
//! triangle contributes at most one interval; the set is kept sorted and
//! merged so that "fully hidden" is a single `[0, 1]` entry.

use edgeproj_math::{Axis, Point2, Segment, Triangle, EPSILON};

/// Parametric range along a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Start parameter.
    pub start: f64,
    /// End parameter.
    pub end: f64,
}

impl Interval {
    /// The whole segment.
    pub const FULL: Interval = Interval {
        start: 0.0,
        end: 1.0,
    };

    /// Create an interval.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Parametric width.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Map a parameter of this interval's sub-segment back to the full segment.
    #[inline]
    pub fn lerp(&self, t: f64) -> f64 {
        self.start + t * (self.end - self.start)
    }
}

/// Hidden ranges of one candidate edge, always sorted and merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenIntervals {
    intervals: Vec<Interval>,
}

impl HiddenIntervals {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hidden range. Returns `false` if the range was empty after
    /// clamping and was not added.
    pub fn insert(&mut self, interval: Interval) -> bool {
        let mut start = interval.start.clamp(0.0, 1.0);
        let mut end = interval.end.clamp(0.0, 1.0);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        if start <= EPSILON {
            start = 0.0;
        }
        if end >= 1.0 - EPSILON {
            end = 1.0;
        }
        if end - start <= EPSILON {
            return false;
        }

        self.intervals.push(Interval { start, end });
        self.compress();
        true
    }

    /// Sort by start and merge touching or overlapping ranges.
    pub fn compress(&mut self) {
        if self.intervals.len() < 2 {
            return;
        }
        self.intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for iv in self.intervals.drain(..) {
            match merged.last_mut() {
                Some(last) if iv.start <= last.end + EPSILON => {
                    last.end = last.end.max(iv.end);
                }
                _ => merged.push(iv),
            }
        }
        self.intervals = merged;
    }

    /// Whether the whole edge is hidden.
    pub fn is_fully_hidden(&self) -> bool {
        matches!(self.intervals.as_slice(), [only] if only.start == 0.0 && only.end == 1.0)
    }

    /// Complement over `[0, 1]`, dropping slivers no wider than `EPSILON`.
    pub fn visible_ranges(&self) -> Vec<Interval> {
        let mut visible = Vec::new();
        let mut cursor = 0.0f64;
        for iv in &self.intervals {
            if iv.start - cursor > EPSILON {
                visible.push(Interval::new(cursor, iv.start));
            }
            cursor = cursor.max(iv.end);
        }
        if 1.0 - cursor > EPSILON {
            visible.push(Interval::new(cursor, 1.0));
        }
        visible
    }

    /// The hidden ranges.
    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of disjoint hidden ranges.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether nothing is hidden.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Portion of `line[span]` whose projection falls inside the projection of `tri`.
///
/// The result is expressed in the parameter space of the full `line`.
/// Points on the projected triangle boundary count as inside.
pub fn projected_overlap(
    line: &Segment,
    span: Interval,
    tri: &Triangle,
    up: Axis,
) -> Option<Interval> {
    let sub = line.sub_segment(span.start, span.end);
    let p0 = up.project(&sub.start);
    let p1 = up.project(&sub.end);
    let [a, b, c] = tri.vertices().map(|v| up.project(&v));

    let orientation = cross2(&a, &b, &c);
    if orientation.abs() <= EPSILON {
        return None;
    }
    let winding = orientation.signum();

    let mut t_lo = 0.0f64;
    let mut t_hi = 1.0f64;
    for (e0, e1) in [(a, b), (b, c), (c, a)] {
        let len = (e1 - e0).norm();
        if len <= EPSILON {
            return None;
        }
        // Signed distances of the endpoints to the edge, positive inside.
        let f0 = winding * cross2(&e0, &e1, &p0) / len;
        let f1 = winding * cross2(&e0, &e1, &p1) / len;
        let df = f1 - f0;

        if df.abs() <= f64::EPSILON {
            if f0 < -EPSILON {
                return None;
            }
            continue;
        }

        let t = (-EPSILON - f0) / df;
        if df > 0.0 {
            t_lo = t_lo.max(t);
        } else {
            t_hi = t_hi.min(t);
        }
        if t_lo > t_hi {
            return None;
        }
    }

    let overlap = Interval::new(span.lerp(t_lo), span.lerp(t_hi));
    if overlap.width() <= EPSILON {
        return None;
    }
    Some(overlap)
}

/// `(b - a) × (p - a)` in 2D.
#[inline]
fn cross2(a: &Point2, b: &Point2, p: &Point2) -> f64 {
    let e = b - a;
    let d = p - a;
    e.x * d.y - e.y * d.x
}

/// Accumulated visible output segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSet {
    segments: Vec<Segment>,
}

impl LineSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// The segments, in emission order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consume the set, returning its segments.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flat `[x0, y0, z0, x1, y1, z1, ...]` buffer, two vertices per segment.
    pub fn positions(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.segments.len() * 6);
        for s in &self.segments {
            out.extend_from_slice(&[
                s.start.x as f32,
                s.start.y as f32,
                s.start.z as f32,
                s.end.x as f32,
                s.end.y as f32,
                s.end.z as f32,
            ]);
        }
        out
    }
}

/// Emit the visible parts of `line`, flattened onto `height` along `up`.
pub fn emit_visible(
    line: &Segment,
    hidden: &HiddenIntervals,
    up: Axis,
    height: f64,
    out: &mut LineSet,
) {
    for range in hidden.visible_ranges() {
        out.push(line.sub_segment(range.start, range.end).flattened(up, height));
    }
}
