//! Resumable hidden-line projection.
//!
//! A [`ProjectionTask`] walks through these stages for each requested view:
//!
//! 1. reorient the merged mesh so the viewer looks down `-Z`,
//! 2. build the spatial index,
//! 3. extract candidate feature edges,
//! 4. optionally add triangle intersection edges (incremental),
//! 5. optionally sort candidates by height,
//! 6. trim every candidate against the mesh (incremental).
//!
//! The incremental stages run under a wall-clock budget; [`ProjectionTask::advance`]
//! returns [`Step::Pending`] when the budget runs out so the caller can
//! report progress, stay responsive, or cancel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use edgeproj_bvh::{SpatialIndex, TriangleBvh};
use edgeproj_math::{Axis, Point3, Segment, Transform};
use tracing::{debug, info, trace};

use crate::edges::extract_feature_edges;
use crate::error::{ProjectionError, Result};
use crate::intersection::IntersectionEdgeTask;
use crate::mesh::TriangleSoup;
use crate::occlusion::trim_edge;
use crate::options::{ProjectionOptions, ViewDirection};
use crate::overlap::LineSet;

/// Axis the reoriented mesh is viewed along.
const VIEW_AXIS: Axis = Axis::Z;

/// Shared flag for cancelling a running task from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Incremental stage a view is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Finding triangle–triangle intersection edges.
    Intersections,
    /// Trimming candidate edges against the mesh.
    Trimming,
}

/// Progress report for a pending task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Overall completion in `[0, 1]`.
    pub fraction: f64,
    /// View currently being generated.
    pub view: ViewDirection,
    /// Completion of the current view in `[0, 1]`.
    pub view_fraction: f64,
    /// Current stage.
    pub stage: Stage,
}

/// Visible edges for one view direction.
#[derive(Debug, Clone)]
pub struct ViewProjection {
    /// The view.
    pub direction: ViewDirection,
    /// Transform applied to the mesh before projecting. Its inverse maps the
    /// output back into model space.
    pub transform: Transform,
    /// Visible segments, flattened onto the output height.
    pub lines: LineSet,
}

/// Result of a finished task: one entry per requested view, in request order.
#[derive(Debug, Clone, Default)]
pub struct ProjectionOutput {
    /// Generated views.
    pub views: Vec<ViewProjection>,
}

impl ProjectionOutput {
    /// The projection for `direction`, if it was requested.
    pub fn view(&self, direction: ViewDirection) -> Option<&ViewProjection> {
        self.views.iter().find(|v| v.direction == direction)
    }

    /// Total number of segments across all views.
    pub fn segment_count(&self) -> usize {
        self.views.iter().map(|v| v.lines.len()).sum()
    }
}

/// Outcome of one [`ProjectionTask::advance`] call.
#[derive(Debug)]
pub enum Step<'a> {
    /// The time budget ran out; call `advance` again to continue.
    Pending {
        /// Where the task is.
        progress: Progress,
        /// Segments emitted so far for the current view.
        partial: &'a LineSet,
    },
    /// All views are finished.
    Complete(ProjectionOutput),
}

/// Per-view working state.
struct ViewWork<I> {
    direction: ViewDirection,
    transform: Transform,
    index: I,
    candidates: Vec<Segment>,
    stage: Stage,
    intersections: IntersectionEdgeTask,
    next_edge: usize,
    started: Instant,
}

impl<I: SpatialIndex> ViewWork<I> {
    fn fraction(&self, with_intersections: bool) -> f64 {
        let ratio = |done: usize, total: usize| {
            if total == 0 {
                1.0
            } else {
                done as f64 / total as f64
            }
        };
        match (self.stage, with_intersections) {
            (Stage::Intersections, _) => 0.5 * ratio(self.intersections.processed(), self.index.len()),
            (Stage::Trimming, true) => 0.5 + 0.5 * ratio(self.next_edge, self.candidates.len()),
            (Stage::Trimming, false) => ratio(self.next_edge, self.candidates.len()),
        }
    }

    /// Append intersection edges, sort if requested, and move on to trimming.
    fn begin_trimming(&mut self, sort_edges: bool) {
        let found = std::mem::take(&mut self.intersections).into_edges();
        debug!(
            view = %self.direction,
            intersection_edges = found.len(),
            "intersection edges collected"
        );
        self.candidates.extend(found);

        if sort_edges {
            self.candidates
                .sort_by(|a, b| a.extent(VIEW_AXIS).0.total_cmp(&b.extent(VIEW_AXIS).0));
        }
        self.stage = Stage::Trimming;
    }
}

/// Resumable projection of a mesh over one or more views.
///
/// Generic over the spatial index; [`TriangleBvh`] is the default.
pub struct ProjectionTask<I = TriangleBvh> {
    mesh: TriangleSoup,
    center: Point3,
    options: ProjectionOptions,
    views: Vec<ViewDirection>,
    view_index: usize,
    work: Option<ViewWork<I>>,
    lines: LineSet,
    finished: Vec<ViewProjection>,
    cancel: CancelToken,
    done: bool,
}

impl ProjectionTask<TriangleBvh> {
    /// Validate the input and options and prepare a task.
    ///
    /// Fails before any traversal if a part is malformed or an option is
    /// out of range.
    pub fn new(parts: &[TriangleSoup], options: ProjectionOptions) -> Result<Self> {
        Self::with_index(parts, options)
    }
}

impl<I: SpatialIndex> ProjectionTask<I> {
    /// Like [`ProjectionTask::new`], with an explicit spatial index type.
    pub fn with_index(parts: &[TriangleSoup], options: ProjectionOptions) -> Result<Self> {
        options.validate()?;
        let mesh = TriangleSoup::merge(parts)?;
        let center = mesh.bounds().center();
        let views = options.projection.views();

        debug!(
            parts = parts.len(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            views = views.len(),
            "projection input merged"
        );

        Ok(Self {
            mesh,
            center,
            options,
            views,
            view_index: 0,
            work: None,
            lines: LineSet::new(),
            finished: Vec::new(),
            cancel: CancelToken::new(),
            done: false,
        })
    }

    /// Use `token` to cancel this task.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A token that cancels this task.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The options the task runs with.
    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    /// Whether the task completed or was aborted.
    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Run until the time budget is spent or the task completes.
    ///
    /// At least one unit of work (a candidate edge or an intersection
    /// triangle) is done per call.
    pub fn advance(&mut self) -> Result<Step<'_>> {
        if self.done {
            return Err(ProjectionError::TaskFinished);
        }
        if self.cancel.is_cancelled() {
            self.done = true;
            self.work = None;
            self.lines = LineSet::new();
            self.finished.clear();
            debug!("projection aborted");
            return Err(ProjectionError::Aborted);
        }

        let budget = Duration::from_millis(self.options.iteration_time_ms);
        let started = Instant::now();
        loop {
            let Some(&direction) = self.views.get(self.view_index) else {
                self.done = true;
                let views = std::mem::take(&mut self.finished);
                return Ok(Step::Complete(ProjectionOutput { views }));
            };

            if self.work.is_none() {
                self.work = Some(self.begin_view(direction));
            }

            if self.step_view() {
                self.finish_view();
                continue;
            }

            if started.elapsed() > budget {
                let progress = self.progress();
                trace!(
                    view = %progress.view,
                    fraction = progress.fraction,
                    "yielding"
                );
                return Ok(Step::Pending {
                    progress,
                    partial: &self.lines,
                });
            }
        }
    }

    /// Drive the task to completion, reporting progress at every yield.
    pub fn finish<F>(&mut self, mut on_progress: F) -> Result<ProjectionOutput>
    where
        F: FnMut(&Progress, &LineSet),
    {
        loop {
            match self.advance()? {
                Step::Pending { progress, partial } => on_progress(&progress, partial),
                Step::Complete(output) => return Ok(output),
            }
        }
    }

    /// Current progress.
    pub fn progress(&self) -> Progress {
        let total = self.views.len().max(1) as f64;
        let view = self.views[self.view_index.min(self.views.len().saturating_sub(1))];
        let (stage, view_fraction) = match &self.work {
            Some(work) => (
                work.stage,
                work.fraction(self.options.include_intersection_edges),
            ),
            None => (Stage::Trimming, 0.0),
        };
        Progress {
            fraction: ((self.view_index as f64 + view_fraction) / total).min(1.0),
            view,
            view_fraction,
            stage,
        }
    }

    /// Reorient, index, and extract candidates for one view.
    fn begin_view(&self, direction: ViewDirection) -> ViewWork<I> {
        let transform = direction.transform_about(&self.center);
        let index = I::from_triangles(self.mesh.transformed_triangles(&transform));
        let candidates =
            extract_feature_edges(index.triangles(), VIEW_AXIS, self.options.angle_threshold);

        debug!(
            view = %direction,
            triangles = index.len(),
            candidates = candidates.len(),
            "view prepared"
        );

        let mut work = ViewWork {
            direction,
            transform,
            index,
            candidates,
            stage: Stage::Intersections,
            intersections: IntersectionEdgeTask::new(),
            next_edge: 0,
            started: Instant::now(),
        };
        if !self.options.include_intersection_edges {
            work.begin_trimming(self.options.sort_edges);
        }
        work
    }

    /// Do one unit of work on the current view. Returns `true` when the
    /// view has nothing left to do.
    fn step_view(&mut self) -> bool {
        let Some(work) = self.work.as_mut() else {
            return true;
        };

        match work.stage {
            Stage::Intersections => {
                if !work.intersections.step(&work.index) {
                    work.begin_trimming(self.options.sort_edges);
                }
                false
            }
            Stage::Trimming => match work.candidates.get(work.next_edge) {
                Some(line) => {
                    trim_edge(
                        &work.index,
                        line,
                        VIEW_AXIS,
                        self.options.output_height,
                        &mut self.lines,
                    );
                    work.next_edge += 1;
                    false
                }
                None => true,
            },
        }
    }

    fn finish_view(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        if let Some(work) = self.work.take() {
            info!(
                view = %work.direction,
                candidates = work.candidates.len(),
                segments = lines.len(),
                elapsed_ms = work.started.elapsed().as_millis() as u64,
                "view projected"
            );
            self.finished.push(ViewProjection {
                direction: work.direction,
                transform: work.transform,
                lines,
            });
        }
        self.view_index += 1;
    }
}

/// Project `parts` to completion.
pub fn generate(parts: &[TriangleSoup], options: &ProjectionOptions) -> Result<ProjectionOutput> {
    ProjectionTask::new(parts, options.clone())?.finish(|_, _| {})
}

/// Project `parts` to completion with cancellation and progress reporting.
pub fn generate_with<F>(
    parts: &[TriangleSoup],
    options: &ProjectionOptions,
    cancel: &CancelToken,
    on_progress: F,
) -> Result<ProjectionOutput>
where
    F: FnMut(&Progress, &LineSet),
{
    ProjectionTask::new(parts, options.clone())?
        .with_cancel_token(cancel.clone())
        .finish(on_progress)
}
