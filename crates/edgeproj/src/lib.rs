#![warn(missing_docs)]

//! Orthographic hidden-line projection of triangle meshes.
//!
//! Given a mesh and a view direction, produces the 2D line drawing an
//! observer would see: feature edges (creases, silhouettes, boundaries and
//! optionally intersection curves) with every occluded portion removed.
//!
//! # Example
//!
//! ```ignore
//! use edgeproj::{generate, ProjectionOptions, TriangleSoup, ViewDirection, Projection};
//!
//! let mesh = TriangleSoup::cuboid([0.0; 3], [1.0; 3]);
//! let options = ProjectionOptions {
//!     projection: Projection::View(ViewDirection::Front),
//!     ..Default::default()
//! };
//! let output = generate(&[mesh], &options)?;
//!
//! for view in &output.views {
//!     println!("{}: {} segments", view.direction, view.lines.len());
//! }
//! ```
//!
//! For long-running meshes, drive a [`ProjectionTask`] yourself to get
//! progress and cancellation, or hand the job to a [`ProjectionWorker`].

pub mod clip;
pub mod degenerate;
pub mod edges;
pub mod error;
pub mod export;
pub mod generator;
pub mod intersection;
pub mod mesh;
pub mod occlusion;
pub mod options;
pub mod overlap;
pub mod worker;

pub use error::{ProjectionError, Result};
pub use export::{write_separate, ExportDocument};
pub use generator::{
    generate, generate_with, CancelToken, ProjectionOutput, ProjectionTask, Progress, Stage, Step,
    ViewProjection,
};
pub use mesh::TriangleSoup;
pub use options::{Projection, ProjectionOptions, ViewDirection};
pub use overlap::{HiddenIntervals, Interval, LineSet};
pub use worker::{JobHandle, JobRequest, ProjectionWorker, WorkerMessage};

pub use edgeproj_bvh::{LinearIndex, SpatialIndex, TriangleBvh};
pub use edgeproj_math::{Axis, Segment, Transform, Triangle};
