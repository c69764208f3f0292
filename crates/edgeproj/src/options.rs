//! View directions and projection options.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use edgeproj_math::{Point3, Transform};
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Axis-aligned direction the observer looks from.
///
/// The model is Z-up: `Top` looks down along -Z, `Front` looks along +Y
/// from the -Y side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewDirection {
    /// Viewer at +Z.
    Top,
    /// Viewer at -Z.
    Bottom,
    /// Viewer at -Y.
    Front,
    /// Viewer at +Y.
    Back,
    /// Viewer at -X.
    Left,
    /// Viewer at +X.
    Right,
}

impl ViewDirection {
    /// Every direction, in all-views order.
    pub const ALL: [ViewDirection; 6] = [
        ViewDirection::Top,
        ViewDirection::Bottom,
        ViewDirection::Front,
        ViewDirection::Back,
        ViewDirection::Left,
        ViewDirection::Right,
    ];

    /// Lowercase name used in exports and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ViewDirection::Top => "top",
            ViewDirection::Bottom => "bottom",
            ViewDirection::Front => "front",
            ViewDirection::Back => "back",
            ViewDirection::Left => "left",
            ViewDirection::Right => "right",
        }
    }

    /// Rotation taking the viewer's side of the model onto +Z.
    ///
    /// Side views also map world +Z to +Y so the drawing stays upright.
    pub fn rotation(self) -> Transform {
        let stand_up = Transform::rotation_x(-FRAC_PI_2);
        match self {
            ViewDirection::Top => Transform::identity(),
            ViewDirection::Bottom => Transform::rotation_x(PI),
            ViewDirection::Front => stand_up,
            ViewDirection::Back => stand_up.then(&Transform::rotation_z(PI)),
            ViewDirection::Left => stand_up.then(&Transform::rotation_z(FRAC_PI_2)),
            ViewDirection::Right => stand_up.then(&Transform::rotation_z(-FRAC_PI_2)),
        }
    }

    /// Rotation about `center`: `T(center) · R · T(-center)`.
    pub fn transform_about(self, center: &Point3) -> Transform {
        Transform::translation(center.x, center.y, center.z)
            .then(&self.rotation())
            .then(&Transform::translation(-center.x, -center.y, -center.z))
    }
}

impl fmt::Display for ViewDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewDirection {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        ViewDirection::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProjectionError::InvalidOptions(format!("unknown view direction '{s}'")))
    }
}

/// Which views to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// A single view.
    View(ViewDirection),
    /// All six axis-aligned views.
    AllViews,
}

impl Projection {
    /// Views to produce, in output order.
    pub fn views(&self) -> Vec<ViewDirection> {
        match self {
            Projection::View(direction) => vec![*direction],
            Projection::AllViews => ViewDirection::ALL.to_vec(),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::View(ViewDirection::Top)
    }
}

/// Projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    /// Crease angle in degrees between adjacent face normals above which
    /// the shared edge becomes a candidate.
    pub angle_threshold: f64,
    /// Add edges where triangles cut through each other.
    pub include_intersection_edges: bool,
    /// Sort candidate edges by height before trimming.
    pub sort_edges: bool,
    /// Wall-clock budget per `advance` call, in milliseconds.
    pub iteration_time_ms: u64,
    /// Which views to produce.
    pub projection: Projection,
    /// Up coordinate written into every output segment.
    pub output_height: f64,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            angle_threshold: 50.0,
            include_intersection_edges: true,
            sort_edges: true,
            iteration_time_ms: 30,
            projection: Projection::default(),
            output_height: 0.0,
        }
    }
}

impl ProjectionOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if !self.angle_threshold.is_finite()
            || self.angle_threshold < 0.0
            || self.angle_threshold > 180.0
        {
            return Err(ProjectionError::InvalidOptions(format!(
                "angle_threshold must be between 0 and 180 degrees, got {}",
                self.angle_threshold
            )));
        }
        if !self.output_height.is_finite() {
            return Err(ProjectionError::InvalidOptions(
                "output_height must be finite".into(),
            ));
        }
        Ok(())
    }
}
