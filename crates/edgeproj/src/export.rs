//! JSON export of projection results.
//!
//! The document layout mirrors a serialized `LineSegments` buffer geometry
//! so viewers can load each view directly:
//!
//! ```json
//! {
//!   "metadata": { "generator": "edgeproj", "version": "0.3.0", ... },
//!   "geometries": {
//!     "top": {
//!       "type": "LineSegments",
//!       "attributes": { "position": { "array": [...], "itemSize": 3, "count": 8, "normalized": false } }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::generator::{ProjectionOutput, ViewProjection};
use crate::options::ProjectionOptions;

/// Name written into export metadata.
pub const GENERATOR_NAME: &str = "edgeproj";

/// Top-level export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Provenance and settings.
    pub metadata: ExportMetadata,
    /// One geometry per view, keyed by view name.
    pub geometries: BTreeMap<String, LineGeometry>,
}

/// Provenance of an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Producing library.
    pub generator: String,
    /// Library version.
    pub version: String,
    /// Creation time, RFC 3339 UTC.
    pub timestamp: String,
    /// View names in generation order.
    pub views: Vec<String>,
    /// Settings that affect the output.
    pub settings: ExportSettings,
}

/// Settings recorded with an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Crease angle in degrees.
    pub angle_threshold: f64,
    /// Whether intersection edges were included.
    pub include_intersection_edges: bool,
    /// Whether candidates were sorted.
    pub sort_edges: bool,
}

/// A line-segment geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    /// Always `"LineSegments"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Vertex attributes.
    pub attributes: LineAttributes,
}

/// Vertex attributes of a [`LineGeometry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAttributes {
    /// Segment endpoints.
    pub position: PositionAttribute,
}

/// Flat position buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAttribute {
    /// `[x, y, z, ...]`, two vertices per segment.
    pub array: Vec<f32>,
    /// Components per vertex.
    pub item_size: usize,
    /// Number of vertices.
    pub count: usize,
    /// Whether values are normalized integers.
    pub normalized: bool,
}

impl LineGeometry {
    /// Geometry for one view.
    pub fn from_view(view: &ViewProjection) -> Self {
        let array = view.lines.positions();
        Self {
            kind: "LineSegments".to_string(),
            attributes: LineAttributes {
                position: PositionAttribute {
                    count: array.len() / 3,
                    array,
                    item_size: 3,
                    normalized: false,
                },
            },
        }
    }
}

impl ExportDocument {
    /// Build a document for every view in `output`.
    pub fn new(output: &ProjectionOutput, options: &ProjectionOptions) -> Self {
        Self::from_views(output.views.iter(), options)
    }

    fn from_views<'a>(
        views: impl IntoIterator<Item = &'a ViewProjection>,
        options: &ProjectionOptions,
    ) -> Self {
        let mut names = Vec::new();
        let mut geometries = BTreeMap::new();
        for view in views {
            let name = view.direction.name().to_string();
            geometries.insert(name.clone(), LineGeometry::from_view(view));
            names.push(name);
        }

        Self {
            metadata: ExportMetadata {
                generator: GENERATOR_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                views: names,
                settings: ExportSettings {
                    angle_threshold: options.angle_threshold,
                    include_intersection_edges: options.include_intersection_edges,
                    sort_edges: options.sort_edges,
                },
            },
            geometries,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        info!(path = %path.display(), views = self.geometries.len(), "wrote projection");
        Ok(())
    }
}

/// Write one document per view as `<dir>/<prefix>_<view>.json`.
///
/// Returns the written paths in view order.
pub fn write_separate(
    output: &ProjectionOutput,
    options: &ProjectionOptions,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(output.views.len());
    for view in &output.views {
        let path = dir.join(format!("{prefix}_{}.json", view.direction.name()));
        ExportDocument::from_views([view], options).write(&path)?;
        paths.push(path);
    }
    Ok(paths)
}
