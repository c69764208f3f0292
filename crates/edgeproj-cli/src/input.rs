//! Mesh and configuration files.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use edgeproj::{ProjectionOptions, TriangleSoup};
use serde::Deserialize;

/// Accepted mesh file layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum MeshFile {
    /// `{ "parts": [ { "position": [...], "index": [...] }, ... ] }`
    Parts { parts: Vec<TriangleSoup> },
    /// `{ "position": [...], "index": [...] }`
    Single(TriangleSoup),
}

/// Read every part from a mesh JSON file.
pub fn load_parts(path: &Path) -> Result<Vec<TriangleSoup>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_parts(&json).with_context(|| format!("invalid mesh file {}", path.display()))
}

/// Parse a mesh JSON document into its parts.
pub fn parse_parts(json: &str) -> Result<Vec<TriangleSoup>> {
    let parts = match serde_json::from_str(json)? {
        MeshFile::Parts { parts } => parts,
        MeshFile::Single(mesh) => vec![mesh],
    };
    if parts.is_empty() {
        bail!("mesh file contains no parts");
    }
    Ok(parts)
}

/// Read projection options from a TOML file. Missing keys take defaults.
pub fn load_options(path: &Path) -> Result<ProjectionOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}
