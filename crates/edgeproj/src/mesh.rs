//! Triangle soup input.
//!
//! A [`TriangleSoup`] is a flat `f32` position buffer plus an optional index
//! buffer, the same layout GPU vertex buffers use. Without indices, every
//! three consecutive vertices form a triangle.

use edgeproj_math::{Aabb3, Point3, Transform, Triangle};
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Indexed or non-indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleSoup {
    /// Vertex positions as `[x, y, z, x, y, z, ...]`.
    #[serde(rename = "position")]
    pub positions: Vec<f32>,
    /// Triangle vertex indices, three per triangle.
    #[serde(rename = "index", default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u32>>,
}

impl TriangleSoup {
    /// Indexed mesh.
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Non-indexed mesh: every vertex triple is a triangle.
    pub fn non_indexed(positions: Vec<f32>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Closed axis-aligned box with outward-facing triangles.
    pub fn cuboid(min: [f32; 3], max: [f32; 3]) -> Self {
        let [x0, y0, z0] = min;
        let [x1, y1, z1] = max;
        #[rustfmt::skip]
        let positions = vec![
            x0, y0, z0,  x1, y0, z0,  x1, y1, z0,  x0, y1, z0,
            x0, y0, z1,  x1, y0, z1,  x1, y1, z1,  x0, y1, z1,
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1,  0, 3, 2, // bottom
            4, 5, 6,  4, 6, 7, // top
            0, 1, 5,  0, 5, 4, // front
            2, 3, 7,  2, 7, 6, // back
            3, 0, 4,  3, 4, 7, // left
            1, 2, 6,  1, 6, 5, // right
        ];
        Self::new(positions, indices)
    }

    /// Number of vertices in the position buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles described by the mesh.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Check buffer strides and index ranges.
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(ProjectionError::EmptyPositions);
        }
        if self.positions.len() % 3 != 0 {
            return Err(ProjectionError::PositionStride(self.positions.len()));
        }
        if let Some(indices) = &self.indices {
            if indices.len() % 3 != 0 {
                return Err(ProjectionError::IndexStride(indices.len()));
            }
            let vertex_count = self.vertex_count();
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(ProjectionError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Position of vertex `i` in double precision.
    pub fn vertex(&self, i: usize) -> Point3 {
        let p = &self.positions[i * 3..i * 3 + 3];
        Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    /// Vertex indices of triangle `t`.
    pub fn triangle_indices(&self, t: usize) -> [usize; 3] {
        match &self.indices {
            Some(indices) => [
                indices[t * 3] as usize,
                indices[t * 3 + 1] as usize,
                indices[t * 3 + 2] as usize,
            ],
            None => [t * 3, t * 3 + 1, t * 3 + 2],
        }
    }

    /// All triangles, in index order.
    ///
    /// The mesh must have passed [`TriangleSoup::validate`].
    pub fn triangles(&self) -> Vec<Triangle> {
        self.transformed_triangles(&Transform::identity())
    }

    /// All triangles with `transform` applied to every vertex.
    pub fn transformed_triangles(&self, transform: &Transform) -> Vec<Triangle> {
        let vertices: Vec<Point3> = (0..self.vertex_count())
            .map(|i| transform.apply_point(&self.vertex(i)))
            .collect();

        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle_indices(t);
                Triangle::new(vertices[a], vertices[b], vertices[c])
            })
            .collect()
    }

    /// Bounding box of every vertex in the position buffer.
    pub fn bounds(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for i in 0..self.vertex_count() {
            aabb.include_point(&self.vertex(i));
        }
        aabb
    }

    /// Validate and merge several parts into one soup.
    ///
    /// Positions are concatenated and indices re-based onto the merged
    /// buffer. When at least one part is indexed, non-indexed parts are
    /// expanded to sequential indices so the result stays a single layout.
    pub fn merge(parts: &[TriangleSoup]) -> Result<TriangleSoup> {
        if parts.is_empty() {
            return Err(ProjectionError::EmptyPositions);
        }
        for part in parts {
            part.validate()?;
        }

        if parts.len() == 1 {
            return Ok(parts[0].clone());
        }

        if parts.iter().all(|p| p.indices.is_none()) {
            // Trailing vertices that do not complete a triangle would shift
            // later parts out of alignment.
            let mut positions = Vec::new();
            for part in parts {
                let used = part.triangle_count() * 9;
                positions.extend_from_slice(&part.positions[..used]);
            }
            return Ok(TriangleSoup::non_indexed(positions));
        }

        let positions: Vec<f32> = parts
            .iter()
            .flat_map(|p| p.positions.iter().copied())
            .collect();
        let mut indices = Vec::new();
        let mut offset = 0u32;
        for part in parts {
            match &part.indices {
                Some(idx) => indices.extend(idx.iter().map(|i| i + offset)),
                None => {
                    let used = (part.triangle_count() * 3) as u32;
                    indices.extend((0..used).map(|i| i + offset));
                }
            }
            offset += part.vertex_count() as u32;
        }

        Ok(TriangleSoup::new(positions, indices))
    }
}
