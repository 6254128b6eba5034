//! # Procedural Geometry Generation
//!
//! Meshes are generated procedurally; the scene loads no model files.
//!
//! ## Supported Primitives
//!
//! - **Plane**: flat ground plane with configurable size and subdivisions
//! - **Star**: extruded n-pointed star with an optional bevel
//!
//! ## Usage
//!
//! ```rust
//! use evergreen::gfx::geometry::{generate_plane, generate_star, StarBevel};
//!
//! let ground = generate_plane(100.0, 100.0, 1, 1);
//! let star = generate_star(5, 2.0, 0.9, 0.4, StarBevel::NONE);
//! assert_eq!(star.triangle_count(), 40);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::rendering::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleave positions and normals into GPU vertices
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}
