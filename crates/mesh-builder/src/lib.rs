//! Triangle mesh construction for surfaces.
//!
//! Two builders share one output format ([`MeshGeometry`] plus a
//! [`LineGeometry`] wireframe):
//!
//! - [`build_grid_mesh`] triangulates a regular grid of elevation samples,
//!   skipping cells around missing (NaN) samples.
//! - [`build_triangle_mesh`] takes explicit vertices and triangle indices.
//!
//! Both are pure functions and safe to run on worker threads.

pub mod error;
pub mod geometry;
pub mod grid;
pub mod normals;
pub mod triangles;

pub use error::{MeshError, MeshResult};
pub use geometry::{DrawMode, LineGeometry, MeshGeometry};
pub use grid::{build_grid_mesh, GridMesh};
pub use normals::{grid_normals, ElevationGrid, PLACEHOLDER_NORMAL, UP_NORMAL};
pub use triangles::{build_triangle_mesh, vertex_normals, TriangleMesh};

/// Default length of debug normal segments, in world units.
pub const DEFAULT_NORMAL_LENGTH: f32 = 5.0;

/// Options shared by the mesh builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Compute per-vertex normals. When off every normal is [`PLACEHOLDER_NORMAL`].
    pub smooth_shading: bool,
    /// Append a segment along each vertex normal to the wireframe.
    pub display_normals: bool,
    /// Length of the debug normal segments.
    pub normal_length: f32,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            smooth_shading: true,
            display_normals: false,
            normal_length: DEFAULT_NORMAL_LENGTH,
        }
    }
}

impl MeshOptions {
    pub fn smooth(smooth_shading: bool) -> Self {
        Self {
            smooth_shading,
            ..Self::default()
        }
    }

    pub fn with_normals(mut self, display_normals: bool) -> Self {
        self.display_normals = display_normals;
        self
    }
}
