//! Meshes from explicit vertex and triangle-index arrays (TIN surfaces).

use crate::error::{MeshError, MeshResult};
use crate::geometry::{append_normal_segments, LineGeometry, MeshGeometry};
use crate::normals::{PLACEHOLDER_NORMAL, UP_NORMAL};
use crate::MeshOptions;
use nalgebra::Vector3;
use surface_common::{BoundingBox3D, ValueRange};
use tracing::{debug, instrument};

/// Output of [`build_triangle_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub mesh: MeshGeometry,
    pub lines: LineGeometry,
    /// Extent of the vertex positions; `None` for an empty vertex array.
    pub bounding_box: Option<BoundingBox3D>,
    /// Range of vertex z values.
    pub z_range: Option<ValueRange>,
}

fn vertex(vertices: &[f32], i: usize) -> Vector3<f64> {
    Vector3::new(
        vertices[3 * i] as f64,
        vertices[3 * i + 1] as f64,
        vertices[3 * i + 2] as f64,
    )
}

/// Check that `indices` describes whole triangles over `vertices`; returns the vertex count.
pub fn validate_triangles(vertices: &[f32], indices: &[u32]) -> MeshResult<usize> {
    if vertices.len() % 3 != 0 {
        return Err(MeshError::VertexLength(vertices.len()));
    }
    if indices.len() % 3 != 0 {
        return Err(MeshError::IndexLength(indices.len()));
    }

    let vertex_count = vertices.len() / 3;
    if vertex_count > i32::MAX as usize {
        return Err(MeshError::TooManyVertices {
            vertices: vertex_count,
        });
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(MeshError::IndexOutOfRange {
            index,
            vertices: vertex_count,
        });
    }

    Ok(vertex_count)
}

/// Per-vertex normals: the normalized mean of the unit normals of the
/// adjacent triangles. Counterclockwise winding faces towards the viewer.
pub fn vertex_normals(vertices: &[f32], indices: &[u32], vertex_count: usize) -> Vec<[f32; 3]> {
    let mut sums = vec![Vector3::<f64>::zeros(); vertex_count];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (p0, p1, p2) = (vertex(vertices, a), vertex(vertices, b), vertex(vertices, c));
        // Degenerate triangles carry no direction.
        let Some(n) = (p1 - p0).cross(&(p2 - p0)).try_normalize(f64::EPSILON) else {
            continue;
        };
        for i in [a, b, c] {
            sums[i] += n;
        }
    }

    sums.into_iter()
        .map(|s| match s.try_normalize(f64::EPSILON) {
            Some(n) => [n.x as f32, n.y as f32, n.z as f32],
            None => UP_NORMAL,
        })
        .collect()
}

/// Build the triangle mesh and wireframe for a triangulated surface.
///
/// `vertices` are world-space xyz triples and `indices` hold three vertex
/// indices per triangle. The vertex z value doubles as the property.
#[instrument(skip_all, fields(vertices = vertices.len() / 3, triangles = indices.len() / 3))]
pub fn build_triangle_mesh(
    vertices: &[f32],
    indices: &[u32],
    options: &MeshOptions,
) -> MeshResult<TriangleMesh> {
    let vertex_count = validate_triangles(vertices, indices)?;

    let normals = if options.smooth_shading {
        vertex_normals(vertices, indices, vertex_count)
    } else {
        vec![PLACEHOLDER_NORMAL; vertex_count]
    };

    let mut mesh = MeshGeometry::with_capacity(vertex_count, indices.len() / 3);
    for (i, normal) in normals.into_iter().enumerate() {
        let p = [vertices[3 * i], vertices[3 * i + 1], vertices[3 * i + 2]];
        mesh.push_vertex(p, normal, p[2]);
    }
    mesh.indices.extend_from_slice(indices);

    let mut lines = LineGeometry::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        let p = [tri[0], tri[1], tri[2]].map(|i| mesh.position(i as usize));
        lines.push_segment(p[0], p[1]);
        lines.push_segment(p[1], p[2]);
        lines.push_segment(p[2], p[0]);
    }

    if options.display_normals {
        append_normal_segments(&mesh, &mut lines, options.normal_length);
    }

    let bounding_box = BoundingBox3D::from_positions(vertices);
    let z_range = ValueRange::from_samples(&mesh.properties);

    debug!(
        triangles = mesh.triangle_count(),
        segments = lines.segment_count(),
        "Built triangle mesh"
    );

    Ok(TriangleMesh {
        mesh,
        lines,
        bounding_box,
        z_range,
    })
}
