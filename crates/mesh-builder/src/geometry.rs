//! Geometry buffers handed to the renderer.

/// Primitive type of a geometry buffer, using the GL enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DrawMode {
    Lines = 1,
    Triangles = 4,
}

impl DrawMode {
    /// The GL primitive enum value.
    pub fn gl_value(self) -> u32 {
        self as u32
    }
}

/// Indexed triangle list with per-vertex attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    /// xyz per vertex.
    pub positions: Vec<f32>,
    /// xyz per vertex.
    pub normals: Vec<f32>,
    /// One property value per vertex.
    pub properties: Vec<f32>,
    /// Sequential vertex number, read back by the renderer for picking.
    pub vertex_indices: Vec<i32>,
    /// Three vertex indices per triangle.
    pub indices: Vec<u32>,
    pub draw_mode: DrawMode,
}

impl Default for MeshGeometry {
    fn default() -> Self {
        Self::with_capacity(0, 0)
    }
}

impl MeshGeometry {
    /// Empty triangle geometry with room for `vertices` vertices and `triangles` triangles.
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            properties: Vec::with_capacity(vertices),
            vertex_indices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
            draw_mode: DrawMode::Triangles,
        }
    }

    /// Append a vertex and return its index.
    pub(crate) fn push_vertex(
        &mut self,
        position: [f32; 3],
        normal: [f32; 3],
        property: f32,
    ) -> u32 {
        let index = self.properties.len();
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        self.properties.push(property);
        self.vertex_indices.push(index as i32);
        index as u32
    }

    /// Number of vertices drawn, i.e. the length of the index buffer.
    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of stored vertices.
    pub fn stored_vertex_count(&self) -> usize {
        self.properties.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> [f32; 3] {
        [
            self.positions[3 * i],
            self.positions[3 * i + 1],
            self.positions[3 * i + 2],
        ]
    }

    /// Normal of vertex `i`.
    pub fn normal(&self, i: usize) -> [f32; 3] {
        [self.normals[3 * i], self.normals[3 * i + 1], self.normals[3 * i + 2]]
    }

    /// Vertex indices of triangle `t`.
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [self.indices[3 * t], self.indices[3 * t + 1], self.indices[3 * t + 2]]
    }
}

/// Unindexed line segments, two endpoints per segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGeometry {
    pub positions: Vec<f32>,
    pub draw_mode: DrawMode,
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            draw_mode: DrawMode::Lines,
        }
    }
}

impl LineGeometry {
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            positions: Vec::with_capacity(segments * 6),
            draw_mode: DrawMode::Lines,
        }
    }

    pub(crate) fn push_segment(&mut self, a: [f32; 3], b: [f32; 3]) {
        self.positions.extend_from_slice(&a);
        self.positions.extend_from_slice(&b);
    }

    /// Number of endpoints.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn segment_count(&self) -> usize {
        self.positions.len() / 6
    }

    /// Endpoints of segment `s`.
    pub fn segment(&self, s: usize) -> ([f32; 3], [f32; 3]) {
        let p = &self.positions[6 * s..6 * s + 6];
        ([p[0], p[1], p[2]], [p[3], p[4], p[5]])
    }
}

/// Append one segment per referenced vertex, from the vertex along its normal.
pub(crate) fn append_normal_segments(mesh: &MeshGeometry, lines: &mut LineGeometry, length: f32) {
    let mut seen = vec![false; mesh.stored_vertex_count()];
    for &i in &mesh.indices {
        let i = i as usize;
        if std::mem::replace(&mut seen[i], true) {
            continue;
        }
        let p = mesh.position(i);
        let n = mesh.normal(i);
        lines.push_segment(
            p,
            [p[0] + n[0] * length, p[1] + n[1] * length, p[2] + n[2] * length],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_mode_gl_values() {
        assert_eq!(DrawMode::Triangles.gl_value(), 4);
        assert_eq!(DrawMode::Lines.gl_value(), 1);
    }

    #[test]
    fn test_push_vertex_numbers_sequentially() {
        let mut mesh = MeshGeometry::with_capacity(2, 0);
        assert_eq!(mesh.push_vertex([0.0; 3], [0.0, 0.0, 1.0], 1.5), 0);
        assert_eq!(mesh.push_vertex([1.0; 3], [0.0, 0.0, 1.0], 2.5), 1);
        assert_eq!(mesh.vertex_indices, vec![0, 1]);
        assert_eq!(mesh.position(1), [1.0; 3]);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_normal_segments_once_per_vertex() {
        let mut mesh = MeshGeometry::with_capacity(3, 1);
        for x in 0..3 {
            mesh.push_vertex([x as f32, 0.0, 0.0], [0.0, 0.0, 1.0], 0.0);
        }
        mesh.indices = vec![0, 1, 2, 2, 1, 0];

        let mut lines = LineGeometry::default();
        append_normal_segments(&mesh, &mut lines, 2.0);
        assert_eq!(lines.segment_count(), 3);
        assert_eq!(lines.segment(2), ([2.0, 0.0, 0.0], [2.0, 0.0, 2.0]));
    }
}
