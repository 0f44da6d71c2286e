//! Triangulation of regular-grid surfaces.
//!
//! Cells are visited row by row. Each cell has the corners
//!
//! ```text
//!   NW(0) ---- NE(1)
//!     |          |
//!   SW(3) ---- SE(2)
//! ```
//!
//! and is split along the NE-SW diagonal when both of those corners are
//! active, otherwise along NW-SE when both of those are. Each half is drawn
//! only if its remaining corner is active too.

use crate::error::{MeshError, MeshResult};
use crate::geometry::{append_normal_segments, LineGeometry, MeshGeometry};
use crate::normals::grid_normals;
use crate::MeshOptions;
use surface_common::{Frame, PropertyLayout, ValueRange};
use tracing::{debug, instrument};

const NW: usize = 0;
const NE: usize = 1;
const SE: usize = 2;
const SW: usize = 3;

/// One drawable half of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellTriangle {
    /// Corner slots; the last one is the provoking vertex.
    corners: [usize; 3],
    /// The two cell-boundary edges of the triangle.
    edges: [[usize; 2]; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSplit {
    triangles: [Option<CellTriangle>; 2],
    diagonal: [usize; 2],
}

impl CellSplit {
    fn drawn(&self) -> impl Iterator<Item = &CellTriangle> {
        self.triangles.iter().flatten()
    }

    /// True when only one half of the cell is drawn.
    fn is_partial(&self) -> bool {
        self.triangles.iter().filter(|t| t.is_some()).count() == 1
    }
}

/// Choose the diagonal and drawable triangles for a cell.
fn split_cell(active: [bool; 4]) -> Option<CellSplit> {
    let split = if active[NE] && active[SW] {
        CellSplit {
            triangles: [
                active[NW].then_some(CellTriangle {
                    corners: [NE, SW, NW],
                    edges: [[NW, SW], [NW, NE]],
                }),
                active[SE].then_some(CellTriangle {
                    corners: [NE, SW, SE],
                    edges: [[SE, SW], [SE, NE]],
                }),
            ],
            diagonal: [NE, SW],
        }
    } else if active[NW] && active[SE] {
        CellSplit {
            triangles: [
                active[NE].then_some(CellTriangle {
                    corners: [NE, SE, NW],
                    edges: [[NE, NW], [NE, SE]],
                }),
                active[SW].then_some(CellTriangle {
                    corners: [SW, NW, SE],
                    edges: [[SW, NW], [SW, SE]],
                }),
            ],
            diagonal: [NW, SE],
        }
    } else {
        return None;
    };

    if split.triangles.iter().all(Option::is_none) {
        return None;
    }
    Some(split)
}

/// Output of [`build_grid_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    pub mesh: MeshGeometry,
    pub lines: LineGeometry,
    /// Range of the elevation samples, `None` without elevation or finite samples.
    pub elevation_range: Option<ValueRange>,
    pub property_range: Option<ValueRange>,
    pub layout: PropertyLayout,
}

/// Build the triangle mesh and wireframe for a gridded surface.
///
/// `elevation` holds one depth per node (vertices are placed at
/// `z = -depth`). Without it the surface is flat at `z = 0` and every node
/// whose property is defined is active.
#[instrument(skip_all, fields(nx = frame.nx(), ny = frame.ny(), props = properties.len()))]
pub fn build_grid_mesh(
    elevation: Option<&[f32]>,
    properties: &[f32],
    frame: &Frame,
    options: &MeshOptions,
) -> MeshResult<GridMesh> {
    frame.validate()?;

    let nodes = frame.node_count();
    if let Some(samples) = elevation {
        if samples.len() != nodes {
            return Err(MeshError::ElevationLength {
                len: samples.len(),
                nodes,
            });
        }
    }

    let layout = frame.property_layout(properties.len())?;
    let max_vertices = match layout {
        PropertyLayout::NodeCentered => nodes,
        PropertyLayout::CellCentered => frame.cell_count().saturating_mul(6),
    };
    if max_vertices > i32::MAX as usize {
        return Err(MeshError::TooManyVertices {
            vertices: max_vertices,
        });
    }

    let elevation_range = elevation.and_then(ValueRange::from_samples);
    let property_range = ValueRange::from_samples(properties);

    let builder = GridBuilder::new(elevation, properties, frame, options);
    let (mut mesh, mut lines) = match layout {
        PropertyLayout::NodeCentered => builder.node_centered(),
        PropertyLayout::CellCentered => builder.cell_centered(),
    };

    if options.display_normals {
        append_normal_segments(&mesh, &mut lines, options.normal_length);
    }

    debug!(
        layout = ?layout,
        triangles = mesh.triangle_count(),
        segments = lines.segment_count(),
        "Built grid mesh"
    );

    Ok(GridMesh {
        mesh,
        lines,
        elevation_range,
        property_range,
        layout,
    })
}

struct GridBuilder<'a> {
    elevation: Option<&'a [f32]>,
    properties: &'a [f32],
    frame: &'a Frame,
    nx: usize,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
}

impl<'a> GridBuilder<'a> {
    fn new(
        elevation: Option<&'a [f32]>,
        properties: &'a [f32],
        frame: &'a Frame,
        options: &MeshOptions,
    ) -> Self {
        let nx = frame.nx();
        let positions = (0..frame.node_count())
            .map(|i| {
                let (x, y) = frame.node_position(i % nx, i / nx);
                let z = elevation
                    .and_then(|e| defined(e[i]))
                    .map_or(0.0, |depth| -depth);
                [x as f32, y as f32, z]
            })
            .collect();
        let normals = grid_normals(elevation, frame, options.smooth_shading);

        Self {
            elevation,
            properties,
            frame,
            nx,
            positions,
            normals,
        }
    }

    fn elevation_active(&self, node: usize) -> bool {
        self.elevation.map_or(true, |e| defined(e[node]).is_some())
    }

    /// Node indices of the cell whose NW corner is `(w, h)`, in corner-slot order.
    fn cell_nodes(&self, w: usize, h: usize) -> [usize; 4] {
        let i0 = h * self.nx + w;
        [i0, i0 + 1, i0 + self.nx + 1, i0 + self.nx]
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (nx, ny) = (self.nx, self.frame.ny());
        (0..ny.saturating_sub(1))
            .flat_map(move |h| (0..nx.saturating_sub(1)).map(move |w| (w, h)))
    }

    fn push_cell_lines(&self, lines: &mut LineGeometry, split: &CellSplit, nodes: &[usize; 4]) {
        for triangle in split.drawn() {
            for [a, b] in triangle.edges {
                lines.push_segment(self.positions[nodes[a]], self.positions[nodes[b]]);
            }
        }
        if split.is_partial() {
            let [a, b] = split.diagonal;
            lines.push_segment(self.positions[nodes[a]], self.positions[nodes[b]]);
        }
    }

    /// One shared vertex per node; triangles index into them.
    fn node_centered(self) -> (MeshGeometry, LineGeometry) {
        let nodes = self.frame.node_count();
        let cells = self.frame.cell_count();
        let mut mesh = MeshGeometry::with_capacity(nodes, cells * 2);
        let mut lines = LineGeometry::with_capacity(cells * 2);

        for i in 0..nodes {
            mesh.push_vertex(self.positions[i], self.normals[i], self.properties[i]);
        }

        for (w, h) in self.cells() {
            let cell = self.cell_nodes(w, h);
            let active =
                cell.map(|n| defined(self.properties[n]).is_some() && self.elevation_active(n));
            let Some(split) = split_cell(active) else {
                continue;
            };

            for triangle in split.drawn() {
                mesh.indices
                    .extend(triangle.corners.iter().map(|&c| cell[c] as u32));
            }
            self.push_cell_lines(&mut lines, &split, &cell);
        }

        (mesh, lines)
    }

    /// Fresh vertices per triangle so each cell carries one constant property.
    fn cell_centered(self) -> (MeshGeometry, LineGeometry) {
        let cells = self.frame.cell_count();
        let mut mesh = MeshGeometry::with_capacity(cells * 6, cells * 2);
        let mut lines = LineGeometry::with_capacity(cells * 2);

        for (w, h) in self.cells() {
            let Some(value) = defined(self.properties[h * (self.nx - 1) + w]) else {
                continue;
            };

            let cell = self.cell_nodes(w, h);
            let active = cell.map(|n| self.elevation_active(n));
            let Some(split) = split_cell(active) else {
                continue;
            };

            for triangle in split.drawn() {
                for &c in &triangle.corners {
                    let node = cell[c];
                    let v = mesh.push_vertex(self.positions[node], self.normals[node], value);
                    mesh.indices.push(v);
                }
            }
            self.push_cell_lines(&mut lines, &split, &cell);
        }

        (mesh, lines)
    }
}

/// `None` for NaN samples.
fn defined(v: f32) -> Option<f32> {
    (!v.is_nan()).then_some(v)
}
