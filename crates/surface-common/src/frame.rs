//! Regular-grid frame describing a surface's horizontal extent.

use crate::{SurfaceError, SurfaceResult};
use nalgebra::{Matrix4, Point2, Rotation2, Vector3};
use serde::{Deserialize, Serialize};

/// Horizontal extent of a regular grid of nodes.
///
/// Samples are laid out row-major with the first row at the maximum y value:
/// node `(w, h)` sits at `x = ox + w * dx`, `y = oy + (ny - 1 - h) * dy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// World coordinates of the grid origin.
    pub origin: [f64; 2],
    /// Node spacing in x and y.
    pub increment: [f64; 2],
    /// Number of nodes in x and y.
    pub count: [usize; 2],
    /// Counterclockwise rotation in degrees around `rotation_point`.
    #[serde(
        default,
        rename = "rotDeg",
        alias = "rotationDegrees",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotation_degrees: Option<f64>,
    /// Point to rotate around. Defaults to `origin`.
    #[serde(
        default,
        rename = "rotPoint",
        alias = "rotationPoint",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotation_point: Option<[f64; 2]>,
}

/// Where property values live on the grid, inferred from the array length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyLayout {
    /// One value per node, interpolated across each cell.
    NodeCentered,
    /// One value per cell, constant across the cell.
    CellCentered,
}

impl Frame {
    /// Create an unrotated frame.
    pub fn new(origin: [f64; 2], increment: [f64; 2], count: [usize; 2]) -> Self {
        Self {
            origin,
            increment,
            count,
            rotation_degrees: None,
            rotation_point: None,
        }
    }

    /// Rotate the frame counterclockwise by `degrees` around `point` (origin if `None`).
    pub fn with_rotation(mut self, degrees: f64, point: Option<[f64; 2]>) -> Self {
        self.rotation_degrees = Some(degrees);
        self.rotation_point = point;
        self
    }

    /// Number of nodes along x.
    pub fn nx(&self) -> usize {
        self.count[0]
    }

    /// Number of nodes along y.
    pub fn ny(&self) -> usize {
        self.count[1]
    }

    /// Total number of nodes. Saturates on frames that fail [`validate`](Self::validate).
    pub fn node_count(&self) -> usize {
        self.nx().saturating_mul(self.ny())
    }

    /// Total number of cells, `(nx - 1) * (ny - 1)`.
    pub fn cell_count(&self) -> usize {
        self.nx()
            .saturating_sub(1)
            .saturating_mul(self.ny().saturating_sub(1))
    }

    /// True when a zero increment collapses the grid onto a line or point.
    pub fn is_degenerate(&self) -> bool {
        self.increment[0] == 0.0 || self.increment[1] == 0.0
    }

    /// Check the frame invariants.
    pub fn validate(&self) -> SurfaceResult<()> {
        if self.nx() == 0 || self.ny() == 0 {
            return Err(SurfaceError::invalid_frame(format!(
                "node count must be at least 1 in each direction, got {:?}",
                self.count
            )));
        }

        // Three coordinates per node must stay addressable.
        let coordinates = self
            .nx()
            .checked_mul(self.ny())
            .and_then(|n| n.checked_mul(3));
        if coordinates.is_none() {
            return Err(SurfaceError::invalid_frame(format!(
                "node count {:?} overflows",
                self.count
            )));
        }

        let mut coords = self.origin.iter().chain(self.increment.iter());
        if coords.any(|v| !v.is_finite()) {
            return Err(SurfaceError::invalid_frame(format!(
                "origin {:?} and increment {:?} must be finite",
                self.origin, self.increment
            )));
        }

        if let Some(deg) = self.rotation_degrees {
            if !deg.is_finite() {
                return Err(SurfaceError::invalid_frame("rotation must be finite"));
            }
        }

        Ok(())
    }

    /// Infer the property layout from the number of property values.
    pub fn property_layout(&self, len: usize) -> SurfaceResult<PropertyLayout> {
        let nodes = self.node_count();
        let cells = self.cell_count();

        if len == nodes {
            Ok(PropertyLayout::NodeCentered)
        } else if len == cells {
            Ok(PropertyLayout::CellCentered)
        } else {
            Err(SurfaceError::PropertyLayout { len, nodes, cells })
        }
    }

    /// Unrotated world position of node `(w, h)`; row 0 is the maximum-y row.
    pub fn node_position(&self, w: usize, h: usize) -> (f64, f64) {
        let x = self.origin[0] + w as f64 * self.increment[0];
        let y = self.origin[1] + (self.ny() as f64 - 1.0 - h as f64) * self.increment[1];
        (x, y)
    }

    /// Center of rotation.
    pub fn rotation_center(&self) -> [f64; 2] {
        self.rotation_point.unwrap_or(self.origin)
    }

    /// Rotation in radians (0 when unset).
    pub fn rotation_radians(&self) -> f64 {
        self.rotation_degrees.unwrap_or(0.0).to_radians()
    }

    /// Rotate a point counterclockwise around the rotation center.
    pub fn rotate_point(&self, x: f64, y: f64) -> (f64, f64) {
        let [cx, cy] = self.rotation_center();
        let rotation = Rotation2::new(self.rotation_radians());
        let p = rotation * Point2::new(x - cx, y - cy);
        (p.x + cx, p.y + cy)
    }

    /// Axis-aligned x/y bounds of the (possibly rotated) node extent.
    ///
    /// Returns `(min_x, min_y, max_x, max_y)`.
    pub fn xy_bounds(&self) -> (f64, f64, f64, f64) {
        let x0 = self.origin[0];
        let y0 = self.origin[1];
        let x1 = x0 + self.increment[0] * self.nx().saturating_sub(1) as f64;
        let y1 = y0 + self.increment[1] * self.ny().saturating_sub(1) as f64;

        let corners = [
            self.rotate_point(x0, y0),
            self.rotate_point(x1, y0),
            self.rotate_point(x1, y1),
            self.rotate_point(x0, y1),
        ];

        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }

    /// Model matrix rotating the surface around the rotation center.
    pub fn model_matrix(&self) -> Matrix4<f64> {
        let [cx, cy] = self.rotation_center();
        let to_center = Matrix4::new_translation(&Vector3::new(cx, cy, 0.0));
        let from_center = Matrix4::new_translation(&Vector3::new(-cx, -cy, 0.0));
        let rotation = Matrix4::from_axis_angle(&Vector3::z_axis(), self.rotation_radians());
        to_center * rotation * from_center
    }
}
