//! Three-dimensional bounding box reported to the host application.

use serde::{Deserialize, Serialize};

/// An axis-aligned 3D bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3D {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl BoundingBox3D {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// Smallest box enclosing every xyz triple in `positions`.
    ///
    /// Returns `None` when `positions` holds no complete finite triple.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut bbox: Option<Self> = None;
        for p in positions.chunks_exact(3) {
            let (x, y, z) = (p[0] as f64, p[1] as f64, p[2] as f64);
            if !(x.is_finite() && y.is_finite() && z.is_finite()) {
                continue;
            }
            bbox = Some(match bbox {
                None => Self::new(x, y, z, x, y, z),
                Some(b) => Self::new(
                    b.min_x.min(x),
                    b.min_y.min(y),
                    b.min_z.min(z),
                    b.max_x.max(x),
                    b.max_y.max(y),
                    b.max_z.max(z),
                ),
            });
        }
        bbox
    }

    /// The box as `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min_x, self.min_y, self.min_z, self.max_x, self.max_y, self.max_z,
        ]
    }

    /// Extent along each axis.
    pub fn size(&self) -> [f64; 3] {
        [
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        ]
    }

    /// Check if a point is contained within this box.
    pub fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        x >= self.min_x
            && x <= self.max_x
            && y >= self.min_y
            && y <= self.max_y
            && z >= self.min_z
            && z <= self.max_z
    }
}
