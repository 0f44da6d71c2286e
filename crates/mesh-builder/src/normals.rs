//! Per-node surface normals for gridded surfaces.
//!
//! A node's normal is the normalized sum of the cross products of its four
//! quadrants (N-W, E-N, S-E, W-S). A quadrant contributes only when both of
//! its neighbors are active. Normals are oriented to face +z.

use nalgebra::Vector3;
use rayon::prelude::*;
use surface_common::Frame;

/// Normal used when smooth shading is off. The renderer computes flat
/// per-triangle normals when it sees this value.
pub const PLACEHOLDER_NORMAL: [f32; 3] = [1.0, 1.0, 1.0];

/// Up-vector, used where no normal can be estimated.
pub const UP_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Grids with at least this many nodes compute normals in parallel.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Elevation samples laid out on a frame.
#[derive(Debug, Clone, Copy)]
pub struct ElevationGrid<'a> {
    frame: &'a Frame,
    samples: &'a [f32],
}

impl<'a> ElevationGrid<'a> {
    /// `samples` must hold one value per frame node.
    pub fn new(frame: &'a Frame, samples: &'a [f32]) -> Self {
        debug_assert_eq!(samples.len(), frame.node_count());
        Self { frame, samples }
    }

    /// Sample at node `(w, h)`; `None` outside the grid or where the sample is NaN.
    pub fn sample(&self, w: isize, h: isize) -> Option<f32> {
        if w < 0 || h < 0 || w as usize >= self.frame.nx() || h as usize >= self.frame.ny() {
            return None;
        }
        let v = self.samples[h as usize * self.frame.nx() + w as usize];
        (!v.is_nan()).then_some(v)
    }

    /// World position of an active node, with `z = -sample`.
    fn point(&self, w: isize, h: isize) -> Option<Vector3<f64>> {
        let depth = self.sample(w, h)?;
        let (x, y) = self.frame.node_position(w as usize, h as usize);
        Some(Vector3::new(x, y, -(depth as f64)))
    }

    /// Smoothed normal at node `(w, h)`.
    pub fn node_normal(&self, w: usize, h: usize) -> [f32; 3] {
        let (w, h) = (w as isize, h as isize);
        let Some(center) = self.point(w, h) else {
            return UP_NORMAL;
        };

        let rel = |p: Option<Vector3<f64>>| p.map(|p| p - center);
        let north = rel(self.point(w, h - 1));
        let south = rel(self.point(w, h + 1));
        let east = rel(self.point(w + 1, h));
        let west = rel(self.point(w - 1, h));

        let quadrants = [(north, west), (east, north), (south, east), (west, south)];
        let mut sum = Vector3::zeros();
        let mut count = 0;
        for (a, b) in quadrants {
            if let (Some(a), Some(b)) = (a, b) {
                let n = a.cross(&b);
                // Negative increments mirror the grid and flip the winding.
                sum += if n.z < 0.0 { -n } else { n };
                count += 1;
            }
        }

        if count == 0 {
            return UP_NORMAL;
        }

        match sum.try_normalize(f64::EPSILON) {
            Some(n) => [n.x as f32, n.y as f32, n.z as f32],
            None => UP_NORMAL,
        }
    }
}

/// Normals for every node of the frame, row-major.
///
/// Without an elevation array every normal is the up-vector.
pub fn grid_normals(
    elevation: Option<&[f32]>,
    frame: &Frame,
    smooth_shading: bool,
) -> Vec<[f32; 3]> {
    let nodes = frame.node_count();
    if !smooth_shading {
        return vec![PLACEHOLDER_NORMAL; nodes];
    }
    let Some(samples) = elevation else {
        return vec![UP_NORMAL; nodes];
    };

    let grid = ElevationGrid::new(frame, samples);
    let nx = frame.nx();
    let normal_at = |i: usize| grid.node_normal(i % nx, i / nx);

    if nodes >= PARALLEL_THRESHOLD {
        (0..nodes).into_par_iter().map(normal_at).collect()
    } else {
        (0..nodes).map(normal_at).collect()
    }
}
