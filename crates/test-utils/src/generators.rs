//! Test data generators for synthetic surfaces.
//!
//! These generators create predictable, verifiable grids and triangle meshes
//! that can be used across the test suite. Grids are row-major with row 0 at
//! the maximum-y edge, matching the surface frame convention.

/// Creates a flat surface at a constant depth.
pub fn create_flat_grid(width: usize, height: usize, depth: f32) -> Vec<f32> {
    vec![depth; width * height]
}

/// Creates a planar surface `depth = base + col * dcol + row * drow`.
///
/// Useful for checking normals, which must be identical at every interior
/// node of a plane.
pub fn create_sloped_plane(
    width: usize,
    height: usize,
    base: f32,
    dcol: f32,
    drow: f32,
) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(base + col as f32 * dcol + row as f32 * drow);
        }
    }
    data
}

/// Creates property values `0, 1, 2, ... count - 1`.
pub fn create_ramp_properties(count: usize) -> Vec<f32> {
    (0..count).map(|i| i as f32).collect()
}

/// Creates a grid of depths with a smooth dome in the middle.
///
/// Depth ranges from `base` at the edges to `base - height_m` at the center.
pub fn create_dome_grid(width: usize, height: usize, base: f32, height_m: f32) -> Vec<f32> {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let radius = cx.max(cy).max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = (col as f32 - cx) / radius;
            let dy = (row as f32 - cy) / radius;
            let r2 = (dx * dx + dy * dy).min(1.0);
            data.push(base - height_m * (1.0 - r2));
        }
    }
    data
}

/// Creates a pseudo-random depth grid.
///
/// Uses a simple deterministic LCG so the same seed always produces the
/// same surface.
pub fn create_noisy_grid(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut state = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
    let mut data = Vec::with_capacity(width * height);
    for _ in 0..width * height {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let noise = ((state >> 16) & 0x7fff) as f32 / 32_767.0;
        data.push(1000.0 + noise * 50.0);
    }
    data
}

/// Creates a grid with NaN at specific (col, row) positions.
///
/// # Returns
///
/// A `Vec<f32>` with NaN at specified positions, zeros elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    punch_holes(&mut data, width, nan_positions);
    data
}

/// Overwrites the given (col, row) positions of an existing grid with NaN.
pub fn punch_holes(data: &mut [f32], width: usize, nan_positions: &[(usize, usize)]) {
    for &(col, row) in nan_positions {
        if col < width {
            if let Some(v) = data.get_mut(row * width + col) {
                *v = f32::NAN;
            }
        }
    }
}

/// Creates a triangulated square of `n x n` vertices as `(points, triangles)`.
///
/// Points are xyz triples in depth convention (`z = depth`), triangles are
/// index triples, two per quad.
pub fn create_tin_square(n: usize, spacing: f32, depth: f32) -> (Vec<f32>, Vec<u32>) {
    let mut points = Vec::with_capacity(n * n * 3);
    for row in 0..n {
        for col in 0..n {
            points.extend_from_slice(&[col as f32 * spacing, row as f32 * spacing, depth]);
        }
    }

    let mut triangles = Vec::new();
    for row in 0..n.saturating_sub(1) {
        for col in 0..n.saturating_sub(1) {
            let i0 = (row * n + col) as u32;
            let i1 = i0 + 1;
            let i2 = i0 + n as u32;
            let i3 = i2 + 1;
            triangles.extend_from_slice(&[i0, i1, i3, i0, i3, i2]);
        }
    }

    (points, triangles)
}
