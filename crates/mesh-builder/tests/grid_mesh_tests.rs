//! Tests for regular-grid mesh construction.
//!
//! Covers:
//! - Triangle counts and ranges on fully active grids
//! - NaN activity gating for node- and cell-centered properties
//! - Normal estimation and the smooth-shading placeholder
//! - Input validation

use mesh_builder::{
    build_grid_mesh, DrawMode, MeshError, MeshOptions, PLACEHOLDER_NORMAL, UP_NORMAL,
};
use surface_common::{Frame, PropertyLayout, SurfaceError};
use test_utils::{
    assert_approx_eq, assert_coords_approx_eq, create_flat_grid, create_grid_with_nans,
    create_noisy_grid, create_ramp_properties, create_sloped_plane, frames, punch_holes,
};

// ============================================================================
// Helper functions
// ============================================================================

/// Triangles must never reference a node whose sample is NaN.
fn assert_no_triangle_touches_nan(indices: &[u32], samples: &[f32]) {
    for &i in indices {
        assert!(
            !samples[i as usize].is_nan(),
            "triangle references inactive node {}",
            i
        );
    }
}

// ============================================================================
// Fully active grids
// ============================================================================

#[test]
fn test_end_to_end_flat_3x3() {
    let frame = frames::unit_3x3();
    let elevation = create_flat_grid(3, 3, 0.0);
    let properties = create_ramp_properties(9);

    let grid = build_grid_mesh(Some(&elevation), &properties, &frame, &MeshOptions::default())
        .unwrap();

    assert_eq!(grid.layout, PropertyLayout::NodeCentered);
    assert_eq!(grid.mesh.triangle_count(), 8);
    assert_eq!(grid.mesh.vertex_count(), 24);
    assert_eq!(grid.mesh.stored_vertex_count(), 9);
    assert_eq!(grid.mesh.draw_mode, DrawMode::Triangles);
    assert_eq!(grid.lines.draw_mode, DrawMode::Lines);

    let property_range = grid.property_range.unwrap();
    assert_eq!(property_range.to_array(), [0.0, 8.0]);
    let elevation_range = grid.elevation_range.unwrap();
    assert_eq!(elevation_range.to_array(), [0.0, 0.0]);

    for i in 0..9 {
        assert_coords_approx_eq!(grid.mesh.normal(i), UP_NORMAL, 1e-6);
    }
}

#[test]
fn test_flat_depth_places_vertices_below_zero() {
    let frame = frames::unit_3x3();
    let elevation = create_flat_grid(3, 3, 1500.0);
    let grid = build_grid_mesh(
        Some(&elevation),
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert!(grid.mesh.positions.chunks_exact(3).all(|p| p[2] == -1500.0));
    for i in 0..9 {
        assert_coords_approx_eq!(grid.mesh.normal(i), UP_NORMAL, 1e-6);
    }
}

#[test]
fn test_first_row_is_max_y() {
    let frame = surface_common::Frame::new([10.0, 20.0], [2.0, 5.0], [3, 3]);
    let grid = build_grid_mesh(
        None,
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert_eq!(grid.mesh.position(0), [10.0, 30.0, 0.0]);
    assert_eq!(grid.mesh.position(2), [14.0, 30.0, 0.0]);
    assert_eq!(grid.mesh.position(8), [14.0, 20.0, 0.0]);
    assert_eq!(grid.mesh.vertex_indices, (0..9).collect::<Vec<i32>>());
}

#[test]
fn test_full_grid_wireframe() {
    let frame = frames::unit_3x3();
    let grid = build_grid_mesh(
        Some(&create_flat_grid(3, 3, 0.0)),
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    // Two boundary edges per triangle, no diagonals for complete cells.
    assert_eq!(grid.lines.segment_count(), 16);
    assert_eq!(grid.lines.vertex_count(), 32);
}

#[test]
fn test_first_cell_uses_ne_sw_diagonal() {
    let frame = frames::unit_3x3();
    let grid = build_grid_mesh(
        None,
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    // Cell (0, 0): NW = 0, NE = 1, SE = 4, SW = 3.
    assert_eq!(grid.mesh.triangle(0), [1, 3, 0]);
    assert_eq!(grid.mesh.triangle(1), [1, 3, 4]);
}

// ============================================================================
// Activity gating
// ============================================================================

#[test]
fn test_nan_center_leaves_one_triangle_per_cell() {
    let frame = frames::unit_3x3();
    let elevation = create_grid_with_nans(3, 3, &[(1, 1)]);
    let grid = build_grid_mesh(
        Some(&elevation),
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert_eq!(grid.mesh.triangle_count(), 4);
    assert_no_triangle_touches_nan(&grid.mesh.indices, &elevation);
    // Two boundary edges plus the diagonal for each partial cell.
    assert_eq!(grid.lines.segment_count(), 12);
    // The inactive node still has a finite position.
    assert_eq!(grid.mesh.position(4), [1.0, 1.0, 0.0]);
}

#[test]
fn test_nan_property_deactivates_node() {
    let frame = frames::unit_3x3();
    let mut properties = create_ramp_properties(9);
    properties[0] = f32::NAN;

    let grid = build_grid_mesh(
        Some(&create_flat_grid(3, 3, 10.0)),
        &properties,
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert_eq!(grid.mesh.triangle_count(), 7);
    assert_no_triangle_touches_nan(&grid.mesh.indices, &properties);
    assert_eq!(grid.property_range.unwrap().to_array(), [1.0, 8.0]);
}

#[test]
fn test_triangle_count_decreases_with_holes() {
    let frame = frames::utm_field(5, 5);
    let mut elevation = create_noisy_grid(5, 5, 7);
    let properties = create_ramp_properties(25);
    let options = MeshOptions::default();

    let mut previous = build_grid_mesh(Some(&elevation), &properties, &frame, &options)
        .unwrap()
        .mesh
        .triangle_count();
    assert_eq!(previous, 32);

    for hole in [(1, 1), (3, 3), (1, 3), (3, 1), (2, 2)] {
        punch_holes(&mut elevation, 5, &[hole]);
        let grid = build_grid_mesh(Some(&elevation), &properties, &frame, &options).unwrap();
        let count = grid.mesh.triangle_count();
        assert!(count < previous, "hole {:?}: {} >= {}", hole, count, previous);
        assert_no_triangle_touches_nan(&grid.mesh.indices, &elevation);
        previous = count;
    }
}

#[test]
fn test_all_nan_yields_empty_mesh() {
    let frame = frames::unit_3x3();
    let elevation = vec![f32::NAN; 9];
    let grid = build_grid_mesh(
        Some(&elevation),
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert!(grid.mesh.is_empty());
    assert_eq!(grid.lines.segment_count(), 0);
    assert!(grid.elevation_range.is_none());
}

#[test]
fn test_property_only_surface_is_flat() {
    let frame = frames::unit_3x3();
    let mut properties = create_ramp_properties(9);
    properties[8] = f32::NAN;

    let grid = build_grid_mesh(None, &properties, &frame, &MeshOptions::default()).unwrap();

    assert!(grid.elevation_range.is_none());
    assert!(grid.mesh.positions.chunks_exact(3).all(|p| p[2] == 0.0));
    assert!(grid
        .mesh
        .normals
        .chunks_exact(3)
        .all(|n| n == UP_NORMAL.as_slice()));
    assert_eq!(grid.mesh.triangle_count(), 7);
}

// ============================================================================
// Normals
// ============================================================================

#[test]
fn test_smooth_shading_off_gives_placeholder() {
    let frame = frames::unit_4x3();
    let mut elevation = create_noisy_grid(4, 3, 3);
    punch_holes(&mut elevation, 4, &[(1, 1), (3, 0)]);

    let grid = build_grid_mesh(
        Some(&elevation),
        &create_ramp_properties(12),
        &frame,
        &MeshOptions::smooth(false),
    )
    .unwrap();

    assert!(grid
        .mesh
        .normals
        .chunks_exact(3)
        .all(|n| n == PLACEHOLDER_NORMAL.as_slice()));
}

#[test]
fn test_sloped_plane_normals() {
    let frame = frames::unit_4x3();
    // Depth grows by 1 per column: the surface falls towards +x at 45 degrees.
    let elevation = create_sloped_plane(4, 3, 100.0, 1.0, 0.0);
    let grid = build_grid_mesh(
        Some(&elevation),
        &create_ramp_properties(12),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    let s = std::f32::consts::FRAC_1_SQRT_2;
    for i in 0..12 {
        assert_coords_approx_eq!(grid.mesh.normal(i), [s, 0.0, s], 1e-5);
    }
}

#[test]
fn test_display_normals_appends_segments() {
    let frame = frames::unit_3x3();
    let options = MeshOptions::default().with_normals(true);
    let grid = build_grid_mesh(
        Some(&create_flat_grid(3, 3, 0.0)),
        &create_ramp_properties(9),
        &frame,
        &options,
    )
    .unwrap();

    assert_eq!(grid.lines.segment_count(), 16 + 9);
    let (start, end) = grid.lines.segment(16);
    assert_approx_eq!(end[2] - start[2], options.normal_length, 1e-5);
}

#[test]
fn test_build_is_idempotent() {
    let frame = frames::rotated_field(12, 9);
    let mut elevation = create_noisy_grid(12, 9, 11);
    punch_holes(&mut elevation, 12, &[(0, 0), (5, 4), (6, 4), (11, 8)]);
    let properties = create_ramp_properties(12 * 9);
    let options = MeshOptions::default();

    let first = build_grid_mesh(Some(&elevation), &properties, &frame, &options).unwrap();
    let second = build_grid_mesh(Some(&elevation), &properties, &frame, &options).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Cell-centered properties
// ============================================================================

#[test]
fn test_cell_centered_duplicates_vertices() {
    let frame = frames::unit_4x3();
    let properties = create_ramp_properties(6);
    let grid = build_grid_mesh(
        Some(&create_flat_grid(4, 3, 0.0)),
        &properties,
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert_eq!(grid.layout, PropertyLayout::CellCentered);
    assert_eq!(grid.mesh.triangle_count(), 12);
    assert_eq!(grid.mesh.stored_vertex_count(), 36);
    assert_eq!(grid.mesh.indices, (0..36).collect::<Vec<u32>>());

    // Two triangles per cell, each vertex carrying the cell value.
    for t in 0..12 {
        let cell_value = (t / 2) as f32;
        for v in grid.mesh.triangle(t) {
            assert_eq!(grid.mesh.properties[v as usize], cell_value);
        }
    }
    assert_eq!(grid.property_range.unwrap().to_array(), [0.0, 5.0]);
}

#[test]
fn test_cell_centered_nan_property_skips_cell() {
    let frame = frames::unit_4x3();
    let mut properties = create_ramp_properties(6);
    properties[2] = f32::NAN;

    let grid = build_grid_mesh(
        Some(&create_flat_grid(4, 3, 0.0)),
        &properties,
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert_eq!(grid.mesh.triangle_count(), 10);
    assert!(grid.mesh.properties.iter().all(|v| !v.is_nan()));
}

#[test]
fn test_cell_centered_nan_elevation() {
    let frame = frames::unit_4x3();
    // Corner node shared by a single cell.
    let elevation = create_grid_with_nans(4, 3, &[(0, 0)]);

    let grid = build_grid_mesh(
        Some(&elevation),
        &create_ramp_properties(6),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap();

    assert_eq!(grid.mesh.triangle_count(), 11);
    assert!(grid.mesh.positions.iter().all(|v| v.is_finite()));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_property_length_mismatch() {
    let frame = frames::unit_4x3();
    let err = build_grid_mesh(None, &[0.0; 7], &frame, &MeshOptions::default()).unwrap_err();
    match err {
        MeshError::Surface(SurfaceError::PropertyLayout { len, nodes, cells }) => {
            assert_eq!((len, nodes, cells), (7, 12, 6));
        }
        other => panic!("expected layout error, got {:?}", other),
    }
}

#[test]
fn test_elevation_length_mismatch() {
    let frame = frames::unit_3x3();
    let err = build_grid_mesh(
        Some(&[0.0; 8]),
        &create_ramp_properties(9),
        &frame,
        &MeshOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MeshError::ElevationLength { len: 8, nodes: 9 }));
}

#[test]
fn test_overflowing_frame_count_is_rejected() {
    let frame = Frame::new([0.0, 0.0], [1.0, 1.0], [usize::MAX / 2, 3]);
    let err = build_grid_mesh(None, &[1.0; 4], &frame, &MeshOptions::default()).unwrap_err();
    assert!(matches!(err, MeshError::Surface(SurfaceError::InvalidFrame(_))));
}

#[test]
fn test_single_node_grid() {
    let frame = frames::single_node();
    let grid = build_grid_mesh(Some(&[5.0]), &[1.0], &frame, &MeshOptions::default()).unwrap();
    assert!(grid.mesh.is_empty());
    assert_eq!(grid.mesh.stored_vertex_count(), 1);
    assert_eq!(grid.elevation_range.unwrap().to_array(), [5.0, 5.0]);
}
