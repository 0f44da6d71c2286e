//! Bounding-box reporting to the host application.

use surface_common::{BoundingBox3D, Frame, ValueRange};

/// Receives a layer's 3D extent after its first successful build.
pub trait BoundingBoxReporter: Send + Sync {
    fn report_bounding_box(&self, layer_id: &str, bbox: BoundingBox3D);
}

impl<F> BoundingBoxReporter for F
where
    F: Fn(&str, BoundingBox3D) + Send + Sync,
{
    fn report_bounding_box(&self, layer_id: &str, bbox: BoundingBox3D) {
        self(layer_id, bbox)
    }
}

/// Extent of a gridded surface.
///
/// x and y cover the four frame corners after rotation. z spans the
/// elevation range turned into heights, or is flat at 0 without elevation.
pub fn map_bounding_box(frame: &Frame, elevation_range: Option<ValueRange>) -> BoundingBox3D {
    let (min_x, min_y, max_x, max_y) = frame.xy_bounds();
    let (min_z, max_z) = match elevation_range {
        Some(range) => (-(range.max as f64), -(range.min as f64)),
        None => (0.0, 0.0),
    };
    BoundingBox3D::new(min_x, min_y, min_z, max_x, max_y, max_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_map_bounding_box_unrotated() {
        let frame = Frame::new([10.0, 20.0], [2.0, 5.0], [4, 3]);
        let bbox = map_bounding_box(&frame, Some(ValueRange::new(1000.0, 1200.0)));
        assert_eq!(bbox.to_array(), [10.0, 20.0, -1200.0, 16.0, 30.0, -1000.0]);
    }

    #[test]
    fn test_map_bounding_box_without_elevation() {
        let frame = Frame::new([0.0, 0.0], [1.0, 1.0], [2, 2]);
        let bbox = map_bounding_box(&frame, None);
        assert_eq!((bbox.min_z, bbox.max_z), (0.0, 0.0));
    }

    #[test]
    fn test_map_bounding_box_rotated_quarter_turn() {
        let frame = Frame::new([0.0, 0.0], [1.0, 1.0], [3, 2]).with_rotation(90.0, None);
        let bbox = map_bounding_box(&frame, None);
        // (2, 1) rotates to (-1, 2).
        assert!((bbox.min_x + 1.0).abs() < 1e-9);
        assert!(bbox.max_x.abs() < 1e-9);
        assert!(bbox.min_y.abs() < 1e-9);
        assert!((bbox.max_y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = |id: &str, bbox: BoundingBox3D| {
            seen.lock().unwrap().push((id.to_string(), bbox));
        };
        reporter.report_bounding_box("a", BoundingBox3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
