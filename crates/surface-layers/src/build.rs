//! Generation bookkeeping for asynchronous rebuilds.
//!
//! Builds are never cancelled. Each request gets a generation number and
//! only a completion carrying the latest one is applied; anything older is
//! dropped when it arrives.

use crate::error::{LayerError, LayerResult};
use crate::report::BoundingBoxReporter;
use mesh_builder::MeshGeometry;
use surface_common::BoundingBox3D;
use tracing::{debug, error, info};

/// Identifies one build request of a layer.
pub type Generation = u64;

/// What happened to a completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The geometry was stored. `reported` is set if the bounding box went
    /// to the host.
    Applied { generation: Generation, reported: bool },
    /// A newer request exists; the result was dropped.
    Discarded { generation: Generation, latest: Generation },
}

impl BuildOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BuildOutcome::Applied { .. })
    }
}

/// Result of running a build, tagged with its generation.
#[derive(Debug)]
pub struct CompletedBuild<G> {
    pub generation: Generation,
    pub result: LayerResult<G>,
}

/// Geometry a layer holds for rendering.
pub trait SurfaceGeometry {
    fn mesh(&self) -> &MeshGeometry;

    /// Extent reported to the host, if any.
    fn bounding_box(&self) -> Option<BoundingBox3D>;
}

/// Tracks requested generations and a pending bounding-box report.
#[derive(Debug, Clone, Default)]
pub struct BuildTracker {
    latest: Generation,
    report_pending: bool,
    finished: bool,
}

impl BuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new build, superseding any in flight.
    ///
    /// A requested bounding-box report stays pending until some build
    /// applies successfully, even if the requesting build is superseded.
    pub fn begin(&mut self, report_bounding_box: bool) -> Generation {
        self.latest += 1;
        self.report_pending |= report_bounding_box;
        self.finished = false;
        self.latest
    }

    pub fn latest(&self) -> Generation {
        self.latest
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.latest
    }

    /// Mark the latest build settled. Returns whether a report is due.
    pub fn finish(&mut self, succeeded: bool) -> bool {
        self.finished = true;
        if succeeded {
            std::mem::take(&mut self.report_pending)
        } else {
            false
        }
    }

    /// True once the latest requested build has settled.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn report_pending(&self) -> bool {
        self.report_pending
    }
}

/// Controller state common to every layer kind.
#[derive(Debug)]
pub(crate) struct LayerState<G> {
    pub(crate) tracker: BuildTracker,
    pub(crate) geometry: Option<G>,
    pub(crate) last_error: Option<String>,
    pub(crate) sublayers_loaded: bool,
}

impl<G: SurfaceGeometry> LayerState<G> {
    pub(crate) fn new() -> Self {
        Self {
            tracker: BuildTracker::new(),
            geometry: None,
            last_error: None,
            sublayers_loaded: true,
        }
    }

    /// Store a completed build if it is the latest one.
    ///
    /// A failed build leaves the previous geometry in place.
    pub(crate) fn apply(
        &mut self,
        layer_id: &str,
        reporter: Option<&dyn BoundingBoxReporter>,
        completed: CompletedBuild<G>,
    ) -> LayerResult<BuildOutcome> {
        let generation = completed.generation;
        let latest = self.tracker.latest();
        if !self.tracker.is_current(generation) {
            debug!(
                layer = layer_id,
                generation = generation,
                latest = latest,
                "Discarding stale build"
            );
            return Ok(BuildOutcome::Discarded { generation, latest });
        }

        let geometry = match completed.result {
            Ok(geometry) => geometry,
            Err(e) => {
                self.tracker.finish(false);
                error!(
                    layer = layer_id,
                    generation = generation,
                    error = %e,
                    "Surface build failed"
                );
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let report_due = self.tracker.finish(true);
        info!(
            layer = layer_id,
            generation = generation,
            vertices = geometry.mesh().vertex_count(),
            triangles = geometry.mesh().triangle_count(),
            "Surface build complete"
        );

        let reported = match (reporter, report_due, geometry.bounding_box()) {
            (Some(reporter), true, Some(bbox)) => {
                debug!(layer = layer_id, bbox = ?bbox.to_array(), "Reporting bounding box");
                reporter.report_bounding_box(layer_id, bbox);
                true
            }
            _ => false,
        };

        self.geometry = Some(geometry);
        self.last_error = None;
        Ok(BuildOutcome::Applied {
            generation,
            reported,
        })
    }

    /// Built, applied, and the renderer has finished loading it.
    pub(crate) fn is_loaded(&self) -> bool {
        self.tracker.is_finished() && self.geometry.is_some() && self.sublayers_loaded
    }
}

/// Flatten a worker result into a layer result.
pub(crate) fn flatten<T, E>(result: Result<Result<T, E>, mesh_pool::PoolError>) -> LayerResult<T>
where
    LayerError: From<E>,
{
    Ok(result??)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_builder::MeshError;
    use std::sync::Mutex;

    struct Fake {
        mesh: MeshGeometry,
        bbox: Option<BoundingBox3D>,
    }

    impl SurfaceGeometry for Fake {
        fn mesh(&self) -> &MeshGeometry {
            &self.mesh
        }

        fn bounding_box(&self) -> Option<BoundingBox3D> {
            self.bbox
        }
    }

    fn fake() -> Fake {
        Fake {
            mesh: MeshGeometry::default(),
            bbox: Some(BoundingBox3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0)),
        }
    }

    #[test]
    fn test_generations_increase() {
        let mut tracker = BuildTracker::new();
        let first = tracker.begin(true);
        let second = tracker.begin(false);
        assert!(second > first);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn test_report_survives_superseding_request() {
        let mut tracker = BuildTracker::new();
        tracker.begin(true);
        tracker.begin(false);
        assert!(tracker.report_pending());
        assert!(tracker.finish(true));
        assert!(!tracker.report_pending());

        tracker.begin(false);
        assert!(!tracker.finish(true));
    }

    #[test]
    fn test_failed_build_keeps_report_pending() {
        let mut tracker = BuildTracker::new();
        tracker.begin(true);
        assert!(!tracker.finish(false));
        assert!(tracker.is_finished());
        assert!(tracker.report_pending());
    }

    #[test]
    fn test_state_applies_latest_only() {
        let reports = Mutex::new(0);
        let reporter = |_: &str, _: BoundingBox3D| *reports.lock().unwrap() += 1;

        let mut state = LayerState::new();
        let old = state.tracker.begin(true);
        let new = state.tracker.begin(false);

        let outcome = state
            .apply("l", Some(&reporter), CompletedBuild { generation: old, result: Ok(fake()) })
            .unwrap();
        assert_eq!(outcome, BuildOutcome::Discarded { generation: old, latest: new });
        assert!(!state.is_loaded());

        let outcome = state
            .apply("l", Some(&reporter), CompletedBuild { generation: new, result: Ok(fake()) })
            .unwrap();
        assert_eq!(outcome, BuildOutcome::Applied { generation: new, reported: true });
        assert!(state.is_loaded());
        assert_eq!(*reports.lock().unwrap(), 1);
    }

    #[test]
    fn test_state_failure_keeps_geometry() {
        let mut state = LayerState::new();
        let first = state.tracker.begin(false);
        state
            .apply("l", None, CompletedBuild { generation: first, result: Ok(fake()) })
            .unwrap();

        let second = state.tracker.begin(false);
        let failed: CompletedBuild<Fake> = CompletedBuild {
            generation: second,
            result: Err(MeshError::VertexLength(4).into()),
        };
        assert!(state.apply("l", None, failed).is_err());
        assert!(state.geometry.is_some());
        assert!(state.last_error.is_some());
        assert!(state.is_loaded());
    }
}
