//! Controller for triangulated (TIN) surfaces.

use crate::build::{
    flatten, BuildOutcome, CompletedBuild, Generation, LayerState, SurfaceGeometry,
};
use crate::context::LayerContext;
use crate::error::LayerResult;
use crate::props::{Contours, Material, TriangleLayerProps};
use crate::report::BoundingBoxReporter;
use mesh_builder::{build_triangle_mesh, LineGeometry, MeshError, MeshGeometry, MeshOptions};
use std::sync::Arc;
use surface_common::{BoundingBox3D, FloatSource, IndexSource, ValueRange};
use tracing::{debug, instrument};

/// Geometry of a triangulated surface ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleGeometry {
    pub mesh: MeshGeometry,
    pub lines: LineGeometry,
    pub bounding_box: Option<BoundingBox3D>,
    pub z_range: Option<ValueRange>,
}

impl SurfaceGeometry for TriangleGeometry {
    fn mesh(&self) -> &MeshGeometry {
        &self.mesh
    }

    fn bounding_box(&self) -> Option<BoundingBox3D> {
        self.bounding_box
    }
}

/// A build requested by a [`TriangleLayer`], not yet run.
#[derive(Debug)]
pub struct PendingTriangleBuild {
    generation: Generation,
    layer_id: String,
    points: FloatSource,
    triangles: IndexSource,
    z_increasing_downwards: bool,
    options: MeshOptions,
    context: LayerContext,
}

impl PendingTriangleBuild {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Load the arrays and build the mesh on the worker pool.
    #[instrument(skip(self), fields(layer = %self.layer_id, generation = self.generation))]
    pub async fn run(self) -> CompletedBuild<TriangleGeometry> {
        let result = self.execute().await;
        CompletedBuild {
            generation: self.generation,
            result,
        }
    }

    async fn execute(&self) -> LayerResult<TriangleGeometry> {
        let loaded = self
            .context
            .loader
            .load_points_and_triangles(&self.points, &self.triangles, self.z_increasing_downwards)
            .await?;

        let options = self.options;
        let handle = self.context.pool.submit(move || {
            let tin = build_triangle_mesh(&loaded.vertices, &loaded.indices, &options)?;
            Ok::<_, MeshError>(TriangleGeometry {
                mesh: tin.mesh,
                lines: tin.lines,
                bounding_box: tin.bounding_box,
                z_range: tin.z_range,
            })
        })?;

        flatten(handle.await)
    }
}

/// Everything the renderer needs to draw a triangulated surface.
#[derive(Debug, Clone)]
pub struct TriangleRenderParams<'a> {
    pub mesh: &'a MeshGeometry,
    pub lines: &'a LineGeometry,
    pub contours: Contours,
    pub grid_lines: bool,
    pub color: [u8; 3],
    pub material: &'a Material,
    pub smooth_shading: bool,
    pub depth_test: bool,
    pub z_increasing_downwards: bool,
}

/// Decides when a triangulated surface is rebuilt and holds its geometry.
pub struct TriangleLayer {
    props: TriangleLayerProps,
    context: LayerContext,
    reporter: Option<Arc<dyn BoundingBoxReporter>>,
    state: LayerState<TriangleGeometry>,
}

impl TriangleLayer {
    pub fn new(props: TriangleLayerProps, context: LayerContext) -> Self {
        Self {
            props,
            context,
            reporter: None,
            state: LayerState::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn BoundingBoxReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn props(&self) -> &TriangleLayerProps {
        &self.props
    }

    pub fn initialize(&mut self) -> PendingTriangleBuild {
        self.request_build(true)
    }

    pub fn update(&mut self, props: TriangleLayerProps) -> Option<PendingTriangleBuild> {
        let reload = props.needs_reload(&self.props);
        self.props = props;
        reload.then(|| self.request_build(false))
    }

    pub fn request_build(&mut self, report_bounding_box: bool) -> PendingTriangleBuild {
        let generation = self.state.tracker.begin(report_bounding_box);
        debug!(
            layer = %self.props.id,
            generation = generation,
            "Requesting triangle build"
        );
        PendingTriangleBuild {
            generation,
            layer_id: self.props.id.clone(),
            points: self.props.points_data.clone(),
            triangles: self.props.triangle_data.clone(),
            z_increasing_downwards: self.props.z_increasing_downwards,
            options: MeshOptions::smooth(self.props.smooth_shading).with_normals(self.props.debug),
            context: self.context.clone(),
        }
    }

    pub fn apply(
        &mut self,
        completed: CompletedBuild<TriangleGeometry>,
    ) -> LayerResult<BuildOutcome> {
        self.state
            .apply(&self.props.id, self.reporter.as_deref(), completed)
    }

    pub async fn initialize_and_wait(&mut self) -> LayerResult<BuildOutcome> {
        let completed = self.initialize().run().await;
        self.apply(completed)
    }

    pub async fn update_and_wait(
        &mut self,
        props: TriangleLayerProps,
    ) -> LayerResult<Option<BuildOutcome>> {
        match self.update(props) {
            Some(pending) => {
                let completed = pending.run().await;
                self.apply(completed).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn generation(&self) -> Generation {
        self.state.tracker.latest()
    }

    pub fn geometry(&self) -> Option<&TriangleGeometry> {
        self.state.geometry.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    pub fn set_sublayers_loaded(&mut self, loaded: bool) {
        self.state.sublayers_loaded = loaded;
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn render_params(&self) -> Option<TriangleRenderParams<'_>> {
        let geometry = self.state.geometry.as_ref()?;
        Some(TriangleRenderParams {
            mesh: &geometry.mesh,
            lines: &geometry.lines,
            contours: self.props.contours,
            grid_lines: self.props.grid_lines,
            color: self.props.color,
            material: &self.props.material,
            smooth_shading: self.props.smooth_shading,
            depth_test: self.props.depth_test,
            z_increasing_downwards: self.props.z_increasing_downwards,
        })
    }
}

impl std::fmt::Debug for TriangleLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleLayer")
            .field("id", &self.props.id)
            .field("generation", &self.generation())
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
