//! Controller for gridded surfaces.

use crate::build::{
    flatten, BuildOutcome, CompletedBuild, Generation, LayerState, SurfaceGeometry,
};
use crate::context::LayerContext;
use crate::error::LayerResult;
use crate::props::{Contours, MapLayerProps, Material};
use crate::report::{map_bounding_box, BoundingBoxReporter};
use mesh_builder::{build_grid_mesh, LineGeometry, MeshGeometry, MeshOptions};
use nalgebra::Matrix4;
use std::sync::Arc;
use surface_common::{BoundingBox3D, FloatSource, Frame, PropertyLayout, ValueRange};
use tracing::{debug, instrument};

/// Geometry of a gridded surface ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapGeometry {
    pub mesh: MeshGeometry,
    pub lines: LineGeometry,
    /// Range of the loaded depth samples.
    pub elevation_range: Option<ValueRange>,
    pub property_range: Option<ValueRange>,
    pub layout: PropertyLayout,
    pub bounding_box: BoundingBox3D,
}

impl SurfaceGeometry for MapGeometry {
    fn mesh(&self) -> &MeshGeometry {
        &self.mesh
    }

    fn bounding_box(&self) -> Option<BoundingBox3D> {
        Some(self.bounding_box)
    }
}

/// A build requested by a [`MapLayer`], not yet run.
///
/// Owns everything it needs, so it can be moved onto a task with
/// `tokio::spawn` and its completion handed back through
/// [`MapLayer::apply`] in any order.
#[derive(Debug)]
pub struct PendingMapBuild {
    generation: Generation,
    layer_id: String,
    mesh: Option<FloatSource>,
    properties: Option<FloatSource>,
    frame: Frame,
    z_increasing_downwards: bool,
    options: MeshOptions,
    context: LayerContext,
}

impl PendingMapBuild {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Load the arrays and build the mesh on the worker pool.
    #[instrument(skip(self), fields(layer = %self.layer_id, generation = self.generation))]
    pub async fn run(self) -> CompletedBuild<MapGeometry> {
        let result = self.execute().await;
        CompletedBuild {
            generation: self.generation,
            result,
        }
    }

    async fn execute(&self) -> LayerResult<MapGeometry> {
        let loaded = self
            .context
            .loader
            .load_mesh_and_properties(
                self.mesh.as_ref(),
                self.properties.as_ref(),
                self.z_increasing_downwards,
            )
            .await?;

        let frame = self.frame.clone();
        let options = self.options;
        let handle = self.context.pool.submit(move || {
            let grid = build_grid_mesh(
                loaded.elevation.as_deref(),
                &loaded.properties,
                &frame,
                &options,
            )?;
            let bounding_box = map_bounding_box(&frame, grid.elevation_range);
            Ok::<_, mesh_builder::MeshError>(MapGeometry {
                mesh: grid.mesh,
                lines: grid.lines,
                elevation_range: grid.elevation_range,
                property_range: grid.property_range,
                layout: grid.layout,
                bounding_box,
            })
        })?;

        flatten(handle.await)
    }
}

/// Everything the renderer needs to draw a gridded surface.
#[derive(Debug, Clone)]
pub struct MapRenderParams<'a> {
    pub mesh: &'a MeshGeometry,
    pub lines: &'a LineGeometry,
    /// Frame rotation, followed by the host's model matrix if given.
    pub model_matrix: Matrix4<f64>,
    pub contours: Contours,
    pub is_contours_depth: bool,
    pub grid_lines: bool,
    pub color_map_name: Option<&'a str>,
    pub color_map_range: Option<[f32; 2]>,
    pub property_value_range: Option<ValueRange>,
    pub material: &'a Material,
    pub smooth_shading: bool,
    pub depth_test: bool,
    pub z_increasing_downwards: bool,
}

/// Decides when a gridded surface is rebuilt and holds its geometry.
pub struct MapLayer {
    props: MapLayerProps,
    context: LayerContext,
    reporter: Option<Arc<dyn BoundingBoxReporter>>,
    state: LayerState<MapGeometry>,
}

impl MapLayer {
    pub fn new(props: MapLayerProps, context: LayerContext) -> Self {
        Self {
            props,
            context,
            reporter: None,
            state: LayerState::new(),
        }
    }

    /// Send the bounding box of the first build to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn BoundingBoxReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn props(&self) -> &MapLayerProps {
        &self.props
    }

    /// First build after mounting. Its bounding box is reported.
    pub fn initialize(&mut self) -> PendingMapBuild {
        self.request_build(true)
    }

    /// Replace the props. Returns a build only if the geometry is affected.
    pub fn update(&mut self, props: MapLayerProps) -> Option<PendingMapBuild> {
        let reload = props.needs_reload(&self.props);
        self.props = props;
        if reload {
            Some(self.request_build(false))
        } else {
            debug!(layer = %self.props.id, "Props changed without affecting geometry");
            None
        }
    }

    /// Start a build of the current props, superseding any in flight.
    pub fn request_build(&mut self, report_bounding_box: bool) -> PendingMapBuild {
        let generation = self.state.tracker.begin(report_bounding_box);
        debug!(
            layer = %self.props.id,
            generation = generation,
            report_bounding_box = report_bounding_box,
            "Requesting surface build"
        );
        PendingMapBuild {
            generation,
            layer_id: self.props.id.clone(),
            mesh: self.props.mesh_source(),
            properties: self.props.properties_source(),
            frame: self.props.frame.clone(),
            z_increasing_downwards: self.props.z_increasing_downwards,
            options: MeshOptions::smooth(self.props.smooth_shading).with_normals(self.props.debug),
            context: self.context.clone(),
        }
    }

    /// Store a finished build unless a newer one has been requested since.
    ///
    /// On failure the previous geometry is kept and the error returned.
    pub fn apply(&mut self, completed: CompletedBuild<MapGeometry>) -> LayerResult<BuildOutcome> {
        self.state
            .apply(&self.props.id, self.reporter.as_deref(), completed)
    }

    /// [`initialize`](Self::initialize), run and apply in one go.
    pub async fn initialize_and_wait(&mut self) -> LayerResult<BuildOutcome> {
        let completed = self.initialize().run().await;
        self.apply(completed)
    }

    /// [`update`](Self::update), then run and apply the build if one was needed.
    pub async fn update_and_wait(
        &mut self,
        props: MapLayerProps,
    ) -> LayerResult<Option<BuildOutcome>> {
        match self.update(props) {
            Some(pending) => {
                let completed = pending.run().await;
                self.apply(completed).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Latest requested generation.
    pub fn generation(&self) -> Generation {
        self.state.tracker.latest()
    }

    pub fn geometry(&self) -> Option<&MapGeometry> {
        self.state.geometry.as_ref()
    }

    /// Message of the last failed build, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    /// Called by the renderer once it has (re)loaded the geometry.
    pub fn set_sublayers_loaded(&mut self, loaded: bool) {
        self.state.sublayers_loaded = loaded;
    }

    /// True once the latest build has settled, geometry exists and the
    /// renderer reports it loaded.
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Model matrix for the current frame.
    pub fn model_matrix(&self) -> Matrix4<f64> {
        let rotation = self.props.frame.model_matrix();
        match &self.props.model_matrix {
            Some(extra) => rotation * Matrix4::from_column_slice(extra),
            None => rotation,
        }
    }

    /// Render inputs, or `None` before the first successful build.
    pub fn render_params(&self) -> Option<MapRenderParams<'_>> {
        let geometry = self.state.geometry.as_ref()?;
        Some(MapRenderParams {
            mesh: &geometry.mesh,
            lines: &geometry.lines,
            model_matrix: self.model_matrix(),
            contours: self.props.contours,
            is_contours_depth: self.props.has_mesh() && self.props.is_contours_depth,
            grid_lines: self.props.grid_lines,
            color_map_name: self.props.color_map_name.as_deref(),
            color_map_range: self.props.color_map_range,
            property_value_range: geometry.property_range,
            material: &self.props.material,
            smooth_shading: self.props.smooth_shading,
            depth_test: self.props.depth_test,
            z_increasing_downwards: self.props.z_increasing_downwards,
        })
    }
}

impl std::fmt::Debug for MapLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapLayer")
            .field("id", &self.props.id)
            .field("generation", &self.generation())
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
