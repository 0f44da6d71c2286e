//! Layer properties as supplied by the host application.
//!
//! Field names follow the host's JSON (`meshData`, `ZIncreasingDownwards`,
//! ...) so a props object can be deserialized directly.

use serde::{Deserialize, Serialize};
use surface_common::{same_optional_source, FloatSource, Frame, IndexSource};
use tracing::warn;

/// Lighting parameters for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSpec {
    pub ambient: f32,
    pub diffuse: f32,
    pub shininess: f32,
    pub specular_color: [u8; 3],
}

/// Either a lighting switch or full lighting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Material {
    Enabled(bool),
    Custom(MaterialSpec),
}

impl Default for Material {
    fn default() -> Self {
        Material::Enabled(true)
    }
}

impl Material {
    /// True unless lighting is switched off.
    pub fn is_lit(&self) -> bool {
        !matches!(self, Material::Enabled(false))
    }
}

/// Contour lines as `[reference, interval]`.
///
/// A negative interval or reference of `-1` disables them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Contours {
    pub reference: f32,
    pub interval: f32,
}

impl Contours {
    pub const DISABLED: Contours = Contours {
        reference: -1.0,
        interval: -1.0,
    };

    pub fn new(reference: f32, interval: f32) -> Self {
        Self {
            reference,
            interval,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0.0 && self.reference != -1.0
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.reference, self.interval]
    }
}

impl Default for Contours {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl From<[f32; 2]> for Contours {
    fn from([reference, interval]: [f32; 2]) -> Self {
        Self::new(reference, interval)
    }
}

impl From<Contours> for [f32; 2] {
    fn from(contours: Contours) -> Self {
        contours.to_array()
    }
}

fn default_true() -> bool {
    true
}

/// Properties of a gridded surface layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayerProps {
    pub id: String,

    /// Elevation samples (depths unless `z_increasing_downwards` is false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_data: Option<FloatSource>,

    /// Deprecated spelling of `mesh_data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_url: Option<String>,

    pub frame: Frame,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_data: Option<FloatSource>,

    /// Deprecated spelling of `properties_data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_url: Option<String>,

    #[serde(default)]
    pub contours: Contours,

    /// Contours follow depth rather than the property.
    #[serde(default = "default_true")]
    pub is_contours_depth: bool,

    #[serde(default)]
    pub grid_lines: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_map_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_map_range: Option<[f32; 2]>,

    #[serde(default)]
    pub material: Material,

    #[serde(default = "default_true")]
    pub smooth_shading: bool,

    #[serde(default = "default_true")]
    pub depth_test: bool,

    #[serde(rename = "ZIncreasingDownwards", default = "default_true")]
    pub z_increasing_downwards: bool,

    /// Draw vertex normals in the wireframe.
    #[serde(default)]
    pub debug: bool,

    /// Extra transform applied after the frame rotation (column-major).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_matrix: Option<[f64; 16]>,
}

impl MapLayerProps {
    pub fn new(frame: Frame) -> Self {
        Self {
            id: "map3d-layer-float32".to_string(),
            mesh_data: None,
            mesh_url: None,
            frame,
            properties_data: None,
            properties_url: None,
            contours: Contours::default(),
            is_contours_depth: true,
            grid_lines: false,
            color_map_name: None,
            color_map_range: None,
            material: Material::default(),
            smooth_shading: true,
            depth_test: true,
            z_increasing_downwards: true,
            debug: false,
            model_matrix: None,
        }
    }

    pub fn with_mesh(mut self, mesh: impl Into<FloatSource>) -> Self {
        self.mesh_data = Some(mesh.into());
        self
    }

    pub fn with_properties(mut self, properties: impl Into<FloatSource>) -> Self {
        self.properties_data = Some(properties.into());
        self
    }

    /// The elevation source, honoring the deprecated `meshUrl`.
    pub fn mesh_source(&self) -> Option<FloatSource> {
        if self.mesh_url.is_some() {
            warn!(layer = %self.id, "\"meshUrl\" is deprecated. Use \"meshData\"");
        }
        self.mesh_data
            .clone()
            .or_else(|| self.mesh_url.as_deref().map(FloatSource::url))
    }

    /// The property source, honoring the deprecated `propertiesUrl`.
    pub fn properties_source(&self) -> Option<FloatSource> {
        if self.properties_url.is_some() {
            warn!(layer = %self.id, "\"propertiesUrl\" is deprecated. Use \"propertiesData\"");
        }
        self.properties_data
            .clone()
            .or_else(|| self.properties_url.as_deref().map(FloatSource::url))
    }

    /// True when an elevation source is configured.
    pub fn has_mesh(&self) -> bool {
        let non_empty = |s: &FloatSource| s.as_url().map_or(true, |url| !url.is_empty());
        self.mesh_data.as_ref().is_some_and(non_empty)
            || self.mesh_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// True if switching from `old` to `self` changes the geometry.
    ///
    /// Styling props (color map, contours, material) never trigger a rebuild.
    pub fn needs_reload(&self, old: &MapLayerProps) -> bool {
        self.mesh_url != old.mesh_url
            || self.properties_url != old.properties_url
            || !same_optional_source(self.mesh_data.as_ref(), old.mesh_data.as_ref())
            || !same_optional_source(self.properties_data.as_ref(), old.properties_data.as_ref())
            || self.frame != old.frame
            || self.z_increasing_downwards != old.z_increasing_downwards
            || self.grid_lines != old.grid_lines
            || self.smooth_shading != old.smooth_shading
            || self.debug != old.debug
    }
}

/// Properties of a triangulated surface layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleLayerProps {
    pub id: String,

    /// Vertex positions as xyz triples.
    pub points_data: FloatSource,

    /// Triangle vertex indices, three per triangle.
    pub triangle_data: IndexSource,

    #[serde(default = "default_color")]
    pub color: [u8; 3],

    #[serde(default)]
    pub contours: Contours,

    #[serde(default)]
    pub grid_lines: bool,

    #[serde(default)]
    pub material: Material,

    #[serde(default = "default_true")]
    pub smooth_shading: bool,

    #[serde(default = "default_true")]
    pub depth_test: bool,

    #[serde(rename = "ZIncreasingDownwards", default = "default_true")]
    pub z_increasing_downwards: bool,

    #[serde(default)]
    pub debug: bool,
}

fn default_color() -> [u8; 3] {
    [100, 100, 255]
}

impl TriangleLayerProps {
    pub fn new(points: impl Into<FloatSource>, triangles: impl Into<IndexSource>) -> Self {
        Self {
            id: "triangle-layer".to_string(),
            points_data: points.into(),
            triangle_data: triangles.into(),
            color: default_color(),
            contours: Contours::default(),
            grid_lines: false,
            material: Material::default(),
            smooth_shading: true,
            depth_test: true,
            z_increasing_downwards: true,
            debug: false,
        }
    }

    /// True if switching from `old` to `self` changes the geometry.
    pub fn needs_reload(&self, old: &TriangleLayerProps) -> bool {
        self.debug != old.debug
            || !self.points_data.same_source(&old.points_data)
            || !self.triangle_data.same_source(&old.triangle_data)
            || self.z_increasing_downwards != old.z_increasing_downwards
            || self.smooth_shading != old.smooth_shading
    }
}
