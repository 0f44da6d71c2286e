//! Resolving data sources into concrete arrays.

use crate::buffer::decode_le;
use crate::error::{LoadError, LoadResult};
use crate::fetch::{BlobFetcher, DefaultFetcher, FetchConfig};
use crate::png::decode_png;
use std::sync::Arc;
use surface_common::{BufferElement, DataSource, FloatSource, IndexSource, SurfaceError};
use tracing::{debug, instrument};

/// Elevation and property arrays of a gridded surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSurface {
    /// Depth samples, sign-normalized so that positive means down.
    /// `None` in property-only (2D) mode.
    pub elevation: Option<Vec<f32>>,
    pub properties: Vec<f32>,
}

/// Vertex and index arrays of a triangulated surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTriangles {
    /// xyz triples in world coordinates (z up).
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

/// Loads surface arrays through a [`BlobFetcher`].
#[derive(Clone)]
pub struct SurfaceLoader {
    fetcher: Arc<dyn BlobFetcher>,
}

impl SurfaceLoader {
    pub fn new(fetcher: Arc<dyn BlobFetcher>) -> Self {
        Self { fetcher }
    }

    /// Loader backed by the HTTP and file fetchers.
    pub fn with_default_fetcher(config: &FetchConfig) -> LoadResult<Self> {
        Ok(Self::new(Arc::new(DefaultFetcher::new(config)?)))
    }

    async fn load_array<T: BufferElement>(&self, source: &DataSource<T>) -> LoadResult<Vec<T>> {
        let url = match source {
            DataSource::Inline(values) => return Ok(values.clone()),
            DataSource::Remote(url) => url,
        };

        let blob = self.fetcher.fetch(url).await?;
        if blob.is_png() {
            let image = decode_png(&blob.bytes).map_err(|source| LoadError::Png {
                url: url.clone(),
                source,
            })?;
            debug!(
                url = %url,
                width = image.width,
                height = image.height,
                "Decoded PNG container"
            );
            decode_le(&image.data, url)
        } else {
            decode_le(&blob.bytes, url)
        }
    }

    /// Resolve a float source.
    pub async fn load_float_array(&self, source: &FloatSource) -> LoadResult<Vec<f32>> {
        self.load_array(source).await
    }

    /// Resolve an index source.
    pub async fn load_index_array(&self, source: &IndexSource) -> LoadResult<Vec<u32>> {
        self.load_array(source).await
    }

    /// Load the mesh and property arrays of a gridded surface.
    ///
    /// Both sources are fetched concurrently. Mesh samples are negated when
    /// `z_increasing_downwards` is false, so the returned elevation is always
    /// a depth. Without a property source the mesh samples, as fetched, are
    /// used as properties.
    #[instrument(skip_all, fields(
        mesh = %mesh.map(|s| s.describe()).unwrap_or_default(),
        properties = %properties.map(|s| s.describe()).unwrap_or_default(),
    ))]
    pub async fn load_mesh_and_properties(
        &self,
        mesh: Option<&FloatSource>,
        properties: Option<&FloatSource>,
        z_increasing_downwards: bool,
    ) -> LoadResult<LoadedSurface> {
        let (mesh_values, property_values) = match (mesh, properties) {
            (None, None) => return Err(SurfaceError::MissingData.into()),
            (Some(mesh), None) => (Some(self.load_float_array(mesh).await?), None),
            (None, Some(properties)) => (None, Some(self.load_float_array(properties).await?)),
            (Some(mesh), Some(properties)) => {
                let (m, p) = futures::try_join!(
                    self.load_float_array(mesh),
                    self.load_float_array(properties)
                )?;
                (Some(m), Some(p))
            }
        };

        let properties = match (property_values, &mesh_values) {
            (Some(p), _) => p,
            (None, Some(m)) => m.clone(),
            (None, None) => Vec::new(),
        };

        let elevation = mesh_values.map(|mut samples| {
            if !z_increasing_downwards {
                samples.iter_mut().for_each(|v| *v = -*v);
            }
            samples
        });

        debug!(
            elevation = elevation.as_ref().map_or(0, Vec::len),
            properties = properties.len(),
            "Loaded surface arrays"
        );

        Ok(LoadedSurface {
            elevation,
            properties,
        })
    }

    /// Load the vertex and index arrays of a triangulated surface.
    ///
    /// Vertex z is negated when `z_increasing_downwards` is true, turning
    /// depths into world heights.
    #[instrument(skip_all, fields(
        points = %points.describe(),
        triangles = %triangles.describe(),
    ))]
    pub async fn load_points_and_triangles(
        &self,
        points: &FloatSource,
        triangles: &IndexSource,
        z_increasing_downwards: bool,
    ) -> LoadResult<LoadedTriangles> {
        let (mut vertices, indices) = futures::try_join!(
            self.load_float_array(points),
            self.load_index_array(triangles)
        )?;

        if z_increasing_downwards {
            vertices
                .iter_mut()
                .skip(2)
                .step_by(3)
                .for_each(|z| *z = -*z);
        }

        debug!(
            vertices = vertices.len() / 3,
            triangles = indices.len() / 3,
            "Loaded triangle arrays"
        );

        Ok(LoadedTriangles { vertices, indices })
    }
}

impl std::fmt::Debug for SurfaceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceLoader").finish_non_exhaustive()
    }
}
