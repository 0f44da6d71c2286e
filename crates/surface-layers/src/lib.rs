//! Layer controllers for surface meshes.
//!
//! A layer owns its props and the geometry of its latest successful build.
//! It decides when a prop change needs a rebuild, hands out a
//! self-contained build (load, then mesh on the worker pool) and applies the
//! result when it comes back, dropping results of superseded requests.
//!
//! ```ignore
//! let mut layer = MapLayer::new(props, context).with_reporter(reporter);
//! layer.initialize_and_wait().await?;
//! if let Some(build) = layer.update(new_props) {
//!     let completed = tokio::spawn(build.run()).await?;
//!     layer.apply(completed)?;
//! }
//! ```

pub mod build;
pub mod context;
pub mod error;
pub mod map;
pub mod props;
pub mod report;
pub mod triangle;

pub use build::{BuildOutcome, BuildTracker, CompletedBuild, Generation, SurfaceGeometry};
pub use context::LayerContext;
pub use error::{LayerError, LayerResult};
pub use map::{MapGeometry, MapLayer, MapRenderParams, PendingMapBuild};
pub use props::{Contours, MapLayerProps, Material, MaterialSpec, TriangleLayerProps};
pub use report::{map_bounding_box, BoundingBoxReporter};
pub use triangle::{PendingTriangleBuild, TriangleGeometry, TriangleLayer, TriangleRenderParams};
