//! Common types shared by the surface mesh crates.
//!
//! The data model follows the flow of a surface build: a [`Frame`] describes
//! the horizontal grid, [`DataSource`]s name where elevation and property
//! samples come from, and the builders report [`ValueRange`]s and a
//! [`BoundingBox3D`] back to the caller.

pub mod bbox;
pub mod config;
pub mod error;
pub mod frame;
pub mod range;
pub mod source;

pub use bbox::BoundingBox3D;
pub use config::{find_config, ConfigDocument, ConfigPath};
pub use error::{SurfaceError, SurfaceResult};
pub use frame::{Frame, PropertyLayout};
pub use range::ValueRange;
pub use source::{same_optional_source, BufferElement, DataSource, FloatSource, IndexSource};
