//! terramask keeps named geographic projects and derives rasters from satellite imagery.
//!
//! Each project is a name anchored to a latitude/longitude. Creating (or refreshing) a project
//! fetches one satellite image for that location and derives two artifacts from it:
//!
//! 1. **Heatmap**: BT.601 grayscale mapped through a jet color ramp.
//! 2. **Mask**: grayscale binarized at a threshold (`gray > t` is light).
//!
//! All three rasters are stored as PNG under `<root>/projects/<name>/`, and a JSON registry at
//! `<root>/projects.json` maps names to coordinates.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Derived artifacts are caches**: heatmap and mask are always recomputable from the source.
//! - **Registry last**: a workflow only registers a project once every artifact is on disk.
//! - **Whole-file replacement**: artifacts and the registry are replaced by rename, never
//!   rewritten in place.
//!
//! Entry point: [`Pipeline`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod pipeline;
mod raster;
mod registry;
mod source;
mod store;

pub use foundation::core::{ArtifactKind, Coord, ProjectName, Threshold};
pub use foundation::error::{ErrorKind, TerraError, TerraResult};
pub use pipeline::audit::AuditReport;
pub use pipeline::orchestrator::{
    ArtifactQuery, CreateRequest, Layout, MAX_ZOOM, Pipeline,
};
pub use raster::decode::{GrayRaster, Raster, decode, encode_png};
pub use raster::transform::{
    MASK_DARK, MASK_LIGHT, heatmap, light_pixel_count, mask, to_grayscale,
};
pub use registry::projects::{ProjectMap, ProjectRegistry};
pub use source::mapbox::{MapboxStaticSource, SourceConfig};
pub use source::{FetchRequest, ImageSource};
pub use store::artifacts::RasterStore;
