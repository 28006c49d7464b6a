use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::foundation::core::{ArtifactKind, Coord, ProjectName, Threshold};
use crate::foundation::error::{TerraError, TerraResult};
use crate::pipeline::audit::AuditReport;
use crate::raster::decode::{decode, encode_png};
use crate::raster::transform::{heatmap, mask};
use crate::registry::projects::{ProjectMap, ProjectRegistry};
use crate::source::{FetchRequest, ImageSource};
use crate::store::artifacts::RasterStore;

/// Highest zoom level accepted by web-map imagery providers.
pub const MAX_ZOOM: u8 = 22;

/// Where projects and the registry live on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Directory holding one subdirectory per project.
    pub projects_dir: PathBuf,
    /// JSON registry file.
    pub registry_path: PathBuf,
}

impl Layout {
    /// Standard layout under `root`: `root/projects/` and `root/projects.json`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            projects_dir: root.join("projects"),
            registry_path: root.join("projects.json"),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::under(".")
    }
}

/// Arguments of [`Pipeline::create_or_refresh`], as received from the request surface.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateRequest {
    /// Project name; validated as a path segment.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Web-map zoom level, `0..=22`.
    pub zoom: u8,
    /// Image width in pixels, `> 0`.
    pub width: u32,
    /// Image height in pixels, `> 0`.
    pub height: u32,
    /// Level baked into the stored mask.
    pub threshold: Threshold,
}

/// Which bytes [`Pipeline::read_artifact`] returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactQuery {
    /// The fetched image, verbatim.
    Source,
    /// The stored heatmap.
    Heatmap,
    /// The stored mask, at the threshold used when the project was created or refreshed.
    StoredMask,
    /// A mask recomputed in memory from the stored source. Nothing is written.
    MaskAt(Threshold),
}

impl ArtifactQuery {
    /// Map a request-surface `(kind, threshold?)` pair. The threshold only matters for masks.
    pub fn from_request(kind: ArtifactKind, threshold: Option<Threshold>) -> Self {
        match (kind, threshold) {
            (ArtifactKind::Source, _) => Self::Source,
            (ArtifactKind::Heatmap, _) => Self::Heatmap,
            (ArtifactKind::Mask, None) => Self::StoredMask,
            (ArtifactKind::Mask, Some(t)) => Self::MaskAt(t),
        }
    }
}

/// Project workflows over a raster store, a registry and an upstream image source.
///
/// Mutating workflows (create/refresh, rename, delete) serialise on one write lock. Create/refresh
/// fetches before taking it, so a slow upstream never holds up other writers. Reads take no lock:
/// artifacts and the registry are replaced by rename, so readers see whole files only.
pub struct Pipeline<S> {
    store: RasterStore,
    registry: ProjectRegistry,
    source: S,
    writer: Mutex<()>,
}

impl<S: ImageSource> Pipeline<S> {
    /// Build a pipeline over `layout`, fetching imagery from `source`.
    pub fn new(layout: Layout, source: S) -> Self {
        Self {
            store: RasterStore::new(layout.projects_dir),
            registry: ProjectRegistry::new(layout.registry_path),
            source,
            writer: Mutex::new(()),
        }
    }

    /// Underlying artifact store.
    pub fn store(&self) -> &RasterStore {
        &self.store
    }

    /// Underlying project registry.
    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    /// Fetch imagery for a project, derive heatmap and mask, persist all three and register the
    /// project. Re-running with an existing name overwrites everything.
    ///
    /// The registry is written last. Any failure before that leaves it untouched. If the fetched
    /// bytes do not decode, `image.png` has already been replaced while `heatmap.png`, `mask.png`
    /// and the registry keep their previous state.
    #[tracing::instrument(skip_all, fields(project = %req.name))]
    pub fn create_or_refresh(&self, req: &CreateRequest) -> TerraResult<()> {
        let name = ProjectName::parse(&req.name)?;
        let coord = Coord::new(req.lat, req.lon)?;
        if req.width == 0 || req.height == 0 {
            return Err(TerraError::invalid_input(format!(
                "image size {}x{} must be positive",
                req.width, req.height
            )));
        }
        if req.zoom > MAX_ZOOM {
            return Err(TerraError::invalid_input(format!(
                "zoom {} must be within [0, {MAX_ZOOM}]",
                req.zoom
            )));
        }

        let bytes = self.source.fetch(&FetchRequest {
            coord,
            zoom: req.zoom,
            width: req.width,
            height: req.height,
        })?;

        let _guard = self.lock_writer();
        self.store.ensure_directory(&name)?;
        self.store.write(&name, ArtifactKind::Source, &bytes)?;

        let decoded = decode(&bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "fetched image did not decode; derived artifacts left stale");
        })?;
        let heatmap_png = encode_png(&heatmap(&decoded))?;
        let mask_png = encode_png(&mask(&decoded, req.threshold))?;
        self.store.write(&name, ArtifactKind::Heatmap, &heatmap_png)?;
        self.store.write(&name, ArtifactKind::Mask, &mask_png)?;

        self.registry.upsert(&name, coord)?;

        tracing::info!(
            width = decoded.width,
            height = decoded.height,
            threshold = req.threshold.get(),
            "project refreshed"
        );
        Ok(())
    }

    /// All registered projects.
    pub fn list_projects(&self) -> TerraResult<ProjectMap> {
        self.registry.load()
    }

    /// Coordinate of one registered project.
    pub fn project(&self, name: &str) -> TerraResult<Coord> {
        let name = ProjectName::parse(name)?;
        self.registry
            .get(&name)?
            .ok_or_else(|| TerraError::not_found(format!("project '{name}'")))
    }

    /// Bytes of one artifact, or of a mask regenerated at a new threshold.
    #[tracing::instrument(skip(self))]
    pub fn read_artifact(&self, name: &str, query: ArtifactQuery) -> TerraResult<Vec<u8>> {
        let name = ProjectName::parse(name)?;
        match query {
            ArtifactQuery::Source => self.store.read(&name, ArtifactKind::Source),
            ArtifactQuery::Heatmap => self.store.read(&name, ArtifactKind::Heatmap),
            ArtifactQuery::StoredMask => self.store.read(&name, ArtifactKind::Mask),
            ArtifactQuery::MaskAt(threshold) => {
                let source = self.store.read(&name, ArtifactKind::Source)?;
                let decoded = decode(&source)?;
                encode_png(&mask(&decoded, threshold))
            }
        }
    }

    /// Rename a project: directory first, then registry entry.
    ///
    /// When the directory moved but the registry could not be updated, the error is
    /// [`TerraError::PartialCommit`] naming both steps.
    #[tracing::instrument(skip(self))]
    pub fn rename(&self, old: &str, new: &str) -> TerraResult<()> {
        let old = ProjectName::parse(old)?;
        let new = ProjectName::parse(new)?;

        let _guard = self.lock_writer();
        let map = self.registry.load()?;
        if !map.contains_key(old.as_str()) {
            return Err(TerraError::not_found(format!("project '{old}'")));
        }
        if map.contains_key(new.as_str()) {
            return Err(TerraError::conflict(format!("project '{new}' already exists")));
        }

        self.store.rename(&old, &new)?;
        self.registry
            .rename(&old, &new)
            .map_err(|e| TerraError::PartialCommit {
                completed: "directory rename",
                failed: "registry rename",
                source: Box::new(e),
            })?;

        tracing::info!("project renamed");
        Ok(())
    }

    /// Delete a project: directory first, then registry entry.
    ///
    /// A registered project whose directory is already gone only loses its registry entry.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, name: &str) -> TerraResult<()> {
        let name = ProjectName::parse(name)?;

        let _guard = self.lock_writer();
        if self.registry.get(&name)?.is_none() {
            return Err(TerraError::not_found(format!("project '{name}'")));
        }

        if self.store.exists(&name) {
            self.store.remove(&name)?;
        } else {
            tracing::warn!("registered project had no directory");
        }
        self.registry
            .remove(&name)
            .map_err(|e| TerraError::PartialCommit {
                completed: "directory removal",
                failed: "registry removal",
                source: Box::new(e),
            })?;

        tracing::info!("project deleted");
        Ok(())
    }

    /// Compare registry and directories without changing either.
    pub fn audit(&self) -> TerraResult<AuditReport> {
        let registered = self.registry.load()?;
        let directories = self.store.list_directories()?;
        Ok(AuditReport::build(&registered, &directories, |name| {
            ProjectName::parse(name)
                .map(|n| self.store.has_artifact(&n, ArtifactKind::Source))
                .unwrap_or(false)
        }))
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
