use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::foundation::core::{Coord, ProjectName};
use crate::foundation::error::{TerraError, TerraResult};

/// Full registry contents: project name to coordinate, in name order.
pub type ProjectMap = BTreeMap<String, Coord>;

/// JSON file mapping project names to coordinates.
///
/// Every mutation is a load, mutate, save cycle over the whole map, serialised on a writer lock so
/// concurrent writers in this process never lose each other's updates. Saves replace the file by
/// rename, so readers never observe a partial document.
#[derive(Debug)]
pub struct ProjectRegistry {
    path: PathBuf,
    writer: Mutex<()>,
}

impl ProjectRegistry {
    /// Registry persisted at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    /// Location of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full map. A missing file is the empty registry.
    pub fn load(&self) -> TerraResult<ProjectMap> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ProjectMap::new()),
            Err(e) => {
                return Err(TerraError::io(
                    format!("reading registry '{}'", self.path.display()),
                    e,
                ));
            }
        };
        serde_json::from_str(&text).map_err(|e| {
            TerraError::registry(format!("parse '{}': {e}", self.path.display()))
        })
    }

    /// Replace the registry with `map`.
    pub fn save(&self, map: &ProjectMap) -> TerraResult<()> {
        let _guard = self.lock_writer();
        self.save_locked(map)
    }

    /// Coordinate of one project, if registered.
    pub fn get(&self, name: &ProjectName) -> TerraResult<Option<Coord>> {
        Ok(self.load()?.get(name.as_str()).copied())
    }

    /// Insert or overwrite one entry.
    pub fn upsert(&self, name: &ProjectName, coord: Coord) -> TerraResult<()> {
        let _guard = self.lock_writer();
        let mut map = self.load()?;
        map.insert(name.as_str().to_string(), coord);
        self.save_locked(&map)
    }

    /// Move the entry for `old` to `new`.
    pub fn rename(&self, old: &ProjectName, new: &ProjectName) -> TerraResult<()> {
        let _guard = self.lock_writer();
        let mut map = self.load()?;
        if map.contains_key(new.as_str()) {
            return Err(TerraError::conflict(format!("project '{new}' already exists")));
        }
        let coord = map
            .remove(old.as_str())
            .ok_or_else(|| TerraError::not_found(format!("project '{old}'")))?;
        map.insert(new.as_str().to_string(), coord);
        self.save_locked(&map)
    }

    /// Drop the entry for `name`, returning its coordinate.
    pub fn remove(&self, name: &ProjectName) -> TerraResult<Coord> {
        let _guard = self.lock_writer();
        let mut map = self.load()?;
        let coord = map
            .remove(name.as_str())
            .ok_or_else(|| TerraError::not_found(format!("project '{name}'")))?;
        self.save_locked(&map)?;
        Ok(coord)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save_locked(&self, map: &ProjectMap) -> TerraResult<()> {
        let ctx = || format!("writing registry '{}'", self.path.display());
        let json = serde_json::to_vec_pretty(map)
            .map_err(|e| TerraError::registry(format!("serialize registry: {e}")))?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| TerraError::io(ctx(), e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".projects-")
            .suffix(".json")
            .tempfile_in(&parent)
            .map_err(|e| TerraError::io(ctx(), e))?;
        tmp.write_all(&json).map_err(|e| TerraError::io(ctx(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| TerraError::io(ctx(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| TerraError::io(ctx(), e.error))?;

        tracing::debug!(entries = map.len(), path = %self.path.display(), "registry saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/projects.rs"]
mod tests;
