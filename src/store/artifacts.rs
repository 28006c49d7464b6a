use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use crate::foundation::core::{ArtifactKind, ProjectName};
use crate::foundation::error::{TerraError, TerraResult};

/// Filesystem store of per-project artifacts under `<projects_dir>/<name>/`.
///
/// Writes go to a temporary file in the project directory and are renamed into place, so a
/// concurrent reader sees either the previous artifact or the new one, never a prefix.
#[derive(Clone, Debug)]
pub struct RasterStore {
    projects_dir: PathBuf,
}

impl RasterStore {
    /// Store rooted at `projects_dir`. The directory is created lazily on first write.
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    /// Directory holding all project directories.
    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Directory of one project (may not exist).
    pub fn project_dir(&self, name: &ProjectName) -> PathBuf {
        self.projects_dir.join(name.as_str())
    }

    /// Path of one artifact (may not exist).
    pub fn artifact_path(&self, name: &ProjectName, kind: ArtifactKind) -> PathBuf {
        self.project_dir(name).join(kind.file_name())
    }

    /// Whether the project directory exists.
    pub fn exists(&self, name: &ProjectName) -> bool {
        self.project_dir(name).is_dir()
    }

    /// Whether a specific artifact file exists.
    pub fn has_artifact(&self, name: &ProjectName, kind: ArtifactKind) -> bool {
        self.artifact_path(name, kind).is_file()
    }

    /// Create the project directory if needed and return its path.
    pub fn ensure_directory(&self, name: &ProjectName) -> TerraResult<PathBuf> {
        let dir = self.project_dir(name);
        fs::create_dir_all(&dir)
            .map_err(|e| TerraError::io(format!("creating directory '{}'", dir.display()), e))?;
        Ok(dir)
    }

    /// Atomically replace one artifact. The project directory must already exist.
    pub fn write(&self, name: &ProjectName, kind: ArtifactKind, bytes: &[u8]) -> TerraResult<()> {
        let dir = self.project_dir(name);
        if !dir.is_dir() {
            return Err(TerraError::not_found(format!("project '{name}'")));
        }
        let target = dir.join(kind.file_name());
        let ctx = || format!("writing {} of project '{name}'", kind.file_name());

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .suffix(".png")
            .tempfile_in(&dir)
            .map_err(|e| TerraError::io(ctx(), e))?;
        tmp.write_all(bytes).map_err(|e| TerraError::io(ctx(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| TerraError::io(ctx(), e))?;
        tmp.persist(&target)
            .map_err(|e| TerraError::io(ctx(), e.error))?;

        tracing::debug!(project = %name, artifact = %kind, bytes = bytes.len(), "artifact written");
        Ok(())
    }

    /// Read one artifact.
    pub fn read(&self, name: &ProjectName, kind: ArtifactKind) -> TerraResult<Vec<u8>> {
        if !self.exists(name) {
            return Err(TerraError::not_found(format!("project '{name}'")));
        }
        let path = self.artifact_path(name, kind);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                TerraError::not_found(format!("{kind} artifact of project '{name}'"))
            }
            _ => TerraError::io(format!("reading '{}'", path.display()), e),
        })
    }

    /// Recursively delete the project directory.
    ///
    /// On failure the error lists whatever entries survived.
    pub fn remove(&self, name: &ProjectName) -> TerraResult<()> {
        let dir = self.project_dir(name);
        if !dir.is_dir() {
            return Err(TerraError::not_found(format!("project '{name}'")));
        }
        if let Err(e) = fs::remove_dir_all(&dir) {
            let mut survivors = Vec::new();
            collect_entries(&dir, &mut survivors);
            let listed = if survivors.is_empty() {
                "none".to_string()
            } else {
                survivors.join(", ")
            };
            return Err(TerraError::io(
                format!("removing '{}' (surviving entries: {listed})", dir.display()),
                e,
            ));
        }
        tracing::debug!(project = %name, "project directory removed");
        Ok(())
    }

    /// Rename the project directory with a single `rename(2)`.
    ///
    /// The absence check on `new` and the rename are two steps. `rename(2)` silently replaces an
    /// empty directory created between them, so callers must serialise every writer of the
    /// projects directory around this call, as [`crate::Pipeline`] does with its write lock.
    pub fn rename(&self, old: &ProjectName, new: &ProjectName) -> TerraResult<()> {
        let from = self.project_dir(old);
        let to = self.project_dir(new);
        if !from.is_dir() {
            return Err(TerraError::not_found(format!("project '{old}'")));
        }
        if fs::symlink_metadata(&to).is_ok() {
            return Err(TerraError::conflict(format!("project '{new}' already exists")));
        }
        fs::rename(&from, &to).map_err(|e| {
            TerraError::io(
                format!("renaming '{}' to '{}'", from.display(), to.display()),
                e,
            )
        })?;
        tracing::debug!(from = %old, to = %new, "project directory renamed");
        Ok(())
    }

    /// Names of all directories under the projects root, sorted.
    pub fn list_directories(&self) -> TerraResult<Vec<String>> {
        let rd = match fs::read_dir(&self.projects_dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TerraError::io(
                    format!("listing '{}'", self.projects_dir.display()),
                    e,
                ));
            }
        };

        let mut out = Vec::new();
        for entry in rd.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                out.push(name.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}

fn collect_entries(dir: &Path, out: &mut Vec<String>) {
    let Ok(rd) = fs::read_dir(dir) else {
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        out.push(path.display().to_string());
        if path.is_dir() {
            collect_entries(&path, out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/artifacts.rs"]
mod tests;
