use std::collections::BTreeSet;

use serde::Serialize;

use crate::registry::projects::ProjectMap;

/// Differences between the registry and the project directories.
///
/// A project is consistent when it is registered and its directory holds `image.png`. Entries
/// show up here after an interrupted workflow, or after hand edits of the data directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Registered projects whose directory or source image is missing.
    pub missing_sources: Vec<String>,
    /// Directories with no registry entry.
    pub unregistered_directories: Vec<String>,
}

impl AuditReport {
    pub(crate) fn build(
        registered: &ProjectMap,
        directories: &[String],
        has_source: impl Fn(&str) -> bool,
    ) -> Self {
        let on_disk: BTreeSet<&str> = directories.iter().map(String::as_str).collect();

        let missing_sources = registered
            .keys()
            .filter(|name| !on_disk.contains(name.as_str()) || !has_source(name.as_str()))
            .cloned()
            .collect();
        let unregistered_directories = directories
            .iter()
            .filter(|dir| !registered.contains_key(dir.as_str()))
            .cloned()
            .collect();

        Self {
            missing_sources,
            unregistered_directories,
        }
    }

    /// True when nothing is out of step.
    pub fn is_consistent(&self) -> bool {
        self.missing_sources.is_empty() && self.unregistered_directories.is_empty()
    }
}
