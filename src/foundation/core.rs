use std::fmt;

use crate::foundation::error::{TerraError, TerraResult};

const MAX_NAME_BYTES: usize = 128;

/// Project identity. Doubles as a single filesystem path segment, so construction validates it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    /// Validate `raw` as a project name.
    ///
    /// Rejected: empty names, names longer than 128 bytes, path separators (`/`, `\`), control
    /// characters, any `..` sequence and a leading `.`.
    pub fn parse(raw: &str) -> TerraResult<Self> {
        let reject = |reason: &str| {
            Err(TerraError::invalid_input(format!(
                "project name {raw:?} {reason}"
            )))
        };

        if raw.trim().is_empty() {
            return reject("must be non-empty");
        }
        if raw.len() > MAX_NAME_BYTES {
            return reject("is too long");
        }
        if raw.contains(['/', '\\']) {
            return reject("must not contain path separators");
        }
        if raw.chars().any(char::is_control) {
            return reject("must not contain control characters");
        }
        if raw.contains("..") {
            return reject("must not contain '..'");
        }
        if raw.starts_with('.') {
            return reject("must not start with '.'");
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Geographic anchor of a project, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coord {
    /// Latitude in [-90, 90].
    pub lat: f64,
    /// Longitude in [-180, 180].
    pub lon: f64,
}

impl Coord {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> TerraResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TerraError::invalid_input(format!(
                "latitude {lat} must be within [-90, 90]"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(TerraError::invalid_input(format!(
                "longitude {lon} must be within [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }
}

/// Grayscale cutoff used to binarize a mask. Pixels strictly brighter than the threshold are light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(pub u8);

impl Threshold {
    /// Level used when a request does not name one.
    pub const DEFAULT: Self = Self(128);

    /// Build a threshold from a wider integer, rejecting values outside [0, 255].
    pub fn from_i64(raw: i64) -> TerraResult<Self> {
        u8::try_from(raw).map(Self).map_err(|_| {
            TerraError::invalid_input(format!("threshold {raw} must be within [0, 255]"))
        })
    }

    /// Raw level.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One of the three persisted rasters of a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Image as fetched from upstream, stored verbatim.
    Source,
    /// Colorized grayscale derived from the source.
    Heatmap,
    /// Binary mask derived from the source at creation-time threshold.
    Mask,
}

impl ArtifactKind {
    /// Every kind, in write order.
    pub const ALL: [Self; 3] = [Self::Source, Self::Heatmap, Self::Mask];

    /// File name inside the project directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Source => "image.png",
            Self::Heatmap => "heatmap.png",
            Self::Mask => "mask.png",
        }
    }

    /// Parse a request-surface label (`source`/`image`, `heatmap`, `mask`).
    pub fn parse(raw: &str) -> TerraResult<Self> {
        match raw {
            "source" | "image" => Ok(Self::Source),
            "heatmap" => Ok(Self::Heatmap),
            "mask" => Ok(Self::Mask),
            other => Err(TerraError::invalid_input(format!(
                "unknown artifact kind {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Heatmap => "heatmap",
            Self::Mask => "mask",
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
