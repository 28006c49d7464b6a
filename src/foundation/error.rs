/// Convenience result type used across terramask.
pub type TerraResult<T> = Result<T, TerraError>;

/// Coarse error category, stable across releases.
///
/// Callers that translate errors into transport responses (exit codes, HTTP statuses) should
/// match on this rather than on [`TerraError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing arguments. Nothing was changed.
    InvalidInput,
    /// Referenced project or artifact is absent.
    NotFound,
    /// Target name already exists.
    Conflict,
    /// Upstream image source failed.
    Fetch,
    /// Bytes are not a valid image.
    Decode,
    /// A raster could not be encoded.
    Encode,
    /// Filesystem failure.
    Io,
    /// Registry file could not be (de)serialized.
    Registry,
    /// Anything else.
    Other,
}

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum TerraError {
    /// Invalid user-provided arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A project or one of its artifacts does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A project with the requested name already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The upstream image source did not return an image.
    #[error("fetch error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Fetch {
        /// Upstream HTTP status, when a response was received.
        status: Option<u16>,
        /// Diagnostic message.
        message: String,
    },

    /// Bytes could not be decoded as an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// A raster could not be encoded as PNG.
    #[error("encode error: {0}")]
    Encode(String),

    /// Filesystem failure while performing `context`.
    #[error("io error while {context}: {source}")]
    Io {
        /// The step or artifact being touched.
        context: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The registry file is unreadable as JSON, or could not be serialized.
    #[error("registry error: {0}")]
    Registry(String),

    /// A two-step workflow completed its first step but not its second.
    #[error("partial failure: {completed} succeeded but {failed} failed: {source}")]
    PartialCommit {
        /// The step that took effect.
        completed: &'static str,
        /// The step that did not.
        failed: &'static str,
        /// Why the second step failed.
        #[source]
        source: Box<TerraError>,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TerraError {
    /// Build a [`TerraError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`TerraError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`TerraError::Conflict`] value.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Build a [`TerraError::Fetch`] value.
    pub fn fetch(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            message: msg.into(),
        }
    }

    /// Build a [`TerraError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TerraError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TerraError::Io`] value.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build a [`TerraError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Category of this error. A [`TerraError::PartialCommit`] reports the category of the
    /// failed step.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Io { .. } => ErrorKind::Io,
            Self::Registry(_) => ErrorKind::Registry,
            Self::PartialCommit { source, .. } => source.kind(),
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
