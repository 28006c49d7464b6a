pub(crate) mod mapbox;

use std::sync::Arc;

use crate::foundation::core::Coord;
use crate::foundation::error::TerraResult;

/// What to fetch from an upstream imagery provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchRequest {
    /// Image center.
    pub coord: Coord,
    /// Web-map zoom level.
    pub zoom: u8,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Upstream imagery provider.
///
/// Implementations return the encoded image bytes exactly as received. Any non-success response
/// must surface as [`crate::TerraError::Fetch`]; substituting a placeholder image is not allowed.
pub trait ImageSource: Send + Sync {
    /// Fetch one encoded image.
    fn fetch(&self, req: &FetchRequest) -> TerraResult<Vec<u8>>;
}

impl<S: ImageSource + ?Sized> ImageSource for Arc<S> {
    fn fetch(&self, req: &FetchRequest) -> TerraResult<Vec<u8>> {
        (**self).fetch(req)
    }
}

impl<S: ImageSource + ?Sized> ImageSource for Box<S> {
    fn fetch(&self, req: &FetchRequest) -> TerraResult<Vec<u8>> {
        (**self).fetch(req)
    }
}
