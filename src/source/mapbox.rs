use std::{fmt, time::Duration};

use crate::foundation::error::{TerraError, TerraResult};
use crate::source::{FetchRequest, ImageSource};

/// Connection settings for [`MapboxStaticSource`], loaded once at startup.
#[derive(Clone)]
pub struct SourceConfig {
    /// Mapbox access token.
    pub api_key: String,
    /// API origin, without trailing slash.
    pub base_url: String,
    /// Style id, `owner/style`.
    pub style: String,
    /// Upper bound on a whole request, connect to last byte.
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.mapbox.com".to_string(),
            style: "mapbox/satellite-v9".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("style", &self.style)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Mapbox Static Images API client (blocking).
#[derive(Debug)]
pub struct MapboxStaticSource {
    cfg: SourceConfig,
    client: reqwest::blocking::Client,
}

impl MapboxStaticSource {
    /// Build a client. Fails with `InvalidInput` when no access token is configured.
    pub fn new(cfg: SourceConfig) -> TerraResult<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(TerraError::invalid_input("mapbox access token is not set"));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| TerraError::fetch(None, format!("build http client: {e}")))?;
        Ok(Self { cfg, client })
    }

    /// Static image URL for `req`, bearing fixed at 0.
    pub fn url_for(&self, req: &FetchRequest) -> String {
        static_image_url(&self.cfg, req)
    }
}

impl ImageSource for MapboxStaticSource {
    #[tracing::instrument(skip_all, fields(zoom = req.zoom, width = req.width, height = req.height))]
    fn fetch(&self, req: &FetchRequest) -> TerraResult<Vec<u8>> {
        let response = self
            .client
            .get(self.url_for(req))
            .send()
            .map_err(|e| TerraError::fetch(None, format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "mapbox rejected static image request");
            return Err(TerraError::fetch(
                Some(status.as_u16()),
                format!("mapbox responded with {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| TerraError::fetch(None, format!("read body: {}", e.without_url())))?;
        tracing::debug!(bytes = bytes.len(), "static image fetched");
        Ok(bytes.to_vec())
    }
}

pub(crate) fn static_image_url(cfg: &SourceConfig, req: &FetchRequest) -> String {
    format!(
        "{}/styles/v1/{}/static/{},{},{},0/{}x{}?access_token={}",
        cfg.base_url.trim_end_matches('/'),
        cfg.style,
        req.coord.lon,
        req.coord.lat,
        req.zoom,
        req.width,
        req.height,
        cfg.api_key,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/source/mapbox.rs"]
mod tests;
