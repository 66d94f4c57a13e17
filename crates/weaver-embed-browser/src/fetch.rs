//! Platform configuration over HTTP.

use weaver_embed_core::{
    ConfigSource, EmbedError, EngineOptions, PlatformConfig, Result, decode_platforms,
    resolve_endpoint,
};

/// Origin of the current page, e.g. `https://answers.example.com`.
pub fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Absolute URL for an endpoint path, relative to `base_url` or the page origin.
pub fn endpoint(options: &EngineOptions, path: &str) -> Result<String> {
    let base = match &options.base_url {
        Some(base) => base.clone(),
        None => page_origin().ok_or_else(|| EmbedError::InvalidEndpoint(path.to_string()))?,
    };
    resolve_endpoint(&base, path)
}

/// Reads `{ code, data: [{ platform, enable }], msg }` from the config endpoint.
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    url: String,
    client: reqwest::Client,
}

impl HttpConfigSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_options(options: &EngineOptions) -> Result<Self> {
        Ok(Self::new(endpoint(options, &options.config_path)?))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ConfigSource for HttpConfigSource {
    async fn fetch_platforms(&self) -> Result<Vec<PlatformConfig>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EmbedError::ConfigFetch(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| EmbedError::ConfigFetch(e.to_string()))?;
        decode_platforms(&body)
    }
}
