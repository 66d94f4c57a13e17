//! Platform configuration and engine options.

use std::future::Future;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{EmbedError, Result};

/// Default path of the platform configuration endpoint.
pub const DEFAULT_CONFIG_PATH: &str = "/answer/api/v1/embed/config";
/// Default path of the identity lookup endpoint.
pub const DEFAULT_USER_INFO_PATH: &str = "/answer/api/v1/user/info";
/// Local storage key holding the session token.
pub const DEFAULT_TOKEN_KEY: &str = "a_ltk";
/// Title attribute value that flags a hyperlink for embedding.
pub const EMBED_MARKER: &str = "@embed";
/// Id of the shared fallback-card stylesheet.
pub const STYLE_ID: &str = "embed-style";
/// Height given to a widget's container until the widget has content.
pub const PLACEHOLDER_HEIGHT: &str = "128px";

/// Whether a single platform is enabled for this deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub platform: SmolStr,
    #[serde(rename = "enable")]
    pub enabled: bool,
}

impl PlatformConfig {
    pub fn new(platform: impl Into<SmolStr>, enabled: bool) -> Self {
        Self {
            platform: platform.into(),
            enabled,
        }
    }
}

/// Response envelope of the configuration endpoint.
#[derive(Debug, Deserialize)]
struct ConfigEnvelope {
    #[serde(default)]
    data: Option<Vec<PlatformConfig>>,
}

/// Decode the configuration endpoint body into its platform list.
pub fn decode_platforms(body: &str) -> Result<Vec<PlatformConfig>> {
    let envelope: ConfigEnvelope = serde_json::from_str(body)?;
    envelope.data.ok_or(EmbedError::MissingPlatforms)
}

/// A source of platform configuration.
///
/// The engine calls [`ConfigSource::fetch_platforms`] at most once.
pub trait ConfigSource {
    fn fetch_platforms(&self) -> impl Future<Output = Result<Vec<PlatformConfig>>>;
}

/// A configuration source that is already known, e.g. rendered into the page.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub Vec<PlatformConfig>);

impl ConfigSource for StaticConfig {
    async fn fetch_platforms(&self) -> Result<Vec<PlatformConfig>> {
        Ok(self.0.clone())
    }
}

/// Engine options. Every field has a default matching the stock deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Base URL that relative endpoint paths are resolved against.
    /// `None` means the page origin.
    pub base_url: Option<String>,
    pub config_path: String,
    pub user_info_path: String,
    pub token_key: String,
    pub marker: String,
    pub style_id: String,
    pub placeholder_height: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            user_info_path: DEFAULT_USER_INFO_PATH.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            marker: EMBED_MARKER.to_string(),
            style_id: STYLE_ID.to_string(),
            placeholder_height: PLACEHOLDER_HEIGHT.to_string(),
        }
    }
}

/// Resolve an endpoint path against a base URL.
///
/// Absolute paths are returned unchanged.
pub fn resolve_endpoint(base: &str, path: &str) -> Result<String> {
    if let Ok(absolute) = url::Url::parse(path) {
        return Ok(absolute.into());
    }
    let base = url::Url::parse(base).map_err(|_| EmbedError::InvalidEndpoint(base.to_string()))?;
    base.join(path)
        .map(String::from)
        .map_err(|_| EmbedError::InvalidEndpoint(path.to_string()))
}
