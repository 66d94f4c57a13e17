//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;
use weaver_embed_core::{EngineOptions, FormError, PlatformConfig};

/// Whether a platform is enabled, in the config endpoint's wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsPlatformConfig {
    pub platform: String,
    pub enable: bool,
}

impl From<JsPlatformConfig> for PlatformConfig {
    fn from(config: JsPlatformConfig) -> Self {
        PlatformConfig::new(config.platform, config.enable)
    }
}

/// Renderer options. Omitted fields take the stock defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsEngineOptions {
    #[tsify(optional)]
    pub base_url: Option<String>,
    #[tsify(optional)]
    pub config_path: Option<String>,
    #[tsify(optional)]
    pub user_info_path: Option<String>,
    #[tsify(optional)]
    pub token_key: Option<String>,
    #[tsify(optional)]
    pub marker: Option<String>,
    #[tsify(optional)]
    pub style_id: Option<String>,
    #[tsify(optional)]
    pub placeholder_height: Option<String>,
    /// Platform list known up front; skips the config request.
    #[tsify(optional)]
    pub platforms: Option<Vec<JsPlatformConfig>>,
}

impl JsEngineOptions {
    /// Split into engine options and an optional inline platform list.
    pub fn into_parts(self) -> (EngineOptions, Option<Vec<PlatformConfig>>) {
        let defaults = EngineOptions::default();
        let options = EngineOptions {
            base_url: self.base_url.or(defaults.base_url),
            config_path: self.config_path.unwrap_or(defaults.config_path),
            user_info_path: self.user_info_path.unwrap_or(defaults.user_info_path),
            token_key: self.token_key.unwrap_or(defaults.token_key),
            marker: self.marker.unwrap_or(defaults.marker),
            style_id: self.style_id.unwrap_or(defaults.style_id),
            placeholder_height: self.placeholder_height.unwrap_or(defaults.placeholder_height),
        };
        let platforms = self
            .platforms
            .map(|list| list.into_iter().map(PlatformConfig::from).collect());
        (options, platforms)
    }
}

/// Title/URL pair from the insertion dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsEmbedForm {
    pub title: String,
    pub url: String,
}

/// Outcome of validating the insertion dialog.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsFormValidation {
    pub valid: bool,
    /// `"title"` or `"url"` when invalid.
    #[tsify(optional)]
    pub field: Option<String>,
    #[tsify(optional)]
    pub message: Option<String>,
}

impl From<Result<(), FormError>> for JsFormValidation {
    fn from(result: Result<(), FormError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                field: None,
                message: None,
            },
            Err(err) => Self {
                valid: false,
                field: Some(err.field().to_string()),
                message: Some(err.to_string()),
            },
        }
    }
}
