//! WASM bindings for the weaver embed engine.
//!
//! Exposes the embed renderer and the insertion-dialog helpers to JS/TS apps
//! via wasm-bindgen.

use wasm_bindgen::prelude::*;
use weaver_embed_core::{DispatchTable, EmbedForm, PlatformConfig};

mod renderer;
mod types;

pub use renderer::EmbedRenderer;
pub use types::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}

/// Validate the insertion dialog's title and URL.
#[wasm_bindgen(js_name = validateEmbedForm)]
pub fn validate_embed_form(form: JsEmbedForm) -> JsFormValidation {
    EmbedForm::new(form.title, form.url).validate().into()
}

/// Markdown for a marked link, e.g. `[Demo](https://youtu.be/... "@embed")`.
#[wasm_bindgen(js_name = embedMarkdown)]
pub fn embed_markdown(form: JsEmbedForm) -> Result<String, JsError> {
    EmbedForm::new(form.title, form.url)
        .to_markdown()
        .map_err(|e| JsError::new(&e.to_string()))
}

/// The "insert user info" preset for the insertion dialog.
#[wasm_bindgen(js_name = userInfoForm)]
pub fn user_info_form() -> JsEmbedForm {
    let form = EmbedForm::user_info();
    JsEmbedForm {
        title: form.title,
        url: form.url,
    }
}

/// Provider that would embed `url` under the given platform list, if any.
#[wasm_bindgen(js_name = resolveProvider)]
pub fn resolve_provider(url: &str, platforms: JsValue) -> Result<Option<String>, JsError> {
    let platforms: Vec<JsPlatformConfig> = serde_wasm_bindgen::from_value(platforms)
        .map_err(|e| JsError::new(&format!("Invalid platform list: {}", e)))?;
    let platforms: Vec<PlatformConfig> = platforms.into_iter().map(PlatformConfig::from).collect();
    let active = DispatchTable::stock().activate(&platforms);
    Ok(active.resolve(url).provider_name().map(str::to_string))
}

/// Names of every known provider, in resolution order.
#[wasm_bindgen(js_name = providerNames)]
pub fn provider_names() -> Vec<String> {
    DispatchTable::stock()
        .providers()
        .iter()
        .map(|p| p.name.to_string())
        .collect()
}
