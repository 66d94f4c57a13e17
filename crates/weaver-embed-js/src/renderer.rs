//! EmbedRenderer - the engine wrapper for JavaScript.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use weaver_embed_browser::{BrowserEngine, BrowserHost, HttpConfigSource, IdentityClient};
use weaver_embed_core::{
    ConfigSource, EmbedEngine, PlatformConfig, Result as EmbedResult, StaticConfig,
};

use crate::types::JsEngineOptions;

/// Where platform configuration comes from.
enum Platforms {
    Http(HttpConfigSource),
    Inline(StaticConfig),
}

impl ConfigSource for Platforms {
    async fn fetch_platforms(&self) -> EmbedResult<Vec<PlatformConfig>> {
        match self {
            Platforms::Http(source) => source.fetch_platforms().await,
            Platforms::Inline(source) => source.fetch_platforms().await,
        }
    }
}

/// Turns `@embed` links inside one element into embedded widgets.
///
/// ```js
/// const renderer = new EmbedRenderer(document.querySelector(".content"), {});
/// await renderer.start();
/// // later
/// renderer.dispose();
/// ```
#[wasm_bindgen]
pub struct EmbedRenderer {
    engine: BrowserEngine,
    platforms: Rc<Platforms>,
}

#[wasm_bindgen]
impl EmbedRenderer {
    /// Create a renderer watching `element`. Nothing is fetched until `start`.
    #[wasm_bindgen(constructor)]
    pub fn new(element: Element, options: Option<JsEngineOptions>) -> Result<EmbedRenderer, JsError> {
        let (options, inline) = options.unwrap_or_default().into_parts();

        let identity = IdentityClient::from_options(&options)
            .map_err(|e| JsError::new(&format!("Invalid user info endpoint: {}", e)))?;
        let platforms = match inline {
            Some(list) => Platforms::Inline(StaticConfig(list)),
            None => Platforms::Http(
                HttpConfigSource::from_options(&options)
                    .map_err(|e| JsError::new(&format!("Invalid config endpoint: {}", e)))?,
            ),
        };
        let host = BrowserHost::current(identity).map_err(|e| JsError::new(&e.to_string()))?;

        let engine = EmbedEngine::new(host, options);
        engine
            .attach(element)
            .map_err(|e| JsError::new(&e.to_string()))?;

        Ok(Self {
            engine,
            platforms: Rc::new(platforms),
        })
    }

    /// Load platform configuration and begin watching.
    ///
    /// Resolves with the renderer state once the configuration request has
    /// settled. A failed request leaves the renderer `"pending"`.
    pub fn start(&self) -> js_sys::Promise {
        let engine = self.engine.clone();
        let platforms = self.platforms.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            engine.load(platforms.as_ref()).await;
            Ok(JsValue::from_str(engine.state().as_str()))
        })
    }

    /// Point the renderer at a different element.
    pub fn attach(&self, element: Element) -> Result<(), JsError> {
        self.engine
            .attach(element)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Run a scan immediately instead of waiting for a mutation.
    pub fn refresh(&self) {
        self.engine.notify();
    }

    /// Stop watching, remove the fallback stylesheet and unmount widgets.
    pub fn dispose(&self) {
        self.engine.dispose();
    }

    /// One of `"idle"`, `"pending"`, `"watching"`, `"disposed"`.
    pub fn state(&self) -> String {
        self.engine.state().as_str().to_string()
    }

    /// Number of scan passes run so far.
    #[wasm_bindgen(js_name = passCount)]
    pub fn pass_count(&self) -> u32 {
        u32::try_from(self.engine.passes()).unwrap_or(u32::MAX)
    }
}
