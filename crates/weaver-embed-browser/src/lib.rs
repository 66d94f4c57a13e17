//! Browser DOM layer for the weaver embed engine.
//!
//! Implements `EmbedHost` over web-sys and supplies the HTTP sources the
//! engine needs. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `BrowserHost`, the web-sys `EmbedHost`
//! - `observer`: `MutationObserver` subscriptions
//! - `render`: widget values to iframes and cards with a loading overlay
//! - `fetch`: HTTP `ConfigSource` and endpoint resolution
//! - `identity`: account lookup for the identity widget
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-embed-core` for convenience.

pub use weaver_embed_core;
pub use weaver_embed_core::*;

pub mod dom;
pub mod fetch;
pub mod identity;
pub mod observer;
mod render;

pub use dom::{BrowserHost, BrowserRoot};
pub use fetch::{HttpConfigSource, endpoint, page_origin};
pub use identity::IdentityClient;
pub use observer::BrowserSubscription;

/// Engine bound to the live page.
pub type BrowserEngine = EmbedEngine<BrowserHost>;
