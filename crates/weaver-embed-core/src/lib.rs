//! weaver-embed-core: embed resolution and mounting without a DOM dependency.
//!
//! Hyperlinks flagged with `title="@embed"` are matched against an ordered
//! provider registry and replaced by a provider widget, or by a fallback card
//! when no enabled provider matches. This crate provides:
//! - `EmbedHost` trait for the document the engine manipulates
//! - `DispatchTable` / `ActiveProviderSet` - registry and resolver
//! - `EnablementGate` - the one-shot platform configuration load
//! - `EmbedEngine<H>` - scan, mount and watch, generic over the host

pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod gate;
pub mod identity;
pub mod mount;
pub mod platform;
pub mod registry;
pub mod resolve;
pub mod scan;
pub mod watch;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    ConfigSource, EngineOptions, PlatformConfig, StaticConfig, decode_platforms, resolve_endpoint,
};
pub use engine::{EmbedEngine, EngineState};
pub use error::{EmbedError, Result};
pub use form::{EmbedForm, FormError};
pub use gate::{EnablementGate, GatePhase};
pub use identity::{IdentityError, UserInfo, decode_user_info, render_identity_error, render_user_card};
pub use mount::{MountController, PassReport, fallback_card_html};
pub use platform::{ChangeCallback, EmbedHost, PlatformError};
pub use registry::{DispatchTable, EmbedProvider, PROVIDERS, USER_INFO_URL};
pub use resolve::{ActiveProviderSet, ResolutionOutcome};
pub use scan::{AnchorCandidate, RENDERED_ATTR, scan};
pub use smol_str::SmolStr;
pub use watch::{WatchPhase, WatchState};
pub use widget::{EmbedRequest, FrameWidget, IdentityWidget, ScriptWidget, Widget};
