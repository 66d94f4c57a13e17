//! Error types for the embed engine.

use miette::Diagnostic;

use crate::platform::PlatformError;

/// Main error type for embed engine operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum EmbedError {
    /// The platform configuration request did not complete.
    #[error("embed config request failed: {0}")]
    #[diagnostic(code(weaver_embed::config::fetch))]
    ConfigFetch(String),

    /// The platform configuration body was not the expected envelope.
    #[error("embed config response could not be decoded")]
    #[diagnostic(code(weaver_embed::config::decode))]
    ConfigDecode(#[from] serde_json::Error),

    /// The envelope decoded but carried no platform list.
    #[error("embed config response carried no platform list")]
    #[diagnostic(
        code(weaver_embed::config::missing),
        help("the endpoint must answer with {{\"data\": [{{\"platform\": ..., \"enable\": ...}}]}}")
    )]
    MissingPlatforms,

    /// A registry pattern failed to compile.
    #[error("invalid pattern {pattern:?} for provider {provider}")]
    #[diagnostic(code(weaver_embed::registry::pattern))]
    InvalidPattern {
        provider: &'static str,
        pattern: &'static str,
        #[source]
        source: regex::Error,
    },

    /// An endpoint path could not be turned into an absolute URL.
    #[error("invalid endpoint {0:?}")]
    #[diagnostic(code(weaver_embed::config::endpoint))]
    InvalidEndpoint(String),

    /// The host document rejected an operation.
    #[error("host operation failed: {0}")]
    #[diagnostic(code(weaver_embed::host))]
    Host(#[from] PlatformError),

    /// The engine was torn down.
    #[error("embed engine has been disposed")]
    #[diagnostic(code(weaver_embed::disposed))]
    Disposed,
}

pub type Result<T, E = EmbedError> = std::result::Result<T, E>;
