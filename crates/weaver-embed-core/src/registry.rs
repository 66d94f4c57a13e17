//! The provider registry and its compiled dispatch table.
//!
//! Providers are plain static data. The dispatch table flattens them into an
//! ordered list of `(provider, pattern)` rules, compiled once. Rule order is
//! registry order, then per-provider pattern declaration order, so a linear
//! first-match walk over the table gives provider precedence and pattern
//! precedence at the same time.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::PlatformConfig;
use crate::error::{EmbedError, Result};
use crate::resolve::ActiveProviderSet;
use crate::widget::{EmbedRequest, FrameWidget, IdentityWidget, ScriptWidget, Widget};

/// Pseudo-URL that embeds the signed-in user's identity card.
pub const USER_INFO_URL: &str = "userinfo://current";

/// Builds a widget from a matched URL.
pub type BuildFn = fn(&EmbedRequest<'_>) -> Widget;

/// An embeddable platform.
pub struct EmbedProvider {
    /// Matches `PlatformConfig::platform`.
    pub name: &'static str,
    /// URL patterns, tried in order. Each captures at most one group.
    pub patterns: &'static [&'static str],
    pub build: BuildFn,
}

impl std::fmt::Debug for EmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedProvider")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

/// Providers are static; two references are the same provider iff they
/// point at the same entry.
impl PartialEq for EmbedProvider {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for EmbedProvider {}

impl EmbedProvider {
    pub fn build(&self, request: &EmbedRequest<'_>) -> Widget {
        (self.build)(request)
    }
}

/// The stock providers, in precedence order.
pub static PROVIDERS: &[EmbedProvider] = &[
    EmbedProvider {
        name: "YouTube",
        patterns: &[
            r"https://youtu\.be/([a-zA-Z0-9_-]{11})",
            r"https://www\.youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})",
            r"https://www\.youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        ],
        build: build_youtube,
    },
    EmbedProvider {
        name: "Twitter",
        patterns: &[
            r"https://twitter\.com/[a-zA-Z0-9_]+/status/([a-zA-Z0-9_]+)",
            r"https://x\.com/[a-zA-Z0-9_]+/status/([a-zA-Z0-9_]+)",
            r"userinfo://current",
        ],
        build: build_twitter,
    },
    EmbedProvider {
        name: "CodePen",
        patterns: &[
            r"https://codepen\.io/[a-zA-Z0-9_]+/pen/([a-zA-Z0-9_]+)",
            r"https://codepen\.io/[a-zA-Z0-9_]+/full/([a-zA-Z0-9_]+)",
        ],
        build: build_codepen,
    },
    EmbedProvider {
        name: "JSFiddle",
        patterns: &[
            r"https://jsfiddle\.net/[a-zA-Z0-9_]+/([a-zA-Z0-9_]+)",
            r"https://jsfiddle\.net/[a-zA-Z0-9_]+/([a-zA-Z0-9_]+)/embed",
        ],
        build: build_jsfiddle,
    },
    EmbedProvider {
        name: "GithubGist",
        patterns: &[
            r"https://gist\.github\.com/[a-zA-Z0-9_]+/([a-zA-Z0-9_]+)",
            r"https://gist\.github\.com/[a-zA-Z0-9_]+/([a-zA-Z0-9_]+)\.js",
        ],
        build: build_gist,
    },
    EmbedProvider {
        name: "Figma",
        patterns: &[
            r"https://www\.figma\.com/design/[a-zA-Z0-9_]+/([a-zA-Z0-9_]+)",
            r"https://www\.figma\.com/file/[a-zA-Z0-9_]+/([a-zA-Z0-9_]+)",
        ],
        build: build_figma,
    },
    EmbedProvider {
        name: "Excalidraw",
        patterns: &[
            r"https://excalidraw\.com/#json=([a-zA-Z0-9_,-]+)",
            r"https://excalidraw\.com/([a-zA-Z0-9_,-]+)",
        ],
        build: build_excalidraw,
    },
    EmbedProvider {
        name: "Loom",
        patterns: &[
            r"https://www\.loom\.com/embed/([a-zA-Z0-9_]+)",
            r"https://www\.loom\.com/share/([a-zA-Z0-9_]+)",
        ],
        build: build_loom,
    },
    EmbedProvider {
        name: "Dropbox",
        patterns: &[r"https://www\.dropbox\.com/s/([a-zA-Z0-9_]+)/[a-zA-Z0-9_]+"],
        build: build_dropbox,
    },
];

fn build_youtube(req: &EmbedRequest<'_>) -> Widget {
    Widget::Frame(FrameWidget::new(
        format!("https://www.youtube.com/embed/{}", req.id()),
        req.title,
    ))
}

/// Every Twitter match renders the current-user card; the linked URL is
/// only carried along.
fn build_twitter(req: &EmbedRequest<'_>) -> Widget {
    Widget::Identity(IdentityWidget {
        url: req.url.to_string(),
        title: req.title.to_string(),
    })
}

fn build_codepen(req: &EmbedRequest<'_>) -> Widget {
    Widget::Frame(FrameWidget::new(
        format!(
            "https://codepen.io/anon/embed/{}?default-tab=result",
            req.id()
        ),
        req.title,
    ))
}

fn build_jsfiddle(req: &EmbedRequest<'_>) -> Widget {
    Widget::Frame(FrameWidget::new(
        format!("https://jsfiddle.net/{}/embedded/", req.id()),
        req.title,
    ))
}

fn build_gist(req: &EmbedRequest<'_>) -> Widget {
    let src = if req.url.contains(".js") {
        req.url.to_string()
    } else {
        format!("{}.js", req.url)
    };
    Widget::Script(ScriptWidget {
        src,
        title: req.title.to_string(),
    })
}

fn build_figma(req: &EmbedRequest<'_>) -> Widget {
    let encoded: String = url::form_urlencoded::byte_serialize(req.url.as_bytes()).collect();
    Widget::Frame(FrameWidget::new(
        format!("https://www.figma.com/embed?embed_host=share&url={encoded}"),
        req.title,
    ))
}

fn build_excalidraw(req: &EmbedRequest<'_>) -> Widget {
    Widget::Frame(FrameWidget::new(
        format!("https://excalidraw.com/#json={}", req.id()),
        req.title,
    ))
}

fn build_loom(req: &EmbedRequest<'_>) -> Widget {
    Widget::Frame(FrameWidget::new(
        format!("https://www.loom.com/embed/{}", req.id()),
        req.title,
    ))
}

fn build_dropbox(req: &EmbedRequest<'_>) -> Widget {
    Widget::Frame(FrameWidget::new(
        format!("https://www.dropbox.com/s/{}?raw=1", req.id()),
        req.title,
    ))
}

/// One compiled `(provider, pattern)` pair.
#[derive(Debug)]
pub struct Rule {
    pub provider: &'static EmbedProvider,
    /// Index of the provider in its registry.
    pub provider_index: usize,
    pub pattern: Regex,
}

/// Flattened, compiled view of a registry.
#[derive(Debug)]
pub struct DispatchTable {
    providers: &'static [EmbedProvider],
    rules: Vec<Rule>,
}

static STOCK_TABLE: LazyLock<Arc<DispatchTable>> =
    LazyLock::new(|| Arc::new(DispatchTable::compile(PROVIDERS)));

impl DispatchTable {
    /// The compiled stock registry.
    pub fn stock() -> Arc<DispatchTable> {
        STOCK_TABLE.clone()
    }

    /// Compile a registry, failing on the first invalid pattern.
    pub fn try_compile(providers: &'static [EmbedProvider]) -> Result<Self> {
        let mut rules = Vec::new();
        for (provider_index, provider) in providers.iter().enumerate() {
            for &pattern in provider.patterns {
                let compiled = Regex::new(pattern).map_err(|source| EmbedError::InvalidPattern {
                    provider: provider.name,
                    pattern,
                    source,
                })?;
                rules.push(Rule {
                    provider,
                    provider_index,
                    pattern: compiled,
                });
            }
        }
        Ok(Self { providers, rules })
    }

    /// Compile a registry, dropping (and logging) any pattern that fails.
    pub fn compile(providers: &'static [EmbedProvider]) -> Self {
        let mut rules = Vec::new();
        for (provider_index, provider) in providers.iter().enumerate() {
            for &pattern in provider.patterns {
                match Regex::new(pattern) {
                    Ok(compiled) => rules.push(Rule {
                        provider,
                        provider_index,
                        pattern: compiled,
                    }),
                    Err(source) => {
                        let err = EmbedError::InvalidPattern {
                            provider: provider.name,
                            pattern,
                            source,
                        };
                        tracing::error!(error = ?err, "skipping embed pattern");
                    }
                }
            }
        }
        Self { providers, rules }
    }

    pub fn providers(&self) -> &'static [EmbedProvider] {
        self.providers
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a provider by name.
    pub fn provider(&self, name: &str) -> Option<&'static EmbedProvider> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Filter the table down to the providers enabled by `configs`.
    ///
    /// A provider is active iff some entry names it and is enabled. Providers
    /// with no entry at all are inactive.
    pub fn activate(self: &Arc<Self>, configs: &[PlatformConfig]) -> ActiveProviderSet {
        let enabled: Vec<bool> = self
            .providers
            .iter()
            .map(|provider| {
                configs
                    .iter()
                    .any(|config| config.platform == provider.name && config.enabled)
            })
            .collect();
        ActiveProviderSet::new(self.clone(), enabled)
    }
}
