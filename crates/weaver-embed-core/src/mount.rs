//! Turning scanned anchors into widgets or fallback cards.

use markdown_weaver_escape::escape_html;

use crate::config::EngineOptions;
use crate::platform::{EmbedHost, PlatformError};
use crate::resolve::{ActiveProviderSet, ResolutionOutcome};
use crate::scan::{AnchorCandidate, RENDERED_ATTR};
use crate::widget::{EmbedRequest, Widget};

/// Class added to a widget's container so the loading overlay can cover it.
pub const POSITION_CLASS: &str = "position-relative";

/// Hover rule for fallback cards, installed once per document.
pub const FALLBACK_STYLE: &str = "\
.embed-light:hover {
  --bs-bg-opacity: 1;
  background-color: rgba(var(--bs-light-rgb), var(--bs-bg-opacity)) !important;
}
";

/// Markup for the card that replaces an anchor no provider matched.
pub fn fallback_card_html(url: &str, label: &str) -> String {
    let mut html = String::from(
        "<div class=\"card embed-light\"><div class=\"card-body\"><div class=\"text-secondary small mb-1\">",
    );
    // Writing into a String never fails.
    let _ = escape_html(&mut html, url);
    html.push_str("</div><div class=\"text-body fw-bold\">");
    let _ = escape_html(&mut html, label);
    html.push_str("</div></div></div>");
    html
}

/// Counts from one scan/mount pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub candidates: usize,
    pub widgets: usize,
    pub fallbacks: usize,
    /// Candidates whose replacement the host refused.
    pub failed: usize,
    /// Whether this pass created the shared stylesheet.
    pub style_created: bool,
}

/// Owns the render roots created for widgets and drives each replacement.
pub struct MountController<H: EmbedHost> {
    roots: Vec<(H::Element, H::Root)>,
}

impl<H: EmbedHost> Default for MountController<H> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<H: EmbedHost> MountController<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of render roots currently owned.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Produce exactly one outcome per candidate.
    pub fn mount_all(
        &mut self,
        host: &H,
        active: &ActiveProviderSet,
        candidates: Vec<AnchorCandidate<H::Element>>,
        options: &EngineOptions,
    ) -> PassReport {
        self.release_detached(host);

        let mut report = PassReport {
            candidates: candidates.len(),
            ..PassReport::default()
        };

        // Containers are looked up before anything is replaced: mounting a
        // widget detaches every other anchor sharing its container.
        let containers: Vec<Option<H::Element>> = candidates
            .iter()
            .map(|candidate| host.parent(&candidate.element))
            .collect();

        for (candidate, container) in candidates.into_iter().zip(containers) {
            let outcome = active.resolve(&candidate.url);
            let result = match outcome {
                ResolutionOutcome::Matched { provider, id } => {
                    let request = EmbedRequest {
                        id,
                        url: &candidate.url,
                        title: &candidate.label,
                    };
                    let widget = provider.build(&request);
                    tracing::trace!(
                        provider = provider.name,
                        widget = widget.kind(),
                        url = %candidate.url,
                        "mounting embed widget"
                    );
                    self.mount_widget(host, container, widget, options)
                        .map(|_| report.widgets += 1)
                }
                ResolutionOutcome::Unmatched => {
                    tracing::trace!(url = %candidate.url, "no provider, rendering fallback card");
                    self.mount_fallback(host, &candidate, options).map(|created| {
                        report.fallbacks += 1;
                        report.style_created |= created;
                    })
                }
            };

            if let Err(err) = result {
                report.failed += 1;
                tracing::warn!(url = %candidate.url, error = %err, "embed replacement failed");
            }
        }

        report
    }

    fn mount_widget(
        &mut self,
        host: &H,
        container: Option<H::Element>,
        widget: Widget,
        options: &EngineOptions,
    ) -> Result<(), PlatformError> {
        let container =
            container.ok_or_else(|| PlatformError::from("anchor has no parent element"))?;

        if let Some(pos) = self.roots.iter().position(|(el, _)| *el == container) {
            let (_, previous) = self.roots.swap_remove(pos);
            host.unmount(previous);
        }

        host.add_class(&container, POSITION_CLASS)?;
        host.set_height(&container, &options.placeholder_height)?;

        let mut root = host.create_root(&container)?;
        let rendered = host.render(&mut root, widget);
        self.roots.push((container, root));
        rendered
    }

    /// Returns whether the shared stylesheet was created by this call.
    fn mount_fallback(
        &mut self,
        host: &H,
        candidate: &AnchorCandidate<H::Element>,
        options: &EngineOptions,
    ) -> Result<bool, PlatformError> {
        let html = fallback_card_html(&candidate.url, &candidate.label);
        host.set_inner_html(&candidate.element, &html)?;
        host.set_attribute(&candidate.element, RENDERED_ATTR, "")?;
        ensure_style(host, &options.style_id)
    }

    /// Drop roots whose container has left the document.
    fn release_detached(&mut self, host: &H) {
        let (live, detached): (Vec<_>, Vec<_>) = std::mem::take(&mut self.roots)
            .into_iter()
            .partition(|(container, _)| host.is_connected(container));
        self.roots = live;
        for (_, root) in detached {
            host.unmount(root);
        }
    }

    /// Unmount every owned root.
    pub fn release_all(&mut self, host: &H) {
        for (_, root) in self.roots.drain(..) {
            host.unmount(root);
        }
    }
}

/// Create the shared fallback stylesheet unless one is already present.
///
/// Returns whether it was created.
pub fn ensure_style<H: EmbedHost>(host: &H, id: &str) -> Result<bool, PlatformError> {
    if host.has_style(id) {
        return Ok(false);
    }
    host.insert_style(id, FALLBACK_STYLE)?;
    Ok(true)
}
