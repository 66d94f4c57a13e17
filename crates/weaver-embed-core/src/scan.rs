//! Enumeration of marked hyperlinks inside a region.

use crate::platform::EmbedHost;

/// Attribute stamped on an anchor once it has been rewritten into a fallback card.
pub const RENDERED_ATTR: &str = "data-embed-rendered";

/// A hyperlink flagged for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorCandidate<E> {
    pub element: E,
    /// The anchor's `href`.
    pub url: String,
    /// The anchor's text content.
    pub label: String,
}

/// Collect every marked hyperlink under `region`, in document order.
///
/// An anchor qualifies iff its `title` is exactly `marker` and its `href` is
/// non-empty. Anchors already rewritten into a fallback card are skipped, so
/// scanning a fully processed region yields nothing.
pub fn scan<H: EmbedHost>(
    host: &H,
    region: &H::Element,
    marker: &str,
) -> Vec<AnchorCandidate<H::Element>> {
    host.anchors(region)
        .into_iter()
        .filter_map(|element| {
            if host.attribute(&element, "title").as_deref() != Some(marker) {
                return None;
            }
            let url = host.attribute(&element, "href").unwrap_or_default();
            if url.is_empty() {
                return None;
            }
            if host.attribute(&element, RENDERED_ATTR).is_some() {
                return None;
            }
            let label = host.text_content(&element);
            Some(AnchorCandidate {
                element,
                url,
                label,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EMBED_MARKER;
    use crate::testing::MemoryHost;

    #[test]
    fn only_marked_links_are_candidates() {
        let host = MemoryHost::new();
        let region = host.element(host.body(), "div");
        let p = host.element(region, "p");
        let marked = host.anchor(p, "https://youtu.be/dQw4w9WgXcQ", Some("@embed"), "video");
        host.anchor(p, "https://example.com", None, "plain");
        host.anchor(p, "https://example.com", Some("@Embed"), "wrong case");
        host.anchor(p, "https://example.com", Some("@embed "), "trailing space");
        host.anchor(p, "", Some("@embed"), "no href");

        let found = scan(&host, &region, EMBED_MARKER);
        assert_eq!(
            found,
            vec![AnchorCandidate {
                element: marked,
                url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                label: "video".to_string(),
            }]
        );
    }

    #[test]
    fn rescan_is_stable_and_in_document_order() {
        let host = MemoryHost::new();
        let region = host.element(host.body(), "div");
        let first = host.element(region, "p");
        let second = host.element(region, "p");
        host.anchor(second, "https://b.example", Some("@embed"), "b");
        host.anchor(first, "https://a.example", Some("@embed"), "a");

        let urls = |found: Vec<AnchorCandidate<_>>| {
            found.into_iter().map(|c| c.url).collect::<Vec<_>>()
        };
        let once = urls(scan(&host, &region, EMBED_MARKER));
        let twice = urls(scan(&host, &region, EMBED_MARKER));
        assert_eq!(once, vec!["https://a.example", "https://b.example"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn links_outside_the_region_are_ignored() {
        let host = MemoryHost::new();
        let region = host.element(host.body(), "div");
        let sibling = host.element(host.body(), "div");
        host.anchor(sibling, "https://youtu.be/dQw4w9WgXcQ", Some("@embed"), "elsewhere");
        assert!(scan(&host, &region, EMBED_MARKER).is_empty());
    }

    #[test]
    fn stamped_fallbacks_are_skipped() {
        let host = MemoryHost::new();
        let region = host.element(host.body(), "div");
        let a = host.anchor(region, "https://example.com", Some("@embed"), "x");
        host.set_attribute(&a, RENDERED_ATTR, "").unwrap();
        assert!(scan(&host, &region, EMBED_MARKER).is_empty());
    }
}
