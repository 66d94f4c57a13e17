//! Platform abstraction traits for the embed engine.
//!
//! These traits define the interface between the engine logic and the
//! document it manipulates. The browser implementation lives in
//! `weaver-embed-browser` and talks to the real DOM through web-sys; tests use
//! an in-memory document.

use std::fmt;

use crate::widget::Widget;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Callback delivered by a host subscription on every structural change batch.
pub type ChangeCallback = Box<dyn Fn()>;

/// The document operations the embed engine needs from its host.
///
/// All methods take `&self`: hosts are handles onto a document that is shared
/// with the surrounding editor, so mutation goes through interior mutability
/// (the browser DOM, or a `RefCell` in tests).
pub trait EmbedHost {
    /// A handle to an element. Cheap to clone, compared by identity.
    type Element: Clone + PartialEq + fmt::Debug;
    /// An isolated render root created at a container element.
    type Root;
    /// A live structural-change subscription.
    type Subscription;

    /// Every hyperlink element under `region`, in document order.
    fn anchors(&self, region: &Self::Element) -> Vec<Self::Element>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn set_attribute(
        &self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), PlatformError>;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, element: &Self::Element) -> String;

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Whether the element is still attached to the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), PlatformError>;

    /// Set an explicit CSS height on the element.
    fn set_height(&self, element: &Self::Element, height: &str) -> Result<(), PlatformError>;

    /// Replace the element's children with the given markup.
    fn set_inner_html(&self, element: &Self::Element, html: &str) -> Result<(), PlatformError>;

    /// Create a render root that takes over the container's content.
    fn create_root(&self, container: &Self::Element) -> Result<Self::Root, PlatformError>;

    /// Render a widget into a root created by [`EmbedHost::create_root`].
    fn render(&self, root: &mut Self::Root, widget: Widget) -> Result<(), PlatformError>;

    /// Tear down a root and everything rendered into it.
    fn unmount(&self, root: Self::Root);

    /// Whether a style element with this id is present in the document.
    fn has_style(&self, id: &str) -> bool;

    /// Insert a style element with the given id and rules.
    fn insert_style(&self, id: &str, css: &str) -> Result<(), PlatformError>;

    /// Remove the style element with this id, if present.
    fn remove_style(&self, id: &str);

    /// Subscribe to child-list changes of `region` (direct children only).
    fn observe(
        &self,
        region: &Self::Element,
        on_change: ChangeCallback,
    ) -> Result<Self::Subscription, PlatformError>;

    /// Cancel a subscription. No callback fires after this returns.
    fn disconnect(&self, subscription: Self::Subscription);
}
