//! web-sys implementation of the embed host.

use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};
use weaver_embed_core::mount::POSITION_CLASS;
use weaver_embed_core::{ChangeCallback, EmbedHost, PlatformError, Widget};

use crate::identity::IdentityClient;
use crate::observer::{BrowserSubscription, observe_child_list};
use crate::render;

/// A render root at a container element.
///
/// Dropping the listeners detaches any pending load handlers; `alive` is
/// cleared on unmount so async widget work can tell it was abandoned.
/// `loaded` is set once the overlay is gone and the height released.
pub struct BrowserRoot {
    pub(crate) container: Element,
    pub(crate) alive: Rc<Cell<bool>>,
    pub(crate) loaded: Rc<Cell<bool>>,
    pub(crate) listeners: Vec<EventListener>,
    pub(crate) content: Vec<Element>,
}

/// The live page document.
#[derive(Clone)]
pub struct BrowserHost {
    document: Document,
    identity: Rc<IdentityClient>,
}

impl BrowserHost {
    pub fn new(document: Document, identity: IdentityClient) -> Self {
        Self {
            document,
            identity: Rc::new(identity),
        }
    }

    /// Host over the current window's document.
    pub fn current(identity: IdentityClient) -> Result<Self, PlatformError> {
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;
        Ok(Self::new(document, identity))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn identity(&self) -> &Rc<IdentityClient> {
        &self.identity
    }
}

impl EmbedHost for BrowserHost {
    type Element = Element;
    type Root = BrowserRoot;
    type Subscription = BrowserSubscription;

    fn anchors(&self, region: &Element) -> Vec<Element> {
        let Ok(list) = region.query_selector_all("a") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), PlatformError> {
        element
            .set_attribute(name, value)
            .map_err(|e| format!("set_attribute failed: {:?}", e).into())
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn add_class(&self, element: &Element, class: &str) -> Result<(), PlatformError> {
        element
            .class_list()
            .add_1(class)
            .map_err(|e| format!("classList.add failed: {:?}", e).into())
    }

    fn set_height(&self, element: &Element, height: &str) -> Result<(), PlatformError> {
        let html = element
            .dyn_ref::<HtmlElement>()
            .ok_or("container is not HtmlElement")?;
        html.style()
            .set_property("height", height)
            .map_err(|e| format!("set height failed: {:?}", e).into())
    }

    fn set_inner_html(&self, element: &Element, html: &str) -> Result<(), PlatformError> {
        element.set_inner_html(html);
        Ok(())
    }

    fn create_root(&self, container: &Element) -> Result<BrowserRoot, PlatformError> {
        Ok(BrowserRoot {
            container: container.clone(),
            alive: Rc::new(Cell::new(true)),
            loaded: Rc::new(Cell::new(false)),
            listeners: Vec::new(),
            content: Vec::new(),
        })
    }

    fn render(&self, root: &mut BrowserRoot, widget: Widget) -> Result<(), PlatformError> {
        render::render_widget(&self.document, &self.identity, root, widget)
    }

    fn unmount(&self, root: BrowserRoot) {
        root.alive.set(false);
        drop(root.listeners);
        for element in root.content {
            element.remove();
        }
        if !root.loaded.get() && root.container.is_connected() {
            release_placeholder(&root.container);
        }
    }

    fn has_style(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn insert_style(&self, id: &str, css: &str) -> Result<(), PlatformError> {
        let style = self
            .document
            .create_element("style")
            .map_err(|e| format!("create style failed: {:?}", e))?;
        style.set_id(id);
        style.set_text_content(Some(css));
        let parent: Element = match self.document.head() {
            Some(head) => head.into(),
            None => self
                .document
                .document_element()
                .ok_or("no document element")?,
        };
        parent
            .append_child(&style)
            .map_err(|e| format!("append style failed: {:?}", e))?;
        Ok(())
    }

    fn remove_style(&self, id: &str) {
        if let Some(style) = self.document.get_element_by_id(id) {
            style.remove();
        }
    }

    fn observe(
        &self,
        region: &Element,
        on_change: ChangeCallback,
    ) -> Result<BrowserSubscription, PlatformError> {
        observe_child_list(region, on_change)
    }

    fn disconnect(&self, subscription: BrowserSubscription) {
        subscription.disconnect();
    }
}

/// Drop the placeholder height and positioning a mount put on `container`.
fn release_placeholder(container: &Element) {
    if let Some(html) = container.dyn_ref::<HtmlElement>() {
        if let Err(e) = html.style().remove_property("height") {
            tracing::debug!(error = ?e, "failed to reset container height");
        }
    }
    if let Err(e) = container.class_list().remove_1(POSITION_CLASS) {
        tracing::debug!(error = ?e, "failed to drop container position class");
    }
}
