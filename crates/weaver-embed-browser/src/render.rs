//! Widget values to DOM.
//!
//! Each widget is rendered next to a loading overlay that covers the
//! container. When the widget has real content the overlay is removed and the
//! container's placeholder height is released.

use std::cell::Cell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement};
use weaver_embed_core::{
    FrameWidget, IdentityWidget, PlatformError, ScriptWidget, Widget, render_identity_error,
    render_user_card,
};

use crate::dom::BrowserRoot;
use crate::identity::IdentityClient;

const LOADING_CLASS: &str = "loading position-absolute top-0 left-0 w-100 h-100 z-1 bg-white d-flex justify-content-center align-items-center";
const SPINNER_HTML: &str = r#"<div class="spinner-border text-secondary" role="status"></div>"#;
const FRAME_HEIGHT: &str = "400";

/// Replace the root container's content with `widget`.
pub(crate) fn render_widget(
    document: &Document,
    identity: &Rc<IdentityClient>,
    root: &mut BrowserRoot,
    widget: Widget,
) -> Result<(), PlatformError> {
    let container = root.container.clone();
    container.set_text_content(None);
    root.content.clear();

    let overlay = create(document, "span")?;
    overlay.set_class_name(LOADING_CLASS);
    overlay.set_inner_html(SPINNER_HTML);

    let content = match widget {
        Widget::Frame(frame) => frame_element(document, root, &overlay, &frame)?,
        Widget::Script(script) => script_element(document, root, &overlay, &script)?,
        Widget::Identity(widget) => identity_element(document, identity, root, &overlay, &widget)?,
    };

    for node in [&content, &overlay] {
        container
            .append_child(node)
            .map_err(|e| format!("append widget failed: {:?}", e))?;
    }
    root.content.push(content);
    root.content.push(overlay);
    Ok(())
}

fn create(document: &Document, tag: &str) -> Result<Element, PlatformError> {
    document
        .create_element(tag)
        .map_err(|e| format!("create_element({}) failed: {:?}", tag, e).into())
}

fn iframe(document: &Document, title: &str) -> Result<HtmlIFrameElement, PlatformError> {
    let frame = create(document, "iframe")?
        .dyn_into::<HtmlIFrameElement>()
        .map_err(|_| "iframe is not HtmlIFrameElement")?;
    frame.set_title(title);
    frame.set_width("100%");
    frame.set_height(FRAME_HEIGHT);
    frame.set_class_name("d-block border-0");
    frame.set_allow_fullscreen(true);
    Ok(frame)
}

/// Clear the overlay once the frame has loaded.
fn on_load(root: &mut BrowserRoot, frame: &HtmlIFrameElement, overlay: &Element) {
    let container = root.container.clone();
    let overlay = overlay.clone();
    let alive = root.alive.clone();
    let loaded = root.loaded.clone();
    let listener = EventListener::once(frame, "load", move |_| {
        finish_loading(&container, &overlay, &alive, &loaded);
    });
    root.listeners.push(listener);
}

fn frame_element(
    document: &Document,
    root: &mut BrowserRoot,
    overlay: &Element,
    widget: &FrameWidget,
) -> Result<Element, PlatformError> {
    let frame = iframe(document, &widget.title)?;
    frame.set_src(&widget.src);
    on_load(root, &frame, overlay);
    Ok(frame.into())
}

fn script_element(
    document: &Document,
    root: &mut BrowserRoot,
    overlay: &Element,
    widget: &ScriptWidget,
) -> Result<Element, PlatformError> {
    let frame = iframe(document, &widget.title)?;
    frame.set_srcdoc(&widget.srcdoc());
    frame
        .set_attribute("sandbox", "allow-scripts allow-popups")
        .map_err(|e| format!("set sandbox failed: {:?}", e))?;
    on_load(root, &frame, overlay);
    Ok(frame.into())
}

fn identity_element(
    document: &Document,
    identity: &Rc<IdentityClient>,
    root: &mut BrowserRoot,
    overlay: &Element,
    widget: &IdentityWidget,
) -> Result<Element, PlatformError> {
    let card = create(document, "div")?;
    card.set_class_name("card p-3 mb-3");
    card.set_attribute("aria-label", &widget.title)
        .map_err(|e| format!("set aria-label failed: {:?}", e))?;

    let container = root.container.clone();
    let overlay = overlay.clone();
    let alive = root.alive.clone();
    let loaded = root.loaded.clone();
    let client = identity.clone();
    let target = card.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let html = match client.fetch().await {
            Ok(info) => render_user_card(&info),
            Err(err) => {
                tracing::debug!(error = %err, "identity lookup failed");
                render_identity_error(&err)
            }
        };
        if alive.get() && target.is_connected() {
            target.set_inner_html(&html);
        }
        finish_loading(&container, &overlay, &alive, &loaded);
    });
    Ok(card)
}

fn finish_loading(
    container: &Element,
    overlay: &Element,
    alive: &Cell<bool>,
    loaded: &Cell<bool>,
) {
    if !alive.get() || !container.is_connected() {
        return;
    }
    if let Some(html) = container.dyn_ref::<HtmlElement>() {
        if let Err(e) = html.style().set_property("height", "auto") {
            tracing::debug!(error = ?e, "failed to release container height");
        }
    }
    overlay.remove();
    loaded.set(true);
}
