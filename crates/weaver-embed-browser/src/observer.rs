//! Child-list subscriptions backed by `MutationObserver`.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, MutationObserver, MutationObserverInit};
use weaver_embed_core::{ChangeCallback, PlatformError};

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// A live observer. The closure is kept alive for as long as the observer.
pub struct BrowserSubscription {
    observer: MutationObserver,
    _callback: ObserverCallback,
}

impl BrowserSubscription {
    pub fn disconnect(self) {
        self.observer.disconnect();
    }
}

/// Observe additions and removals among `region`'s direct children.
///
/// Subtree changes are not reported, so widgets mounting inside nested
/// blocks do not trigger another batch.
pub fn observe_child_list(
    region: &Element,
    on_change: ChangeCallback,
) -> Result<BrowserSubscription, PlatformError> {
    let callback: ObserverCallback =
        Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            tracing::trace!(records = records.length(), "embed region mutated");
            on_change();
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|e| format!("MutationObserver failed: {:?}", e))?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    observer
        .observe_with_options(region, &init)
        .map_err(|e| format!("observe failed: {:?}", e))?;

    Ok(BrowserSubscription {
        observer,
        _callback: callback,
    })
}
