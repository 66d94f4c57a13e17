//! The embed engine: gate, watcher, scanner and mount controller wired together.
//!
//! ```text
//! load(config) ──> gate Ready ──┐
//!                               ├──> initial pass ──> observe region ──> pass per change batch
//! attach(region) ───────────────┘
//! ```
//!
//! Everything runs on one thread. The engine is a cheap `Rc` handle so the
//! host's change callback and the async config fetch can both hold it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use web_time::Instant;

use crate::config::{ConfigSource, EngineOptions};
use crate::error::{EmbedError, Result};
use crate::gate::{EnablementGate, GatePhase};
use crate::mount::{MountController, PassReport};
use crate::platform::EmbedHost;
use crate::registry::DispatchTable;
use crate::scan::scan;
use crate::watch::{PassQueue, WatchPhase, WatchState};

/// Combined lifecycle state, as reported to embedders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Config not requested yet.
    Idle,
    /// Waiting for config, or for a region to watch.
    Pending,
    Watching,
    Disposed,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Pending => "pending",
            EngineState::Watching => "watching",
            EngineState::Disposed => "disposed",
        }
    }
}

struct Inner<H: EmbedHost> {
    host: H,
    options: EngineOptions,
    gate: RefCell<EnablementGate>,
    region: RefCell<Option<H::Element>>,
    watch: RefCell<WatchState<H::Subscription>>,
    controller: RefCell<MountController<H>>,
    queue: PassQueue,
    passes: Cell<u64>,
    last_report: Cell<PassReport>,
}

/// Handle to an embed engine bound to one host document.
pub struct EmbedEngine<H: EmbedHost + 'static> {
    inner: Rc<Inner<H>>,
}

impl<H: EmbedHost + 'static> Clone for EmbedEngine<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: EmbedHost + 'static> EmbedEngine<H> {
    /// Create an engine over the stock provider registry.
    pub fn new(host: H, options: EngineOptions) -> Self {
        Self::with_table(host, options, DispatchTable::stock())
    }

    pub fn with_table(host: H, options: EngineOptions, table: Arc<DispatchTable>) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                options,
                gate: RefCell::new(EnablementGate::new(table)),
                region: RefCell::new(None),
                watch: RefCell::new(WatchState::default()),
                controller: RefCell::new(MountController::new()),
                queue: PassQueue::default(),
                passes: Cell::new(0),
                last_report: Cell::new(PassReport::default()),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    pub fn gate_phase(&self) -> GatePhase {
        self.inner.gate.borrow().phase()
    }

    pub fn watch_phase(&self) -> WatchPhase {
        self.inner.watch.borrow().phase()
    }

    pub fn state(&self) -> EngineState {
        match (self.watch_phase(), self.gate_phase()) {
            (WatchPhase::Disposed, _) => EngineState::Disposed,
            (WatchPhase::Watching, _) => EngineState::Watching,
            (WatchPhase::Uninitialized, GatePhase::Uninitialized) => EngineState::Idle,
            (WatchPhase::Uninitialized, _) => EngineState::Pending,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.watch.borrow().is_disposed()
    }

    /// Total scan/mount passes executed.
    pub fn passes(&self) -> u64 {
        self.inner.passes.get()
    }

    /// Counts from the most recent pass.
    pub fn last_report(&self) -> PassReport {
        self.inner.last_report.get()
    }

    /// Fetch platform configuration once and open the gate on success.
    ///
    /// Later calls return immediately. A failed fetch leaves the engine
    /// pending for good. If the engine is disposed while the fetch is in
    /// flight, the result is dropped.
    pub async fn load<C: ConfigSource>(&self, source: &C) {
        if self.is_disposed() || !self.inner.gate.borrow_mut().begin() {
            return;
        }

        let result = source.fetch_platforms().await;

        if self.is_disposed() {
            tracing::debug!("embed engine disposed before config arrived");
            return;
        }
        let ready = self.inner.gate.borrow_mut().complete(result).is_some();
        if ready {
            self.try_watch();
        }
    }

    /// Set the region to watch.
    ///
    /// Attaching a different region while watching moves the subscription to
    /// the new region and runs a pass over it.
    pub fn attach(&self, region: H::Element) -> Result<()> {
        if self.is_disposed() {
            return Err(EmbedError::Disposed);
        }
        if self.inner.region.borrow().as_ref() == Some(&region) {
            return Ok(());
        }
        let previous = {
            let mut watch = self.inner.watch.borrow_mut();
            match std::mem::take(&mut *watch) {
                WatchState::Watching(subscription) => Some(subscription),
                other => {
                    *watch = other;
                    None
                }
            }
        };
        if let Some(subscription) = previous {
            tracing::debug!("moving embed watcher to a new region");
            self.inner.host.disconnect(subscription);
        }
        *self.inner.region.borrow_mut() = Some(region);
        self.try_watch();
        Ok(())
    }

    /// `Uninitialized -> Watching` once both the gate and the region are ready.
    fn try_watch(&self) {
        if self.watch_phase() != WatchPhase::Uninitialized {
            return;
        }
        if self.gate_phase() != GatePhase::Ready {
            return;
        }
        let Some(region) = self.inner.region.borrow().clone() else {
            return;
        };

        self.notify();

        let weak: Weak<Inner<H>> = Rc::downgrade(&self.inner);
        let on_change = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                EmbedEngine { inner }.notify();
            }
        });
        match self.inner.host.observe(&region, on_change) {
            Ok(subscription) => {
                let mut watch = self.inner.watch.borrow_mut();
                if watch.is_disposed() {
                    drop(watch);
                    self.inner.host.disconnect(subscription);
                } else {
                    *watch = WatchState::Watching(subscription);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not observe embed region");
            }
        }
    }

    /// Request a scan/mount pass.
    ///
    /// No-op once disposed or before the gate is ready. A request made while
    /// a pass is running is folded into one follow-up pass.
    pub fn notify(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.queue.drain(|| self.run_pass());
        if self.is_disposed() && !self.inner.queue.is_running() {
            // Disposed from inside a pass; release what the pass may have mounted.
            self.release_roots();
        }
    }

    fn run_pass(&self) {
        if self.is_disposed() {
            return;
        }
        let inner = &*self.inner;
        let gate = inner.gate.borrow();
        let Some(active) = gate.active() else {
            return;
        };
        let Some(region) = inner.region.borrow().clone() else {
            return;
        };
        if !inner.host.is_connected(&region) {
            tracing::debug!("embed region detached, skipping pass");
            return;
        }

        let start = Instant::now();
        let candidates = scan(&inner.host, &region, &inner.options.marker);
        let report = inner.controller.borrow_mut().mount_all(
            &inner.host,
            active,
            candidates,
            &inner.options,
        );
        inner.passes.set(inner.passes.get() + 1);
        inner.last_report.set(report);

        tracing::debug!(
            candidates = report.candidates,
            widgets = report.widgets,
            fallbacks = report.fallbacks,
            failed = report.failed,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "embed pass"
        );
    }

    /// Tear the engine down.
    ///
    /// Cancels the subscription, removes the shared fallback stylesheet and
    /// releases every render root. Idempotent. An in-flight config fetch or
    /// widget load is not cancelled; both no-op when they land.
    pub fn dispose(&self) {
        let subscription = {
            let mut watch = self.inner.watch.borrow_mut();
            if watch.is_disposed() {
                return;
            }
            watch.dispose()
        };
        if let Some(subscription) = subscription {
            self.inner.host.disconnect(subscription);
        }
        self.inner.host.remove_style(&self.inner.options.style_id);
        if !self.inner.queue.is_running() {
            self.release_roots();
        }
        tracing::debug!("embed engine disposed");
    }

    fn release_roots(&self) {
        if let Ok(mut controller) = self.inner.controller.try_borrow_mut() {
            controller.release_all(&self.inner.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use tokio::sync::oneshot;

    use crate::config::{PlatformConfig, STYLE_ID, StaticConfig};
    use crate::mount::fallback_card_html;
    use crate::testing::{MemoryHost, NodeId};
    use crate::registry::USER_INFO_URL;
    use crate::widget::{FrameWidget, IdentityWidget, Widget};

    const VIDEO: &str = "https://youtu.be/dQw4w9WgXcQ";

    struct FailingConfig;

    impl ConfigSource for FailingConfig {
        async fn fetch_platforms(&self) -> Result<Vec<PlatformConfig>> {
            Err(EmbedError::ConfigFetch("connection refused".into()))
        }
    }

    struct NeverConfig;

    impl ConfigSource for NeverConfig {
        async fn fetch_platforms(&self) -> Result<Vec<PlatformConfig>> {
            std::future::pending().await
        }
    }

    struct DeferredConfig(RefCell<Option<oneshot::Receiver<Vec<PlatformConfig>>>>);

    impl ConfigSource for DeferredConfig {
        async fn fetch_platforms(&self) -> Result<Vec<PlatformConfig>> {
            let rx = self.0.borrow_mut().take();
            let rx = rx.ok_or_else(|| EmbedError::ConfigFetch("receiver taken".into()))?;
            rx.await.map_err(|e| EmbedError::ConfigFetch(e.to_string()))
        }
    }

    struct CountingConfig(Cell<usize>);

    impl ConfigSource for CountingConfig {
        async fn fetch_platforms(&self) -> Result<Vec<PlatformConfig>> {
            self.0.set(self.0.get() + 1);
            Ok(youtube(true))
        }
    }

    fn youtube(enabled: bool) -> Vec<PlatformConfig> {
        vec![PlatformConfig::new("YouTube", enabled)]
    }

    fn setup() -> (MemoryHost, NodeId, EmbedEngine<MemoryHost>) {
        let host = MemoryHost::new();
        let region = host.element(host.body(), "div");
        let engine = EmbedEngine::new(host.clone(), EngineOptions::default());
        (host, region, engine)
    }

    /// Build `<p><a title="@embed">` off-document, then insert it in one go.
    fn paragraph(host: &MemoryHost, region: NodeId, href: &str, label: &str) -> (NodeId, NodeId) {
        let p = host.create("p");
        let a = host.anchor(p, href, Some("@embed"), label);
        host.append(region, p);
        (p, a)
    }

    fn poll_once<F: Future>(fut: std::pin::Pin<&mut F>) -> Poll<F::Output> {
        fut.poll(&mut Context::from_waker(Waker::noop()))
    }

    #[tokio::test]
    async fn enabled_provider_mounts_a_widget() {
        let (host, region, engine) = setup();
        let (p, _) = paragraph(&host, region, VIDEO, "Never gonna");
        engine.attach(region).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);

        engine.load(&StaticConfig(youtube(true))).await;

        assert_eq!(engine.state(), EngineState::Watching);
        assert_eq!(
            host.widgets(),
            vec![(
                p,
                Widget::Frame(FrameWidget::new(
                    "https://www.youtube.com/embed/dQw4w9WgXcQ",
                    "Never gonna"
                ))
            )]
        );
        assert_eq!(engine.passes(), 1);
    }

    #[tokio::test]
    async fn user_info_link_mounts_identity_widget() {
        let (host, region, engine) = setup();
        let (p, a) = paragraph(&host, region, USER_INFO_URL, "Me");
        engine.attach(region).unwrap();

        engine
            .load(&StaticConfig(vec![PlatformConfig::new("Twitter", true)]))
            .await;

        assert_eq!(engine.state(), EngineState::Watching);
        assert_eq!(
            host.widgets(),
            vec![(
                p,
                Widget::Identity(IdentityWidget {
                    url: USER_INFO_URL.to_string(),
                    title: "Me".to_string(),
                })
            )]
        );
        assert!(!host.is_connected(&a));
        assert_eq!(host.height(p).as_deref(), Some("128px"));
        assert_eq!(engine.last_report().widgets, 1);
    }

    #[tokio::test]
    async fn disabled_provider_falls_back_to_card() {
        let (host, region, engine) = setup();
        let (_, a) = paragraph(&host, region, VIDEO, "video");
        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(false))).await;

        assert!(host.widgets().is_empty());
        assert_eq!(
            host.inner_html(a),
            Some(fallback_card_html(VIDEO, "video"))
        );
        assert_eq!(host.style_count(STYLE_ID), 1);
        assert_eq!(engine.last_report().fallbacks, 1);
    }

    #[tokio::test]
    async fn unmarked_links_are_left_alone() {
        let (host, region, engine) = setup();
        let p = host.create("p");
        let a = host.anchor(p, VIDEO, None, "plain");
        host.append(region, p);

        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;

        assert!(host.widgets().is_empty());
        assert_eq!(host.inner_html(a), None);
        assert!(host.is_connected(&a));
        assert_eq!(engine.last_report(), PassReport::default());
    }

    #[test]
    fn pending_config_never_scans() {
        let (host, region, engine) = setup();
        engine.attach(region).unwrap();

        let source = NeverConfig;
        let mut load = pin!(engine.load(&source));
        assert!(poll_once(load.as_mut()).is_pending());
        assert_eq!(engine.state(), EngineState::Pending);

        paragraph(&host, region, VIDEO, "video");
        engine.notify();

        assert_eq!(engine.passes(), 0);
        assert!(host.widgets().is_empty());
        assert_eq!(host.observer_count(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_fails_closed() {
        let (host, region, engine) = setup();
        let (_, a) = paragraph(&host, region, VIDEO, "video");
        engine.attach(region).unwrap();

        engine.load(&FailingConfig).await;
        assert_eq!(engine.gate_phase(), GatePhase::Pending);
        assert_eq!(engine.state(), EngineState::Pending);

        // No retry, even with a working source.
        engine.load(&StaticConfig(youtube(true))).await;
        assert_eq!(engine.gate_phase(), GatePhase::Pending);
        assert!(host.is_connected(&a));
        assert!(host.widgets().is_empty());
        assert_eq!(host.observer_count(), 0);
    }

    #[tokio::test]
    async fn config_is_fetched_once() {
        let (_, region, engine) = setup();
        let source = CountingConfig(Cell::new(0));
        engine.load(&source).await;
        engine.load(&source).await;
        engine.attach(region).unwrap();
        assert_eq!(source.0.get(), 1);
        assert_eq!(engine.state(), EngineState::Watching);
    }

    #[tokio::test]
    async fn region_attached_after_load_is_scanned() {
        let (host, region, engine) = setup();
        paragraph(&host, region, VIDEO, "video");
        engine.load(&StaticConfig(youtube(true))).await;
        assert_eq!(engine.state(), EngineState::Pending);
        assert_eq!(engine.passes(), 0);

        engine.attach(region).unwrap();
        assert_eq!(engine.passes(), 1);
        assert_eq!(host.widgets().len(), 1);
    }

    #[tokio::test]
    async fn inserted_content_is_mounted() {
        let (host, region, engine) = setup();
        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;
        assert!(host.widgets().is_empty());

        let (p, _) = paragraph(&host, region, VIDEO, "video");
        let (_, card) = paragraph(&host, region, "https://example.com", "elsewhere");

        assert_eq!(host.widgets().len(), 1);
        assert_eq!(host.widgets()[0].0, p);
        assert!(host.inner_html(card).is_some());
    }

    #[tokio::test]
    async fn own_mutations_settle_after_one_follow_up_pass() {
        let (host, region, engine) = setup();
        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;
        assert_eq!(engine.passes(), 1);

        // Anchor directly in the region: mounting rewrites the region's own
        // child list, which the subscription reports back.
        host.anchor(region, VIDEO, Some("@embed"), "video");

        assert_eq!(engine.passes(), 3);
        assert_eq!(engine.last_report(), PassReport::default());
        assert_eq!(host.live_roots(), 1);
        assert_eq!(host.widgets()[0].0, region);
    }

    #[tokio::test]
    async fn dispose_releases_everything() {
        let (host, region, engine) = setup();
        paragraph(&host, region, VIDEO, "video");
        paragraph(&host, region, "https://example.com", "card");
        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;
        assert_eq!(host.live_roots(), 1);
        assert_eq!(host.style_count(STYLE_ID), 1);

        engine.dispose();

        assert_eq!(engine.state(), EngineState::Disposed);
        assert_eq!(host.live_roots(), 0);
        assert_eq!(host.style_count(STYLE_ID), 0);
        assert_eq!(host.observer_count(), 0);

        let passes = engine.passes();
        let (_, a) = paragraph(&host, region, VIDEO, "late");
        engine.notify();
        assert_eq!(engine.passes(), passes);
        assert!(host.is_connected(&a));
        assert!(matches!(engine.attach(region), Err(EmbedError::Disposed)));

        engine.dispose();
        assert_eq!(engine.state(), EngineState::Disposed);
    }

    #[tokio::test]
    async fn dispose_before_ready_skips_loading() {
        let (host, region, engine) = setup();
        paragraph(&host, region, VIDEO, "video");
        engine.attach(region).unwrap();
        engine.dispose();

        let source = CountingConfig(Cell::new(0));
        engine.load(&source).await;

        assert_eq!(source.0.get(), 0);
        assert_eq!(engine.gate_phase(), GatePhase::Uninitialized);
        assert!(host.widgets().is_empty());
    }

    #[test]
    fn config_arriving_after_dispose_is_dropped() {
        let (host, region, engine) = setup();
        paragraph(&host, region, VIDEO, "video");
        engine.attach(region).unwrap();

        let (tx, rx) = oneshot::channel();
        let source = DeferredConfig(RefCell::new(Some(rx)));
        let mut load = pin!(engine.load(&source));
        assert!(poll_once(load.as_mut()).is_pending());

        engine.dispose();
        tx.send(youtube(true)).unwrap();
        assert!(poll_once(load.as_mut()).is_ready());

        assert_eq!(engine.gate_phase(), GatePhase::Pending);
        assert_eq!(engine.passes(), 0);
        assert!(host.widgets().is_empty());
        assert_eq!(host.observer_count(), 0);
    }

    #[tokio::test]
    async fn attaching_a_new_region_moves_the_subscription() {
        let (host, first, engine) = setup();
        let second = host.element(host.body(), "div");
        engine.attach(first).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;

        engine.attach(second).unwrap();
        assert_eq!(host.observer_count(), 1);
        assert_eq!(engine.state(), EngineState::Watching);

        paragraph(&host, first, VIDEO, "old region");
        assert!(host.widgets().is_empty());

        let (p, _) = paragraph(&host, second, VIDEO, "new region");
        assert_eq!(host.widgets().len(), 1);
        assert_eq!(host.widgets()[0].0, p);
    }

    #[tokio::test]
    async fn detached_region_is_not_scanned() {
        let (host, region, engine) = setup();
        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;
        let passes = engine.passes();

        host.remove(region);
        paragraph(&host, region, VIDEO, "video");

        assert_eq!(engine.passes(), passes);
        assert!(host.widgets().is_empty());
    }

    #[tokio::test]
    async fn dropping_the_engine_silences_the_subscription() {
        let (host, region, engine) = setup();
        engine.attach(region).unwrap();
        engine.load(&StaticConfig(youtube(true))).await;
        drop(engine);

        paragraph(&host, region, VIDEO, "video");
        assert!(host.widgets().is_empty());
    }
}
