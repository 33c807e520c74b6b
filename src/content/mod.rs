/// Content script running on 4WD Supacentre pages
pub mod inject;
pub mod panel;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Window};

use crate::bridge::ChromeStore;
use crate::config::{TRACK_BUTTON_ID, TrackerConfig};
use crate::dom::{Dom, WebDom};
use crate::error::{Result, TrackerError, dom_error};
use crate::extract::extract_product;
use crate::navigation::{self, UrlWatcher};
use crate::page::is_product_url;
use crate::product::ProductSnapshot;
use crate::retry::{CancelToken, PollOutcome, Poller, TimerSleeper};
use crate::storage::{TrackedStore, modify_store};
use panel::PanelModel;

/// State owned by one content-script instance
pub struct ContentContext {
    pub window: Window,
    pub document: Document,
    pub config: TrackerConfig,
    watcher: RefCell<UrlWatcher>,
    /// Token for the add-to-cart poll currently running, if any
    pending: RefCell<Option<CancelToken>>,
}

impl ContentContext {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let window = web_sys::window().ok_or(TrackerError::NoWindow)?;
        let document = window.document().ok_or(TrackerError::NoWindow)?;
        let href = window.location().href().map_err(dom_error)?;

        Ok(ContentContext {
            window,
            document,
            config,
            watcher: RefCell::new(UrlWatcher::new(href)),
            pending: RefCell::new(None),
        })
    }

    pub fn href(&self) -> Result<String> {
        self.window.location().href().map_err(dom_error)
    }

    pub(crate) fn store(&self) -> ChromeStore {
        ChromeStore::from_config(&self.config)
    }

    fn dom(&self) -> WebDom {
        WebDom::new(self.document.clone())
    }

    fn snapshot(&self) -> Result<Option<ProductSnapshot>> {
        let href = self.href()?;
        let now = js_sys::Date::now() as i64;
        Ok(extract_product(&self.dom(), &self.config.selectors, &href, now))
    }

    /// Render the inline panel for `url` from an already loaded store
    pub fn show_history(&self, store: &TrackedStore, url: &str) -> Result<()> {
        let Some(model) = store
            .get(url)
            .and_then(|product| PanelModel::new(product, self.config.recent_entries))
        else {
            return Ok(());
        };

        panel::render(&self.document, &self.config.selectors.panel_anchors, &model)?;
        Ok(())
    }

    /// Cancel the previous poll and hand out a token for a new one
    fn begin_poll(&self) -> CancelToken {
        let token = CancelToken::new();
        if let Some(previous) = self.pending.replace(Some(token.clone())) {
            previous.cancel();
        }
        token
    }
}

/// Append the current price to the stored history if this page is tracked
async fn refresh_tracked_price(ctx: &ContentContext, snapshot: &ProductSnapshot) -> Result<()> {
    let (appended, _) = modify_store(&ctx.store(), |store| store.record_observation(snapshot)).await?;
    if appended {
        log::info!("[Price Tracker] Recorded new price {} for {}", snapshot.price, snapshot.title);
    }
    Ok(())
}

async fn run(ctx: Rc<ContentContext>, cancel: CancelToken) -> Result<()> {
    let poller = Poller::new(ctx.config.poll_interval, ctx.config.poll_attempts);
    let dom = ctx.dom();
    let add_to_cart = ctx.config.selectors.add_to_cart;

    match poller
        .poll(&TimerSleeper, &cancel, || dom.query(add_to_cart).is_some())
        .await
    {
        PollOutcome::Ready { attempts } => {
            log::info!("[Price Tracker] Add to Cart button found after {} checks", attempts);
        }
        PollOutcome::Exhausted { .. } => {
            log::info!("[Price Tracker] Add to Cart button not found, using fallback containers");
        }
        PollOutcome::Cancelled => {
            log::debug!("[Price Tracker] Initialization superseded by navigation");
            return Ok(());
        }
    }

    let Some(snapshot) = ctx.snapshot()? else {
        log::info!("[Price Tracker] Could not extract product info, button injection aborted");
        return Ok(());
    };

    refresh_tracked_price(&ctx, &snapshot).await?;
    if cancel.is_cancelled() {
        log::debug!("[Price Tracker] Navigated away before injection");
        return Ok(());
    }
    let backend = ctx.store();
    inject::inject_buttons(ctx, &backend, snapshot, &cancel).await?;
    Ok(())
}

/// Classify the page and, for products, wait for it to render then add the buttons
pub fn initialize(ctx: Rc<ContentContext>) {
    let href = match ctx.href() {
        Ok(href) => href,
        Err(e) => {
            log::error!("[Price Tracker] {}", e);
            return;
        }
    };

    if !is_product_url(&href) {
        log::debug!("[Price Tracker] Not a product page, skipping initialization");
        return;
    }

    if ctx.document.get_element_by_id(TRACK_BUTTON_ID).is_some() {
        log::debug!("[Price Tracker] Button already exists, skipping");
        return;
    }

    log::info!("[Price Tracker] Product page detected, initializing...");
    let cancel = ctx.begin_poll();
    spawn_local(async move {
        if let Err(e) = run(ctx, cancel).await {
            log::error!("[Price Tracker] Initialization failed: {}", e);
        }
    });
}

/// Re-run initialization shortly after the URL changes
fn on_navigate(ctx: &Rc<ContentContext>) {
    let Ok(href) = ctx.href() else {
        return;
    };
    if !ctx.watcher.borrow_mut().observe(&href) {
        return;
    }

    // The old page's poll must not inject into the new page
    if let Some(previous) = ctx.pending.borrow_mut().take() {
        previous.cancel();
    }

    let ctx = ctx.clone();
    spawn_local(async move {
        let delay = u32::try_from(ctx.config.navigation_delay.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(delay).await;
        initialize(ctx);
    });
}

fn document_is_loading(document: &Document) -> bool {
    Reflect::get(document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .is_some_and(|state| state == "loading")
}

/// Entry point for the content script
pub fn start(config: TrackerConfig) -> Result<()> {
    log::info!("[Price Tracker] Content script loaded");
    let ctx = Rc::new(ContentContext::new(config)?);

    let watcher_ctx = ctx.clone();
    navigation::install(&ctx.window, Rc::new(move || on_navigate(&watcher_ctx)))?;

    if document_is_loading(&ctx.document) {
        let loaded_ctx = ctx.clone();
        let on_loaded = Closure::<dyn FnMut()>::once(move || initialize(loaded_ctx));
        ctx.document
            .add_event_listener_with_callback("DOMContentLoaded", on_loaded.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        on_loaded.forget();
    } else {
        initialize(ctx);
    }

    Ok(())
}
