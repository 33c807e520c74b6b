/// Track / bundle-search buttons next to the add-to-cart control
use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlButtonElement, MouseEvent};

use super::{ContentContext, panel};
use crate::config::TRACK_BUTTON_ID;
use crate::dom::WebDom;
use crate::error::{Result, TrackerError, dom_error};
use crate::extract::{bundle_search_url, find_insertion_point};
use crate::product::ProductSnapshot;
use crate::retry::CancelToken;
use crate::storage::{StoreBackend, modify_store};

const TRACKING_LABEL: &str = "📊 Tracking Price";
const UNTRACKED_LABEL: &str = "📈 Track This Price";
const BUNDLE_LABEL: &str = "🔍 Search for Bundles";

fn toggle_label(tracked: bool) -> &'static str {
    if tracked { TRACKING_LABEL } else { UNTRACKED_LABEL }
}

fn create_button(document: &Document, class_name: &str, label: &str) -> Result<HtmlButtonElement> {
    let button: HtmlButtonElement = document
        .create_element("button")
        .map_err(dom_error)?
        .dyn_into()
        .map_err(|_| TrackerError::Dom("created element is not a button".to_string()))?;
    button.set_class_name(class_name);
    // Plain button so it never submits the add-to-cart form
    button.set_type("button");
    button.set_text_content(Some(label));
    Ok(button)
}

fn set_tracked(button: &HtmlButtonElement, tracked: bool) -> Result<()> {
    button.set_text_content(Some(toggle_label(tracked)));
    button
        .set_attribute("data-tracked", if tracked { "true" } else { "false" })
        .map_err(dom_error)
}

fn on_click(button: &HtmlButtonElement, handler: impl Fn() + 'static) -> Result<()> {
    let listener = Closure::<dyn Fn(MouseEvent)>::new(move |event: MouseEvent| {
        event.prevent_default();
        event.stop_propagation();
        handler();
    });
    button
        .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    // Lives as long as the button does
    listener.forget();
    Ok(())
}

/// Flip tracking for the snapshot's URL and update the page to match
async fn toggle(ctx: &ContentContext, button: &HtmlButtonElement, snapshot: &ProductSnapshot) -> Result<()> {
    let backend = ctx.store();
    let was_tracked = button.get_attribute("data-tracked").as_deref() == Some("true");

    if was_tracked {
        modify_store(&backend, |store| store.untrack(&snapshot.url)).await?;
        set_tracked(button, false)?;
        panel::remove(&ctx.document);
        log::info!("[Price Tracker] Product untracked");
    } else {
        let (_, store) = modify_store(&backend, |store| store.track(snapshot)).await?;
        set_tracked(button, true)?;
        ctx.show_history(&store, &snapshot.url)?;
        log::info!("[Price Tracker] Product tracked: {}", snapshot.title);
    }

    Ok(())
}

fn wire_toggle(ctx: Rc<ContentContext>, button: HtmlButtonElement, snapshot: ProductSnapshot) -> Result<()> {
    let busy = Rc::new(Cell::new(false));
    let target = button.clone();

    on_click(&target, move || {
        // One storage round-trip at a time per button
        if busy.replace(true) {
            log::debug!("[Price Tracker] Toggle already in progress, ignoring click");
            return;
        }

        let ctx = ctx.clone();
        let button = button.clone();
        let snapshot = snapshot.clone();
        let busy = busy.clone();
        spawn_local(async move {
            if let Err(e) = toggle(&ctx, &button, &snapshot).await {
                log::error!("[Price Tracker] Toggle failed: {}", e);
            }
            busy.set(false);
        });
    })
}

fn wire_bundle_search(ctx: &ContentContext, button: &HtmlButtonElement, snapshot: &ProductSnapshot) -> Result<()> {
    let url = bundle_search_url(&ctx.config, &snapshot.sku, &snapshot.title)?;
    let window = ctx.window.clone();

    on_click(button, move || {
        if let Err(e) = window.open_with_url_and_target(url.as_str(), "_blank") {
            log::error!("[Price Tracker] Could not open bundle search: {:?}", e);
            return;
        }
        log::info!("[Price Tracker] Opened bundle search: {}", url);
    })
}

/// Put both buttons right after the add-to-cart button, or at the end of the container
fn place(container: &Element, add_to_cart: &str, track: &Element, bundle: &Element) -> Result<()> {
    match container.query_selector(add_to_cart).ok().flatten() {
        Some(cart) => {
            cart.after_with_node_1(track).map_err(dom_error)?;
            track.after_with_node_1(bundle).map_err(dom_error)?;
            log::debug!("[Price Tracker] Buttons inserted after Add to Cart button");
        }
        None => {
            container.append_child(track).map_err(dom_error)?;
            container.append_child(bundle).map_err(dom_error)?;
            log::debug!("[Price Tracker] Buttons appended to container");
        }
    }
    Ok(())
}

/// Create, wire and place both buttons. Returns the track button, or None when
/// the page offered nowhere to put it. A page that already has one is left alone.
fn mount_buttons(
    ctx: &Rc<ContentContext>,
    tracked: bool,
    snapshot: &ProductSnapshot,
) -> Result<Option<HtmlButtonElement>> {
    let document = &ctx.document;
    if let Some(existing) = document.get_element_by_id(TRACK_BUTTON_ID) {
        log::debug!("[Price Tracker] Button already exists, skipping");
        return Ok(existing.dyn_into().ok());
    }

    let dom = WebDom::new(document.clone());
    let Some((strategy, container)) = find_insertion_point(&dom, &ctx.config.selectors.insertion) else {
        log::info!("[Price Tracker] Button injection aborted - no suitable container found");
        return Ok(None);
    };
    log::debug!("[Price Tracker] Using {} as button container", strategy.name);

    let track = create_button(document, "price-tracker-btn", toggle_label(tracked))?;
    track.set_id(TRACK_BUTTON_ID);
    set_tracked(&track, tracked)?;

    let bundle = create_button(document, "price-tracker-btn bundle-search-btn", BUNDLE_LABEL)?;
    bundle.set_title(&if snapshot.sku.is_empty() {
        "Search for this product in bundles".to_string()
    } else {
        format!("Search for SKU: {}", snapshot.sku)
    });

    // Both buttons work before anything else can fail
    wire_bundle_search(ctx, &bundle, snapshot)?;
    wire_toggle(ctx.clone(), track.clone(), snapshot.clone())?;
    place(&container, ctx.config.selectors.add_to_cart, &track, &bundle)?;
    log::info!("[Price Tracker] Buttons successfully injected");

    Ok(Some(track))
}

/// Add the buttons for `snapshot` unless they are already on the page.
/// Returns false when the page offered nowhere to put them or `cancel` fired.
pub async fn inject_buttons<B: StoreBackend>(
    ctx: Rc<ContentContext>,
    backend: &B,
    snapshot: ProductSnapshot,
    cancel: &CancelToken,
) -> Result<bool> {
    if ctx.document.get_element_by_id(TRACK_BUTTON_ID).is_some() {
        log::debug!("[Price Tracker] Button already exists, skipping");
        return Ok(true);
    }
    if cancel.is_cancelled() {
        return Ok(false);
    }

    let store = backend.load().await?;
    // The page may have changed while the store was read
    if cancel.is_cancelled() {
        log::debug!("[Price Tracker] Navigated away during injection");
        return Ok(false);
    }

    let tracked = store.is_tracked(&snapshot.url);
    log::debug!("[Price Tracker] Product tracked status: {}", tracked);

    if mount_buttons(&ctx, tracked, &snapshot)?.is_none() {
        return Ok(false);
    }

    if tracked {
        if let Err(e) = ctx.show_history(&store, &snapshot.url) {
            log::error!("[Price Tracker] Could not render price history: {}", e);
        }
    }

    Ok(true)
}
