/// Reading product details and insertion points out of a product page
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::TrackerConfig;
use crate::dom::Dom;
use crate::product::ProductSnapshot;
use crate::selectors::{Anchor, InsertionStrategy, PriceLookup, SelectorProfile};

pub const UNKNOWN_TITLE: &str = "Unknown Product";

/// Leading number, the part `parseFloat` would read
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)").unwrap());

/// Parse a price out of element text such as "629", "$1,299" or "49.95 ea".
/// Zero or unreadable prices count as missing.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().trim_start_matches('$').replace(',', "");
    let number = LEADING_NUMBER.find(&cleaned)?;
    let price: f64 = number.as_str().parse().ok()?;

    (price.is_finite() && price > 0.0).then_some(price)
}

fn lookup_price<D: Dom>(dom: &D, lookup: &PriceLookup) -> Option<f64> {
    let node = match lookup {
        PriceLookup::Nested { container, value } => {
            let container = dom.query(container)?;
            dom.query_within(&container, value)?
        }
        PriceLookup::Anywhere { value } => dom.query(value)?,
    };

    parse_price(&dom.text(&node))
}

fn trimmed_text<D: Dom>(dom: &D, selector: &str) -> Option<String> {
    let text = dom.text(&dom.query(selector)?).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Build a snapshot of the current product, or `None` when no price is on the page
pub fn extract_product<D: Dom>(
    dom: &D,
    selectors: &SelectorProfile,
    url: &str,
    now_ms: i64,
) -> Option<ProductSnapshot> {
    let Some(price) = selectors
        .price
        .iter()
        .find_map(|lookup| lookup_price(dom, lookup))
    else {
        log::debug!("[Price Tracker] Could not find price using known selectors");
        return None;
    };

    let title = trimmed_text(dom, selectors.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let sku = trimmed_text(dom, selectors.sku).unwrap_or_default();

    log::debug!("[Price Tracker] Extracted {} ({}) at {}", title, sku, price);

    Some(ProductSnapshot {
        url: url.to_string(),
        title,
        sku,
        price,
        timestamp: now_ms,
    })
}

fn resolve_anchor<D: Dom>(dom: &D, anchor: &Anchor) -> Option<D::Node> {
    match anchor {
        Anchor::Element(selector) => dom.query(selector),
        Anchor::ParentOf(selector) => dom.query(selector).and_then(|node| dom.parent(&node)),
        Anchor::Containing { selector, marker } => dom
            .query_all(selector)
            .into_iter()
            .find(|node| dom.text(node).contains(marker)),
    }
}

/// Find the container the buttons go into, with the name of the strategy that found it
pub fn find_insertion_point<'a, D: Dom>(
    dom: &D,
    strategies: &'a [InsertionStrategy],
) -> Option<(&'a InsertionStrategy, D::Node)> {
    strategies
        .iter()
        .find_map(|strategy| resolve_anchor(dom, &strategy.anchor).map(|node| (strategy, node)))
}

/// What to search the site for when looking for bundles containing this product
pub fn bundle_search_term(sku: &str, title: &str) -> String {
    let sku = sku.trim();
    if !sku.is_empty() {
        return sku.to_string();
    }

    title.split('|').next().unwrap_or_default().trim().to_string()
}

/// Site search URL for the bundle button
pub fn bundle_search_url(config: &TrackerConfig, sku: &str, title: &str) -> crate::error::Result<Url> {
    let mut url = Url::parse(&config.site_origin)?.join(&config.search_path)?;
    url.query_pairs_mut()
        .append_pair("query", &bundle_search_term(sku, title));
    Ok(url)
}
