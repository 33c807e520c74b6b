/// Inline price-history panel shown under the product title
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::config::PANEL_ID;
use crate::error::{Result, dom_error};
use crate::product::{PricePoint, PriceStats, TrackedProduct, format_price};

/// Everything the panel displays, computed before touching the DOM
#[derive(Debug, Clone, PartialEq)]
pub struct PanelModel {
    pub stats: PriceStats,
    /// Newest first
    pub recent: Vec<PricePoint>,
}

impl PanelModel {
    pub fn new(product: &TrackedProduct, recent_entries: usize) -> Option<PanelModel> {
        let stats = product.stats()?;
        let recent = product
            .price_history
            .iter()
            .rev()
            .take(recent_entries)
            .copied()
            .collect();

        Some(PanelModel { stats, recent })
    }

    /// Panel markup; `format_date` renders an epoch-millis timestamp
    pub fn to_html(&self, format_date: impl Fn(i64) -> String) -> String {
        let entries: String = self
            .recent
            .iter()
            .map(|point| {
                format!(
                    r#"<div class="price-entry"><span>{}</span><span class="date">{}</span></div>"#,
                    format_price(point.price),
                    format_date(point.timestamp)
                )
            })
            .collect();

        format!(
            r#"<h3>Price History</h3>
<div class="price-stats">
  <div class="stat"><span class="label">Current:</span><span class="value">{}</span></div>
  <div class="stat"><span class="label">Lowest:</span><span class="value lowest">{}</span></div>
  <div class="stat"><span class="label">Highest:</span><span class="value">{}</span></div>
</div>
<div class="price-list"><h4>Recent Prices:</h4>{}</div>"#,
            format_price(self.stats.current),
            format_price(self.stats.lowest),
            format_price(self.stats.highest),
            entries
        )
    }
}

/// Locale date for a timestamp, as the browser formats it
pub fn locale_date(timestamp: i64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(timestamp as f64));
    date.to_locale_date_string("default", &JsValue::UNDEFINED).into()
}

pub fn remove(document: &Document) {
    if let Some(existing) = document.get_element_by_id(PANEL_ID) {
        existing.remove();
    }
}

/// Replace any panel on the page with one for `model`.
/// Returns false when no anchor element exists to place it after.
pub fn render(document: &Document, anchors: &[&str], model: &PanelModel) -> Result<bool> {
    remove(document);

    let Some(anchor) = anchors
        .iter()
        .find_map(|selector| document.query_selector(selector).ok().flatten())
    else {
        log::debug!("[Price Tracker] No title element to place the price history after");
        return Ok(false);
    };

    let panel: Element = document.create_element("div").map_err(dom_error)?;
    panel.set_id(PANEL_ID);
    panel.set_class_name("price-history-display");
    panel.set_inner_html(&model.to_html(locale_date));

    anchor.after_with_node_1(&panel).map_err(dom_error)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(prices: &[f64]) -> TrackedProduct {
        TrackedProduct {
            title: "Kings Awning".to_string(),
            sku: String::new(),
            price_history: prices
                .iter()
                .enumerate()
                .map(|(i, price)| PricePoint {
                    price: *price,
                    timestamp: i as i64,
                })
                .collect(),
        }
    }

    #[test]
    fn test_model_lists_five_newest_first() {
        let model = PanelModel::new(&product(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]), 5).unwrap();

        let prices: Vec<f64> = model.recent.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![70.0, 60.0, 50.0, 40.0, 30.0]);
        assert_eq!(model.stats.lowest, 10.0);
        assert_eq!(model.stats.highest, 70.0);
    }

    #[test]
    fn test_model_short_history() {
        let model = PanelModel::new(&product(&[629.0]), 5).unwrap();
        assert_eq!(model.recent.len(), 1);
        assert_eq!(model.stats.current, 629.0);
    }

    #[test]
    fn test_model_empty_history() {
        assert_eq!(PanelModel::new(&product(&[]), 5), None);
    }

    #[test]
    fn test_html() {
        let model = PanelModel::new(&product(&[100.0, 90.0, 110.0]), 5).unwrap();
        let html = model.to_html(|ts| format!("day-{}", ts));

        assert!(html.contains(r#"<span class="value">$110.00</span>"#));
        assert!(html.contains(r#"<span class="value lowest">$90.00</span>"#));
        assert!(html.find("day-2").unwrap() < html.find("day-0").unwrap());
        assert_eq!(html.matches("price-entry").count(), 3);
    }
}
