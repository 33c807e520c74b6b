/// 4WD Price Tracker - Chrome Extension for 4WD Supacentre price history
/// Built with Rust + WASM + Yew

mod bridge;
pub mod config;
pub mod content;
pub mod dom;
pub mod error;
pub mod extract;
pub mod navigation;
pub mod page;
pub mod product;
pub mod retry;
pub mod selectors;
pub mod storage;
pub mod ui;

use wasm_bindgen::prelude::*;

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export page classification for JavaScript access
#[wasm_bindgen]
pub fn is_product_page(url: &str) -> bool {
    page::is_product_url(url)
}

// Start the content script on a store page
#[wasm_bindgen]
pub fn start_content() {
    if let Err(e) = content::start(config::TrackerConfig::default()) {
        log::error!("[Price Tracker] Failed to start: {}", e);
    }
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
