/// Product page detection for 4WD Supacentre
use url::Url;

const PRODUCT_SUFFIX: &str = ".html";

/// Site pages that end in `.html` but are not products
const EXCLUDED_PATHS: &[&str] = &[
    "/stores.html",
    "/search.html",
    "/returns.html",
    "/payment-options.html",
    "/about-us.html",
];

/// Listing sections whose pages also end in `.html`
const EXCLUDED_SECTIONS: &[&str] = &["/stores/", "/tips-tricks-tech/"];

/// Decide whether a URL path points at a product page
///
/// Rules:
/// 1. The path must end in `.html`
/// 2. It must not be one of the fixed info pages
/// 3. It must not sit under a listing section
///
/// Examples:
/// - /adventure-kings-awning-2-5m.html → true
/// - /search.html → false
/// - /stores/brisbane.html → false
/// - /camping → false
pub fn is_product_path(path: &str) -> bool {
    if !path.ends_with(PRODUCT_SUFFIX) {
        return false;
    }

    if EXCLUDED_PATHS.contains(&path) {
        return false;
    }

    !EXCLUDED_SECTIONS
        .iter()
        .any(|section| path.contains(section))
}

/// Classify a full page URL; anything unparsable is not a product page
pub fn is_product_url(href: &str) -> bool {
    Url::parse(href)
        .map(|url| is_product_path(url.path()))
        .unwrap_or(false)
}
