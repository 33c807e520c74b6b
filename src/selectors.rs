/// Selector tables for the 4WD Supacentre product page markup
///
/// Everything here is tied to the site's generated class names
/// (`calcFreightTotal-*`, `integerOriginal-*`), so it is expected to break
/// when the site is redeployed. Lookups are ordered: first match wins.

/// How to find the integer price on the page
#[derive(Debug, Clone, PartialEq)]
pub enum PriceLookup {
    /// Find `container` first, then `value` inside it
    Nested {
        container: &'static str,
        value: &'static str,
    },
    /// Find `value` anywhere in the document
    Anywhere { value: &'static str },
}

/// How to resolve an element to insert the buttons into
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// The first element matching the selector
    Element(&'static str),
    /// The parent of the first element matching the selector
    ParentOf(&'static str),
    /// The first element matching `selector` whose text contains `marker`
    Containing {
        selector: &'static str,
        marker: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertionStrategy {
    pub name: &'static str,
    pub anchor: Anchor,
}

impl InsertionStrategy {
    pub const fn new(name: &'static str, anchor: Anchor) -> Self {
        InsertionStrategy { name, anchor }
    }
}

pub const ADD_TO_CART: &str = r#"button[type="submit"]"#;

pub const PRICE_LOOKUPS: &[PriceLookup] = &[
    PriceLookup::Nested {
        container: r#"[class*="calcFreightTotal"]"#,
        value: r#"[class*="integerOriginal"]"#,
    },
    PriceLookup::Anywhere {
        value: r#"[class*="integerOriginal"]"#,
    },
];

pub const INSERTION_STRATEGIES: &[InsertionStrategy] = &[
    InsertionStrategy::new("product-add-form", Anchor::Element(".product-add-form")),
    InsertionStrategy::new("add-to-cart-parent", Anchor::ParentOf(ADD_TO_CART)),
    InsertionStrategy::new(
        "add-to-cart-form",
        Anchor::Containing {
            selector: "form",
            marker: "ADD TO CART",
        },
    ),
    InsertionStrategy::new(
        "product-info",
        Anchor::Element(".product-info-main, .product-info, .product-details"),
    ),
    InsertionStrategy::new("heading-parent", Anchor::ParentOf("h1")),
];

/// Where the history panel goes, in order of preference
pub const PANEL_ANCHORS: &[&str] = &[".page-title", "h1"];

/// All selectors the content script uses, grouped so they can be swapped in tests
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorProfile {
    pub price: Vec<PriceLookup>,
    pub title: &'static str,
    pub sku: &'static str,
    pub add_to_cart: &'static str,
    pub insertion: Vec<InsertionStrategy>,
    pub panel_anchors: Vec<&'static str>,
}

impl Default for SelectorProfile {
    fn default() -> Self {
        SelectorProfile {
            price: PRICE_LOOKUPS.to_vec(),
            title: "h1",
            sku: r#"[class*="sku"]"#,
            add_to_cart: ADD_TO_CART,
            insertion: INSERTION_STRATEGIES.to_vec(),
            panel_anchors: PANEL_ANCHORS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_order() {
        let profile = SelectorProfile::default();
        let names: Vec<&str> = profile.insertion.iter().map(|s| s.name).collect();

        assert_eq!(
            names,
            vec![
                "product-add-form",
                "add-to-cart-parent",
                "add-to-cart-form",
                "product-info",
                "heading-parent",
            ]
        );
        assert!(matches!(profile.price[0], PriceLookup::Nested { .. }));
        assert!(matches!(profile.price[1], PriceLookup::Anywhere { .. }));
    }
}
