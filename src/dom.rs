/// Read-only view of a page document
///
/// The extractor and insertion search only need a handful of queries, so
/// they are written against this trait and run unchanged against the real
/// `web_sys::Document` or an in-memory page in tests.
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

pub trait Dom {
    type Node: Clone;

    /// First element matching a CSS selector
    fn query(&self, selector: &str) -> Option<Self::Node>;

    /// All elements matching a CSS selector, in document order
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// First descendant of `scope` matching a CSS selector
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Text content of a node
    fn text(&self, node: &Self::Node) -> String;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
}

/// The live browser document
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        WebDom { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };

        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }
}
