/// Detecting single-page navigations on the store
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{History, Window};

use crate::error::{Result, TrackerError, dom_error};

/// Remembers the last URL seen; only a different URL counts as a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlWatcher {
    current: String,
}

impl UrlWatcher {
    pub fn new(initial: impl Into<String>) -> Self {
        UrlWatcher {
            current: initial.into(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Returns true (and remembers `href`) when it differs from the current URL
    pub fn observe(&mut self, href: &str) -> bool {
        if href == self.current {
            return false;
        }

        log::info!("[Price Tracker] URL changed from {} to {}", self.current, href);
        self.current = href.to_string();
        true
    }
}

/// Replace `history[name]` with a wrapper that runs the original, then `after`
fn wrap_history_method(history: &History, name: &str, after: Rc<dyn Fn()>) -> Result<()> {
    let original: Function = Reflect::get(history, &JsValue::from_str(name))
        .map_err(dom_error)?
        .dyn_into()
        .map_err(|_| TrackerError::Dom(format!("history.{} is not a function", name)))?;
    let target: JsValue = history.clone().into();

    let wrapper = Closure::<dyn Fn(JsValue, JsValue, JsValue) -> std::result::Result<JsValue, JsValue>>::new(
        move |state: JsValue, unused: JsValue, url: JsValue| {
            let result = original.call3(&target, &state, &unused, &url)?;
            after();
            Ok(result)
        },
    );

    Reflect::set(history, &JsValue::from_str(name), wrapper.as_ref()).map_err(dom_error)?;
    // The page keeps calling the wrapper for its whole lifetime
    wrapper.forget();
    Ok(())
}

/// Call `on_navigate` after every pushState, replaceState and back/forward
pub fn install(window: &Window, on_navigate: Rc<dyn Fn()>) -> Result<()> {
    let history = window.history().map_err(dom_error)?;
    wrap_history_method(&history, "pushState", on_navigate.clone())?;
    wrap_history_method(&history, "replaceState", on_navigate.clone())?;

    let on_popstate = Closure::<dyn Fn()>::new(move || on_navigate());
    window
        .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    on_popstate.forget();

    Ok(())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    fn call_history(window: &Window, name: &str, url: &str) {
        let history = window.history().unwrap();
        let method: Function = Reflect::get(&history, &JsValue::from_str(name))
            .unwrap()
            .dyn_into()
            .unwrap();
        method
            .call3(&history, &JsValue::NULL, &JsValue::from_str(""), &JsValue::from_str(url))
            .unwrap();
    }

    #[wasm_bindgen_test]
    fn wrapped_history_calls_through_and_notifies() {
        let window = web_sys::window().unwrap();
        let calls = Rc::new(Cell::new(0u32));
        let counter = calls.clone();

        install(&window, Rc::new(move || counter.set(counter.get() + 1))).unwrap();

        call_history(&window, "pushState", "?awning=1");
        assert_eq!(calls.get(), 1);
        assert_eq!(window.location().search().unwrap(), "?awning=1");

        call_history(&window, "replaceState", "?awning=2");
        assert_eq!(calls.get(), 2);
        assert_eq!(window.location().search().unwrap(), "?awning=2");
    }
}
