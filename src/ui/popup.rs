/// Popup dashboard listing every tracked product

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use patternfly_yew::prelude::*;
use crate::bridge::{ChromeStore, download_json, open_tab};
use crate::config::TrackerConfig;
use crate::storage::{StoreBackend, TrackedStore, export_filename, modify_store};
use crate::ui::components::ProductCard;

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Idle,
    Error(String),
}

/// Same storage key the content script writes to
fn backend() -> ChromeStore {
    ChromeStore::from_config(&TrackerConfig::default())
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let store = use_state(TrackedStore::new);

    // Load tracked products on mount
    {
        let state = state.clone();
        let store = store.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match backend().load().await {
                    Ok(data) => {
                        store.set(data);
                        state.set(PopupState::Idle);
                    }
                    Err(e) => {
                        state.set(PopupState::Error(e.to_string()));
                    }
                }
            });
            || ()
        });
    }

    // Open the product page in a new tab
    let on_view = {
        let state = state.clone();

        Callback::from(move |url: String| {
            let state = state.clone();
            spawn_local(async move {
                if let Err(e) = open_tab(&url).await {
                    state.set(PopupState::Error(format!("Failed to open tab: {}", e)));
                }
            });
        })
    };

    // Remove a single product
    let on_remove = {
        let state = state.clone();
        let store = store.clone();

        Callback::from(move |url: String| {
            let state = state.clone();
            let store = store.clone();

            spawn_local(async move {
                match modify_store(&backend(), |data| data.untrack(&url)).await {
                    Ok((_, data)) => store.set(data),
                    Err(e) => state.set(PopupState::Error(e.to_string())),
                }
            });
        })
    };

    // Remove everything, after asking
    let on_clear = {
        let state = state.clone();
        let store = store.clone();

        Callback::from(move |_: MouseEvent| {
            if !confirm("Are you sure you want to remove all tracked products?") {
                return;
            }

            let state = state.clone();
            let store = store.clone();
            spawn_local(async move {
                let cleared = modify_store(&backend(), |data| {
                    let had_entries = !data.is_empty();
                    data.clear();
                    had_entries
                })
                .await;

                match cleared {
                    Ok((_, data)) => store.set(data),
                    Err(e) => state.set(PopupState::Error(e.to_string())),
                }
            });
        })
    };

    // Download the whole store as JSON
    let on_export = {
        let store = store.clone();

        Callback::from(move |_: MouseEvent| {
            match store.export_json() {
                Ok(json) => {
                    let filename = export_filename(js_sys::Date::now() as i64);
                    download_json(&json, &filename);
                }
                Err(e) => {
                    log::error!("Export failed: {}", e);
                }
            }
        })
    };

    let is_busy = matches!(*state, PopupState::Loading);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"4WD Price Tracker"}</h1>

            <div class="popup-actions">
                <Button onclick={on_export} disabled={is_busy} variant={ButtonVariant::Secondary}>
                    {"📥 Export"}
                </Button>
                <Button onclick={on_clear} disabled={is_busy || store.is_empty()} variant={ButtonVariant::Danger}>
                    {"🗑️ Clear All"}
                </Button>
            </div>

            // Status display
            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading tracked products..."}</p>
                    </div>
                },
                PopupState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                PopupState::Idle => html! {}
            }}

            if store.is_empty() {
                if !is_busy {
                    <div id="empty-state" class="empty-state">
                        <p>{"No products tracked yet."}</p>
                        <p class="empty-state-hint">
                            {"Open a product page and click \"Track This Price\"."}
                        </p>
                    </div>
                }
            } else {
                <div id="tracked-list" class="tracked-list">
                    {for store.by_most_recent().into_iter().map(|(url, product)| html! {
                        <ProductCard
                            key={url.to_string()}
                            url={url.to_string()}
                            product={product.clone()}
                            on_view={on_view.clone()}
                            on_remove={on_remove.clone()}
                        />
                    })}
                </div>
            }

            <p class="footer-popup">
                {format!("{} tracked products", store.len())}
            </p>
        </div>
    }
}
