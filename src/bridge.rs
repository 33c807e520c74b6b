/// Extension APIs reached through the JS glue module
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::TrackerConfig;
use crate::error::{self, TrackerError, describe_js};
use crate::storage::{StoreBackend, TrackedStore};

#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = exportToFile)]
    fn export_to_file(data: &str, filename: &str);
}

/// The tracked-product mapping under one `chrome.storage.local` key
pub struct ChromeStore {
    key: String,
}

impl ChromeStore {
    pub fn new(key: impl Into<String>) -> Self {
        ChromeStore { key: key.into() }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.storage_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl StoreBackend for ChromeStore {
    /// A missing key is an empty store
    async fn load(&self) -> error::Result<TrackedStore> {
        let stored = getStorage(&self.key)
            .await
            .map_err(|e| TrackerError::StorageRead(describe_js(&e)))?;

        if stored.is_null() || stored.is_undefined() {
            return Ok(TrackedStore::new());
        }

        serde_wasm_bindgen::from_value(stored).map_err(|e| TrackerError::Decode(e.to_string()))
    }

    async fn save(&self, store: &TrackedStore) -> error::Result<()> {
        // Plain objects, not JS Maps, so chrome.storage can persist them
        let value = store
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| TrackerError::Encode(e.to_string()))?;

        setStorage(&self.key, value)
            .await
            .map_err(|e| TrackerError::StorageWrite(describe_js(&e)))
    }
}

/// Open a URL in a new browser tab
pub async fn open_tab(url: &str) -> error::Result<()> {
    openTab(url).await.map_err(|e| TrackerError::Dom(describe_js(&e)))
}

/// Offer a JSON document as a file download
pub fn download_json(data: &str, filename: &str) {
    export_to_file(data, filename);
}
