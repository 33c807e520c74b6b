/// The URL → tracked product mapping kept in chrome.storage.local
use std::fmt;
use std::future::Future;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::EXPORT_PREFIX;
use crate::error::Result;
use crate::product::{ProductSnapshot, TrackedProduct};

/// Root storage structure
///
/// Entries keep insertion order, which is also the key order of the JS
/// object the browser stores, so ties in the popup sort stay stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedStore {
    entries: Vec<(String, TrackedProduct)>,
}

impl TrackedStore {
    pub fn new() -> Self {
        TrackedStore {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&TrackedProduct> {
        self.entries
            .iter()
            .find(|(key, _)| key == url)
            .map(|(_, product)| product)
    }

    fn get_mut(&mut self, url: &str) -> Option<&mut TrackedProduct> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == url)
            .map(|(_, product)| product)
    }

    pub fn is_tracked(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedProduct)> {
        self.entries.iter().map(|(url, product)| (url.as_str(), product))
    }

    /// Start tracking the snapshot's URL, or add its price to an existing record.
    /// Returns true when a price point was appended.
    pub fn track(&mut self, snapshot: &ProductSnapshot) -> bool {
        if self.is_tracked(&snapshot.url) {
            return self.record_observation(snapshot);
        }

        self.entries.push((
            snapshot.url.clone(),
            TrackedProduct::new(
                snapshot.title.clone(),
                snapshot.sku.clone(),
                snapshot.price_point(),
            ),
        ));
        true
    }

    /// Record a revisit of an already tracked page. Untracked URLs are ignored.
    pub fn record_observation(&mut self, snapshot: &ProductSnapshot) -> bool {
        let Some(product) = self.get_mut(&snapshot.url) else {
            return false;
        };

        let appended = product.push_price(snapshot.price_point());
        if appended {
            product.title = snapshot.title.clone();
            if !snapshot.sku.is_empty() {
                product.sku = snapshot.sku.clone();
            }
        }
        appended
    }

    pub fn untrack(&mut self, url: &str) -> bool {
        let original_len = self.entries.len();
        self.entries.retain(|(key, _)| key != url);
        self.entries.len() < original_len
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries ordered newest price update first; ties keep insertion order
    pub fn by_most_recent(&self) -> Vec<(&str, &TrackedProduct)> {
        let mut products: Vec<(&str, &TrackedProduct)> = self.iter().collect();
        products.sort_by(|a, b| b.1.latest_timestamp().cmp(&a.1.latest_timestamp()));
        products
    }

    /// The whole store as pretty-printed JSON
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Where the whole mapping is read from and written back to
pub trait StoreBackend {
    fn load(&self) -> impl Future<Output = Result<TrackedStore>>;

    fn save(&self, store: &TrackedStore) -> impl Future<Output = Result<()>>;
}

/// Read the store, apply `change`, and write it back only if `change` reports
/// that it changed something. Returns the flag and the resulting store.
pub async fn modify_store<B: StoreBackend>(
    backend: &B,
    change: impl FnOnce(&mut TrackedStore) -> bool,
) -> Result<(bool, TrackedStore)> {
    let mut store = backend.load().await?;
    let changed = change(&mut store);
    if changed {
        backend.save(&store).await?;
    }
    Ok((changed, store))
}

/// Name of the downloaded export file
pub fn export_filename(now_ms: i64) -> String {
    format!("{}-{}.json", EXPORT_PREFIX, now_ms)
}

impl Serialize for TrackedStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(url, product)| (url, product)))
    }
}

impl<'de> Deserialize<'de> for TrackedStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = TrackedStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of product URLs to tracked products")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut store = TrackedStore::new();
                while let Some((url, product)) = map.next_entry::<String, TrackedProduct>()? {
                    // Records with no history break the invariant; drop them
                    if product.price_history.is_empty() {
                        continue;
                    }
                    store.entries.retain(|(key, _)| key != &url);
                    store.entries.push((url, product));
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    /// In-memory backend that counts writes
    #[derive(Default)]
    struct RecordingBackend {
        stored: RefCell<TrackedStore>,
        saves: Cell<usize>,
    }

    impl StoreBackend for RecordingBackend {
        async fn load(&self) -> Result<TrackedStore> {
            Ok(self.stored.borrow().clone())
        }

        async fn save(&self, store: &TrackedStore) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            *self.stored.borrow_mut() = store.clone();
            Ok(())
        }
    }

    const AWNING: &str = "https://www.4wdsupacentre.com.au/kings-awning.html";
    const FRIDGE: &str = "https://www.4wdsupacentre.com.au/kings-fridge.html";
    const SHOVEL: &str = "https://www.4wdsupacentre.com.au/recovery-shovel.html";

    fn snapshot(url: &str, price: f64, timestamp: i64) -> ProductSnapshot {
        ProductSnapshot {
            url: url.to_string(),
            title: "Adventure Kings Awning | 4WD Supacentre".to_string(),
            sku: "AK-AWN".to_string(),
            price,
            timestamp,
        }
    }

    #[test]
    fn test_storage_data_new() {
        let store = TrackedStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_track_creates_record() {
        let mut store = TrackedStore::new();

        assert!(store.track(&snapshot(AWNING, 629.0, 1)));

        let product = store.get(AWNING).unwrap();
        assert_eq!(product.price_history.len(), 1);
        assert_eq!(product.sku, "AK-AWN");
        assert!(store.is_tracked(AWNING));
    }

    #[test]
    fn test_track_twice_with_new_price_appends_in_order() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(AWNING, 629.0, 1));
        store.track(&snapshot(AWNING, 599.0, 2));

        let prices: Vec<f64> = store
            .get(AWNING)
            .unwrap()
            .price_history
            .iter()
            .map(|p| p.price)
            .collect();
        assert_eq!(prices, vec![629.0, 599.0]);
    }

    #[test]
    fn test_track_unchanged_price_appends_nothing() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(AWNING, 629.0, 1));

        assert!(!store.track(&snapshot(AWNING, 629.0, 2)));
        assert_eq!(store.get(AWNING).unwrap().price_history.len(), 1);
        assert_eq!(store.get(AWNING).unwrap().price_history[0].timestamp, 1);
    }

    #[test]
    fn test_record_observation_ignores_untracked() {
        let mut store = TrackedStore::new();

        assert!(!store.record_observation(&snapshot(AWNING, 629.0, 1)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_observation_refreshes_title() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(AWNING, 629.0, 1));

        let mut revisit = snapshot(AWNING, 549.0, 2);
        revisit.title = "Adventure Kings Awning 2.5m".to_string();
        revisit.sku = String::new();

        assert!(store.record_observation(&revisit));
        let product = store.get(AWNING).unwrap();
        assert_eq!(product.title, "Adventure Kings Awning 2.5m");
        assert_eq!(product.sku, "AK-AWN");
    }

    #[test]
    fn test_untrack_removes_key() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(AWNING, 629.0, 1));
        store.track(&snapshot(FRIDGE, 899.0, 2));

        assert!(store.untrack(AWNING));
        assert!(!store.is_tracked(AWNING));
        assert!(store.is_tracked(FRIDGE));
        assert!(!store.untrack(AWNING));
    }

    #[test]
    fn test_clear() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(AWNING, 629.0, 1));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.export_json().unwrap(), "{}");
    }

    #[test]
    fn test_by_most_recent() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(AWNING, 629.0, 100));
        store.track(&snapshot(FRIDGE, 899.0, 300));
        store.track(&snapshot(SHOVEL, 49.0, 200));
        // A later price moves the awning to the front
        store.track(&snapshot(AWNING, 599.0, 400));

        let order: Vec<&str> = store.by_most_recent().into_iter().map(|(url, _)| url).collect();
        assert_eq!(order, vec![AWNING, FRIDGE, SHOVEL]);
    }

    #[test]
    fn test_by_most_recent_ties_keep_insertion_order() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(SHOVEL, 49.0, 500));
        store.track(&snapshot(AWNING, 629.0, 500));
        store.track(&snapshot(FRIDGE, 899.0, 500));

        let order: Vec<&str> = store.by_most_recent().into_iter().map(|(url, _)| url).collect();
        assert_eq!(order, vec![SHOVEL, AWNING, FRIDGE]);
    }

    #[test]
    fn test_export_empty_store() {
        let json = TrackedStore::new().export_json().unwrap();
        assert_eq!(json, "{}");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(1_700_000_000_123),
            "4wd-price-tracker-1700000000123.json"
        );
    }

    #[test]
    fn test_serialization_keeps_key_order() {
        let mut store = TrackedStore::new();
        store.track(&snapshot(SHOVEL, 49.0, 1));
        store.track(&snapshot(AWNING, 629.0, 2));

        let json = store.export_json().unwrap();
        assert!(json.find(SHOVEL).unwrap() < json.find(AWNING).unwrap());

        let restored: TrackedStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn test_deserialize_stored_format() {
        let json = r#"{
            "https://www.4wdsupacentre.com.au/kings-fridge.html": {
                "title": "Kings 75L Fridge",
                "sku": "",
                "priceHistory": [
                    {"price": 899, "timestamp": 1700000000000},
                    {"price": 849, "timestamp": 1700086400000}
                ]
            },
            "https://www.4wdsupacentre.com.au/broken.html": {
                "title": "Broken",
                "priceHistory": []
            }
        }"#;

        let store: TrackedStore = serde_json::from_str(json).unwrap();

        assert_eq!(store.len(), 1);
        let fridge = store.get(FRIDGE).unwrap();
        assert_eq!(fridge.stats().unwrap().current, 849.0);
    }

    #[test]
    fn test_modify_store_skips_write_on_unchanged_revisit() {
        let backend = RecordingBackend::default();
        backend.stored.borrow_mut().track(&snapshot(AWNING, 629.0, 1));

        let (changed, _) =
            block_on(modify_store(&backend, |store| store.record_observation(&snapshot(AWNING, 629.0, 2))))
                .unwrap();

        assert!(!changed);
        assert_eq!(backend.saves.get(), 0);
    }

    #[test]
    fn test_modify_store_skips_write_for_untracked_page() {
        let backend = RecordingBackend::default();

        let (changed, store) =
            block_on(modify_store(&backend, |store| store.record_observation(&snapshot(FRIDGE, 899.0, 1))))
                .unwrap();

        assert!(!changed);
        assert!(store.is_empty());
        assert_eq!(backend.saves.get(), 0);
    }

    #[test]
    fn test_modify_store_writes_new_price() {
        let backend = RecordingBackend::default();
        backend.stored.borrow_mut().track(&snapshot(AWNING, 629.0, 1));

        let (changed, store) =
            block_on(modify_store(&backend, |store| store.record_observation(&snapshot(AWNING, 599.0, 2))))
                .unwrap();

        assert!(changed);
        assert_eq!(backend.saves.get(), 1);
        assert_eq!(store, *backend.stored.borrow());
        assert_eq!(backend.stored.borrow().get(AWNING).unwrap().price_history.len(), 2);
    }

    #[test]
    fn test_modify_store_untrack_missing_does_not_write() {
        let backend = RecordingBackend::default();

        let (changed, _) = block_on(modify_store(&backend, |store| store.untrack(AWNING))).unwrap();

        assert!(!changed);
        assert_eq!(backend.saves.get(), 0);
    }
}
