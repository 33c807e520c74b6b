/// Data structures for tracked products
use serde::{Deserialize, Serialize};

/// One observed price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub price: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// A product the user has chosen to track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProduct {
    pub title: String,
    #[serde(default)]
    pub sku: String,
    pub price_history: Vec<PricePoint>,
}

impl TrackedProduct {
    pub fn new(title: String, sku: String, first: PricePoint) -> TrackedProduct {
        TrackedProduct {
            title,
            sku,
            price_history: vec![first],
        }
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.price_history.last()
    }

    pub fn latest_timestamp(&self) -> i64 {
        self.latest().map_or(i64::MIN, |p| p.timestamp)
    }

    /// Append a price unless it repeats the last recorded one
    pub fn push_price(&mut self, point: PricePoint) -> bool {
        match self.latest() {
            Some(last) if last.price == point.price => false,
            _ => {
                self.price_history.push(point);
                true
            }
        }
    }

    pub fn stats(&self) -> Option<PriceStats> {
        PriceStats::from_history(&self.price_history)
    }
}

/// What the extractor read from a product page
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub url: String,
    pub title: String,
    pub sku: String,
    pub price: f64,
    pub timestamp: i64,
}

impl ProductSnapshot {
    pub fn price_point(&self) -> PricePoint {
        PricePoint {
            price: self.price,
            timestamp: self.timestamp,
        }
    }
}

/// Summary shown in the panel and on popup cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub current: f64,
    pub lowest: f64,
    pub highest: f64,
}

impl PriceStats {
    pub fn from_history(history: &[PricePoint]) -> Option<PriceStats> {
        let current = history.last()?.price;
        let (lowest, highest) = history
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.price), hi.max(p.price))
            });

        Some(PriceStats {
            current,
            lowest,
            highest,
        })
    }
}

/// Format a price the way the panel and popup show it
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}
