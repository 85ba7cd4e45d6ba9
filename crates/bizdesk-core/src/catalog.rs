//! # Catalog & Stock
//!
//! Sellable items and the stock rules applied to them.
//!
//! ## Stock Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tracked Item Stock                                 │
//! │                                                                         │
//! │  add_item(stock: 5)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  deduct(3) ──► stock 2 ──► crosses "low"?  ──► alert signal             │
//! │       │                                                                 │
//! │  deduct(9) ──► stock 0 (floored) ──► item deactivated, "out" alert      │
//! │       │                                                                 │
//! │  replenish(4) ──► stock 4 ──► item reactivated (always)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Untracked items (`stock: None`) are always available and ignore
//! deduct/replenish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::business::{BusinessSegment, StockAlertConfig};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_category_name, validate_item_name, validate_price};

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category: String,
    /// `None` means inventory is not controlled for this item.
    pub stock: Option<i64>,
    /// Per-item low-stock threshold; falls back to the tenant default.
    pub low_stock_threshold: Option<i64>,
    pub segment: BusinessSegment,
    pub is_available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    #[inline]
    pub fn is_tracked(&self) -> bool {
        self.stock.is_some()
    }

    /// Current severity tier, if the item is tracked and below threshold.
    pub fn severity(&self, config: &StockAlertConfig) -> Option<StockSeverity> {
        let stock = self.stock?;
        let threshold = self.low_stock_threshold.unwrap_or(config.default_threshold);
        StockSeverity::classify(stock, threshold, config.critical_pct)
    }

    fn alert(&self, config: &StockAlertConfig) -> Option<StockAlert> {
        let severity = self.severity(config)?;
        Some(StockAlert {
            item_id: self.id.clone(),
            name: self.name.clone(),
            stock: self.stock.unwrap_or(0),
            threshold: self.low_stock_threshold.unwrap_or(config.default_threshold),
            severity,
        })
    }
}

/// Payload for creating a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCatalogItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    pub category: String,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    pub segment: BusinessSegment,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
    pub is_available: Option<bool>,
    pub low_stock_threshold: Option<i64>,
}

/// A catalog category, persisted under `categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub segment: BusinessSegment,
}

impl Category {
    pub fn new(name: &str, segment: BusinessSegment) -> CoreResult<Self> {
        validate_category_name(name)?;
        Ok(Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            segment,
        })
    }
}

/// Alert tiers, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockSeverity {
    Low,
    Critical,
    Out,
}

impl StockSeverity {
    /// Classifies a stock level against a threshold.
    ///
    /// ```rust
    /// use bizdesk_core::catalog::StockSeverity;
    ///
    /// assert_eq!(StockSeverity::classify(0, 10, 50), Some(StockSeverity::Out));
    /// assert_eq!(StockSeverity::classify(5, 10, 50), Some(StockSeverity::Critical));
    /// assert_eq!(StockSeverity::classify(8, 10, 50), Some(StockSeverity::Low));
    /// assert_eq!(StockSeverity::classify(11, 10, 50), None);
    /// ```
    pub fn classify(stock: i64, threshold: i64, critical_pct: u8) -> Option<StockSeverity> {
        if stock <= 0 {
            return Some(StockSeverity::Out);
        }
        let critical_limit = threshold * critical_pct as i64 / 100;
        if stock <= critical_limit {
            Some(StockSeverity::Critical)
        } else if stock <= threshold {
            Some(StockSeverity::Low)
        } else {
            None
        }
    }
}

/// A tracked item at or below its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub item_id: String,
    pub name: String,
    pub stock: i64,
    pub threshold: i64,
    pub severity: StockSeverity,
}

/// Outcome of a deduct or replenish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub item_id: String,
    pub previous: Option<i64>,
    pub current: Option<i64>,
    /// Hit zero on this deduction and was switched off.
    pub deactivated: bool,
    /// Raised only when the item moved into a worse tier.
    pub alert: Option<StockAlert>,
    pub reason: Option<String>,
}

/// The catalog container, persisted under `catalog`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
}

fn positive_quantity(qty: i64) -> CoreResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    Ok(())
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Catalog { items }
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: &str) -> CoreResult<&mut CatalogItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Adds a validated item and returns it.
    pub fn add(&mut self, new: NewCatalogItem) -> CoreResult<CatalogItem> {
        validate_item_name(&new.name)?;
        validate_price(new.price)?;
        validate_category_name(&new.category)?;
        if matches!(new.stock, Some(s) if s < 0) {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let now = Utc::now();
        let item = CatalogItem {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            price: new.price,
            category: new.category.trim().to_string(),
            stock: new.stock,
            low_stock_threshold: new.low_stock_threshold,
            segment: new.segment,
            is_available: new.stock != Some(0),
            created_at: now,
            updated_at: now,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Applies a partial update.
    pub fn update(&mut self, id: &str, update: CatalogItemUpdate) -> CoreResult<CatalogItem> {
        if let Some(name) = &update.name {
            validate_item_name(name)?;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }
        if let Some(category) = &update.category {
            validate_category_name(category)?;
        }

        let item = self.get_mut(id)?;
        if let Some(name) = update.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        if let Some(category) = update.category {
            item.category = category.trim().to_string();
        }
        if let Some(available) = update.is_available {
            item.is_available = available;
        }
        if update.low_stock_threshold.is_some() {
            item.low_stock_threshold = update.low_stock_threshold;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    /// Removes an item. Orders keep their own snapshot of name and price.
    pub fn remove(&mut self, id: &str) -> CoreResult<CatalogItem> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;
        Ok(self.items.remove(pos))
    }

    /// True if the item is untracked or has at least `qty` in stock.
    /// False if the item does not exist.
    pub fn check_availability(&self, id: &str, qty: i64) -> bool {
        match self.get(id) {
            Some(item) => item.stock.map(|s| s >= qty).unwrap_or(true),
            None => false,
        }
    }

    /// Removes `qty` from tracked stock, flooring at zero.
    ///
    /// Reaching zero switches the item off. An alert is attached when the
    /// item falls into a worse severity tier than before.
    pub fn deduct(
        &mut self,
        id: &str,
        qty: i64,
        config: &StockAlertConfig,
    ) -> CoreResult<StockAdjustment> {
        positive_quantity(qty)?;
        let item = self.get_mut(id)?;

        let Some(previous) = item.stock else {
            return Ok(StockAdjustment {
                item_id: item.id.clone(),
                previous: None,
                current: None,
                deactivated: false,
                alert: None,
                reason: None,
            });
        };

        let before = item.severity(config);
        let current = (previous - qty).max(0);
        item.stock = Some(current);
        item.updated_at = Utc::now();

        let deactivated = current == 0 && item.is_available;
        if current == 0 {
            item.is_available = false;
        }

        let alert = if item.severity(config) > before {
            item.alert(config)
        } else {
            None
        };

        Ok(StockAdjustment {
            item_id: item.id.clone(),
            previous: Some(previous),
            current: Some(current),
            deactivated,
            alert,
            reason: None,
        })
    }

    /// Adds `qty` back to tracked stock and reactivates the item.
    ///
    /// Reactivation is unconditional: an item switched off by hand comes
    /// back too.
    pub fn replenish(
        &mut self,
        id: &str,
        qty: i64,
        reason: Option<&str>,
    ) -> CoreResult<StockAdjustment> {
        positive_quantity(qty)?;
        let item = self.get_mut(id)?;

        let previous = item.stock;
        if let Some(stock) = item.stock {
            item.stock = Some(stock.saturating_add(qty));
        }
        item.is_available = true;
        item.updated_at = Utc::now();

        Ok(StockAdjustment {
            item_id: item.id.clone(),
            previous,
            current: item.stock,
            deactivated: false,
            alert: None,
            reason: reason.map(str::to_string),
        })
    }

    /// Scans every tracked item; most severe first, then lowest stock.
    pub fn stock_alerts(&self, config: &StockAlertConfig) -> Vec<StockAlert> {
        let mut alerts: Vec<StockAlert> =
            self.items.iter().filter_map(|i| i.alert(config)).collect();
        alerts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(a.stock.cmp(&b.stock))
                .then_with(|| a.name.cmp(&b.name))
        });
        alerts
    }
}
