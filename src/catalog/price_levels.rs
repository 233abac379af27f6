//! Per-item price levels held by the retail catalog.
use thiserror::Error;

use super::model::{ExtItemPriceLevel, ItemPriceLevel};
use super::CatalogApi;
use crate::http::ApiError;

pub const INVALID_PRICE_LEVEL: &str =
    "Please select a valid Price Level and enter a valid Price.";

#[derive(Debug, Error)]
pub enum PriceLevelError {
    #[error("{INVALID_PRICE_LEVEL}")]
    Invalid,
    #[error("Error when creating Price Level. Please check the values and try again.")]
    Rejected,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Price levels of one item, addressed through a head-office token.
pub struct PriceLevels<'a> {
    catalog: &'a dyn CatalogApi,
    public_token: String,
    item_id: i64,
}

impl<'a> PriceLevels<'a> {
    pub fn new(catalog: &'a dyn CatalogApi, public_token: impl Into<String>, item_id: i64) -> Self {
        Self {
            catalog,
            public_token: public_token.into(),
            item_id,
        }
    }

    fn wrap(&self, level: ItemPriceLevel) -> ExtItemPriceLevel {
        ExtItemPriceLevel {
            public_token: self.public_token.clone(),
            item_price_level: level,
        }
    }

    pub async fn list(&self) -> Result<Vec<ItemPriceLevel>, ApiError> {
        self.catalog
            .item_price_levels(&self.public_token, self.item_id)
            .await
    }

    /// Create a level; level 0 or a non-positive price never reaches the catalog.
    pub async fn create(&self, price_level: i64, price: f64) -> Result<ItemPriceLevel, PriceLevelError> {
        if price_level == 0 || price <= 0.0 {
            return Err(PriceLevelError::Invalid);
        }
        let level = ItemPriceLevel {
            item_id: self.item_id,
            price_level,
            price,
            ..Default::default()
        };
        if !self.catalog.create_item_price_level(&self.wrap(level.clone())).await? {
            return Err(PriceLevelError::Rejected);
        }
        Ok(level)
    }

    pub async fn update(&self, price_level: i64, price: f64) -> Result<bool, ApiError> {
        let level = ItemPriceLevel {
            item_id: self.item_id,
            price_level,
            price,
            ..Default::default()
        };
        self.catalog.update_item_price_level(&self.wrap(level)).await
    }

    pub async fn delete(&self, price_level: i64) -> Result<bool, ApiError> {
        let level = ItemPriceLevel {
            item_id: self.item_id,
            price_level,
            ..Default::default()
        };
        self.catalog.delete_item_price_level(&self.wrap(level)).await
    }
}
