//! Items as the retail catalog holds them, searched by name or number.
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::items::{ItemField, ItemValidator};
use super::{EntityTable, RowValidator, TableError};
use crate::admin::model::{CatalogItem, ExtItems, User};
use crate::admin::AdminApi;
use crate::cache::{Entity, EntitySource};
use crate::catalog::CatalogApi;
use crate::edit::Editable;
use crate::http::ApiError;
use crate::send::outbound_item;

pub type CatalogItemTable = EntityTable<CatalogItem, CatalogItemSource, ItemValidator>;

impl Entity for CatalogItem {
    type Id = i64;
    const BUCKET: &'static str = "catalog_items";

    fn id(&self) -> Option<i64> {
        (self.0.item_id != 0).then_some(self.0.item_id)
    }
}

impl Editable for CatalogItem {
    type Field = ItemField;

    fn field_name(field: &ItemField) -> &'static str {
        field.name()
    }

    fn apply(&mut self, field: ItemField) {
        field.apply_to(&mut self.0);
    }

    fn parse_field(name: &str, value: &str) -> Result<ItemField, String> {
        ItemField::parse(name, value)
    }
}

/// Search terms for the catalog grid; empty terms match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub item_name: String,
    pub item_number: String,
}

pub struct CatalogItemSource {
    admin: Arc<dyn AdminApi>,
    catalog: Arc<dyn CatalogApi>,
    head_office_token: String,
    filter: RwLock<ItemFilter>,
}

impl CatalogItemSource {
    pub fn new(
        admin: Arc<dyn AdminApi>,
        catalog: Arc<dyn CatalogApi>,
        head_office_token: impl Into<String>,
    ) -> Self {
        Self {
            admin,
            catalog,
            head_office_token: head_office_token.into(),
            filter: RwLock::new(ItemFilter::default()),
        }
    }

    /// Takes effect on the next refresh.
    pub async fn set_filter(&self, filter: ItemFilter) {
        *self.filter.write().await = filter;
    }

    pub async fn filter(&self) -> ItemFilter {
        self.filter.read().await.clone()
    }
}

#[async_trait]
impl EntitySource<CatalogItem> for CatalogItemSource {
    async fn fetch(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let filter = self.filter().await;
        let items = self
            .catalog
            .search_items(&self.head_office_token, &filter.item_name, &filter.item_number)
            .await?;
        Ok(items.into_iter().map(CatalogItem).collect())
    }

    /// New rows are drafted on the admin side and pushed later.
    async fn create(&self, entity: &CatalogItem) -> Result<bool, ApiError> {
        self.admin.create_items(std::slice::from_ref(&entity.0)).await
    }

    /// Edits go straight to the catalog, keyed by the catalog's own item id.
    async fn update(&self, batch: &[CatalogItem]) -> Result<bool, ApiError> {
        let now = Utc::now();
        let ext_items = batch
            .iter()
            .map(|c| {
                let mut item = outbound_item(&c.0, now);
                item.sd_item_id = Some(c.0.item_id);
                item.last_action = c.0.last_action.clone();
                item
            })
            .collect();
        let payload = ExtItems {
            public_key: self.head_office_token.clone(),
            ext_items,
        };
        let responses = self.catalog.post_items(&payload).await?;
        for res in responses.iter().filter(|r| !r.succeeded()) {
            warn!(item_id = res.ext_item_id, status = %res.status, message = %res.message, "catalog rejected item");
        }
        Ok(!responses.is_empty() && responses.iter().all(|r| r.succeeded()))
    }

    async fn delete(&self, id: &i64) -> Result<bool, ApiError> {
        self.admin.delete_item(*id).await
    }
}

#[async_trait]
impl RowValidator<CatalogItem> for ItemValidator {
    async fn validate_field(&self, original: &CatalogItem, field: &ItemField) -> Result<Option<String>, ApiError> {
        self.check(&original.0, field).await
    }

    async fn validate_new(&self, item: CatalogItem) -> Result<CatalogItem, TableError> {
        self.prepare_new(item.0).map(CatalogItem)
    }
}

pub fn catalog_item_table(
    admin: Arc<dyn AdminApi>,
    catalog: Arc<dyn CatalogApi>,
    me: &User,
    head_office_token: &str,
) -> CatalogItemTable {
    EntityTable::new(
        CatalogItemSource::new(admin, catalog.clone(), head_office_token),
        ItemValidator::new(catalog, head_office_token, me.user_id.clone()),
    )
}
