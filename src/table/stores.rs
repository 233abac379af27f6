//! Stores linked to the logged-in account.
use async_trait::async_trait;
use std::sync::Arc;

use super::{EntityTable, RowAction, RowValidator, TableError};
use crate::admin::model::{Store, StoreCreation, User};
use crate::admin::AdminApi;
use crate::cache::{Entity, EntitySource};
use crate::catalog::CatalogApi;
use crate::edit::Editable;
use crate::guid::format_to_guid;
use crate::http::ApiError;
use crate::validation::{self, FieldErrors};

pub type StoreTable = EntityTable<Store, StoreSource, StoreValidator>;

impl Entity for Store {
    type Id = i64;
    const BUCKET: &'static str = "stores";

    fn id(&self) -> Option<i64> {
        (self.store_id != 0).then_some(self.store_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreField {
    StoreName(String),
    HeadOfficeName(String),
    StoreToken(String),
    HeadOfficeToken(String),
}

impl Editable for Store {
    type Field = StoreField;

    fn field_name(field: &StoreField) -> &'static str {
        match field {
            StoreField::StoreName(_) => "StoreName",
            StoreField::HeadOfficeName(_) => "HeadOfficeName",
            StoreField::StoreToken(_) => "StoreToken",
            StoreField::HeadOfficeToken(_) => "HeadOfficeToken",
        }
    }

    fn apply(&mut self, field: StoreField) {
        match field {
            StoreField::StoreName(v) => self.store_name = v,
            StoreField::HeadOfficeName(v) => self.head_office_name = v,
            StoreField::StoreToken(v) => self.store_token = v,
            StoreField::HeadOfficeToken(v) => self.head_office_token = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<StoreField, String> {
        let value = value.to_string();
        Ok(match name {
            "StoreName" => StoreField::StoreName(value),
            "HeadOfficeName" => StoreField::HeadOfficeName(value),
            "StoreToken" => StoreField::StoreToken(value),
            "HeadOfficeToken" => StoreField::HeadOfficeToken(value),
            other => return Err(format!("unknown store field {other}")),
        })
    }
}

/// GUID form of a token when it has enough characters, else the raw text.
fn guid_or_raw(token: String) -> String {
    format_to_guid(&token).unwrap_or(token)
}

pub struct StoreSource {
    admin: Arc<dyn AdminApi>,
    me: User,
}

impl StoreSource {
    pub fn new(admin: Arc<dyn AdminApi>, me: User) -> Self {
        Self { admin, me }
    }
}

#[async_trait]
impl EntitySource<Store> for StoreSource {
    async fn fetch(&self) -> Result<Vec<Store>, ApiError> {
        let me = self.me.user_id.as_deref().unwrap_or_default();
        self.admin.user_stores(me).await
    }

    async fn create(&self, entity: &Store) -> Result<bool, ApiError> {
        let creation = StoreCreation {
            new_store: entity.clone(),
            create_user: Some(self.me.clone()),
        };
        self.admin.create_store(&creation).await
    }

    async fn update(&self, batch: &[Store]) -> Result<bool, ApiError> {
        self.admin.update_stores(batch).await
    }

    async fn delete(&self, id: &i64) -> Result<bool, ApiError> {
        Ok(self.admin.delete_store(*id).await? > 0)
    }
}

/// Names are required; tokens must be GUIDs the retail catalog knows.
pub struct StoreValidator {
    catalog: Arc<dyn CatalogApi>,
    me: User,
}

impl StoreValidator {
    pub fn new(catalog: Arc<dyn CatalogApi>, me: User) -> Self {
        Self { catalog, me }
    }
}

#[async_trait]
impl RowValidator<Store> for StoreValidator {
    async fn validate_field(&self, _original: &Store, field: &StoreField) -> Result<Option<String>, ApiError> {
        match field {
            StoreField::StoreName(v) | StoreField::HeadOfficeName(v) => Ok(validation::required(v)),
            StoreField::StoreToken(v) | StoreField::HeadOfficeToken(v) => {
                validation::public_token(self.catalog.as_ref(), v).await
            }
        }
    }

    fn normalize(&self, field: StoreField) -> StoreField {
        match field {
            StoreField::StoreToken(v) => StoreField::StoreToken(guid_or_raw(v)),
            StoreField::HeadOfficeToken(v) => StoreField::HeadOfficeToken(guid_or_raw(v)),
            other => other,
        }
    }

    async fn validate_new(&self, mut store: Store) -> Result<Store, TableError> {
        store.store_id = 0;
        store.store_token = guid_or_raw(std::mem::take(&mut store.store_token));
        store.head_office_token = guid_or_raw(std::mem::take(&mut store.head_office_token));

        let catalog = self.catalog.as_ref();
        let mut errors = FieldErrors::new();
        errors
            .check("StoreName", validation::required(&store.store_name))
            .check("HeadOfficeName", validation::required(&store.head_office_name))
            .check(
                "StoreToken",
                validation::public_token(catalog, &store.store_token).await?,
            )
            .check(
                "HeadOfficeToken",
                validation::public_token(catalog, &store.head_office_token).await?,
            );
        errors.into_result(store).map_err(TableError::Invalid)
    }

    fn allows(&self, _action: RowAction) -> bool {
        self.me.role().is_some_and(|r| r.can_manage())
    }
}

pub fn store_table(admin: Arc<dyn AdminApi>, catalog: Arc<dyn CatalogApi>, me: User) -> StoreTable {
    EntityTable::new(
        StoreSource::new(admin, me.clone()),
        StoreValidator::new(catalog, me),
    )
}
