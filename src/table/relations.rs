//! Which user may work on which store.
use async_trait::async_trait;
use std::sync::Arc;

use super::{EntityTable, RowValidator, TableError};
use crate::admin::model::{User, UserStoreRelation};
use crate::admin::AdminApi;
use crate::cache::{Entity, EntitySource};
use crate::edit::Editable;
use crate::http::ApiError;
use crate::validation::{self, FieldErrors};

pub type RelationTable = EntityTable<UserStoreRelation, RelationSource, RelationValidator>;

impl Entity for UserStoreRelation {
    type Id = i64;
    const BUCKET: &'static str = "relations";

    fn id(&self) -> Option<i64> {
        (self.relation_id != 0).then_some(self.relation_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationField {
    UserId(String),
    StoreId(String),
}

impl Editable for UserStoreRelation {
    type Field = RelationField;

    fn field_name(field: &RelationField) -> &'static str {
        match field {
            RelationField::UserId(_) => "UserID",
            RelationField::StoreId(_) => "StoreID",
        }
    }

    fn apply(&mut self, field: RelationField) {
        match field {
            RelationField::UserId(v) => self.user_id = v,
            RelationField::StoreId(v) => self.store_id = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<RelationField, String> {
        let value = value.trim().to_string();
        match name {
            "UserID" => Ok(RelationField::UserId(value)),
            "StoreID" => Ok(RelationField::StoreId(value)),
            other => Err(format!("unknown relation field {other}")),
        }
    }
}

pub struct RelationSource {
    admin: Arc<dyn AdminApi>,
    me: User,
}

impl RelationSource {
    pub fn new(admin: Arc<dyn AdminApi>, me: User) -> Self {
        Self { admin, me }
    }
}

#[async_trait]
impl EntitySource<UserStoreRelation> for RelationSource {
    async fn fetch(&self) -> Result<Vec<UserStoreRelation>, ApiError> {
        let me = self.me.user_id.as_deref().unwrap_or_default();
        self.admin.my_relations(me).await
    }

    async fn create(&self, entity: &UserStoreRelation) -> Result<bool, ApiError> {
        self.admin.create_relation(entity).await
    }

    async fn update(&self, batch: &[UserStoreRelation]) -> Result<bool, ApiError> {
        self.admin.update_relations(batch).await
    }

    async fn delete(&self, id: &i64) -> Result<bool, ApiError> {
        Ok(self.admin.delete_relation(*id).await? > 0)
    }
}

#[derive(Debug, Default)]
pub struct RelationValidator;

#[async_trait]
impl RowValidator<UserStoreRelation> for RelationValidator {
    async fn validate_field(
        &self,
        _original: &UserStoreRelation,
        field: &RelationField,
    ) -> Result<Option<String>, ApiError> {
        Ok(match field {
            RelationField::UserId(v) | RelationField::StoreId(v) => validation::required(v),
        })
    }

    async fn validate_new(&self, mut relation: UserStoreRelation) -> Result<UserStoreRelation, TableError> {
        relation.relation_id = 0;
        let mut errors = FieldErrors::new();
        errors
            .check("UserID", validation::required(&relation.user_id))
            .check("StoreID", validation::required(&relation.store_id));
        errors.into_result(relation).map_err(TableError::Invalid)
    }
}

pub fn relation_table(admin: Arc<dyn AdminApi>, me: User) -> RelationTable {
    EntityTable::new(RelationSource::new(admin, me), RelationValidator)
}
