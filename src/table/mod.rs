//! Headless editable grids: a cached bucket, a row-edit buffer and a
//! validation gate composed over one entity type.
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::AuthError;
use crate::cache::{CachedRow, EntitySource, WriteThroughCache};
use crate::edit::{EditBuffer, Editable};
use crate::http::ApiError;
use crate::validation::FieldErrors;

pub mod catalog_items;
pub mod items;
pub mod relations;
pub mod stores;
pub mod users;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("fix the highlighted cells before saving")]
    SaveBlocked,
    #[error("no pending edits")]
    NothingToSave,
    #[error("no row with id {0}")]
    UnknownRow(String),
    #[error("{0}")]
    BadField(String),
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("not allowed to {0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Create,
    Delete,
}

impl RowAction {
    fn verb(&self) -> &'static str {
        match self {
            RowAction::Create => "create rows",
            RowAction::Delete => "delete rows",
        }
    }
}

/// Per-entity cell and row checks.
#[async_trait]
pub trait RowValidator<T: Editable>: Send + Sync {
    /// Check one cell change against the row as it was before the edit.
    async fn validate_field(&self, original: &T, field: &T::Field) -> Result<Option<String>, ApiError>;

    /// Rewrite a cell value before it is checked and buffered.
    fn normalize(&self, field: T::Field) -> T::Field {
        field
    }

    /// Check and fill in a row about to be created.
    async fn validate_new(&self, entity: T) -> Result<T, TableError>;

    fn allows(&self, _action: RowAction) -> bool {
        true
    }
}

pub struct EntityTable<T: Editable, S, V> {
    cache: WriteThroughCache<T>,
    buffer: EditBuffer<T>,
    source: S,
    validator: V,
}

impl<T, S, V> EntityTable<T, S, V>
where
    T: Editable,
    S: EntitySource<T>,
    V: RowValidator<T>,
{
    pub fn new(source: S, validator: V) -> Self {
        Self {
            cache: WriteThroughCache::new(),
            buffer: EditBuffer::new(),
            source,
            validator,
        }
    }

    pub fn cache(&self) -> &WriteThroughCache<T> {
        &self.cache
    }

    pub fn buffer(&self) -> &EditBuffer<T> {
        &self.buffer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    pub async fn refresh(&self) -> bool {
        self.cache.refresh(&self.source).await
    }

    pub async fn rows(&self) -> Vec<T> {
        self.cache.entities().await
    }

    pub async fn snapshot(&self) -> Vec<CachedRow<T>> {
        self.cache.snapshot().await
    }

    pub async fn load_failed(&self) -> bool {
        self.cache.load_failed().await
    }

    /// Validate and buffer one cell change. Returns the cell's error, if any;
    /// an error keeps Save disabled until the cell is changed again.
    pub async fn edit_cell(&mut self, id: &T::Id, field: T::Field) -> Result<Option<String>, TableError> {
        let original = self
            .cache
            .get(id)
            .await
            .ok_or_else(|| TableError::UnknownRow(id.to_string()))?;
        let field = self.validator.normalize(field);
        let error = self.validator.validate_field(&original, &field).await?;
        debug!(bucket = T::BUCKET, %id, field = T::field_name(&field), ?error, "cell edited");
        self.buffer.record(id.clone(), &original, field, error.clone());
        Ok(error)
    }

    /// [`EntityTable::edit_cell`] from a `Name` / `value` pair.
    pub async fn set(&mut self, id: &T::Id, name: &str, value: &str) -> Result<Option<String>, TableError> {
        let field = T::parse_field(name, value).map_err(TableError::BadField)?;
        self.edit_cell(id, field).await
    }

    pub fn can_save(&self) -> bool {
        self.buffer.can_save()
    }

    /// Flush every buffered row as one batch update. The buffer is emptied
    /// once the write returns, successful or not.
    pub async fn save(&mut self) -> Result<bool, TableError> {
        if self.buffer.has_errors() {
            return Err(TableError::SaveBlocked);
        }
        if self.buffer.is_empty() {
            return Err(TableError::NothingToSave);
        }
        let batch = self.buffer.batch();
        info!(bucket = T::BUCKET, rows = batch.len(), "saving edits");
        let result = self.cache.update(&self.source, batch).await;
        self.buffer.clear();
        Ok(result?)
    }

    /// Discard pending edits.
    pub fn cancel(&mut self) {
        self.buffer.clear();
    }

    pub async fn create_row(&self, entity: T) -> Result<bool, TableError> {
        if !self.validator.allows(RowAction::Create) {
            return Err(TableError::Forbidden(RowAction::Create.verb()));
        }
        let entity = self.validator.validate_new(entity).await?;
        Ok(self.cache.create(&self.source, entity).await?)
    }

    pub async fn delete_row(&self, id: T::Id) -> Result<bool, TableError> {
        if !self.validator.allows(RowAction::Delete) {
            return Err(TableError::Forbidden(RowAction::Delete.verb()));
        }
        Ok(self.cache.delete(&self.source, id).await?)
    }
}

/// Parse helpers shared by the `Editable::parse_field` impls.
pub(crate) mod parse {
    pub fn int(name: &str, value: &str) -> Result<i64, String> {
        value
            .trim()
            .parse()
            .map_err(|_| format!("{name} expects a whole number, got {value:?}"))
    }

    pub fn opt_int(name: &str, value: &str) -> Result<Option<i64>, String> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        int(name, value).map(Some)
    }

    pub fn float(name: &str, value: &str) -> Result<f64, String> {
        value
            .trim()
            .parse()
            .map_err(|_| format!("{name} expects a number, got {value:?}"))
    }

    pub fn flag(name: &str, value: &str) -> Result<bool, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(format!("{name} expects true or false, got {value:?}")),
        }
    }

    pub fn opt_text(value: &str) -> Option<String> {
        (!value.is_empty()).then(|| value.to_string())
    }

}
