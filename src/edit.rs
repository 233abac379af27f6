//! Row-edit buffer: pending per-row patches and per-cell errors, flushed as
//! one batch on save.
use std::collections::HashMap;
use std::fmt;

use crate::cache::Entity;

/// An entity whose cells can be edited one field at a time.
pub trait Editable: Entity {
    type Field: Clone + fmt::Debug + Send + Sync;

    /// Wire name of the field carried by `field`.
    fn field_name(field: &Self::Field) -> &'static str;

    fn apply(&mut self, field: Self::Field);

    /// Parse a `Name=value` style cell assignment.
    fn parse_field(name: &str, value: &str) -> Result<Self::Field, String>;
}

pub struct EditBuffer<T: Editable> {
    order: Vec<T::Id>,
    rows: HashMap<T::Id, T>,
    errors: HashMap<(T::Id, &'static str), String>,
}

impl<T: Editable> Default for EditBuffer<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
            errors: HashMap::new(),
        }
    }
}

impl<T: Editable + fmt::Debug> fmt::Debug for EditBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditBuffer")
            .field("rows", &self.rows)
            .field("errors", &self.errors)
            .finish()
    }
}

impl<T: Editable> EditBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the pending patch when there is one, otherwise from the
    /// original row, and apply a single field change.
    pub fn merge(original: &T, existing: Option<&T>, change: T::Field) -> T {
        let mut row = existing.unwrap_or(original).clone();
        row.apply(change);
        row
    }

    /// Merge `change` into the patch for `id` and set or clear that cell's
    /// error. An empty message counts as no error.
    pub fn record(&mut self, id: T::Id, original: &T, change: T::Field, error: Option<String>) {
        let key = (id.clone(), T::field_name(&change));
        let merged = Self::merge(original, self.rows.get(&id), change);
        if !self.rows.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.rows.insert(id, merged);
        match error.filter(|e| !e.is_empty()) {
            Some(msg) => {
                self.errors.insert(key, msg);
            }
            None => {
                self.errors.remove(&key);
            }
        }
    }

    pub fn pending(&self, id: &T::Id) -> Option<&T> {
        self.rows.get(id)
    }

    pub fn error(&self, id: &T::Id, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|((row, name), _)| row == id && *name == field)
            .map(|(_, msg)| msg.as_str())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&T::Id, &'static str, &str)> {
        self.errors
            .iter()
            .map(|((id, field), msg)| (id, *field, msg.as_str()))
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Save is allowed only with pending rows and no recorded error.
    pub fn can_save(&self) -> bool {
        !self.is_empty() && !self.has_errors()
    }

    /// Pending rows in edit order.
    pub fn batch(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.rows.clear();
        self.errors.clear();
    }
}
