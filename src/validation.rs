//! Per-cell validation shared by every editable table.
//!
//! Checks return `Option<String>`: `None` when the value passes, otherwise the
//! message shown next to the cell. Remote checks go through [`CatalogApi`] and
//! only surface transport failures as errors.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::CatalogApi;
use crate::guid::{format_to_guid, is_valid_guid};
use crate::http::ApiError;

pub const REQUIRED: &str = "Required";
pub const INVALID_EMAIL: &str = "Invalid Email";
pub const DUPLICATE_BARCODE: &str = "Duplicate Barcodes";
pub const DUPLICATE_ITEM_NUMBER: &str = "Duplicate Item Numbers";
pub const TOKEN_REQUIRED: &str = "Public token is required.";
pub const TOKEN_INVALID: &str = "Public token Guid is invalid.";
pub const TOKEN_UNKNOWN: &str = "No store found by this token.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("valid email regex")
});

pub fn validate_required(value: &str) -> bool {
    !value.is_empty()
}

pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_RE.is_match(&email.to_lowercase())
}

/// `Required` when empty.
pub fn required(value: &str) -> Option<String> {
    (!validate_required(value)).then(|| REQUIRED.to_string())
}

/// `Invalid Email` when the value is not an address.
pub fn email(value: &str) -> Option<String> {
    (!validate_email(value)).then(|| INVALID_EMAIL.to_string())
}

/// Barcode must not already exist in the retail catalog.
pub async fn unique_barcode(
    catalog: &dyn CatalogApi,
    public_token: &str,
    barcode: &str,
) -> Result<Option<String>, ApiError> {
    let duplicate = catalog.barcode_exists(public_token, barcode).await?;
    Ok(duplicate.then(|| DUPLICATE_BARCODE.to_string()))
}

/// Item number must not already exist in the retail catalog.
pub async fn unique_item_number(
    catalog: &dyn CatalogApi,
    public_token: &str,
    item_number: &str,
) -> Result<Option<String>, ApiError> {
    let duplicate = catalog.item_number_exists(public_token, item_number).await?;
    Ok(duplicate.then(|| DUPLICATE_ITEM_NUMBER.to_string()))
}

/// Store or head-office token: present, GUID-shaped once formatted, and known
/// to the retail catalog.
pub async fn public_token(
    catalog: &dyn CatalogApi,
    token: &str,
) -> Result<Option<String>, ApiError> {
    if !validate_required(token) {
        return Ok(Some(TOKEN_REQUIRED.to_string()));
    }
    let guid = match format_to_guid(token) {
        Ok(guid) if is_valid_guid(&guid) => guid,
        _ => return Ok(Some(TOKEN_INVALID.to_string())),
    };
    if !catalog.store_exists(&guid).await? {
        return Ok(Some(TOKEN_UNKNOWN.to_string()));
    }
    Ok(None)
}

/// Field name → message for a whole-row check (create row).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` for `field` if there is one.
    pub fn check(&mut self, field: &'static str, error: Option<String>) -> &mut Self {
        if let Some(msg) = error.filter(|m| !m.is_empty()) {
            self.0.insert(field, msg);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msg) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}
