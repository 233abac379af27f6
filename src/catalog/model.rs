//! Wire models of the retail-catalog (SdItem) service.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::admin::model::de;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Department {
    #[serde(rename = "DepartmentID")]
    pub department_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub department_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub department_desc: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub department_code: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub sort_line: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub uid: i64,
    #[serde(default)]
    pub alt_dept_identifier: Option<String>,
    #[serde(default)]
    pub dept_sync_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    #[serde(rename = "CategoryID")]
    pub category_id: i64,
    #[serde(rename = "DepartmentID")]
    pub department_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub category_code: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub category_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub category_desc: String,
    #[serde(rename = "ModifierID", default, deserialize_with = "de::null_default")]
    pub modifier_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub profit_margin: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub sort_line: i64,
    #[serde(rename = "MatrixID", default, deserialize_with = "de::null_default")]
    pub matrix_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub uid: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub is_modifier: bool,
    #[serde(default, deserialize_with = "de::null_default")]
    pub expiry_alert: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub is_restricted: bool,
    #[serde(default)]
    pub alt_cat_identifier: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub include_in_item_sales_on_closing_slip: bool,
    #[serde(default)]
    pub cat_sync_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TaxCode {
    #[serde(rename = "TaxCodeID")]
    pub tax_code_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub tax_code_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub tax_code_desc: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub indicator: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub uid: i64,
    #[serde(default)]
    pub ai_identifier: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub is_restricted: bool,
    #[serde(default)]
    pub tax_code_sync_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Brand {
    #[serde(rename = "BrandID")]
    pub brand_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub brand_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub brand_desc: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ReportCode {
    #[serde(rename = "ReportCodeID")]
    pub report_code_id: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub report_code_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub report_code_desc: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub uid: i64,
    #[serde(default)]
    pub report_sync_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PriceLevel {
    pub price_level: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub price_level_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemPriceLevel {
    #[serde(rename = "ItemID")]
    pub item_id: i64,
    #[serde(rename = "PriceLevel")]
    pub price_level: i64,
    #[serde(rename = "Price", default, deserialize_with = "de::null_default")]
    pub price: f64,
    #[serde(rename = "UID", default, deserialize_with = "de::null_default")]
    pub uid: i64,
    #[serde(rename = "OmniPriceLevelID", default, deserialize_with = "de::null_default")]
    pub omni_price_level_id: i64,
}

/// Price-level write envelope scoped to a head office.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtItemPriceLevel {
    #[serde(rename = "PublicToken")]
    pub public_token: String,
    #[serde(rename = "ItemPriceLevel")]
    pub item_price_level: ItemPriceLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Barcode {
    #[serde(rename = "Barcode")]
    pub barcode: String,
    #[serde(rename = "ItemID", default, deserialize_with = "de::null_default")]
    pub item_id: i64,
    #[serde(rename = "UID", default, deserialize_with = "de::null_default")]
    pub uid: i64,
    #[serde(rename = "Qty", default, deserialize_with = "de::null_default")]
    pub qty: f64,
}

/// `PostItemBarcode` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostBarcode {
    #[serde(rename = "PublicKey")]
    pub public_key: String,
    #[serde(rename = "ItemID")]
    pub item_id: i64,
    #[serde(rename = "BarcodeString")]
    pub barcode_string: String,
}

/// Per-item answer of `PostItems`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtItemResponse {
    #[serde(rename = "ExtItemID", default, deserialize_with = "de::null_default")]
    pub ext_item_id: i64,
    #[serde(rename = "SdItemID", default, deserialize_with = "de::null_default")]
    pub sd_item_id: i64,
    #[serde(rename = "Message", default, deserialize_with = "de::null_default")]
    pub message: String,
    #[serde(rename = "Action", default, deserialize_with = "de::null_default")]
    pub action: String,
    #[serde(rename = "Status", default, deserialize_with = "de::null_default")]
    pub status: String,
    #[serde(rename = "SendDate", default, with = "de::opt_datetime")]
    pub send_date: Option<DateTime<Utc>>,
}

/// Status string the catalog uses for a successful push.
pub const STATUS_SUCCEEDED: &str = "Successed";

impl ExtItemResponse {
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }
}

/// Option for a selection widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub label: String,
    pub value: String,
}

impl Label {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Category options of one department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeptCategories {
    pub department_id: String,
    pub categories: Vec<Label>,
}
