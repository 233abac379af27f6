//! Alternate barcodes of a catalog item.
use tracing::info;

use super::model::PostBarcode;
use super::CatalogApi;
use crate::http::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddBarcode {
    /// Blank input; nothing sent.
    Empty,
    Duplicate,
    Added,
    /// The catalog answered with anything but success.
    Rejected,
}

/// Attach `barcode` to `item_id` unless it already exists in the catalog.
pub async fn add_barcode(
    catalog: &dyn CatalogApi,
    public_token: &str,
    item_id: i64,
    barcode: &str,
) -> Result<AddBarcode, ApiError> {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        return Ok(AddBarcode::Empty);
    }
    if catalog.barcode_exists(public_token, barcode).await? {
        return Ok(AddBarcode::Duplicate);
    }

    let body = PostBarcode {
        public_key: public_token.to_string(),
        item_id,
        barcode_string: barcode.to_string(),
    };
    if catalog.post_item_barcode(&body).await? {
        info!(item_id, barcode, "added item barcode");
        Ok(AddBarcode::Added)
    } else {
        Ok(AddBarcode::Rejected)
    }
}
