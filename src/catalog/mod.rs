//! Client for the retail-catalog (SdItem) service: reference data, duplicate
//! checks, item push, barcodes and price levels.
use async_trait::async_trait;
use reqwest::Method;

use crate::admin::model::{ExtItems, Item};
use crate::http::{ApiError, HttpCore};

pub mod barcodes;
pub mod labels;
pub mod model;
pub mod price_levels;

use model::{
    Barcode, Brand, Category, Department, ExtItemPriceLevel, ExtItemResponse, ItemPriceLevel,
    PostBarcode, PriceLevel, ReportCode, TaxCode,
};

const ITEM_PREFIX: &str = "api/SdItem/v1/";
const STORE_EXISTS: &str = "api/SdWeb/v1/IsStoreExistByPublicToken";

fn path(op: &str) -> String {
    format!("{ITEM_PREFIX}{op}")
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn departments(&self, public_token: &str) -> Result<Vec<Department>, ApiError>;
    async fn categories(&self, public_token: &str) -> Result<Vec<Category>, ApiError>;
    async fn categories_by_department(
        &self,
        public_token: &str,
        department_id: &str,
    ) -> Result<Vec<Category>, ApiError>;
    async fn tax_codes(&self, public_token: &str) -> Result<Vec<TaxCode>, ApiError>;
    async fn brands(&self, public_token: &str) -> Result<Vec<Brand>, ApiError>;
    async fn report_codes(&self, public_token: &str) -> Result<Vec<ReportCode>, ApiError>;
    async fn item_types(&self) -> Result<Vec<String>, ApiError>;
    async fn item_statuses(&self) -> Result<Vec<String>, ApiError>;
    async fn price_levels(&self, public_token: &str) -> Result<Vec<PriceLevel>, ApiError>;

    async fn barcode_exists(&self, public_token: &str, barcode: &str) -> Result<bool, ApiError>;
    async fn item_number_exists(
        &self,
        public_token: &str,
        item_number: &str,
    ) -> Result<bool, ApiError>;
    async fn store_exists(&self, public_token: &str) -> Result<bool, ApiError>;

    async fn search_items(
        &self,
        public_token: &str,
        item_name: &str,
        item_number: &str,
    ) -> Result<Vec<Item>, ApiError>;
    /// Create or update items in the catalog; one response per item.
    async fn post_items(&self, items: &ExtItems) -> Result<Vec<ExtItemResponse>, ApiError>;

    async fn item_barcodes(&self, public_token: &str, item_id: i64)
        -> Result<Vec<Barcode>, ApiError>;
    async fn post_item_barcode(&self, barcode: &PostBarcode) -> Result<bool, ApiError>;

    async fn item_price_levels(
        &self,
        public_token: &str,
        item_id: i64,
    ) -> Result<Vec<ItemPriceLevel>, ApiError>;
    async fn create_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError>;
    async fn update_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError>;
    async fn delete_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    core: HttpCore,
}

impl CatalogClient {
    /// `core` should carry the subscription key.
    pub fn new(core: HttpCore) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &HttpCore {
        &self.core
    }

    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        op: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        self.core.get_json_or(&path(op), query, Vec::new()).await
    }

    async fn write<B: serde::Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        op: &str,
        body: &B,
    ) -> Result<bool, ApiError> {
        self.core
            .json_or(method, &path(op), &[], Some(body), false)
            .await
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn departments(&self, public_token: &str) -> Result<Vec<Department>, ApiError> {
        self.list("GetDepartments", &[("publicToken", public_token)])
            .await
    }

    async fn categories(&self, public_token: &str) -> Result<Vec<Category>, ApiError> {
        self.list("GetAllCategories", &[("publicToken", public_token)])
            .await
    }

    async fn categories_by_department(
        &self,
        public_token: &str,
        department_id: &str,
    ) -> Result<Vec<Category>, ApiError> {
        self.list(
            "GetAllCategories",
            &[("publicToken", public_token), ("departmentID", department_id)],
        )
        .await
    }

    async fn tax_codes(&self, public_token: &str) -> Result<Vec<TaxCode>, ApiError> {
        self.list("GetTaxCodes", &[("publicToken", public_token)]).await
    }

    async fn brands(&self, public_token: &str) -> Result<Vec<Brand>, ApiError> {
        self.list("GetBrands", &[("publicToken", public_token)]).await
    }

    async fn report_codes(&self, public_token: &str) -> Result<Vec<ReportCode>, ApiError> {
        self.list("GetReportCodes", &[("publicToken", public_token)])
            .await
    }

    async fn item_types(&self) -> Result<Vec<String>, ApiError> {
        self.list("GetItemTypes", &[]).await
    }

    async fn item_statuses(&self) -> Result<Vec<String>, ApiError> {
        self.list("GetItemStatuses", &[]).await
    }

    async fn price_levels(&self, public_token: &str) -> Result<Vec<PriceLevel>, ApiError> {
        self.list("GetPriceLevels", &[("publicToken", public_token)])
            .await
    }

    async fn barcode_exists(&self, public_token: &str, barcode: &str) -> Result<bool, ApiError> {
        self.core
            .flag(
                &path("BarcodesDuplicationCheck"),
                &[("publicToken", public_token), ("barcodeString", barcode)],
            )
            .await
    }

    async fn item_number_exists(
        &self,
        public_token: &str,
        item_number: &str,
    ) -> Result<bool, ApiError> {
        self.core
            .flag(
                &path("ItemNumberDuplicationCheck"),
                &[("publicToken", public_token), ("itemNumber", item_number)],
            )
            .await
    }

    async fn store_exists(&self, public_token: &str) -> Result<bool, ApiError> {
        self.core
            .flag(STORE_EXISTS, &[("publicToken", public_token)])
            .await
    }

    async fn search_items(
        &self,
        public_token: &str,
        item_name: &str,
        item_number: &str,
    ) -> Result<Vec<Item>, ApiError> {
        self.list(
            "SearchItems",
            &[
                ("publicToken", public_token),
                ("itemName", item_name),
                ("itemNumber", item_number),
            ],
        )
        .await
    }

    async fn post_items(&self, items: &ExtItems) -> Result<Vec<ExtItemResponse>, ApiError> {
        self.core
            .json_or(Method::POST, &path("PostItems"), &[], Some(items), Vec::new())
            .await
    }

    async fn item_barcodes(
        &self,
        public_token: &str,
        item_id: i64,
    ) -> Result<Vec<Barcode>, ApiError> {
        let id = item_id.to_string();
        self.list(
            "GetItemBarcodes",
            &[("publicToken", public_token), ("itemID", id.as_str())],
        )
        .await
    }

    async fn post_item_barcode(&self, barcode: &PostBarcode) -> Result<bool, ApiError> {
        self.write(Method::POST, "PostItemBarcode", barcode).await
    }

    async fn item_price_levels(
        &self,
        public_token: &str,
        item_id: i64,
    ) -> Result<Vec<ItemPriceLevel>, ApiError> {
        let id = item_id.to_string();
        self.list(
            "GetItemPriceLevels",
            &[("publicToken", public_token), ("itemID", id.as_str())],
        )
        .await
    }

    async fn create_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError> {
        self.write(Method::POST, "CreateItemPriceLevel", level).await
    }

    async fn update_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError> {
        self.write(Method::PUT, "UpdateItemPriceLevel", level).await
    }

    async fn delete_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError> {
        self.write(Method::DELETE, "DeleteItemPriceLevel", level).await
    }
}
