//! Product items held by the admin API for one head office.
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::{parse, EntityTable, RowValidator, TableError};
use crate::admin::model::{Item, Role, User};
use crate::admin::AdminApi;
use crate::cache::{Entity, EntitySource};
use crate::catalog::CatalogApi;
use crate::edit::Editable;
use crate::http::ApiError;
use crate::validation::{self, FieldErrors};

pub const ITEM_NAME_REQUIRED: &str = "Item Name is Required";

pub type ItemTable = EntityTable<Item, ItemSource, ItemValidator>;

impl Entity for Item {
    type Id = i64;
    const BUCKET: &'static str = "items";

    fn id(&self) -> Option<i64> {
        (self.item_id != 0).then_some(self.item_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFlag {
    ManualPrice,
    Discountable,
    Inventory,
    AvailableOnWeb,
    BtlDepositInPrice,
    BtlDepositInCost,
    EcoFeeInPrice,
    EcoFeeInCost,
}

impl ItemFlag {
    pub const ALL: [ItemFlag; 8] = [
        ItemFlag::ManualPrice,
        ItemFlag::Discountable,
        ItemFlag::Inventory,
        ItemFlag::AvailableOnWeb,
        ItemFlag::BtlDepositInPrice,
        ItemFlag::BtlDepositInCost,
        ItemFlag::EcoFeeInPrice,
        ItemFlag::EcoFeeInCost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ItemFlag::ManualPrice => "ManualPrice",
            ItemFlag::Discountable => "Discountable",
            ItemFlag::Inventory => "Inventory",
            ItemFlag::AvailableOnWeb => "AvailableOnWeb",
            ItemFlag::BtlDepositInPrice => "BtlDepositInPrice",
            ItemFlag::BtlDepositInCost => "BtlDepositInCost",
            ItemFlag::EcoFeeInPrice => "EcoFeeInPrice",
            ItemFlag::EcoFeeInCost => "EcoFeeInCost",
        }
    }

    pub fn slot<'a>(&self, item: &'a mut Item) -> &'a mut bool {
        match self {
            ItemFlag::ManualPrice => &mut item.manual_price,
            ItemFlag::Discountable => &mut item.discountable,
            ItemFlag::Inventory => &mut item.inventory,
            ItemFlag::AvailableOnWeb => &mut item.available_on_web,
            ItemFlag::BtlDepositInPrice => &mut item.btl_deposit_in_price,
            ItemFlag::BtlDepositInCost => &mut item.btl_deposit_in_cost,
            ItemFlag::EcoFeeInPrice => &mut item.eco_fee_in_price,
            ItemFlag::EcoFeeInCost => &mut item.eco_fee_in_cost,
        }
    }
}

/// One editable item cell. Shared by the admin-held and retail-catalog grids.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    ItemName(String),
    ItemDesc(String),
    ItemNumber(String),
    Barcode(String),
    UnitPrice(f64),
    UnitCost(f64),
    Sts(String),
    ItemType(String),
    Brand(Option<String>),
    BrandId(Option<i64>),
    DepartmentId(Option<i64>),
    CategoryId(Option<i64>),
    TaxCodeId(Option<i64>),
    ReportCode(String),
    ImageFileName(Option<String>),
    Flag(ItemFlag, bool),
}

impl ItemField {
    pub fn name(&self) -> &'static str {
        match self {
            ItemField::ItemName(_) => "ItemName",
            ItemField::ItemDesc(_) => "ItemDesc",
            ItemField::ItemNumber(_) => "ItemNumber",
            ItemField::Barcode(_) => "Barcode",
            ItemField::UnitPrice(_) => "UnitPrice",
            ItemField::UnitCost(_) => "UnitCost",
            ItemField::Sts(_) => "STS",
            ItemField::ItemType(_) => "ItemType",
            ItemField::Brand(_) => "Brand",
            ItemField::BrandId(_) => "BrandID",
            ItemField::DepartmentId(_) => "DepartmentID",
            ItemField::CategoryId(_) => "CategoryID",
            ItemField::TaxCodeId(_) => "TaxCodeID",
            ItemField::ReportCode(_) => "ReportCode",
            ItemField::ImageFileName(_) => "ImageFileName",
            ItemField::Flag(flag, _) => flag.name(),
        }
    }

    pub fn apply_to(self, item: &mut Item) {
        match self {
            ItemField::ItemName(v) => item.item_name = v,
            ItemField::ItemDesc(v) => item.item_desc = v,
            ItemField::ItemNumber(v) => item.item_number = v,
            ItemField::Barcode(v) => item.barcode = v,
            ItemField::UnitPrice(v) => item.unit_price = v,
            ItemField::UnitCost(v) => item.unit_cost = v,
            ItemField::Sts(v) => item.sts = v,
            ItemField::ItemType(v) => item.item_type = v,
            ItemField::Brand(v) => item.brand = v,
            ItemField::BrandId(v) => item.brand_id = v,
            ItemField::DepartmentId(v) => item.department_id = v,
            ItemField::CategoryId(v) => item.category_id = v,
            ItemField::TaxCodeId(v) => item.tax_code_id = v,
            ItemField::ReportCode(v) => item.report_code = v,
            ItemField::ImageFileName(v) => item.image_file_name = v,
            ItemField::Flag(flag, v) => *flag.slot(item) = v,
        }
    }

    pub fn parse(name: &str, value: &str) -> Result<ItemField, String> {
        if let Some(flag) = ItemFlag::ALL.into_iter().find(|f| f.name() == name) {
            return Ok(ItemField::Flag(flag, parse::flag(name, value)?));
        }
        let text = value.to_string();
        Ok(match name {
            "ItemName" => ItemField::ItemName(text),
            "ItemDesc" => ItemField::ItemDesc(text),
            "ItemNumber" => ItemField::ItemNumber(text),
            "Barcode" => ItemField::Barcode(text),
            "UnitPrice" => ItemField::UnitPrice(parse::float(name, value)?),
            "UnitCost" => ItemField::UnitCost(parse::float(name, value)?),
            "STS" => ItemField::Sts(text),
            "ItemType" => ItemField::ItemType(text),
            "Brand" => ItemField::Brand(parse::opt_text(value)),
            "BrandID" => ItemField::BrandId(parse::opt_int(name, value)?),
            "DepartmentID" => ItemField::DepartmentId(parse::opt_int(name, value)?),
            "CategoryID" => ItemField::CategoryId(parse::opt_int(name, value)?),
            "TaxCodeID" => ItemField::TaxCodeId(parse::opt_int(name, value)?),
            "ReportCode" => ItemField::ReportCode(text),
            "ImageFileName" => ItemField::ImageFileName(parse::opt_text(value)),
            other => return Err(format!("unknown item field {other}")),
        })
    }
}

impl Editable for Item {
    type Field = ItemField;

    fn field_name(field: &ItemField) -> &'static str {
        field.name()
    }

    fn apply(&mut self, field: ItemField) {
        field.apply_to(self);
    }

    fn parse_field(name: &str, value: &str) -> Result<ItemField, String> {
        ItemField::parse(name, value)
    }
}

/// `userIds` filter for `GetVpItems`: a manager sees their users' items,
/// staff their own, an admin everything.
pub async fn item_scope(admin: &dyn AdminApi, me: &User) -> Result<String, ApiError> {
    let my_id = me.user_id.clone().unwrap_or_default();
    Ok(match me.role() {
        Some(Role::Manager) => admin
            .my_users(&my_id)
            .await?
            .into_iter()
            .filter_map(|u| u.user_id)
            .collect::<Vec<_>>()
            .join(","),
        Some(Role::Staff) => my_id,
        _ => String::new(),
    })
}

pub struct ItemSource {
    admin: Arc<dyn AdminApi>,
    me: User,
    head_office_token: String,
}

impl ItemSource {
    pub fn new(admin: Arc<dyn AdminApi>, me: User, head_office_token: impl Into<String>) -> Self {
        Self {
            admin,
            me,
            head_office_token: head_office_token.into(),
        }
    }

    pub fn head_office_token(&self) -> &str {
        &self.head_office_token
    }
}

#[async_trait]
impl EntitySource<Item> for ItemSource {
    async fn fetch(&self) -> Result<Vec<Item>, ApiError> {
        let scope = item_scope(self.admin.as_ref(), &self.me).await?;
        self.admin.items(&self.head_office_token, &scope).await
    }

    async fn create(&self, entity: &Item) -> Result<bool, ApiError> {
        self.admin.create_items(std::slice::from_ref(entity)).await
    }

    async fn update(&self, batch: &[Item]) -> Result<bool, ApiError> {
        self.admin.update_items(batch).await
    }

    async fn delete(&self, id: &i64) -> Result<bool, ApiError> {
        self.admin.delete_item(*id).await
    }
}

/// Cell checks for item grids. Barcodes and item numbers must be new to the
/// head office's retail catalog.
pub struct ItemValidator {
    catalog: Arc<dyn CatalogApi>,
    head_office_token: String,
    creator_id: Option<String>,
}

impl ItemValidator {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        head_office_token: impl Into<String>,
        creator_id: Option<String>,
    ) -> Self {
        Self {
            catalog,
            head_office_token: head_office_token.into(),
            creator_id,
        }
    }

    /// Check one cell of `original`. Re-entering the value a row already has
    /// skips the duplicate lookup, which would otherwise find the row itself.
    pub async fn check(&self, original: &Item, field: &ItemField) -> Result<Option<String>, ApiError> {
        let catalog = self.catalog.as_ref();
        let token = self.head_office_token.as_str();
        Ok(match field {
            ItemField::Barcode(v) => match validation::required(v) {
                Some(err) => Some(err),
                None if *v == original.barcode => None,
                None => validation::unique_barcode(catalog, token, v).await?,
            },
            ItemField::ItemNumber(v) => match validation::required(v) {
                Some(err) => Some(err),
                None if *v == original.item_number => None,
                None => validation::unique_item_number(catalog, token, v).await?,
            },
            ItemField::ItemName(v) | ItemField::ItemDesc(v) => validation::required(v),
            _ => None,
        })
    }

    /// Fill in creation metadata and require a name.
    pub fn prepare_new(&self, mut item: Item) -> Result<Item, TableError> {
        let mut errors = FieldErrors::new();
        errors.check(
            "ItemName",
            item.item_name
                .is_empty()
                .then(|| ITEM_NAME_REQUIRED.to_string()),
        );
        item.item_id = 0;
        item.created_date = Some(Utc::now());
        item.create_user_id = self.creator_id.clone();
        errors.into_result(item).map_err(TableError::Invalid)
    }
}

#[async_trait]
impl RowValidator<Item> for ItemValidator {
    async fn validate_field(&self, original: &Item, field: &ItemField) -> Result<Option<String>, ApiError> {
        self.check(original, field).await
    }

    async fn validate_new(&self, item: Item) -> Result<Item, TableError> {
        self.prepare_new(item)
    }
}

pub fn item_table(
    admin: Arc<dyn AdminApi>,
    catalog: Arc<dyn CatalogApi>,
    me: User,
    head_office_token: &str,
) -> ItemTable {
    let creator_id = me.user_id.clone();
    EntityTable::new(
        ItemSource::new(admin, me, head_office_token),
        ItemValidator::new(catalog, head_office_token, creator_id),
    )
}
