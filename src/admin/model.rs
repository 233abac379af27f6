//! Wire models of the VpItem admin API.
//!
//! Field names follow the backend's PascalCase JSON. Identifier fields that
//! the backend sends as either numbers or strings go through [`de`].
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role level stored in `UserLevelID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn from_level(level: &str) -> Option<Self> {
        match level.trim() {
            "1" => Some(Role::Admin),
            "2" => Some(Role::Manager),
            "3" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn level(&self) -> &'static str {
        match self {
            Role::Admin => "1",
            Role::Manager => "2",
            Role::Staff => "3",
        }
    }

    /// Staff only edit; they never create or delete stores and users.
    pub fn can_manage(&self) -> bool {
        !matches!(self, Role::Staff)
    }

    /// Level given to accounts this role creates.
    pub fn child(&self) -> Option<Role> {
        match self {
            Role::Admin => Some(Role::Manager),
            Role::Manager => Some(Role::Staff),
            Role::Staff => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "UserID", default, with = "de::opt_string_or_number")]
    pub user_id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(rename = "Email", default, deserialize_with = "de::null_default")]
    pub email: String,
    /// bcrypt hash, never the plain password.
    #[serde(rename = "Password", default, deserialize_with = "de::null_default")]
    pub password: String,
    #[serde(rename = "UserLevelID", default, with = "de::string_or_number")]
    pub user_level_id: String,
    #[serde(
        rename = "ManagerUserID",
        default,
        with = "de::opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub manager_user_id: Option<String>,
    #[serde(rename = "IsNewUser", default, deserialize_with = "de::null_default")]
    pub is_new_user: bool,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_level(&self.user_level_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLevel {
    #[serde(rename = "UserLevelID", with = "de::string_or_number")]
    pub user_level_id: String,
    #[serde(rename = "Name", default, deserialize_with = "de::null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    #[serde(rename = "StoreID", default, deserialize_with = "de::null_default")]
    pub store_id: i64,
    #[serde(rename = "StoreName", default, deserialize_with = "de::null_default")]
    pub store_name: String,
    #[serde(rename = "HeadOfficeName", default, deserialize_with = "de::null_default")]
    pub head_office_name: String,
    #[serde(rename = "StoreToken", default, deserialize_with = "de::null_default")]
    pub store_token: String,
    #[serde(rename = "HeadOfficeToken", default, deserialize_with = "de::null_default")]
    pub head_office_token: String,
}

/// Body of `CreateStore`: the new store plus the user creating it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreCreation {
    #[serde(rename = "NewStore")]
    pub new_store: Store,
    #[serde(rename = "CreateUser")]
    pub create_user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStoreRelation {
    #[serde(rename = "RelationID", default, deserialize_with = "de::null_default")]
    pub relation_id: i64,
    #[serde(rename = "UserID", default, with = "de::string_or_number")]
    pub user_id: String,
    #[serde(rename = "StoreID", default, with = "de::string_or_number")]
    pub store_id: String,
}

/// Product item as held by the admin API and mirrored by the retail catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(rename = "ItemID", default, deserialize_with = "de::null_default")]
    pub item_id: i64,
    #[serde(rename = "DepartmentID", default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(rename = "CategoryID", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(rename = "ItemName", default, deserialize_with = "de::null_default")]
    pub item_name: String,
    #[serde(rename = "ItemDesc", default, deserialize_with = "de::null_default")]
    pub item_desc: String,
    #[serde(rename = "ItemNumber", default, deserialize_with = "de::null_default")]
    pub item_number: String,
    #[serde(rename = "TaxCodeID", default, skip_serializing_if = "Option::is_none")]
    pub tax_code_id: Option<i64>,
    #[serde(rename = "UnitPrice", default, deserialize_with = "de::null_default")]
    pub unit_price: f64,
    #[serde(rename = "UnitCost", default, deserialize_with = "de::null_default")]
    pub unit_cost: f64,
    #[serde(rename = "STS", default, deserialize_with = "de::null_default")]
    pub sts: String,
    #[serde(rename = "ItemType", default, deserialize_with = "de::null_default")]
    pub item_type: String,
    #[serde(rename = "Brand", default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(rename = "BrandID", default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
    #[serde(rename = "Barcode", default, deserialize_with = "de::null_default")]
    pub barcode: String,
    #[serde(rename = "ReportCode", default, deserialize_with = "de::null_default")]
    pub report_code: String,
    #[serde(rename = "ImageFileName", default, skip_serializing_if = "Option::is_none")]
    pub image_file_name: Option<String>,
    /// Base64 image payload.
    #[serde(rename = "ImageFileData", default, skip_serializing_if = "Option::is_none")]
    pub image_file_data: Option<String>,
    #[serde(rename = "ManualPrice", default, deserialize_with = "de::null_default")]
    pub manual_price: bool,
    #[serde(rename = "Discountable", default, deserialize_with = "de::null_default")]
    pub discountable: bool,
    #[serde(rename = "Inventory", default, deserialize_with = "de::null_default")]
    pub inventory: bool,
    #[serde(rename = "AvailableOnWeb", default, deserialize_with = "de::null_default")]
    pub available_on_web: bool,
    #[serde(rename = "BtlDepositInPrice", default, deserialize_with = "de::null_default")]
    pub btl_deposit_in_price: bool,
    #[serde(rename = "BtlDepositInCost", default, deserialize_with = "de::null_default")]
    pub btl_deposit_in_cost: bool,
    #[serde(rename = "EcoFeeInPrice", default, deserialize_with = "de::null_default")]
    pub eco_fee_in_price: bool,
    #[serde(rename = "EcoFeeInCost", default, deserialize_with = "de::null_default")]
    pub eco_fee_in_cost: bool,
    #[serde(rename = "SdItemID", default, skip_serializing_if = "Option::is_none")]
    pub sd_item_id: Option<i64>,
    #[serde(rename = "LastAction", default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    #[serde(rename = "LastStatus", default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    #[serde(
        rename = "LastSendDate",
        default,
        with = "de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_send_date: Option<DateTime<Utc>>,
    #[serde(
        rename = "CreatedDate",
        default,
        with = "de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "CreateUserID", default, with = "de::opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub create_user_id: Option<String>,
}

/// Item row of the retail-catalog grid. Same wire shape as [`Item`], kept in
/// its own cache bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CatalogItem(pub Item);

/// `PostItems` body: items pushed to the retail catalog for one head office.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtItems {
    #[serde(rename = "PublicKey")]
    pub public_key: String,
    #[serde(rename = "ExtItems")]
    pub ext_items: Vec<Item>,
}

/// One attempt to push an item to the retail catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendItemHistory {
    #[serde(rename = "ID", default, deserialize_with = "de::null_default")]
    pub id: i64,
    #[serde(rename = "ExtItemID", default, deserialize_with = "de::null_default")]
    pub ext_item_id: i64,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "ResponseMsg", default, skip_serializing_if = "Option::is_none")]
    pub response_msg: Option<String>,
    #[serde(rename = "SendUserID", default, with = "de::opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub send_user_id: Option<String>,
    #[serde(rename = "SendDate", default, with = "de::opt_datetime")]
    pub send_date: Option<DateTime<Utc>>,
}

pub mod de {
    //! Lenient field codecs for values the backend is inconsistent about.
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    fn value_to_string<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(E::custom(format!("expected string or number, got {other}"))),
        }
    }

    /// `null` reads as the type's default, same as a missing key.
    pub fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }

    pub mod string_or_number {
        use super::*;

        pub fn serialize<S: Serializer>(value: &str, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(value)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
            let value = Value::deserialize(d)?;
            Ok(value_to_string(value)?.unwrap_or_default())
        }
    }

    pub mod opt_string_or_number {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_some(v),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
            let value = Value::deserialize(d)?;
            value_to_string(value)
        }
    }

    /// RFC 3339, or an offset-less ISO timestamp taken as UTC.
    pub mod opt_datetime {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_some(&v.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let Some(raw) = Option::<String>::deserialize(d)? else {
                return Ok(None);
            };
            if raw.trim().is_empty() {
                return Ok(None);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
                return Ok(Some(dt.with_timezone(&Utc)));
            }
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Some(naive.and_utc()))
                .map_err(serde::de::Error::custom)
        }
    }
}
