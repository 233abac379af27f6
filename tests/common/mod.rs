#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use vp_admin::admin::model::{
    ExtItems, Item, SendItemHistory, Store, StoreCreation, User, UserLevel, UserStoreRelation,
};
use vp_admin::admin::AdminApi;
use vp_admin::catalog::model::{
    Barcode, Brand, Category, Department, ExtItemPriceLevel, ExtItemResponse, ItemPriceLevel,
    PostBarcode, PriceLevel, ReportCode, TaxCode,
};
use vp_admin::catalog::CatalogApi;
use vp_admin::http::ApiError;

#[derive(Default)]
pub struct State {
    pub users: Vec<User>,
    pub stores: Vec<Store>,
    pub relations: Vec<UserStoreRelation>,
    pub items: Vec<Item>,
    pub catalog_items: Vec<Item>,
    pub barcodes: HashSet<String>,
    pub item_numbers: HashSet<String>,
    pub known_tokens: HashSet<String>,
    pub item_barcodes: Vec<Barcode>,
    pub price_levels: Vec<ItemPriceLevel>,
    pub history: Vec<SendItemHistory>,
    pub post_responses: VecDeque<Vec<ExtItemResponse>>,
    pub fail_fetch: bool,
    pub reject_writes: bool,
    /// `UpdateVpItems` fails at the transport level.
    pub fail_writes: bool,
    pub calls: Vec<String>,
    pub posted: Vec<ExtItems>,
    pub store_creations: Vec<StoreCreation>,
    pub item_scopes: Vec<String>,
    next_id: i64,
}

/// In-memory stand-in for both backends. Writes land in `state`; reads come
/// back from it, so a refresh after a mutation shows the server's view.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<Mutex<State>>,
    /// When set, `create_*` calls wait for a notification before applying.
    pub create_gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            create_gate: Some(gate),
            ..Default::default()
        }
    }

    pub async fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut guard = self.state.lock().await;
        f(&mut guard)
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    async fn record(&self, call: &str) -> tokio::sync::MutexGuard<'_, State> {
        let mut guard = self.state.lock().await;
        guard.calls.push(call.to_string());
        guard
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
    }

    async fn read<T: Clone>(&self, call: &str, pick: impl FnOnce(&State) -> Vec<T>) -> Result<Vec<T>, ApiError> {
        let guard = self.record(call).await;
        if guard.fail_fetch {
            return Err(ApiError::InvalidUrl(format!("{call}: backend unreachable")));
        }
        Ok(pick(&*guard))
    }

    fn next_id(state: &mut State) -> i64 {
        state.next_id += 1;
        100 + state.next_id
    }
}

pub fn user(id: &str, level: &str, manager: Option<&str>) -> User {
    User {
        user_id: Some(id.to_string()),
        name: format!("user {id}"),
        email: format!("{id}@example.com"),
        password: String::new(),
        user_level_id: level.to_string(),
        manager_user_id: manager.map(str::to_string),
        is_new_user: false,
    }
}

pub fn item(id: i64, name: &str, barcode: &str) -> Item {
    Item {
        item_id: id,
        item_name: name.to_string(),
        item_desc: format!("{name} desc"),
        item_number: format!("N{id}"),
        barcode: barcode.to_string(),
        unit_price: 1.5,
        ..Default::default()
    }
}

#[async_trait]
impl AdminApi for FakeBackend {
    async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        self.read("GetAllVpUsers", |s| s.users.clone()).await
    }

    async fn my_users(&self, my_user_id: &str) -> Result<Vec<User>, ApiError> {
        let me = my_user_id.to_string();
        self.read("GetMyVpUsers", move |s| {
            s.users
                .iter()
                .filter(|u| u.manager_user_id.as_deref() == Some(me.as_str()))
                .cloned()
                .collect()
        })
        .await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let guard = self.record("GetVpUserByEmail").await;
        Ok(guard.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_users(&self, users: &[User]) -> Result<bool, ApiError> {
        let mut guard = self.record("UpdateVpUser").await;
        if guard.reject_writes {
            return Ok(false);
        }
        for u in users {
            if let Some(row) = guard.users.iter_mut().find(|r| r.user_id == u.user_id) {
                *row = u.clone();
            }
        }
        Ok(true)
    }

    async fn create_user(&self, user: &User) -> Result<bool, ApiError> {
        self.wait_gate().await;
        let mut guard = self.record("CreateVpUser").await;
        let id = Self::next_id(&mut guard);
        guard.users.push(User {
            user_id: Some(format!("u-{id}")),
            ..user.clone()
        });
        Ok(true)
    }

    async fn delete_user(&self, user_id: &str) -> Result<i64, ApiError> {
        let mut guard = self.record("DeleteVpUser").await;
        let before = guard.users.len();
        guard.users.retain(|u| u.user_id.as_deref() != Some(user_id));
        Ok((before - guard.users.len()) as i64)
    }

    async fn user_levels(&self) -> Result<Vec<UserLevel>, ApiError> {
        self.read("GetAllVpUserLevels", |_| {
            vec![
                UserLevel {
                    user_level_id: "1".into(),
                    name: "Admin".into(),
                },
                UserLevel {
                    user_level_id: "2".into(),
                    name: "Manager".into(),
                },
                UserLevel {
                    user_level_id: "3".into(),
                    name: "Staff".into(),
                },
            ]
        })
        .await
    }

    async fn all_stores(&self) -> Result<Vec<Store>, ApiError> {
        self.read("GetAllStores", |s| s.stores.clone()).await
    }

    async fn user_stores(&self, _user_id: &str) -> Result<Vec<Store>, ApiError> {
        self.read("GetUserStores", |s| s.stores.clone()).await
    }

    async fn update_stores(&self, stores: &[Store]) -> Result<bool, ApiError> {
        let mut guard = self.record("UpdateStores").await;
        for st in stores {
            if let Some(row) = guard.stores.iter_mut().find(|r| r.store_id == st.store_id) {
                *row = st.clone();
            }
        }
        Ok(true)
    }

    async fn create_store(&self, creation: &StoreCreation) -> Result<bool, ApiError> {
        self.wait_gate().await;
        let mut guard = self.record("CreateStore").await;
        let id = Self::next_id(&mut guard);
        guard.stores.push(Store {
            store_id: id,
            ..creation.new_store.clone()
        });
        guard.store_creations.push(creation.clone());
        Ok(true)
    }

    async fn delete_store(&self, store_id: i64) -> Result<i64, ApiError> {
        let mut guard = self.record("DeleteStore").await;
        let before = guard.stores.len();
        guard.stores.retain(|s| s.store_id != store_id);
        Ok((before - guard.stores.len()) as i64)
    }

    async fn all_relations(&self) -> Result<Vec<UserStoreRelation>, ApiError> {
        self.read("GetAllUserStoreRelations", |s| s.relations.clone())
            .await
    }

    async fn my_relations(&self, _user_id: &str) -> Result<Vec<UserStoreRelation>, ApiError> {
        self.read("GetMyUserStoreRelations", |s| s.relations.clone())
            .await
    }

    async fn update_relations(&self, relations: &[UserStoreRelation]) -> Result<bool, ApiError> {
        let mut guard = self.record("UpdateUserStoreRelations").await;
        for rel in relations {
            if let Some(row) = guard
                .relations
                .iter_mut()
                .find(|r| r.relation_id == rel.relation_id)
            {
                *row = rel.clone();
            }
        }
        Ok(true)
    }

    async fn create_relation(&self, relation: &UserStoreRelation) -> Result<bool, ApiError> {
        self.wait_gate().await;
        let mut guard = self.record("CreateUserStoreRelation").await;
        let id = Self::next_id(&mut guard);
        guard.relations.push(UserStoreRelation {
            relation_id: id,
            ..relation.clone()
        });
        Ok(true)
    }

    async fn delete_relation(&self, relation_id: i64) -> Result<i64, ApiError> {
        let mut guard = self.record("DeleteUserStoreRelation").await;
        let before = guard.relations.len();
        guard.relations.retain(|r| r.relation_id != relation_id);
        Ok((before - guard.relations.len()) as i64)
    }

    async fn items(&self, _public_key: &str, user_ids: &str) -> Result<Vec<Item>, ApiError> {
        let scope = user_ids.to_string();
        let rows = self.read("GetVpItems", |s| s.items.clone()).await?;
        self.state.lock().await.item_scopes.push(scope);
        Ok(rows)
    }

    async fn create_items(&self, items: &[Item]) -> Result<bool, ApiError> {
        self.wait_gate().await;
        let mut guard = self.record("CreateVpItems").await;
        for it in items {
            let id = Self::next_id(&mut guard);
            guard.items.push(Item {
                item_id: id,
                ..it.clone()
            });
        }
        Ok(true)
    }

    async fn update_items(&self, items: &[Item]) -> Result<bool, ApiError> {
        let mut guard = self.record("UpdateVpItems").await;
        if guard.fail_writes {
            return Err(ApiError::InvalidUrl("UpdateVpItems: backend unreachable".into()));
        }
        if guard.reject_writes {
            return Ok(false);
        }
        for it in items {
            if let Some(row) = guard.items.iter_mut().find(|r| r.item_id == it.item_id) {
                *row = it.clone();
            }
        }
        Ok(true)
    }

    async fn delete_item(&self, item_id: i64) -> Result<bool, ApiError> {
        let mut guard = self.record("DeleteVpItem").await;
        let before = guard.items.len();
        guard.items.retain(|i| i.item_id != item_id);
        Ok(before != guard.items.len())
    }

    async fn last_send_history(&self, item_id: i64) -> Result<Option<SendItemHistory>, ApiError> {
        let guard = self.record("GetLastSendItemHistory").await;
        Ok(guard
            .history
            .iter()
            .filter(|h| h.ext_item_id == item_id)
            .max_by_key(|h| h.id)
            .cloned())
    }

    async fn create_send_history(&self, history: &[SendItemHistory]) -> Result<bool, ApiError> {
        let mut guard = self.record("CreateSendItemHistory").await;
        guard.history.extend(history.iter().cloned());
        Ok(true)
    }

    async fn update_item_by_response(&self, response: &ExtItemResponse) -> Result<bool, ApiError> {
        let mut guard = self.record("UpdateItemByResponse").await;
        match guard
            .items
            .iter_mut()
            .find(|i| i.item_id == response.ext_item_id)
        {
            Some(row) => {
                row.last_status = Some(response.status.clone());
                row.last_action = Some(response.action.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CatalogApi for FakeBackend {
    async fn departments(&self, _public_token: &str) -> Result<Vec<Department>, ApiError> {
        self.read("GetDepartments", |_| {
            vec![Department {
                department_id: 1,
                department_name: "Drinks".into(),
                ..Default::default()
            }]
        })
        .await
    }

    async fn categories(&self, _public_token: &str) -> Result<Vec<Category>, ApiError> {
        self.read("GetAllCategories", |_| {
            vec![Category {
                category_id: 10,
                department_id: 1,
                category_name: "Soda".into(),
                ..Default::default()
            }]
        })
        .await
    }

    async fn categories_by_department(
        &self,
        public_token: &str,
        department_id: &str,
    ) -> Result<Vec<Category>, ApiError> {
        let all = self.categories(public_token).await?;
        Ok(all
            .into_iter()
            .filter(|c| c.department_id.to_string() == department_id)
            .collect())
    }

    async fn tax_codes(&self, _public_token: &str) -> Result<Vec<TaxCode>, ApiError> {
        self.read("GetTaxCodes", |_| Vec::new()).await
    }

    async fn brands(&self, _public_token: &str) -> Result<Vec<Brand>, ApiError> {
        self.read("GetBrands", |_| {
            vec![Brand {
                brand_id: 4,
                brand_name: "Acme".into(),
                brand_desc: String::new(),
            }]
        })
        .await
    }

    async fn report_codes(&self, _public_token: &str) -> Result<Vec<ReportCode>, ApiError> {
        self.read("GetReportCodes", |_| Vec::new()).await
    }

    async fn item_types(&self) -> Result<Vec<String>, ApiError> {
        self.read("GetItemTypes", |_| vec!["Standard".to_string()])
            .await
    }

    async fn item_statuses(&self) -> Result<Vec<String>, ApiError> {
        self.read("GetItemStatuses", |_| vec!["Active".to_string()])
            .await
    }

    async fn price_levels(&self, _public_token: &str) -> Result<Vec<PriceLevel>, ApiError> {
        self.read("GetPriceLevels", |_| {
            vec![PriceLevel {
                price_level: 2,
                price_level_name: "Wholesale".into(),
            }]
        })
        .await
    }

    async fn barcode_exists(&self, _public_token: &str, barcode: &str) -> Result<bool, ApiError> {
        let guard = self.record("BarcodesDuplicationCheck").await;
        Ok(guard.barcodes.contains(barcode))
    }

    async fn item_number_exists(
        &self,
        _public_token: &str,
        item_number: &str,
    ) -> Result<bool, ApiError> {
        let guard = self.record("ItemNumberDuplicationCheck").await;
        Ok(guard.item_numbers.contains(item_number))
    }

    async fn store_exists(&self, public_token: &str) -> Result<bool, ApiError> {
        let guard = self.record("IsStoreExistByPublicToken").await;
        Ok(guard.known_tokens.contains(public_token))
    }

    async fn search_items(
        &self,
        _public_token: &str,
        item_name: &str,
        item_number: &str,
    ) -> Result<Vec<Item>, ApiError> {
        let (name, number) = (item_name.to_string(), item_number.to_string());
        self.read("SearchItems", move |s| {
            s.catalog_items
                .iter()
                .filter(|i| name.is_empty() || i.item_name.contains(&name))
                .filter(|i| number.is_empty() || i.item_number == number)
                .cloned()
                .collect()
        })
        .await
    }

    async fn post_items(&self, items: &ExtItems) -> Result<Vec<ExtItemResponse>, ApiError> {
        let mut guard = self.record("PostItems").await;
        guard.posted.push(items.clone());
        if let Some(scripted) = guard.post_responses.pop_front() {
            return Ok(scripted);
        }
        let mut responses = Vec::new();
        for it in &items.ext_items {
            if let Some(row) = guard.items.iter_mut().find(|r| r.item_id == it.item_id) {
                row.last_status = Some("Successed".into());
            }
            responses.push(ExtItemResponse {
                ext_item_id: it.item_id,
                sd_item_id: it.sd_item_id.unwrap_or(it.item_id),
                message: format!("{} sent", it.item_name),
                action: "Create".into(),
                status: "Successed".into(),
                send_date: None,
            });
        }
        Ok(responses)
    }

    async fn item_barcodes(&self, _public_token: &str, item_id: i64) -> Result<Vec<Barcode>, ApiError> {
        self.read("GetItemBarcodes", move |s| {
            s.item_barcodes
                .iter()
                .filter(|b| b.item_id == item_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn post_item_barcode(&self, barcode: &PostBarcode) -> Result<bool, ApiError> {
        let mut guard = self.record("PostItemBarcode").await;
        guard.barcodes.insert(barcode.barcode_string.clone());
        guard.item_barcodes.push(Barcode {
            barcode: barcode.barcode_string.clone(),
            item_id: barcode.item_id,
            uid: 0,
            qty: 0.0,
        });
        Ok(true)
    }

    async fn item_price_levels(
        &self,
        _public_token: &str,
        item_id: i64,
    ) -> Result<Vec<ItemPriceLevel>, ApiError> {
        self.read("GetItemPriceLevels", move |s| {
            s.price_levels
                .iter()
                .filter(|p| p.item_id == item_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn create_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError> {
        let mut guard = self.record("CreateItemPriceLevel").await;
        guard.price_levels.push(level.item_price_level.clone());
        Ok(true)
    }

    async fn update_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError> {
        let mut guard = self.record("UpdateItemPriceLevel").await;
        let new = &level.item_price_level;
        match guard
            .price_levels
            .iter_mut()
            .find(|p| p.item_id == new.item_id && p.price_level == new.price_level)
        {
            Some(row) => {
                row.price = new.price;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_item_price_level(&self, level: &ExtItemPriceLevel) -> Result<bool, ApiError> {
        let mut guard = self.record("DeleteItemPriceLevel").await;
        let target = &level.item_price_level;
        let before = guard.price_levels.len();
        guard
            .price_levels
            .retain(|p| !(p.item_id == target.item_id && p.price_level == target.price_level));
        Ok(before != guard.price_levels.len())
    }
}
