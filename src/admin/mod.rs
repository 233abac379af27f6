//! Client for the VpItem admin API (users, stores, relations, items, send
//! history).
use async_trait::async_trait;
use reqwest::Method;

use crate::catalog::model::ExtItemResponse;
use crate::http::{ApiError, HttpCore};

pub mod model;

use model::{Item, SendItemHistory, Store, StoreCreation, User, UserLevel, UserStoreRelation};

const PREFIX: &str = "api/VpItem/v1/";

fn path(op: &str) -> String {
    format!("{PREFIX}{op}")
}

/// Operations of the admin API. Non-200 responses resolve to the documented
/// default rather than an error.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn all_users(&self) -> Result<Vec<User>, ApiError>;
    /// Users managed by `my_user_id`.
    async fn my_users(&self, my_user_id: &str) -> Result<Vec<User>, ApiError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn update_users(&self, users: &[User]) -> Result<bool, ApiError>;
    async fn create_user(&self, user: &User) -> Result<bool, ApiError>;
    async fn delete_user(&self, user_id: &str) -> Result<i64, ApiError>;
    async fn user_levels(&self) -> Result<Vec<UserLevel>, ApiError>;

    async fn all_stores(&self) -> Result<Vec<Store>, ApiError>;
    async fn user_stores(&self, user_id: &str) -> Result<Vec<Store>, ApiError>;
    async fn update_stores(&self, stores: &[Store]) -> Result<bool, ApiError>;
    async fn create_store(&self, creation: &StoreCreation) -> Result<bool, ApiError>;
    async fn delete_store(&self, store_id: i64) -> Result<i64, ApiError>;

    async fn all_relations(&self) -> Result<Vec<UserStoreRelation>, ApiError>;
    async fn my_relations(&self, user_id: &str) -> Result<Vec<UserStoreRelation>, ApiError>;
    async fn update_relations(&self, relations: &[UserStoreRelation]) -> Result<bool, ApiError>;
    async fn create_relation(&self, relation: &UserStoreRelation) -> Result<bool, ApiError>;
    async fn delete_relation(&self, relation_id: i64) -> Result<i64, ApiError>;

    /// Items of a head office, limited to the comma-separated `user_ids`
    /// (empty for all).
    async fn items(&self, public_key: &str, user_ids: &str) -> Result<Vec<Item>, ApiError>;
    async fn create_items(&self, items: &[Item]) -> Result<bool, ApiError>;
    async fn update_items(&self, items: &[Item]) -> Result<bool, ApiError>;
    async fn delete_item(&self, item_id: i64) -> Result<bool, ApiError>;

    async fn last_send_history(&self, item_id: i64) -> Result<Option<SendItemHistory>, ApiError>;
    async fn create_send_history(&self, history: &[SendItemHistory]) -> Result<bool, ApiError>;
    async fn update_item_by_response(&self, response: &ExtItemResponse) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    core: HttpCore,
}

impl AdminClient {
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

    async fn post_flag<B: serde::Serialize + ?Sized + Sync>(
        &self,
        op: &str,
        body: &B,
    ) -> Result<bool, ApiError> {
        self.core
            .json_or(Method::POST, &path(op), &[], Some(body), false)
            .await
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        self.list("GetAllVpUsers", &[]).await
    }

    async fn my_users(&self, my_user_id: &str) -> Result<Vec<User>, ApiError> {
        self.list("GetMyVpUsers", &[("myUserID", my_user_id)]).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        self.core
            .get_json_or(&path("GetVpUserByEmail"), &[("email", email)], None)
            .await
    }

    async fn update_users(&self, users: &[User]) -> Result<bool, ApiError> {
        self.post_flag("UpdateVpUser", users).await
    }

    async fn create_user(&self, user: &User) -> Result<bool, ApiError> {
        self.post_flag("CreateVpUser", user).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<i64, ApiError> {
        self.core
            .delete_count(&path("DeleteVpUser"), &[("userID", user_id)])
            .await
    }

    async fn user_levels(&self) -> Result<Vec<UserLevel>, ApiError> {
        self.list("GetAllVpUserLevels", &[]).await
    }

    async fn all_stores(&self) -> Result<Vec<Store>, ApiError> {
        self.list("GetAllStores", &[]).await
    }

    async fn user_stores(&self, user_id: &str) -> Result<Vec<Store>, ApiError> {
        self.list("GetUserStores", &[("userID", user_id)]).await
    }

    async fn update_stores(&self, stores: &[Store]) -> Result<bool, ApiError> {
        self.post_flag("UpdateStores", stores).await
    }

    async fn create_store(&self, creation: &StoreCreation) -> Result<bool, ApiError> {
        self.post_flag("CreateStore", creation).await
    }

    async fn delete_store(&self, store_id: i64) -> Result<i64, ApiError> {
        let id = store_id.to_string();
        self.core
            .delete_count(&path("DeleteStore"), &[("storeID", id.as_str())])
            .await
    }

    async fn all_relations(&self) -> Result<Vec<UserStoreRelation>, ApiError> {
        self.list("GetAllUserStoreRelations", &[]).await
    }

    async fn my_relations(&self, user_id: &str) -> Result<Vec<UserStoreRelation>, ApiError> {
        self.list("GetMyUserStoreRelations", &[("userID", user_id)])
            .await
    }

    async fn update_relations(&self, relations: &[UserStoreRelation]) -> Result<bool, ApiError> {
        self.post_flag("UpdateUserStoreRelations", relations).await
    }

    async fn create_relation(&self, relation: &UserStoreRelation) -> Result<bool, ApiError> {
        self.post_flag("CreateUserStoreRelation", relation).await
    }

    async fn delete_relation(&self, relation_id: i64) -> Result<i64, ApiError> {
        let id = relation_id.to_string();
        self.core
            .delete_count(&path("DeleteUserStoreRelation"), &[("relationID", id.as_str())])
            .await
    }

    async fn items(&self, public_key: &str, user_ids: &str) -> Result<Vec<Item>, ApiError> {
        self.list("GetVpItems", &[("publicKey", public_key), ("userIds", user_ids)])
            .await
    }

    async fn create_items(&self, items: &[Item]) -> Result<bool, ApiError> {
        self.post_flag("CreateVpItems", items).await
    }

    async fn update_items(&self, items: &[Item]) -> Result<bool, ApiError> {
        self.post_flag("UpdateVpItems", items).await
    }

    async fn delete_item(&self, item_id: i64) -> Result<bool, ApiError> {
        let id = item_id.to_string();
        self.core
            .json_or::<(), bool>(
                Method::DELETE,
                &path("DeleteVpItem"),
                &[("itemID", id.as_str())],
                None,
                false,
            )
            .await
    }

    async fn last_send_history(&self, item_id: i64) -> Result<Option<SendItemHistory>, ApiError> {
        let id = item_id.to_string();
        self.core
            .get_json_or(&path("GetLastSendItemHistory"), &[("itemID", id.as_str())], None)
            .await
    }

    async fn create_send_history(&self, history: &[SendItemHistory]) -> Result<bool, ApiError> {
        self.post_flag("CreateSendItemHistory", history).await
    }

    async fn update_item_by_response(&self, response: &ExtItemResponse) -> Result<bool, ApiError> {
        self.post_flag("UpdateItemByResponse", response).await
    }
}
