//! Users managed by the logged-in account.
use async_trait::async_trait;
use std::sync::Arc;

use super::{parse, EntityTable, RowAction, RowValidator, TableError};
use crate::admin::model::{Role, User};
use crate::admin::AdminApi;
use crate::auth::{CredentialVerifier, DEFAULT_PASSWORD};
use crate::cache::{Entity, EntitySource};
use crate::edit::Editable;
use crate::http::ApiError;
use crate::validation::{self, FieldErrors};

pub type UserTable = EntityTable<User, UserSource, UserValidator>;

impl Entity for User {
    type Id = String;
    const BUCKET: &'static str = "users";

    fn id(&self) -> Option<String> {
        self.user_id.clone().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserField {
    Name(String),
    Email(String),
    UserLevelId(String),
    IsNewUser(bool),
}

impl Editable for User {
    type Field = UserField;

    fn field_name(field: &UserField) -> &'static str {
        match field {
            UserField::Name(_) => "Name",
            UserField::Email(_) => "Email",
            UserField::UserLevelId(_) => "UserLevelID",
            UserField::IsNewUser(_) => "IsNewUser",
        }
    }

    fn apply(&mut self, field: UserField) {
        match field {
            UserField::Name(v) => self.name = v,
            UserField::Email(v) => self.email = v,
            UserField::UserLevelId(v) => self.user_level_id = v,
            UserField::IsNewUser(v) => self.is_new_user = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<UserField, String> {
        Ok(match name {
            "Name" => UserField::Name(value.to_string()),
            "Email" => UserField::Email(value.to_string()),
            "UserLevelID" => UserField::UserLevelId(value.trim().to_string()),
            "IsNewUser" => UserField::IsNewUser(parse::flag(name, value)?),
            other => return Err(format!("unknown user field {other}")),
        })
    }
}

/// Users visible to `me`.
pub struct UserSource {
    admin: Arc<dyn AdminApi>,
    me: User,
}

impl UserSource {
    pub fn new(admin: Arc<dyn AdminApi>, me: User) -> Self {
        Self { admin, me }
    }
}

#[async_trait]
impl EntitySource<User> for UserSource {
    async fn fetch(&self) -> Result<Vec<User>, ApiError> {
        let me = self.me.user_id.as_deref().unwrap_or_default();
        self.admin.my_users(me).await
    }

    async fn create(&self, entity: &User) -> Result<bool, ApiError> {
        self.admin.create_user(entity).await
    }

    async fn update(&self, batch: &[User]) -> Result<bool, ApiError> {
        self.admin.update_users(batch).await
    }

    async fn delete(&self, id: &String) -> Result<bool, ApiError> {
        Ok(self.admin.delete_user(id).await? > 0)
    }
}

/// Checks user rows and fills in the fields of accounts `creator` creates.
pub struct UserValidator {
    creator: User,
    verifier: Arc<dyn CredentialVerifier>,
}

impl UserValidator {
    pub fn new(creator: User, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { creator, verifier }
    }

    fn creator_role(&self) -> Option<Role> {
        self.creator.role()
    }
}

#[async_trait]
impl RowValidator<User> for UserValidator {
    async fn validate_field(&self, _original: &User, field: &UserField) -> Result<Option<String>, ApiError> {
        Ok(match field {
            UserField::Name(v) => validation::required(v),
            UserField::Email(v) => validation::email(v),
            UserField::UserLevelId(v) => validation::required(v),
            UserField::IsNewUser(_) => None,
        })
    }

    async fn validate_new(&self, mut user: User) -> Result<User, TableError> {
        let mut errors = FieldErrors::new();
        errors
            .check("Name", validation::required(&user.name))
            .check("Email", validation::email(&user.email));
        if !errors.is_empty() {
            return Err(TableError::Invalid(errors));
        }

        let level = self
            .creator_role()
            .and_then(|r| r.child())
            .ok_or(TableError::Forbidden("create users"))?;
        user.user_id = None;
        user.user_level_id = level.level().to_string();
        user.manager_user_id = self.creator.user_id.clone();
        user.is_new_user = true;
        user.password = self.verifier.hash(DEFAULT_PASSWORD)?;
        Ok(user)
    }

    fn allows(&self, _action: RowAction) -> bool {
        self.creator_role().is_some_and(|r| r.can_manage())
    }
}

pub fn user_table(admin: Arc<dyn AdminApi>, verifier: Arc<dyn CredentialVerifier>, me: User) -> UserTable {
    EntityTable::new(
        UserSource::new(admin, me.clone()),
        UserValidator::new(me, verifier),
    )
}
