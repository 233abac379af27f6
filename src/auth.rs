//! Login, the persisted session and the route guard.
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::admin::model::{Role, User};
use crate::admin::AdminApi;
use crate::http::ApiError;

/// Static marker stored next to the user in the session file.
pub const SESSION_MARKER: &str = "vp-admin-session";
/// Password given to new accounts and on reset.
pub const DEFAULT_PASSWORD: &str = "123456";
pub const BCRYPT_COST: u32 = 10;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Current Password is incorrect")]
    WrongCurrentPassword,
    #[error("New Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("New Password and Confirm Password do not match")]
    PasswordMismatch,
    #[error("Failed to update password")]
    UpdateRejected,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Password hashing and comparison.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, password: &str, hash: &str) -> bool;
    fn hash(&self, password: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self { cost: BCRYPT_COST }
    }
}

impl BcryptVerifier {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl CredentialVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        // a malformed stored hash is a mismatch
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }
}

/// Who is logged in, if anyone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The logged-in user, or [`AuthError::NotLoggedIn`].
    pub fn require(&self) -> Result<&User, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotLoggedIn)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(User::role)
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
}

/// JSON session file with a `user` and a `token` key.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file, or one lacking either key, is an anonymous session.
    pub fn load(&self) -> Result<Session, AuthError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::anonymous()),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = serde_json::from_str(&raw)?;
        match (file.user, file.token) {
            (Some(user), Some(token)) if !token.is_empty() => Ok(Session::for_user(user)),
            _ => Ok(Session::anonymous()),
        }
    }

    pub fn save(&self, user: &User) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            user: Some(user.clone()),
            token: Some(SESSION_MARKER.to_string()),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    SdToItems,
    Admins,
    Profile,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::SdToItems => "/sdtoitems",
            Route::Admins => "/admins",
            Route::Profile => "/profile",
            Route::Settings => "/settings",
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        [
            Route::Login,
            Route::Dashboard,
            Route::SdToItems,
            Route::Admins,
            Route::Profile,
            Route::Settings,
        ]
        .into_iter()
        .find(|r| r.path() == path)
    }

    /// Where a request for `path` lands: unknown paths go to the dashboard,
    /// and everything but the login page needs a session.
    pub fn resolve(path: &str, session: &Session) -> Route {
        let route = Route::parse(path).unwrap_or(Route::Dashboard);
        if route != Route::Login && !session.is_logged_in() {
            return Route::Login;
        }
        route
    }
}

pub struct Authenticator {
    admin: Arc<dyn AdminApi>,
    verifier: Arc<dyn CredentialVerifier>,
    store: SessionStore,
}

impl Authenticator {
    pub fn new(
        admin: Arc<dyn AdminApi>,
        verifier: Arc<dyn CredentialVerifier>,
        store: SessionStore,
    ) -> Self {
        Self {
            admin,
            verifier,
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn session(&self) -> Result<Session, AuthError> {
        self.store.load()
    }

    /// Check the credentials against the stored hash and persist the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<Route, AuthError> {
        let Some(user) = self.admin.user_by_email(email).await? else {
            warn!(email, "login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.verifier.verify(password, &user.password) {
            warn!(email, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        self.store.save(&user)?;
        info!(email, "logged in");
        Ok(Route::Dashboard)
    }

    pub fn logout(&self) -> Result<Route, AuthError> {
        self.store.clear()?;
        info!("logged out");
        Ok(Route::Login)
    }
}

/// Replace `user`'s password after checking the current one. Returns the
/// updated user.
pub async fn change_password(
    admin: &dyn AdminApi,
    verifier: &dyn CredentialVerifier,
    user: &User,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<User, AuthError> {
    if !verifier.verify(current, &user.password) {
        return Err(AuthError::WrongCurrentPassword);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    if new != confirm {
        return Err(AuthError::PasswordMismatch);
    }
    store_password(admin, verifier, user, new).await
}

/// Put `user` back on the default password.
pub async fn reset_password(
    admin: &dyn AdminApi,
    verifier: &dyn CredentialVerifier,
    user: &User,
) -> Result<User, AuthError> {
    store_password(admin, verifier, user, DEFAULT_PASSWORD).await
}

async fn store_password(
    admin: &dyn AdminApi,
    verifier: &dyn CredentialVerifier,
    user: &User,
    password: &str,
) -> Result<User, AuthError> {
    let mut updated = user.clone();
    updated.password = verifier.hash(password)?;
    if !admin.update_users(std::slice::from_ref(&updated)).await? {
        return Err(AuthError::UpdateRejected);
    }
    info!(user_id = ?updated.user_id, "password updated");
    Ok(updated)
}
