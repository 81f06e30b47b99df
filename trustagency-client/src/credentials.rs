//! Access/refresh token and cached-user persistence.

use crate::storage::{KeyValueStore, StorageError};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use trustagency_core::time::parse_timestamp;
use trustagency_core::{AdminUser, Timestamp};

pub const ACCESS_TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRES_AT_KEY: &str = "token_expires_at";
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Access token lifetime assumed when the server does not send `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Credentials persisted through a [`KeyValueStore`].
///
/// An access token whose expiry has passed is treated as absent and is
/// removed on read. The refresh token survives that removal.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The current access token, or `None` when absent or expired.
    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        let Some(token) = self.store.get(ACCESS_TOKEN_KEY)? else {
            return Ok(None);
        };
        if let Some(expires_at) = self.expires_at()? {
            if Utc::now() >= expires_at {
                debug!(%expires_at, "Access token expired; discarding");
                self.store.remove(ACCESS_TOKEN_KEY)?;
                self.store.remove(EXPIRES_AT_KEY)?;
                return Ok(None);
            }
        }
        Ok(Some(token))
    }

    pub fn expires_at(&self) -> Result<Option<Timestamp>, StorageError> {
        let Some(raw) = self.store.get(EXPIRES_AT_KEY)? else {
            return Ok(None);
        };
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            warn!(value = %raw, "Unparseable token expiry; treating token as unexpiring");
        }
        Ok(parsed)
    }

    /// Store `token` with the default lifetime, or remove the access token
    /// and its expiry when `None`.
    pub fn set_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        match token {
            Some(token) => self.set_token_with_expiry(token, DEFAULT_TOKEN_LIFETIME_SECS),
            None => {
                self.store.remove(ACCESS_TOKEN_KEY)?;
                self.store.remove(EXPIRES_AT_KEY)
            }
        }
    }

    pub fn set_token_with_expiry(&self, token: &str, expires_in_secs: u64) -> Result<(), StorageError> {
        let expires_at = i64::try_from(expires_in_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        self.store.set(ACCESS_TOKEN_KEY, token)?;
        self.store.set(EXPIRES_AT_KEY, &expires_at.to_rfc3339())
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn set_refresh_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        match token {
            Some(token) => self.store.set(REFRESH_TOKEN_KEY, token),
            None => self.store.remove(REFRESH_TOKEN_KEY),
        }
    }

    /// The user cached at login. A corrupt entry reads as no user.
    pub fn current_user(&self) -> Result<Option<AdminUser>, StorageError> {
        let Some(raw) = self.store.get(CURRENT_USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable cached user");
                Ok(None)
            }
        }
    }

    pub fn set_current_user(&self, user: &AdminUser) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(CURRENT_USER_KEY, &raw)
    }

    /// Remove access token, refresh token, expiry and cached user. Every
    /// key is attempted; the first failure is returned afterwards.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY, CURRENT_USER_KEY] {
            if let Err(err) = self.store.remove(key) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
