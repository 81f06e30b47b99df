//! Login, registration and session management.

use crate::credentials::DEFAULT_TOKEN_LIFETIME_SECS;
use crate::error::{GatewayError, GatewayResult};
use crate::events::{GatewayEvent, LogoutReason};
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use trustagency_core::{AdminUser, LoginResponse, RegisterRequest, UserRole};

const ME_PATH: &str = "/api/admin/me";
const CHANGE_PASSWORD_PATH: &str = "/api/admin/change-password";

pub struct AuthApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { gateway: self }
    }
}

impl<'a> AuthApi<'a> {
    /// Authenticate and persist the session. Emits `AuthLogin` when the
    /// response carries an access token.
    pub async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse> {
        let options = RequestOptions::new().with_data(json!({
            "username": username,
            "password": password,
        }));
        let path = &self.gateway.config().login_path;
        let response: LoginResponse = self.gateway.fetch(Method::Post, path, options).await?;
        if self.store_session(&response)? {
            let username = response
                .user
                .as_ref()
                .map(|user| user.username.clone())
                .unwrap_or_else(|| username.to_string());
            debug!(%username, "Logged in");
            self.gateway
                .events()
                .emit(GatewayEvent::AuthLogin { username });
        }
        Ok(response)
    }

    /// Create an account. Tokens in the response are stored like a login.
    /// Emits `AuthRegister` once the account exists and any session is
    /// persisted.
    pub async fn register(&self, input: &RegisterRequest) -> GatewayResult<LoginResponse> {
        let options = RequestOptions::new().with_json(input)?;
        let path = &self.gateway.config().register_path;
        let response: LoginResponse = self.gateway.fetch(Method::Post, path, options).await?;
        self.store_session(&response)?;
        let username = response
            .user
            .as_ref()
            .map(|user| user.username.clone())
            .unwrap_or_else(|| input.username.clone());
        debug!(%username, "Registered");
        self.gateway
            .events()
            .emit(GatewayEvent::AuthRegister { username });
        Ok(response)
    }

    /// Best-effort server logout, then local session teardown. The server
    /// call is skipped when no access token is held.
    pub async fn logout(&self) {
        if matches!(self.gateway.token(), Ok(Some(_))) {
            let path = &self.gateway.config().logout_path;
            let options = RequestOptions::new().with_data(json!({}));
            if let Err(err) = self.gateway.request(Method::Post, path, options).await {
                warn!(error = %err, "Server logout failed; clearing local session anyway");
            }
        }
        self.gateway.end_session(LogoutReason::UserInitiated);
    }

    /// The user cached at login, if any.
    pub fn current_user(&self) -> GatewayResult<Option<AdminUser>> {
        Ok(self.gateway.credentials().current_user()?)
    }

    pub fn is_authenticated(&self) -> GatewayResult<bool> {
        Ok(self.gateway.token()?.is_some())
    }

    pub fn is_super_admin(&self) -> GatewayResult<bool> {
        Ok(self
            .current_user()?
            .map(|user| user.effective_role() == UserRole::SuperAdmin)
            .unwrap_or(false))
    }

    /// Fetch the signed-in user from the server, bypassing the cache, and
    /// refresh the cached copy.
    pub async fn me(&self) -> GatewayResult<AdminUser> {
        let user: AdminUser = self
            .gateway
            .fetch(Method::Get, ME_PATH, RequestOptions::new().skip_cache())
            .await?;
        self.gateway.credentials().set_current_user(&user)?;
        Ok(user)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> GatewayResult<Value> {
        let options = RequestOptions::new().with_data(json!({
            "old_password": old_password,
            "new_password": new_password,
        }));
        let payload = self
            .gateway
            .request(Method::Post, CHANGE_PASSWORD_PATH, options)
            .await?;
        Ok(payload.into_json().unwrap_or(Value::Null))
    }

    /// Persist tokens and user from a login-shaped response. Returns
    /// whether an access token was present.
    fn store_session(&self, response: &LoginResponse) -> GatewayResult<bool> {
        let Some(access_token) = response.access_token.as_deref() else {
            return Ok(false);
        };
        if access_token.is_empty() {
            return Err(GatewayError::Decode("empty access_token in login response".to_string()));
        }
        let credentials = self.gateway.credentials();
        credentials.set_token_with_expiry(
            access_token,
            response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        )?;
        if let Some(refresh_token) = response.refresh_token.as_deref() {
            credentials.set_refresh_token(Some(refresh_token))?;
        }
        if let Some(user) = &response.user {
            credentials.set_current_user(user)?;
        }
        Ok(true)
    }
}
