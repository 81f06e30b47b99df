//! Website settings endpoints.

use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use serde_json::Value;
use trustagency_core::WebsiteSettings;

const BASE: &str = "/api/website-settings";

pub struct SettingsApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi { gateway: self }
    }
}

impl<'a> SettingsApi<'a> {
    pub async fn get(&self) -> GatewayResult<WebsiteSettings> {
        self.gateway
            .fetch(Method::Get, &format!("{}/", BASE), RequestOptions::new())
            .await
    }

    /// Only the fields set on `update` are sent.
    pub async fn update(&self, update: &WebsiteSettings) -> GatewayResult<WebsiteSettings> {
        let options = RequestOptions::new().with_json(update)?;
        let settings = self
            .gateway
            .fetch(Method::Put, &format!("{}/", BASE), options)
            .await?;
        // Drop the stale cached copy.
        self.gateway.clear_cache();
        Ok(settings)
    }

    pub async fn seo(&self) -> GatewayResult<Value> {
        self.section("seo").await
    }

    pub async fn analytics(&self) -> GatewayResult<Value> {
        self.section("analytics").await
    }

    pub async fn footer(&self) -> GatewayResult<Value> {
        self.section("footer").await
    }

    async fn section(&self, name: &str) -> GatewayResult<Value> {
        let payload = self
            .gateway
            .get(&format!("{}/{}", BASE, name), None)
            .await?;
        Ok(payload.into_json().unwrap_or(Value::Null))
    }
}
