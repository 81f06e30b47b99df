//! Dashboard and user administration endpoints.

use super::with_query;
use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use serde_json::Value;
use trustagency_core::{AdminStats, AdminUser, ListShape, QueryParams};

pub struct AdminApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi { gateway: self }
    }
}

impl<'a> AdminApi<'a> {
    pub async fn stats(&self) -> GatewayResult<AdminStats> {
        self.gateway
            .fetch(Method::Get, "/api/admin/stats", RequestOptions::new())
            .await
    }

    pub async fn users(&self, filters: &QueryParams) -> GatewayResult<Vec<AdminUser>> {
        let page = self
            .gateway
            .fetch_page(
                &with_query("/api/admin/users", filters),
                ListShape::Bare,
                RequestOptions::new(),
            )
            .await?;
        Ok(page.items)
    }

    /// Backend liveness; never cached.
    pub async fn health(&self) -> GatewayResult<Value> {
        let payload = self
            .gateway
            .request(Method::Get, "/api/health", RequestOptions::new().skip_cache())
            .await?;
        Ok(payload.into_json().unwrap_or(Value::Null))
    }
}
