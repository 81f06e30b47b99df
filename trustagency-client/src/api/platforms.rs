//! Trading platform endpoints.

use super::with_query;
use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use trustagency_core::{
    ListShape, Page, Platform, PlatformInput, PlatformUpdate, QueryParams, RecordId,
};

const BASE: &str = "/api/platforms";

pub struct PlatformsApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn platforms(&self) -> PlatformsApi<'_> {
        PlatformsApi { gateway: self }
    }
}

impl<'a> PlatformsApi<'a> {
    pub async fn list(&self, filters: &QueryParams) -> GatewayResult<Page<Platform>> {
        self.gateway
            .fetch_page(&with_query(BASE, filters), ListShape::DataTotal, RequestOptions::new())
            .await
    }

    /// Free-text search; never served from cache.
    pub async fn search(&self, query: &str, filters: &QueryParams) -> GatewayResult<Page<Platform>> {
        let mut params = QueryParams::new().with("search", query);
        params.extend(filters.clone());
        self.gateway
            .fetch_page(
                &with_query(BASE, &params),
                ListShape::DataTotal,
                RequestOptions::new().skip_cache(),
            )
            .await
    }

    pub async fn get(&self, id: RecordId) -> GatewayResult<Platform> {
        self.gateway
            .fetch(Method::Get, &format!("{}/{}", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn create(&self, input: &PlatformInput) -> GatewayResult<Platform> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway.fetch(Method::Post, BASE, options).await
    }

    pub async fn update(&self, id: RecordId, update: &PlatformUpdate) -> GatewayResult<Platform> {
        let options = RequestOptions::new().with_json(update)?;
        self.gateway
            .fetch(Method::Put, &format!("{}/{}", BASE, id), options)
            .await
    }

    pub async fn delete(&self, id: RecordId) -> GatewayResult<()> {
        self.gateway.delete(&format!("{}/{}", BASE, id)).await?;
        Ok(())
    }

    pub async fn toggle_status(&self, id: RecordId) -> GatewayResult<Platform> {
        self.gateway
            .fetch(
                Method::Post,
                &format!("{}/{}/toggle-status", BASE, id),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn toggle_featured(&self, id: RecordId) -> GatewayResult<Platform> {
        self.gateway
            .fetch(
                Method::Post,
                &format!("{}/{}/toggle-featured", BASE, id),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn featured(&self) -> GatewayResult<Vec<Platform>> {
        let page = self
            .gateway
            .fetch_page(&format!("{}/featured/list", BASE), ListShape::Bare, RequestOptions::new())
            .await?;
        Ok(page.items)
    }

    pub async fn regulated(&self) -> GatewayResult<Vec<Platform>> {
        let page = self
            .gateway
            .fetch_page(&format!("{}/regulated/list", BASE), ListShape::Bare, RequestOptions::new())
            .await?;
        Ok(page.items)
    }
}
