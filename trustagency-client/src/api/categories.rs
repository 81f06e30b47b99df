//! Category endpoints. Lists are bare arrays.

use super::with_query;
use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use trustagency_core::{Category, CategoryInput, ListShape, QueryParams, RecordId};

const BASE: &str = "/api/categories";

pub struct CategoriesApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn categories(&self) -> CategoriesApi<'_> {
        CategoriesApi { gateway: self }
    }
}

impl<'a> CategoriesApi<'a> {
    pub async fn list(&self, filters: &QueryParams) -> GatewayResult<Vec<Category>> {
        let page = self
            .gateway
            .fetch_page(&with_query(BASE, filters), ListShape::Bare, RequestOptions::new())
            .await?;
        Ok(page.items)
    }

    pub async fn by_section(&self, section_id: RecordId) -> GatewayResult<Vec<Category>> {
        let page = self
            .gateway
            .fetch_page(
                &format!("{}/section/{}", BASE, section_id),
                ListShape::Bare,
                RequestOptions::new(),
            )
            .await?;
        Ok(page.items)
    }

    pub async fn get(&self, id: RecordId) -> GatewayResult<Category> {
        self.gateway
            .fetch(Method::Get, &format!("{}/{}", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn create(&self, input: &CategoryInput) -> GatewayResult<Category> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway.fetch(Method::Post, BASE, options).await
    }

    pub async fn update(&self, id: RecordId, input: &CategoryInput) -> GatewayResult<Category> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway
            .fetch(Method::Put, &format!("{}/{}", BASE, id), options)
            .await
    }

    pub async fn delete(&self, id: RecordId) -> GatewayResult<()> {
        self.gateway.delete(&format!("{}/{}", BASE, id)).await?;
        Ok(())
    }
}
