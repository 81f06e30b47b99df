//! Article endpoints.

use super::with_query;
use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use serde_json::{json, Value};
use trustagency_core::{
    Article, ArticleInput, ArticleUpdate, ListShape, Page, QueryParams, RecordId,
};

const BASE: &str = "/api/articles";

pub struct ArticlesApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn articles(&self) -> ArticlesApi<'_> {
        ArticlesApi { gateway: self }
    }
}

impl<'a> ArticlesApi<'a> {
    pub async fn list(&self, filters: &QueryParams) -> GatewayResult<Page<Article>> {
        self.gateway
            .fetch_page(&with_query(BASE, filters), ListShape::DataTotal, RequestOptions::new())
            .await
    }

    /// Keyword search; never served from cache.
    pub async fn search(&self, keyword: &str, filters: &QueryParams) -> GatewayResult<Vec<Article>> {
        let mut params = QueryParams::new().with("keyword", keyword);
        params.extend(filters.clone());
        let page = self
            .gateway
            .fetch_page(
                &with_query(&format!("{}/search/by-keyword", BASE), &params),
                ListShape::Bare,
                RequestOptions::new().skip_cache(),
            )
            .await?;
        Ok(page.items)
    }

    pub async fn get(&self, id: RecordId) -> GatewayResult<Article> {
        self.gateway
            .fetch(Method::Get, &format!("{}/{}", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn by_slug(&self, slug: &str) -> GatewayResult<Article> {
        let path = format!("{}/by-slug/{}", BASE, urlencoding::encode(slug));
        self.gateway
            .fetch(Method::Get, &path, RequestOptions::new())
            .await
    }

    pub async fn by_section(&self, section_slug: &str, filters: &QueryParams) -> GatewayResult<Vec<Article>> {
        let path = format!("{}/by-section/{}", BASE, urlencoding::encode(section_slug));
        let page = self
            .gateway
            .fetch_page(&with_query(&path, filters), ListShape::Bare, RequestOptions::new())
            .await?;
        Ok(page.items)
    }

    pub async fn create(&self, input: &ArticleInput) -> GatewayResult<Article> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway.fetch(Method::Post, BASE, options).await
    }

    pub async fn update(&self, id: RecordId, update: &ArticleUpdate) -> GatewayResult<Article> {
        let options = RequestOptions::new().with_json(update)?;
        self.gateway
            .fetch(Method::Put, &format!("{}/{}", BASE, id), options)
            .await
    }

    pub async fn delete(&self, id: RecordId) -> GatewayResult<()> {
        self.gateway.delete(&format!("{}/{}", BASE, id)).await?;
        Ok(())
    }

    pub async fn publish(&self, id: RecordId) -> GatewayResult<Article> {
        self.gateway
            .fetch(Method::Post, &format!("{}/{}/publish", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn unpublish(&self, id: RecordId) -> GatewayResult<Article> {
        self.gateway
            .fetch(Method::Post, &format!("{}/{}/unpublish", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn batch_delete(&self, ids: &[RecordId]) -> GatewayResult<Value> {
        self.batch("batch-delete", ids).await
    }

    pub async fn batch_publish(&self, ids: &[RecordId]) -> GatewayResult<Value> {
        self.batch("batch-publish", ids).await
    }

    async fn batch(&self, action: &str, ids: &[RecordId]) -> GatewayResult<Value> {
        let options = RequestOptions::new().with_data(json!({ "ids": ids }));
        let payload = self
            .gateway
            .request(Method::Post, &format!("{}/{}", BASE, action), options)
            .await?;
        Ok(payload.into_json().unwrap_or(Value::Null))
    }
}
