//! Site section endpoints.

use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use trustagency_core::{ListShape, Page, RecordId, Section, SectionInput};

const BASE: &str = "/api/sections";

pub struct SectionsApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn sections(&self) -> SectionsApi<'_> {
        SectionsApi { gateway: self }
    }
}

impl<'a> SectionsApi<'a> {
    pub async fn list(&self) -> GatewayResult<Page<Section>> {
        self.gateway
            .fetch_page(BASE, ListShape::DataTotal, RequestOptions::new())
            .await
    }

    pub async fn get(&self, id: RecordId) -> GatewayResult<Section> {
        self.gateway
            .fetch(Method::Get, &format!("{}/{}", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn create(&self, input: &SectionInput) -> GatewayResult<Section> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway.fetch(Method::Post, BASE, options).await
    }

    pub async fn update(&self, id: RecordId, input: &SectionInput) -> GatewayResult<Section> {
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
