//! AI provider configuration endpoints.

use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use trustagency_core::{
    AiConfig, AiConfigInput, AiConfigTestRequest, AiConfigTestResult, ListShape, Page, RecordId,
};

const BASE: &str = "/api/ai-configs";

pub struct AiConfigsApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn ai_configs(&self) -> AiConfigsApi<'_> {
        AiConfigsApi { gateway: self }
    }
}

impl<'a> AiConfigsApi<'a> {
    pub async fn list(&self) -> GatewayResult<Page<AiConfig>> {
        self.gateway
            .fetch_page(BASE, ListShape::DataTotal, RequestOptions::new())
            .await
    }

    pub async fn get(&self, id: RecordId) -> GatewayResult<AiConfig> {
        self.gateway
            .fetch(Method::Get, &format!("{}/{}", BASE, id), RequestOptions::new())
            .await
    }

    pub async fn create(&self, input: &AiConfigInput) -> GatewayResult<AiConfig> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway.fetch(Method::Post, BASE, options).await
    }

    pub async fn update(&self, id: RecordId, input: &AiConfigInput) -> GatewayResult<AiConfig> {
        let options = RequestOptions::new().with_json(input)?;
        self.gateway
            .fetch(Method::Put, &format!("{}/{}", BASE, id), options)
            .await
    }

    pub async fn delete(&self, id: RecordId) -> GatewayResult<()> {
        self.gateway.delete(&format!("{}/{}", BASE, id)).await?;
        Ok(())
    }

    /// Probe a provider endpoint with the given credentials.
    pub async fn test(&self, probe: &AiConfigTestRequest) -> GatewayResult<AiConfigTestResult> {
        let options = RequestOptions::new().with_json(probe)?;
        self.gateway
            .fetch(Method::Post, &format!("{}/test", BASE), options)
            .await
    }

    pub async fn default_config(&self) -> GatewayResult<AiConfig> {
        self.gateway
            .fetch(Method::Get, &format!("{}/default/config", BASE), RequestOptions::new())
            .await
    }

    pub async fn set_default(&self, id: RecordId) -> GatewayResult<AiConfig> {
        self.gateway
            .fetch(
                Method::Post,
                &format!("{}/{}/set-default", BASE, id),
                RequestOptions::new(),
            )
            .await
    }
}
