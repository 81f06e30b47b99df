//! AI article-generation task endpoints.
//!
//! Task state changes underneath the client, so status reads bypass the
//! cache.

use super::with_query;
use crate::error::GatewayResult;
use crate::gateway::{RequestGateway, RequestOptions};
use crate::transport::Method;
use serde::Serialize;
use serde_json::Value;
use trustagency_core::{
    AiTask, ListShape, Page, QueryParams, TaskCancelResult, TaskDetails, TaskGenerationRequest,
    TaskProgress, TaskStatusReport, TaskSubmission,
};

const BASE: &str = "/api/tasks";

pub struct TasksApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi { gateway: self }
    }
}

impl<'a> TasksApi<'a> {
    pub async fn list(&self, filters: &QueryParams) -> GatewayResult<Page<AiTask>> {
        self.gateway
            .fetch_page(
                &with_query(BASE, filters),
                ListShape::ItemsTotal,
                RequestOptions::new().skip_cache(),
            )
            .await
    }

    pub async fn get(&self, task_id: &str) -> GatewayResult<TaskDetails> {
        self.gateway
            .fetch(Method::Get, &task_path(task_id, "details"), RequestOptions::new().skip_cache())
            .await
    }

    pub async fn generate(&self, request: &TaskGenerationRequest) -> GatewayResult<TaskSubmission> {
        let options = RequestOptions::new().with_json(request)?;
        self.gateway
            .fetch(Method::Post, &format!("{}/generate-articles", BASE), options)
            .await
    }

    pub async fn batch_generate<B: Serialize + ?Sized>(&self, batch: &B) -> GatewayResult<Value> {
        let options = RequestOptions::new().with_json(batch)?;
        let payload = self
            .gateway
            .request(Method::Post, &format!("{}/batch-generate", BASE), options)
            .await?;
        Ok(payload.into_json().unwrap_or(Value::Null))
    }

    pub async fn status(&self, task_id: &str) -> GatewayResult<TaskStatusReport> {
        self.gateway
            .fetch(Method::Get, &task_path(task_id, "status"), RequestOptions::new().skip_cache())
            .await
    }

    pub async fn progress(&self, task_id: &str) -> GatewayResult<TaskProgress> {
        self.gateway
            .fetch(Method::Get, &task_path(task_id, "progress"), RequestOptions::new().skip_cache())
            .await
    }

    pub async fn cancel(&self, task_id: &str) -> GatewayResult<TaskCancelResult> {
        self.gateway
            .fetch(Method::Post, &task_path(task_id, "cancel"), RequestOptions::new())
            .await
    }

    pub async fn retry(&self, task_id: &str) -> GatewayResult<TaskSubmission> {
        self.gateway
            .fetch(Method::Post, &task_path(task_id, "retry"), RequestOptions::new())
            .await
    }

    pub async fn delete(&self, task_id: &str) -> GatewayResult<()> {
        self.gateway
            .delete(&format!("{}/{}", BASE, urlencoding::encode(task_id)))
            .await?;
        Ok(())
    }

    pub async fn health(&self) -> GatewayResult<Value> {
        self.raw(Method::Get, &format!("{}/health", BASE), RequestOptions::new().skip_cache())
            .await
    }

    /// Reset tasks stuck in `processing` without a live worker.
    pub async fn recover_stuck(&self) -> GatewayResult<Value> {
        self.raw(Method::Post, &format!("{}/recovery/stuck", BASE), RequestOptions::new())
            .await
    }

    /// Fail tasks that exceeded their time budget.
    pub async fn recover_timeout(&self) -> GatewayResult<Value> {
        self.raw(Method::Post, &format!("{}/recovery/timeout", BASE), RequestOptions::new())
            .await
    }

    async fn raw(&self, method: Method, path: &str, options: RequestOptions) -> GatewayResult<Value> {
        let payload = self.gateway.request(method, path, options).await?;
        Ok(payload.into_json().unwrap_or(Value::Null))
    }
}

fn task_path(task_id: &str, action: &str) -> String {
    format!("{}/{}/{}", BASE, urlencoding::encode(task_id), action)
}
