//! File upload endpoints.

use crate::error::GatewayResult;
use crate::gateway::RequestGateway;
use crate::transport::{ProgressFn, UploadFile};
use futures_util::future::join_all;
use trustagency_core::UploadResult;

const IMAGE_PATH: &str = "/api/upload/image";
const FILE_PATH: &str = "/api/upload/file";
const DEFAULT_IMAGE_CATEGORY: &str = "general";

pub struct UploadsApi<'a> {
    gateway: &'a RequestGateway,
}

impl RequestGateway {
    pub fn uploads(&self) -> UploadsApi<'_> {
        UploadsApi { gateway: self }
    }
}

impl<'a> UploadsApi<'a> {
    /// Upload an image into `category` (`logos`, `articles`, `general`).
    pub async fn upload_image(
        &self,
        file: UploadFile,
        category: Option<&str>,
        progress: Option<ProgressFn>,
    ) -> GatewayResult<UploadResult> {
        let fields = vec![(
            "category".to_string(),
            category.unwrap_or(DEFAULT_IMAGE_CATEGORY).to_string(),
        )];
        self.gateway
            .upload(IMAGE_PATH, file, fields, progress)
            .await?
            .decode()
    }

    pub async fn upload_file(
        &self,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> GatewayResult<UploadResult> {
        self.gateway
            .upload(FILE_PATH, file, Vec::new(), progress)
            .await?
            .decode()
    }

    /// Upload several images concurrently. Results keep input order and
    /// one failure does not cancel the others.
    pub async fn upload_images(
        &self,
        files: Vec<UploadFile>,
        category: Option<&str>,
    ) -> Vec<GatewayResult<UploadResult>> {
        join_all(
            files
                .into_iter()
                .map(|file| self.upload_image(file, category, None)),
        )
        .await
    }
}
