//! Smoke tests for the typed resource APIs and multipart uploads against
//! the scripted transport.

use serde_json::json;
use std::sync::{Arc, Mutex};
use trustagency_client::{Method, ProgressFn, UploadFile};
use trustagency_core::{
    ArticleUpdate, QueryParams, TaskGenerationRequest, TaskStatus, WebsiteSettings,
};
use trustagency_test_utils::assertions::assert_http_status;
use trustagency_test_utils::fixtures::{
    article_json, category_json, data_page, items_page, platform_json, section_json, task_json,
};
use trustagency_test_utils::{test_gateway, MockResponse};

// ============================================================================
// LIST SHAPES
// ============================================================================

#[tokio::test]
async fn platform_list_reads_data_total() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Get,
        "/api/platforms?skip=0&limit=2",
        MockResponse::ok_json(data_page(
            vec![platform_json(1, "Alpha"), platform_json(2, "Beta")],
            7,
        )),
    );

    let page = harness
        .gateway
        .platforms()
        .list(&QueryParams::new().with("skip", 0).with("limit", 2))
        .await
        .unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.len(), 2);
    assert!(page.has_more(0));
    assert_eq!(page.items[1].name, "Beta");
}

#[tokio::test]
async fn task_list_reads_items_total_and_skips_cache() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Get,
        "/api/tasks",
        MockResponse::ok_json(items_page(vec![task_json("batch-1", "completed")], 1)),
    );
    let tasks = harness.gateway.tasks();

    let page = tasks.list(&QueryParams::new()).await.unwrap();
    tasks.list(&QueryParams::new()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].status, TaskStatus::Completed);
    assert_eq!(harness.transport.count(Method::Get, "/api/tasks"), 2);
}

#[tokio::test]
async fn category_list_reads_bare_array() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Get,
        "/api/categories/section/3",
        MockResponse::ok_json(json!([category_json(1, 3, "Forex"), category_json(2, 3, "Crypto")])),
    );

    let categories = harness.gateway.categories().by_section(3).await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].section_id, Some(3));
}

#[tokio::test]
async fn article_filters_are_encoded_into_the_path() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Get,
        "/api/articles",
        MockResponse::ok_json(data_page(vec![article_json(1, "Leverage Basics")], 1)),
    );
    let filters = QueryParams::new()
        .with("section_id", 2)
        .with("category_id", Option::<i64>::None)
        .with("search", "");

    harness.gateway.articles().list(&filters).await.unwrap();
    assert_eq!(harness.transport.last().unwrap().path, "/api/articles?section_id=2");
}

#[tokio::test]
async fn list_filters_yield_distinct_cache_entries() {
    let harness = test_gateway();
    harness
        .transport
        .on(Method::Get, "/api/articles", MockResponse::ok_json(data_page(vec![], 0)));
    let articles = harness.gateway.articles();

    articles.list(&QueryParams::new().with("skip", 0)).await.unwrap();
    articles.list(&QueryParams::new().with("skip", 20)).await.unwrap();
    articles.list(&QueryParams::new().with("skip", 0)).await.unwrap();
    assert_eq!(harness.transport.count(Method::Get, "/api/articles"), 2);
}

// ============================================================================
// SINGLE RESOURCES
// ============================================================================

#[tokio::test]
async fn section_get_and_delete() {
    let harness = test_gateway();
    harness
        .transport
        .on(Method::Get, "/api/sections/4", MockResponse::ok_json(section_json(4, "faq")))
        .on(Method::Delete, "/api/sections/4", MockResponse::no_content());
    let sections = harness.gateway.sections();

    let section = sections.get(4).await.unwrap();
    assert_eq!(section.slug, "faq");
    sections.delete(4).await.unwrap();
    assert_eq!(harness.transport.count(Method::Delete, "/api/sections/4"), 1);
}

#[tokio::test]
async fn article_update_sends_only_set_fields() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Put,
        "/api/articles/5",
        MockResponse::ok_json(article_json(5, "Renamed")),
    );
    let update = ArticleUpdate {
        title: Some("Renamed".to_string()),
        ..ArticleUpdate::default()
    };

    let article = harness.gateway.articles().update(5, &update).await.unwrap();
    assert_eq!(article.title, "Renamed");
    assert_eq!(harness.transport.last().unwrap().json, Some(json!({"title": "Renamed"})));
}

#[tokio::test]
async fn missing_platform_is_not_found() {
    let harness = test_gateway();
    let result = harness.gateway.platforms().get(99).await;
    assert_http_status(&result, 404);
}

#[tokio::test]
async fn task_generation_submits_titles() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Post,
        "/api/tasks/generate-articles",
        MockResponse::ok_json(json!({
            "task_id": "batch-42",
            "celery_task_id": "c-1",
            "status": "pending",
            "message": "queued",
        })),
    );
    let request = TaskGenerationRequest {
        titles: vec!["One".to_string(), "Two".to_string()],
        section_id: 1,
        category_id: 2,
        platform_id: None,
        batch_name: None,
        ai_config_id: None,
    };

    let submission = harness.gateway.tasks().generate(&request).await.unwrap();
    assert_eq!(submission.task_id, "batch-42");
    assert_eq!(submission.status, TaskStatus::Pending);
    let sent = harness.transport.last().unwrap().json.unwrap();
    assert_eq!(sent["titles"], json!(["One", "Two"]));
}

#[tokio::test]
async fn settings_update_clears_cache() {
    let harness = test_gateway();
    harness
        .transport
        .on(Method::Get, "/api/website-settings/", MockResponse::ok_json(json!({"site_title": "Old"})))
        .on(Method::Put, "/api/website-settings/", MockResponse::ok_json(json!({"site_title": "New"})));
    let settings = harness.gateway.settings();

    settings.get().await.unwrap();
    let update = WebsiteSettings {
        site_title: Some("New".to_string()),
        ..WebsiteSettings::default()
    };
    settings.update(&update).await.unwrap();
    settings.get().await.unwrap();
    assert_eq!(harness.transport.count(Method::Get, "/api/website-settings/"), 2);
}

// ============================================================================
// UPLOADS
// ============================================================================

fn recorder() -> (ProgressFn, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressFn = Arc::new(move |pct| sink.lock().unwrap().push(pct));
    (progress, seen)
}

#[tokio::test]
async fn image_upload_reports_progress() {
    let harness = test_gateway();
    harness.transport.on(
        Method::Post,
        "/api/upload/image",
        MockResponse::ok_json(json!({
            "success": true,
            "url": "/uploads/logos/a.png",
            "filename": "a.png",
            "category": "logos",
            "size": 4,
        })),
    );
    harness.gateway.set_token(Some("tok")).unwrap();
    let (progress, seen) = recorder();
    let file = UploadFile::new("a.png", vec![1u8, 2, 3, 4]).with_content_type("image/png");

    let result = harness
        .gateway
        .uploads()
        .upload_image(file, Some("logos"), Some(progress))
        .await
        .unwrap();
    assert_eq!(result.url, "/uploads/logos/a.png");

    let sent = harness.transport.last().unwrap();
    let upload = sent.upload.as_ref().unwrap();
    assert_eq!(upload.file_name, "a.png");
    assert_eq!(upload.fields, vec![("category".to_string(), "logos".to_string())]);
    assert_eq!(sent.authorization(), Some("Bearer tok"));
    // The transport sets the multipart boundary itself.
    assert_eq!(sent.content_type(), None);
    assert_eq!(seen.lock().unwrap().last().copied(), Some(100.0));
}

#[tokio::test]
async fn failed_upload_is_not_retried() {
    let harness = test_gateway();
    harness
        .transport
        .on(Method::Post, "/api/upload/file", MockResponse::network_error("reset"));

    let result = harness
        .gateway
        .uploads()
        .upload_file(UploadFile::new("doc.pdf", b"%PDF".to_vec()), None)
        .await;
    assert!(matches!(result, Err(trustagency_client::GatewayError::Network(_))));
    assert_eq!(harness.transport.count(Method::Post, "/api/upload/file"), 1);
}

#[tokio::test]
async fn batch_image_upload_keeps_order() {
    let harness = test_gateway();
    harness
        .transport
        .on(Method::Post, "/api/upload/image", MockResponse::ok_json(json!({"success": true, "url": "/u/1"})))
        .on(Method::Post, "/api/upload/image", MockResponse::json(413, json!({"detail": "too large"})));

    let results = harness
        .gateway
        .uploads()
        .upload_images(
            vec![UploadFile::new("1.png", vec![0u8]), UploadFile::new("2.png", vec![0u8; 8])],
            None,
        )
        .await;
    assert_eq!(results.len(), 2);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let uploads = harness.transport.requests();
    assert!(uploads.iter().all(|r| r.upload.as_ref().unwrap().fields
        == vec![("category".to_string(), "general".to_string())]));
}
