//! Core entity structures returned by and sent to the backend.
//!
//! Response types are lenient: optional and defaulted fields tolerate
//! older backend revisions that omit them. Input types skip `None`
//! fields on serialization so partial updates only touch what is set.

use crate::enums::{ArticleStatus, TaskStatus, UserRole};
use crate::time::flexible_option;
use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_min_leverage() -> f64 {
    1.0
}

fn default_max_leverage() -> f64 {
    100.0
}

// ============================================================================
// PLATFORMS
// ============================================================================

/// A trading platform listed on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default = "default_min_leverage")]
    pub min_leverage: f64,
    #[serde(default = "default_max_leverage")]
    pub max_leverage: f64,
    #[serde(default)]
    pub commission_rate: f64,
    #[serde(default)]
    pub is_regulated: bool,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<Timestamp>,
}

/// Payload for creating a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    pub min_leverage: f64,
    pub max_leverage: f64,
    pub commission_rate: f64,
    pub is_regulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub is_featured: bool,
}

impl PlatformInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            rating: None,
            rank: None,
            min_leverage: default_min_leverage(),
            max_leverage: default_max_leverage(),
            commission_rate: 0.0,
            is_regulated: false,
            logo_url: None,
            website_url: None,
            is_featured: false,
        }
    }
}

/// Partial update of a platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_leverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_leverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_regulated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ============================================================================
// ARTICLES
// ============================================================================

/// A published or draft article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub section_id: Option<RecordId>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<RecordId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub platform_id: Option<RecordId>,
    #[serde(default)]
    pub author_id: Option<RecordId>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub published_at: Option<Timestamp>,
}

impl Article {
    pub fn status(&self) -> ArticleStatus {
        if self.is_published {
            ArticleStatus::Published
        } else {
            ArticleStatus::Draft
        }
    }

    /// Comma-separated tags, trimmed, empties removed.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Payload for creating an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub section_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<RecordId>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
}

impl ArticleInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>, section_id: RecordId) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            section_id,
            summary: None,
            category: None,
            category_id: None,
            tags: None,
            platform_id: None,
            is_featured: false,
            meta_description: None,
            meta_keywords: None,
        }
    }
}

/// Partial update of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
}

// ============================================================================
// SECTIONS & CATEGORIES
// ============================================================================

/// A top-level site section (column) grouping categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requires_platform: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub category_count: u64,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<Timestamp>,
}

/// Payload for creating or replacing a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInput {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub requires_platform: bool,
    pub sort_order: i64,
    pub is_active: bool,
}

/// A category within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub section_id: Option<RecordId>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub article_count: Option<u64>,
}

/// Payload for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub section_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

// ============================================================================
// AI TASKS
// ============================================================================

/// A batch article-generation task as listed by the task index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTask {
    /// Batch identifier; tasks are addressed by it.
    pub task_id: String,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub celery_status: Option<String>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<Timestamp>,
}

/// Request to generate articles from a list of titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGenerationRequest {
    pub titles: Vec<String>,
    pub section_id: RecordId,
    pub category_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_config_id: Option<RecordId>,
}

/// Acknowledgement of a submitted generation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSubmission {
    pub task_id: String,
    #[serde(default)]
    pub celery_task_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub message: String,
}

/// Detailed status of a generation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusReport {
    pub task_id: String,
    #[serde(default)]
    pub batch_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub celery_status: Option<String>,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub started_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub last_update: Option<Timestamp>,
}

/// Progress snapshot of a generation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub task_id: String,
    pub progress: u32,
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub total: u32,
    pub status: TaskStatus,
    #[serde(default)]
    pub celery_status: Option<String>,
    #[serde(default, with = "flexible_option")]
    pub last_update: Option<Timestamp>,
    /// Estimated seconds remaining.
    #[serde(default)]
    pub estimated_remaining_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCancelResult {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub message: String,
}

/// Full record of a generation task, including generated article ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub task_id: String,
    #[serde(default)]
    pub batch_name: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub generated_articles: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub celery_status: Option<String>,
    #[serde(default)]
    pub celery_task_id: Option<String>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub started_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub last_update: Option<Timestamp>,
}

// ============================================================================
// AI PROVIDER CONFIGS
// ============================================================================

/// Connection settings for an AI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    pub id: RecordId,
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub api_key: String,
    pub model_name: String,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt_template: Option<String>,
    /// Sampling temperature scaled to 0-100.
    #[serde(default)]
    pub temperature: u32,
    #[serde(default)]
    pub max_tokens: u32,
    /// Nucleus sampling scaled to 0-100.
    #[serde(default)]
    pub top_p: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub retry_times: u32,
    #[serde(default)]
    pub timeout_seconds: u32,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<Timestamp>,
}

/// Payload for creating or updating an AI provider config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfigInput {
    pub name: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    pub api_key: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_prompt_template: Option<String>,
    pub temperature: u32,
    pub max_tokens: u32,
    pub top_p: u32,
    pub is_active: bool,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub retry_times: u32,
    pub timeout_seconds: u32,
}

impl AiConfigInput {
    /// A config with the backend's default tuning values.
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            api_endpoint: None,
            api_key: api_key.into(),
            model_name: model_name.into(),
            model_version: None,
            system_prompt: None,
            user_prompt_template: None,
            temperature: 7,
            max_tokens: 2000,
            top_p: 90,
            is_active: true,
            is_default: false,
            description: None,
            retry_times: 3,
            timeout_seconds: 120,
        }
    }
}

/// Result of probing an AI provider config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfigTestResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub response_time: Option<f64>,
}

/// Connection probe for provider settings that are not saved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfigTestRequest {
    pub api_endpoint: String,
    pub api_key: String,
    pub model_name: String,
}

// ============================================================================
// UPLOADS
// ============================================================================

/// Response of the upload endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub success: bool,
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Bytes stored.
    #[serde(default)]
    pub size: Option<u64>,
}

// ============================================================================
// SITE SETTINGS
// ============================================================================

/// Global website settings (SEO, analytics, footer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_analytics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baidu_analytics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_scripts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icp_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// JSON-encoded list of footer links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_links: Option<String>,
}

/// A footer link decoded from [`WebsiteSettings::footer_links`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub name: String,
    pub url: String,
}

impl WebsiteSettings {
    /// Decoded footer links; malformed JSON yields no links.
    pub fn footer_link_list(&self) -> Vec<FooterLink> {
        self.footer_links
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

// ============================================================================
// ADMIN USERS & AUTH
// ============================================================================

/// An admin console account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: RecordId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superadmin: bool,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "flexible_option")]
    pub last_login: Option<Timestamp>,
}

impl AdminUser {
    /// Effective role; the superadmin flag wins over a missing role.
    pub fn effective_role(&self) -> UserRole {
        if self.is_superadmin {
            return UserRole::SuperAdmin;
        }
        self.role.unwrap_or(UserRole::Admin)
    }
}

/// Account registration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Response of the login and register endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<AdminUser>,
}

/// Response of the token refresh endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRefresh {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub platforms_count: u64,
    #[serde(default)]
    pub articles_count: u64,
    #[serde(default)]
    pub published_articles: u64,
    #[serde(default)]
    pub active_tasks: u64,
    #[serde(default)]
    pub total_views: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platform_decodes_with_naive_timestamps_and_defaults() {
        let platform: Platform = serde_json::from_value(json!({
            "id": 3,
            "name": "Alpha",
            "rating": 4.5,
            "created_at": "2025-11-01T08:30:00",
        }))
        .unwrap();
        assert_eq!(platform.max_leverage, 100.0);
        assert!(platform.is_active);
        assert!(platform.created_at.is_some());
        assert!(platform.updated_at.is_none());
    }

    #[test]
    fn platform_update_serializes_only_set_fields() {
        let update = PlatformUpdate {
            is_featured: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"is_featured": true}));
    }

    #[test]
    fn article_tags_and_status() {
        let article: Article = serde_json::from_value(json!({
            "id": 1,
            "title": "Leverage 101",
            "tags": "guide, leverage,, risk ",
            "is_published": true,
        }))
        .unwrap();
        assert_eq!(article.tag_list(), vec!["guide", "leverage", "risk"]);
        assert_eq!(article.status(), ArticleStatus::Published);
    }

    #[test]
    fn footer_links_tolerate_bad_json() {
        let mut settings = WebsiteSettings {
            footer_links: Some(r#"[{"name":"Docs","url":"/docs"}]"#.to_string()),
            ..Default::default()
        };
        assert_eq!(settings.footer_link_list().len(), 1);
        settings.footer_links = Some("not json".to_string());
        assert!(settings.footer_link_list().is_empty());
    }

    #[test]
    fn superadmin_flag_wins() {
        let user: AdminUser = serde_json::from_value(json!({
            "id": 1,
            "username": "root",
            "is_superadmin": true,
            "role": "viewer",
        }))
        .unwrap();
        assert_eq!(user.effective_role(), UserRole::SuperAdmin);
    }
}
