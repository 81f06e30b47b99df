//! Typed resource APIs, one per admin screen.
//!
//! List endpoints that take filters embed the encoded query in the
//! endpoint path, so distinct filters map to distinct cache keys.

pub mod admin;
pub mod ai_configs;
pub mod articles;
pub mod categories;
pub mod platforms;
pub mod sections;
pub mod settings;
pub mod tasks;
pub mod uploads;

pub use admin::AdminApi;
pub use ai_configs::AiConfigsApi;
pub use articles::ArticlesApi;
pub use categories::CategoriesApi;
pub use platforms::PlatformsApi;
pub use sections::SectionsApi;
pub use settings::SettingsApi;
pub use tasks::TasksApi;
pub use uploads::UploadsApi;

use trustagency_core::QueryParams;

pub(crate) fn with_query(path: &str, filters: &QueryParams) -> String {
    filters.append_to(path)
}
