//! TrustAgency Client - Request Gateway
//!
//! A single [`RequestGateway`] mediates every call to the TrustAgency REST
//! backend: URL building, bearer token injection, a TTL cache and
//! in-flight de-duplication for GETs, retry with exponential backoff,
//! per-attempt timeouts, token refresh on 401, and multipart uploads
//! with progress. Typed resource APIs sit on top of it.
//!
//! ```no_run
//! # async fn demo() -> trustagency_client::GatewayResult<()> {
//! use trustagency_client::{GatewayConfig, RequestGateway};
//! use trustagency_core::QueryParams;
//!
//! let gateway = RequestGateway::new(GatewayConfig::admin("http://localhost:8001"))?;
//! gateway.auth().login("admin", "secret").await?;
//! let page = gateway
//!     .articles()
//!     .list(&QueryParams::new().with("skip", 0).with("limit", 20))
//!     .await?;
//! println!("{} of {} articles", page.len(), page.total);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod gateway;
pub mod inflight;
pub mod origin;
pub mod response;
pub mod storage;
pub mod telemetry;
pub mod transport;

pub use auth::AuthApi;
pub use config::{ConfigError, GatewayConfig};
pub use credentials::CredentialStore;
pub use error::{format_error_message, GatewayError, GatewayResult, HttpErrorKind, Locale};
pub use events::{EventBus, GatewayEvent, LogoutReason};
pub use gateway::{GatewayBuilder, RequestGateway, RequestOptions};
pub use origin::{derive_admin_base_url, derive_site_api_url};
pub use response::Payload;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use transport::{
    HttpResponse, Method, ProgressFn, ReqwestTransport, RequestAttempt, RequestBody, Transport,
    TransportError, UploadFile, UploadForm,
};
