//! TrustAgency Core - Domain Types
//!
//! Pure data structures shared by the client crates: the models the REST
//! backend returns, the tagged response envelope, and query-string
//! building. No I/O lives here.

pub mod entities;
pub mod enums;
pub mod envelope;
pub mod error;
pub mod query;
pub mod time;

pub use entities::*;
pub use enums::{
    ArticleStatus, ArticleStatusParseError, TaskStatus, TaskStatusParseError, UserRole,
    UserRoleParseError,
};
pub use envelope::{EndpointContract, Envelope, ListShape, Page};
pub use error::EnvelopeError;
pub use query::{build_query_string, QueryParams, QueryValue};

/// Backend record identifier (integer primary keys).
pub type RecordId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
