//! Client-side access to the BUE System user resource.
//!
//! - Wire types and form drafts (`model`)
//! - Failure types and the error normalizer (`error`)
//! - The [`UserApi`] seam and its HTTP implementation (`service`)
pub mod error;
pub mod model;
pub mod service;

pub use error::{ApiError, ErrorCategory, NetworkFailure, NormalizedError, normalize};
pub use model::{EditDraft, RegisterUser, UpdateUser, User, UserDraft};
pub use service::{UserApi, UserService};

/// Default base URL of the user resource.
pub const DEFAULT_BASE_URL: &str = "https://localhost:7009/api/User";
