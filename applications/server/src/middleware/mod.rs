/// Request middleware and extractors
pub mod auth;
pub mod extract;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use extract::{ApiJson, ApiQuery};
