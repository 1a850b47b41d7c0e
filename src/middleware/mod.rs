pub mod auth;
pub mod rate_limit;
pub mod response;
pub mod security_headers;

pub use auth::{optional_auth, require_auth, Identity};
pub use rate_limit::{rate_limit, RateLimiter};
pub use response::{ApiResponse, ApiResult};
pub use security_headers::apply_security_headers;
