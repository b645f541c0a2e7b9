pub mod auth;
pub mod require_role;
pub mod response;
pub mod visit;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use require_role::{require_role, RoleGate};
pub use response::{ApiResponse, ApiResult};
pub use visit::track_visit;
