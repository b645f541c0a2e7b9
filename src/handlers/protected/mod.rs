// handlers/protected/mod.rs - Endpoints behind JWT authentication
//
// Every handler here can rely on an `AuthUser` extension placed by
// `jwt_auth_middleware`. Ownership checks (self or admin) happen in the
// handler; route-level role gates live in `elevated`.
pub mod applications;
pub mod auth;
pub mod users;
pub mod visitantes_info;
