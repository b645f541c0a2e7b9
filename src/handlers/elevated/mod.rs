// handlers/elevated/mod.rs - Role-gated endpoints
//
// Routes here sit behind `jwt_auth_middleware` and a `RoleGate`; which
// roles pass is decided where the routes are assembled in `app.rs`.
pub mod applications;
pub mod catalog;
pub mod convocatorias;
pub mod send_pdf;
pub mod stats;
pub mod users;
pub mod visitantes_info;
pub mod visitor_logs;
