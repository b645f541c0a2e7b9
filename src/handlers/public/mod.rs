// handlers/public/mod.rs - Endpoints that need no token
pub mod auth;
pub mod catalog;
pub mod convocatorias;
pub mod download;
pub mod filters;
pub mod health;
pub mod visitor_log;
