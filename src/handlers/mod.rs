// handlers/mod.rs - Handlers grouped by access tier
//
// Public (no auth) → Protected (JWT auth) → Elevated (JWT auth + role gate)
pub mod elevated;
pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Parse a numeric path segment, answering 400 for anything else
pub fn parse_id(raw: &str, what: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("invalid {} id", what)))
}
