use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::repository::UserRepository;
use crate::database::Database;
use crate::error::ApiError;
use crate::types::Role;

/// Capability check for a group of routes.
///
/// The role is looked up again rather than trusted from the token, so a
/// demotion takes effect on the next request.
#[derive(Clone)]
pub struct RoleGate {
    pub db: Database,
    pub allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(db: Database, allowed: &'static [Role]) -> Self {
        Self { db, allowed }
    }
}

pub async fn require_role(State(gate): State<RoleGate>, request: Request, next: Next) -> Result<Response, ApiError> {
    let user_id = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.id)
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;

    let role = UserRepository::new(&gate.db)
        .find_role(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("user not found"))?;

    match role.parse::<Role>() {
        Ok(role) if gate.allowed.contains(&role) => Ok(next.run(request).await),
        _ => {
            tracing::warn!("User {} with role '{}' denied access to {}", user_id, role, request.uri().path());
            Err(ApiError::forbidden("insufficient permissions"))
        }
    }
}
