use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{bearer_token, decode_token, AuthError};
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::types::{MobilityType, Role};

/// Authenticated caller, re-read from storage on every request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub clave: Option<String>,
    pub rol: Role,
    pub tipo_movilidad: Option<MobilityType>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.rol == Role::Administrador
    }

    /// The caller owns `user_id` or is an administrator
    pub fn can_act_for(&self, user_id: i32) -> bool {
        self.id == user_id || self.is_admin()
    }
}

/// JWT authentication middleware that validates tokens and loads the caller
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = bearer_token(header).ok_or(AuthError::MissingToken)?;
    let claims = decode_token(&state.config, token)?;

    let user = UserRepository::new(&state.db)
        .find_by_id(claims.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("user not found"))?;

    let rol = user.rol.parse::<Role>().unwrap_or_else(|_| {
        tracing::warn!("User {} has unknown role '{}'", user.id, user.rol);
        Role::Alumno
    });
    let tipo_movilidad = user.tipo_movilidad.as_deref().and_then(|t| t.parse().ok());

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        clave: user.clave,
        rol,
        tipo_movilidad,
    });

    Ok(next.run(request).await)
}

/// User id from an optional bearer token; bad or missing tokens yield `None`.
///
/// The id is not checked against storage here; the visit insert drops ids
/// of deleted users.
pub fn optional_user_id(state: &AppState, headers: &HeaderMap) -> Option<i32> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    bearer_token(header)
        .and_then(|token| decode_token(&state.config, token).ok())
        .map(|claims| claims.id)
}
