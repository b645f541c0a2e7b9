// handlers/elevated/applications.rs - staff review of applications
//
// GET /api/applications/all, GET /api/applications/admin/all and
// PATCH /api/applications/:id/status.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::ApplicationDetail;
use crate::database::repository::ApplicationRepository;
use crate::error::ApiError;
use crate::filter::{Filter, FilterField};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::ApplicationStatus;

/// Applicant placement plus the application's own state
const LISTING_FILTERS: &[FilterField] = &[
    FilterField::UniversidadId,
    FilterField::FacultadId,
    FilterField::CarreraId,
    FilterField::BecaId,
    FilterField::TipoMovilidad,
    FilterField::CicloEscolarInicio,
    FilterField::CicloEscolarFinal,
    FilterField::Estado,
];

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub estado: Option<String>,
    pub comentarios: Option<String>,
}

/// GET /api/applications/all - newest first, joined with the applicant's catalog placement
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<ApplicationDetail>> {
    let filter = Filter::from_query(&query, LISTING_FILTERS)?;
    let rows = ApplicationRepository::new(&state.db).get_all(&filter).await?;
    Ok(ApiResponse::success(rows))
}

/// PATCH /api/applications/:id/status - move an application to a review outcome
pub async fn update_status(
    State(state): State<AppState>,
    Extension(reviewer): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<ApplicationDetail> {
    let id = parse_id(&id, "application")?;
    let estado = parse_review_outcome(update.estado.as_deref())?;

    let detail = ApplicationRepository::new(&state.db)
        .update_status(id, estado, update.comentarios.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("application not found"))?;

    tracing::info!("User {} set application {} to {}", reviewer.id, id, estado.as_str());
    Ok(ApiResponse::success(detail).with_message("status updated"))
}

fn parse_review_outcome(raw: Option<&str>) -> Result<ApplicationStatus, ApiError> {
    raw.and_then(|r| r.parse::<ApplicationStatus>().ok())
        .filter(ApplicationStatus::is_review_outcome)
        .ok_or_else(|| ApiError::field_error("estado", "estado must be one of en_revision, aceptada, rechazada"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_review_outcomes_are_accepted() {
        assert_eq!(parse_review_outcome(Some("aceptada")).unwrap(), ApplicationStatus::Aceptada);
        assert_eq!(parse_review_outcome(Some("en_revision")).unwrap(), ApplicationStatus::EnRevision);
        assert!(parse_review_outcome(Some("pendiente")).is_err());
        assert!(parse_review_outcome(Some("aprobada")).is_err());
        assert!(parse_review_outcome(None).is_err());
    }
}
