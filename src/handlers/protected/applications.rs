// handlers/protected/applications.rs - applicant-facing /api/applications handlers
//
// POST /addApplication, GET /user/applications and GET /:id.

use axum::extract::{Extension, Multipart, Path, State};

use crate::api::upload::{public_path, remove_public_file, store_upload, MultipartForm};
use crate::app::AppState;
use crate::database::models::{Application, ApplicationDetail, NewApplication};
use crate::database::repository::ApplicationRepository;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::Role;

/**
 * POST /api/applications/addApplication - submit a mobility application
 *
 * Multipart fields: `nombre`, `apellidoPaterno`, `apellidoMaterno`,
 * `cicloEscolarInicio`, `cicloEscolarFinal`, `universidad`, `paisDestino`,
 * `carrera`, `materiasInteres` (JSON array of names), `comentarios` and an
 * optional `archivo` file. The owner and clave come from the token, never
 * the form. A stored file is removed again when the insert fails.
 */
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Application> {
    let form = MultipartForm::collect(multipart).await?;
    let nombre = form.require("nombre")?;

    let archivo = match form.file("archivo") {
        Some(file) => Some(store_upload(&state.config.api.uploads_dir, "archivo", file).await?),
        None => None,
    };

    let new = NewApplication {
        nombre,
        apellido_paterno: form.text("apellidoPaterno"),
        apellido_materno: form.text("apellidoMaterno"),
        clave: user.clave.clone(),
        ciclo_escolar_inicio: form.text("cicloEscolarInicio"),
        ciclo_escolar_final: form.text("cicloEscolarFinal"),
        universidad: form.text("universidad"),
        pais_destino: form.text("paisDestino"),
        carrera: form.text("carrera"),
        materias_interes: parse_materias(form.text("materiasInteres").as_deref()),
        archivo,
        comentarios: form.text("comentarios"),
        user_id: user.id,
    };

    let application = match ApplicationRepository::new(&state.db).create(&new).await {
        Ok(application) => application,
        Err(e) => {
            if let Some(stored) = &new.archivo {
                remove_public_file(&state.config.api.uploads_dir, &public_path(&stored.filename)).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!("User {} submitted application {}", user.id, application.id);
    Ok(ApiResponse::created(application).with_message("application submitted"))
}

/// GET /api/applications/user/applications - the caller's own applications, newest first
pub async fn mine(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Application>> {
    let rows = ApplicationRepository::new(&state.db).get_by_user(user.id).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/applications/:id - one application with applicant data, for its owner or staff
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ApplicationDetail> {
    let id = parse_id(&id, "application")?;
    let detail = ApplicationRepository::new(&state.db)
        .find_detail(id)
        .await?
        .ok_or_else(|| ApiError::not_found("application not found"))?;

    if detail.application.user_id != user.id && !Role::STAFF.contains(&user.rol) {
        return Err(ApiError::forbidden("insufficient permissions"));
    }
    Ok(ApiResponse::success(detail))
}

/// Subjects of interest from a JSON array. Anything malformed becomes an empty list.
fn parse_materias(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Err(e) => {
            tracing::warn!("Ignoring malformed materiasInteres {:?}: {}", raw, e);
            Vec::new()
        }
    }
}
