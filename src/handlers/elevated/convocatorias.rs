// handlers/elevated/convocatorias.rs - POST, PUT and DELETE /api/convocatorias handlers

use axum::extract::{Extension, Multipart, Path, State};

use crate::api::upload::{public_path, remove_public_file, store_upload, MultipartForm};
use crate::app::AppState;
use crate::database::models::{Convocatoria, ConvocatoriaInput};
use crate::database::repository::ConvocatoriaRepository;
use crate::error::ApiError;
use crate::filter::parse_date;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Validate the text fields and store the optional `imagen` upload
async fn read_form(state: &AppState, multipart: Multipart) -> Result<ConvocatoriaInput, ApiError> {
    let form = MultipartForm::collect(multipart).await?;

    let titulo = form.require("titulo")?;
    let descripcion = form.require("descripcion")?;
    let fecha = form.require("fecha")?;
    let fecha = parse_date(&fecha).ok_or_else(|| ApiError::field_error("fecha", "fecha must be a valid date"))?;

    let imagen = match form.file("imagen") {
        Some(file) => {
            let stored = store_upload(&state.config.api.uploads_dir, "imagen", file).await?;
            Some(public_path(&stored.filename))
        }
        None => None,
    };

    Ok(ConvocatoriaInput {
        titulo,
        descripcion,
        fecha,
        imagen,
    })
}

/// Remove an image stored for a write that did not go through
async fn discard_upload(state: &AppState, input: &ConvocatoriaInput) {
    if let Some(orphan) = &input.imagen {
        remove_public_file(&state.config.api.uploads_dir, orphan).await;
    }
}

/// POST /api/convocatorias - multipart `titulo`, `descripcion`, `fecha` and optional `imagen`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Convocatoria> {
    let input = read_form(&state, multipart).await?;
    let convocatoria = match ConvocatoriaRepository::new(&state.db).create(&input).await {
        Ok(convocatoria) => convocatoria,
        Err(e) => {
            discard_upload(&state, &input).await;
            return Err(e.into());
        }
    };

    tracing::info!("User {} created convocatoria {}", user.id, convocatoria.id);
    Ok(ApiResponse::created(convocatoria).with_message("convocatoria created"))
}

/// PUT /api/convocatorias/:id - a new image replaces the old file, otherwise the image is kept
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Convocatoria> {
    let id = parse_id(&id, "convocatoria")?;
    let input = read_form(&state, multipart).await?;

    let updated = match ConvocatoriaRepository::new(&state.db).update(id, &input).await {
        Ok(Some(updated)) => Ok(updated),
        Ok(None) => Err(ApiError::not_found("convocatoria not found")),
        Err(e) => Err(e.into()),
    };
    let (convocatoria, replaced) = match updated {
        Ok(updated) => updated,
        Err(e) => {
            discard_upload(&state, &input).await;
            return Err(e);
        }
    };

    if let Some(old) = replaced {
        remove_public_file(&state.config.api.uploads_dir, &old).await;
    }

    tracing::info!("User {} updated convocatoria {}", user.id, id);
    Ok(ApiResponse::success(convocatoria).with_message("convocatoria updated"))
}

/// DELETE /api/convocatorias/:id - the row goes first; its image is removed afterwards
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "convocatoria")?;
    let imagen = ConvocatoriaRepository::new(&state.db)
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::not_found("convocatoria not found"))?;

    if let Some(imagen) = imagen {
        remove_public_file(&state.config.api.uploads_dir, &imagen).await;
    }

    tracing::info!("User {} deleted convocatoria {}", user.id, id);
    Ok(ApiResponse::message("convocatoria deleted"))
}
