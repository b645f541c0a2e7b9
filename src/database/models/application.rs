use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: i32,
    pub nombre: String,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad: Option<String>,
    pub pais_destino: Option<String>,
    pub carrera: Option<String>,
    /// Ordered JSON array of subject names
    pub materias_interes: Value,
    pub archivo: Option<Value>,
    pub estado: String,
    pub comentarios: Option<String>,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Application joined with its applicant and the applicant's catalog placement
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub user_nombres: Option<String>,
    pub user_apellido_paterno: Option<String>,
    pub user_apellido_materno: Option<String>,
    pub user_email: Option<String>,
    pub user_tipo_movilidad: Option<String>,
    pub universidad_nombre: Option<String>,
    pub facultad_nombre: Option<String>,
    pub carrera_nombre: Option<String>,
    pub beca_nombre: Option<String>,
}

/// Metadata of an uploaded attachment, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub filename: String,
    pub originalname: String,
    pub path: String,
    pub size: u64,
    pub mimetype: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewApplication {
    pub nombre: String,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad: Option<String>,
    pub pais_destino: Option<String>,
    pub carrera: Option<String>,
    pub materias_interes: Vec<String>,
    pub archivo: Option<StoredFile>,
    pub comentarios: Option<String>,
    pub user_id: i32,
}
