use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitanteInfo {
    pub id: i32,
    pub user_id: i32,
    pub pais_origen: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub preparatoria: Option<String>,
    pub entidad_federativa: Option<String>,
    pub nombre_tutor: Option<String>,
    pub dni_curp: Option<String>,
    pub sexo: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Visitor info joined with the owning user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitanteInfoDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub info: VisitanteInfo,
    pub nombres: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
    pub email: String,
    pub clave: Option<String>,
    pub tipo_movilidad: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitanteInfoInput {
    pub pais_origen: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub preparatoria: Option<String>,
    pub entidad_federativa: Option<String>,
    pub nombre_tutor: Option<String>,
    pub dni_curp: Option<String>,
    pub sexo: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitorLog {
    pub id: i32,
    pub user_id: Option<i32>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub page_visited: Option<String>,
    pub action: String,
    pub session_id: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Log row with the visitor's name, if known
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitorLogEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: VisitorLog,
    pub nombres: Option<String>,
    pub apellido_paterno: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewVisit {
    pub user_id: Option<i32>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub page_visited: Option<String>,
    pub action: Option<String>,
    pub session_id: Option<String>,
}
