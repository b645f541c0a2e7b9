use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Convocatoria {
    pub id: i32,
    pub titulo: String,
    pub descripcion: String,
    pub fecha: NaiveDate,
    pub imagen: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ConvocatoriaInput {
    pub titulo: String,
    pub descripcion: String,
    pub fecha: NaiveDate,
    /// New image path; `None` keeps the current one on update
    pub imagen: Option<String>,
}
