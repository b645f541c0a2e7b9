use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Universidad {
    pub id: i32,
    pub nombre: String,
    pub direccion: Option<String>,
    pub pais: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Facultad {
    pub id: i32,
    pub nombre: String,
    pub universidad_id: i32,
    pub universidad_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Carrera {
    pub id: i32,
    pub nombre: String,
    pub facultad_id: i32,
    pub facultad_nombre: Option<String>,
    pub universidad_id: Option<i32>,
    pub universidad_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Materia {
    pub id: i32,
    pub nombre: String,
    pub clave: Option<String>,
    pub maestro: Option<String>,
    pub carrera_id: i32,
    pub carrera_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Beca {
    pub id: i32,
    pub nombre: String,
    pub pais: String,
}

/// `{id, nombre}` pair used by dropdowns and enrichment
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CatalogRef {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversidadInput {
    #[serde(default)]
    pub nombre: String,
    pub direccion: Option<String>,
    pub pais: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacultadInput {
    #[serde(default)]
    pub nombre: String,
    pub universidad_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarreraInput {
    #[serde(default)]
    pub nombre: String,
    pub facultad_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MateriaInput {
    #[serde(default)]
    pub nombre: String,
    pub clave: Option<String>,
    pub maestro: Option<String>,
    pub carrera_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BecaInput {
    #[serde(default)]
    pub nombre: String,
    pub pais: Option<String>,
}
