use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::catalog::{Beca, CatalogRef, Universidad};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub nombres: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub telefono: Option<String>,
    pub email: String,
    /// argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub rol: String,
    pub tipo_movilidad: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad_id: Option<i32>,
    pub facultad_id: Option<i32>,
    pub carrera_id: Option<i32>,
    pub beca_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields accepted when creating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub nombres: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub telefono: Option<String>,
    pub email: String,
    /// Plain password; hashed by `AccountService::create` before insertion
    pub password: String,
    pub rol: Option<String>,
    pub tipo_movilidad: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad_id: Option<i32>,
    pub facultad_id: Option<i32>,
    pub carrera_id: Option<i32>,
    pub beca_id: Option<i32>,
}

/// User detail with catalog references resolved
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub universidad: Option<Universidad>,
    pub facultad: Option<CatalogRef>,
    pub carrera: Option<CatalogRef>,
    pub beca: Option<Beca>,
}

/// Columns a user record may have updated one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Nombres,
    ApellidoPaterno,
    ApellidoMaterno,
    Clave,
    Telefono,
    Email,
    TipoMovilidad,
    CicloEscolarInicio,
    CicloEscolarFinal,
    UniversidadId,
    FacultadId,
    CarreraId,
    BecaId,
}

impl UserField {
    pub const ALL: [UserField; 13] = [
        UserField::Nombres,
        UserField::ApellidoPaterno,
        UserField::ApellidoMaterno,
        UserField::Clave,
        UserField::Telefono,
        UserField::Email,
        UserField::TipoMovilidad,
        UserField::CicloEscolarInicio,
        UserField::CicloEscolarFinal,
        UserField::UniversidadId,
        UserField::FacultadId,
        UserField::CarreraId,
        UserField::BecaId,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            UserField::Nombres => "nombres",
            UserField::ApellidoPaterno => "apellido_paterno",
            UserField::ApellidoMaterno => "apellido_materno",
            UserField::Clave => "clave",
            UserField::Telefono => "telefono",
            UserField::Email => "email",
            UserField::TipoMovilidad => "tipo_movilidad",
            UserField::CicloEscolarInicio => "ciclo_escolar_inicio",
            UserField::CicloEscolarFinal => "ciclo_escolar_final",
            UserField::UniversidadId => "universidad_id",
            UserField::FacultadId => "facultad_id",
            UserField::CarreraId => "carrera_id",
            UserField::BecaId => "beca_id",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.column() == name.trim())
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            UserField::UniversidadId | UserField::FacultadId | UserField::CarreraId | UserField::BecaId
        )
    }

    /// Columns that may not be cleared
    pub fn is_required(&self) -> bool {
        matches!(self, UserField::Nombres | UserField::ApellidoPaterno | UserField::Email)
    }
}
