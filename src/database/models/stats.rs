use serde::Serialize;
use sqlx::FromRow;

/// One bucket of a grouped count
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CountRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub label: Option<String>,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitorTotals {
    pub total_visits: i64,
    pub unique_users: i64,
    pub unique_ips: i64,
    pub unique_sessions: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovilidadReportRow {
    pub id: i32,
    pub nombres: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub email: String,
    pub tipo_movilidad: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad: Option<String>,
    pub facultad: Option<String>,
    pub carrera: Option<String>,
    pub beca: Option<String>,
    pub universidad_destino: Option<String>,
    pub pais_destino: Option<String>,
    pub estado_aplicacion: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VisitanteReportRow {
    pub id: i32,
    pub nombres: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
    pub clave: Option<String>,
    pub email: String,
    pub telefono: Option<String>,
    pub tipo_movilidad: Option<String>,
    pub ciclo_escolar_inicio: Option<String>,
    pub ciclo_escolar_final: Option<String>,
    pub universidad: Option<String>,
    pub facultad: Option<String>,
    pub carrera: Option<String>,
    pub pais_origen: Option<String>,
    pub fecha_nacimiento: Option<chrono::NaiveDate>,
    pub preparatoria: Option<String>,
    pub entidad_federativa: Option<String>,
    pub nombre_tutor: Option<String>,
    pub dni_curp: Option<String>,
    pub sexo: Option<String>,
}
