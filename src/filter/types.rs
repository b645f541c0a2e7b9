use chrono::NaiveDate;

use crate::database::SqlParam;

/// Query-string keys a filtered endpoint may accept.
///
/// Each endpoint declares the subset it allows; anything else in the query
/// string is ignored and never reaches SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    UniversidadId,
    FacultadId,
    CarreraId,
    BecaId,
    TipoMovilidad,
    CicloEscolarInicio,
    CicloEscolarFinal,
    /// Matches either the start or the end cycle
    CicloEscolar,
    Estado,
    FechaInicio,
    FechaFin,
    UserId,
    PageVisited,
    Action,
}

impl FilterField {
    /// Applicant placement filters shared by user and application listings
    pub const USER_PLACEMENT: &'static [FilterField] = &[
        FilterField::UniversidadId,
        FilterField::FacultadId,
        FilterField::CarreraId,
        FilterField::BecaId,
        FilterField::TipoMovilidad,
        FilterField::CicloEscolarInicio,
        FilterField::CicloEscolarFinal,
    ];

    /// Dashboard filters accepted by `/api/stats/filtered`
    pub const STATS: &'static [FilterField] = &[
        FilterField::UniversidadId,
        FilterField::FacultadId,
        FilterField::CarreraId,
        FilterField::BecaId,
        FilterField::TipoMovilidad,
        FilterField::CicloEscolarInicio,
        FilterField::CicloEscolarFinal,
        FilterField::CicloEscolar,
        FilterField::Estado,
        FilterField::FechaInicio,
        FilterField::FechaFin,
    ];

    /// Report filters; `tipo` is handled separately
    pub const REPORT: &'static [FilterField] = &[
        FilterField::UniversidadId,
        FilterField::FacultadId,
        FilterField::CarreraId,
        FilterField::BecaId,
        FilterField::CicloEscolarInicio,
        FilterField::CicloEscolarFinal,
        FilterField::FechaInicio,
        FilterField::FechaFin,
    ];

    pub const VISITOR_LOG: &'static [FilterField] = &[
        FilterField::FechaInicio,
        FilterField::FechaFin,
        FilterField::UserId,
        FilterField::PageVisited,
        FilterField::Action,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FilterField::UniversidadId => "universidad_id",
            FilterField::FacultadId => "facultad_id",
            FilterField::CarreraId => "carrera_id",
            FilterField::BecaId => "beca_id",
            FilterField::TipoMovilidad => "tipo_movilidad",
            FilterField::CicloEscolarInicio => "ciclo_escolar_inicio",
            FilterField::CicloEscolarFinal => "ciclo_escolar_final",
            FilterField::CicloEscolar => "ciclo_escolar",
            FilterField::Estado => "estado",
            FilterField::FechaInicio => "fecha_inicio",
            FilterField::FechaFin => "fecha_fin",
            FilterField::UserId => "user_id",
            FilterField::PageVisited => "page_visited",
            FilterField::Action => "action",
        }
    }

    /// Alternate query-string spellings
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            FilterField::Estado => &["estado_aplicacion"],
            _ => &[],
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            FilterField::UniversidadId
            | FilterField::FacultadId
            | FilterField::CarreraId
            | FilterField::BecaId
            | FilterField::UserId => ValueKind::Id,
            FilterField::FechaInicio | FilterField::FechaFin => ValueKind::Date,
            FilterField::TipoMovilidad => ValueKind::MobilityType,
            FilterField::Estado => ValueKind::Status,
            _ => ValueKind::Text,
        }
    }

    pub fn op(&self) -> FilterOp {
        match self {
            FilterField::FechaInicio => FilterOp::OnOrAfter,
            FilterField::FechaFin => FilterOp::OnOrBefore,
            FilterField::CicloEscolar => FilterOp::EitherCycle,
            _ => FilterOp::Eq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Id,
    Date,
    Text,
    MobilityType,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// `column >= date`
    OnOrAfter,
    /// `column < date + 1`, end day inclusive
    OnOrBefore,
    /// `(start = $n OR end = $n)`
    EitherCycle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Id(i32),
    Date(NaiveDate),
    Text(String),
}

impl From<FilterValue> for SqlParam {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Id(v) => SqlParam::Int(Some(v)),
            FilterValue::Date(v) => SqlParam::Date(Some(v)),
            FilterValue::Text(v) => SqlParam::Text(Some(v)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: FilterField,
    pub value: FilterValue,
}

/// Table aliases a filter is rendered against
#[derive(Debug, Clone, Copy)]
pub struct ColumnScope {
    /// Alias of the `users` table
    pub user: &'static str,
    /// Alias of the `applications` table, when cycle and status come from it
    pub application: Option<&'static str>,
    /// Alias of the `visitor_logs` table
    pub visitor_log: Option<&'static str>,
    /// Fully qualified timestamp column for the date range
    pub created_at: &'static str,
}

impl ColumnScope {
    pub const USERS: ColumnScope = ColumnScope {
        user: "u",
        application: None,
        visitor_log: None,
        created_at: "u.created_at",
    };

    pub const APPLICATIONS: ColumnScope = ColumnScope {
        user: "u",
        application: Some("a"),
        visitor_log: None,
        created_at: "a.created_at",
    };

    pub const VISITOR_LOGS: ColumnScope = ColumnScope {
        user: "u",
        application: None,
        visitor_log: Some("vl"),
        created_at: "vl.created_at",
    };
}

/// Rendered WHERE fragment and its parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlResult {
    /// Conditions joined with AND; empty when there are none
    pub clause: String,
    pub params: Vec<SqlParam>,
}

impl SqlResult {
    /// `WHERE ...` or an empty string
    pub fn where_sql(&self) -> String {
        if self.clause.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clause)
        }
    }

    /// ` AND ...` or an empty string, for appending to an existing condition
    pub fn and_sql(&self) -> String {
        if self.clause.is_empty() {
            String::new()
        } else {
            format!(" AND {}", self.clause)
        }
    }
}
