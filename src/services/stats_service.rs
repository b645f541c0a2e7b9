use serde::Serialize;

use crate::database::models::{CatalogRef, CountRow, MovilidadReportRow, VisitanteReportRow};
use crate::database::repository::{CarreraRepository, FacultadRepository, UniversidadRepository};
use crate::database::{Database, DatabaseError};
use crate::filter::{ColumnScope, Filter, FilterError, FilterField};
use crate::sql_params;
use crate::types::MobilityType;

/// Label for rows whose grouping column is empty
pub const UNSPECIFIED: &str = "Sin especificar";

/// What is being counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsEntity {
    Users,
    Applications,
}

/// How the counted rows are bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Universidad,
    Facultad,
    Carrera,
    TipoMovilidad,
    Mes,
    Estado,
    Ciclo,
}

/// Users may not filter on application status
const USER_FILTERS: &[FilterField] = &[
    FilterField::UniversidadId,
    FilterField::FacultadId,
    FilterField::CarreraId,
    FilterField::BecaId,
    FilterField::TipoMovilidad,
    FilterField::CicloEscolarInicio,
    FilterField::CicloEscolarFinal,
    FilterField::CicloEscolar,
    FilterField::FechaInicio,
    FilterField::FechaFin,
];

/// A validated `(tipo, agrupacion)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsQuery {
    pub entity: StatsEntity,
    pub grouping: Grouping,
}

impl StatsQuery {
    /// Defaults to users grouped by universidad; unknown pairs are rejected.
    pub fn parse(tipo: Option<&str>, agrupacion: Option<&str>) -> Result<Self, FilterError> {
        let tipo = tipo.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("users");
        let agrupacion = agrupacion.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("universidad");

        let (entity, grouping) = match (tipo, agrupacion) {
            ("users", "universidad") => (StatsEntity::Users, Grouping::Universidad),
            ("users", "facultad") => (StatsEntity::Users, Grouping::Facultad),
            ("users", "carrera") => (StatsEntity::Users, Grouping::Carrera),
            ("users", "tipo_movilidad") => (StatsEntity::Users, Grouping::TipoMovilidad),
            ("users", "mes") => (StatsEntity::Users, Grouping::Mes),
            ("applications", "estado") => (StatsEntity::Applications, Grouping::Estado),
            ("applications", "ciclo") => (StatsEntity::Applications, Grouping::Ciclo),
            ("applications", "universidad") => (StatsEntity::Applications, Grouping::Universidad),
            ("applications", "mes") => (StatsEntity::Applications, Grouping::Mes),
            _ => return Err(FilterError::InvalidCombination),
        };

        Ok(Self { entity, grouping })
    }

    /// Filter keys accepted for this entity
    pub fn allowed_filters(&self) -> &'static [FilterField] {
        match self.entity {
            StatsEntity::Users => USER_FILTERS,
            StatsEntity::Applications => FilterField::STATS,
        }
    }

    fn scope(&self) -> &'static ColumnScope {
        match self.entity {
            StatsEntity::Users => &ColumnScope::USERS,
            StatsEntity::Applications => &ColumnScope::APPLICATIONS,
        }
    }

    fn from_clause(&self) -> &'static str {
        match self.entity {
            StatsEntity::Users => "users u",
            StatsEntity::Applications => "applications a LEFT JOIN users u ON a.user_id = u.id",
        }
    }

    fn counted_id(&self) -> &'static str {
        match self.entity {
            StatsEntity::Users => "u.id",
            StatsEntity::Applications => "a.id",
        }
    }

    /// Render the grouped count.
    ///
    /// Catalog groupings list every catalog row, zero counts included, and add
    /// one unspecified bucket for rows without a reference, so the values
    /// always sum to the filtered total. `recent_months` bounds the window.
    pub fn to_sql(&self, conditions: &str, recent_months: Option<u32>) -> String {
        let from = self.from_clause();
        let created_at = self.scope().created_at;

        let mut conditions = conditions.to_string();
        if let Some(months) = recent_months {
            if !conditions.is_empty() {
                conditions.push_str(" AND ");
            }
            conditions.push_str(&format!("{} >= NOW() - INTERVAL '{} months'", created_at, months));
        }
        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions)
        };
        let and_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!(" AND {}", conditions)
        };

        let catalog = match (self.entity, self.grouping) {
            (StatsEntity::Users, Grouping::Universidad) => Some(("universidades", "universidad_id")),
            (StatsEntity::Users, Grouping::Facultad) => Some(("facultades", "facultad_id")),
            (StatsEntity::Users, Grouping::Carrera) => Some(("carreras", "carrera_id")),
            _ => None,
        };

        if let Some((table, fk)) = catalog {
            return format!(
                "SELECT * FROM ( \
                    SELECT cat.id, cat.nombre::text AS label, COUNT(u.id) AS value \
                    FROM {table} cat LEFT JOIN users u ON u.{fk} = cat.id{and_sql} \
                    GROUP BY cat.id, cat.nombre \
                    UNION ALL \
                    SELECT NULL::int AS id, '{unspecified}' AS label, COUNT(*) AS value \
                    FROM users u WHERE u.{fk} IS NULL{and_sql} \
                    HAVING COUNT(*) > 0 \
                 ) grouped ORDER BY grouped.id IS NULL, grouped.label",
                table = table,
                fk = fk,
                and_sql = and_sql,
                unspecified = UNSPECIFIED
            );
        }

        let (label, order) = match self.grouping {
            Grouping::TipoMovilidad => ("u.tipo_movilidad".to_string(), "value DESC, label"),
            Grouping::Mes => (format!("TO_CHAR({}, 'YYYY-MM')", created_at), "label"),
            Grouping::Estado => ("a.estado".to_string(), "value DESC, label"),
            Grouping::Ciclo => ("a.ciclo_escolar_inicio".to_string(), "label DESC"),
            Grouping::Universidad => ("a.universidad".to_string(), "value DESC, label"),
            // catalog groupings are rendered above
            Grouping::Facultad | Grouping::Carrera => ("NULL".to_string(), "label"),
        };

        format!(
            "SELECT NULL::int AS id, COALESCE({label}::text, '{unspecified}') AS label, COUNT({counted}) AS value \
             FROM {from} {where_sql} \
             GROUP BY 2 ORDER BY {order}",
            label = label,
            unspecified = UNSPECIFIED,
            counted = self.counted_id(),
            from = from,
            where_sql = where_sql,
            order = order
        )
    }
}

/// Dropdown values for the dashboard filters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub universidades: Vec<CatalogRef>,
    pub facultades: Vec<CatalogRef>,
    pub carreras: Vec<CatalogRef>,
    pub tipos_movilidad: Vec<String>,
    pub estados_aplicacion: Vec<String>,
    pub ciclos_escolares: Vec<String>,
}

/// Which report dataset a `tipo_movilidad` selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Movilidad,
    Visitantes,
}

impl ReportKind {
    /// Parse `tipo_movilidad` for this report, rejecting types of the other one
    pub fn parse_tipo(&self, raw: Option<&str>) -> Option<MobilityType> {
        let tipo = raw?.parse::<MobilityType>().ok()?;
        match self {
            ReportKind::Movilidad if !tipo.is_visitor() => Some(tipo),
            ReportKind::Visitantes if tipo.is_visitor() => Some(tipo),
            _ => None,
        }
    }
}

pub struct StatsService<'a> {
    db: &'a Database,
}

impl<'a> StatsService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn grouped(&self, query: StatsQuery, filter: &Filter) -> Result<Vec<CountRow>, DatabaseError> {
        let conditions = filter.to_sql(query.scope(), 1)?;
        let sql = query.to_sql(&conditions.clause, None);
        self.db.fetch_all(&sql, &conditions.params).await
    }

    /// Unfiltered report; month groupings cover the last twelve months
    pub async fn fixed(&self, entity: StatsEntity, grouping: Grouping) -> Result<Vec<CountRow>, DatabaseError> {
        let query = StatsQuery { entity, grouping };
        let recent = (grouping == Grouping::Mes).then_some(12);
        self.db.fetch_all(&query.to_sql("", recent), &[]).await
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, DatabaseError> {
        let universidades = UniversidadRepository::new(self.db);
        let facultades = FacultadRepository::new(self.db);
        let carreras = CarreraRepository::new(self.db);

        let (universidades, facultades, carreras, tipos, estados, ciclos) = tokio::try_join!(
            universidades.options(),
            facultades.options(),
            carreras.options(),
            self.distinct(
                "SELECT DISTINCT tipo_movilidad FROM users WHERE tipo_movilidad IS NOT NULL ORDER BY 1"
            ),
            self.distinct("SELECT DISTINCT estado FROM applications ORDER BY 1"),
            self.distinct(
                "SELECT ciclo FROM ( \
                    SELECT ciclo_escolar_inicio AS ciclo FROM users \
                    UNION SELECT ciclo_escolar_final FROM users \
                    UNION SELECT ciclo_escolar_inicio FROM applications \
                    UNION SELECT ciclo_escolar_final FROM applications \
                 ) ciclos WHERE ciclo IS NOT NULL AND ciclo <> '' ORDER BY ciclo DESC"
            ),
        )?;

        Ok(FilterOptions {
            universidades,
            facultades,
            carreras,
            tipos_movilidad: tipos,
            estados_aplicacion: estados,
            ciclos_escolares: ciclos,
        })
    }

    async fn distinct(&self, sql: &str) -> Result<Vec<String>, DatabaseError> {
        let rows: Vec<(String,)> = self.db.fetch_all(sql, &[]).await?;
        Ok(rows.into_iter().map(|(value,)| value).collect())
    }

    /// Students of an exchange type with their latest application
    pub async fn movilidad_report(
        &self,
        tipo: MobilityType,
        filter: &Filter,
    ) -> Result<Vec<MovilidadReportRow>, DatabaseError> {
        let conditions = filter.to_sql(&ColumnScope::USERS, 2)?;
        let sql = format!(
            "SELECT u.id, u.nombres, u.apellido_paterno, u.apellido_materno, u.clave, u.email, \
                    u.tipo_movilidad, u.ciclo_escolar_inicio, u.ciclo_escolar_final, \
                    un.nombre AS universidad, f.nombre AS facultad, c.nombre AS carrera, b.nombre AS beca, \
                    la.universidad AS universidad_destino, la.pais_destino, la.estado AS estado_aplicacion \
             FROM users u \
             LEFT JOIN universidades un ON u.universidad_id = un.id \
             LEFT JOIN facultades f ON u.facultad_id = f.id \
             LEFT JOIN carreras c ON u.carrera_id = c.id \
             LEFT JOIN becas b ON u.beca_id = b.id \
             LEFT JOIN LATERAL ( \
                SELECT a.universidad, a.pais_destino, a.estado FROM applications a \
                WHERE a.user_id = u.id ORDER BY a.created_at DESC LIMIT 1 \
             ) la ON TRUE \
             WHERE u.tipo_movilidad = $1{} \
             ORDER BY u.apellido_paterno, u.apellido_materno, u.nombres",
            conditions.and_sql()
        );
        let mut params = sql_params![tipo.as_str()];
        params.extend(conditions.params);
        self.db.fetch_all(&sql, &params).await
    }

    /// Visiting students with their visitor record
    pub async fn visitantes_report(
        &self,
        tipo: MobilityType,
        filter: &Filter,
    ) -> Result<Vec<VisitanteReportRow>, DatabaseError> {
        let conditions = filter.to_sql(&ColumnScope::USERS, 2)?;
        let sql = format!(
            "SELECT u.id, u.nombres, u.apellido_paterno, u.apellido_materno, u.clave, u.email, u.telefono, \
                    u.tipo_movilidad, u.ciclo_escolar_inicio, u.ciclo_escolar_final, \
                    un.nombre AS universidad, f.nombre AS facultad, c.nombre AS carrera, \
                    vi.pais_origen, vi.fecha_nacimiento, vi.preparatoria, vi.entidad_federativa, \
                    vi.nombre_tutor, vi.dni_curp, vi.sexo \
             FROM users u \
             LEFT JOIN universidades un ON u.universidad_id = un.id \
             LEFT JOIN facultades f ON u.facultad_id = f.id \
             LEFT JOIN carreras c ON u.carrera_id = c.id \
             LEFT JOIN visitantes_info vi ON vi.user_id = u.id \
             WHERE u.tipo_movilidad = $1{} \
             ORDER BY u.apellido_paterno, u.apellido_materno, u.nombres",
            conditions.and_sql()
        );
        let mut params = sql_params![tipo.as_str()];
        params.extend(conditions.params);
        self.db.fetch_all(&sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_users_by_universidad() {
        let query = StatsQuery::parse(None, Some("")).unwrap();
        assert_eq!(query.entity, StatsEntity::Users);
        assert_eq!(query.grouping, Grouping::Universidad);
    }

    #[test]
    fn rejects_pairs_outside_the_table() {
        assert_eq!(
            StatsQuery::parse(Some("users"), Some("estado")),
            Err(FilterError::InvalidCombination)
        );
        assert_eq!(
            StatsQuery::parse(Some("applications"), Some("facultad")),
            Err(FilterError::InvalidCombination)
        );
        assert!(StatsQuery::parse(Some("convocatorias"), None).is_err());
        assert!(StatsQuery::parse(Some("applications"), Some("ciclo")).is_ok());
    }

    #[test]
    fn users_ignore_status_filter() {
        let query = StatsQuery::parse(Some("users"), Some("mes")).unwrap();
        assert!(!query.allowed_filters().contains(&FilterField::Estado));
        let query = StatsQuery::parse(Some("applications"), Some("estado")).unwrap();
        assert!(query.allowed_filters().contains(&FilterField::Estado));
    }

    #[test]
    fn catalog_grouping_keeps_unreferenced_rows() {
        let sql = StatsQuery::parse(Some("users"), Some("facultad"))
            .unwrap()
            .to_sql("u.tipo_movilidad = $1", None);
        assert!(sql.contains("FROM facultades cat LEFT JOIN users u ON u.facultad_id = cat.id AND u.tipo_movilidad = $1"));
        assert!(sql.contains("WHERE u.facultad_id IS NULL AND u.tipo_movilidad = $1"));
        assert!(sql.contains(UNSPECIFIED));
    }

    #[test]
    fn month_grouping_uses_scope_timestamp() {
        let sql = StatsQuery::parse(Some("applications"), Some("mes")).unwrap().to_sql("", Some(12));
        assert!(sql.contains("TO_CHAR(a.created_at, 'YYYY-MM')"));
        assert!(sql.contains("WHERE a.created_at >= NOW() - INTERVAL '12 months'"));
        assert!(sql.contains("FROM applications a LEFT JOIN users u"));
    }

    #[test]
    fn report_kinds_accept_only_their_types() {
        assert_eq!(
            ReportKind::Movilidad.parse_tipo(Some("movilidad_virtual")),
            Some(MobilityType::MovilidadVirtual)
        );
        assert_eq!(ReportKind::Movilidad.parse_tipo(Some("visitante_nacional")), None);
        assert_eq!(
            ReportKind::Visitantes.parse_tipo(Some("visitante_internacional")),
            Some(MobilityType::VisitanteInternacional)
        );
        assert_eq!(ReportKind::Visitantes.parse_tipo(None), None);
    }
}
