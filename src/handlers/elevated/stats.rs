// handlers/elevated/stats.rs - GET /api/stats/* dashboard handlers
//
// Fixed reports, the filtered breakdown, dropdown options, visitor
// analytics and the tabular report datasets.

use std::collections::HashMap;

use axum::extract::{Query, State};

use crate::app::AppState;
use crate::database::models::{CountRow, MovilidadReportRow, VisitanteReportRow, VisitorTotals};
use crate::database::repository::VisitorLogRepository;
use crate::error::ApiError;
use crate::filter::{Filter, FilterField};
use crate::handlers::elevated::visitor_logs::parse_period;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::stats_service::{FilterOptions, Grouping};
use crate::services::{ReportKind, StatsEntity, StatsQuery, StatsService};
use crate::types::MobilityType;

async fn fixed(state: &AppState, entity: StatsEntity, grouping: Grouping) -> ApiResult<Vec<CountRow>> {
    let rows = StatsService::new(&state.db).fixed(entity, grouping).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn users_by_universidad(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Users, Grouping::Universidad).await
}

pub async fn users_by_facultad(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Users, Grouping::Facultad).await
}

pub async fn users_by_carrera(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Users, Grouping::Carrera).await
}

pub async fn users_by_tipo_movilidad(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Users, Grouping::TipoMovilidad).await
}

/// Registrations per month, last twelve months
pub async fn users_by_month(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Users, Grouping::Mes).await
}

pub async fn applications_by_estado(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Applications, Grouping::Estado).await
}

pub async fn applications_by_ciclo(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Applications, Grouping::Ciclo).await
}

/// Submissions per month, last twelve months
pub async fn applications_by_month(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    fixed(&state, StatsEntity::Applications, Grouping::Mes).await
}

/**
 * GET /api/stats/filtered?tipo=&agrupacion= - grouped counts under dashboard filters
 *
 * `tipo` is `users` or `applications`; the accepted `agrupacion` values
 * depend on it. Filter keys outside the entity's allow-list are ignored.
 * Rows are `{id?, label, value}` and their values sum to the filtered total.
 */
pub async fn filtered(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<CountRow>> {
    let stats_query = StatsQuery::parse(
        query.get("tipo").map(String::as_str),
        query.get("agrupacion").map(String::as_str),
    )?;
    let filter = Filter::from_query(&query, stats_query.allowed_filters())?;

    let rows = StatsService::new(&state.db).grouped(stats_query, &filter).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/stats/filter-options
pub async fn filter_options(State(state): State<AppState>) -> ApiResult<FilterOptions> {
    Ok(ApiResponse::success(StatsService::new(&state.db).filter_options().await?))
}

/// GET /api/stats/visitors/pages - top 20 pages of the last 30 days
pub async fn visitor_pages(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    Ok(ApiResponse::success(VisitorLogRepository::new(&state.db).recent_pages(20).await?))
}

/// GET /api/stats/visitors/period?period=hour|day|week|month
pub async fn visitor_period(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<CountRow>> {
    let period = parse_period(&query);
    Ok(ApiResponse::success(VisitorLogRepository::new(&state.db).by_period(period).await?))
}

/// GET /api/stats/visitors/hourly - visits per hour of day, last 30 days
pub async fn visitor_hourly(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    Ok(ApiResponse::success(VisitorLogRepository::new(&state.db).recent_hourly().await?))
}

/// GET /api/stats/visitors/summary - totals of the last 30 days
pub async fn visitor_summary(State(state): State<AppState>) -> ApiResult<VisitorTotals> {
    Ok(ApiResponse::success(VisitorLogRepository::new(&state.db).recent_totals().await?))
}

fn report_tipo(kind: ReportKind, query: &HashMap<String, String>) -> Result<MobilityType, ApiError> {
    kind.parse_tipo(query.get("tipo_movilidad").map(String::as_str))
        .ok_or_else(|| {
            let allowed = match kind {
                ReportKind::Movilidad => "movilidad_internacional or movilidad_virtual",
                ReportKind::Visitantes => "visitante_nacional or visitante_internacional",
            };
            ApiError::field_error("tipo_movilidad", format!("tipo_movilidad must be {}", allowed))
        })
}

/// GET /api/stats/report/movilidad?tipo_movilidad= - exchange students with their latest application
pub async fn report_movilidad(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<MovilidadReportRow>> {
    let tipo = report_tipo(ReportKind::Movilidad, &query)?;
    let filter = Filter::from_query(&query, FilterField::REPORT)?;
    let rows = StatsService::new(&state.db).movilidad_report(tipo, &filter).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/stats/report/visitantes?tipo_movilidad= - visiting students with their visitor record
pub async fn report_visitantes(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<VisitanteReportRow>> {
    let tipo = report_tipo(ReportKind::Visitantes, &query)?;
    let filter = Filter::from_query(&query, FilterField::REPORT)?;
    let rows = StatsService::new(&state.db).visitantes_report(tipo, &filter).await?;
    Ok(ApiResponse::success(rows))
}
