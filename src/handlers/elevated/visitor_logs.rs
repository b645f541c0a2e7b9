// handlers/elevated/visitor_logs.rs - GET /api/visitor-logs/* analytics handlers

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::{CountRow, VisitorLogEntry, VisitorTotals};
use crate::database::repository::{Period, VisitorLogRepository};
use crate::error::ApiError;
use crate::filter::{Filter, FilterField};
use crate::middleware::{ApiResponse, ApiResult};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Serialize)]
pub struct VisitorStats {
    pub general: VisitorTotals,
    pub top_pages: Vec<CountRow>,
    pub top_actions: Vec<CountRow>,
    pub daily: Vec<CountRow>,
    pub hourly: Vec<CountRow>,
}

/// GET /api/visitor-logs/stats - totals, top pages and actions, daily and hourly counts
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<VisitorStats> {
    let filter = Filter::from_query(&query, FilterField::VISITOR_LOG)?;
    let logs = VisitorLogRepository::new(&state.db);

    let (general, top_pages, top_actions, daily, hourly) = tokio::try_join!(
        logs.totals(&filter),
        logs.top_pages(&filter, 10),
        logs.top_actions(&filter, 10),
        logs.daily(&filter),
        logs.hourly(&filter),
    )?;

    Ok(ApiResponse::success(VisitorStats {
        general,
        top_pages,
        top_actions,
        daily,
        hourly,
    }))
}

/// GET /api/visitor-logs/logs - filtered rows with `limit` (max 1000) and `offset`
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<VisitorLogEntry>> {
    let filter = Filter::from_query(&query, FilterField::VISITOR_LOG)?;
    let (limit, offset) = paging(&query)?;
    let rows = VisitorLogRepository::new(&state.db).entries(&filter, limit, offset).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/visitor-logs/stats/pages - top 20 pages of the last 30 days
pub async fn pages(State(state): State<AppState>) -> ApiResult<Vec<CountRow>> {
    Ok(ApiResponse::success(VisitorLogRepository::new(&state.db).recent_pages(20).await?))
}

/// GET /api/visitor-logs/stats/period?period=hour|day|week|month
pub async fn period(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<CountRow>> {
    let period = parse_period(&query);
    Ok(ApiResponse::success(VisitorLogRepository::new(&state.db).by_period(period).await?))
}

/// `period` query value; missing or unknown values mean days
pub fn parse_period(query: &HashMap<String, String>) -> Period {
    query
        .get("period")
        .and_then(|raw| raw.parse::<Period>().ok())
        .unwrap_or(Period::Day)
}

fn paging(query: &HashMap<String, String>) -> Result<(i64, i64), ApiError> {
    let number = |key: &str, default: i64| -> Result<i64, ApiError> {
        match query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| ApiError::field_error(key, format!("{} must be a non-negative integer", key))),
        }
    };

    let limit = number("limit", DEFAULT_LIMIT)?.clamp(1, MAX_LIMIT);
    let offset = number("offset", 0)?;
    Ok((limit, offset))
}
